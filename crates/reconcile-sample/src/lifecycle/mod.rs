//! # Lifecycle Orchestration
//!
//! Sequences remote mutations and status waits for an application, and wires the
//! pieces together for the demo.
//!
//! - [`ApplicationLifecycle`]: Create, Read, Update, and Delete against any
//!   [`ApplicationApi`](crate::remote::ApplicationApi).
//! - [`ReconcileSystem`]: an orchestrator already connected to a running
//!   [`SimulatedControlPlane`](crate::control_plane::SimulatedControlPlane).
//!
//! ## State machine
//!
//! ```text
//! absent ──create──▶ creating ──▶ available | failed
//! available ──update──▶ updating ──▶ available (new version) | failed
//! available ──delete──▶ deleting ──▶ absent | failed
//! ```
//!
//! A failed state never blocks a later attempt; the caller may retry any operation.
//!
//! ## Persistence contract
//!
//! The orchestrator holds no per-application state. The caller stores the model
//! returned by each call, and on a
//! [`Tainted`](crate::error::ApplicationError::Tainted) error stores the partial model
//! it carries, so a half-created application is never orphaned.
//!
//! ```rust
//! use reconcile_framework::PollPolicy;
//! use reconcile_sample::control_plane::ProvisioningPlan;
//! use reconcile_sample::lifecycle::ReconcileSystem;
//! use reconcile_sample::model::{ApplicationModel, Definition, EngineType};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let poll = PollPolicy::fixed(Duration::from_millis(5));
//!     let system = ReconcileSystem::new(ProvisioningPlan::default(), poll);
//!     let cancel = CancellationToken::new();
//!
//!     let model = ApplicationModel::new(
//!         "APP1",
//!         EngineType::Bluage,
//!         Definition::Content("{}".to_string()),
//!     );
//!     let created = system.lifecycle.create(model, &cancel).await.unwrap();
//!     assert_eq!(created.current_version, Some(1));
//!
//!     system.lifecycle.delete(&created, &cancel).await.unwrap();
//!     system.shutdown().await.unwrap();
//! }
//! ```

pub mod application;
pub mod system;

pub use application::*;
pub use system::*;
