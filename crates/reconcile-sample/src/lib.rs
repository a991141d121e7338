//! # Reconcile Sample
//!
//! Manages one kind of remote resource, a mainframe-modernization style
//! *application*, on top of `reconcile_framework`.
//!
//! - [`model`]: the application model, its status enums, and definition validation
//! - [`remote`]: the [`ApplicationApi`](remote::ApplicationApi) contract and a mock client
//! - [`refresher`]: status refreshers for the application and its versions
//! - [`lifecycle`]: the Create / Read / Update / Delete orchestrator
//! - [`control_plane`]: an in-process actor that simulates the remote service
//! - [`error`]: the [`ApplicationError`](error::ApplicationError) taxonomy

pub mod control_plane;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod refresher;
pub mod remote;
