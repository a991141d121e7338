//! # Reconcile Demo
//!
//! Walks one application through its whole lifecycle against the simulated control
//! plane:
//! 1. Create it from an inline definition and wait until it is available.
//! 2. Read it back.
//! 3. Change only the description, which produces a new version.
//! 4. Delete it and wait until it is gone.
//!
//! Run with `RUST_LOG=debug` to see every poll.

use reconcile_framework::tracing::setup_tracing;
use reconcile_framework::PollPolicy;
use reconcile_sample::control_plane::ProvisioningPlan;
use reconcile_sample::lifecycle::ReconcileSystem;
use reconcile_sample::model::{ApplicationModel, Definition, EngineType};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    info!("Starting reconcile demo");
    let plan = ProvisioningPlan {
        create_polls: 2,
        update_polls: 1,
        delete_polls: 1,
        create_failure: None,
    };
    let system = ReconcileSystem::new(plan, PollPolicy::fixed(Duration::from_millis(200)));
    let cancel = CancellationToken::new();

    let model = ApplicationModel::new(
        "APP1",
        EngineType::Bluage,
        Definition::Content(r#"{"template-version":"2.0"}"#.to_string()),
    )
    .with_description("demo application");

    let span = tracing::info_span!("provisioning");
    let created = async {
        match system.lifecycle.create(model, &cancel).await {
            Ok(created) => Ok(created),
            Err(e) => {
                if let Some(partial) = e.tainted_model() {
                    error!(application_id = ?partial.application_id, "Create left a tainted application");
                }
                Err(e.to_string())
            }
        }
    }
    .instrument(span)
    .await?;
    info!(application_id = ?created.application_id, version = ?created.current_version, "Application available");

    let current = system
        .lifecycle
        .read(&created, &cancel)
        .await
        .map_err(|e| e.to_string())?
        .ok_or("application vanished after create")?;

    let mut desired = current.clone();
    desired.description = Some("updated by the demo".to_string());
    let updated = system
        .lifecycle
        .update(&current, desired, &cancel)
        .await
        .map_err(|e| e.to_string())?;
    info!(version = ?updated.current_version, "Application updated");

    system
        .lifecycle
        .delete(&updated, &cancel)
        .await
        .map_err(|e| e.to_string())?;

    system.shutdown().await?;
    info!("Demo completed successfully");
    Ok(())
}
