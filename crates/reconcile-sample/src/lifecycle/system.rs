//! Wires an [`ApplicationLifecycle`] to a running [`SimulatedControlPlane`].

use super::application::ApplicationLifecycle;
use crate::control_plane::{ProvisioningPlan, SimulatedControlPlane};
use reconcile_framework::{PollPolicy, TokenSource};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// A lifecycle orchestrator backed by an in-process control plane.
pub struct ReconcileSystem {
    pub lifecycle: ApplicationLifecycle,
    control_plane: SimulatedControlPlane,
    handle: JoinHandle<()>,
}

impl ReconcileSystem {
    pub fn new(plan: ProvisioningPlan, poll: PollPolicy) -> Self {
        let (control_plane, handle) = SimulatedControlPlane::start(plan);
        let lifecycle =
            ApplicationLifecycle::new(Arc::new(control_plane.clone())).with_poll_policy(poll);
        info!("Reconcile system started");
        Self {
            lifecycle,
            control_plane,
            handle,
        }
    }

    pub fn with_tokens(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.lifecycle = self.lifecycle.with_tokens(tokens);
        self
    }

    /// A handle for direct control-plane calls, bypassing the orchestrator.
    pub fn control_plane(&self) -> &SimulatedControlPlane {
        &self.control_plane
    }

    /// Drops every handle and waits for the control plane to stop.
    ///
    /// Clones of the lifecycle or control plane held elsewhere keep it running; this
    /// waits for those to be dropped too.
    pub async fn shutdown(self) -> Result<(), String> {
        drop(self.lifecycle);
        drop(self.control_plane);
        self.handle.await.map_err(|e| {
            warn!(error = %e, "Control plane task failed");
            e.to_string()
        })?;
        info!("Reconcile system shutdown");
        Ok(())
    }
}
