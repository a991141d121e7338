//! # Simulated Control Plane
//!
//! An in-process stand-in for the remote service, used by the demo binary and the
//! end-to-end tests. It runs as an actor: [`SimulatedControlPlane`] handles send
//! [`ControlPlaneRequest`]s over an mpsc channel and await the answer on a oneshot.
//!
//! ```rust
//! use reconcile_sample::control_plane::{ProvisioningPlan, SimulatedControlPlane};
//! use reconcile_sample::model::ApplicationId;
//! use reconcile_sample::remote::ApplicationApi;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (control_plane, handle) = SimulatedControlPlane::start(ProvisioningPlan::default());
//!
//!     let err = control_plane
//!         .get_application(&ApplicationId::from("app-404"))
//!         .await
//!         .unwrap_err();
//!     assert!(err.is_not_found());
//!
//!     drop(control_plane);
//!     handle.await.unwrap();
//! }
//! ```
//!
//! Dropping every handle closes the channel and stops the actor.

mod actor;
mod message;

pub use actor::{ControlPlaneActor, ProvisioningPlan};
pub use message::{ControlPlaneRequest, Reply};

use crate::model::ApplicationId;
use crate::remote::{
    ApiError, ApplicationApi, ApplicationSummary, ApplicationVersionDetail,
    CreateApplicationInput, CreateApplicationOutput, UpdateApplicationInput,
};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::instrument;

/// Cloneable handle to a running [`ControlPlaneActor`].
#[derive(Clone)]
pub struct SimulatedControlPlane {
    sender: mpsc::Sender<ControlPlaneRequest>,
}

impl SimulatedControlPlane {
    /// Creates the actor and a handle to it. The actor does nothing until run.
    pub fn new(plan: ProvisioningPlan, buffer_size: usize) -> (ControlPlaneActor, Self) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        (ControlPlaneActor::new(receiver, plan), Self { sender })
    }

    /// Creates the actor and spawns it on the current runtime.
    pub fn start(plan: ProvisioningPlan) -> (Self, JoinHandle<()>) {
        let (actor, handle) = Self::new(plan, 32);
        (handle, tokio::spawn(actor.run()))
    }

    async fn call<T>(
        &self,
        request: impl FnOnce(Reply<T>) -> ControlPlaneRequest,
    ) -> Result<T, ApiError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(request(respond_to))
            .await
            .map_err(|_| ApiError::Transport("control plane closed".to_string()))?;
        response
            .await
            .map_err(|_| ApiError::Transport("control plane dropped the request".to_string()))?
    }
}

#[async_trait]
impl ApplicationApi for SimulatedControlPlane {
    #[instrument(skip_all, fields(name = %input.name))]
    async fn create_application(
        &self,
        input: CreateApplicationInput,
    ) -> Result<CreateApplicationOutput, ApiError> {
        self.call(|respond_to| ControlPlaneRequest::Create { input, respond_to })
            .await
    }

    #[instrument(skip(self), fields(application_id = %id))]
    async fn get_application(&self, id: &ApplicationId) -> Result<ApplicationSummary, ApiError> {
        let id = id.clone();
        self.call(|respond_to| ControlPlaneRequest::Get { id, respond_to })
            .await
    }

    #[instrument(skip(self), fields(application_id = %id))]
    async fn get_application_version(
        &self,
        id: &ApplicationId,
        version: u32,
    ) -> Result<ApplicationVersionDetail, ApiError> {
        let id = id.clone();
        self.call(|respond_to| ControlPlaneRequest::GetVersion {
            id,
            version,
            respond_to,
        })
        .await
    }

    #[instrument(skip_all, fields(application_id = %input.application_id))]
    async fn update_application(&self, input: UpdateApplicationInput) -> Result<u32, ApiError> {
        self.call(|respond_to| ControlPlaneRequest::Update { input, respond_to })
            .await
    }

    #[instrument(skip(self), fields(application_id = %id))]
    async fn delete_application(&self, id: &ApplicationId) -> Result<(), ApiError> {
        let id = id.clone();
        self.call(|respond_to| ControlPlaneRequest::Delete { id, respond_to })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApplicationStatus, Definition, EngineType};

    fn input(name: &str, token: &str) -> CreateApplicationInput {
        CreateApplicationInput {
            name: name.to_string(),
            engine_type: EngineType::Microfocus,
            description: None,
            definition: Definition::Content("{}".to_string()),
            kms_key_id: None,
            role_arn: None,
            client_token: token.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_settles_after_planned_polls() {
        let plan = ProvisioningPlan {
            create_polls: 2,
            ..Default::default()
        };
        let (cp, _handle) = SimulatedControlPlane::start(plan);

        let out = cp.create_application(input("APP1", "t-1")).await.unwrap();
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(cp.get_application(&out.application_id).await.unwrap().status);
        }
        assert_eq!(
            seen,
            vec![
                ApplicationStatus::Creating,
                ApplicationStatus::Creating,
                ApplicationStatus::Available
            ]
        );
    }

    #[tokio::test]
    async fn test_repeated_client_token_returns_same_application() {
        let (cp, _handle) = SimulatedControlPlane::start(ProvisioningPlan::default());

        let first = cp.create_application(input("APP1", "t-1")).await.unwrap();
        let second = cp.create_application(input("APP1", "t-1")).await.unwrap();
        assert_eq!(first.application_id, second.application_id);

        let err = cp.create_application(input("APP1", "t-2")).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_stale_version_is_a_conflict() {
        let plan = ProvisioningPlan {
            create_polls: 0,
            ..Default::default()
        };
        let (cp, _handle) = SimulatedControlPlane::start(plan);
        let id = cp.create_application(input("APP1", "t-1")).await.unwrap().application_id;
        cp.get_application(&id).await.unwrap();

        let update = |version| UpdateApplicationInput {
            application_id: id.clone(),
            current_application_version: version,
            description: Some("v2".to_string()),
            definition: None,
        };
        assert_eq!(cp.update_application(update(1)).await.unwrap(), 2);
        let err = cp.update_application(update(1)).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_closed_control_plane_is_a_transport_error() {
        let (actor, cp) = SimulatedControlPlane::new(ProvisioningPlan::default(), 1);
        drop(actor);

        let err = cp.delete_application(&ApplicationId::from("app-1")).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[tokio::test]
    async fn test_empty_name_is_a_validation_error() {
        let (cp, _handle) = SimulatedControlPlane::start(ProvisioningPlan::default());

        let err = cp.create_application(input("", "t-1")).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)), "{err}");
    }

    #[tokio::test]
    async fn test_replayed_token_reports_latest_version() {
        let plan = ProvisioningPlan {
            create_polls: 0,
            ..Default::default()
        };
        let (cp, _handle) = SimulatedControlPlane::start(plan);
        let id = cp.create_application(input("APP1", "t-1")).await.unwrap().application_id;
        cp.get_application(&id).await.unwrap();
        cp.update_application(UpdateApplicationInput {
            application_id: id.clone(),
            current_application_version: 1,
            description: Some("v2".to_string()),
            definition: None,
        })
        .await
        .unwrap();

        let replayed = cp.create_application(input("APP1", "t-1")).await.unwrap();
        assert_eq!(replayed.application_id, id);
        assert_eq!(replayed.application_version, 2);
    }

    #[tokio::test]
    async fn test_delete_forgets_client_token() {
        let plan = ProvisioningPlan {
            delete_polls: 0,
            ..Default::default()
        };
        let (cp, _handle) = SimulatedControlPlane::start(plan);
        let first = cp.create_application(input("APP1", "t-1")).await.unwrap().application_id;
        cp.delete_application(&first).await.unwrap();

        // The token is gone, but the name is still held until the delete finishes.
        let err = cp.create_application(input("APP1", "t-1")).await.unwrap_err();
        assert!(err.is_conflict(), "{err}");

        assert!(cp.get_application(&first).await.unwrap_err().is_not_found());
        let second = cp.create_application(input("APP1", "t-1")).await.unwrap().application_id;
        assert_ne!(first, second);
    }
}
