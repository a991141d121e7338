//! Requests sent from [`SimulatedControlPlane`](super::SimulatedControlPlane) handles
//! to the [`ControlPlaneActor`](super::ControlPlaneActor).

use crate::model::ApplicationId;
use crate::remote::{
    ApiError, ApplicationSummary, ApplicationVersionDetail, CreateApplicationInput,
    CreateApplicationOutput, UpdateApplicationInput,
};
use tokio::sync::oneshot;

/// One-shot channel the actor answers on.
pub type Reply<T> = oneshot::Sender<Result<T, ApiError>>;

/// One variant per [`ApplicationApi`](crate::remote::ApplicationApi) operation.
#[derive(Debug)]
pub enum ControlPlaneRequest {
    Create {
        input: CreateApplicationInput,
        respond_to: Reply<CreateApplicationOutput>,
    },
    Get {
        id: ApplicationId,
        respond_to: Reply<ApplicationSummary>,
    },
    GetVersion {
        id: ApplicationId,
        version: u32,
        respond_to: Reply<ApplicationVersionDetail>,
    },
    Update {
        input: UpdateApplicationInput,
        respond_to: Reply<u32>,
    },
    Delete {
        id: ApplicationId,
        respond_to: Reply<()>,
    },
}
