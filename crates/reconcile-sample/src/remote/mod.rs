//! # Remote API Contract
//!
//! The control-plane operations the lifecycle orchestrator needs, expressed as the
//! [`ApplicationApi`] trait. The orchestrator never constructs a client itself; one is
//! injected, which is how tests swap in [`mock::MockApplicationApi`] and the demo
//! swaps in the [`SimulatedControlPlane`](crate::control_plane::SimulatedControlPlane).
//!
//! Every implementation must report a missing application as [`ApiError::NotFound`].
//! Read and Delete treat that case as benign, so it must never be folded into
//! another variant.

pub mod mock;

use crate::model::{
    ApplicationId, ApplicationStatus, ApplicationVersionStatus, Definition, EngineType,
};
use async_trait::async_trait;
use reconcile_framework::StatusReason;

/// Errors returned by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The request conflicts with the current state, e.g. a stale version.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The request was malformed, e.g. a required field was empty.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("request throttled")]
    Throttled,

    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The call succeeded but the response carried no resource.
    #[error("empty result: {0}")]
    EmptyResult(String),

    /// Network or protocol failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Conflict(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateApplicationInput {
    pub name: String,
    pub engine_type: EngineType,
    pub description: Option<String>,
    pub definition: Definition,
    pub kms_key_id: Option<String>,
    pub role_arn: Option<String>,
    /// Idempotency token; a retried create with the same token is not applied twice.
    pub client_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateApplicationOutput {
    pub application_id: ApplicationId,
    pub application_arn: String,
    pub application_version: u32,
}

/// Application summary, without version-specific fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationSummary {
    pub application_id: ApplicationId,
    pub application_arn: String,
    pub name: String,
    pub engine_type: EngineType,
    pub description: Option<String>,
    pub kms_key_id: Option<String>,
    pub role_arn: Option<String>,
    pub status: ApplicationStatus,
    pub status_reason: Option<String>,
    pub latest_version: u32,
}

impl StatusReason for ApplicationSummary {
    fn status_reason(&self) -> Option<&str> {
        self.status_reason.as_deref()
    }
}

/// One version of an application, including its definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationVersionDetail {
    pub application_version: u32,
    pub definition_content: String,
    pub status: ApplicationVersionStatus,
    pub status_reason: Option<String>,
}

impl StatusReason for ApplicationVersionDetail {
    fn status_reason(&self) -> Option<&str> {
        self.status_reason.as_deref()
    }
}

/// In-place update. Only the changed fields are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateApplicationInput {
    pub application_id: ApplicationId,
    /// Version the caller last observed; a stale value is rejected with a conflict.
    pub current_application_version: u32,
    pub description: Option<String>,
    pub definition: Option<Definition>,
}

/// Control-plane client required by the lifecycle orchestrator.
#[async_trait]
pub trait ApplicationApi: Send + Sync {
    async fn create_application(
        &self,
        input: CreateApplicationInput,
    ) -> Result<CreateApplicationOutput, ApiError>;

    async fn get_application(&self, id: &ApplicationId) -> Result<ApplicationSummary, ApiError>;

    async fn get_application_version(
        &self,
        id: &ApplicationId,
        version: u32,
    ) -> Result<ApplicationVersionDetail, ApiError>;

    /// Returns the new application version.
    async fn update_application(&self, input: UpdateApplicationInput) -> Result<u32, ApiError>;

    async fn delete_application(&self, id: &ApplicationId) -> Result<(), ApiError>;
}
