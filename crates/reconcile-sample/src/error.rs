//! Error types for application lifecycle operations.

use crate::model::{ApplicationModel, DefinitionError};
use crate::remote::ApiError;
use reconcile_framework::WaitError;
use std::fmt::Display;
use std::time::Duration;

/// The lifecycle operation an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Operation::Create => "creating",
            Operation::Read => "reading",
            Operation::Update => "updating",
            Operation::Delete => "deleting",
        };
        f.write_str(s)
    }
}

/// Errors that can occur during application lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    /// The configured definition is invalid.
    #[error("invalid definition: {0}")]
    InvalidDefinition(#[from] DefinitionError),

    #[error("a definition is required")]
    MissingDefinition,

    /// The model has not been created yet, or its identifier was lost.
    #[error("application has no identifier")]
    MissingIdentifier,

    #[error("application ({0}) has no current version")]
    MissingVersion(String),

    /// A field changed that cannot be updated in place.
    #[error("changing {field} of application ({id}) requires replacement")]
    RequiresReplacement { id: String, field: &'static str },

    /// The application disappeared while an operation needed it.
    #[error("{operation} application ({id}): not found")]
    NotFound { operation: Operation, id: String },

    /// The update carried a stale version. Never retried automatically.
    #[error("updating application ({id}): version {version} is stale")]
    Conflict {
        id: String,
        version: u32,
        #[source]
        source: ApiError,
    },

    /// The application reported a failed status.
    #[error("waiting for application ({id}) {operation}: status '{status}'{}", fmt_reason(.reason))]
    TerminalStatus {
        operation: Operation,
        id: String,
        status: String,
        reason: Option<String>,
    },

    /// The wait ran out of time. Carries the last status and its reason, if any poll
    /// saw one.
    #[error(
        "waiting for application ({id}) {operation}: timeout after {timeout:?} (last status: '{}'){}",
        .last_status.as_deref().unwrap_or(""),
        fmt_reason(.reason)
    )]
    Timeout {
        operation: Operation,
        id: String,
        timeout: Duration,
        last_status: Option<String>,
        reason: Option<String>,
    },

    #[error("waiting for application ({id}) {operation}: cancelled")]
    Cancelled { operation: Operation, id: String },

    /// The control plane rejected or failed the call.
    #[error("{operation} application ({id}): {source}")]
    Api {
        operation: Operation,
        id: String,
        #[source]
        source: ApiError,
    },

    /// The remote side changed but the operation did not finish. `model` holds the
    /// state the caller must persist so the application is not lost track of.
    #[error("{source} (partial state recorded for application {})", tainted_id(.model))]
    Tainted {
        model: Box<ApplicationModel>,
        #[source]
        source: Box<ApplicationError>,
    },
}

impl ApplicationError {
    /// Maps a failed wait onto the lifecycle error taxonomy.
    pub(crate) fn from_wait<P, E>(operation: Operation, id: &str, err: WaitError<P, E>) -> Self
    where
        P: std::fmt::Debug,
        E: std::error::Error + Into<ApiError> + 'static,
    {
        let id = id.to_string();
        match err {
            WaitError::Refresh(source) => ApplicationError::Api {
                operation,
                id,
                source: source.into(),
            },
            WaitError::UnexpectedStatus { status, reason, .. } => ApplicationError::TerminalStatus {
                operation,
                id,
                status,
                reason,
            },
            WaitError::NotFound { .. } => ApplicationError::NotFound { operation, id },
            WaitError::Timeout {
                timeout,
                last_status,
                reason,
                ..
            } => ApplicationError::Timeout {
                operation,
                id,
                timeout,
                last_status,
                reason,
            },
            WaitError::Cancelled { .. } => ApplicationError::Cancelled { operation, id },
        }
    }

    /// Wraps `self` with the partial model the caller should persist.
    pub(crate) fn tainted(self, model: ApplicationModel) -> Self {
        ApplicationError::Tainted {
            model: Box::new(model),
            source: Box::new(self),
        }
    }

    /// The error without any tainted wrapper.
    pub fn root(&self) -> &ApplicationError {
        match self {
            ApplicationError::Tainted { source, .. } => source.root(),
            other => other,
        }
    }

    /// Partial state to persist despite the failure, if any.
    pub fn tainted_model(&self) -> Option<&ApplicationModel> {
        match self {
            ApplicationError::Tainted { model, .. } => Some(model.as_ref()),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), ApplicationError::Timeout { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), ApplicationError::Cancelled { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), ApplicationError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self.root(), ApplicationError::Conflict { .. })
    }
}

fn tainted_id(model: &ApplicationModel) -> &str {
    model
        .application_id
        .as_ref()
        .map(|id| id.as_str())
        .unwrap_or("")
}

fn fmt_reason(reason: &Option<String>) -> String {
    match reason {
        Some(r) if !r.is_empty() => format!(": {r}"),
        _ => String::new(),
    }
}
