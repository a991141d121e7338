//! Status enums reported by the control plane.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Lifecycle of an application as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Creating,
    Created,
    Available,
    Ready,
    Starting,
    Running,
    Stopping,
    Stopped,
    Failed,
    Deleting,
    DeletingFromEnvironment,
}

impl Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Creating => "Creating",
            Self::Created => "Created",
            Self::Available => "Available",
            Self::Ready => "Ready",
            Self::Starting => "Starting",
            Self::Running => "Running",
            Self::Stopping => "Stopping",
            Self::Stopped => "Stopped",
            Self::Failed => "Failed",
            Self::Deleting => "Deleting",
            Self::DeletingFromEnvironment => "Deleting From Environment",
        };
        f.write_str(s)
    }
}

/// Lifecycle of one application version. Every update creates a new version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationVersionStatus {
    Creating,
    Available,
    Failed,
}

impl Display for ApplicationVersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Creating => "Creating",
            Self::Available => "Available",
            Self::Failed => "Failed",
        };
        f.write_str(s)
    }
}
