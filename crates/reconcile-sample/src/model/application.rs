//! Represents an application managed on the remote control plane.
//!
//! The model is split in two halves:
//! - **configuration** the user writes (name, engine type, definition, ...), and
//! - **computed** fields the control plane assigns (id, ARN, version, status).
//!
//! The caller owns persistence. It should store the model returned by every
//! lifecycle call, including the partial model carried by a
//! [`ApplicationError::Tainted`](crate::error::ApplicationError::Tainted) error.

use crate::model::definition::{Definition, DefinitionConfig, DefinitionError};
use crate::model::status::ApplicationStatus;
use crate::remote::ApplicationSummary;
use reconcile_framework::Timeouts;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifier assigned by the control plane on creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ApplicationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ApplicationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Runtime engine the application is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineType {
    Microfocus,
    Bluage,
}

impl Display for EngineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineType::Microfocus => f.write_str("microfocus"),
            EngineType::Bluage => f.write_str("bluage"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationModel {
    // Computed
    pub application_id: Option<ApplicationId>,
    pub arn: Option<String>,
    pub current_version: Option<u32>,
    pub status: Option<ApplicationStatus>,
    pub client_token: Option<String>,

    // Configuration
    pub name: String,
    pub engine_type: EngineType,
    pub description: Option<String>,
    pub definition: Option<Definition>,
    pub kms_key_id: Option<String>,
    pub role_arn: Option<String>,
    pub timeouts: Timeouts,
}

impl ApplicationModel {
    /// Creates an unprovisioned model with the required configuration.
    pub fn new(name: impl Into<String>, engine_type: EngineType, definition: Definition) -> Self {
        Self {
            application_id: None,
            arn: None,
            current_version: None,
            status: None,
            client_token: None,
            name: name.into(),
            engine_type,
            description: None,
            definition: Some(definition),
            kms_key_id: None,
            role_arn: None,
            timeouts: Timeouts::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Copies every field the application summary reports into the model.
    pub(crate) fn reconcile_summary(&mut self, summary: &ApplicationSummary) {
        self.application_id = Some(summary.application_id.clone());
        self.arn = Some(summary.application_arn.clone());
        self.name = summary.name.clone();
        self.engine_type = summary.engine_type;
        self.description = summary.description.clone();
        self.kms_key_id = summary.kms_key_id.clone();
        self.role_arn = summary.role_arn.clone();
        self.status = Some(summary.status);
    }

    /// The first replace-triggering field that differs, if any.
    ///
    /// These fields can only change by destroying and recreating the application.
    pub fn replacement_field(&self, new: &ApplicationModel) -> Option<&'static str> {
        if self.name != new.name {
            Some("name")
        } else if self.engine_type != new.engine_type {
            Some("engine_type")
        } else if self.kms_key_id != new.kms_key_id {
            Some("kms_key_id")
        } else if self.role_arn != new.role_arn {
            Some("role_arn")
        } else {
            None
        }
    }

    /// Differences in the fields an in-place update can change.
    pub fn changes_to(&self, new: &ApplicationModel) -> ApplicationChanges {
        ApplicationChanges {
            definition: (self.definition != new.definition)
                .then(|| new.definition.clone())
                .flatten(),
            description: (self.description != new.description)
                .then(|| new.description.clone().unwrap_or_default()),
        }
    }
}

/// The watched fields that differ between two models.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationChanges {
    pub definition: Option<Definition>,
    /// A cleared description is sent as an empty string.
    pub description: Option<String>,
}

impl ApplicationChanges {
    pub fn is_empty(&self) -> bool {
        self.definition.is_none() && self.description.is_none()
    }
}

/// User configuration, as loaded from a configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    pub name: String,
    pub engine_type: EngineType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub definition: Option<DefinitionConfig>,
    #[serde(default)]
    pub kms_key_id: Option<String>,
    #[serde(default)]
    pub role_arn: Option<String>,
    #[serde(default)]
    pub timeouts: Timeouts,
}

impl TryFrom<ApplicationConfig> for ApplicationModel {
    type Error = DefinitionError;

    fn try_from(config: ApplicationConfig) -> Result<Self, Self::Error> {
        let definition = config.definition.map(Definition::try_from).transpose()?;
        Ok(Self {
            application_id: None,
            arn: None,
            current_version: None,
            status: None,
            client_token: None,
            name: config.name,
            engine_type: config.engine_type,
            description: config.description,
            definition,
            kms_key_id: config.kms_key_id,
            role_arn: config.role_arn,
            timeouts: config.timeouts,
        })
    }
}
