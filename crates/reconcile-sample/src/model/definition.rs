//! The application definition: either inline content or a reference to an
//! external location, never both.

use serde::{Deserialize, Serialize};

const MAX_CONTENT_LEN: usize = 65_000;
const MAX_LOCATION_LEN: usize = 2_000;

/// A validated definition with exactly one active source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Definition {
    /// Inline definition document.
    Content(String),
    /// Location of the definition document in object storage.
    S3Location(String),
}

/// Errors raised while validating a [`DefinitionConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("exactly one of content or s3_location must be set, got both")]
    BothSet,
    #[error("exactly one of content or s3_location must be set, got neither")]
    NeitherSet,
    #[error("content length must be between 1 and {max}, got {0}", max = MAX_CONTENT_LEN)]
    ContentLength(usize),
    #[error("s3_location must be 1 to {max} non-whitespace characters", max = MAX_LOCATION_LEN)]
    InvalidLocation,
}

/// Raw definition block as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionConfig {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub s3_location: Option<String>,
}

impl TryFrom<DefinitionConfig> for Definition {
    type Error = DefinitionError;

    fn try_from(config: DefinitionConfig) -> Result<Self, Self::Error> {
        match (config.content, config.s3_location) {
            (Some(_), Some(_)) => Err(DefinitionError::BothSet),
            (None, None) => Err(DefinitionError::NeitherSet),
            (Some(content), None) => {
                let len = content.chars().count();
                if len == 0 || len > MAX_CONTENT_LEN {
                    return Err(DefinitionError::ContentLength(len));
                }
                Ok(Definition::Content(content))
            }
            (None, Some(location)) => {
                let len = location.chars().count();
                if len == 0 || len > MAX_LOCATION_LEN || location.chars().any(char::is_whitespace)
                {
                    return Err(DefinitionError::InvalidLocation);
                }
                Ok(Definition::S3Location(location))
            }
        }
    }
}
