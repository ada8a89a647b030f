//! Evidence artifacts eligible for recall

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// An immutable unit of evidence (prior turn record or external fact)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Unique artifact identifier
    pub artifact_id: String,
    /// Evidence text
    pub content: String,
    /// Origin tag (e.g. "turn-evidence", "constraint-note")
    pub source: String,
    /// Creation time, always UTC
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    /// Create an artifact, normalizing the timestamp to UTC
    pub fn new<Tz: TimeZone>(
        artifact_id: impl Into<String>,
        content: impl Into<String>,
        source: impl Into<String>,
        created_at: DateTime<Tz>,
    ) -> Result<Self, ValidationError> {
        let artifact_id = artifact_id.into();
        let content = content.into();
        let source = source.into();

        if artifact_id.is_empty() {
            return Err(ValidationError::InvalidArgument(
                "artifact_id must not be empty".to_string(),
            ));
        }
        if content.is_empty() {
            return Err(ValidationError::InvalidArgument(
                "content must not be empty".to_string(),
            ));
        }
        if source.is_empty() {
            return Err(ValidationError::InvalidArgument(
                "source must not be empty".to_string(),
            ));
        }

        Ok(Self {
            artifact_id,
            content,
            source,
            created_at: created_at.with_timezone(&Utc),
        })
    }
}
