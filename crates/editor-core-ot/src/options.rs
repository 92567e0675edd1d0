//! Adapter configuration.

use crate::error::AdapterError;
use serde::{Deserialize, Serialize};

/// Options controlling an [`EditorAdapter`](crate::EditorAdapter).
///
/// Missing fields take their default when deserializing, so `{}` is a valid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdapterOptions {
    /// Treat the first applied operation as a full-document snapshot.
    pub cold_start: bool,
    /// Reject incremental operations whose base length differs from the buffer.
    pub validate_base_length: bool,
    /// Label presence decorations with the participant's name.
    pub show_participant_names: bool,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            cold_start: true,
            validate_base_length: true,
            show_participant_names: true,
        }
    }
}

impl AdapterOptions {
    /// Parse options from JSON.
    pub fn from_json(json: &str) -> Result<Self, AdapterError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let options = AdapterOptions::from_json(r#"{"coldStart": false}"#).unwrap();
        assert_eq!(
            options,
            AdapterOptions {
                cold_start: false,
                ..AdapterOptions::default()
            }
        );
        assert_eq!(AdapterOptions::from_json("{}").unwrap(), AdapterOptions::default());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            AdapterOptions::from_json(r#"{"coldStart": "yes"}"#),
            Err(AdapterError::InvalidOptions(_))
        ));
    }
}
