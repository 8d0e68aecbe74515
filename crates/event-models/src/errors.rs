use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "Unexpected number of values for event {event_id}, place {place_id}: {length} - {values}"
    )]
    MalformedRecord {
        event_id: String,
        place_id: String,
        length: usize,
        values: String,
    },

    #[error(
        "Found {legacy_count} legacy schema values and {current_count} current schema values for event {event_id}"
    )]
    MixedSchemaGeneration {
        event_id: String,
        legacy_count: usize,
        current_count: usize,
    },

    #[error("{event_id}: legacy schema snapshot cannot be encoded")]
    UnsupportedEncoding { event_id: String },

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ModelError {
    pub(crate) fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ModelError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
