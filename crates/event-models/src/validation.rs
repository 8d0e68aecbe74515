/*!
# Record Validation

Field-level coercion happens during deserialization. Rules that span several
fields live in [`Validate`] implementations, and the `from_*` entry points
below run both steps so callers never hold a record that failed either.
*/

use crate::errors::{ModelError, ModelResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Cross-field rules for a record
pub trait Validate {
    fn validate(&self) -> ModelResult<()> {
        Ok(())
    }
}

/// Parse and validate a record from a JSON string
pub fn from_json<T>(json: &str) -> ModelResult<T>
where
    T: DeserializeOwned + Validate,
{
    let record: T = serde_json::from_str(json)?;
    record.validate()?;
    Ok(record)
}

/// Parse and validate a record from an already-decoded JSON value
pub fn from_value<T>(value: Value) -> ModelResult<T>
where
    T: DeserializeOwned + Validate,
{
    let record: T = serde_json::from_value(value)?;
    record.validate()?;
    Ok(record)
}

/// Parse and validate a record from a JSON byte slice
pub fn from_slice<T>(bytes: &[u8]) -> ModelResult<T>
where
    T: DeserializeOwned + Validate,
{
    let record: T = serde_json::from_slice(bytes)?;
    record.validate()?;
    Ok(record)
}

pub(crate) fn require_positive(field: &str, value: i64) -> ModelResult<()> {
    if value <= 0 {
        return Err(ModelError::invalid_field(
            field,
            format!("must be greater than 0, found {}", value),
        ));
    }
    Ok(())
}
