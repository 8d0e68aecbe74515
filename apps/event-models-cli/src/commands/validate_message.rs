use crate::config::CliConfig;
use crate::error::CliResult;
use clap::ValueEnum;
use event_models::{
    from_value, ActionErrorRequestSchema, ActionLogSchema, ActionSchema, EventMessage,
    ExchangeSyncConfigSchema, JobRunMessage, JobScrapMessage, ListingExchangeMappingRequestSchema,
    UpdateListingMappingRequestSchema, Validate,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Record kinds accepted by `validate --kind`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageKind {
    EventMessage,
    JobRun,
    JobScrap,
    Action,
    ActionLog,
    ActionError,
    ExchangeSyncConfig,
    MappingRequest,
    UpdateMapping,
}

impl MessageKind {
    /// Parse and validate one record, returning its canonical JSON form
    pub fn check(self, value: Value) -> CliResult<Value> {
        match self {
            MessageKind::EventMessage => canonical::<EventMessage>(value),
            MessageKind::JobRun => canonical::<JobRunMessage>(value),
            MessageKind::JobScrap => canonical::<JobScrapMessage>(value),
            MessageKind::Action => canonical::<ActionSchema>(value),
            MessageKind::ActionLog => canonical::<ActionLogSchema>(value),
            MessageKind::ActionError => canonical::<ActionErrorRequestSchema>(value),
            MessageKind::ExchangeSyncConfig => canonical::<ExchangeSyncConfigSchema>(value),
            MessageKind::MappingRequest => canonical::<ListingExchangeMappingRequestSchema>(value),
            MessageKind::UpdateMapping => canonical::<UpdateListingMappingRequestSchema>(value),
        }
    }
}

fn canonical<T>(value: Value) -> CliResult<Value>
where
    T: DeserializeOwned + Validate + Serialize,
{
    let record: T = from_value(value)?;
    Ok(serde_json::to_value(&record)?)
}

/// Validate a single record or a JSON array of records of one kind
pub fn execute(config: &CliConfig, kind: MessageKind, input: PathBuf) -> CliResult<()> {
    info!("Validating {:?} records from {}", kind, input.display());

    let canonical = validate_file(kind, &input)?;

    println!("{}", config.render(&canonical)?);
    println!("✅ {} record(s) valid", canonical.len());
    Ok(())
}

/// Canonical form of every record in `input`, failing on the first invalid one
pub fn validate_file(kind: MessageKind, input: &Path) -> CliResult<Vec<Value>> {
    let contents = fs::read_to_string(input)?;
    let records = match serde_json::from_str::<Value>(&contents)? {
        Value::Array(items) => items,
        single => vec![single],
    };

    let mut canonical = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match kind.check(record) {
            Ok(value) => canonical.push(value),
            Err(e) => {
                warn!("Record {} failed validation: {}", index, e);
                return Err(e);
            }
        }
    }
    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use event_models::ModelError;
    use serde_json::json;
    use tempfile::TempDir;

    fn mapping_request(listing_id: i64) -> Value {
        json!({
            "action_id": 1,
            "listing_id": listing_id,
            "exchange": "Ticketmaster",
            "inventory_id": 3,
            "external_id": 4,
            "valid_from": "2023-10-01T12:00:00",
        })
    }

    fn config() -> CliConfig {
        CliConfig {
            log_level: "warn".to_string(),
            pretty: false,
        }
    }

    #[test]
    fn test_action_log_sync_time_rule() {
        let result = MessageKind::ActionLog.check(json!({
            "action_id": 1,
            "action_exchange": "StubHub",
            "synced": true,
        }));
        assert!(matches!(
            result,
            Err(CliError::Model(ModelError::Validation(_)))
        ));
    }

    #[test]
    fn test_job_run_canonical_form() {
        let value = MessageKind::JobRun
            .check(json!({
                "job_run_id": "4f5b6c2e-8a1d-4c3b-9e7f-0a1b2c3d4e5f",
                "event_id": "E1",
                "scrap_type": "ticketmaster-map",
            }))
            .unwrap();
        assert_eq!(value["retry"], json!(0));
    }

    #[test]
    fn test_wrong_shape_is_json_error() {
        let result = MessageKind::MappingRequest.check(json!("not an object"));
        assert!(matches!(
            result,
            Err(CliError::Model(ModelError::Json(_)))
        ));
    }

    #[test]
    fn test_validate_file_single_record() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("request.json");
        fs::write(&input, mapping_request(2).to_string()).unwrap();

        let canonical = validate_file(MessageKind::MappingRequest, &input).unwrap();
        assert_eq!(canonical.len(), 1);
        assert_eq!(canonical[0]["full_sync"], json!(false));
        assert_eq!(canonical[0]["valid_from"], json!("2023-10-01T12:00:00"));

        execute(&config(), MessageKind::MappingRequest, input).unwrap();
    }

    #[test]
    fn test_validate_file_array_of_records() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("requests.json");
        fs::write(
            &input,
            json!([mapping_request(2), mapping_request(5)]).to_string(),
        )
        .unwrap();

        let canonical = validate_file(MessageKind::MappingRequest, &input).unwrap();
        assert_eq!(canonical.len(), 2);
        assert_eq!(canonical[1]["listing_id"], json!(5));
    }

    #[test]
    fn test_validate_file_stops_at_invalid_record() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("requests.json");
        fs::write(
            &input,
            json!([mapping_request(2), mapping_request(0)]).to_string(),
        )
        .unwrap();

        let result = execute(&config(), MessageKind::MappingRequest, input);
        assert!(matches!(
            result,
            Err(CliError::Model(ModelError::InvalidField { .. }))
        ));
    }
}
