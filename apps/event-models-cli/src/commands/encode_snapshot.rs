use super::write_output;
use crate::config::CliConfig;
use crate::error::CliResult;
use event_models::EventAvailabilitySnapshot;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Encode a list of structured place records into the cache form
pub fn execute(
    config: &CliConfig,
    event_id: String,
    input: PathBuf,
    output: Option<PathBuf>,
) -> CliResult<()> {
    info!("Encoding availability for event {} from {}", event_id, input.display());

    let contents = fs::read_to_string(&input)?;
    let records: Vec<Value> = serde_json::from_str(&contents)?;
    let snapshot = EventAvailabilitySnapshot::from_place_records(&event_id, records)?;
    let cached = snapshot.to_place_dict()?;

    info!("Encoded {} places", cached.len());

    write_output(config, &cached, output.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use event_models::{ModelError, PlaceDict};
    use serde_json::json;
    use tempfile::TempDir;

    fn config() -> CliConfig {
        CliConfig {
            log_level: "warn".to_string(),
            pretty: true,
        }
    }

    fn record(place_id: &str) -> Value {
        json!({
            "place_id": place_id,
            "list_price": 2.675,
            "total_price": "30",
            "offer_id": "o1",
            "offer_name": "Standard",
            "sellable_quantities": [2],
            "inventory_type": "primary",
            "section": "101",
            "row": "F",
            "row_rank": 6,
            "seat_rank": 12,
            "seat_number": "12",
            "inserted": "2024-05-01T12:00:00",
        })
    }

    #[test]
    fn test_encode_records_to_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("records.json");
        let output = dir.path().join("cached.json");
        fs::write(&input, json!([record("P1"), record("P2")]).to_string()).unwrap();

        execute(&config(), "E1".to_string(), input, Some(output.clone())).unwrap();

        let cached: PlaceDict = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(cached.len(), 2);
        let row = &cached["P1"];
        assert_eq!(row.len(), 18);
        assert_eq!(row[0], json!("2.67"));
        assert_eq!(row[1], json!("30.00"));
        assert_eq!(row[5], json!(false));
        assert_eq!(row[16], json!("2024-05-01T12:00:00"));
    }

    #[test]
    fn test_encode_requires_inserted() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("records.json");
        let mut legacy_style = record("P1");
        legacy_style
            .as_object_mut()
            .unwrap()
            .remove("inserted");
        fs::write(&input, json!([legacy_style]).to_string()).unwrap();

        let result = execute(&config(), "E1".to_string(), input, None);
        assert!(matches!(
            result,
            Err(CliError::Model(ModelError::InvalidField { .. }))
        ));
    }

    #[test]
    fn test_encode_rejects_non_list_input() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("records.json");
        fs::write(&input, json!({"P1": []}).to_string()).unwrap();

        let result = execute(&config(), "E1".to_string(), input, None);
        assert!(matches!(result, Err(CliError::Json(_))));
    }
}
