/*!
# Scrape Trigger Messages

`JobRunMessage` asks a scraper to run; `JobScrapMessage` reports how the run
went.
*/

use crate::errors::{ModelError, ModelResult};
use crate::timestamp::Timestamp;
use crate::validation::Validate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

string_enum! {
    /// Kind of scrape job
    pub enum ScrapType {
        TicketmasterMap => "ticketmaster-map",
        TicketmasterFacet => "ticketmaster-facet",
        Vividseats => "vividseats",
        EvenueSeat => "evenue-seat",
        EvenueSection => "evenue-section",
        EvenuePrices => "evenue-prices",
        Stubhub => "stubhub",
        Tickpick => "tickpick",
        Gotickets => "gotickets",
        Milb => "milb",
        Mlb => "mlb",
        Gametime => "gametime",
        Playhousesquare => "playhousesquare",
        Telecharge => "telecharge",
        Mpv => "mpv",
        Etix => "etix",
        Eventim => "eventim",
    }
}

string_enum! {
    pub enum FailureReason {
        AccessDenied => "access_denied",
        ProxyError => "proxy_error",
        NotFound => "not_found",
        ScrapServiceOverload => "scrap_service_overload",
        DataIssue => "data_issue",
        ProcessServiceOverload => "process_service_overload",
        NoSections => "no_sections",
        NotOnSale => "not_on_sale",
        SoldOut => "sold_out",
        DataProcessError => "data_process_error",
        SeatsFoundWithNoMap => "seats_found_with_no_map",
        DataStorageError => "data_storage_error",
        DuplicatePlaceId => "duplicate_place_id",
        Timeout => "timeout",
        TriggerProcessError => "trigger_process_error",
        Default => "default",
    }
}

/// Request to run one scrape job
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRunMessage {
    #[serde(deserialize_with = "deserialize_uuid4")]
    pub job_run_id: Uuid,
    pub event_id: String,
    pub scrap_type: ScrapType,
    #[serde(default)]
    pub run_config: Option<Map<String, Value>>,
    #[serde(default)]
    pub retry: u32,
}

impl Validate for JobRunMessage {}

/// Outcome of one scrape job
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobScrapMessage {
    pub event_id: String,
    #[serde(deserialize_with = "deserialize_uuid4")]
    pub job_id: Uuid,
    #[serde(default)]
    pub scrap_type: Option<ScrapType>,
    #[serde(default)]
    pub job_scrap_started_at: Option<Timestamp>,
    #[serde(default)]
    pub job_scrap_finished_at: Option<Timestamp>,
    #[serde(default)]
    pub scrap_success: Option<bool>,
    #[serde(default)]
    pub failure_reason: Option<FailureReason>,
    #[serde(default)]
    pub scrap_notes: Option<Map<String, Value>>,
}

impl Validate for JobScrapMessage {
    fn validate(&self) -> ModelResult<()> {
        if self.scrap_success == Some(false) && self.failure_reason.is_none() {
            return Err(ModelError::Validation(
                "failure_reason must be provided if the job failed.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Deserialize a UUID and require it to be version 4
fn deserialize_uuid4<'de, D>(deserializer: D) -> Result<Uuid, D::Error>
where
    D: Deserializer<'de>,
{
    let uuid = Uuid::deserialize(deserializer)?;
    if uuid.get_version_num() != 4 {
        return Err(serde::de::Error::custom(format!(
            "expected a version 4 UUID, found version {}",
            uuid.get_version_num()
        )));
    }
    Ok(uuid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::from_value;
    use serde_json::json;

    #[test]
    fn test_job_run_defaults() {
        let id = Uuid::new_v4();
        let message: JobRunMessage = from_value(json!({
            "job_run_id": id.to_string(),
            "event_id": "E1",
            "scrap_type": "evenue-prices",
        }))
        .unwrap();

        assert_eq!(message.job_run_id, id);
        assert_eq!(message.scrap_type, ScrapType::EvenuePrices);
        assert_eq!(message.retry, 0);
        assert!(message.run_config.is_none());
    }

    #[test]
    fn test_job_run_rejects_negative_retry() {
        let result: ModelResult<JobRunMessage> = from_value(json!({
            "job_run_id": Uuid::new_v4().to_string(),
            "event_id": "E1",
            "scrap_type": "mlb",
            "retry": -1,
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_job_run_rejects_non_v4_uuid() {
        // version 1 UUID
        let result: ModelResult<JobRunMessage> = from_value(json!({
            "job_run_id": "c232ab00-9414-11ec-b3c8-9f6bdeced846",
            "event_id": "E1",
            "scrap_type": "mlb",
        }));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("version 4"));
    }

    #[test]
    fn test_job_run_keeps_run_config() {
        let message: JobRunMessage = from_value(json!({
            "job_run_id": Uuid::new_v4().to_string(),
            "event_id": "E1",
            "scrap_type": "ticketmaster-facet",
            "run_config": {"proxy": "residential", "depth": 2},
            "retry": 3,
        }))
        .unwrap();

        let config = message.run_config.unwrap();
        assert_eq!(config["proxy"], "residential");
        assert_eq!(message.retry, 3);
    }

    #[test]
    fn test_failed_scrap_requires_reason() {
        let result: ModelResult<JobScrapMessage> = from_value(json!({
            "event_id": "E1",
            "job_id": Uuid::new_v4().to_string(),
            "scrap_success": false,
        }));
        assert!(matches!(result, Err(ModelError::Validation(_))));

        let message: JobScrapMessage = from_value(json!({
            "event_id": "E1",
            "job_id": Uuid::new_v4().to_string(),
            "scrap_success": false,
            "failure_reason": "sold_out",
        }))
        .unwrap();
        assert_eq!(message.failure_reason, Some(FailureReason::SoldOut));
    }

    #[test]
    fn test_successful_or_unknown_scrap_needs_no_reason() {
        for success in [json!(true), json!(null)] {
            let message: JobScrapMessage = from_value(json!({
                "event_id": "E1",
                "job_id": Uuid::new_v4().to_string(),
                "scrap_success": success,
                "job_scrap_started_at": "2024-01-01T10:00:00",
                "job_scrap_finished_at": "2024-01-01T10:05:00+00:00",
            }))
            .unwrap();
            assert!(message.failure_reason.is_none());
            assert!(message.job_scrap_started_at < message.job_scrap_finished_at);
        }
    }

    #[test]
    fn test_failure_reason_wire_values() {
        assert_eq!(FailureReason::ALL.len(), 16);
        assert_eq!(
            FailureReason::SeatsFoundWithNoMap.as_str(),
            "seats_found_with_no_map"
        );
        assert_eq!(ScrapType::ALL.len(), 17);
        assert_eq!(ScrapType::EvenueSection.to_string(), "evenue-section");
    }
}
