/*!
# Listing Actions

Actions describe listing changes to be synced to secondary exchanges. The
action log records the outcome of syncing one action to one exchange.
*/

use crate::errors::{ModelError, ModelResult};
use crate::exchange::EventExchange;
use crate::money::{deserialize_exact_price, quantize};
use crate::timestamp::Timestamp;
use crate::validation::Validate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Per-exchange markup; exchanges without an entry have zero markup
pub type PriceMarkup = BTreeMap<EventExchange, Decimal>;

string_enum! {
    pub enum SplitType {
        Custom => "CUSTOM",
        Any => "ANY",
    }
}

string_enum! {
    /// Listing lifecycle status, shared with the listing service
    pub enum ActionStatus {
        Active => "ACTIVE",
        Removed => "REMOVED",
        Updated => "UPDATED",
        Blacklisted => "BLACKLISTED",
        PartiallySold => "PARTIALLY_SOLD",
        Sold => "SOLD",
        Finished => "FINISHED",
        Expired => "EXPIRED",
        Inactive => "INACTIVE",
        DisabledSale => "DISABLED_SALE",
    }
}

impl ActionStatus {
    /// Statuses an [`ActionSchema`] may carry
    pub const ACTIONABLE: &'static [ActionStatus] = &[
        ActionStatus::Active,
        ActionStatus::Updated,
        ActionStatus::Removed,
    ];

    pub fn is_actionable(&self) -> bool {
        Self::ACTIONABLE.contains(self)
    }
}

string_enum! {
    pub enum ActionError {
        MissingMapping => "MISSING_MAPPING",
        ApiError => "API_ERROR",
        ProcessError => "PROCESS_ERROR",
        UnknownError => "UNKNOWN_ERROR",
        DependentError => "DEPENDENT_ERROR",
    }
}

string_enum! {
    pub enum RuleType {
        Include => "include",
        Exclude => "exclude",
    }
}

string_enum! {
    /// Why an action was not synced to an exchange
    pub enum ActionFilterReason {
        ExchangeRule => "exchange_rule",
        DateFilter => "date_filter",
        MaxListingsLimit => "max_listings_limit",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExchangeRule {
    pub exchange: EventExchange,
    pub rule_type: RuleType,
    pub rule_ids: Vec<i64>,
}

impl Validate for ExchangeRule {}

/// Sync window and markup for one exchange
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExchangeSyncConfigSchema {
    pub exchange: EventExchange,
    pub listings_from: Timestamp,
    pub listings_to: Timestamp,
    pub listings_limit: Option<i64>,
    /// Quantized to 0.01
    #[serde(deserialize_with = "deserialize_exact_price")]
    pub price_markup: Decimal,
}

impl ExchangeSyncConfigSchema {
    pub fn new(
        exchange: EventExchange,
        listings_from: Timestamp,
        listings_to: Timestamp,
        listings_limit: Option<i64>,
        price_markup: Decimal,
    ) -> Self {
        Self {
            exchange,
            listings_from,
            listings_to,
            listings_limit,
            price_markup: quantize(price_markup),
        }
    }
}

impl Validate for ExchangeSyncConfigSchema {}

/// Listing payload attached to an action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionData {
    /// Source identifier
    pub source_id: String,
    /// Local date and time of the event
    pub local_datetime: Timestamp,
    pub listing_id: i64,
    pub inventory_id: i64,
    /// Seating section
    pub section: String,
    /// Seating row
    pub row: String,
    /// Seat numbers
    pub seats: Vec<String>,
    pub internal_notes: String,
    #[serde(default)]
    pub ticket_description: Option<String>,
    pub public_notes: String,
    /// Quantity of tickets
    pub quantity: i64,
    pub tags: Vec<String>,
    pub listing_price: Decimal,
    pub original_price: Decimal,
    pub split_type: SplitType,
    /// Custom split configuration; accepts `"2,4"` or `[2, 4]`
    #[serde(deserialize_with = "deserialize_split_value")]
    pub split_value: Vec<i64>,
    #[serde(default)]
    pub price_markup: PriceMarkup,
}

impl ActionData {
    /// Markup for an exchange, zero when none is configured
    pub fn markup_for(&self, exchange: EventExchange) -> Decimal {
        self.price_markup
            .get(&exchange)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

impl Validate for ActionData {}

/// Parse a comma-separated split list; blank entries are skipped
pub fn parse_split_value(value: &str) -> ModelResult<Vec<i64>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>().map_err(|e| {
                ModelError::invalid_field("split_value", format!("'{}': {}", part, e))
            })
        })
        .collect()
}

fn deserialize_split_value<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SplitValue {
        Text(String),
        List(Vec<i64>),
    }

    match SplitValue::deserialize(deserializer)? {
        SplitValue::Text(text) => parse_split_value(&text).map_err(serde::de::Error::custom),
        SplitValue::List(list) => Ok(list),
    }
}

/// A listing action to be synced to exchanges
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionSchema {
    pub action_id: i64,
    #[serde(default)]
    pub action_exchange_id: Option<i64>,
    /// One of ACTIVE, UPDATED or REMOVED
    pub action: ActionStatus,
    pub created: Timestamp,
    pub origin_id: i64,
    #[serde(default)]
    pub exchange: Option<EventExchange>,
    #[serde(default)]
    pub new_id: Option<i64>,
    #[serde(default)]
    pub external_id: Option<i64>,
    #[serde(default)]
    pub inventory_id: Option<i64>,
    #[serde(default)]
    pub dependent_to: Option<i64>,
    #[serde(default)]
    pub post_dependency: Option<i64>,
    #[serde(default)]
    pub data: Option<ActionData>,
    #[serde(default)]
    pub exchange_rules: Option<BTreeMap<EventExchange, RuleType>>,
    #[serde(default = "empty_map")]
    pub external_mapping: Option<BTreeMap<EventExchange, i64>>,
    /// Per-exchange sync configuration
    #[serde(default = "empty_map")]
    pub exchange_config: Option<BTreeMap<EventExchange, ExchangeSyncConfigSchema>>,
    /// Per-exchange counts
    #[serde(default)]
    pub exchange_count: BTreeMap<EventExchange, i64>,
}

fn empty_map<V>() -> Option<BTreeMap<EventExchange, V>> {
    Some(BTreeMap::new())
}

impl Validate for ActionSchema {
    fn validate(&self) -> ModelResult<()> {
        if !self.action.is_actionable() {
            return Err(ModelError::invalid_field(
                "action",
                format!(
                    "must be one of ACTIVE, UPDATED, REMOVED, found {}",
                    self.action
                ),
            ));
        }
        Ok(())
    }
}

/// Result of syncing one action to one exchange
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionLogSchema {
    pub action_id: i64,
    #[serde(default)]
    pub action_exchange_id: Option<i64>,
    pub action_exchange: EventExchange,
    #[serde(default)]
    pub sync_time: Option<Timestamp>,
    #[serde(default)]
    pub sync_started: Option<Timestamp>,
    pub synced: bool,
    #[serde(default = "default_retryable")]
    pub retryable: bool,
    #[serde(default)]
    pub error: Option<BTreeMap<Timestamp, String>>,
    #[serde(default)]
    pub error_code: Option<ActionError>,
    #[serde(default)]
    pub filter: Option<Vec<ActionFilterReason>>,
    #[serde(default)]
    pub dependent_on: Option<i64>,
    #[serde(default)]
    pub dependent_to: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_retryable() -> bool {
    true
}

impl ActionLogSchema {
    /// Log entry for an action that reached the exchange
    pub fn synced(action_id: i64, action_exchange: EventExchange, sync_time: Timestamp) -> Self {
        Self::blank(action_id, action_exchange, true, Some(sync_time))
    }

    /// Log entry for an action that has not (yet) reached the exchange
    pub fn unsynced(action_id: i64, action_exchange: EventExchange) -> Self {
        Self::blank(action_id, action_exchange, false, None)
    }

    fn blank(
        action_id: i64,
        action_exchange: EventExchange,
        synced: bool,
        sync_time: Option<Timestamp>,
    ) -> Self {
        Self {
            action_id,
            action_exchange_id: None,
            action_exchange,
            sync_time,
            sync_started: None,
            synced,
            retryable: default_retryable(),
            error: None,
            error_code: None,
            filter: None,
            dependent_on: None,
            dependent_to: None,
            notes: None,
        }
    }
}

impl Validate for ActionLogSchema {
    fn validate(&self) -> ModelResult<()> {
        match (self.synced, self.sync_time.is_some()) {
            (true, false) => Err(ModelError::Validation(
                "Sync time is required when sync is set to True".to_string(),
            )),
            (false, true) => Err(ModelError::Validation(
                "Sync time cannot be set when sync is set to False".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionErrorRequestSchema {
    pub action_id: i64,
    pub error: String,
    pub error_code: ActionError,
}

impl Validate for ActionErrorRequestSchema {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::from_value;
    use rust_decimal::prelude::*;
    use serde_json::{json, Value};

    fn action_data_json(split_value: Value) -> Value {
        json!({
            "source_id": "tm-123",
            "local_datetime": "2024-08-10T19:30:00",
            "listing_id": 11,
            "inventory_id": 22,
            "section": "101",
            "row": "F",
            "seats": ["5", "6"],
            "internal_notes": "",
            "public_notes": "Aisle",
            "quantity": 2,
            "tags": ["vip"],
            "listing_price": "150.00",
            "original_price": 120,
            "split_type": "CUSTOM",
            "split_value": split_value,
            "price_markup": {"StubHub": "5.5"},
        })
    }

    #[test]
    fn test_split_value_from_string() {
        let data: ActionData = from_value(action_data_json(json!("2, 4,,6"))).unwrap();
        assert_eq!(data.split_value, vec![2, 4, 6]);

        let data: ActionData = from_value(action_data_json(json!("  "))).unwrap();
        assert!(data.split_value.is_empty());

        let data: ActionData = from_value(action_data_json(json!([1, 2]))).unwrap();
        assert_eq!(data.split_value, vec![1, 2]);
    }

    #[test]
    fn test_split_value_rejects_garbage() {
        let result: ModelResult<ActionData> = from_value(action_data_json(json!("2,x")));
        assert!(result.is_err());
        assert!(parse_split_value("1,two").is_err());
    }

    #[test]
    fn test_price_markup_defaults_to_zero() {
        let data: ActionData = from_value(action_data_json(json!("2"))).unwrap();
        assert_eq!(data.markup_for(EventExchange::StubHub), dec!(5.5));
        assert_eq!(data.markup_for(EventExchange::Viagogo), Decimal::ZERO);
        assert_eq!(data.original_price, dec!(120));
        assert!(data.ticket_description.is_none());
    }

    #[test]
    fn test_exchange_sync_config_quantizes_markup() {
        let config: ExchangeSyncConfigSchema = from_value(json!({
            "exchange": "Vividseats",
            "listings_from": "2024-01-01T00:00:00+00:00",
            "listings_to": "2024-02-01T00:00:00+00:00",
            "listings_limit": null,
            "price_markup": 1.005,
        }))
        .unwrap();
        // 1.005 is stored as 1.00499999..., so it rounds down
        assert_eq!(config.price_markup.to_string(), "1.00");

        let built = ExchangeSyncConfigSchema::new(
            EventExchange::Seatgeek,
            config.listings_from,
            config.listings_to,
            Some(50),
            dec!(3),
        );
        assert_eq!(built.price_markup.to_string(), "3.00");

        // string markups keep their decimal digits
        let config: ExchangeSyncConfigSchema = from_value(json!({
            "exchange": "Vividseats",
            "listings_from": "2024-01-01T00:00:00+00:00",
            "listings_to": "2024-02-01T00:00:00+00:00",
            "price_markup": "2.675",
        }))
        .unwrap();
        assert_eq!(config.price_markup.to_string(), "2.68");
    }

    #[test]
    fn test_action_defaults() {
        let action: ActionSchema = from_value(json!({
            "action_id": 1,
            "action": "ACTIVE",
            "created": "2024-01-01T00:00:00Z",
            "origin_id": 9,
        }))
        .unwrap();

        assert_eq!(action.external_mapping, Some(BTreeMap::new()));
        assert_eq!(action.exchange_config, Some(BTreeMap::new()));
        assert!(action.exchange_count.is_empty());
        assert!(action.exchange_rules.is_none());
        assert!(action.data.is_none());
    }

    #[test]
    fn test_action_status_is_restricted() {
        for status in ["SOLD", "EXPIRED", "BLACKLISTED"] {
            let result: ModelResult<ActionSchema> = from_value(json!({
                "action_id": 1,
                "action": status,
                "created": "2024-01-01T00:00:00Z",
                "origin_id": 9,
            }));
            assert!(matches!(result, Err(ModelError::InvalidField { .. })));
        }
    }

    #[test]
    fn test_action_exchange_maps() {
        let action: ActionSchema = from_value(json!({
            "action_id": 1,
            "action": "UPDATED",
            "created": "2024-01-01T00:00:00Z",
            "origin_id": 9,
            "exchange_rules": {"StubHub": "exclude"},
            "external_mapping": {"Viagogo": 77},
            "exchange_count": {"Tickpick": 3},
            "exchange_config": {
                "Gametime": {
                    "exchange": "Gametime",
                    "listings_from": "2024-01-01T00:00:00",
                    "listings_to": "2024-01-31T00:00:00",
                    "listings_limit": 10,
                    "price_markup": "2",
                }
            },
        }))
        .unwrap();

        assert_eq!(
            action.exchange_rules.unwrap()[&EventExchange::StubHub],
            RuleType::Exclude
        );
        assert_eq!(action.external_mapping.unwrap()[&EventExchange::Viagogo], 77);
        assert_eq!(action.exchange_count[&EventExchange::Tickpick], 3);
        let config = &action.exchange_config.unwrap()[&EventExchange::Gametime];
        assert_eq!(config.price_markup.to_string(), "2.00");
    }

    #[test]
    fn test_action_log_sync_time_rules() {
        let ok = from_value::<ActionLogSchema>(json!({
            "action_id": 1,
            "action_exchange": "StubHub",
            "synced": true,
            "sync_time": "2024-01-01T00:00:00Z",
        }))
        .unwrap();
        assert!(ok.retryable);

        let missing = from_value::<ActionLogSchema>(json!({
            "action_id": 1,
            "action_exchange": "StubHub",
            "synced": true,
        }));
        assert!(missing.unwrap_err().to_string().contains("required"));

        let forbidden = from_value::<ActionLogSchema>(json!({
            "action_id": 1,
            "action_exchange": "StubHub",
            "synced": false,
            "sync_time": "2024-01-01T00:00:00Z",
        }));
        assert!(forbidden.unwrap_err().to_string().contains("cannot be set"));

        let pending = from_value::<ActionLogSchema>(json!({
            "action_id": 1,
            "action_exchange": "StubHub",
            "synced": false,
        }))
        .unwrap();
        assert!(pending.sync_time.is_none());
    }

    #[test]
    fn test_action_log_constructors_validate() {
        let ts: Timestamp = "2024-01-01T00:00:00Z".parse().unwrap();
        assert!(ActionLogSchema::synced(1, EventExchange::Mlb, ts)
            .validate()
            .is_ok());
        assert!(ActionLogSchema::unsynced(1, EventExchange::Mlb)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_action_log_error_map_keys() {
        let log: ActionLogSchema = from_value(json!({
            "action_id": 5,
            "action_exchange": "etix",
            "synced": false,
            "retryable": false,
            "error": {"2024-01-01T00:00:00": "timeout", "2024-01-02T00:00:00+00:00": "502"},
            "error_code": "API_ERROR",
            "filter": ["date_filter", "exchange_rule"],
        }))
        .unwrap();

        let errors = log.error.as_ref().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.values().next().unwrap(), "timeout");
        assert_eq!(log.error_code, Some(ActionError::ApiError));

        let value = serde_json::to_value(&log).unwrap();
        assert_eq!(value["error"]["2024-01-01T00:00:00"], "timeout");
        assert_eq!(value["error"]["2024-01-02T00:00:00+00:00"], "502");
    }

    #[test]
    fn test_action_error_request() {
        let request: ActionErrorRequestSchema = from_value(json!({
            "action_id": 3,
            "error": "mapping missing for StubHub",
            "error_code": "MISSING_MAPPING",
        }))
        .unwrap();
        assert_eq!(request.error_code, ActionError::MissingMapping);
    }
}
