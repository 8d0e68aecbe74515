/*!
# Event Models

Shared record shapes for the ticket resale pipeline.

## Purpose

This crate is the **single source of truth** for the messages exchanged
between pipeline services:

- **Scrape triggers** (`trigger`) → job run requests and job results
- **Event messages** (`event`) → headers of scraped event data, archive messages
- **Listing actions** (`action`, `mapping`) → listing sync actions, logs and
  exchange mappings
- **Availability** (`available`) → per-event availability snapshots and the
  positional cache codec

Field names and enum strings are wire contracts and must not change.

## Availability Cache Layout

The cache stores Ticketmaster availability as `place_id -> [values...]`.
Legacy arrays (7 or 8 values) remain readable but are never written; current
arrays carry 18 values plus an optional trailing update reason. See
[`available::ticketmaster`] for the field order.

## Usage

```rust
use event_models::{EventAvailabilitySnapshot, ModelResult, PlaceDict};
use serde_json::json;

fn example() -> ModelResult<()> {
    let mut cached = PlaceDict::new();
    cached.insert(
        "P1".to_string(),
        vec![
            json!("12.5"), json!(14.0), json!("offer-1"), json!("Standard"),
            json!([1, 2]), json!(false), json!("primary"), json!(null),
            json!("Floor A"), json!("A"), json!("3"), json!(3), json!(7),
            json!("7"), json!([]), json!([]), json!("2024-05-01T12:00:00+00:00"),
            json!(null),
        ],
    );

    let snapshot = EventAvailabilitySnapshot::from_place_dict("E1", &cached)?;
    assert_eq!(snapshot.place("P1").unwrap().list_price.to_string(), "12.50");

    let encoded = snapshot.to_place_dict()?;
    assert_eq!(encoded["P1"][0], json!("12.50"));
    Ok(())
}
# example().unwrap();
```
*/

#[macro_use]
mod macros;

pub mod action;
pub mod available;
pub mod errors;
pub mod event;
pub mod exchange;
pub mod mapping;
pub mod money;
pub mod timestamp;
pub mod trigger;
pub mod validation;

// Re-export main types for convenience
pub use action::{
    ActionData, ActionError, ActionErrorRequestSchema, ActionFilterReason, ActionLogSchema,
    ActionSchema, ActionStatus, ExchangeRule, ExchangeSyncConfigSchema, PriceMarkup, RuleType,
    SplitType,
};
pub use available::ticketmaster::{
    decode_place, DecodedPlace, EventAvailabilitySnapshot, PlaceAvailability, PlaceDict,
    PlaceLayout, PlaceRecord, PlaceValues, SchemaGeneration,
};
pub use errors::{ModelError, ModelResult};
pub use event::{ArchiveMessage, EventAction, EventMessage, EventSource, EventStoreType, MessageHeader};
pub use exchange::EventExchange;
pub use mapping::{
    ListingExchangeBaseMappingSchema, ListingExchangeMappingRequestSchema,
    UpdateListingMappingRequestSchema,
};
pub use timestamp::Timestamp;
pub use trigger::{FailureReason, JobRunMessage, JobScrapMessage, ScrapType};
pub use validation::{from_json, from_slice, from_value, Validate};
