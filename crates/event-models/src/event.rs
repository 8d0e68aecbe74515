/*!
# Event Store Messages

Header carried by every scraped-event message, plus the archive message
derived from it once an event or venue will produce no more data.
*/

use crate::errors::{ModelError, ModelResult};
use crate::timestamp::Timestamp;
use crate::validation::Validate;
use serde::{Deserialize, Deserializer, Serialize};

// TODO: merge with ScrapType once consumers stop matching on both
string_enum! {
    /// Scraper that produced an event message
    pub enum EventSource {
        TicketmasterMap => "ticketmaster-map",
        TicketmasterFacet => "ticketmaster-facet",
        Vividseats => "vividseats",
        EvenueSeat => "evenue-seat",
        Stubhub => "stubhub",
        Tickpick => "tickpick",
        Gotickets => "gotickets",
        Milb => "milb",
        Mlb => "mlb",
        Playhousesquare => "playhousesquare",
        Telecharge => "telecharge",
        Mpv => "mpv",
        Etix => "etix",
        Eventim => "eventim",
    }
}

string_enum! {
    /// Store an event's data lands in
    pub enum EventStoreType {
        Ticketmaster => "ticketmaster",
        Vividseats => "vividseats",
        Evenue => "evenue",
        Tickpick => "tickpick",
        Stubhub => "stubhub",
        Gotickets => "gotickets",
        Milb => "milb",
        Mlb => "mlb",
        Playhousesquare => "playhousesquare",
        Telecharge => "telecharge",
        Mpv => "mpv",
        Etix => "etix",
        Eventim => "eventim",
    }
}

string_enum! {
    pub enum EventAction {
        Store => "store",
        Notify => "notify",
        /// No more data will arrive for this event or venue
        Archive => "archive",
        /// Store, comparing and possibly updating every column
        FullUpdate => "full-update",
    }
}

impl Default for EventAction {
    fn default() -> Self {
        EventAction::Store
    }
}

/// Header of an event message.
///
/// Keys are written in kebab-case; snake_case keys are accepted on input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageHeader {
    #[serde(rename = "event-message-id", alias = "event_message_id")]
    pub event_message_id: String,

    #[serde(rename = "event-source", alias = "event_source")]
    pub event_source: EventSource,

    /// Set by each source-specific producer
    #[serde(rename = "venue-id", alias = "venue_id", default)]
    pub venue_id: Option<String>,

    #[serde(rename = "event-id", alias = "event_id")]
    pub event_id: String,

    #[serde(rename = "event-action", alias = "event_action", default)]
    pub event_action: EventAction,

    /// Naive timestamps are read as UTC
    #[serde(
        rename = "event-timestamp",
        alias = "event_timestamp",
        default,
        deserialize_with = "deserialize_utc_timestamp"
    )]
    pub event_timestamp: Option<Timestamp>,

    #[serde(rename = "no-map", alias = "no_map", default = "default_flag")]
    pub no_map: Option<bool>,

    #[serde(rename = "not-found", alias = "not_found", default = "default_flag")]
    pub not_found: Option<bool>,

    #[serde(rename = "not-on-sale", alias = "not_on_sale", default = "default_flag")]
    pub not_on_sale: Option<bool>,
}

fn default_flag() -> Option<bool> {
    Some(false)
}

fn deserialize_utc_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Timestamp>::deserialize(deserializer)?.map(Timestamp::assume_utc))
}

impl MessageHeader {
    pub fn new(
        event_message_id: impl Into<String>,
        event_source: EventSource,
        event_id: impl Into<String>,
    ) -> Self {
        Self {
            event_message_id: event_message_id.into(),
            event_source,
            venue_id: None,
            event_id: event_id.into(),
            event_action: EventAction::default(),
            event_timestamp: None,
            no_map: default_flag(),
            not_found: default_flag(),
            not_on_sale: default_flag(),
        }
    }

    /// Build the archive message for this header.
    ///
    /// The archive message requires both a venue id and a timestamp.
    pub fn to_archive(&self) -> ModelResult<ArchiveMessage> {
        let venue_id = self.venue_id.clone().ok_or_else(|| {
            ModelError::Validation(format!(
                "message {}: venue-id is required to archive",
                self.event_message_id
            ))
        })?;
        let event_timestamp = self.event_timestamp.ok_or_else(|| {
            ModelError::Validation(format!(
                "message {}: event-timestamp is required to archive",
                self.event_message_id
            ))
        })?;

        Ok(ArchiveMessage {
            message_id: self.event_message_id.clone(),
            venue_id,
            event_id: self.event_id.clone(),
            event_timestamp,
        })
    }
}

impl Validate for MessageHeader {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventMessage {
    pub header: MessageHeader,
}

impl Validate for EventMessage {
    fn validate(&self) -> ModelResult<()> {
        self.header.validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchiveMessage {
    pub message_id: String,
    pub venue_id: String,
    #[serde(default)]
    pub event_id: String,
    pub event_timestamp: Timestamp,
}

impl Validate for ArchiveMessage {}
