use crate::errors::ModelResult;
use crate::exchange::EventExchange;
use crate::timestamp::Timestamp;
use crate::validation::{require_positive, Validate};
use serde::{Deserialize, Serialize};

/// Fields shared by every listing/exchange mapping request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingExchangeBaseMappingSchema {
    pub action_id: i64,
    pub listing_id: i64,
    pub exchange: EventExchange,
    #[serde(default)]
    pub full_sync: bool,
}

impl Validate for ListingExchangeBaseMappingSchema {
    fn validate(&self) -> ModelResult<()> {
        require_positive("action_id", self.action_id)?;
        require_positive("listing_id", self.listing_id)
    }
}

/// Create a mapping between a listing and its id on an exchange
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingExchangeMappingRequestSchema {
    #[serde(flatten)]
    pub base: ListingExchangeBaseMappingSchema,
    pub inventory_id: i64,
    pub external_id: i64,
    pub valid_from: Timestamp,
}

impl Validate for ListingExchangeMappingRequestSchema {
    fn validate(&self) -> ModelResult<()> {
        self.base.validate()?;
        require_positive("inventory_id", self.inventory_id)?;
        require_positive("external_id", self.external_id)
    }
}

/// Close an existing mapping
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateListingMappingRequestSchema {
    #[serde(flatten)]
    pub base: ListingExchangeBaseMappingSchema,
    pub inventory_id: i64,
    pub valid_to: Timestamp,
}

impl Validate for UpdateListingMappingRequestSchema {
    fn validate(&self) -> ModelResult<()> {
        self.base.validate()?;
        require_positive("inventory_id", self.inventory_id)
    }
}
