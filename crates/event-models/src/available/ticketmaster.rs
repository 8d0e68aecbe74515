/*!
# Ticketmaster Availability Codec

The availability cache stores each event as `place_id -> [values...]`, a
positional array whose layout has changed over time:

| Layout | Length | Fields |
|--------|--------|--------|
| Legacy | 7 | `list_price, total_price, offer_id, offer_name, sellable_quantities, protected, inventory_type` |
| Legacy GA | 8 | legacy fields + `count` |
| Current | 18 | legacy GA fields + `full_section, section, row, row_rank, seat_rank, seat_number, attributes, description, inserted, prev_updated` |
| Current with reason | 19 | current fields + `update_reason` |

Both generations are readable. Only the current generation is ever written:
a snapshot decoded from legacy arrays refuses to encode, and a snapshot must
never mix generations.
*/

use crate::errors::{ModelError, ModelResult};
use crate::money::{deserialize_price, parse_price, quantize};
use crate::timestamp::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{debug, warn};

pub const LEGACY_SCHEMA_LEN: usize = 7;
pub const LEGACY_GA_SCHEMA_LEN: usize = 8;
pub const CURRENT_SCHEMA_LEN: usize = 18;
pub const CURRENT_SCHEMA_WITH_REASON_LEN: usize = 19;

/// Positional values of one place as stored in the cache
pub type PlaceValues = Vec<Value>;

/// Cache form of one event: place id to positional values
pub type PlaceDict = BTreeMap<String, PlaceValues>;

// ================================================================================================
// Positional Layout
// ================================================================================================

/// Which generation of the positional layout a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaGeneration {
    Legacy,
    Current,
}

/// Concrete positional layout, resolved from the array length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceLayout {
    Legacy,
    LegacyGeneralAdmission,
    Current,
    CurrentWithReason,
}

impl PlaceLayout {
    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            LEGACY_SCHEMA_LEN => Some(PlaceLayout::Legacy),
            LEGACY_GA_SCHEMA_LEN => Some(PlaceLayout::LegacyGeneralAdmission),
            CURRENT_SCHEMA_LEN => Some(PlaceLayout::Current),
            CURRENT_SCHEMA_WITH_REASON_LEN => Some(PlaceLayout::CurrentWithReason),
            _ => None,
        }
    }

    pub fn generation(&self) -> SchemaGeneration {
        match self {
            PlaceLayout::Legacy | PlaceLayout::LegacyGeneralAdmission => SchemaGeneration::Legacy,
            PlaceLayout::Current | PlaceLayout::CurrentWithReason => SchemaGeneration::Current,
        }
    }
}

// ================================================================================================
// Records
// ================================================================================================

/// Sellable state of one place at a point in time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceAvailability {
    #[serde(deserialize_with = "deserialize_price")]
    pub list_price: Decimal,
    #[serde(deserialize_with = "deserialize_price")]
    pub total_price: Decimal,
    #[serde(default)]
    pub offer_id: Option<String>,
    pub offer_name: String,
    #[serde(default)]
    pub sellable_quantities: Option<Vec<i64>>,
    pub protected: bool,
    pub inventory_type: String,
    /// Set for general admission offers only
    #[serde(default)]
    pub count: Option<i64>,

    // Absent on places decoded from the legacy layout
    #[serde(default)]
    pub full_section: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub row: Option<String>,
    #[serde(default)]
    pub row_rank: Option<i64>,
    #[serde(default)]
    pub seat_rank: Option<i64>,
    #[serde(default)]
    pub seat_number: Option<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub description: Vec<String>,
    /// Legacy places need an availability lookup before this is known
    #[serde(default)]
    pub inserted: Option<Timestamp>,
    #[serde(default)]
    pub prev_updated: Option<Timestamp>,
    #[serde(default)]
    pub update_reason: Option<String>,
}

impl PlaceAvailability {
    /// Place with only the always-present fields set; prices are quantized.
    pub fn new(
        list_price: Decimal,
        total_price: Decimal,
        offer_name: impl Into<String>,
        protected: bool,
        inventory_type: impl Into<String>,
    ) -> Self {
        Self {
            list_price: quantize(list_price),
            total_price: quantize(total_price),
            offer_id: None,
            offer_name: offer_name.into(),
            sellable_quantities: None,
            protected,
            inventory_type: inventory_type.into(),
            count: None,
            full_section: None,
            section: None,
            row: None,
            row_rank: None,
            seat_rank: None,
            seat_number: None,
            attributes: Vec::new(),
            description: Vec::new(),
            inserted: None,
            prev_updated: None,
            update_reason: None,
        }
    }

    /// Encode into the current positional layout.
    ///
    /// Emits 18 values, or 19 when an update reason is set.
    pub fn to_values(&self, place_id: &str) -> ModelResult<PlaceValues> {
        let inserted = self.inserted.ok_or_else(|| {
            ModelError::invalid_field(
                field_path(place_id, 16, "inserted"),
                "required by the current layout",
            )
        })?;

        let mut values = Vec::with_capacity(CURRENT_SCHEMA_WITH_REASON_LEN);
        values.push(Value::String(quantize(self.list_price).to_string()));
        values.push(Value::String(quantize(self.total_price).to_string()));
        values.push(opt_string_value(&self.offer_id));
        values.push(Value::String(self.offer_name.clone()));
        values.push(match &self.sellable_quantities {
            Some(quantities) => Value::from(quantities.clone()),
            None => Value::Null,
        });
        values.push(Value::Bool(self.protected));
        values.push(Value::String(self.inventory_type.clone()));
        values.push(opt_int_value(self.count));
        values.push(opt_string_value(&self.full_section));
        values.push(opt_string_value(&self.section));
        values.push(opt_string_value(&self.row));
        values.push(opt_int_value(self.row_rank));
        values.push(opt_int_value(self.seat_rank));
        values.push(opt_string_value(&self.seat_number));
        values.push(Value::from(self.attributes.clone()));
        values.push(Value::from(self.description.clone()));
        values.push(Value::String(inserted.to_string()));
        values.push(match self.prev_updated {
            Some(ts) => Value::String(ts.to_string()),
            None => Value::Null,
        });

        if let Some(reason) = self.update_reason.as_deref().filter(|r| !r.is_empty()) {
            values.push(Value::String(reason.to_string()));
        }

        Ok(values)
    }
}

/// A structured place as sent by producers, keyed by its own place id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceRecord {
    pub place_id: String,
    #[serde(flatten)]
    pub availability: PlaceAvailability,
}

/// A decoded place tagged with the generation of the array it came from
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedPlace {
    Legacy(PlaceAvailability),
    Current(PlaceAvailability),
}

impl DecodedPlace {
    pub fn generation(&self) -> SchemaGeneration {
        match self {
            DecodedPlace::Legacy(_) => SchemaGeneration::Legacy,
            DecodedPlace::Current(_) => SchemaGeneration::Current,
        }
    }

    pub fn into_inner(self) -> PlaceAvailability {
        match self {
            DecodedPlace::Legacy(place) | DecodedPlace::Current(place) => place,
        }
    }
}

// ================================================================================================
// Snapshot
// ================================================================================================

/// Full availability state of one event.
///
/// Every place in a snapshot comes from the same layout generation. Snapshots
/// are never modified after construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "SnapshotFields")]
pub struct EventAvailabilitySnapshot {
    event_id: String,
    places: BTreeMap<String, PlaceAvailability>,
    #[serde(rename = "old_schema")]
    is_legacy_schema: bool,
}

/// Structured form as read from JSON, before the generation check
#[derive(Deserialize)]
struct SnapshotFields {
    event_id: String,
    places: BTreeMap<String, PlaceAvailability>,
    #[serde(rename = "old_schema", alias = "is_legacy_schema")]
    is_legacy_schema: bool,
}

impl TryFrom<SnapshotFields> for EventAvailabilitySnapshot {
    type Error = ModelError;

    /// Current snapshots need `inserted` on every place; legacy places never carry it
    fn try_from(fields: SnapshotFields) -> ModelResult<Self> {
        for (place_id, place) in &fields.places {
            match (fields.is_legacy_schema, place.inserted.is_some()) {
                (false, false) => {
                    return Err(ModelError::Validation(format!(
                        "{}: current schema place {} has no inserted timestamp",
                        fields.event_id, place_id
                    )))
                }
                (true, true) => {
                    return Err(ModelError::Validation(format!(
                        "{}: legacy schema place {} carries an inserted timestamp",
                        fields.event_id, place_id
                    )))
                }
                _ => {}
            }
        }

        Ok(Self {
            event_id: fields.event_id,
            places: fields.places,
            is_legacy_schema: fields.is_legacy_schema,
        })
    }
}

impl EventAvailabilitySnapshot {
    /// Decode the cache form of an event.
    ///
    /// # Errors
    ///
    /// * `MalformedRecord` - a place array has none of the known lengths
    /// * `MixedSchemaGeneration` - legacy and current arrays appear together
    /// * `InvalidField` - a value cannot be coerced to its field's type
    pub fn from_place_dict<I, K, V>(event_id: &str, input: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<[Value]>,
    {
        let mut places = BTreeMap::new();
        let mut legacy_count = 0usize;
        let mut current_count = 0usize;

        for (place_id, values) in input {
            let place_id = place_id.into();
            let decoded = decode_place(event_id, &place_id, values.as_ref())?;

            match decoded.generation() {
                SchemaGeneration::Legacy => legacy_count += 1,
                SchemaGeneration::Current => current_count += 1,
            }
            places.insert(place_id, decoded.into_inner());
        }

        if legacy_count > 0 && current_count > 0 {
            return Err(ModelError::MixedSchemaGeneration {
                event_id: event_id.to_string(),
                legacy_count,
                current_count,
            });
        }

        debug!(
            "Decoded {} places for event {} ({} legacy, {} current)",
            places.len(),
            event_id,
            legacy_count,
            current_count
        );

        Ok(Self {
            event_id: event_id.to_string(),
            places,
            is_legacy_schema: legacy_count > 0,
        })
    }

    /// Build a snapshot from structured per-place records.
    ///
    /// Each record must serialize to an object carrying a `place_id`. A missing
    /// or null `protected` flag defaults to `false`. When two records share a
    /// place id the later one wins.
    pub fn from_place_records<I, T>(event_id: &str, records: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Serialize,
    {
        let mut places = BTreeMap::new();

        for record in records {
            let mut value = serde_json::to_value(record)?;
            let object = value.as_object_mut().ok_or_else(|| {
                ModelError::invalid_field(
                    format!("{} place record", event_id),
                    "expected an object",
                )
            })?;

            if object.get("protected").map_or(true, Value::is_null) {
                object.insert("protected".to_string(), Value::Bool(false));
            }

            let record: PlaceRecord = serde_json::from_value(value)?;
            if places
                .insert(record.place_id.clone(), record.availability)
                .is_some()
            {
                warn!(
                    "Duplicate place id {} for event {}, keeping the last record",
                    record.place_id, event_id
                );
            }
        }

        Ok(Self {
            event_id: event_id.to_string(),
            places,
            is_legacy_schema: false,
        })
    }

    /// Current-generation snapshot from already-typed places; prices are quantized.
    pub fn from_places(
        event_id: impl Into<String>,
        places: BTreeMap<String, PlaceAvailability>,
    ) -> Self {
        let places = places
            .into_iter()
            .map(|(place_id, mut place)| {
                place.list_price = quantize(place.list_price);
                place.total_price = quantize(place.total_price);
                (place_id, place)
            })
            .collect();

        Self {
            event_id: event_id.into(),
            places,
            is_legacy_schema: false,
        }
    }

    /// Encode into the cache form.
    ///
    /// # Errors
    ///
    /// * `UnsupportedEncoding` - the snapshot was decoded from legacy arrays
    /// * `InvalidField` - a place has no `inserted` timestamp
    pub fn to_place_dict(&self) -> ModelResult<PlaceDict> {
        if self.is_legacy_schema {
            debug!("Refusing to encode legacy snapshot for event {}", self.event_id);
            return Err(ModelError::UnsupportedEncoding {
                event_id: self.event_id.clone(),
            });
        }

        self.places
            .iter()
            .map(|(place_id, place)| Ok((place_id.clone(), place.to_values(place_id)?)))
            .collect()
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn places(&self) -> &BTreeMap<String, PlaceAvailability> {
        &self.places
    }

    pub fn place(&self, place_id: &str) -> Option<&PlaceAvailability> {
        self.places.get(place_id)
    }

    pub fn is_legacy_schema(&self) -> bool {
        self.is_legacy_schema
    }

    pub fn generation(&self) -> SchemaGeneration {
        if self.is_legacy_schema {
            SchemaGeneration::Legacy
        } else {
            SchemaGeneration::Current
        }
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn into_places(self) -> BTreeMap<String, PlaceAvailability> {
        self.places
    }
}

// ================================================================================================
// Decoding
// ================================================================================================

/// Decode one place's positional values, choosing the layout by length.
pub fn decode_place(event_id: &str, place_id: &str, values: &[Value]) -> ModelResult<DecodedPlace> {
    let layout = PlaceLayout::from_len(values.len()).ok_or_else(|| ModelError::MalformedRecord {
        event_id: event_id.to_string(),
        place_id: place_id.to_string(),
        length: values.len(),
        values: Value::from(values.to_vec()).to_string(),
    })?;

    let reader = PlaceReader { place_id, values };

    let mut place = PlaceAvailability {
        list_price: reader.price(0, "list_price")?,
        total_price: reader.price(1, "total_price")?,
        offer_id: reader.opt_string(2, "offer_id")?,
        offer_name: reader.string(3, "offer_name")?,
        sellable_quantities: reader.opt_int_list(4, "sellable_quantities")?,
        protected: reader.truthy(5),
        inventory_type: reader.string(6, "inventory_type")?,
        count: None,
        full_section: None,
        section: None,
        row: None,
        row_rank: None,
        seat_rank: None,
        seat_number: None,
        attributes: Vec::new(),
        description: Vec::new(),
        inserted: None,
        prev_updated: None,
        update_reason: None,
    };

    match layout {
        PlaceLayout::Legacy => Ok(DecodedPlace::Legacy(place)),
        PlaceLayout::LegacyGeneralAdmission => {
            place.count = reader.opt_int(7, "count")?;
            Ok(DecodedPlace::Legacy(place))
        }
        PlaceLayout::Current | PlaceLayout::CurrentWithReason => {
            place.count = reader.opt_int(7, "count")?;
            place.full_section = reader.opt_string(8, "full_section")?;
            place.section = reader.opt_string(9, "section")?;
            place.row = reader.opt_string(10, "row")?;
            place.row_rank = reader.opt_int(11, "row_rank")?;
            place.seat_rank = reader.opt_int(12, "seat_rank")?;
            place.seat_number = reader.opt_string(13, "seat_number")?;
            place.attributes = reader.string_list(14, "attributes")?;
            place.description = reader.string_list(15, "description")?;
            place.inserted = Some(reader.timestamp(16, "inserted")?);
            place.prev_updated = reader.opt_timestamp(17, "prev_updated")?;
            if layout == PlaceLayout::CurrentWithReason {
                place.update_reason = reader
                    .opt_string(18, "update_reason")?
                    .filter(|reason| !reason.is_empty());
            }
            Ok(DecodedPlace::Current(place))
        }
    }
}

fn field_path(place_id: &str, index: usize, name: &str) -> String {
    format!("{}[{}] {}", place_id, index, name)
}

fn opt_string_value(value: &Option<String>) -> Value {
    match value {
        Some(s) => Value::String(s.clone()),
        None => Value::Null,
    }
}

fn opt_int_value(value: Option<i64>) -> Value {
    match value {
        Some(i) => Value::from(i),
        None => Value::Null,
    }
}

static NULL: Value = Value::Null;

/// Typed access to one place's positional values.
///
/// The cache is loosely typed: strings may be stored as numbers and integers
/// as numeric strings, so each accessor coerces the way the writers did.
struct PlaceReader<'a> {
    place_id: &'a str,
    values: &'a [Value],
}

impl PlaceReader<'_> {
    fn get(&self, index: usize) -> &Value {
        self.values.get(index).unwrap_or(&NULL)
    }

    fn error(&self, index: usize, name: &str, reason: impl Into<String>) -> ModelError {
        ModelError::invalid_field(field_path(self.place_id, index, name), reason)
    }

    fn price(&self, index: usize, name: &str) -> ModelResult<Decimal> {
        parse_price(self.get(index)).map_err(|reason| self.error(index, name, reason))
    }

    fn opt_string(&self, index: usize, name: &str) -> ModelResult<Option<String>> {
        match self.get(index) {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Bool(b) => Ok(Some(b.to_string())),
            other => Err(self.error(index, name, format!("expected a string, found {}", other))),
        }
    }

    fn string(&self, index: usize, name: &str) -> ModelResult<String> {
        self.opt_string(index, name)?
            .ok_or_else(|| self.error(index, name, "required value is null"))
    }

    fn int(&self, value: &Value, index: usize, name: &str) -> ModelResult<i64> {
        let parsed = match value {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Value::String(s) => i64::from_str(s.trim()).ok(),
            _ => None,
        };
        parsed.ok_or_else(|| self.error(index, name, format!("expected an integer, found {}", value)))
    }

    fn opt_int(&self, index: usize, name: &str) -> ModelResult<Option<i64>> {
        match self.get(index) {
            Value::Null => Ok(None),
            value => self.int(value, index, name).map(Some),
        }
    }

    fn opt_int_list(&self, index: usize, name: &str) -> ModelResult<Option<Vec<i64>>> {
        match self.get(index) {
            Value::Null => Ok(None),
            Value::Array(items) => items
                .iter()
                .map(|item| self.int(item, index, name))
                .collect::<ModelResult<Vec<_>>>()
                .map(Some),
            other => Err(self.error(index, name, format!("expected a list, found {}", other))),
        }
    }

    fn string_list(&self, index: usize, name: &str) -> ModelResult<Vec<String>> {
        match self.get(index) {
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(self.error(
                        index,
                        name,
                        format!("expected a list of strings, found {}", other),
                    )),
                })
                .collect(),
            other => Err(self.error(index, name, format!("expected a list, found {}", other))),
        }
    }

    /// Truthiness of the stored value: false, null, 0, "" and [] are false
    fn truthy(&self, index: usize) -> bool {
        match self.get(index) {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
        }
    }

    fn timestamp(&self, index: usize, name: &str) -> ModelResult<Timestamp> {
        match self.get(index) {
            Value::String(s) => Timestamp::from_str(s)
                .map_err(|e| self.error(index, name, format!("invalid timestamp '{}': {}", s, e))),
            other => Err(self.error(
                index,
                name,
                format!("expected an ISO-8601 string, found {}", other),
            )),
        }
    }

    fn opt_timestamp(&self, index: usize, name: &str) -> ModelResult<Option<Timestamp>> {
        match self.get(index) {
            Value::Null => Ok(None),
            Value::String(s) if s.is_empty() => Ok(None),
            _ => self.timestamp(index, name).map(Some),
        }
    }
}

// ================================================================================================
// Tests
// ================================================================================================
