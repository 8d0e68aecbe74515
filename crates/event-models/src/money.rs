/*!
# Fixed-point Money

Prices travel through the pipeline as either JSON numbers or numeric strings.
Every price that lands in a record is quantized to exactly two decimal places
so that `"12.5"` and `12.5` compare equal and serialize as `"12.50"`.
Numeric strings are read through `f64` exactly like JSON numbers; only
[`parse_exact_price`] keeps a string's decimal digits.
*/

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};
use std::str::FromStr;

/// Number of decimal places carried by every price
pub const PRICE_SCALE: u32 = 2;

/// Round to [`PRICE_SCALE`] places (banker's rounding) and pad the scale so
/// `12.5` becomes `12.50`.
pub fn quantize(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(PRICE_SCALE);
    rounded
}

/// Parse a price from a JSON number or numeric string and quantize it.
///
/// Strings are read as `f64` first, so `"2.675"` and `2.675` always agree.
pub fn parse_price(value: &Value) -> Result<Decimal, String> {
    let raw = match value {
        Value::String(s) => {
            let f = f64::from_str(s.trim()).map_err(|e| format!("invalid price '{}': {}", s, e))?;
            decimal_from_f64(f)?
        }
        Value::Number(n) => number_to_decimal(n)?,
        other => return Err(format!("expected a number or numeric string, found {}", other)),
    };

    Ok(quantize(raw))
}

/// Parse an amount from a JSON number or numeric string without going through
/// `f64` for strings, then quantize it.
pub fn parse_exact_price(value: &Value) -> Result<Decimal, String> {
    let raw = match value {
        Value::String(s) => parse_decimal_str(s)?,
        Value::Number(n) => number_to_decimal(n)?,
        other => return Err(format!("expected a number or numeric string, found {}", other)),
    };

    Ok(quantize(raw))
}

fn number_to_decimal(n: &Number) -> Result<Decimal, String> {
    if let Some(i) = n.as_i64() {
        Ok(Decimal::from(i))
    } else if let Some(u) = n.as_u64() {
        Ok(Decimal::from(u))
    } else {
        let f = n
            .as_f64()
            .ok_or_else(|| format!("unrepresentable number {}", n))?;
        decimal_from_f64(f)
    }
}

fn decimal_from_f64(f: f64) -> Result<Decimal, String> {
    Decimal::from_f64_retain(f).ok_or_else(|| format!("number {} is out of range for a price", f))
}

fn parse_decimal_str(s: &str) -> Result<Decimal, String> {
    let trimmed = s.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|e| format!("invalid decimal '{}': {}", s, e))
}

/// Deserialize a price from a number or numeric string, quantized to two places
pub fn deserialize_price<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_price(&value).map_err(serde::de::Error::custom)
}

/// Like [`deserialize_price`], but numeric strings keep their exact digits
pub fn deserialize_exact_price<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_exact_price(&value).map_err(serde::de::Error::custom)
}
