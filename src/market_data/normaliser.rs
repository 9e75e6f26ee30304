// Convert wire values (JSON strings or numbers) into validated OrderEntry values.
// Parsing goes through the textual form into Decimal, never through f64:
// serde_json's arbitrary_precision keeps the original digits of JSON numbers.

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::warn;

use crate::engine::types::{OrderEntry, Side, Venue};
use crate::error::EntryDefect;

/// A price/size pair as it came off the wire, before validation.
#[derive(Debug, Clone, Copy)]
pub struct RawLevel<'a> {
    pub price: Option<&'a Value>,
    pub size: Option<&'a Value>,
}

impl<'a> RawLevel<'a> {
    /// Array-shaped levels: `[price, size, ...]`. Trailing fields are ignored.
    pub fn from_array(level: &'a [Value]) -> Self {
        Self { price: level.first(), size: level.get(1) }
    }

    /// A level that should be an array; anything else is a defect.
    pub fn array(level: &'a Value) -> Result<Self, EntryDefect> {
        match level {
            Value::Array(items) => Ok(Self::from_array(items)),
            other => Err(EntryDefect::UnexpectedShape(other.to_string())),
        }
    }

    /// A level that should be an object carrying `price_key` and `size_key`.
    pub fn object(level: &'a Value, price_key: &str, size_key: &str) -> Result<Self, EntryDefect> {
        match level {
            Value::Object(fields) => Ok(Self { price: fields.get(price_key), size: fields.get(size_key) }),
            other => Err(EntryDefect::UnexpectedShape(other.to_string())),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct NormalisedSide {
    pub entries: Vec<OrderEntry>,
    pub rejected: usize,
}

pub struct Normaliser {
    pub venue: Venue,
}

impl Normaliser {
    pub fn new(venue: Venue) -> Self {
        Self { venue }
    }

    pub fn entry(&self, level: RawLevel<'_>) -> Result<OrderEntry, EntryDefect> {
        let price = level.price.ok_or(EntryDefect::MissingField("price"))?;
        let size = level.size.ok_or(EntryDefect::MissingField("size"))?;
        let price = parse_decimal(price).ok_or_else(|| EntryDefect::NonNumericPrice(price.to_string()))?;
        let size = parse_decimal(size).ok_or_else(|| EntryDefect::NonNumericSize(size.to_string()))?;
        OrderEntry::new(price, size)
    }

    /// Normalise one side, dropping (and counting) malformed levels.
    pub fn side<'a, I>(&self, side: Side, levels: I) -> NormalisedSide
    where
        I: IntoIterator<Item = Result<RawLevel<'a>, EntryDefect>>,
    {
        let mut out = NormalisedSide::default();
        for level in levels {
            match level.and_then(|level| self.entry(level)) {
                Ok(entry) => out.entries.push(entry),
                Err(defect) => {
                    warn!(venue = %self.venue, %side, %defect, "Dropping malformed order entry");
                    metrics::counter!("lobx_malformed_entries_total", "venue" => self.venue.as_str())
                        .increment(1);
                    out.rejected += 1;
                }
            }
        }
        out
    }
}

/// Exact decimal from a JSON string or number.
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => parse_text(s),
        Value::Number(n) => parse_text(&n.to_string()),
        _ => None,
    }
}

fn parse_text(s: &str) -> Option<Decimal> {
    let s = s.trim();
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}
