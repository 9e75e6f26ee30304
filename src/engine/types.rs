use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AggregationError, EntryDefect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Ask,
    Bid,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Ask => write!(f, "Ask"),
            Side::Bid => write!(f, "Bid"),
        }
    }
}

/// Exchanges we know how to pull a book snapshot from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    Coinbase,
    Kraken,
    Gemini,
}

impl Venue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Venue::Coinbase => "coinbase",
            Venue::Kraken => "kraken",
            Venue::Gemini => "gemini",
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resting order (or aggregated level) as reported by a venue.
///
/// Fields are private so an entry can only exist once it has passed
/// validation: both price and size are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderEntry {
    price: Decimal,
    size: Decimal,
}

impl OrderEntry {
    pub fn new(price: Decimal, size: Decimal) -> Result<Self, EntryDefect> {
        if price <= Decimal::ZERO {
            return Err(EntryDefect::NonPositivePrice(price));
        }
        if size <= Decimal::ZERO {
            return Err(EntryDefect::NonPositiveSize(size));
        }
        Ok(Self { price, size })
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn size(&self) -> Decimal {
        self.size
    }
}

/// Requested order quantity. Always > 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Quantity(Decimal);

impl Quantity {
    pub fn new(value: Decimal) -> Result<Self, AggregationError> {
        if value <= Decimal::ZERO {
            return Err(AggregationError::InvalidQuantity { value: value.to_string() });
        }
        Ok(Self(value))
    }

    /// Parse user input such as `"10"` or `" 2.5 "`.
    pub fn parse(input: &str) -> Result<Self, AggregationError> {
        let trimmed = input.trim();
        let value: Decimal = trimmed
            .parse()
            .map_err(|_| AggregationError::InvalidQuantity { value: trimmed.to_string() })?;
        Self::new(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One venue's snapshot after normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueBook {
    pub venue: Venue,
    pub asks: Vec<OrderEntry>,
    pub bids: Vec<OrderEntry>,
    /// Entries dropped by the normaliser as malformed.
    pub rejected: usize,
}

/// Why a venue did not contribute to a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueFailure {
    pub venue: Venue,
    pub reason: String,
}

/// Execution prices for both sides of the merged book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    #[serde(rename = "Ask")]
    pub ask: Decimal,
    #[serde(rename = "Bid")]
    pub bid: Decimal,
    pub venues: Vec<Venue>,
    pub failed_venues: Vec<VenueFailure>,
    pub partial: bool,
}
