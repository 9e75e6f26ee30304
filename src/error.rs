use rust_decimal::Decimal;
use thiserror::Error;

use crate::engine::types::{Side, Venue, VenueFailure};

#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("invalid quantity {value}: must be a number greater than 0")]
    InvalidQuantity { value: String },

    #[error("failed to fetch order book from {venue}: {source}")]
    VenueFetchFailure {
        venue: Venue,
        #[source]
        source: VenueError,
    },

    #[error("no venue returned an order book ({} failed)", .failures.len())]
    AllVenuesFailed { failures: Vec<VenueFailure> },

    #[error("insufficient liquidity: merged {side} side is empty")]
    InsufficientLiquidity { side: Side },

    #[error("{side} side price is out of decimal range")]
    PriceOverflow { side: Side },

    #[error("no venues configured")]
    NoVenues,
}

/// Failure to retrieve or decode a single venue's snapshot.
#[derive(Debug, Error)]
pub enum VenueError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("venue reported errors: {0}")]
    Api(String),

    #[error("book {0} missing from response")]
    MissingBook(String),

    #[error("timed out after {ms}ms")]
    Timeout { ms: u64 },
}

/// Reason a single price/size pair was dropped during normalisation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryDefect {
    #[error("price {0:?} is not a number")]
    NonNumericPrice(String),

    #[error("size {0:?} is not a number")]
    NonNumericSize(String),

    #[error("price {0} is not positive")]
    NonPositivePrice(Decimal),

    #[error("size {0} is not positive")]
    NonPositiveSize(Decimal),

    #[error("level is missing its {0} field")]
    MissingField(&'static str),

    #[error("level {0} has an unexpected shape")]
    UnexpectedShape(String),
}
