//! Cross-venue order book sweep pricer.
//!
//! Pulls BTC/USD book snapshots from several exchanges, merges them into one
//! book per side and prices a quantity by walking that book best-first.

pub mod config;
pub mod engine;
pub mod error;
pub mod market_data;
pub mod telemetry;

pub use config::{AppConfig, FailurePolicy};
pub use engine::types::{OrderEntry, Quantity, Quote, Side, Venue, VenueBook};
pub use engine::walker::PriceMethod;
pub use error::{AggregationError, EntryDefect, VenueError};
pub use market_data::aggregator::{quote_books, Aggregator};
