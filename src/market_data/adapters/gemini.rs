// Gemini REST: GET /v1/book/{symbol}
// Levels are objects: {"price": "...", "amount": "...", "timestamp": "..."}

use serde_json::Value;

use super::{get_json, VenueAdapter};
use crate::config::GeminiConfig;
use crate::engine::types::{Side, Venue, VenueBook};
use crate::error::{EntryDefect, VenueError};
use crate::market_data::normaliser::{Normaliser, RawLevel};

#[derive(Debug, serde::Deserialize)]
pub struct GeminiBook {
    pub asks: Vec<Value>,
    pub bids: Vec<Value>,
}

fn level(value: &Value) -> Result<RawLevel<'_>, EntryDefect> {
    // timestamp and any other fields are ignored
    RawLevel::object(value, "price", "amount")
}

pub struct GeminiAdapter {
    client: reqwest::Client,
    url: String,
}

impl GeminiAdapter {
    pub fn new(client: reqwest::Client, cfg: &GeminiConfig) -> Self {
        let url = format!("{}/v1/book/{}", cfg.base_url.trim_end_matches('/'), cfg.symbol);
        Self { client, url }
    }
}

pub fn parse_book(body: &str) -> Result<VenueBook, VenueError> {
    let book: GeminiBook = serde_json::from_str(body)?;
    Ok(normalise(book))
}

fn normalise(book: GeminiBook) -> VenueBook {
    let norm = Normaliser::new(Venue::Gemini);
    let asks = norm.side(Side::Ask, book.asks.iter().map(level));
    let bids = norm.side(Side::Bid, book.bids.iter().map(level));
    VenueBook {
        venue: Venue::Gemini,
        rejected: asks.rejected + bids.rejected,
        asks: asks.entries,
        bids: bids.entries,
    }
}

#[async_trait::async_trait]
impl VenueAdapter for GeminiAdapter {
    fn venue(&self) -> Venue {
        Venue::Gemini
    }

    async fn fetch_book(&self) -> Result<VenueBook, VenueError> {
        let book: GeminiBook = get_json(&self.client, &self.url).await?;
        Ok(normalise(book))
    }
}
