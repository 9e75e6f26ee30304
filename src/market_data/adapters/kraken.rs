// Kraken REST: GET /0/public/Depth?pair={pair}&count={depth}
// {"error": [], "result": {"XXBTZUSD": {"asks": [[px, vol, ts]], "bids": [...]}}}

use std::collections::HashMap;

use serde_json::Value;

use super::{get_json, VenueAdapter};
use crate::config::KrakenConfig;
use crate::engine::types::{Side, Venue, VenueBook};
use crate::error::VenueError;
use crate::market_data::normaliser::{Normaliser, RawLevel};

#[derive(Debug, serde::Deserialize)]
pub struct KrakenResponse {
    #[serde(default)]
    pub error: Vec<String>,
    #[serde(default)]
    pub result: HashMap<String, KrakenBook>,
}

#[derive(Debug, serde::Deserialize)]
pub struct KrakenBook {
    pub asks: Vec<Value>,
    pub bids: Vec<Value>,
}

pub struct KrakenAdapter {
    client: reqwest::Client,
    url: String,
    result_key: String,
}

impl KrakenAdapter {
    pub fn new(client: reqwest::Client, cfg: &KrakenConfig) -> Self {
        let url = format!(
            "{}/0/public/Depth?pair={}&count={}",
            cfg.base_url.trim_end_matches('/'),
            cfg.pair,
            cfg.depth
        );
        Self { client, url, result_key: cfg.result_key.clone() }
    }
}

pub fn parse_book(body: &str, result_key: &str) -> Result<VenueBook, VenueError> {
    let resp: KrakenResponse = serde_json::from_str(body)?;
    normalise(resp, result_key)
}

fn normalise(mut resp: KrakenResponse, result_key: &str) -> Result<VenueBook, VenueError> {
    if !resp.error.is_empty() {
        return Err(VenueError::Api(resp.error.join("; ")));
    }

    // Kraken renames pairs (XBTUSD -> XXBTZUSD); fall back to a lone result.
    let book = match resp.result.remove(result_key) {
        Some(book) => book,
        None if resp.result.len() == 1 => resp
            .result
            .into_values()
            .next()
            .ok_or_else(|| VenueError::MissingBook(result_key.to_string()))?,
        None => return Err(VenueError::MissingBook(result_key.to_string())),
    };

    let norm = Normaliser::new(Venue::Kraken);
    let asks = norm.side(Side::Ask, book.asks.iter().map(RawLevel::array));
    let bids = norm.side(Side::Bid, book.bids.iter().map(RawLevel::array));
    Ok(VenueBook {
        venue: Venue::Kraken,
        rejected: asks.rejected + bids.rejected,
        asks: asks.entries,
        bids: bids.entries,
    })
}

#[async_trait::async_trait]
impl VenueAdapter for KrakenAdapter {
    fn venue(&self) -> Venue {
        Venue::Kraken
    }

    async fn fetch_book(&self) -> Result<VenueBook, VenueError> {
        let resp: KrakenResponse = get_json(&self.client, &self.url).await?;
        normalise(resp, &self.result_key)
    }
}
