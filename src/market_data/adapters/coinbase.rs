// Coinbase Exchange REST: GET /products/{product}/book?level=2
// Levels arrive as [price, size, num_orders] with price/size as strings.

use serde_json::Value;

use super::{get_json, VenueAdapter};
use crate::config::CoinbaseConfig;
use crate::engine::types::{Side, Venue, VenueBook};
use crate::error::VenueError;
use crate::market_data::normaliser::{Normaliser, RawLevel};

#[derive(Debug, serde::Deserialize)]
pub struct CoinbaseBook {
    pub asks: Vec<Value>,
    pub bids: Vec<Value>,
}

pub struct CoinbaseAdapter {
    client: reqwest::Client,
    url: String,
}

impl CoinbaseAdapter {
    pub fn new(client: reqwest::Client, cfg: &CoinbaseConfig) -> Self {
        let url = format!("{}/products/{}/book?level=2", cfg.base_url.trim_end_matches('/'), cfg.product);
        Self { client, url }
    }
}

pub fn parse_book(body: &str) -> Result<VenueBook, VenueError> {
    let book: CoinbaseBook = serde_json::from_str(body)?;
    Ok(normalise(book))
}

fn normalise(book: CoinbaseBook) -> VenueBook {
    let norm = Normaliser::new(Venue::Coinbase);
    let asks = norm.side(Side::Ask, book.asks.iter().map(RawLevel::array));
    let bids = norm.side(Side::Bid, book.bids.iter().map(RawLevel::array));
    VenueBook {
        venue: Venue::Coinbase,
        rejected: asks.rejected + bids.rejected,
        asks: asks.entries,
        bids: bids.entries,
    }
}

#[async_trait::async_trait]
impl VenueAdapter for CoinbaseAdapter {
    fn venue(&self) -> Venue {
        Venue::Coinbase
    }

    async fn fetch_book(&self) -> Result<VenueBook, VenueError> {
        let book: CoinbaseBook = get_json(&self.client, &self.url).await?;
        Ok(normalise(book))
    }
}
