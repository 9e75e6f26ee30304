// Shared trait + HTTP plumbing for venue adapters

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::engine::types::{Venue, VenueBook};
use crate::error::VenueError;

#[async_trait::async_trait]
pub trait VenueAdapter: Send + Sync {
    fn venue(&self) -> Venue;

    /// Fetch a point-in-time snapshot and normalise it.
    async fn fetch_book(&self) -> Result<VenueBook, VenueError>;
}

pub fn http_client(timeout: Duration) -> Result<reqwest::Client, VenueError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("lobx-agg/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// GET `url` and decode the body as `T`. Non-2xx statuses are errors.
pub async fn get_json<T: DeserializeOwned>(client: &reqwest::Client, url: &str) -> Result<T, VenueError> {
    debug!(url, "Requesting order book snapshot");
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(serde_json::from_str(&body)?)
}

pub mod coinbase;
pub mod gemini;
pub mod kraken;
