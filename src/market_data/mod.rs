// Market data module entrypoint
pub mod adapters;    // venue-specific fetchers (Coinbase, Kraken, Gemini)
pub mod normaliser;  // converts wire strings -> exact decimals
pub mod aggregator;  // orchestrates fetch, merge, sort and walk
