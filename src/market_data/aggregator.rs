// Aggregator orchestrates adapters + merge/sort/walk
use std::time::{Duration, Instant};

use futures::future::join_all;
use itertools::Itertools;
use tracing::{debug, info, instrument, warn};

use crate::config::{AppConfig, FailurePolicy};
use crate::engine::merger::merge_books;
use crate::engine::sorter::sort_side;
use crate::engine::types::{Quantity, Quote, Side, Venue, VenueBook, VenueFailure};
use crate::engine::walker::{walk, PriceMethod};
use crate::error::{AggregationError, VenueError};
use crate::market_data::adapters::coinbase::CoinbaseAdapter;
use crate::market_data::adapters::gemini::GeminiAdapter;
use crate::market_data::adapters::kraken::KrakenAdapter;
use crate::market_data::adapters::{http_client, VenueAdapter};

pub struct Aggregator {
    adapters: Vec<Box<dyn VenueAdapter>>,
    policy: FailurePolicy,
    method: PriceMethod,
    timeout: Duration,
}

impl Aggregator {
    pub fn new(
        adapters: Vec<Box<dyn VenueAdapter>>,
        policy: FailurePolicy,
        method: PriceMethod,
        timeout: Duration,
    ) -> Self {
        Self { adapters, policy, method, timeout }
    }

    /// One adapter per enabled venue, sharing a single HTTP client.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, VenueError> {
        let client = http_client(cfg.timeout())?;
        let adapters = cfg
            .venues
            .iter()
            .unique()
            .map(|venue| -> Box<dyn VenueAdapter> {
                match venue {
                    Venue::Coinbase => Box::new(CoinbaseAdapter::new(client.clone(), &cfg.coinbase)),
                    Venue::Kraken => Box::new(KrakenAdapter::new(client.clone(), &cfg.kraken)),
                    Venue::Gemini => Box::new(GeminiAdapter::new(client.clone(), &cfg.gemini)),
                }
            })
            .collect();
        Ok(Self::new(adapters, cfg.policy, cfg.method, cfg.timeout()))
    }

    /// Fetch every venue concurrently. Results keep adapter order.
    async fn fetch_all(&self) -> Vec<(Venue, Result<VenueBook, VenueError>)> {
        let fetches = self.adapters.iter().map(|adapter| async move {
            let venue = adapter.venue();
            let started = Instant::now();
            let result = match tokio::time::timeout(self.timeout, adapter.fetch_book()).await {
                Ok(result) => result,
                Err(_) => Err(VenueError::Timeout { ms: self.timeout.as_millis() as u64 }),
            };
            debug!(%venue, elapsed_ms = started.elapsed().as_millis() as u64, ok = result.is_ok(), "Venue fetch finished");
            (venue, result)
        });
        join_all(fetches).await
    }

    #[instrument(skip(self, quantity), fields(quantity = %quantity, policy = ?self.policy, method = ?self.method))]
    pub async fn aggregate(&self, quantity: Quantity) -> Result<Quote, AggregationError> {
        metrics::counter!("lobx_aggregations_total").increment(1);
        if self.adapters.is_empty() {
            return Err(AggregationError::NoVenues);
        }

        let mut books = Vec::with_capacity(self.adapters.len());
        let mut failures = Vec::new();

        for (venue, result) in self.fetch_all().await {
            match result {
                Ok(book) => {
                    info!(
                        %venue,
                        asks = book.asks.len(),
                        bids = book.bids.len(),
                        rejected = book.rejected,
                        "Fetched order book"
                    );
                    books.push(book);
                }
                Err(source) => {
                    warn!(%venue, error = %source, "Venue fetch failed");
                    metrics::counter!("lobx_venue_fetch_failures_total", "venue" => venue.as_str()).increment(1);
                    if self.policy == FailurePolicy::Strict {
                        return Err(AggregationError::VenueFetchFailure { venue, source });
                    }
                    failures.push(VenueFailure { venue, reason: source.to_string() });
                }
            }
        }

        if books.is_empty() {
            return Err(AggregationError::AllVenuesFailed { failures });
        }

        let mut quote = quote_books(&books, quantity, self.method)?;
        quote.partial = !failures.is_empty();
        quote.failed_venues = failures;
        info!(ask = %quote.ask, bid = %quote.bid, partial = quote.partial, "Aggregated quote");
        Ok(quote)
    }
}

/// Merge, sort and walk both sides of already-fetched books.
///
/// Asks are priced first, so an empty ask side is reported even when the bids
/// are empty too.
pub fn quote_books(books: &[VenueBook], quantity: Quantity, method: PriceMethod) -> Result<Quote, AggregationError> {
    let asks = sort_side(merge_books(books, Side::Ask), Side::Ask);
    let ask = walk(&asks, quantity, method)?;

    let bids = sort_side(merge_books(books, Side::Bid), Side::Bid);
    let bid = walk(&bids, quantity, method)?;

    Ok(Quote {
        ask: ask.price,
        bid: bid.price,
        venues: books.iter().map(|b| b.venue).collect(),
        failed_venues: Vec::new(),
        partial: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::OrderEntry;
    use crate::market_data::adapters::{coinbase, gemini};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn entries(raw: &[(Decimal, Decimal)]) -> Vec<OrderEntry> {
        raw.iter().map(|&(p, s)| OrderEntry::new(p, s).unwrap()).collect()
    }

    fn book(venue: Venue, asks: &[(Decimal, Decimal)], bids: &[(Decimal, Decimal)]) -> VenueBook {
        VenueBook { venue, asks: entries(asks), bids: entries(bids), rejected: 0 }
    }

    fn qty(v: Decimal) -> Quantity {
        Quantity::new(v).unwrap()
    }

    enum Behaviour {
        Serve(VenueBook),
        Fail,
        Hang,
    }

    struct StaticAdapter {
        venue: Venue,
        behaviour: Behaviour,
    }

    #[async_trait::async_trait]
    impl VenueAdapter for StaticAdapter {
        fn venue(&self) -> Venue {
            self.venue
        }

        async fn fetch_book(&self) -> Result<VenueBook, VenueError> {
            match &self.behaviour {
                Behaviour::Serve(book) => Ok(book.clone()),
                Behaviour::Fail => Err(VenueError::Api("service unavailable".into())),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Err(VenueError::Api("unreachable".into()))
                }
            }
        }
    }

    fn serve(book: VenueBook) -> Box<dyn VenueAdapter> {
        Box::new(StaticAdapter { venue: book.venue, behaviour: Behaviour::Serve(book) })
    }

    fn failing(venue: Venue) -> Box<dyn VenueAdapter> {
        Box::new(StaticAdapter { venue, behaviour: Behaviour::Fail })
    }

    fn hanging(venue: Venue) -> Box<dyn VenueAdapter> {
        Box::new(StaticAdapter { venue, behaviour: Behaviour::Hang })
    }

    fn sample_books() -> Vec<VenueBook> {
        vec![
            book(Venue::Coinbase, &[(dec!(105), dec!(10)), (dec!(100), dec!(5))], &[(dec!(98), dec!(10))]),
            book(Venue::Kraken, &[(dec!(101), dec!(3))], &[(dec!(99), dec!(4))]),
        ]
    }

    fn aggregator(adapters: Vec<Box<dyn VenueAdapter>>, policy: FailurePolicy) -> Aggregator {
        Aggregator::new(adapters, policy, PriceMethod::TouchedMean, Duration::from_millis(200))
    }

    #[test]
    fn test_quote_books_ten_btc_scenario() {
        let quote = quote_books(&sample_books(), qty(dec!(10)), PriceMethod::TouchedMean).unwrap();
        assert_eq!(quote.ask, dec!(102.0));
        assert_eq!(quote.bid, dec!(98.5));
        assert_eq!(quote.venues, vec![Venue::Coinbase, Venue::Kraken]);
        assert!(!quote.partial);
    }

    #[test]
    fn test_quote_books_is_repeatable() {
        let books = sample_books();
        let first = quote_books(&books, qty(dec!(7)), PriceMethod::TouchedMean).unwrap();
        let second = quote_books(&books, qty(dec!(7)), PriceMethod::TouchedMean).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_asks_everywhere() {
        let books = vec![
            book(Venue::Coinbase, &[], &[(dec!(99), dec!(1))]),
            book(Venue::Gemini, &[], &[]),
        ];
        let err = quote_books(&books, qty(dec!(1)), PriceMethod::TouchedMean).unwrap_err();
        assert!(matches!(err, AggregationError::InsufficientLiquidity { side: Side::Ask }));
    }

    #[test]
    fn test_empty_bids_everywhere() {
        let books = vec![book(Venue::Kraken, &[(dec!(101), dec!(1))], &[])];
        let err = quote_books(&books, qty(dec!(1)), PriceMethod::TouchedMean).unwrap_err();
        assert!(matches!(err, AggregationError::InsufficientLiquidity { side: Side::Bid }));
    }

    #[test]
    fn test_all_malformed_asks_are_insufficient_liquidity() {
        let coinbase = coinbase::parse_book(
            r#"{"asks": [["100", "0"], ["abc", "1"], null], "bids": [["99", "1", 1]]}"#,
        )
        .unwrap();
        let gemini = gemini::parse_book(
            r#"{"asks": [{"price": "101", "amount": "-1"}, {"amount": "2"}], "bids": []}"#,
        )
        .unwrap();
        assert_eq!(coinbase.rejected, 3);
        assert_eq!(gemini.rejected, 2);

        let err = quote_books(&[coinbase, gemini], qty(dec!(1)), PriceMethod::TouchedMean).unwrap_err();
        assert!(matches!(err, AggregationError::InsufficientLiquidity { side: Side::Ask }));
    }

    #[test]
    fn test_out_of_range_book_is_an_error() {
        let coinbase = coinbase::parse_book(
            r#"{"asks": [["79228162514264337593543950335", "1"], ["79228162514264337593543950335", "1"]],
                "bids": [["99", "1"]]}"#,
        )
        .unwrap();
        let err = quote_books(&[coinbase], qty(dec!(2)), PriceMethod::TouchedMean).unwrap_err();
        assert!(matches!(err, AggregationError::PriceOverflow { side: Side::Ask }));
    }

    #[tokio::test]
    async fn test_aggregate_all_venues() {
        let adapters = sample_books().into_iter().map(serve).collect();
        let quote = aggregator(adapters, FailurePolicy::Resilient)
            .aggregate(qty(dec!(10)))
            .await
            .unwrap();
        assert_eq!(quote.ask, dec!(102.0));
        assert_eq!(quote.bid, dec!(98.5));
        assert!(quote.failed_venues.is_empty());
    }

    #[tokio::test]
    async fn test_aggregate_resilient_skips_failed_venue() {
        let mut adapters: Vec<_> = sample_books().into_iter().map(serve).collect();
        adapters.push(failing(Venue::Gemini));

        let quote = aggregator(adapters, FailurePolicy::Resilient)
            .aggregate(qty(dec!(10)))
            .await
            .unwrap();
        assert_eq!(quote.ask, dec!(102.0));
        assert_eq!(quote.bid, dec!(98.5));
        assert!(quote.partial);
        assert_eq!(quote.failed_venues.len(), 1);
        assert_eq!(quote.failed_venues[0].venue, Venue::Gemini);
        assert!(quote.failed_venues[0].reason.contains("service unavailable"));
    }

    #[tokio::test]
    async fn test_aggregate_strict_fails_on_any_venue() {
        let mut adapters: Vec<_> = sample_books().into_iter().map(serve).collect();
        adapters.push(failing(Venue::Gemini));

        let err = aggregator(adapters, FailurePolicy::Strict)
            .aggregate(qty(dec!(10)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AggregationError::VenueFetchFailure { venue: Venue::Gemini, source: VenueError::Api(_) }
        ));
    }

    #[tokio::test]
    async fn test_aggregate_all_failed() {
        let adapters = vec![failing(Venue::Coinbase), failing(Venue::Kraken)];
        let err = aggregator(adapters, FailurePolicy::Resilient)
            .aggregate(qty(dec!(1)))
            .await
            .unwrap_err();
        match err {
            AggregationError::AllVenuesFailed { failures } => assert_eq!(failures.len(), 2),
            other => panic!("expected AllVenuesFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_aggregate_without_venues() {
        let err = aggregator(Vec::new(), FailurePolicy::Resilient)
            .aggregate(qty(dec!(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, AggregationError::NoVenues));

        let err = aggregator(Vec::new(), FailurePolicy::Strict)
            .aggregate(qty(dec!(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, AggregationError::NoVenues));
    }

    #[tokio::test]
    async fn test_aggregate_timeout_counts_as_failure() {
        let mut adapters: Vec<_> = sample_books().into_iter().map(serve).collect();
        adapters.push(hanging(Venue::Gemini));

        let quote = aggregator(adapters, FailurePolicy::Resilient)
            .aggregate(qty(dec!(10)))
            .await
            .unwrap();
        assert!(quote.partial);
        assert!(quote.failed_venues[0].reason.contains("timed out"));

        let mut adapters: Vec<_> = sample_books().into_iter().map(serve).collect();
        adapters.push(hanging(Venue::Gemini));
        let err = aggregator(adapters, FailurePolicy::Strict)
            .aggregate(qty(dec!(10)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AggregationError::VenueFetchFailure { source: VenueError::Timeout { ms: 200 }, .. }
        ));
    }

    #[tokio::test]
    async fn test_aggregate_frozen_snapshots_twice() {
        let agg = aggregator(sample_books().into_iter().map(serve).collect(), FailurePolicy::Strict);
        let first = agg.aggregate(qty(dec!(4))).await.unwrap();
        let second = agg.aggregate(qty(dec!(4))).await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_from_config_dedupes_venues() {
        let cfg = AppConfig {
            venues: vec![Venue::Kraken, Venue::Kraken, Venue::Gemini],
            ..AppConfig::default()
        };
        let agg = Aggregator::from_config(&cfg).unwrap();
        let venues: Vec<_> = agg.adapters.iter().map(|a| a.venue()).collect();
        assert_eq!(venues, vec![Venue::Kraken, Venue::Gemini]);
    }
}
