use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::engine::sorter::SortedSide;
use crate::engine::types::Quantity;
use crate::error::AggregationError;

/// How the price of a walk is derived from the entries it touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceMethod {
    /// Plain mean of the prices of every entry touched. The entry that crosses
    /// the target is counted whole, and sizes do not weight the result.
    #[default]
    TouchedMean,
    /// Size-weighted average; the crossing entry only contributes the part
    /// needed to reach the target.
    Vwap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Walk {
    pub price: Decimal,
    pub entries_consumed: usize,
    /// Size taken from the book. For `TouchedMean` this includes the whole
    /// crossing entry and can exceed the target.
    pub filled: Decimal,
    /// The side ran out before reaching the target.
    pub exhausted: bool,
}

#[instrument(level = "debug", skip(book), fields(side = %book.side(), depth = book.len()))]
pub fn walk(book: &SortedSide, quantity: Quantity, method: PriceMethod) -> Result<Walk, AggregationError> {
    if book.is_empty() {
        return Err(AggregationError::InsufficientLiquidity { side: book.side() });
    }

    let walk = match method {
        PriceMethod::TouchedMean => touched_mean(book, quantity.value()),
        PriceMethod::Vwap => vwap(book, quantity.value()),
    }
    .ok_or(AggregationError::PriceOverflow { side: book.side() })?;

    if walk.exhausted {
        warn!(
            side = %book.side(),
            requested = %quantity,
            available = %walk.filled,
            "Book exhausted before reaching requested quantity"
        );
    }
    debug!(price = %walk.price, consumed = walk.entries_consumed, filled = %walk.filled, "Walk complete");
    Ok(walk)
}

// Checked arithmetic throughout: None when a sum or product leaves Decimal range.
fn touched_mean(book: &SortedSide, target: Decimal) -> Option<Walk> {
    let mut notional = Decimal::ZERO;
    let mut accumulated = Decimal::ZERO;
    let mut consumed = 0usize;

    for entry in book.entries() {
        if accumulated >= target {
            break;
        }
        notional = notional.checked_add(entry.price())?;
        accumulated = accumulated.checked_add(entry.size())?;
        consumed += 1;
    }

    // consumed >= 1: the book is non-empty and target > 0
    Some(Walk {
        price: notional.checked_div(Decimal::from(consumed))?,
        entries_consumed: consumed,
        filled: accumulated,
        exhausted: accumulated < target,
    })
}

fn vwap(book: &SortedSide, target: Decimal) -> Option<Walk> {
    let mut notional = Decimal::ZERO;
    let mut filled = Decimal::ZERO;
    let mut consumed = 0usize;

    for entry in book.entries() {
        if filled >= target {
            break;
        }
        let take = entry.size().min(target.checked_sub(filled)?);
        notional = notional.checked_add(entry.price().checked_mul(take)?)?;
        filled = filled.checked_add(take)?;
        consumed += 1;
    }

    Some(Walk {
        price: notional.checked_div(filled)?,
        entries_consumed: consumed,
        filled,
        exhausted: filled < target,
    })
}
