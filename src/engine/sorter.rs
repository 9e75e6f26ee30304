use crate::engine::types::{OrderEntry, Side};

/// A merged side ordered best-first for its direction.
///
/// Only [`sort_side`] builds one, so anything holding a `SortedSide` can rely on
/// asks being ascending and bids descending by price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedSide {
    side: Side,
    entries: Vec<OrderEntry>,
}

impl SortedSide {
    pub fn side(&self) -> Side {
        self.side
    }

    pub fn entries(&self) -> &[OrderEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Asks ascending (cheapest first), bids descending (richest first).
/// Comparison is on the decimal value; the sort is stable.
pub fn sort_side(mut entries: Vec<OrderEntry>, side: Side) -> SortedSide {
    match side {
        Side::Ask => entries.sort_by(|a, b| a.price().cmp(&b.price())),
        Side::Bid => entries.sort_by(|a, b| b.price().cmp(&a.price())),
    }
    SortedSide { side, entries }
}
