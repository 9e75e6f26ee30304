// Concatenates one side of the book across venues.
// No level merging: two venues quoting the same price stay two entries.

use itertools::Itertools;

use crate::engine::types::{OrderEntry, Side, VenueBook};

pub fn merge_side<I>(sides: I) -> Vec<OrderEntry>
where
    I: IntoIterator<Item = Vec<OrderEntry>>,
{
    sides.into_iter().concat()
}

/// Pull the requested side out of every venue book and concatenate.
pub fn merge_books(books: &[VenueBook], side: Side) -> Vec<OrderEntry> {
    merge_side(books.iter().map(|book| match side {
        Side::Ask => book.asks.clone(),
        Side::Bid => book.bids.clone(),
    }))
}
