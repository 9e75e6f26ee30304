// Pure book computations: no I/O, no shared state
pub mod types;   // order entries, sides, quantity, quote
pub mod merger;  // concatenates venue sides
pub mod sorter;  // best-first ordering per side
pub mod walker;  // walks a sorted side to price a quantity
