//! Line orderings.
//!
//! An ordering is a plain `fn(&str, &str) -> Ordering` item so that a single
//! copyable comparator value can be handed to both the chunk-sort and the
//! merge phase; the merge is only correct when both phases agree on the
//! order.

use std::cmp::Ordering;

/// Reference ordering: a longer line precedes a shorter one, lines of equal
/// length compare in ascending lexicographic (byte) order.
pub fn longest_first(a: &str, b: &str) -> Ordering {
    b.len().cmp(&a.len()).then_with(|| a.cmp(b))
}

/// Plain ascending lexicographic (byte) order.
pub fn lexicographic(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}
