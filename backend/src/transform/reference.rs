//! Dense numbering of repeating strings (clubs, categories).
//!
//! OE2010 wants a small integer next to every club and class name. The
//! distinct values are sorted by code point and numbered from 1, so the
//! numbers depend only on which values occur, never on row order.

use std::collections::{BTreeMap, BTreeSet};

/// Value → 1-based rank in sorted order of the distinct values.
pub type ReferenceIds = BTreeMap<String, u32>;

/// Deduplicate by exact equality, sort, number from 1.
pub fn assign_ids<I, S>(values: I) -> ReferenceIds
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let unique: BTreeSet<String> = values.into_iter().map(|v| v.as_ref().to_string()).collect();

    unique
        .into_iter()
        .enumerate()
        .map(|(i, value)| (value, i as u32 + 1))
        .collect()
}
