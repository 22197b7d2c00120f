//! Tier merge.
//!
//! Per header name, merging an inner tier over an outer tier:
//! - absent in the inner tier: the outer value is adopted verbatim
//! - list-typed in both tiers: inner list first, then the outer list
//! - anything else: the inner value wins and the outer one is dropped
//!
//! An inner scalar therefore hides an outer list completely.

use super::collection::{HeaderCollection, HeaderValue};

/// Merge `outer` beneath `inner`, producing a new collection.
///
/// Names keep the inner tier's order, followed by names only the outer
/// tier defines.
pub fn merge(inner: &HeaderCollection, outer: &HeaderCollection) -> HeaderCollection {
    let mut merged = inner.clone();

    for (name, outer_value) in outer.iter() {
        match (merged.get_value(name), outer_value) {
            (None, _) => merged.insert_value(name, outer_value.clone()),
            (Some(HeaderValue::List(local)), HeaderValue::List(inherited)) => {
                let combined: Vec<String> = local.iter().chain(inherited.iter()).cloned().collect();
                merged.insert_value(name, HeaderValue::List(combined));
            }
            (Some(_), _) => {}
        }
    }

    merged
}
