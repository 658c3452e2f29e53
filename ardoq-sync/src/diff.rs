//! Diff engine: one-directional patch comparison.
//!
//! Only keys present in the candidate are compared. A key missing from the
//! existing entity counts as a difference; keys only the existing entity
//! carries are ignored. Values compare by deep JSON equality.

use ardoq_core::Fields;

/// Candidate keys whose value is absent from, or unequal in, `existing`.
///
/// Keys come back in the candidate's key order.
pub fn changed_keys(existing: &Fields, candidate: &Fields) -> Vec<String> {
    candidate
        .iter()
        .filter(|(key, value)| existing.get(key.as_str()) != Some(*value))
        .map(|(key, _)| key.clone())
        .collect()
}

/// Whether applying `candidate` to `existing` would change anything.
pub fn is_different(existing: &Fields, candidate: &Fields) -> bool {
    candidate
        .iter()
        .any(|(key, value)| existing.get(key.as_str()) != Some(value))
}

/// Overlay `candidate` onto `existing`; the candidate wins on conflict.
pub fn merge(existing: &Fields, candidate: &Fields) -> Fields {
    let mut merged = existing.clone();
    for (key, value) in candidate {
        merged.insert(key.clone(), value.clone());
    }
    merged
}
