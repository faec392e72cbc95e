//! Name-keyed deduplication.

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::error::{DiscoveryError, Result};
use crate::types::provider::{Candidate, Provider};

/// Collapse candidates sharing a case-folded name and cap the list.
///
/// Candidates are first put in observation order (query index, then rank).
/// Per name the most complete record wins, the earliest on a tie. The
/// survivors are stable-sorted by completeness, descending.
///
/// A candidate without a name is an [`DiscoveryError::Invariant`] error.
pub fn dedup(mut candidates: Vec<Candidate>, cap: usize) -> Result<Vec<Provider>> {
    candidates.sort_by_key(|c| (c.query_index, c.rank));

    let mut by_name: IndexMap<String, Candidate> = IndexMap::new();
    for candidate in candidates {
        let key = candidate.dedup_key().ok_or_else(|| {
            DiscoveryError::Invariant(format!("record from {} has no name", candidate.source))
        })?;
        match by_name.entry(key) {
            Entry::Occupied(mut kept) => {
                if candidate.completeness() > kept.get().completeness() {
                    kept.insert(candidate);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
        }
    }

    let mut survivors: Vec<Candidate> = by_name.into_values().collect();
    survivors.sort_by_key(|c| std::cmp::Reverse(c.completeness()));
    survivors.truncate(cap);

    survivors.into_iter().map(Candidate::into_provider).collect()
}
