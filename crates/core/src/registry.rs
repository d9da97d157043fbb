//! Ledger master model and name canonicalization.
//!
//! Remote ledger names occasionally differ from the local canonical name
//! in punctuation only (an ampersand spelled out as "and", doubled
//! spaces). The importer tries a small fixed set of candidate spellings
//! against the registry before falling back to the raw name; it never
//! creates a master as a side effect of voucher import.

use serde::{Deserialize, Serialize};

/// A ledger master: a named account bucket under a parent group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    /// Canonical ledger name.
    pub name: String,
    /// Parent group, e.g. "Cash-in-Hand" or "Bank Accounts".
    pub parent_group: Option<String>,
}

impl Ledger {
    /// Creates a ledger master.
    #[must_use]
    pub fn new(name: impl Into<String>, parent_group: Option<String>) -> Self {
        Self {
            name: name.into(),
            parent_group,
        }
    }
}

/// Produces the candidate spellings tried when resolving a remote ledger
/// name against the registry, most literal first.
#[must_use]
pub fn name_candidates(raw: &str) -> Vec<String> {
    let base = collapse_whitespace(raw);
    let mut candidates = vec![base.clone()];

    let mut push = |candidate: String| {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    };

    if base.contains('&') {
        push(collapse_whitespace(&base.replace('&', " and ")));
        push(collapse_whitespace(&base.replace('&', " ")));
    }
    if base.contains(" and ") {
        push(collapse_whitespace(&base.replace(" and ", " & ")));
    }

    candidates
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
