use crate::models::ValidatorRecord;
use num_bigint::BigUint;
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    VotingPower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// User-controlled search and sort settings for the validator table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search_term: String,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            sort_key: SortKey::VotingPower,
            sort_direction: SortDirection::Descending,
        }
    }
}

impl ViewState {
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Same key flips the direction; a new key starts ascending.
    pub fn select_sort(&mut self, key: SortKey) {
        if key == self.sort_key {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_key = key;
            self.sort_direction = SortDirection::Ascending;
        }
    }
}

/// Base letters only: decomposed, combining marks dropped, lowercased.
fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Collator-style ordering of display names: base letters first, then
/// unaccented before accented, then lowercase before uppercase.
pub fn compare_monikers(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| {
            let a: String = a.nfc().flat_map(char::to_lowercase).collect();
            let b: String = b.nfc().flat_map(char::to_lowercase).collect();
            a.cmp(&b)
        })
        .then_with(|| b.cmp(a))
}

fn matches_search(record: &ValidatorRecord, needle: &str) -> bool {
    needle.is_empty() || record.moniker.to_lowercase().contains(needle)
}

/// Filtered, sorted view over `records`. Sorting is stable, so equal keys
/// keep upstream order in either direction.
pub fn project<'a>(records: &'a [ValidatorRecord], view: &ViewState) -> Vec<&'a ValidatorRecord> {
    let needle = view.search_term.to_lowercase();
    let filtered = records.iter().filter(|r| matches_search(r, &needle));
    let direction = view.sort_direction;

    match view.sort_key {
        SortKey::Name => {
            let mut rows: Vec<&ValidatorRecord> = filtered.collect();
            rows.sort_by(|a, b| direction.apply(compare_monikers(&a.moniker, &b.moniker)));
            rows
        }
        SortKey::VotingPower => {
            let mut keyed: Vec<(BigUint, &ValidatorRecord)> =
                filtered.map(|r| (r.voting_power(), r)).collect();
            keyed.sort_by(|a, b| direction.apply(a.0.cmp(&b.0)));
            keyed.into_iter().map(|(_, r)| r).collect()
        }
    }
}
