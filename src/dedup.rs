//! Cross-page deduplication
//!
//! Paginated stats tables repeat rows when the site's paging is inconsistent.
//! Records are identified by player name + team, case-folded; the first
//! occurrence within a target's run is kept and later ones are dropped
//! without merging.

use crate::extraction::PlayerRecord;
use std::collections::HashSet;

/// Joins name and team in identity keys. A control character, so it cannot
/// appear in rendered cell text.
pub const KEY_SEPARATOR: char = '\u{1f}';

/// Composite identity of a record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Key for a name/team pair
    pub fn new(name: &str, team: &str) -> Self {
        let mut key = String::with_capacity(name.len() + team.len() + 1);
        key.push_str(&name.to_lowercase());
        key.push(KEY_SEPARATOR);
        key.push_str(&team.to_lowercase());
        Self(key)
    }

    /// Key for a record
    pub fn of(record: &PlayerRecord) -> Self {
        Self::new(record.player_name(), record.team())
    }
}

/// Identity keys seen so far in one target's run
#[derive(Debug, Default)]
pub struct SeenKeySet {
    keys: HashSet<IdentityKey>,
}

impl SeenKeySet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key; `true` if it was not present
    pub fn insert(&mut self, key: IdentityKey) -> bool {
        self.keys.insert(key)
    }

    /// Whether a key has been seen
    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.keys.contains(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing has been seen
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// One page's records split by novelty
#[derive(Debug, Default)]
pub struct Partition {
    /// First occurrences, in page order
    pub fresh: Vec<PlayerRecord>,
    /// Count of records whose key was already seen
    pub duplicates: usize,
}

/// Split `records` into first occurrences and repeats, recording new keys in
/// `seen`. Repeats within the same page count as duplicates too.
pub fn partition<I>(records: I, seen: &mut SeenKeySet) -> Partition
where
    I: IntoIterator<Item = PlayerRecord>,
{
    let mut out = Partition::default();
    for record in records {
        if seen.insert(IdentityKey::of(&record)) {
            out.fresh.push(record);
        } else {
            out.duplicates += 1;
        }
    }
    out
}
