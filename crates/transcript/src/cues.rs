use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

static CUE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^transcript-cue-(\d+)$").unwrap());

/// Key for one captured cue.
///
/// Players that tag cue elements with stable `transcript-cue-N` ids get
/// `Indexed` keys; everything else falls back to the position the cue was
/// first seen at. Ordering is by the numeric suffix, indexed cues first,
/// which is also the on-screen order for both shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CueKey {
    Indexed(u64),
    Positional(u64),
}

impl CueKey {
    /// Derive a key from a cue element's DOM id, falling back to the scan
    /// position when the id is missing or unrecognised.
    pub fn from_dom(dom_id: Option<&str>, position: u64) -> Self {
        dom_id
            .and_then(|id| CUE_ID.captures(id))
            .and_then(|caps| caps[1].parse().ok())
            .map(CueKey::Indexed)
            .unwrap_or(CueKey::Positional(position))
    }
}

/// Insert-only set of captured cue texts, keyed by [`CueKey`].
///
/// Re-inserting a known key is a no-op, which makes repeated scan passes
/// over a partially re-rendered list idempotent: keys are never removed or
/// overwritten within one capture attempt.
#[derive(Debug, Default)]
pub struct CueSet {
    cues: BTreeMap<CueKey, String>,
}

impl CueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the cue was new.
    pub fn insert(&mut self, key: CueKey, text: impl Into<String>) -> bool {
        match self.cues.entry(key) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(text.into());
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn contains(&self, key: &CueKey) -> bool {
        self.cues.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Join all cue texts in key order, one cue per line.
    pub fn assemble(&self) -> String {
        self.cues.values().cloned().collect::<Vec<_>>().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_ids_parse_to_indexed_keys() {
        assert_eq!(
            CueKey::from_dom(Some("transcript-cue-7"), 0),
            CueKey::Indexed(7)
        );
        assert_eq!(CueKey::from_dom(None, 3), CueKey::Positional(3));
        assert_eq!(
            CueKey::from_dom(Some("player-chrome"), 5),
            CueKey::Positional(5)
        );
    }

    #[test]
    fn reinsert_does_not_grow_or_reorder() {
        let mut set = CueSet::new();
        assert!(set.insert(CueKey::Indexed(1), "one"));
        assert!(set.insert(CueKey::Indexed(2), "two"));
        assert!(!set.insert(CueKey::Indexed(1), "changed"));

        assert_eq!(set.len(), 2);
        assert_eq!(set.assemble(), "one\ntwo");
    }

    #[test]
    fn assembly_sorts_by_numeric_suffix_not_insertion() {
        let mut set = CueSet::new();
        set.insert(CueKey::Indexed(10), "ten");
        set.insert(CueKey::Indexed(2), "two");
        set.insert(CueKey::Indexed(30), "thirty");

        assert_eq!(set.assemble(), "two\nten\nthirty");
    }

    #[test]
    fn indexed_sorts_before_positional() {
        let mut set = CueSet::new();
        set.insert(CueKey::Positional(0), "fallback");
        set.insert(CueKey::Indexed(5), "tagged");

        assert_eq!(set.assemble(), "tagged\nfallback");
    }
}
