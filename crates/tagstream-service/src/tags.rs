//! Deduplicating store of tag sightings.
//!
//! Folds a continuous stream of sightings into one [`TagEntry`] per
//! physical tag. Identity is the raw identifier bytes ([`TagId`]); the EPC
//! text is derived once, at first sighting, and never recomputed.
//!
//! Entries keep first-sighting order. A repeat sighting updates an entry in
//! place and never moves it.

use indexmap::IndexMap;
use indexmap::map::Entry;
use tagstream_core::{TagEntry, TagId, Timestamp};

/// Outcome of [`TagStore::record_sighting`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sighting {
    /// First time this identifier was seen.
    New,
    /// Identifier already known; antenna and time updated.
    Updated,
}

/// Keyed collection of last-seen tag metadata.
#[derive(Debug, Clone, Default)]
pub struct TagStore {
    entries: IndexMap<TagId, TagEntry>,
}

impl TagStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sighting of `id` on `antenna_id` at `now`.
    ///
    /// Inserts a new entry the first time an identifier is seen; afterwards
    /// only `antenna_id` and `last_seen` change.
    pub fn record_sighting(&mut self, id: TagId, antenna_id: u8, now: Timestamp) -> Sighting {
        match self.entries.entry(id) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().resighted(antenna_id, now);
                Sighting::Updated
            }
            Entry::Vacant(vacant) => {
                let entry = TagEntry::first_sighting(vacant.key(), antenna_id, now);
                vacant.insert(entry);
                Sighting::New
            }
        }
    }

    /// Look up the entry for an identifier.
    pub fn get(&self, id: &TagId) -> Option<&TagEntry> {
        self.entries.get(id)
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether no tag has been seen.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every tag.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate over entries in first-sighting order.
    pub fn entries(&self) -> impl Iterator<Item = &TagEntry> {
        self.entries.values()
    }

    /// Copy of every entry in first-sighting order.
    pub fn snapshot(&self) -> Vec<TagEntry> {
        self.entries.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local, TimeZone};
    use proptest::prelude::*;

    fn at(seconds: i64) -> Timestamp {
        Local.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn tag(hex: &str) -> TagId {
        TagId::from_hex(hex).unwrap()
    }

    #[test]
    fn test_first_sighting_inserts_entry() {
        let mut store = TagStore::new();

        let outcome = store.record_sighting(tag("AA BB"), 1, at(0));

        assert_eq!(outcome, Sighting::New);
        assert_eq!(store.len(), 1);
        let entry = store.get(&tag("AABB")).unwrap();
        assert_eq!(entry.epc, "AABB");
        assert_eq!(entry.antenna_id, 1);
        assert_eq!(entry.last_seen, at(0));
    }

    #[test]
    fn test_repeat_sighting_latest_antenna_wins() {
        let mut store = TagStore::new();

        store.record_sighting(tag("AABB"), 1, at(0));
        let outcome = store.record_sighting(tag("AABB"), 2, at(3));

        assert_eq!(outcome, Sighting::Updated);
        assert_eq!(store.len(), 1);
        let entry = store.get(&tag("AABB")).unwrap();
        assert_eq!(entry.antenna_id, 2);
        assert_eq!(entry.last_seen, at(3));
    }

    #[test]
    fn test_identity_is_byte_content_not_buffer() {
        let mut store = TagStore::new();
        let first = vec![0xCCu8, 0xDD];
        let second = first.clone();

        store.record_sighting(TagId::new(first).unwrap(), 1, at(0));
        store.record_sighting(TagId::new(second).unwrap(), 1, at(1));

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_entries_keep_first_sighting_order() {
        let mut store = TagStore::new();
        store.record_sighting(tag("03"), 1, at(0));
        store.record_sighting(tag("01"), 1, at(1));
        store.record_sighting(tag("02"), 1, at(2));
        store.record_sighting(tag("03"), 2, at(3));

        let epcs: Vec<&str> = store.entries().map(|e| e.epc.as_str()).collect();
        assert_eq!(epcs, vec!["03", "01", "02"]);
    }

    #[test]
    fn test_clear_forgets_everything() {
        let mut store = TagStore::new();
        store.record_sighting(tag("AABB"), 1, at(0));
        store.record_sighting(tag("CCDD"), 1, at(0));

        store.clear();

        assert!(store.is_empty());
        assert!(store.snapshot().is_empty());
    }

    proptest! {
        /// Any number of sightings of one identifier yields exactly one
        /// entry whose EPC is the uppercase hex of the identifier.
        #[test]
        fn prop_repeated_sightings_yield_one_entry(
            bytes in prop::collection::vec(any::<u8>(), 1..=12),
            antennas in prop::collection::vec(1u8..=4, 1..20),
        ) {
            let mut store = TagStore::new();
            let expected_epc: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();

            for (i, antenna) in antennas.iter().enumerate() {
                let id = TagId::new(bytes.clone()).unwrap();
                store.record_sighting(id, *antenna, at(i as i64));
            }

            prop_assert_eq!(store.len(), 1);
            let entry = store.entries().next().unwrap();
            prop_assert_eq!(&entry.epc, &expected_epc);
            prop_assert_eq!(entry.antenna_id, *antennas.last().unwrap());
            prop_assert_eq!(entry.last_seen, at(antennas.len() as i64 - 1));
        }

        /// The store holds exactly one entry per distinct identifier.
        #[test]
        fn prop_store_size_matches_distinct_ids(
            ids in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..=4), 0..40),
        ) {
            let mut store = TagStore::new();
            for (i, bytes) in ids.iter().enumerate() {
                store.record_sighting(TagId::new(bytes.clone()).unwrap(), 1, at(i as i64));
            }

            let distinct: std::collections::HashSet<&Vec<u8>> = ids.iter().collect();
            prop_assert_eq!(store.len(), distinct.len());
        }
    }
}
