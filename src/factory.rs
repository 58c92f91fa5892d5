//! Single-threaded flyweight factory.

use crate::key::CacheKey;
use crate::record::{Flyweight, Intrinsic, SharedRecord};
use itertools::Itertools;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Hit,
    Miss,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    pub(crate) fn record(&mut self, outcome: Lookup) {
        match outcome {
            Lookup::Hit => self.hits += 1,
            Lookup::Miss => self.misses += 1,
        }
    }
}

/// Owns one [`Flyweight`] per distinct key and hands out shared handles.
///
/// Records are never removed; the map only grows.
#[derive(Debug)]
pub struct FlyweightFactory<T> {
    records: FxHashMap<CacheKey, SharedRecord<T>>,
    stats: CacheStats,
}

impl<T: Intrinsic> Default for FlyweightFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Intrinsic> FlyweightFactory<T> {
    pub fn new() -> Self {
        FlyweightFactory {
            records: FxHashMap::default(),
            stats: CacheStats::default(),
        }
    }

    /// Builds a factory pre-populated with `states`. Seeding is not counted
    /// as lookups.
    pub fn with_initial<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<T>,
    {
        let mut factory = Self::new();
        for state in states {
            let record = Flyweight::new(state.into());
            factory
                .records
                .entry(record.key().clone())
                .or_insert_with(|| Arc::new(record));
        }
        info!(records = factory.count(), "seeded flyweight factory");
        factory
    }

    /// Returns the record for `intrinsic`, creating it on a miss.
    pub fn get_or_create(&mut self, intrinsic: impl Into<T>) -> SharedRecord<T> {
        self.lookup(intrinsic).0
    }

    pub fn lookup(&mut self, intrinsic: impl Into<T>) -> (SharedRecord<T>, Lookup) {
        let intrinsic = intrinsic.into();
        let key = intrinsic.cache_key();

        let (record, outcome) = match self.records.entry(key) {
            Entry::Occupied(entry) => {
                debug!(key = %entry.key(), "reusing existing flyweight");
                (Arc::clone(entry.get()), Lookup::Hit)
            }
            Entry::Vacant(entry) => {
                debug!(key = %entry.key(), "no flyweight for key, creating one");
                let record = Arc::new(Flyweight::with_key(entry.key().clone(), intrinsic));
                (Arc::clone(entry.insert(record)), Lookup::Miss)
            }
        };

        self.stats.record(outcome);
        (record, outcome)
    }

    /// Looks up an already-derived key without inserting.
    pub fn get(&self, key: &str) -> Option<SharedRecord<T>> {
        self.records.get(key).cloned()
    }

    pub fn contains(&self, intrinsic: &T) -> bool {
        self.records.contains_key(&intrinsic.cache_key())
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All current keys, in no particular order.
    pub fn list_keys(&self) -> Vec<String> {
        self.records.keys().map(|key| key.as_str().to_owned()).collect()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Report of the stored keys, sorted for stable output.
    pub fn listing(&self) -> String {
        render_listing(self.list_keys())
    }
}

pub(crate) fn render_listing(mut keys: Vec<String>) -> String {
    keys.sort();
    let header = format!("FlyweightFactory: I have {} flyweights.", keys.len());
    std::iter::once(header).chain(keys).join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Attributes, CarModel};
    use proptest::prelude::*;

    fn police_fleet() -> Vec<[&'static str; 3]> {
        vec![
            ["Chevrolet", "Camaro2018", "pink"],
            ["Mercedes Benz", "C300", "black"],
            ["Mercedes Benz", "C500", "red"],
            ["BMW", "M5", "red"],
            ["BMW", "X6", "white"],
        ]
    }

    #[test]
    fn test_miss_then_hit_returns_same_instance() {
        let mut factory: FlyweightFactory<Attributes> = FlyweightFactory::new();

        let r1 = factory.get_or_create(["BMW", "M5", "red"]);
        assert_eq!(factory.count(), 1);

        let again = factory.get_or_create(["red", "BMW", "M5"]);
        assert!(Arc::ptr_eq(&r1, &again));
        assert_eq!(factory.count(), 1);
    }

    #[test]
    fn test_different_model_creates_new_record() {
        let mut factory: FlyweightFactory<Attributes> = FlyweightFactory::new();
        let r1 = factory.get_or_create(["BMW", "M5", "red"]);
        let r2 = factory.get_or_create(["BMW", "X1", "red"]);

        assert!(!Arc::ptr_eq(&r1, &r2));
        assert_eq!(factory.count(), 2);

        let mut keys = factory.list_keys();
        keys.sort();
        assert_eq!(keys, vec!["BMW_M5_red", "BMW_X1_red"]);
    }

    #[test]
    fn test_idempotent_counts() {
        let mut factory: FlyweightFactory<Attributes> = FlyweightFactory::new();
        let (first, outcome) = factory.lookup(["Mercedes Benz", "C300", "black"]);
        assert_eq!(outcome, Lookup::Miss);
        assert_eq!(factory.count(), 1);

        let (second, outcome) = factory.lookup(["Mercedes Benz", "C300", "black"]);
        assert_eq!(outcome, Lookup::Hit);
        assert_eq!(factory.count(), 1);
        assert!(Flyweight::same_instance(&first, &second));
    }

    #[test]
    fn test_empty_sequence_keyed_by_empty_string() {
        let mut factory: FlyweightFactory<Attributes> = FlyweightFactory::new();
        let a = factory.get_or_create(Attributes::default());
        let b = factory.get_or_create(Attributes::default());

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.key().as_str(), "");
        assert_eq!(factory.list_keys(), vec![String::new()]);
    }

    #[test]
    fn test_separator_inside_attribute_collides() {
        // Keys are joined with '_', so an attribute containing it can alias
        // a longer sequence.
        let mut factory: FlyweightFactory<Attributes> = FlyweightFactory::new();
        let joined = factory.get_or_create(["a_b"]);
        let split = factory.get_or_create(["a", "b"]);
        assert!(Arc::ptr_eq(&joined, &split));
        assert_eq!(split.intrinsic().values(), ["a_b"]);
    }

    #[test]
    fn test_with_initial_seeds_without_stats() {
        let factory: FlyweightFactory<Attributes> = FlyweightFactory::with_initial(police_fleet());
        assert_eq!(factory.count(), 5);
        assert_eq!(factory.stats(), CacheStats::default());
        assert!(factory.get("BMW_X6_white").is_some());
        assert!(factory.get("BMW_X1_red").is_none());
    }

    #[test]
    fn test_seeded_record_is_reused() {
        let mut factory: FlyweightFactory<CarModel> =
            FlyweightFactory::with_initial(vec![CarModel::new("BMW", "M5", "red")]);
        let seeded = factory.get("BMW_M5_red").unwrap();

        let (found, outcome) = factory.lookup(CarModel::new("BMW", "M5", "red"));
        assert_eq!(outcome, Lookup::Hit);
        assert!(Arc::ptr_eq(&seeded, &found));
    }

    #[test]
    fn test_stats_track_hits_and_misses() {
        let mut factory: FlyweightFactory<Attributes> = FlyweightFactory::new();
        factory.get_or_create(["a"]);
        factory.get_or_create(["a"]);
        factory.get_or_create(["a"]);
        factory.get_or_create(["b"]);

        let stats = factory.stats();
        assert_eq!(stats, CacheStats { hits: 2, misses: 2 });
        assert_eq!(stats.lookups(), 4);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_contains_does_not_insert() {
        let factory: FlyweightFactory<CarModel> = FlyweightFactory::new();
        assert!(!factory.contains(&CarModel::new("BMW", "M5", "red")));
        assert!(factory.is_empty());
    }

    #[test]
    fn test_listing_is_sorted() {
        let factory: FlyweightFactory<Attributes> =
            FlyweightFactory::with_initial([["BMW", "X6", "white"], ["BMW", "M5", "red"]]);
        assert_eq!(
            factory.listing(),
            "FlyweightFactory: I have 2 flyweights.\nBMW_M5_red\nBMW_X6_white"
        );
    }

    #[test]
    fn test_seeded_record_carries_derived_key() {
        let factory: FlyweightFactory<Attributes> =
            FlyweightFactory::with_initial([["red", "BMW", "M5"], ["M5", "BMW", "red"]]);
        assert_eq!(factory.count(), 1);

        let record = factory.get("BMW_M5_red").unwrap();
        assert_eq!(record.key().as_str(), "BMW_M5_red");
        assert_eq!(record.intrinsic().values(), ["red", "BMW", "M5"]);
    }

    #[test]
    fn test_empty_listing_has_header_only() {
        let factory: FlyweightFactory<Attributes> = FlyweightFactory::new();
        assert_eq!(factory.listing(), "FlyweightFactory: I have 0 flyweights.");
    }

    fn attribute_values() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-zA-Z0-9]{1,8}", 0..6)
    }

    proptest! {
        #[test]
        fn test_permutations_share_instance(
            (original, shuffled) in attribute_values()
                .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
        ) {
            let mut factory: FlyweightFactory<Attributes> = FlyweightFactory::new();
            let a = factory.get_or_create(Attributes::from(original));
            let b = factory.get_or_create(Attributes::from(shuffled));
            prop_assert!(Arc::ptr_eq(&a, &b));
            prop_assert_eq!(factory.count(), 1);
        }

        #[test]
        fn test_different_multisets_get_distinct_instances(
            a in attribute_values(),
            b in attribute_values(),
        ) {
            let mut sorted_a = a.clone();
            let mut sorted_b = b.clone();
            sorted_a.sort();
            sorted_b.sort();
            prop_assume!(sorted_a != sorted_b);

            let mut factory: FlyweightFactory<Attributes> = FlyweightFactory::new();
            let ra = factory.get_or_create(Attributes::from(a));
            let rb = factory.get_or_create(Attributes::from(b));
            prop_assert!(!Arc::ptr_eq(&ra, &rb));
            prop_assert_eq!(factory.count(), 2);
        }
    }
}
