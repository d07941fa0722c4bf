//! Genome-wide interval indexing.
//!
//! [`IntervalIndex`] keeps one [`ChromBits`] per chromosome. It is built once and is
//! only read afterwards, so a single index can be shared by reference between any
//! number of worker threads.
//!
//! # Examples
//!
//! ```
//! use regnet_core::models::GenomicInterval;
//! use regnet_overlaprs::{IntervalIndex, IntoIntervalIndex};
//!
//! let peaks = vec![
//!     GenomicInterval::new("chr1", 100, 200, 5.0).unwrap(),
//!     GenomicInterval::new("chr1", 150, 300, 3.0).unwrap(),
//!     GenomicInterval::new("chr2", 100, 200, 1.0).unwrap(),
//! ];
//! let index = peaks.into_interval_index();
//!
//! let query = GenomicInterval::new("chr1", 180, 250, 0.0).unwrap();
//! assert_eq!(index.overlaps(&query).len(), 2);
//! ```

use fxhash::FxHashMap;

use regnet_core::errors::RegnetError;
use regnet_core::models::{GenomicInterval, Located};

use crate::bits::ChromBits;

/// A genome-wide index for overlap queries across multiple chromosomes.
#[derive(Debug, Clone)]
pub struct IntervalIndex<T> {
    index_maps: FxHashMap<String, ChromBits<T>>,
}

impl<T> Default for IntervalIndex<T> {
    fn default() -> Self {
        IntervalIndex {
            index_maps: FxHashMap::default(),
        }
    }
}

impl<T: Located> IntervalIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collection of features, grouping them by chromosome.
    pub fn insert<I: IntoIterator<Item = T>>(&mut self, items: I) {
        let mut grouped: FxHashMap<String, Vec<T>> = FxHashMap::default();
        for item in items {
            grouped
                .entry(item.interval().chr().to_string())
                .or_default()
                .push(item);
        }
        for (chr, items) in grouped {
            self.index_maps.entry(chr).or_default().extend(items);
        }
    }

    /// All stored features intersecting `query`, ordered by start then end.
    /// A chromosome with no features gives an empty result.
    pub fn overlaps(&self, query: &GenomicInterval) -> Vec<&T> {
        self.find_iter(query.chr(), query.start(), query.end())
            .collect()
    }

    /// Iterate over the features on `chr` overlapping `[start, end)`.
    pub fn find_iter<'a>(&'a self, chr: &str, start: u32, end: u32) -> impl Iterator<Item = &'a T> + 'a {
        self.index_maps
            .get(chr)
            .map(|bits| bits.find_iter(start, end))
            .into_iter()
            .flatten()
    }

    /// Total number of stored features.
    pub fn len(&self) -> usize {
        self.index_maps.values().map(|b| b.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.index_maps.values().all(|b| b.is_empty())
    }

    /// Chromosome names, sorted.
    pub fn chromosomes(&self) -> Vec<&str> {
        let mut chrs: Vec<&str> = self.index_maps.keys().map(|c| c.as_str()).collect();
        chrs.sort_unstable();
        chrs
    }

    /// The sorted features of one chromosome.
    pub fn chromosome(&self, chr: &str) -> &[T] {
        self.index_maps.get(chr).map(|b| b.items()).unwrap_or(&[])
    }

    /// Every feature in `(chr, start, end)` order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.chromosomes()
            .into_iter()
            .flat_map(move |chr| self.chromosome(chr).iter())
    }

    /// Fail with [`RegnetError::EmptyIntervalSet`] when nothing has been loaded, for
    /// stages that can not run without features.
    pub fn require_non_empty(&self, what: &str) -> Result<(), RegnetError> {
        if self.is_empty() {
            return Err(RegnetError::EmptyIntervalSet(what.to_string()));
        }
        Ok(())
    }
}

/// A trait for converting a collection of located features into an [`IntervalIndex`].
pub trait IntoIntervalIndex<T> {
    /// Consumes the input and builds an index over it.
    fn into_interval_index(self) -> IntervalIndex<T>;
}

impl<T: Located> IntoIntervalIndex<T> for Vec<T> {
    fn into_interval_index(self) -> IntervalIndex<T> {
        let mut index = IntervalIndex::new();
        index.insert(self);
        index
    }
}
