use regnet_core::models::Located;

/// A Binary Interval Search list for the features of a single chromosome.
///
/// From the journal article: <https://academic.oup.com/bioinformatics/article/29/1/1/273289>
///
/// Features are kept sorted by `(start, end)`. A query binary-searches for the first
/// feature that could reach the query (its start is at least `query.start - max_len`)
/// and then scans forward until features start past the query end, so results come
/// out in `(start, end)` order without a second sort.
#[derive(Debug, Clone)]
pub struct ChromBits<T> {
    /// Features sorted by start, then end
    items: Vec<T>,
    /// The length of the longest feature
    max_len: u32,
}

impl<T> Default for ChromBits<T> {
    fn default() -> Self {
        ChromBits {
            items: Vec::new(),
            max_len: 0,
        }
    }
}

impl<T: Located> ChromBits<T> {
    /// Create a new list. The features are sorted immediately.
    pub fn build(items: Vec<T>) -> Self {
        let mut bits = ChromBits {
            items,
            max_len: 0,
        };
        bits.reindex();
        bits
    }

    /// Add features after the list has been built. This re-sorts the whole list, so
    /// batch the additions where possible.
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) {
        self.items.extend(items);
        self.reindex();
    }

    fn reindex(&mut self) {
        // stable, so features at identical coordinates keep insertion order
        self.items.sort_by(|a, b| {
            let (a, b) = (a.interval(), b.interval());
            a.start().cmp(&b.start()).then(a.end().cmp(&b.end()))
        });
        self.max_len = self
            .items
            .iter()
            .map(|i| i.interval().width())
            .max()
            .unwrap_or(0);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All features, in sorted order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Determine the first index that we should start checking for overlaps for via a binary
    /// search.
    /// Assumes that the maximum feature length has been subtracted from `start`, otherwise
    /// the result is undefined
    #[inline]
    pub fn lower_bound(start: u32, items: &[T]) -> usize {
        let mut size = items.len();
        let mut low = 0;

        while size > 0 {
            let half = size / 2;
            let other_half = size - half;
            let probe = low + half;
            let other_low = low + other_half;
            let v = items[probe].interval();
            size = half;
            low = if v.start() < start { other_low } else { low }
        }
        low
    }

    /// Find all features that overlap `start .. stop`.
    #[inline]
    pub fn find_iter(&self, start: u32, stop: u32) -> IterFind<'_, T> {
        IterFind {
            inner: self,
            off: Self::lower_bound(start.saturating_sub(self.max_len), &self.items),
            start,
            stop,
        }
    }

    /// Count the features overlapping `start .. stop`.
    pub fn count(&self, start: u32, stop: u32) -> usize {
        self.find_iter(start, stop).count()
    }
}

/// An iterator over the features of a [`ChromBits`] that overlap a query range.
#[derive(Debug)]
pub struct IterFind<'a, T> {
    inner: &'a ChromBits<T>,
    off: usize,
    start: u32,
    stop: u32,
}

impl<'a, T: Located> Iterator for IterFind<'a, T> {
    type Item = &'a T;

    #[inline]
    // feature.start < stop && feature.end > start
    fn next(&mut self) -> Option<Self::Item> {
        while self.off < self.inner.items.len() {
            let item = &self.inner.items[self.off];
            let interval = item.interval();
            self.off += 1;
            if interval.start() < self.stop && interval.end() > self.start {
                return Some(item);
            } else if interval.start() >= self.stop {
                break;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use regnet_core::models::GenomicInterval;
    use rstest::{fixture, rstest};

    fn iv(start: u32, end: u32) -> GenomicInterval {
        GenomicInterval::new("chr1", start, end, 0.0).unwrap()
    }

    fn coords(found: Vec<&GenomicInterval>) -> Vec<(u32, u32)> {
        found.iter().map(|i| (i.start(), i.end())).collect()
    }

    #[fixture]
    fn bits() -> ChromBits<GenomicInterval> {
        ChromBits::build(vec![iv(6, 10), iv(1, 5), iv(8, 12), iv(3, 7), iv(1, 3)])
    }

    #[rstest]
    fn test_build_sorts(bits: ChromBits<GenomicInterval>) {
        let all: Vec<(u32, u32)> = bits.items().iter().map(|i| (i.start(), i.end())).collect();
        assert_eq!(all, vec![(1, 3), (1, 5), (3, 7), (6, 10), (8, 12)]);
        assert_eq!(bits.len(), 5);
    }

    #[rstest]
    fn test_find_in_order(bits: ChromBits<GenomicInterval>) {
        let found = coords(bits.find_iter(4, 9).collect());
        assert_eq!(found, vec![(1, 5), (3, 7), (6, 10), (8, 12)]);
    }

    #[rstest]
    fn test_half_open_boundaries(bits: ChromBits<GenomicInterval>) {
        // [1,3) ends where the query starts, [8,12) starts where the query ends
        let found = coords(bits.find_iter(3, 8).collect());
        assert_eq!(found, vec![(1, 5), (3, 7), (6, 10)]);
    }

    #[rstest]
    fn test_long_feature_found_from_far_right() {
        let bits = ChromBits::build(vec![iv(0, 1000), iv(10, 20), iv(500, 510)]);
        let found = coords(bits.find_iter(900, 950).collect());
        assert_eq!(found, vec![(0, 1000)]);
    }

    #[rstest]
    fn test_no_overlap_is_empty(bits: ChromBits<GenomicInterval>) {
        assert_eq!(bits.count(20, 30), 0);
        assert_eq!(ChromBits::<GenomicInterval>::default().count(0, 10), 0);
    }

    #[rstest]
    fn test_extend_keeps_sorted(mut bits: ChromBits<GenomicInterval>) {
        bits.extend(vec![iv(0, 2)]);
        assert_eq!(bits.items()[0].start(), 0);
        assert_eq!(bits.count(0, 1), 1);
    }
}
