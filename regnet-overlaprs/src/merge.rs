use regnet_core::config::MergeScorePolicy;
use regnet_core::errors::RegnetError;
use regnet_core::models::{GenomicInterval, Strand};

use crate::interval_index::IntervalIndex;

impl IntervalIndex<GenomicInterval> {
    ///
    /// Replace every group of overlapping intervals on a chromosome by their union.
    ///
    /// Two intervals overlap when `end_a > start_b && end_b > start_a`; touching
    /// intervals (`end_a == start_b`) are kept apart. The merged interval spans
    /// `[min start, max end)` and its score is the max or the sum of the merged scores,
    /// depending on `policy`. A strand is kept only if all merged intervals share it.
    ///
    /// The index itself is not modified. The result is sorted by `(chr, start)` and
    /// contains no overlapping intervals, so merging it again returns it unchanged.
    ///
    pub fn merge_overlapping(
        &self,
        policy: MergeScorePolicy,
    ) -> Result<Vec<GenomicInterval>, RegnetError> {
        let mut merged: Vec<GenomicInterval> = Vec::new();

        for chr in self.chromosomes() {
            let intervals = self.chromosome(chr);
            let Some(first) = intervals.first() else {
                continue;
            };

            let mut current = Run::open(first);
            for interval in &intervals[1..] {
                // sorted by start, so only the end of the current run matters
                if interval.start() < current.end {
                    current.absorb(interval, policy);
                } else {
                    merged.push(current.finish(chr)?);
                    current = Run::open(interval);
                }
            }
            merged.push(current.finish(chr)?);
        }

        log::debug!(
            "Merged {} intervals into {} ({:?} score policy)",
            self.len(),
            merged.len(),
            policy
        );

        Ok(merged)
    }
}

/// An open run of overlapping intervals during the sweep.
struct Run {
    start: u32,
    end: u32,
    score: f64,
    strand: Option<Strand>,
    mixed_strand: bool,
}

impl Run {
    fn open(interval: &GenomicInterval) -> Self {
        Run {
            start: interval.start(),
            end: interval.end(),
            score: interval.score(),
            strand: interval.strand(),
            mixed_strand: false,
        }
    }

    fn absorb(&mut self, interval: &GenomicInterval, policy: MergeScorePolicy) {
        self.end = self.end.max(interval.end());
        self.score = match policy {
            MergeScorePolicy::Max => self.score.max(interval.score()),
            MergeScorePolicy::Sum => self.score + interval.score(),
        };
        if self.strand != interval.strand() {
            self.mixed_strand = true;
        }
    }

    fn finish(self, chr: &str) -> Result<GenomicInterval, RegnetError> {
        let strand = if self.mixed_strand { None } else { self.strand };
        Ok(GenomicInterval::new(chr, self.start, self.end, self.score)?.with_strand(strand))
    }
}
