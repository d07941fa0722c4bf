//! Genomic interval indexing for regnet.
//!
//! This crate stores peaks, motif hits and any other [`Located`](regnet_core::models::Located)
//! feature in an [`IntervalIndex`]: features are grouped by chromosome and kept
//! sorted, so overlap queries are a binary search followed by a short linear scan,
//! and merging overlapping features is a single sweep.
//!
//! ## Quick Start
//!
//! ```rust
//! use regnet_core::config::MergeScorePolicy;
//! use regnet_core::models::GenomicInterval;
//! use regnet_overlaprs::IntoIntervalIndex;
//!
//! let peaks = vec![
//!     GenomicInterval::new("chr1", 100, 200, 5.0).unwrap(),
//!     GenomicInterval::new("chr1", 150, 300, 3.0).unwrap(),
//! ];
//! let index = peaks.into_interval_index();
//!
//! let merged = index.merge_overlapping(MergeScorePolicy::Max).unwrap();
//! assert_eq!(merged.len(), 1);
//! assert_eq!((merged[0].start(), merged[0].end()), (100, 300));
//! assert_eq!(merged[0].score(), 5.0);
//! ```
//!
//! An index is never mutated while it is being queried, and every type here is
//! `Send + Sync` whenever the stored feature is, so one index can serve many
//! scoring threads at once.

/// Binary Interval Search over one chromosome.
///
/// See [`bits::ChromBits`] for details.
pub mod bits;

/// Genome-wide interval indexing.
pub mod interval_index;

/// Merging of overlapping intervals.
pub mod merge;

// re-exports
pub use self::bits::ChromBits;
pub use self::interval_index::{IntervalIndex, IntoIntervalIndex};
