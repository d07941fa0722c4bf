use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::RegnetError;

/// DNA strand of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
}

impl FromStr for Strand {
    type Err = RegnetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Err(RegnetError::Parse(format!("Unknown strand: {}", s))),
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

///
/// A genomic interval on one chromosome. Coordinates are 0-based and half-open,
/// `[start, end)`. Construction guarantees `start < end`; the fields are private
/// so an interval can not be altered after it is created.
///
#[derive(Debug, Clone, PartialEq)]
pub struct GenomicInterval {
    chr: String,
    start: u32,
    end: u32,
    strand: Option<Strand>,
    score: f64,
}

impl GenomicInterval {
    pub fn new(chr: impl Into<String>, start: u32, end: u32, score: f64) -> Result<Self, RegnetError> {
        let chr = chr.into();
        if start >= end {
            return Err(RegnetError::InvalidInterval { chr, start, end });
        }
        if !score.is_finite() {
            return Err(RegnetError::InvalidScore(format!(
                "interval {}:{}-{} has non-finite score {}",
                chr, start, end, score
            )));
        }
        Ok(GenomicInterval {
            chr,
            start,
            end,
            strand: None,
            score,
        })
    }

    /// Attach a strand to a freshly built interval.
    pub fn with_strand(mut self, strand: Option<Strand>) -> Self {
        self.strand = strand;
        self
    }

    pub fn chr(&self) -> &str {
        &self.chr
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn strand(&self) -> Option<Strand> {
        self.strand
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn width(&self) -> u32 {
        self.end - self.start
    }

    /// Midpoint of the interval: `start + width / 2`.
    pub fn mid_point(&self) -> u32 {
        self.start + self.width() / 2
    }

    /// Check if this interval overlaps `[start, end)` on the same chromosome.
    #[inline]
    pub fn overlaps(&self, chr: &str, start: u32, end: u32) -> bool {
        self.chr == chr && self.start < end && self.end > start
    }

    /// Widen the interval by `flank` bases on both sides, saturating at 0.
    pub fn extend(&self, flank: u32) -> GenomicInterval {
        GenomicInterval {
            chr: self.chr.clone(),
            start: self.start.saturating_sub(flank),
            end: self.end.saturating_add(flank),
            strand: self.strand,
            score: self.score,
        }
    }

    /// Ordering by (chr, start, end), used for sorting whole collections.
    pub fn cmp_position(&self, other: &GenomicInterval) -> Ordering {
        self.chr
            .cmp(&other.chr)
            .then(self.start.cmp(&other.start))
            .then(self.end.cmp(&other.end))
    }

    pub fn as_string(&self) -> String {
        format!("{}\t{}\t{}\t{}", self.chr, self.start, self.end, self.score)
    }
}

impl Display for GenomicInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chr, self.start, self.end)
    }
}

/// Anything that sits at a single genomic interval and can therefore be
/// stored in an interval index.
pub trait Located {
    fn interval(&self) -> &GenomicInterval;
}

impl Located for GenomicInterval {
    fn interval(&self) -> &GenomicInterval {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(100, 100)]
    #[case(200, 100)]
    fn test_rejects_empty_or_reversed(#[case] start: u32, #[case] end: u32) {
        let result = GenomicInterval::new("chr1", start, end, 1.0);
        assert!(matches!(result, Err(RegnetError::InvalidInterval { .. })));
    }

    #[rstest]
    fn test_rejects_nan_score() {
        let result = GenomicInterval::new("chr1", 0, 10, f64::NAN);
        assert!(matches!(result, Err(RegnetError::InvalidScore(_))));
    }

    #[rstest]
    fn test_mid_point_and_width() {
        let iv = GenomicInterval::new("chr1", 100, 201, 0.0).unwrap();
        assert_eq!(iv.width(), 101);
        assert_eq!(iv.mid_point(), 150);
    }

    #[rstest]
    fn test_overlap_is_half_open() {
        let iv = GenomicInterval::new("chr1", 100, 200, 0.0).unwrap();
        assert!(iv.overlaps("chr1", 199, 300));
        assert!(!iv.overlaps("chr1", 200, 300));
        assert!(!iv.overlaps("chr2", 150, 160));
    }

    #[rstest]
    fn test_extend_saturates_at_zero() {
        let iv = GenomicInterval::new("chr1", 50, 60, 0.0).unwrap();
        let wide = iv.extend(100);
        assert_eq!(wide.start(), 0);
        assert_eq!(wide.end(), 160);
    }

    #[rstest]
    fn test_parse_strand() {
        assert_eq!("+".parse::<Strand>().unwrap(), Strand::Forward);
        assert_eq!("-".parse::<Strand>().unwrap(), Strand::Reverse);
        assert!(".".parse::<Strand>().is_err());
    }
}
