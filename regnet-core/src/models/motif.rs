use crate::errors::RegnetError;
use crate::models::interval::{GenomicInterval, Located};

///
/// A single motif scan hit for one transcription factor.
///
#[derive(Debug, Clone, PartialEq)]
pub struct MotifHit {
    interval: GenomicInterval,
    tf_id: String,
    match_score: f64,
}

impl MotifHit {
    /// Create a hit. `match_score` must lie in `[0, 1]`.
    pub fn new(
        interval: GenomicInterval,
        tf_id: impl Into<String>,
        match_score: f64,
    ) -> Result<Self, RegnetError> {
        let tf_id = tf_id.into();
        if !(0.0..=1.0).contains(&match_score) {
            return Err(RegnetError::InvalidScore(format!(
                "motif hit for {} at {} has match score {} outside [0, 1]",
                tf_id, interval, match_score
            )));
        }
        Ok(MotifHit {
            interval,
            tf_id,
            match_score,
        })
    }

    pub fn tf_id(&self) -> &str {
        &self.tf_id
    }

    pub fn match_score(&self) -> f64 {
        self.match_score
    }
}

impl Located for MotifHit {
    fn interval(&self) -> &GenomicInterval {
        &self.interval
    }
}
