use serde::{Deserialize, Serialize};

/// Normalized differential influence of one TF, with its 1-based rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfluenceScore {
    pub tf_id: String,
    pub score: f64,
    pub rank: usize,
}

impl InfluenceScore {
    pub fn as_string(&self) -> String {
        format!("{}\t{}\t{}", self.tf_id, self.score, self.rank)
    }
}
