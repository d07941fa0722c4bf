use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::RegnetError;

/// Predicted binding strength of one TF at one gene, in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingScore {
    pub tf_id: String,
    pub gene_id: String,
    pub score: f64,
}

impl BindingScore {
    pub fn new(
        tf_id: impl Into<String>,
        gene_id: impl Into<String>,
        score: f64,
    ) -> Result<Self, RegnetError> {
        let tf_id = tf_id.into();
        let gene_id = gene_id.into();
        if !(0.0..=1.0).contains(&score) {
            return Err(RegnetError::InvalidScore(format!(
                "binding score {} for {} -> {} is outside [0, 1]",
                score, tf_id, gene_id
            )));
        }
        Ok(BindingScore {
            tf_id,
            gene_id,
            score,
        })
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.tf_id, &self.gene_id)
    }
}

///
/// Binding scores keyed uniquely by `(tf_id, gene_id)`. Inserting a score for a key
/// that is already present replaces the old value, it never accumulates.
///
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    scores: BTreeMap<(String, String), BindingScore>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a score, returning the one it replaced.
    pub fn insert(&mut self, score: BindingScore) -> Option<BindingScore> {
        self.scores
            .insert((score.tf_id.clone(), score.gene_id.clone()), score)
    }

    pub fn get(&self, tf_id: &str, gene_id: &str) -> Option<&BindingScore> {
        self.scores.get(&(tf_id.to_string(), gene_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Scores in `(tf_id, gene_id)` order.
    pub fn iter(&self) -> impl Iterator<Item = &BindingScore> {
        self.scores.values()
    }

    pub fn into_vec(self) -> Vec<BindingScore> {
        self.scores.into_values().collect()
    }
}

impl FromIterator<BindingScore> for BindingTable {
    fn from_iter<T: IntoIterator<Item = BindingScore>>(iter: T) -> Self {
        let mut table = BindingTable::new();
        for score in iter {
            table.insert(score);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_later_score_overwrites() {
        let table: BindingTable = vec![
            BindingScore::new("TP63", "KRT5", 0.2).unwrap(),
            BindingScore::new("TP63", "KRT14", 0.9).unwrap(),
            BindingScore::new("TP63", "KRT5", 0.7).unwrap(),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("TP63", "KRT5").unwrap().score, 0.7);
    }

    #[rstest]
    fn test_iteration_is_sorted_by_key() {
        let table: BindingTable = vec![
            BindingScore::new("SOX2", "A", 0.1).unwrap(),
            BindingScore::new("KLF4", "B", 0.1).unwrap(),
            BindingScore::new("KLF4", "A", 0.1).unwrap(),
        ]
        .into_iter()
        .collect();

        let keys: Vec<(&str, &str)> = table.iter().map(|s| s.key()).collect();
        assert_eq!(keys, vec![("KLF4", "A"), ("KLF4", "B"), ("SOX2", "A")]);
    }

    #[rstest]
    fn test_out_of_range_rejected() {
        assert!(BindingScore::new("TP63", "KRT5", 1.01).is_err());
    }
}
