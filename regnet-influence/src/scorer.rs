use std::collections::{BTreeSet, HashMap};

use regnet_core::config::InfluenceConfig;
use regnet_core::errors::RegnetError;
use regnet_core::models::{InfluenceScore, RegulatoryNetwork};

use crate::report::{InfluenceReport, TfInfluence};

///
/// Ranks TFs by how much their regulatory output changes from network `a` (the
/// source state) to network `b` (the target state).
///
/// For every TF with out-edges in either network the scorer takes
///
/// - the change in total out-edge weight, `out_b - out_a`, where each edge weight is
///   optionally scaled by a per-gene weight such as a differential expression score
/// - the fraction of the TF's targets in `b` that are not targets in `a`
///
/// and combines them as `delta_weight * delta + novelty_weight * novel_ratio`. The
/// composites are divided by the largest absolute composite, so the strongest TF
/// scores 1.0 (or -1.0).
///
#[derive(Debug, Clone)]
pub struct InfluenceScorer {
    config: InfluenceConfig,
    gene_weights: HashMap<String, f64>,
}

impl InfluenceScorer {
    pub fn new(config: InfluenceConfig) -> Result<Self, RegnetError> {
        config.validate()?;
        Ok(InfluenceScorer {
            config,
            gene_weights: HashMap::new(),
        })
    }

    ///
    /// Scale each edge by the weight of its target gene. Genes absent from `weights`
    /// keep weight 1.
    ///
    pub fn with_gene_weights(mut self, weights: HashMap<String, f64>) -> Result<Self, RegnetError> {
        if let Some((gene, w)) = weights.iter().find(|(_, w)| !(w.is_finite() && **w >= 0.0)) {
            return Err(RegnetError::InvalidScore(format!(
                "gene weight {} for {} must be finite and non-negative",
                w, gene
            )));
        }
        self.gene_weights = weights;
        Ok(self)
    }

    pub fn config(&self) -> &InfluenceConfig {
        &self.config
    }

    fn gene_weight(&self, gene_id: &str) -> f64 {
        self.gene_weights.get(gene_id).copied().unwrap_or(1.0)
    }

    fn weighted_out(&self, network: &RegulatoryNetwork, tf_id: &str) -> f64 {
        network
            .out_edges(tf_id)
            .map(|e| e.weight * self.gene_weight(&e.gene_id))
            .sum()
    }

    /// Ranked scores, at most `top_n` of them.
    pub fn compare(
        &self,
        a: &RegulatoryNetwork,
        b: &RegulatoryNetwork,
    ) -> Result<Vec<InfluenceScore>, RegnetError> {
        Ok(self.compare_detailed(a, b)?.scores())
    }

    /// Like [`InfluenceScorer::compare`], keeping every intermediate value per TF.
    pub fn compare_detailed(
        &self,
        a: &RegulatoryNetwork,
        b: &RegulatoryNetwork,
    ) -> Result<InfluenceReport, RegnetError> {
        if a.is_empty() && b.is_empty() {
            return Err(RegnetError::EmptyNetwork);
        }

        let tfs: BTreeSet<&str> = a.tfs().union(&b.tfs()).copied().collect();

        let mut rows: Vec<TfInfluence> = tfs
            .into_iter()
            .map(|tf| {
                let out_weight_a = self.weighted_out(a, tf);
                let out_weight_b = self.weighted_out(b, tf);
                let targets_a = a.targets(tf);
                let targets_b = b.targets(tf);
                let novel_targets = targets_b.difference(&targets_a).count();
                let novel_ratio = if targets_b.is_empty() {
                    0.0
                } else {
                    novel_targets as f64 / targets_b.len() as f64
                };
                let delta = out_weight_b - out_weight_a;
                TfInfluence {
                    tf_id: tf.to_string(),
                    rank: 0,
                    score: 0.0,
                    composite: self.config.delta_weight * delta
                        + self.config.novelty_weight * novel_ratio,
                    out_weight_a,
                    out_weight_b,
                    delta,
                    targets_a: targets_a.len(),
                    targets_b: targets_b.len(),
                    novel_targets,
                    novel_ratio,
                }
            })
            .collect();

        let max_abs = rows.iter().map(|r| r.composite.abs()).fold(0.0_f64, f64::max);
        for row in rows.iter_mut() {
            row.score = if max_abs > 0.0 {
                row.composite / max_abs
            } else {
                0.0
            };
        }

        rows.sort_by(|x, y| {
            y.score
                .total_cmp(&x.score)
                .then_with(|| x.tf_id.cmp(&y.tf_id))
        });
        for (i, row) in rows.iter_mut().enumerate() {
            row.rank = i + 1;
        }

        let n_tfs = rows.len();
        if let Some(top_n) = self.config.top_n {
            rows.truncate(top_n);
        }

        log::info!(
            "Scored influence for {} TFs, reporting {} (a: {} edges, b: {} edges)",
            n_tfs,
            rows.len(),
            a.len(),
            b.len()
        );

        Ok(InfluenceReport { tfs: rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use regnet_core::models::{EdgeComponents, NetworkEdge};
    use rstest::*;

    fn network(edges: &[(&str, &str, f64)]) -> RegulatoryNetwork {
        RegulatoryNetwork::from_edges(edges.iter().map(|(tf, gene, w)| {
            NetworkEdge::new(*tf, *gene, *w, EdgeComponents::default()).unwrap()
        }))
        .unwrap()
    }

    fn scorer(top_n: Option<usize>) -> InfluenceScorer {
        InfluenceScorer::new(InfluenceConfig {
            top_n,
            ..Default::default()
        })
        .unwrap()
    }

    #[fixture]
    fn source() -> RegulatoryNetwork {
        network(&[("TP63", "KRT5", 0.5), ("SOX2", "KRT5", 0.4)])
    }

    #[fixture]
    fn target() -> RegulatoryNetwork {
        network(&[("TP63", "KRT5", 0.5), ("TP63", "KRT14", 0.5)])
    }

    #[rstest]
    fn test_gained_and_lost_influence(source: RegulatoryNetwork, target: RegulatoryNetwork) {
        let scores = scorer(None).compare(&source, &target).unwrap();
        assert_eq!(
            scores,
            vec![
                InfluenceScore {
                    tf_id: "TP63".to_string(),
                    score: 1.0,
                    rank: 1
                },
                InfluenceScore {
                    tf_id: "SOX2".to_string(),
                    score: -0.4,
                    rank: 2
                },
            ]
        );
    }

    #[rstest]
    fn test_rewired_tf_ranks_above_unchanged_tf() {
        let a = network(&[("TF1", "GeneX", 0.2), ("TF0", "GeneZ", 0.3)]);
        let b = network(&[
            ("TF1", "GeneX", 0.8),
            ("TF1", "GeneY", 0.5),
            ("TF0", "GeneZ", 0.3),
        ]);
        let scores = scorer(None).compare(&a, &b).unwrap();
        assert_eq!(
            scores,
            vec![
                InfluenceScore {
                    tf_id: "TF1".to_string(),
                    score: 1.0,
                    rank: 1
                },
                InfluenceScore {
                    tf_id: "TF0".to_string(),
                    score: 0.0,
                    rank: 2
                },
            ]
        );
    }

    #[rstest]
    fn test_self_comparison_is_zero(source: RegulatoryNetwork) {
        let scores = scorer(None).compare(&source, &source).unwrap();
        assert_eq!(scores.len(), 2);
        assert!(scores.iter().all(|s| s.score == 0.0));
        // all tied, so ranked by tf id
        assert_eq!(scores[0].tf_id, "SOX2");
        assert_eq!(scores[1].tf_id, "TP63");
    }

    #[rstest]
    fn test_top_n(source: RegulatoryNetwork, target: RegulatoryNetwork) {
        let scores = scorer(Some(1)).compare(&source, &target).unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].tf_id, "TP63");
    }

    #[rstest]
    fn test_both_empty() {
        let empty = RegulatoryNetwork::default();
        assert!(matches!(
            scorer(None).compare(&empty, &empty),
            Err(RegnetError::EmptyNetwork)
        ));
    }

    #[rstest]
    fn test_tf_only_in_one_network(source: RegulatoryNetwork) {
        let empty = RegulatoryNetwork::default();
        let report = scorer(None).compare_detailed(&empty, &source).unwrap();
        let tp63 = report.tfs.iter().find(|t| t.tf_id == "TP63").unwrap();
        assert_eq!(tp63.out_weight_a, 0.0);
        assert_eq!(tp63.novel_ratio, 1.0);
        assert_eq!(tp63.score, 1.0);
    }

    #[rstest]
    fn test_gene_weights(source: RegulatoryNetwork, target: RegulatoryNetwork) {
        let scorer = scorer(None)
            .with_gene_weights(HashMap::from([("KRT14".to_string(), 0.0)]))
            .unwrap();
        let report = scorer.compare_detailed(&source, &target).unwrap();
        let tp63 = report.tfs.iter().find(|t| t.tf_id == "TP63").unwrap();
        assert_eq!(tp63.delta, 0.0);
        assert_eq!(tp63.novel_targets, 1);
    }

    #[rstest]
    fn test_negative_gene_weight_rejected() {
        let result = scorer(None).with_gene_weights(HashMap::from([("KRT5".to_string(), -1.0)]));
        assert!(result.is_err());
    }

    #[rstest]
    fn test_invalid_weights_rejected() {
        let config = InfluenceConfig {
            delta_weight: 0.0,
            novelty_weight: 0.0,
            top_n: None,
        };
        assert!(InfluenceScorer::new(config).is_err());
    }
}
