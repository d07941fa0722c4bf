use serde::{Deserialize, Serialize};

use regnet_core::models::InfluenceScore;

/// Column names for [`TfInfluence::as_string`].
pub const REPORT_HEADER: &str = "tf_id\trank\tscore\tcomposite\tout_weight_a\tout_weight_b\tdelta\ttargets_a\ttargets_b\tnovel_targets\tnovel_ratio";

/// Every value that went into one TF's influence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfInfluence {
    pub tf_id: String,
    pub rank: usize,
    /// `composite` normalized by the largest absolute composite
    pub score: f64,
    pub composite: f64,
    pub out_weight_a: f64,
    pub out_weight_b: f64,
    pub delta: f64,
    pub targets_a: usize,
    pub targets_b: usize,
    pub novel_targets: usize,
    pub novel_ratio: f64,
}

impl TfInfluence {
    pub fn as_string(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.tf_id,
            self.rank,
            self.score,
            self.composite,
            self.out_weight_a,
            self.out_weight_b,
            self.delta,
            self.targets_a,
            self.targets_b,
            self.novel_targets,
            self.novel_ratio
        )
    }
}

/// Ranked influence of every reported TF, best first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InfluenceReport {
    pub tfs: Vec<TfInfluence>,
}

impl InfluenceReport {
    pub fn scores(&self) -> Vec<InfluenceScore> {
        self.tfs
            .iter()
            .map(|t| InfluenceScore {
                tf_id: t.tf_id.clone(),
                score: t.score,
                rank: t.rank,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tfs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tfs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn report() -> InfluenceReport {
        InfluenceReport {
            tfs: vec![TfInfluence {
                tf_id: "TP63".to_string(),
                rank: 1,
                score: 1.0,
                composite: 1.5,
                out_weight_a: 0.0,
                out_weight_b: 0.5,
                delta: 0.5,
                targets_a: 0,
                targets_b: 1,
                novel_targets: 1,
                novel_ratio: 1.0,
            }],
        }
    }

    #[rstest]
    fn test_tsv_row_matches_header(report: InfluenceReport) {
        let row = report.tfs[0].as_string();
        assert_eq!(row.split('\t').count(), REPORT_HEADER.split('\t').count());
        assert!(row.starts_with("TP63\t1\t1\t1.5"));
    }

    #[rstest]
    fn test_json_has_named_fields(report: InfluenceReport) {
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["tfs"][0]["tf_id"], "TP63");
        assert_eq!(json["tfs"][0]["novel_targets"], 1);
    }

    #[rstest]
    fn test_scores(report: InfluenceReport) {
        assert_eq!(
            report.scores(),
            vec![InfluenceScore {
                tf_id: "TP63".to_string(),
                score: 1.0,
                rank: 1
            }]
        );
    }
}
