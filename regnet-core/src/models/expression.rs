use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::RegnetError;

///
/// Expression (or accessibility) values of one gene or TF across samples.
///
/// Vectors read from the same matrix share one list of sample labels so that two
/// vectors can be checked for matching sample order before they are compared.
///
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionVector {
    id: String,
    values: Vec<f64>,
    samples: Option<Arc<Vec<String>>>,
}

impl ExpressionVector {
    /// Create a vector without sample labels; only its length is checked on comparison.
    pub fn new(id: impl Into<String>, values: Vec<f64>) -> Result<Self, RegnetError> {
        let id = id.into();
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(RegnetError::InvalidScore(format!(
                "expression vector {} contains non-finite value {}",
                id, bad
            )));
        }
        Ok(ExpressionVector {
            id,
            values,
            samples: None,
        })
    }

    /// Create a vector whose values are labelled by `samples`.
    pub fn with_samples(
        id: impl Into<String>,
        values: Vec<f64>,
        samples: Arc<Vec<String>>,
    ) -> Result<Self, RegnetError> {
        let mut vector = ExpressionVector::new(id, values)?;
        if samples.len() != vector.values.len() {
            return Err(RegnetError::DimensionMismatch {
                left: vector.id,
                left_len: vector.values.len(),
                right: "sample header".to_string(),
                right_len: samples.len(),
            });
        }
        vector.samples = Some(samples);
        Ok(vector)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn samples(&self) -> Option<&[String]> {
        self.samples.as_ref().map(|s| s.as_slice())
    }

    ///
    /// Ensure `other` can be compared sample-by-sample with this vector: equal length
    /// and, when both carry labels, identical sample order.
    ///
    pub fn check_compatible(&self, other: &ExpressionVector) -> Result<(), RegnetError> {
        let labels_differ = match (&self.samples, &other.samples) {
            (Some(a), Some(b)) => !Arc::ptr_eq(a, b) && a != b,
            _ => false,
        };
        if self.len() != other.len() || labels_differ {
            return Err(RegnetError::DimensionMismatch {
                left: self.id.clone(),
                left_len: self.len(),
                right: other.id.clone(),
                right_len: other.len(),
            });
        }
        Ok(())
    }
}

///
/// A gene-by-sample matrix; each row becomes an [`ExpressionVector`].
///
#[derive(Debug, Clone, Default)]
pub struct ExpressionMatrix {
    samples: Arc<Vec<String>>,
    rows: Vec<ExpressionVector>,
}

impl ExpressionMatrix {
    pub fn new(samples: Vec<String>) -> Self {
        ExpressionMatrix {
            samples: Arc::new(samples),
            rows: Vec::new(),
        }
    }

    /// Add a row, rejecting it when its length does not match the header.
    pub fn push_row(&mut self, id: impl Into<String>, values: Vec<f64>) -> Result<(), RegnetError> {
        let row = ExpressionVector::with_samples(id, values, Arc::clone(&self.samples))?;
        self.rows.push(row);
        Ok(())
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn rows(&self) -> &[ExpressionVector] {
        &self.rows
    }

    pub fn get(&self, id: &str) -> Option<&ExpressionVector> {
        self.rows.iter().find(|r| r.id() == id)
    }

    /// Rows whose id satisfies `keep`, in matrix order.
    pub fn select<F>(&self, keep: F) -> Vec<ExpressionVector>
    where
        F: Fn(&str) -> bool,
    {
        self.rows.iter().filter(|r| keep(r.id())).cloned().collect()
    }
}

/// Correlation between one TF and one target across samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEdge {
    pub tf_id: String,
    pub gene_id: String,
    pub correlation: f64,
    /// Set when either vector had zero variance; `correlation` is then 0.
    pub zero_variance: bool,
}

impl CorrelationEdge {
    pub fn new(
        tf_id: impl Into<String>,
        gene_id: impl Into<String>,
        correlation: f64,
    ) -> Result<Self, RegnetError> {
        let tf_id = tf_id.into();
        let gene_id = gene_id.into();
        if !(-1.0..=1.0).contains(&correlation) {
            return Err(RegnetError::InvalidScore(format!(
                "correlation {} for {} -> {} is outside [-1, 1]",
                correlation, tf_id, gene_id
            )));
        }
        Ok(CorrelationEdge {
            tf_id,
            gene_id,
            correlation,
            zero_variance: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_matrix_rows_share_samples() {
        let mut matrix = ExpressionMatrix::new(vec!["s1".into(), "s2".into(), "s3".into()]);
        matrix.push_row("TP63", vec![1.0, 2.0, 3.0]).unwrap();
        matrix.push_row("KRT5", vec![2.0, 4.0, 6.0]).unwrap();

        let tp63 = matrix.get("TP63").unwrap();
        let krt5 = matrix.get("KRT5").unwrap();
        assert!(tp63.check_compatible(krt5).is_ok());
        assert_eq!(tp63.samples().unwrap(), matrix.samples());
    }

    #[rstest]
    fn test_row_length_must_match_header() {
        let mut matrix = ExpressionMatrix::new(vec!["s1".into(), "s2".into()]);
        let result = matrix.push_row("TP63", vec![1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(RegnetError::DimensionMismatch { .. })));
    }

    #[rstest]
    fn test_sample_order_mismatch() {
        let a = ExpressionVector::with_samples(
            "A",
            vec![1.0, 2.0],
            Arc::new(vec!["s1".into(), "s2".into()]),
        )
        .unwrap();
        let b = ExpressionVector::with_samples(
            "B",
            vec![1.0, 2.0],
            Arc::new(vec!["s2".into(), "s1".into()]),
        )
        .unwrap();
        assert!(a.check_compatible(&b).is_err());
    }

    #[rstest]
    fn test_length_mismatch_unlabelled() {
        let a = ExpressionVector::new("A", vec![1.0, 2.0]).unwrap();
        let b = ExpressionVector::new("B", vec![1.0, 2.0, 3.0]).unwrap();
        assert!(a.check_compatible(&b).is_err());
    }

    #[rstest]
    fn test_non_finite_rejected() {
        assert!(ExpressionVector::new("A", vec![1.0, f64::INFINITY]).is_err());
    }

    #[rstest]
    fn test_select_rows() {
        let mut matrix = ExpressionMatrix::new(vec!["s1".into()]);
        matrix.push_row("TP63", vec![1.0]).unwrap();
        matrix.push_row("KRT5", vec![2.0]).unwrap();
        let tfs = matrix.select(|id| id == "TP63");
        assert_eq!(tfs.len(), 1);
        assert_eq!(tfs[0].id(), "TP63");
    }
}
