use std::borrow::Cow;
use std::collections::HashMap;

use rayon::prelude::*;

use regnet_core::config::{CorrelationConfig, CorrelationMethod};
use regnet_core::errors::RegnetError;
use regnet_core::models::{CorrelationEdge, ExpressionVector, StageOutput};

///
/// Pearson correlation of two equal-length slices.
///
/// Returns `None` when either side has zero variance (including slices shorter
/// than two values), where the coefficient is undefined.
///
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    debug_assert_eq!(x.len(), y.len());
    if is_constant(x) || is_constant(y) {
        return None;
    }
    let dx = scaled_deviations(x)?;
    let dy = scaled_deviations(y)?;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in dx.iter().zip(&dy) {
        sxy += a * b;
        sxx += a * a;
        syy += b * b;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    // rounding can push |r| a hair over 1
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Deviations from the mean divided by the largest one, so they lie in `[-1, 1]` and
/// their squares neither underflow nor overflow.
fn scaled_deviations(values: &[f64]) -> Option<Vec<f64>> {
    let n = values.len() as f64;
    let mean: f64 = values.iter().map(|v| v / n).sum();
    let deviations: Vec<f64> = values.iter().map(|v| v - mean).collect();
    let scale = deviations.iter().fold(0.0_f64, |m, d| m.max(d.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }
    Some(deviations.into_iter().map(|d| d / scale).collect())
}

fn is_constant(values: &[f64]) -> bool {
    match values.first() {
        Some(first) => values.iter().all(|v| v == first),
        None => true,
    }
}

///
/// 1-based ranks of `values`, tied values sharing the average of their ranks.
///
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // positions i..=j hold ranks i+1..=j+1
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        i = j + 1;
    }
    ranks
}

///
/// Correlates TF expression with target gene expression across samples.
///
/// Every pair is independent, so pairs are spread over the rayon thread pool. A
/// pair whose vectors disagree on sample count or sample labels is skipped with
/// [`RegnetError::DimensionMismatch`]; a pair where either vector is constant gets
/// correlation 0 with the `zero_variance` flag set.
///
#[derive(Debug, Clone, Default)]
pub struct ExpressionCorrelator {
    method: CorrelationMethod,
}

impl ExpressionCorrelator {
    pub fn new(config: &CorrelationConfig) -> Self {
        ExpressionCorrelator {
            method: config.method,
        }
    }

    pub fn method(&self) -> CorrelationMethod {
        self.method
    }

    fn transform<'a>(&self, vector: &'a ExpressionVector) -> Cow<'a, [f64]> {
        match self.method {
            CorrelationMethod::Pearson => Cow::Borrowed(vector.values()),
            CorrelationMethod::Spearman => Cow::Owned(average_ranks(vector.values())),
        }
    }

    fn correlate_prepared(
        tf: &ExpressionVector,
        tf_values: &[f64],
        gene: &ExpressionVector,
        gene_values: &[f64],
    ) -> Result<CorrelationEdge, RegnetError> {
        tf.check_compatible(gene)?;
        match pearson(tf_values, gene_values) {
            Some(r) => CorrelationEdge::new(tf.id(), gene.id(), r),
            None => {
                let mut edge = CorrelationEdge::new(tf.id(), gene.id(), 0.0)?;
                edge.zero_variance = true;
                Ok(edge)
            }
        }
    }

    /// Correlate a single TF / gene pair.
    pub fn correlate_pair(
        &self,
        tf: &ExpressionVector,
        gene: &ExpressionVector,
    ) -> Result<CorrelationEdge, RegnetError> {
        Self::correlate_prepared(tf, &self.transform(tf), gene, &self.transform(gene))
    }

    ///
    /// Correlate every TF with every gene. Output follows TF order, then gene order.
    ///
    pub fn correlate(
        &self,
        tf_vectors: &[ExpressionVector],
        gene_vectors: &[ExpressionVector],
    ) -> StageOutput<CorrelationEdge> {
        let tfs = self.prepare(tf_vectors);
        let genes = self.prepare(gene_vectors);

        log::info!(
            "Correlating {} TFs with {} genes ({:?})",
            tfs.len(),
            genes.len(),
            self.method
        );

        let results: Vec<Result<CorrelationEdge, (String, RegnetError)>> = tfs
            .par_iter()
            .flat_map_iter(|(tf, tf_values)| {
                genes.iter().map(move |(gene, gene_values)| {
                    Self::correlate_prepared(tf, tf_values, gene, gene_values)
                        .map_err(|e| (pair_id(tf.id(), gene.id()), e))
                })
            })
            .collect();

        collect_output(results)
    }

    ///
    /// Correlate only the requested `(tf_id, gene_id)` pairs, in the order given. A
    /// pair naming an id with no vector is skipped with
    /// [`RegnetError::MissingExpression`].
    ///
    pub fn correlate_pairs(
        &self,
        tf_vectors: &[ExpressionVector],
        gene_vectors: &[ExpressionVector],
        pairs: &[(String, String)],
    ) -> StageOutput<CorrelationEdge> {
        let tfs: HashMap<&str, (&ExpressionVector, Cow<[f64]>)> = self
            .prepare(tf_vectors)
            .into_iter()
            .map(|p| (p.0.id(), p))
            .collect();
        let genes: HashMap<&str, (&ExpressionVector, Cow<[f64]>)> = self
            .prepare(gene_vectors)
            .into_iter()
            .map(|p| (p.0.id(), p))
            .collect();

        let results: Vec<Result<CorrelationEdge, (String, RegnetError)>> = pairs
            .par_iter()
            .map(|(tf_id, gene_id)| {
                let id = pair_id(tf_id, gene_id);
                let (tf, tf_values) = tfs
                    .get(tf_id.as_str())
                    .ok_or_else(|| (id.clone(), RegnetError::MissingExpression(tf_id.clone())))?;
                let (gene, gene_values) = genes
                    .get(gene_id.as_str())
                    .ok_or_else(|| (id.clone(), RegnetError::MissingExpression(gene_id.clone())))?;
                Self::correlate_prepared(tf, tf_values, gene, gene_values).map_err(|e| (id, e))
            })
            .collect();

        collect_output(results)
    }

    fn prepare<'a>(&self, vectors: &'a [ExpressionVector]) -> Vec<(&'a ExpressionVector, Cow<'a, [f64]>)> {
        vectors
            .par_iter()
            .map(|v| (v, self.transform(v)))
            .collect()
    }
}

fn pair_id(tf_id: &str, gene_id: &str) -> String {
    format!("{} -> {}", tf_id, gene_id)
}

fn collect_output(
    results: Vec<Result<CorrelationEdge, (String, RegnetError)>>,
) -> StageOutput<CorrelationEdge> {
    let mut out = StageOutput::new();
    for result in results {
        match result {
            Ok(edge) => out.push(edge),
            Err((id, e)) => out.skip(id, e),
        }
    }
    let flagged = out.results.iter().filter(|e| e.zero_variance).count();
    if flagged > 0 {
        log::info!("{} pairs had a zero-variance vector and were set to 0", flagged);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use regnet_core::models::ExpressionMatrix;
    use rstest::*;
    use std::sync::Arc;

    fn vector(id: &str, values: &[f64]) -> ExpressionVector {
        ExpressionVector::new(id, values.to_vec()).unwrap()
    }

    fn correlator(method: CorrelationMethod) -> ExpressionCorrelator {
        ExpressionCorrelator::new(&CorrelationConfig { method })
    }

    #[rstest]
    #[case(CorrelationMethod::Pearson)]
    #[case(CorrelationMethod::Spearman)]
    fn test_self_correlation_is_one(#[case] method: CorrelationMethod) {
        let v = vector("TP63", &[1.0, 3.0, 2.0, 8.0]);
        let edge = correlator(method).correlate_pair(&v, &v).unwrap();
        assert!((edge.correlation - 1.0).abs() < 1e-12);
        assert!(!edge.zero_variance);
    }

    #[rstest]
    #[case(&[1e-200, 2e-200, 3e-200])]
    #[case(&[0.0, 1e200, 2e200])]
    #[case(&[-3e300, 1e300, 4e300])]
    fn test_self_correlation_at_extreme_magnitudes(#[case] values: &[f64]) {
        let v = vector("KRT5", values);
        let edge = correlator(CorrelationMethod::Pearson).correlate_pair(&v, &v).unwrap();
        assert!((edge.correlation - 1.0).abs() < 1e-12);
        assert!(!edge.zero_variance);
    }

    #[rstest]
    fn test_perfect_negative() {
        let edge = correlator(CorrelationMethod::Pearson)
            .correlate_pair(&vector("TP63", &[1.0, 2.0, 3.0]), &vector("KRT5", &[6.0, 4.0, 2.0]))
            .unwrap();
        assert!((edge.correlation + 1.0).abs() < 1e-12);
    }

    #[rstest]
    #[case(CorrelationMethod::Pearson)]
    #[case(CorrelationMethod::Spearman)]
    fn test_constant_vector_is_zero_and_flagged(#[case] method: CorrelationMethod) {
        let edge = correlator(method)
            .correlate_pair(&vector("TP63", &[2.0, 2.0, 2.0]), &vector("KRT5", &[1.0, 5.0, 3.0]))
            .unwrap();
        assert_eq!(edge.correlation, 0.0);
        assert!(edge.zero_variance);
    }

    #[rstest]
    fn test_spearman_is_rank_based() {
        // monotonic but not linear
        let x = vector("TP63", &[1.0, 2.0, 3.0, 4.0]);
        let y = vector("KRT5", &[1.0, 10.0, 100.0, 1000.0]);
        let pearson = correlator(CorrelationMethod::Pearson).correlate_pair(&x, &y).unwrap();
        let spearman = correlator(CorrelationMethod::Spearman).correlate_pair(&x, &y).unwrap();
        assert!(pearson.correlation < 0.99);
        assert!((spearman.correlation - 1.0).abs() < 1e-12);
    }

    #[rstest]
    fn test_average_ranks_with_ties() {
        assert_eq!(average_ranks(&[10.0, 20.0, 10.0, 30.0]), vec![1.5, 3.0, 1.5, 4.0]);
        assert_eq!(average_ranks(&[]), Vec::<f64>::new());
    }

    #[rstest]
    fn test_mismatched_lengths_are_skipped() {
        let tfs = vec![vector("TP63", &[1.0, 2.0, 3.0])];
        let genes = vec![vector("KRT5", &[1.0, 2.0, 3.0]), vector("KRT14", &[1.0, 2.0])];
        let out = correlator(CorrelationMethod::Pearson).correlate(&tfs, &genes);

        assert_eq!(out.results.len(), 1);
        assert_eq!(out.results[0].gene_id, "KRT5");
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].id, "TP63 -> KRT14");
        assert!(matches!(out.skipped[0].reason, RegnetError::DimensionMismatch { .. }));
    }

    #[rstest]
    fn test_mismatched_sample_order_is_skipped() {
        let a = ExpressionVector::with_samples("TP63", vec![1.0, 2.0], Arc::new(vec!["s1".into(), "s2".into()]))
            .unwrap();
        let b = ExpressionVector::with_samples("KRT5", vec![1.0, 2.0], Arc::new(vec!["s2".into(), "s1".into()]))
            .unwrap();
        let result = correlator(CorrelationMethod::Pearson).correlate_pair(&a, &b);
        assert!(matches!(result, Err(RegnetError::DimensionMismatch { .. })));
    }

    #[rstest]
    fn test_cross_product_order() {
        let mut matrix = ExpressionMatrix::new(vec!["s1".into(), "s2".into(), "s3".into()]);
        matrix.push_row("SOX2", vec![3.0, 1.0, 2.0]).unwrap();
        matrix.push_row("TP63", vec![1.0, 2.0, 3.0]).unwrap();
        matrix.push_row("KRT5", vec![2.0, 4.0, 7.0]).unwrap();

        let tfs = matrix.select(|id| id == "SOX2" || id == "TP63");
        let genes = matrix.select(|id| id == "KRT5");
        let out = correlator(CorrelationMethod::Pearson).correlate(&tfs, &genes);

        let pairs: Vec<(&str, &str)> = out
            .results
            .iter()
            .map(|e| (e.tf_id.as_str(), e.gene_id.as_str()))
            .collect();
        assert_eq!(pairs, vec![("SOX2", "KRT5"), ("TP63", "KRT5")]);
        assert!(out.is_clean());
    }

    #[rstest]
    fn test_requested_pairs() {
        let tfs = vec![vector("TP63", &[1.0, 2.0, 3.0])];
        let genes = vec![vector("KRT5", &[1.0, 2.0, 4.0])];
        let pairs = vec![
            ("TP63".to_string(), "KRT5".to_string()),
            ("TP63".to_string(), "KRT14".to_string()),
        ];
        let out = correlator(CorrelationMethod::Pearson).correlate_pairs(&tfs, &genes, &pairs);
        assert_eq!(out.results.len(), 1);
        assert!(matches!(out.skipped[0].reason, RegnetError::MissingExpression(_)));
    }
}
