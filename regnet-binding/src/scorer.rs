use std::collections::HashSet;

use indicatif::ProgressBar;
use rayon::prelude::*;

use regnet_core::config::{AggregationMode, BindingConfig};
use regnet_core::errors::RegnetError;
use regnet_core::models::{BindingScore, GenomicInterval, Located, MotifHit, RegulatoryRegion, StageOutput};
use regnet_core::utils::CancelFlag;
use regnet_overlaprs::IntervalIndex;

use crate::catalog::{MotifHitCatalog, RegionCatalog};

/// Peak signal used to scale hit contributions, normalized by the strongest peak.
#[derive(Debug, Clone, Copy)]
struct PeakSignal<'a> {
    peaks: &'a IntervalIndex<GenomicInterval>,
    max_score: f64,
}

impl PeakSignal<'_> {
    /// Normalized signal of the strongest peak under `hit`, or 0 outside of any peak.
    fn intensity(&self, hit: &MotifHit) -> f64 {
        if self.max_score <= 0.0 {
            return 0.0;
        }
        let iv = hit.interval();
        self.peaks
            .find_iter(iv.chr(), iv.start(), iv.end())
            .map(|p| p.score())
            .fold(0.0_f64, f64::max)
            / self.max_score
    }
}

/// The outcome of scoring one region against one TF's hits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionBinding {
    pub score: f64,
    /// Number of hits inside the search window
    pub n_hits: usize,
    /// Start of the hit that gave the score in max mode
    pub best_hit_start: Option<u32>,
}

///
/// Scores TF binding to genes from motif hits near each gene's TSS.
///
/// A hit found in the search window around a region contributes
/// `match_score * 0.5^(distance / half_distance)`, where `distance` is measured from the
/// hit midpoint to the TSS. The region takes the best single contribution, or the sum
/// of all contributions in aggregate mode, clipped to `[0, 1]`.
///
pub struct BindingScorer<'a> {
    config: BindingConfig,
    peaks: Option<PeakSignal<'a>>,
    progress_bar: Option<ProgressBar>,
}

impl<'a> BindingScorer<'a> {
    pub fn new(config: BindingConfig) -> Result<Self, RegnetError> {
        config.validate()?;
        Ok(BindingScorer {
            config,
            peaks: None,
            progress_bar: None,
        })
    }

    ///
    /// Use accessibility peaks to weight hits. Only applied when the configuration
    /// enables peak intensity; otherwise the peaks are ignored.
    ///
    pub fn with_peaks(mut self, peaks: &'a IntervalIndex<GenomicInterval>) -> Result<Self, RegnetError> {
        if !self.config.use_peak_intensity {
            log::debug!("Peak intensity disabled, ignoring {} peaks", peaks.len());
            return Ok(self);
        }
        peaks.require_non_empty("peaks")?;
        let max_score = peaks.iter().map(|p| p.score()).fold(f64::NEG_INFINITY, f64::max);
        self.peaks = Some(PeakSignal { peaks, max_score });
        Ok(self)
    }

    /// Tick `progress_bar` once per scored TF in [`BindingScorer::score_all`].
    pub fn with_progress_bar(mut self, progress_bar: ProgressBar) -> Self {
        self.progress_bar = Some(progress_bar);
        self
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    fn contribution(&self, hit: &MotifHit, region: &RegulatoryRegion) -> f64 {
        let distance = region.distance_to_tss(hit.interval().mid_point()) as f64;
        let decay = 0.5_f64.powf(distance / self.config.half_distance);
        let intensity = self.peaks.map_or(1.0, |p| p.intensity(hit));
        hit.match_score() * decay * intensity
    }

    /// Score a single region against the hits of one TF.
    pub fn score_region(&self, hits: &IntervalIndex<MotifHit>, region: &RegulatoryRegion) -> RegionBinding {
        let window = region.interval().extend(self.config.flank);

        let mut result = RegionBinding {
            score: 0.0,
            n_hits: 0,
            best_hit_start: None,
        };
        // hits arrive sorted by start, so keeping the first strict maximum breaks ties
        // towards the lowest coordinate
        for hit in hits.find_iter(window.chr(), window.start(), window.end()) {
            let contribution = self.contribution(hit, region);
            result.n_hits += 1;
            match self.config.mode {
                AggregationMode::Max => {
                    if result.best_hit_start.is_none() || contribution > result.score {
                        result.score = contribution;
                        result.best_hit_start = Some(hit.interval().start());
                    }
                }
                AggregationMode::Sum => result.score += contribution,
            }
        }
        result.score = result.score.clamp(0.0, 1.0);
        result
    }

    ///
    /// Score one TF against regulatory regions.
    ///
    /// With `genes` set, only those genes are scored (in the given order, repeats scored
    /// once) and a gene without a region is skipped with [`RegnetError::MissingRegion`]. Otherwise every
    /// region in the catalog is scored, in gene id order.
    ///
    pub fn score(
        &self,
        tf_id: &str,
        hits: &IntervalIndex<MotifHit>,
        regions: &RegionCatalog,
        genes: Option<&[String]>,
    ) -> StageOutput<BindingScore> {
        let mut out = StageOutput::new();

        let mut score_one = |region: &RegulatoryRegion| {
            let binding = self.score_region(hits, region);
            match BindingScore::new(tf_id, region.gene_id(), binding.score) {
                Ok(score) => out.push(score),
                Err(e) => out.skip(format!("{} -> {}", tf_id, region.gene_id()), e),
            }
        };

        match genes {
            Some(genes) => {
                let mut missing = Vec::new();
                let mut seen = HashSet::with_capacity(genes.len());
                for gene in genes {
                    if !seen.insert(gene.as_str()) {
                        continue;
                    }
                    match regions.get(gene) {
                        Ok(region) => score_one(region),
                        Err(e) => missing.push((format!("{} -> {}", tf_id, gene), e)),
                    }
                }
                for (id, e) in missing {
                    out.skip(id, e);
                }
            }
            None => regions.iter().for_each(score_one),
        }
        out
    }

    ///
    /// Score every TF in `catalog` in parallel.
    ///
    /// Each TF is an independent unit of work. Once `cancel` is raised no further TFs
    /// are started; they are reported as skipped with [`RegnetError::Cancelled`] while
    /// the TFs already scored are kept. Results are sorted by `(tf_id, gene_id)`.
    ///
    pub fn score_all(
        &self,
        catalog: &MotifHitCatalog,
        regions: &RegionCatalog,
        genes: Option<&[String]>,
        cancel: &CancelFlag,
    ) -> Result<StageOutput<BindingScore>, RegnetError> {
        if catalog.is_empty() {
            return Err(RegnetError::EmptyIntervalSet("motif hits".to_string()));
        }
        if regions.is_empty() {
            return Err(RegnetError::EmptyIntervalSet("regulatory regions".to_string()));
        }

        let tfs: Vec<&str> = catalog.tfs().collect();
        log::info!(
            "Scoring {} TFs ({} motif hits) against {} regions",
            tfs.len(),
            catalog.n_hits(),
            regions.len()
        );

        let parts: Vec<StageOutput<BindingScore>> = tfs
            .par_iter()
            .map(|&tf| {
                let mut out = StageOutput::new();
                if cancel.is_cancelled() {
                    out.skip(tf, RegnetError::Cancelled(tf.to_string()));
                } else if let Some(hits) = catalog.get(tf) {
                    out = self.score(tf, hits, regions, genes);
                }
                if let Some(pb) = &self.progress_bar {
                    pb.inc(1);
                }
                out
            })
            .collect();

        let mut out: StageOutput<BindingScore> = parts.into_iter().collect();
        out.results
            .sort_by(|a, b| (a.tf_id.as_str(), a.gene_id.as_str()).cmp(&(b.tf_id.as_str(), b.gene_id.as_str())));

        log::info!(
            "Computed {} binding scores, skipped {}",
            out.results.len(),
            out.skipped.len()
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use regnet_core::models::GeneAnnotation;
    use regnet_overlaprs::IntoIntervalIndex;
    use rstest::*;

    fn hit(tf: &str, start: u32, end: u32, match_score: f64) -> MotifHit {
        let iv = GenomicInterval::new("chr1", start, end, 0.0).unwrap();
        MotifHit::new(iv, tf, match_score).unwrap()
    }

    fn region(gene: &str, tss: u32, up: u32, down: u32) -> RegulatoryRegion {
        GeneAnnotation {
            gene_id: gene.to_string(),
            chr: "chr1".to_string(),
            tss,
            strand: None,
        }
        .to_region(up, down)
        .unwrap()
    }

    fn config(half_distance: f64, mode: AggregationMode) -> BindingConfig {
        BindingConfig {
            half_distance,
            mode,
            ..Default::default()
        }
    }

    #[fixture]
    fn regions() -> RegionCatalog {
        let (catalog, _) = RegionCatalog::new(vec![
            region("KRT5", 10_000, 5_000, 5_000),
            region("TP63", 50_000, 1_000, 1_000),
        ]);
        catalog
    }

    #[rstest]
    #[case(10_000, 0.8)]
    #[case(11_000, 0.4)]
    #[case(12_000, 0.2)]
    fn test_distance_decay(#[case] midpoint: u32, #[case] expected: f64) {
        let scorer = BindingScorer::new(config(1_000.0, AggregationMode::Max)).unwrap();
        let hits = vec![hit("SOX2", midpoint - 1, midpoint + 1, 0.8)].into_interval_index();
        let binding = scorer.score_region(&hits, &region("KRT5", 10_000, 5_000, 5_000));
        assert!((binding.score - expected).abs() < 1e-12);
        assert_eq!(binding.n_hits, 1);
    }

    #[rstest]
    fn test_max_and_sum_modes() {
        let hits = vec![hit("SOX2", 9_999, 10_001, 0.8), hit("SOX2", 10_999, 11_001, 0.8)]
            .into_interval_index();
        let r = region("KRT5", 10_000, 5_000, 5_000);

        let max = BindingScorer::new(config(1_000.0, AggregationMode::Max)).unwrap();
        assert!((max.score_region(&hits, &r).score - 0.8).abs() < 1e-12);

        // 0.8 + 0.4 is clipped
        let sum = BindingScorer::new(config(1_000.0, AggregationMode::Sum)).unwrap();
        assert_eq!(sum.score_region(&hits, &r).score, 1.0);
    }

    #[rstest]
    fn test_ties_break_by_lowest_coordinate() {
        // equidistant hits on both sides of the TSS
        let hits = vec![hit("SOX2", 10_499, 10_501, 0.5), hit("SOX2", 9_499, 9_501, 0.5)]
            .into_interval_index();
        let scorer = BindingScorer::new(config(1_000.0, AggregationMode::Max)).unwrap();
        let binding = scorer.score_region(&hits, &region("KRT5", 10_000, 5_000, 5_000));
        assert_eq!(binding.best_hit_start, Some(9_499));
    }

    #[rstest]
    fn test_flank_widens_the_window() {
        let hits = vec![hit("SOX2", 15_100, 15_110, 1.0)].into_interval_index();
        let r = region("KRT5", 10_000, 5_000, 5_000);

        let narrow = BindingScorer::new(BindingConfig::default()).unwrap();
        assert_eq!(narrow.score_region(&hits, &r).n_hits, 0);

        let wide = BindingScorer::new(BindingConfig {
            flank: 200,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(wide.score_region(&hits, &r).n_hits, 1);
    }

    #[rstest]
    fn test_gene_without_hits_scores_zero(regions: RegionCatalog) {
        let scorer = BindingScorer::new(BindingConfig::default()).unwrap();
        let hits = vec![hit("SOX2", 9_000, 9_010, 0.9)].into_interval_index();
        let out = scorer.score("SOX2", &hits, &regions, None);

        assert!(out.is_clean());
        let scores: Vec<(&str, bool)> = out
            .results
            .iter()
            .map(|s| (s.gene_id.as_str(), s.score > 0.0))
            .collect();
        assert_eq!(scores, vec![("KRT5", true), ("TP63", false)]);
    }

    #[rstest]
    fn test_requested_gene_without_region(regions: RegionCatalog) {
        let scorer = BindingScorer::new(BindingConfig::default()).unwrap();
        let hits = vec![hit("SOX2", 9_000, 9_010, 0.9)].into_interval_index();
        let genes = vec!["KRT5".to_string(), "KRT14".to_string()];
        let out = scorer.score("SOX2", &hits, &regions, Some(&genes));

        assert_eq!(out.results.len(), 1);
        assert_eq!(out.skipped.len(), 1);
        assert!(matches!(out.skipped[0].reason, RegnetError::MissingRegion(_)));
    }

    #[rstest]
    fn test_repeated_gene_scored_once(regions: RegionCatalog) {
        let scorer = BindingScorer::new(BindingConfig::default()).unwrap();
        let hits = vec![hit("SOX2", 9_000, 9_010, 0.9)].into_interval_index();
        let genes = vec!["KRT5".to_string(), "TP63".to_string(), "KRT5".to_string()];
        let out = scorer.score("SOX2", &hits, &regions, Some(&genes));

        assert!(out.is_clean());
        let keys: Vec<(&str, &str)> = out.results.iter().map(|s| s.key()).collect();
        assert_eq!(keys, vec![("SOX2", "KRT5"), ("SOX2", "TP63")]);
    }

    #[rstest]
    fn test_invalid_config_rejected() {
        assert!(BindingScorer::new(config(0.0, AggregationMode::Max)).is_err());
    }

    #[rstest]
    fn test_peak_intensity() {
        let peaks = vec![
            GenomicInterval::new("chr1", 9_900, 10_100, 5.0).unwrap(),
            GenomicInterval::new("chr1", 20_000, 20_100, 10.0).unwrap(),
        ]
        .into_interval_index();
        let scorer = BindingScorer::new(BindingConfig {
            use_peak_intensity: true,
            ..Default::default()
        })
        .unwrap()
        .with_peaks(&peaks)
        .unwrap();
        let r = region("KRT5", 10_000, 5_000, 5_000);

        let inside = vec![hit("SOX2", 9_999, 10_001, 0.8)].into_interval_index();
        assert!((scorer.score_region(&inside, &r).score - 0.4).abs() < 1e-12);

        let outside = vec![hit("SOX2", 12_000, 12_010, 0.8)].into_interval_index();
        assert_eq!(scorer.score_region(&outside, &r).score, 0.0);
    }

    #[rstest]
    fn test_peaks_ignored_when_disabled() {
        let peaks: IntervalIndex<GenomicInterval> = IntervalIndex::new();
        let scorer = BindingScorer::new(BindingConfig::default())
            .unwrap()
            .with_peaks(&peaks);
        assert!(scorer.is_ok());
    }

    #[rstest]
    fn test_score_all_sorted(regions: RegionCatalog) {
        let catalog = MotifHitCatalog::new(vec![
            hit("TP63", 49_990, 50_010, 0.7),
            hit("SOX2", 10_000, 10_010, 0.9),
        ]);
        let scorer = BindingScorer::new(BindingConfig::default()).unwrap();
        let out = scorer
            .score_all(&catalog, &regions, None, &CancelFlag::new())
            .unwrap();
        let keys: Vec<(&str, &str)> = out.results.iter().map(|s| s.key()).collect();
        assert_eq!(
            keys,
            vec![
                ("SOX2", "KRT5"),
                ("SOX2", "TP63"),
                ("TP63", "KRT5"),
                ("TP63", "TP63")
            ]
        );
    }

    #[rstest]
    fn test_score_all_cancelled(regions: RegionCatalog) {
        let catalog = MotifHitCatalog::new(vec![hit("SOX2", 10_000, 10_010, 0.9)]);
        let scorer = BindingScorer::new(BindingConfig::default()).unwrap();
        let cancel = CancelFlag::new();
        cancel.cancel();
        let out = scorer.score_all(&catalog, &regions, None, &cancel).unwrap();
        assert!(out.results.is_empty());
        assert!(matches!(out.skipped[0].reason, RegnetError::Cancelled(_)));
    }

    #[rstest]
    fn test_progress_reaches_end_when_cancelled(regions: RegionCatalog) {
        let catalog = MotifHitCatalog::new(vec![
            hit("SOX2", 10_000, 10_010, 0.9),
            hit("TP63", 49_990, 50_010, 0.7),
        ]);
        let pb = ProgressBar::hidden();
        pb.set_length(catalog.len() as u64);
        let scorer = BindingScorer::new(BindingConfig::default())
            .unwrap()
            .with_progress_bar(pb.clone());
        let cancel = CancelFlag::new();
        cancel.cancel();

        let out = scorer.score_all(&catalog, &regions, None, &cancel).unwrap();
        assert_eq!(out.skipped.len(), 2);
        assert_eq!(pb.position(), 2);
    }

    #[rstest]
    fn test_score_all_requires_hits(regions: RegionCatalog) {
        let scorer = BindingScorer::new(BindingConfig::default()).unwrap();
        let result = scorer.score_all(&MotifHitCatalog::default(), &regions, None, &CancelFlag::new());
        assert!(matches!(result, Err(RegnetError::EmptyIntervalSet(_))));
    }
}
