use anyhow::{Context, Result, bail};
use clap::ArgMatches;

use regnet_binding::{BindingScorer, MotifHitCatalog, RegionCatalog};
use regnet_core::config::{BindingConfig, RegnetConfig};
use regnet_core::io::{read_annotation, read_id_list, read_motif_hits, read_peaks, write_binding_scores};
use regnet_core::utils::CancelFlag;
use regnet_overlaprs::IntoIntervalIndex;

use crate::common::{parse_arg, path_arg, progress_bar, report_skipped, take_results};

fn apply_overrides(matches: &ArgMatches, config: &mut BindingConfig) -> Result<()> {
    if let Some(v) = parse_arg(matches, "half-distance")? {
        config.half_distance = v;
    }
    if let Some(v) = parse_arg(matches, "flank")? {
        config.flank = v;
    }
    if let Some(v) = parse_arg(matches, "mode")? {
        config.mode = v;
    }
    if let Some(v) = parse_arg(matches, "upstream")? {
        config.upstream = v;
    }
    if let Some(v) = parse_arg(matches, "downstream")? {
        config.downstream = v;
    }
    if matches.get_flag("use-peak-intensity") {
        config.use_peak_intensity = true;
    }
    Ok(())
}

pub fn run_binding(matches: &ArgMatches, mut config: RegnetConfig) -> Result<()> {
    apply_overrides(matches, &mut config.binding)?;

    let motifs = path_arg(matches, "motifs").context("--motifs is required")?;
    let hits = take_results(
        "motif hits",
        read_motif_hits(motifs)
            .with_context(|| format!("Failed to load motif hits: {}", motifs.display()))?,
    );
    let mut catalog = MotifHitCatalog::new(hits);
    if let Some(path) = path_arg(matches, "tfs") {
        let keep = read_id_list(path)?;
        catalog.retain_tfs(&keep);
        log::info!("Restricted to {} of {} listed TFs", catalog.len(), keep.len());
    }

    let annotation_path = path_arg(matches, "annotation").context("--annotation is required")?;
    let annotation = take_results(
        "genes",
        read_annotation(annotation_path)
            .with_context(|| format!("Failed to load annotation: {}", annotation_path.display()))?,
    );
    let (regions, skipped) = RegionCatalog::from_annotation(
        &annotation,
        config.binding.upstream,
        config.binding.downstream,
    );
    report_skipped("regulatory regions", &skipped);

    let genes: Option<Vec<String>> = match path_arg(matches, "genes") {
        Some(path) => {
            let mut genes: Vec<String> = read_id_list(path)?.into_iter().collect();
            genes.sort_unstable();
            Some(genes)
        }
        None => None,
    };

    let peaks = match path_arg(matches, "peaks") {
        Some(path) => Some(
            take_results(
                "peaks",
                read_peaks(path).with_context(|| format!("Failed to load peaks: {}", path.display()))?,
            )
            .into_interval_index(),
        ),
        None => None,
    };
    if config.binding.use_peak_intensity && peaks.is_none() {
        bail!("Peak intensity weighting is enabled but no --peaks file was given");
    }

    let mut scorer = BindingScorer::new(config.binding.clone())?;
    if let Some(peaks) = &peaks {
        scorer = scorer.with_peaks(peaks)?;
    }
    let pb = progress_bar(catalog.len() as u64, "Scoring TFs")?;
    let scorer = scorer.with_progress_bar(pb.clone());

    let out = scorer.score_all(&catalog, &regions, genes.as_deref(), &CancelFlag::new())?;
    pb.finish_and_clear();
    report_skipped("TF/gene pairs", &out.skipped);

    write_binding_scores(&out.results, path_arg(matches, "output"))
        .context("Failed to write binding scores")
}
