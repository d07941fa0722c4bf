use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;

use regnet_core::config::{InfluenceConfig, RegnetConfig};
use regnet_core::io::{gene_weight_map, read_gene_weights, read_network, write_influence_scores};
use regnet_core::models::RegulatoryNetwork;
use regnet_core::utils::get_dynamic_writer;
use regnet_influence::{InfluenceReport, InfluenceScorer, REPORT_HEADER};

use crate::common::{parse_arg, path_arg, report_skipped, take_results};

fn apply_overrides(matches: &ArgMatches, config: &mut InfluenceConfig) -> Result<()> {
    if let Some(v) = parse_arg(matches, "top-n")? {
        config.top_n = Some(v);
    }
    if let Some(v) = parse_arg(matches, "delta-weight")? {
        config.delta_weight = v;
    }
    if let Some(v) = parse_arg(matches, "novelty-weight")? {
        config.novelty_weight = v;
    }
    Ok(())
}

fn load_network(matches: &ArgMatches, name: &str) -> Result<RegulatoryNetwork> {
    let path = path_arg(matches, name).with_context(|| format!("--{} is required", name))?;
    let (network, skipped) =
        read_network(path).with_context(|| format!("Failed to load network: {}", path.display()))?;
    report_skipped("network edges", &skipped);
    log::info!(
        "Loaded {} network: {} edges from {} TFs",
        name,
        network.len(),
        network.tfs().len()
    );
    Ok(network)
}

fn write_report(report: &InfluenceReport, path: &Path) -> Result<()> {
    let mut writer = get_dynamic_writer(Some(path))?;
    if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::to_writer_pretty(&mut writer, report)?;
        writeln!(writer)?;
    } else {
        writeln!(writer, "{}", REPORT_HEADER)?;
        for tf in &report.tfs {
            writeln!(writer, "{}", tf.as_string())?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn run_influence(matches: &ArgMatches, mut config: RegnetConfig) -> Result<()> {
    apply_overrides(matches, &mut config.influence)?;

    let source = load_network(matches, "source")?;
    let target = load_network(matches, "target")?;

    let mut scorer = InfluenceScorer::new(config.influence.clone())?;
    if let Some(path) = path_arg(matches, "gene-weights") {
        let weights = take_results(
            "gene weights",
            read_gene_weights(path)
                .with_context(|| format!("Failed to load gene weights: {}", path.display()))?,
        );
        scorer = scorer.with_gene_weights(gene_weight_map(weights))?;
    }

    let report = scorer.compare_detailed(&source, &target)?;
    if let Some(path) = path_arg(matches, "report") {
        write_report(&report, path)
            .with_context(|| format!("Failed to write influence report: {}", path.display()))?;
    }

    write_influence_scores(&report.scores(), path_arg(matches, "output"))
        .context("Failed to write influence scores")
}
