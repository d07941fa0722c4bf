use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use clap::ArgMatches;

use regnet_core::config::{CombinationRule, NetworkConfig, RegnetConfig};
use regnet_core::io::{read_binding_scores, read_expression_matrix, read_id_list, write_network};
use regnet_core::models::{BindingScore, BindingTable, CorrelationEdge};
use regnet_network::{ExpressionCorrelator, NetworkBuilder};

use crate::common::{parse_arg, path_arg, report_skipped, take_results};

///
/// Resolve `--rule` and the weighted_mean weights against the configured rule. Weights
/// given on their own switch the rule to weighted_mean.
///
fn resolve_rule(name: Option<&str>, weights: Option<(f64, f64)>, current: CombinationRule) -> Result<CombinationRule> {
    let weighted = |weights: Option<(f64, f64)>| -> Result<CombinationRule> {
        let (binding_weight, correlation_weight) = match (weights, current) {
            (Some(w), _) => w,
            (
                None,
                CombinationRule::WeightedMean {
                    binding_weight,
                    correlation_weight,
                },
            ) => (binding_weight, correlation_weight),
            (None, _) => bail!("weighted_mean needs --binding-weight and --correlation-weight"),
        };
        Ok(CombinationRule::WeightedMean {
            binding_weight,
            correlation_weight,
        })
    };

    match name.map(|n| n.to_ascii_lowercase()) {
        None if weights.is_some() => weighted(weights),
        None => Ok(current),
        Some(n) => match n.as_str() {
            "binding_only" => Ok(CombinationRule::BindingOnly),
            "expression_only" => Ok(CombinationRule::ExpressionOnly),
            "mean" => Ok(CombinationRule::Mean),
            "weighted_mean" => weighted(weights),
            other => bail!("Unknown combination rule: {}", other),
        },
    }
}

fn apply_overrides(matches: &ArgMatches, config: &mut NetworkConfig) -> Result<()> {
    let weights = match (
        parse_arg::<f64>(matches, "binding-weight")?,
        parse_arg::<f64>(matches, "correlation-weight")?,
    ) {
        (Some(b), Some(c)) => Some((b, c)),
        _ => None,
    };
    config.rule = resolve_rule(
        matches.get_one::<String>("rule").map(|s| s.as_str()),
        weights,
        config.rule,
    )?;
    if let Some(v) = parse_arg(matches, "missing")? {
        config.missing = v;
    }
    if let Some(v) = parse_arg(matches, "min-weight")? {
        config.min_weight = v;
    }
    Ok(())
}

pub fn run_network(matches: &ArgMatches, mut config: RegnetConfig) -> Result<()> {
    apply_overrides(matches, &mut config.network)?;
    if let Some(method) = parse_arg(matches, "method")? {
        config.correlation.method = method;
    }
    let builder = NetworkBuilder::new(config.network.clone())?;

    let mut binding: Vec<BindingScore> = match path_arg(matches, "binding") {
        Some(path) => {
            let scores = take_results(
                "binding scores",
                read_binding_scores(path)
                    .with_context(|| format!("Failed to load binding scores: {}", path.display()))?,
            );
            // a repeated pair keeps its last score
            scores.into_iter().collect::<BindingTable>().into_vec()
        }
        None => Vec::new(),
    };

    let tfs: HashSet<String> = match path_arg(matches, "tfs") {
        Some(path) => read_id_list(path)?,
        None if !binding.is_empty() => binding.iter().map(|s| s.tf_id.clone()).collect(),
        None => bail!("No TFs to build a network for: pass --tfs or --binding with at least one score"),
    };
    binding.retain(|s| tfs.contains(&s.tf_id));

    let correlations: Vec<CorrelationEdge> = match path_arg(matches, "expression") {
        Some(path) => {
            let (matrix, skipped) = read_expression_matrix(path)
                .with_context(|| format!("Failed to load expression matrix: {}", path.display()))?;
            report_skipped("expression rows", &skipped);

            let genes = path_arg(matches, "genes").map(read_id_list).transpose()?;
            let tf_vectors = matrix.select(|id| tfs.contains(id));
            let gene_vectors = matrix.select(|id| genes.as_ref().is_none_or(|g| g.contains(id)));
            if tf_vectors.len() < tfs.len() {
                log::warn!(
                    "{} of {} TFs have no expression values",
                    tfs.len() - tf_vectors.len(),
                    tfs.len()
                );
            }

            let correlator = ExpressionCorrelator::new(&config.correlation);
            let out = correlator.correlate(&tf_vectors, &gene_vectors);
            report_skipped("TF/gene pairs", &out.skipped);
            out.results
        }
        None => Vec::new(),
    };

    let network = builder.build(&binding, &correlations)?;
    write_network(&network, path_arg(matches, "output")).context("Failed to write network")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_from_name() {
        let rule = resolve_rule(Some("Binding_Only"), None, CombinationRule::Mean).unwrap();
        assert_eq!(rule, CombinationRule::BindingOnly);
    }

    #[test]
    fn weights_alone_select_weighted_mean() {
        let rule = resolve_rule(None, Some((2.0, 1.0)), CombinationRule::Mean).unwrap();
        assert_eq!(
            rule,
            CombinationRule::WeightedMean {
                binding_weight: 2.0,
                correlation_weight: 1.0
            }
        );
    }

    #[test]
    fn weighted_mean_needs_weights() {
        assert!(resolve_rule(Some("weighted_mean"), None, CombinationRule::Mean).is_err());
    }

    #[test]
    fn unknown_rule() {
        assert!(resolve_rule(Some("median"), None, CombinationRule::Mean).is_err());
    }
}
