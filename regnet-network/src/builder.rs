use std::collections::BTreeMap;

use regnet_core::config::{CombinationRule, MissingComponentPolicy, NetworkConfig};
use regnet_core::errors::RegnetError;
use regnet_core::models::{BindingScore, CorrelationEdge, EdgeComponents, NetworkEdge, RegulatoryNetwork};

/// Relative weights of the binding and correlation components for a rule.
fn rule_weights(rule: CombinationRule) -> (f64, f64) {
    match rule {
        CombinationRule::BindingOnly => (1.0, 0.0),
        CombinationRule::ExpressionOnly => (0.0, 1.0),
        CombinationRule::Mean => (1.0, 1.0),
        CombinationRule::WeightedMean {
            binding_weight,
            correlation_weight,
        } => (binding_weight, correlation_weight),
    }
}

///
/// Combines binding scores and expression correlations into a [`RegulatoryNetwork`].
///
/// Each `(tf, gene)` pair seen in either input becomes at most one edge with weight
/// `(wb * binding + wc * |correlation|) / (wb + wc)`, where `(wb, wc)` come from the
/// combination rule. A pair is only considered when the rule uses at least one of
/// the components it has. A component the rule uses but the pair lacks is either
/// read as 0 or causes the pair to be dropped, according to the missing component
/// policy. The sign of the correlation is kept on the edge, and edges below
/// `min_weight` are dropped.
///
#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    config: NetworkConfig,
}

impl NetworkBuilder {
    pub fn new(config: NetworkConfig) -> Result<Self, RegnetError> {
        config.validate()?;
        Ok(NetworkBuilder { config })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Combined weight for one pair, or `None` when the pair yields no edge.
    pub fn combine(&self, components: &EdgeComponents) -> Option<f64> {
        let (wb, wc) = rule_weights(self.config.rule);
        let uses_binding = wb > 0.0;
        let uses_correlation = wc > 0.0;

        let has_binding = components.binding_score.is_some();
        let has_correlation = components.correlation.is_some();
        if !(uses_binding && has_binding || uses_correlation && has_correlation) {
            return None;
        }
        if self.config.missing == MissingComponentPolicy::RequireBoth
            && (uses_binding && !has_binding || uses_correlation && !has_correlation)
        {
            return None;
        }

        let b = components.binding_score.unwrap_or(0.0);
        let c = components.correlation.map_or(0.0, f64::abs);
        Some(((wb * b + wc * c) / (wb + wc)).clamp(0.0, 1.0))
    }

    ///
    /// Build the network. Within one input a repeated pair overwrites the earlier
    /// entry; across the two inputs a pair is combined once.
    ///
    pub fn build(
        &self,
        binding: &[BindingScore],
        correlations: &[CorrelationEdge],
    ) -> Result<RegulatoryNetwork, RegnetError> {
        let mut pairs: BTreeMap<(&str, &str), EdgeComponents> = BTreeMap::new();
        for score in binding {
            pairs.entry(score.key()).or_default().binding_score = Some(score.score);
        }
        for edge in correlations {
            pairs
                .entry((edge.tf_id.as_str(), edge.gene_id.as_str()))
                .or_default()
                .correlation = Some(edge.correlation);
        }

        let considered = pairs.len();
        let mut below_cutoff = 0;
        let mut edges = Vec::new();
        for ((tf_id, gene_id), components) in pairs {
            let Some(weight) = self.combine(&components) else {
                continue;
            };
            if weight < self.config.min_weight {
                below_cutoff += 1;
                continue;
            }
            edges.push(NetworkEdge::new(tf_id, gene_id, weight, components)?);
        }

        log::info!(
            "Built network with {} edges from {} pairs ({} below min_weight {})",
            edges.len(),
            considered,
            below_cutoff,
            self.config.min_weight
        );

        RegulatoryNetwork::from_edges(edges)
    }
}
