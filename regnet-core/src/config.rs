use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::RegnetError;

/// How the score of a merged interval is derived from the intervals it replaces.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MergeScorePolicy {
    #[default]
    Max,
    Sum,
}

/// How hit contributions inside one regulatory region are reduced to a single score.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    #[default]
    Max,
    Sum,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    Spearman,
}

/// How binding and correlation are combined into one edge weight.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CombinationRule {
    BindingOnly,
    ExpressionOnly,
    #[default]
    Mean,
    WeightedMean {
        binding_weight: f64,
        correlation_weight: f64,
    },
}

/// What to do with a pair that has only one of the two component scores.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingComponentPolicy {
    /// Treat the absent component as 0.
    #[default]
    ZeroFill,
    /// Drop the pair.
    RequireBoth,
}

macro_rules! impl_from_str {
    ($ty:ty, $($name:literal => $variant:expr),+ $(,)?) => {
        impl FromStr for $ty {
            type Err = RegnetError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($name => Ok($variant),)+
                    _ => Err(RegnetError::InvalidConfig(format!(
                        "unknown {} value: {}",
                        stringify!($ty),
                        s
                    ))),
                }
            }
        }
    };
}

impl_from_str!(MergeScorePolicy, "max" => MergeScorePolicy::Max, "sum" => MergeScorePolicy::Sum);
impl_from_str!(AggregationMode, "max" => AggregationMode::Max, "sum" => AggregationMode::Sum);
impl_from_str!(
    CorrelationMethod,
    "pearson" => CorrelationMethod::Pearson,
    "spearman" => CorrelationMethod::Spearman,
);
impl_from_str!(
    MissingComponentPolicy,
    "zero_fill" => MissingComponentPolicy::ZeroFill,
    "require_both" => MissingComponentPolicy::RequireBoth,
);

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct IntervalConfig {
    pub merge_policy: MergeScorePolicy,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BindingConfig {
    /// Distance (bp) from the TSS at which a hit's contribution is halved.
    pub half_distance: f64,
    /// Bases added on both sides of a regulatory region before searching for hits.
    pub flank: u32,
    pub mode: AggregationMode,
    /// Scale each hit by the normalized signal of the strongest peak it falls in.
    pub use_peak_intensity: bool,
    pub upstream: u32,
    pub downstream: u32,
}

impl Default for BindingConfig {
    fn default() -> Self {
        BindingConfig {
            half_distance: 10_000.0,
            flank: 0,
            mode: AggregationMode::Max,
            use_peak_intensity: false,
            upstream: 100_000,
            downstream: 100_000,
        }
    }
}

impl BindingConfig {
    pub fn validate(&self) -> Result<(), RegnetError> {
        if !(self.half_distance.is_finite() && self.half_distance > 0.0) {
            return Err(RegnetError::InvalidConfig(format!(
                "half_distance must be a positive number, got {}",
                self.half_distance
            )));
        }
        Ok(())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct CorrelationConfig {
    pub method: CorrelationMethod,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct NetworkConfig {
    pub rule: CombinationRule,
    pub missing: MissingComponentPolicy,
    pub min_weight: f64,
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<(), RegnetError> {
        if !(0.0..=1.0).contains(&self.min_weight) {
            return Err(RegnetError::InvalidConfig(format!(
                "min_weight must be in [0, 1], got {}",
                self.min_weight
            )));
        }
        if let CombinationRule::WeightedMean {
            binding_weight,
            correlation_weight,
        } = self.rule
        {
            validate_weights("weighted_mean", binding_weight, correlation_weight)?;
        }
        Ok(())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct InfluenceConfig {
    /// Weight of the change in total out-edge weight.
    pub delta_weight: f64,
    /// Weight of the fraction of novel targets.
    pub novelty_weight: f64,
    /// Keep only the best `top_n` TFs; `None` keeps all.
    pub top_n: Option<usize>,
}

impl Default for InfluenceConfig {
    fn default() -> Self {
        InfluenceConfig {
            delta_weight: 1.0,
            novelty_weight: 1.0,
            top_n: None,
        }
    }
}

impl InfluenceConfig {
    pub fn validate(&self) -> Result<(), RegnetError> {
        validate_weights("influence", self.delta_weight, self.novelty_weight)
    }
}

fn validate_weights(what: &str, a: f64, b: f64) -> Result<(), RegnetError> {
    let ok = a.is_finite() && b.is_finite() && a >= 0.0 && b >= 0.0 && a + b > 0.0;
    if !ok {
        return Err(RegnetError::InvalidConfig(format!(
            "{} weights must be finite, non-negative and not both zero, got ({}, {})",
            what, a, b
        )));
    }
    Ok(())
}

///
/// Settings for every stage, usually read from a TOML file. Missing sections and
/// keys fall back to their defaults.
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct RegnetConfig {
    pub intervals: IntervalConfig,
    pub binding: BindingConfig,
    pub correlation: CorrelationConfig,
    pub network: NetworkConfig,
    pub influence: InfluenceConfig,
}

impl RegnetConfig {
    ///
    /// Load a config.
    ///
    /// # Arguments
    /// - path: Path to the config file (a .toml) file.
    pub fn try_from(path: &Path) -> anyhow::Result<RegnetConfig> {
        let toml_str = read_to_string(path)?;
        let config: RegnetConfig = toml::from_str(&toml_str)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RegnetError> {
        self.binding.validate()?;
        self.network.validate()?;
        self.influence.validate()
    }
}
