use anyhow::{Context, Result};
use clap::ArgMatches;

use regnet_core::config::{MergeScorePolicy, RegnetConfig};
use regnet_core::io::{read_peaks, write_intervals};
use regnet_overlaprs::IntoIntervalIndex;

use crate::common::{parse_arg, path_arg, take_results};

pub fn run_merge(matches: &ArgMatches, mut config: RegnetConfig) -> Result<()> {
    if let Some(policy) = parse_arg::<MergeScorePolicy>(matches, "policy")? {
        config.intervals.merge_policy = policy;
    }

    let input = path_arg(matches, "input").context("--input is required")?;
    let peaks = take_results(
        "peaks",
        read_peaks(input).with_context(|| format!("Failed to load peaks: {}", input.display()))?,
    );

    let index = peaks.into_interval_index();
    index.require_non_empty("peaks")?;
    let merged = index.merge_overlapping(config.intervals.merge_policy)?;

    log::info!("{} peaks merged into {}", index.len(), merged.len());

    write_intervals(&merged, path_arg(matches, "output")).context("Failed to write merged peaks")
}
