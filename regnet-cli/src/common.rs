use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::ArgMatches;
use indicatif::{ProgressBar, ProgressStyle};

use regnet_core::models::{Skipped, StageOutput};

/// Value of an optional path argument.
pub fn path_arg<'a>(matches: &'a ArgMatches, name: &str) -> Option<&'a Path> {
    matches.get_one::<String>(name).map(Path::new)
}

/// Parse an optional argument, naming the flag in the error.
pub fn parse_arg<T>(matches: &ArgMatches, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    matches
        .get_one::<String>(name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| anyhow::anyhow!("{}", e))
                .with_context(|| format!("Invalid value '{}' for --{}", raw, name))
        })
        .transpose()
}

/// Log a one-line summary of what a stage skipped. Each skip is already logged on its own.
pub fn report_skipped(what: &str, skipped: &[Skipped]) {
    if !skipped.is_empty() {
        log::warn!("{} {} skipped, see warnings above", skipped.len(), what);
    }
}

/// Keep the results of a reader, summarizing what was skipped.
pub fn take_results<T>(what: &str, out: StageOutput<T>) -> Vec<T> {
    report_skipped(what, &out.skipped);
    out.results
}

pub fn progress_bar(len: u64, message: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?,
    );
    pb.set_message(message);
    Ok(pb)
}
