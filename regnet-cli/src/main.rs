mod binding;
mod common;
mod influence;
mod merge;
mod network;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use log::Level;

use regnet_core::config::RegnetConfig;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "regnet";
    pub const CONFIG_ARG: &str = "config";
    pub const VERBOSE_ARG: &str = "verbose";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Infer transcription factor regulatory networks from binding and expression, and rank TFs by differential influence.")
        .subcommand_required(true)
        .arg(
            Arg::new(consts::CONFIG_ARG)
                .long("config")
                .global(true)
                .required(false)
                .help("TOML file with stage settings; command line flags take precedence"),
        )
        .arg(
            Arg::new(consts::VERBOSE_ARG)
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log debug messages"),
        )
        .subcommand(merge::cli::create_merge_cli())
        .subcommand(binding::cli::create_binding_cli())
        .subcommand(network::cli::create_network_cli())
        .subcommand(influence::cli::create_influence_cli())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    let level = if matches.get_flag(consts::VERBOSE_ARG) {
        Level::Debug
    } else {
        Level::Info
    };
    simple_logger::init_with_level(level).context("Failed to initialise logging")?;

    let config = match matches.get_one::<String>(consts::CONFIG_ARG) {
        Some(path) => RegnetConfig::try_from(Path::new(path))
            .with_context(|| format!("Failed to load config file: {}", path))?,
        None => RegnetConfig::default(),
    };

    match matches.subcommand() {
        //
        // MERGE
        //
        Some((merge::cli::MERGE_CMD, matches)) => {
            merge::handlers::run_merge(matches, config)?;
        }

        //
        // BINDING
        //
        Some((binding::cli::BINDING_CMD, matches)) => {
            binding::handlers::run_binding(matches, config)?;
        }

        //
        // NETWORK
        //
        Some((network::cli::NETWORK_CMD, matches)) => {
            network::handlers::run_network(matches, config)?;
        }

        //
        // INFLUENCE
        //
        Some((influence::cli::INFLUENCE_CMD, matches)) => {
            influence::handlers::run_influence(matches, config)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        build_parser().debug_assert();
    }
}
