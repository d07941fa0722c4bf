use clap::{Command, arg};

pub const MERGE_CMD: &str = "merge";

pub fn create_merge_cli() -> Command {
    Command::new(MERGE_CMD)
        .about("Merge overlapping peaks into their union. Touching peaks are kept apart.")
        .arg(arg!(--input <BED> "Input BED or bedGraph file, optionally gzipped").required(true))
        .arg(arg!(--policy <POLICY> "Score of a merged peak: max or sum (default: from config, else max)").required(false))
        .arg(arg!(--output <OUTPUT> "Output BED file (default: stdout)").required(false))
}
