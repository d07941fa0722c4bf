use clap::{Arg, Command, arg};

pub const INFLUENCE_CMD: &str = "influence";

pub fn create_influence_cli() -> Command {
    Command::new(INFLUENCE_CMD)
        .about("Rank TFs by the change in their regulatory output from a source to a target network. Outputs tf_id, score, rank.")
        .arg(arg!(--source <TSV> "Network of the source cell state (from `regnet network`)").required(true))
        .arg(arg!(--target <TSV> "Network of the target cell state (from `regnet network`)").required(true))
        .arg(
            Arg::new("gene-weights")
                .long("gene-weights")
                .required(false)
                .help("Per-gene weights (gene_id, weight), e.g. |log2 fold change|; unlisted genes weigh 1"),
        )
        .arg(
            Arg::new("top-n")
                .long("top-n")
                .required(false)
                .help("Report only the best N TFs"),
        )
        .arg(
            Arg::new("delta-weight")
                .long("delta-weight")
                .required(false)
                .help("Weight of the change in out-edge weight"),
        )
        .arg(
            Arg::new("novelty-weight")
                .long("novelty-weight")
                .required(false)
                .help("Weight of the fraction of novel targets"),
        )
        .arg(arg!(--report <REPORT> "Also write every per-TF value; JSON if the name ends in .json, TSV otherwise").required(false))
        .arg(arg!(--output <OUTPUT> "Output TSV file (default: stdout)").required(false))
}
