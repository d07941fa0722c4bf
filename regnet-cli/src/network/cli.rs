use clap::{Arg, ArgGroup, Command, arg};

pub const NETWORK_CMD: &str = "network";

pub fn create_network_cli() -> Command {
    Command::new(NETWORK_CMD)
        .about("Combine binding scores and expression correlation into a TF -> gene network. Outputs tf_id, gene_id, weight, sign, binding_score, correlation.")
        .arg(arg!(--binding <TSV> "Binding scores from `regnet binding`").required(false))
        .arg(arg!(--expression <TSV> "Expression matrix: header of sample names, then one row per gene").required(false))
        .group(
            ArgGroup::new("inputs")
                .args(["binding", "expression"])
                .required(true)
                .multiple(true),
        )
        .arg(arg!(--tfs <FILE> "TFs to include (one id per line); defaults to the TFs with binding scores").required(false))
        .arg(arg!(--genes <FILE> "Target genes to correlate with (one id per line); defaults to every row").required(false))
        .arg(arg!(--method <METHOD> "Correlation method: pearson or spearman").required(false))
        .arg(arg!(--rule <RULE> "binding_only, expression_only, mean or weighted_mean").required(false))
        .arg(
            Arg::new("binding-weight")
                .long("binding-weight")
                .required(false)
                .requires("correlation-weight")
                .help("Binding weight for the weighted_mean rule"),
        )
        .arg(
            Arg::new("correlation-weight")
                .long("correlation-weight")
                .required(false)
                .requires("binding-weight")
                .help("Correlation weight for the weighted_mean rule"),
        )
        .arg(arg!(--missing <POLICY> "Pairs with one component: zero_fill or require_both").required(false))
        .arg(
            Arg::new("min-weight")
                .long("min-weight")
                .required(false)
                .help("Drop edges with a combined weight below this value"),
        )
        .arg(arg!(--output <OUTPUT> "Output TSV file (default: stdout)").required(false))
}
