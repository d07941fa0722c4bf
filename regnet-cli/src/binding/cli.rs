use clap::{Arg, ArgAction, Command, arg};

pub const BINDING_CMD: &str = "binding";

pub fn create_binding_cli() -> Command {
    Command::new(BINDING_CMD)
        .about("Score TF binding at every gene from motif hits near its TSS. Outputs tf_id, gene_id, score.")
        .arg(arg!(--motifs <TSV> "Motif hits: chr, start, end, tf_id, match_score").required(true))
        .arg(arg!(--annotation <TSV> "Gene TSS annotation: gene_id, chr, tss[, strand] or BED6").required(true))
        .arg(arg!(--peaks <BED> "Accessibility peaks used to weight hits").required(false))
        .arg(arg!(--genes <FILE> "Only score these genes (one id per line)").required(false))
        .arg(arg!(--tfs <FILE> "Only score these TFs (one id per line)").required(false))
        .arg(
            Arg::new("half-distance")
                .long("half-distance")
                .required(false)
                .help("Distance (bp) from the TSS at which a hit's contribution halves"),
        )
        .arg(arg!(--flank <BP> "Extend every regulatory region by this many bases").required(false))
        .arg(arg!(--mode <MODE> "Per-gene aggregation of hits: max or sum").required(false))
        .arg(
            Arg::new("use-peak-intensity")
                .long("use-peak-intensity")
                .action(ArgAction::SetTrue)
                .help("Scale hits by the normalized signal of the peak they fall in (needs --peaks)"),
        )
        .arg(arg!(--upstream <BP> "Bases upstream of the TSS in a regulatory region").required(false))
        .arg(arg!(--downstream <BP> "Bases downstream of the TSS in a regulatory region").required(false))
        .arg(arg!(--output <OUTPUT> "Output TSV file (default: stdout)").required(false))
}
