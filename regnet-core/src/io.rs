//! Readers and writers for the tab separated formats regnet consumes and produces.
//!
//! Readers validate every record once, at this boundary. A malformed record is
//! reported as a [`Skipped`](crate::models::Skipped) entry of the returned
//! [`StageOutput`] and never aborts the whole file; failing to open or read the
//! file does.

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::errors::RegnetError;
use crate::models::{
    BindingScore, EdgeComponents, EdgeSign, ExpressionMatrix, GeneAnnotation, GenomicInterval,
    InfluenceScore, MotifHit, NetworkEdge, RegulatoryNetwork, Skipped, StageOutput, Strand,
};
use crate::utils::{data_lines, get_dynamic_reader, get_dynamic_writer};

fn parse_field<T: std::str::FromStr>(parts: &[String], idx: usize, what: &str) -> Result<T, RegnetError> {
    let raw = parts
        .get(idx)
        .ok_or_else(|| RegnetError::Parse(format!("missing {} column", what)))?;
    raw.trim()
        .parse::<T>()
        .map_err(|_| RegnetError::Parse(format!("can't parse {} from '{}'", what, raw)))
}

/// Strand column: `+` or `-`, with `.` or a missing column meaning unstranded.
fn parse_strand(parts: &[String], idx: usize) -> Result<Option<Strand>, RegnetError> {
    match parts.get(idx).map(|s| s.trim()) {
        None | Some(".") => Ok(None),
        Some(_) => parse_field(parts, idx, "strand").map(Some),
    }
}

fn parse_optional_f64(raw: &str) -> Result<Option<f64>, RegnetError> {
    match raw {
        "" | "NA" | "NaN" | "." => Ok(None),
        _ => raw
            .parse::<f64>()
            .map(Some)
            .map_err(|_| RegnetError::Parse(format!("can't parse number from '{}'", raw))),
    }
}

fn line_id(path: &Path, line: usize) -> String {
    format!("{}:{}", path.display(), line)
}

/// A first line whose coordinate column is not a number is a column header.
fn is_header(line: usize, parts: &[String], coord_idx: usize) -> bool {
    line == 1 && parts.get(coord_idx).is_some_and(|p| p.parse::<f64>().is_err())
}

///
/// Read peaks from a BED-like file: `chr start end [name] [score] [strand]`.
///
/// The score is taken from column 5, or from column 4 when the file has exactly
/// four columns and the fourth is numeric (bedGraph). Files without a score give
/// every peak a score of 1.
///
pub fn read_peaks(path: &Path) -> Result<StageOutput<GenomicInterval>> {
    let reader = get_dynamic_reader(path)?;
    let mut out = StageOutput::new();

    for line in data_lines(reader) {
        let (line, parts) = line.with_context(|| format!("Failed reading {:?}", path))?;
        if is_header(line, &parts, 1) {
            continue;
        }
        let parsed = (|| {
            let chr: String = parse_field(&parts, 0, "chromosome")?;
            let start: u32 = parse_field(&parts, 1, "start")?;
            let end: u32 = parse_field(&parts, 2, "end")?;
            let score = match parts.len() {
                0..=3 => 1.0,
                4 => parts[3].parse::<f64>().unwrap_or(1.0),
                _ => parse_field(&parts, 4, "score")?,
            };
            let strand = parse_strand(&parts, 5)?;
            Ok::<_, RegnetError>(GenomicInterval::new(chr, start, end, score)?.with_strand(strand))
        })();
        match parsed {
            Ok(interval) => out.push(interval),
            Err(e) => out.skip(line_id(path, line), e),
        }
    }

    Ok(out)
}

///
/// Read motif scan hits: `chr start end tf_id match_score`.
///
pub fn read_motif_hits(path: &Path) -> Result<StageOutput<MotifHit>> {
    let reader = get_dynamic_reader(path)?;
    let mut out = StageOutput::new();

    for line in data_lines(reader) {
        let (line, parts) = line.with_context(|| format!("Failed reading {:?}", path))?;
        if is_header(line, &parts, 1) {
            continue;
        }
        let parsed = (|| {
            let chr: String = parse_field(&parts, 0, "chromosome")?;
            let start: u32 = parse_field(&parts, 1, "start")?;
            let end: u32 = parse_field(&parts, 2, "end")?;
            let tf_id: String = parse_field(&parts, 3, "tf id")?;
            let match_score: f64 = parse_field(&parts, 4, "match score")?;
            MotifHit::new(GenomicInterval::new(chr, start, end, match_score)?, tf_id, match_score)
        })();
        match parsed {
            Ok(hit) => out.push(hit),
            Err(e) => out.skip(line_id(path, line), e),
        }
    }

    Ok(out)
}

///
/// Read a gene annotation. Two layouts are accepted:
///
/// - `gene_id chr tss [strand]`
/// - BED6 `chr start end gene_id score strand`, where the TSS is `start` on the
///   forward strand and `end - 1` on the reverse strand.
///
pub fn read_annotation(path: &Path) -> Result<StageOutput<GeneAnnotation>> {
    let reader = get_dynamic_reader(path)?;
    let mut out = StageOutput::new();

    for line in data_lines(reader) {
        let (line, parts) = line.with_context(|| format!("Failed reading {:?}", path))?;
        let is_bed = parts.len() >= 6;
        if is_header(line, &parts, if is_bed { 1 } else { 2 }) {
            continue;
        }
        let parsed = (|| {
            if is_bed {
                let chr: String = parse_field(&parts, 0, "chromosome")?;
                let start: u32 = parse_field(&parts, 1, "start")?;
                let end: u32 = parse_field(&parts, 2, "end")?;
                let gene_id: String = parse_field(&parts, 3, "gene id")?;
                let strand = parse_strand(&parts, 5)?;
                GenomicInterval::new(chr.clone(), start, end, 0.0)?;
                let tss = match strand {
                    Some(Strand::Reverse) => end - 1,
                    _ => start,
                };
                Ok::<_, RegnetError>(GeneAnnotation {
                    gene_id,
                    chr,
                    tss,
                    strand,
                })
            } else {
                Ok(GeneAnnotation {
                    gene_id: parse_field(&parts, 0, "gene id")?,
                    chr: parse_field(&parts, 1, "chromosome")?,
                    tss: parse_field(&parts, 2, "tss")?,
                    strand: parse_strand(&parts, 3)?,
                })
            }
        })();
        match parsed {
            Ok(annotation) => out.push(annotation),
            Err(e) => out.skip(line_id(path, line), e),
        }
    }

    Ok(out)
}

///
/// Read a gene-by-sample matrix. The first line holds the sample names (an optional
/// leading label for the id column is dropped); every further line is
/// `id value value ...`.
///
pub fn read_expression_matrix(path: &Path) -> Result<(ExpressionMatrix, Vec<Skipped>)> {
    let reader = get_dynamic_reader(path)?;
    let mut lines = data_lines(reader);

    let (_, header) = lines
        .next()
        .transpose()
        .with_context(|| format!("Failed reading {:?}", path))?
        .ok_or_else(|| RegnetError::Parse(format!("{:?} has no header line", path)))?;

    // the header is either `samples...` or `label samples...`; decide from the first row
    let mut pending: Option<(usize, Vec<String>)> = None;
    let samples = match lines.next() {
        Some(first) => {
            let first = first.with_context(|| format!("Failed reading {:?}", path))?;
            let samples = if header.len() == first.1.len() {
                header[1..].to_vec()
            } else {
                header.clone()
            };
            pending = Some(first);
            samples
        }
        None => header[1..].to_vec(),
    };

    let mut matrix = ExpressionMatrix::new(samples);
    let mut out: StageOutput<()> = StageOutput::new();
    let mut seen: HashSet<String> = HashSet::new();

    let rows = pending.into_iter().map(Ok).chain(lines);
    for row in rows {
        let (line, parts) = row.with_context(|| format!("Failed reading {:?}", path))?;
        let parsed = (|| {
            let id = parts[0].clone();
            if !seen.insert(id.clone()) {
                return Err(RegnetError::Parse(format!("duplicate row id {}", id)));
            }
            let values = parts[1..]
                .iter()
                .map(|v| {
                    v.parse::<f64>()
                        .map_err(|_| RegnetError::Parse(format!("can't parse value '{}' for {}", v, id)))
                })
                .collect::<Result<Vec<f64>, RegnetError>>()?;
            matrix.push_row(id, values)
        })();
        if let Err(e) = parsed {
            out.skip(line_id(path, line), e);
        }
    }

    Ok((matrix, out.skipped))
}

/// Read binding scores: `tf_id gene_id score`.
pub fn read_binding_scores(path: &Path) -> Result<StageOutput<BindingScore>> {
    let reader = get_dynamic_reader(path)?;
    let mut out = StageOutput::new();

    for line in data_lines(reader) {
        let (line, parts) = line.with_context(|| format!("Failed reading {:?}", path))?;
        if is_header(line, &parts, 2) {
            continue;
        }
        let parsed = (|| {
            BindingScore::new(
                parse_field::<String>(&parts, 0, "tf id")?,
                parse_field::<String>(&parts, 1, "gene id")?,
                parse_field(&parts, 2, "score")?,
            )
        })();
        match parsed {
            Ok(score) => out.push(score),
            Err(e) => out.skip(line_id(path, line), e),
        }
    }

    Ok(out)
}

///
/// Read a network written by [`write_network`]:
/// `tf_id gene_id weight sign [binding_score] [correlation]`.
///
/// Edge rows are validated individually; a repeated `(tf_id, gene_id)` pair fails the
/// whole read since the file can not be a single network.
///
pub fn read_network(path: &Path) -> Result<(RegulatoryNetwork, Vec<Skipped>)> {
    let reader = get_dynamic_reader(path)?;
    let mut out = StageOutput::new();

    for line in data_lines(reader) {
        let (line, parts) = line.with_context(|| format!("Failed reading {:?}", path))?;
        if is_header(line, &parts, 2) {
            continue;
        }
        let parsed = (|| {
            let tf_id: String = parse_field(&parts, 0, "tf id")?;
            let gene_id: String = parse_field(&parts, 1, "gene id")?;
            let weight: f64 = parse_field(&parts, 2, "weight")?;
            let sign: EdgeSign = match parts.get(3) {
                Some(_) => parse_field(&parts, 3, "sign")?,
                None => EdgeSign::Activation,
            };
            let components = EdgeComponents {
                binding_score: parts.get(4).map(|s| parse_optional_f64(s)).transpose()?.flatten(),
                correlation: parts.get(5).map(|s| parse_optional_f64(s)).transpose()?.flatten(),
            };
            let mut edge = NetworkEdge::new(tf_id, gene_id, weight, components)?;
            edge.sign = sign;
            Ok::<_, RegnetError>(edge)
        })();
        match parsed {
            Ok(edge) => out.push(edge),
            Err(e) => out.skip(line_id(path, line), e),
        }
    }

    let network = RegulatoryNetwork::from_edges(out.results)
        .with_context(|| format!("Invalid network file {:?}", path))?;
    Ok((network, out.skipped))
}

/// Read one identifier per line (first column).
pub fn read_id_list(path: &Path) -> Result<HashSet<String>> {
    let reader = get_dynamic_reader(path)?;
    let mut ids = HashSet::new();
    for line in data_lines(reader) {
        let (_, parts) = line.with_context(|| format!("Failed reading {:?}", path))?;
        ids.insert(parts[0].trim().to_string());
    }
    Ok(ids)
}

/// Read per-gene weights: `gene_id weight`.
pub fn read_gene_weights(path: &Path) -> Result<StageOutput<(String, f64)>> {
    let reader = get_dynamic_reader(path)?;
    let mut out = StageOutput::new();
    for line in data_lines(reader) {
        let (line, parts) = line.with_context(|| format!("Failed reading {:?}", path))?;
        if is_header(line, &parts, 1) {
            continue;
        }
        let parsed = (|| {
            let gene: String = parse_field(&parts, 0, "gene id")?;
            let weight: f64 = parse_field(&parts, 1, "weight")?;
            if !weight.is_finite() || weight < 0.0 {
                return Err(RegnetError::InvalidScore(format!(
                    "weight {} for {} must be finite and non-negative",
                    weight, gene
                )));
            }
            Ok((gene, weight))
        })();
        match parsed {
            Ok(w) => out.push(w),
            Err(e) => out.skip(line_id(path, line), e),
        }
    }
    Ok(out)
}

/// Collect gene weights into a map; later rows for a gene replace earlier ones.
pub fn gene_weight_map(weights: Vec<(String, f64)>) -> HashMap<String, f64> {
    weights.into_iter().collect()
}

pub fn write_intervals(intervals: &[GenomicInterval], path: Option<&Path>) -> Result<()> {
    let mut writer = get_dynamic_writer(path)?;
    for interval in intervals {
        writeln!(writer, "{}", interval.as_string())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_binding_scores(scores: &[BindingScore], path: Option<&Path>) -> Result<()> {
    let mut writer = get_dynamic_writer(path)?;
    writeln!(writer, "tf_id\tgene_id\tscore")?;
    for score in scores {
        writeln!(writer, "{}\t{}\t{}", score.tf_id, score.gene_id, score.score)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_network(network: &RegulatoryNetwork, path: Option<&Path>) -> Result<()> {
    let mut writer = get_dynamic_writer(path)?;
    writeln!(writer, "tf_id\tgene_id\tweight\tsign\tbinding_score\tcorrelation")?;
    for edge in network.edges() {
        writeln!(writer, "{}", edge.as_string())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_influence_scores(scores: &[InfluenceScore], path: Option<&Path>) -> Result<()> {
    let mut writer = get_dynamic_writer(path)?;
    writeln!(writer, "tf_id\tscore\trank")?;
    for score in scores {
        writeln!(writer, "{}", score.as_string())?;
    }
    writer.flush()?;
    Ok(())
}
