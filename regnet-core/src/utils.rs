use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufRead, BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    let reader = BufReader::new(file);

    Ok(reader)
}

///
/// Get a writer for a file (gzip'd when the path ends in `.gz`), or stdout when no
/// path is given.
///
pub fn get_dynamic_writer(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            let writer: Box<dyn Write> = if path.extension() == Some(OsStr::new("gz")) {
                Box::new(BufWriter::new(GzEncoder::new(file, Compression::default())))
            } else {
                Box::new(BufWriter::new(file))
            };
            Ok(writer)
        }
        None => Ok(Box::new(BufWriter::new(std::io::stdout()))),
    }
}

///
/// Iterate over the data lines of a tab separated file, yielding the 1-based line
/// number and the split fields. Blank lines and lines starting with `#`, `track` or
/// `browser` are skipped.
///
pub fn data_lines<R: BufRead>(reader: R) -> impl Iterator<Item = std::io::Result<(usize, Vec<String>)>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| match line {
            Err(e) => Some(Err(e)),
            Ok(line) => {
                let trimmed = line.trim_end();
                if trimmed.is_empty()
                    || trimmed.starts_with('#')
                    || trimmed.starts_with("track")
                    || trimmed.starts_with("browser")
                {
                    None
                } else {
                    Some(Ok((
                        idx + 1,
                        trimmed.split('\t').map(|s| s.to_string()).collect(),
                    )))
                }
            }
        })
}

///
/// A shared flag telling a worker pool to stop dispatching new work. Work that has
/// already started runs to completion.
///
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
