use std::fmt::{self, Display};

use crate::errors::RegnetError;

/// An input record, pair or gene that a stage could not process.
#[derive(Debug)]
pub struct Skipped {
    /// What was skipped, e.g. `TP63 -> KRT5` or `line 12`.
    pub id: String,
    pub reason: RegnetError,
}

impl Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.reason)
    }
}

///
/// The result of a batch stage: everything that succeeded plus every item that was
/// skipped, so that no failure disappears silently.
///
#[derive(Debug)]
pub struct StageOutput<T> {
    pub results: Vec<T>,
    pub skipped: Vec<Skipped>,
}

impl<T> Default for StageOutput<T> {
    fn default() -> Self {
        StageOutput {
            results: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> StageOutput<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: T) {
        self.results.push(result);
    }

    pub fn skip(&mut self, id: impl Into<String>, reason: RegnetError) {
        let skipped = Skipped {
            id: id.into(),
            reason,
        };
        log::warn!("Skipping {}", skipped);
        self.skipped.push(skipped);
    }

    /// Append another output, e.g. when collecting results from parallel workers.
    pub fn extend(&mut self, other: StageOutput<T>) {
        self.results.extend(other.results);
        self.skipped.extend(other.skipped);
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

impl<T> FromIterator<StageOutput<T>> for StageOutput<T> {
    fn from_iter<I: IntoIterator<Item = StageOutput<T>>>(iter: I) -> Self {
        let mut out = StageOutput::new();
        for part in iter {
            out.extend(part);
        }
        out
    }
}
