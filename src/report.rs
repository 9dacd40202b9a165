use crate::error::{EngineError, Result};
use crate::tally::MisspellingRecord;
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Append-only log with one line per document that had misspellings.
pub struct ReportLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ReportLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn append(&self, label: &str, misspelled: u64, top: &[MisspellingRecord]) -> Result<()> {
        let line = format_record(label, misspelled, top);
        let _guard = self.lock.lock();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.error(source))?;
        writeln!(file, "{}", line).map_err(|source| self.error(source))
    }

    fn error(&self, source: std::io::Error) -> EngineError {
        EngineError::ReportLog {
            path: self.path.clone(),
            source,
        }
    }
}

/// `<label> <misspelled> <word>...`
pub fn format_record(label: &str, misspelled: u64, top: &[MisspellingRecord]) -> String {
    let mut line = format!("{} {}", label, misspelled);
    for record in top {
        line.push(' ');
        line.push_str(&record.word);
    }
    line
}
