use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Everything that can go wrong inside the checking engine.
///
/// Each failure is scoped to a single task; none of them is fatal to the
/// process or to sibling tasks.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The active-task limit is reached. The caller may retry later.
    #[error("maximum number of active tasks reached ({limit})")]
    AdmissionDenied { limit: usize },

    #[error("failed to open dictionary file: {}", path.display())]
    DictionaryOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open input file: {}", path.display())]
    DocumentOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to allocate {what}")]
    Allocation { what: &'static str },

    #[error("failed to spawn task thread")]
    Spawn(#[source] io::Error),

    #[error("failed to append to log file: {}", path.display())]
    ReportLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl EngineError {
    pub fn is_admission_denied(&self) -> bool {
        matches!(self, EngineError::AdmissionDenied { .. })
    }
}
