use thiserror::Error;

/// Structural failures that abort the current parse.
///
/// Per-entity problems (a turn with no matching IPUs, a transition whose
/// predecessor cannot be resolved) are not errors: they are logged as
/// warnings and the entity is dropped, so a handful of annotation
/// mismatches never rejects a whole corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("unknown batch number: {0}")]
    UnknownBatch(u32),

    #[error("unknown speaker label: {0}")]
    UnknownSpeaker(String),

    #[error("tasks file {0} not found")]
    MissingTasksFile(String),

    #[error("words file {0} not found")]
    MissingWordsFile(String),

    #[error("unknown transition label: {0}")]
    UnknownTransitionLabel(String),

    #[error("failed to download {file} after {attempts} attempts")]
    DownloadFailed { file: String, attempts: u32 },
}
