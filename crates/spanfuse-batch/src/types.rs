//! Types shared by the batch driver and its callers.

use thiserror::Error;

use spanfuse::{Diagnostics, FuseError};

use crate::source::{SinkError, SourceError};

/// Events emitted while a batch runs.
/// Callers use them to drive progress reporting.
#[derive(Debug, Clone)]
pub enum FusionEvent {
    Started {
        total_documents: usize,
    },
    DocumentStarted {
        sequence: usize,
        document_id: String,
    },
    DocumentCompleted {
        sequence: usize,
        document_id: String,
        diagnostics: Diagnostics,
    },
    DocumentFailed {
        sequence: usize,
        document_id: String,
        error: String,
    },
    DocumentSkipped {
        sequence: usize,
        document_id: String,
        reason: String,
    },
    Complete {
        succeeded: usize,
        failed: usize,
        skipped: usize,
    },
}

/// Why one document produced no records.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Fuse(#[from] FuseError),

    #[error("Failed to write records: {0}")]
    Sink(#[from] SinkError),

    #[error("Worker task failed: {0}")]
    Worker(String),
}

impl From<SourceError> for DocumentError {
    fn from(err: SourceError) -> Self {
        DocumentError::Fuse(err.into())
    }
}

impl DocumentError {
    /// Skipped documents are counted apart from failures.
    pub fn is_skip(&self) -> bool {
        matches!(self, DocumentError::Fuse(e) if e.is_skip())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    pub sequence: usize,
    pub document_id: String,
    pub error: String,
}

/// Result of a batch run.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Recovered errors summed over the successful documents.
    pub diagnostics: Diagnostics,
    pub failures: Vec<DocumentFailure>,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }
}
