//! Collaborator interfaces the batch driver reads from and writes to.

use async_trait::async_trait;
use thiserror::Error;

use spanfuse::{AnnotationLayer, DocumentMetadata, DocumentRecord, FuseError, ScopeKind, ScopedRecord};

/// Errors from annotation and metadata sources.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Document {0} not found")]
    DocumentNotFound(String),

    #[error("Layer '{layer}' is missing for document {document_id}")]
    LayerMissing { document_id: String, layer: String },

    #[error("Failed to read document {document_id}: {message}")]
    Read {
        document_id: String,
        message: String,
    },
}

impl From<SourceError> for FuseError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::LayerMissing { document_id, layer } => {
                FuseError::LayerMissing { document_id, layer }
            }
            SourceError::DocumentNotFound(document_id) => FuseError::Source {
                message: format!("document {} not found", document_id),
                document_id,
            },
            SourceError::Read {
                document_id,
                message,
            } => FuseError::Source {
                document_id,
                message,
            },
        }
    }
}

/// Errors from output sinks.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Sink lock poisoned")]
    Poisoned,
}

/// Supplies the canonical text and the annotation layers of a document.
#[async_trait]
pub trait AnnotationViewSource: Send + Sync {
    async fn get_text(&self, doc_id: &str) -> Result<String, SourceError>;

    /// A missing layer is `SourceError::LayerMissing`; an empty layer is
    /// returned as such.
    async fn get_layer(&self, doc_id: &str, layer: &str) -> Result<AnnotationLayer, SourceError>;
}

/// Supplies bibliographic metadata of a document.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn get_metadata(&self, doc_id: &str) -> Result<DocumentMetadata, SourceError>;
}

/// Receives the records produced for each document.
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Write one document record with its section and sentence records.
    ///
    /// Called once per successful document. An implementation that returns
    /// an error must not keep any of the records passed in that call.
    async fn write_records(
        &self,
        document: &DocumentRecord,
        scoped: &[(ScopeKind, ScopedRecord)],
    ) -> Result<(), SinkError>;

    async fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}
