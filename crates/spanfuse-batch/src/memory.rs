//! In-memory collaborators, for tests and for callers that already hold
//! their documents.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use spanfuse::{
    AnnotationLayer, DocumentInput, DocumentMetadata, DocumentRecord, ScopeKind, ScopedRecord,
};

use crate::source::{AnnotationViewSource, MetadataSource, OutputSink, SinkError, SourceError};

#[derive(Debug, Clone, Default)]
struct StoredDocument {
    text: String,
    layers: HashMap<String, AnnotationLayer>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryViewSource {
    documents: HashMap<String, StoredDocument>,
}

impl MemoryViewSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_text(&mut self, doc_id: &str, text: impl Into<String>) {
        self.documents.entry(doc_id.to_string()).or_default().text = text.into();
    }

    pub fn insert_layer(&mut self, doc_id: &str, layer: AnnotationLayer) {
        self.documents
            .entry(doc_id.to_string())
            .or_default()
            .layers
            .insert(layer.name.clone(), layer);
    }

    /// Store the text and layers of a prepared input. Its metadata is ignored.
    pub fn insert_document(&mut self, doc_id: &str, input: DocumentInput) {
        self.documents.insert(
            doc_id.to_string(),
            StoredDocument {
                text: input.text,
                layers: input.layers,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn document(&self, doc_id: &str) -> Result<&StoredDocument, SourceError> {
        self.documents
            .get(doc_id)
            .ok_or_else(|| SourceError::DocumentNotFound(doc_id.to_string()))
    }
}

#[async_trait]
impl AnnotationViewSource for MemoryViewSource {
    async fn get_text(&self, doc_id: &str) -> Result<String, SourceError> {
        Ok(self.document(doc_id)?.text.clone())
    }

    async fn get_layer(&self, doc_id: &str, layer: &str) -> Result<AnnotationLayer, SourceError> {
        self.document(doc_id)?
            .layers
            .get(layer)
            .cloned()
            .ok_or_else(|| SourceError::LayerMissing {
                document_id: doc_id.to_string(),
                layer: layer.to_string(),
            })
    }
}

/// Metadata by document id. Unknown documents have empty metadata.
#[derive(Debug, Clone, Default)]
pub struct MemoryMetadataSource {
    metadata: HashMap<String, DocumentMetadata>,
}

impl MemoryMetadataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, doc_id: &str, metadata: DocumentMetadata) {
        self.metadata.insert(doc_id.to_string(), metadata);
    }
}

#[async_trait]
impl MetadataSource for MemoryMetadataSource {
    async fn get_metadata(&self, doc_id: &str) -> Result<DocumentMetadata, SourceError> {
        Ok(self.metadata.get(doc_id).cloned().unwrap_or_default())
    }
}

/// Collects every record it receives. The records of one document are
/// stored together under both locks.
#[derive(Debug, Default)]
pub struct MemorySink {
    documents: Mutex<Vec<DocumentRecord>>,
    scoped: Mutex<Vec<(ScopeKind, ScopedRecord)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn documents(&self) -> Vec<DocumentRecord> {
        self.documents.lock().await.clone()
    }

    pub async fn scoped(&self) -> Vec<(ScopeKind, ScopedRecord)> {
        self.scoped.lock().await.clone()
    }

    /// Document records sorted by docid, for order-independent comparison.
    pub async fn documents_by_id(&self) -> Vec<DocumentRecord> {
        let mut documents = self.documents().await;
        documents.sort_by(|a, b| a.docid.cmp(&b.docid));
        documents
    }
}

#[async_trait]
impl OutputSink for MemorySink {
    async fn write_records(
        &self,
        document: &DocumentRecord,
        scoped: &[(ScopeKind, ScopedRecord)],
    ) -> Result<(), SinkError> {
        let mut documents = self.documents.lock().await;
        let mut stored = self.scoped.lock().await;
        documents.push(document.clone());
        stored.extend_from_slice(scoped);
        Ok(())
    }
}
