//! Batch driver: fuses many documents concurrently, one task per document.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tracing::{info, warn};

use spanfuse::{Diagnostics, DocumentFuser, DocumentInput, FusionConfig};

use crate::source::{AnnotationViewSource, MetadataSource, OutputSink, SourceError};
use crate::types::{BatchResult, DocumentError, DocumentFailure, FusionEvent};

struct Collaborators {
    fuser: DocumentFuser,
    views: Arc<dyn AnnotationViewSource>,
    metadata: Arc<dyn MetadataSource>,
    sink: Arc<dyn OutputSink>,
}

/// Runs a [`DocumentFuser`] over a batch of documents on a bounded pool of
/// tokio tasks.
///
/// A document that fails, or whose task panics, is reported and counted;
/// the rest of the batch continues.
pub struct BatchDriver {
    shared: Arc<Collaborators>,
}

impl BatchDriver {
    pub fn new(
        fuser: DocumentFuser,
        views: Arc<dyn AnnotationViewSource>,
        metadata: Arc<dyn MetadataSource>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            shared: Arc::new(Collaborators {
                fuser,
                views,
                metadata,
                sink,
            }),
        }
    }

    pub fn config(&self) -> &FusionConfig {
        self.shared.fuser.config()
    }

    /// Fuse every document in `doc_ids`, emitting events for progress
    /// tracking. A document's sequence number is its position in `doc_ids`
    /// plus one.
    pub async fn run_batch(
        &self,
        doc_ids: &[String],
        event_tx: mpsc::Sender<FusionEvent>,
    ) -> anyhow::Result<BatchResult> {
        let workers = self.config().workers.max(1);
        let semaphore = Arc::new(Semaphore::new(workers));

        let _ = event_tx
            .send(FusionEvent::Started {
                total_documents: doc_ids.len(),
            })
            .await;
        info!("Fusing {} documents with {} workers", doc_ids.len(), workers);

        let mut handles = Vec::with_capacity(doc_ids.len());
        for (idx, doc_id) in doc_ids.iter().enumerate() {
            let sequence = idx + 1;
            let permit = Arc::clone(&semaphore).acquire_owned().await?;
            let shared = Arc::clone(&self.shared);
            let event_tx = event_tx.clone();
            let document_id = doc_id.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let _ = event_tx
                    .send(FusionEvent::DocumentStarted {
                        sequence,
                        document_id: document_id.clone(),
                    })
                    .await;
                process_document(&shared, sequence, &document_id).await
            });
            handles.push((sequence, doc_id.clone(), handle));
        }

        let mut result = BatchResult::default();
        for (sequence, document_id, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(DocumentError::Worker(e.to_string())),
            };

            match outcome {
                Ok(diagnostics) => {
                    result.succeeded += 1;
                    result.diagnostics.merge(&diagnostics);
                    let _ = event_tx
                        .send(FusionEvent::DocumentCompleted {
                            sequence,
                            document_id,
                            diagnostics,
                        })
                        .await;
                }
                Err(e) if e.is_skip() => {
                    warn!("Skipping document {} ({}): {}", document_id, sequence, e);
                    result.skipped += 1;
                    let _ = event_tx
                        .send(FusionEvent::DocumentSkipped {
                            sequence,
                            document_id,
                            reason: e.to_string(),
                        })
                        .await;
                }
                Err(e) => {
                    warn!("Failed to fuse document {} ({}): {}", document_id, sequence, e);
                    result.failed += 1;
                    result.failures.push(DocumentFailure {
                        sequence,
                        document_id: document_id.clone(),
                        error: e.to_string(),
                    });
                    let _ = event_tx
                        .send(FusionEvent::DocumentFailed {
                            sequence,
                            document_id,
                            error: e.to_string(),
                        })
                        .await;
                }
            }
        }

        if let Err(e) = self.shared.sink.flush().await {
            warn!("Failed to flush output sink: {}", e);
        }

        info!(
            "Batch complete: {} succeeded, {} failed, {} skipped",
            result.succeeded, result.failed, result.skipped
        );
        let _ = event_tx
            .send(FusionEvent::Complete {
                succeeded: result.succeeded,
                failed: result.failed,
                skipped: result.skipped,
            })
            .await;

        Ok(result)
    }

    /// Run a batch without observing progress events.
    pub async fn run(&self, doc_ids: &[String]) -> anyhow::Result<BatchResult> {
        let (event_tx, mut event_rx) = mpsc::channel(64);
        let drain = tokio::spawn(async move { while event_rx.recv().await.is_some() {} });
        let result = self.run_batch(doc_ids, event_tx).await;
        let _ = drain.await;
        result
    }
}

async fn process_document(
    shared: &Collaborators,
    sequence: usize,
    doc_id: &str,
) -> Result<Diagnostics, DocumentError> {
    let config = shared.fuser.config();
    let text = shared.views.get_text(doc_id).await?;
    let mut input = DocumentInput::new(doc_id, text);

    for name in config.wanted_layers() {
        match shared.views.get_layer(doc_id, name).await {
            Ok(layer) => {
                input.layers.insert(name.to_string(), layer);
            }
            // the fuser decides whether the layer was optional
            Err(SourceError::LayerMissing { .. }) => {}
            Err(e) => return Err(e.into()),
        }
    }
    input.metadata = shared.metadata.get_metadata(doc_id).await?;

    let fused = shared.fuser.fuse(sequence, input)?;

    let document = fused.record();
    let scoped = fused.scoped_records(config.omit_empty_fields);
    shared.sink.write_records(&document, &scoped).await?;
    Ok(fused.diagnostics)
}
