//! spanfuse-batch - concurrent batch driver for spanfuse.
//!
//! Reads each document's text, annotation layers and metadata from
//! collaborator sources, fuses them with a [`spanfuse::DocumentFuser`] on a
//! bounded pool of tokio tasks and hands the resulting records to an output
//! sink.

pub mod driver;
pub mod memory;
pub mod sink;
pub mod source;
pub mod telemetry;
pub mod types;

pub use driver::BatchDriver;
pub use memory::{MemoryMetadataSource, MemorySink, MemoryViewSource};
pub use sink::JsonLinesSink;
pub use source::{AnnotationViewSource, MetadataSource, OutputSink, SinkError, SourceError};
pub use types::{BatchResult, DocumentError, DocumentFailure, FusionEvent};
