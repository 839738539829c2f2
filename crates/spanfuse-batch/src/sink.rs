//! Newline-delimited JSON output.

use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;

use spanfuse::{DocumentRecord, ScopeKind, ScopedRecord};

use crate::source::{OutputSink, SinkError};

#[derive(Serialize)]
struct Line<'a, T> {
    kind: &'static str,
    #[serde(flatten)]
    record: &'a T,
}

/// Writes each record as one JSON object per line, tagged with a `kind` of
/// `document`, `section` or `sentence`.
///
/// A document's lines are serialized before anything is written and reach
/// the writer in a single call, document line first.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer.into_inner().map_err(|_| SinkError::Poisoned)
    }
}

fn push_line<T: Serialize>(
    buf: &mut String,
    kind: &'static str,
    record: &T,
) -> Result<(), SinkError> {
    buf.push_str(&serde_json::to_string(&Line { kind, record })?);
    buf.push('\n');
    Ok(())
}

#[async_trait]
impl<W: Write + Send> OutputSink for JsonLinesSink<W> {
    async fn write_records(
        &self,
        document: &DocumentRecord,
        scoped: &[(ScopeKind, ScopedRecord)],
    ) -> Result<(), SinkError> {
        let mut buf = String::new();
        push_line(&mut buf, "document", document)?;
        for (kind, record) in scoped {
            push_line(&mut buf, kind.as_str(), record)?;
        }

        let mut writer = self.writer.lock().map_err(|_| SinkError::Poisoned)?;
        writer.write_all(buf.as_bytes())?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), SinkError> {
        self.writer.lock().map_err(|_| SinkError::Poisoned)?.flush()?;
        Ok(())
    }
}
