//! Audit sink for edges severed by the cycle resolver.
//!
//! The resolver only returns the removed edges; persisting them is the
//! caller's job. Rows are written as JSON Lines `{tail, head, qty_per}` in
//! the order the resolver processed them.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::BomError;
use crate::model::RemovedEdge;

/// Destination for removed-edge audit records.
pub trait AuditSink {
    /// Persist `removed`. Called once per run, after cycle resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot be written.
    fn record(&mut self, removed: &[RemovedEdge]) -> Result<(), BomError>;
}

/// Writes removed edges to a JSON Lines file.
///
/// Nothing is written, and no file is created, when no edge was removed.
#[derive(Debug, Clone)]
pub struct JsonlAuditSink {
    path: PathBuf,
}

impl JsonlAuditSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for JsonlAuditSink {
    fn record(&mut self, removed: &[RemovedEdge]) -> Result<(), BomError> {
        if removed.is_empty() {
            return Ok(());
        }

        let file = File::create(&self.path)?;
        let mut out = BufWriter::new(file);
        write_removed_edges(&mut out, removed)?;

        warn!(
            removed = removed.len(),
            path = %self.path.display(),
            "severed BOM cycle edges logged for review"
        );
        Ok(())
    }
}

/// Keeps removed edges in memory. Used when no audit path is configured.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditSink {
    pub removed: Vec<RemovedEdge>,
}

impl AuditSink for MemoryAuditSink {
    fn record(&mut self, removed: &[RemovedEdge]) -> Result<(), BomError> {
        self.removed.extend_from_slice(removed);
        Ok(())
    }
}

/// Write removed edges as JSON Lines.
///
/// # Errors
///
/// Returns [`BomError::Io`] if writing fails.
pub fn write_removed_edges<W: Write>(out: &mut W, removed: &[RemovedEdge]) -> Result<(), BomError> {
    for edge in removed {
        serde_json::to_writer(&mut *out, edge).map_err(std::io::Error::from)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn removed(tail: &str, head: &str, qty: f64) -> RemovedEdge {
        RemovedEdge {
            tail: tail.to_string(),
            head: head.to_string(),
            qty_per: qty,
        }
    }

    #[test]
    fn jsonl_sink_skips_empty_log() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("removed.jsonl");
        let mut sink = JsonlAuditSink::new(&path);

        sink.record(&[]).expect("record");

        assert!(!path.exists(), "no file for an empty log");
    }

    #[test]
    fn jsonl_sink_preserves_processing_order() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("removed.jsonl");
        let mut sink = JsonlAuditSink::new(&path);

        sink.record(&[removed("B", "C", 1.0), removed("Y", "X", 0.5)])
            .expect("record");

        let content = std::fs::read_to_string(&path).expect("read back");
        let rows: Vec<RemovedEdge> = content
            .lines()
            .map(|line| serde_json::from_str(line).expect("row"))
            .collect();
        assert_eq!(rows, vec![removed("B", "C", 1.0), removed("Y", "X", 0.5)]);
    }

    #[test]
    fn memory_sink_accumulates() {
        let mut sink = MemoryAuditSink::default();
        sink.record(&[removed("A", "B", 2.0)]).expect("record");
        sink.record(&[removed("C", "D", 3.0)]).expect("record");
        assert_eq!(sink.removed.len(), 2);
    }
}
