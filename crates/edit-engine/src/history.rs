// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The model editor: edits wrapped in memento-based undo/redo.
//!
//! Every edit is bracketed by two whole-graph snapshots — the encoded
//! bytes before and after — pushed as an opaque [`Memento`] pair. Undo
//! and redo simply decode the respective snapshot and replace the live
//! graph. Full re-encode trades memory for simplicity: it is correct no
//! matter how deep or interdependent an edit's effects are, because the
//! snapshot *is* the whole model.
//!
//! # Ownership Model
//!
//! ```text
//! ModelEditor
//!   ├── GraphStore      — the live graph, mutated in place by edits
//!   └── EditHistory
//!         ├── undo: Vec<Memento { before, after }>
//!         └── redo: Vec<Memento>
//! ```
//!
//! Snapshots are immutable once captured and cheap to clone (shared
//! bytes). No component ever mutates one.

use crate::{engine, EditError, EditRequest};
use kv_codec::KvMap;
use model_store::{codec, GraphStore};
use std::sync::Arc;

/// Default window for chunked snapshot transfer: 10 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 10 * 1024 * 1024;

/// An opaque, immutable whole-model byte snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    bytes: Arc<[u8]>,
}

impl Snapshot {
    fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// The encoded model bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Snapshot size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` for a zero-length snapshot (never produced by the codec,
    /// but the type does not forbid it).
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Splits the snapshot into fixed-size windows for incremental
    /// transfer to a display surface. The final chunk may be short.
    pub fn chunks(&self, window: usize) -> impl Iterator<Item = ModelChunk> + '_ {
        let total = self.bytes.len();
        self.bytes.chunks(window.max(1)).enumerate().map(move |(i, chunk)| ModelChunk {
            offset: i * window.max(1),
            length: chunk.len(),
            total,
            bytes: chunk.to_vec(),
        })
    }
}

/// One window of a chunked snapshot transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelChunk {
    /// Byte offset of this window within the snapshot.
    pub offset: usize,
    /// Length of `bytes`.
    pub length: usize,
    /// Total snapshot size, repeated in every chunk.
    pub total: usize,
    /// The window's bytes.
    pub bytes: Vec<u8>,
}

/// A before/after snapshot pair for one applied edit.
#[derive(Debug, Clone)]
pub struct Memento {
    before: Snapshot,
    after: Snapshot,
}

/// Undo/redo stacks of mementos.
#[derive(Debug, Default)]
struct EditHistory {
    undo: Vec<Memento>,
    redo: Vec<Memento>,
}

/// The mutation core's top-level handle: owns the live graph and wraps
/// every edit with undo/redo bookkeeping.
///
/// # Example
/// ```no_run
/// use edit_engine::{EditRequest, ModelEditor};
///
/// # fn example(bytes: &[u8], json: &str) -> Result<(), edit_engine::EditError> {
/// let mut editor = ModelEditor::from_bytes(bytes)?;
/// let after = editor.perform_edit(&EditRequest::from_json(json)?)?;
/// assert_eq!(after.as_bytes(), editor.snapshot().as_bytes());
/// editor.undo()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ModelEditor {
    store: GraphStore,
    history: EditHistory,
}

impl ModelEditor {
    /// Wraps an existing store.
    pub fn new(store: GraphStore) -> Self {
        Self {
            store,
            history: EditHistory::default(),
        }
    }

    /// Decodes model bytes into a fresh editor.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EditError> {
        Ok(Self::new(GraphStore::from_bytes(bytes)?))
    }

    /// Read-only access to the live graph.
    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Encodes the current graph into a fresh snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.store.to_bytes())
    }

    /// Applies one edit request, bracketed by snapshots.
    ///
    /// On success the memento is pushed, the redo stack is cleared, and
    /// the "after" snapshot is returned for propagation. On failure the
    /// live graph is restored from the "before" snapshot — the engine
    /// itself makes no rollback promises, so the editor re-applies the
    /// snapshot it already holds — and the error propagates.
    pub fn perform_edit(&mut self, req: &EditRequest) -> Result<Snapshot, EditError> {
        let before = self.snapshot();
        tracing::info!("applying '{}' edit", req.kind());

        if let Err(err) = engine::apply(&mut self.store, req) {
            tracing::warn!("edit failed, restoring pre-edit graph: {err}");
            let model = codec::decode(before.as_bytes())?;
            self.store.replace(model);
            return Err(err);
        }

        let after = self.snapshot();
        self.history.undo.push(Memento {
            before,
            after: after.clone(),
        });
        self.history.redo.clear();
        Ok(after)
    }

    /// Reverts the most recent edit. Returns the restored snapshot, or
    /// `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<Option<Snapshot>, EditError> {
        let Some(memento) = self.history.undo.pop() else {
            return Ok(None);
        };
        let model = codec::decode(memento.before.as_bytes())?;
        self.store.replace(model);
        let restored = memento.before.clone();
        self.history.redo.push(memento);
        Ok(Some(restored))
    }

    /// Re-applies the most recently undone edit. Returns the restored
    /// snapshot, or `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Result<Option<Snapshot>, EditError> {
        let Some(memento) = self.history.redo.pop() else {
            return Ok(None);
        };
        let model = codec::decode(memento.after.as_bytes())?;
        self.store.replace(model);
        let restored = memento.after.clone();
        self.history.undo.push(memento);
        Ok(Some(restored))
    }

    /// `true` when an edit can be undone.
    pub fn can_undo(&self) -> bool {
        !self.history.undo.is_empty()
    }

    /// `true` when an undone edit can be re-applied.
    pub fn can_redo(&self) -> bool {
        !self.history.redo.is_empty()
    }

    /// Decodes an operator's opaque custom-attribute payload for
    /// read-only display.
    pub fn custom_options(
        &self,
        subgraph_idx: usize,
        operator_idx: usize,
    ) -> Result<KvMap, EditError> {
        let op = self.store.operator(subgraph_idx, operator_idx)?;
        Ok(kv_codec::decode(&op.custom_options)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot(len: usize) -> Snapshot {
        Snapshot::new((0..len).map(|i| (i % 251) as u8).collect())
    }

    #[test]
    fn test_chunks_cover_snapshot() {
        let snap = sample_snapshot(2500);
        let chunks: Vec<_> = snap.chunks(1000).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].offset, 0);
        assert_eq!(chunks[1].offset, 1000);
        assert_eq!(chunks[2].offset, 2000);
        assert_eq!(chunks[2].length, 500);
        assert!(chunks.iter().all(|c| c.total == 2500));

        let mut reassembled = Vec::new();
        for c in &chunks {
            assert_eq!(c.bytes.len(), c.length);
            reassembled.extend_from_slice(&c.bytes);
        }
        assert_eq!(reassembled, snap.as_bytes());
    }

    #[test]
    fn test_chunks_single_window() {
        let snap = sample_snapshot(10);
        let chunks: Vec<_> = snap.chunks(DEFAULT_CHUNK_SIZE).collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].length, 10);
    }

    #[test]
    fn test_empty_snapshot_has_no_chunks() {
        let snap = sample_snapshot(0);
        assert!(snap.is_empty());
        assert_eq!(snap.chunks(16).count(), 0);
    }

    #[test]
    fn test_snapshot_clone_shares_bytes() {
        let snap = sample_snapshot(64);
        let clone = snap.clone();
        assert_eq!(snap.as_bytes().as_ptr(), clone.as_bytes().as_ptr());
    }
}
