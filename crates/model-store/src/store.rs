// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The graph store: single owner of the live decoded model.
//!
//! Every component that needs to read or mutate the graph goes through
//! the store's index-bounded accessors; nothing else touches the model's
//! sequences. Out-of-range indices fail with [`ModelError::Index`] before
//! any mutation happens. The store is a plain value passed by `&mut` —
//! there is deliberately no global instance.

use crate::codec;
use crate::error::ModelError;
use crate::model::{Buffer, Model, Operator, OperatorCode, Subgraph, Tensor};

/// Owns the live [`Model`] between decode and re-encode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphStore {
    model: Model,
}

impl GraphStore {
    /// Wraps an already-decoded model.
    pub fn new(model: Model) -> Self {
        Self { model }
    }

    /// Decodes model bytes into a fresh store.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        Ok(Self {
            model: codec::decode(bytes)?,
        })
    }

    /// Re-encodes the whole graph. This is the snapshot primitive the
    /// undo/redo machinery builds on; it is blocking and proportional to
    /// model size.
    pub fn to_bytes(&self) -> Vec<u8> {
        codec::encode(&self.model)
    }

    /// Read-only view of the whole model (for the codec and display).
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Replaces the live graph wholesale (undo/redo/reload path).
    pub fn replace(&mut self, model: Model) {
        tracing::debug!("replacing live graph: {}", model.summary());
        self.model = model;
    }

    /// Returns a one-line summary of the live graph.
    pub fn summary(&self) -> String {
        self.model.summary()
    }

    // ── Index-bounded accessors ────────────────────────────────────

    pub fn subgraph(&self, idx: usize) -> Result<&Subgraph, ModelError> {
        self.model.subgraphs.get(idx).ok_or(ModelError::Index {
            kind: "subgraph",
            index: idx,
            len: self.model.subgraphs.len(),
        })
    }

    pub fn subgraph_mut(&mut self, idx: usize) -> Result<&mut Subgraph, ModelError> {
        let len = self.model.subgraphs.len();
        self.model.subgraphs.get_mut(idx).ok_or(ModelError::Index {
            kind: "subgraph",
            index: idx,
            len,
        })
    }

    pub fn tensor(&self, subgraph_idx: usize, tensor_idx: usize) -> Result<&Tensor, ModelError> {
        let sg = self.subgraph(subgraph_idx)?;
        sg.tensors.get(tensor_idx).ok_or(ModelError::Index {
            kind: "tensor",
            index: tensor_idx,
            len: sg.tensors.len(),
        })
    }

    pub fn tensor_mut(
        &mut self,
        subgraph_idx: usize,
        tensor_idx: usize,
    ) -> Result<&mut Tensor, ModelError> {
        let sg = self.subgraph_mut(subgraph_idx)?;
        let len = sg.tensors.len();
        sg.tensors.get_mut(tensor_idx).ok_or(ModelError::Index {
            kind: "tensor",
            index: tensor_idx,
            len,
        })
    }

    pub fn operator(
        &self,
        subgraph_idx: usize,
        operator_idx: usize,
    ) -> Result<&Operator, ModelError> {
        let sg = self.subgraph(subgraph_idx)?;
        sg.operators.get(operator_idx).ok_or(ModelError::Index {
            kind: "operator",
            index: operator_idx,
            len: sg.operators.len(),
        })
    }

    pub fn operator_mut(
        &mut self,
        subgraph_idx: usize,
        operator_idx: usize,
    ) -> Result<&mut Operator, ModelError> {
        let sg = self.subgraph_mut(subgraph_idx)?;
        let len = sg.operators.len();
        sg.operators.get_mut(operator_idx).ok_or(ModelError::Index {
            kind: "operator",
            index: operator_idx,
            len,
        })
    }

    pub fn buffer(&self, idx: usize) -> Result<&Buffer, ModelError> {
        self.model.buffers.get(idx).ok_or(ModelError::Index {
            kind: "buffer",
            index: idx,
            len: self.model.buffers.len(),
        })
    }

    pub fn buffer_mut(&mut self, idx: usize) -> Result<&mut Buffer, ModelError> {
        let len = self.model.buffers.len();
        self.model.buffers.get_mut(idx).ok_or(ModelError::Index {
            kind: "buffer",
            index: idx,
            len,
        })
    }

    pub fn operator_code(&self, idx: usize) -> Result<&OperatorCode, ModelError> {
        self.model.operator_codes.get(idx).ok_or(ModelError::Index {
            kind: "operator code",
            index: idx,
            len: self.model.operator_codes.len(),
        })
    }

    pub fn operator_code_mut(&mut self, idx: usize) -> Result<&mut OperatorCode, ModelError> {
        let len = self.model.operator_codes.len();
        self.model
            .operator_codes
            .get_mut(idx)
            .ok_or(ModelError::Index {
                kind: "operator code",
                index: idx,
                len,
            })
    }

    // ── Append operations ──────────────────────────────────────────

    /// Appends a buffer and returns its index.
    pub fn push_buffer(&mut self, buffer: Buffer) -> usize {
        self.model.buffers.push(buffer);
        self.model.buffers.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(subgraphs: usize, tensors: usize) -> GraphStore {
        let model = Model {
            subgraphs: (0..subgraphs)
                .map(|_| Subgraph {
                    tensors: (0..tensors).map(|_| Tensor::default()).collect(),
                    operators: vec![Operator::default()],
                    ..Subgraph::default()
                })
                .collect(),
            buffers: vec![Buffer::default()],
            operator_codes: vec![OperatorCode::default()],
            ..Model::default()
        };
        GraphStore::new(model)
    }

    #[test]
    fn test_accessors_in_range() {
        let store = store_with(2, 3);
        assert!(store.subgraph(1).is_ok());
        assert!(store.tensor(0, 2).is_ok());
        assert!(store.operator(1, 0).is_ok());
        assert!(store.buffer(0).is_ok());
        assert!(store.operator_code(0).is_ok());
    }

    #[test]
    fn test_accessors_out_of_range() {
        let store = store_with(1, 1);
        assert!(matches!(
            store.subgraph(1),
            Err(ModelError::Index { kind: "subgraph", index: 1, len: 1 })
        ));
        assert!(matches!(
            store.tensor(0, 5),
            Err(ModelError::Index { kind: "tensor", index: 5, .. })
        ));
        // Bad subgraph index dominates the tensor index.
        assert!(matches!(
            store.tensor(3, 0),
            Err(ModelError::Index { kind: "subgraph", .. })
        ));
        assert!(matches!(
            store.buffer(9),
            Err(ModelError::Index { kind: "buffer", .. })
        ));
    }

    #[test]
    fn test_push_buffer_returns_new_index() {
        let mut store = store_with(1, 1);
        let idx = store.push_buffer(Buffer { data: vec![1, 2] });
        assert_eq!(idx, 1);
        assert_eq!(store.buffer(1).unwrap().data, vec![1, 2]);
    }

    #[test]
    fn test_bytes_roundtrip_through_store() {
        let store = store_with(1, 2);
        let bytes = store.to_bytes();
        let back = GraphStore::from_bytes(&bytes).unwrap();
        assert_eq!(back.model(), store.model());
    }

    #[test]
    fn test_replace_swaps_graph() {
        let mut store = store_with(1, 1);
        store.replace(Model::default());
        assert!(store.model().subgraphs.is_empty());
    }
}
