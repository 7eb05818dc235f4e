// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The in-memory model: the decoded form of a tensor-graph file.
//!
//! These are plain owned structs — the codec builds them on decode, the
//! edit engine mutates them in place, and undo/redo replaces the whole
//! tree wholesale. Index references (tensor → buffer, operator → opcode,
//! operator → tensors) are kept numeric exactly as the format stores
//! them; nothing here chases or validates them.

use schema_core::{BuiltinOptions, OptionsTag, Shape, TensorType};

/// The root graph: everything one model file contains.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    /// Producer-assigned model version.
    pub version: u32,
    /// Free-form description carried through unchanged.
    pub description: String,
    /// Operator kinds referenced by `Operator::opcode_index`.
    pub operator_codes: Vec<OperatorCode>,
    /// Computation graphs; index-stable within a session.
    pub subgraphs: Vec<Subgraph>,
    /// Raw data payloads referenced by `Tensor::buffer`.
    pub buffers: Vec<Buffer>,
}

/// One computation graph within the model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subgraph {
    /// Optional subgraph name.
    pub name: Option<String>,
    /// Tensors owned by this subgraph, referenced by position.
    pub tensors: Vec<Tensor>,
    /// Operators in execution order.
    pub operators: Vec<Operator>,
    /// Indices of the graph's input tensors.
    pub inputs: Vec<i32>,
    /// Indices of the graph's output tensors.
    pub outputs: Vec<i32>,
}

/// A named, typed, shaped reference to a data buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    pub name: String,
    pub dtype: TensorType,
    pub shape: Shape,
    /// Like `shape` but allowing the dynamic marker; absent when the
    /// shape is fully static.
    pub shape_signature: Option<Shape>,
    /// Index into `Model::buffers`. The buffer is referenced, never
    /// owned; several tensors may share one.
    pub buffer: u32,
    pub quantization: Option<QuantizationParameters>,
    pub sparsity: Option<SparsityParameters>,
    pub is_variable: bool,
}

impl Default for Tensor {
    fn default() -> Self {
        Self {
            name: String::new(),
            dtype: TensorType::Float32,
            shape: Shape::default(),
            shape_signature: None,
            buffer: 0,
            quantization: None,
            sparsity: None,
            is_variable: false,
        }
    }
}

/// A raw byte payload. Owned exclusively by `Model::buffers`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buffer {
    pub data: Vec<u8>,
}

/// Identifies an operator kind: a builtin code, or — when the code is
/// the custom sentinel — a free-form name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperatorCode {
    pub builtin_code: i32,
    /// Populated only for custom operators.
    pub custom_code: Option<String>,
}

/// One computation node.
///
/// Exactly one of `builtin_options` / `custom_options` is meaningful at
/// a time, selected by whether the opcode denotes a custom operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operator {
    /// Index into `Model::operator_codes`.
    pub opcode_index: u32,
    /// Input tensor indices into the owning subgraph (`-1` marks an
    /// optional input left unset).
    pub inputs: Vec<i32>,
    /// Output tensor indices into the owning subgraph.
    pub outputs: Vec<i32>,
    /// Which options record this operator claims to carry.
    pub options_tag: OptionsTag,
    /// The typed options record, absent for custom and option-less
    /// operators.
    pub builtin_options: Option<BuiltinOptions>,
    /// Opaque key-value payload, used only for custom operators.
    pub custom_options: Vec<u8>,
}

/// Per-tensor quantization parameters, carried through unchanged.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QuantizationParameters {
    #[serde(default)]
    pub scale: Vec<f32>,
    #[serde(default)]
    pub zero_point: Vec<i64>,
    #[serde(default)]
    pub min: Vec<f32>,
    #[serde(default)]
    pub max: Vec<f32>,
    #[serde(default)]
    pub quantized_dimension: i32,
}

/// Per-tensor sparsity parameters, carried through unchanged.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SparsityParameters {
    #[serde(default)]
    pub traversal_order: Vec<i32>,
    #[serde(default)]
    pub block_map: Vec<i32>,
}

impl Model {
    /// Total bytes held by all buffers.
    pub fn total_buffer_bytes(&self) -> usize {
        self.buffers.iter().map(|b| b.data.len()).sum()
    }

    /// Returns a one-line summary for logs and the inspector.
    pub fn summary(&self) -> String {
        let tensors: usize = self.subgraphs.iter().map(|s| s.tensors.len()).sum();
        let operators: usize = self.subgraphs.iter().map(|s| s.operators.len()).sum();
        format!(
            "model v{}: {} subgraph(s), {} tensor(s), {} operator(s), {} buffer(s) ({} data bytes)",
            self.version,
            self.subgraphs.len(),
            tensors,
            operators,
            self.buffers.len(),
            self.total_buffer_bytes(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let model = Model {
            version: 3,
            subgraphs: vec![Subgraph {
                tensors: vec![Tensor::default(), Tensor::default()],
                operators: vec![Operator::default()],
                ..Subgraph::default()
            }],
            buffers: vec![Buffer { data: vec![0; 16] }],
            ..Model::default()
        };
        let s = model.summary();
        assert!(s.contains("v3"));
        assert!(s.contains("1 subgraph"));
        assert!(s.contains("2 tensor"));
        assert!(s.contains("16 data bytes"));
    }

    #[test]
    fn test_total_buffer_bytes() {
        let model = Model {
            buffers: vec![
                Buffer { data: vec![0; 4] },
                Buffer { data: vec![] },
                Buffer { data: vec![0; 12] },
            ],
            ..Model::default()
        };
        assert_eq!(model.total_buffer_bytes(), 16);
    }
}
