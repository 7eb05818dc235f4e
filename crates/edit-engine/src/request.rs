// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Structured edit requests.
//!
//! The editor front-end delivers edits as loosely-typed JSON: numbers and
//! booleans arrive as strings, attribute values are free text paired with
//! a declared type name, and tensor patches may carry their type/shape
//! either directly or inside an `initializer` descriptor. These types
//! capture that payload shape verbatim; all coercion happens later, in
//! the engine.
//!
//! # Example payloads
//! ```json
//! { "kind": "attribute", "subgraph_idx": 0, "operator_idx": 2,
//!   "op_name": "ADD",
//!   "attributes": [ { "key": "fused_activation_function",
//!                     "value": "relu",
//!                     "type": "ActivationFunctionType" } ] }
//! ```
//! ```json
//! { "kind": "tensor_add", "subgraph_idx": 0,
//!   "tensor": { "name": "bias", "dtype": "int32", "shape": [2, 3],
//!               "data": [0,0,0,0,0,0,0,0,0,0,0,0,
//!                        0,0,0,0,0,0,0,0,0,0,0,0] } }
//! ```

use crate::EditError;
use model_store::{QuantizationParameters, SparsityParameters};

/// One structured edit request, tagged by kind. Produced by the
/// front-end, consumed once, discarded.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditRequest {
    /// Edit one operator's attributes (builtin or custom).
    Attribute(AttributeEdit),
    /// Edit one or more existing tensors.
    Tensor(TensorEdit),
    /// Append a new tensor (and its backing buffer).
    TensorAdd(TensorAddEdit),
}

impl EditRequest {
    /// Parses a request from the front-end's JSON payload.
    pub fn from_json(json: &str) -> Result<Self, EditError> {
        serde_json::from_str(json).map_err(|e| EditError::Request(e.to_string()))
    }

    /// Returns the request kind for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            EditRequest::Attribute(_) => "attribute",
            EditRequest::Tensor(_) => "tensor",
            EditRequest::TensorAdd(_) => "tensor_add",
        }
    }
}

/// An attribute edit against one operator.
///
/// For builtin operators the engine applies each entry to the matching
/// options-record field. For custom operators (`op_name` resolves to the
/// custom sentinel) the entries are the *full replacement* attribute set,
/// re-encoded wholesale into the operator's opaque payload, and
/// `custom_name` supplies the custom operator's own name.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AttributeEdit {
    pub subgraph_idx: usize,
    pub operator_idx: usize,
    /// Operator type name, resolved case/underscore-insensitively.
    pub op_name: String,
    /// Custom operator name; required when `op_name` is the custom
    /// sentinel, ignored otherwise.
    #[serde(default)]
    pub custom_name: Option<String>,
    pub attributes: Vec<AttributeEntry>,
}

/// One key/value/type triple of an attribute edit.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AttributeEntry {
    pub key: String,
    /// Value as free text; parsed according to `value_type`.
    pub value: String,
    /// Declared value type: a schema enumeration name, or one of
    /// `"int"`, `"float"`, `"bool"`, `"string"`, `"int_list"`.
    #[serde(rename = "type")]
    pub value_type: String,
}

/// A tensor edit: a batch of per-tensor patches within one subgraph.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TensorEdit {
    pub subgraph_idx: usize,
    pub tensors: Vec<TensorPatch>,
}

/// One per-tensor patch.
///
/// Type and shape come either from the direct fields or, when present,
/// from the `initializer` descriptor (which may also carry replacement
/// buffer bytes and the variable flag).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TensorPatch {
    pub tensor_idx: usize,
    pub name: String,
    #[serde(default)]
    pub dtype: Option<String>,
    #[serde(default)]
    pub shape: Option<Vec<i32>>,
    #[serde(default)]
    pub initializer: Option<TensorInitializer>,
}

/// Embedded type/shape/data descriptor of a constant tensor.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TensorInitializer {
    pub dtype: String,
    pub shape: Vec<i32>,
    /// Replacement buffer bytes; present only when the data changed.
    #[serde(default)]
    pub data: Option<Vec<u8>>,
    #[serde(default)]
    pub is_variable: bool,
}

/// A tensor-add edit.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TensorAddEdit {
    pub subgraph_idx: usize,
    pub tensor: NewTensor,
}

/// Everything a freshly added tensor carries.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NewTensor {
    pub name: String,
    pub dtype: String,
    pub shape: Vec<i32>,
    #[serde(default)]
    pub shape_signature: Option<Vec<i32>>,
    /// Bytes of the new backing buffer.
    #[serde(default)]
    pub data: Vec<u8>,
    #[serde(default)]
    pub quantization: Option<QuantizationParameters>,
    #[serde(default)]
    pub sparsity: Option<SparsityParameters>,
    #[serde(default)]
    pub is_variable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attribute_request() {
        let json = r#"{
            "kind": "attribute",
            "subgraph_idx": 0,
            "operator_idx": 2,
            "op_name": "ADD",
            "attributes": [
                { "key": "fused_activation_function",
                  "value": "relu",
                  "type": "ActivationFunctionType" }
            ]
        }"#;
        let req = EditRequest::from_json(json).unwrap();
        assert_eq!(req.kind(), "attribute");
        match req {
            EditRequest::Attribute(a) => {
                assert_eq!(a.op_name, "ADD");
                assert_eq!(a.custom_name, None);
                assert_eq!(a.attributes.len(), 1);
                assert_eq!(a.attributes[0].value_type, "ActivationFunctionType");
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_parse_tensor_request_with_initializer() {
        let json = r#"{
            "kind": "tensor",
            "subgraph_idx": 1,
            "tensors": [
                { "tensor_idx": 4, "name": "weights",
                  "initializer": { "dtype": "float32", "shape": [4],
                                   "data": [0,0,128,63, 0,0,0,64,
                                            0,0,64,64, 0,0,128,64],
                                   "is_variable": true } }
            ]
        }"#;
        let req = EditRequest::from_json(json).unwrap();
        match req {
            EditRequest::Tensor(t) => {
                let init = t.tensors[0].initializer.as_ref().unwrap();
                assert_eq!(init.shape, vec![4]);
                assert_eq!(init.data.as_ref().unwrap().len(), 16);
                assert!(init.is_variable);
                assert!(t.tensors[0].dtype.is_none());
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_parse_tensor_add_request() {
        let json = r#"{
            "kind": "tensor_add",
            "subgraph_idx": 0,
            "tensor": { "name": "bias", "dtype": "int32",
                        "shape": [2, 3], "data": [1, 2, 3] }
        }"#;
        let req = EditRequest::from_json(json).unwrap();
        match req {
            EditRequest::TensorAdd(t) => {
                assert_eq!(t.tensor.shape, vec![2, 3]);
                assert_eq!(t.tensor.data, vec![1, 2, 3]);
                assert!(!t.tensor.is_variable);
                assert!(t.tensor.quantization.is_none());
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let err = EditRequest::from_json(r#"{ "kind": "rename" }"#).unwrap_err();
        assert!(matches!(err, EditError::Request(_)));
    }
}
