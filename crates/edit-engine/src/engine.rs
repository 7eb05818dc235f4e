// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Edit application: one function per request kind.
//!
//! Each function transitions the store directly from one consistent
//! state to the next — there is no staging. On an error the store may be
//! left partially mutated (beyond the per-tensor loop boundary, or after
//! a field assignment); callers needing atomicity snapshot first, which
//! is exactly what [`ModelEditor`](crate::ModelEditor) does.
//!
//! Steps for an attribute edit:
//! 1. Resolve the operator type name against the registry.
//! 2. Custom sentinel → drop the typed record, rename the opcode, and
//!    re-encode the full attribute set as the opaque payload.
//! 3. Builtin → match the key against the record's fields under
//!    normalization, coerce the value by its declared type, assign.

use crate::request::{AttributeEdit, AttributeEntry, EditRequest, TensorAddEdit, TensorEdit};
use crate::EditError;
use kv_codec::KvWriter;
use model_store::{Buffer, GraphStore, Tensor};
use schema_core::{
    enums, normalize_name, opcode, FieldValue, OptionsError, OptionsTag, Shape, TensorType,
    CUSTOM_CODE,
};

/// Applies one request to the store.
pub(crate) fn apply(store: &mut GraphStore, req: &EditRequest) -> Result<(), EditError> {
    match req {
        EditRequest::Attribute(r) => apply_attribute(store, r),
        EditRequest::Tensor(r) => apply_tensor(store, r),
        EditRequest::TensorAdd(r) => apply_tensor_add(store, r),
    }
}

// ── Attribute edits ────────────────────────────────────────────────

fn apply_attribute(store: &mut GraphStore, req: &AttributeEdit) -> Result<(), EditError> {
    let schema = opcode::resolve(&req.op_name).ok_or_else(|| EditError::UnknownOperator {
        name: req.op_name.clone(),
    })?;
    tracing::debug!(
        "attribute edit: subgraph {} operator {} resolved '{}' to code {}",
        req.subgraph_idx,
        req.operator_idx,
        req.op_name,
        schema.code,
    );
    if schema.code == CUSTOM_CODE {
        apply_custom_attribute(store, req)
    } else {
        apply_builtin_attribute(store, req, schema.options)
    }
}

fn apply_builtin_attribute(
    store: &mut GraphStore,
    req: &AttributeEdit,
    resolved_tag: OptionsTag,
) -> Result<(), EditError> {
    let op = store.operator_mut(req.subgraph_idx, req.operator_idx)?;
    let opts = op
        .builtin_options
        .as_mut()
        .ok_or_else(|| EditError::MissingOptions {
            op: req.op_name.clone(),
        })?;
    let record = opts.record_name();

    for entry in &req.attributes {
        let key = normalize_name(&entry.key);
        if !opts
            .field_defs()
            .iter()
            .any(|d| normalize_name(d.name) == key)
        {
            return Err(EditError::UnknownAttribute {
                key: entry.key.clone(),
                record,
            });
        }
        let value = coerce(entry)?;
        opts.set(&key, &value).map_err(|e| match e {
            OptionsError::InvalidEnumCode { code, enum_name } => EditError::UnknownEnumValue {
                value: code.to_string(),
                enum_name: enum_name.to_string(),
            },
            OptionsError::KindMismatch => EditError::Coercion {
                value: entry.value.clone(),
                ty: entry.value_type.clone(),
            },
            OptionsError::NoSuchField => EditError::UnknownAttribute {
                key: entry.key.clone(),
                record,
            },
        })?;
    }

    op.options_tag = resolved_tag;
    Ok(())
}

fn apply_custom_attribute(store: &mut GraphStore, req: &AttributeEdit) -> Result<(), EditError> {
    let custom_name = req.custom_name.as_deref().ok_or_else(|| {
        EditError::Request("custom attribute edit requires 'custom_name'".into())
    })?;

    // Re-encode the full replacement payload before touching the graph,
    // so a coercion failure leaves the operator untouched.
    let mut w = KvWriter::new();
    w.begin_map();
    for entry in &req.attributes {
        w.key(&entry.key);
        match entry.value_type.as_str() {
            "bool" => w.add_bool(entry.value.trim() == "true"),
            "int" => {
                let v = entry.value.trim().parse::<i64>().map_err(|_| EditError::Coercion {
                    value: entry.value.clone(),
                    ty: "int".into(),
                })?;
                w.add_int(v);
            }
            "float" => {
                let v = entry.value.trim().parse::<f64>().map_err(|_| EditError::Coercion {
                    value: entry.value.clone(),
                    ty: "float".into(),
                })?;
                w.add_float(v);
            }
            _ => w.add_str(&entry.value),
        }
    }
    w.end_map();
    let payload = w.finish()?;

    let opcode_index =
        store.operator(req.subgraph_idx, req.operator_idx)?.opcode_index as usize;
    store.operator_code_mut(opcode_index)?.custom_code = Some(custom_name.to_string());

    let op = store.operator_mut(req.subgraph_idx, req.operator_idx)?;
    op.options_tag = OptionsTag::None;
    op.builtin_options = None;
    op.custom_options = payload;
    tracing::debug!(
        "custom operator renamed to '{custom_name}', payload {} bytes",
        op.custom_options.len(),
    );
    Ok(())
}

/// Coerces one attribute entry to a field value according to its
/// declared type.
fn coerce(entry: &AttributeEntry) -> Result<FieldValue, EditError> {
    let ty = entry.value_type.as_str();
    if enums::is_enum_type(ty) {
        let code = enums::lookup(ty, &entry.value).ok_or_else(|| EditError::UnknownEnumValue {
            value: entry.value.clone(),
            enum_name: ty.to_string(),
        })?;
        return Ok(FieldValue::Int(code as i64));
    }

    let text = entry.value.trim();
    let fail = || EditError::Coercion {
        value: entry.value.clone(),
        ty: ty.to_string(),
    };
    match ty {
        "int" => text.parse::<i64>().map(FieldValue::Int).map_err(|_| fail()),
        "float" => text.parse::<f32>().map(FieldValue::Float).map_err(|_| fail()),
        "bool" => match text {
            "true" => Ok(FieldValue::Bool(true)),
            "false" => Ok(FieldValue::Bool(false)),
            _ => Err(fail()),
        },
        "string" => Ok(FieldValue::Str(entry.value.clone())),
        "int_list" | "ints" => parse_int_list(text).map(FieldValue::IntList).ok_or_else(fail),
        _ => Err(fail()),
    }
}

/// Parses `"1,2,3"` or `"[1, 2, 3]"` into a dimension list.
fn parse_int_list(text: &str) -> Option<Vec<i32>> {
    let inner = text.trim().trim_start_matches('[').trim_end_matches(']');
    if inner.trim().is_empty() {
        return Some(vec![]);
    }
    inner
        .split(',')
        .map(|part| part.trim().parse::<i32>().ok())
        .collect()
}

// ── Tensor edits ───────────────────────────────────────────────────

fn apply_tensor(store: &mut GraphStore, req: &TensorEdit) -> Result<(), EditError> {
    for patch in &req.tensors {
        // Type, shape, and the variable flag come from the initializer
        // when one is present, otherwise from the direct fields.
        let (dtype_name, shape_dims, data, is_variable) = match &patch.initializer {
            Some(init) => (
                init.dtype.as_str(),
                init.shape.clone(),
                init.data.as_ref(),
                Some(init.is_variable),
            ),
            None => {
                let dtype = patch.dtype.as_deref().ok_or_else(|| {
                    EditError::Request(format!(
                        "tensor patch {} carries neither dtype nor initializer",
                        patch.tensor_idx
                    ))
                })?;
                let shape = patch.shape.clone().ok_or_else(|| {
                    EditError::Request(format!(
                        "tensor patch {} carries neither shape nor initializer",
                        patch.tensor_idx
                    ))
                })?;
                (dtype, shape, None, None)
            }
        };
        let dtype = TensorType::from_name(dtype_name).ok_or_else(|| {
            EditError::UnknownEnumValue {
                value: dtype_name.to_string(),
                enum_name: "TensorType".into(),
            }
        })?;

        let buffer_idx = {
            let tensor = store.tensor_mut(req.subgraph_idx, patch.tensor_idx)?;
            tensor.name = patch.name.clone();
            tensor.dtype = dtype;
            tensor.shape = Shape::new(shape_dims);
            if let Some(v) = is_variable {
                tensor.is_variable = v;
            }
            tensor.buffer as usize
        };

        if let Some(bytes) = data {
            // Replacement bytes land in the tensor's existing buffer —
            // buffer identity never changes. Byte length vs. declared
            // shape is not checked; a consumer-side validation pass
            // would be the place for that.
            store.buffer_mut(buffer_idx)?.data = bytes.clone();
            tracing::debug!(
                "tensor {}:{} buffer {buffer_idx} replaced with {} bytes",
                req.subgraph_idx,
                patch.tensor_idx,
                bytes.len(),
            );
        }
    }
    Ok(())
}

fn apply_tensor_add(store: &mut GraphStore, req: &TensorAddEdit) -> Result<(), EditError> {
    let def = &req.tensor;
    let dtype =
        TensorType::from_name(&def.dtype).ok_or_else(|| EditError::UnknownEnumValue {
            value: def.dtype.clone(),
            enum_name: "TensorType".into(),
        })?;

    // Bounds-check the target subgraph before appending anything.
    store.subgraph(req.subgraph_idx)?;

    let buffer_idx = store.push_buffer(Buffer {
        data: def.data.clone(),
    });
    let tensor = Tensor {
        name: def.name.clone(),
        dtype,
        shape: Shape::new(def.shape.clone()),
        shape_signature: def.shape_signature.clone().map(Shape::new),
        buffer: buffer_idx as u32,
        quantization: def.quantization.clone(),
        sparsity: def.sparsity.clone(),
        is_variable: def.is_variable,
    };
    store.subgraph_mut(req.subgraph_idx)?.tensors.push(tensor);
    tracing::debug!(
        "added tensor '{}' to subgraph {} (buffer {buffer_idx}, {} bytes)",
        def.name,
        req.subgraph_idx,
        def.data.len(),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{NewTensor, TensorInitializer, TensorPatch};
    use model_store::{Model, Operator, OperatorCode, Subgraph};
    use schema_core::enums::ActivationFunctionType;
    use schema_core::options::AddOptions;
    use schema_core::BuiltinOptions;

    fn fixture_store() -> GraphStore {
        let model = Model {
            version: 1,
            operator_codes: vec![
                OperatorCode { builtin_code: 0, custom_code: None },
                OperatorCode { builtin_code: CUSTOM_CODE, custom_code: None },
            ],
            subgraphs: vec![Subgraph {
                tensors: vec![
                    Tensor {
                        name: "in".into(),
                        dtype: TensorType::Float32,
                        shape: Shape::new(vec![4]),
                        buffer: 0,
                        ..Tensor::default()
                    },
                    Tensor {
                        name: "w".into(),
                        dtype: TensorType::Float32,
                        shape: Shape::new(vec![4]),
                        buffer: 1,
                        ..Tensor::default()
                    },
                ],
                operators: vec![
                    Operator {
                        opcode_index: 0,
                        inputs: vec![0, 1],
                        outputs: vec![0],
                        options_tag: OptionsTag::Add,
                        builtin_options: Some(BuiltinOptions::Add(AddOptions::default())),
                        custom_options: vec![],
                    },
                    Operator {
                        opcode_index: 1,
                        inputs: vec![0],
                        outputs: vec![1],
                        options_tag: OptionsTag::None,
                        builtin_options: None,
                        custom_options: vec![],
                    },
                ],
                ..Subgraph::default()
            }],
            buffers: vec![
                Buffer { data: vec![] },
                Buffer { data: vec![0; 16] },
            ],
            ..Model::default()
        };
        GraphStore::new(model)
    }

    fn attr_entry(key: &str, value: &str, ty: &str) -> AttributeEntry {
        AttributeEntry {
            key: key.into(),
            value: value.into(),
            value_type: ty.into(),
        }
    }

    #[test]
    fn test_builtin_attribute_enum_value() {
        let mut store = fixture_store();
        let req = AttributeEdit {
            subgraph_idx: 0,
            operator_idx: 0,
            op_name: "ADD".into(),
            custom_name: None,
            attributes: vec![attr_entry(
                "fused_activation_function",
                "relu",
                "ActivationFunctionType",
            )],
        };
        apply_attribute(&mut store, &req).unwrap();

        let op = store.operator(0, 0).unwrap();
        assert_eq!(op.options_tag, OptionsTag::Add);
        match op.builtin_options.as_ref().unwrap() {
            BuiltinOptions::Add(o) => {
                assert_eq!(o.fused_activation_function, ActivationFunctionType::Relu);
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn test_attribute_key_normalization() {
        for key in ["pot_scale_int16", "potscaleint16", "POT_SCALE_INT16"] {
            let mut store = fixture_store();
            let req = AttributeEdit {
                subgraph_idx: 0,
                operator_idx: 0,
                op_name: "add".into(),
                custom_name: None,
                attributes: vec![attr_entry(key, "true", "bool")],
            };
            apply_attribute(&mut store, &req).unwrap();
            match store.operator(0, 0).unwrap().builtin_options.as_ref().unwrap() {
                BuiltinOptions::Add(o) => assert!(o.pot_scale_int16, "failed for {key}"),
                other => panic!("unexpected record {other:?}"),
            }
        }
    }

    #[test]
    fn test_unknown_operator_fails() {
        let mut store = fixture_store();
        let req = AttributeEdit {
            subgraph_idx: 0,
            operator_idx: 0,
            op_name: "NOT_A_REAL_OP".into(),
            custom_name: None,
            attributes: vec![],
        };
        let err = apply_attribute(&mut store, &req).unwrap_err();
        assert!(matches!(err, EditError::UnknownOperator { .. }));
    }

    #[test]
    fn test_missing_options_fails() {
        let mut store = fixture_store();
        store.operator_mut(0, 0).unwrap().builtin_options = None;
        let req = AttributeEdit {
            subgraph_idx: 0,
            operator_idx: 0,
            op_name: "ADD".into(),
            custom_name: None,
            attributes: vec![attr_entry("pot_scale_int16", "true", "bool")],
        };
        assert!(matches!(
            apply_attribute(&mut store, &req),
            Err(EditError::MissingOptions { .. })
        ));
    }

    #[test]
    fn test_unknown_attribute_fails() {
        let mut store = fixture_store();
        let req = AttributeEdit {
            subgraph_idx: 0,
            operator_idx: 0,
            op_name: "ADD".into(),
            custom_name: None,
            attributes: vec![attr_entry("stride_w", "2", "int")],
        };
        let err = apply_attribute(&mut store, &req).unwrap_err();
        assert!(matches!(
            err,
            EditError::UnknownAttribute { record: "AddOptions", .. }
        ));
    }

    #[test]
    fn test_unknown_enum_value_fails() {
        let mut store = fixture_store();
        let req = AttributeEdit {
            subgraph_idx: 0,
            operator_idx: 0,
            op_name: "ADD".into(),
            custom_name: None,
            attributes: vec![attr_entry(
                "fused_activation_function",
                "swish",
                "ActivationFunctionType",
            )],
        };
        assert!(matches!(
            apply_attribute(&mut store, &req),
            Err(EditError::UnknownEnumValue { .. })
        ));
    }

    #[test]
    fn test_coercion_failure() {
        let mut store = fixture_store();
        let req = AttributeEdit {
            subgraph_idx: 0,
            operator_idx: 0,
            op_name: "ADD".into(),
            custom_name: None,
            attributes: vec![attr_entry("pot_scale_int16", "maybe", "bool")],
        };
        assert!(matches!(
            apply_attribute(&mut store, &req),
            Err(EditError::Coercion { .. })
        ));
    }

    #[test]
    fn test_operator_index_out_of_range() {
        let mut store = fixture_store();
        let req = AttributeEdit {
            subgraph_idx: 0,
            operator_idx: 9,
            op_name: "ADD".into(),
            custom_name: None,
            attributes: vec![],
        };
        assert!(matches!(
            apply_attribute(&mut store, &req),
            Err(EditError::Model(model_store::ModelError::Index { .. }))
        ));
    }

    #[test]
    fn test_custom_attribute_edit() {
        let mut store = fixture_store();
        let req = AttributeEdit {
            subgraph_idx: 0,
            operator_idx: 1,
            op_name: "CUSTOM".into(),
            custom_name: Some("MyPostProcess".into()),
            attributes: vec![
                attr_entry("axis", "1", "int"),
                attr_entry("mode", "fast", "string"),
            ],
        };
        apply_attribute(&mut store, &req).unwrap();

        let op = store.operator(0, 1).unwrap();
        assert_eq!(op.options_tag, OptionsTag::None);
        assert!(op.builtin_options.is_none());
        assert_eq!(
            store.operator_code(1).unwrap().custom_code.as_deref(),
            Some("MyPostProcess")
        );

        let map = kv_codec::decode(&op.custom_options).unwrap();
        assert_eq!(map.get("axis"), Some(&kv_codec::KvValue::Int(1)));
        assert_eq!(
            map.get("mode"),
            Some(&kv_codec::KvValue::Str("fast".into()))
        );
    }

    #[test]
    fn test_custom_edit_requires_name() {
        let mut store = fixture_store();
        let req = AttributeEdit {
            subgraph_idx: 0,
            operator_idx: 1,
            op_name: "CUSTOM".into(),
            custom_name: None,
            attributes: vec![],
        };
        assert!(matches!(
            apply_attribute(&mut store, &req),
            Err(EditError::Request(_))
        ));
    }

    #[test]
    fn test_tensor_edit_direct_fields() {
        let mut store = fixture_store();
        let req = TensorEdit {
            subgraph_idx: 0,
            tensors: vec![TensorPatch {
                tensor_idx: 0,
                name: "renamed".into(),
                dtype: Some("int32".into()),
                shape: Some(vec![2, 2]),
                initializer: None,
            }],
        };
        apply_tensor(&mut store, &req).unwrap();
        let t = store.tensor(0, 0).unwrap();
        assert_eq!(t.name, "renamed");
        assert_eq!(t.dtype, TensorType::Int32);
        assert_eq!(t.shape, Shape::new(vec![2, 2]));
        // No initializer → the variable flag is left untouched.
        assert!(!t.is_variable);
    }

    #[test]
    fn test_tensor_edit_initializer_replaces_buffer() {
        let mut store = fixture_store();
        let new_bytes: Vec<u8> = (0..16).collect();
        let req = TensorEdit {
            subgraph_idx: 0,
            tensors: vec![TensorPatch {
                tensor_idx: 1,
                name: "w".into(),
                dtype: None,
                shape: None,
                initializer: Some(TensorInitializer {
                    dtype: "float32".into(),
                    shape: vec![4],
                    data: Some(new_bytes.clone()),
                    is_variable: true,
                }),
            }],
        };
        apply_tensor(&mut store, &req).unwrap();

        let t = store.tensor(0, 1).unwrap();
        assert!(t.is_variable);
        // Buffer identity unchanged; contents replaced.
        assert_eq!(t.buffer, 1);
        assert_eq!(store.buffer(1).unwrap().data, new_bytes);
    }

    #[test]
    fn test_tensor_edit_missing_fields_fails() {
        let mut store = fixture_store();
        let req = TensorEdit {
            subgraph_idx: 0,
            tensors: vec![TensorPatch {
                tensor_idx: 0,
                name: "x".into(),
                dtype: None,
                shape: None,
                initializer: None,
            }],
        };
        assert!(matches!(
            apply_tensor(&mut store, &req),
            Err(EditError::Request(_))
        ));
    }

    #[test]
    fn test_tensor_add_appends_buffer_and_tensor() {
        let mut store = fixture_store();
        let prev_buffers = store.model().buffers.len();
        let prev_tensors = store.subgraph(0).unwrap().tensors.len();
        let req = TensorAddEdit {
            subgraph_idx: 0,
            tensor: NewTensor {
                name: "bias".into(),
                dtype: "int32".into(),
                shape: vec![2, 3],
                shape_signature: None,
                data: vec![0; 24],
                quantization: None,
                sparsity: None,
                is_variable: false,
            },
        };
        apply_tensor_add(&mut store, &req).unwrap();

        assert_eq!(store.model().buffers.len(), prev_buffers + 1);
        let t = store.tensor(0, prev_tensors).unwrap();
        assert_eq!(t.name, "bias");
        assert_eq!(t.buffer as usize, prev_buffers);
        assert_eq!(store.buffer(prev_buffers).unwrap().data.len(), 24);
    }

    #[test]
    fn test_tensor_add_bad_subgraph_leaves_buffers_alone() {
        let mut store = fixture_store();
        let prev_buffers = store.model().buffers.len();
        let req = TensorAddEdit {
            subgraph_idx: 7,
            tensor: NewTensor {
                name: "x".into(),
                dtype: "int32".into(),
                shape: vec![1],
                shape_signature: None,
                data: vec![0; 4],
                quantization: None,
                sparsity: None,
                is_variable: false,
            },
        };
        assert!(apply_tensor_add(&mut store, &req).is_err());
        assert_eq!(store.model().buffers.len(), prev_buffers);
    }

    #[test]
    fn test_parse_int_list() {
        assert_eq!(parse_int_list("1,2,3"), Some(vec![1, 2, 3]));
        assert_eq!(parse_int_list("[1, -1, 8]"), Some(vec![1, -1, 8]));
        assert_eq!(parse_int_list("[]"), Some(vec![]));
        assert_eq!(parse_int_list("1,x"), None);
    }
}
