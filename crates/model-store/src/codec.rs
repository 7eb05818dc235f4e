// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Binary codec for the tensor-graph model format.
//!
//! Encoding is total and deterministic: the same [`Model`] always yields
//! the same bytes, and `decode(encode(m)) == m` for every model — the
//! round-trip law the undo/redo machinery depends on. Everything is
//! little-endian; every sequence is length-prefixed; optional records are
//! gated by a one-byte presence flag.
//!
//! Builtin-options records are written tag-first, then field-by-field in
//! the declaration order fixed by the schema-core descriptor tables. The
//! codec never interprets field values — it moves them.

use crate::error::ModelError;
use crate::model::{
    Buffer, Model, Operator, OperatorCode, QuantizationParameters, SparsityParameters, Subgraph,
    Tensor,
};
use schema_core::{normalize_name, BuiltinOptions, FieldKind, FieldValue, OptionsTag, Shape, TensorType};

/// File magic, first four bytes of every encoded model.
pub const MAGIC: [u8; 4] = *b"TGPH";

/// Version of the container layout itself (not the model's own version).
pub const FORMAT_VERSION: u32 = 1;

// ── Writer helpers ─────────────────────────────────────────────────

fn put_u8(buf: &mut Vec<u8>, v: u8) {
    buf.push(v);
}

fn put_bool(buf: &mut Vec<u8>, v: bool) {
    buf.push(u8::from(v));
}

fn put_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_i64(buf: &mut Vec<u8>, v: i64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_f32(buf: &mut Vec<u8>, v: f32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    put_u32(buf, s.len() as u32);
    buf.extend_from_slice(s.as_bytes());
}

fn put_i32_list(buf: &mut Vec<u8>, vs: &[i32]) {
    put_u32(buf, vs.len() as u32);
    for &v in vs {
        put_i32(buf, v);
    }
}

fn put_f32_list(buf: &mut Vec<u8>, vs: &[f32]) {
    put_u32(buf, vs.len() as u32);
    for &v in vs {
        put_f32(buf, v);
    }
}

fn put_i64_list(buf: &mut Vec<u8>, vs: &[i64]) {
    put_u32(buf, vs.len() as u32);
    for &v in vs {
        put_i64(buf, v);
    }
}

// ── Encode ─────────────────────────────────────────────────────────

/// Encodes a model into its binary form. Never fails.
pub fn encode(model: &Model) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256 + model.total_buffer_bytes());

    buf.extend_from_slice(&MAGIC);
    put_u32(&mut buf, FORMAT_VERSION);
    put_u32(&mut buf, model.version);
    put_str(&mut buf, &model.description);

    put_u32(&mut buf, model.operator_codes.len() as u32);
    for oc in &model.operator_codes {
        put_i32(&mut buf, oc.builtin_code);
        put_bool(&mut buf, oc.custom_code.is_some());
        if let Some(cc) = &oc.custom_code {
            put_str(&mut buf, cc);
        }
    }

    put_u32(&mut buf, model.buffers.len() as u32);
    for b in &model.buffers {
        put_u64(&mut buf, b.data.len() as u64);
        buf.extend_from_slice(&b.data);
    }

    put_u32(&mut buf, model.subgraphs.len() as u32);
    for sg in &model.subgraphs {
        encode_subgraph(&mut buf, sg);
    }

    buf
}

fn encode_subgraph(buf: &mut Vec<u8>, sg: &Subgraph) {
    put_bool(buf, sg.name.is_some());
    if let Some(name) = &sg.name {
        put_str(buf, name);
    }
    put_i32_list(buf, &sg.inputs);
    put_i32_list(buf, &sg.outputs);

    put_u32(buf, sg.tensors.len() as u32);
    for t in &sg.tensors {
        encode_tensor(buf, t);
    }

    put_u32(buf, sg.operators.len() as u32);
    for op in &sg.operators {
        encode_operator(buf, op);
    }
}

fn encode_tensor(buf: &mut Vec<u8>, t: &Tensor) {
    put_str(buf, &t.name);
    put_u8(buf, t.dtype.code());
    put_i32_list(buf, t.shape.dims());
    put_bool(buf, t.shape_signature.is_some());
    if let Some(sig) = &t.shape_signature {
        put_i32_list(buf, sig.dims());
    }
    put_u32(buf, t.buffer);
    put_bool(buf, t.is_variable);
    put_bool(buf, t.quantization.is_some());
    if let Some(q) = &t.quantization {
        put_f32_list(buf, &q.scale);
        put_i64_list(buf, &q.zero_point);
        put_f32_list(buf, &q.min);
        put_f32_list(buf, &q.max);
        put_i32(buf, q.quantized_dimension);
    }
    put_bool(buf, t.sparsity.is_some());
    if let Some(s) = &t.sparsity {
        put_i32_list(buf, &s.traversal_order);
        put_i32_list(buf, &s.block_map);
    }
}

fn encode_operator(buf: &mut Vec<u8>, op: &Operator) {
    put_u32(buf, op.opcode_index);
    put_i32_list(buf, &op.inputs);
    put_i32_list(buf, &op.outputs);
    put_u16(buf, op.options_tag.code());
    put_bool(buf, op.builtin_options.is_some());
    if let Some(opts) = &op.builtin_options {
        encode_options(buf, opts);
    }
    put_u64(buf, op.custom_options.len() as u64);
    buf.extend_from_slice(&op.custom_options);
}

fn encode_options(buf: &mut Vec<u8>, opts: &BuiltinOptions) {
    put_u16(buf, opts.tag().code());
    for def in opts.field_defs() {
        // The descriptor table and the record always agree on the field
        // set, so the lookup cannot miss.
        let value = opts
            .get(&normalize_name(def.name))
            .unwrap_or_else(|| unreachable!("descriptor field '{}' missing", def.name));
        match value {
            FieldValue::Int(v) => put_i64(buf, v),
            FieldValue::Float(v) => put_f32(buf, v),
            FieldValue::Bool(v) => put_bool(buf, v),
            FieldValue::Str(v) => put_str(buf, &v),
            FieldValue::IntList(v) => put_i32_list(buf, &v),
        }
    }
}

// ── Decode ─────────────────────────────────────────────────────────

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], ModelError> {
        if self.buf.len() - self.pos < n {
            return Err(ModelError::format_at(self.pos, "unexpected end of input"));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, ModelError> {
        Ok(self.take(1)?[0])
    }

    fn bool(&mut self) -> Result<bool, ModelError> {
        Ok(self.u8()? != 0)
    }

    fn u16(&mut self) -> Result<u16, ModelError> {
        Ok(u16::from_le_bytes(self.take(2)?.try_into().unwrap()))
    }

    fn u32(&mut self) -> Result<u32, ModelError> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn i32(&mut self) -> Result<i32, ModelError> {
        Ok(i32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn u64(&mut self) -> Result<u64, ModelError> {
        Ok(u64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn i64(&mut self) -> Result<i64, ModelError> {
        Ok(i64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn f32(&mut self) -> Result<f32, ModelError> {
        Ok(f32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn str(&mut self) -> Result<String, ModelError> {
        let len = self.u32()? as usize;
        let at = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| ModelError::format_at(at, "invalid UTF-8 string"))
    }

    fn i32_list(&mut self) -> Result<Vec<i32>, ModelError> {
        let n = self.u32()? as usize;
        let mut out = Vec::with_capacity(n.min(4096));
        for _ in 0..n {
            out.push(self.i32()?);
        }
        Ok(out)
    }

    fn f32_list(&mut self) -> Result<Vec<f32>, ModelError> {
        let n = self.u32()? as usize;
        let mut out = Vec::with_capacity(n.min(4096));
        for _ in 0..n {
            out.push(self.f32()?);
        }
        Ok(out)
    }

    fn i64_list(&mut self) -> Result<Vec<i64>, ModelError> {
        let n = self.u32()? as usize;
        let mut out = Vec::with_capacity(n.min(4096));
        for _ in 0..n {
            out.push(self.i64()?);
        }
        Ok(out)
    }
}

/// Decodes model bytes.
///
/// Fails with [`ModelError::Format`] on malformed or truncated input;
/// never panics on hostile bytes.
pub fn decode(bytes: &[u8]) -> Result<Model, ModelError> {
    let mut r = Reader { buf: bytes, pos: 0 };

    let magic = r.take(4)?;
    if magic != MAGIC {
        return Err(ModelError::Format(format!("bad magic {magic:02x?}")));
    }
    let format_version = r.u32()?;
    if format_version != FORMAT_VERSION {
        return Err(ModelError::Format(format!(
            "unsupported container version {format_version}"
        )));
    }

    let version = r.u32()?;
    let description = r.str()?;

    let n_opcodes = r.u32()? as usize;
    let mut operator_codes = Vec::with_capacity(n_opcodes.min(4096));
    for _ in 0..n_opcodes {
        let builtin_code = r.i32()?;
        let custom_code = if r.bool()? { Some(r.str()?) } else { None };
        operator_codes.push(OperatorCode {
            builtin_code,
            custom_code,
        });
    }

    let n_buffers = r.u32()? as usize;
    let mut buffers = Vec::with_capacity(n_buffers.min(4096));
    for _ in 0..n_buffers {
        let len = r.u64()? as usize;
        let data = r.take(len)?.to_vec();
        buffers.push(Buffer { data });
    }

    let n_subgraphs = r.u32()? as usize;
    let mut subgraphs = Vec::with_capacity(n_subgraphs.min(256));
    for _ in 0..n_subgraphs {
        subgraphs.push(decode_subgraph(&mut r)?);
    }

    if r.pos != bytes.len() {
        return Err(ModelError::Format(format!(
            "{} trailing bytes after model",
            bytes.len() - r.pos
        )));
    }

    let model = Model {
        version,
        description,
        operator_codes,
        subgraphs,
        buffers,
    };
    tracing::debug!("decoded {}", model.summary());
    Ok(model)
}

fn decode_subgraph(r: &mut Reader<'_>) -> Result<Subgraph, ModelError> {
    let name = if r.bool()? { Some(r.str()?) } else { None };
    let inputs = r.i32_list()?;
    let outputs = r.i32_list()?;

    let n_tensors = r.u32()? as usize;
    let mut tensors = Vec::with_capacity(n_tensors.min(4096));
    for _ in 0..n_tensors {
        tensors.push(decode_tensor(r)?);
    }

    let n_operators = r.u32()? as usize;
    let mut operators = Vec::with_capacity(n_operators.min(4096));
    for _ in 0..n_operators {
        operators.push(decode_operator(r)?);
    }

    Ok(Subgraph {
        name,
        tensors,
        operators,
        inputs,
        outputs,
    })
}

fn decode_tensor(r: &mut Reader<'_>) -> Result<Tensor, ModelError> {
    let name = r.str()?;
    let code_at = r.pos;
    let code = r.u8()?;
    let dtype = TensorType::from_code(code)
        .ok_or_else(|| ModelError::format_at(code_at, format!("unknown tensor type {code}")))?;
    let shape = Shape::new(r.i32_list()?);
    let shape_signature = if r.bool()? {
        Some(Shape::new(r.i32_list()?))
    } else {
        None
    };
    let buffer = r.u32()?;
    let is_variable = r.bool()?;
    let quantization = if r.bool()? {
        Some(QuantizationParameters {
            scale: r.f32_list()?,
            zero_point: r.i64_list()?,
            min: r.f32_list()?,
            max: r.f32_list()?,
            quantized_dimension: r.i32()?,
        })
    } else {
        None
    };
    let sparsity = if r.bool()? {
        Some(SparsityParameters {
            traversal_order: r.i32_list()?,
            block_map: r.i32_list()?,
        })
    } else {
        None
    };

    Ok(Tensor {
        name,
        dtype,
        shape,
        shape_signature,
        buffer,
        quantization,
        sparsity,
        is_variable,
    })
}

fn decode_operator(r: &mut Reader<'_>) -> Result<Operator, ModelError> {
    let opcode_index = r.u32()?;
    let inputs = r.i32_list()?;
    let outputs = r.i32_list()?;

    let tag_at = r.pos;
    let tag_code = r.u16()?;
    let options_tag = OptionsTag::from_code(tag_code)
        .ok_or_else(|| ModelError::format_at(tag_at, format!("unknown options tag {tag_code}")))?;

    let builtin_options = if r.bool()? {
        Some(decode_options(r)?)
    } else {
        None
    };

    let len = r.u64()? as usize;
    let custom_options = r.take(len)?.to_vec();

    Ok(Operator {
        opcode_index,
        inputs,
        outputs,
        options_tag,
        builtin_options,
        custom_options,
    })
}

fn decode_options(r: &mut Reader<'_>) -> Result<BuiltinOptions, ModelError> {
    let tag_at = r.pos;
    let tag_code = r.u16()?;
    let tag = OptionsTag::from_code(tag_code)
        .ok_or_else(|| ModelError::format_at(tag_at, format!("unknown options tag {tag_code}")))?;
    let mut opts = BuiltinOptions::new(tag)
        .ok_or_else(|| ModelError::format_at(tag_at, "options record with tag None"))?;

    for def in BuiltinOptions::fields_of(tag) {
        let value = match def.kind {
            FieldKind::Int | FieldKind::Enum(_) => FieldValue::Int(r.i64()?),
            FieldKind::Float => FieldValue::Float(r.f32()?),
            FieldKind::Bool => FieldValue::Bool(r.bool()?),
            FieldKind::Str => FieldValue::Str(r.str()?),
            FieldKind::IntList => FieldValue::IntList(r.i32_list()?),
        };
        let at = r.pos;
        opts.set(&normalize_name(def.name), &value)
            .map_err(|e| ModelError::format_at(at, format!("field '{}': {e}", def.name)))?;
    }
    Ok(opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema_core::options::{AddOptions, Conv2DOptions, ReshapeOptions};
    use schema_core::enums::{ActivationFunctionType, Padding};

    /// A model exercising every optional branch of the encoding.
    fn rich_model() -> Model {
        Model {
            version: 3,
            description: "unit fixture".into(),
            operator_codes: vec![
                OperatorCode { builtin_code: 0, custom_code: None },
                OperatorCode { builtin_code: 3, custom_code: None },
                OperatorCode {
                    builtin_code: schema_core::CUSTOM_CODE,
                    custom_code: Some("MyPostProcess".into()),
                },
            ],
            subgraphs: vec![Subgraph {
                name: Some("main".into()),
                inputs: vec![0],
                outputs: vec![2],
                tensors: vec![
                    Tensor {
                        name: "input".into(),
                        dtype: TensorType::Float32,
                        shape: Shape::new(vec![1, 4]),
                        shape_signature: Some(Shape::new(vec![-1, 4])),
                        buffer: 0,
                        ..Tensor::default()
                    },
                    Tensor {
                        name: "weights".into(),
                        dtype: TensorType::Int8,
                        shape: Shape::new(vec![4, 4]),
                        buffer: 1,
                        quantization: Some(QuantizationParameters {
                            scale: vec![0.5],
                            zero_point: vec![0],
                            min: vec![-1.0],
                            max: vec![1.0],
                            quantized_dimension: 0,
                        }),
                        sparsity: Some(SparsityParameters {
                            traversal_order: vec![0, 1],
                            block_map: vec![],
                        }),
                        is_variable: true,
                        ..Tensor::default()
                    },
                    Tensor {
                        name: "output".into(),
                        dtype: TensorType::Float32,
                        shape: Shape::new(vec![1, 4]),
                        buffer: 0,
                        ..Tensor::default()
                    },
                ],
                operators: vec![
                    Operator {
                        opcode_index: 0,
                        inputs: vec![0, 1],
                        outputs: vec![2],
                        options_tag: OptionsTag::Add,
                        builtin_options: Some(BuiltinOptions::Add(AddOptions {
                            fused_activation_function: ActivationFunctionType::Relu,
                            pot_scale_int16: false,
                        })),
                        custom_options: vec![],
                    },
                    Operator {
                        opcode_index: 1,
                        inputs: vec![2, 1, -1],
                        outputs: vec![0],
                        options_tag: OptionsTag::Conv2D,
                        builtin_options: Some(BuiltinOptions::Conv2D(Conv2DOptions {
                            padding: Padding::Valid,
                            stride_w: 2,
                            stride_h: 2,
                            fused_activation_function: ActivationFunctionType::None,
                            dilation_w_factor: 1,
                            dilation_h_factor: 1,
                        })),
                        custom_options: vec![],
                    },
                    Operator {
                        opcode_index: 2,
                        inputs: vec![2],
                        outputs: vec![0],
                        options_tag: OptionsTag::None,
                        builtin_options: None,
                        custom_options: vec![1, 2, 3, 4],
                    },
                ],
            }],
            buffers: vec![
                Buffer { data: vec![] },
                Buffer { data: vec![7; 16] },
            ],
        }
    }

    #[test]
    fn test_roundtrip_identity() {
        let model = rich_model();
        let bytes = encode(&model);
        let back = decode(&bytes).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn test_encode_deterministic() {
        let model = rich_model();
        assert_eq!(encode(&model), encode(&model));
    }

    #[test]
    fn test_roundtrip_int_list_field() {
        let mut model = rich_model();
        model.subgraphs[0].operators[0].options_tag = OptionsTag::Reshape;
        model.subgraphs[0].operators[0].builtin_options =
            Some(BuiltinOptions::Reshape(ReshapeOptions {
                new_shape: vec![1, -1, 8],
            }));
        let back = decode(&encode(&model)).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn test_roundtrip_empty_model() {
        let model = Model::default();
        let back = decode(&encode(&model)).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = encode(&Model::default());
        bytes[0] = b'X';
        assert!(matches!(decode(&bytes), Err(ModelError::Format(_))));
    }

    #[test]
    fn test_unsupported_container_version() {
        let mut bytes = encode(&Model::default());
        bytes[4] = 0xff;
        assert!(matches!(decode(&bytes), Err(ModelError::Format(_))));
    }

    #[test]
    fn test_truncated_input() {
        let bytes = encode(&rich_model());
        // Any prefix must fail cleanly, never panic.
        for cut in 0..bytes.len() {
            assert!(decode(&bytes[..cut]).is_err(), "prefix {cut} decoded");
        }
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = encode(&Model::default());
        bytes.push(0);
        assert!(matches!(decode(&bytes), Err(ModelError::Format(_))));
    }

    #[test]
    fn test_unknown_tensor_type() {
        let mut model = Model::default();
        model.subgraphs.push(Subgraph {
            tensors: vec![Tensor::default()],
            ..Subgraph::default()
        });
        let bytes = encode(&model);
        // The dtype code byte follows the tensor's name; find it by
        // re-encoding with a poisoned code.
        let name_at = bytes.len() - {
            // tensor encoding tail: name(4+0) dtype(1) shape(4) sig flag(1)
            // buffer(4) is_variable(1) quant flag(1) sparsity flag(1)
            // then the trailing operator count u32.
            4 + 1 + 4 + 1 + 4 + 1 + 1 + 1 + 4
        };
        let mut poisoned = bytes.clone();
        poisoned[name_at + 4] = 0xee;
        assert!(matches!(decode(&poisoned), Err(ModelError::Format(_))));
    }
}
