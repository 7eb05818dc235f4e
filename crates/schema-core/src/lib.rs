// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # schema-core
//!
//! Static schema tables for the tensor-graph model format.
//!
//! The format is schema-defined: every operator kind has a fixed numeric
//! code, and every non-custom operator carries a strongly-typed options
//! record. Rather than reflecting over generated code at runtime, this
//! crate authors those tables once, explicitly:
//!
//! - [`TensorType`] — the scalar element kinds with their wire codes.
//! - [`Shape`] — dimension descriptors (with the `-1` dynamic marker used
//!   by shape signatures).
//! - [`opcode`] — the operator registry: name ↔ numeric code ↔ options
//!   tag, with the underscore/case-insensitive resolution the editor's
//!   loosely-typed requests rely on.
//! - [`options`] — [`options::BuiltinOptions`], the tagged union of typed
//!   options records, with declaration-ordered field descriptors and
//!   name-addressed `get`/`set`.
//! - [`enums`] — the auxiliary enumerations option fields draw from
//!   (activation kinds, padding policies, ...), resolvable from text.
//!
//! Everything here is read-only at runtime and free of I/O; the graph
//! codec and the edit engine are the only consumers.

mod dtype;
mod shape;

pub mod enums;
pub mod opcode;
pub mod options;

pub use dtype::TensorType;
pub use opcode::{normalize_name, resolve, OpSchema, CUSTOM_CODE, OP_SCHEMAS};
pub use options::{BuiltinOptions, FieldDef, FieldKind, FieldValue, OptionsError, OptionsTag};
pub use shape::{Shape, DYNAMIC_DIM};
