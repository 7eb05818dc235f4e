// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for edit application.

use kv_codec::KvError;
use model_store::ModelError;

/// Errors that can occur while applying an edit request.
///
/// All are reported synchronously to the caller and none is fatal:
/// edits are user-initiated and safe to retry after correction.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// The operator type name matched no registry entry.
    #[error("unknown operator type '{name}'")]
    UnknownOperator { name: String },

    /// A builtin attribute edit targeted an operator with no typed
    /// options record.
    #[error("operator '{op}' carries no builtin options record")]
    MissingOptions { op: String },

    /// No field of the resolved options record matched the requested key.
    #[error("options record {record} has no attribute matching '{key}'")]
    UnknownAttribute { key: String, record: &'static str },

    /// The value is not a member of the target enumeration.
    #[error("'{value}' is not a member of {enum_name}")]
    UnknownEnumValue { value: String, enum_name: String },

    /// The value text cannot be parsed as the declared primitive type.
    #[error("cannot coerce '{value}' as {ty}")]
    Coercion { value: String, ty: String },

    /// The request payload itself is malformed.
    #[error("malformed edit request: {0}")]
    Request(String),

    /// Model decode failure or out-of-range index.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Custom-attribute payload encode/decode failure.
    #[error("custom options error: {0}")]
    Kv(#[from] KvError),
}
