// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for model decoding and graph access.

/// Errors that can occur when decoding model bytes or locating graph
/// elements by index.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The model bytes are malformed or truncated.
    #[error("malformed model data: {0}")]
    Format(String),

    /// An index referenced a subgraph/tensor/operator/buffer that does
    /// not exist.
    #[error("{kind} index {index} out of range (have {len})")]
    Index {
        kind: &'static str,
        index: usize,
        len: usize,
    },
}

impl ModelError {
    /// Shorthand for a [`ModelError::Format`] at a byte offset.
    pub(crate) fn format_at(offset: usize, what: impl std::fmt::Display) -> Self {
        ModelError::Format(format!("{what} at offset {offset}"))
    }
}
