// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-store
//!
//! The in-memory tensor-graph model, its binary codec, and the
//! [`GraphStore`] that owns the live graph between edits.
//!
//! # Key Components
//!
//! - [`Model`] and friends — the decoded object tree: subgraphs, tensors,
//!   buffers, operator codes.
//! - [`codec`] — deterministic, lossless encode/decode of a [`Model`].
//!   `decode(encode(m)) == m` for every model; that round-trip law is what
//!   makes byte snapshots a sound undo mechanism.
//! - [`GraphStore`] — the single owner of the live graph, with
//!   index-bounded accessors ([`ModelError::Index`] on a bad index) and
//!   the whole-graph `to_bytes`/`replace` pair used for snapshots.
//!
//! # Ownership Model
//!
//! ```text
//! bytes ──codec::decode──► Model ──GraphStore::new──► GraphStore
//!                                                        │
//!                edit engine mutates via &mut accessors  │
//!                                                        ▼
//! bytes ◄──codec::encode─────────────── GraphStore::to_bytes
//! ```
//!
//! The store never hands out a mutable reference that outlives a call;
//! undo/redo replaces the whole model value.

pub mod codec;
mod error;
mod model;
mod store;

pub use error::ModelError;
pub use model::{
    Buffer, Model, Operator, OperatorCode, QuantizationParameters, SparsityParameters, Subgraph,
    Tensor,
};
pub use store::GraphStore;
