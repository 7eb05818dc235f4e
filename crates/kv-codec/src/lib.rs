// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # kv-codec
//!
//! A minimal self-describing binary encoding for an *ordered* mapping of
//! string keys to typed scalar/string values. The tensor-graph format uses
//! it for exactly one thing: the opaque attribute payload of custom
//! operators, nested inside the outer graph encoding.
//!
//! # Wire Format
//!
//! Little-endian throughout:
//!
//! ```text
//! u32            entry count
//! per entry:
//!   u16 + bytes  key (UTF-8, length-prefixed)
//!   u8           type tag (1 bool, 2 int, 3 float, 4 string)
//!   ...          value: bool → u8, int → i64, float → f64,
//!                string → u32 + UTF-8 bytes
//! ```
//!
//! Key order in the output equals insertion order — the format never
//! sorts. Decoding preserves that order and additionally allows lookup
//! by name for display purposes.
//!
//! # Example
//! ```
//! use kv_codec::{decode, KvValue, KvWriter};
//!
//! let mut w = KvWriter::new();
//! w.begin_map();
//! w.key("axis");
//! w.add_int(1);
//! w.key("keep_dims");
//! w.add_bool(false);
//! w.end_map();
//! let bytes = w.finish().unwrap();
//!
//! let map = decode(&bytes).unwrap();
//! assert_eq!(map.get("axis"), Some(&KvValue::Int(1)));
//! ```

use std::fmt;

/// Errors from decoding a key-value payload or misusing the writer.
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    /// The input ended before the announced content did.
    #[error("truncated input: needed {needed} more bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    /// An entry carried a type tag outside the known set.
    #[error("invalid value type tag {0:#04x} at offset {1}")]
    InvalidTag(u8, usize),

    /// A key or string value was not valid UTF-8.
    #[error("invalid UTF-8 in key or string value at offset {0}")]
    InvalidUtf8(usize),

    /// Bytes remained after the announced entries were read.
    #[error("{0} trailing bytes after final entry")]
    TrailingBytes(usize),

    /// The writer's begin/key/value/end call sequence was violated.
    #[error("writer misuse: {0}")]
    WriterMisuse(&'static str),
}

/// A decoded value: the codec's four self-described kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum KvValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for KvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KvValue::Bool(v) => write!(f, "{v}"),
            KvValue::Int(v) => write!(f, "{v}"),
            KvValue::Float(v) => write!(f, "{v}"),
            KvValue::Str(v) => f.write_str(v),
        }
    }
}

const TAG_BOOL: u8 = 1;
const TAG_INT: u8 = 2;
const TAG_FLOAT: u8 = 3;
const TAG_STR: u8 = 4;

// ── Decoded map ────────────────────────────────────────────────────

/// An ordered, name-addressable mapping decoded from a payload.
///
/// Used read-only for display; edits never mutate a decoded map in
/// place — they re-encode the full attribute set from scratch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KvMap {
    entries: Vec<(String, KvValue)>,
}

impl KvMap {
    /// Returns the value for `key`, or `None`.
    pub fn get(&self, key: &str) -> Option<&KvValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Iterates entries in encoded order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &KvValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Writer ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    /// `begin_map` not yet called.
    Idle,
    /// Between entries: a key (or `end_map`) comes next.
    ExpectKey,
    /// A key was written: a value must come next.
    ExpectValue,
    /// `end_map` called; only `finish` is valid.
    Finished,
}

/// Builder accumulating ordered key/value pairs and emitting the final
/// byte payload.
///
/// Call sequence: [`begin_map`](Self::begin_map) → per entry
/// [`key`](Self::key) then one typed `add_*` → [`end_map`](Self::end_map)
/// → [`finish`](Self::finish). A violated sequence is remembered and
/// reported by `finish`; the intermediate calls themselves never fail,
/// so encode loops stay flat.
#[derive(Debug)]
pub struct KvWriter {
    buf: Vec<u8>,
    count: u32,
    state: WriterState,
    misuse: Option<&'static str>,
}

impl Default for KvWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl KvWriter {
    /// Creates an idle writer.
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            count: 0,
            state: WriterState::Idle,
            misuse: None,
        }
    }

    fn state(&self) -> WriterState {
        self.state
    }

    fn violate(&mut self, what: &'static str) {
        if self.misuse.is_none() {
            self.misuse = Some(what);
        }
    }

    /// Opens the map. Reserves the entry-count slot, patched by
    /// [`end_map`](Self::end_map).
    pub fn begin_map(&mut self) {
        if self.state() != WriterState::Idle {
            self.violate("begin_map called twice");
            return;
        }
        self.buf.extend_from_slice(&0u32.to_le_bytes());
        self.state = WriterState::ExpectKey;
    }

    /// Writes the next entry's key.
    pub fn key(&mut self, key: &str) {
        if self.state() != WriterState::ExpectKey {
            self.violate("key written out of sequence");
            return;
        }
        let bytes = key.as_bytes();
        if bytes.len() > u16::MAX as usize {
            self.violate("key longer than 65535 bytes");
            return;
        }
        self.buf.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
        self.buf.extend_from_slice(bytes);
        self.state = WriterState::ExpectValue;
    }

    /// Writes a boolean value for the pending key.
    pub fn add_bool(&mut self, v: bool) {
        self.add_value(|buf| {
            buf.push(TAG_BOOL);
            buf.push(u8::from(v));
        });
    }

    /// Writes an integer value for the pending key.
    pub fn add_int(&mut self, v: i64) {
        self.add_value(|buf| {
            buf.push(TAG_INT);
            buf.extend_from_slice(&v.to_le_bytes());
        });
    }

    /// Writes a floating-point value for the pending key.
    pub fn add_float(&mut self, v: f64) {
        self.add_value(|buf| {
            buf.push(TAG_FLOAT);
            buf.extend_from_slice(&v.to_le_bytes());
        });
    }

    /// Writes a string value for the pending key.
    pub fn add_str(&mut self, v: &str) {
        self.add_value(|buf| {
            buf.push(TAG_STR);
            buf.extend_from_slice(&(v.len() as u32).to_le_bytes());
            buf.extend_from_slice(v.as_bytes());
        });
    }

    fn add_value(&mut self, write: impl FnOnce(&mut Vec<u8>)) {
        if self.state() != WriterState::ExpectValue {
            self.violate("value written without a preceding key");
            return;
        }
        write(&mut self.buf);
        self.count += 1;
        self.state = WriterState::ExpectKey;
    }

    /// Closes the map, patching the entry count.
    pub fn end_map(&mut self) {
        if self.state() != WriterState::ExpectKey {
            self.violate("end_map with a dangling key or before begin_map");
            return;
        }
        self.buf[0..4].copy_from_slice(&self.count.to_le_bytes());
        self.state = WriterState::Finished;
    }

    /// Yields the final byte payload.
    ///
    /// Fails only when the call sequence was violated; a well-formed
    /// sequence always encodes.
    pub fn finish(self) -> Result<Vec<u8>, KvError> {
        if let Some(what) = self.misuse {
            return Err(KvError::WriterMisuse(what));
        }
        if self.state() != WriterState::Finished {
            return Err(KvError::WriterMisuse("finish before end_map"));
        }
        Ok(self.buf)
    }
}

// ── Decoder ────────────────────────────────────────────────────────

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], KvError> {
        let remaining = self.buf.len() - self.pos;
        if remaining < n {
            return Err(KvError::Truncated {
                offset: self.pos,
                needed: n - remaining,
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, KvError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, KvError> {
        Ok(u16::from_le_bytes(self.take(2)?.try_into().unwrap()))
    }

    fn u32(&mut self) -> Result<u32, KvError> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn i64(&mut self) -> Result<i64, KvError> {
        Ok(i64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn f64(&mut self) -> Result<f64, KvError> {
        Ok(f64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn str(&mut self, len: usize) -> Result<String, KvError> {
        let at = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| KvError::InvalidUtf8(at))
    }
}

/// Decodes a payload into an ordered [`KvMap`].
///
/// Malformed or truncated input fails; it never panics. Trailing bytes
/// after the announced entries are an error too — a payload is exactly
/// one map.
pub fn decode(bytes: &[u8]) -> Result<KvMap, KvError> {
    let mut r = Reader { buf: bytes, pos: 0 };
    let count = r.u32()?;
    let mut entries = Vec::with_capacity(count.min(1024) as usize);
    for _ in 0..count {
        let key_len = r.u16()? as usize;
        let key = r.str(key_len)?;
        let tag_at = r.pos;
        let tag = r.u8()?;
        let value = match tag {
            TAG_BOOL => KvValue::Bool(r.u8()? != 0),
            TAG_INT => KvValue::Int(r.i64()?),
            TAG_FLOAT => KvValue::Float(r.f64()?),
            TAG_STR => {
                let len = r.u32()? as usize;
                KvValue::Str(r.str(len)?)
            }
            other => return Err(KvError::InvalidTag(other, tag_at)),
        };
        entries.push((key, value));
    }
    if r.pos != bytes.len() {
        return Err(KvError::TrailingBytes(bytes.len() - r.pos));
    }
    Ok(KvMap { entries })
}
