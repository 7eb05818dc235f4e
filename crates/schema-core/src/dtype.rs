// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor element types of the tensor-graph format.

/// Enumerates the scalar kinds a tensor can hold.
///
/// The numeric codes are the format's wire values and must not change:
/// the graph codec writes them verbatim, and decoded models from older
/// files must keep meaning the same thing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TensorType {
    /// 32-bit IEEE 754 floating point.
    #[default]
    Float32,
    /// 16-bit IEEE 754 floating point.
    Float16,
    /// 32-bit signed integer.
    Int32,
    /// 8-bit unsigned integer.
    Uint8,
    /// 64-bit signed integer.
    Int64,
    /// Variable-length string payload.
    String,
    /// Boolean, one byte per element.
    Bool,
    /// 16-bit signed integer.
    Int16,
    /// Two packed 32-bit floats (real, imaginary).
    Complex64,
    /// 8-bit signed integer (quantised weights).
    Int8,
    /// 64-bit IEEE 754 floating point.
    Float64,
}

impl TensorType {
    /// Returns the wire code for this type.
    pub fn code(self) -> u8 {
        match self {
            TensorType::Float32 => 0,
            TensorType::Float16 => 1,
            TensorType::Int32 => 2,
            TensorType::Uint8 => 3,
            TensorType::Int64 => 4,
            TensorType::String => 5,
            TensorType::Bool => 6,
            TensorType::Int16 => 7,
            TensorType::Complex64 => 8,
            TensorType::Int8 => 9,
            TensorType::Float64 => 10,
        }
    }

    /// Parses a wire code back into a type.
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => TensorType::Float32,
            1 => TensorType::Float16,
            2 => TensorType::Int32,
            3 => TensorType::Uint8,
            4 => TensorType::Int64,
            5 => TensorType::String,
            6 => TensorType::Bool,
            7 => TensorType::Int16,
            8 => TensorType::Complex64,
            9 => TensorType::Int8,
            10 => TensorType::Float64,
            _ => return None,
        })
    }

    /// Parses a type from a display name, case-insensitively.
    ///
    /// Accepts the canonical upper-case form used in edit requests
    /// (`"FLOAT32"`) as well as lower-case (`"float32"`).
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FLOAT32" => Some(TensorType::Float32),
            "FLOAT16" => Some(TensorType::Float16),
            "INT32" => Some(TensorType::Int32),
            "UINT8" => Some(TensorType::Uint8),
            "INT64" => Some(TensorType::Int64),
            "STRING" => Some(TensorType::String),
            "BOOL" => Some(TensorType::Bool),
            "INT16" => Some(TensorType::Int16),
            "COMPLEX64" => Some(TensorType::Complex64),
            "INT8" => Some(TensorType::Int8),
            "FLOAT64" => Some(TensorType::Float64),
            _ => None,
        }
    }

    /// Returns the size of a single element in bytes.
    ///
    /// `String` elements have no fixed width; they report 0 here and any
    /// byte-budget arithmetic must treat them specially.
    pub fn byte_width(self) -> usize {
        match self {
            TensorType::Float32 => 4,
            TensorType::Float16 => 2,
            TensorType::Int32 => 4,
            TensorType::Uint8 => 1,
            TensorType::Int64 => 8,
            TensorType::String => 0,
            TensorType::Bool => 1,
            TensorType::Int16 => 2,
            TensorType::Complex64 => 8,
            TensorType::Int8 => 1,
            TensorType::Float64 => 8,
        }
    }

    /// Returns the canonical upper-case label for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            TensorType::Float32 => "FLOAT32",
            TensorType::Float16 => "FLOAT16",
            TensorType::Int32 => "INT32",
            TensorType::Uint8 => "UINT8",
            TensorType::Int64 => "INT64",
            TensorType::String => "STRING",
            TensorType::Bool => "BOOL",
            TensorType::Int16 => "INT16",
            TensorType::Complex64 => "COMPLEX64",
            TensorType::Int8 => "INT8",
            TensorType::Float64 => "FLOAT64",
        }
    }
}

impl std::fmt::Display for TensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
