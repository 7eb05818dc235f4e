// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shape descriptors.
//!
//! Dimensions are signed because the format's shape *signatures* use `-1`
//! as the "dynamic" marker. Plain shapes normally carry only non-negative
//! dims, but the descriptor does not enforce that — the editor must be able
//! to hold whatever a decoded model contains.

use crate::TensorType;
use std::fmt;

/// Sentinel dimension value marking a dynamic axis in a shape signature.
pub const DYNAMIC_DIM: i32 = -1;

/// Describes the dimensionality of a tensor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    dims: Vec<i32>,
}

impl Shape {
    /// Creates a new shape from the given dimensions.
    ///
    /// # Examples
    /// ```
    /// use schema_core::Shape;
    /// let s = Shape::new(vec![2, 3, 4]);
    /// assert_eq!(s.rank(), 3);
    /// assert_eq!(s.num_elements(), Some(24));
    /// ```
    pub fn new(dims: Vec<i32>) -> Self {
        Self { dims }
    }

    /// Creates a scalar shape (rank 0).
    pub fn scalar() -> Self {
        Self { dims: vec![] }
    }

    /// Creates a 1-D shape.
    pub fn vector(len: i32) -> Self {
        Self { dims: vec![len] }
    }

    /// Returns the number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[i32] {
        &self.dims
    }

    /// Returns the size of a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<i32> {
        self.dims.get(index).copied()
    }

    /// Returns `true` if any dimension carries the dynamic marker.
    pub fn has_dynamic_dim(&self) -> bool {
        self.dims.iter().any(|&d| d < 0)
    }

    /// Returns the total number of elements, or `None` when the shape has
    /// a dynamic dimension. A scalar shape (rank 0) has 1 element.
    pub fn num_elements(&self) -> Option<usize> {
        if self.has_dynamic_dim() {
            return None;
        }
        Some(self.dims.iter().map(|&d| d as usize).product())
    }

    /// Computes the memory footprint in bytes for a given element type.
    ///
    /// `None` for dynamic shapes and for `String` tensors (no fixed
    /// element width).
    pub fn size_bytes(&self, dtype: TensorType) -> Option<usize> {
        match dtype.byte_width() {
            0 => None,
            w => self.num_elements().map(|n| n * w),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if *d == DYNAMIC_DIM {
                write!(f, "?")?;
            } else {
                write!(f, "{d}")?;
            }
        }
        write!(f, "]")
    }
}

/// Convenience: `Shape::from(vec![2, 3])`.
impl From<Vec<i32>> for Shape {
    fn from(dims: Vec<i32>) -> Self {
        Self::new(dims)
    }
}

/// Convenience: `Shape::from(&[2, 3][..])`.
impl From<&[i32]> for Shape {
    fn from(dims: &[i32]) -> Self {
        Self::new(dims.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_shape() {
        let s = Shape::scalar();
        assert_eq!(s.rank(), 0);
        assert_eq!(s.num_elements(), Some(1));
    }

    #[test]
    fn test_vector_shape() {
        let s = Shape::vector(5);
        assert_eq!(s.rank(), 1);
        assert_eq!(s.num_elements(), Some(5));
    }

    #[test]
    fn test_num_elements() {
        let s = Shape::new(vec![2, 3, 4]);
        assert_eq!(s.num_elements(), Some(24));
    }

    #[test]
    fn test_dynamic_shape() {
        let s = Shape::new(vec![DYNAMIC_DIM, 3]);
        assert!(s.has_dynamic_dim());
        assert_eq!(s.num_elements(), None);
        assert_eq!(s.size_bytes(TensorType::Float32), None);
    }

    #[test]
    fn test_size_bytes() {
        let s = Shape::new(vec![10, 20]);
        assert_eq!(s.size_bytes(TensorType::Float32), Some(800));
        assert_eq!(s.size_bytes(TensorType::Float16), Some(400));
        assert_eq!(s.size_bytes(TensorType::Int8), Some(200));
        // Strings have no fixed element width.
        assert_eq!(s.size_bytes(TensorType::String), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Shape::new(vec![2, 3, 4])), "[2, 3, 4]");
        assert_eq!(format!("{}", Shape::new(vec![-1, 128])), "[?, 128]");
    }

    #[test]
    fn test_from_conversions() {
        let s1: Shape = vec![2, 3].into();
        let s2: Shape = (&[2, 3][..]).into();
        assert_eq!(s1, s2);
    }
}
