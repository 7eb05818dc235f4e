// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The operator-code registry.
//!
//! Maps operator-type names to their numeric code and options-record tag.
//! The table is static, authored once from the format's operator
//! enumeration, and ordered by code: vendor extensions sit at negative
//! codes, the standard set starts at 0, and the numbering has gaps where
//! operators were retired. Lookup is by *normalized* name — upper-cased
//! with underscores stripped — so `"AVERAGE_POOL_2D"`, `"AveragePool2D"`
//! and `"averagepool2d"` all resolve to the same entry. When two names
//! would collide under normalization, the first entry in table order wins.

use crate::options::{BuiltinOptions, FieldDef, OptionsTag};

/// The numeric code reserved for custom (out-of-schema) operators.
///
/// The edit engine treats this code specially: custom operators carry an
/// opaque key-value payload instead of a typed options record.
pub const CUSTOM_CODE: i32 = 32;

/// One entry of the operator registry.
#[derive(Debug, Clone, Copy)]
pub struct OpSchema {
    /// Canonical operator name as declared in the schema.
    pub name: &'static str,
    /// Numeric operator code.
    pub code: i32,
    /// Tag of the options record this operator carries.
    pub options: OptionsTag,
}

impl OpSchema {
    /// Returns the declared fields of this operator's options record.
    pub fn option_fields(&self) -> &'static [FieldDef] {
        BuiltinOptions::fields_of(self.options)
    }
}

/// Normalizes an operator or attribute name for lookup: upper-case,
/// underscores stripped.
pub fn normalize_name(s: &str) -> String {
    s.chars()
        .filter(|&c| c != '_')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// The operator registry, ordered by code. Codes are part of the format
/// and never change; retired codes stay as gaps.
pub static OP_SCHEMAS: &[OpSchema] = &[
    OpSchema { name: "BCQ_GATHER", code: -4, options: OptionsTag::BcqGather },
    OpSchema { name: "BCQ_FULLY_CONNECTED", code: -3, options: OptionsTag::BcqFullyConnected },
    OpSchema { name: "INSTANCE_NORM", code: -2, options: OptionsTag::InstanceNorm },
    OpSchema { name: "ADD", code: 0, options: OptionsTag::Add },
    OpSchema { name: "AVERAGE_POOL_2D", code: 1, options: OptionsTag::Pool2D },
    OpSchema { name: "CONCATENATION", code: 2, options: OptionsTag::Concatenation },
    OpSchema { name: "CONV_2D", code: 3, options: OptionsTag::Conv2D },
    OpSchema { name: "DEPTHWISE_CONV_2D", code: 4, options: OptionsTag::DepthwiseConv2D },
    OpSchema { name: "DEPTH_TO_SPACE", code: 5, options: OptionsTag::DepthToSpace },
    OpSchema { name: "DEQUANTIZE", code: 6, options: OptionsTag::Dequantize },
    OpSchema { name: "FLOOR", code: 8, options: OptionsTag::None },
    OpSchema { name: "FULLY_CONNECTED", code: 9, options: OptionsTag::FullyConnected },
    OpSchema { name: "L2_NORMALIZATION", code: 11, options: OptionsTag::L2Norm },
    OpSchema { name: "L2_POOL_2D", code: 12, options: OptionsTag::Pool2D },
    OpSchema { name: "LOCAL_RESPONSE_NORMALIZATION", code: 13, options: OptionsTag::LocalResponseNormalization },
    OpSchema { name: "LOGISTIC", code: 14, options: OptionsTag::None },
    OpSchema { name: "LSTM", code: 16, options: OptionsTag::Lstm },
    OpSchema { name: "MAX_POOL_2D", code: 17, options: OptionsTag::Pool2D },
    OpSchema { name: "MUL", code: 18, options: OptionsTag::Mul },
    OpSchema { name: "RELU", code: 19, options: OptionsTag::None },
    OpSchema { name: "RELU_N1_TO_1", code: 20, options: OptionsTag::None },
    OpSchema { name: "RELU6", code: 21, options: OptionsTag::None },
    OpSchema { name: "RESHAPE", code: 22, options: OptionsTag::Reshape },
    OpSchema { name: "RESIZE_BILINEAR", code: 23, options: OptionsTag::ResizeBilinear },
    OpSchema { name: "RNN", code: 24, options: OptionsTag::Rnn },
    OpSchema { name: "SOFTMAX", code: 25, options: OptionsTag::Softmax },
    OpSchema { name: "SPACE_TO_DEPTH", code: 26, options: OptionsTag::SpaceToDepth },
    OpSchema { name: "SVDF", code: 27, options: OptionsTag::Svdf },
    OpSchema { name: "TANH", code: 28, options: OptionsTag::None },
    OpSchema { name: "CUSTOM", code: CUSTOM_CODE, options: OptionsTag::None },
    OpSchema { name: "PAD", code: 34, options: OptionsTag::Pad },
    OpSchema { name: "GATHER", code: 36, options: OptionsTag::Gather },
    OpSchema { name: "TRANSPOSE", code: 39, options: OptionsTag::Transpose },
    OpSchema { name: "MEAN", code: 40, options: OptionsTag::Reducer },
    OpSchema { name: "SUB", code: 41, options: OptionsTag::Sub },
    OpSchema { name: "DIV", code: 42, options: OptionsTag::Div },
    OpSchema { name: "SQUEEZE", code: 43, options: OptionsTag::Squeeze },
    OpSchema { name: "STRIDED_SLICE", code: 45, options: OptionsTag::StridedSlice },
    OpSchema { name: "EXP", code: 47, options: OptionsTag::None },
    OpSchema { name: "SPLIT", code: 49, options: OptionsTag::Split },
    OpSchema { name: "LOG_SOFTMAX", code: 50, options: OptionsTag::LogSoftmax },
    OpSchema { name: "CAST", code: 53, options: OptionsTag::Cast },
    OpSchema { name: "PRELU", code: 54, options: OptionsTag::None },
    OpSchema { name: "MAXIMUM", code: 55, options: OptionsTag::None },
    OpSchema { name: "ARG_MAX", code: 56, options: OptionsTag::ArgMax },
    OpSchema { name: "MINIMUM", code: 57, options: OptionsTag::None },
    OpSchema { name: "NEG", code: 59, options: OptionsTag::None },
    OpSchema { name: "PADV2", code: 60, options: OptionsTag::PadV2 },
    OpSchema { name: "SLICE", code: 65, options: OptionsTag::None },
    OpSchema { name: "SIN", code: 66, options: OptionsTag::None },
    OpSchema { name: "TRANSPOSE_CONV", code: 67, options: OptionsTag::TransposeConv },
    OpSchema { name: "EXPAND_DIMS", code: 70, options: OptionsTag::ExpandDims },
    OpSchema { name: "EQUAL", code: 71, options: OptionsTag::None },
    OpSchema { name: "NOT_EQUAL", code: 72, options: OptionsTag::None },
    OpSchema { name: "LOG", code: 73, options: OptionsTag::None },
    OpSchema { name: "SUM", code: 74, options: OptionsTag::Reducer },
    OpSchema { name: "SQRT", code: 75, options: OptionsTag::None },
    OpSchema { name: "RSQRT", code: 76, options: OptionsTag::None },
    OpSchema { name: "SHAPE", code: 77, options: OptionsTag::Shape },
    OpSchema { name: "POW", code: 78, options: OptionsTag::None },
    OpSchema { name: "ARG_MIN", code: 79, options: OptionsTag::ArgMin },
    OpSchema { name: "FAKE_QUANT", code: 80, options: OptionsTag::FakeQuant },
    OpSchema { name: "REDUCE_PROD", code: 81, options: OptionsTag::Reducer },
    OpSchema { name: "REDUCE_MAX", code: 82, options: OptionsTag::Reducer },
    OpSchema { name: "PACK", code: 83, options: OptionsTag::Pack },
    OpSchema { name: "ONE_HOT", code: 85, options: OptionsTag::OneHot },
    OpSchema { name: "UNPACK", code: 88, options: OptionsTag::Unpack },
    OpSchema { name: "REDUCE_MIN", code: 89, options: OptionsTag::Reducer },
    OpSchema { name: "SQUARE", code: 92, options: OptionsTag::None },
    OpSchema { name: "FILL", code: 94, options: OptionsTag::Fill },
    OpSchema { name: "RESIZE_NEAREST_NEIGHBOR", code: 97, options: OptionsTag::ResizeNearestNeighbor },
    OpSchema { name: "LEAKY_RELU", code: 98, options: OptionsTag::LeakyRelu },
    OpSchema { name: "SQUARED_DIFFERENCE", code: 99, options: OptionsTag::SquaredDifference },
    OpSchema { name: "MIRROR_PAD", code: 100, options: OptionsTag::MirrorPad },
    OpSchema { name: "ABS", code: 101, options: OptionsTag::None },
    OpSchema { name: "SPLIT_V", code: 102, options: OptionsTag::SplitV },
    OpSchema { name: "CEIL", code: 104, options: OptionsTag::None },
    OpSchema { name: "ADD_N", code: 106, options: OptionsTag::None },
    OpSchema { name: "COS", code: 108, options: OptionsTag::None },
    OpSchema { name: "RANK", code: 110, options: OptionsTag::None },
    OpSchema { name: "QUANTIZE", code: 114, options: OptionsTag::Quantize },
    OpSchema { name: "ROUND", code: 116, options: OptionsTag::None },
    OpSchema { name: "HARD_SWISH", code: 117, options: OptionsTag::HardSwish },
    OpSchema { name: "BATCH_MATMUL", code: 126, options: OptionsTag::BatchMatMul },
    OpSchema { name: "CUMSUM", code: 128, options: OptionsTag::Cumsum },
];

/// Resolves a free-form operator type name against the registry.
///
/// Scans the table in declaration (code) order comparing normalized
/// names; the first match wins. `None` is a resolution failure the
/// caller must report — never a silent no-op.
pub fn resolve(name: &str) -> Option<&'static OpSchema> {
    let target = normalize_name(name);
    OP_SCHEMAS.iter().find(|s| normalize_name(s.name) == target)
}

/// Looks an operator up by numeric code.
pub fn by_code(code: i32) -> Option<&'static OpSchema> {
    OP_SCHEMAS.iter().find(|s| s.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("stride_h"), "STRIDEH");
        assert_eq!(normalize_name("strideh"), "STRIDEH");
        assert_eq!(normalize_name("STRIDE_H"), "STRIDEH");
        assert_eq!(normalize_name("Average_Pool_2D"), "AVERAGEPOOL2D");
    }

    #[test]
    fn test_resolve_exact() {
        let schema = resolve("ADD").unwrap();
        assert_eq!(schema.code, 0);
        assert_eq!(schema.options, OptionsTag::Add);
    }

    #[test]
    fn test_resolve_underscore_insensitive() {
        for name in ["AVERAGE_POOL_2D", "AveragePool2D", "averagepool2d"] {
            let schema = resolve(name).unwrap();
            assert_eq!(schema.code, 1, "failed for {name}");
        }
    }

    #[test]
    fn test_resolve_vendor_ops() {
        assert_eq!(resolve("INSTANCE_NORM").unwrap().code, -2);
        assert_eq!(resolve("BCQ_GATHER").unwrap().code, -4);
    }

    #[test]
    fn test_resolve_custom_sentinel() {
        let schema = resolve("CUSTOM").unwrap();
        assert_eq!(schema.code, CUSTOM_CODE);
        assert_eq!(schema.options, OptionsTag::None);
    }

    #[test]
    fn test_resolve_unknown_fails() {
        assert!(resolve("NOT_A_REAL_OP").is_none());
        assert!(resolve("").is_none());
    }

    #[test]
    fn test_by_code() {
        assert_eq!(by_code(25).unwrap().name, "SOFTMAX");
        assert_eq!(by_code(CUSTOM_CODE).unwrap().name, "CUSTOM");
        // Retired codes are gaps.
        assert!(by_code(7).is_none());
        assert!(by_code(15).is_none());
    }

    #[test]
    fn test_table_ordered_by_code() {
        for pair in OP_SCHEMAS.windows(2) {
            assert!(pair[0].code < pair[1].code);
        }
    }

    #[test]
    fn test_option_fields() {
        let schema = resolve("CONV_2D").unwrap();
        assert!(schema
            .option_fields()
            .iter()
            .any(|d| d.name == "stride_h"));
        assert!(resolve("RELU").unwrap().option_fields().is_empty());
    }
}
