// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Builtin-options records: one typed record per operator kind.
//!
//! The format attaches a strongly-typed options record to every non-custom
//! operator. [`BuiltinOptions`] is the tagged union over those records, and
//! [`OptionsTag`] is the wire tag selecting the case. Records are plain
//! structs; the `options_schema!` table below is the single authority for
//! their fields, declared kinds, and wire tags, and generates the
//! name-addressed [`BuiltinOptions::get`]/[`BuiltinOptions::set`] accessors
//! the edit engine drives.
//!
//! Field names are matched under the same normalization used for operator
//! names (upper-case, underscores stripped); the first declared match wins.

use crate::enums::{
    ActivationFunctionType, FullyConnectedWeightsFormat, MirrorPadMode, Padding, SchemaEnum,
};
use crate::opcode::normalize_name;
use crate::TensorType;

/// Error from assigning a value to an options-record field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptionsError {
    /// The record declares no field with the requested name.
    #[error("no such field on this options record")]
    NoSuchField,

    /// The supplied value's kind does not match the field's declared kind.
    #[error("value kind does not match the field's declared kind")]
    KindMismatch,

    /// An enum-typed field was given a code outside the enumeration.
    #[error("{code} is not a valid {enum_name} code")]
    InvalidEnumCode { code: i64, enum_name: &'static str },
}

/// Identifies which schema enumeration an enum-kinded field draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumKind {
    ActivationFunctionType,
    Padding,
    MirrorPadMode,
    FullyConnectedWeightsFormat,
    TensorType,
}

impl EnumKind {
    /// Returns the schema type name of the enumeration.
    pub fn as_str(self) -> &'static str {
        match self {
            EnumKind::ActivationFunctionType => "ActivationFunctionType",
            EnumKind::Padding => "Padding",
            EnumKind::MirrorPadMode => "MirrorPadMode",
            EnumKind::FullyConnectedWeightsFormat => "FullyConnectedWeightsFormat",
            EnumKind::TensorType => "TensorType",
        }
    }
}

/// Declared kind of an options-record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Float,
    Bool,
    Str,
    IntList,
    Enum(EnumKind),
}

/// A single declared field of an options record.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// Field name as declared in the schema (snake_case).
    pub name: &'static str,
    /// Declared kind, used by the codec and by value coercion.
    pub kind: FieldKind,
}

/// A dynamically-kinded field value, produced by coercion and consumed by
/// [`BuiltinOptions::set`]. Enum members travel as their numeric code.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f32),
    Bool(bool),
    Str(String),
    IntList(Vec<i32>),
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Bool(v) => write!(f, "{v}"),
            FieldValue::Str(v) => f.write_str(v),
            FieldValue::IntList(v) => write!(f, "{v:?}"),
        }
    }
}

// ── Schema table machinery ─────────────────────────────────────────

macro_rules! field_ty {
    (int) => { i32 };
    (float) => { f32 };
    (bool) => { bool };
    (int_list) => { Vec<i32> };
    (enum ($t:ident)) => { $t };
}

macro_rules! field_kind {
    (int) => { FieldKind::Int };
    (float) => { FieldKind::Float };
    (bool) => { FieldKind::Bool };
    (int_list) => { FieldKind::IntList };
    (enum ($t:ident)) => { FieldKind::Enum(EnumKind::$t) };
}

macro_rules! field_get {
    ($v:expr, int) => { FieldValue::Int($v as i64) };
    ($v:expr, float) => { FieldValue::Float($v) };
    ($v:expr, bool) => { FieldValue::Bool($v) };
    ($v:expr, int_list) => { FieldValue::IntList($v.clone()) };
    ($v:expr, enum ($t:ident)) => { FieldValue::Int(SchemaEnum::enum_code($v) as i64) };
}

macro_rules! field_set {
    ($slot:expr, $val:expr, int) => {
        match $val {
            FieldValue::Int(v) => {
                $slot = *v as i32;
                Ok(())
            }
            _ => Err(OptionsError::KindMismatch),
        }
    };
    ($slot:expr, $val:expr, float) => {
        match $val {
            FieldValue::Float(v) => {
                $slot = *v;
                Ok(())
            }
            _ => Err(OptionsError::KindMismatch),
        }
    };
    ($slot:expr, $val:expr, bool) => {
        match $val {
            FieldValue::Bool(v) => {
                $slot = *v;
                Ok(())
            }
            _ => Err(OptionsError::KindMismatch),
        }
    };
    ($slot:expr, $val:expr, int_list) => {
        match $val {
            FieldValue::IntList(v) => {
                $slot = v.clone();
                Ok(())
            }
            _ => Err(OptionsError::KindMismatch),
        }
    };
    ($slot:expr, $val:expr, enum ($t:ident)) => {
        match $val {
            FieldValue::Int(v) => match <$t as SchemaEnum>::from_enum_code(*v as i32) {
                Some(member) => {
                    $slot = member;
                    Ok(())
                }
                None => Err(OptionsError::InvalidEnumCode {
                    code: *v,
                    enum_name: <$t as SchemaEnum>::NAME,
                }),
            },
            _ => Err(OptionsError::KindMismatch),
        }
    };
}

/// Declares every options record, its wire tag, and its fields, and
/// generates the record structs, [`OptionsTag`], [`BuiltinOptions`], and
/// the name-addressed accessors in one pass.
macro_rules! options_schema {
    ($(
        $code:literal => $variant:ident ( $name:ident ) {
            $( $field:ident : $kind:tt $( ( $enum_ty:ident ) )? ),* $(,)?
        }
    ),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Default, PartialEq)]
            pub struct $name {
                $( pub $field: field_ty!($kind $( ( $enum_ty ) )?), )*
            }
        )*

        /// Wire tag selecting which options record an operator carries.
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub enum OptionsTag {
            /// No typed options record (custom operators, option-less builtins).
            #[default]
            None,
            $( $variant, )*
        }

        impl OptionsTag {
            /// Returns the wire code for this tag.
            pub fn code(self) -> u16 {
                match self {
                    Self::None => 0,
                    $( Self::$variant => $code, )*
                }
            }

            /// Parses a wire code back into a tag.
            pub fn from_code(code: u16) -> Option<Self> {
                match code {
                    0 => Some(Self::None),
                    $( $code => Some(Self::$variant), )*
                    _ => None,
                }
            }

            /// Returns the tag's display name.
            pub fn as_str(self) -> &'static str {
                match self {
                    Self::None => "None",
                    $( Self::$variant => stringify!($variant), )*
                }
            }
        }

        /// A typed builtin-options record, one case per operator kind.
        #[derive(Debug, Clone, PartialEq)]
        pub enum BuiltinOptions {
            $( $variant($name), )*
        }

        impl BuiltinOptions {
            /// Returns the variant tag of this record.
            pub fn tag(&self) -> OptionsTag {
                match self {
                    $( Self::$variant(_) => OptionsTag::$variant, )*
                }
            }

            /// Returns the record type's display name (e.g. `"Conv2DOptions"`).
            pub fn record_name(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => stringify!($name), )*
                }
            }

            /// Constructs a default-initialised record for `tag`, or `None`
            /// for [`OptionsTag::None`], which has no record.
            pub fn new(tag: OptionsTag) -> Option<Self> {
                match tag {
                    OptionsTag::None => None,
                    $( OptionsTag::$variant => Some(Self::$variant(<$name>::default())), )*
                }
            }

            /// Returns the declared fields of the record identified by
            /// `tag`, in declaration order.
            pub fn fields_of(tag: OptionsTag) -> &'static [FieldDef] {
                match tag {
                    OptionsTag::None => &[],
                    $( OptionsTag::$variant => &[
                        $( FieldDef {
                            name: stringify!($field),
                            kind: field_kind!($kind $( ( $enum_ty ) )?),
                        }, )*
                    ], )*
                }
            }

            /// Declared fields of this record, in declaration order.
            pub fn field_defs(&self) -> &'static [FieldDef] {
                Self::fields_of(self.tag())
            }

            /// Reads a field by normalized name. First declared match wins.
            #[allow(unused_variables)]
            pub fn get(&self, normalized_key: &str) -> Option<FieldValue> {
                match self {
                    $( Self::$variant(opts) => {
                        $( if normalize_name(stringify!($field)) == normalized_key {
                            return Some(field_get!(opts.$field, $kind $( ( $enum_ty ) )?));
                        } )*
                        None
                    } )*
                }
            }

            /// Assigns a coerced value to a field by normalized name.
            #[allow(unused_variables)]
            pub fn set(
                &mut self,
                normalized_key: &str,
                value: &FieldValue,
            ) -> Result<(), OptionsError> {
                match self {
                    $( Self::$variant(opts) => {
                        $( if normalize_name(stringify!($field)) == normalized_key {
                            return field_set!(opts.$field, value, $kind $( ( $enum_ty ) )?);
                        } )*
                        Err(OptionsError::NoSuchField)
                    } )*
                }
            }
        }
    };
}

// ── The schema table ───────────────────────────────────────────────
// Wire tags are part of the format; append new records, never renumber.

options_schema! {
    1 => Conv2D(Conv2DOptions) {
        padding: enum(Padding),
        stride_w: int,
        stride_h: int,
        fused_activation_function: enum(ActivationFunctionType),
        dilation_w_factor: int,
        dilation_h_factor: int,
    },
    2 => DepthwiseConv2D(DepthwiseConv2DOptions) {
        padding: enum(Padding),
        stride_w: int,
        stride_h: int,
        depth_multiplier: int,
        fused_activation_function: enum(ActivationFunctionType),
        dilation_w_factor: int,
        dilation_h_factor: int,
    },
    3 => Pool2D(Pool2DOptions) {
        padding: enum(Padding),
        stride_w: int,
        stride_h: int,
        filter_width: int,
        filter_height: int,
        fused_activation_function: enum(ActivationFunctionType),
    },
    4 => FullyConnected(FullyConnectedOptions) {
        fused_activation_function: enum(ActivationFunctionType),
        weights_format: enum(FullyConnectedWeightsFormat),
        keep_num_dims: bool,
        asymmetric_quantize_inputs: bool,
    },
    5 => Softmax(SoftmaxOptions) {
        beta: float,
    },
    6 => Concatenation(ConcatenationOptions) {
        axis: int,
        fused_activation_function: enum(ActivationFunctionType),
    },
    7 => Add(AddOptions) {
        fused_activation_function: enum(ActivationFunctionType),
        pot_scale_int16: bool,
    },
    8 => Mul(MulOptions) {
        fused_activation_function: enum(ActivationFunctionType),
    },
    9 => Sub(SubOptions) {
        fused_activation_function: enum(ActivationFunctionType),
        pot_scale_int16: bool,
    },
    10 => Div(DivOptions) {
        fused_activation_function: enum(ActivationFunctionType),
    },
    11 => Reshape(ReshapeOptions) {
        new_shape: int_list,
    },
    12 => Svdf(SvdfOptions) {
        rank: int,
        fused_activation_function: enum(ActivationFunctionType),
        asymmetric_quantize_inputs: bool,
    },
    13 => Rnn(RnnOptions) {
        fused_activation_function: enum(ActivationFunctionType),
        asymmetric_quantize_inputs: bool,
    },
    14 => LocalResponseNormalization(LocalResponseNormalizationOptions) {
        radius: int,
        bias: float,
        alpha: float,
        beta: float,
    },
    15 => L2Norm(L2NormOptions) {
        fused_activation_function: enum(ActivationFunctionType),
    },
    16 => Lstm(LstmOptions) {
        fused_activation_function: enum(ActivationFunctionType),
        cell_clip: float,
        proj_clip: float,
        asymmetric_quantize_inputs: bool,
    },
    17 => ResizeBilinear(ResizeBilinearOptions) {
        align_corners: bool,
        half_pixel_centers: bool,
    },
    18 => ResizeNearestNeighbor(ResizeNearestNeighborOptions) {
        align_corners: bool,
        half_pixel_centers: bool,
    },
    19 => Pad(PadOptions) {},
    20 => PadV2(PadV2Options) {},
    21 => Gather(GatherOptions) {
        axis: int,
        batch_dims: int,
    },
    22 => Transpose(TransposeOptions) {},
    23 => Reducer(ReducerOptions) {
        keep_dims: bool,
    },
    24 => Squeeze(SqueezeOptions) {
        squeeze_dims: int_list,
    },
    25 => StridedSlice(StridedSliceOptions) {
        begin_mask: int,
        end_mask: int,
        ellipsis_mask: int,
        new_axis_mask: int,
        shrink_axis_mask: int,
    },
    26 => Split(SplitOptions) {
        num_splits: int,
    },
    27 => SplitV(SplitVOptions) {
        num_splits: int,
    },
    28 => LogSoftmax(LogSoftmaxOptions) {},
    29 => Cast(CastOptions) {
        in_data_type: enum(TensorType),
        out_data_type: enum(TensorType),
    },
    30 => ArgMax(ArgMaxOptions) {
        output_type: enum(TensorType),
    },
    31 => ArgMin(ArgMinOptions) {
        output_type: enum(TensorType),
    },
    32 => TransposeConv(TransposeConvOptions) {
        padding: enum(Padding),
        stride_w: int,
        stride_h: int,
    },
    33 => Shape(ShapeOptions) {
        out_type: enum(TensorType),
    },
    34 => FakeQuant(FakeQuantOptions) {
        min: float,
        max: float,
        num_bits: int,
        narrow_range: bool,
    },
    35 => Pack(PackOptions) {
        values_count: int,
        axis: int,
    },
    36 => Unpack(UnpackOptions) {
        num: int,
        axis: int,
    },
    37 => OneHot(OneHotOptions) {
        axis: int,
    },
    38 => LeakyRelu(LeakyReluOptions) {
        alpha: float,
    },
    39 => SquaredDifference(SquaredDifferenceOptions) {},
    40 => MirrorPad(MirrorPadOptions) {
        mode: enum(MirrorPadMode),
    },
    41 => Fill(FillOptions) {},
    42 => BatchMatMul(BatchMatMulOptions) {
        adj_x: bool,
        adj_y: bool,
        asymmetric_quantize_inputs: bool,
    },
    43 => Cumsum(CumsumOptions) {
        exclusive: bool,
        reverse: bool,
    },
    44 => Quantize(QuantizeOptions) {},
    45 => Dequantize(DequantizeOptions) {},
    46 => HardSwish(HardSwishOptions) {},
    47 => ExpandDims(ExpandDimsOptions) {},
    48 => DepthToSpace(DepthToSpaceOptions) {
        block_size: int,
    },
    49 => SpaceToDepth(SpaceToDepthOptions) {
        block_size: int,
    },
    50 => InstanceNorm(InstanceNormOptions) {
        epsilon: float,
        fused_activation_function: enum(ActivationFunctionType),
    },
    51 => BcqFullyConnected(BcqFullyConnectedOptions) {
        weights_hidden_size: int,
        fused_activation_function: enum(ActivationFunctionType),
    },
    52 => BcqGather(BcqGatherOptions) {
        input_hidden_size: int,
        axis: int,
    },
}
