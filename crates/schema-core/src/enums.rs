// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Auxiliary enumerations used by builtin-options fields.
//!
//! Edit requests name these enumerations by their schema type name
//! (`"ActivationFunctionType"`, `"Padding"`, ...) and supply the value as
//! free-form text. [`lookup`] resolves the upper-cased value against the
//! named enumeration; [`is_enum_type`] gates whether a request's declared
//! value type takes the enum coercion path at all.

use crate::TensorType;

/// Common behaviour of every schema enumeration: a stable numeric code
/// and a canonical upper-case member name.
pub trait SchemaEnum: Sized + Copy {
    /// The schema type name (e.g. `"ActivationFunctionType"`).
    const NAME: &'static str;

    /// Returns the numeric code stored in options records.
    fn enum_code(self) -> i32;

    /// Parses a numeric code back into a member.
    fn from_enum_code(code: i32) -> Option<Self>;

    /// Parses a canonical upper-case member name (e.g. `"RELU"`).
    fn from_member_name(name: &str) -> Option<Self>;
}

/// Activation fused into an operator's output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ActivationFunctionType {
    #[default]
    None,
    Relu,
    ReluN1To1,
    Relu6,
    Tanh,
    SignBit,
}

impl SchemaEnum for ActivationFunctionType {
    const NAME: &'static str = "ActivationFunctionType";

    fn enum_code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Relu => 1,
            Self::ReluN1To1 => 2,
            Self::Relu6 => 3,
            Self::Tanh => 4,
            Self::SignBit => 5,
        }
    }

    fn from_enum_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::None,
            1 => Self::Relu,
            2 => Self::ReluN1To1,
            3 => Self::Relu6,
            4 => Self::Tanh,
            5 => Self::SignBit,
            _ => return None,
        })
    }

    fn from_member_name(name: &str) -> Option<Self> {
        Some(match name {
            "NONE" => Self::None,
            "RELU" => Self::Relu,
            "RELU_N1_TO_1" => Self::ReluN1To1,
            "RELU6" => Self::Relu6,
            "TANH" => Self::Tanh,
            "SIGN_BIT" => Self::SignBit,
            _ => return None,
        })
    }
}

/// Spatial padding policy for windowed operators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Padding {
    #[default]
    Same,
    Valid,
}

impl SchemaEnum for Padding {
    const NAME: &'static str = "Padding";

    fn enum_code(self) -> i32 {
        match self {
            Self::Same => 0,
            Self::Valid => 1,
        }
    }

    fn from_enum_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::Same,
            1 => Self::Valid,
            _ => return None,
        })
    }

    fn from_member_name(name: &str) -> Option<Self> {
        Some(match name {
            "SAME" => Self::Same,
            "VALID" => Self::Valid,
            _ => return None,
        })
    }
}

/// Edge-handling mode for mirror padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MirrorPadMode {
    #[default]
    Reflect,
    Symmetric,
}

impl SchemaEnum for MirrorPadMode {
    const NAME: &'static str = "MirrorPadMode";

    fn enum_code(self) -> i32 {
        match self {
            Self::Reflect => 0,
            Self::Symmetric => 1,
        }
    }

    fn from_enum_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::Reflect,
            1 => Self::Symmetric,
            _ => return None,
        })
    }

    fn from_member_name(name: &str) -> Option<Self> {
        Some(match name {
            "REFLECT" => Self::Reflect,
            "SYMMETRIC" => Self::Symmetric,
            _ => return None,
        })
    }
}

/// Weight layout of a fully-connected operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FullyConnectedWeightsFormat {
    #[default]
    Default,
    Shuffled4x16Int8,
}

impl SchemaEnum for FullyConnectedWeightsFormat {
    const NAME: &'static str = "FullyConnectedWeightsFormat";

    fn enum_code(self) -> i32 {
        match self {
            Self::Default => 0,
            Self::Shuffled4x16Int8 => 1,
        }
    }

    fn from_enum_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::Default,
            1 => Self::Shuffled4x16Int8,
            _ => return None,
        })
    }

    fn from_member_name(name: &str) -> Option<Self> {
        Some(match name {
            "DEFAULT" => Self::Default,
            "SHUFFLED4X16INT8" => Self::Shuffled4x16Int8,
            _ => return None,
        })
    }
}

impl SchemaEnum for TensorType {
    const NAME: &'static str = "TensorType";

    fn enum_code(self) -> i32 {
        self.code() as i32
    }

    fn from_enum_code(code: i32) -> Option<Self> {
        u8::try_from(code).ok().and_then(TensorType::from_code)
    }

    fn from_member_name(name: &str) -> Option<Self> {
        TensorType::from_name(name)
    }
}

/// Returns `true` if `type_name` names one of the schema enumerations.
///
/// Accepts the generated schema spelling `FullyConnectedOptionsWeightsFormat`
/// as an alias for the shorter form.
pub fn is_enum_type(type_name: &str) -> bool {
    matches!(
        type_name,
        "ActivationFunctionType"
            | "Padding"
            | "MirrorPadMode"
            | "FullyConnectedWeightsFormat"
            | "FullyConnectedOptionsWeightsFormat"
            | "TensorType"
    )
}

/// Resolves an upper-cased member value inside the enumeration named by
/// `type_name`. Returns the member's numeric code, or `None` when the
/// value is not a member (callers report that as an unknown-enum-value
/// error; use [`is_enum_type`] first to tell "not an enum type" apart).
pub fn lookup(type_name: &str, value: &str) -> Option<i32> {
    let v = value.trim().to_ascii_uppercase();
    match type_name {
        "ActivationFunctionType" => {
            ActivationFunctionType::from_member_name(&v).map(SchemaEnum::enum_code)
        }
        "Padding" => Padding::from_member_name(&v).map(SchemaEnum::enum_code),
        "MirrorPadMode" => MirrorPadMode::from_member_name(&v).map(SchemaEnum::enum_code),
        "FullyConnectedWeightsFormat" | "FullyConnectedOptionsWeightsFormat" => {
            FullyConnectedWeightsFormat::from_member_name(&v).map(SchemaEnum::enum_code)
        }
        "TensorType" => TensorType::from_member_name(&v).map(|t| t.code() as i32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_lookup() {
        assert_eq!(lookup("ActivationFunctionType", "relu"), Some(1));
        assert_eq!(lookup("ActivationFunctionType", "RELU6"), Some(3));
        assert_eq!(lookup("ActivationFunctionType", "relu_n1_to_1"), Some(2));
        assert_eq!(lookup("ActivationFunctionType", "swish"), None);
    }

    #[test]
    fn test_padding_lookup() {
        assert_eq!(lookup("Padding", "same"), Some(0));
        assert_eq!(lookup("Padding", "VALID"), Some(1));
        assert_eq!(lookup("Padding", "full"), None);
    }

    #[test]
    fn test_tensor_type_lookup() {
        assert_eq!(lookup("TensorType", "float32"), Some(0));
        assert_eq!(lookup("TensorType", "INT8"), Some(9));
    }

    #[test]
    fn test_is_enum_type() {
        assert!(is_enum_type("ActivationFunctionType"));
        assert!(is_enum_type("Padding"));
        assert!(is_enum_type("TensorType"));
        assert!(!is_enum_type("int"));
        assert!(!is_enum_type("float"));
        assert!(!is_enum_type("bool"));
    }

    #[test]
    fn test_code_roundtrip() {
        for code in 0..=5 {
            let m = ActivationFunctionType::from_enum_code(code).unwrap();
            assert_eq!(m.enum_code(), code);
        }
        assert_eq!(ActivationFunctionType::from_enum_code(6), None);
        assert_eq!(Padding::from_enum_code(2), None);
    }
}
