//! FFI Type System
//!
//! Types describing the native call contract and the host-side values that get
//! marshalled across it.

use std::fmt;

use super::BridgeError;

/// Scalar types that may appear in an exported signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiType {
    /// Void (no value)
    Void,
    /// 32-bit signed integer (the wire width for counts and lengths)
    I32,
    /// 64-bit signed integer
    I64,
    /// 64-bit floating point
    F64,
    /// Pointer to caller-owned memory
    Ptr,
}

impl FfiType {
    /// Parse from a C or Rust spelling of the type
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.ends_with('*') {
            return Some(FfiType::Ptr);
        }
        match s.to_lowercase().as_str() {
            "void" => Some(FfiType::Void),
            "i32" | "int32" | "int32_t" | "int" => Some(FfiType::I32),
            "i64" | "int64" | "int64_t" | "long long" => Some(FfiType::I64),
            "f64" | "double" => Some(FfiType::F64),
            "ptr" | "pointer" => Some(FfiType::Ptr),
            _ => None,
        }
    }
}

impl fmt::Display for FfiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiType::Void => write!(f, "void"),
            FfiType::I32 => write!(f, "i32"),
            FfiType::I64 => write!(f, "i64"),
            FfiType::F64 => write!(f, "f64"),
            FfiType::Ptr => write!(f, "ptr"),
        }
    }
}

/// One element of a dynamically typed host sequence
///
/// Host callers that do not hold a `&[i32]` hand the bridge a slice of these; the
/// bridge checks every element before anything crosses the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum FfiValue {
    /// Integer of any width
    Integer(i64),
    /// Floating point
    Float(f64),
    /// Text
    Text(String),
}

impl FfiValue {
    /// Parse a token, preferring integers, then floats, then falling back to text
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        if let Ok(v) = token.parse::<i64>() {
            FfiValue::Integer(v)
        } else if let Ok(v) = token.parse::<f64>() {
            FfiValue::Float(v)
        } else {
            FfiValue::Text(token.to_string())
        }
    }

    /// Short type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FfiValue::Integer(_) => "integer",
            FfiValue::Float(_) => "float",
            FfiValue::Text(_) => "text",
        }
    }

    /// Parse a comma- or whitespace-separated list of tokens
    pub fn parse_list(list: &str) -> Vec<Self> {
        list.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(Self::parse)
            .collect()
    }

    /// Narrow to the 32-bit wire type, if this is an integer that fits
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            FfiValue::Integer(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Narrow to the wire type, or the contract violation for element `index`
    pub fn checked_i32(&self, index: usize) -> Result<i32, BridgeError> {
        self.as_i32().ok_or_else(|| BridgeError::TypeContract {
            index,
            found: self.describe(),
        })
    }

    /// How this value is named in a type contract violation
    pub(crate) fn describe(&self) -> String {
        match self {
            FfiValue::Integer(v) => format!("integer {} outside the i32 range", v),
            other => format!("{} {}", other.type_name(), other),
        }
    }
}

impl From<i32> for FfiValue {
    fn from(v: i32) -> Self {
        FfiValue::Integer(i64::from(v))
    }
}

impl From<f64> for FfiValue {
    fn from(v: f64) -> Self {
        FfiValue::Float(v)
    }
}

impl From<&str> for FfiValue {
    fn from(v: &str) -> Self {
        FfiValue::Text(v.to_string())
    }
}

impl fmt::Display for FfiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiValue::Integer(v) => write!(f, "{}", v),
            FfiValue::Float(v) => write!(f, "{}", v),
            FfiValue::Text(v) => write!(f, "{:?}", v),
        }
    }
}

/// Function signature for FFI calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfiSignature {
    /// Exported symbol name
    pub name: String,
    /// Parameter types
    pub params: Vec<FfiType>,
    /// Return type
    pub return_type: FfiType,
}

impl FfiSignature {
    /// Create a new function signature
    pub fn new(name: impl Into<String>, params: Vec<FfiType>, return_type: FfiType) -> Self {
        Self {
            name: name.into(),
            params,
            return_type,
        }
    }

    /// The buffer-reduction shape: `i32 name(ptr, i32)`
    pub fn buffer_reduction(name: impl Into<String>) -> Self {
        Self::new(name, vec![FfiType::Ptr, FfiType::I32], FfiType::I32)
    }

    /// Check whether this signature has the same parameter and return types as `other`
    pub fn same_shape(&self, other: &FfiSignature) -> bool {
        self.params == other.params && self.return_type == other.return_type
    }

    /// Parse from a C-style signature string
    ///
    /// Format: `"return_type function_name(param_type [name], ...)"`. Parameter
    /// names are optional; a trailing `*` on either the type or the name makes the
    /// parameter a pointer.
    pub fn parse(signature: &str) -> Option<Self> {
        let signature = signature.trim().trim_end_matches(';');

        let paren_pos = signature.find('(')?;
        let before_paren = signature[..paren_pos].trim();
        let after_paren = signature[paren_pos + 1..].trim_end().strip_suffix(')')?.trim();

        // Split return type and name
        let (return_type_str, name) = before_paren.rsplit_once(char::is_whitespace)?;
        let return_type = FfiType::from_str(return_type_str)?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut params = Vec::new();
        for param in after_paren.split(',') {
            let param = param.trim();
            if param.is_empty() || param == "void" {
                continue;
            }
            params.push(parse_param(param)?);
        }

        Some(Self::new(name, params, return_type))
    }
}

fn parse_param(param: &str) -> Option<FfiType> {
    if param.contains('*') {
        return Some(FfiType::Ptr);
    }
    let words: Vec<&str> = param
        .split_whitespace()
        .filter(|w| *w != "const")
        .collect();
    match words.as_slice() {
        [ty] => FfiType::from_str(ty),
        [ty, _name] => FfiType::from_str(ty),
        [a, b, _name] => FfiType::from_str(&format!("{} {}", a, b)),
        _ => None,
    }
}

impl fmt::Display for FfiSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.return_type, self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")
    }
}
