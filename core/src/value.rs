//! Typed values and string coercion.
//!
//! [`coerce`] is the single place where a raw argv token becomes a typed
//! [`Value`]. It is a pure function: strict base-10 integers with width
//! checks, locale-independent decimals, and the four bool literals.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::ValueType;

/// A typed field value.
///
/// Integers are widened to 64 bits after the declared width has been checked,
/// so `int32` and `int64` both land in [`Value::Int`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// `bool`
    Bool(bool),
    /// `uint32`, `uint64`
    UInt(u64),
    /// `int32`, `int64`
    Int(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// `string`
    String(String),
}

impl Value {
    /// Zero value of a type: `""`, `0`, `0.0` or `false`.
    ///
    /// # Examples
    ///
    /// ```
    /// use protoargs_core::{Value, ValueType};
    ///
    /// assert_eq!(Value::zero(ValueType::Int32), Value::Int(0));
    /// assert_eq!(Value::zero(ValueType::String), Value::String(String::new()));
    /// ```
    pub fn zero(value_type: ValueType) -> Self {
        match value_type {
            ValueType::String => Self::String(String::new()),
            ValueType::Int32 | ValueType::Int64 => Self::Int(0),
            ValueType::UInt32 | ValueType::UInt64 => Self::UInt(0),
            ValueType::Float => Self::Float(0.0),
            ValueType::Double => Self::Double(0.0),
            ValueType::Bool => Self::Bool(false),
        }
    }

    /// Returns the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the bool payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
        }
    }
}

/// Failure to convert a raw token into the expected type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    /// Not a number of the expected type, or out of its range.
    #[error("'{value}' is not a valid {expected}")]
    InvalidNumber {
        /// The rejected token.
        value: String,
        /// Type the token was coerced to.
        expected: ValueType,
    },
    /// Not one of `true`, `false`, `1`, `0`.
    #[error("'{value}' is not a valid bool (expected true, false, 1 or 0)")]
    InvalidBool {
        /// The rejected token.
        value: String,
    },
}

/// Converts a raw token into a value of `value_type`.
///
/// # Errors
///
/// [`CoerceError::InvalidNumber`] for malformed or out-of-range numbers,
/// [`CoerceError::InvalidBool`] for anything but `true`/`1`/`false`/`0`.
/// Numbers may carry a leading `-` but never a leading `+`.
///
/// # Examples
///
/// ```
/// use protoargs_core::{CoerceError, Value, ValueType, coerce};
///
/// assert_eq!(coerce("2048", ValueType::UInt64), Ok(Value::UInt(2048)));
/// assert_eq!(coerce("-7", ValueType::Int32), Ok(Value::Int(-7)));
/// assert_eq!(coerce("1", ValueType::Bool), Ok(Value::Bool(true)));
/// assert!(matches!(coerce("-7", ValueType::UInt32), Err(CoerceError::InvalidNumber { .. })));
/// assert!(matches!(coerce("yes", ValueType::Bool), Err(CoerceError::InvalidBool { .. })));
/// ```
pub fn coerce(raw: &str, value_type: ValueType) -> Result<Value, CoerceError> {
    let invalid_number = || CoerceError::InvalidNumber {
        value: raw.to_string(),
        expected: value_type,
    };

    match value_type {
        ValueType::String => Ok(Value::String(raw.to_string())),
        ValueType::Bool => match raw {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(CoerceError::InvalidBool {
                value: raw.to_string(),
            }),
        },
        ValueType::UInt32 | ValueType::UInt64 => {
            if !is_decimal_digits(raw) {
                return Err(invalid_number());
            }
            let parsed = if value_type == ValueType::UInt32 {
                raw.parse::<u32>().map(u64::from).ok()
            } else {
                raw.parse::<u64>().ok()
            };
            parsed.map(Value::UInt).ok_or_else(invalid_number)
        }
        ValueType::Int32 | ValueType::Int64 => {
            if !is_decimal_digits(raw.strip_prefix('-').unwrap_or(raw)) {
                return Err(invalid_number());
            }
            let parsed = if value_type == ValueType::Int32 {
                raw.parse::<i32>().map(i64::from).ok()
            } else {
                raw.parse::<i64>().ok()
            };
            parsed.map(Value::Int).ok_or_else(invalid_number)
        }
        ValueType::Float => {
            if !is_decimal_float(raw) {
                return Err(invalid_number());
            }
            raw.parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Value::Float)
                .ok_or_else(invalid_number)
        }
        ValueType::Double => {
            if !is_decimal_float(raw) {
                return Err(invalid_number());
            }
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Value::Double)
                .ok_or_else(invalid_number)
        }
    }
}

fn is_decimal_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

// Rules out `inf`, `NaN` and friends that `str::parse` would accept.
fn is_decimal_float(s: &str) -> bool {
    !s.starts_with('+')
        && s.bytes().any(|b| b.is_ascii_digit())
        && s
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_rejects_sign_and_junk() {
        assert!(coerce("-1", ValueType::UInt64).is_err());
        assert!(coerce("+1", ValueType::UInt64).is_err());
        assert!(coerce("50f", ValueType::UInt64).is_err());
        assert!(coerce("", ValueType::UInt32).is_err());
        assert!(coerce(" 5", ValueType::UInt32).is_err());
    }

    #[test]
    fn test_integer_width_overflow() {
        assert_eq!(coerce("4294967295", ValueType::UInt32), Ok(Value::UInt(u64::from(u32::MAX))));
        assert!(coerce("4294967296", ValueType::UInt32).is_err());
        assert!(coerce("4294967296", ValueType::UInt64).is_ok());
        assert!(coerce("2147483648", ValueType::Int32).is_err());
        assert_eq!(coerce("-2147483648", ValueType::Int32), Ok(Value::Int(i64::from(i32::MIN))));
        assert!(coerce("18446744073709551616", ValueType::UInt64).is_err());
    }

    #[test]
    fn test_signed_requires_digits_after_minus() {
        assert!(coerce("-", ValueType::Int64).is_err());
        assert!(coerce("--5", ValueType::Int64).is_err());
        assert_eq!(coerce("555", ValueType::Int32), Ok(Value::Int(555)));
    }

    #[test]
    fn test_floats() {
        assert_eq!(coerce("0.5", ValueType::Float), Ok(Value::Float(0.5)));
        assert_eq!(coerce("555.5", ValueType::Double), Ok(Value::Double(555.5)));
        assert_eq!(coerce("-1e3", ValueType::Double), Ok(Value::Double(-1000.0)));
        assert!(coerce("0.5d", ValueType::Float).is_err());
        assert!(coerce("0,5", ValueType::Double).is_err());
        assert!(coerce("inf", ValueType::Double).is_err());
        assert!(coerce("NaN", ValueType::Float).is_err());
        assert!(coerce("1e40", ValueType::Float).is_err());
    }

    #[test]
    fn test_leading_plus_rejected_for_every_number() {
        for value_type in [
            ValueType::Int32,
            ValueType::Int64,
            ValueType::UInt32,
            ValueType::UInt64,
            ValueType::Float,
            ValueType::Double,
        ] {
            assert!(
                matches!(coerce("+1", value_type), Err(CoerceError::InvalidNumber { .. })),
                "{value_type} accepted +1"
            );
        }
        assert!(coerce("+1.5", ValueType::Double).is_err());
        assert_eq!(coerce("1e+2", ValueType::Double), Ok(Value::Double(100.0)));
    }

    #[test]
    fn test_bool_literals() {
        assert_eq!(coerce("true", ValueType::Bool), Ok(Value::Bool(true)));
        assert_eq!(coerce("0", ValueType::Bool), Ok(Value::Bool(false)));
        assert_eq!(
            coerce("0e", ValueType::Bool),
            Err(CoerceError::InvalidBool { value: "0e".to_string() })
        );
        assert!(coerce("TRUE", ValueType::Bool).is_err());
    }

    #[test]
    fn test_string_passthrough() {
        assert_eq!(
            coerce("// tricky default value", ValueType::String),
            Ok(Value::String("// tricky default value".to_string()))
        );
        assert_eq!(coerce("", ValueType::String), Ok(Value::String(String::new())));
    }
}
