//! Polars `AnyValue` utility functions.

use polars::prelude::AnyValue;

/// Converts a Polars AnyValue to its String representation.
/// Returns an empty string for Null.
pub fn value_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => f64::from(v).to_string(),
        AnyValue::Float64(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Whether a value counts as missing: null, or blank text.
pub fn is_missing_value(value: &AnyValue) -> bool {
    match value {
        AnyValue::Null => true,
        AnyValue::String(s) => s.trim().is_empty(),
        AnyValue::StringOwned(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Whether a value is a native numeric type.
pub fn is_numeric_value(value: &AnyValue) -> bool {
    matches!(
        value,
        AnyValue::Float32(_)
            | AnyValue::Float64(_)
            | AnyValue::Int8(_)
            | AnyValue::Int16(_)
            | AnyValue::Int32(_)
            | AnyValue::Int64(_)
            | AnyValue::UInt8(_)
            | AnyValue::UInt16(_)
            | AnyValue::UInt32(_)
            | AnyValue::UInt64(_)
    )
}

/// Converts a value to f64, parsing text; None for non-numeric or null.
pub fn value_to_f64(value: &AnyValue) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(*v)),
        AnyValue::Int16(v) => Some(f64::from(*v)),
        AnyValue::Int32(v) => Some(f64::from(*v)),
        AnyValue::Int64(v) => Some(*v as f64),
        AnyValue::UInt8(v) => Some(f64::from(*v)),
        AnyValue::UInt16(v) => Some(f64::from(*v)),
        AnyValue::UInt32(v) => Some(f64::from(*v)),
        AnyValue::UInt64(v) => Some(*v as f64),
        AnyValue::Float32(v) => Some(f64::from(*v)),
        AnyValue::Float64(v) => Some(*v),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(s),
        _ => None,
    }
}

/// Converts a value to a zero-based row index; None for anything that is
/// not a non-negative integer.
pub fn value_to_usize(value: &AnyValue) -> Option<usize> {
    match value {
        AnyValue::Int8(v) => usize::try_from(*v).ok(),
        AnyValue::Int16(v) => usize::try_from(*v).ok(),
        AnyValue::Int32(v) => usize::try_from(*v).ok(),
        AnyValue::Int64(v) => usize::try_from(*v).ok(),
        AnyValue::UInt8(v) => Some(usize::from(*v)),
        AnyValue::UInt16(v) => Some(usize::from(*v)),
        AnyValue::UInt32(v) => usize::try_from(*v).ok(),
        AnyValue::UInt64(v) => usize::try_from(*v).ok(),
        AnyValue::String(s) => s.trim().parse::<usize>().ok(),
        AnyValue::StringOwned(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    }
}

fn parse_f64(value: &str) -> Option<f64> {
    if value.trim().is_empty() {
        return None;
    }
    value.trim().parse::<f64>().ok()
}
