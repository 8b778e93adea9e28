//! Scalar coercion for chart values and labels
//!
//! Values that cannot be read as numbers become `NaN`, never zero. The chart
//! layer renders `NaN` as a gap (it serializes to JSON `null`).

use serde_json::Value;

/// Coerce a cell to a number
///
/// - numbers pass through
/// - strings are trimmed and parsed; blank or non-numeric strings give `NaN`
/// - booleans map to 1 / 0
/// - null, missing, arrays and objects give `NaN`
pub fn to_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                f64::NAN
            } else {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => f64::NAN,
    }
}

/// String form of a cell, as shown on a category axis or table cell
pub fn to_label(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_f64() {
            // 2020.0 reads as "2020"
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Some(Value::Null) => "null".to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
