//! Lenient readers for client-supplied JSON values
//!
//! Forms post numbers as strings, so numeric fields accept either a JSON
//! number or a string holding one. Absent, `null` and blank values all read
//! as "not given".

use serde_json::Value as Json;

/// The value is present but has the wrong shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrongType;

/// A trimmed string; `Ok(None)` when absent, null or blank
pub fn text(value: Option<&Json>) -> Result<Option<String>, WrongType> {
    match value {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(_) => Err(WrongType),
    }
}

/// A whole number, from a number or a numeric string
pub fn integer(value: Option<&Json>) -> Result<Option<i64>, WrongType> {
    match number(value)? {
        None => Ok(None),
        Some(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => Ok(Some(n as i64)),
        Some(_) => Err(WrongType),
    }
}

/// A finite number, from a number or a numeric string
pub fn number(value: Option<&Json>) -> Result<Option<f64>, WrongType> {
    match value {
        None | Some(Json::Null) => Ok(None),
        Some(Json::Number(n)) => n.as_f64().map(Some).ok_or(WrongType),
        Some(Json::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Json::String(s)) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(WrongType),
        },
        Some(_) => Err(WrongType),
    }
}
