//! Locating post data inside the page's hidden JSON payloads
//!
//! - [`hidden_data`]: pulls the JSON carried by `data-sjs` script blocks out of rendered HTML
//! - [`nested_key`]: finds every value bound to a key anywhere in a JSON tree
//! - [`detector`]: finds sub-objects shaped like posts in arbitrary API responses

pub mod detector;
pub mod hidden_data;
pub mod nested_key;

pub use detector::{find_post_like_objects, is_post};
pub use hidden_data::{HiddenDataExtractor, HiddenDataMarkers, extract_hidden_data};
pub use nested_key::find_nested_key;

use serde_json::Value;

/// Truthiness the way the page's own scripts see it: null, false, 0, "" and NaN are falsy
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `value[key]` when present and truthy
pub(crate) fn truthy_field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| is_truthy(v))
}

/// Render a scalar identifier as a string; numeric ids are common upstream
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
