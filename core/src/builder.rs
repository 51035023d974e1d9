//! Turns `RequestOptions` into a concrete `HttpRequest`.
//!
//! Pure construction: no I/O, no shared state.

use serde_json::Value;
use url::form_urlencoded;

use crate::error::FetchError;
use crate::http::HttpRequest;
use crate::types::RequestOptions;

pub const DEFAULT_CONTENT_TYPE: (&str, &str) = ("content-type", "application/json");

/// Build the wire request for `options`.
///
/// Query parameters are form-urlencoded in insertion order and appended after
/// a `?`. Caller headers overlay the default JSON content type, matching
/// names without regard to ASCII case. The body is attached only when it is
/// truthy (see [`is_truthy`]).
pub fn build_request(options: &RequestOptions) -> Result<HttpRequest, FetchError> {
    let url = match &options.query_params {
        Some(params) => {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params)
                .finish();
            format!("{}?{query}", options.url)
        }
        None => options.url.clone(),
    };

    let mut headers = vec![(
        DEFAULT_CONTENT_TYPE.0.to_string(),
        DEFAULT_CONTENT_TYPE.1.to_string(),
    )];
    for (name, value) in options.headers.iter().flatten() {
        match headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some(slot) => *slot = (name.clone(), value.clone()),
            None => headers.push((name.clone(), value.clone())),
        }
    }

    let body = match &options.body {
        Some(value) if is_truthy(value) => Some(serde_json::to_string(value)?),
        _ => None,
    };

    Ok(HttpRequest {
        method: options.method,
        url,
        headers,
        body,
    })
}

/// Loose presence check for request bodies: `null`, `false`, zero and the
/// empty string count as absent. Arrays and objects are always present.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
