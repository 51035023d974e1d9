//! Request options and decoded response bodies.
//!
//! # Design
//! `RequestOptions` is built once with a consuming builder and then only
//! borrowed by the executor. `DecodedBody` is the single tagged result of
//! decoding a response; `FromBody` converts it into whatever type the caller
//! asked for, failing with `FetchError::UnexpectedBody` on a variant
//! mismatch instead of casting blindly.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::FetchError;
use crate::http::HttpMethod;

/// Structured description of a single call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub url: String,
    pub method: HttpMethod,
    pub body: Option<Value>,
    pub query_params: Option<Vec<(String, String)>>,
    pub headers: Option<Vec<(String, String)>>,
}

impl RequestOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::default(),
            body: None,
            query_params: None,
            headers: None,
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Append one query parameter. Parameters keep insertion order.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    /// Append one header. Later entries win over earlier ones with the same
    /// name, and over the default content type.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Vec::new)
            .push((name.into(), value.into()));
        self
    }
}

/// Binary body with its declared media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub content_type: String,
    pub data: Bytes,
}

/// Value of one `multipart/form-data` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        content_type: Option<String>,
        data: Bytes,
    },
}

impl FormValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(text) => Some(text),
            FormValue::File { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

/// Ordered form fields. Names may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: Vec<FormField>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: FormValue) {
        self.fields.push(FormField {
            name: name.into(),
            value,
        });
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FormValue> + 'a {
        self.fields
            .iter()
            .filter(move |field| field.name == name)
            .map(|field| &field.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A response body decoded according to its content type.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedBody {
    Json(Value),
    Text(String),
    Blob(Blob),
    FormData(FormData),
    Bytes(Bytes),
}

impl DecodedBody {
    pub fn kind(&self) -> &'static str {
        match self {
            DecodedBody::Json(_) => "json",
            DecodedBody::Text(_) => "text",
            DecodedBody::Blob(_) => "blob",
            DecodedBody::FormData(_) => "form-data",
            DecodedBody::Bytes(_) => "bytes",
        }
    }

    fn unexpected(self, expected: &'static str) -> FetchError {
        FetchError::UnexpectedBody {
            expected,
            actual: self.kind(),
        }
    }
}

/// Conversion from a decoded body into the type a call resolves with.
pub trait FromBody: Sized {
    fn from_body(body: DecodedBody) -> Result<Self, FetchError>;
}

impl FromBody for DecodedBody {
    fn from_body(body: DecodedBody) -> Result<Self, FetchError> {
        Ok(body)
    }
}

impl FromBody for Value {
    fn from_body(body: DecodedBody) -> Result<Self, FetchError> {
        match body {
            DecodedBody::Json(value) => Ok(value),
            other => Err(other.unexpected("json")),
        }
    }
}

impl FromBody for String {
    fn from_body(body: DecodedBody) -> Result<Self, FetchError> {
        match body {
            DecodedBody::Text(text) => Ok(text),
            other => Err(other.unexpected("text")),
        }
    }
}

impl FromBody for Blob {
    fn from_body(body: DecodedBody) -> Result<Self, FetchError> {
        match body {
            DecodedBody::Blob(blob) => Ok(blob),
            other => Err(other.unexpected("blob")),
        }
    }
}

impl FromBody for FormData {
    fn from_body(body: DecodedBody) -> Result<Self, FetchError> {
        match body {
            DecodedBody::FormData(form) => Ok(form),
            other => Err(other.unexpected("form-data")),
        }
    }
}

/// Any binary-ish body: blob data or raw bytes.
impl FromBody for Bytes {
    fn from_body(body: DecodedBody) -> Result<Self, FetchError> {
        match body {
            DecodedBody::Bytes(bytes) => Ok(bytes),
            DecodedBody::Blob(blob) => Ok(blob.data),
            other => Err(other.unexpected("bytes")),
        }
    }
}

/// Typed JSON result, deserialized from a `DecodedBody::Json` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T: DeserializeOwned> FromBody for Json<T> {
    fn from_body(body: DecodedBody) -> Result<Self, FetchError> {
        let value = Value::from_body(body)?;
        Ok(Json(serde_json::from_value(value)?))
    }
}
