//! Content-type driven response decoding.
//!
//! # Design
//! The classification rules live in one ordered table, `BODY_KINDS`, checked
//! top to bottom by substring containment; the first hit wins and anything
//! unmatched falls back to raw bytes. `decode_response` takes the response
//! by value, so each body is read exactly once whatever branch is taken.

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Response;
use tracing::debug;

use crate::error::FetchError;
use crate::types::{Blob, DecodedBody, FormData, FormValue};

/// How a response body is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Text,
    Blob,
    FormData,
    Bytes,
}

/// Content-type patterns in priority order.
pub const BODY_KINDS: &[(&str, BodyKind)] = &[
    ("application/json", BodyKind::Json),
    ("text/", BodyKind::Text),
    ("image/", BodyKind::Blob),
    ("application/octet-stream", BodyKind::Blob),
    ("multipart/form-data", BodyKind::FormData),
];

/// Pick the decoding for a declared content type. Empty means undeclared.
pub fn classify(content_type: &str) -> BodyKind {
    classify_bytes(content_type.as_bytes())
}

/// Same as [`classify`] on the raw header bytes, which need not be ASCII.
pub fn classify_bytes(content_type: &[u8]) -> BodyKind {
    BODY_KINDS
        .iter()
        .find(|(pattern, _)| contains(content_type, pattern.as_bytes()))
        .map_or(BodyKind::Bytes, |(_, kind)| *kind)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// Decode the body of a successful response according to its content type.
pub async fn decode_response(response: Response) -> Result<DecodedBody, FetchError> {
    let raw = response
        .headers()
        .get(CONTENT_TYPE)
        .map(|value| value.as_bytes())
        .unwrap_or_default();
    let kind = classify_bytes(raw);
    let content_type = String::from_utf8_lossy(raw).into_owned();
    debug!(content_type = %content_type, ?kind, "decoding response body");

    let body = match kind {
        BodyKind::Json => DecodedBody::Json(response.json().await?),
        BodyKind::Text => DecodedBody::Text(response.text().await?),
        BodyKind::Blob => DecodedBody::Blob(Blob {
            data: response.bytes().await?,
            content_type,
        }),
        BodyKind::FormData => DecodedBody::FormData(decode_form_data(response, &content_type).await?),
        BodyKind::Bytes => DecodedBody::Bytes(response.bytes().await?),
    };
    Ok(body)
}

/// Parse a `multipart/form-data` body. Parts with a filename become files,
/// the rest text.
async fn decode_form_data(response: Response, content_type: &str) -> Result<FormData, FetchError> {
    let boundary = multer::parse_boundary(content_type)?;
    let mut multipart = multer::Multipart::new(response.bytes_stream(), boundary);

    let mut form = FormData::new();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let value = match file_name {
            Some(file_name) => {
                let content_type = field.content_type().map(|mime| mime.to_string());
                let data: Bytes = field.bytes().await?;
                FormValue::File {
                    file_name,
                    content_type,
                    data,
                }
            }
            None => FormValue::Text(field.text().await?),
        };
        form.push(name, value);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(content_type: Option<&str>, body: &'static [u8]) -> Response {
        let mut builder = http::Response::builder().status(200);
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        Response::from(builder.body(body).unwrap())
    }

    #[test]
    fn classify_follows_table_order() {
        assert_eq!(classify("application/json"), BodyKind::Json);
        assert_eq!(classify("application/json; charset=utf-8"), BodyKind::Json);
        assert_eq!(classify("text/html"), BodyKind::Text);
        assert_eq!(classify("image/png"), BodyKind::Blob);
        assert_eq!(classify("application/octet-stream"), BodyKind::Blob);
        assert_eq!(classify("multipart/form-data; boundary=x"), BodyKind::FormData);
        assert_eq!(classify("application/xml"), BodyKind::Bytes);
        assert_eq!(classify(""), BodyKind::Bytes);
    }

    #[test]
    fn earlier_pattern_wins_when_several_match() {
        assert_eq!(classify("text/plain; profile=application/json"), BodyKind::Json);
        assert_eq!(classify("image/svg+xml; note=text/"), BodyKind::Text);
        assert_eq!(classify("multipart/form-data; x=image/"), BodyKind::Blob);
    }

    #[test]
    fn table_lists_every_pattern_once() {
        let patterns: Vec<&str> = BODY_KINDS.iter().map(|(pattern, _)| *pattern).collect();
        assert_eq!(
            patterns,
            [
                "application/json",
                "text/",
                "image/",
                "application/octet-stream",
                "multipart/form-data",
            ]
        );
    }

    #[tokio::test]
    async fn json_body_is_parsed() {
        let body = decode_response(response(Some("application/json"), br#"{"a":[1,2]}"#))
            .await
            .unwrap();
        assert_eq!(body, DecodedBody::Json(json!({"a": [1, 2]})));
    }

    #[tokio::test]
    async fn malformed_json_is_a_transport_decode_error() {
        let err = decode_response(response(Some("application/json"), b"not json"))
            .await
            .unwrap_err();
        match err {
            FetchError::Transport(inner) => assert!(inner.is_decode()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn text_body_is_returned_verbatim() {
        let body = decode_response(response(Some("text/plain; charset=utf-8"), b"hello"))
            .await
            .unwrap();
        assert_eq!(body, DecodedBody::Text("hello".to_string()));
    }

    #[tokio::test]
    async fn image_body_is_a_blob() {
        let body = decode_response(response(Some("image/png"), b"\x89PNG"))
            .await
            .unwrap();
        assert_eq!(
            body,
            DecodedBody::Blob(Blob {
                content_type: "image/png".to_string(),
                data: Bytes::from_static(b"\x89PNG"),
            })
        );
    }

    #[test]
    fn classify_bytes_matches_non_ascii_headers() {
        assert_eq!(classify_bytes(b"application/json; note=\xe9t\xe9"), BodyKind::Json);
        assert_eq!(classify_bytes(b"\xfftext/plain"), BodyKind::Text);
        assert_eq!(classify_bytes(b"\xff\xfe"), BodyKind::Bytes);
    }

    #[tokio::test]
    async fn non_ascii_json_content_type_is_still_parsed() {
        let value = http::HeaderValue::from_bytes(b"application/json; note=\xe9").unwrap();
        let raw = http::Response::builder()
            .status(200)
            .header("content-type", value)
            .body(&br#"{"ok":true}"#[..])
            .unwrap();
        let body = decode_response(Response::from(raw)).await.unwrap();
        assert_eq!(body, DecodedBody::Json(json!({"ok": true})));
    }

    #[tokio::test]
    async fn missing_content_type_falls_back_to_bytes() {
        let body = decode_response(response(None, b"\x00\x01")).await.unwrap();
        assert_eq!(body, DecodedBody::Bytes(Bytes::from_static(b"\x00\x01")));
    }

    #[tokio::test]
    async fn unknown_content_type_falls_back_to_bytes() {
        let body = decode_response(response(Some("application/xml"), b"<a/>"))
            .await
            .unwrap();
        assert_eq!(body, DecodedBody::Bytes(Bytes::from_static(b"<a/>")));
    }

    #[tokio::test]
    async fn form_data_body_is_parsed() {
        let raw: &'static [u8] = b"--XYZ\r\n\
Content-Disposition: form-data; name=\"title\"\r\n\
\r\n\
hello\r\n\
--XYZ\r\n\
Content-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\n\
Content-Type: text/plain\r\n\
\r\n\
abc\r\n\
--XYZ--\r\n";
        let body = decode_response(response(Some("multipart/form-data; boundary=XYZ"), raw))
            .await
            .unwrap();
        let DecodedBody::FormData(form) = body else {
            panic!("expected form data, got {}", body.kind());
        };
        assert_eq!(form.len(), 2);
        assert_eq!(form.get("title").and_then(FormValue::as_text), Some("hello"));
        assert_eq!(
            form.get("file"),
            Some(&FormValue::File {
                file_name: "a.txt".to_string(),
                content_type: Some("text/plain".to_string()),
                data: Bytes::from_static(b"abc"),
            })
        );
    }

    #[tokio::test]
    async fn form_data_without_boundary_fails() {
        let err = decode_response(response(Some("multipart/form-data"), b""))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Multipart(_)));
    }
}
