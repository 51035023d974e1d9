//! Thin HTTP request helper with one-shot and cancellable stream calls.
//!
//! # Overview
//! A call is described by `RequestOptions`, turned into a plain-data
//! `HttpRequest` by `build_request`, sent with reqwest, and its body decoded
//! by `decode_response` according to the declared content type.
//!
//! # Design
//! - `RequestExecutor::execute_once` resolves with a single value or error.
//! - `RequestExecutor::execute_stream` returns a cold `CancellableSource`;
//!   each `subscribe` sends its own request and yields at most one item.
//!   Unsubscribing aborts the transport and ends the stream without an error.
//! - Both go through one internal routine, so request and decoding rules
//!   cannot drift apart.
//! - No retries, caching, authentication or timeouts.

pub mod builder;
pub mod client;
pub mod decode;
pub mod error;
pub mod http;
pub mod stream;
pub mod types;

pub use builder::build_request;
pub use client::RequestExecutor;
pub use decode::{classify, classify_bytes, decode_response, BodyKind};
pub use error::FetchError;
pub use http::{HttpMethod, HttpRequest};
pub use stream::{CancellableSource, Subscription};
pub use types::{Blob, DecodedBody, FormData, FormField, FormValue, FromBody, Json, RequestOptions};
