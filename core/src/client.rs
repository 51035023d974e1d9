//! Request executor: dispatches built requests and delivers decoded bodies.
//!
//! # Design
//! `RequestExecutor` wraps a `reqwest::Client` and nothing else. Both call
//! protocols go through `perform`, which builds the request, dispatches it,
//! checks the status and decodes the body. `execute_once` awaits it directly;
//! `execute_stream` hands it a cancellation token and runs it per
//! subscription (see `stream`).

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::builder::build_request;
use crate::decode::decode_response;
use crate::error::FetchError;
use crate::http::HttpRequest;
use crate::stream::CancellableSource;
use crate::types::{DecodedBody, FromBody, RequestOptions};

/// Stateless HTTP request helper.
///
/// Cloning is cheap and clones share the underlying reqwest client.
#[derive(Debug, Clone, Default)]
pub struct RequestExecutor {
    client: reqwest::Client,
}

impl RequestExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured reqwest client (proxies, TLS roots, timeouts).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Send one request and resolve with its decoded body.
    ///
    /// Every failure is returned unchanged: transport errors, non-2xx status
    /// (`FetchError::Http`), decode errors and `FromBody` mismatches.
    pub async fn execute_once<T: FromBody>(&self, options: &RequestOptions) -> Result<T, FetchError> {
        let body = self.perform(options, None).await?;
        T::from_body(body)
    }

    /// Cold, cancellable source of at most one value.
    ///
    /// Nothing is sent until `subscribe` is called, and every subscription
    /// sends its own request.
    pub fn execute_stream<T>(&self, options: RequestOptions) -> CancellableSource<T>
    where
        T: FromBody + Send + 'static,
    {
        CancellableSource::new(self.clone(), options)
    }

    /// Build, dispatch and decode. When `cancel` fires before a response
    /// arrives the request future is dropped and `FetchError::Cancelled` is
    /// returned; once decoding has started the token is no longer observed.
    pub(crate) async fn perform(
        &self,
        options: &RequestOptions,
        cancel: Option<&CancellationToken>,
    ) -> Result<DecodedBody, FetchError> {
        let request = build_request(options)?;
        let response = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(url = %options.url, "request cancelled before response");
                    return Err(FetchError::Cancelled);
                }
                response = self.dispatch(request) => response?,
            },
            None => self.dispatch(request).await?,
        };
        decode_response(response).await
    }

    async fn dispatch(&self, request: HttpRequest) -> Result<reqwest::Response, FetchError> {
        debug!(method = request.method.as_str(), url = %request.url, "dispatching request");

        let mut builder = self.client.request(request.method.into(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(url = %request.url, status = status.as_u16(), "request failed");
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}
