//! HTTP adapter for the account-scoped configuration service.
//!
//! Endpoints (relative to the base URL):
//! - `GET /configs` returns the metadata list
//! - `POST /configs` creates, `PUT /configs/{id}` replaces; both return metadata
//! - `GET /configs/{id}` returns the record, `404` means absent
//! - `DELETE /configs/{id}` returns `{ "deleted": bool }`
//!
//! The identity travels in `x-profile-identity`; the token as a bearer header.

use profile_store_domain::{AssistantConfig, ConfigCandidate, ConfigId, ConfigMetadata, Identity};
use profile_store_ports::{BoxFuture, RemoteConfigPort};
use profile_store_shared::{
    ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result, SecretString,
};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Header carrying the signed-in identity.
pub const IDENTITY_HEADER: &str = "x-profile-identity";

/// Settings for the HTTP remote.
#[derive(Debug, Clone)]
pub struct HttpRemoteConfig {
    /// Service base URL (no trailing slash required).
    pub base_url: Box<str>,
    /// Per-request timeout.
    pub timeout_ms: u64,
    /// Optional bearer token.
    pub api_token: Option<SecretString>,
}

/// `RemoteConfigPort` over HTTP + JSON.
pub struct HttpRemoteConfigStore {
    client: reqwest::Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    deleted: bool,
}

impl HttpRemoteConfigStore {
    /// Build the adapter, validating the base URL and token.
    pub fn new(config: &HttpRemoteConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim()).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                format!("remote base url is invalid: {error}"),
            )
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "remote base url cannot carry a path",
            ));
        }
        if config.timeout_ms == 0 {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "timeout must be greater than zero",
            ));
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = config.api_token.as_ref() {
            let mut auth_header = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
                .map_err(|_| {
                    ErrorEnvelope::expected(
                        ErrorCode::invalid_input(),
                        "api token contains invalid header characters",
                    )
                })?;
            auth_header.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_header);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("remote", "client_init_failed"),
                    format!("failed to build remote client: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, id: Option<&ConfigId>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                ErrorEnvelope::expected(
                    ErrorCode::invalid_input(),
                    "remote base url cannot carry a path",
                )
            })?;
            segments.pop_if_empty().push("configs");
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }

    async fn send(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<(StatusCode, Vec<u8>)> {
        ctx.ensure_not_cancelled(operation)?;

        let response = tokio::select! {
            () = ctx.cancelled() => return Err(cancelled_error(operation)),
            result = request.send() => result.map_err(|error| map_reqwest_error(operation, &error))?,
        };

        let status = response.status();
        let payload = tokio::select! {
            () = ctx.cancelled() => return Err(cancelled_error(operation)),
            result = response.bytes() => result.map_err(|error| map_reqwest_error(operation, &error))?,
        };
        Ok((status, payload.to_vec()))
    }

    fn request(&self, method: Method, url: Url, identity: &Identity) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header(IDENTITY_HEADER, identity.as_str())
    }
}

impl RemoteConfigPort for HttpRemoteConfigStore {
    fn list(
        &self,
        ctx: &RequestContext,
        identity: Identity,
    ) -> BoxFuture<'_, Result<Vec<ConfigMetadata>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let operation = "remote_http.list";
            let url = self.endpoint(None)?;
            let (status, payload) = self
                .send(&ctx, operation, self.request(Method::GET, url, &identity))
                .await?;
            if !status.is_success() {
                return Err(map_http_error(operation, status));
            }
            decode(operation, &payload)
        })
    }

    fn save(
        &self,
        ctx: &RequestContext,
        identity: Identity,
        candidate: ConfigCandidate,
    ) -> BoxFuture<'_, Result<ConfigMetadata>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let operation = "remote_http.save";
            let (method, url) = match candidate.id.as_ref() {
                Some(id) => (Method::PUT, self.endpoint(Some(id))?),
                None => (Method::POST, self.endpoint(None)?),
            };
            let request = self.request(method, url, &identity).json(&candidate);
            let (status, payload) = self.send(&ctx, operation, request).await?;
            if !status.is_success() {
                return Err(map_http_error(operation, status));
            }
            decode(operation, &payload)
        })
    }

    fn load(
        &self,
        ctx: &RequestContext,
        identity: Identity,
        id: ConfigId,
    ) -> BoxFuture<'_, Result<Option<AssistantConfig>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let operation = "remote_http.load";
            let url = self.endpoint(Some(&id))?;
            let (status, payload) = self
                .send(&ctx, operation, self.request(Method::GET, url, &identity))
                .await?;
            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if !status.is_success() {
                return Err(map_http_error(operation, status));
            }
            decode(operation, &payload).map(Some)
        })
    }

    fn delete(
        &self,
        ctx: &RequestContext,
        identity: Identity,
        id: ConfigId,
    ) -> BoxFuture<'_, Result<bool>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let operation = "remote_http.delete";
            let url = self.endpoint(Some(&id))?;
            let (status, payload) = self
                .send(&ctx, operation, self.request(Method::DELETE, url, &identity))
                .await?;
            if status == StatusCode::NOT_FOUND {
                return Ok(false);
            }
            if !status.is_success() {
                return Err(map_http_error(operation, status));
            }
            let response: DeleteResponse = decode(operation, &payload)?;
            Ok(response.deleted)
        })
    }
}

fn decode<T: DeserializeOwned>(operation: &'static str, payload: &[u8]) -> Result<T> {
    serde_json::from_slice(payload).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("remote", "invalid_response"),
            format!("failed to decode remote response: {error}"),
            ErrorClass::NonRetriable,
        )
        .with_metadata("operation", operation)
    })
}

fn cancelled_error(operation: &'static str) -> ErrorEnvelope {
    ErrorEnvelope::cancelled("operation cancelled").with_metadata("operation", operation)
}

fn map_reqwest_error(operation: &'static str, error: &reqwest::Error) -> ErrorEnvelope {
    let envelope = if error.is_timeout() {
        ErrorEnvelope::unexpected(
            ErrorCode::timeout(),
            "remote request timed out",
            ErrorClass::Retriable,
        )
    } else if error.is_connect() {
        ErrorEnvelope::unexpected(
            ErrorCode::io(),
            format!("remote connection failed: {error}"),
            ErrorClass::Retriable,
        )
    } else {
        ErrorEnvelope::unexpected(
            ErrorCode::new("remote", "request_failed"),
            format!("remote request failed: {error}"),
            ErrorClass::NonRetriable,
        )
    };
    envelope.with_metadata("operation", operation)
}

fn map_http_error(operation: &'static str, status: StatusCode) -> ErrorEnvelope {
    let message = format!("remote service responded with {status}");
    let envelope = match status.as_u16() {
        401 | 403 => ErrorEnvelope::expected(ErrorCode::new("remote", "unauthorized"), message),
        400 | 404 | 409 | 422 => {
            ErrorEnvelope::expected(ErrorCode::new("remote", "rejected"), message)
        },
        408 => ErrorEnvelope::unexpected(ErrorCode::timeout(), message, ErrorClass::Retriable),
        429 => ErrorEnvelope::unexpected(
            ErrorCode::new("remote", "rate_limited"),
            message,
            ErrorClass::Retriable,
        ),
        _ if status.is_server_error() => ErrorEnvelope::unexpected(
            ErrorCode::new("remote", "unavailable"),
            message,
            ErrorClass::Retriable,
        ),
        _ => ErrorEnvelope::unexpected(
            ErrorCode::new("remote", "http_error"),
            message,
            ErrorClass::NonRetriable,
        ),
    };
    envelope
        .with_metadata("operation", operation)
        .with_metadata("status", status.as_u16().to_string())
}
