use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::{
    errors::{ApiError, Result},
    models::{ClientConfig, ErrorResponse},
    request::{ApiRequest, AuthMode, RequestBody},
    session::SessionStore,
};

/// Gateway for every call against the backend.
///
/// Holds no session state of its own: the token is read from the
/// `SessionStore` on each request, so a sign-out or rotation is seen by the
/// very next call. No retries, no internal timeout, no batching.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ClientConfig,
    http_client: Client,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: Arc<SessionStore>) -> Result<Self> {
        let http_client = Client::builder().build().map_err(ApiError::Transport)?;

        Ok(Self {
            config,
            http_client,
            session,
        })
    }

    /// Perform one request. Returns the parsed JSON body, or `None` when the
    /// backend answered without a JSON content type or with an empty body.
    pub async fn request(&self, request: ApiRequest) -> Result<Option<serde_json::Value>> {
        let ApiRequest {
            path,
            method,
            body,
            headers: caller_headers,
            auth,
        } = request;

        let url = self.config.url_for(&path);
        let is_multipart = body.is_multipart();

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(caller_headers);
        if is_multipart {
            headers.remove(CONTENT_TYPE);
        }

        if auth == AuthMode::Session {
            if let Some(token) = self.session.token().await {
                let value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| ApiError::InvalidRequest("Token is not a valid header value".to_string()))?;
                headers.insert(AUTHORIZATION, value);
            }
        }

        debug!("{} {}", method, path);

        let mut builder = self.http_client.request(method.clone(), &url).headers(headers);
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(serde_json::to_vec(&value)?),
            RequestBody::Raw(bytes) => builder.body(bytes),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await.map_err(|e| {
            error!("{} {} failed: {}", method, path, e);
            ApiError::Transport(e)
        })?;

        let status = response.status();
        debug!("{} {} -> {}", method, path, status.as_u16());

        if auth == AuthMode::Session
            && (status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN)
        {
            self.session.expire().await;
            return Err(ApiError::SessionExpired);
        }

        if !status.is_success() {
            let message = error_message(response).await;
            warn!("{} {} rejected with {}: {}", method, path, status.as_u16(), message);
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);
        if !is_json {
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let value = serde_json::from_slice(&bytes)?;
        Ok(Some(value))
    }

    /// `GET` a required JSON value.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.request(ApiRequest::get(path)).await?;
        decode_required(path, body)
    }

    /// `POST` a JSON body, returning whatever JSON the backend sends back.
    pub async fn post_json<B, T>(&self, path: &str, payload: &B) -> Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.request(ApiRequest::post(path).json(payload)?).await?;
        body.map(serde_json::from_value).transpose().map_err(Into::into)
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

fn decode_required<T: DeserializeOwned>(path: &str, body: Option<serde_json::Value>) -> Result<T> {
    let value = body.ok_or_else(|| ApiError::Decode(format!("{} returned no JSON body", path)))?;
    serde_json::from_value(value).map_err(|e| ApiError::Decode(format!("{}: {}", path, e)))
}

/// Backend `message` field, else the raw body, else a generic status line.
async fn error_message(response: Response) -> String {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();

    if let Ok(ErrorResponse {
        message: Some(message),
    }) = serde_json::from_str::<ErrorResponse>(&text)
    {
        if !message.is_empty() {
            return message;
        }
    }

    if text.trim().is_empty() {
        format!("Request failed with status {}", status)
    } else {
        text
    }
}
