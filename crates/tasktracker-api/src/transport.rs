use std::fmt;

use async_trait::async_trait;
use tasktracker_core::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

#[derive(Clone)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub bearer_token: Option<String>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer_token: None,
            body: None,
        }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ApiRequest")
            .field("method", &self.method.as_str())
            .field("path", &self.path)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .field("body", &self.body)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Wire seam of the resource client. Production uses reqwest; tests queue
/// canned responses behind this trait.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, CoreError>;
}

#[derive(Clone)]
pub struct ReqwestHttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl fmt::Debug for ReqwestHttpTransport {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ReqwestHttpTransport")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ReqwestHttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .user_agent("tasktracker/client")
            .build()
            .map_err(|err| {
                CoreError::Configuration(format!("failed to initialize HTTP client: {err}"))
            })?;

        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { base_url, client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestHttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, CoreError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };
        if let Some(token) = request.bearer_token.as_deref() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body.as_ref() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| {
            CoreError::NetworkFailure(format!(
                "failed to call {} {}: {err}",
                request.method.as_str(),
                request.path
            ))
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|err| {
            CoreError::NetworkFailure(format!(
                "failed to read response from {} {}: {err}",
                request.method.as_str(),
                request.path
            ))
        })?;

        tracing::debug!(
            method = request.method.as_str(),
            path = request.path.as_str(),
            status,
            "api request completed"
        );
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_debug_redacts_bearer_token() {
        let request = ApiRequest::get("/api/user/profile").with_bearer("jwt-secret");
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("jwt-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn success_covers_the_2xx_range_only() {
        for status in [200u16, 201, 204, 299] {
            assert!(ApiResponse { status, body: String::new() }.is_success());
        }
        for status in [199u16, 301, 400, 401, 500] {
            assert!(!ApiResponse { status, body: String::new() }.is_success());
        }
    }
}
