//! HTTP seam. Everything above this module talks to [`Transport`]; the
//! production implementation is [`HttpTransport`] on top of `reqwest`.

use std::rc::Rc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::config::{Config, join_url};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL.
    pub path: String,
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Patch, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },
}

#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// `reqwest`-backed transport. The base URL is looked up in [`Config`] for
/// every request, so a changed setting applies to the next call.
pub struct HttpTransport {
    client: reqwest::Client,
    config: Rc<Config>,
}

impl HttpTransport {
    pub fn new(config: Rc<Config>) -> anyhow::Result<Self> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(std::time::Duration::from_secs(30));
        let client = builder.build()?;
        Ok(Self { client, config })
    }

    pub fn request_url(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        build_url(&self.config.api_base_url(), request)
    }
}

pub fn build_url(base: &str, request: &ApiRequest) -> Result<Url, TransportError> {
    let joined = join_url(base, &request.path);
    let mut url = Url::parse(&joined).map_err(|err| TransportError::InvalidUrl {
        url: joined.clone(),
        reason: err.to_string(),
    })?;
    if !request.params.is_empty() {
        url.query_pairs_mut().extend_pairs(request.params.iter());
    }
    Ok(url)
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    #[tracing::instrument(skip(self, request), fields(method = request.method.as_str(), path = %request.path))]
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.request_url(request)?;
        let url_text = url.to_string();
        debug!(url = %url_text, "sending request");

        let mut builder = self.client.request(request.method.as_reqwest(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| TransportError::Network {
            url: url_text.clone(),
            reason: err.to_string(),
        })?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|err| TransportError::Network {
            url: url_text.clone(),
            reason: err.to_string(),
        })?;

        info!(status, url = %url_text, "response received");
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_path_and_params() {
        let request = ApiRequest::get("/tasks")
            .with_params(vec![("page".to_string(), "1".to_string()), ("like".to_string(), r#"[{"title":"a b"}]"#.to_string())]);
        let url = build_url("http://localhost:3000/api/", &request).expect("build url");
        assert_eq!(url.path(), "/api/tasks");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, request.params);
    }

    #[test]
    fn invalid_base_is_reported() {
        let err = build_url("localhost", &ApiRequest::get("/tasks")).expect_err("relative base");
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
    }
}
