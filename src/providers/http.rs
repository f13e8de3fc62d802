//! Shared HTTP primitive used by every provider client.
//!
//! Providers describe requests as [`ApiRequest`] values and hand them to a
//! [`Transport`]. Auth policy (logout vs. refresh-and-retry) lives in each
//! provider; this layer only moves bytes and classifies status codes.

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde_json::Value;
use std::time::Duration;

use crate::config::{APP_NAME, REQUEST_TIMEOUT_SECONDS};
use crate::errors::ProviderError;

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Form(Vec<(String, String)>),
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl ApiRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        self.body = Some(RequestBody::Form(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));
        self
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            Some(RequestBody::Json(body)) => Some(body),
            _ => None,
        }
    }

    pub fn form_value(&self, name: &str) -> Option<&str> {
        match &self.body {
            Some(RequestBody::Form(fields)) => fields
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
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

    /// Parses the body as JSON; an empty body reads as `null`.
    pub fn json(&self) -> Result<Value, ProviderError> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body).map_err(ProviderError::from)
    }
}

/// Executes one request. Network faults are errors; any HTTP status,
/// including 4xx/5xx, is an `Ok` response for the caller to classify.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ProviderError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .user_agent(format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ProviderError> {
        log::debug!("{} {}", request.method, request.url);

        let mut builder = self.client.request(request.method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            Some(RequestBody::Json(body)) => builder.body(serde_json::to_vec(&body)?),
            Some(RequestBody::Form(fields)) => builder.form(&fields),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(ApiResponse { status, body })
    }
}

/// Builds `base + path` with query parameters, the way every endpoint call does.
pub fn endpoint_url(base: &str, path: &str, params: &[(&str, String)]) -> Result<Url, ProviderError> {
    let raw = format!("{}{}", base.trim_end_matches('/'), path);
    let mut url =
        Url::parse(&raw).map_err(|e| ProviderError::Network(format!("URL parse error: {}", e)))?;
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_encodes_params() {
        let url = endpoint_url(
            "https://api.example.com/v1/",
            "/search",
            &[("q", "One More Time Daft Punk".to_string()), ("limit", "1".to_string())],
        )
        .unwrap();
        assert_eq!(url.path(), "/v1/search");

        let request = ApiRequest::get(url).bearer("tok");
        assert_eq!(request.query_param("q").as_deref(), Some("One More Time Daft Punk"));
        assert_eq!(request.query_param("missing"), None);
        assert_eq!(request.header_value("authorization"), Some("Bearer tok"));
    }

    #[test]
    fn test_endpoint_url_without_params_has_no_query() {
        let url = endpoint_url("https://api.example.com/v1", "/me", &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/me");
    }

    #[test]
    fn test_empty_body_is_null() {
        let response = ApiResponse {
            status: 201,
            body: String::new(),
        };
        assert!(response.is_success());
        assert_eq!(response.json().unwrap(), Value::Null);
    }
}
