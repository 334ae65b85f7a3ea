use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use serde_json::Value;
use tracing::warn;

/// One outbound vendor request, built per call by a route handler.
#[derive(Debug, Clone)]
pub struct ProxyRequestSpec {
    pub method: Method,
    /// Path appended to the base url, starting with `/`.
    pub path: String,
    /// Overrides the caller's default vendor base url.
    pub base_url: Option<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: HeaderMap,
}

impl ProxyRequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            base_url: None,
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_owned(), value.into()));
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Absolute url of this request against `default_base`.
    pub fn url(&self, default_base: &str) -> String {
        let base = self.base_url.as_deref().unwrap_or(default_base);
        format!("{}{}", base.trim_end_matches('/'), self.path)
    }
}

/// Vendor response, read once. `json` is `None` when the body is not JSON.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub text: String,
    pub json: Option<Value>,
}

impl RawResponse {
    pub fn new(status: StatusCode, text: String) -> Self {
        let json = if text.trim().is_empty() {
            None
        } else {
            serde_json::from_str(&text)
                .inspect_err(|e| warn!(status = %status, "vendor body is not JSON: {}", e))
                .ok()
        };
        Self { status, text, json }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Parsed body, or the raw text as a JSON string.
    pub fn body_value(&self) -> Value {
        self.json
            .clone()
            .unwrap_or_else(|| Value::String(self.text.clone()))
    }
}
