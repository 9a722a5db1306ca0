use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::{Result, SatchelError};

/// Fixed client-side timeout for every remote call. A timeout surfaces as a
/// transport error and is never retried by the transport itself.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How much response body to keep when folding a failure into an error.
const BODY_CONTEXT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
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

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Decode the body, carrying a truncated copy of it in the error.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| SatchelError::Decode(format!("{e} in `{}`", truncate_body(&self.body))))
    }

    /// Fold a non-2xx status into the error taxonomy.
    pub fn require_success(self) -> Result<ApiResponse> {
        if self.is_success() {
            return Ok(self);
        }
        let body = truncate_body(&self.body);
        if self.status >= 500 {
            Err(SatchelError::Server { status: self.status, body })
        } else {
            Err(SatchelError::Client { status: self.status, body })
        }
    }
}

pub fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= BODY_CONTEXT {
        trimmed.to_string()
    } else {
        let mut end = BODY_CONTEXT;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &trimmed[..end])
    }
}

/// One blocking request/response exchange. The only transport contract the
/// rest of the crate relies on.
pub trait Transport {
    fn send(&self, req: &ApiRequest) -> Result<ApiResponse>;
}

pub struct HttpTransport {
    http: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SatchelError::Network(e.to_string()))?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn send(&self, req: &ApiRequest) -> Result<ApiResponse> {
        let mut builder = match req.method {
            Method::Get => self.http.get(&req.url),
            Method::Post => self.http.post(&req.url),
            Method::Put => self.http.put(&req.url),
            Method::Delete => self.http.delete(&req.url),
        };
        if let Some(token) = &req.bearer {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }
        let resp = builder
            .send()
            .map_err(|e| SatchelError::Network(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| SatchelError::Network(e.to_string()))?;
        Ok(ApiResponse { status, body })
    }
}

pub struct ApiClient {
    transport: Box<dyn Transport>,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self::with_transport(base_url, Box::new(HttpTransport::new()?)))
    }

    pub fn with_transport(base_url: &str, transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn get(&self, path: &str, token: Option<&str>) -> Result<ApiResponse> {
        self.request(Method::Get, path, token, None)
    }

    pub fn post(
        &self,
        path: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Result<ApiResponse> {
        self.request(Method::Post, path, token, body)
    }

    pub fn put(
        &self,
        path: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Result<ApiResponse> {
        self.request(Method::Put, path, token, body)
    }

    pub fn delete(&self, path: &str, token: Option<&str>) -> Result<ApiResponse> {
        self.request(Method::Delete, path, token, None)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Result<ApiResponse> {
        let req = ApiRequest {
            method,
            url: format!("{}{path}", self.base_url),
            bearer: token.map(str::to_string),
            body,
        };
        self.transport.send(&req)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_success_maps_statuses() {
        let ok = ApiResponse { status: 200, body: String::new() };
        assert!(ok.require_success().is_ok());

        let server = ApiResponse { status: 503, body: "down".to_string() };
        assert!(matches!(
            server.require_success(),
            Err(SatchelError::Server { status: 503, .. })
        ));

        let client = ApiResponse { status: 404, body: "nope".to_string() };
        assert!(matches!(
            client.require_success(),
            Err(SatchelError::Client { status: 404, .. })
        ));
    }

    #[test]
    fn test_json_decode_error_carries_body() {
        let resp = ApiResponse { status: 200, body: "not json".to_string() };
        let err = resp.json::<Vec<String>>().unwrap_err();
        assert!(err.to_string().contains("not json"));
    }

    #[test]
    fn test_truncate_body_limits_length() {
        let long = "x".repeat(500);
        let short = truncate_body(&long);
        assert!(short.chars().count() <= 201);
        assert!(short.ends_with('…'));
    }

    #[test]
    fn test_client_joins_base_url_and_sets_bearer() {
        let (client, fake) = testing::scripted_client("https://api.test/");
        fake.push(200, "{}");
        client.get("/items", Some("tok-1")).unwrap();

        let requests = fake.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://api.test/items");
        assert_eq!(requests[0].bearer.as_deref(), Some("tok-1"));
        assert_eq!(requests[0].method, Method::Get);
    }

    #[test]
    fn test_transport_error_propagates() {
        let (client, fake) = testing::scripted_client("https://api.test");
        fake.push_error("connection timed out");
        let err = client.get("/items", None).unwrap_err();
        assert!(matches!(err, SatchelError::Network(_)));
    }
}
