//! Request descriptor for `AuthClient::send`.

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;

use super::ApiError;

/// A request that can be issued more than once.
///
/// The body is held as bytes so the same request can be replayed after a
/// token refresh. Header names are case-insensitive.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    url: String,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// `url` may be absolute or relative to the configured base URL
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Set a header, replacing any existing value for the same name
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set a header from strings
    pub fn header_str(self, name: &str, value: &str) -> Result<Self, ApiError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::InvalidRequest(format!("header name {:?}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::InvalidRequest(format!("header value for {}: {}", name, e)))?;
        Ok(self.header(name, value))
    }

    /// Serialize `body` as JSON and set `Content-Type: application/json`
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_vec(body)?);
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(self)
    }

    /// Raw body bytes; the caller is responsible for `Content-Type`
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_sets_body_and_content_type() {
        let req = ApiRequest::post("/api/notes/")
            .json(&serde_json::json!({"title": "a", "content": "b"}))
            .unwrap();
        assert_eq!(req.method(), &Method::POST);
        assert_eq!(req.headers()[header::CONTENT_TYPE], "application/json");
        let body: serde_json::Value = serde_json::from_slice(req.body_bytes().unwrap()).unwrap();
        assert_eq!(body["title"], "a");
    }

    #[test]
    fn test_header_names_are_case_insensitive() {
        let req = ApiRequest::get("/x")
            .header_str("X-Trace", "1")
            .unwrap()
            .header_str("x-trace", "2")
            .unwrap();
        assert_eq!(req.headers().get_all("X-TRACE").iter().count(), 1);
        assert_eq!(req.headers()["x-trace"], "2");
    }

    #[test]
    fn test_invalid_header_rejected() {
        assert!(matches!(
            ApiRequest::get("/x").header_str("bad header", "v"),
            Err(ApiError::InvalidRequest(_))
        ));
    }
}
