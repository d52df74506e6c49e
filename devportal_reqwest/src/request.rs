use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method,
};
use serde::Serialize;

/// A request to the backend API
///
/// The path is appended to the dispatcher's base URL. Header overrides
/// replace the dispatcher's defaults, including the authorization header.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
    headers: HeaderMap,
}

impl ApiRequest {
    /// Constructs a request with the given method and path
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    /// Constructs a `GET` request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Constructs a `DELETE` request
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Constructs a `POST` request
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Attaches a body, sent as JSON
    pub fn with_json_body<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Overrides a header for this request
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Gets the method
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Gets the path
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Gets the JSON body, if any
    #[inline]
    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// Gets the header overrides
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}
