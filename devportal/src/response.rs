use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::ApiError;

/// The outcome of a portal operation
///
/// `data` is the decoded JSON body, whether the request succeeded or not,
/// and `is_error` tells the two apart. An empty body decodes as `null`.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    /// The response status
    pub status: StatusCode,
    /// The response body
    pub data: serde_json::Value,
    /// Whether the status is outside the success range
    pub is_error: bool,
}

impl ApiResponse {
    /// Reads and decodes a response from the backend
    pub async fn from_response(response: Response) -> Result<Self, ApiError> {
        let status = response.status();
        let body = response.bytes().await.map_err(ApiError::BodyRead)?;

        let data = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).map_err(|source| ApiError::Decode { status, source })?
        };

        Ok(Self {
            status,
            data,
            is_error: !status.is_success(),
        })
    }

    /// The human-readable message carried by the body, if any
    ///
    /// Looks at `message` first, then at `detail` as used by the backend's
    /// error responses.
    pub fn message(&self) -> Option<&str> {
        ["message", "detail"]
            .into_iter()
            .find_map(|field| self.data.get(field).and_then(serde_json::Value::as_str))
    }

    /// Decodes the body into a typed value
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        T::deserialize(&self.data).map_err(|source| ApiError::Decode {
            status: self.status,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn response(status: u16, data: serde_json::Value) -> ApiResponse {
        let status = StatusCode::from_u16(status).unwrap();
        ApiResponse {
            status,
            data,
            is_error: !status.is_success(),
        }
    }

    #[test]
    fn message_prefers_message_field() {
        let resp = response(500, json!({ "message": "server error", "detail": "other" }));

        assert_eq!(resp.message(), Some("server error"));
    }

    #[test]
    fn message_falls_back_to_detail() {
        let resp = response(503, json!({ "detail": "Vault unavailable" }));

        assert_eq!(resp.message(), Some("Vault unavailable"));
    }

    #[test]
    fn message_is_absent_for_other_shapes() {
        assert_eq!(response(500, json!({ "error": 1 })).message(), None);
        assert_eq!(response(500, json!(null)).message(), None);
        assert_eq!(response(500, json!({ "message": 42 })).message(), None);
    }

    #[tokio::test]
    async fn interrupted_body_is_a_read_error() {
        let body = futures::stream::once(async {
            Err::<bytes::Bytes, _>(std::io::Error::new(
                std::io::ErrorKind::ConnectionAborted,
                "connection aborted",
            ))
        });
        let resp: Response = http::Response::builder()
            .status(200)
            .body(reqwest::Body::wrap_stream(body))
            .unwrap()
            .into();

        let error = ApiResponse::from_response(resp).await.unwrap_err();

        assert!(matches!(error, ApiError::BodyRead(_)));
        assert!(!error.requires_login());
    }

    #[tokio::test]
    async fn empty_body_decodes_as_null() {
        let resp: Response = http::Response::builder()
            .status(204)
            .body("")
            .unwrap()
            .into();

        let resp = ApiResponse::from_response(resp).await.unwrap();

        assert_eq!(resp.data, serde_json::Value::Null);
        assert!(!resp.is_error);
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_error() {
        let resp: Response = http::Response::builder()
            .status(502)
            .body("<html>Bad Gateway</html>")
            .unwrap()
            .into();

        let error = ApiResponse::from_response(resp).await.unwrap_err();

        assert!(matches!(
            error,
            ApiError::Decode {
                status: StatusCode::BAD_GATEWAY,
                ..
            }
        ));
    }
}
