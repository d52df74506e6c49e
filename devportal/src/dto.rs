//! Response bodies of the portal backend

use serde::{Deserialize, Serialize};

/// The caller's API key, as returned by `GET /apikey`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    /// The API key
    #[serde(rename = "apiKey")]
    pub api_key: String,
    /// Routes the key grants access to, when the backend includes them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<String>,
}

/// A plain acknowledgement, as returned by `DELETE /apikey`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The message
    pub message: String,
}

/// The routes that require key authentication, as returned by `GET /routes`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routes {
    /// The route paths
    pub routes: Vec<String>,
}
