//! Remote asset models.
//!
//! A remote asset is the model service's copy of an uploaded video. It is
//! only usable for analysis once the service reports it as ready.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an asset on the remote service (e.g. `files/abc123`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub String);

impl AssetId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Processing lifecycle of a remote asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AssetState {
    /// The service is still preparing the asset
    #[default]
    Processing,
    /// The asset can be referenced in model calls
    Ready,
    /// The service gave up on the asset
    Failed { reason: String },
}

impl AssetState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetState::Processing => "processing",
            AssetState::Ready => "ready",
            AssetState::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for AssetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An uploaded video as known to the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAsset {
    pub id: AssetId,
    /// URI used to reference the asset in model requests
    pub uri: String,
    pub mime_type: String,
    pub display_name: Option<String>,
    pub state: AssetState,
}

impl RemoteAsset {
    pub fn is_ready(&self) -> bool {
        matches!(self.state, AssetState::Ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_value(AssetState::Failed {
            reason: "bad codec".into(),
        })
        .unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["reason"], "bad codec");

        let ready: AssetState = serde_json::from_str(r#"{"state":"ready"}"#).unwrap();
        assert_eq!(ready, AssetState::Ready);
    }
}
