// src/usage/payload.rs
use serde::{Deserialize, Serialize};

/// Identifies this integration to the usage API.
pub const INTEGRATION_ID: &str = "b242c16d-70f4-4101-8df5-87b35bbe56f0";

/// One embedded asset occurrence inside one content item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetReference {
    pub asset_id: String,
    pub uri: String,
    /// Title of the content item.
    pub additional: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsageSyncPayload {
    pub integration_id: String,
    /// Every scanned item, referenced or not.
    pub uris: Vec<String>,
    pub usages: Vec<AssetReference>,
}

impl UsageSyncPayload {
    pub fn new(uris: Vec<String>, usages: Vec<AssetReference>) -> Self {
        Self {
            integration_id: INTEGRATION_ID.to_string(),
            uris,
            usages,
        }
    }
}
