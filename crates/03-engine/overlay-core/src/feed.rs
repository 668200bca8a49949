//! Alert feed records as published by the content-bearing alerts endpoint.
//!
//! The widget itself decides presence from the poster probe; this model is
//! what a mock or server-side collaborator uses to decide whether posters
//! should be served at all.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// State value of records that describe a live alert.
pub const ACTUAL_STATE: &str = "Actual";

/// Feed decoding failures.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("malformed alert feed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One alert record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AlertRecord {
    #[serde(default)]
    pub state: String,
    /// `Alert` or `Cancel`.
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: AlertMessage,
}

impl AlertRecord {
    /// Whether this record describes a live alert.
    pub fn is_actual(&self) -> bool {
        self.state == ACTUAL_STATE
    }
}

/// Human-facing content of an alert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AlertMessage {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub media: Option<AlertMedia>,
    #[serde(rename = "Readmore_URL", default)]
    pub readmore_url: Option<String>,
}

/// Media attached to an alert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AlertMedia {
    #[serde(default)]
    pub image: Option<String>,
}

/// Decodes a feed document (a JSON array of records).
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<AlertRecord>, FeedError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Live records of a feed document; malformed documents hold none.
pub fn active_alerts(bytes: &[u8]) -> Vec<AlertRecord> {
    match parse_feed(bytes) {
        Ok(records) => records.into_iter().filter(AlertRecord::is_actual).collect(),
        Err(err) => {
            log::warn!("AmberLoader: treating feed as empty: {err}");
            Vec::new()
        }
    }
}
