// src/usage/scanner.rs
//! Finds embedding markers left by the editor blocks.
//!
//! This is a textual match on the literal attribute, not a markup parse, so
//! broken HTML scans exactly like well-formed HTML.

use once_cell::sync::Lazy;
use regex::Regex;

use super::payload::{AssetReference, UsageSyncPayload};
use crate::content::ContentItem;

pub const MARKER_ATTRIBUTE: &str = "data-bynder-id";

static MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"data-bynder-id="(.*?)""#).expect("marker regex"));

/// Asset ids in `body`, in order of appearance, duplicates kept.
pub fn extract_asset_ids(body: &str) -> Vec<&str> {
    MARKER_RE
        .captures_iter(body)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub uris: Vec<String>,
    pub usages: Vec<AssetReference>,
}

impl ScanResult {
    /// Record one item: its locator always, plus one usage per marker.
    pub fn push_item(&mut self, item: &ContentItem) {
        self.uris.push(item.uri.clone());
        for asset_id in extract_asset_ids(&item.body) {
            self.usages.push(AssetReference {
                asset_id: asset_id.to_string(),
                uri: item.uri.clone(),
                additional: item.title.clone(),
            });
        }
    }

    pub fn into_payload(self) -> UsageSyncPayload {
        UsageSyncPayload::new(self.uris, self.usages)
    }
}

pub fn scan_items<'a, I>(items: I) -> ScanResult
where
    I: IntoIterator<Item = &'a ContentItem>,
{
    let mut out = ScanResult::default();
    for item in items {
        out.push_item(item);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_in_order_with_duplicates() {
        let body = r#"<figure data-bynder-id="A1"><img/></figure>
<div data-bynder-id="B2"></div><figure data-bynder-id="A1"></figure>"#;
        assert_eq!(extract_asset_ids(body), vec!["A1", "B2", "A1"]);
    }

    #[test]
    fn malformed_markup_still_matches_literal_marker() {
        let body = r#"<figure data-bynder-id="X9" <<<< unclosed"#;
        assert_eq!(extract_asset_ids(body), vec!["X9"]);
        assert!(extract_asset_ids(r#"data-bynder-id="never closed"#).is_empty());
        assert!(extract_asset_ids("data-bynder-id='single'").is_empty());
    }

    #[test]
    fn empty_id_is_still_a_marker() {
        assert_eq!(extract_asset_ids(r#"<figure data-bynder-id=""></figure>"#), vec![""]);
    }

    #[test]
    fn marker_does_not_span_lines() {
        assert!(extract_asset_ids("data-bynder-id=\"a\nb\"").is_empty());
    }
}
