// src/blocks.rs
//! Maps assets chosen in the picker to the editor blocks that embed them.
//! The saved markup carries the embedding marker the usage scanner looks for.

use std::collections::HashMap;

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::{Deserialize, Serialize};

use crate::error::{PortalError, PortalResult};
use crate::settings::{PortalSettings, SelectionMode};
use crate::usage::scanner::MARKER_ATTRIBUTE;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Image,
    Video,
    Document,
    Audio,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetFile {
    pub url: String,
}

/// Asset as the picker hands it over.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SelectedAsset {
    pub database_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    /// Derivative name (`webImage`, `original`, ...) to file.
    #[serde(default)]
    pub files: HashMap<String, AssetFile>,
    #[serde(default)]
    pub preview_urls: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum AssetBlock {
    Image {
        asset_id: String,
        url: String,
        alt: String,
    },
    Video {
        asset_id: String,
        src: String,
    },
    Audio {
        asset_id: String,
        src: String,
    },
    File {
        asset_id: String,
        href: String,
        file_name: String,
    },
}

fn file_url<'a>(asset: &'a SelectedAsset, key: &str) -> Option<&'a str> {
    asset.files.get(key).map(|f| f.url.as_str())
}

fn missing(asset: &SelectedAsset, file: &str) -> PortalError {
    PortalError::MissingFile {
        name: asset.name.clone(),
        file: file.to_string(),
    }
}

/// Configured image derivative, else `webImage`.
fn derivative_url<'a>(asset: &'a SelectedAsset, settings: &PortalSettings) -> Option<&'a str> {
    settings
        .image_derivative
        .as_deref()
        .and_then(|d| file_url(asset, d))
        .or_else(|| file_url(asset, "webImage"))
}

/// Pick the block and source file for `asset`.
///
/// `picked_file` is the file chosen inside the picker; it only counts in
/// [`SelectionMode::SingleSelectFile`].
pub fn block_for_asset(
    asset: &SelectedAsset,
    settings: &PortalSettings,
    picked_file: Option<&AssetFile>,
) -> PortalResult<AssetBlock> {
    let asset_id = asset.database_id.clone();
    match asset.asset_type {
        AssetType::Image => {
            let mut url = derivative_url(asset, settings);
            if settings.selection_mode == SelectionMode::SingleSelectFile {
                if let Some(f) = picked_file {
                    url = Some(f.url.as_str());
                }
            }
            let url = url.ok_or_else(|| missing(asset, "webImage"))?;
            Ok(AssetBlock::Image {
                asset_id,
                url: url.to_string(),
                alt: asset.name.clone(),
            })
        }
        AssetType::Video => {
            let mp4 = asset
                .preview_urls
                .iter()
                .find(|u| u.rsplit('.').next() == Some("mp4"))
                .map(String::as_str);
            let src = mp4
                .or_else(|| file_url(asset, "original"))
                .ok_or_else(|| missing(asset, "original"))?;
            Ok(AssetBlock::Video {
                asset_id,
                src: src.to_string(),
            })
        }
        AssetType::Audio => {
            let src = file_url(asset, "original").ok_or_else(|| missing(asset, "original"))?;
            Ok(AssetBlock::Audio {
                asset_id,
                src: src.to_string(),
            })
        }
        AssetType::Document => {
            let href = file_url(asset, "original").ok_or_else(|| PortalError::AssetNotPublic {
                name: asset.name.clone(),
            })?;
            Ok(AssetBlock::File {
                asset_id,
                href: href.to_string(),
                file_name: asset.name.clone(),
            })
        }
    }
}

impl AssetBlock {
    pub fn asset_id(&self) -> &str {
        match self {
            AssetBlock::Image { asset_id, .. }
            | AssetBlock::Video { asset_id, .. }
            | AssetBlock::Audio { asset_id, .. }
            | AssetBlock::File { asset_id, .. } => asset_id,
        }
    }

    /// Saved markup with the embedding marker on the wrapper element.
    pub fn to_markup(&self) -> String {
        let marker = format!(
            r#"{MARKER_ATTRIBUTE}="{}""#,
            encode_double_quoted_attribute(self.asset_id())
        );
        match self {
            AssetBlock::Image { url, alt, .. } => format!(
                r#"<figure class="wp-block-image" {marker}><img src="{}" alt="{}"/></figure>"#,
                encode_double_quoted_attribute(url),
                encode_double_quoted_attribute(alt)
            ),
            AssetBlock::Video { src, .. } => format!(
                r#"<figure class="wp-block-video" {marker}><video controls src="{}"></video></figure>"#,
                encode_double_quoted_attribute(src)
            ),
            AssetBlock::Audio { src, .. } => format!(
                r#"<figure class="wp-block-audio" {marker}><audio controls src="{}"></audio></figure>"#,
                encode_double_quoted_attribute(src)
            ),
            AssetBlock::File {
                href, file_name, ..
            } => format!(
                r#"<div class="wp-block-file" {marker}><a href="{}">{}</a></div>"#,
                encode_double_quoted_attribute(href),
                encode_text(file_name)
            ),
        }
    }
}

/// Gallery of image blocks built from a multi-asset selection.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GalleryBlock {
    /// Always [`AssetBlock::Image`], in selection order.
    pub images: Vec<AssetBlock>,
}

/// Map a multi-asset selection to a gallery. Non-image assets are skipped;
/// images use the configured derivative, else `webImage`.
pub fn gallery_for_assets(
    assets: &[SelectedAsset],
    settings: &PortalSettings,
) -> PortalResult<GalleryBlock> {
    let images = assets
        .iter()
        .filter(|a| a.asset_type == AssetType::Image)
        .map(|a| {
            let url = derivative_url(a, settings).ok_or_else(|| missing(a, "webImage"))?;
            Ok(AssetBlock::Image {
                asset_id: a.database_id.clone(),
                url: url.to_string(),
                alt: a.name.clone(),
            })
        })
        .collect::<PortalResult<Vec<_>>>()?;
    Ok(GalleryBlock { images })
}

impl GalleryBlock {
    /// Each inner image figure carries its own marker.
    pub fn to_markup(&self) -> String {
        let inner: String = self.images.iter().map(AssetBlock::to_markup).collect();
        format!(r#"<figure class="wp-block-gallery has-nested-images columns-default">{inner}</figure>"#)
    }
}
