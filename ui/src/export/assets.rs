//! Asset inlining: every image in a capture target becomes a base64 data URI
//! before rasterization, so the rasterizer never reaches the network.
//!
//! Each load is bounded by a timeout and ends in an [`AssetStatus`]; failures
//! are logged and the image is left out of the snapshot.

use std::collections::HashMap;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::{join_all, LocalBoxFuture};
use reqwest::{Client, Url};
use tracing::{debug, warn};

use crate::core::platform;

/// Outcome of loading one asset.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetStatus {
    Loaded(InlineAsset),
    Failed(String),
    TimedOut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineAsset {
    pub mime: &'static str,
    pub data_uri: String,
    /// Intrinsic size in CSS pixels when the format header exposes it.
    pub size: Option<(f64, f64)>,
}

impl InlineAsset {
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let mime = sniff_mime(bytes)?;
        Some(Self {
            mime,
            data_uri: format!("data:{mime};base64,{}", STANDARD.encode(bytes)),
            size: intrinsic_size(mime, bytes),
        })
    }

    pub fn from_svg(markup: &str) -> Self {
        Self {
            mime: "image/svg+xml",
            data_uri: format!("data:image/svg+xml;base64,{}", STANDARD.encode(markup)),
            size: intrinsic_size("image/svg+xml", markup.as_bytes()),
        }
    }
}

/// Where asset bytes come from. The app uses [`HttpAssetSource`]; tests plug
/// in fixed maps.
pub trait AssetSource {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Vec<u8>, String>>;
}

/// Fetches assets over HTTP, resolving relative URLs against the page origin.
pub struct HttpAssetSource {
    client: Client,
    base: Option<Url>,
}

impl HttpAssetSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base: Url::parse(base_url).ok(),
        }
    }

    fn absolute(&self, url: &str) -> Result<Url, String> {
        match Url::parse(url) {
            Ok(parsed) => Ok(parsed),
            Err(_) => self
                .base
                .as_ref()
                .ok_or_else(|| format!("relative asset URL without a base: {url}"))?
                .join(url)
                .map_err(|err| err.to_string()),
        }
    }
}

impl AssetSource for HttpAssetSource {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Vec<u8>, String>> {
        Box::pin(async move {
            let target = self.absolute(url)?;
            let response = self
                .client
                .get(target)
                .send()
                .await
                .map_err(|err| err.to_string())?;
            let status = response.status();
            if !status.is_success() {
                return Err(format!("HTTP {}", status.as_u16()));
            }
            response
                .bytes()
                .await
                .map(|bytes| bytes.to_vec())
                .map_err(|err| err.to_string())
        })
    }
}

/// Load one asset within `budget`.
pub async fn load_asset(source: &dyn AssetSource, url: &str, budget: Duration) -> AssetStatus {
    if url.starts_with("data:") {
        return inline_data_uri(url);
    }

    match platform::timeout(budget, source.fetch(url)).await {
        None => {
            warn!(url, timeout_ms = budget.as_millis() as u64, "asset timed out");
            AssetStatus::TimedOut
        }
        Some(Err(reason)) => {
            warn!(url, %reason, "asset failed to load");
            AssetStatus::Failed(reason)
        }
        Some(Ok(bytes)) => match InlineAsset::from_bytes(&bytes) {
            Some(asset) => {
                debug!(url, mime = asset.mime, "asset inlined");
                AssetStatus::Loaded(asset)
            }
            None => {
                warn!(url, "asset is not a supported image");
                AssetStatus::Failed("unsupported image format".into())
            }
        },
    }
}

/// Load every distinct URL concurrently; each one gets its own budget.
pub async fn load_all(
    source: &dyn AssetSource,
    urls: &[String],
    budget: Duration,
) -> HashMap<String, AssetStatus> {
    let mut unique: Vec<&String> = urls.iter().collect();
    unique.sort();
    unique.dedup();

    let statuses = join_all(unique.iter().map(|url| load_asset(source, url, budget))).await;
    unique.into_iter().cloned().zip(statuses).collect()
}

fn inline_data_uri(uri: &str) -> AssetStatus {
    let Some((header, payload)) = uri.split_once(',') else {
        return AssetStatus::Failed("malformed data URI".into());
    };

    if header.ends_with(";base64") {
        match STANDARD.decode(payload.trim()) {
            Ok(bytes) => match InlineAsset::from_bytes(&bytes) {
                Some(asset) => AssetStatus::Loaded(asset),
                None => AssetStatus::Failed("unsupported image format".into()),
            },
            Err(err) => AssetStatus::Failed(err.to_string()),
        }
    } else if header.starts_with("data:image/svg+xml") {
        AssetStatus::Loaded(InlineAsset {
            mime: "image/svg+xml",
            data_uri: uri.to_string(),
            size: None,
        })
    } else {
        AssetStatus::Failed("unsupported data URI".into())
    }
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        return Some("image/png");
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]);
    let head = head.trim_start();
    if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
        return Some("image/svg+xml");
    }
    None
}

fn intrinsic_size(mime: &str, bytes: &[u8]) -> Option<(f64, f64)> {
    match mime {
        "image/png" => {
            let reader = png::Decoder::new(bytes).read_info().ok()?;
            let info = reader.info();
            Some((info.width as f64, info.height as f64))
        }
        "image/gif" if bytes.len() >= 10 => {
            let width = u16::from_le_bytes([bytes[6], bytes[7]]);
            let height = u16::from_le_bytes([bytes[8], bytes[9]]);
            Some((width as f64, height as f64))
        }
        "image/svg+xml" => {
            let tree = usvg::Tree::from_data(bytes, &usvg::Options::default()).ok()?;
            let size = tree.size();
            Some((size.width() as f64, size.height() as f64))
        }
        _ => None,
    }
}
