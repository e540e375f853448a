//! Runtime knobs for the export pipeline and the backend client.

use std::time::Duration;

use api::BackendApi;
use serde::{Deserialize, Serialize};
use tiny_skia::Color;

use crate::export::raster::RasterOptions;

/// Snapshot/rasterization settings. Defaults are what the app ships with;
/// tests shrink the delays through the same struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Per-image load budget before the asset is treated as timed out.
    pub asset_timeout_ms: u64,
    /// Pause between staging the wrapper and rasterizing it.
    pub settle_delay_ms: u64,
    /// Output pixel density.
    pub scale: f32,
    /// Added to a table's measured width.
    pub table_margin: f64,
    /// Width used for SVG/canvas chart captures.
    pub chart_width: f64,
    /// Cap on the widest-descendant measurement for everything else.
    pub max_content_width: f64,
    /// Added to the widest-descendant width.
    pub horizontal_padding: f64,
    /// Floor so the header always fits.
    pub min_width: f64,
    /// Opaque fill behind the wrapper, as RGB.
    pub background: [u8; 3],
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            asset_timeout_ms: 2_000,
            settle_delay_ms: 500,
            scale: 2.0,
            table_margin: 40.0,
            chart_width: 960.0,
            max_content_width: 2_400.0,
            horizontal_padding: 48.0,
            min_width: 520.0,
            background: [255, 255, 255],
        }
    }
}

impl ExportConfig {
    pub fn asset_timeout(&self) -> Duration {
        Duration::from_millis(self.asset_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn raster_options(&self) -> RasterOptions {
        let [r, g, b] = self.background;
        RasterOptions {
            scale: self.scale,
            background: Color::from_rgba8(r, g, b, 255),
            ..RasterOptions::default()
        }
    }
}

/// Where the backend proxy lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl ApiConfig {
    pub fn client(&self) -> BackendApi {
        BackendApi::new(self.base_url.clone())
    }
}

/// Shorthand used by pages.
pub fn backend() -> BackendApi {
    ApiConfig::default().client()
}

fn default_base_url() -> String {
    if let Some(base) = option_env!("SEEDLINE_API_BASE") {
        return base.to_string();
    }

    #[cfg(target_arch = "wasm32")]
    {
        // Same-origin proxy.
        web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        "http://localhost:8080".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_readiness_budget() {
        let config = ExportConfig::default();
        assert_eq!(config.asset_timeout(), Duration::from_secs(2));
        assert_eq!(config.settle_delay(), Duration::from_millis(500));
        assert_eq!(config.raster_options().scale, 2.0);
        assert_eq!(config.raster_options().background, Color::WHITE);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: ExportConfig = serde_json::from_str(r#"{"settle_delay_ms": 0}"#).unwrap();
        assert_eq!(config.settle_delay_ms, 0);
        assert_eq!(config.asset_timeout_ms, 2_000);
    }
}
