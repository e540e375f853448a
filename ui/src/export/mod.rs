//! Screenshot and scenario export.
//!
//! A screenshot runs resolve, build, stage, settle, rasterize, detach, encode
//! and deliver, in that order and exactly once per click. Only a missing target
//! or a rasterization/encoding/delivery failure ends an attempt; asset
//! problems degrade the snapshot instead.

pub mod assets;
pub mod delivery;
pub mod fonts;
pub mod layout;
pub mod raster;
pub mod resolver;
pub mod scenario;
pub mod snapshot;
pub mod stage;

use time::{Date, OffsetDateTime};
use tracing::{error, info};

use crate::core::config::{ApiConfig, ExportConfig};
use crate::core::error::ExportError;
use crate::core::platform;
use crate::core::sport::Sport;
use assets::{AssetSource, HttpAssetSource};
use delivery::{screenshot_filename, Deliver, Delivery, ExportFile, PlatformDelivery};
use raster::Rasterizer;
use resolver::CaptureSource;
use snapshot::{SnapshotBuilder, SnapshotRequest};
use stage::{Stage, StagedWrapper};

/// One exportable region of a page and the title stamped on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOption {
    pub id: String,
    pub label: String,
    pub selector: String,
}

impl CaptureOption {
    pub fn new(id: &str, label: &str, selector: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            selector: selector.to_string(),
        }
    }
}

/// Page context shared by every capture option on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureContext {
    /// Team or conference name; prefixes the filename.
    pub subject: String,
    pub sport: Sport,
    pub secondary_logo: Option<String>,
    pub explainer_selector: Option<String>,
}

impl CaptureContext {
    /// Brand the capture after the route it was taken on.
    pub fn for_route(mut self, path: &str) -> Self {
        self.sport = Sport::from_path(path);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureReport {
    pub filename: String,
    pub delivery: Delivery,
    pub skipped_assets: Vec<String>,
}

pub struct ExportPipeline<'a> {
    pub config: &'a ExportConfig,
    pub assets: &'a dyn AssetSource,
    pub stage: &'a dyn Stage,
    pub rasterizer: &'a dyn Rasterizer,
    pub delivery: &'a dyn Deliver,
}

impl ExportPipeline<'_> {
    pub async fn capture(
        &self,
        page_markup: &str,
        option: &CaptureOption,
        context: &CaptureContext,
        date: Date,
    ) -> Result<CaptureReport, ExportError> {
        let (target, explainer) = {
            let source = CaptureSource::parse(page_markup);
            let target = source.resolve(&option.selector)?;
            let explainer = context
                .explainer_selector
                .as_deref()
                .and_then(|selector| source.find(selector));
            (target, explainer)
        };

        let wrapper = SnapshotBuilder::new(self.config, self.assets)
            .build(SnapshotRequest {
                title: option.label.clone(),
                sport: context.sport,
                date,
                secondary_logo: context.secondary_logo.clone(),
                target,
                explainer,
            })
            .await;

        let options = self.config.raster_options();
        let rendered = {
            let _staged = StagedWrapper::attach(self.stage, &wrapper)?;
            platform::sleep(self.config.settle_delay()).await;
            self.rasterizer.rasterize(&wrapper, &options).await
        };
        let bitmap = rendered.inspect_err(|err| {
            error!(id = %wrapper.id, %err, "snapshot rasterization failed");
        })?;

        let png = bitmap.encode_png()?;
        let filename = screenshot_filename(&context.subject, &option.label);
        let delivery = self
            .delivery
            .deliver(ExportFile::png(filename.clone(), png))
            .await?;
        info!(%filename, option = %option.id, "screenshot exported");

        Ok(CaptureReport {
            filename,
            delivery,
            skipped_assets: wrapper.skipped_assets,
        })
    }
}

/// Capture `option` from the live page with the platform's default stage,
/// asset loader and delivery.
pub async fn capture_current_page(
    option: &CaptureOption,
    context: &CaptureContext,
) -> Result<CaptureReport, ExportError> {
    let markup = platform::page_markup().await?;
    let config = ExportConfig::default();
    let assets = HttpAssetSource::new(&ApiConfig::default().base_url);

    #[cfg(target_arch = "wasm32")]
    let (stage, rasterizer) = (stage::DomStage, raster::CanvasRasterizer);
    #[cfg(not(target_arch = "wasm32"))]
    let (stage, rasterizer) = (stage::MemoryStage::new(), raster::ResvgRasterizer::new());

    let pipeline = ExportPipeline {
        config: &config,
        assets: &assets,
        stage: &stage,
        rasterizer: &rasterizer,
        delivery: &PlatformDelivery,
    };
    pipeline
        .capture(&markup, option, context, OffsetDateTime::now_utc().date())
        .await
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashMap;

    use futures::future::LocalBoxFuture;
    use time::macros::date;

    use super::*;
    use crate::export::assets::tests::StaticAssets;
    use crate::export::raster::{Bitmap, RasterOptions};
    use crate::export::snapshot::SnapshotWrapper;
    use crate::export::stage::MemoryStage;

    struct CountingDelivery(Cell<usize>);

    impl Deliver for CountingDelivery {
        fn deliver(&self, _file: ExportFile) -> LocalBoxFuture<'_, Result<Delivery, ExportError>> {
            self.0.set(self.0.get() + 1);
            Box::pin(async { Ok(Delivery::Downloaded) })
        }
    }

    struct BrokenRasterizer;

    impl Rasterizer for BrokenRasterizer {
        fn rasterize<'a>(
            &'a self,
            _: &'a SnapshotWrapper,
            _: &'a RasterOptions,
        ) -> LocalBoxFuture<'a, Result<Bitmap, ExportError>> {
            Box::pin(async { Err(ExportError::Rasterization("out of memory".into())) })
        }
    }

    fn context() -> CaptureContext {
        CaptureContext {
            subject: "ACC".into(),
            sport: Sport::Basketball,
            secondary_logo: None,
            explainer_selector: None,
        }
    }

    #[tokio::test]
    async fn missing_target_stops_before_anything_is_staged() {
        let config = ExportConfig::default();
        let stage = MemoryStage::new();
        let delivery = CountingDelivery(Cell::new(0));
        let pipeline = ExportPipeline {
            config: &config,
            assets: &StaticAssets(HashMap::new()),
            stage: &stage,
            rasterizer: &BrokenRasterizer,
            delivery: &delivery,
        };

        let err = pipeline
            .capture(
                "<body><p>empty</p></body>",
                &CaptureOption::new("table", "CWV Table", ".cwv-table"),
                &context(),
                date!(2025 - 03 - 08),
            )
            .await
            .unwrap_err();

        assert_eq!(err, ExportError::ElementNotFound(".cwv-table".into()));
        assert_eq!(delivery.0.get(), 0);
        assert!(stage.is_empty());
    }

    #[test]
    fn route_picks_the_header_brand() {
        let football = context().for_route("/football/team/Georgia");
        assert_eq!(football.sport, Sport::Football);
        assert_eq!(football.subject, "ACC");

        let basketball = football.for_route("/basketball/conf-tourney/ACC");
        assert_eq!(basketball.sport, Sport::Basketball);
    }
}
