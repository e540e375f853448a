//! Snapshot wrapper construction: header, captured content and optional
//! explainer, drawn into one self-contained SVG document.

use std::fmt::Write as _;

use time::Date;
use tracing::debug;
use uuid::Uuid;

use crate::core::config::ExportConfig;
use crate::core::format::format_date_stamp;
use crate::core::sport::Sport;
use crate::export::assets::{load_all, AssetSource, AssetStatus, InlineAsset};
use crate::export::fonts::{self, FontWeight};
use crate::export::layout::{
    collect_blocks, write_image, write_text, Block, TextStyle, BLOCK_GAP, TEXT_COLOR,
};
use crate::export::resolver::SnapshotNode;

pub const HEADER_HEIGHT: f64 = 80.0;
const HEADER_PAD: f64 = 20.0;
const BRAND_LOGO: f64 = 48.0;
const SECONDARY_LOGO: f64 = 40.0;
const TITLE_SIZE: f64 = 22.0;
const DATE_SIZE: f64 = 13.0;
const EXPLAINER_SIZE: f64 = 12.0;
const EXPLAINER_COLOR: &str = "#374151";
const CONTENT_TOP_GAP: f64 = 16.0;
const BOTTOM_PAD: f64 = 24.0;

/// Everything the builder needs for one export.
#[derive(Debug, Clone)]
pub struct SnapshotRequest {
    pub title: String,
    pub sport: Sport,
    pub date: Date,
    /// Team or conference logo URL shown next to the date.
    pub secondary_logo: Option<String>,
    pub target: SnapshotNode,
    pub explainer: Option<SnapshotNode>,
}

/// The off-screen document handed to the rasterizer. Lives for one export.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotWrapper {
    pub id: String,
    pub width: f64,
    pub height: f64,
    pub svg: String,
    /// Asset URLs that failed or timed out and were left out.
    pub skipped_assets: Vec<String>,
}

impl SnapshotWrapper {
    /// True when no `<image>` in the document still points at a remote URL.
    pub fn is_self_contained(&self) -> bool {
        self.svg
            .split(" href=\"")
            .skip(1)
            .all(|rest| rest.starts_with("data:"))
    }
}

pub struct SnapshotBuilder<'a> {
    config: &'a ExportConfig,
    assets: &'a dyn AssetSource,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(config: &'a ExportConfig, assets: &'a dyn AssetSource) -> Self {
        Self { config, assets }
    }

    pub async fn build(&self, request: SnapshotRequest) -> SnapshotWrapper {
        let SnapshotRequest {
            title,
            sport,
            date,
            secondary_logo,
            mut target,
            mut explainer,
        } = request;

        let mut urls = target.image_sources();
        if let Some(node) = &explainer {
            urls.extend(node.image_sources());
        }
        urls.extend(secondary_logo.iter().cloned());

        let statuses = load_all(self.assets, &urls, self.config.asset_timeout()).await;

        let mut skipped = target.inline_images(&statuses);
        if let Some(node) = explainer.as_mut() {
            skipped.extend(node.inline_images(&statuses));
        }
        let secondary = secondary_logo.and_then(|url| match statuses.get(&url) {
            Some(AssetStatus::Loaded(asset)) => Some(asset.data_uri.clone()),
            _ => {
                skipped.push(url);
                None
            }
        });
        skipped.sort();
        skipped.dedup();

        let content = collect_blocks(&target, self.config.chart_width);
        let notes: Vec<Block> = explainer
            .as_ref()
            .map(|node| normalize_explainer(collect_blocks(node, self.config.chart_width)))
            .unwrap_or_default();

        let width = self.wrapper_width(&target, &content, &notes);
        let side = self.side_padding(&target, &content);
        let column = width - side * 2.0;

        let mut body = String::new();
        let mut y = HEADER_HEIGHT + CONTENT_TOP_GAP;
        for block in content.iter().chain(notes.iter()) {
            block.render(side, y, column, &mut body);
            y += block.height(column) + BLOCK_GAP;
        }
        let height = (y - BLOCK_GAP + BOTTOM_PAD).max(HEADER_HEIGHT + BOTTOM_PAD).ceil();

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );
        write_header(&mut svg, width, &title, sport, date, secondary.as_deref());
        svg.push_str(&body);
        svg.push_str("</svg>");

        let wrapper = SnapshotWrapper {
            id: Uuid::new_v4().to_string(),
            width,
            height,
            svg,
            skipped_assets: skipped,
        };
        debug!(
            id = %wrapper.id,
            width,
            height,
            skipped = wrapper.skipped_assets.len(),
            "snapshot wrapper built"
        );
        wrapper
    }

    /// Tables get their own width plus a margin, charts a fixed width,
    /// anything else its widest block (capped) plus padding.
    fn wrapper_width(&self, target: &SnapshotNode, content: &[Block], notes: &[Block]) -> f64 {
        let config = self.config;
        let width = if let Some(table) = root_table(target, content) {
            table + config.table_margin
        } else if content.iter().any(Block::is_graphic) {
            config.chart_width
        } else {
            let widest = content
                .iter()
                .chain(notes.iter().filter(|block| !matches!(block, Block::Text(_))))
                .map(Block::natural_width)
                .fold(0.0_f64, f64::max);
            widest.min(config.max_content_width) + config.horizontal_padding
        };
        width.max(config.min_width).ceil()
    }

    fn side_padding(&self, target: &SnapshotNode, content: &[Block]) -> f64 {
        if root_table(target, content).is_some() {
            self.config.table_margin / 2.0
        } else {
            self.config.horizontal_padding / 2.0
        }
    }
}

fn root_table(target: &SnapshotNode, content: &[Block]) -> Option<f64> {
    if target.tag() != Some("table") {
        return None;
    }
    content.iter().find_map(|block| match block {
        Block::Table(table) => Some(table.width()),
        _ => None,
    })
}

fn normalize_explainer(blocks: Vec<Block>) -> Vec<Block> {
    blocks
        .into_iter()
        .map(|block| match block {
            Block::Text(mut text) => {
                text.style = TextStyle {
                    size: EXPLAINER_SIZE,
                    weight: FontWeight::Regular,
                    color: EXPLAINER_COLOR.to_string(),
                };
                Block::Text(text)
            }
            other => other,
        })
        .collect()
}

fn write_header(
    svg: &mut String,
    width: f64,
    title: &str,
    sport: Sport,
    date: Date,
    secondary: Option<&str>,
) {
    let brand = InlineAsset::from_svg(sport.brand_logo_svg());
    write_image(
        svg,
        HEADER_PAD,
        (HEADER_HEIGHT - BRAND_LOGO) / 2.0,
        BRAND_LOGO,
        BRAND_LOGO,
        &brand.data_uri,
    );

    let title_style = TextStyle {
        size: TITLE_SIZE,
        weight: FontWeight::Bold,
        color: TEXT_COLOR.to_string(),
    };
    let title_metrics = fonts::measure(title_style.weight, title_style.size);
    let title_baseline = (HEADER_HEIGHT - title_metrics.line_h) / 2.0 + title_metrics.asc;
    write_text(svg, width / 2.0, title_baseline, title, &title_style, "middle");

    let date_style = TextStyle {
        size: DATE_SIZE,
        weight: FontWeight::Regular,
        color: "#6b7280".to_string(),
    };
    let stamp = format_date_stamp(date);
    let date_metrics = fonts::measure(date_style.weight, date_style.size);
    let date_right = width - HEADER_PAD;
    let date_baseline = (HEADER_HEIGHT - date_metrics.line_h) / 2.0 + date_metrics.asc;
    write_text(svg, date_right, date_baseline, &stamp, &date_style, "end");

    if let Some(logo) = secondary {
        let date_width = fonts::text_width(&stamp, date_style.weight, date_style.size);
        let x = date_right - date_width - 10.0 - SECONDARY_LOGO;
        write_image(
            svg,
            x,
            (HEADER_HEIGHT - SECONDARY_LOGO) / 2.0,
            SECONDARY_LOGO,
            SECONDARY_LOGO,
            logo,
        );
    }

    let _ = write!(
        svg,
        r##"<line x1="0" y1="{HEADER_HEIGHT}" x2="{width}" y2="{HEADER_HEIGHT}" stroke="#d1d5db" stroke-width="2"/>"##
    );
}
