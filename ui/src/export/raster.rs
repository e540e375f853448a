//! Rasterization of snapshot wrappers.
//!
//! Native builds draw with resvg against the system fonts. The browser build
//! hands the SVG to the page's own renderer through a canvas, since wasm has
//! no font database of its own.

use std::future::ready;
use std::sync::Arc;

use futures::future::LocalBoxFuture;
use tiny_skia::{Color, Pixmap, Transform};
use tracing::{debug, error, warn};
use usvg::fontdb::Database;

use crate::core::error::ExportError;
use crate::export::fonts::Fonts;
use crate::export::snapshot::SnapshotWrapper;

/// Largest side, in device pixels, we are willing to allocate.
const MAX_DIMENSION: f32 = 16_384.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    pub scale: f32,
    pub background: Color,
    /// When false, wrappers that still reference remote URLs are refused
    /// instead of being drawn with holes.
    pub allow_taint: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: Color::WHITE,
            allow_taint: false,
        }
    }
}

/// Decoded RGBA pixels (straight alpha), ready for PNG encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Bitmap {
    pub fn encode_png(&self) -> Result<Vec<u8>, ExportError> {
        let mut buffer = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buffer, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            encoder
                .write_header()
                .map_err(|err| ExportError::Encoding(err.to_string()))?
                .write_image_data(&self.rgba)
                .map_err(|err| ExportError::Encoding(err.to_string()))?;
        }
        Ok(buffer)
    }

    /// True when every pixel has the same colour.
    pub fn is_blank(&self) -> bool {
        let mut pixels = self.rgba.chunks_exact(4);
        match pixels.next() {
            Some(first) => pixels.all(|pixel| pixel == first),
            None => true,
        }
    }
}

pub trait Rasterizer {
    fn rasterize<'a>(
        &'a self,
        wrapper: &'a SnapshotWrapper,
        options: &'a RasterOptions,
    ) -> LocalBoxFuture<'a, Result<Bitmap, ExportError>>;
}

/// Generic families usvg falls back to when none of the named families in
/// the snapshot text are installed, most preferred first.
const SANS_CANDIDATES: [&str; 8] = [
    "Inter",
    "Helvetica",
    "Arial",
    "Liberation Sans",
    "DejaVu Sans",
    "Noto Sans",
    "Roboto",
    "Cantarell",
];

pub struct ResvgRasterizer {
    fontdb: Arc<Database>,
}

impl ResvgRasterizer {
    pub fn new() -> Self {
        let mut fontdb = Database::new();
        #[cfg(not(target_arch = "wasm32"))]
        fontdb.load_system_fonts();
        if let Some(data) = Fonts::font_data() {
            fontdb.load_font_data(data.to_vec());
        }

        match sans_family(&fontdb) {
            Some(family) => {
                debug!(faces = fontdb.len(), %family, "rasterizer fonts loaded");
                fontdb.set_sans_serif_family(family);
            }
            None => warn!("no fonts available; snapshot text will not be drawn"),
        }

        Self {
            fontdb: Arc::new(fontdb),
        }
    }

    /// Number of font faces text can be drawn with.
    pub fn font_faces(&self) -> usize {
        self.fontdb.len()
    }

    /// Draw `wrapper` synchronously.
    pub fn render(
        &self,
        wrapper: &SnapshotWrapper,
        options: &RasterOptions,
    ) -> Result<Bitmap, ExportError> {
        check_taint(wrapper, options)?;

        let usvg_options = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(&wrapper.svg, &usvg_options).map_err(|err| {
            error!(id = %wrapper.id, %err, "snapshot svg rejected");
            ExportError::Rasterization(err.to_string())
        })?;

        let size = tree.size();
        let (width, height) = device_size(size.width(), size.height(), options.scale)?;
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            ExportError::Rasterization(format!("cannot allocate a {width}x{height} bitmap"))
        })?;
        pixmap.fill(options.background);
        resvg::render(
            &tree,
            Transform::from_scale(options.scale, options.scale),
            &mut pixmap.as_mut(),
        );

        let rgba = pixmap
            .pixels()
            .iter()
            .flat_map(|pixel| {
                let color = pixel.demultiply();
                [color.red(), color.green(), color.blue(), color.alpha()]
            })
            .collect();

        debug!(id = %wrapper.id, width, height, "snapshot rasterized");
        Ok(Bitmap {
            width,
            height,
            rgba,
        })
    }
}

impl Default for ResvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for ResvgRasterizer {
    fn rasterize<'a>(
        &'a self,
        wrapper: &'a SnapshotWrapper,
        options: &'a RasterOptions,
    ) -> LocalBoxFuture<'a, Result<Bitmap, ExportError>> {
        Box::pin(ready(self.render(wrapper, options)))
    }
}

/// First preferred sans family present in `db`, else any "Sans" family, else
/// whatever loaded first.
fn sans_family(db: &Database) -> Option<String> {
    let families: Vec<&str> = db
        .faces()
        .flat_map(|face| face.families.iter().map(|(name, _)| name.as_str()))
        .collect();

    SANS_CANDIDATES
        .iter()
        .copied()
        .find(|candidate| families.contains(candidate))
        .or_else(|| families.iter().copied().find(|name| name.contains("Sans")))
        .or_else(|| families.first().copied())
        .map(str::to_string)
}

fn check_taint(wrapper: &SnapshotWrapper, options: &RasterOptions) -> Result<(), ExportError> {
    if !options.allow_taint && !wrapper.is_self_contained() {
        return Err(ExportError::Rasterization(
            "snapshot still references remote assets".into(),
        ));
    }
    Ok(())
}

fn device_size(width: f32, height: f32, scale: f32) -> Result<(u32, u32), ExportError> {
    let width = (width * scale).ceil();
    let height = (height * scale).ceil();
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(ExportError::Rasterization(format!(
            "snapshot too large ({width}x{height})"
        )));
    }
    Ok((width as u32, height as u32))
}

/// Draws the wrapper through the browser's own SVG renderer, so snapshot text
/// uses the page's fonts.
#[cfg(target_arch = "wasm32")]
pub struct CanvasRasterizer;

#[cfg(target_arch = "wasm32")]
impl CanvasRasterizer {
    async fn render(
        &self,
        wrapper: &SnapshotWrapper,
        options: &RasterOptions,
    ) -> Result<Bitmap, ExportError> {
        use wasm_bindgen::{JsCast, JsValue};
        use wasm_bindgen_futures::JsFuture;
        use web_sys::{
            Blob, BlobPropertyBag, CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement,
            Url,
        };

        let failed = |what: &str| ExportError::Rasterization(what.to_string());
        check_taint(wrapper, options)?;
        let (width, height) =
            device_size(wrapper.width as f32, wrapper.height as f32, options.scale)?;

        let mut blob_opts = BlobPropertyBag::new();
        blob_opts.type_("image/svg+xml");
        let parts = js_sys::Array::new();
        parts.push(&JsValue::from_str(&wrapper.svg));
        let blob = Blob::new_with_str_sequence_and_options(&parts, &blob_opts)
            .map_err(|_| failed("unable to build svg blob"))?;
        let url = Url::create_object_url_with_blob(&blob)
            .map_err(|_| failed("unable to create svg url"))?;

        let image = HtmlImageElement::new().map_err(|_| failed("unable to create image"))?;
        image.set_src(&url);
        let decoded = JsFuture::from(image.decode()).await;
        Url::revoke_object_url(&url).ok();
        decoded.map_err(|err| {
            error!(id = %wrapper.id, ?err, "snapshot svg rejected");
            failed("snapshot svg could not be decoded")
        })?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| failed("document unavailable"))?;
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(|_| failed("unable to create canvas"))?
            .dyn_into()
            .map_err(|_| failed("canvas cast failed"))?;
        canvas.set_width(width);
        canvas.set_height(height);
        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|_| failed("canvas context unavailable"))?
            .ok_or_else(|| failed("canvas context missing"))?
            .dyn_into()
            .map_err(|_| failed("context cast failed"))?;

        let bg = options.background.to_color_u8();
        context.set_fill_style_str(&format!(
            "rgba({}, {}, {}, {})",
            bg.red(),
            bg.green(),
            bg.blue(),
            f64::from(bg.alpha()) / 255.0
        ));
        context.fill_rect(0.0, 0.0, f64::from(width), f64::from(height));
        context
            .draw_image_with_html_image_element_and_dw_and_dh(
                &image,
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            )
            .map_err(|_| failed("unable to draw snapshot"))?;

        // Throws when the canvas was tainted by a cross-origin draw.
        let pixels = context
            .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))
            .map_err(|_| failed("canvas is tainted"))?;

        debug!(id = %wrapper.id, width, height, "snapshot rasterized in browser");
        Ok(Bitmap {
            width,
            height,
            rgba: pixels.data().0,
        })
    }
}

#[cfg(target_arch = "wasm32")]
impl Rasterizer for CanvasRasterizer {
    fn rasterize<'a>(
        &'a self,
        wrapper: &'a SnapshotWrapper,
        options: &'a RasterOptions,
    ) -> LocalBoxFuture<'a, Result<Bitmap, ExportError>> {
        Box::pin(self.render(wrapper, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapper(svg: &str) -> SnapshotWrapper {
        SnapshotWrapper {
            id: "test".into(),
            width: 40.0,
            height: 20.0,
            svg: svg.into(),
            skipped_assets: vec![],
        }
    }

    const BOX: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20"><rect x="10" y="5" width="10" height="10" fill="#1d4ed8"/></svg>"##;

    #[test]
    fn renders_at_twice_the_css_size_on_white() {
        let bitmap = ResvgRasterizer::new()
            .render(&wrapper(BOX), &RasterOptions::default())
            .unwrap();
        assert_eq!((bitmap.width, bitmap.height), (80, 40));
        assert_eq!(&bitmap.rgba[..4], &[255, 255, 255, 255]);
        assert!(!bitmap.is_blank());
    }

    #[test]
    fn encodes_a_png_signature() {
        let bitmap = Bitmap {
            width: 2,
            height: 1,
            rgba: vec![255; 8],
        };
        let png = bitmap.encode_png().unwrap();
        assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));
        assert!(bitmap.is_blank());
    }

    #[test]
    fn malformed_markup_is_a_rasterization_error() {
        let err = ResvgRasterizer::new()
            .render(&wrapper("<svg"), &RasterOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExportError::Rasterization(_)));
    }

    #[test]
    fn remote_references_are_refused_without_taint() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"><image href="https://example.com/a.png" width="4" height="4"/></svg>"#;
        let err = ResvgRasterizer::new()
            .render(&wrapper(svg), &RasterOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExportError::Rasterization(_)));
    }

    #[test]
    fn text_only_snapshot_draws_glyphs() {
        let rasterizer = ResvgRasterizer::new();
        if rasterizer.font_faces() == 0 {
            eprintln!("no fonts installed; skipping glyph check");
            return;
        }
        let svg = format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="160" height="40"><text x="8" y="26" font-family="{}" font-size="18" fill="#111827">Duke +2.41</text></svg>"##,
            crate::export::fonts::FONT_FAMILY
        );
        let bitmap = rasterizer
            .render(&wrapper(&svg), &RasterOptions::default())
            .unwrap();
        assert!(!bitmap.is_blank());
        let ink = bitmap
            .rgba
            .chunks_exact(4)
            .filter(|px| px[0] < 96 && px[1] < 96 && px[2] < 96)
            .count();
        assert!(ink > 20, "only {ink} dark pixels drawn");
    }

    #[test]
    fn empty_font_database_has_no_sans_family() {
        assert_eq!(sans_family(&Database::new()), None);
    }

    #[tokio::test]
    async fn trait_rasterize_matches_direct_render() {
        let rasterizer = ResvgRasterizer::new();
        let options = RasterOptions::default();
        let shape = wrapper(BOX);
        let via_trait = rasterizer.rasterize(&shape, &options).await.unwrap();
        assert_eq!(via_trait, rasterizer.render(&shape, &options).unwrap());
    }
}
