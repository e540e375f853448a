//! Handing finished files to the user: share sheet or anchor download in the
//! browser, the app's export folder on desktop.

use std::path::PathBuf;

use futures::future::LocalBoxFuture;
use tracing::info;

use crate::core::error::ExportError;
#[cfg(target_arch = "wasm32")]
use crate::core::platform::{self, Platform};

#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn png(filename: String, bytes: Vec<u8>) -> Self {
        Self {
            filename,
            mime: "image/png",
            bytes,
        }
    }

    pub fn csv(filename: String, data: String) -> Self {
        Self {
            filename,
            mime: "text/csv",
            bytes: data.into_bytes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Downloaded,
    Shared,
    Saved(PathBuf),
}

impl Delivery {
    pub fn describe(&self, filename: &str) -> String {
        match self {
            Delivery::Downloaded => format!("{filename} downloaded"),
            Delivery::Shared => format!("{filename} shared"),
            Delivery::Saved(path) => format!("Saved to {}", path.display()),
        }
    }
}

pub trait Deliver {
    fn deliver(&self, file: ExportFile) -> LocalBoxFuture<'_, Result<Delivery, ExportError>>;
}

/// `"{subject}_{label}.png"` with spaces turned into underscores and anything
/// outside `[A-Za-z0-9_]` dropped.
pub fn screenshot_filename(subject: &str, label: &str) -> String {
    let raw = format!("{}_{}", subject.trim(), label.trim());
    let mut stem: String = raw
        .chars()
        .filter_map(|ch| match ch {
            ' ' => Some('_'),
            ch if ch.is_ascii_alphanumeric() || ch == '_' => Some(ch),
            _ => None,
        })
        .collect();
    if stem.trim_matches('_').is_empty() {
        stem = "snapshot".into();
    }
    format!("{stem}.png")
}

/// Delivery for the platform the app is running on.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformDelivery;

impl Deliver for PlatformDelivery {
    fn deliver(&self, file: ExportFile) -> LocalBoxFuture<'_, Result<Delivery, ExportError>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                let shareable = file.mime.starts_with("image/");
                if shareable && Platform::current().is_mobile() && platform::can_share_files() {
                    match share_file(&file).await {
                        Ok(()) => {
                            info!(filename = %file.filename, "file shared");
                            return Ok(Delivery::Shared);
                        }
                        Err(err) => tracing::warn!(%err, "share sheet unavailable; downloading instead"),
                    }
                }
                download_file(&file)?;
                info!(filename = %file.filename, "download started");
                Ok(Delivery::Downloaded)
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let path = save_file(&file)?;
                info!(path = %path.display(), "file saved");
                Ok(Delivery::Saved(path))
            }
        })
    }
}

#[cfg(target_arch = "wasm32")]
fn file_parts(file: &ExportFile) -> js_sys::Array {
    let array = js_sys::Uint8Array::from(file.bytes.as_slice());
    let parts = js_sys::Array::new();
    parts.push(&array.buffer());
    parts
}

#[cfg(target_arch = "wasm32")]
async fn share_file(file: &ExportFile) -> Result<(), ExportError> {
    use wasm_bindgen::JsValue;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{File, FilePropertyBag, ShareData};

    let mut opts = FilePropertyBag::new();
    opts.type_(file.mime);
    let shared = File::new_with_u8_array_sequence_and_options(&file_parts(file), &file.filename, &opts)
        .map_err(|_| ExportError::Delivery("unable to create file".into()))?;

    let files = js_sys::Array::new();
    files.push(&shared);
    let data = ShareData::new();
    js_sys::Reflect::set(&data, &JsValue::from_str("files"), &files)
        .map_err(|_| ExportError::Delivery("unable to attach file".into()))?;
    js_sys::Reflect::set(&data, &JsValue::from_str("title"), &JsValue::from_str(&file.filename))
        .map_err(|_| ExportError::Delivery("unable to title share".into()))?;

    let navigator = web_sys::window()
        .ok_or_else(|| ExportError::Delivery("window unavailable".into()))?
        .navigator();
    JsFuture::from(navigator.share_with_data(&data))
        .await
        .map(|_| ())
        .map_err(|err| ExportError::Delivery(format!("{err:?}")))
}

#[cfg(target_arch = "wasm32")]
fn download_file(file: &ExportFile) -> Result<(), ExportError> {
    use wasm_bindgen::JsCast;
    use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

    let failed = |what: &str| ExportError::Delivery(what.to_string());

    let mut opts = BlobPropertyBag::new();
    opts.type_(file.mime);
    let blob = Blob::new_with_u8_array_sequence_and_options(&file_parts(file), &opts)
        .map_err(|_| failed("failed to create blob"))?;
    let url = Url::create_object_url_with_blob(&blob).map_err(|_| failed("unable to create download"))?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| failed("document unavailable"))?;
    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(|_| failed("unable to create anchor"))?
        .dyn_into()
        .map_err(|_| failed("anchor cast failed"))?;
    anchor.set_href(&url);
    anchor.set_download(&file.filename);
    anchor.style().set_property("display", "none").ok();

    document
        .body()
        .ok_or_else(|| failed("missing body"))?
        .append_child(&anchor)
        .ok();
    anchor.click();
    anchor.remove();
    Url::revoke_object_url(&url).ok();
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn save_file(file: &ExportFile) -> Result<PathBuf, ExportError> {
    let dir = export_dir()?;
    std::fs::create_dir_all(&dir).map_err(|err| ExportError::Delivery(err.to_string()))?;
    let path = dir.join(&file.filename);
    std::fs::write(&path, &file.bytes).map_err(|err| ExportError::Delivery(err.to_string()))?;
    Ok(path)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn export_dir() -> Result<PathBuf, ExportError> {
    let dirs = directories::ProjectDirs::from("com", "Seedline", "Seedline")
        .ok_or_else(|| ExportError::Delivery("unable to determine export directory".into()))?;
    Ok(dirs.data_dir().join("exports"))
}
