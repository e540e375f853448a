//! Platform detection plus the handful of runtime primitives (timers, page
//! access) that differ between the browser and native builds.

use std::future::Future;
use std::time::Duration;

use crate::core::error::ExportError;
#[cfg(target_arch = "wasm32")]
use crate::hooks::breakpoint::Breakpoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Web,
    Desktop,
    Mobile,
}

impl Platform {
    pub fn current() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            let Some(window) = web_sys::window() else {
                return Self::Web;
            };
            let agent = window.navigator().user_agent().unwrap_or_default();
            let narrow = window
                .inner_width()
                .ok()
                .and_then(|w| w.as_f64())
                .map(|w| Breakpoint::from_width(w) == Breakpoint::Mobile)
                .unwrap_or(false);
            if is_mobile_agent(&agent) || narrow {
                Self::Mobile
            } else {
                Self::Web
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Self::Desktop
        }
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self, Self::Mobile)
    }
}

pub fn is_mobile_agent(agent: &str) -> bool {
    ["Mobi", "Android", "iPhone", "iPad"]
        .iter()
        .any(|needle| agent.contains(needle))
}

/// Whether the browser exposes the Web Share API.
pub fn can_share_files() -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()
            .map(|w| {
                js_sys::Reflect::has(&w.navigator(), &wasm_bindgen::JsValue::from_str("share"))
                    .unwrap_or(false)
            })
            .unwrap_or(false)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        false
    }
}

pub async fn sleep(duration: Duration) {
    if duration.is_zero() {
        return;
    }

    #[cfg(target_arch = "wasm32")]
    {
        gloo_timers::future::TimeoutFuture::new(millis_u32(duration)).await;
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        tokio::time::sleep(duration).await;
    }
}

/// Run `fut` with an upper bound; `None` means the bound elapsed first.
pub async fn timeout<F: Future>(duration: Duration, fut: F) -> Option<F::Output> {
    #[cfg(target_arch = "wasm32")]
    {
        use futures::future::{select, Either};

        let fut = Box::pin(fut);
        let timer = Box::pin(gloo_timers::future::TimeoutFuture::new(millis_u32(duration)));
        match select(fut, timer).await {
            Either::Left((output, _)) => Some(output),
            Either::Right(_) => None,
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        tokio::time::timeout(duration, fut).await.ok()
    }
}

#[cfg(target_arch = "wasm32")]
fn millis_u32(duration: Duration) -> u32 {
    duration.as_millis().min(u32::MAX as u128) as u32
}

#[cfg(not(target_arch = "wasm32"))]
const CAPTURE_SCRIPT: &str = r#"
const copy = document.body.cloneNode(true);
const live = document.body.querySelectorAll('canvas');
const frozen = copy.querySelectorAll('canvas');
live.forEach((canvas, i) => {
  try {
    const img = document.createElement('img');
    img.src = canvas.toDataURL('image/png');
    img.width = canvas.width;
    img.height = canvas.height;
    img.setAttribute('data-snapshot-canvas', 'true');
    frozen[i].replaceWith(img);
  } catch (_) {}
});
return copy.outerHTML;
"#;

/// Serialized copy of the current page body with every `<canvas>` frozen into
/// an `<img>` holding its current pixels.
pub async fn page_markup() -> Result<String, ExportError> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| ExportError::Page("document unavailable".into()))?;
        let body = document
            .body()
            .ok_or_else(|| ExportError::Page("missing body".into()))?;
        let copy: web_sys::Element = body
            .clone_node_with_deep(true)
            .map_err(|_| ExportError::Page("unable to clone page".into()))?
            .dyn_into()
            .map_err(|_| ExportError::Page("clone cast failed".into()))?;

        freeze_canvases(&document, &body, &copy);
        Ok(copy.outer_html())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let value = dioxus::document::eval(CAPTURE_SCRIPT)
            .await
            .map_err(|err| ExportError::Page(format!("{err:?}")))?;
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| ExportError::Page("page returned no markup".into()))
    }
}

#[cfg(target_arch = "wasm32")]
fn freeze_canvases(document: &web_sys::Document, live: &web_sys::Element, copy: &web_sys::Element) {
    use crate::export::resolver::FROZEN_CANVAS_ATTR;
    use wasm_bindgen::JsCast;
    use web_sys::HtmlCanvasElement;

    let (Ok(sources), Ok(targets)) = (
        live.query_selector_all("canvas"),
        copy.query_selector_all("canvas"),
    ) else {
        return;
    };

    for index in 0..sources.length() {
        let (Some(source), Some(target)) = (sources.item(index), targets.item(index)) else {
            continue;
        };
        let Ok(source) = source.dyn_into::<HtmlCanvasElement>() else {
            continue;
        };
        let Ok(target) = target.dyn_into::<web_sys::Element>() else {
            continue;
        };
        // Cross-origin content taints the canvas and makes this throw.
        let Ok(data_url) = source.to_data_url() else {
            tracing::warn!("skipping tainted canvas during capture");
            continue;
        };
        let Ok(image) = document.create_element("img") else {
            continue;
        };
        image.set_attribute("src", &data_url).ok();
        image
            .set_attribute("width", &source.width().to_string())
            .ok();
        image
            .set_attribute("height", &source.height().to_string())
            .ok();
        image.set_attribute(FROZEN_CANVAS_ATTR, "true").ok();
        target.replace_with_with_node_1(&image).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_build_is_never_mobile() {
        assert_eq!(Platform::current(), Platform::Desktop);
        assert!(!Platform::current().is_mobile());
        assert!(!can_share_files());
    }

    #[test]
    fn mobile_agents_are_detected() {
        assert!(is_mobile_agent(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148"
        ));
        assert!(!is_mobile_agent(
            "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/128.0"
        ));
    }

    #[tokio::test]
    async fn timeout_reports_elapsed_bound() {
        let never = futures::future::pending::<()>();
        assert!(timeout(Duration::from_millis(10), never).await.is_none());
        assert_eq!(timeout(Duration::from_millis(10), async { 7 }).await, Some(7));
    }
}
