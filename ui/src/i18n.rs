//! Fluent strings for the UI and the export headers.
//!
//! Bundles live in `i18n/<lang>/seedline-ui.ftl` and are compiled in with
//! `rust-embed`; `en-US` is the fallback every other locale is checked
//! against. Call [`init`] once at startup and look strings up with [`t!`].
//!
//! Placeables are not wrapped in Unicode isolation marks because labels end
//! up in export headers and filenames.

use std::sync::Once;

use i18n_embed::fluent::FluentLanguageLoader;
use i18n_embed::{I18nEmbedError, LanguageLoader};
use once_cell::sync::Lazy;
use rust_embed::Embed;
use tracing::{debug, warn};
use unic_langid::{langid, LanguageIdentifier};

pub use i18n_embed_fl::fl;

/// `t!("nav-home")` or `t!("standings-title", sport = "Basketball")`.
#[macro_export]
macro_rules! t {
    ($key:literal) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key)
    };
    ($key:literal, $( $arg:ident = $value:expr ),+ $(,)?) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key, $( $arg = $value ),+ )
    };
}

const DOMAIN: &str = "seedline-ui";

#[derive(Embed)]
#[folder = "i18n"]
struct Bundles;

pub static LOADER: Lazy<FluentLanguageLoader> =
    Lazy::new(|| FluentLanguageLoader::new(DOMAIN, langid!("en-US")));

static INIT: Once = Once::new();

pub fn init() {
    INIT.call_once(|| {
        if let Err(err) = load(&requested_languages()) {
            warn!(%err, "language selection failed, using en-US");
        }
    });
}

/// Switch to `tag`. Tags that do not parse leave the current language alone.
pub fn set_language(tag: &str) -> Result<(), I18nEmbedError> {
    match tag.parse::<LanguageIdentifier>() {
        Ok(lang) => load(&[lang]),
        Err(_) => {
            debug!(tag, "ignoring unparsable language tag");
            Ok(())
        }
    }
}

/// Language the loader currently resolves against first.
pub fn current_language() -> String {
    LOADER.current_language().to_string()
}

/// Embedded locale folder names, sorted.
pub fn available_languages() -> Vec<String> {
    let mut langs: Vec<String> = Bundles::iter()
        .filter_map(|path| path.split('/').next().map(str::to_string))
        .collect();
    langs.sort();
    langs.dedup();
    langs
}

fn load(requested: &[LanguageIdentifier]) -> Result<(), I18nEmbedError> {
    let selected = i18n_embed::select(&*LOADER, &Bundles, requested)?;
    LOADER.set_use_isolating(false);
    debug!(?selected, "language bundles loaded");
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::WebLanguageRequester::requested_languages()
}

#[cfg(not(target_arch = "wasm32"))]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::DesktopLanguageRequester::requested_languages()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_bundle_is_embedded() {
        assert!(available_languages().iter().any(|l| l == "en-US"));
    }

    #[test]
    fn export_labels_resolve() {
        init();
        assert_eq!(crate::t!("nav-home"), "Home");
        assert_eq!(
            crate::t!("standings-title", sport = "Football"),
            "Football standings"
        );
    }

    #[test]
    fn unknown_language_keeps_english_strings() {
        init();
        let before = crate::t!("nav-home");
        let _ = set_language("zz-ZZ");
        let _ = set_language("not a tag");
        assert_eq!(crate::t!("nav-home"), before);
        assert_eq!(current_language(), "en-US");
    }
}
