//! Top bar shared by the launchers: brand, section links and the language
//! picker. Hidden from screenshots through `data-export-ignore`.

use dioxus::prelude::*;
use once_cell::sync::OnceCell;
use tracing::{debug, trace};

use crate::i18n;
use crate::t;

const NAVBAR_CSS: Asset = asset!("/assets/styling/navbar.css");
const NAVBAR_CSS_INLINE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/styling/navbar.css"
));

/// Link constructors for the launcher's own `Route` enum, which `ui` cannot
/// name. Each receives the localized label.
pub struct NavBuilder {
    pub home: fn(label: &str) -> Element,
    pub basketball: fn(label: &str) -> Element,
    pub football: fn(label: &str) -> Element,
}

static NAV_BUILDER: OnceCell<NavBuilder> = OnceCell::new();

/// First registration wins; later calls (re-renders of the root) are no-ops.
pub fn register_nav(builder: NavBuilder) {
    let _ = NAV_BUILDER.set(builder);
}

/// Language tag shared through context so the root can remount routed pages
/// when it changes.
#[derive(Clone, Copy, PartialEq)]
pub struct ActiveLanguage(pub Signal<String>);

/// Provide [`ActiveLanguage`] at the app root and return its signal.
pub fn use_active_language() -> Signal<String> {
    let lang = use_signal(i18n::current_language);
    use_context_provider(|| ActiveLanguage(lang));
    lang
}

#[component]
pub fn AppNavbar(children: Element) -> Element {
    i18n::init();
    let active = try_use_context::<ActiveLanguage>();
    trace!(lang = ?active.map(|ActiveLanguage(lang)| lang()), "navbar render");

    let links = match NAV_BUILDER.get() {
        Some(builder) => rsx! {
            {(builder.home)(&t!("nav-home"))}
            {(builder.basketball)(&t!("nav-basketball"))}
            {(builder.football)(&t!("nav-football"))}
        },
        None => children,
    };
    let tagline = t!("tagline");

    rsx! {
        document::Link { rel: "stylesheet", href: NAVBAR_CSS }
        if cfg!(all(not(debug_assertions), not(target_arch = "wasm32"))) {
            document::Style { "{NAVBAR_CSS_INLINE}" }
        }

        header { id: "navbar", class: "navbar", "data-export-ignore": "true",
            div { class: "navbar__inner",
                div { class: "navbar__brand",
                    span { class: "navbar__brand-mark", "Seedline" }
                    span { class: "navbar__brand-subtitle", "{tagline}" }
                }
                nav { class: "navbar__links", {links} }
                LanguagePicker { active }
            }
        }
    }
}

#[component]
fn LanguagePicker(active: Option<ActiveLanguage>) -> Element {
    let langs = use_hook(i18n::available_languages);
    let mut selected = use_signal(i18n::current_language);

    if langs.len() < 2 {
        return rsx! {};
    }

    let on_change = move |evt: FormEvent| {
        let tag = evt.value();
        match i18n::set_language(&tag) {
            Ok(()) => {
                selected.set(tag.clone());
                if let Some(ActiveLanguage(mut lang)) = active {
                    lang.set(tag);
                }
            }
            Err(err) => debug!(%tag, %err, "language switch failed"),
        }
    };

    rsx! {
        div { class: "navbar__locale",
            label { class: "visually-hidden", r#for: "locale-select", {t!("nav-language-label")} }
            select { id: "locale-select", value: "{selected}", oninput: on_change,
                for code in langs {
                    option { key: "{code}", value: "{code}", "{code}" }
                }
            }
        }
    }
}
