use dioxus::prelude::*;

use crate::core::sport::Sport;

#[component]
pub fn Home() -> Element {
    // Subscribe to the shared language code (if provided) so labels refresh on change.
    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let _lang_current = lang_code.as_ref().map(|s| s()).unwrap_or_default();

    rsx! {
        section { class: "page page-home",
            h1 { {crate::t!("home-title")} }
            p { {crate::t!("home-intro")} }

            ul { class: "page-home__sports",
                for sport in [Sport::Basketball, Sport::Football] {
                    li { key: "{sport.label()}",
                        Link { to: format!("{}/standings", sport.path_prefix()),
                            img {
                                class: "page-home__mark",
                                src: "{crate::export::assets::InlineAsset::from_svg(sport.brand_logo_svg()).data_uri}",
                                alt: "",
                                width: "32",
                                height: "32",
                            }
                            "{sport.label()}"
                        }
                    }
                }
            }
            p { class: "page-home__note", {crate::t!("home-export-note")} }
        }
    }
}
