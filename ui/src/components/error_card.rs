use dioxus::prelude::*;

use crate::t;

/// Page-level failure with a retry affordance.
#[component]
pub fn ErrorCard(message: String, on_retry: EventHandler<()>) -> Element {
    rsx! {
        section { class: "error-card", role: "alert",
            h2 { class: "error-card__title", {t!("error-title")} }
            p { class: "error-card__message", "{message}" }
            button {
                r#type: "button",
                class: "button button--primary",
                onclick: move |_| on_retry.call(()),
                {t!("error-retry")}
            }
        }
    }
}

#[component]
pub fn LoadingCard() -> Element {
    rsx! {
        p { class: "page__loading", aria_busy: "true", {t!("loading")} }
    }
}
