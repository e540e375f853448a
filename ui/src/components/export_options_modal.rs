use api::GameSelection;
use dioxus::prelude::*;

use crate::core::config::backend;
use crate::export::delivery::PlatformDelivery;
use crate::export::scenario::{
    estimated_wait, ExportCompletion, ExportOptions, ExportState, ScenarioExporter, MAX_SCENARIOS,
};
use crate::t;

fn parse_count(raw: &str) -> u32 {
    raw.trim().parse().unwrap_or(0)
}

/// Scenario CSV export dialog. Stays open on failure so the inputs can be
/// retried as-is; closes itself after a successful download.
#[component]
pub fn ScenarioExportModal(
    conference: String,
    selections: Vec<GameSelection>,
    on_complete: EventHandler<ExportCompletion>,
    on_close: EventHandler<()>,
) -> Element {
    let mut options = use_signal(ExportOptions::default);
    let mut state = use_signal(ExportState::default);

    let busy = state().is_busy();
    let current = options();
    let wait_count = current
        .validate()
        .map(|range| range.count)
        .unwrap_or(current.num_scenarios.min(MAX_SCENARIOS));
    let wait_secs = estimated_wait(wait_count).as_secs();
    let error = state().error().map(str::to_string);

    let submit = move |_| {
        if state().is_busy() {
            return;
        }
        let conference = conference.clone();
        let selections = selections.clone();
        let chosen = options();
        spawn(async move {
            let api = backend();
            let exporter = ScenarioExporter::new(&api, &PlatformDelivery);
            let outcome = exporter
                .run(&conference, selections, chosen, |next| state.set(next.clone()))
                .await;
            if let ExportState::Success(completion) = outcome {
                on_complete.call(completion);
                on_close.call(());
            }
        });
    };

    rsx! {
        div { class: "modal", role: "dialog", aria_modal: "true", "data-export-ignore": "true",
            div { class: "modal__panel",
                h2 { {t!("scenario-title")} }
                label { class: "modal__field",
                    input {
                        r#type: "checkbox",
                        checked: current.include_all_scenarios,
                        disabled: busy,
                        onchange: move |evt| {
                            let include = evt.checked();
                            options.with_mut(|o| o.include_all_scenarios = include);
                        },
                    }
                    {t!("scenario-include-all")}
                }
                label { class: "modal__field",
                    {t!("scenario-count")}
                    input {
                        r#type: "number",
                        min: "1",
                        max: "{MAX_SCENARIOS}",
                        value: "{current.num_scenarios}",
                        disabled: busy || current.include_all_scenarios,
                        oninput: move |evt| {
                            let count = parse_count(&evt.value());
                            options.with_mut(|o| o.num_scenarios = count);
                        },
                    }
                }
                label { class: "modal__field",
                    {t!("scenario-start")}
                    input {
                        r#type: "number",
                        min: "1",
                        max: "{MAX_SCENARIOS}",
                        value: "{current.start_scenario}",
                        disabled: busy || current.include_all_scenarios,
                        oninput: move |evt| {
                            let start = parse_count(&evt.value());
                            options.with_mut(|o| o.start_scenario = start);
                        },
                    }
                }
                p { class: "modal__hint", {t!("scenario-wait", seconds = wait_secs)} }
                if let Some(message) = error {
                    p { class: "export-status export-status--error", role: "alert", "{message}" }
                }
                if busy {
                    p { class: "export-status", role: "status", {t!("scenario-working")} }
                }
                div { class: "modal__actions",
                    button {
                        r#type: "button",
                        class: "button button--primary",
                        disabled: busy,
                        onclick: submit,
                        {t!("scenario-submit")}
                    }
                    button {
                        r#type: "button",
                        class: "button button--ghost",
                        disabled: busy,
                        onclick: move |_| on_close.call(()),
                        {t!("modal-close")}
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparsable_counts_fail_validation() {
        assert_eq!(parse_count(" 25 "), 25);
        assert_eq!(parse_count("abc"), 0);
        assert_eq!(parse_count("-4"), 0);
    }
}
