use dioxus::prelude::*;
use tracing::warn;

use crate::core::error::ExportError;
use crate::export::{capture_current_page, CaptureContext, CaptureOption};
use crate::t;

#[derive(Clone, Debug, PartialEq)]
enum ExportStatus {
    Idle,
    Working(String),
    Done(String),
    Error(String),
}

/// Class, ARIA role and text for the line under the modal. Failures are
/// announced as alerts.
fn feedback_line(status: &ExportStatus) -> Option<(&'static str, &'static str, String)> {
    match status {
        ExportStatus::Idle => None,
        ExportStatus::Working(label) => Some(("export-status", "status", format!("{label}…"))),
        ExportStatus::Done(message) => Some((
            "export-status export-status--success",
            "status",
            format!("✅ {message}"),
        )),
        ExportStatus::Error(err) => Some((
            "export-status export-status--error",
            "alert",
            format!("⚠️ {err}"),
        )),
    }
}

/// Screenshot button plus the option picker it opens. The trigger and modal
/// are marked so they never end up in a capture.
#[component]
pub fn ScreenshotModal(options: Vec<CaptureOption>, context: CaptureContext) -> Element {
    let mut open = use_signal(|| false);
    let mut status = use_signal(|| ExportStatus::Idle);
    let mut is_capturing = use_signal(|| false);
    let route = try_use_context::<RouterContext>().map(|router| router.full_route_string());

    let feedback = feedback_line(&status());

    let mut capture = move |option: CaptureOption, context: CaptureContext| {
        if is_capturing() {
            return;
        }
        is_capturing.set(true);
        status.set(ExportStatus::Working(option.label.clone()));
        spawn(async move {
            match capture_current_page(&option, &context).await {
                Ok(report) => {
                    status.set(ExportStatus::Done(report.delivery.describe(&report.filename)));
                    open.set(false);
                }
                Err(err) => {
                    match &err {
                        ExportError::ElementNotFound(_) => {
                            warn!(selector = %option.selector, "capture target missing");
                        }
                        ExportError::InvalidSelector(_) => {
                            warn!(selector = %option.selector, "capture selector does not parse");
                        }
                        _ => {}
                    }
                    status.set(ExportStatus::Error(err.to_string()));
                }
            }
            is_capturing.set(false);
        });
    };

    rsx! {
        div { class: "screenshot", "data-export-ignore": "true",
            button {
                r#type: "button",
                class: "button button--ghost",
                disabled: is_capturing(),
                onclick: move |_| {
                    status.set(ExportStatus::Idle);
                    open.set(true);
                },
                {t!("screenshot-button")}
            }

            if open() {
                div { class: "modal", role: "dialog", aria_modal: "true",
                    div { class: "modal__panel",
                        h2 { {t!("screenshot-title")} }
                        ul { class: "modal__options",
                            for option in options.iter().cloned() {
                                li { key: "{option.id}",
                                    button {
                                        r#type: "button",
                                        class: "button",
                                        disabled: is_capturing(),
                                        onclick: {
                                            let option = option.clone();
                                            let context = match &route {
                                                Some(path) => context.clone().for_route(path),
                                                None => context.clone(),
                                            };
                                            move |_| capture(option.clone(), context.clone())
                                        },
                                        "{option.label}"
                                    }
                                }
                            }
                        }
                        button {
                            r#type: "button",
                            class: "button button--ghost",
                            disabled: is_capturing(),
                            onclick: move |_| open.set(false),
                            {t!("modal-close")}
                        }
                    }
                }
            }

            if let Some((class_name, role, message)) = feedback {
                p { class: "{class_name}", role, "{message}" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_failures_are_alerts() {
        let missing = ExportError::ElementNotFound(".cwv-table".into());
        let (class, role, text) =
            feedback_line(&ExportStatus::Error(missing.to_string())).unwrap();
        assert_eq!(role, "alert");
        assert!(class.contains("export-status--error"));
        assert!(text.contains(".cwv-table"));
    }

    #[test]
    fn progress_and_success_are_polite_status() {
        assert_eq!(feedback_line(&ExportStatus::Idle), None);
        let (_, role, _) = feedback_line(&ExportStatus::Working("CWV Table".into())).unwrap();
        assert_eq!(role, "status");
        let (_, role, _) = feedback_line(&ExportStatus::Done("ACC_CWV_Table.png downloaded".into())).unwrap();
        assert_eq!(role, "status");
    }
}
