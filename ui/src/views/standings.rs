use api::TeamSummary;
use dioxus::prelude::*;

use crate::components::{
    ErrorCard, LoadingCard, ScenarioExportModal, ScreenshotModal, StandingsTable,
};
use crate::core::config::backend;
use crate::core::sport::Sport;
use crate::export::scenario::ExportCompletion;
use crate::export::{CaptureContext, CaptureOption};
use crate::hooks::{conference_list, standings_for, use_conference_selection};
use crate::t;

const EXPLAINER_SELECTOR: &str = ".standings-explainer";

async fn fetch_roster(sport: Sport) -> Result<Vec<TeamSummary>, String> {
    let api = backend();
    let roster = match sport {
        Sport::Basketball => api.basketball_teams().await,
        Sport::Football => api.football_teams().await,
    };
    roster.map_err(|err| err.to_string())
}

#[component]
pub fn BasketballStandings() -> Element {
    rsx! { StandingsPage { sport: Sport::Basketball } }
}

#[component]
pub fn FootballStandings() -> Element {
    rsx! { StandingsPage { sport: Sport::Football } }
}

#[component]
fn StandingsPage(sport: Sport) -> Element {
    let mut roster = use_resource(use_reactive!(|(sport,)| async move { fetch_roster(sport).await }));
    let mut selected = use_conference_selection();
    let mut show_scenarios = use_signal(|| false);
    let mut last_export = use_signal(|| None::<ExportCompletion>);

    let body = match roster.cloned() {
        None => rsx! { LoadingCard {} },
        Some(Err(message)) => rsx! {
            ErrorCard { message, on_retry: move |_| roster.restart() }
        },
        Some(Ok(teams)) => {
            let conferences = conference_list(&teams);
            let conference = selected()
                .filter(|name| conferences.contains(name))
                .or_else(|| conferences.first().cloned())
                .unwrap_or_default();
            let rows = standings_for(&teams, &conference, sport);
            let options = vec![CaptureOption::new(
                "standings",
                &t!("capture-standings", metric = sport.value_metric()),
                &format!(".{}", sport.table_class()),
            )];
            let context = CaptureContext {
                subject: conference.clone(),
                sport,
                secondary_logo: None,
                explainer_selector: Some(EXPLAINER_SELECTOR.to_string()),
            };
            let tourney_href = format!("{}/conf-tourney/{conference}", sport.path_prefix());

            rsx! {
                div { class: "page__toolbar",
                    label { class: "page__field",
                        {t!("conference-label")}
                        select {
                            value: "{conference}",
                            oninput: move |evt| selected.set(Some(evt.value())),
                            for name in conferences.iter() {
                                option { key: "{name}", value: "{name}", "{name}" }
                            }
                        }
                    }
                    ScreenshotModal { options, context }
                    if sport == Sport::Football {
                        button {
                            r#type: "button",
                            class: "button",
                            "data-export-ignore": "true",
                            onclick: move |_| show_scenarios.set(true),
                            {t!("scenario-button")}
                        }
                    } else {
                        Link { class: "button button--ghost", to: tourney_href, {t!("conf-tourney-link")} }
                    }
                }

                if rows.is_empty() {
                    p { class: "page__empty", {t!("standings-empty")} }
                } else {
                    StandingsTable { sport, teams: rows }
                }
                p { class: "standings-explainer",
                    {t!("standings-explainer", metric = sport.value_metric())}
                }

                if let Some(done) = last_export() {
                    p { class: "export-status export-status--success", role: "status",
                        {t!("scenario-done", count = done.scenarios, filename = done.filename.clone())}
                    }
                }

                if show_scenarios() {
                    ScenarioExportModal {
                        conference: conference.clone(),
                        selections: Vec::new(),
                        on_complete: move |done: ExportCompletion| last_export.set(Some(done)),
                        on_close: move |_| show_scenarios.set(false),
                    }
                }
            }
        }
    };

    rsx! {
        section { class: "page page-standings",
            h1 { {t!("standings-title", sport = sport.label())} }
            {body}
        }
    }
}
