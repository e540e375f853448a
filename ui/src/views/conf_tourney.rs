use api::ConfTourneyHistory;
use dioxus::prelude::*;

use crate::components::{
    ChartSeries, ErrorCard, HistoryChart, LoadingCard, ScreenshotModal, ValueFormat, PALETTE,
};
use crate::core::config::backend;
use crate::core::format::format_percent;
use crate::core::sport::Sport;
use crate::export::{CaptureContext, CaptureOption};
use crate::t;

/// Teams charted on the championship trend; the table lists everyone.
const CHARTED_TEAMS: usize = 6;

/// Title-odds trend for the current favourites.
fn championship_series(history: &ConfTourneyHistory) -> Vec<ChartSeries> {
    let Some(final_round) = history.rounds.last() else {
        return Vec::new();
    };
    history
        .latest_by_team()
        .into_iter()
        .take(CHARTED_TEAMS)
        .enumerate()
        .map(|(index, (team, _))| ChartSeries {
            color: PALETTE[index % PALETTE.len()].to_string(),
            points: history
                .timeline
                .iter()
                .filter(|p| p.team_name == team && &p.round == final_round)
                .map(|p| (p.date.clone(), Some(p.probability)))
                .collect(),
            label: team,
        })
        .collect()
}

#[component]
pub fn ConfTourney(conference: String) -> Element {
    let mut history = use_resource({
        let conference = conference.clone();
        use_reactive!(|(conference,)| async move {
            backend()
                .conf_tourney_history(&conference)
                .await
                .map_err(|err| err.to_string())
        })
    });

    let body = match history.cloned() {
        None => rsx! { LoadingCard {} },
        Some(Err(message)) => rsx! {
            ErrorCard { message, on_retry: move |_| history.restart() }
        },
        Some(Ok(data)) => {
            let table_title = t!("capture-tourney-table");
            let chart_title = t!("chart-tourney-title");
            let options = vec![
                CaptureOption::new("odds", &table_title, ".conf-tourney-table"),
                CaptureOption::new("trend", &chart_title, ".conf-tourney-chart"),
            ];
            let context = CaptureContext {
                subject: conference.clone(),
                sport: Sport::Basketball,
                secondary_logo: None,
                explainer_selector: None,
            };
            let rows = data.latest_by_team();
            let trend = championship_series(&data);

            rsx! {
                div { class: "page__toolbar",
                    ScreenshotModal { options, context }
                }
                table { class: "standings conf-tourney-table",
                    thead {
                        tr {
                            th { {t!("col-team")} }
                            for round in data.rounds.iter() {
                                th { key: "{round}", "{round}" }
                            }
                        }
                    }
                    tbody {
                        for (team, cells) in rows {
                            tr { key: "{team}",
                                td { "{team}" }
                                for (index, cell) in cells.into_iter().enumerate() {
                                    td { key: "{index}", "{format_percent(cell)}" }
                                }
                            }
                        }
                    }
                }
                HistoryChart {
                    class: "conf-tourney-chart",
                    title: chart_title,
                    series: trend,
                    format: ValueFormat::Percent,
                }
            }
        }
    };

    rsx! {
        section { class: "page page-tourney",
            h1 { {t!("conf-tourney-title", conference = conference.clone())} }
            {body}
        }
    }
}
