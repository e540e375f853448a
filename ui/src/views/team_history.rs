use api::TeamHistory;
use dioxus::prelude::*;

use crate::components::{
    ChartSeries, ErrorCard, HistoryChart, LoadingCard, ScreenshotModal, ValueFormat, PALETTE,
};
use crate::core::config::backend;
use crate::core::sport::Sport;
use crate::export::{CaptureContext, CaptureOption};
use crate::t;

/// Which backend history a page charts.
#[derive(Debug, Clone, Copy, PartialEq)]
enum HistoryKind {
    Bid(Sport),
    ConfWins,
}

async fn fetch_history(kind: HistoryKind, team: String) -> Result<TeamHistory, String> {
    let api = backend();
    let history = match kind {
        HistoryKind::Bid(Sport::Basketball) => api.basketball_team_history(&team).await,
        HistoryKind::Bid(Sport::Football) => api.football_team_history(&team).await,
        HistoryKind::ConfWins => api.football_conf_wins_history(&team).await,
    };
    history.map_err(|err| err.to_string())
}

fn series(
    label: &str,
    color: &str,
    history: &TeamHistory,
    pick: impl Fn(&api::HistoryPoint) -> Option<f64>,
) -> Vec<ChartSeries> {
    vec![ChartSeries {
        label: label.to_string(),
        color: color.to_string(),
        points: history
            .timeline
            .iter()
            .map(|point| (point.date.clone(), pick(point)))
            .collect(),
    }]
}

#[component]
pub fn BasketballTeam(team: String) -> Element {
    rsx! { TeamHistoryPage { kind: HistoryKind::Bid(Sport::Basketball), team } }
}

#[component]
pub fn FootballTeam(team: String) -> Element {
    rsx! { TeamHistoryPage { kind: HistoryKind::Bid(Sport::Football), team } }
}

#[component]
pub fn FootballConfWins(team: String) -> Element {
    rsx! { TeamHistoryPage { kind: HistoryKind::ConfWins, team } }
}

#[component]
fn TeamHistoryPage(kind: HistoryKind, team: String) -> Element {
    let mut history = use_resource({
        let team = team.clone();
        use_reactive!(|(kind, team)| async move { fetch_history(kind, team).await })
    });
    let sport = match kind {
        HistoryKind::Bid(sport) => sport,
        HistoryKind::ConfWins => Sport::Football,
    };

    let body = match history.cloned() {
        None => rsx! { LoadingCard {} },
        Some(Err(message)) => rsx! {
            ErrorCard { message, on_retry: move |_| history.restart() }
        },
        Some(Ok(data)) => {
            let subject = if data.team_name.is_empty() {
                team.clone()
            } else {
                data.team_name.clone()
            };
            let context = CaptureContext {
                subject: subject.clone(),
                sport,
                secondary_logo: data.logo_url.clone(),
                explainer_selector: None,
            };

            match kind {
                HistoryKind::Bid(sport) => {
                    let bid_title = t!("chart-bid-history", bid = sport.bid_label());
                    let seed_title = t!("chart-seed-history");
                    let mut options = vec![CaptureOption::new("bid", &bid_title, ".bid-history-chart")];
                    if sport == Sport::Basketball {
                        options.push(CaptureOption::new("seed", &seed_title, ".seed-history-chart"));
                    }
                    let bids = series(sport.bid_label(), PALETTE[0], &data, |p| p.bid_probability);
                    let seeds = series(&seed_title, PALETTE[1], &data, |p| p.average_seed);
                    let (follow_href, follow_label) = match sport {
                        Sport::Basketball => (
                            format!("/basketball/conf-tourney/{}", data.conference),
                            t!("conf-tourney-link"),
                        ),
                        Sport::Football => (
                            format!("/football/team/{subject}/conf-wins"),
                            t!("conf-wins-link"),
                        ),
                    };

                    rsx! {
                        div { class: "page__toolbar",
                            ScreenshotModal { options, context }
                            Link { class: "button button--ghost", to: follow_href, "{follow_label}" }
                        }
                        HistoryChart {
                            class: "bid-history-chart",
                            title: bid_title,
                            series: bids,
                            format: ValueFormat::Percent,
                        }
                        if sport == Sport::Basketball {
                            HistoryChart {
                                class: "seed-history-chart",
                                title: seed_title,
                                series: seeds,
                                format: ValueFormat::Decimal(1),
                            }
                        }
                    }
                }
                HistoryKind::ConfWins => {
                    let title = t!("chart-conf-wins");
                    let options = vec![CaptureOption::new("conf-wins", &title, ".conf-wins-chart")];
                    let wins = series(&title, PALETTE[2], &data, |p| p.projected_conf_wins);

                    rsx! {
                        div { class: "page__toolbar",
                            ScreenshotModal { options, context }
                        }
                        HistoryChart {
                            class: "conf-wins-chart",
                            title,
                            series: wins,
                            format: ValueFormat::Decimal(1),
                        }
                    }
                }
            }
        }
    };

    rsx! {
        section { class: "page page-team",
            h1 { "{team}" }
            {body}
        }
    }
}
