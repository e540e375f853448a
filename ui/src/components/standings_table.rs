use api::TeamSummary;
use dioxus::prelude::*;

use crate::core::format::{format_percent, format_record, format_seed, format_win_value};
use crate::core::sport::Sport;
use crate::t;

/// Tint for a win-value cell: green above zero, red below.
fn value_tint(value: Option<f64>) -> &'static str {
    match value {
        Some(v) if v > 0.0 => "background-color: #dcfce7",
        Some(v) if v < 0.0 => "background-color: #fee2e2",
        _ => "",
    }
}

#[component]
pub fn StandingsTable(sport: Sport, teams: Vec<TeamSummary>) -> Element {
    let metric = sport.value_metric();
    let prefix = sport.path_prefix();
    let show_seed = sport == Sport::Basketball;
    let rows: Vec<(TeamSummary, Option<f64>, String)> = teams
        .into_iter()
        .map(|team| {
            let value = match sport {
                Sport::Basketball => team.cwv,
                Sport::Football => team.twv,
            };
            let href = format!("{prefix}/team/{}", team.team_name);
            (team, value, href)
        })
        .collect();

    rsx! {
        table { class: "standings {sport.table_class()}",
            thead {
                tr {
                    th { {t!("col-team")} }
                    th { {t!("col-record")} }
                    th { {t!("col-conf-record")} }
                    th { "{metric}" }
                    th { "{sport.bid_label()}" }
                    if show_seed {
                        th { {t!("col-avg-seed")} }
                    } else {
                        th { {t!("col-proj-conf-wins")} }
                    }
                }
            }
            tbody {
                for (team, value, href) in rows {
                    tr { key: "{team.team_id}-{team.team_name}",
                        td { class: "standings__team",
                            if let Some(logo) = team.logo_url.clone() {
                                img { class: "standings__logo", src: "{logo}", alt: "", width: "18", height: "18" }
                            }
                            Link { to: href, "{team.team_name}" }
                        }
                        td { "{format_record(team.wins, team.losses)}" }
                        td { "{format_record(team.conf_wins, team.conf_losses)}" }
                        td { style: value_tint(value), "{format_win_value(value)}" }
                        td { "{format_percent(team.bid_probability)}" }
                        if show_seed {
                            td { "{format_seed(team.average_seed)}" }
                        } else {
                            td { "{format_seed(team.projected_conf_wins)}" }
                        }
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
    fn tint_follows_the_sign() {
        assert!(value_tint(Some(1.2)).contains("#dcfce7"));
        assert!(value_tint(Some(-0.4)).contains("#fee2e2"));
        assert_eq!(value_tint(None), "");
    }
}
