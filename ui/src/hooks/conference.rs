use std::cmp::Ordering;

use api::TeamSummary;
use dioxus::prelude::*;

use crate::core::sport::Sport;

/// Selected conference for a standings page. `None` until the roster loads,
/// after which pages fall back to the first conference in the list.
pub fn use_conference_selection() -> Signal<Option<String>> {
    use_signal(|| None)
}

/// Sorted, de-duplicated conference names in a roster.
pub fn conference_list(teams: &[TeamSummary]) -> Vec<String> {
    let mut conferences: Vec<String> = teams
        .iter()
        .map(|team| team.conference.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    conferences.sort();
    conferences.dedup();
    conferences
}

/// Teams in `conference` ordered the way a standings table reads: conference
/// win percentage first, then the sport's win-value metric.
pub fn standings_for(teams: &[TeamSummary], conference: &str, sport: Sport) -> Vec<TeamSummary> {
    let mut rows: Vec<TeamSummary> = teams
        .iter()
        .filter(|team| team.conference.trim() == conference)
        .cloned()
        .collect();

    rows.sort_by(|a, b| {
        conf_pct(b)
            .partial_cmp(&conf_pct(a))
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                win_value(b, sport)
                    .partial_cmp(&win_value(a, sport))
                    .unwrap_or(Ordering::Equal)
            })
    });
    rows
}

fn conf_pct(team: &TeamSummary) -> f64 {
    let games = team.conf_wins + team.conf_losses;
    if games == 0 {
        0.0
    } else {
        team.conf_wins as f64 / games as f64
    }
}

pub(crate) fn win_value(team: &TeamSummary, sport: Sport) -> f64 {
    match sport {
        Sport::Basketball => team.cwv,
        Sport::Football => team.twv,
    }
    .filter(|v| v.is_finite())
    .unwrap_or(f64::NEG_INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(name: &str, conference: &str, conf: (u32, u32), cwv: Option<f64>) -> TeamSummary {
        TeamSummary {
            team_name: name.into(),
            conference: conference.into(),
            conf_wins: conf.0,
            conf_losses: conf.1,
            cwv,
            ..Default::default()
        }
    }

    #[test]
    fn conference_list_is_sorted_and_unique() {
        let teams = vec![
            team("Duke", "ACC", (1, 0), None),
            team("Kansas", "Big 12", (1, 0), None),
            team("UNC", " ACC ", (0, 1), None),
            team("Indep", "", (0, 0), None),
        ];
        assert_eq!(conference_list(&teams), vec!["ACC", "Big 12"]);
    }

    #[test]
    fn standings_break_ties_on_win_value() {
        let teams = vec![
            team("Clemson", "ACC", (10, 4), Some(0.5)),
            team("Duke", "ACC", (12, 2), Some(1.1)),
            team("Louisville", "ACC", (10, 4), Some(1.4)),
            team("Kansas", "Big 12", (14, 0), Some(3.0)),
        ];
        let order: Vec<_> = standings_for(&teams, "ACC", Sport::Basketball)
            .into_iter()
            .map(|t| t.team_name)
            .collect();
        assert_eq!(order, vec!["Duke", "Louisville", "Clemson"]);
    }
}
