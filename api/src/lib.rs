//! Typed client for the Seedline backend proxy.
//!
//! The backend owns every model: win values, bid probabilities, seed
//! projections and simulated scenarios. This crate only moves them over HTTP
//! and gives the UI stable Rust types to render.

pub mod client;

pub use client::{ApiError, ApiResult, BackendApi};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rosters
// ---------------------------------------------------------------------------

/// One team row as returned by `/basketball_teams` and `/football_teams`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamSummary {
    pub team_name: String,
    pub team_id: String,
    pub conference: String,
    pub logo_url: Option<String>,
    pub wins: u32,
    pub losses: u32,
    pub conf_wins: u32,
    pub conf_losses: u32,
    /// Conference Win Value (basketball).
    pub cwv: Option<f64>,
    /// True Win Value (football).
    pub twv: Option<f64>,
    /// NCAA tournament or CFP bid probability, 0..=1.
    pub bid_probability: Option<f64>,
    pub average_seed: Option<f64>,
    pub projected_conf_wins: Option<f64>,
}

/// The roster endpoints have shipped both a bare array and a `{ "teams": [...] }`
/// envelope; accept either.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum TeamsPayload {
    Bare(Vec<TeamSummary>),
    Wrapped { teams: Vec<TeamSummary> },
}

impl Default for TeamsPayload {
    fn default() -> Self {
        TeamsPayload::Bare(Vec::new())
    }
}

impl TeamsPayload {
    pub(crate) fn into_teams(self) -> Vec<TeamSummary> {
        match self {
            TeamsPayload::Bare(teams) | TeamsPayload::Wrapped { teams } => teams,
        }
    }
}

// ---------------------------------------------------------------------------
// History series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryPoint {
    /// ISO date (`YYYY-MM-DD`) of the backend snapshot.
    pub date: String,
    pub bid_probability: Option<f64>,
    pub average_seed: Option<f64>,
    pub projected_conf_wins: Option<f64>,
}

/// Per-team time series (NCAA bids, CFP bids or projected conference wins).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamHistory {
    pub team_name: String,
    pub conference: String,
    pub logo_url: Option<String>,
    pub timeline: Vec<HistoryPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourneyRoundPoint {
    pub date: String,
    pub team_name: String,
    /// Round label as the backend names it (e.g. "Quarterfinals").
    pub round: String,
    pub probability: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfTourneyHistory {
    pub conference: String,
    pub rounds: Vec<String>,
    pub timeline: Vec<TourneyRoundPoint>,
}

impl ConfTourneyHistory {
    /// Latest probability per `(team, round)`, teams sorted by their deepest round odds.
    pub fn latest_by_team(&self) -> Vec<(String, Vec<Option<f64>>)> {
        let Some(latest) = self.timeline.iter().map(|p| p.date.as_str()).max() else {
            return Vec::new();
        };

        let mut teams: Vec<String> = self
            .timeline
            .iter()
            .filter(|p| p.date == latest)
            .map(|p| p.team_name.clone())
            .collect();
        teams.sort();
        teams.dedup();

        let mut rows: Vec<(String, Vec<Option<f64>>)> = teams
            .into_iter()
            .map(|team| {
                let cells = self
                    .rounds
                    .iter()
                    .map(|round| {
                        self.timeline
                            .iter()
                            .find(|p| p.date == latest && p.team_name == team && &p.round == round)
                            .map(|p| p.probability)
                    })
                    .collect();
                (team, cells)
            })
            .collect();

        rows.sort_by(|a, b| {
            let deepest = |cells: &Vec<Option<f64>>| cells.last().copied().flatten().unwrap_or(0.0);
            deepest(&b.1)
                .partial_cmp(&deepest(&a.1))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        rows
    }
}

// ---------------------------------------------------------------------------
// What-if scenario export
// ---------------------------------------------------------------------------

/// A forced game outcome for a what-if run, forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSelection {
    pub game_id: i64,
    pub winner_team_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioExportOptions {
    pub include_all_scenarios: bool,
    pub num_scenarios: u32,
    pub start_scenario: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatIfExportRequest {
    pub conference: String,
    pub selections: Vec<GameSelection>,
    pub export_options: ScenarioExportOptions,
}

/// A successful export: CSV text plus the filename the backend chose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhatIfExport {
    pub filename: String,
    pub csv_data: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WhatIfEnvelope {
    pub success: Option<bool>,
    pub csv_data: Option<String>,
    pub filename: Option<String>,
    pub error: Option<String>,
}
