use crate::{
    ConfTourneyHistory, TeamHistory, TeamSummary, TeamsPayload, WhatIfEnvelope, WhatIfExport,
    WhatIfExportRequest,
};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub type ApiResult<T> = Result<T, ApiError>;

const PROXY_PREFIX: [&str; 2] = ["api", "proxy"];

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error for {1}: {0}")]
    Network(#[source] reqwest::Error, String),
    #[error("API error for {url}: HTTP {status}")]
    Status { status: u16, url: String },
    #[error("Parse error for {1}: {0}")]
    Parsing(String, String),
    /// The backend answered but reported a failure of its own.
    #[error("{0}")]
    Backend(String),
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

/// Client for the `/api/proxy/*` backend routes.
#[derive(Debug, Clone)]
pub struct BackendApi {
    client: Client,
    base_url: String,
    #[cfg(not(target_arch = "wasm32"))]
    timeout: Duration,
}

impl BackendApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        let client = Client::builder()
            .user_agent(concat!("seedline/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        #[cfg(target_arch = "wasm32")]
        let client = Client::new();

        Self {
            client,
            base_url: base_url.into(),
            #[cfg(not(target_arch = "wasm32"))]
            timeout: Duration::from_secs(10),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn basketball_teams(&self) -> ApiResult<Vec<TeamSummary>> {
        let url = self.endpoint(&["basketball_teams"])?;
        Ok(self.get::<TeamsPayload>(url).await?.into_teams())
    }

    pub async fn football_teams(&self) -> ApiResult<Vec<TeamSummary>> {
        let url = self.endpoint(&["football_teams"])?;
        Ok(self.get::<TeamsPayload>(url).await?.into_teams())
    }

    /// NCAA tournament bid and seed history for one basketball team.
    pub async fn basketball_team_history(&self, team: &str) -> ApiResult<TeamHistory> {
        let url = self.endpoint(&["basketball", "ncaa", team, "history"])?;
        self.get(url).await
    }

    /// CFP bid and seed history for one football team.
    pub async fn football_team_history(&self, team: &str) -> ApiResult<TeamHistory> {
        let url = self.endpoint(&["football", "cfp", team, "history"])?;
        self.get(url).await
    }

    pub async fn conf_tourney_history(&self, conference: &str) -> ApiResult<ConfTourneyHistory> {
        let url = self.endpoint(&["conf_tourney", conference, "history"])?;
        self.get(url).await
    }

    pub async fn football_conf_wins_history(&self, team: &str) -> ApiResult<TeamHistory> {
        let url = self.endpoint(&["football", "team", team, "history", "conf_wins"])?;
        self.get(url).await
    }

    /// Request a CSV of simulated scenarios for a what-if selection set.
    ///
    /// All-or-nothing: either the full CSV comes back or an error carrying the
    /// backend's message (or a generic one when it sent none).
    pub async fn export_whatif(&self, request: &WhatIfExportRequest) -> ApiResult<WhatIfExport> {
        let url = self.endpoint(&["football", "whatif", "export"])?;
        let url_text = url.to_string();
        debug!(
            conference = %request.conference,
            selections = request.selections.len(),
            "posting what-if export"
        );

        let builder = self.client.post(url).json(request);
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(self.timeout);

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url_text.clone()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e, url_text.clone()))?;
        let envelope: WhatIfEnvelope = serde_json::from_str(&body).unwrap_or_default();

        if !status.is_success() {
            warn!(status = status.as_u16(), "what-if export rejected");
            return Err(ApiError::Backend(envelope.error.unwrap_or_else(|| {
                format!("Export failed (HTTP {})", status.as_u16())
            })));
        }

        match envelope {
            WhatIfEnvelope {
                success: Some(true),
                csv_data: Some(csv_data),
                filename,
                ..
            } => Ok(WhatIfExport {
                filename: filename.unwrap_or_else(|| {
                    format!("{}_scenarios.csv", request.conference.replace(' ', "_"))
                }),
                csv_data,
            }),
            WhatIfEnvelope { error, .. } => Err(ApiError::Backend(
                error.unwrap_or_else(|| "Export failed: response had no CSV data".to_string()),
            )),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|_| ApiError::InvalidUrl(self.base_url.clone()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(PROXY_PREFIX)
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        let url_text = url.to_string();
        let builder = self.client.get(url);
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(self.timeout);

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url_text.clone()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url_text,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e.to_string(), url_text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameSelection, ScenarioExportOptions};
    use mockito::Matcher;
    use serde_json::json;

    fn request(include_all: bool) -> WhatIfExportRequest {
        WhatIfExportRequest {
            conference: "Big 12".into(),
            selections: vec![GameSelection {
                game_id: 401_628_374,
                winner_team_id: "251".into(),
            }],
            export_options: ScenarioExportOptions {
                include_all_scenarios: include_all,
                num_scenarios: 100,
                start_scenario: 1,
            },
        }
    }

    #[test]
    fn endpoint_joins_and_encodes_segments() {
        let api = BackendApi::new("http://localhost:8080/");
        let url = api
            .endpoint(&["basketball", "ncaa", "North Carolina", "history"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/proxy/basketball/ncaa/North%20Carolina/history"
        );
    }

    #[test]
    fn endpoint_rejects_relative_base() {
        let api = BackendApi::new("");
        assert!(matches!(
            api.endpoint(&["football_teams"]),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn basketball_teams_parses_roster() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/proxy/basketball_teams")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([
                    {"team_name": "Houston", "conference": "Big 12", "wins": 30, "losses": 4, "cwv": 2.41},
                    {"team_name": "Kansas", "conference": "Big 12", "wins": 21, "losses": 12}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let api = BackendApi::new(server.url());
        let teams = api.basketball_teams().await.unwrap();

        mock.assert_async().await;
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].cwv, Some(2.41));
        assert_eq!(teams[1].losses, 12);
    }

    #[tokio::test]
    async fn history_requests_encoded_team_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                Matcher::Regex(r"^/api/proxy/football/cfp/Ohio(%20| )State/history$".into()),
            )
            .with_status(200)
            .with_body(
                json!({
                    "team_name": "Ohio State",
                    "timeline": [{"date": "2025-11-01", "bid_probability": 0.82, "average_seed": 4.1}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let api = BackendApi::new(server.url());
        let history = api.football_team_history("Ohio State").await.unwrap();

        mock.assert_async().await;
        assert_eq!(history.timeline.len(), 1);
        assert_eq!(history.timeline[0].average_seed, Some(4.1));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/proxy/conf_tourney/SEC/history")
            .with_status(503)
            .create_async()
            .await;

        let api = BackendApi::new(server.url());
        let err = api.conf_tourney_history("SEC").await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn whatif_export_returns_csv_and_backend_filename() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/proxy/football/whatif/export")
            .match_body(Matcher::PartialJson(json!({
                "conference": "Big 12",
                "selections": [{"game_id": 401_628_374, "winner_team_id": "251"}],
                "export_options": {"include_all_scenarios": false, "num_scenarios": 100, "start_scenario": 1}
            })))
            .with_status(200)
            .with_body(
                json!({"success": true, "csv_data": "scenario,team\n1,Texas\n", "filename": "big12_whatif.csv"})
                    .to_string(),
            )
            .create_async()
            .await;

        let api = BackendApi::new(server.url());
        let export = api.export_whatif(&request(false)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(export.filename, "big12_whatif.csv");
        assert!(export.csv_data.starts_with("scenario,team"));
    }

    #[tokio::test]
    async fn whatif_export_surfaces_server_error_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/proxy/football/whatif/export")
            .with_status(400)
            .with_body(json!({"error": "Unknown conference"}).to_string())
            .create_async()
            .await;

        let api = BackendApi::new(server.url());
        let err = api.export_whatif(&request(true)).await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown conference");
    }

    #[tokio::test]
    async fn whatif_export_without_csv_is_a_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/proxy/football/whatif/export")
            .with_status(200)
            .with_body(json!({"success": false}).to_string())
            .create_async()
            .await;

        let api = BackendApi::new(server.url());
        let err = api.export_whatif(&request(false)).await.unwrap_err();
        assert!(matches!(err, ApiError::Backend(_)));
    }

    #[tokio::test]
    async fn whatif_export_generic_message_for_bare_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/proxy/football/whatif/export")
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let api = BackendApi::new(server.url());
        let err = api.export_whatif(&request(false)).await.unwrap_err();
        assert_eq!(err.to_string(), "Export failed (HTTP 500)");
    }
}
