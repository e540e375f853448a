//! Scenario (CSV) export: validate the requested range, post one request,
//! download what comes back.

use std::time::Duration;

use api::{
    ApiResult, BackendApi, GameSelection, ScenarioExportOptions, WhatIfExport, WhatIfExportRequest,
};
use futures::future::LocalBoxFuture;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::export::delivery::{Deliver, ExportFile};

pub const MAX_SCENARIOS: u32 = 1000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Number of scenarios must be between 1 and {MAX_SCENARIOS} (got {0})")]
    CountOutOfRange(u32),
    #[error("Starting scenario must be between 1 and {MAX_SCENARIOS} (got {0})")]
    StartOutOfRange(u32),
    #[error("Starting at scenario {start}, you can export at most {max_count} scenarios")]
    RangeOverflow { start: u32, max_count: u32 },
}

/// What the user typed into the export modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub include_all_scenarios: bool,
    pub num_scenarios: u32,
    pub start_scenario: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_all_scenarios: false,
            num_scenarios: 100,
            start_scenario: 1,
        }
    }
}

/// A validated, inclusive scenario window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioRange {
    pub start: u32,
    pub count: u32,
}

impl ScenarioRange {
    pub const ALL: ScenarioRange = ScenarioRange {
        start: 1,
        count: MAX_SCENARIOS,
    };

    pub fn last(&self) -> u32 {
        self.start + self.count - 1
    }
}

impl ExportOptions {
    pub fn validate(&self) -> Result<ScenarioRange, ValidationError> {
        if self.include_all_scenarios {
            return Ok(ScenarioRange::ALL);
        }
        let (start, count) = (self.start_scenario, self.num_scenarios);
        if !(1..=MAX_SCENARIOS).contains(&count) {
            return Err(ValidationError::CountOutOfRange(count));
        }
        if !(1..=MAX_SCENARIOS).contains(&start) {
            return Err(ValidationError::StartOutOfRange(start));
        }
        let max_count = MAX_SCENARIOS - start + 1;
        if count > max_count {
            return Err(ValidationError::RangeOverflow { start, max_count });
        }
        Ok(ScenarioRange { start, count })
    }

    /// Wire options for a validated range.
    pub fn to_wire(&self, range: ScenarioRange) -> ScenarioExportOptions {
        ScenarioExportOptions {
            include_all_scenarios: self.include_all_scenarios,
            num_scenarios: range.count,
            start_scenario: range.start,
        }
    }
}

/// Rough wait shown while the backend simulates: 3 s plus 40 ms per
/// scenario, rounded up to whole seconds.
pub fn estimated_wait(count: u32) -> Duration {
    let millis = 3_000 + 40 * u64::from(count);
    Duration::from_secs(millis.div_ceil(1_000))
}

/// Payload handed to the completion callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportCompletion {
    pub success: bool,
    pub filename: String,
    pub scenarios: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportState {
    Idle { error: Option<String> },
    Validating,
    Requesting { range: ScenarioRange },
    Success(ExportCompletion),
    Failed(String),
}

impl Default for ExportState {
    fn default() -> Self {
        ExportState::Idle { error: None }
    }
}

impl ExportState {
    pub fn is_busy(&self) -> bool {
        matches!(self, ExportState::Validating | ExportState::Requesting { .. })
    }

    /// Inline message for the modal, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            ExportState::Idle { error } => error.as_deref(),
            ExportState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

pub trait ScenarioBackend {
    fn export_scenarios<'a>(
        &'a self,
        request: &'a WhatIfExportRequest,
    ) -> LocalBoxFuture<'a, ApiResult<WhatIfExport>>;
}

impl ScenarioBackend for BackendApi {
    fn export_scenarios<'a>(
        &'a self,
        request: &'a WhatIfExportRequest,
    ) -> LocalBoxFuture<'a, ApiResult<WhatIfExport>> {
        Box::pin(self.export_whatif(request))
    }
}

/// One validate/request/download pass. Every state change is reported
/// through `on_state`; the final state is also returned.
pub struct ScenarioExporter<'a> {
    backend: &'a dyn ScenarioBackend,
    delivery: &'a dyn Deliver,
}

impl<'a> ScenarioExporter<'a> {
    pub fn new(backend: &'a dyn ScenarioBackend, delivery: &'a dyn Deliver) -> Self {
        Self { backend, delivery }
    }

    pub async fn run(
        &self,
        conference: &str,
        selections: Vec<GameSelection>,
        options: ExportOptions,
        mut on_state: impl FnMut(&ExportState),
    ) -> ExportState {
        let mut report = |state: ExportState| {
            on_state(&state);
            state
        };

        report(ExportState::Validating);
        let range = match options.validate() {
            Ok(range) => range,
            Err(err) => {
                debug!(%err, "scenario range rejected");
                return report(ExportState::Idle {
                    error: Some(err.to_string()),
                });
            }
        };

        report(ExportState::Requesting { range });
        let request = WhatIfExportRequest {
            conference: conference.to_string(),
            selections,
            export_options: options.to_wire(range),
        };
        info!(
            conference,
            start = range.start,
            count = range.count,
            "requesting scenario export"
        );

        let export = match self.backend.export_scenarios(&request).await {
            Ok(export) => export,
            Err(err) => {
                warn!(%err, "scenario export failed");
                return report(ExportState::Failed(err.to_string()));
            }
        };

        let filename = export.filename;
        if let Err(err) = self
            .delivery
            .deliver(ExportFile::csv(filename.clone(), export.csv_data))
            .await
        {
            warn!(%err, "scenario CSV delivery failed");
            return report(ExportState::Failed(err.to_string()));
        }

        info!(%filename, "scenario export delivered");
        report(ExportState::Success(ExportCompletion {
            success: true,
            filename,
            scenarios: range.count,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use api::ApiError;

    use super::*;
    use crate::core::error::ExportError;
    use crate::export::delivery::Delivery;

    struct FakeBackend {
        calls: RefCell<Vec<WhatIfExportRequest>>,
        fail_with: Option<String>,
    }

    impl FakeBackend {
        fn ok() -> Self {
            Self {
                calls: RefCell::new(vec![]),
                fail_with: None,
            }
        }
    }

    impl ScenarioBackend for FakeBackend {
        fn export_scenarios<'a>(
            &'a self,
            request: &'a WhatIfExportRequest,
        ) -> LocalBoxFuture<'a, ApiResult<WhatIfExport>> {
            self.calls.borrow_mut().push(request.clone());
            let outcome = match &self.fail_with {
                Some(message) => Err(ApiError::Backend(message.clone())),
                None => Ok(WhatIfExport {
                    filename: "acc_whatif_2025-03-08.csv".into(),
                    csv_data: "scenario,champion\n1,Duke\n".into(),
                }),
            };
            Box::pin(async move { outcome })
        }
    }

    #[derive(Default)]
    struct Downloads {
        files: RefCell<Vec<ExportFile>>,
        delivered: Cell<usize>,
    }

    impl Deliver for Downloads {
        fn deliver(&self, file: ExportFile) -> LocalBoxFuture<'_, Result<Delivery, ExportError>> {
            self.files.borrow_mut().push(file);
            self.delivered.set(self.delivered.get() + 1);
            Box::pin(async { Ok(Delivery::Downloaded) })
        }
    }

    fn options(start: u32, count: u32) -> ExportOptions {
        ExportOptions {
            include_all_scenarios: false,
            num_scenarios: count,
            start_scenario: start,
        }
    }

    #[test]
    fn overflowing_range_names_the_remaining_count() {
        let err = options(990, 50).validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::RangeOverflow {
                start: 990,
                max_count: 11
            }
        );
        assert!(err.to_string().contains("11"));
    }

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(
            options(1, 1000).validate(),
            Ok(ScenarioRange {
                start: 1,
                count: 1000
            })
        );
        assert_eq!(options(1000, 1).validate().map(|r| r.last()), Ok(1000));
        assert_eq!(
            options(1, 0).validate(),
            Err(ValidationError::CountOutOfRange(0))
        );
        assert_eq!(
            options(0, 5).validate(),
            Err(ValidationError::StartOutOfRange(0))
        );
        assert_eq!(
            options(1, 1001).validate(),
            Err(ValidationError::CountOutOfRange(1001))
        );
    }

    #[test]
    fn include_all_ignores_typed_values() {
        let typed = ExportOptions {
            include_all_scenarios: true,
            num_scenarios: 0,
            start_scenario: 999,
        };
        assert_eq!(typed.validate(), Ok(ScenarioRange::ALL));
    }

    #[test]
    fn wait_estimate_rounds_up() {
        assert_eq!(estimated_wait(0), Duration::from_secs(3));
        assert_eq!(estimated_wait(1), Duration::from_secs(4));
        assert_eq!(estimated_wait(1000), Duration::from_secs(43));
    }

    #[tokio::test]
    async fn invalid_range_never_reaches_the_backend() {
        let backend = FakeBackend::ok();
        let downloads = Downloads::default();
        let mut seen = Vec::new();

        let state = ScenarioExporter::new(&backend, &downloads)
            .run("ACC", vec![], options(990, 50), |s| seen.push(s.clone()))
            .await;

        assert!(backend.calls.borrow().is_empty());
        assert_eq!(downloads.delivered.get(), 0);
        assert!(matches!(&state, ExportState::Idle { error: Some(msg) } if msg.contains("11")));
        assert_eq!(seen.first(), Some(&ExportState::Validating));
        assert_eq!(seen.len(), 2);
    }

    #[tokio::test]
    async fn include_all_posts_the_full_window_and_downloads_verbatim() {
        let backend = FakeBackend::ok();
        let downloads = Downloads::default();
        let selections = vec![GameSelection {
            game_id: 401,
            winner_team_id: "duke".into(),
        }];
        let all = ExportOptions {
            include_all_scenarios: true,
            ..options(500, 20)
        };
        let mut seen = Vec::new();

        let state = ScenarioExporter::new(&backend, &downloads)
            .run("ACC", selections.clone(), all, |s| seen.push(s.clone()))
            .await;

        let calls = backend.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].selections, selections);
        assert_eq!(calls[0].export_options.start_scenario, 1);
        assert_eq!(calls[0].export_options.num_scenarios, 1000);
        assert!(calls[0].export_options.include_all_scenarios);

        let files = downloads.files.borrow();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "acc_whatif_2025-03-08.csv");
        assert_eq!(files[0].mime, "text/csv");
        assert_eq!(
            state,
            ExportState::Success(ExportCompletion {
                success: true,
                filename: "acc_whatif_2025-03-08.csv".into(),
                scenarios: 1000,
            })
        );
        assert!(seen.contains(&ExportState::Requesting {
            range: ScenarioRange::ALL
        }));
    }

    #[tokio::test]
    async fn backend_message_is_surfaced_and_nothing_downloads() {
        let backend = FakeBackend {
            fail_with: Some("Conference not found".into()),
            ..FakeBackend::ok()
        };
        let downloads = Downloads::default();

        let state = ScenarioExporter::new(&backend, &downloads)
            .run("XYZ", vec![], options(1, 10), |_| {})
            .await;

        assert_eq!(state, ExportState::Failed("Conference not found".into()));
        assert_eq!(state.error(), Some("Conference not found"));
        assert_eq!(downloads.delivered.get(), 0);
    }
}
