//! Shared components used by every page.

pub mod app_navbar;
pub mod error_card;
pub mod export_options_modal;
pub mod history_chart;
pub mod screenshot_modal;
pub mod standings_table;

pub use app_navbar::{register_nav, use_active_language, AppNavbar, NavBuilder};
pub use error_card::{ErrorCard, LoadingCard};
pub use export_options_modal::ScenarioExportModal;
pub use history_chart::{ChartSeries, HistoryChart, ValueFormat, PALETTE};
pub use screenshot_modal::ScreenshotModal;
pub use standings_table::StandingsTable;
