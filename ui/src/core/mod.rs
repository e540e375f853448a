//! Cross-cutting helpers shared by pages and the export pipeline.

pub mod config;
pub mod error;
pub mod format;
pub mod platform;
pub mod sport;
