//! Shared UI crate for Seedline: pages, components, hooks and the export
//! pipeline used by both the web and desktop launchers.

pub mod components;
pub mod core;
pub mod export;
pub mod hooks;
pub mod i18n;
pub mod views;
