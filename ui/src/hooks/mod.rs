//! UI-state hooks shared by pages.

pub mod breakpoint;
pub mod conference;

pub use breakpoint::Breakpoint;
pub use conference::{conference_list, standings_for, use_conference_selection};
