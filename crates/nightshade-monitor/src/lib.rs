//! # Nightshade Monitor
//!
//! Watches appearance transitions and re-renders targets whose resolved
//! colors changed. Only targets that are already displaying an image are
//! re-rendered; the initial render picks up the current appearance itself.

pub mod monitor;

pub use monitor::{AppearanceMonitor, AppearanceTracker, ChangeOutcome};
