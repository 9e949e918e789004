//! CLI commands for wmdr

pub mod dispatch;
pub mod evaluate;
pub mod format;
pub mod metrics;
pub mod rules;
