//! Hand proximity monitor.
//!
//! This crate provides:
//! - Environment configuration
//! - Session control with camera fallback and restart
//! - A control handle for runtime zone and performance changes
//! - An append-only JSON Lines alert log
//! - Console presentation and the end-of-session report

pub mod config;
pub mod control;
pub mod error;
pub mod logging;
pub mod presenter;
pub mod session;
pub mod session_log;

pub use config::{MonitorConfig, PerformanceOverrides};
pub use control::ControlHandle;
pub use error::{MonitorError, MonitorResult};
pub use logging::SessionLogger;
pub use presenter::ConsolePresenter;
pub use session::{MonitorSession, SessionReport};
pub use session_log::SessionLog;
