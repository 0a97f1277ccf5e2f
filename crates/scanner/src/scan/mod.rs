//! Scan — match reconstruction from raw server log lines.
//!
//! `event` classifies single lines and extracts their fields, `session`
//! runs the per-scan state machine, and `scanner` ties settings, source
//! and session together behind the public entry point.

mod event;
mod scanner;
mod session;

pub use scanner::{LogScanner, ScanError};
pub use session::ScanSession;
