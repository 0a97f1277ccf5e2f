//! Scanner — the public entry point for reconstructing matches.

use thiserror::Error;
use tracing::debug;

use crate::model::ScanReport;
use crate::settings::ScannerSettings;
use crate::source::LineSource;

use super::session::ScanSession;

#[derive(Debug, Error)]
pub enum ScanError {
    /// Settings rejected at construction.
    #[error("Invalid scanner settings: {0}")]
    Config(String),

    /// The configured source did not resolve at construction.
    #[error("Log source not found: {0}")]
    SourceNotFound(String),

    /// Reading the source failed.
    #[error("Failed to read log source: {0}")]
    Io(#[from] std::io::Error),
}

/// Single-pass log scanner.
///
/// Immutable after construction; every [`scan`](LogScanner::scan) call
/// builds a private session, so a shared scanner can serve concurrent
/// callers and repeated scans of an unchanged source agree.
pub struct LogScanner {
    settings: ScannerSettings,
    source: Box<dyn LineSource + Send + Sync>,
}

impl LogScanner {
    /// Validate settings and check the source up front, so a misconfigured
    /// scanner fails here rather than on its first scan.
    pub fn new<S>(settings: ScannerSettings, source: S) -> Result<Self, ScanError>
    where
        S: LineSource + Send + Sync + 'static,
    {
        settings.validate().map_err(ScanError::Config)?;
        if !source.available() {
            return Err(ScanError::SourceNotFound(settings.log_path.clone()));
        }
        Ok(Self {
            settings,
            source: Box::new(source),
        })
    }

    /// Whether the source still resolves. It may disappear after
    /// construction, e.g. a log file rotated away underneath us.
    pub fn source_available(&self) -> bool {
        self.source.available()
    }

    pub fn settings(&self) -> &ScannerSettings {
        &self.settings
    }

    /// Walk the source once and reconstruct every match it holds.
    pub fn scan(&self) -> Result<ScanReport, ScanError> {
        let mut session = ScanSession::new(self.settings.match_start);
        for line in self.source.lines()? {
            session.feed(&line?);
        }
        let report = session.finish();
        debug!(
            lines = report.stats.lines,
            games = report.games.len(),
            "scan finished"
        );
        Ok(report)
    }
}
