//! Memory — deterministic in-memory line source for tests.
//!
//! Yields a canned set of lines without touching the filesystem.
//! Availability can be flipped after construction and reads can be made to
//! fail partway through, to exercise the scanner's error paths.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{LineIter, LineSource};

#[derive(Debug, Clone)]
pub struct MemorySource {
    lines: Vec<String>,
    available: Arc<AtomicBool>,
    fail_after: Option<usize>,
}

impl MemorySource {
    /// Create a source yielding the given lines in order.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            available: Arc::new(AtomicBool::new(true)),
            fail_after: None,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::<String>::new())
    }

    /// Flip availability, e.g. to simulate a log file deleted at runtime.
    /// Clones share the flag, so a handle kept by a test still controls a
    /// source that was moved into a scanner.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Yield an I/O error after `n` good lines.
    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }
}

impl LineSource for MemorySource {
    fn available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn lines(&self) -> io::Result<LineIter> {
        if !self.available() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "line source marked unavailable",
            ));
        }

        let mut lines: Vec<io::Result<String>> = self.lines.iter().cloned().map(Ok).collect();
        if let Some(n) = self.fail_after {
            lines.truncate(n);
            lines.push(Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "injected read failure",
            )));
        }
        Ok(Box::new(lines.into_iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yields_lines_in_order() {
        let source = MemorySource::new(["a", "b", "c"]);
        let lines: Vec<String> = source.lines().unwrap().map(|l| l.unwrap()).collect();
        assert_eq!(lines, ["a", "b", "c"]);
    }

    #[test]
    fn test_empty_source() {
        let source = MemorySource::empty();
        assert!(source.available());
        assert_eq!(source.lines().unwrap().count(), 0);
    }

    #[test]
    fn test_unavailable_source_refuses_to_open() {
        let source = MemorySource::new(["a"]);
        source.set_available(false);
        assert!(!source.available());
        assert!(source.lines().is_err());
    }

    #[test]
    fn test_clones_share_availability() {
        let source = MemorySource::new(["a"]);
        let handle = source.clone();
        handle.set_available(false);
        assert!(!source.available());
    }

    #[test]
    fn test_fail_after_injects_error() {
        let source = MemorySource::new(["a", "b", "c"]).fail_after(2);
        let results: Vec<io::Result<String>> = source.lines().unwrap().collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(results[2].is_err());
    }
}
