//! Source — where the scanner pulls raw log lines from.
//!
//! Production reads a log file snapshot through [`FileSource`]; tests feed
//! canned lines through [`MemorySource`]. Anything that can hand out an
//! ordered, finite supply of lines can implement [`LineSource`].

use std::io;

mod file;
mod memory;

pub use file::FileSource;
pub use memory::MemorySource;

/// Boxed line iterator returned by [`LineSource::lines`].
pub type LineIter = Box<dyn Iterator<Item = io::Result<String>> + Send>;

pub trait LineSource {
    /// Whether the configured origin currently resolves to readable data.
    fn available(&self) -> bool;

    /// Open the source and yield its lines front to back.
    fn lines(&self) -> io::Result<LineIter>;
}
