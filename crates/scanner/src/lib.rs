// Domain-driven module structure for the log scanner.

pub mod model;
pub mod scan;
pub mod serde_utils;
pub mod settings;
pub mod source;

// Re-export commonly used types
pub use model::{Game, LabeledGame, ScanReport, ScanStats};
pub use scan::{LogScanner, ScanError, ScanSession};
pub use settings::{MatchStartPolicy, ScannerSettings};
pub use source::{FileSource, LineIter, LineSource, MemorySource};
