//! File — line source backed by a log file on the local filesystem.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::{LineIter, LineSource};

/// Reads a server log snapshot line by line.
///
/// The file is opened fresh on every [`lines`](LineSource::lines) call, so
/// a scanner holding this source always sees the file as it is now, not as
/// it was at construction. Lines are decoded lossily: undecodable bytes
/// come through as U+FFFD instead of failing the read.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineSource for FileSource {
    fn available(&self) -> bool {
        self.path.is_file()
    }

    fn lines(&self) -> io::Result<LineIter> {
        let file = File::open(&self.path)?;
        let mut reader = BufReader::new(file);
        // Raw reads, lossy decoding. Player names can carry arbitrary
        // bytes; those are data, not read errors.
        let iter = std::iter::from_fn(move || {
            let mut buf = Vec::new();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => None,
                Ok(_) => {
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                        if buf.last() == Some(&b'\r') {
                            buf.pop();
                        }
                    }
                    Some(Ok(String::from_utf8_lossy(&buf).into_owned()))
                }
                Err(err) => Some(Err(err)),
            }
        });
        Ok(Box::new(iter))
    }
}
