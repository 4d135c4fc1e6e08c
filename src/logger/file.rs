use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use super::Logger;

/// File logger, writing one item per line.
///
/// Lines are written unbuffered so readers see every logged item as soon as
/// [`log`](Logger::log) returns.
pub struct FileLogger {
    file: File,
}

impl FileLogger {
    /// Create a new file logger, appending to the file at the given path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .expect("Should be able to create the log file.");

        Self { file }
    }
}

impl<T> Logger<T> for FileLogger
where
    T: std::fmt::Display,
{
    fn log(&mut self, item: T) {
        writeln!(self.file, "{item}").expect("Can log an item to the file.");
    }
}
