use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{AsyncLogger, FileLogger, InMemoryLogger, Logger};
use crate::metric::{MetricEntry, MetricError, NumericEntry};

const EPOCH_PREFIX: &str = "epoch-";

/// Logs metric entries, grouped by metric name and epoch.
pub trait MetricLogger: Send {
    /// Logs an entry.
    fn log(&mut self, item: &MetricEntry);

    /// Marks the end of the given epoch; subsequent entries belong to the
    /// next one.
    fn end_epoch(&mut self, epoch: usize);

    /// Read back the numeric entries of a metric for an epoch.
    fn read_numeric(&mut self, name: &str, epoch: usize) -> Result<Vec<NumericEntry>, MetricError>;
}

/// The file metric logger.
///
/// Writes one `epoch-N` directory per epoch with one file per metric, a
/// serialized entry per line. Writing happens on a background thread per
/// metric.
pub struct FileMetricLogger {
    loggers: HashMap<String, AsyncLogger<String>>,
    directory: PathBuf,
    epoch: usize,
}

impl FileMetricLogger {
    /// Create a new file metric logger writing under the given directory.
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            loggers: HashMap::new(),
            directory: directory.as_ref().to_path_buf(),
            epoch: 1,
        }
    }

    /// Number of epochs recorded under the directory.
    pub fn epochs(&self) -> usize {
        let Ok(entries) = fs::read_dir(&self.directory) else {
            return 0;
        };

        entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter_map(|name| name.strip_prefix(EPOCH_PREFIX)?.parse::<usize>().ok())
            .max()
            .unwrap_or(0)
    }

    fn epoch_directory(&self, epoch: usize) -> PathBuf {
        self.directory.join(format!("{EPOCH_PREFIX}{epoch}"))
    }

    fn file_path(&self, name: &str, epoch: usize) -> PathBuf {
        let name = name.replace(' ', "_");
        self.epoch_directory(epoch).join(format!("{name}.log"))
    }
}

impl MetricLogger for FileMetricLogger {
    fn log(&mut self, item: &MetricEntry) {
        if !self.loggers.contains_key(&item.name) {
            fs::create_dir_all(self.epoch_directory(self.epoch))
                .expect("Should be able to create the epoch directory.");

            let file_path = self.file_path(&item.name, self.epoch);
            let logger = AsyncLogger::new(FileLogger::new(file_path));
            self.loggers.insert(item.name.clone(), logger);
        }

        if let Some(logger) = self.loggers.get_mut(&item.name) {
            logger.log(item.serialize.clone());
        }
    }

    fn end_epoch(&mut self, epoch: usize) {
        self.loggers.clear();
        self.epoch = epoch + 1;
    }

    fn read_numeric(&mut self, name: &str, epoch: usize) -> Result<Vec<NumericEntry>, MetricError> {
        if let Some(logger) = self.loggers.get(name) {
            logger.sync();
        }

        let file_path = self.file_path(name, epoch);
        let content = fs::read_to_string(file_path).unwrap_or_default();

        content
            .lines()
            .filter(|line| !line.is_empty())
            .map(NumericEntry::deserialize)
            .collect()
    }
}

/// In memory metric logger, useful when testing and debugging.
#[derive(Default)]
pub struct InMemoryMetricLogger {
    values: HashMap<String, Vec<InMemoryLogger>>,
}

impl InMemoryMetricLogger {
    /// Create a new in-memory metric logger.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetricLogger for InMemoryMetricLogger {
    fn log(&mut self, item: &MetricEntry) {
        let loggers = self
            .values
            .entry(item.name.clone())
            .or_insert_with(|| vec![InMemoryLogger::default()]);

        if let Some(logger) = loggers.last_mut() {
            logger.log(item.serialize.clone());
        }
    }

    fn end_epoch(&mut self, _epoch: usize) {
        for loggers in self.values.values_mut() {
            loggers.push(InMemoryLogger::default());
        }
    }

    fn read_numeric(&mut self, name: &str, epoch: usize) -> Result<Vec<NumericEntry>, MetricError> {
        let Some(loggers) = self.values.get(name) else {
            return Ok(Vec::new());
        };

        match loggers.get(epoch - 1) {
            Some(logger) => logger
                .values
                .iter()
                .map(|value| NumericEntry::deserialize(value))
                .collect(),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, value: f64) -> MetricEntry {
        MetricEntry::new(
            name.to_string(),
            format!("{value}"),
            NumericEntry::Value(value).serialize(),
        )
    }

    #[test]
    fn in_memory_round_trip() {
        let mut logger = InMemoryMetricLogger::new();

        logger.log(&entry("Loss", 2.0));
        logger.log(&entry("Loss", 4.0));
        logger.end_epoch(1);
        logger.log(&entry("Loss", 1.0));

        assert_eq!(
            vec![NumericEntry::Value(2.0), NumericEntry::Value(4.0)],
            logger.read_numeric("Loss", 1).unwrap()
        );
        assert_eq!(
            vec![NumericEntry::Value(1.0)],
            logger.read_numeric("Loss", 2).unwrap()
        );
    }

    #[test]
    fn in_memory_unknown_metric_is_empty() {
        let mut logger = InMemoryMetricLogger::new();

        assert!(logger.read_numeric("Accuracy", 1).unwrap().is_empty());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = FileMetricLogger::new(dir.path());

        logger.log(&entry("Loss", 2.0));
        logger.log(&entry("Loss", 4.0));

        assert_eq!(
            vec![NumericEntry::Value(2.0), NumericEntry::Value(4.0)],
            logger.read_numeric("Loss", 1).unwrap()
        );
    }

    #[test]
    fn file_logger_splits_epoch_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = FileMetricLogger::new(dir.path());

        logger.log(&entry("Loss", 2.0));
        logger.end_epoch(1);
        logger.log(&entry("Loss", 1.0));
        logger.read_numeric("Loss", 2).unwrap();

        assert!(dir.path().join("epoch-1").join("Loss.log").exists());
        assert!(dir.path().join("epoch-2").join("Loss.log").exists());
        assert_eq!(2, logger.epochs());
    }

    #[test]
    fn file_logger_sanitizes_metric_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = FileMetricLogger::new(dir.path());

        logger.log(&entry("Running Loss", 2.0));
        logger.read_numeric("Running Loss", 1).unwrap();

        assert!(dir.path().join("epoch-1").join("Running_Loss.log").exists());
    }

    #[test]
    fn epochs_is_zero_without_logs() {
        let dir = tempfile::tempdir().unwrap();
        let logger = FileMetricLogger::new(dir.path().join("missing"));

        assert_eq!(0, logger.epochs());
    }
}
