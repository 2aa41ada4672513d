//! # JSONL Telemetry Logger
//!
//! Appends [`TelemetryRecord`]s to `telemetry_<timestamp>_<seq>.jsonl` files
//! in a log directory, starting a new file every `max_records_per_file`
//! records and deleting the oldest files beyond `max_files_to_keep`.

use chrono::Local;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::TelemetryRecord;
use crate::error::Result;

const FILE_PREFIX: &str = "telemetry_";
const FILE_EXTENSION: &str = "jsonl";

/// Rotating JSONL writer
#[derive(Debug)]
pub struct JsonlLogger {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    records_in_file: usize,
    file_seq: u32,
}

impl JsonlLogger {
    /// Create a logger writing into `dir`, creating it if needed
    ///
    /// No file is opened until the first record is written.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn new<P: AsRef<Path>>(dir: P, max_records_per_file: usize, max_files_to_keep: usize) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        info!("Telemetry logging to {}", dir.display());

        Ok(Self {
            dir,
            max_records_per_file: max_records_per_file.max(1),
            max_files_to_keep: max_files_to_keep.max(1),
            writer: None,
            records_in_file: 0,
            file_seq: 0,
        })
    }

    /// Append one record, rotating files as needed
    ///
    /// # Errors
    ///
    /// Returns error on serialization or I/O failure
    pub fn write(&mut self, record: &TelemetryRecord) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        let line = serde_json::to_string(record)?;
        if let Some(writer) = self.writer.as_mut() {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        self.records_in_file += 1;
        Ok(())
    }

    /// Flush buffered records to disk
    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    /// Telemetry files currently in the log directory, oldest first
    pub fn log_files(&self) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_telemetry_file(path))
            .collect();
        files.sort();
        Ok(files)
    }

    fn rotate(&mut self) -> Result<()> {
        self.flush()?;

        let name = format!(
            "{}{}_{:04}.{}",
            FILE_PREFIX,
            Local::now().format("%Y%m%d_%H%M%S"),
            self.file_seq,
            FILE_EXTENSION
        );
        self.file_seq = self.file_seq.wrapping_add(1);

        let path = self.dir.join(name);
        let file = File::create(&path)?;
        debug!("Opened telemetry file {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.records_in_file = 0;

        self.prune()
    }

    fn prune(&self) -> Result<()> {
        let files = self.log_files()?;
        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        let excess = files.len() - self.max_files_to_keep;
        for path in files.into_iter().take(excess) {
            if let Err(e) = fs::remove_file(&path) {
                warn!("Failed to remove old telemetry file {}: {}", path.display(), e);
            } else {
                debug!("Removed old telemetry file {}", path.display());
            }
        }
        Ok(())
    }
}

impl Drop for JsonlLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("Failed to flush telemetry on shutdown: {}", e);
        }
    }
}

fn is_telemetry_file(path: &Path) -> bool {
    let name_ok = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(FILE_PREFIX));
    let ext_ok = path.extension().and_then(|e| e.to_str()) == Some(FILE_EXTENSION);
    name_ok && ext_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::FrameReport;
    use tempfile::TempDir;

    fn record() -> TelemetryRecord {
        TelemetryRecord::from_report(&FrameReport::default())
    }

    fn count_lines(path: &Path) -> usize {
        fs::read_to_string(path).unwrap().lines().count()
    }

    #[test]
    fn test_no_file_before_first_write() {
        let dir = TempDir::new().unwrap();
        let logger = JsonlLogger::new(dir.path(), 10, 3).unwrap();
        assert!(logger.log_files().unwrap().is_empty());
    }

    #[test]
    fn test_writes_json_lines() {
        let dir = TempDir::new().unwrap();
        let mut logger = JsonlLogger::new(dir.path(), 10, 3).unwrap();

        for _ in 0..4 {
            logger.write(&record()).unwrap();
        }
        logger.flush().unwrap();

        let files = logger.log_files().unwrap();
        assert_eq!(files.len(), 1);

        let contents = fs::read_to_string(&files[0]).unwrap();
        assert_eq!(contents.lines().count(), 4);
        for line in contents.lines() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["device"], 0);
        }
    }

    #[test]
    fn test_rotates_after_max_records() {
        let dir = TempDir::new().unwrap();
        let mut logger = JsonlLogger::new(dir.path(), 3, 10).unwrap();

        for _ in 0..7 {
            logger.write(&record()).unwrap();
        }
        logger.flush().unwrap();

        let files = logger.log_files().unwrap();
        assert_eq!(files.len(), 3);
        assert_eq!(count_lines(&files[0]), 3);
        assert_eq!(count_lines(&files[1]), 3);
        assert_eq!(count_lines(&files[2]), 1);
    }

    #[test]
    fn test_keeps_only_newest_files() {
        let dir = TempDir::new().unwrap();
        let mut logger = JsonlLogger::new(dir.path(), 1, 2).unwrap();

        for _ in 0..5 {
            logger.write(&record()).unwrap();
        }
        logger.flush().unwrap();

        let files = logger.log_files().unwrap();
        assert_eq!(files.len(), 2);
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert!(names[0].ends_with("_0003.jsonl"), "{:?}", names);
        assert!(names[1].ends_with("_0004.jsonl"), "{:?}", names);
    }

    #[test]
    fn test_ignores_unrelated_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();
        fs::write(dir.path().join("telemetry_old.csv"), "keep me too").unwrap();

        let mut logger = JsonlLogger::new(dir.path(), 1, 1).unwrap();
        for _ in 0..3 {
            logger.write(&record()).unwrap();
        }

        assert_eq!(logger.log_files().unwrap().len(), 1);
        assert!(dir.path().join("notes.txt").exists());
        assert!(dir.path().join("telemetry_old.csv").exists());
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut logger = JsonlLogger::new(&nested, 5, 5).unwrap();
        logger.write(&record()).unwrap();
        drop(logger);

        let files: Vec<_> = fs::read_dir(&nested).unwrap().collect();
        assert_eq!(files.len(), 1);
    }
}
