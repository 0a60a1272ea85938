//! FAQ dataset kept as headerless `question,answer` CSV files.
//!
//! Several files can be configured; they are read in order and a question that
//! appears again in a later file takes that file's answer. New entries are
//! appended to the first file.

use crate::domain::model::FaqEntry;
use crate::domain::ports::FaqStore;
use crate::utils::error::{HelpDeskError, Result};
use async_trait::async_trait;
use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug)]
pub struct CsvFaqStore {
    paths: Vec<PathBuf>,
    write_lock: Mutex<()>,
}

impl CsvFaqStore {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            write_lock: Mutex::new(()),
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Rows missing either cell (or with a blank one) are skipped; extra columns are ignored.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<FaqEntry>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut entries = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let question = record.get(0).map(str::trim).filter(|s| !s.is_empty());
            let answer = record.get(1).map(str::trim).filter(|s| !s.is_empty());
            if let (Some(question), Some(answer)) = (question, answer) {
                entries.push(FaqEntry::new(question, answer));
            }
        }
        Ok(entries)
    }

    fn read_file(path: &Path) -> Result<Vec<FaqEntry>> {
        let data = fs::read(path).map_err(|e| HelpDeskError::DatasetError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let entries = Self::parse(data.as_slice())?;
        tracing::debug!("Read {} rows from {}", entries.len(), path.display());
        Ok(entries)
    }
}

#[async_trait]
impl FaqStore for CsvFaqStore {
    async fn load(&self) -> Result<Vec<FaqEntry>> {
        let mut entries = Vec::new();
        for path in &self.paths {
            entries.extend(Self::read_file(path)?);
        }
        Ok(entries)
    }

    async fn append(&self, entry: &FaqEntry) -> Result<()> {
        let path = self.paths.first().ok_or_else(|| HelpDeskError::ConfigError {
            message: "no dataset file configured to append to".to_string(),
        })?;

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        // keep the new row off an unterminated last line
        if file.metadata()?.len() > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                file.write_all(b"\n")?;
            }
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record([entry.question.as_str(), entry.answer.as_str()])?;
        writer.flush()?;

        tracing::debug!("Appended FAQ entry to {}", path.display());
        Ok(())
    }
}
