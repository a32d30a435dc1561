use crate::config::{Config, DecodePolicy};
use crate::exporter::ExportProgress;
use crate::scanner::SourceFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// In-memory record of one export run. The output artifact is the run's only
/// on-disk product; the report is printed, never written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    pub root: String,
    pub output_path: String,
    pub summary: ExportSummary,
    pub files: Vec<FileInfo>,
    pub export_time: DateTime<Utc>,
    pub errors: Vec<String>,
    pub config_used: ConfigSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSummary {
    pub total_files: usize,
    pub files_failed: usize,
    pub bytes_written: u64,
    pub export_duration: Duration,
    pub files_by_extension: HashMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub filename: String,
    pub relative_path: String,
    pub extension: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub extensions: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub max_file_size: Option<u64>,
    pub delimiter: String,
    pub decode: DecodePolicy,
}

impl From<&SourceFile> for FileInfo {
    fn from(file: &SourceFile) -> Self {
        Self {
            filename: file.filename.clone(),
            relative_path: file.display_path(),
            extension: file.extension.clone(),
            size: file.size,
        }
    }
}

impl ConfigSnapshot {
    pub fn from_config(config: &Config) -> Self {
        Self {
            extensions: config.filters.extensions.clone(),
            exclude_dirs: config.filters.exclude_dirs.clone(),
            max_file_size: config.filters.max_file_size,
            delimiter: config.output.delimiter.clone(),
            decode: config.output.decode,
        }
    }
}

impl ExportReport {
    pub fn new(
        root: &Path,
        output_path: &Path,
        files: &[SourceFile],
        progress: &ExportProgress,
        config_used: ConfigSnapshot,
    ) -> Self {
        let mut files_by_extension: HashMap<String, usize> = HashMap::new();
        for file in files {
            *files_by_extension.entry(file.extension.clone()).or_insert(0) += 1;
        }

        let summary = ExportSummary {
            total_files: progress.files_processed,
            files_failed: progress.files_failed,
            bytes_written: progress.bytes_written,
            export_duration: progress.elapsed(),
            files_by_extension,
        };

        Self {
            root: root.display().to_string(),
            output_path: output_path.display().to_string(),
            summary,
            files: files.iter().map(FileInfo::from).collect(),
            export_time: Utc::now(),
            errors: progress.errors.clone(),
            config_used,
        }
    }
}
