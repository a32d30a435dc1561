use crate::config::DecodePolicy;
use crate::error::{RepoCatError, Result};
use crate::scanner::SourceFile;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ExportProgress {
    pub files_processed: usize,
    pub files_failed: usize,
    pub total_files: usize,
    pub bytes_written: u64,
    pub current_file: Option<String>,
    pub start_time: Instant,
    pub errors: Vec<String>,
}

impl ExportProgress {
    pub fn new(total_files: usize) -> Self {
        Self {
            files_processed: 0,
            files_failed: 0,
            total_files,
            bytes_written: 0,
            current_file: None,
            start_time: Instant::now(),
            errors: Vec::new(),
        }
    }

    pub fn update_file(&mut self, filename: String, bytes: u64) {
        self.files_processed += 1;
        self.bytes_written += bytes;
        self.current_file = Some(filename);
    }

    pub fn record_failure(&mut self, filename: String, bytes: u64, error: String) {
        self.files_failed += 1;
        self.errors.push(format!("Failed to read {}: {}", filename, error));
        self.update_file(filename, bytes);
    }

    pub fn percentage(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.files_processed as f64 / self.total_files as f64) * 100.0
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn estimated_remaining(&self) -> Duration {
        if self.files_processed == 0 {
            return Duration::from_secs(0);
        }

        let elapsed = self.elapsed();
        let rate = self.files_processed as f64 / elapsed.as_secs_f64();
        let remaining_files = self.total_files - self.files_processed;

        if rate > 0.0 {
            Duration::from_secs_f64(remaining_files as f64 / rate)
        } else {
            Duration::from_secs(0)
        }
    }
}

/// Writes selected files into the single output artifact as
/// header-plus-content blocks, in the order they are given.
pub struct BundleWriter {
    output_path: PathBuf,
    delimiter: String,
    decode: DecodePolicy,
}

impl BundleWriter {
    pub fn new<P: Into<PathBuf>>(output_path: P) -> Self {
        Self {
            output_path: output_path.into(),
            delimiter: "=====".to_string(),
            decode: DecodePolicy::default(),
        }
    }

    pub fn with_delimiter<S: Into<String>>(mut self, delimiter: S) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_decode_policy(mut self, decode: DecodePolicy) -> Self {
        self.decode = decode;
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Create or truncate the artifact. The run owns it from this point on.
    pub fn initialize(&self) -> Result<()> {
        File::create(&self.output_path).map_err(|e| self.artifact_error(e))?;
        Ok(())
    }

    /// Create/truncate the artifact and write one block per file. A file that
    /// cannot be read gets an inline diagnostic instead of content; only
    /// failures on the artifact itself abort the run.
    pub fn export(
        &self,
        files: &[SourceFile],
        cancelled: Option<&dyn Fn() -> bool>,
        progress_callback: Option<&dyn Fn(&ExportProgress)>,
    ) -> Result<ExportProgress> {
        let output = File::create(&self.output_path).map_err(|e| self.artifact_error(e))?;
        let mut writer = BufWriter::new(output);
        let mut progress = ExportProgress::new(files.len());

        for source in files {
            if cancelled.is_some_and(|is_cancelled| is_cancelled()) {
                // Leave a valid, flushed artifact behind when interrupted.
                writer.flush().map_err(|e| self.artifact_error(e))?;
                return Err(RepoCatError::Cancelled);
            }

            if let Some(callback) = progress_callback {
                callback(&progress);
            }

            let path = source.display_path();
            let header = format!(
                "\n\n{delim} {path} {delim}\n",
                delim = self.delimiter,
                path = path
            );
            writer
                .write_all(header.as_bytes())
                .map_err(|e| self.artifact_error(e))?;
            let mut bytes = header.len() as u64;

            match self.read_decoded(&source.source_path) {
                Ok(content) => {
                    writer
                        .write_all(content.as_bytes())
                        .map_err(|e| self.artifact_error(e))?;
                    bytes += content.len() as u64;
                    progress.update_file(path, bytes);
                }
                Err(read_error) => {
                    let diagnostic = format!("[Error reading {}: {}]\n", path, read_error);
                    writer
                        .write_all(diagnostic.as_bytes())
                        .map_err(|e| self.artifact_error(e))?;
                    bytes += diagnostic.len() as u64;
                    progress.record_failure(path, bytes, read_error.to_string());
                }
            }
        }

        writer.flush().map_err(|e| self.artifact_error(e))?;

        if let Some(callback) = progress_callback {
            callback(&progress);
        }

        Ok(progress)
    }

    fn read_decoded(&self, path: &Path) -> std::io::Result<String> {
        let bytes = fs::read(path)?;
        decode_bytes(bytes, self.decode)
    }

    fn artifact_error(&self, source: std::io::Error) -> RepoCatError {
        RepoCatError::OutputArtifact {
            path: self.output_path.display().to_string(),
            source,
        }
    }
}

/// Turn raw file bytes into text under the configured policy.
pub fn decode_bytes(bytes: Vec<u8>, policy: DecodePolicy) -> std::io::Result<String> {
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => match policy {
            DecodePolicy::Replace => Ok(String::from_utf8_lossy(err.as_bytes()).into_owned()),
            DecodePolicy::Ignore => Ok(decode_dropping_invalid(err.as_bytes())),
            DecodePolicy::Strict => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "stream did not contain valid UTF-8",
            )),
        },
    }
}

fn decode_dropping_invalid(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());

    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                break;
            }
            Err(err) => {
                let valid_up_to = err.valid_up_to();
                out.push_str(&String::from_utf8_lossy(&bytes[..valid_up_to]));
                let skip = err.error_len().unwrap_or(bytes.len() - valid_up_to);
                bytes = &bytes[valid_up_to + skip..];
            }
        }
    }

    out
}
