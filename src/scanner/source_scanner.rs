use crate::config::FilterConfig;
use crate::error::{RepoCatError, Result};
use crate::scanner::file_filter::FileFilter;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
    pub filename: String,
    pub extension: String,
    pub size: u64,
}

impl SourceFile {
    pub fn new(source_path: PathBuf, relative_path: PathBuf, size: u64) -> Self {
        let filename = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        let extension = source_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        Self {
            source_path,
            relative_path,
            filename,
            extension,
            size,
        }
    }

    /// Root-relative path with `/` separators on every platform, as it
    /// appears in output header lines.
    pub fn display_path(&self) -> String {
        self.relative_path.to_string_lossy().replace('\\', "/")
    }
}

/// Result of one directory walk: selected files in encounter order, plus any
/// subtrees that had to be skipped.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub files: Vec<SourceFile>,
    pub warnings: Vec<String>,
}

pub struct SourceScanner {
    filter: FileFilter,
    max_depth: Option<usize>,
}

impl SourceScanner {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            filter: FileFilter::new(config),
            max_depth: config.max_depth,
        }
    }

    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<ScanOutcome> {
        let root_path = root.as_ref();

        if !root_path.exists() {
            return Err(RepoCatError::InvalidPath {
                path: root_path.display().to_string(),
            });
        }

        if !root_path.is_dir() {
            return Err(RepoCatError::InvalidPath {
                path: format!("{} is not a directory", root_path.display()),
            });
        }

        // An unreadable root is fatal; unreadable subtrees below it are
        // skipped during the walk.
        std::fs::read_dir(root_path).map_err(|_| RepoCatError::Permission {
            path: root_path.display().to_string(),
        })?;

        let mut outcome = ScanOutcome::default();

        let mut walker = WalkDir::new(root_path)
            .follow_links(false)
            .sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let walker = walker.into_iter().filter_entry(|e| self.should_traverse(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if err
                        .io_error()
                        .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied)
                    {
                        outcome.warnings.push(format!("Permission denied: {}", err));
                    } else {
                        outcome.warnings.push(format!("Scan error: {}", err));
                    }
                    continue;
                }
            };

            if entry.file_type().is_file() {
                match self.process_file(&entry, root_path) {
                    Ok(Some(source_file)) => outcome.files.push(source_file),
                    Ok(None) => {} // File filtered out
                    Err(err) => {
                        outcome.warnings.push(format!(
                            "Error processing {}: {}",
                            entry.path().display(),
                            err
                        ));
                    }
                }
            }
        }

        // Encounter order is the output order; no sorting here.
        Ok(outcome)
    }

    fn should_traverse(&self, entry: &DirEntry) -> bool {
        if entry.file_type().is_file() {
            return true;
        }

        // The root itself (depth 0) is always traversed.
        if entry.depth() == 0 {
            return true;
        }

        if entry.file_type().is_dir() {
            return self.filter.should_traverse_directory(entry.path());
        }

        true
    }

    fn process_file(&self, entry: &DirEntry, root_path: &Path) -> Result<Option<SourceFile>> {
        let path = entry.path();

        if !self.filter.is_selected(path) {
            return Ok(None);
        }

        let metadata = entry.metadata().map_err(|e| RepoCatError::Io(e.into()))?;

        if !self.filter.is_size_allowed(metadata.len()) {
            return Ok(None);
        }

        let relative_path = self.calculate_relative_path(path, root_path)?;

        Ok(Some(SourceFile::new(
            path.to_path_buf(),
            relative_path,
            metadata.len(),
        )))
    }

    fn calculate_relative_path(&self, file_path: &Path, root_path: &Path) -> Result<PathBuf> {
        let relative = file_path
            .strip_prefix(root_path)
            .map_err(|_| RepoCatError::InvalidPath {
                path: format!(
                    "Cannot calculate relative path for {} from root {}",
                    file_path.display(),
                    root_path.display()
                ),
            })?;

        if relative
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(RepoCatError::InvalidPath {
                path: format!(
                    "Path contains parent directory references: {}",
                    relative.display()
                ),
            });
        }

        Ok(relative.to_path_buf())
    }
}
