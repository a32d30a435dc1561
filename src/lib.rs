pub mod cli;
pub mod config;
pub mod error;
pub mod exporter;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, DecodeMode, OutputFormat};
pub use config::{CliOverrides, Config, DecodePolicy, FilterConfig, OutputConfig};
pub use error::{RepoCatError, Result, UserFriendlyError};

// Core functionality re-exports
pub use exporter::{BundleWriter, ConfigSnapshot, ExportProgress, ExportReport};
pub use scanner::{FileFilter, ScanOutcome, SourceFile, SourceScanner};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;

/// Main library interface for RepoCat functionality
pub struct RepoCat {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl RepoCat {
    /// Create a new RepoCat instance with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Create a new RepoCat instance for testing (no signal handler conflicts)
    #[cfg(test)]
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(false);
        let shutdown = GracefulShutdown::new_for_test();

        Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        }
    }

    /// Create RepoCat instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            crate::cli::OutputFormat::Human => OutputMode::Human,
            crate::cli::OutputFormat::Json => OutputMode::Json,
            crate::cli::OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbosity_level(), cli_args.quiet)
    }

    /// Export every matching file under `root` into the output artifact
    pub fn export(&self, root: &Path) -> Result<ExportReport> {
        self.shutdown.check_shutdown()?;

        let writer = BundleWriter::new(&self.config.output.path)
            .with_delimiter(self.config.output.delimiter.clone())
            .with_decode_policy(self.config.output.decode);

        // The artifact exists (empty) from the start of the run; creating it
        // is the run's first fatal checkpoint.
        writer.initialize()?;

        self.output_formatter.info("Scanning directory tree");
        let outcome = self.scan_sources(root)?;
        self.shutdown.check_shutdown()?;

        self.output_formatter
            .info(&format!("Found {} matching files", outcome.files.len()));

        let progress = self.write_bundle(&writer, &outcome.files)?;

        let snapshot = ConfigSnapshot::from_config(&self.config);
        let report = ExportReport::new(
            root,
            &self.config.output.path,
            &outcome.files,
            &progress,
            snapshot,
        );

        self.output_formatter.print_export_summary(&progress);
        self.output_formatter.success(&format!(
            "All done! Exported to {}",
            self.config.output.path.display()
        ));

        Ok(report)
    }

    /// Walk the tree and collect the files the export would cover
    pub fn scan_sources(&self, root: &Path) -> Result<ScanOutcome> {
        let spinner = self
            .progress_manager
            .create_scan_spinner("Scanning directory tree...");

        let scanner = SourceScanner::new(&self.config.filters);
        let result = scanner.scan_directory(root);
        spinner.finish_and_clear();

        let outcome = result?;
        for warning in &outcome.warnings {
            self.output_formatter.debug(warning);
        }

        Ok(outcome)
    }

    /// Write the bundle with progress tracking
    fn write_bundle(&self, writer: &BundleWriter, files: &[SourceFile]) -> Result<ExportProgress> {
        let file_progress = self.progress_manager.create_file_progress(files.len() as u64);
        let progress_callback = {
            let pb = file_progress.clone();
            move |progress: &ExportProgress| {
                ui::progress::update_file_progress(&pb, progress);
            }
        };

        let cancelled = || !self.shutdown.is_running();
        let progress = writer.export(files, Some(&cancelled), Some(&progress_callback))?;

        ui::progress::finish_progress_with_summary(
            &file_progress,
            &format!("Wrote {} blocks", progress.files_processed),
            progress.elapsed(),
        );

        Ok(progress)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config).map_err(RepoCatError::Io)?;
        Ok(())
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Check if shutdown has been requested
    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    /// Request graceful shutdown
    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &RepoCatError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}
