use clap::Parser;
use repocat::{Cli, OutputFormatter, OutputMode, RepoCat, RepoCatError, UserFriendlyError};
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    // Create RepoCat instance
    let repocat = match RepoCat::from_cli(&cli) {
        Ok(repocat) => repocat,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    // Handle dry run mode
    if cli.dry_run {
        return handle_dry_run(&cli, &repocat);
    }

    // Execute main export workflow
    match repocat.export(&cli.root) {
        Ok(report) => {
            repocat.output_formatter().print_export_report(&report);

            // Per-file read failures live inside the artifact as diagnostic
            // lines and do not affect the exit code.
            0
        }
        Err(e) => {
            repocat.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &RepoCatError) -> i32 {
    match error {
        RepoCatError::Cancelled => 130, // Interrupted (SIGINT)
        RepoCatError::Config { .. } => 2,
        RepoCatError::InvalidPath { .. } => 3,
        RepoCatError::Permission { .. } => 4,
        RepoCatError::OutputArtifact { .. } => 5,
        _ => 1, // General error
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "repocat.toml".to_string());

    match RepoCat::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  repocat <root-directory> --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(cli: &Cli, repocat: &RepoCat) -> i32 {
    let formatter = repocat.output_formatter();
    let config = repocat.config();

    formatter.print_header("Dry run - no files will be written");

    println!("  Root: {}", cli.root.display());
    println!("  Extensions: {}", config.filters.extensions.join(", "));
    println!(
        "  Exclude directories: {}",
        config.filters.exclude_dirs.join(", ")
    );
    println!("  Output: {}", config.output.path.display());
    println!("  Delimiter: {}", config.output.delimiter);
    formatter.print_separator();

    match repocat.scan_sources(&cli.root) {
        Ok(outcome) => {
            for file in &outcome.files {
                println!("  {}", file.display_path());
            }
            formatter.print_separator();
            formatter.success(&format!(
                "{} files would be exported to {}",
                outcome.files.len(),
                config.output.path.display()
            ));
            0
        }
        Err(e) => {
            formatter.print_user_friendly_error(&e);
            1
        }
    }
}

fn print_startup_error(error: &RepoCatError) {
    // Create a basic formatter for startup errors
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
