//! Run command implementation.

use super::output::format_text;
use super::{CliError, MatchArgs, OutputFormat};
use skirmish::replay::render_text;
use skirmish::tournament::MatchRunner;
use std::path::Path;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the match cannot be set up or the recording fails to
/// save.
pub(crate) fn execute(
    setup: &MatchArgs,
    format: OutputFormat,
    save: Option<&Path>,
    quiet: bool,
) -> Result<(), CliError> {
    let config = setup.resolve()?;
    let mut runner = MatchRunner::new(config)?;

    if !quiet && format == OutputFormat::Text {
        println!(
            "Running match with seed {} ({}x{}, {} opponents)...",
            runner.config().seed.unwrap_or_default(),
            config.map_size,
            config.map_size,
            config.opponents
        );
        println!();
    }

    let result = runner.run();

    if let Some(save_path) = save {
        runner
            .recording()
            .save(save_path)
            .map_err(|e| CliError::new(format!("Failed to save recording: {e}")))?;
        if !quiet && format == OutputFormat::Text {
            println!("Recording saved to: {}", save_path.display());
            println!();
        }
    }

    match format {
        OutputFormat::Text => print!("{}", format_text(&result)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
        OutputFormat::Summary => {
            println!("{}", render_text(runner.state(), config.max_ticks));
            println!();
            println!("=== FINAL RESULT ===");
            print!("{}", format_text(&result));
        }
    }

    Ok(())
}
