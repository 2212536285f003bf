use anyhow::{Context, Result};
use std::path::Path;

use crate::captions::Transcript;
use crate::cli::OutputFormat;
use crate::pipeline::GeneratedContent;

/// Render generated content in the requested format
pub fn render(result: &GeneratedContent, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Markdown => Ok(result.content.clone()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(result).context("Failed to serialize result")
        }
    }
}

/// Save generated content to file
pub fn save_to_file(result: &GeneratedContent, path: &Path, format: OutputFormat) -> Result<()> {
    let content = render(result, format)?;
    fs_err::write(path, content)?;
    Ok(())
}

/// Print generated content to console
pub fn print_to_console(result: &GeneratedContent, format: OutputFormat) -> Result<()> {
    let content = render(result, format)?;
    println!("{}", content);
    Ok(())
}

/// Write raw captions to a file or stdout
pub fn write_transcript(transcript: &Transcript, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => fs_err::write(path, &transcript.text)?,
        None => println!("{}", transcript.text),
    }
    Ok(())
}
