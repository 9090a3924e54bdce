use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;

use crate::models::Transcript;

pub mod formatters;

pub use formatters::*;

/// Export formats for a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Timestamped,
    Srt,
    Vtt,
    Json,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Text => "text",
            ExportFormat::Timestamped => "timestamped",
            ExportFormat::Srt => "srt",
            ExportFormat::Vtt => "vtt",
            ExportFormat::Json => "json",
        };
        f.write_str(name)
    }
}

/// Render a transcript in the requested format
pub fn render(transcript: &Transcript, format: ExportFormat) -> Result<String> {
    let content = match format {
        ExportFormat::Text => transcript.to_plain_text(),
        ExportFormat::Timestamped => transcript.to_timestamped_text(),
        ExportFormat::Srt => transcript.to_srt(),
        ExportFormat::Vtt => transcript.to_vtt(),
        ExportFormat::Json => serde_json::to_string_pretty(transcript)
            .context("Failed to serialize transcript")?,
    };
    Ok(content)
}

/// Save a rendered transcript to file
pub fn save_to_file(transcript: &Transcript, path: &Path, format: ExportFormat) -> Result<()> {
    let content = render(transcript, format)?;
    fs_err::write(path, content)?;
    Ok(())
}

/// Print a rendered transcript to stdout
pub fn print_to_console(transcript: &Transcript, format: ExportFormat) -> Result<()> {
    let content = render(transcript, format)?;
    println!("{}", content);
    Ok(())
}
