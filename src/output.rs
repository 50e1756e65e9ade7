//! Output management module
//!
//! Writes results as plain text, one match per line, UTF-8.

use crate::aggregate::Match;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Default results file name
pub const DEFAULT_OUTPUT_NAME: &str = "matches.txt";

/// MIME type of the results file
pub const MIME_TYPE: &str = "text/plain;charset=utf-8";

/// How each match is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Word only
    Plain,
    /// Word followed by its sources: `word (a, b)`
    #[default]
    Sources,
}

/// Render a single match
pub fn format_match(m: &Match, format: OutputFormat) -> String {
    match format {
        OutputFormat::Plain => m.word.clone(),
        OutputFormat::Sources => m.to_string(),
    }
}

/// Render all matches joined by newlines, without a trailing newline
pub fn render_matches(matches: &[Match], format: OutputFormat) -> String {
    matches
        .iter()
        .map(|m| format_match(m, format))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Output file writer with buffering
pub struct OutputWriter {
    writer: BufWriter<File>,
    lines_written: u64,
    bytes_written: u64,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_output_dir(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
            lines_written: 0,
            bytes_written: 0,
        })
    }

    /// Write every match, newline separated
    pub fn write_matches(&mut self, matches: &[Match], format: OutputFormat) -> anyhow::Result<()> {
        for (i, m) in matches.iter().enumerate() {
            if i > 0 {
                self.writer.write_all(b"\n")?;
                self.bytes_written += 1;
            }
            let line = format_match(m, format);
            self.writer.write_all(line.as_bytes())?;
            self.lines_written += 1;
            self.bytes_written += line.len() as u64;
        }
        Ok(())
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

impl Drop for OutputWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Totals for a written results file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub lines: u64,
    pub bytes: u64,
}

/// Write results to `path`
pub fn save_matches(
    path: &Path,
    matches: &[Match],
    format: OutputFormat,
) -> anyhow::Result<WriteSummary> {
    let mut writer = OutputWriter::new(path)?;
    writer.write_matches(matches, format)?;
    writer.flush()?;
    log::debug!("Wrote {} lines ({}) to {:?}", writer.lines_written(), MIME_TYPE, path);
    Ok(WriteSummary {
        lines: writer.lines_written(),
        bytes: writer.bytes_written(),
    })
}

/// Ensure output directory exists
pub fn ensure_output_dir(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
