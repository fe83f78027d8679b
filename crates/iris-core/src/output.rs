//! Output formatting for intake reports.
//!
//! Text output is the report exactly as the agent would receive it. JSON
//! output carries the same report plus structured per-path results.

use std::io::{self, Write};

use crate::types::IntakeReport;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// The aggregated markdown-style report
    #[default]
    Text,
    /// A single JSON object
    Json,
}

/// Writes intake reports to any `Write` sink.
pub struct ReportWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
}

impl<W: Write> ReportWriter<W> {
    /// `pretty` only affects JSON output.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
        }
    }

    pub fn write(&mut self, report: &IntakeReport) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.writer, "{}", report.content())?;
            }
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, report)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, report).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
            }
        }
        self.writer.flush()
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
