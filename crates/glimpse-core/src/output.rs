//! JSON and JSON Lines output for recognition results and reports.

use crate::compare::ComparisonReport;
use crate::types::PerformanceStats;
use serde::Serialize;
use std::io::{self, Write};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One JSON document
    #[default]
    Json,
    /// One JSON object per line
    JsonLines,
}

/// Trailing JSONL record carrying the stats of a comparison.
#[derive(Serialize)]
struct StatsLine<'a> {
    stats: Option<&'a PerformanceStats>,
    paused: bool,
}

/// Serializes envelopes, batch items and reports to a writer.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// `pretty` only affects the JSON format; JSONL is always compact.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write one item followed by a newline.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        if self.pretty && self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        }
        writeln!(self.writer)?;
        self.items_written += 1;
        Ok(())
    }

    /// Write a comparison report.
    ///
    /// JSON emits the whole report as one document. JSONL emits one line per
    /// model entry followed by a stats line.
    pub fn write_report(&mut self, report: &ComparisonReport) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => self.write(report),
            OutputFormat::JsonLines => {
                for entry in &report.results {
                    self.write(entry)?;
                }
                self.write(&StatsLine {
                    stats: report.stats.as_ref(),
                    paused: report.paused,
                })
            }
        }
    }

    pub fn items_written(&self) -> usize {
        self.items_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComparisonResult, RecognitionResponse};

    fn failed_response() -> RecognitionResponse {
        RecognitionResponse {
            success: false,
            recognition: None,
            error: Some("IMAGE_NOT_FOUND".to_string()),
            message: Some("Image not found: scan.png".to_string()),
        }
    }

    fn report() -> ComparisonReport {
        ComparisonReport {
            results: vec![
                ComparisonResult::pending("openai::gpt-4o"),
                ComparisonResult::pending("gemini::gemini-1.5-flash"),
            ],
            stats: None,
            paused: true,
        }
    }

    #[test]
    fn test_write_compact_envelope() {
        let mut writer = OutputWriter::new(Vec::new(), OutputFormat::Json, false);
        writer.write(&failed_response()).unwrap();

        let output = String::from_utf8(writer.into_inner()).unwrap();
        assert!(output.contains("\"success\":false"));
        assert!(output.contains("\"error\":\"IMAGE_NOT_FOUND\""));
        assert!(!output.contains("recognition"));
        assert_eq!(output.lines().count(), 1);
    }

    #[test]
    fn test_pretty_ignored_for_jsonl() {
        let mut writer = OutputWriter::new(Vec::new(), OutputFormat::JsonLines, true);
        writer.write(&failed_response()).unwrap();
        writer.write(&failed_response()).unwrap();

        assert_eq!(writer.items_written(), 2);
        let output = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn test_report_as_single_json_document() {
        let mut writer = OutputWriter::new(Vec::new(), OutputFormat::Json, false);
        writer.write_report(&report()).unwrap();

        let output = String::from_utf8(writer.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["results"].as_array().unwrap().len(), 2);
        assert_eq!(value["paused"], true);
        assert!(value.get("stats").is_none());
    }

    #[test]
    fn test_report_as_jsonl_ends_with_stats_line() {
        let mut writer = OutputWriter::new(Vec::new(), OutputFormat::JsonLines, false);
        writer.write_report(&report()).unwrap();

        let output = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("openai::gpt-4o"));
        let last: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
        assert!(last["stats"].is_null());
        assert_eq!(last["paused"], true);
    }
}
