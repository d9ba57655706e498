use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Summary of one finished conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub extractor: String,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub extracted_lines: usize,
    pub written_lines: usize,
    pub output_sha256: String,
    pub started: String,
    pub finished: String,
}

impl ConversionReport {
    /// The two size lines printed after a successful conversion.
    pub fn size_lines(&self) -> [String; 2] {
        [
            format!("  Original: {}", format_kb(self.input_bytes)),
            format!("  Markdown: {}", format_kb(self.output_bytes)),
        ]
    }
}

/// Kilobytes (1024 bytes) with one decimal place, e.g. `12.3 KB`.
pub fn format_kb(bytes: u64) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}
