pub mod pdftotext;

use crate::error::Result;
use std::path::Path;

pub use pdftotext::PdfToText;

/// Turns a PDF into plain text. The PDF is opaque to the caller.
pub trait Extractor {
    fn name(&self) -> &str;
    fn extract(&self, input: &Path) -> Result<String>;
}
