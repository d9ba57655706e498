use crate::{
    config::Config,
    error::{ConvertError, Result},
    extract::Extractor,
    normalize,
    report::ConversionReport,
    util::{looks_like_url, now_rfc3339, sha256_hex},
};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct Converter<E: Extractor> {
    cfg: Config,
    extractor: E,
}

/// Validated input and resolved output for one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl<E: Extractor> Converter<E> {
    pub fn new(cfg: &Config, extractor: E) -> Self {
        Self {
            cfg: cfg.clone(),
            extractor,
        }
    }

    /// Checks the input and resolves the output path. Touches nothing on disk.
    pub fn prepare(&self, input: &Path, output: Option<&Path>) -> Result<ConversionJob> {
        validate_input(&self.cfg, input)?;
        let output = match output {
            Some(p) => p.to_path_buf(),
            None => derive_output_path(input, &self.cfg.output.extension),
        };
        Ok(ConversionJob {
            input: input.to_path_buf(),
            output,
        })
    }

    pub fn run(&self, job: &ConversionJob) -> Result<ConversionReport> {
        let started = now_rfc3339();

        let raw = self.extractor.extract(&job.input)?;
        let extracted_lines = raw.split('\n').count();
        debug!(
            "{} returned {} bytes, {} lines",
            self.extractor.name(),
            raw.len(),
            extracted_lines
        );

        let markdown = normalize::normalize(&self.cfg.postprocess, &raw)?;
        drop(raw);
        let written_lines = markdown.split('\n').count();

        write_output(&job.output, &markdown)?;
        info!(
            "wrote {} ({} lines, {} collapsed)",
            job.output.display(),
            written_lines,
            extracted_lines.saturating_sub(written_lines)
        );

        Ok(ConversionReport {
            input: job.input.clone(),
            output: job.output.clone(),
            extractor: self.extractor.name().to_string(),
            input_bytes: file_len(&job.input)?,
            output_bytes: file_len(&job.output)?,
            extracted_lines,
            written_lines,
            output_sha256: sha256_hex(markdown.as_bytes()),
            started,
            finished: now_rfc3339(),
        })
    }

    pub fn convert(&self, input: &Path, output: Option<&Path>) -> Result<ConversionReport> {
        let job = self.prepare(input, output)?;
        self.run(&job)
    }
}

/// Replaces the final extension of `input` with `extension`.
///
/// `archive.v2.pdf` becomes `archive.v2.md`; a path without an extension
/// gains one.
pub fn derive_output_path(input: &Path, extension: &str) -> PathBuf {
    input.with_extension(extension)
}

fn validate_input(cfg: &Config, input: &Path) -> Result<()> {
    let input_str = input.display().to_string();

    if !input.exists() {
        if cfg.security.reject_url_inputs && looks_like_url(&input_str) {
            return Err(ConvertError::UrlInput { input: input_str });
        }
        return Err(ConvertError::InputNotFound {
            path: input.to_path_buf(),
        });
    }

    match input.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => {}
        Some(_) => warn!("input does not end in .pdf; passing it on anyway: {input_str}"),
        None => warn!("input has no extension; assuming PDF: {input_str}"),
    }

    Ok(())
}

fn write_output(path: &Path, text: &str) -> Result<()> {
    let mut f = File::create(path)
        .map_err(|e| ConvertError::io(format!("creating {}", path.display()), e))?;
    f.write_all(text.as_bytes())
        .and_then(|_| f.flush())
        .map_err(|e| ConvertError::io(format!("writing {}", path.display()), e))
}

fn file_len(path: &Path) -> Result<u64> {
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| ConvertError::io(format!("stat {}", path.display()), e))
}
