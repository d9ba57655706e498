use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub extractor: Extractor,
    #[serde(default)]
    pub postprocess: Postprocess,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub security: Security,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

/// How the external text extractor is invoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Extractor {
    pub program: String,
    /// Pass `-layout` so column positions survive extraction.
    pub layout: bool,
    /// Pass `-nopgbrk` so no form feeds separate pages.
    pub no_page_breaks: bool,
    pub extra_args: Vec<String>,
    /// 0 waits for the child indefinitely.
    pub timeout_seconds: u64,
    pub env: BTreeMap<String, String>,
}
impl Default for Extractor {
    fn default() -> Self {
        Self {
            program: "pdftotext".into(),
            layout: true,
            no_page_breaks: true,
            extra_args: Vec::new(),
            timeout_seconds: 0,
            env: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Postprocess {
    pub normalize_unicode: bool,
    pub remove_by_regex: bool,
    pub patterns: Vec<String>,
}
impl Default for Postprocess {
    fn default() -> Self {
        Self {
            normalize_unicode: false,
            remove_by_regex: false,
            patterns: vec!["(?i)^(page\\s+\\d+|\\d+\\s*/\\s*\\d+)$".into()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    /// Extension used when no output path is given.
    pub extension: String,
    /// Write a JSON conversion report here when set.
    pub report_path: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            extension: "md".into(),
            report_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            json: false,
            write_to_file: false,
            file_path: "pdf-layout-md.log".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Security {
    /// Report a missing input that looks like a URL as `UrlInput`.
    /// Paths that exist on disk are always accepted.
    pub reject_url_inputs: bool,
}
impl Default for Security {
    fn default() -> Self {
        Self {
            reject_url_inputs: false,
        }
    }
}
