use crate::{
    config::Config,
    convert::Converter,
    extract::PdfToText,
    report::ConversionReport,
    util::ensure_dir,
};
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Names starting with `-` must follow `--`.
pub const USAGE: &str = "Usage: pdf-layout-md [--] <pdf_file> [output_file]";

const DEFAULT_CONFIG: &str = "pdf-layout-md.toml";

#[derive(Parser, Debug)]
#[command(name = "pdf-layout-md", version)]
#[command(about = "Convert a PDF to Markdown with pdftotext -layout, collapsing blank lines")]
pub struct Args {
    /// PDF to convert. Put `--` first if the name starts with `-`.
    pub pdf_file: PathBuf,

    /// Destination file. Defaults to the input path with a .md extension.
    pub output_file: Option<PathBuf>,

    /// Path to config TOML. If omitted, uses ./pdf-layout-md.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Also write a JSON conversion report to this path.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Runs one conversion and prints the user-facing messages.
///
/// Errors are printed here; the returned error only tells `main` to exit 1.
pub fn dispatch(args: Args) -> Result<()> {
    let (cfg, _guard) = match load_config(args.config.as_deref())
        .and_then(|cfg| init_logging(&args, &cfg).map(|guard| (cfg, guard)))
    {
        Ok(loaded) => loaded,
        Err(err) => {
            println!("Error: {err:#}");
            return Err(err);
        }
    };

    let result = convert(&args, &cfg);
    if let Err(err) = &result {
        error!("{:#}", err);
        println!("Error: {err:#}");
    }
    result
}

fn convert(args: &Args, cfg: &Config) -> Result<()> {
    let converter = Converter::new(cfg, PdfToText::new(&cfg.extractor));
    let job = converter.prepare(&args.pdf_file, args.output_file.as_deref())?;

    println!(
        "Converting {} to {}...",
        job.input.display(),
        job.output.display()
    );

    let report = converter.run(&job)?;

    if let Some(path) = resolve_report_path(args, cfg) {
        write_report(&path, &report)?;
    }

    println!("✓ Successfully converted to {}", report.output.display());
    for line in report.size_lines() {
        println!("{line}");
    }

    Ok(())
}

fn load_config(user: Option<&Path>) -> Result<Config> {
    if let Some(p) = user {
        return Config::load(p);
    }
    let default = Path::new(DEFAULT_CONFIG);
    if default.exists() {
        Config::load(default)
    } else {
        Ok(Config::default())
    }
}

fn resolve_report_path(args: &Args, cfg: &Config) -> Option<PathBuf> {
    if let Some(p) = &args.report {
        return Some(p.clone());
    }
    if !cfg.output.report_path.is_empty() {
        return Some(PathBuf::from(&cfg.output.report_path));
    }
    None
}

fn write_report(path: &Path, report: &ConversionReport) -> Result<()> {
    let raw = serde_json::to_string_pretty(report)?;
    std::fs::write(path, raw).with_context(|| format!("writing report: {}", path.display()))?;
    info!("report written to {}", path.display());
    Ok(())
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the progress and result lines, so logs go to stderr.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if cfg.logging.write_to_file && !cfg.logging.file_path.is_empty() {
        let path = Path::new(&cfg.logging.file_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}
