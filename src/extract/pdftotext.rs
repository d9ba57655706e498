use super::Extractor;
use crate::{
    config,
    error::{ConvertError, Result},
};
use std::ffi::OsString;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Runs `pdftotext` (or a compatible program) and captures its stdout.
pub struct PdfToText {
    cfg: config::Extractor,
}

impl PdfToText {
    pub fn new(cfg: &config::Extractor) -> Self {
        Self { cfg: cfg.clone() }
    }

    /// Full argument list: flags, extra args, the input, then `-` for stdout.
    /// The input is passed as raw OS bytes, so non-UTF-8 names survive.
    pub fn args(&self, input: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        if self.cfg.layout {
            args.push("-layout".into());
        }
        if self.cfg.no_page_breaks {
            args.push("-nopgbrk".into());
        }
        args.extend(self.cfg.extra_args.iter().map(OsString::from));
        args.push(input.as_os_str().to_os_string());
        args.push("-".into());
        args
    }

    fn spawn(&self, input: &Path) -> Result<Child> {
        let mut cmd = Command::new(&self.cfg.program);
        cmd.args(self.args(input));
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        for (k, v) in &self.cfg.env {
            cmd.env(k, v);
        }

        cmd.spawn().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ConvertError::ExtractorNotFound {
                    program: self.cfg.program.clone(),
                }
            } else {
                ConvertError::io(format!("spawning {}", self.cfg.program), e)
            }
        })
    }
}

impl Extractor for PdfToText {
    fn name(&self) -> &str {
        &self.cfg.program
    }

    fn extract(&self, input: &Path) -> Result<String> {
        debug!(
            "run {} {:?} timeout={}s",
            self.cfg.program,
            self.args(input),
            self.cfg.timeout_seconds
        );
        let mut child = self.spawn(input)?;

        let output = if self.cfg.timeout_seconds > 0 {
            wait_with_timeout(
                &mut child,
                &self.cfg.program,
                Duration::from_secs(self.cfg.timeout_seconds),
            )?
        } else {
            child
                .wait_with_output()
                .map_err(|e| ConvertError::io(format!("waiting for {}", self.cfg.program), e))?
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ConvertError::ExtractionFailed {
                program: self.cfg.program.clone(),
                status: output.status,
                stderr,
            });
        }

        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("{} stderr: {}", self.cfg.program, stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn wait_with_timeout(child: &mut Child, program: &str, timeout: Duration) -> Result<Output> {
    // Drain pipes while waiting so a chatty child can't block on a full buffer.
    let stdout_reader = child.stdout.take();
    let stderr_reader = child.stderr.take();

    let stdout_thread = std::thread::spawn(move || -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout_reader {
            out.read_to_end(&mut buf)?;
        }
        Ok(buf)
    });

    let stderr_thread = std::thread::spawn(move || -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut err) = stderr_reader {
            err.read_to_end(&mut buf)?;
        }
        Ok(buf)
    });

    let start = Instant::now();
    loop {
        let polled = child
            .try_wait()
            .map_err(|e| ConvertError::io(format!("waiting for {program}"), e))?;
        if let Some(status) = polled {
            return Ok(Output {
                status,
                stdout: join_reader(stdout_thread, "stdout")?,
                stderr: join_reader(stderr_thread, "stderr")?,
            });
        }

        if start.elapsed() > timeout {
            warn!("{program} timed out after {:?}", timeout);
            let _ = child.kill();
            child
                .wait()
                .map_err(|e| ConvertError::io("wait after kill", e))?;
            // Grandchildren of a wrapper script may still hold the pipes open;
            // the readers are detached rather than joined.
            drop(stdout_thread);
            drop(stderr_thread);
            return Err(ConvertError::ExtractionTimedOut {
                program: program.to_string(),
                secs: timeout.as_secs(),
            });
        }

        std::thread::sleep(Duration::from_millis(50));
    }
}

fn join_reader(
    handle: std::thread::JoinHandle<std::io::Result<Vec<u8>>>,
    what: &str,
) -> Result<Vec<u8>> {
    handle
        .join()
        .map_err(|_| {
            ConvertError::io(
                format!("{what} reader"),
                std::io::Error::other("reader thread panicked"),
            )
        })?
        .map_err(|e| ConvertError::io(format!("reading {what}"), e))
}
