use pdf_layout_md::{
    config,
    extract::{Extractor, PdfToText},
    ConvertError,
};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

// Tests that write an executable and then spawn must not overlap, or a fork in
// one thread can hold the script open for writing and fail exec with ETXTBSY.
static SPAWN_LOCK: Mutex<()> = Mutex::new(());

fn spawn_lock() -> MutexGuard<'static, ()> {
    SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

#[test]
fn default_args_request_layout_text_on_stdout() {
    let ex = PdfToText::new(&config::Extractor::default());
    assert_eq!(
        ex.args(Path::new("doc.pdf")),
        vec!["-layout", "-nopgbrk", "doc.pdf", "-"]
    );
}

#[test]
fn flags_can_be_turned_off() {
    let cfg = config::Extractor {
        layout: false,
        no_page_breaks: false,
        extra_args: vec!["-enc".into(), "UTF-8".into()],
        ..Default::default()
    };
    let ex = PdfToText::new(&cfg);
    assert_eq!(
        ex.args(Path::new("a.pdf")),
        vec!["-enc", "UTF-8", "a.pdf", "-"]
    );
}

#[test]
fn missing_program_is_reported_by_name() {
    let _lock = spawn_lock();
    let cfg = config::Extractor {
        program: "pdf-layout-md-no-such-extractor".into(),
        ..Default::default()
    };
    let err = PdfToText::new(&cfg)
        .extract(Path::new("doc.pdf"))
        .unwrap_err();
    match err {
        ConvertError::ExtractorNotFound { program } => {
            assert_eq!(program, "pdf-layout-md-no-such-extractor")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[cfg(unix)]
mod scripted {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    fn script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-pdftotext");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn extractor(program: &Path, timeout_seconds: u64) -> PdfToText {
        PdfToText::new(&config::Extractor {
            program: program.display().to_string(),
            timeout_seconds,
            ..Default::default()
        })
    }

    #[test]
    fn captures_stdout() {
        let _lock = spawn_lock();
        let tmp = tempfile::tempdir().unwrap();
        let prog = script(tmp.path(), "printf 'Title\\n\\n\\nBody'");
        let text = extractor(&prog, 0).extract(Path::new("doc.pdf")).unwrap();
        assert_eq!(text, "Title\n\n\nBody");
    }

    #[test]
    fn receives_flags_then_input_then_dash() {
        let _lock = spawn_lock();
        let tmp = tempfile::tempdir().unwrap();
        let prog = script(tmp.path(), "printf '%s\\n' \"$@\"");
        let text = extractor(&prog, 0).extract(Path::new("doc.pdf")).unwrap();
        assert_eq!(text, "-layout\n-nopgbrk\ndoc.pdf\n-\n");
    }

    #[test]
    fn non_zero_exit_carries_stderr() {
        let _lock = spawn_lock();
        let tmp = tempfile::tempdir().unwrap();
        let prog = script(tmp.path(), "echo 'Syntax Error: broken xref' >&2\nexit 1");
        let err = extractor(&prog, 0)
            .extract(Path::new("doc.pdf"))
            .unwrap_err();
        match err {
            ConvertError::ExtractionFailed { stderr, status, .. } => {
                assert_eq!(stderr, "Syntax Error: broken xref");
                assert_eq!(status.code(), Some(1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn timeout_path_still_captures_output() {
        let _lock = spawn_lock();
        let tmp = tempfile::tempdir().unwrap();
        let prog = script(tmp.path(), "printf 'page text'");
        let text = extractor(&prog, 30).extract(Path::new("doc.pdf")).unwrap();
        assert_eq!(text, "page text");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_input_name_reaches_extractor_unchanged() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let _lock = spawn_lock();
        let tmp = tempfile::tempdir().unwrap();
        let prog = script(tmp.path(), "[ -f \"$3\" ] && printf found");
        let input = tmp.path().join(OsStr::from_bytes(b"doc\xff.pdf"));
        std::fs::write(&input, b"%PDF-1.4\n").unwrap();

        let text = extractor(&prog, 0).extract(&input).unwrap();
        assert_eq!(text, "found");
    }

    #[test]
    fn timeout_returns_while_grandchild_holds_pipes() {
        let _lock = spawn_lock();
        let tmp = tempfile::tempdir().unwrap();
        let prog = script(tmp.path(), "sleep 10\necho done");
        let started = std::time::Instant::now();
        let err = extractor(&prog, 1)
            .extract(Path::new("doc.pdf"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::ExtractionTimedOut { .. }));
        assert!(started.elapsed() < std::time::Duration::from_secs(8));
    }

    #[test]
    fn slow_extractor_is_killed_after_timeout() {
        let _lock = spawn_lock();
        let tmp = tempfile::tempdir().unwrap();
        let prog = script(tmp.path(), "exec sleep 10");
        let err = extractor(&prog, 1)
            .extract(Path::new("doc.pdf"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::ExtractionTimedOut { secs: 1, .. }));
    }
}
