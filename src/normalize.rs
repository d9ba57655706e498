use crate::{config::Postprocess, error::Result};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Right-trims every line and collapses each run of blank lines into one.
///
/// Lines are split on `\n` only, so a trailing newline in `text` survives as
/// a final empty line. Applying this twice yields the same text as once.
pub fn collapse_blank_lines(text: &str) -> String {
    let mut out = Vec::new();
    let mut prev_blank = false;

    for line in text.split('\n') {
        let stripped = line.trim_end();
        if stripped.is_empty() {
            if !prev_blank {
                out.push("");
                prev_blank = true;
            }
            continue;
        }
        prev_blank = false;
        out.push(stripped);
    }

    out.join("\n")
}

/// Full clean-up applied to extracted text before it is written.
///
/// With default settings this is exactly [`collapse_blank_lines`].
pub fn normalize(cfg: &Postprocess, text: &str) -> Result<String> {
    let mut s = text.to_string();

    if cfg.normalize_unicode {
        s = s.nfkc().collect::<String>();
    }

    if cfg.remove_by_regex {
        s = remove_by_regex(&cfg.patterns, &s)?;
    }

    Ok(collapse_blank_lines(&s))
}

fn remove_by_regex(patterns: &[String], s: &str) -> Result<String> {
    let regs: Vec<Regex> = patterns
        .iter()
        .map(|p| Regex::new(p))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(s.split('\n')
        .filter(|line| !regs.iter().any(|r| r.is_match(line.trim())))
        .collect::<Vec<_>>()
        .join("\n"))
}
