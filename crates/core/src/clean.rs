//! Boilerplate removal for backend output.
//! Backends sometimes prepend a sentence announcing the translation; these
//! are matched against an allow-list of known phrasings only.

use crate::{files, srt};
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Known preambles, anchored at the start of the text. New variants need a
/// new entry here.
static PREAMBLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^Here is the translation of the French subtitle text to English, maintaining the original formatting and line breaks:\s*",
        r"^Here is the translation to English, maintaining the original formatting and line breaks:\s*",
        r"^Here is the English translation with the original formatting and line breaks maintained:\s*",
        r"^Here is the translation to English with the original formatting maintained:\s*",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("preamble pattern is valid"))
    .collect()
});

/// Remove a known preamble at the start of `text`, then trim.
/// Rather than removing only the first match, this repeats until no pattern
/// matches, so `strip_preamble(strip_preamble(x)) == strip_preamble(x)` holds
/// even for stacked preambles. A single preamble is removed exactly once.
pub fn strip_preamble(text: &str) -> String {
    let mut rest = text.trim();
    while let Some(end) = PREAMBLE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(rest).map(|m| m.end()))
    {
        debug!("stripped preamble of {} bytes", end);
        rest = rest[end..].trim();
    }
    rest.to_string()
}

/// Clean a caption document: flatten each block's text to one line, strip
/// preambles and renumber.
pub fn clean_document(input: &str) -> String {
    let mut blocks = srt::parse(input);
    for block in &mut blocks {
        let flat = strip_preamble(&block.text.join(" "));
        block.text = vec![flat];
    }
    srt::format(&blocks)
}

/// Clean the caption file at `input`, writing `<stem>_clean.srt` unless
/// `output` is given.
pub fn clean_file(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let content = files::read_captions(input)?;
    let cleaned = clean_document(&content);
    let out_path = match output {
        Some(path) => path.to_path_buf(),
        None => files::sibling_path(input, "clean"),
    };
    files::write_atomic(&out_path, &cleaned)?;
    info!("cleaned subtitles saved to {}", out_path.display());
    Ok(out_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn strips_known_preamble() {
        let text = "Here is the translation to English, maintaining the original formatting and line breaks:\n\nHello there";
        assert_eq!(strip_preamble(text), "Hello there");
    }

    #[test]
    fn leaves_unknown_text_trimmed() {
        assert_eq!(strip_preamble("  Bonjour \n"), "Bonjour");
        // Matching is case-sensitive and anchored.
        let lower = "here is the translation to English with the original formatting maintained: x";
        assert_eq!(strip_preamble(lower), lower);
        let inner = "Well. Here is the translation to English with the original formatting maintained: x";
        assert_eq!(strip_preamble(inner), inner);
    }

    #[test]
    fn strip_is_idempotent() {
        let samples = [
            "",
            "   ",
            "plain text",
            "Here is the English translation with the original formatting and line breaks maintained: Hi",
            "Here is the translation to English with the original formatting maintained:",
            "  Here is the translation to English with the original formatting maintained: x",
            "Here is the translation to English with the original formatting maintained: \
             Here is the translation to English with the original formatting maintained: x",
        ];
        for s in samples {
            let once = strip_preamble(s);
            assert_eq!(strip_preamble(&once), once, "input {s:?}");
        }
    }

    #[test]
    fn cleans_document() {
        let input = "3\n00:00:01,000 --> 00:00:02,000\n\
                     Here is the translation to English, maintaining the original formatting and line breaks:\n\
                     Hello\nworld\n\n\
                     9\n\n\
                     10\n00:00:03,000 --> 00:00:04,000\nBye";
        let out = clean_document(input);
        assert_eq!(
            out,
            "1\n00:00:01,000 --> 00:00:02,000\nHello world\n\n2\n00:00:03,000 --> 00:00:04,000\nBye"
        );
    }

    #[test]
    fn cleans_file_to_sibling() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("ep1.srt");
        std::fs::write(&input, "5\nT\nHere is the translation to English with the original formatting maintained: Hi\n").unwrap();
        let out = clean_file(&input, None).unwrap();
        assert_eq!(out, dir.path().join("ep1_clean.srt"));
        assert_eq!(std::fs::read_to_string(out).unwrap(), "1\nT\nHi");
    }
}
