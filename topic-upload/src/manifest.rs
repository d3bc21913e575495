//! Manifest parsing: one `[Topic] - Video name : URL` entry per line.
//!
//! Blank lines and `#` comments are dropped before parsing and never reported. Lines that do
//! not match the grammar become entries without a parse result; the orchestrator reports them
//! individually and moves on.

use regex::Regex;
use std::sync::OnceLock;

/// Fields extracted from a well-formed manifest line, each trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub topic_name: String,
    pub video_name: String,
    pub video_url: String,
}

/// One non-blank, non-comment manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// 1-based line number in the uploaded file.
    pub line_number: usize,
    /// The line with surrounding whitespace removed.
    pub raw_text: String,
    /// `None` when the line does not follow the grammar.
    pub parsed: Option<ParsedLine>,
}

impl ManifestEntry {
    pub fn is_valid(&self) -> bool {
        self.parsed.is_some()
    }
}

fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\[([^\]]*)\]\s*-\s*([^:]*):\s*(https?://\S+)$")
            .expect("manifest line pattern is valid")
    })
}

/// Parses one line. Returns `None` for lines outside the grammar or with an empty field.
pub fn parse_line(line: &str) -> Option<ParsedLine> {
    let caps = line_pattern().captures(line.trim())?;

    let topic_name = caps.get(1)?.as_str().trim();
    let video_name = caps.get(2)?.as_str().trim();
    let video_url = caps.get(3)?.as_str().trim();

    if topic_name.is_empty() || video_name.is_empty() || video_url.is_empty() {
        return None;
    }

    Some(ParsedLine {
        topic_name: topic_name.to_string(),
        video_name: video_name.to_string(),
        video_url: video_url.to_string(),
    })
}

/// True for lines the parser never sees: blank, or starting with `#` after leading whitespace.
pub fn is_skipped(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Splits a manifest into entries, keeping file line numbers.
pub fn entries(text: &str) -> Vec<ManifestEntry> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !is_skipped(line))
        .map(|(idx, line)| {
            let raw_text = line.trim().to_string();
            ManifestEntry {
                line_number: idx + 1,
                parsed: parse_line(&raw_text),
                raw_text,
            }
        })
        .collect()
}
