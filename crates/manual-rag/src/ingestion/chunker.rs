//! Heading-aware, token-windowed chunking of Markdown

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ChunkingConfig;
use crate::types::{ChunkFields, Document, Section};

static NON_SLUG_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("Invalid regex"));
static SEPARATOR_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_]+").expect("Invalid regex"));
static HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").expect("Invalid regex"));
static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\r\n|[\n\r\x0b\x0c\x1c-\x1e\x85\u{2028}\u{2029}]").expect("Invalid regex")
});

/// Splits Markdown into heading-scoped passages of at most `chunk_tokens` tokens
#[derive(Debug, Clone)]
pub struct MarkdownChunker {
    /// Window size in whitespace tokens
    chunk_tokens: usize,
    /// Overlap between consecutive windows of a section
    overlap: usize,
}

impl MarkdownChunker {
    /// Create a new chunker
    pub fn new(config: ChunkingConfig) -> Self {
        Self {
            chunk_tokens: config.chunk_tokens,
            overlap: config.chunk_overlap,
        }
    }

    /// Chunk a document
    pub fn chunk_document(&self, doc: &Document) -> Vec<ChunkFields> {
        self.chunk(&doc.text, &doc.source_id)
    }

    /// Chunk Markdown text attributed to `source_id`
    pub fn chunk(&self, markdown: &str, source_id: &str) -> Vec<ChunkFields> {
        let mut chunks = Vec::new();

        for section in split_sections(markdown) {
            let tokens: Vec<&str> = section.text.split_whitespace().collect();
            let section_title = title_path(&section.heading_path);
            let anchor = section
                .heading_path
                .last()
                .map(|title| slugify(title))
                .unwrap_or_default();

            for (start, end) in sliding_window(tokens.len(), self.chunk_tokens, self.overlap) {
                chunks.push(ChunkFields {
                    source_id: source_id.to_string(),
                    section_title: section_title.clone(),
                    anchor: anchor.clone(),
                    text: tokens[start..end].join(" "),
                });
            }
        }

        chunks
    }
}

/// Split Markdown into sections at `#` heading lines
///
/// A heading closes the running section under the old heading path, then
/// opens a new one that starts with the heading line itself. Form feeds and
/// lone carriage returns count as line breaks, as in converted PDF text.
pub fn split_sections(markdown: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut heading_path: Vec<String> = Vec::new();
    let mut buf: Vec<&str> = Vec::new();

    for line in split_lines(markdown) {
        if line.starts_with('#') {
            flush_section(&mut sections, &mut buf, &heading_path);

            let level = line.len() - line.trim_start_matches('#').len();
            let title = line.trim_start_matches('#').trim();
            heading_path.truncate(level.saturating_sub(1));
            heading_path.push(title.to_string());
        }
        buf.push(line);
    }
    flush_section(&mut sections, &mut buf, &heading_path);

    sections
}

/// Lines of `text` split at every Unicode line boundary
///
/// A trailing break does not produce an empty final line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = LINE_BREAKS.split(text).collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

fn flush_section(sections: &mut Vec<Section>, buf: &mut Vec<&str>, heading_path: &[String]) {
    if buf.is_empty() {
        return;
    }
    sections.push(Section {
        heading_path: heading_path.to_vec(),
        text: buf.join("\n"),
    });
    buf.clear();
}

/// Token windows `[start, end)` over a section of `len` tokens
///
/// Windows start every `max(1, size - overlap)` tokens while the start is
/// below `len - 1`; the window that reaches `len` is the last one. Sections
/// of zero or one token yield nothing.
pub fn sliding_window(len: usize, size: usize, overlap: usize) -> Vec<(usize, usize)> {
    let step = size.saturating_sub(overlap).max(1);
    let mut windows = Vec::new();

    for start in (0..len.saturating_sub(1)).step_by(step) {
        let end = len.min(start + size);
        windows.push((start, end));
        if end == len {
            break;
        }
    }

    windows
}

/// Heading path joined by " / ", blank titles dropped
pub fn title_path(parts: &[String]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" / ")
}

/// URL-friendly anchor id matching common Markdown renderers
pub fn slugify(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let cleaned = NON_SLUG_CHARS.replace_all(&lowered, "");
    let dashed = SEPARATOR_RUNS.replace_all(&cleaned, "-");
    let collapsed = HYPHEN_RUNS.replace_all(&dashed, "-");
    collapsed.trim_matches('-').to_string()
}
