//! Display-facing answer and citation types

use serde::{Deserialize, Serialize};

use super::chunk::RetrievalResult;

/// Reference from a generated answer back to a retrieved passage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Context item number as used in the prompt
    pub n: usize,
    /// Source document id
    pub source: String,
    /// Section title path
    pub section: String,
    /// Heading anchor, may be empty
    pub anchor: String,
    /// Link into the rendered source document
    pub link: String,
}

impl Citation {
    /// Build a citation for a retrieval result
    ///
    /// The link is `{view_prefix}/{source}` with `#{anchor}` appended when the
    /// passage sits under a heading.
    pub fn from_result(result: &RetrievalResult, view_prefix: &str) -> Self {
        let chunk = &result.chunk;
        let mut link = format!("{}/{}", view_prefix.trim_end_matches('/'), chunk.source_id);
        if !chunk.anchor.is_empty() {
            link.push('#');
            link.push_str(&chunk.anchor);
        }

        Self {
            n: result.rank,
            source: chunk.source_id.clone(),
            section: chunk.section_title.clone(),
            anchor: chunk.anchor.clone(),
            link,
        }
    }

    /// Format citation for terminal output
    pub fn format_inline(&self) -> String {
        if self.section.is_empty() {
            format!("[{}] {}", self.n, self.source)
        } else {
            format!("[{}] {} — {}", self.n, self.section, self.source)
        }
    }
}

/// Generated answer with its citations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Generated text
    pub answer: String,
    /// One citation per context item, in prompt order
    pub citations: Vec<Citation>,
    /// Context item numbers the answer actually references
    pub cited: Vec<usize>,
    /// Number of passages requested
    pub used: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Chunk;

    fn result(anchor: &str) -> RetrievalResult {
        RetrievalResult {
            rank: 2,
            chunk: Chunk {
                id: 7,
                source_id: "pumps/p100.md".to_string(),
                section_title: "Pump / Priming".to_string(),
                anchor: anchor.to_string(),
                text: "Open the valve".to_string(),
            },
            score: 0.8,
        }
    }

    #[test]
    fn test_link_includes_anchor() {
        let citation = Citation::from_result(&result("priming"), "/view");
        assert_eq!(citation.n, 2);
        assert_eq!(citation.link, "/view/pumps/p100.md#priming");
        assert_eq!(citation.section, "Pump / Priming");
    }

    #[test]
    fn test_link_without_anchor() {
        let citation = Citation::from_result(&result(""), "/view/");
        assert_eq!(citation.link, "/view/pumps/p100.md");
        assert_eq!(citation.anchor, "");
    }
}
