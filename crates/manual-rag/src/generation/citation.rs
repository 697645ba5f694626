//! Citation building and `[n]` marker extraction

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Citation, RetrievalResult};

static CITATION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d+(?:\s*,\s*\d+)*)\]").expect("Invalid regex"));

/// One citation per retrieval result, numbered as in the prompt
pub fn build_citations(results: &[RetrievalResult], view_prefix: &str) -> Vec<Citation> {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let mut citation = Citation::from_result(result, view_prefix);
            citation.n = i + 1;
            citation
        })
        .collect()
}

/// Context item numbers referenced by `[n]` markers in an answer
///
/// Accepts `[2]` and `[1, 3]`; numbers outside `1..=available` are dropped.
/// Returned sorted and deduplicated.
pub fn cited_numbers(answer: &str, available: usize) -> Vec<usize> {
    let mut numbers: Vec<usize> = CITATION_MARKER
        .captures_iter(answer)
        .filter_map(|cap| cap.get(1))
        .flat_map(|m| {
            m.as_str()
                .split(',')
                .filter_map(|n| n.trim().parse::<usize>().ok())
                .collect::<Vec<_>>()
        })
        .filter(|n| (1..=available).contains(n))
        .collect();

    numbers.sort_unstable();
    numbers.dedup();
    numbers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Chunk;

    #[test]
    fn test_cited_numbers() {
        let answer = "Open the valve [2]. Then prime it [1, 3] and again [2]. See [9] and [x].";
        assert_eq!(cited_numbers(answer, 3), vec![1, 2, 3]);
        assert!(cited_numbers("No markers here.", 3).is_empty());
        assert!(cited_numbers("[0]", 3).is_empty());
    }

    #[test]
    fn test_build_citations_numbers_in_order() {
        let results: Vec<RetrievalResult> = (1..=2)
            .map(|rank| RetrievalResult {
                rank,
                chunk: Chunk {
                    id: rank as i64,
                    source_id: format!("doc{}.md", rank),
                    section_title: "Intro".to_string(),
                    anchor: "intro".to_string(),
                    text: "t".to_string(),
                },
                score: 1.0,
            })
            .collect();

        let citations = build_citations(&results, "/view");
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[1].n, 2);
        assert_eq!(citations[1].link, "/view/doc2.md#intro");
    }
}
