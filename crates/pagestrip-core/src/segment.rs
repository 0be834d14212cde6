//! Line segmentation of raw page text.

use crate::classify::outcome::{LineClass, Provenance};
use crate::model::{Line, Page};

/// Split a page's raw text into lines, keeping empty lines and order.
pub fn segment_page(index: usize, raw_text: &str, is_ocr: bool) -> Page {
    let mut rank = 0usize;
    let lines = raw_text
        .split('\n')
        .enumerate()
        .map(|(line_index, raw)| {
            let raw = raw.trim_end().to_string();
            let normalized = normalize_text(&raw);
            let content_rank = if normalized.is_empty() {
                None
            } else {
                rank += 1;
                Some(rank - 1)
            };
            Line {
                page_index: index,
                line_index,
                indent: indent_width(&raw),
                normalized,
                raw,
                content_rank,
                class: LineClass::Body,
                provenance: Provenance::Unclassified,
            }
        })
        .collect();

    Page {
        index,
        raw_text: raw_text.to_string(),
        is_ocr,
        lines,
    }
}

/// Whitespace-collapsed, lowercased copy of `s`.
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whitespace-collapsed copy of `s`, case preserved.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn indent_width(s: &str) -> usize {
    s.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_empty_lines_and_order() {
        let page = segment_page(2, "Title\n\n  body   text\r\nend", false);
        assert_eq!(page.lines.len(), 4);
        assert_eq!(page.lines[0].raw, "Title");
        assert!(page.lines[1].is_blank());
        assert_eq!(page.lines[2].normalized, "body text");
        assert_eq!(page.lines[2].indent, 2);
        assert_eq!(page.lines[3].raw, "end");
        assert!(page.lines.iter().all(|l| l.page_index == 2));
        let indices: Vec<usize> = page.lines.iter().map(|l| l.line_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_content_rank_skips_blank_lines() {
        let page = segment_page(0, "\na\n\nb\n", false);
        let ranks: Vec<Option<usize>> = page.lines.iter().map(|l| l.content_rank).collect();
        assert_eq!(ranks, vec![None, Some(0), None, Some(1), None]);
        assert_eq!(page.content_lines(), 2);
    }

    #[test]
    fn test_tabs_count_as_four_columns() {
        let page = segment_page(0, "\t x", false);
        assert_eq!(page.lines[0].indent, 5);
    }

    #[test]
    fn test_normalize_text_folds_case() {
        assert_eq!(normalize_text("  This  Content\tDownloaded "), "this content downloaded");
    }
}
