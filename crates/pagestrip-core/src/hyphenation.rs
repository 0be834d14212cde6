//! Line-break hyphenation repair over the surviving lines of a document.

use crate::classify::outcome::LineClass;
use crate::config::ConvertConfig;
use crate::model::Document;
use crate::reflow::ends_sentence;
use serde::{Deserialize, Serialize};

/// What separated a surviving line from the previous surviving line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gap {
    /// Directly adjacent lines, or the first line of the document.
    None,
    /// Blank lines on the same page. If lines were also stripped in between,
    /// only when the previous line ended a sentence.
    Blank,
    /// A page boundary, or stripped lines mid-sentence.
    Boundary,
}

/// A non-blank BODY or CITATION_HEADER line, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurvivingLine {
    pub page_index: usize,
    pub line_index: usize,
    pub text: String,
    pub indent: usize,
    pub class: LineClass,
    pub gap: Gap,
}

impl SurvivingLine {
    pub fn is_citation_header(&self) -> bool {
        self.class == LineClass::CitationHeader
    }
}

/// Collect the surviving lines of a classified document.
pub fn surviving_lines(doc: &Document) -> Vec<SurvivingLine> {
    let mut out: Vec<SurvivingLine> = Vec::new();
    let mut saw_blank = false;
    let mut saw_stripped = false;

    for line in doc.lines() {
        if !line.is_kept() {
            saw_stripped = true;
            continue;
        }
        if line.is_blank() {
            saw_blank = true;
            continue;
        }

        let gap = match out.last() {
            None => Gap::None,
            Some(prev) if prev.page_index != line.page_index => Gap::Boundary,
            Some(prev) if saw_blank && (!saw_stripped || ends_sentence(&prev.text)) => Gap::Blank,
            Some(_) if saw_stripped => Gap::Boundary,
            Some(_) => Gap::None,
        };
        out.push(SurvivingLine {
            page_index: line.page_index,
            line_index: line.line_index,
            text: line.text().to_string(),
            indent: line.indent,
            class: line.class,
            gap,
        });
        saw_blank = false;
        saw_stripped = false;
    }
    out
}

/// Whether `text` ends in a hyphen directly after a letter.
pub fn ends_with_word_hyphen(text: &str) -> bool {
    let mut rev = text.chars().rev();
    rev.next() == Some('-') && rev.next().is_some_and(|c| c.is_alphabetic())
}

/// The word fragment before a trailing hyphen: "the self-" gives "self",
/// "non-self-" gives "self".
fn word_before_hyphen(text: &str) -> &str {
    let token = text.split_whitespace().last().unwrap_or("");
    let token = token.trim_end_matches('-');
    let token = token.rsplit('-').next().unwrap_or(token);
    token.trim_start_matches(|c: char| !c.is_alphanumeric())
}

fn starts_lowercase(text: &str) -> bool {
    text.chars().next().is_some_and(|c| c.is_lowercase())
}

/// Join lines broken by a hyphen at the line end.
///
/// A body line ending in `letter-` is merged with the next surviving line
/// when that line starts lowercase and the fragment is not an allow-listed
/// compound prefix. Whatever separated the two lines (blank lines, stripped
/// stamps, a page break) is dropped. Citation headers are never joined.
pub fn repair_hyphenation(
    lines: Vec<SurvivingLine>,
    config: &ConvertConfig,
) -> Vec<SurvivingLine> {
    let mut out: Vec<SurvivingLine> = Vec::with_capacity(lines.len());
    let mut joined = 0usize;

    let mut iter = lines.into_iter().peekable();
    while let Some(mut current) = iter.next() {
        while !current.is_citation_header() && ends_with_word_hyphen(&current.text) {
            let Some(next) = iter.peek() else {
                break;
            };
            if next.is_citation_header()
                || !starts_lowercase(&next.text)
                || config.is_hyphenation_exception(word_before_hyphen(&current.text))
            {
                break;
            }
            let Some(next) = iter.next() else {
                break;
            };
            current.text.pop();
            current.text.push_str(&next.text);
            joined += 1;
        }
        out.push(current);
    }

    if joined > 0 {
        log::debug!("joined {} hyphenated line break(s)", joined);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, gap: Gap) -> SurvivingLine {
        SurvivingLine {
            page_index: 0,
            line_index: 0,
            text: text.to_string(),
            indent: 0,
            class: LineClass::Body,
            gap,
        }
    }

    fn texts(lines: &[SurvivingLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_joins_broken_word() {
        let config = ConvertConfig::default();
        let out = repair_hyphenation(
            vec![line("the students under-", Gap::None), line("stand the problem", Gap::None)],
            &config,
        );
        assert_eq!(texts(&out), vec!["the students understand the problem"]);
    }

    #[test]
    fn test_keeps_compound_exception() {
        let config = ConvertConfig::default();
        let out = repair_hyphenation(
            vec![line("a deeply self-", Gap::None), line("aware reader", Gap::None)],
            &config,
        );
        assert_eq!(texts(&out), vec!["a deeply self-", "aware reader"]);
    }

    #[test]
    fn test_skips_blank_gap_and_chains() {
        let config = ConvertConfig::default();
        let out = repair_hyphenation(
            vec![
                line("counter-", Gap::None),
                line("revo-", Gap::Blank),
                line("lutionary forces", Gap::Boundary),
                line("Next sentence.", Gap::None),
            ],
            &config,
        );
        assert_eq!(texts(&out), vec!["counterrevolutionary forces", "Next sentence."]);
    }

    #[test]
    fn test_no_join_before_capital_or_digit() {
        let config = ConvertConfig::default();
        let out = repair_hyphenation(
            vec![line("the Franco-", Gap::None), line("Prussian war", Gap::None)],
            &config,
        );
        assert_eq!(out.len(), 2);
        let out = repair_hyphenation(
            vec![line("pages 12-", Gap::None), line("and more", Gap::None)],
            &config,
        );
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_citation_header_is_a_barrier() {
        let config = ConvertConfig::default();
        let mut header = line("2019, VOL. 5, NO. 2", Gap::Boundary);
        header.class = LineClass::CitationHeader;
        let out = repair_hyphenation(
            vec![line("some hyphen-", Gap::None), header, line("ated text", Gap::None)],
            &config,
        );
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_word_before_hyphen() {
        assert_eq!(word_before_hyphen("a deeply self-"), "self");
        assert_eq!(word_before_hyphen("(non-"), "non");
        assert_eq!(word_before_hyphen("anti-self-"), "self");
    }

    #[test]
    fn test_gaps_from_document() {
        use crate::extraction::DocumentInfo;
        use crate::segment::segment_page;

        let mut doc = Document {
            source: "t.pdf".into(),
            info: DocumentInfo::default(),
            pages: vec![
                segment_page(0, "one\n\ntwo\nSTAMP\nthree", false),
                segment_page(1, "four", false),
            ],
        };
        for line in doc.lines_mut() {
            line.class = if line.raw == "STAMP" {
                LineClass::Boilerplate
            } else {
                LineClass::Body
            };
        }
        let lines = surviving_lines(&doc);
        let gaps: Vec<Gap> = lines.iter().map(|l| l.gap).collect();
        assert_eq!(gaps, vec![Gap::None, Gap::Blank, Gap::Boundary, Gap::Boundary]);
    }

    #[test]
    fn test_blank_around_stamp_after_sentence_is_blank_gap() {
        use crate::extraction::DocumentInfo;
        use crate::segment::segment_page;

        let mut doc = Document {
            source: "t.pdf".into(),
            info: DocumentInfo::default(),
            pages: vec![segment_page(
                0,
                "First paragraph ends.\n\nSTAMP\n\nSecond paragraph.\nmid sentence\n\nSTAMP\n\ncontinues here",
                false,
            )],
        };
        for line in doc.lines_mut() {
            line.class = if line.raw == "STAMP" {
                LineClass::Boilerplate
            } else {
                LineClass::Body
            };
        }
        let gaps: Vec<Gap> = surviving_lines(&doc).iter().map(|l| l.gap).collect();
        assert_eq!(gaps, vec![Gap::None, Gap::Blank, Gap::None, Gap::Boundary]);
    }
}
