//! Paragraph reflow and speech-oriented formatting.

use crate::config::ConvertConfig;
use crate::hyphenation::{ends_with_word_hyphen, Gap, SurvivingLine};
use crate::patterns::is_heading;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Sentence-final punctuation, optionally followed by closing quotes or brackets.
    static ref RE_SENTENCE_END: Regex =
        Regex::new(r#"[.!?]["'\u{201D}\u{2019})\]]*$"#).unwrap();

    static ref ABBREVIATIONS: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"(?i)\bet al\.").unwrap(), "and others"),
        (Regex::new(r"(?i)\bibid\.").unwrap(), "same source"),
        (Regex::new(r"(?i)\bcf\.").unwrap(), "compare"),
        (Regex::new(r"(?i)\be\.g\.").unwrap(), "for example"),
        (Regex::new(r"(?i)\bi\.e\.").unwrap(), "that is"),
        (Regex::new(r"(?i)\bpp\.\s*(\d+)").unwrap(), "pages $1"),
        (Regex::new(r"(?i)\bp\.\s*(\d+)").unwrap(), "page $1"),
    ];
}

pub fn ends_sentence(text: &str) -> bool {
    RE_SENTENCE_END.is_match(text.trim_end())
}

fn starts_capital(text: &str) -> bool {
    text.chars().next().is_some_and(|c| c.is_uppercase())
}

/// Expand scholarly abbreviations so speech engines read them naturally.
pub fn expand_abbreviations(text: &str) -> String {
    let mut out = text.to_string();
    for (re, replacement) in ABBREVIATIONS.iter() {
        out = re.replace_all(&out, *replacement).into_owned();
    }
    out
}

/// Merge repaired lines into paragraphs separated by one blank line.
///
/// Citation headers are left out when `omit_citation_headers` is set (they
/// are rendered in the citation summary instead) and otherwise stand alone.
pub fn reflow(
    lines: &[SurvivingLine],
    config: &ConvertConfig,
    omit_citation_headers: bool,
) -> String {
    let body: Vec<&SurvivingLine> = lines
        .iter()
        .filter(|l| !l.is_citation_header())
        .collect();
    let average_indent = if body.is_empty() {
        0.0
    } else {
        body.iter().map(|l| l.indent as f64).sum::<f64>() / body.len() as f64
    };

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    // True right after a heading or standalone header.
    let mut after_block = true;

    for line in lines {
        if line.is_citation_header() {
            if omit_citation_headers {
                continue;
            }
            flush(&mut current, &mut paragraphs);
            paragraphs.push(line.text.clone());
            after_block = true;
            continue;
        }

        let at_boundary = after_block
            || current.is_empty()
            || ends_sentence(&current)
            || line.gap == Gap::Blank;
        if at_boundary && is_heading(&line.text, config.heading_max_chars) {
            flush(&mut current, &mut paragraphs);
            paragraphs.push(format!("{}.", line.text));
            after_block = true;
            continue;
        }

        let breaks = !current.is_empty()
            && (line.gap == Gap::Blank
                || (ends_sentence(&current)
                    && starts_capital(&line.text)
                    && line.indent as f64 > average_indent));
        if breaks {
            flush(&mut current, &mut paragraphs);
        }

        if current.is_empty() {
            current.push_str(&line.text);
        } else if ends_with_word_hyphen(&current) {
            current.push_str(&line.text);
        } else {
            current.push(' ');
            current.push_str(&line.text);
        }
        after_block = false;
    }
    flush(&mut current, &mut paragraphs);

    let text = paragraphs.join("\n\n");
    if config.faithful {
        text
    } else {
        expand_abbreviations(&text)
    }
}

fn flush(current: &mut String, paragraphs: &mut Vec<String>) {
    if !current.is_empty() {
        paragraphs.push(std::mem::take(current));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::outcome::LineClass;

    fn line(text: &str, indent: usize, gap: Gap) -> SurvivingLine {
        SurvivingLine {
            page_index: 0,
            line_index: 0,
            text: text.to_string(),
            indent,
            class: LineClass::Body,
            gap,
        }
    }

    fn faithful() -> ConvertConfig {
        ConvertConfig {
            faithful: true,
            ..ConvertConfig::default()
        }
    }

    #[test]
    fn test_lines_join_with_single_space() {
        let out = reflow(
            &[line("The border is", 0, Gap::None), line("a method.", 0, Gap::Boundary)],
            &faithful(),
            true,
        );
        assert_eq!(out, "The border is a method.");
    }

    #[test]
    fn test_blank_gap_breaks_paragraph() {
        let out = reflow(
            &[line("First paragraph ends.", 0, Gap::None), line("second one", 0, Gap::Blank)],
            &faithful(),
            true,
        );
        assert_eq!(out, "First paragraph ends.\n\nsecond one");
    }

    #[test]
    fn test_indented_sentence_start_breaks_paragraph() {
        let out = reflow(
            &[
                line("Some text that ends here.", 0, Gap::None),
                line("More text continues.", 0, Gap::None),
                line("A new paragraph starts", 4, Gap::None),
                line("and continues.", 0, Gap::None),
            ],
            &faithful(),
            true,
        );
        assert_eq!(
            out,
            "Some text that ends here. More text continues.\n\nA new paragraph starts and continues."
        );
    }

    #[test]
    fn test_page_boundary_is_not_a_break() {
        let out = reflow(
            &[line("It ends here.", 0, Gap::None), line("But goes on.", 0, Gap::Boundary)],
            &faithful(),
            true,
        );
        assert_eq!(out, "It ends here. But goes on.");
    }

    #[test]
    fn test_kept_hyphen_joins_without_space() {
        let out = reflow(
            &[line("a deeply self-", 0, Gap::None), line("aware reader", 0, Gap::None)],
            &faithful(),
            true,
        );
        assert_eq!(out, "a deeply self-aware reader");
    }

    #[test]
    fn test_heading_stands_alone() {
        let out = reflow(
            &[
                line("INTRODUCTION", 0, Gap::None),
                line("The text begins.", 0, Gap::None),
                line("CONCLUSION", 0, Gap::None),
                line("It ends.", 0, Gap::None),
            ],
            &faithful(),
            true,
        );
        assert_eq!(
            out,
            "INTRODUCTION.\n\nThe text begins.\n\nCONCLUSION.\n\nIt ends."
        );
    }

    #[test]
    fn test_heading_needs_sentence_end_before_it() {
        let out = reflow(
            &[line("as argued by", 0, Gap::None), line("NATO And The EU", 0, Gap::None)],
            &faithful(),
            true,
        );
        assert_eq!(out, "as argued by NATO And The EU");
    }

    #[test]
    fn test_citation_headers_omitted_or_standalone() {
        let mut header = line("2019, VOL. 5, NO. 2", 0, Gap::None);
        header.class = LineClass::CitationHeader;
        let lines = vec![header, line("body text", 0, Gap::None)];
        assert_eq!(reflow(&lines, &faithful(), true), "body text");
        assert_eq!(
            reflow(&lines, &faithful(), false),
            "2019, VOL. 5, NO. 2\n\nbody text"
        );
    }

    #[test]
    fn test_abbreviation_expansion() {
        assert_eq!(
            expand_abbreviations("Smith et al. argue, e.g. in pp. 12-14 and p. 3, cf. ibid. i.e. this"),
            "Smith and others argue, for example in pages 12-14 and page 3, compare same source that is this"
        );
    }

    #[test]
    fn test_faithful_keeps_abbreviations() {
        let lines = [line("Smith et al. argue.", 0, Gap::None)];
        assert_eq!(reflow(&lines, &faithful(), true), "Smith et al. argue.");
        assert_eq!(
            reflow(&lines, &ConvertConfig::default(), true),
            "Smith and others argue."
        );
    }

    #[test]
    fn test_sentence_end_with_closing_quote() {
        assert!(ends_sentence("he said \"no.\""));
        assert!(ends_sentence("(see above.)"));
        assert!(!ends_sentence("and so"));
    }
}
