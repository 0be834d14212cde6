//! Citation summary built from citation-header lines and document metadata.

use crate::classify::outcome::LineClass;
use crate::extraction::DocumentInfo;
use crate::hyphenation::SurvivingLine;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Separator between the citation summary and the body text.
pub const SUMMARY_SEPARATOR_WIDTH: usize = 40;

lazy_static! {
    static ref RE_PROQUEST_TAIL: Regex =
        Regex::new(r"(?i)\.\s*proquest\s*(?:ebook central)?\.?\s*$").unwrap();

    /// "Last, First. Title : Subtitle, Publisher, 2019. ProQuest Ebook Central"
    static ref RE_PROQUEST: Regex =
        Regex::new(r"(?i)^([^.]+,\s*[^.]+)\.\s+(.+),\s+.+,\s+(\d{4})\.\s*proquest").unwrap();

    /// "2024, VOL. 23, NO. 2, 474-491"
    static ref RE_VOL_ISSUE: Regex =
        Regex::new(r"(?i)^(\d{4}),\s*vol\.\s*(\d+),\s*no\.\s*(\d+)").unwrap();

    /// "2016. Duke University Press Books. All rights reserved."
    static ref RE_PUBLISHER_YEAR: Regex =
        Regex::new(r"^(\d{4})\.\s+(.+(?:Press|Books|Publishing|Publishers).+)\.\s*$").unwrap();

    /// Opening lines that are never a title.
    static ref RE_NOT_A_TITLE: Regex = Regex::new(
        r"(?i)^(?:chapter|part|section)\s+\w+|^other\s+works|^published\s+by|^(?:also|see)\s+|also appears|^(?:edited|translated|with|foreword)\b|^\d{4}\."
    )
    .unwrap();
}

/// Opening body lines of the first page searched for a title.
const TITLE_SEARCH_LINES: usize = 10;

/// Shorter opening lines are usually fragments of a wrapped title.
const TITLE_MIN_CHARS: usize = 20;

/// Bibliographic fields recovered for the summary. Fields stay `None`
/// unless a structured source supplied them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub source: Option<String>,
}

impl Citation {
    /// Title plus at least one other field.
    pub fn is_confident(&self) -> bool {
        self.title.is_some()
            && (self.author.is_some() || self.source.is_some() || self.date.is_some())
    }
}

fn fill(slot: &mut Option<String>, value: &str) {
    let value = value.trim();
    if slot.is_none() && !value.is_empty() {
        *slot = Some(value.to_string());
    }
}

fn is_journal_title(line: &str) -> bool {
    let len = line.chars().count();
    let has_letters = line.chars().any(|c| c.is_alphabetic());
    has_letters
        && line
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(|c| c.is_uppercase())
        && len > 15
        && len < 100
        && line.contains("JOURNAL")
}

/// Collect citation fields from document metadata, then header lines.
pub fn extract_citation(info: &DocumentInfo, headers: &[&str]) -> Citation {
    let mut citation = Citation {
        title: info.title.clone(),
        author: info.author.clone(),
        ..Citation::default()
    };

    if let Some(line) = headers.iter().find(|l| RE_PROQUEST_TAIL.is_match(l)) {
        if let Some(caps) = RE_PROQUEST.captures(line) {
            fill(&mut citation.author, &caps[1]);
            fill(&mut citation.title, caps[2].trim().trim_end_matches(','));
            fill(&mut citation.date, &caps[3]);
        }
    }

    if let Some(line) = headers.iter().find(|l| is_journal_title(l)) {
        fill(&mut citation.source, line);
    }

    for line in headers {
        if let Some(caps) = RE_VOL_ISSUE.captures(line) {
            fill(&mut citation.date, &caps[1]);
            if let Some(source) = citation.source.as_mut() {
                if !source.contains(" Vol. ") {
                    source.push_str(&format!(" Vol. {}, No. {}", &caps[2], &caps[3]));
                }
            }
        }
    }

    for line in headers {
        if let Some(caps) = RE_PUBLISHER_YEAR.captures(line) {
            fill(&mut citation.date, &caps[1]);
            fill(&mut citation.source, &caps[2]);
        }
    }

    citation
}

/// Guess a title from the opening body lines of the first page.
///
/// Takes the first substantial line that starts upper case, is not a
/// fragment and is not a chapter, byline or year line. Returns `None`
/// rather than a doubtful guess.
pub fn guess_title(opening: &[&str]) -> Option<String> {
    opening
        .iter()
        .take(TITLE_SEARCH_LINES)
        .map(|line| line.trim())
        .find(|line| {
            line.chars().count() >= TITLE_MIN_CHARS
                && line.chars().next().is_some_and(|c| c.is_uppercase())
                && !line.ends_with([',', ';', '-'])
                && !RE_NOT_A_TITLE.is_match(line)
        })
        .map(str::to_string)
}

/// Render the summary block, without the trailing separator.
///
/// A confident citation renders as title, `By author` and `source, date`
/// lines. Otherwise the distinct header lines are joined with `; `.
pub fn format_summary(citation: &Citation, headers: &[&str]) -> Option<String> {
    if citation.is_confident() {
        let mut parts: Vec<String> = Vec::new();
        if let Some(title) = &citation.title {
            parts.push(title.clone());
        }
        if let Some(author) = &citation.author {
            parts.push(format!("By {}", author));
        }
        let source_date: Vec<&str> = [citation.source.as_deref(), citation.date.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !source_date.is_empty() {
            parts.push(source_date.join(", "));
        }
        return Some(parts.join("\n"));
    }

    let mut distinct: Vec<&str> = Vec::new();
    for header in headers {
        let header = header.trim();
        if !header.is_empty() && !distinct.contains(&header) {
            distinct.push(header);
        }
    }
    if distinct.is_empty() {
        None
    } else {
        Some(distinct.join("; "))
    }
}

/// Build the summary for a document's surviving lines.
pub fn summarize(info: &DocumentInfo, lines: &[SurvivingLine]) -> Option<String> {
    let headers: Vec<&str> = lines
        .iter()
        .filter(|l| l.is_citation_header())
        .map(|l| l.text.as_str())
        .collect();
    let mut citation = extract_citation(info, &headers);
    if citation.title.is_none() {
        let opening: Vec<&str> = lines
            .iter()
            .filter(|l| l.page_index == 0 && l.class == LineClass::Body)
            .map(|l| l.text.as_str())
            .collect();
        citation.title = guess_title(&opening);
    }
    format_summary(&citation, &headers)
}

/// Prepend `summary` and the separator line to `body`.
pub fn with_summary(summary: &str, body: &str) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        summary,
        "\u{2014}".repeat(SUMMARY_SEPARATOR_WIDTH),
        body
    )
}
