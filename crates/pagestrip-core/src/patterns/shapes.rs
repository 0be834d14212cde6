//! Shape regexes and the heading heuristic.

use super::schema::Shape;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_URL: Regex = Regex::new(r"(?i)(?:https?://|\bwww\.)\S+").unwrap();

    static ref RE_DOI: Regex =
        Regex::new(r"(?i)(?:\bdoi:?\s*|doi\.org/)?\b10\.\d{4,9}/\S+").unwrap();

    static ref RE_ISSN: Regex =
        Regex::new(r"(?i)\b(?:e-?)?issn:?\s*\d{4}-\d{3}[\dx]\b").unwrap();

    /// ISO dates, numeric dates, clock times and spelled-out dates.
    static ref RE_TIMESTAMP: Regex = Regex::new(
        r"(?ix)
        \b\d{4}-\d{2}-\d{2}\b
        | \b\d{1,2}[/-]\d{1,2}[/-]\d{4}\b
        | \b\d{1,2}:\d{2}:\d{2}\b
        | \b\d{1,2}:\d{2}\s*(?:am|pm|utc|gmt)\b
        | \b\d{1,2}\s+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{4}\b
        | \b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2},\s+\d{4}\b
        "
    )
    .unwrap();

    static ref RE_IP: Regex = Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").unwrap();

    static ref RE_PAGE_NUMBER: Regex = Regex::new(
        r"(?i)^(?:(?:page\s+)?\d{1,4}(?:\s+of\s+\d{1,4})?|[-\u{2013}\u{2014}]\s*\d{1,4}\s*[-\u{2013}\u{2014}]|[\[(]\d{1,4}[\])])$"
    )
    .unwrap();

    static ref RE_EMAIL: Regex = Regex::new(r"\b[\w.+-]+@[\w-]+\.[\w.-]+\b").unwrap();
}

/// Whether `text` contains `shape` (page numbers must fill the whole line).
pub fn has_shape(shape: Shape, text: &str) -> bool {
    let text = text.trim();
    match shape {
        Shape::Url => RE_URL.is_match(text),
        Shape::Doi => RE_DOI.is_match(text),
        Shape::Issn => RE_ISSN.is_match(text),
        Shape::Timestamp => RE_TIMESTAMP.is_match(text),
        Shape::IpAddress => RE_IP.is_match(text),
        Shape::PageNumber => RE_PAGE_NUMBER.is_match(text),
        Shape::Email => RE_EMAIL.is_match(text),
    }
}

const TERMINAL_PUNCTUATION: &[char] = &['.', '!', '?', ':', ';', ','];

/// Heading heuristic: a short line without terminal punctuation that is
/// either all upper case or starts upper case with a high share of capitals.
pub fn is_heading(text: &str, max_chars: usize) -> bool {
    let text = text.trim();
    if text.is_empty() || text.chars().count() >= max_chars {
        return false;
    }
    if text.ends_with(TERMINAL_PUNCTUATION) || text.ends_with('-') {
        return false;
    }
    if !text.chars().any(|c| c.is_alphabetic()) {
        return false;
    }

    let all_upper = text
        .chars()
        .filter(|c| c.is_alphabetic())
        .all(|c| c.is_uppercase());
    if all_upper {
        return true;
    }

    let starts_upper = text.chars().next().is_some_and(|c| c.is_uppercase());
    let total = text.chars().count();
    let capitals = text.chars().filter(|c| c.is_uppercase()).count();
    starts_upper && capitals as f64 > total as f64 * 0.3
}
