use crate::classify::outcome::{ClassCounts, LineClass, Provenance};
use crate::config::ConvertConfig;
use crate::frequency::FrequencyAnalysis;
use crate::model::{Document, Line, Page};
use crate::patterns::{PatternLibrary, PatternRule};

/// Cover sheets longer than this are treated as real content.
const FRONT_MATTER_MAX_CHARS: usize = 500;

/// Text that identifies a platform cover sheet on the first page.
const FRONT_MATTER_MARKERS: &[&str] = &[
    "jstor is a not-for-profit",
    "escholarship.org",
    "chicago unbound",
    "follow this and additional works",
    "stable url:",
    "recommended citation",
];

/// Pass 2: tag every line of `doc` with a class and its provenance.
///
/// Decision order per line: citation-header rule, boilerplate/page-number
/// rule, running page number, frequency flag, front-matter page, body. Re-running on an already
/// classified document produces the same tags.
pub fn classify(
    doc: &mut Document,
    library: &PatternLibrary,
    frequency: &FrequencyAnalysis,
    config: &ConvertConfig,
) -> ClassCounts {
    let front_matter = config.strip_front_matter && is_front_matter(doc.pages.first());

    for page in &mut doc.pages {
        let content_lines = page.content_lines();
        let cover = front_matter && page.index == 0;
        for line in &mut page.lines {
            let (class, provenance) =
                classify_line(line, content_lines, cover, library, frequency);
            line.class = class;
            line.provenance = provenance;
        }
    }

    let counts = count_classes(doc);
    log::info!(
        "{}: {} body, {} boilerplate, {} page-number, {} citation-header line(s)",
        doc.source,
        counts.body,
        counts.boilerplate,
        counts.page_number,
        counts.citation_header
    );
    counts
}

fn classify_line(
    line: &Line,
    content_lines: usize,
    cover: bool,
    library: &PatternLibrary,
    frequency: &FrequencyAnalysis,
) -> (LineClass, Provenance) {
    if line.is_blank() {
        return (LineClass::Body, Provenance::Blank);
    }

    let matched = library.matching_rules(line, content_lines);

    if let Some(rule) = matched
        .iter()
        .find(|r| r.target == LineClass::CitationHeader)
    {
        return (LineClass::CitationHeader, rule_provenance(rule));
    }

    if let Some(rule) = most_specific(&matched) {
        return (rule.target, rule_provenance(rule));
    }

    if frequency.is_page_number(line) {
        return (LineClass::PageNumber, Provenance::PageSequence);
    }

    if let Some(record) = frequency.flag_for(line, content_lines) {
        return (
            LineClass::Boilerplate,
            Provenance::Frequency {
                signature: record.signature,
                bucket: record.bucket,
                pages: record.pages,
            },
        );
    }

    if cover {
        return (LineClass::Boilerplate, Provenance::FrontMatter);
    }

    (LineClass::Body, Provenance::Default)
}

/// Platform rules beat generic ones, then PAGE_NUMBER beats BOILERPLATE,
/// then the earliest declared rule wins.
fn most_specific<'a>(matched: &[&'a PatternRule]) -> Option<&'a PatternRule> {
    matched
        .iter()
        .enumerate()
        .filter(|(_, r)| r.target != LineClass::CitationHeader)
        .min_by_key(|(order, r)| (r.is_generic(), r.target != LineClass::PageNumber, *order))
        .map(|(_, r)| *r)
}

fn rule_provenance(rule: &PatternRule) -> Provenance {
    if rule.is_generic() {
        Provenance::GenericPattern {
            rule_id: rule.id.clone(),
        }
    } else {
        Provenance::PlatformPattern {
            rule_id: rule.id.clone(),
            platform: rule.platform.clone(),
        }
    }
}

/// A short first page carrying a known platform cover-sheet marker.
pub fn is_front_matter(page: Option<&Page>) -> bool {
    let Some(page) = page else {
        return false;
    };
    let text = page.raw_text.trim();
    if text.is_empty() || text.chars().count() >= FRONT_MATTER_MAX_CHARS {
        return false;
    }
    let lower = text.to_lowercase();
    FRONT_MATTER_MARKERS.iter().any(|m| lower.contains(m))
}

/// Tally classes over the non-blank lines of `doc`.
pub fn count_classes(doc: &Document) -> ClassCounts {
    let mut counts = ClassCounts::default();
    for line in doc.lines().filter(|l| !l.is_blank()) {
        match line.class {
            LineClass::Body => counts.body += 1,
            LineClass::Boilerplate => counts.boilerplate += 1,
            LineClass::CitationHeader => counts.citation_header += 1,
            LineClass::PageNumber => counts.page_number += 1,
        }
        if !line.is_kept() {
            let key = match &line.provenance {
                Provenance::PlatformPattern { rule_id, .. }
                | Provenance::GenericPattern { rule_id } => rule_id.clone(),
                Provenance::Frequency { .. } => "frequency".to_string(),
                Provenance::PageSequence => "page_sequence".to_string(),
                Provenance::FrontMatter => "front_matter".to_string(),
                other => other.to_string(),
            };
            *counts.stripped_by.entry(key).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::DocumentInfo;
    use crate::patterns::{builtin_library, parse_library_str};
    use crate::segment::segment_page;

    fn doc(pages: &[&str]) -> Document {
        Document {
            source: "test.pdf".into(),
            info: DocumentInfo::default(),
            pages: pages
                .iter()
                .enumerate()
                .map(|(i, text)| segment_page(i, text, false))
                .collect(),
        }
    }

    fn run(d: &mut Document, library: &PatternLibrary) -> ClassCounts {
        let config = ConvertConfig::default();
        let frequency = FrequencyAnalysis::build(d, &config);
        classify(d, library, &frequency, &config)
    }

    #[test]
    fn test_blank_lines_are_body() {
        let mut d = doc(&["Some body text here.\n\nMore text."]);
        run(&mut d, &PatternLibrary::empty());
        let blank = &d.pages[0].lines[1];
        assert_eq!(blank.class, LineClass::Body);
        assert_eq!(blank.provenance, Provenance::Blank);
    }

    #[test]
    fn test_citation_header_outranks_doi_rule() {
        let library = builtin_library().unwrap();
        let mut d = doc(&[
            "To cite this article: Jane Doe (2020) Borders of Care, DOI: 10.1080/1234.2020.99\nBody paragraph begins here and goes on.",
        ]);
        run(&mut d, &library);
        let header = &d.pages[0].lines[0];
        assert_eq!(header.class, LineClass::CitationHeader);
        assert!(header.is_kept());
    }

    #[test]
    fn test_platform_rule_beats_generic() {
        let library = PatternLibrary::from_defs(&[parse_library_str(
            r#"{
                "name": "t",
                "version": "1",
                "rules": [
                    { "id": "any_url", "matcher": { "shape": "url" }, "target": "boilerplate" },
                    { "id": "jstor_url", "platform": "jstor", "matcher": { "contains": "jstor.org" }, "target": "boilerplate" }
                ]
            }"#,
        )
        .unwrap()])
        .unwrap();
        let mut d = doc(&["https://www.jstor.org/stable/123\nBody."]);
        run(&mut d, &library);
        assert_eq!(
            d.pages[0].lines[0].provenance,
            Provenance::PlatformPattern {
                rule_id: "jstor_url".into(),
                platform: "jstor".into()
            }
        );
    }

    #[test]
    fn test_page_number_beats_boilerplate_among_generic() {
        let library = PatternLibrary::from_defs(&[parse_library_str(
            r#"{
                "name": "t",
                "version": "1",
                "rules": [
                    { "id": "short_line", "matcher": { "regex": "^.{1,4}$" }, "target": "boilerplate" },
                    { "id": "number", "matcher": { "shape": "page_number" }, "target": "page_number" }
                ]
            }"#,
        )
        .unwrap()])
        .unwrap();
        let mut d = doc(&["Body text on the page.\n12"]);
        run(&mut d, &library);
        assert_eq!(d.pages[0].lines[1].class, LineClass::PageNumber);
    }

    #[test]
    fn test_running_page_numbers_without_rules() {
        let mut d = doc(&[
            "1987\nFounded that year.\n41",
            "Growth was slow.\n42",
            "Then it doubled.\n43",
        ]);
        let counts = run(&mut d, &PatternLibrary::empty());
        assert_eq!(d.pages[1].lines[1].class, LineClass::PageNumber);
        assert_eq!(d.pages[1].lines[1].provenance, Provenance::PageSequence);
        assert_eq!(d.pages[0].lines[0].class, LineClass::Body);
        assert_eq!(counts.stripped_by.get("page_sequence"), Some(&3));
    }

    #[test]
    fn test_classification_is_idempotent() {
        let library = builtin_library().unwrap();
        let pages: Vec<String> = (1..=5)
            .map(|n| format!("Downloaded from 10.0.0.{} on 2024-01-0{}\nBody line {}.\n{}", n, n, n, n))
            .collect();
        let refs: Vec<&str> = pages.iter().map(|s| s.as_str()).collect();
        let mut d = doc(&refs);
        run(&mut d, &library);
        let first: Vec<(LineClass, Provenance)> =
            d.lines().map(|l| (l.class, l.provenance.clone())).collect();
        run(&mut d, &library);
        let second: Vec<(LineClass, Provenance)> =
            d.lines().map(|l| (l.class, l.provenance.clone())).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_front_matter_cover_sheet() {
        let mut d = doc(&[
            "Recommended Citation\nDoe, Jane. Some Article.\nFollow this and additional works at: example",
            "Real body text starts on the second page.",
        ]);
        let counts = run(&mut d, &PatternLibrary::empty());
        assert!(d.pages[0].lines.iter().all(|l| !l.is_kept()));
        assert_eq!(d.pages[0].lines[1].provenance, Provenance::FrontMatter);
        assert_eq!(counts.stripped_by.get("front_matter"), Some(&3));
        assert_eq!(counts.body, 1);
    }

    #[test]
    fn test_front_matter_requires_marker_and_short_page() {
        let d = doc(&["Just a short opening page."]);
        assert!(!is_front_matter(d.pages.first()));
        let long = format!("Recommended citation\n{}", "word ".repeat(200));
        let d = doc(&[long.as_str()]);
        assert!(!is_front_matter(d.pages.first()));
    }
}
