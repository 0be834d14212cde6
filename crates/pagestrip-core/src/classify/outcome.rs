use crate::model::PositionBucket;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Classification tag of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineClass {
    Body,
    Boilerplate,
    CitationHeader,
    PageNumber,
}

impl LineClass {
    /// Body text and citation headers survive rendering.
    pub fn is_kept(&self) -> bool {
        matches!(self, LineClass::Body | LineClass::CitationHeader)
    }
}

impl fmt::Display for LineClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineClass::Body => write!(f, "BODY"),
            LineClass::Boilerplate => write!(f, "BOILERPLATE"),
            LineClass::CitationHeader => write!(f, "CITATION_HEADER"),
            LineClass::PageNumber => write!(f, "PAGE_NUMBER"),
        }
    }
}

/// Which signal produced a line's classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Provenance {
    /// Not classified yet.
    Unclassified,
    PlatformPattern {
        rule_id: String,
        platform: String,
    },
    GenericPattern {
        rule_id: String,
    },
    Frequency {
        signature: String,
        bucket: PositionBucket,
        pages: usize,
    },
    /// Bare number in a run of increasing page numbers.
    PageSequence,
    FrontMatter,
    Blank,
    Default,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Unclassified => write!(f, "unclassified"),
            Provenance::PlatformPattern { rule_id, platform } => {
                write!(f, "{} pattern '{}'", platform, rule_id)
            }
            Provenance::GenericPattern { rule_id } => write!(f, "generic pattern '{}'", rule_id),
            Provenance::Frequency {
                signature,
                bucket,
                pages,
            } => write!(f, "repeats as {} on {} pages: \"{}\"", bucket, pages, signature),
            Provenance::PageSequence => write!(f, "running page number"),
            Provenance::FrontMatter => write!(f, "front-matter page"),
            Provenance::Blank => write!(f, "blank line"),
            Provenance::Default => write!(f, "default"),
        }
    }
}

/// Per-class line counts for a classified document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassCounts {
    pub body: usize,
    pub boilerplate: usize,
    pub citation_header: usize,
    pub page_number: usize,
    /// Stripped lines keyed by the rule id or "page_sequence" / "frequency" / "front_matter".
    pub stripped_by: BTreeMap<String, usize>,
}

impl ClassCounts {
    pub fn stripped(&self) -> usize {
        self.boilerplate + self.page_number
    }
}
