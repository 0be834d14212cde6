use crate::classify::outcome::{LineClass, Provenance};
use crate::extraction::DocumentInfo;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a line sits on its page, counted over non-empty lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionBucket {
    First,
    Last,
    Other,
}

impl fmt::Display for PositionBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionBucket::First => write!(f, "first-line"),
            PositionBucket::Last => write!(f, "last-line"),
            PositionBucket::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub page_index: usize,
    pub line_index: usize,
    /// Text as extracted, trailing whitespace removed.
    pub raw: String,
    /// Whitespace-collapsed, lowercased copy used only for matching.
    pub normalized: String,
    /// Leading indentation width in columns.
    pub indent: usize,
    /// Rank among the non-empty lines of the page, `None` for blank lines.
    pub content_rank: Option<usize>,
    pub class: LineClass,
    pub provenance: Provenance,
}

impl Line {
    pub fn is_blank(&self) -> bool {
        self.normalized.is_empty()
    }

    /// The raw text without surrounding whitespace.
    pub fn text(&self) -> &str {
        self.raw.trim()
    }

    /// Whether the line survives rendering.
    pub fn is_kept(&self) -> bool {
        self.class.is_kept()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub index: usize,
    pub raw_text: String,
    pub is_ocr: bool,
    pub lines: Vec<Line>,
}

impl Page {
    /// Number of non-empty lines on the page.
    pub fn content_lines(&self) -> usize {
        self.lines.iter().filter(|l| !l.is_blank()).count()
    }
}

/// A PDF's pages and every line annotation derived from them.
///
/// Lines are never removed; rendering filters on [`Line::is_kept`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub source: String,
    pub info: DocumentInfo,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.pages.iter().flat_map(|p| p.lines.iter())
    }

    pub fn lines_mut(&mut self) -> impl Iterator<Item = &mut Line> {
        self.pages.iter_mut().flat_map(|p| p.lines.iter_mut())
    }

    pub fn ocr_pages(&self) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|p| p.is_ocr)
            .map(|p| p.index)
            .collect()
    }
}

/// A page-level problem that degraded the output without aborting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionWarning {
    /// 0-based page index, if the warning concerns a single page.
    pub page: Option<usize>,
    pub message: String,
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.page {
            Some(index) => write!(f, "page {}: {}", index + 1, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}
