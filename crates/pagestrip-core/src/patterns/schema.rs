use serde::{Deserialize, Serialize};

/// Platform identifier for rules that apply to any source.
pub const GENERIC_PLATFORM: &str = "generic";

/// A pattern file: an ordered list of boilerplate rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternLibraryDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    pub rules: Vec<PatternRuleDef>,
}

/// A single declarative rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRuleDef {
    /// Unique rule identifier, recorded as provenance.
    pub id: String,
    /// Platform the rule was written for, or "generic".
    #[serde(default = "default_platform")]
    pub platform: String,
    pub matcher: MatcherDef,
    pub target: RuleTarget,
    /// Restrict the rule to the first/last lines of a page.
    #[serde(default)]
    pub position: Option<PositionDef>,
    /// Only match lines that also contain this shape.
    #[serde(default)]
    pub requires_shape: Option<Shape>,
    /// Match against the raw text instead of the case-folded copy.
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub note: Option<String>,
}

fn default_platform() -> String {
    GENERIC_PLATFORM.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherDef {
    Regex(String),
    Contains(String),
    Shape(Shape),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleTarget {
    Boilerplate,
    PageNumber,
    CitationHeader,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionDef {
    pub edge: Edge,
    /// Window size in non-empty lines.
    pub within: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    First,
    Last,
    Either,
}

/// Well-known text shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Url,
    Doi,
    Issn,
    Timestamp,
    IpAddress,
    /// The whole line is a page number ("12", "Page 12", "- 12 -", "[12]").
    PageNumber,
    Email,
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Url => "url",
            Shape::Doi => "doi",
            Shape::Issn => "issn",
            Shape::Timestamp => "timestamp",
            Shape::IpAddress => "ip_address",
            Shape::PageNumber => "page_number",
            Shape::Email => "email",
        }
    }
}
