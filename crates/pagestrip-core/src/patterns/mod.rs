pub mod builtin;
pub mod schema;
pub mod shapes;

use crate::classify::outcome::LineClass;
use crate::error::StripError;
use crate::model::Line;
use crate::segment::{collapse_whitespace, normalize_text};
use regex::{Regex, RegexBuilder};
use schema::{Edge, MatcherDef, PatternLibraryDef, PositionDef, RuleTarget, Shape, GENERIC_PLATFORM};
use std::collections::HashSet;
use std::path::Path;

pub use builtin::builtin_library;
pub use shapes::{has_shape, is_heading};

/// Load a pattern file from JSON.
pub fn load_library(path: &Path) -> Result<PatternLibraryDef, StripError> {
    let content = std::fs::read_to_string(path).map_err(|e| StripError::PatternLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_library(&content, path)
}

/// Parse a pattern file from a JSON string.
pub fn parse_library(json: &str, source: &Path) -> Result<PatternLibraryDef, StripError> {
    let library: PatternLibraryDef =
        serde_json::from_str(json).map_err(|e| StripError::PatternLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_library(&library)?;
    Ok(library)
}

/// Parse a pattern file from a JSON string (no file path context).
pub fn parse_library_str(json: &str) -> Result<PatternLibraryDef, StripError> {
    let library: PatternLibraryDef = serde_json::from_str(json).map_err(StripError::Json)?;
    validate_library(&library)?;
    Ok(library)
}

/// Validate that a pattern file is well-formed.
pub fn validate_library(library: &PatternLibraryDef) -> Result<(), StripError> {
    if library.rules.is_empty() {
        return Err(StripError::PatternInvalid(format!(
            "'{}' has no rules",
            library.name
        )));
    }

    let mut seen = HashSet::new();
    for rule in &library.rules {
        if rule.id.trim().is_empty() {
            return Err(StripError::PatternInvalid("rule id must not be empty".into()));
        }
        if !seen.insert(rule.id.as_str()) {
            return Err(StripError::PatternInvalid(format!(
                "duplicate rule id '{}'",
                rule.id
            )));
        }
        if rule.platform.trim().is_empty() {
            return Err(StripError::PatternInvalid(format!(
                "rule '{}' has an empty platform",
                rule.id
            )));
        }
        match &rule.matcher {
            MatcherDef::Regex(pattern) | MatcherDef::Contains(pattern)
                if pattern.trim().is_empty() =>
            {
                return Err(StripError::PatternInvalid(format!(
                    "rule '{}' has an empty pattern",
                    rule.id
                )));
            }
            MatcherDef::Regex(pattern) => {
                build_regex(pattern, rule.case_sensitive).map_err(|e| {
                    StripError::PatternInvalid(format!("rule '{}': {}", rule.id, e))
                })?;
            }
            _ => {}
        }
        if let Some(position) = rule.position {
            if position.within == 0 {
                return Err(StripError::PatternInvalid(format!(
                    "rule '{}' has a zero-width position window",
                    rule.id
                )));
            }
        }
    }

    Ok(())
}

fn build_regex(pattern: &str, case_sensitive: bool) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .build()
}

#[derive(Debug, Clone)]
enum Matcher {
    Regex(Regex),
    Contains(String),
    Shape(Shape),
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub id: String,
    pub platform: String,
    pub target: LineClass,
    pub position: Option<PositionDef>,
    pub requires_shape: Option<Shape>,
    pub case_sensitive: bool,
    matcher: Matcher,
}

impl PatternRule {
    pub fn is_generic(&self) -> bool {
        self.platform == GENERIC_PLATFORM
    }

    /// Human-readable matcher, for listings.
    pub fn describe_matcher(&self) -> String {
        match &self.matcher {
            Matcher::Regex(re) => format!("regex /{}/", re.as_str()),
            Matcher::Contains(needle) => format!("contains \"{}\"", needle),
            Matcher::Shape(shape) => format!("shape {}", shape.name()),
        }
    }

    /// Test the rule against a line on a page with `content_lines` non-empty lines.
    pub fn matches(&self, line: &Line, content_lines: usize) -> bool {
        if line.is_blank() {
            return false;
        }
        if let Some(position) = self.position {
            if !within_window(position, line.content_rank, content_lines) {
                return false;
            }
        }

        let collapsed;
        let text: &str = if self.case_sensitive {
            collapsed = collapse_whitespace(&line.raw);
            &collapsed
        } else {
            &line.normalized
        };

        if let Some(shape) = self.requires_shape {
            if !has_shape(shape, text) {
                return false;
            }
        }

        match &self.matcher {
            Matcher::Regex(re) => re.is_match(text),
            Matcher::Contains(needle) => text.contains(needle.as_str()),
            Matcher::Shape(shape) => has_shape(*shape, text),
        }
    }

    fn compile(def: &schema::PatternRuleDef) -> Result<PatternRule, StripError> {
        let matcher = match &def.matcher {
            MatcherDef::Regex(pattern) => Matcher::Regex(
                build_regex(pattern, def.case_sensitive)
                    .map_err(|e| StripError::PatternInvalid(format!("rule '{}': {}", def.id, e)))?,
            ),
            MatcherDef::Contains(needle) if def.case_sensitive => {
                Matcher::Contains(collapse_whitespace(needle))
            }
            MatcherDef::Contains(needle) => {
                Matcher::Contains(normalize_text(needle))
            }
            MatcherDef::Shape(shape) => Matcher::Shape(*shape),
        };
        Ok(PatternRule {
            id: def.id.clone(),
            platform: def.platform.trim().to_lowercase(),
            target: match def.target {
                RuleTarget::Boilerplate => LineClass::Boilerplate,
                RuleTarget::PageNumber => LineClass::PageNumber,
                RuleTarget::CitationHeader => LineClass::CitationHeader,
            },
            position: def.position,
            requires_shape: def.requires_shape,
            case_sensitive: def.case_sensitive,
            matcher,
        })
    }
}

fn within_window(position: PositionDef, rank: Option<usize>, content_lines: usize) -> bool {
    let Some(rank) = rank else {
        return false;
    };
    let from_end = content_lines.saturating_sub(rank + 1);
    match position.edge {
        Edge::First => rank < position.within,
        Edge::Last => from_end < position.within,
        Edge::Either => rank < position.within || from_end < position.within,
    }
}

/// Ordered, immutable set of compiled rules. Safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct PatternLibrary {
    rules: Vec<PatternRule>,
}

impl PatternLibrary {
    /// A library with no rules; only frequency analysis will strip lines.
    pub fn empty() -> Self {
        PatternLibrary::default()
    }

    /// Compile one or more pattern files, in order.
    pub fn from_defs(defs: &[PatternLibraryDef]) -> Result<Self, StripError> {
        let mut library = PatternLibrary::empty();
        for def in defs {
            library.append(def)?;
        }
        Ok(library)
    }

    /// Append the rules of another pattern file after the existing ones.
    pub fn append(&mut self, def: &PatternLibraryDef) -> Result<(), StripError> {
        validate_library(def)?;
        for rule_def in &def.rules {
            if self.rules.iter().any(|r| r.id == rule_def.id) {
                return Err(StripError::PatternInvalid(format!(
                    "rule id '{}' from '{}' is already defined",
                    rule_def.id, def.name
                )));
            }
            self.rules.push(PatternRule::compile(rule_def)?);
        }
        Ok(())
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules matching `line`, in declaration order.
    pub fn matching_rules(&self, line: &Line, content_lines: usize) -> Vec<&PatternRule> {
        self.rules
            .iter()
            .filter(|r| r.matches(line, content_lines))
            .collect()
    }

    /// Platforms covered by this library, in first-seen order.
    pub fn platforms(&self) -> Vec<&str> {
        let mut platforms: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if !platforms.contains(&rule.platform.as_str()) {
                platforms.push(&rule.platform);
            }
        }
        platforms
    }
}
