use pagestrip_core::error::StripError;
use pagestrip_core::patterns::schema::GENERIC_PLATFORM;
use pagestrip_core::patterns::{self, PatternRule};
use std::path::{Path, PathBuf};

use crate::commands::convert::load_patterns;

pub fn list(extra: &[PathBuf]) -> Result<(), StripError> {
    let library = load_patterns(extra)?;

    println!("{} boilerplate rules:\n", library.len());
    for platform in library.platforms() {
        let rules: Vec<&PatternRule> = library
            .rules()
            .iter()
            .filter(|r| r.platform == platform)
            .collect();
        println!("  {} ({} rules)", platform, rules.len());

        let width = rules.iter().map(|r| r.id.len()).max().unwrap_or(10);
        for rule in rules {
            println!(
                "    {:<width$}  {:<15}  {}{}",
                rule.id,
                rule.target.to_string(),
                rule.describe_matcher(),
                describe_constraints(rule),
                width = width
            );
        }
        println!();
    }
    Ok(())
}

fn describe_constraints(rule: &PatternRule) -> String {
    let mut parts = Vec::new();
    if let Some(position) = rule.position {
        parts.push(format!("{:?} {} lines", position.edge, position.within).to_lowercase());
    }
    if let Some(shape) = rule.requires_shape {
        parts.push(format!("requires {}", shape.name()));
    }
    if rule.case_sensitive {
        parts.push("case-sensitive".to_string());
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("  [{}]", parts.join(", "))
    }
}

pub fn validate(file: &Path) -> Result<(), StripError> {
    let def = patterns::load_library(file)?;

    // Rule ids must not collide with the built-in set they are appended to.
    let mut library = patterns::builtin_library()?;
    library.append(&def)?;

    println!("Pattern file '{}' (v{}) is valid.", def.name, def.version);
    if let Some(ref desc) = def.description {
        println!("  {}", desc);
    }
    println!("  Rules: {}", def.rules.len());

    let mut warnings = Vec::new();
    for rule in &def.rules {
        if rule.platform == GENERIC_PLATFORM && rule.position.is_none() {
            warnings.push(format!(
                "generic rule '{}' has no position window and applies anywhere on the page",
                rule.id
            ));
        }
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}
