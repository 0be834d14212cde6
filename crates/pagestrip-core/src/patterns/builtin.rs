use crate::error::StripError;
use crate::patterns::schema::PatternLibraryDef;
use crate::patterns::PatternLibrary;

const BUILTIN_JSON: &str = include_str!("../../../../patterns/builtin.json");

/// Platforms covered by the built-in rules, besides "generic".
pub const PLATFORMS: &[&str] = &[
    "jstor",
    "proquest",
    "ebsco",
    "duke_university_press",
    "taylor_francis",
    "escholarship",
    "chicago_unbound",
];

/// The built-in pattern file, parsed but not compiled.
pub fn builtin_def() -> Result<PatternLibraryDef, StripError> {
    let def: PatternLibraryDef = serde_json::from_str(BUILTIN_JSON)?;
    Ok(def)
}

/// Compile the built-in pattern library.
pub fn builtin_library() -> Result<PatternLibrary, StripError> {
    PatternLibrary::from_defs(&[builtin_def()?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::outcome::LineClass;
    use crate::segment::segment_page;

    fn rule_ids(text: &str) -> Vec<String> {
        let library = builtin_library().unwrap();
        let page = segment_page(0, text, false);
        let n = page.content_lines();
        library
            .matching_rules(&page.lines[0], n)
            .iter()
            .map(|r| r.id.clone())
            .collect()
    }

    #[test]
    fn test_builtin_is_valid() {
        let def = builtin_def().unwrap();
        assert!(crate::patterns::validate_library(&def).is_ok());
        let library = builtin_library().unwrap();
        assert_eq!(library.len(), def.rules.len());
    }

    #[test]
    fn test_every_platform_has_rules() {
        let library = builtin_library().unwrap();
        let platforms = library.platforms();
        for platform in PLATFORMS {
            assert!(platforms.contains(platform), "no rules for {}", platform);
        }
        assert!(platforms.contains(&"generic"));
    }

    #[test]
    fn test_jstor_stamp() {
        let ids = rule_ids("This content downloaded from 128.59.222.107 on Thu, 18 Feb 2021 01:02:03 UTC");
        assert!(ids.contains(&"jstor_download".to_string()));
    }

    #[test]
    fn test_doi_only_on_its_own_line() {
        assert!(rule_ids("https://doi.org/10.1080/15348431.2020.1234567")
            .contains(&"doi_line".to_string()));
        assert!(rule_ids("doi:10.1080/1234.5678").contains(&"doi_line".to_string()));
        assert!(rule_ids("See Doe, Borders of Care, doi:10.1080/1234.5678 for the full data.")
            .is_empty());
    }

    #[test]
    fn test_proquest_lines() {
        assert!(rule_ids("Created from columbia on 2024-01-12 09:15:44.")
            .contains(&"proquest_created".to_string()));
        assert!(rule_ids("Ebook pages 12-40 | Printed page 3 of 29")
            .contains(&"proquest_page_range".to_string()));
    }

    #[test]
    fn test_ebsco_and_duke_lines() {
        assert!(rule_ids("EBSCO Publishing : eBook Collection (EBSCOhost) - printed on 3/1/2024")
            .contains(&"ebsco_header".to_string()));
        assert!(rule_ids("Downloaded from https://read.dukeupress.edu/books/chapter-pdf/1/2")
            .contains(&"duke_download".to_string()));
        assert!(rule_ids("by COLUMBIA UNIVERSITY user").contains(&"duke_user".to_string()));
    }

    #[test]
    fn test_citation_rules_target_citation_header() {
        let library = builtin_library().unwrap();
        let rule = library
            .rules()
            .iter()
            .find(|r| r.id == "proquest_citation")
            .unwrap();
        assert_eq!(rule.target, LineClass::CitationHeader);
        assert!(rule_ids("Doe, Jane. Borders of Care, Duke University Press, 2019. ProQuest Ebook Central")
            .contains(&"proquest_citation".to_string()));
    }

    #[test]
    fn test_body_sentence_matches_nothing() {
        assert!(rule_ids("The archive was assembled over three decades of fieldwork.").is_empty());
    }
}
