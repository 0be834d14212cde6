use crate::error::StripError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Tuning knobs for a conversion run.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Fraction of pages a signature must appear on (same position bucket)
    /// before it is treated as boilerplate.
    pub repetition_threshold: f64,
    /// Documents shorter than this never trigger frequency-based removal.
    pub min_sample_pages: usize,
    /// Maximum ratio of garbled characters a text layer may contain before
    /// the page is sent to OCR.
    pub ocr_quality_threshold: f64,
    /// Pages with fewer non-whitespace characters than this are sent to OCR.
    pub ocr_min_chars: usize,
    /// Per-page OCR timeout.
    pub ocr_timeout_secs: u64,
    /// Words that legitimately end in a hyphen at a line break ("self-").
    pub hyphenation_exceptions: BTreeSet<String>,
    /// Number of non-empty lines at each page edge that count as the
    /// first/last position bucket.
    pub edge_window: usize,
    /// Lines at least this long are considered body text, never headings.
    pub heading_max_chars: usize,
    /// Drop a short platform cover sheet on the first page.
    pub strip_front_matter: bool,
    /// Emit a citation summary at the top of the output.
    pub citation_summary: bool,
    /// Keep abbreviations as printed instead of expanding them for speech.
    pub faithful: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        ConvertConfig {
            repetition_threshold: 0.6,
            min_sample_pages: 3,
            ocr_quality_threshold: 0.3,
            ocr_min_chars: 50,
            ocr_timeout_secs: 60,
            hyphenation_exceptions: default_hyphenation_exceptions(),
            edge_window: 1,
            heading_max_chars: 100,
            strip_front_matter: true,
            citation_summary: true,
            faithful: false,
        }
    }
}

fn default_hyphenation_exceptions() -> BTreeSet<String> {
    ["self", "non", "well", "quasi", "ex", "anti"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl ConvertConfig {
    /// Whether `word` (with or without its trailing hyphen) is an allow-listed
    /// compound prefix.
    pub fn is_hyphenation_exception(&self, word: &str) -> bool {
        let key = word.trim().trim_end_matches('-').to_lowercase();
        self.hyphenation_exceptions
            .iter()
            .any(|e| e.trim().trim_end_matches('-').to_lowercase() == key)
    }

    pub fn validate(&self) -> Result<(), StripError> {
        if !(self.repetition_threshold > 0.0 && self.repetition_threshold <= 1.0) {
            return Err(StripError::ConfigInvalid(format!(
                "repetition_threshold must be in (0, 1], got {}",
                self.repetition_threshold
            )));
        }
        if self.min_sample_pages == 0 {
            return Err(StripError::ConfigInvalid(
                "min_sample_pages must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.ocr_quality_threshold) {
            return Err(StripError::ConfigInvalid(format!(
                "ocr_quality_threshold must be in [0, 1], got {}",
                self.ocr_quality_threshold
            )));
        }
        if self.edge_window == 0 {
            return Err(StripError::ConfigInvalid(
                "edge_window must be at least 1".into(),
            ));
        }
        if self.ocr_timeout_secs == 0 {
            return Err(StripError::ConfigInvalid(
                "ocr_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Load a config from a JSON file.
pub fn load_config(path: &Path) -> Result<ConvertConfig, StripError> {
    let content = std::fs::read_to_string(path).map_err(|e| StripError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let config: ConvertConfig =
        serde_json::from_str(&content).map_err(|e| StripError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    config.validate()?;
    Ok(config)
}
