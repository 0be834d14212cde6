pub mod pdftotext;
pub mod tesseract;

use crate::config::ConvertConfig;
use crate::error::StripError;
use crate::model::{ConversionWarning, Document};
use crate::segment::segment_page;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Document-level metadata reported by the extraction backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Text of a single page as produced by the extraction backend.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub index: usize,
    pub text: String,
}

/// A page rendered to PNG for OCR.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub page_index: usize,
    pub png: Vec<u8>,
}

/// Trait for PDF text extraction backends.
pub trait PageExtractor: Send + Sync {
    /// Extract the text layer, one RawPage per page, in page order.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<RawPage>, StripError>;

    /// Render a single page (0-based) to an image for OCR.
    fn render_page(&self, pdf_bytes: &[u8], page_index: usize) -> Result<PageImage, StripError>;

    /// Title/author metadata; backends without it return the default.
    fn document_info(&self, _pdf_bytes: &[u8]) -> DocumentInfo {
        DocumentInfo::default()
    }

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Trait for OCR backends.
pub trait OcrEngine: Send + Sync {
    /// Recognize the text of a rendered page, giving up after `timeout`.
    fn recognize(&self, image: &PageImage, timeout: Duration) -> Result<String, StripError>;

    fn backend_name(&self) -> &str;
}

pub fn non_whitespace_chars(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

fn is_garbled(c: char) -> bool {
    (c.is_control() && !c.is_whitespace())
        || c == '\u{FFFD}'
        || ('\u{E000}'..='\u{F8FF}').contains(&c)
}

/// Share of non-whitespace characters that are control, replacement or
/// private-use code points.
pub fn garbled_ratio(text: &str) -> f64 {
    let total = non_whitespace_chars(text);
    if total == 0 {
        return 0.0;
    }
    let garbled = text.chars().filter(|c| is_garbled(*c)).count();
    garbled as f64 / total as f64
}

/// Quality gate: whether a text layer is too thin or too garbled to trust.
pub fn needs_ocr(text: &str, config: &ConvertConfig) -> bool {
    non_whitespace_chars(text) < config.ocr_min_chars
        || garbled_ratio(text) > config.ocr_quality_threshold
}

/// Extract every page, routing poor pages through OCR, and segment them.
///
/// OCR problems degrade the affected page and are returned as warnings;
/// only a failure of the text-layer extraction itself is an error.
pub fn extract_document(
    pdf_bytes: &[u8],
    source: &str,
    extractor: &dyn PageExtractor,
    ocr: Option<&dyn OcrEngine>,
    config: &ConvertConfig,
) -> Result<(Document, Vec<ConversionWarning>), StripError> {
    let raw_pages = extractor.extract_pages(pdf_bytes)?;
    if raw_pages.is_empty() {
        return Err(StripError::Extraction(format!(
            "{} returned no pages for '{}'",
            extractor.backend_name(),
            source
        )));
    }

    let timeout = Duration::from_secs(config.ocr_timeout_secs);
    let mut warnings = Vec::new();
    let mut pages = Vec::with_capacity(raw_pages.len());

    for (index, raw) in raw_pages.into_iter().enumerate() {
        if !needs_ocr(&raw.text, config) {
            pages.push(segment_page(index, &raw.text, false));
            continue;
        }

        let failure = match ocr_page(pdf_bytes, index, extractor, ocr, timeout) {
            Ok(text) if non_whitespace_chars(&text) > 0 => {
                pages.push(segment_page(index, &text, true));
                continue;
            }
            Ok(_) => "OCR returned no text".to_string(),
            Err(e) => e.to_string(),
        };

        let (fallback, message) = degraded_text(&raw.text, failure, config);
        warnings.push(page_warning(source, index, message));
        pages.push(segment_page(index, fallback, false));
    }

    let ocr_count = pages.iter().filter(|p| p.is_ocr).count();
    if ocr_count > 0 {
        log::info!("{}: OCR applied to {} page(s)", source, ocr_count);
    }

    let document = Document {
        source: source.to_string(),
        info: extractor.document_info(pdf_bytes),
        pages,
    };
    Ok((document, warnings))
}

/// Text kept for a page whose OCR failed: a short text layer is kept as
/// is, a garbled one is dropped so the page comes out empty.
fn degraded_text<'a>(text: &'a str, failure: String, config: &ConvertConfig) -> (&'a str, String) {
    if garbled_ratio(text) > config.ocr_quality_threshold {
        ("", format!("{}; garbled text layer dropped", failure))
    } else {
        (text, format!("{}; keeping the text layer", failure))
    }
}

fn ocr_page(
    pdf_bytes: &[u8],
    index: usize,
    extractor: &dyn PageExtractor,
    ocr: Option<&dyn OcrEngine>,
    timeout: Duration,
) -> Result<String, StripError> {
    let engine = ocr.ok_or_else(|| {
        StripError::OcrUnavailable("page needs OCR but no OCR engine is configured".into())
    })?;
    let image = extractor
        .render_page(pdf_bytes, index)
        .map_err(|e| match e {
            StripError::OcrUnavailable(_) => e,
            other => StripError::OcrUnavailable(format!("could not render page: {}", other)),
        })?;
    engine.recognize(&image, timeout).map_err(|e| {
        if e.is_page_level() {
            e
        } else {
            StripError::OcrUnavailable(format!("{} failed: {}", engine.backend_name(), e))
        }
    })
}

fn page_warning(source: &str, index: usize, message: String) -> ConversionWarning {
    log::warn!("{}: page {}: {}", source, index + 1, message);
    ConversionWarning {
        page: Some(index),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_gate_short_text() {
        let config = ConvertConfig::default();
        assert!(needs_ocr("   \n  ", &config));
        assert!(needs_ocr("Fig. 3", &config));
        assert!(!needs_ocr(&"A readable sentence of body text. ".repeat(3), &config));
    }

    #[test]
    fn test_quality_gate_garbled_text() {
        let config = ConvertConfig::default();
        let garbled = "\u{FFFD}\u{E001}\u{0007}x".repeat(20);
        assert!(garbled_ratio(&garbled) > 0.7);
        assert!(needs_ocr(&garbled, &config));
    }

    #[test]
    fn test_degraded_text_drops_garbled_layer() {
        let config = ConvertConfig::default();
        let garbled = "\u{FFFD}\u{FFFD}\u{E001}x".repeat(10);
        let (text, message) = degraded_text(&garbled, "OCR timed out".into(), &config);
        assert_eq!(text, "");
        assert!(message.starts_with("OCR timed out"));

        let (text, message) = degraded_text("Fig. 3", "OCR timed out".into(), &config);
        assert_eq!(text, "Fig. 3");
        assert!(message.ends_with("keeping the text layer"));
    }

    #[test]
    fn test_garbled_ratio_ignores_whitespace() {
        assert_eq!(garbled_ratio(""), 0.0);
        assert_eq!(garbled_ratio("ab \n\t cd"), 0.0);
    }
}
