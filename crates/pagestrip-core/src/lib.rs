pub mod citation;
pub mod classify;
pub mod config;
pub mod error;
pub mod extraction;
pub mod frequency;
pub mod hyphenation;
pub mod model;
pub mod patterns;
pub mod reflow;
pub mod segment;
pub mod trace;

use classify::outcome::ClassCounts;
use config::ConvertConfig;
use error::StripError;
use extraction::{OcrEngine, PageExtractor};
use frequency::{FrequencyAnalysis, FrequencyRecord};
use model::{ConversionWarning, Document};
use patterns::PatternLibrary;
use std::path::{Path, PathBuf};

/// Result of converting one document.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Clean text, citation summary first when one was built.
    pub text: String,
    /// Page-level problems that degraded the output.
    pub warnings: Vec<ConversionWarning>,
    pub counts: ClassCounts,
    /// The classified document; every line is still present.
    pub document: Document,
    pub summary: Option<String>,
    pub flagged: Vec<FrequencyRecord>,
    pub frequency_enabled: bool,
    pub required_pages: usize,
}

/// Main API entry point: convert a PDF into clean, speech-friendly text.
///
/// Pages with a poor text layer are routed through `ocr` when one is given.
/// OCR failures degrade the page and are reported in `warnings`.
pub fn convert_pdf(
    pdf_bytes: &[u8],
    source: &str,
    extractor: &dyn PageExtractor,
    ocr: Option<&dyn OcrEngine>,
    library: &PatternLibrary,
    config: &ConvertConfig,
) -> Result<Conversion, StripError> {
    config.validate()?;
    log::info!("{}: extracting with {}", source, extractor.backend_name());
    let (document, warnings) =
        extraction::extract_document(pdf_bytes, source, extractor, ocr, config)?;
    convert_document(document, warnings, library, config)
}

/// Run the pipeline over already extracted page texts, one string per page.
pub fn convert_pages(
    pages: &[String],
    source: &str,
    library: &PatternLibrary,
    config: &ConvertConfig,
) -> Result<Conversion, StripError> {
    config.validate()?;
    let document = Document {
        source: source.to_string(),
        info: extraction::DocumentInfo::default(),
        pages: pages
            .iter()
            .enumerate()
            .map(|(index, text)| segment::segment_page(index, text, false))
            .collect(),
    };
    convert_document(document, Vec::new(), library, config)
}

fn convert_document(
    mut document: Document,
    warnings: Vec<ConversionWarning>,
    library: &PatternLibrary,
    config: &ConvertConfig,
) -> Result<Conversion, StripError> {
    // Pass 1
    let frequency = FrequencyAnalysis::build(&document, config);
    // Pass 2
    let counts = classify::classify(&mut document, library, &frequency, config);

    if counts.body == 0 {
        return Err(StripError::EmptyDocument {
            source_name: document.source.clone(),
            stripped: counts.stripped(),
        });
    }

    let lines =
        hyphenation::repair_hyphenation(hyphenation::surviving_lines(&document), config);

    let summary = if config.citation_summary {
        citation::summarize(&document.info, &lines)
    } else {
        None
    };
    let body = reflow::reflow(&lines, config, summary.is_some());
    let text = match &summary {
        Some(summary) => citation::with_summary(summary, &body),
        None => body,
    };

    log::info!(
        "{}: {} page(s), {} line(s) stripped",
        document.source,
        document.page_count(),
        counts.stripped()
    );

    Ok(Conversion {
        text,
        warnings,
        counts,
        summary,
        flagged: frequency.flagged(),
        frequency_enabled: frequency.is_enabled(),
        required_pages: frequency.required_pages(),
        document,
    })
}

/// `paper.pdf` becomes `paper_clean.txt` in the same directory.
pub fn output_file_name(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_clean.txt", stem))
}
