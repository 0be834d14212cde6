use pagestrip_core::model::ConversionWarning;
use pagestrip_core::Conversion;
use std::path::Path;

/// One status line per converted file, on stderr so `--preview` output stays clean.
pub fn print(input: &Path, conversion: &Conversion, written: Option<&Path>, verbose: bool) {
    let doc = &conversion.document;
    let counts = &conversion.counts;

    let ocr = doc.ocr_pages().len();
    let ocr_info = if ocr > 0 {
        format!(" ({} OCR)", ocr)
    } else {
        String::new()
    };
    let target = written
        .map(|p| format!(" -> {}", p.display()))
        .unwrap_or_default();

    eprintln!(
        "{}: {} pages{}, removed {} boilerplate and {} page-number lines{}",
        input.display(),
        doc.page_count(),
        ocr_info,
        counts.boilerplate,
        counts.page_number,
        target
    );

    for warning in &conversion.warnings {
        eprintln!("{}", warning_line(input, warning));
    }

    if verbose && !counts.stripped_by.is_empty() {
        let width = counts
            .stripped_by
            .keys()
            .map(|k| k.len())
            .max()
            .unwrap_or(10);
        for (source, lines) in &counts.stripped_by {
            eprintln!("  {:<width$}  {}", source, lines, width = width);
        }
    }
}

/// A warning line that names the file it came from.
fn warning_line(input: &Path, warning: &ConversionWarning) -> String {
    format!("{}: warning: {}", input.display(), warning)
}
