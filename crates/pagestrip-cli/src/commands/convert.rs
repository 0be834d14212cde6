use pagestrip_core::config::{load_config, ConvertConfig};
use pagestrip_core::error::StripError;
use pagestrip_core::extraction::pdftotext::PdftotextExtractor;
use pagestrip_core::extraction::tesseract::TesseractOcr;
use pagestrip_core::extraction::OcrEngine;
use pagestrip_core::patterns::{self, PatternLibrary};
use pagestrip_core::trace::build_audit;
use pagestrip_core::Conversion;
use std::path::{Path, PathBuf};

use crate::output;
use crate::ConvertArgs;

pub fn run(args: ConvertArgs) -> Result<(), StripError> {
    let config = build_config(&args)?;
    let library = load_patterns(&args.patterns)?;

    if !PdftotextExtractor::is_available() {
        return Err(StripError::PdftotextNotFound);
    }
    let extractor = PdftotextExtractor::new();

    let tesseract = TesseractOcr::new();
    let ocr: Option<&dyn OcrEngine> = if args.no_ocr {
        None
    } else {
        if !tesseract.is_available() {
            log::warn!(
                "tesseract not found; scanned pages will be left as extracted. Install it with: {}",
                TesseractOcr::install_hint()
            );
        }
        Some(&tesseract)
    };

    let inputs = collect_inputs(&args.input)?;
    let batch = inputs.len() > 1 || args.input.is_dir();
    let mut failed = 0usize;

    for input in &inputs {
        let name = input.display().to_string();
        let result = std::fs::read(input).map_err(StripError::from).and_then(|bytes| {
            pagestrip_core::convert_pdf(&bytes, &name, &extractor, ocr, &library, &config)
        });

        let conversion = match result {
            Ok(conversion) => conversion,
            Err(e) => {
                eprintln!("{}: {}", name, e);
                failed += 1;
                continue;
            }
        };

        if let Err(e) = write_outputs(input, &conversion, &args, batch) {
            eprintln!("{}: {}", name, e);
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(StripError::BatchFailed {
            failed,
            total: inputs.len(),
        });
    }
    Ok(())
}

/// Config file (or defaults), then individual flags on top.
fn build_config(args: &ConvertArgs) -> Result<ConvertConfig, StripError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ConvertConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config.repetition_threshold = threshold;
    }
    if let Some(min_pages) = args.min_pages {
        config.min_sample_pages = min_pages;
    }
    if args.faithful {
        config.faithful = true;
    }
    config.validate()?;
    Ok(config)
}

/// Built-in rules followed by any user pattern files, in order.
pub fn load_patterns(files: &[PathBuf]) -> Result<PatternLibrary, StripError> {
    let mut library = patterns::builtin_library()?;
    for path in files {
        let def = patterns::load_library(path)?;
        library.append(&def)?;
        log::info!("loaded {} rule(s) from {}", def.rules.len(), path.display());
    }
    Ok(library)
}

/// A single PDF, or every `*.pdf` in a directory, sorted by name.
fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>, StripError> {
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut pdfs: Vec<PathBuf> = std::fs::read_dir(input)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_pdf(path))
        .collect();
    pdfs.sort();

    if pdfs.is_empty() {
        return Err(StripError::Extraction(format!(
            "no PDF files found in {}",
            input.display()
        )));
    }
    Ok(pdfs)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

fn write_outputs(
    input: &Path,
    conversion: &Conversion,
    args: &ConvertArgs,
    batch: bool,
) -> Result<(), StripError> {
    let out_path = if args.preview {
        println!("{}", conversion.text);
        None
    } else {
        let path = target_path(
            input,
            args.output.as_deref(),
            batch,
            pagestrip_core::output_file_name,
        )?;
        std::fs::write(&path, format!("{}\n", conversion.text))?;
        Some(path)
    };

    if let Some(audit_target) = &args.audit {
        let path = target_path(input, Some(audit_target.as_path()), batch, audit_file_name)?;
        output::json::write_audit(&path, &build_audit(conversion))?;
    }

    output::summary::print(input, conversion, out_path.as_deref(), args.verbose);
    Ok(())
}

/// Resolve where a per-input file goes: next to the input, into a
/// directory, or to an explicit file path for a single input.
fn target_path(
    input: &Path,
    requested: Option<&Path>,
    batch: bool,
    default_name: impl Fn(&Path) -> PathBuf,
) -> Result<PathBuf, StripError> {
    let default = default_name(input);
    let Some(requested) = requested else {
        return Ok(default);
    };
    if batch || requested.is_dir() {
        std::fs::create_dir_all(requested)?;
        let file_name = default.file_name().map(PathBuf::from).unwrap_or(default);
        return Ok(requested.join(file_name));
    }
    Ok(requested.to_path_buf())
}

/// `paper.pdf` becomes `paper_audit.json`.
fn audit_file_name(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_audit.json", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_inputs_sorts_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let inputs = collect_inputs(dir.path()).unwrap();
        let names: Vec<String> = inputs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn test_target_path_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = target_path(
            Path::new("/papers/x.pdf"),
            Some(dir.path()),
            false,
            pagestrip_core::output_file_name,
        )
        .unwrap();
        assert_eq!(path, dir.path().join("x_clean.txt"));

        let explicit = dir.path().join("out.txt");
        let path = target_path(
            Path::new("/papers/x.pdf"),
            Some(explicit.as_path()),
            false,
            pagestrip_core::output_file_name,
        )
        .unwrap();
        assert_eq!(path, explicit);
    }

    #[test]
    fn test_audit_file_name() {
        assert_eq!(
            audit_file_name(Path::new("/papers/x.pdf")),
            PathBuf::from("/papers/x_audit.json")
        );
    }

    #[test]
    fn test_flags_override_config() {
        let args = ConvertArgs {
            input: PathBuf::from("x.pdf"),
            output: None,
            preview: false,
            faithful: true,
            config: None,
            patterns: vec![],
            threshold: Some(0.8),
            min_pages: Some(4),
            no_ocr: true,
            audit: None,
            verbose: false,
        };
        let config = build_config(&args).unwrap();
        assert_eq!(config.repetition_threshold, 0.8);
        assert_eq!(config.min_sample_pages, 4);
        assert!(config.faithful);
    }
}
