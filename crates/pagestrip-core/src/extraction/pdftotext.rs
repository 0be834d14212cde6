use crate::error::StripError;
use crate::extraction::{DocumentInfo, PageExtractor, PageImage, RawPage};
use std::io::Write;
use std::process::{Command, Output};

/// PDF metadata values that carry no information.
const JUNK_METADATA: &[&str] = &[
    "untitled",
    "sometitle",
    "someauthor",
    "unknown",
    "none",
    "microsoft word",
];

/// PDF extraction backend using poppler-utils.
///
/// Uses `pdftotext` in reading order (no `-layout`, which would interleave
/// multi-column prose) and `pdftoppm` to render pages for OCR.
pub struct PdftotextExtractor {
    /// Use `pdftotext -layout`; preserves indentation for single-column sources.
    pub layout: bool,
    /// Render resolution for OCR.
    pub render_dpi: u32,
}

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor {
            layout: false,
            render_dpi: 300,
        }
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        command_available("pdftotext")
    }

    /// Check if pdftoppm (needed for OCR rendering) is available.
    pub fn can_render() -> bool {
        command_available("pdftoppm")
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PageExtractor for PdftotextExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<RawPage>, StripError> {
        let tmpfile = write_temp_pdf(pdf_bytes)?;

        let mut cmd = Command::new("pdftotext");
        if self.layout {
            cmd.arg("-layout");
        }
        let output = cmd
            .arg("-enc")
            .arg("UTF-8")
            .arg(tmpfile.path())
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    StripError::PdftotextNotFound
                } else {
                    StripError::Extraction(format!("pdftotext failed: {}", e))
                }
            })?;
        check_status("pdftotext", &output)?;

        let text = String::from_utf8_lossy(&output.stdout);
        Ok(split_pages(&text))
    }

    fn render_page(&self, pdf_bytes: &[u8], page_index: usize) -> Result<PageImage, StripError> {
        let tmpfile = write_temp_pdf(pdf_bytes)?;
        let outdir = tempfile::tempdir().map_err(|e| StripError::Extraction(e.to_string()))?;
        let prefix = outdir.path().join("page");
        let page_number = (page_index + 1).to_string();

        let output = Command::new("pdftoppm")
            .arg("-f")
            .arg(&page_number)
            .arg("-l")
            .arg(&page_number)
            .arg("-r")
            .arg(self.render_dpi.to_string())
            .arg("-png")
            .arg("-singlefile")
            .arg(tmpfile.path())
            .arg(&prefix)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    StripError::OcrUnavailable(
                        "pdftoppm not found; install poppler to render pages for OCR".into(),
                    )
                } else {
                    StripError::Extraction(format!("pdftoppm failed: {}", e))
                }
            })?;
        check_status("pdftoppm", &output)?;

        let png = std::fs::read(prefix.with_extension("png"))?;
        Ok(PageImage { page_index, png })
    }

    fn document_info(&self, pdf_bytes: &[u8]) -> DocumentInfo {
        let Ok(tmpfile) = write_temp_pdf(pdf_bytes) else {
            return DocumentInfo::default();
        };
        match Command::new("pdfinfo").arg(tmpfile.path()).output() {
            Ok(output) if output.status.success() => {
                parse_pdfinfo(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(_) | Err(_) => {
                log::debug!("pdfinfo unavailable; no title/author metadata");
                DocumentInfo::default()
            }
        }
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

fn write_temp_pdf(pdf_bytes: &[u8]) -> Result<tempfile::NamedTempFile, StripError> {
    let mut tmpfile = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| StripError::Extraction(e.to_string()))?;
    tmpfile
        .write_all(pdf_bytes)
        .map_err(|e| StripError::Extraction(e.to_string()))?;
    Ok(tmpfile)
}

fn check_status(tool: &str, output: &Output) -> Result<(), StripError> {
    if output.status.success() {
        return Ok(());
    }
    Err(StripError::ToolFailed {
        tool: tool.to_string(),
        code: output.status.code().unwrap_or(-1),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

pub(crate) fn command_available(name: &str) -> bool {
    Command::new(name)
        .arg("-v")
        .output()
        .map(|o| o.status.success() || !o.stderr.is_empty())
        .unwrap_or(false)
}

/// Split pdftotext output into pages (form feed is the page separator).
fn split_pages(text: &str) -> Vec<RawPage> {
    let mut chunks: Vec<&str> = text.split('\x0c').collect();
    // pdftotext terminates every page with a form feed, leaving an empty tail.
    if chunks.len() > 1 && chunks.last().is_some_and(|c| c.trim().is_empty()) {
        chunks.pop();
    }
    chunks
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| RawPage {
            index,
            text: chunk.to_string(),
        })
        .collect()
}

fn parse_pdfinfo(text: &str) -> DocumentInfo {
    let mut info = DocumentInfo::default();
    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "Title" if value.chars().count() > 3 && !is_junk(value) => {
                info.title = Some(value.to_string());
            }
            "Author" if value.chars().count() > 1 && !is_junk(value) => {
                info.author = Some(value.to_string());
            }
            _ => {}
        }
    }
    info
}

fn is_junk(value: &str) -> bool {
    JUNK_METADATA.contains(&value.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pages_drops_trailing_form_feed() {
        let pages = split_pages("first page\n\x0csecond page\n\x0c");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].text, "first page\n");
        assert_eq!(pages[1].index, 1);
    }

    #[test]
    fn test_split_pages_keeps_blank_scanned_pages() {
        let pages = split_pages("text\n\x0c\x0cmore\n\x0c");
        assert_eq!(pages.len(), 3);
        assert!(pages[1].text.is_empty());
    }

    #[test]
    fn test_parse_pdfinfo() {
        let info = parse_pdfinfo(
            "Title:          Borders of Care\nAuthor:         Jane Doe\nProducer:       pdfTeX\n",
        );
        assert_eq!(info.title.as_deref(), Some("Borders of Care"));
        assert_eq!(info.author.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_parse_pdfinfo_ignores_junk() {
        let info = parse_pdfinfo("Title: untitled\nAuthor: Microsoft Word\n");
        assert_eq!(info, DocumentInfo::default());
    }
}
