use crate::error::StripError;
use crate::extraction::pdftotext::command_available;
use crate::extraction::{OcrEngine, PageImage};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// OCR backend running the `tesseract` CLI, one child process per page.
pub struct TesseractOcr {
    /// Path to the tesseract binary (default: "tesseract", relies on PATH).
    pub binary: String,
    /// Tesseract language code(s), e.g. "eng" or "eng+deu".
    pub language: String,
}

impl TesseractOcr {
    pub fn new() -> Self {
        TesseractOcr {
            binary: "tesseract".to_string(),
            language: "eng".to_string(),
        }
    }

    /// Check if the tesseract binary can be executed.
    pub fn is_available(&self) -> bool {
        command_available(&self.binary)
    }

    /// The install hint shown when OCR is needed but missing.
    pub fn install_hint() -> &'static str {
        if cfg!(target_os = "macos") {
            "brew install tesseract"
        } else if cfg!(target_os = "windows") {
            "choco install tesseract"
        } else {
            "sudo apt install tesseract-ocr"
        }
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &PageImage, timeout: Duration) -> Result<String, StripError> {
        let workdir = tempfile::tempdir()?;
        let input = workdir.path().join("page.png");
        let outbase = workdir.path().join("page");
        std::fs::write(&input, &image.png)?;

        // Output goes to `page.txt` so no pipe needs draining while we poll.
        let mut child = Command::new(&self.binary)
            .arg(&input)
            .arg(&outbase)
            .arg("-l")
            .arg(&self.language)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    StripError::OcrUnavailable(format!(
                        "{} not found. Install it with: {}",
                        self.binary,
                        Self::install_hint()
                    ))
                } else {
                    StripError::OcrUnavailable(format!("failed to run {}: {}", self.binary, e))
                }
            })?;

        let started = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if started.elapsed() >= timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(StripError::OcrTimeout {
                    page: image.page_index + 1,
                    seconds: timeout.as_secs(),
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        };

        if !status.success() {
            return Err(StripError::OcrUnavailable(format!(
                "{} exited with code {}",
                self.binary,
                status.code().unwrap_or(-1)
            )));
        }

        let text = std::fs::read_to_string(outbase.with_extension("txt"))?;
        Ok(text)
    }

    fn backend_name(&self) -> &str {
        "tesseract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_unavailable() {
        let ocr = TesseractOcr {
            binary: "pagestrip-no-such-ocr-binary".to_string(),
            language: "eng".to_string(),
        };
        assert!(!ocr.is_available());
        let image = PageImage {
            page_index: 0,
            png: vec![],
        };
        let err = ocr.recognize(&image, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, StripError::OcrUnavailable(_)));
        assert!(err.is_page_level());
    }
}
