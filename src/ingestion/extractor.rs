//! Media-type-dispatched text extraction

use std::path::Path;

use crate::error::{Error, Result};

/// One extracted text segment with best-effort page attribution
#[derive(Debug, Clone)]
pub struct ExtractedSegment {
    /// 1-indexed page number, `None` for formats with no page concept
    pub page: Option<u32>,
    /// Segment text
    pub text: String,
}

/// Stateless text extractor.
///
/// Dispatches on the declared media type; reading the input file is the only
/// side effect.
pub struct TextExtractor;

impl TextExtractor {
    /// Extract ordered text segments from a file.
    ///
    /// - `application/pdf`: one segment per page
    /// - `text/*`: a single segment with no page attribution
    /// - anything else: `UnsupportedMediaType`, carrying the declared type
    pub fn extract(path: &Path, media_type: &str) -> Result<Vec<ExtractedSegment>> {
        match media_type {
            "application/pdf" => Self::extract_pdf(path),
            t if t.starts_with("text/") => Self::extract_text(path),
            other => Err(Error::UnsupportedMediaType(other.to_string())),
        }
    }

    fn extract_text(path: &Path) -> Result<Vec<ExtractedSegment>> {
        let data = std::fs::read(path)?;
        let text = String::from_utf8_lossy(&data).into_owned();
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![ExtractedSegment { page: None, text }])
    }

    fn extract_pdf(path: &Path) -> Result<Vec<ExtractedSegment>> {
        let data = std::fs::read(path)?;

        let pages = match pdf_extract::extract_text_from_mem_by_pages(&data) {
            Ok(pages) => pages,
            Err(e) => {
                tracing::warn!("pdf-extract failed: {}, trying lopdf fallback", e);
                Self::extract_pdf_fallback(&data)?
            }
        };

        let segments: Vec<ExtractedSegment> = pages
            .into_iter()
            .enumerate()
            .filter_map(|(i, raw)| {
                let text = cleanup_page_text(&raw);
                if text.is_empty() {
                    None
                } else {
                    Some(ExtractedSegment {
                        page: Some(i as u32 + 1),
                        text,
                    })
                }
            })
            .collect();

        Ok(segments)
    }

    /// Per-page fallback when pdf-extract cannot handle the file
    fn extract_pdf_fallback(data: &[u8]) -> Result<Vec<String>> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::extraction("application/pdf", format!("failed to load PDF: {}", e)))?;

        let mut pages = Vec::new();
        for (page_num, _page_id) in doc.get_pages() {
            match doc.extract_text(&[page_num]) {
                Ok(text) => pages.push(text),
                Err(e) => {
                    tracing::debug!("no text on page {}: {}", page_num, e);
                    pages.push(String::new());
                }
            }
        }

        if pages.iter().all(|p| p.trim().is_empty()) {
            tracing::warn!("fallback extraction produced no text, PDF may be image-based");
        }

        Ok(pages)
    }
}

/// Normalize extracted page text: strip NUL characters, trim each line,
/// drop empty lines.
fn cleanup_page_text(raw: &str) -> String {
    raw.replace('\0', "")
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_unsupported_media_type_carries_original_type() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = TextExtractor::extract(file.path(), "image/png").unwrap_err();
        match err {
            Error::UnsupportedMediaType(t) => assert_eq!(t, "image/png"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_plain_text_is_a_single_unpaged_segment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Section 1. Definitions.\n\nSection 2. Term.").unwrap();

        let segments = TextExtractor::extract(file.path(), "text/plain").unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].page, None);
        assert!(segments[0].text.starts_with("Section 1."));
    }

    #[test]
    fn test_markdown_media_type_uses_text_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "# Agreement").unwrap();

        let segments = TextExtractor::extract(file.path(), "text/markdown").unwrap();
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn test_empty_text_file_yields_no_segments() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let segments = TextExtractor::extract(file.path(), "text/plain").unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn test_cleanup_strips_nul_and_blank_lines() {
        let cleaned = cleanup_page_text("  WHEREAS\0, the parties  \n\n\n agree as follows \n");
        assert_eq!(cleaned, "WHEREAS, the parties\nagree as follows");
    }
}
