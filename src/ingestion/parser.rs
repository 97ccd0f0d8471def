//! Multi-format file parser

use crate::error::{Error, Result};
use crate::types::{FileType, Page};

/// Parses uploaded file bytes into page-level text.
pub struct FileParser;

impl FileParser {
    /// Parse file bytes according to the detected file type.
    ///
    /// Returns one [`Page`] per logical page; plain text yields a single
    /// page without a page number.
    pub fn parse(file_type: FileType, filename: &str, data: &[u8]) -> Result<Vec<Page>> {
        match file_type {
            FileType::Pdf => Self::parse_pdf(filename, data),
            FileType::Docx => Self::parse_docx(filename, data),
            FileType::Txt => Self::parse_text(data),
        }
    }

    fn parse_pdf(filename: &str, data: &[u8]) -> Result<Vec<Page>> {
        let content = pdf_extract::extract_text_from_mem(data)
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;

        // pdf-extract leaves null bytes and ragged spacing behind
        let content = content
            .replace('\0', "")
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        if content.is_empty() {
            return Err(Error::file_parse(
                filename,
                "No text content could be extracted from PDF",
            ));
        }

        Ok(vec![Page::new(content, Some(1), FileType::Pdf.source_tag())])
    }

    fn parse_docx(filename: &str, data: &[u8]) -> Result<Vec<Page>> {
        let doc = docx_rs::read_docx(data)
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;

        let mut paragraphs: Vec<String> = Vec::new();
        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                let mut paragraph = String::new();
                for child in p.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                paragraph.push_str(&t.text);
                            }
                        }
                    }
                }
                if !paragraph.trim().is_empty() {
                    paragraphs.push(paragraph);
                }
            }
        }

        let content = paragraphs.join("\n\n");
        if content.is_empty() {
            return Err(Error::file_parse(
                filename,
                "No text content could be extracted from DOCX",
            ));
        }

        Ok(vec![Page::new(content, Some(1), FileType::Docx.source_tag())])
    }

    fn parse_text(data: &[u8]) -> Result<Vec<Page>> {
        let content = String::from_utf8_lossy(data).to_string();
        Ok(vec![Page::new(content, None, FileType::Txt.source_tag())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_parses_as_single_page() {
        let pages = FileParser::parse(FileType::Txt, "notes.txt", b"hello world").unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].content, "hello world");
        assert_eq!(pages[0].page_number, None);
    }

    #[test]
    fn text_tolerates_invalid_utf8() {
        let pages = FileParser::parse(FileType::Txt, "notes.txt", &[0x68, 0x69, 0xFF]).unwrap();
        assert!(pages[0].content.starts_with("hi"));
    }

    #[test]
    fn invalid_pdf_is_a_parse_error() {
        let err = FileParser::parse(FileType::Pdf, "broken.pdf", b"not a pdf").unwrap_err();
        assert!(matches!(err, Error::FileParse { .. }));
    }

    #[test]
    fn invalid_docx_is_a_parse_error() {
        let err = FileParser::parse(FileType::Docx, "broken.docx", b"not a docx").unwrap_err();
        assert!(matches!(err, Error::FileParse { .. }));
    }
}
