//! Document text extraction.
//!
//! PDFs are parsed with `lopdf` page by page on a blocking worker; plain text
//! formats are decoded as UTF-8.

use async_trait::async_trait;
use nova_core::document::{DocumentExtractor, ExtractionError};

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Pdf,
    PlainText,
}

/// Extracts text from PDF and plain text documents.
#[derive(Debug, Clone, Default)]
pub struct FileDocumentExtractor;

impl FileDocumentExtractor {
    pub fn new() -> Self {
        Self
    }

    fn classify(file_name: &str, bytes: &[u8]) -> Option<DocumentKind> {
        if bytes.starts_with(PDF_MAGIC) {
            return Some(DocumentKind::Pdf);
        }

        let mime = mime_guess::from_path(file_name).first()?;
        match (mime.type_().as_str(), mime.subtype().as_str()) {
            ("application", "pdf") => Some(DocumentKind::Pdf),
            ("text", _) | ("application", "json") => Some(DocumentKind::PlainText),
            _ => None,
        }
    }
}

#[async_trait]
impl DocumentExtractor for FileDocumentExtractor {
    async fn extract_text(&self, file_name: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
        let kind = Self::classify(file_name, bytes).ok_or_else(|| ExtractionError::Unsupported {
            file_name: file_name.to_string(),
        })?;

        tracing::debug!(file_name, ?kind, size = bytes.len(), "Extracting document text");

        match kind {
            DocumentKind::PlainText => Ok(String::from_utf8_lossy(bytes).trim().to_string()),
            DocumentKind::Pdf => {
                let bytes = bytes.to_vec();
                tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
                    .await
                    .map_err(|e| ExtractionError::Corrupt(format!("extraction task failed: {}", e)))?
            }
        }
    }
}

/// Joins the text of every page in page order, one line break between pages.
fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let document =
        lopdf::Document::load_mem(bytes).map_err(|e| ExtractionError::Corrupt(e.to_string()))?;

    let mut full_text = String::new();
    for page_number in document.get_pages().keys() {
        let page_text = document
            .extract_text(&[*page_number])
            .map_err(|e| ExtractionError::Corrupt(format!("page {}: {}", page_number, e)))?;
        full_text.push_str(page_text.trim_end());
        full_text.push('\n');
    }

    Ok(full_text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[tokio::test]
    async fn test_extracts_pdf_pages_in_order() {
        let pdf = build_pdf(&["Revenue grew 10%", "Costs were flat"]);
        let text = FileDocumentExtractor::new()
            .extract_text("report.pdf", &pdf)
            .await
            .unwrap();

        let revenue = text.find("Revenue grew 10%").unwrap();
        let costs = text.find("Costs were flat").unwrap();
        assert!(revenue < costs);
        assert_eq!(text, text.trim());
    }

    #[tokio::test]
    async fn test_pdf_detected_by_magic_regardless_of_name() {
        let pdf = build_pdf(&["Quarterly numbers"]);
        let text = FileDocumentExtractor::new()
            .extract_text("download", &pdf)
            .await
            .unwrap();

        assert!(text.contains("Quarterly numbers"));
    }

    #[tokio::test]
    async fn test_plain_text_is_decoded_and_trimmed() {
        let text = FileDocumentExtractor::new()
            .extract_text("notes.txt", b"\n  line one\nline two  \n")
            .await
            .unwrap();

        assert_eq!(text, "line one\nline two");
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_reported() {
        let err = FileDocumentExtractor::new()
            .extract_text("broken.pdf", b"%PDF-1.5\nthis is not a pdf body")
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::Corrupt(_)));
    }

    #[tokio::test]
    async fn test_unknown_binary_is_unsupported() {
        let err = FileDocumentExtractor::new()
            .extract_text("photo.png", &[0x89, b'P', b'N', b'G'])
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::Unsupported { .. }));
    }
}
