//! Batch generation: one personalized PDF per credential row

use crate::credentials::CredentialRow;
use crate::customize::PageCustomizer;
use crate::error::CredPdfError;
use crate::page::page_id_at;
use lopdf::Document;
use serde::Serialize;

/// One generated document, named after its row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedPdf {
    pub output_name: String,
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// Personalize `page_index` of `template` once per row.
///
/// The template is parsed once and deep-copied per row, so the customizer
/// never sees state left behind by a previous row. The first failing row aborts
/// the whole batch.
pub fn generate_pdfs(
    template: &[u8],
    rows: &[CredentialRow],
    page_index: usize,
    customizer: &dyn PageCustomizer,
) -> Result<Vec<GeneratedPdf>, CredPdfError> {
    let template = Document::load_mem(template)
        .map_err(|e| CredPdfError::ParseError(format!("Failed to load template: {}", e)))?;
    // Validates the index even when there are no rows
    page_id_at(&template, page_index)?;

    tracing::info!(
        "Generating {} PDF(s) on page {} with {}",
        rows.len(),
        page_index + 1,
        customizer.name()
    );

    let mut outputs = Vec::with_capacity(rows.len());
    for row in rows {
        let mut doc = template.clone();
        let page_id = page_id_at(&doc, page_index)?;

        customizer.customize(&mut doc, page_id, row).map_err(|e| {
            tracing::warn!("Failed to personalize {}: {}", row.output_name, e);
            e
        })?;

        doc.prune_objects();
        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| CredPdfError::OperationError(format!("Save failed: {}", e)))?;

        tracing::debug!("Generated {} ({} bytes)", row.output_name, buffer.len());
        outputs.push(GeneratedPdf {
            output_name: row.output_name.clone(),
            data: buffer,
        });
    }

    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customize::KeepOriginal;
    use crate::page::page_content;
    use crate::patch::ContentPatcher;
    use crate::test_support::{build_pdf, PageSpec};
    use pretty_assertions::assert_eq;

    fn rows() -> Vec<CredentialRow> {
        vec![
            CredentialRow::new("alice", "alice1", "pw-a"),
            CredentialRow::new("bob", "bob1", "pw-b"),
        ]
    }

    #[test]
    fn test_outputs_follow_row_order() {
        let template = build_pdf(&[PageSpec::placeholder()]);
        let outputs = generate_pdfs(&template, &rows(), 0, &ContentPatcher).unwrap();

        let names: Vec<_> = outputs.iter().map(|o| o.output_name.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);

        for (output, row) in outputs.iter().zip(rows()) {
            let doc = Document::load_mem(&output.data).unwrap();
            let content = page_content(&doc, page_id_at(&doc, 0).unwrap()).unwrap();
            let text = String::from_utf8_lossy(&content);
            assert!(text.contains(&format!("({}) Tj", row.login)));
            assert!(text.contains(&format!("({}) Tj", row.password)));
        }
    }

    #[test]
    fn test_rows_do_not_leak_into_each_other() {
        let template = build_pdf(&[PageSpec::placeholder()]);
        let outputs = generate_pdfs(&template, &rows(), 0, &ContentPatcher).unwrap();

        let doc = Document::load_mem(&outputs[1].data).unwrap();
        let content = page_content(&doc, page_id_at(&doc, 0).unwrap()).unwrap();
        assert!(!String::from_utf8_lossy(&content).contains("alice1"));
    }

    #[test]
    fn test_page_index_out_of_range() {
        let template = build_pdf(&[PageSpec::placeholder(), PageSpec::plain()]);
        let err = generate_pdfs(&template, &rows(), 5, &ContentPatcher).unwrap_err();
        assert!(matches!(
            err,
            CredPdfError::PageIndex {
                index: 5,
                page_count: 2
            }
        ));
    }

    #[test]
    fn test_page_index_checked_without_rows() {
        let template = build_pdf(&[PageSpec::plain()]);
        assert!(generate_pdfs(&template, &[], 1, &KeepOriginal).is_err());
        assert!(generate_pdfs(&template, &[], 0, &KeepOriginal).unwrap().is_empty());
    }

    #[test]
    fn test_failing_row_aborts_batch() {
        let template = build_pdf(&[PageSpec::plain()]);
        let err = generate_pdfs(&template, &rows(), 0, &ContentPatcher).unwrap_err();
        assert!(matches!(err, CredPdfError::PatternNotFound));
    }

    #[test]
    fn test_invalid_template() {
        let err = generate_pdfs(b"not a pdf", &rows(), 0, &KeepOriginal).unwrap_err();
        assert!(matches!(err, CredPdfError::ParseError(_)));
    }

    #[test]
    fn test_keep_original_preserves_pages() {
        let template = build_pdf(&[PageSpec::placeholder(), PageSpec::plain()]);
        let source = Document::load_mem(&template).unwrap();
        let outputs = generate_pdfs(&template, &rows(), 0, &KeepOriginal).unwrap();

        for output in &outputs {
            let doc = Document::load_mem(&output.data).unwrap();
            assert_eq!(doc.get_pages().len(), 2);
            for idx in 0..2 {
                assert_eq!(
                    page_content(&doc, page_id_at(&doc, idx).unwrap()).unwrap(),
                    page_content(&source, page_id_at(&source, idx).unwrap()).unwrap()
                );
            }
        }
    }
}
