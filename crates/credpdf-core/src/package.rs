//! Packaging generated PDFs into a single downloadable artifact

use crate::batch::GeneratedPdf;
use crate::error::CredPdfError;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive name used whenever more than one PDF was generated.
pub const ZIP_FILE_NAME: &str = "pdfs_personalizados.zip";

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// A file ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub data: Vec<u8>,
}

/// Turn the generated PDFs into one artifact.
///
/// `None` when nothing was generated. A single PDF is returned as is, several
/// are stored in a deflated zip in generation order. File names come from
/// [`pdf_file_name`].
pub fn package_outputs(outputs: &[GeneratedPdf]) -> Result<Option<Artifact>, CredPdfError> {
    match outputs {
        [] => Ok(None),
        [single] => Ok(Some(Artifact {
            file_name: pdf_file_name(&single.output_name),
            content_type: PDF_CONTENT_TYPE,
            data: single.data.clone(),
        })),
        many => {
            let data = zip_outputs(many)?;
            tracing::debug!("Packaged {} PDFs into {} bytes", many.len(), data.len());
            Ok(Some(Artifact {
                file_name: ZIP_FILE_NAME.to_string(),
                content_type: ZIP_CONTENT_TYPE,
                data,
            }))
        }
    }
}

/// `{output_name}.pdf` with path separators replaced, so a name never turns
/// into a directory inside the archive.
pub fn pdf_file_name(output_name: &str) -> String {
    format!("{}.pdf", output_name.replace(['/', '\\'], "_"))
}

fn zip_outputs(outputs: &[GeneratedPdf]) -> Result<Vec<u8>, CredPdfError> {
    let mut seen = HashSet::new();
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for output in outputs {
        let entry = pdf_file_name(&output.output_name);
        if !seen.insert(entry.clone()) {
            return Err(CredPdfError::DuplicateEntry(entry));
        }
        writer.start_file(entry, options)?;
        writer.write_all(&output.data)?;
    }

    Ok(writer.finish()?.into_inner())
}
