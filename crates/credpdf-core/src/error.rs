use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredPdfError {
    #[error("CSV must contain the columns: {required}. Found: {found:?}")]
    Schema { required: String, found: Vec<String> },

    #[error("Line {line}: {reason}")]
    Validation { line: usize, reason: String },

    #[error("CSV has no valid records")]
    EmptyInput,

    #[error("Invalid page {index}. The PDF has {page_count} page(s)")]
    PageIndex { index: usize, page_count: usize },

    #[error("Could not locate the login/password block in the PDF")]
    PatternNotFound,

    #[error("Found {0} login/password blocks in the PDF, expected exactly one")]
    PatternAmbiguous(usize),

    #[error("Page has no content")]
    ContentMissing,

    #[error("Character {ch:?} in {field} cannot be encoded with WinAnsiEncoding")]
    Encoding { field: &'static str, ch: char },

    #[error("Invalid overlay options: {0}")]
    InvalidOptions(String),

    #[error("Duplicate output name in archive: {0}")]
    DuplicateEntry(String),

    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("PDF operation failed: {0}")]
    OperationError(String),

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CredPdfError {
    /// True when the failure was caused by the uploaded inputs rather than by
    /// the tool itself.
    pub fn is_input_error(&self) -> bool {
        !matches!(
            self,
            CredPdfError::OperationError(_) | CredPdfError::Archive(_) | CredPdfError::Io(_)
        )
    }
}
