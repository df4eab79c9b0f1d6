//! Credential PDF personalization
//!
//! Takes a template PDF and a CSV of `output_name, login, password` rows and
//! produces one PDF per row with the credentials written onto one page.
//!
//! Two strategies are available:
//! - [`patch::ContentPatcher`]: rewrites the placeholder text block of the page's
//!   content stream (requires the fixed template layout)
//! - [`overlay::OverlayStamper`]: renders the credentials on a separate page and
//!   stamps it on top (works with any template)

pub mod batch;
pub mod credentials;
pub mod customize;
pub mod error;
pub mod overlay;
pub mod package;
pub mod page;
pub mod patch;
pub mod pipeline;
pub mod text;

#[cfg(test)]
mod test_support;

pub use batch::{generate_pdfs, GeneratedPdf};
pub use credentials::{load_rows, CredentialRow, REQUIRED_COLUMNS};
pub use customize::{KeepOriginal, PageCustomizer, Settings, Variant};
pub use error::CredPdfError;
pub use overlay::{
    merge_overlay, render_overlay, EraseBox, OverlayFont, OverlayOptions, OverlayStamper,
    Position,
};
pub use package::{package_outputs, Artifact, ZIP_FILE_NAME};
pub use patch::{patch_page, ContentPatcher};
pub use pipeline::{run, PersonalizeOutcome, PersonalizeRequest};
pub use text::{escape_pdf, unescape_pdf};

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, CredPdfError> {
    let doc =
        lopdf::Document::load_mem(bytes).map_err(|e| CredPdfError::ParseError(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}
