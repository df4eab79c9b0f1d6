//! One personalization request from uploaded bytes to a downloadable artifact

use crate::batch::generate_pdfs;
use crate::credentials::load_rows;
use crate::customize::{Settings, Variant};
use crate::error::CredPdfError;
use crate::package::{package_outputs, Artifact};

/// Everything a request needs. Nothing outlives the call.
#[derive(Debug, Clone)]
pub struct PersonalizeRequest<'a> {
    pub csv: &'a [u8],
    pub template: &'a [u8],
    pub settings: Settings,
}

#[derive(Debug, Clone)]
pub struct PersonalizeOutcome {
    /// Number of PDFs produced.
    pub generated: usize,
    /// `None` when no PDF was produced.
    pub artifact: Option<Artifact>,
}

/// Validate the CSV, personalize the template once per row and package the
/// results.
///
/// Rows are always re-validated with the strictness of the selected variant,
/// so a CSV previewed leniently still fails here when credentials are blank
/// and patching is on.
pub fn run(request: &PersonalizeRequest<'_>) -> Result<PersonalizeOutcome, CredPdfError> {
    let settings = &request.settings;
    if let Variant::Overlay(options) = &settings.variant {
        options.validate()?;
    }

    let rows = load_rows(request.csv, settings.variant.allows_empty_credentials())?;
    let customizer = settings.variant.customizer();
    let outputs = generate_pdfs(request.template, &rows, settings.page_index, &*customizer)?;
    let artifact = package_outputs(&outputs)?;

    match &artifact {
        Some(artifact) => tracing::info!(
            "Generated {} PDF(s) packaged as {}",
            outputs.len(),
            artifact.file_name
        ),
        None => tracing::warn!("No PDF was generated"),
    }

    Ok(PersonalizeOutcome {
        generated: outputs.len(),
        artifact,
    })
}
