//! Per-page customization strategies
//!
//! Both ways of personalizing a template implement [`PageCustomizer`]; the
//! batch generator only ever sees the trait. [`Variant`] is the serializable
//! configuration that picks one.

use crate::credentials::CredentialRow;
use crate::error::CredPdfError;
use crate::overlay::{OverlayOptions, OverlayStamper};
use crate::patch::ContentPatcher;
use lopdf::{Document, ObjectId};
use serde::{Deserialize, Serialize};

/// Applies one credential row to one page of an output document.
pub trait PageCustomizer {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn customize(
        &self,
        doc: &mut Document,
        page_id: ObjectId,
        row: &CredentialRow,
    ) -> Result<(), CredPdfError>;
}

/// Leaves the page untouched; outputs are renamed copies of the template.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepOriginal;

impl PageCustomizer for KeepOriginal {
    fn name(&self) -> &'static str {
        "keep-original"
    }

    fn customize(
        &self,
        _doc: &mut Document,
        _page_id: ObjectId,
        _row: &CredentialRow,
    ) -> Result<(), CredPdfError> {
        Ok(())
    }
}

/// How the credentials end up on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Variant {
    /// Rewrite the placeholder text block of the content stream.
    Patch {
        #[serde(default)]
        keep_credentials: bool,
    },
    /// Stamp a rendered overlay on top of the page.
    Overlay(OverlayOptions),
}

impl Default for Variant {
    fn default() -> Self {
        Variant::Patch {
            keep_credentials: false,
        }
    }
}

impl Variant {
    /// Whether rows may leave `login`/`password` blank.
    pub fn allows_empty_credentials(&self) -> bool {
        matches!(
            self,
            Variant::Patch {
                keep_credentials: true
            }
        )
    }

    pub fn customizer(&self) -> Box<dyn PageCustomizer + '_> {
        match self {
            Variant::Patch {
                keep_credentials: true,
            } => Box::new(KeepOriginal),
            Variant::Patch {
                keep_credentials: false,
            } => Box::new(ContentPatcher),
            Variant::Overlay(options) => Box::new(OverlayStamper::new(options)),
        }
    }
}

/// Options of one generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Zero-based index of the page carrying the credentials.
    #[serde(default)]
    pub page_index: usize,
    #[serde(flatten)]
    pub variant: Variant,
}
