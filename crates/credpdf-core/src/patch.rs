//! In-place credential patching (content-stream rewrite)
//!
//! Templates produced by the upstream generator always draw the login and the
//! password with the same operator sequence:
//!
//! ```text
//! /C2_0 19.2 Tf
//! 0.6375 0 0 0.6375 157.2973 535.605 Tm
//! [(...)]TJ
//! 372.799 0 Td
//! [(...)]TJ
//! ```
//!
//! The patcher matches that sequence byte-for-byte, only the two `TJ` arrays
//! being free, and swaps it for two plain `Tj` operators drawn with a
//! Helvetica font it registers on the page. A template that drifts from this
//! layout fails with [`CredPdfError::PatternNotFound`] instead of producing a
//! half-edited page.

use crate::credentials::CredentialRow;
use crate::customize::PageCustomizer;
use crate::error::CredPdfError;
use crate::page::{compressed_stream, owned_category, owned_resources, page_content, page_dict_mut};
use crate::text::literal_string;
use lazy_static::lazy_static;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use regex::bytes::Regex;

/// Resource name the replacement text is drawn with.
pub const REPLACEMENT_FONT: &str = "FSP";

lazy_static! {
    /// Login/password placeholder block of the fixed template layout
    static ref PLACEHOLDER_PATTERN: Regex = Regex::new(
        r"(?-u)/C2_0 19\.2 Tf\s+0\.6375 0 0 0\.6375 157\.2973 535\.605 Tm\s*\[[^\]]+\]TJ\s*372\.799 0 Td\s*\[[^\]]+\]TJ"
    )
    .unwrap();
}

/// Number of placeholder blocks in a decoded content stream.
pub fn count_placeholders(content: &[u8]) -> usize {
    PLACEHOLDER_PATTERN.find_iter(content).count()
}

/// Operator sequence drawing the new credentials at the placeholder position.
pub fn replacement_block(login: &str, password: &str) -> Result<Vec<u8>, CredPdfError> {
    let mut block = Vec::new();
    block.extend_from_slice(format!("/{} 19.2 Tf\n", REPLACEMENT_FONT).as_bytes());
    block.extend_from_slice(b"0.6375 0 0 0.6375 157.2973 535.605 Tm\n");
    block.extend(literal_string("login", login)?);
    block.extend_from_slice(b" Tj\n372.799 0 Td\n");
    block.extend(literal_string("password", password)?);
    block.extend_from_slice(b" Tj");
    Ok(block)
}

/// Replace the single placeholder block of `content`.
pub fn rewrite_content(
    content: &[u8],
    login: &str,
    password: &str,
) -> Result<Vec<u8>, CredPdfError> {
    let matches: Vec<_> = PLACEHOLDER_PATTERN.find_iter(content).collect();
    let found = match matches.as_slice() {
        [] => return Err(CredPdfError::PatternNotFound),
        [found] => *found,
        many => return Err(CredPdfError::PatternAmbiguous(many.len())),
    };

    let replacement = replacement_block(login, password)?;
    let mut out = Vec::with_capacity(content.len() + replacement.len());
    out.extend_from_slice(&content[..found.start()]);
    out.extend(replacement);
    out.extend_from_slice(&content[found.end()..]);
    Ok(out)
}

/// Make sure the page's font resources contain `font_name`.
///
/// Registers a Type1 Helvetica font with WinAnsiEncoding when the name is
/// free; an existing entry is kept as is. Resources are copied onto the page
/// first, so pages sharing them are not affected.
pub fn ensure_font(
    doc: &mut Document,
    page_id: ObjectId,
    font_name: &str,
) -> Result<(), CredPdfError> {
    let mut resources = owned_resources(doc, page_id)?;
    let mut fonts = owned_category(doc, &resources, b"Font")?;

    if !fonts.has(font_name.as_bytes()) {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font_name, Object::Reference(font_id));
    }

    resources.set("Font", Object::Dictionary(fonts));
    page_dict_mut(doc, page_id)?.set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Rewrite the credentials drawn on one page.
pub fn patch_page(
    doc: &mut Document,
    page_id: ObjectId,
    login: &str,
    password: &str,
) -> Result<(), CredPdfError> {
    let content = page_content(doc, page_id)?;
    let patched = rewrite_content(&content, login, password)?;

    ensure_font(doc, page_id, REPLACEMENT_FONT)?;

    let stream = compressed_stream(Dictionary::new(), &patched)?;
    let stream_id = doc.add_object(stream);
    page_dict_mut(doc, page_id)?.set("Contents", Object::Reference(stream_id));

    tracing::debug!(
        "Patched page {:?}: {} -> {} content bytes",
        page_id,
        content.len(),
        patched.len()
    );
    Ok(())
}

/// Variant A: rewrites the placeholder block in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentPatcher;

impl PageCustomizer for ContentPatcher {
    fn name(&self) -> &'static str {
        "content-patch"
    }

    fn customize(
        &self,
        doc: &mut Document,
        page_id: ObjectId,
        row: &CredentialRow,
    ) -> Result<(), CredPdfError> {
        patch_page(doc, page_id, &row.login, &row.password)
    }
}
