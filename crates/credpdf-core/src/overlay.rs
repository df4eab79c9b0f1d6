//! Overlay stamping (variant B)
//!
//! Instead of editing the template's operators, the credentials are drawn on a
//! separate one-page PDF of the same size. That page is then imported into the
//! template as a Form XObject and painted on top of the original content. This
//! works with any template layout, at the cost of the old text staying in the
//! content stream underneath. An optional erase box hides it visually.

use crate::credentials::CredentialRow;
use crate::customize::PageCustomizer;
use crate::error::CredPdfError;
use crate::page::{
    compressed_stream, content_refs, import_objects, media_box, owned_category, owned_resources,
    page_content, page_dict_mut, page_id_at, remap_object_refs,
};
use crate::text::encode_latin1;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use serde::{Deserialize, Serialize};

/// Font resource name used inside the rendered overlay.
const OVERLAY_FONT: &str = "F1";

/// Prefix of the XObject name the overlay is registered under.
const XOBJECT_PREFIX: &str = "CredOverlay";

/// Standard 14 fonts available for the overlay text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayFont {
    #[default]
    Helvetica,
    HelveticaBold,
    TimesRoman,
    TimesBold,
    Courier,
    CourierBold,
}

impl OverlayFont {
    pub const ALL: [OverlayFont; 6] = [
        OverlayFont::Helvetica,
        OverlayFont::HelveticaBold,
        OverlayFont::TimesRoman,
        OverlayFont::TimesBold,
        OverlayFont::Courier,
        OverlayFont::CourierBold,
    ];

    /// PostScript name written to `/BaseFont`.
    pub fn base_font(&self) -> &'static str {
        match self {
            OverlayFont::Helvetica => "Helvetica",
            OverlayFont::HelveticaBold => "Helvetica-Bold",
            OverlayFont::TimesRoman => "Times-Roman",
            OverlayFont::TimesBold => "Times-Bold",
            OverlayFont::Courier => "Courier",
            OverlayFont::CourierBold => "Courier-Bold",
        }
    }

    /// Look a font up by its base font name, case-insensitively.
    /// `"helvetica-bold"` and `"Helvetica-Bold"` both resolve.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|font| font.base_font().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Rectangle in PDF user space (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EraseBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Layout of the overlay. Coordinates are relative to the page box origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOptions {
    pub login_pos: Position,
    pub password_pos: Position,
    pub font: OverlayFont,
    pub font_size: f32,
    /// Rectangle painted before the text, hiding whatever is underneath.
    pub erase_box: Option<EraseBox>,
    /// Hex color of the erase box, `#RRGGBB`.
    pub erase_color: String,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        // Where the placeholder block of the standard template ends up on the page
        Self {
            login_pos: Position::new(157.3, 535.6),
            password_pos: Position::new(395.0, 535.6),
            font: OverlayFont::Helvetica,
            font_size: 12.0,
            erase_box: None,
            erase_color: "#FFFFFF".to_string(),
        }
    }
}

impl OverlayOptions {
    pub fn validate(&self) -> Result<(), CredPdfError> {
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(CredPdfError::InvalidOptions(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        let coords = [
            self.login_pos.x,
            self.login_pos.y,
            self.password_pos.x,
            self.password_pos.y,
        ];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(CredPdfError::InvalidOptions(
                "text positions must be finite numbers".into(),
            ));
        }
        if let Some(erase) = &self.erase_box {
            let sized = erase.width.is_finite() && erase.height.is_finite();
            if !(sized && erase.width > 0.0 && erase.height > 0.0) {
                return Err(CredPdfError::InvalidOptions(format!(
                    "erase box must have a finite positive size, got {}x{}",
                    erase.width, erase.height
                )));
            }
            if !(erase.x.is_finite() && erase.y.is_finite()) {
                return Err(CredPdfError::InvalidOptions(
                    "erase box origin must be finite".into(),
                ));
            }
        }
        if parse_hex_color(&self.erase_color).is_none() {
            return Err(CredPdfError::InvalidOptions(format!(
                "invalid erase color {:?}, expected #RRGGBB",
                self.erase_color
            )));
        }
        Ok(())
    }
}

/// Parse `#RRGGBB` into RGB components in `[0, 1]`.
fn parse_hex_color(color: &str) -> Option<(f32, f32, f32)> {
    let hex = color.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()? as f32 / 255.0;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()? as f32 / 255.0;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()? as f32 / 255.0;
    Some((r, g, b))
}

fn reals(values: &[f32]) -> Vec<Object> {
    values.iter().map(|v| Object::Real(*v)).collect()
}

fn overlay_operations(
    row: &CredentialRow,
    options: &OverlayOptions,
) -> Result<Vec<Operation>, CredPdfError> {
    let mut ops = Vec::new();

    if let Some(erase) = &options.erase_box {
        let (r, g, b) = parse_hex_color(&options.erase_color).unwrap_or((1.0, 1.0, 1.0));
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("rg", reals(&[r, g, b])));
        ops.push(Operation::new(
            "re",
            reals(&[erase.x, erase.y, erase.width, erase.height]),
        ));
        ops.push(Operation::new("f", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    let fields = [
        ("login", &row.login, options.login_pos),
        ("password", &row.password, options.password_pos),
    ];
    for (field, text, pos) in fields {
        let encoded = encode_latin1(field, text)?;
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("rg", reals(&[0.0, 0.0, 0.0])));
        ops.push(Operation::new(
            "Tf",
            vec![
                Object::Name(OVERLAY_FONT.as_bytes().to_vec()),
                Object::Real(options.font_size),
            ],
        ));
        ops.push(Operation::new("Td", reals(&[pos.x, pos.y])));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(encoded, StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));
    }

    Ok(ops)
}

/// Render a one-page PDF of `width` x `height` points carrying the
/// credentials of `row`.
pub fn render_overlay(
    width: f32,
    height: f32,
    row: &CredentialRow,
    options: &OverlayOptions,
) -> Result<Vec<u8>, CredPdfError> {
    options.validate()?;
    if !(width > 0.0 && height > 0.0) {
        return Err(CredPdfError::InvalidOptions(format!(
            "page size must be positive, got {}x{}",
            width, height
        )));
    }

    let content = Content {
        operations: overlay_operations(row, options)?,
    }
    .encode()
    .map_err(|e| CredPdfError::OperationError(format!("Failed to encode overlay: {}", e)))?;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => options.font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    });
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => reals(&[0.0, 0.0, width, height]),
        "Resources" => dictionary! {
            "Font" => dictionary! { OVERLAY_FONT => font_id },
        },
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| CredPdfError::OperationError(format!("Failed to save overlay: {}", e)))?;
    Ok(buffer)
}

fn free_xobject_name(xobjects: &Dictionary) -> String {
    let mut name = XOBJECT_PREFIX.to_string();
    let mut n = 1;
    while xobjects.has(name.as_bytes()) {
        name = format!("{}{}", XOBJECT_PREFIX, n);
        n += 1;
    }
    name
}

/// Paint the first page of `overlay_bytes` on top of `page_id`.
///
/// The overlay becomes a Form XObject owned by the page. Existing content is
/// wrapped in `q`/`Q` so graphics state it leaves behind cannot shift the
/// overlay.
pub fn merge_overlay(
    doc: &mut Document,
    page_id: ObjectId,
    overlay_bytes: &[u8],
) -> Result<(), CredPdfError> {
    let overlay = Document::load_mem(overlay_bytes)
        .map_err(|e| CredPdfError::ParseError(format!("Failed to load overlay: {}", e)))?;
    let overlay_page = page_id_at(&overlay, 0)?;
    let overlay_content = page_content(&overlay, overlay_page)?;
    let bbox = media_box(&overlay, overlay_page);
    let overlay_resources = owned_resources(&overlay, overlay_page)?;

    let offset = import_objects(doc, overlay);
    let form = compressed_stream(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => reals(&bbox),
            "Resources" => remap_object_refs(Object::Dictionary(overlay_resources), offset),
        },
        &overlay_content,
    )?;
    let form_id = doc.add_object(form);

    let mut resources = owned_resources(doc, page_id)?;
    let mut xobjects = owned_category(doc, &resources, b"XObject")?;
    let name = free_xobject_name(&xobjects);
    xobjects.set(name.as_str(), Object::Reference(form_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    let [x0, y0, _, _] = media_box(doc, page_id);
    let mut contents = content_refs(doc, page_id)?;
    let open = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let draw = format!("\nQ\nq\n1 0 0 1 {} {} cm\n/{} Do\nQ\n", x0, y0, name);
    let close = doc.add_object(Stream::new(Dictionary::new(), draw.into_bytes()));
    contents.insert(0, Object::Reference(open));
    contents.push(Object::Reference(close));

    let page = page_dict_mut(doc, page_id)?;
    page.set("Resources", Object::Dictionary(resources));
    page.set("Contents", Object::Array(contents));

    tracing::debug!("Merged overlay into page {:?} as /{}", page_id, name);
    Ok(())
}

/// Variant B: stamps a rendered overlay onto the page.
#[derive(Debug, Clone, Copy)]
pub struct OverlayStamper<'a> {
    options: &'a OverlayOptions,
}

impl<'a> OverlayStamper<'a> {
    pub fn new(options: &'a OverlayOptions) -> Self {
        Self { options }
    }
}

impl PageCustomizer for OverlayStamper<'_> {
    fn name(&self) -> &'static str {
        "overlay"
    }

    fn customize(
        &self,
        doc: &mut Document,
        page_id: ObjectId,
        row: &CredentialRow,
    ) -> Result<(), CredPdfError> {
        let [x0, y0, x1, y1] = media_box(doc, page_id);
        let overlay = render_overlay(x1 - x0, y1 - y0, row, self.options)?;
        merge_overlay(doc, page_id, &overlay)
    }
}
