//! Multipart upload form and its conversion into generation settings

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::Multipart;
use credpdf_core::{EraseBox, OverlayFont, OverlayOptions, Position, Settings, Variant};
use tracing::debug;

use crate::error::ServerError;

/// Fields carrying file uploads; everything else is read as text.
const FILE_FIELDS: [&str; 2] = ["template", "credentials"];

/// Everything submitted by the upload form.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub template: Option<Vec<u8>>,
    pub credentials: Option<Vec<u8>>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ServerError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if FILE_FIELDS.contains(&name.as_str()) {
                let data = field.bytes().await?;
                debug!("Received {} ({} bytes)", name, data.len());
                // Browsers send an empty part when no file was picked
                if data.is_empty() {
                    continue;
                }
                match name.as_str() {
                    "template" => form.template = Some(data.to_vec()),
                    _ => form.credentials = Some(data.to_vec()),
                }
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Trimmed text value; `None` when absent or blank.
    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Checkbox-style flag. HTML forms send `on` for a checked box.
    pub fn flag(&self, name: &str) -> bool {
        matches!(
            self.field(name).map(str::to_ascii_lowercase).as_deref(),
            Some("on" | "true" | "1" | "yes")
        )
    }

    fn number<T: FromStr>(&self, name: &str) -> Result<Option<T>, ServerError> {
        self.field(name)
            .map(|raw| {
                raw.parse().map_err(|_| {
                    ServerError::InvalidRequest(format!(
                        "Field {} is not a valid number: {}",
                        name, raw
                    ))
                })
            })
            .transpose()
    }

    fn required_number(&self, name: &str) -> Result<f32, ServerError> {
        self.number(name)?.ok_or_else(|| {
            ServerError::InvalidRequest(format!("Field {} is required when erase is enabled", name))
        })
    }

    pub fn settings(&self) -> Result<Settings, ServerError> {
        let page_index = self.number::<usize>("page_index")?.unwrap_or(0);
        let variant = match self.field("mode").unwrap_or("patch") {
            "patch" => Variant::Patch {
                keep_credentials: self.flag("keep_credentials"),
            },
            "overlay" => Variant::Overlay(self.overlay_options()?),
            other => {
                return Err(ServerError::InvalidRequest(format!(
                    "Invalid mode '{}'. Must be 'patch' or 'overlay'",
                    other
                )))
            }
        };
        Ok(Settings {
            page_index,
            variant,
        })
    }

    fn overlay_options(&self) -> Result<OverlayOptions, ServerError> {
        let defaults = OverlayOptions::default();

        let font = match self.field("font") {
            Some(name) => OverlayFont::from_name(name).ok_or_else(|| {
                ServerError::InvalidRequest(format!("Unsupported font '{}'", name))
            })?,
            None => defaults.font,
        };

        let erase_box = if self.flag("erase") {
            Some(EraseBox {
                x: self.required_number("erase_x")?,
                y: self.required_number("erase_y")?,
                width: self.required_number("erase_width")?,
                height: self.required_number("erase_height")?,
            })
        } else {
            None
        };

        Ok(OverlayOptions {
            login_pos: Position::new(
                self.number("login_x")?.unwrap_or(defaults.login_pos.x),
                self.number("login_y")?.unwrap_or(defaults.login_pos.y),
            ),
            password_pos: Position::new(
                self.number("password_x")?.unwrap_or(defaults.password_pos.x),
                self.number("password_y")?.unwrap_or(defaults.password_pos.y),
            ),
            font,
            font_size: self.number("font_size")?.unwrap_or(defaults.font_size),
            erase_box,
            erase_color: self
                .field("erase_color")
                .map(str::to_string)
                .unwrap_or(defaults.erase_color),
        })
    }
}
