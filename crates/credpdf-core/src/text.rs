//! PDF literal string helpers

use crate::error::CredPdfError;

/// Escape the three literal-string metacharacters: `\`, `(` and `)`.
pub fn escape_pdf(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '(' | ')') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Inverse of [`escape_pdf`].
///
/// A backslash followed by any character yields that character; a trailing
/// lone backslash is kept as is.
pub fn unescape_pdf(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Encode text as single-byte Latin-1, the subset of WinAnsiEncoding the
/// standard fonts are registered with.
pub fn encode_latin1(field: &'static str, text: &str) -> Result<Vec<u8>, CredPdfError> {
    text.chars()
        .map(|ch| u8::try_from(u32::from(ch)).map_err(|_| CredPdfError::Encoding { field, ch }))
        .collect()
}

/// Build the bytes of a literal string operand, `(escaped)`.
pub fn literal_string(field: &'static str, text: &str) -> Result<Vec<u8>, CredPdfError> {
    let mut out = vec![b'('];
    out.extend(encode_latin1(field, &escape_pdf(text))?);
    out.push(b')');
    Ok(out)
}
