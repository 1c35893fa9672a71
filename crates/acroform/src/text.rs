//! PDF text-string decoding and encoding for field names and values.

use crate::error::AcroFormError;
use formfill_types::{RawFieldName, ids::{CLOSE_DELIMITER, OPEN_DELIMITER}};
use lopdf::{Object, StringFormat};

const UTF16BE_BOM: [u8; 2] = [0xFE, 0xFF];
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Decodes the bytes of a PDF text string.
///
/// UTF-16BE and UTF-8 are recognised by their byte-order marks; unmarked bytes
/// are taken as UTF-8 when valid and as Latin-1 otherwise.
pub fn decode_text(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&UTF16BE_BOM) {
        let units: Vec<u16> = rest
            .chunks(2)
            .map(|pair| u16::from_be_bytes([pair[0], *pair.get(1).unwrap_or(&0)]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    let bytes = bytes.strip_prefix(&UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Encodes text as a PDF string object: a literal string when the text is
/// plain ASCII, a BOM-prefixed UTF-16BE hex string otherwise.
pub fn encode_text(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = UTF16BE_BOM.to_vec();
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Renders a `/T` entry as the delimited token written in the file.
///
/// The parser has already consumed the delimiters, so they are put back here;
/// stripping then happens in exactly one place, [`RawFieldName::strip`].
pub fn raw_field_name(obj: &Object) -> Result<RawFieldName, AcroFormError> {
    match obj {
        Object::String(bytes, _) => Ok(RawFieldName::new(format!(
            "{OPEN_DELIMITER}{}{CLOSE_DELIMITER}",
            decode_text(bytes)
        ))),
        other => Err(AcroFormError::Malformed(format!(
            "field name is a {}, expected a string",
            other.enum_variant()
        ))),
    }
}
