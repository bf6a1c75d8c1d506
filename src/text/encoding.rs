//! Byte <-> text codec for document content.
//!
//! Decoding honours a declared encoding strictly. Without one, a byte order
//! mark decides, then strict UTF-8, then Latin-1 (which accepts any byte
//! sequence). Whether the input carried a BOM is part of the encoding, so a
//! save writes one back only if it was there. Encoding fails on the first
//! character the target cannot hold.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{LineEnding, Position};
use crate::error::EditError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Text encoding of a persisted document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextEncoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "utf-8-bom", alias = "utf8-bom")]
    Utf8Bom,
    #[serde(rename = "utf-16le")]
    Utf16Le,
    #[serde(rename = "utf-16le-nobom")]
    Utf16LeNoBom,
    #[serde(rename = "utf-16be")]
    Utf16Be,
    #[serde(rename = "utf-16be-nobom")]
    Utf16BeNoBom,
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
    #[serde(rename = "ascii")]
    Ascii,
}

impl TextEncoding {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf8Bom => "utf-8-bom",
            Self::Utf16Le => "utf-16le",
            Self::Utf16LeNoBom => "utf-16le-nobom",
            Self::Utf16Be => "utf-16be",
            Self::Utf16BeNoBom => "utf-16be-nobom",
            Self::Latin1 => "latin-1",
            Self::Ascii => "ascii",
        }
    }

    /// Byte order mark written at the start of the file (empty if none)
    pub const fn bom(self) -> &'static [u8] {
        match self {
            Self::Utf8Bom => UTF8_BOM,
            Self::Utf16Le => UTF16LE_BOM,
            Self::Utf16Be => UTF16BE_BOM,
            Self::Utf8
            | Self::Utf16LeNoBom
            | Self::Utf16BeNoBom
            | Self::Latin1
            | Self::Ascii => &[],
        }
    }

    /// The same encoding with or without a byte order mark.
    ///
    /// Encodings that never carry one are returned unchanged.
    pub const fn with_bom(self, bom: bool) -> Self {
        match (self, bom) {
            (Self::Utf8 | Self::Utf8Bom, true) => Self::Utf8Bom,
            (Self::Utf8 | Self::Utf8Bom, false) => Self::Utf8,
            (Self::Utf16Le | Self::Utf16LeNoBom, true) => Self::Utf16Le,
            (Self::Utf16Le | Self::Utf16LeNoBom, false) => Self::Utf16LeNoBom,
            (Self::Utf16Be | Self::Utf16BeNoBom, true) => Self::Utf16Be,
            (Self::Utf16Be | Self::Utf16BeNoBom, false) => Self::Utf16BeNoBom,
            (other, _) => other,
        }
    }

    /// Whether `ch` has a representation in this encoding
    pub fn can_encode(self, ch: char) -> bool {
        match self {
            Self::Utf8
            | Self::Utf8Bom
            | Self::Utf16Le
            | Self::Utf16LeNoBom
            | Self::Utf16Be
            | Self::Utf16BeNoBom => true,
            Self::Latin1 => (ch as u32) <= 0xFF,
            Self::Ascii => ch.is_ascii(),
        }
    }

    /// Identify an encoding from a leading byte order mark
    pub fn sniff_bom(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(UTF8_BOM) {
            Some(Self::Utf8Bom)
        } else if bytes.starts_with(UTF16LE_BOM) {
            Some(Self::Utf16Le)
        } else if bytes.starts_with(UTF16BE_BOM) {
            Some(Self::Utf16Be)
        } else {
            None
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "utf-8-bom" | "utf8-bom" => Ok(Self::Utf8Bom),
            "utf-16le" | "utf16le" | "utf-16" => Ok(Self::Utf16Le),
            "utf-16le-nobom" | "utf16le-nobom" => Ok(Self::Utf16LeNoBom),
            "utf-16be" | "utf16be" => Ok(Self::Utf16Be),
            "utf-16be-nobom" | "utf16be-nobom" => Ok(Self::Utf16BeNoBom),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Self::Latin1),
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            other => Err(format!("unsupported encoding '{}'", other)),
        }
    }
}

/// Decode file bytes into text, returning the encoding actually used.
///
/// A declared encoding is adjusted to whether the bytes start with its BOM
/// (declared UTF-16LE without one comes back as
/// [`TextEncoding::Utf16LeNoBom`]), so saving reproduces the input.
pub fn decode(
    bytes: &[u8],
    declared: Option<TextEncoding>,
) -> Result<(String, TextEncoding), EditError> {
    if let Some(encoding) = declared {
        let bom = encoding.with_bom(true).bom();
        let encoding = encoding.with_bom(!bom.is_empty() && bytes.starts_with(bom));
        return decode_as(bytes, encoding).map(|text| (text, encoding));
    }

    if let Some(encoding) = TextEncoding::sniff_bom(bytes) {
        return decode_as(bytes, encoding).map(|text| (text, encoding));
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => Ok((text.to_owned(), TextEncoding::Utf8)),
        Err(e) => {
            tracing::warn!("Content is not valid UTF-8 ({}), decoding as Latin-1", e);
            Ok((decode_latin1(bytes), TextEncoding::Latin1))
        }
    }
}

fn decode_as(bytes: &[u8], encoding: TextEncoding) -> Result<String, EditError> {
    let payload = bytes.strip_prefix(encoding.bom()).unwrap_or(bytes);
    match encoding {
        TextEncoding::Utf8 | TextEncoding::Utf8Bom => std::str::from_utf8(payload)
            .map(str::to_owned)
            .map_err(|e| EditError::Decode {
                encoding,
                reason: e.to_string(),
            }),
        TextEncoding::Utf16Le | TextEncoding::Utf16LeNoBom => {
            decode_utf16(payload, encoding, u16::from_le_bytes)
        }
        TextEncoding::Utf16Be | TextEncoding::Utf16BeNoBom => {
            decode_utf16(payload, encoding, u16::from_be_bytes)
        }
        TextEncoding::Latin1 => Ok(decode_latin1(payload)),
        TextEncoding::Ascii => match payload.iter().position(|b| !b.is_ascii()) {
            Some(offset) => Err(EditError::Decode {
                encoding,
                reason: format!("byte 0x{:02X} at offset {}", payload[offset], offset),
            }),
            None => Ok(decode_latin1(payload)),
        },
    }
}

fn decode_utf16(
    payload: &[u8],
    encoding: TextEncoding,
    unit: fn([u8; 2]) -> u16,
) -> Result<String, EditError> {
    if payload.len() % 2 != 0 {
        return Err(EditError::Decode {
            encoding,
            reason: format!("odd byte length {}", payload.len()),
        });
    }
    let units = payload.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|e| EditError::Decode {
            encoding,
            reason: format!("unpaired surrogate 0x{:04X}", e.unpaired_surrogate()),
        })
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Serialize `\n`-normalized text with the given terminator and encoding.
pub fn encode(
    text: &str,
    line_ending: LineEnding,
    encoding: TextEncoding,
) -> Result<Vec<u8>, EditError> {
    let mut out = Vec::with_capacity(text.len() + encoding.bom().len());
    out.extend_from_slice(encoding.bom());

    let mut position = Position::zero();
    for ch in text.chars() {
        if ch == '\n' {
            for terminator in line_ending.as_str().chars() {
                push_char(&mut out, terminator, encoding);
            }
            position = Position::new(position.line + 1, 0);
            continue;
        }
        if !encoding.can_encode(ch) {
            return Err(EditError::Encoding {
                character: ch,
                position,
                encoding,
            });
        }
        push_char(&mut out, ch, encoding);
        position.column += 1;
    }
    Ok(out)
}

fn push_char(out: &mut Vec<u8>, ch: char, encoding: TextEncoding) {
    match encoding {
        TextEncoding::Utf8 | TextEncoding::Utf8Bom => {
            let mut buf = [0u8; 4];
            out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        }
        TextEncoding::Utf16Le | TextEncoding::Utf16LeNoBom => {
            let mut buf = [0u16; 2];
            for unit in ch.encode_utf16(&mut buf) {
                out.extend_from_slice(&unit.to_le_bytes());
            }
        }
        TextEncoding::Utf16Be | TextEncoding::Utf16BeNoBom => {
            let mut buf = [0u16; 2];
            for unit in ch.encode_utf16(&mut buf) {
                out.extend_from_slice(&unit.to_be_bytes());
            }
        }
        // Callers check `can_encode` first
        TextEncoding::Latin1 | TextEncoding::Ascii => out.push(ch as u8),
    }
}
