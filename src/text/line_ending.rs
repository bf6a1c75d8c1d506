//! Line terminator detection and normalization.
//!
//! Buffers only ever hold `\n`. The style a file used on disk is remembered as
//! a [`LineEnding`] and re-applied when the content is serialized.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Line terminator style of a persisted document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// Unix `\n`
    #[default]
    Lf,
    /// Windows `\r\n`
    CrLf,
    /// Classic Mac `\r`
    Cr,
}

impl LineEnding {
    /// The terminator as written to disk
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// Detect the dominant terminator in raw text.
    ///
    /// Returns `None` when the text has no terminators at all. Ties prefer
    /// LF, then CRLF, then CR.
    pub fn detect(text: &str) -> Option<Self> {
        let (mut lf, mut crlf, mut cr) = (0usize, 0usize, 0usize);
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    crlf += 1;
                    i += 1;
                }
                b'\r' => cr += 1,
                b'\n' => lf += 1,
                _ => {}
            }
            i += 1;
        }

        if lf == 0 && crlf == 0 && cr == 0 {
            return None;
        }
        if lf >= crlf && lf >= cr {
            Some(Self::Lf)
        } else if crlf >= cr {
            Some(Self::CrLf)
        } else {
            Some(Self::Cr)
        }
    }

    /// Convert every `\r\n` and lone `\r` to `\n`
    pub fn normalize(text: &str) -> Cow<'_, str> {
        if !text.contains('\r') {
            return Cow::Borrowed(text);
        }
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lf => "lf",
            Self::CrLf => "crlf",
            Self::Cr => "cr",
        };
        f.write_str(name)
    }
}

impl FromStr for LineEnding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lf" | "unix" => Ok(Self::Lf),
            "crlf" | "windows" => Ok(Self::CrLf),
            "cr" | "mac" => Ok(Self::Cr),
            other => Err(format!("unknown line ending '{}' (expected lf, crlf or cr)", other)),
        }
    }
}
