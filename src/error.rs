//! Error taxonomy for buffer edits and text encoding.
//!
//! Every variant is local and recoverable: the caller (session or UI layer)
//! decides what to show. Undo/redo exhaustion is not an error.

use thiserror::Error;

use crate::text::{Position, TextEncoding};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// Position lies outside the current document bounds
    #[error("position {position} is out of range (limit {limit})")]
    OutOfRange { position: Position, limit: Position },

    /// Range start comes after range end in document order
    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: Position, end: Position },

    /// Content holds a character the target encoding cannot represent
    #[error("character {character:?} at {position} cannot be encoded as {encoding}")]
    Encoding {
        character: char,
        position: Position,
        encoding: TextEncoding,
    },

    /// Input bytes are not valid in the declared or detected encoding
    #[error("content is not valid {encoding}: {reason}")]
    Decode {
        encoding: TextEncoding,
        reason: String,
    },

    /// Replayed operation does not match the buffer it is applied to
    #[error("operation #{sequence} does not match buffer content at {start}")]
    StaleOperation { sequence: u64, start: Position },
}
