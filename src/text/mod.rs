//! Document text: the rope buffer, positions and the byte codec.
//!
//! - [`TextBuffer`]: `\n`-normalized content addressed by [`Position`]
//! - [`LineEnding`]: terminator style remembered for saving
//! - [`TextEncoding`], [`decode`], [`encode`]: file bytes <-> text

mod buffer;
mod encoding;
mod line_ending;
mod position;

pub use buffer::TextBuffer;
pub use encoding::{decode, encode, TextEncoding};
pub use line_ending::LineEnding;
pub use position::Position;
