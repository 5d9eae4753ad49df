//! Lexer implementation, split one file per scanning concern:
//! - `core` — raw two-pass scan + phrase folding, dispatch, [`LexError`]
//! - `identifier` — word scanning and the possessive marker
//! - `number` — integer/decimal literal scanning
//! - `string` — string/char literal scanning with escapes
//! - `comment` — comment recognition

mod comment;
mod core;
mod identifier;
mod number;
mod string;

pub use core::{tokenize, LexError};
