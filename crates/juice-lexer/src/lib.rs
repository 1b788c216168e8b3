// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lexer for the Juice language.
//!
//! Tokenizes source code into a stream of tokens for the parser. Comments
//! and the shebang line come back beside the tokens, and string literals
//! arrive pre-split by the string-content sub-lexer.

mod error;
mod lexer;
mod string;

pub use error::{LexError, LexErrorKind};
pub use lexer::{LexResult, Lexer, MAX_ERRORS, MAX_INTERPOLATION_DEPTH};

/// Tokenize a whole document.
pub fn tokenize(source: &str) -> LexResult {
    Lexer::new(source).tokenize()
}
