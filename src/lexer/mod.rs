//! Lexical analysis module
//!
//! The engine runs a grammar's state functions on a driver thread and hands
//! the tokens they emit, one at a time, to whoever pulls from the `Lexer`.

pub mod config;
pub mod handoff;
pub mod scanner;
pub mod state;
pub mod stream;
pub mod token;

pub use config::LexerOptions;
pub use handoff::Handoff;
pub use scanner::Scanner;
pub use state::StateFn;
pub use stream::{tokenize, Lexer};
pub use token::{Pos, Token, TokenKind, TokenType};

/// Number of `'\n'` bytes in `text`
pub fn count_newlines(text: &str) -> usize {
    memchr::memchr_iter(b'\n', text.as_bytes()).count()
}
