//! # runescan
//!
//! A reusable lexical scanning engine driven by state functions.
//!
//! A grammar is a set of functions from `&mut Scanner` to the next state
//! function. The engine runs them on a driver thread and hands each token
//! they emit to the consumer, who pulls tokens one at a time.
//!
//! ## Architecture
//!
//! - `lexer`: cursor primitives, state functions, the driver loop and the
//!   pull-based `Lexer`
//! - `async_runtime`: the same stream for tokio consumers (feature
//!   `async-runtime`)
//! - `error`: error types and diagnostics
//!
//! ## Example
//!
//! ```
//! use runescan::{Lexer, Scanner, StateFn, TokenKind, TokenType};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Number;
//!
//! impl TokenType for Number {
//!     fn name(&self) -> &str {
//!         "NUMBER"
//!     }
//! }
//!
//! fn lex_number(s: &mut Scanner<Number>) -> Option<StateFn<Number>> {
//!     s.match_many("0123456789");
//!     if s.pending().is_empty() {
//!         return None;
//!     }
//!     s.emit(Number);
//!     match s.peek() {
//!         None => None,
//!         Some(r) => s.errorf(format_args!("unexpected rune {:?}", r)),
//!     }
//! }
//!
//! let mut lexer = Lexer::new("digits", StateFn(lex_number), "12x").unwrap();
//! let number = lexer.next_token();
//! assert_eq!((number.text.as_str(), number.pos), ("12", 0));
//! let error = lexer.next_token();
//! assert_eq!(error.kind, TokenKind::Error);
//! assert_eq!((error.pos, error.line), (2, 1));
//! assert!(lexer.next_token().is_eof());
//! ```

pub mod error;
pub mod lexer;
#[cfg(feature = "async-runtime")]
pub mod async_runtime;

// Re-export commonly used types
pub use error::{Diagnostic, Location, ScanError, ScanResult};
pub use lexer::{tokenize, Lexer, LexerOptions, Pos, Scanner, StateFn, Token, TokenKind, TokenType};

#[cfg(feature = "async-runtime")]
pub use async_runtime::AsyncLexer;

/// Version of the engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
