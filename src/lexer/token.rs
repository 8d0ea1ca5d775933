//! Token definitions for the scanning engine
//!
//! Grammars bring their own token categories by implementing `TokenType`.
//! The engine wraps them in `TokenKind`, which also carries the two
//! categories the engine reserves for itself.

use crate::error::{Location, ScanError};
use std::fmt;

/// A byte offset into the scanned input
pub type Pos = usize;

/// A token category supplied by a grammar
pub trait TokenType: fmt::Debug + Clone + Send + 'static {
    /// Human-readable category name
    fn name(&self) -> &str;

    /// Whether text of this category may span lines, so emitting it must
    /// rescan the text for newlines
    fn counts_newlines(&self) -> bool {
        false
    }
}

/// Category of a delivered token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind<T> {
    /// A grammar category
    Item(T),
    /// Terminal scanning failure; the token text is the message
    Error,
    /// The stream is closed
    Eof,
}

impl<T> TokenKind<T> {
    /// Get the grammar category, if this is one
    pub fn item(&self) -> Option<&T> {
        match self {
            Self::Item(kind) => Some(kind),
            Self::Error | Self::Eof => None,
        }
    }
}

impl<T: TokenType> TokenType for TokenKind<T> {
    fn name(&self) -> &str {
        match self {
            Self::Item(kind) => kind.name(),
            Self::Error => "ERR",
            Self::Eof => "EOF",
        }
    }

    fn counts_newlines(&self) -> bool {
        match self {
            Self::Item(kind) => kind.counts_newlines(),
            Self::Error | Self::Eof => false,
        }
    }
}

/// A scanned token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<T> {
    pub kind: TokenKind<T>,
    /// Literal text, or the message for an Error token
    pub text: String,
    /// Byte offset where the token starts
    pub pos: Pos,
    /// Line the token starts on (1-based)
    pub line: usize,
}

impl<T> Token<T> {
    /// Create a new token
    pub fn new(kind: TokenKind<T>, text: impl Into<String>, pos: Pos, line: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            pos,
            line,
        }
    }

    /// Create an end-of-stream token
    pub fn eof(pos: Pos, line: usize) -> Self {
        Self::new(TokenKind::Eof, String::new(), pos, line)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, TokenKind::Error)
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Byte offset just past this token's text in the input.
    /// Error tokens carry a message, not input, so they end where they start.
    pub fn end(&self) -> Pos {
        match self.kind {
            TokenKind::Item(_) => self.pos + self.text.len(),
            TokenKind::Error | TokenKind::Eof => self.pos,
        }
    }

    /// Line just past this token's text
    pub fn end_line(&self) -> usize {
        match self.kind {
            TokenKind::Item(_) => self.line + crate::lexer::count_newlines(&self.text),
            TokenKind::Error | TokenKind::Eof => self.line,
        }
    }

    /// Lift an Error token into a `ScanError`; any other token is returned
    /// unchanged
    pub fn into_error(self, name: &str) -> Result<Self, ScanError> {
        match self.kind {
            TokenKind::Error => Err(ScanError::scan(
                self.text,
                Location::new(name, self.pos, self.line),
            )),
            _ => Ok(self),
        }
    }
}

impl<T: TokenType> fmt::Display for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Eof => write!(f, "EOF"),
            TokenKind::Error => write!(f, "{}", self.text),
            TokenKind::Item(kind) if self.text.chars().count() > 10 => {
                let head: String = self.text.chars().take(10).collect();
                write!(f, "{}:{:?}...", kind.name(), head)
            }
            TokenKind::Item(kind) => write!(f, "{}:{:?}", kind.name(), self.text),
        }
    }
}
