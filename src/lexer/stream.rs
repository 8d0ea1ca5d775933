//! The consumer side of a scan
//!
//! `Lexer` starts the driver on its own thread and lets the caller pull
//! tokens one at a time. The two sides meet on a rendezvous channel, so the
//! driver is never more than one token ahead of the consumer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::config::LexerOptions;
use super::handoff::rendezvous;
use super::scanner::Scanner;
use super::state::{self, StateFn};
use super::token::{Pos, Token, TokenType};
use crate::error::{ScanError, ScanResult};

/// A running scan, pulled by the consumer
pub struct Lexer<T> {
    name: String,
    tokens: Option<Receiver<Token<T>>>,
    cancel: Arc<AtomicBool>,
    driver: Option<JoinHandle<()>>,
    /// Offset of the most recently returned token
    last_pos: Pos,
    /// Offset and line just past the most recently returned token
    end: (Pos, usize),
}

impl<T: TokenType> Lexer<T> {
    /// Start scanning `input` with the state function `start`
    pub fn new(
        name: impl Into<String>,
        start: StateFn<T>,
        input: impl Into<Arc<str>>,
    ) -> ScanResult<Self> {
        Self::with_options(LexerOptions::named(name), start, input)
    }

    /// Start scanning with explicit options
    pub fn with_options(
        options: LexerOptions,
        start: StateFn<T>,
        input: impl Into<Arc<str>>,
    ) -> ScanResult<Self> {
        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = rendezvous::<T>();
        let scanner = Scanner::new(options.name.clone(), input.into(), Box::new(tx), cancel.clone());

        let mut builder = thread::Builder::new().name(options.thread_name());
        if let Some(size) = options.stack_size {
            builder = builder.stack_size(size);
        }
        let driver = builder
            .spawn(move || state::run(scanner, start))
            .map_err(|e| ScanError::Spawn {
                name: options.name.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            name: options.name,
            tokens: Some(rx),
            cancel,
            driver: Some(driver),
            last_pos: 0,
            end: (0, 1),
        })
    }

    /// Block until the driver delivers a token.
    ///
    /// Once the driver has finished, every call returns an `Eof` token
    /// positioned just past the last token delivered. Must not be called
    /// from inside a state function.
    pub fn next_token(&mut self) -> Token<T> {
        let received = self.tokens.as_ref().and_then(|rx| rx.recv().ok());
        match received {
            Some(token) => {
                self.last_pos = token.pos;
                self.end = (token.end(), token.end_line());
                token
            }
            None => {
                self.tokens = None;
                Token::eof(self.end.0, self.end.1)
            }
        }
    }

    /// Discard every remaining token and wait for the driver to finish.
    ///
    /// Returns an error if a state function panicked.
    pub fn drain(&mut self) -> ScanResult<()> {
        if let Some(rx) = self.tokens.take() {
            for _ in rx.iter() {}
        }
        self.join()
    }

    /// Stop the scan without reading the rest of the tokens.
    ///
    /// The driver notices at its next read or handoff. A state function that
    /// loops without doing either never finishes, and neither does this.
    pub fn cancel(mut self) -> ScanResult<()> {
        self.cancel.store(true, Ordering::Release);
        self.tokens = None;
        self.join()
    }

    fn join(&mut self) -> ScanResult<()> {
        match self.driver.take() {
            Some(handle) => handle.join().map_err(|_| ScanError::DriverPanicked {
                name: self.name.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl<T> Lexer<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Offset of the most recently returned token
    pub fn last_pos(&self) -> Pos {
        self.last_pos
    }

    /// Whether the driver has closed the stream
    pub fn is_closed(&self) -> bool {
        self.tokens.is_none()
    }
}

impl<T: TokenType> Iterator for Lexer<T> {
    type Item = Token<T>;

    /// Yields tokens up to and including an Error token
    fn next(&mut self) -> Option<Token<T>> {
        let token = self.next_token();
        if token.is_eof() {
            None
        } else {
            Some(token)
        }
    }
}

impl<T: TokenType> std::iter::FusedIterator for Lexer<T> {}

impl<T> Drop for Lexer<T> {
    /// Closing the receiver wakes a driver blocked on handoff; it then stops
    /// on its own without being joined.
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Release);
        self.tokens = None;
    }
}

/// Scan all of `input`, lifting a terminal Error token into `Err`
pub fn tokenize<T: TokenType>(
    name: &str,
    start: StateFn<T>,
    input: impl Into<Arc<str>>,
) -> ScanResult<Vec<Token<T>>> {
    let mut lexer = Lexer::new(name, start, input)?;
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next() {
        tokens.push(token.into_error(name)?);
    }
    lexer.drain()?;
    Ok(tokens)
}
