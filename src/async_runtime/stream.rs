//! Async token stream
//!
//! `AsyncLexer` mirrors `Lexer` for async consumers. Tokio has no
//! zero-capacity channel, so the handoff holds at most one token: the driver
//! can run one token further ahead than with the threaded `Lexer`, and no
//! more.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinHandle;

use crate::error::{ScanError, ScanResult};
use crate::lexer::state::{self, StateFn};
use crate::lexer::{Handoff, LexerOptions, Pos, Scanner, Token, TokenType};

/// Handoff over a capacity-one tokio channel
struct Bounded<T> {
    tx: Sender<Token<T>>,
}

impl<T: Send> Handoff<T> for Bounded<T> {
    fn deliver(&mut self, token: Token<T>) -> bool {
        // runs on the blocking pool, never inside the async context
        self.tx.blocking_send(token).is_ok()
    }
}

/// A running scan, pulled by an async consumer
pub struct AsyncLexer<T> {
    name: String,
    tokens: Option<Receiver<Token<T>>>,
    cancel: Arc<AtomicBool>,
    driver: Option<JoinHandle<()>>,
    last_pos: Pos,
    end: (Pos, usize),
}

impl<T: TokenType> AsyncLexer<T> {
    /// Start scanning `input` on the current tokio runtime
    pub fn new(
        name: impl Into<String>,
        start: StateFn<T>,
        input: impl Into<Arc<str>>,
    ) -> ScanResult<Self> {
        Self::with_options(LexerOptions::named(name), start, input)
    }

    /// Start scanning with explicit options. Only `name` applies; the
    /// driver runs on tokio's blocking pool.
    pub fn with_options(
        options: LexerOptions,
        start: StateFn<T>,
        input: impl Into<Arc<str>>,
    ) -> ScanResult<Self> {
        let handle = tokio::runtime::Handle::try_current().map_err(|e| ScanError::Spawn {
            name: options.name.clone(),
            message: e.to_string(),
        })?;

        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel::<Token<T>>(1);
        let scanner = Scanner::new(
            options.name.clone(),
            input.into(),
            Box::new(Bounded { tx }),
            cancel.clone(),
        );
        let driver = handle.spawn_blocking(move || state::run(scanner, start));

        Ok(Self {
            name: options.name,
            tokens: Some(rx),
            cancel,
            driver: Some(driver),
            last_pos: 0,
            end: (0, 1),
        })
    }

    /// Wait for the next token; `Eof` forever once the driver is done
    pub async fn next_token(&mut self) -> Token<T> {
        let received = match self.tokens.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        };
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

    /// Discard every remaining token and wait for the driver to finish
    pub async fn drain(&mut self) -> ScanResult<()> {
        if let Some(mut rx) = self.tokens.take() {
            while rx.recv().await.is_some() {}
        }
        self.join().await
    }

    /// Stop the scan without reading the rest of the tokens
    pub async fn cancel(mut self) -> ScanResult<()> {
        self.cancel.store(true, Ordering::Release);
        self.tokens = None;
        self.join().await
    }

    async fn join(&mut self) -> ScanResult<()> {
        match self.driver.take() {
            Some(handle) => handle.await.map_err(|_| ScanError::DriverPanicked {
                name: self.name.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Scan all of `input`, lifting a terminal Error token into `Err`
    pub async fn tokenize(mut self) -> ScanResult<Vec<Token<T>>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token().await;
            if token.is_eof() {
                break;
            }
            tokens.push(token.into_error(&self.name)?);
        }
        self.drain().await?;
        Ok(tokens)
    }
}

impl<T> AsyncLexer<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Offset of the most recently returned token
    pub fn last_pos(&self) -> Pos {
        self.last_pos
    }
}

impl<T> Drop for AsyncLexer<T> {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Release);
        self.tokens = None;
    }
}
