//! The handoff between the driver and the consumer
//!
//! A `Handoff` delivers one token at a time from the scanning side. It
//! blocks until the consumer takes the token and reports whether anyone was
//! still listening.

use super::token::Token;
use std::sync::mpsc::{Receiver, SyncSender};

/// Producer side of a token channel
pub trait Handoff<T>: Send {
    /// Hand `token` to the consumer, blocking until it is taken.
    /// Returns `false` if the consumer has gone away.
    fn deliver(&mut self, token: Token<T>) -> bool;
}

/// Rendezvous handoff over a zero-capacity `sync_channel`
pub struct Rendezvous<T> {
    tx: SyncSender<Token<T>>,
}

impl<T: Send> Handoff<T> for Rendezvous<T> {
    fn deliver(&mut self, token: Token<T>) -> bool {
        self.tx.send(token).is_ok()
    }
}

/// Create a rendezvous channel of tokens
pub fn rendezvous<T>() -> (Rendezvous<T>, Receiver<Token<T>>) {
    let (tx, rx) = std::sync::mpsc::sync_channel(0);
    (Rendezvous { tx }, rx)
}
