//! Async runtime module
//!
//! An async flavour of the token stream for consumers running on tokio.
//! The driver still runs state functions synchronously, on tokio's blocking
//! pool, and hands tokens over a capacity-one channel.

pub mod stream;

pub use stream::AsyncLexer;
