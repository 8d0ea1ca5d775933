//! State functions and the driver loop
//!
//! A grammar is a set of state functions. Each one reads from the scanner,
//! emits or ignores what it recognized, and returns the state to run next,
//! or `None` to stop.

use std::fmt;

use super::scanner::Scanner;
use super::token::TokenType;

/// One step of scanning logic
pub struct StateFn<T>(pub fn(&mut Scanner<T>) -> Option<StateFn<T>>);

impl<T> StateFn<T> {
    pub fn call(self, scanner: &mut Scanner<T>) -> Option<StateFn<T>> {
        (self.0)(scanner)
    }
}

impl<T> Clone for StateFn<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StateFn<T> {}

impl<T> fmt::Debug for StateFn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateFn({:p})", self.0 as *const ())
    }
}

/// Run state functions until one returns `None`, the consumer cancels, an
/// Error token goes out, or a state function misuses the scanner. Dropping
/// the scanner at the end closes the token stream.
pub(crate) fn run<T: TokenType>(mut scanner: Scanner<T>, start: StateFn<T>) {
    let mut state = Some(start);
    while let Some(f) = state {
        if scanner.is_halted() {
            break;
        }
        state = f.call(&mut scanner);
        if let Some(fault) = scanner.take_fault() {
            scanner.fail(&fault);
            break;
        }
    }
}
