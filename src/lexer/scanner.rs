//! Scanner implementation: the cursor and token-boundary primitives
//!
//! A `Scanner` is owned by the driver thread and handed as `&mut` to every
//! state function. It tracks two offsets into the input: `start`, where the
//! token being assembled begins, and `pos`, the next byte to read.
//! Everything in `input[start..pos]` is pending until `emit` or `ignore`
//! closes the span.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::handoff::Handoff;
use super::state::StateFn;
use super::token::{Pos, Token, TokenKind, TokenType};
use crate::error::{Location, ScanError, ScanResult};

/// What the most recent read consumed, so `backup` can undo it exactly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastRead {
    /// Nothing to undo: fresh scanner, after a backup, or after a boundary
    Nothing,
    Rune(char),
    /// The end-of-input sentinel; undoing it is a no-op
    End,
}

/// Scanning state threaded through every state function
pub struct Scanner<T> {
    name: String,
    input: Arc<str>,
    start: Pos,
    pos: Pos,
    last: LastRead,
    /// Line at `pos`
    line: usize,
    /// Line at `start`
    start_line: usize,
    handoff: Box<dyn Handoff<T>>,
    cancel: Arc<AtomicBool>,
    fault: Option<ScanError>,
    /// An Error token has been delivered; nothing may follow it
    errored: bool,
}

impl<T: TokenType> Scanner<T> {
    pub(crate) fn new(
        name: impl Into<String>,
        input: Arc<str>,
        handoff: Box<dyn Handoff<T>>,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        Self {
            name: name.into(),
            input,
            start: 0,
            pos: 0,
            last: LastRead::Nothing,
            line: 1,
            start_line: 1,
            handoff,
            cancel,
            fault: None,
            errored: false,
        }
    }

    /// Read the next rune and advance past it.
    ///
    /// Returns `None` at the end of input, or once the scan is halting
    /// (cancelled, faulted or already errored), without moving.
    pub fn next_rune(&mut self) -> Option<char> {
        if self.is_halted() {
            self.last = LastRead::End;
            return None;
        }

        match self.input[self.pos..].chars().next() {
            Some(r) => {
                self.pos += r.len_utf8();
                if r == '\n' {
                    self.line += 1;
                }
                self.last = LastRead::Rune(r);
                Some(r)
            }
            None => {
                self.last = LastRead::End;
                None
            }
        }
    }

    /// Look at the next rune without consuming it
    pub fn peek(&mut self) -> Option<char> {
        let r = self.next_rune();
        self.backup();
        r
    }

    /// Un-read the most recently read rune.
    ///
    /// Only one level of pushback exists. Calling this without a rune to
    /// un-read leaves the position untouched and records a fault; the
    /// driver turns the fault into a terminal Error token once the current
    /// state function returns.
    pub fn backup(&mut self) {
        if let Err(err) = self.try_backup() {
            if self.fault.is_none() {
                self.fault = Some(err);
            }
        }
    }

    /// Like `backup`, but reports misuse to the caller instead
    pub fn try_backup(&mut self) -> ScanResult<()> {
        match std::mem::replace(&mut self.last, LastRead::Nothing) {
            LastRead::Rune(r) => {
                self.pos -= r.len_utf8();
                if r == '\n' {
                    self.line -= 1;
                }
                Ok(())
            }
            LastRead::End => Ok(()),
            LastRead::Nothing => Err(ScanError::InvalidBackup {
                location: Location::new(self.name.clone(), self.pos, self.line),
            }),
        }
    }

    /// Consume the next rune iff it is in `alphabet`
    pub fn match_one(&mut self, alphabet: &str) -> bool {
        if let Some(r) = self.next_rune() {
            if alphabet.contains(r) {
                return true;
            }
        }
        self.backup();
        false
    }

    /// Greedily consume runes contained in `alphabet`
    pub fn match_many(&mut self, alphabet: &str) {
        while let Some(r) = self.next_rune() {
            if !alphabet.contains(r) {
                break;
            }
        }
        self.backup();
    }

    /// Greedily consume runes satisfying `pred`, returning how many were taken
    pub fn accept_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        let mut count = 0;
        while let Some(r) = self.next_rune() {
            if !pred(r) {
                break;
            }
            count += 1;
        }
        self.backup();
        count
    }

    /// Consume `prefix` if the remaining input starts with it. The prefix is
    /// taken whole or not at all; `backup` afterwards un-reads its last rune.
    pub fn match_str(&mut self, prefix: &str) -> bool {
        if self.is_halted() || !self.input[self.pos..].starts_with(prefix) {
            return false;
        }
        if let Some(last) = prefix.chars().next_back() {
            self.pos += prefix.len();
            self.line += super::count_newlines(prefix);
            self.last = LastRead::Rune(last);
        }
        true
    }

    /// Deliver the pending span as a token of `kind`
    pub fn emit(&mut self, kind: T) {
        let rescan = kind.counts_newlines();
        let token = Token::new(
            TokenKind::Item(kind),
            &self.input[self.start..self.pos],
            self.start,
            self.start_line,
        );
        self.deliver(token);
        self.close_span(rescan);
    }

    /// Drop the pending span without producing a token
    pub fn ignore(&mut self) {
        self.close_span(true);
    }

    /// Deliver an Error token carrying the formatted message and stop the
    /// scan. State functions return this call's result directly:
    ///
    /// ```ignore
    /// return s.errorf(format_args!("unexpected rune {:?}", r));
    /// ```
    pub fn errorf(&mut self, args: fmt::Arguments<'_>) -> Option<StateFn<T>> {
        let token = Token::new(TokenKind::Error, fmt::format(args), self.start, self.start_line);
        self.deliver(token);
        None
    }

    /// Shorthand for `errorf` with a plain message
    pub fn error(&mut self, message: impl fmt::Display) -> Option<StateFn<T>> {
        self.errorf(format_args!("{}", message))
    }

    /// Hand `token` over unless the scan is already halting. The first
    /// Error token delivered is the last token of the scan.
    fn deliver(&mut self, token: Token<T>) {
        if self.is_halted() {
            return;
        }
        if token.is_error() {
            self.errored = true;
        }
        if !self.handoff.deliver(token) {
            self.cancel.store(true, Ordering::Release);
        }
    }

    /// Move the token boundary up to `pos`. With `rescan` the boundary line
    /// is recounted from the closed span, otherwise it is taken from the
    /// per-rune count; the two always agree.
    fn close_span(&mut self, rescan: bool) {
        if rescan {
            self.start_line += super::count_newlines(&self.input[self.start..self.pos]);
        } else {
            self.start_line = self.line;
        }
        debug_assert_eq!(self.start_line, self.line);
        self.start = self.pos;
        self.last = LastRead::Nothing;
    }

    pub(crate) fn take_fault(&mut self) -> Option<ScanError> {
        self.fault.take()
    }

    /// Deliver `err` as the terminal Error token, unless the state function
    /// already delivered one. Call after `take_fault`.
    pub(crate) fn fail(&mut self, err: &ScanError) {
        let (pos, line) = err
            .location()
            .map_or((self.start, self.start_line), |l| (l.offset, l.line));
        self.deliver(Token::new(TokenKind::Error, err.message(), pos, line));
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Whether reads and deliveries have stopped taking effect
    pub fn is_halted(&self) -> bool {
        self.errored || self.fault.is_some() || self.is_cancelled()
    }
}

impl<T> Scanner<T> {
    /// Name given to the scan, for diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full input
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Current read offset
    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Offset where the pending token starts
    pub fn start(&self) -> Pos {
        self.start
    }

    /// Line at the current read offset
    pub fn line(&self) -> usize {
        self.line
    }

    /// Line where the pending token starts
    pub fn start_line(&self) -> usize {
        self.start_line
    }

    /// Text read since the last boundary
    pub fn pending(&self) -> &str {
        &self.input[self.start..self.pos]
    }

    /// Byte width of the last rune read; 0 when there is nothing to un-read
    pub fn width(&self) -> usize {
        match self.last {
            LastRead::Rune(r) => r.len_utf8(),
            LastRead::Nothing | LastRead::End => 0,
        }
    }

    /// Location of the pending token
    pub fn location(&self) -> Location {
        Location::new(self.name.clone(), self.start, self.start_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::mpsc::{channel, Receiver, Sender};

    #[derive(Debug, Clone, PartialEq)]
    enum Kind {
        Word,
        Block,
    }

    impl TokenType for Kind {
        fn name(&self) -> &str {
            match self {
                Kind::Word => "WORD",
                Kind::Block => "BLOCK",
            }
        }

        fn counts_newlines(&self) -> bool {
            matches!(self, Kind::Block)
        }
    }

    struct Collect(Sender<Token<Kind>>);

    impl Handoff<Kind> for Collect {
        fn deliver(&mut self, token: Token<Kind>) -> bool {
            self.0.send(token).is_ok()
        }
    }

    fn scanner(input: &str) -> (Scanner<Kind>, Receiver<Token<Kind>>) {
        let (tx, rx) = channel();
        let s = Scanner::new(
            "test",
            Arc::from(input),
            Box::new(Collect(tx)),
            Arc::new(AtomicBool::new(false)),
        );
        (s, rx)
    }

    fn word(text: &str, pos: Pos, line: usize) -> Token<Kind> {
        Token::new(TokenKind::Item(Kind::Word), text, pos, line)
    }

    #[test]
    fn test_next_rune_widths() {
        let (mut s, _rx) = scanner("aé€😀");
        let mut seen = Vec::new();
        while let Some(r) = s.next_rune() {
            seen.push((r, s.width(), s.pos()));
        }
        assert_eq!(
            seen,
            vec![('a', 1, 1), ('é', 2, 3), ('€', 3, 6), ('😀', 4, 10)]
        );
        assert_eq!(s.pos(), 10);
        assert_eq!(s.width(), 0);
        assert_eq!(s.next_rune(), None);
        assert_eq!(s.pos(), 10);
    }

    #[test]
    fn test_backup_exactness() {
        let (mut s, _rx) = scanner("x€\ny");
        for _ in 0..4 {
            let (pos, line) = (s.pos(), s.line());
            s.next_rune();
            s.backup();
            assert_eq!((s.pos(), s.line()), (pos, line));
            s.next_rune();
        }
        assert_eq!(s.line(), 2);
        assert!(s.take_fault().is_none());
    }

    #[test]
    fn test_backup_across_newline() {
        let (mut s, _rx) = scanner("\n");
        assert_eq!(s.next_rune(), Some('\n'));
        assert_eq!((s.pos(), s.line()), (1, 2));
        s.backup();
        assert_eq!((s.pos(), s.line()), (0, 1));
    }

    #[test]
    fn test_peek_is_side_effect_free() {
        let (mut s, _rx) = scanner("é\n");
        for _ in 0..3 {
            assert_eq!(s.peek(), Some('é'));
            assert_eq!((s.pos(), s.line()), (0, 1));
        }
        s.next_rune();
        assert_eq!(s.peek(), Some('\n'));
        assert_eq!(s.peek(), Some('\n'));
        assert_eq!((s.pos(), s.line()), (2, 1));
        s.next_rune();
        assert_eq!(s.peek(), None);
        assert_eq!(s.peek(), None);
        assert!(s.take_fault().is_none());
    }

    #[test]
    fn test_backup_after_end_of_input_is_noop() {
        let (mut s, _rx) = scanner("a");
        s.next_rune();
        assert_eq!(s.next_rune(), None);
        s.backup();
        assert_eq!(s.pos(), 1);
        assert!(s.take_fault().is_none());
    }

    #[test]
    fn test_double_backup_is_checked() {
        let (mut s, _rx) = scanner("ab");
        s.next_rune();
        s.next_rune();
        assert!(s.try_backup().is_ok());
        let err = s.try_backup().unwrap_err();
        assert!(matches!(err, ScanError::InvalidBackup { .. }));
        assert_eq!(s.pos(), 1);

        s.backup();
        assert_eq!(s.pos(), 1);
        match s.take_fault() {
            Some(ScanError::InvalidBackup { location }) => assert_eq!(location.offset, 1),
            other => panic!("expected backup fault, got {:?}", other),
        }
    }

    #[test]
    fn test_backup_on_fresh_scanner_is_checked() {
        let (mut s, _rx) = scanner("a");
        assert!(s.try_backup().is_err());
        assert_eq!(s.pos(), 0);
    }

    #[test]
    fn test_match_one() {
        let (mut s, _rx) = scanner("+x");
        assert!(s.match_one("+-"));
        assert_eq!(s.pos(), 1);
        assert!(!s.match_one("+-"));
        assert_eq!(s.pos(), 1);
        s.next_rune();
        assert!(!s.match_one("+-"));
        assert_eq!(s.pos(), 2);
        assert!(s.take_fault().is_none());
    }

    #[test]
    fn test_match_many() {
        let (mut s, _rx) = scanner("1234x");
        s.match_many("0123456789");
        assert_eq!(s.pending(), "1234");
        assert_eq!(s.peek(), Some('x'));

        let (mut s, _rx) = scanner("007");
        s.match_many("0123456789");
        assert_eq!(s.pos(), 3);
        assert!(s.take_fault().is_none());
    }

    #[test]
    fn test_accept_while_and_match_str() {
        let (mut s, _rx) = scanner("abc-->\nd");
        assert_eq!(s.accept_while(|r| r.is_ascii_alphabetic()), 3);
        assert!(!s.match_str("->"));
        assert!(s.match_str("-->\n"));
        assert_eq!((s.pos(), s.line()), (7, 2));
    }

    #[test]
    fn test_emit_slices_pending_span() {
        let (mut s, rx) = scanner("ab cd");
        s.match_many("abcd");
        s.emit(Kind::Word);
        assert_eq!(s.start(), s.pos());
        s.emit(Kind::Word);
        s.next_rune();
        s.ignore();
        s.match_many("abcd");
        s.emit(Kind::Word);

        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(got, vec![word("ab", 0, 1), word("", 2, 1), word("cd", 3, 1)]);
    }

    #[test]
    fn test_no_backup_across_boundary() {
        let (mut s, _rx) = scanner("ab");
        s.next_rune();
        s.emit(Kind::Word);
        assert!(s.try_backup().is_err());
        assert_eq!(s.start(), 1);
        assert_eq!(s.pos(), 1);
    }

    #[test]
    fn test_line_counting_paths_agree() {
        let (mut s, rx) = scanner("/*\n\n*/x\ny");
        s.match_str("/*");
        s.match_many("\n");
        s.match_str("*/");
        s.emit(Kind::Block);
        s.next_rune();
        s.emit(Kind::Word);
        s.next_rune();
        s.ignore();
        s.next_rune();
        s.emit(Kind::Word);

        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            got,
            vec![
                Token::new(TokenKind::Item(Kind::Block), "/*\n\n*/", 0, 1),
                word("x", 6, 3),
                word("y", 8, 4),
            ]
        );
    }

    #[test]
    fn test_errorf_positioned_at_start() {
        let (mut s, rx) = scanner("a\n12x");
        s.match_many("a\n");
        s.ignore();
        s.match_many("0123456789");
        s.emit(Kind::Word);
        let r = s.next_rune();
        let next = s.errorf(format_args!("unexpected rune {:?}", r.unwrap_or('?')));
        assert!(next.is_none());

        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            got[1],
            Token::new(TokenKind::Error, "unexpected rune 'x'", 4, 2)
        );
    }

    #[test]
    fn test_positions_stay_in_bounds() {
        let input = "α b\n\tγδ\n\n😀z";
        let (mut s, _rx) = scanner(input);
        let mut step = 0;
        loop {
            assert!(s.start() <= s.pos() && s.pos() <= input.len());
            match step % 3 {
                0 => {
                    s.peek();
                }
                1 => s.match_many(" \t\n"),
                _ => {
                    if s.next_rune().is_none() {
                        break;
                    }
                }
            }
            if step % 4 == 3 {
                s.emit(Kind::Block);
            }
            step += 1;
        }
        assert_eq!(s.line(), 4);
        assert!(s.take_fault().is_none());
    }

    #[test]
    fn test_match_str_is_whole_or_nothing() {
        let (mut s, _rx) = scanner("a\nbc");
        assert!(!s.match_str("a\nbx"));
        assert_eq!((s.pos(), s.line()), (0, 1));
        assert!(s.match_str("a\nb"));
        assert_eq!((s.pos(), s.line(), s.width()), (3, 2, 1));
        s.backup();
        assert_eq!((s.pos(), s.line()), (2, 2));

        s.cancel.store(true, Ordering::Release);
        assert!(!s.match_str("b"));
        assert_eq!(s.pos(), 2);
    }

    #[test]
    fn test_fault_halts_reads_and_deliveries() {
        let (mut s, rx) = scanner("ab");
        s.next_rune();
        s.backup();
        s.backup();
        assert!(s.is_halted());
        assert_eq!(s.next_rune(), None);
        assert!(!s.match_str("a"));
        s.emit(Kind::Word);
        s.error("late");
        assert!(rx.try_iter().next().is_none());

        let fault = s.take_fault().unwrap();
        s.fail(&fault);
        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(got.len(), 1);
        assert!(got[0].is_error());
        assert_eq!(got[0].pos, 0);
    }

    #[test]
    fn test_first_error_is_last_token() {
        let (mut s, rx) = scanner("abc");
        s.next_rune();
        s.error("first");
        assert_eq!(s.next_rune(), None);
        s.emit(Kind::Word);
        s.error("second");
        s.fail(&ScanError::InvalidBackup {
            location: Location::new("test", 0, 1),
        });

        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(got, vec![Token::new(TokenKind::Error, "first", 0, 1)]);
    }

    #[test]
    fn test_cancel_stops_reads() {
        let (mut s, _rx) = scanner("abc");
        s.next_rune();
        s.cancel.store(true, Ordering::Release);
        assert_eq!(s.next_rune(), None);
        assert!(!s.match_str("bc"));
        assert_eq!(s.pos(), 1);
    }

    #[test]
    fn test_closed_consumer_cancels() {
        let (mut s, rx) = scanner("abc");
        drop(rx);
        s.next_rune();
        s.emit(Kind::Word);
        assert!(s.is_cancelled());
    }
}
