//! Error handling and diagnostics for the scanning engine
//!
//! Scanning failures travel through the token stream as ordinary Error
//! tokens. This module provides the Rust-side error type those tokens (and
//! the engine's own misuse and thread failures) are lifted into.

use std::fmt;

pub mod diagnostic;

pub use diagnostic::Diagnostic;

use crate::lexer::Pos;

/// Result type alias for scanning operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Where in the input something happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Name of the scan, as given to the lexer
    pub name: String,
    /// Byte offset into the input
    pub offset: Pos,
    /// Line number (1-based)
    pub line: usize,
}

impl Location {
    /// Create a new location
    pub fn new(name: impl Into<String>, offset: Pos, line: usize) -> Self {
        Self {
            name: name.into(),
            offset,
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}:+{}", self.line, self.offset)
        } else {
            write!(f, "{}:{}:+{}", self.name, self.line, self.offset)
        }
    }
}

/// Errors surfaced by the scanning engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// A state function reported malformed input
    Scan {
        message: String,
        location: Location,
    },
    /// `backup` was called without a rune to un-read
    InvalidBackup {
        location: Location,
    },
    /// The driver thread panicked inside a state function
    DriverPanicked {
        name: String,
    },
    /// The driver thread could not be started
    Spawn {
        name: String,
        message: String,
    },
}

impl ScanError {
    /// Create a new scan error
    pub fn scan(message: impl Into<String>, location: Location) -> Self {
        Self::Scan {
            message: message.into(),
            location,
        }
    }

    /// Get the error kind as a string
    pub fn kind(&self) -> &str {
        match self {
            Self::Scan { .. } => "Scan Error",
            Self::InvalidBackup { .. } => "Invalid Backup",
            Self::DriverPanicked { .. } => "Driver Panicked",
            Self::Spawn { .. } => "Spawn Error",
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::Scan { message, .. } => message.clone(),
            Self::InvalidBackup { .. } => {
                "backup called without a rune to un-read".to_string()
            }
            Self::DriverPanicked { name } => {
                format!("scanner '{}' panicked inside a state function", name)
            }
            Self::Spawn { name, message } => {
                format!("could not start scanner '{}': {}", name, message)
            }
        }
    }

    /// Get the input location if available
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::Scan { location, .. } | Self::InvalidBackup { location } => Some(location),
            Self::DriverPanicked { .. } | Self::Spawn { .. } => None,
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = self.location() {
            write!(f, "{}: {} at {}", self.kind(), self.message(), location)
        } else {
            write!(f, "{}: {}", self.kind(), self.message())
        }
    }
}

impl std::error::Error for ScanError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let loc = Location::new("", 7, 2);
        assert_eq!(loc.to_string(), "2:+7");

        let named = Location::new("input.txt", 7, 2);
        assert_eq!(named.to_string(), "input.txt:2:+7");
    }

    #[test]
    fn test_error_creation() {
        let loc = Location::new("t", 2, 1);
        let err = ScanError::scan("bad number", loc.clone());

        assert_eq!(err.kind(), "Scan Error");
        assert_eq!(err.message(), "bad number");
        assert_eq!(err.location(), Some(&loc));
    }

    #[test]
    fn test_error_display() {
        let err = ScanError::InvalidBackup {
            location: Location::new("t", 0, 1),
        };
        assert_eq!(
            err.to_string(),
            "Invalid Backup: backup called without a rune to un-read at t:1:+0"
        );

        let err = ScanError::DriverPanicked { name: "t".into() };
        assert!(err.location().is_none());
        assert!(err.to_string().starts_with("Driver Panicked: "));
    }
}
