//! Diagnostic formatting for better error messages
//!
//! Renders a `ScanError` with the offending source line and a caret under
//! the byte offset the error was raised at.

use super::{Location, ScanError};
use colored::Colorize;

/// Diagnostic information for displaying errors with context
pub struct Diagnostic {
    error: ScanError,
    source: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic from an error
    pub fn new(error: ScanError) -> Self {
        Self {
            error,
            source: None,
        }
    }

    /// Create a diagnostic with source code context
    pub fn with_source(error: ScanError, source: &str) -> Self {
        Self {
            error,
            source: Some(source.to_string()),
        }
    }

    /// Format the diagnostic with color and context
    pub fn format(&self) -> String {
        let mut output = String::new();

        let kind = self.error.kind().red().bold();
        output.push_str(&format!("{}: ", kind));
        output.push_str(&self.error.message());
        output.push('\n');

        if let Some(location) = self.error.location() {
            output.push_str(&format!("  {} {}\n", "-->".blue().bold(), location));

            if let Some(ref source) = self.source {
                output.push_str(&self.format_source_context(source, location));
            }
        }

        output
    }

    /// Format the source line containing the error offset
    fn format_source_context(&self, source: &str, location: &Location) -> String {
        let mut output = String::new();

        let offset = location.offset.min(source.len());
        if !source.is_char_boundary(offset) {
            return output;
        }

        let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line_end = source[offset..]
            .find('\n')
            .map_or(source.len(), |i| offset + i);
        let text = source[line_start..line_end].trim_end_matches('\r');
        let column = source[line_start..offset].chars().count() + 1;

        let line_num_width = location.line.to_string().len();
        output.push_str(&format!(
            "  {} {}\n",
            format!("{:width$}", location.line, width = line_num_width)
                .blue()
                .bold(),
            text
        ));

        let indicator_padding = " ".repeat(line_num_width + 2 + column);
        output.push_str(&format!("{}{}\n", indicator_padding, "^".red().bold()));

        output
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_without_source() {
        let err = ScanError::scan("unexpected rune 'x'", Location::new("t", 2, 1));
        let formatted = Diagnostic::new(err).format();

        assert!(formatted.contains("Scan Error"));
        assert!(formatted.contains("unexpected rune 'x'"));
    }

    #[test]
    fn test_diagnostic_with_source() {
        colored::control::set_override(false);

        let source = "12\n34x\n56";
        let err = ScanError::scan("unexpected rune 'x'", Location::new("t", 5, 2));
        let formatted = Diagnostic::with_source(err, source).format();

        assert!(formatted.contains("  2 34x\n"));
        // caret sits under the third column of the line
        assert!(formatted.ends_with(&format!("{}^\n", " ".repeat(6))));
    }

    #[test]
    fn test_diagnostic_offset_past_end() {
        colored::control::set_override(false);

        let err = ScanError::scan("eof", Location::new("t", 99, 1));
        let formatted = Diagnostic::with_source(err, "ab").format();
        assert!(formatted.contains("  1 ab\n"));
    }
}
