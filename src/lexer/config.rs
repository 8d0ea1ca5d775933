//! Options for starting a scan

/// How a lexer's driver is started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerOptions {
    /// Name of the scan, reported in diagnostics only
    pub name: String,
    /// Prefix for the driver thread's name; the scan name is appended
    pub thread_prefix: String,
    /// Stack size for the driver thread, or the platform default
    pub stack_size: Option<usize>,
}

impl LexerOptions {
    /// Default options for a scan called `name`
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the driver thread's stack size
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Name given to the driver thread
    pub fn thread_name(&self) -> String {
        if self.name.is_empty() {
            self.thread_prefix.clone()
        } else {
            format!("{}:{}", self.thread_prefix, self.name)
        }
    }
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self {
            name: String::new(),
            thread_prefix: "runescan".to_string(),
            stack_size: None,
        }
    }
}
