#[cfg(test)]
use std::sync::Mutex;

/// Output message captured by MockOutput for testing
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum OutputMessage {
    Success(String),
    Error(String),
    Warning(String),
    Info(String),
    Section(String),
    KeyValue(String, String),
    Dimmed(String),
}

/// Trait for operator-facing output to enable testing with mocks
///
/// Everything written here is diagnostics. Generated templates and state
/// documents never go through this trait.
pub trait Output: Send + Sync {
    /// Print a success message
    fn success(&self, message: &str);

    /// Print an error message
    fn error(&self, message: &str);

    /// Print a warning message
    fn warning(&self, message: &str);

    /// Print an info message
    fn info(&self, message: &str);

    /// Print a section header
    fn section(&self, title: &str);

    /// Print a key-value pair
    fn key_value(&self, key: &str, value: &str);

    /// Print a dimmed/muted message
    fn dimmed(&self, message: &str);
}

/// Real terminal output implementation using the output module
pub struct TerminalOutput {
    quiet: bool,
}

impl TerminalOutput {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Output for TerminalOutput {
    fn success(&self, message: &str) {
        if !self.quiet {
            crate::output::success(message);
        }
    }

    fn error(&self, message: &str) {
        // Errors are shown even in quiet mode
        crate::output::error(message);
    }

    fn warning(&self, message: &str) {
        if !self.quiet {
            crate::output::warning(message);
        }
    }

    fn info(&self, message: &str) {
        if !self.quiet {
            crate::output::info(message);
        }
    }

    fn section(&self, title: &str) {
        if !self.quiet {
            crate::output::section(title);
        }
    }

    fn key_value(&self, key: &str, value: &str) {
        if !self.quiet {
            crate::output::key_value(key, value);
        }
    }

    fn dimmed(&self, message: &str) {
        if !self.quiet {
            crate::output::dimmed(message);
        }
    }
}

/// Mock output implementation for testing (captures output)
#[cfg(test)]
pub struct MockOutput {
    messages: Mutex<Vec<OutputMessage>>,
}

#[cfg(test)]
impl MockOutput {
    /// Create new mock output
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Get all warning messages
    pub fn get_warnings(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| {
                if let OutputMessage::Warning(msg) = m {
                    Some(msg.clone())
                } else {
                    None
                }
            })
            .collect()
    }

    /// Get all error messages
    pub fn get_errors(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| {
                if let OutputMessage::Error(msg) = m {
                    Some(msg.clone())
                } else {
                    None
                }
            })
            .collect()
    }

    /// Check if any success message was output
    pub fn has_success(&self) -> bool {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .any(|m| matches!(m, OutputMessage::Success(_)))
    }

    fn push(&self, message: OutputMessage) {
        self.messages.lock().unwrap().push(message);
    }
}

#[cfg(test)]
impl Default for MockOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl Output for MockOutput {
    fn success(&self, message: &str) {
        self.push(OutputMessage::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(OutputMessage::Error(message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.push(OutputMessage::Warning(message.to_string()));
    }

    fn info(&self, message: &str) {
        self.push(OutputMessage::Info(message.to_string()));
    }

    fn section(&self, title: &str) {
        self.push(OutputMessage::Section(title.to_string()));
    }

    fn key_value(&self, key: &str, value: &str) {
        self.push(OutputMessage::KeyValue(key.to_string(), value.to_string()));
    }

    fn dimmed(&self, message: &str) {
        self.push(OutputMessage::Dimmed(message.to_string()));
    }
}
