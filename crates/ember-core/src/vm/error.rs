//! Runtime errors for the ember virtual machine

use std::fmt;

use thiserror::Error;

/// A runtime error that reached the host
#[derive(Debug, Clone)]
pub struct RuntimeError {
    /// The kind of error
    pub kind: RuntimeErrorKind,

    /// Call chain at the point of error, innermost frame first
    pub traceback: Vec<StackFrame>,
}

impl RuntimeError {
    /// Create a new runtime error
    #[must_use]
    pub fn new(kind: RuntimeErrorKind) -> Self {
        Self {
            kind,
            traceback: Vec::new(),
        }
    }

    /// Attach a traceback
    #[must_use]
    pub fn with_traceback(mut self, traceback: Vec<StackFrame>) -> Self {
        self.traceback = traceback;
        self
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind)?;
        if !self.traceback.is_empty() {
            writeln!(f, "Traceback:")?;
            for frame in &self.traceback {
                match &frame.path {
                    Some(path) => writeln!(
                        f,
                        "    from {path}:{}: in {}",
                        frame.line, frame.function_name
                    )?,
                    None => writeln!(f, "    from line {}: in {}", frame.line, frame.function_name)?,
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for RuntimeError {}

/// One entry of a traceback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Function name, qualified with its class for methods
    pub function_name: String,

    /// Source line the frame was executing
    pub line: u32,

    /// Path of the module defining the function
    pub path: Option<String>,
}

impl StackFrame {
    #[must_use]
    pub fn new(function_name: String, line: u32) -> Self {
        Self {
            function_name,
            line,
            path: None,
        }
    }
}

/// The kind of runtime error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeErrorKind {
    /// A raise found no catch entry
    #[error("{name}: {message}")]
    UncaughtException { name: String, message: String },

    /// Call depth exceeded the configured limit
    #[error("RuntimeError: function call recursion limit ({0}) exceeded")]
    RecursionLimit(usize),

    /// An operation needed a call frame but none is active
    #[error("RuntimeError: no active call frame")]
    NoActiveFrame,

    /// A register index fell outside the active window
    #[error("RuntimeError: register {index} is outside the window of {size}")]
    RegisterOutOfRange { index: usize, size: usize },

    /// `remove_catch` with an empty catch chain
    #[error("RuntimeError: no catch entry to remove")]
    NoCatchEntry,
}

/// Result type for VM operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;
