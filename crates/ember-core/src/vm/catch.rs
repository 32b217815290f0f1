//! Catch chain and exception propagation
//!
//! Installing a handler records the call depth and the register window of
//! the frame that installed it. A raise pops the newest entry and restores
//! both directly, so unwinding costs the same no matter how many frames sit
//! above the handler.

use super::{RuntimeError, RuntimeErrorKind, RuntimeResult, StackFrame, VmState};
use crate::value::Value;

/// A handler installed by a `try` block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatchEntry {
    /// Call depth of the frame that installed the handler
    pub call_depth: usize,

    /// Where the handler code starts
    pub code_pos: usize,

    /// Window start of the installing frame
    pub offset_from_main: usize,
}

/// Where execution continues after a caught raise
#[derive(Debug, Clone)]
pub struct CatchResume {
    pub call_depth: usize,
    pub code_pos: usize,

    /// The raised value; `None` for a valueless signal
    pub exception: Option<Value>,
}

impl VmState {
    /// Install a handler for the current frame that resumes at `code_pos`
    ///
    /// # Errors
    /// Fails if no frame is active.
    pub fn install_catch(&mut self, code_pos: usize) -> RuntimeResult<()> {
        if self.call_depth == 0 {
            return Err(self.runtime_error(RuntimeErrorKind::NoActiveFrame));
        }

        let entry = CatchEntry {
            call_depth: self.call_depth,
            code_pos,
            offset_from_main: self.window_start,
        };
        tracing::trace!(?entry, "install catch");
        self.catch_chain.push(entry);
        Ok(())
    }

    /// Remove the newest handler when its `try` block ends normally
    ///
    /// # Errors
    /// Fails if no handler is installed.
    pub fn remove_catch(&mut self) -> RuntimeResult<CatchEntry> {
        match self.catch_chain.pop() {
            Some(entry) => Ok(entry),
            None => Err(self.runtime_error(RuntimeErrorKind::NoCatchEntry)),
        }
    }

    /// Number of installed handlers
    #[must_use]
    pub fn catch_depth(&self) -> usize {
        self.catch_chain.len()
    }

    /// The exception being propagated, if any
    #[must_use]
    pub fn current_exception(&self) -> Option<&Value> {
        self.current_exception.as_ref()
    }

    /// Raise `payload`, or a valueless signal when `None`.
    ///
    /// The newest handler is consumed. Frames above it go back to the pool,
    /// its window is restored, and its frame resumes at the handler code
    /// with the raised value.
    ///
    /// # Errors
    /// With no handler installed, returns an uncaught exception error
    /// carrying a traceback of the call chain.
    pub fn raise(&mut self, payload: Option<Value>) -> RuntimeResult<CatchResume> {
        if let Some(payload) = payload {
            self.current_exception = Some(payload);
        }

        let Some(entry) = self.catch_chain.pop() else {
            let exception = self.current_exception.take();
            let (name, message) = self.describe_exception(exception.as_ref());
            tracing::debug!(%name, %message, depth = self.call_depth, "uncaught exception");
            return Err(self.runtime_error(RuntimeErrorKind::UncaughtException { name, message }));
        };

        tracing::trace!(from = self.call_depth, to = entry.call_depth, "unwind");

        self.call_depth = entry.call_depth;
        self.window_start = entry.offset_from_main;
        if let Some(frame) = self.current_frame_mut() {
            frame.code_pos = entry.code_pos;
        }

        Ok(CatchResume {
            call_depth: entry.call_depth,
            code_pos: entry.code_pos,
            exception: self.current_exception.take(),
        })
    }

    /// Leave the innermost frame out of the next traceback (or put it back)
    pub fn set_include_last_frame(&mut self, include: bool) {
        self.include_last_frame_in_trace = include;
    }

    /// Walk the call chain from the innermost frame.
    ///
    /// Skipping the innermost frame only applies to this traceback.
    pub fn traceback(&mut self) -> Vec<StackFrame> {
        let skip = usize::from(!self.include_last_frame_in_trace);
        self.include_last_frame_in_trace = true;

        self.frames[..self.call_depth]
            .iter()
            .rev()
            .skip(skip)
            .map(|frame| StackFrame {
                function_name: frame.function.qualified_name(),
                line: frame.line_num,
                path: frame
                    .function
                    .module
                    .and_then(|module| self.module_paths.get(module.0 as usize))
                    .filter(|path| !path.is_empty())
                    .cloned(),
            })
            .collect()
    }

    pub(crate) fn runtime_error(&mut self, kind: RuntimeErrorKind) -> RuntimeError {
        RuntimeError::new(kind).with_traceback(self.traceback())
    }

    /// Class name and message shown for an uncaught exception
    fn describe_exception(&self, exception: Option<&Value>) -> (String, String) {
        match exception {
            None => ("Signal".to_string(), String::new()),
            Some(Value::Instance(instance)) => {
                let instance = instance.borrow();
                let name = self
                    .class(instance.class_id)
                    .map_or_else(|| format!("class#{}", instance.class_id), |c| c.name.clone());
                let message = match instance.fields.first() {
                    Some(Value::String(message)) => message.to_string(),
                    _ => String::new(),
                };
                (name, message)
            }
            Some(other) => (other.type_name().to_string(), other.to_string()),
        }
    }
}
