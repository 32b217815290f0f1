//! Call frames and the call chain

use std::cell::RefCell;
use std::rc::Rc;

use super::{RuntimeErrorKind, RuntimeResult, VmState};
use crate::function::Function;
use crate::value::{Instance, Value};

/// One activation on the call chain
#[derive(Debug, Clone)]
pub struct CallFrame {
    /// The function being executed
    pub function: Rc<Function>,

    /// Position in the function's code
    pub code_pos: usize,

    /// Line being executed, for tracebacks
    pub line_num: u32,

    /// First register of this frame's window
    pub offset_to_main: usize,

    /// Registers in this frame's window
    pub regs_used: usize,

    /// Caller register receiving the return value
    pub return_target: Option<usize>,

    /// Values captured by a closure
    pub upvalues: Vec<Value>,

    /// Instance shared along a constructor chain
    pub build_value: Option<Rc<RefCell<Instance>>>,
}

impl CallFrame {
    fn new(function: Rc<Function>, offset_to_main: usize, return_target: Option<usize>) -> Self {
        let regs_used = function.reg_count;
        let line_num = function.line_num;
        Self {
            function,
            code_pos: 0,
            line_num,
            offset_to_main,
            regs_used,
            return_target,
            upvalues: Vec::new(),
            build_value: None,
        }
    }
}

impl VmState {
    /// Enter `function`, reusing a pooled frame when one is available. The
    /// callee's window starts right after the caller's registers.
    ///
    /// # Errors
    /// Fails when the call chain is already at the configured depth limit.
    pub fn push_call(
        &mut self,
        function: Rc<Function>,
        return_target: Option<usize>,
    ) -> RuntimeResult<()> {
        let limit = self.config.max_call_depth;
        if self.call_depth >= limit {
            return Err(self.runtime_error(RuntimeErrorKind::RecursionLimit(limit)));
        }

        let offset = self.register_top();
        let needed = offset + function.reg_count;
        self.ensure_registers(needed);
        self.registers[offset..needed].fill(Value::Unit);

        tracing::trace!(
            function = %function.name,
            depth = self.call_depth + 1,
            offset,
            "push call"
        );

        let frame = CallFrame::new(function, offset, return_target);
        match self.frames.get_mut(self.call_depth) {
            Some(pooled) => *pooled = frame,
            None => self.frames.push(frame),
        }

        self.call_depth += 1;
        self.window_start = offset;
        Ok(())
    }

    /// Leave the current function, storing `result` in the caller's return
    /// register. Catch entries the function left installed are dropped, and
    /// the frame stays pooled for the next call.
    ///
    /// # Errors
    /// Fails if no frame is active.
    pub fn pop_call(&mut self, result: Value) -> RuntimeResult<()> {
        if self.call_depth == 0 {
            return Err(self.runtime_error(RuntimeErrorKind::NoActiveFrame));
        }

        let frame = &mut self.frames[self.call_depth - 1];
        let start = self.window_start;
        let end = start + frame.regs_used;
        let target = frame.return_target;
        frame.build_value = None;
        frame.upvalues.clear();

        tracing::trace!(function = %frame.function.name, depth = self.call_depth, "pop call");

        self.registers[start..end].fill(Value::Unit);
        self.call_depth -= 1;

        // Handlers installed by the returning frame die with it
        let depth = self.call_depth;
        let live = self
            .catch_chain
            .iter()
            .rposition(|entry| entry.call_depth <= depth)
            .map_or(0, |index| index + 1);
        self.catch_chain.truncate(live);

        let Some(caller) = self.current_frame() else {
            self.window_start = 0;
            return Ok(());
        };

        self.window_start = caller.offset_to_main;
        if let Some(target) = target {
            self.set_register(target, result)?;
        }
        Ok(())
    }

    /// The frame being executed
    #[must_use]
    pub fn current_frame(&self) -> Option<&CallFrame> {
        self.call_depth.checked_sub(1).map(|top| &self.frames[top])
    }

    pub fn current_frame_mut(&mut self) -> Option<&mut CallFrame> {
        let top = self.call_depth.checked_sub(1)?;
        self.frames.get_mut(top)
    }

    /// Record where the current frame is, for resuming and tracebacks
    pub fn set_position(&mut self, code_pos: usize, line_num: u32) {
        if let Some(frame) = self.current_frame_mut() {
            frame.code_pos = code_pos;
            frame.line_num = line_num;
        }
    }

    /// Number of active frames
    #[must_use]
    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// Frames kept for reuse above the current depth
    #[must_use]
    pub fn pooled_frames(&self) -> usize {
        self.frames.len() - self.call_depth
    }
}
