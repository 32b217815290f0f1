//! Virtual machine state
//!
//! A [`VmState`] owns one growable register array. Each active call frame
//! sees a window of it that starts right after its caller's registers, so a
//! call only has to move the window start. Frames above the current call
//! depth are kept for reuse by the next call.

mod catch;
mod class_table;
mod error;
mod frame;

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::RuntimeConfig;
use crate::function::Function;
use crate::gc::{Collector, GcStats};
use crate::symtab::{PoolEntry, SymbolTable};
use crate::value::{Instance, Value};

pub use catch::{CatchEntry, CatchResume};
pub use class_table::RuntimeClass;
pub use error::{RuntimeError, RuntimeErrorKind, RuntimeResult, StackFrame};
pub use frame::CallFrame;

/// Execution state of one interpreter instance
pub struct VmState {
    config: RuntimeConfig,

    registers: Vec<Value>,

    /// First register of the active window
    window_start: usize,

    frames: Vec<CallFrame>,

    /// Number of active frames; the rest of `frames` is pooled
    call_depth: usize,

    catch_chain: Vec<CatchEntry>,

    /// Exception being propagated
    current_exception: Option<Value>,

    /// Cleared when the innermost frame is internal and should not appear
    /// in the next traceback
    include_last_frame_in_trace: bool,

    gc: Collector,

    /// Runtime classes indexed by class id
    class_table: Vec<Option<RuntimeClass>>,

    /// Literals and functions, indexed like the literal pool
    readonly: Vec<Value>,

    /// Module paths indexed by module id, for tracebacks
    module_paths: Vec<String>,
}

impl VmState {
    /// Create a VM with no frames and an empty class table
    #[must_use]
    pub fn new(config: RuntimeConfig) -> Self {
        let registers = vec![Value::Unit; config.initial_registers];
        let gc = Collector::from_config(&config);

        Self {
            config,
            registers,
            window_start: 0,
            frames: Vec::new(),
            call_depth: 0,
            catch_chain: Vec::new(),
            current_exception: None,
            include_last_frame_in_trace: true,
            gc,
            class_table: Vec::new(),
            readonly: Vec::new(),
            module_paths: Vec::new(),
        }
    }

    /// Load what compilation produced: the readonly table, the class table,
    /// and the main function as the bottom frame.
    ///
    /// Calling this again after more code was compiled refreshes the tables
    /// and keeps the main frame.
    ///
    /// # Errors
    /// Fails only if the main frame cannot be pushed.
    pub fn prep(&mut self, symtab: &SymbolTable) -> RuntimeResult<()> {
        self.readonly = symtab
            .literals()
            .entries()
            .iter()
            .map(|entry| match entry {
                PoolEntry::Literal(literal) => Value::from_literal(&literal.value),
                PoolEntry::Function(function) => Value::Function(Rc::clone(function)),
            })
            .collect();

        self.module_paths = symtab
            .loaded_modules()
            .map(|id| (id.0 as usize, symtab.module(id).path.clone()))
            .fold(Vec::new(), |mut paths, (index, path)| {
                if paths.len() <= index {
                    paths.resize(index + 1, String::new());
                }
                paths[index] = path;
                paths
            });

        self.register_classes(symtab);

        let main = symtab
            .main_function()
            .cloned()
            .unwrap_or_else(|| Rc::new(Function::new("__main__", Vec::new(), 0)));

        if self.call_depth == 0 {
            self.push_call(main, None)?;
        } else {
            let needed = main.reg_count;
            let frame = &mut self.frames[0];
            frame.regs_used = frame.regs_used.max(needed);
            frame.function = main;
            self.ensure_registers(needed);
        }

        tracing::debug!(
            readonly = self.readonly.len(),
            classes = self.class_table.len(),
            "vm prepared"
        );
        Ok(())
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Literal or function at `index` of the readonly table
    #[must_use]
    pub fn readonly(&self, index: usize) -> Option<&Value> {
        self.readonly.get(index)
    }

    // Registers

    /// Register `index` of the active window
    ///
    /// # Errors
    /// Fails if no frame is active or `index` is outside its window.
    pub fn register(&self, index: usize) -> RuntimeResult<&Value> {
        let spot = self.register_spot(index)?;
        Ok(&self.registers[spot])
    }

    /// Store `value` in register `index` of the active window
    ///
    /// # Errors
    /// Fails if no frame is active or `index` is outside its window.
    pub fn set_register(&mut self, index: usize, value: Value) -> RuntimeResult<()> {
        let spot = self.register_spot(index)?;
        self.registers[spot] = value;
        Ok(())
    }

    fn register_spot(&self, index: usize) -> RuntimeResult<usize> {
        let frame = self
            .current_frame()
            .ok_or_else(|| RuntimeError::new(RuntimeErrorKind::NoActiveFrame))?;

        if index >= frame.regs_used {
            return Err(RuntimeError::new(RuntimeErrorKind::RegisterOutOfRange {
                index,
                size: frame.regs_used,
            }));
        }
        Ok(self.window_start + index)
    }

    /// First register of the active window, counted from the bottom frame
    #[must_use]
    pub fn window_start(&self) -> usize {
        self.window_start
    }

    /// Registers allocated so far, active or not
    #[must_use]
    pub fn register_capacity(&self) -> usize {
        self.registers.len()
    }

    /// One past the last register of the active window
    fn register_top(&self) -> usize {
        self.current_frame()
            .map_or(0, |frame| self.window_start + frame.regs_used)
    }

    fn ensure_registers(&mut self, needed: usize) {
        if self.registers.len() < needed {
            let size = needed.max(self.registers.len() * 2);
            self.registers.resize(size, Value::Unit);
        }
    }

    // Instances

    /// Get the instance a constructor should fill in.
    ///
    /// When the calling frame is itself a constructor building a subclass of
    /// `class_id`, its instance is shared so the whole constructor chain
    /// fills one object. Otherwise a new instance is created and tagged.
    ///
    /// # Errors
    /// Fails if no frame is active.
    pub fn new_instance(&mut self, class_id: u32) -> RuntimeResult<Rc<RefCell<Instance>>> {
        if self.call_depth == 0 {
            return Err(self.runtime_error(RuntimeErrorKind::NoActiveFrame));
        }

        let depth = self.call_depth;
        let pending = if depth >= 2 {
            self.frames[depth - 2].build_value.clone()
        } else {
            None
        };

        if let Some(pending) = pending {
            let pending_id = pending.borrow().class_id;
            if self.class_inherits(pending_id, class_id) {
                self.frames[depth - 1].build_value = Some(Rc::clone(&pending));
                return Ok(pending);
            }
        }

        let field_count = self
            .class(class_id)
            .map_or(0, |class| usize::from(class.prop_count));
        let instance = Rc::new(RefCell::new(Instance::new(class_id, field_count)));
        self.tag_value(&Value::Instance(Rc::clone(&instance)));
        self.frames[depth - 1].build_value = Some(Rc::clone(&instance));
        Ok(instance)
    }

    // Garbage collection

    /// Start tracking a value that can form cycles, sweeping first if the
    /// collector's threshold has been reached. Returns true if the value is
    /// now tracked.
    pub fn tag_value(&mut self, value: &Value) -> bool {
        if !value.can_cycle() {
            return false;
        }
        if self.gc.should_sweep() {
            self.sweep(Some(value));
        }
        self.gc.track(value)
    }

    /// Run a sweep now, returning how many tracked values were freed
    pub fn collect_garbage(&mut self) -> usize {
        self.sweep(None)
    }

    #[must_use]
    pub fn gc_stats(&self) -> GcStats {
        self.gc.stats()
    }

    /// Roots are the active registers, the build values and upvalues of
    /// active frames, the current exception, and `pending` (a value being
    /// tagged that is not stored anywhere yet).
    fn sweep(&mut self, pending: Option<&Value>) -> usize {
        let top = self.register_top();
        let active = &self.frames[..self.call_depth];
        let extra: Vec<Value> = active
            .iter()
            .filter_map(|frame| frame.build_value.clone().map(Value::Instance))
            .chain(active.iter().flat_map(|frame| frame.upvalues.iter().cloned()))
            .chain(self.current_exception.clone())
            .chain(pending.cloned())
            .collect();

        self.gc.sweep(self.registers[..top].iter().chain(extra.iter()))
    }
}
