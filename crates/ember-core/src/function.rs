//! Compiled function records
//!
//! Functions are immutable once the emitter finishes them, which is why the
//! symbol table keeps them in the literal pool alongside constants.

use crate::symtab::ModuleId;

/// A compiled function body produced by the emitter
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// The function name (`__main__` for the toplevel)
    pub name: String,

    /// Class name for methods, used when printing tracebacks
    pub class_name: Option<String>,

    /// Encoded instruction stream
    pub code: Vec<u16>,

    /// Registers needed by one activation of this function
    pub reg_count: usize,

    /// Line the function was declared on
    pub line_num: u32,

    /// Module that defined the function
    pub module: Option<ModuleId>,

    /// True for host-provided functions with no bytecode
    pub native: bool,
}

impl Function {
    /// Create a function with the given body
    #[must_use]
    pub fn new(name: impl Into<String>, code: Vec<u16>, reg_count: usize) -> Self {
        Self {
            name: name.into(),
            class_name: None,
            code,
            reg_count,
            line_num: 0,
            module: None,
            native: false,
        }
    }

    /// Create a host-provided function
    #[must_use]
    pub fn native(name: impl Into<String>, reg_count: usize) -> Self {
        Self {
            native: true,
            ..Self::new(name, Vec::new(), reg_count)
        }
    }

    /// Attach the class this function is a method of
    #[must_use]
    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Name as shown in tracebacks (`Class.method` for methods)
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.class_name {
            Some(class) => format!("{class}.{}", self.name),
            None => self.name.clone(),
        }
    }
}
