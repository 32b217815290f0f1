//! Ember Core - runtime core of the Ember interpreter
//!
//! This crate provides:
//! - Symbol table: literals, modules, classes, and vars owned during
//!   compilation, with rewind support for incremental compiles
//! - VM state: register windows, call frames, the catch chain, and the
//!   runtime class table
//! - Cycle collector for instances and lists
//!
//! Parsing, bytecode dispatch, and host embedding live outside this crate.

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generational arena backing every symbol table node
pub mod arena;

/// Runtime configuration loading
pub mod config;

/// Compiled function records
pub mod function;

/// Cycle collector
pub mod gc;

/// Name shorthashes and reserved words
pub mod keyword;

/// Symbol table - classes, vars, literals, and modules
pub mod symtab;

/// Runtime values
pub mod value;

/// Virtual machine state
pub mod vm;

pub use config::{ConfigError, RuntimeConfig};
pub use function::Function;
pub use gc::{Collector, GcStats};
pub use symtab::{
    ClassHandle, LiteralId, LiteralValue, ModuleId, SymbolTable, TeardownStats, Type, VarHandle,
};
pub use value::{Instance, Value};
pub use vm::{CatchResume, RuntimeError, RuntimeErrorKind, RuntimeResult, VmState};
