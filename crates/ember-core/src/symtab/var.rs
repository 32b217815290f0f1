//! Vars: named, typed slots declared in a module or attached to a class

use super::{ClassHandle, Type, VarHandle};

/// A declared var
#[derive(Debug, Clone)]
pub struct Var {
    pub name: String,
    pub shorthash: u64,
    pub ty: Type,

    /// Line of the declaration
    pub line_num: u32,

    /// Set when a block closes; lookups skip the var but it stays linked
    pub out_of_scope: bool,

    /// Owning class once the var becomes a method
    pub parent: Option<ClassHandle>,

    /// The var declared just before this one in the same chain
    pub(crate) next: Option<VarHandle>,
}

impl Var {
    /// The var declared before this one, if any
    #[must_use]
    pub fn declared_before(&self) -> Option<VarHandle> {
        self.next
    }

    pub(crate) fn matches(&self, name: &str, shorthash: u64) -> bool {
        self.shorthash == shorthash && !self.out_of_scope && self.name == name
    }
}
