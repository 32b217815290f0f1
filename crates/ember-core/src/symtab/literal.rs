//! Literal pool: deduplicated constants and stored functions
//!
//! Every literal records the pool index of the next literal of the same kind,
//! so a lookup only walks literals of the kind it wants. Within one kind, two
//! lookups return the same [`LiteralId`] exactly when their values are equal,
//! letting the VM compare literals by identity.

use std::fmt;
use std::rc::Rc;

use crate::function::Function;

/// Index of an entry in the literal pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LiteralId(pub u32);

impl fmt::Display for LiteralId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "literal#{}", self.0)
    }
}

/// Primitive kinds that can be interned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Integer,
    Double,
    String,
    ByteString,
}

impl LiteralKind {
    const COUNT: usize = 4;

    fn slot(self) -> usize {
        match self {
            LiteralKind::Integer => 0,
            LiteralKind::Double => 1,
            LiteralKind::String => 2,
            LiteralKind::ByteString => 3,
        }
    }
}

/// An immutable compile-time constant
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Integer(i64),
    Double(f64),
    String(String),
    ByteString(Vec<u8>),
}

impl LiteralValue {
    #[must_use]
    pub fn kind(&self) -> LiteralKind {
        match self {
            LiteralValue::Integer(_) => LiteralKind::Integer,
            LiteralValue::Double(_) => LiteralKind::Double,
            LiteralValue::String(_) => LiteralKind::String,
            LiteralValue::ByteString(_) => LiteralKind::ByteString,
        }
    }

    /// Value equality within one kind.
    ///
    /// Doubles compare numerically, so `0.0` and `-0.0` share a literal and a
    /// NaN never matches an existing one.
    #[allow(clippy::float_cmp)]
    fn same_as(&self, other: &LiteralValue) -> bool {
        match (self, other) {
            (LiteralValue::Integer(a), LiteralValue::Integer(b)) => a == b,
            (LiteralValue::Double(a), LiteralValue::Double(b)) => a == b,
            (LiteralValue::String(a), LiteralValue::String(b)) => {
                a.len() == b.len() && a.as_bytes() == b.as_bytes()
            }
            (LiteralValue::ByteString(a), LiteralValue::ByteString(b)) => {
                a.len() == b.len() && a == b
            }
            _ => false,
        }
    }
}

/// A pooled constant
#[derive(Debug, Clone)]
pub struct Literal {
    pub value: LiteralValue,

    /// Position of this literal in the pool
    pub reg_spot: u32,

    /// Next literal of the same kind
    next_index: Option<u32>,
}

/// One entry in the pool
#[derive(Debug, Clone)]
pub enum PoolEntry {
    Literal(Literal),
    Function(Rc<Function>),
}

/// Shared storage for literals and finished functions
#[derive(Debug, Default)]
pub struct LiteralPool {
    entries: Vec<PoolEntry>,
    first_of: [Option<u32>; LiteralKind::COUNT],
}

impl LiteralPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the literal holding `value`, creating it if none exists yet
    pub fn get(&mut self, value: LiteralValue) -> LiteralId {
        let kind = value.kind();
        let mut iter = self.first_of[kind.slot()];
        let mut tail = None;

        while let Some(index) = iter {
            let Some(literal) = self.literal(LiteralId(index)) else {
                break;
            };
            if literal.value.same_as(&value) {
                return LiteralId(index);
            }
            tail = Some(index);
            iter = literal.next_index;
        }

        let index = self.entries.len() as u32;
        match tail {
            Some(tail) => {
                if let Some(PoolEntry::Literal(last)) = self.entries.get_mut(tail as usize) {
                    last.next_index = Some(index);
                }
            }
            None => self.first_of[kind.slot()] = Some(index),
        }

        tracing::trace!(index, ?kind, "new literal");
        self.entries.push(PoolEntry::Literal(Literal {
            value,
            reg_spot: index,
            next_index: None,
        }));
        LiteralId(index)
    }

    /// Append a finished function. Functions are never deduplicated.
    pub fn push_function(&mut self, function: Rc<Function>) -> LiteralId {
        let index = self.entries.len() as u32;
        self.entries.push(PoolEntry::Function(function));
        LiteralId(index)
    }

    /// The literal stored at `id`, if that entry is a literal
    #[must_use]
    pub fn literal(&self, id: LiteralId) -> Option<&Literal> {
        match self.entries.get(id.0 as usize)? {
            PoolEntry::Literal(literal) => Some(literal),
            PoolEntry::Function(_) => None,
        }
    }

    /// The function stored at `id`, if that entry is a function
    #[must_use]
    pub fn function(&self, id: LiteralId) -> Option<&Rc<Function>> {
        match self.entries.get(id.0 as usize)? {
            PoolEntry::Function(function) => Some(function),
            PoolEntry::Literal(_) => None,
        }
    }

    /// All entries in insertion order
    #[must_use]
    pub fn entries(&self) -> &[PoolEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Literals of one kind, following the same-kind links
    pub fn iter_kind(&self, kind: LiteralKind) -> impl Iterator<Item = &Literal> + '_ {
        std::iter::successors(
            self.first_of[kind.slot()].and_then(|i| self.literal(LiteralId(i))),
            |literal| literal.next_index.and_then(|i| self.literal(LiteralId(i))),
        )
    }

    /// Drop every entry, newest first, returning how many were released
    pub(crate) fn release(&mut self) -> usize {
        let count = self.entries.len();
        while self.entries.pop().is_some() {}
        self.first_of = [None; LiteralKind::COUNT];
        count
    }
}
