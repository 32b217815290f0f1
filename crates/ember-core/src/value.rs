//! Runtime values held in VM registers
//!
//! Primitive values are owned and dropped deterministically. Instances and
//! lists live behind `Rc<RefCell<_>>` and can form cycles, so they are the
//! values the collector tracks.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::function::Function;
use crate::symtab::LiteralValue;

/// A value stored in a register
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Unit,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(Rc<str>),
    ByteString(Rc<[u8]>),
    Function(Rc<Function>),
    Instance(Rc<RefCell<Instance>>),
    List(Rc<RefCell<Vec<Value>>>),
}

/// An object of a user class, or an enum variant carrying a payload
#[derive(Debug, Clone)]
pub struct Instance {
    /// Id of the class the instance was built as
    pub class_id: u32,
    pub fields: Vec<Value>,
}

impl Instance {
    #[must_use]
    pub fn new(class_id: u32, field_count: usize) -> Self {
        Self {
            class_id,
            fields: vec![Value::Unit; field_count],
        }
    }
}

impl Value {
    /// Wrap `instance` so it can be stored in a register
    #[must_use]
    pub fn instance(instance: Instance) -> Self {
        Value::Instance(Rc::new(RefCell::new(instance)))
    }

    #[must_use]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    /// Runtime form of a pooled literal
    #[must_use]
    pub fn from_literal(literal: &LiteralValue) -> Self {
        match literal {
            LiteralValue::Integer(i) => Value::Integer(*i),
            LiteralValue::Double(d) => Value::Double(*d),
            LiteralValue::String(s) => Value::String(Rc::from(s.as_str())),
            LiteralValue::ByteString(b) => Value::ByteString(Rc::from(b.as_slice())),
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "Unit",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Double(_) => "Double",
            Value::String(_) => "String",
            Value::ByteString(_) => "ByteString",
            Value::Function(_) => "Function",
            Value::Instance(_) => "Instance",
            Value::List(_) => "List",
        }
    }

    /// True for values that can hold references back to themselves
    #[must_use]
    pub fn can_cycle(&self) -> bool {
        matches!(self, Value::Instance(_) | Value::List(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "unit"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::String(s) => write!(f, "{s}"),
            Value::ByteString(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            Value::Function(func) => write!(f, "<function {}>", func.qualified_name()),
            Value::Instance(inst) => write!(f, "<instance of class#{}>", inst.borrow().class_id),
            Value::List(items) => write!(f, "<list of {}>", items.borrow().len()),
        }
    }
}
