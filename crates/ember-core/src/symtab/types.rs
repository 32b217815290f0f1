//! Type references held by vars, properties, and classes

use super::ClassHandle;

/// A class applied to zero or more subtypes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    pub class: ClassHandle,
    pub subtypes: Vec<Type>,
}

impl Type {
    /// The plain type of `class`, without subtypes
    #[must_use]
    pub fn of(class: ClassHandle) -> Self {
        Self {
            class,
            subtypes: Vec::new(),
        }
    }

    /// `class` applied to `subtypes`
    #[must_use]
    pub fn with_subtypes(class: ClassHandle, subtypes: Vec<Type>) -> Self {
        Self { class, subtypes }
    }
}
