//! Pool of generic parameter classes (`A`, `B`, ...)

use super::ClassHandle;

/// Single-letter names are reserved for generics and resolve here instead
/// of through module class chains.
#[derive(Debug, Clone, Default)]
pub struct GenericPool {
    classes: Vec<ClassHandle>,
}

impl GenericPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the generic class named `name` (`"A"` is position 0)
    #[must_use]
    pub fn find(&self, name: &str) -> Option<ClassHandle> {
        match name.as_bytes() {
            [letter @ b'A'..=b'Z'] => self.classes.get(usize::from(letter - b'A')).copied(),
            _ => None,
        }
    }

    /// Generic class at position `pos`
    #[must_use]
    pub fn get(&self, pos: usize) -> Option<ClassHandle> {
        self.classes.get(pos).copied()
    }

    /// Number of generics created so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub(crate) fn push(&mut self, class: ClassHandle) {
        self.classes.push(class);
    }
}

/// Most generics a class can declare
pub const MAX_GENERICS: usize = 26;
