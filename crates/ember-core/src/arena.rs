//! Generational arena used as the single allocation funnel of the symbol table
//!
//! Classes, vars, and properties are never referenced by pointer. Each lives in
//! an [`Arena`] slot and is addressed through a [`Handle`] that carries the
//! slot's generation, so a handle to a freed node can never resolve to the
//! node that later reuses the slot.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A typed reference to a node stored in an [`Arena`]
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Slot index inside the owning arena
    #[must_use]
    pub fn index(self) -> u32 {
        self.index
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot storage with free-slot recycling
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    /// Create an empty arena
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Store a value and return its handle
    pub fn alloc(&mut self, value: T) -> Handle<T> {
        self.alloc_with(|_| value)
    }

    /// Store a value built from the handle it is about to receive
    pub fn alloc_with(&mut self, build: impl FnOnce(Handle<T>) -> T) -> Handle<T> {
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            let handle = Handle::new(index, slot.generation);
            slot.value = Some(build(handle));
            return handle;
        }

        let index = self.slots.len() as u32;
        let handle = Handle::new(index, 0);
        self.slots.push(Slot {
            generation: 0,
            value: Some(build(handle)),
        });
        handle
    }

    /// Release the value behind `handle`, returning it if it was still live
    pub fn free(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }

        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
        Some(value)
    }

    #[must_use]
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    /// Returns true if `handle` still refers to a live value
    #[must_use]
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live values
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live
    }
}

impl<T> std::ops::Index<Handle<T>> for Arena<T> {
    type Output = T;

    fn index(&self, handle: Handle<T>) -> &T {
        match self.get(handle) {
            Some(value) => value,
            None => panic!("stale arena handle {handle:?}"),
        }
    }
}

impl<T> std::ops::IndexMut<Handle<T>> for Arena<T> {
    fn index_mut(&mut self, handle: Handle<T>) -> &mut T {
        match self.get_mut(handle) {
            Some(value) => value,
            None => panic!("stale arena handle {handle:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_get() {
        let mut arena = Arena::new();
        let a = arena.alloc("a");
        let b = arena.alloc("b");

        assert_eq!(arena[a], "a");
        assert_eq!(arena[b], "b");
        assert_eq!(arena.live_count(), 2);
    }

    #[test]
    fn test_free_invalidates_handle() {
        let mut arena = Arena::new();
        let a = arena.alloc(1);
        assert_eq!(arena.free(a), Some(1));
        assert!(!arena.contains(a));
        assert_eq!(arena.free(a), None);
        assert_eq!(arena.live_count(), 0);
    }

    #[test]
    fn test_reused_slot_does_not_alias() {
        let mut arena = Arena::new();
        let old = arena.alloc(1);
        arena.free(old);

        let new = arena.alloc(2);
        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert!(arena.get(old).is_none());
        assert_eq!(arena[new], 2);
    }

    #[test]
    fn test_alloc_with_sees_own_handle() {
        struct Node {
            me: Handle<Node>,
        }

        let mut arena = Arena::new();
        let first = arena.alloc_with(|me| Node { me });
        let second = arena.alloc_with(|me| Node { me });
        assert_eq!(arena[first].me, first);
        assert_eq!(arena[second].me, second);
    }
}
