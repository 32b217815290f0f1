//! Threshold-triggered collector for values that can form cycles
//!
//! Plain values are freed by `Rc` as soon as their last owner goes away. Only
//! instances and lists can keep themselves alive through a cycle, so only
//! those are tagged. The collector keeps one entry per tagged value:
//!
//! 1. Tagging a value checks the live entry count against the threshold and
//!    sweeps first if it has been reached
//! 2. Marking walks every root and stamps reachable entries with the pass
//! 3. Every live entry not stamped with the pass is unreachable; its contents
//!    are cleared, which breaks any cycle through it, and the entry goes to
//!    the spare list for reuse
//! 4. A sweep that frees nothing raises the threshold by the multiplier

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use crate::config::RuntimeConfig;
use crate::value::{Instance, Value};

/// A tagged value, held weakly so tracking never keeps it alive
#[derive(Debug, Clone)]
enum Tracked {
    Instance(Weak<RefCell<Instance>>),
    List(Weak<RefCell<Vec<Value>>>),
}

impl Tracked {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Instance(rc) => Some(Tracked::Instance(Rc::downgrade(rc))),
            Value::List(rc) => Some(Tracked::List(Rc::downgrade(rc))),
            _ => None,
        }
    }

    fn ptr(&self) -> usize {
        match self {
            Tracked::Instance(weak) => weak.as_ptr() as usize,
            Tracked::List(weak) => weak.as_ptr() as usize,
        }
    }

    /// Clear the value's contents so references it holds are dropped
    fn break_cycle(&self) {
        match self {
            Tracked::Instance(weak) => {
                if let Some(rc) = weak.upgrade() {
                    let fields = std::mem::take(&mut rc.borrow_mut().fields);
                    drop(fields);
                }
            }
            Tracked::List(weak) => {
                if let Some(rc) = weak.upgrade() {
                    let items = std::mem::take(&mut *rc.borrow_mut());
                    drop(items);
                }
            }
        }
    }
}

/// Identity of a container value, if it is one
fn container_ptr(value: &Value) -> Option<usize> {
    match value {
        Value::Instance(rc) => Some(Rc::as_ptr(rc) as usize),
        Value::List(rc) => Some(Rc::as_ptr(rc) as usize),
        _ => None,
    }
}

#[derive(Debug)]
struct GcEntry {
    value: Option<Tracked>,

    /// Pass number of the last sweep that reached this value
    last_pass: u32,
}

/// Collector counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GcStats {
    /// Sweeps run so far
    pub sweeps: u32,
    /// Entries freed across all sweeps
    pub freed: usize,
    /// Entries currently tracking a value
    pub live: usize,
    /// Entry records waiting for reuse
    pub spare: usize,
    /// Live count that triggers the next sweep
    pub threshold: usize,
}

/// The cycle collector
#[derive(Debug)]
pub struct Collector {
    entries: Vec<GcEntry>,

    /// Indexes of entries tracking a value
    live: Vec<usize>,

    /// Indexes of entries available for reuse
    spare: Vec<usize>,

    /// Tracked value identity to entry index
    by_ptr: HashMap<usize, usize>,

    pass: u32,
    threshold: usize,
    multiplier: usize,

    sweeps: u32,
    freed: usize,
}

impl Collector {
    /// Create a collector that first sweeps at `threshold` live entries
    #[must_use]
    pub fn new(threshold: usize, multiplier: usize) -> Self {
        Self {
            entries: Vec::new(),
            live: Vec::new(),
            spare: Vec::new(),
            by_ptr: HashMap::new(),
            pass: 0,
            threshold: threshold.max(1),
            multiplier: multiplier.max(2),
            sweeps: 0,
            freed: 0,
        }
    }

    #[must_use]
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(config.gc_start as usize, config.gc_multiplier as usize)
    }

    /// True once the live count has reached the threshold
    #[must_use]
    pub fn should_sweep(&self) -> bool {
        self.live.len() >= self.threshold
    }

    /// Start tracking `value`. Returns false if the value cannot cycle or is
    /// already tracked.
    pub fn track(&mut self, value: &Value) -> bool {
        let Some(tracked) = Tracked::from_value(value) else {
            return false;
        };

        let ptr = tracked.ptr();
        if self.by_ptr.contains_key(&ptr) {
            return false;
        }

        let index = match self.spare.pop() {
            Some(index) => {
                let entry = &mut self.entries[index];
                entry.value = Some(tracked);
                entry.last_pass = self.pass;
                index
            }
            None => {
                self.entries.push(GcEntry {
                    value: Some(tracked),
                    last_pass: self.pass,
                });
                self.entries.len() - 1
            }
        };

        self.live.push(index);
        self.by_ptr.insert(ptr, index);
        true
    }

    /// Mark everything reachable from `roots`, then free every other tracked
    /// value. Returns the number of entries freed.
    pub fn sweep<'a>(&mut self, roots: impl IntoIterator<Item = &'a Value>) -> usize {
        self.pass = self.pass.wrapping_add(1);
        self.sweeps += 1;

        let mut visited = HashSet::new();
        for root in roots {
            self.mark(root, &mut visited);
        }

        let pass = self.pass;
        let (kept, dead): (Vec<usize>, Vec<usize>) = self
            .live
            .iter()
            .copied()
            .partition(|index| self.entries[*index].last_pass == pass);

        for index in &dead {
            let entry = &mut self.entries[*index];
            if let Some(tracked) = entry.value.take() {
                self.by_ptr.remove(&tracked.ptr());
                tracked.break_cycle();
            }
            self.spare.push(*index);
        }

        self.live = kept;
        let freed = dead.len();
        self.freed += freed;

        if freed == 0 {
            self.threshold = self.threshold.saturating_mul(self.multiplier);
        }

        tracing::debug!(
            pass,
            freed,
            live = self.live.len(),
            threshold = self.threshold,
            "gc sweep"
        );
        freed
    }

    fn mark(&mut self, value: &Value, visited: &mut HashSet<usize>) {
        let Some(ptr) = container_ptr(value) else {
            return;
        };
        if !visited.insert(ptr) {
            return;
        }

        if let Some(index) = self.by_ptr.get(&ptr) {
            self.entries[*index].last_pass = self.pass;
        }

        match value {
            Value::Instance(rc) => {
                for field in &rc.borrow().fields {
                    self.mark(field, visited);
                }
            }
            Value::List(rc) => {
                for item in rc.borrow().iter() {
                    self.mark(item, visited);
                }
            }
            _ => {}
        }
    }

    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn stats(&self) -> GcStats {
        GcStats {
            sweeps: self.sweeps,
            freed: self.freed,
            live: self.live.len(),
            spare: self.spare.len(),
            threshold: self.threshold,
        }
    }
}
