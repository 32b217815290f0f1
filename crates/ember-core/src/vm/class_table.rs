//! Dense runtime class table, indexed by class id

use super::VmState;
use crate::symtab::{ClassHandle, SymbolTable};

/// The parts of a class the VM needs while running
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeClass {
    pub id: u32,
    pub name: String,

    /// Superclass id, or the enum's id for a variant
    pub parent_id: Option<u32>,

    /// Fields an instance holds, including inherited ones
    pub prop_count: u16,

    pub is_enum: bool,

    /// Variant names in declaration order, for enums
    pub variant_names: Vec<String>,
}

impl RuntimeClass {
    /// Snapshot `class` from the symbol table
    #[must_use]
    pub fn from_symtab(symtab: &SymbolTable, class: ClassHandle) -> Self {
        let source = symtab.class(class);
        Self {
            id: source.id,
            name: source.name.clone(),
            parent_id: source.parent.map(|parent| symtab.class(parent).id),
            prop_count: source.prop_count,
            is_enum: source.is_enum(),
            variant_names: source
                .variants()
                .iter()
                .map(|variant| symtab.class(*variant).name.clone())
                .collect(),
        }
    }
}

impl VmState {
    /// Fill the class table from every module reachable from the builtin
    /// module.
    ///
    /// Variants have no slot of their own. They all carry id 0 and are
    /// described by their enum's entry. The Integer class is written last
    /// so its slot holds it whatever else was registered.
    pub fn register_classes(&mut self, symtab: &SymbolTable) {
        self.ensure_class_table(symtab.next_class_id() as usize + 1);

        let mut count = 0;
        for module in symtab.loaded_modules() {
            for handle in symtab.classes_in(module) {
                if symtab.class(handle).is_variant() {
                    continue;
                }
                self.add_class_unchecked(RuntimeClass::from_symtab(symtab, handle));
                count += 1;
            }
        }

        if let Some(integer) = symtab.integer_class() {
            self.add_class_unchecked(RuntimeClass::from_symtab(symtab, integer));
        }

        tracing::debug!(count, size = self.class_table.len(), "classes registered");
    }

    /// Grow the class table to hold at least `size` slots
    pub fn ensure_class_table(&mut self, size: usize) {
        if self.class_table.len() < size {
            self.class_table.resize(size, None);
        }
    }

    /// Insert a class loaded after startup, growing the table if needed
    pub fn add_class(&mut self, class: RuntimeClass) {
        self.ensure_class_table(class.id as usize + 1);
        self.add_class_unchecked(class);
    }

    /// Insert a class into a table already sized for it
    ///
    /// # Panics
    /// Panics if the table has no slot for the class id.
    pub fn add_class_unchecked(&mut self, class: RuntimeClass) {
        let id = class.id as usize;
        self.class_table[id] = Some(class);
    }

    #[must_use]
    pub fn class(&self, id: u32) -> Option<&RuntimeClass> {
        self.class_table.get(id as usize)?.as_ref()
    }

    #[must_use]
    pub fn class_table_len(&self) -> usize {
        self.class_table.len()
    }

    /// True if `class_id` is `ancestor_id` or inherits from it
    pub(crate) fn class_inherits(&self, class_id: u32, ancestor_id: u32) -> bool {
        let mut iter = Some(class_id);
        while let Some(id) = iter {
            if id == ancestor_id {
                return true;
            }
            iter = self.class(id).and_then(|class| class.parent_id);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::symtab::GenericPool;

    #[test]
    fn test_register_classes_by_id() {
        let mut symtab = SymbolTable::new(GenericPool::new());
        let builtin = symtab.new_module("builtin", "[builtin]");
        symtab.set_builtin(builtin);
        let integer = symtab.new_class("Integer");
        symtab.set_integer_class(integer);

        let main = symtab.new_module("main", "main.ember");
        symtab.set_active_module(main);
        let shape = symtab.new_class("Shape");
        let dir = symtab.new_enum_class("Dir");
        symtab.new_variant_class(dir, "Up");
        symtab.new_variant_class(dir, "Down");
        symtab.finish_enum(dir, true, None);
        let square = symtab.new_class("Square");
        symtab.set_parent(square, shape);

        let mut vm = VmState::new(RuntimeConfig::default());
        vm.register_classes(&symtab);

        assert_eq!(vm.class_table_len(), symtab.next_class_id() as usize + 1);
        let integer_id = symtab.class(integer).id;
        assert_eq!(vm.class(integer_id).unwrap().name, "Integer");

        let dir_class = vm.class(symtab.class(dir).id).unwrap();
        assert!(dir_class.is_enum);
        assert_eq!(dir_class.variant_names, vec!["Up", "Down"]);

        let square_id = symtab.class(square).id;
        let shape_id = symtab.class(shape).id;
        assert_eq!(vm.class(square_id).unwrap().parent_id, Some(shape_id));
        assert!(vm.class_inherits(square_id, shape_id));
        assert!(!vm.class_inherits(shape_id, square_id));
    }

    #[test]
    fn test_variants_take_no_slot() {
        let mut symtab = SymbolTable::new(GenericPool::new());
        let builtin = symtab.new_module("builtin", "[builtin]");
        symtab.set_builtin(builtin);
        let color = symtab.new_enum_class("Color");
        let red = symtab.new_variant_class(color, "Red");
        symtab.new_variant_class(color, "Blue");
        symtab.finish_enum(color, false, None);
        let shade = symtab.new_enum_class("Shade");
        symtab.new_variant_class(shade, "Dark");
        symtab.finish_enum(shade, true, None);

        let mut vm = VmState::new(RuntimeConfig::default());
        vm.register_classes(&symtab);

        assert_eq!(symtab.class(red).id, 0);
        assert!(vm.class(0).is_none());
        assert_eq!(
            vm.class(symtab.class(color).id).unwrap().variant_names,
            vec!["Red", "Blue"]
        );
        assert_eq!(
            vm.class(symtab.class(shade).id).unwrap().variant_names,
            vec!["Dark"]
        );
    }

    #[test]
    fn test_add_class_grows_table() {
        let mut vm = VmState::new(RuntimeConfig::default());
        vm.add_class(RuntimeClass {
            id: 12,
            name: "Late".to_string(),
            parent_id: None,
            prop_count: 0,
            is_enum: false,
            variant_names: Vec::new(),
        });

        assert_eq!(vm.class_table_len(), 13);
        assert_eq!(vm.class(12).unwrap().name, "Late");
        assert!(vm.class(3).is_none());
    }
}
