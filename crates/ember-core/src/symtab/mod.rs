//! Symbol table: classes, vars, literals, and modules owned during compilation
//!
//! The table keeps every class, var, and property in an [`Arena`]. Modules
//! hold the head of a class chain and a var chain; each node links to the one
//! declared before it, so walking a chain from its head visits the most recent
//! declaration first. That ordering is what makes shadowing work, and what lets
//! [`SymbolTable::rewind`] cut a chain back to a checkpoint handle.

mod class;
mod generic;
mod literal;
mod module;
mod types;
mod var;

use std::rc::Rc;

use crate::arena::{Arena, Handle};
use crate::function::Function;
use crate::keyword::shorthash;

pub use class::{Class, ClassFlags, ClassKind, Member, Property};
pub use generic::{GenericPool, MAX_GENERICS};
pub use literal::{Literal, LiteralId, LiteralKind, LiteralPool, LiteralValue, PoolEntry};
pub use module::{Module, ModuleId, ModuleLink};
pub use types::Type;
pub use var::Var;

pub type ClassHandle = Handle<Class>;
pub type VarHandle = Handle<Var>;
pub type PropertyHandle = Handle<Property>;

/// What [`SymbolTable::teardown`] released
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeardownStats {
    pub literals: usize,
    pub hidden_classes: usize,
    pub hidden_vars: usize,
    pub old_classes: usize,
    pub old_functions: usize,
    pub main_function: bool,
    pub module_classes: usize,
    pub module_vars: usize,
}

/// Owner of every compile-time symbol
pub struct SymbolTable {
    pub(crate) classes: Arena<Class>,
    pub(crate) vars: Arena<Var>,
    pub(crate) properties: Arena<Property>,
    pub(crate) modules: Vec<Module>,
    pub(crate) literals: LiteralPool,
    pub(crate) generics: GenericPool,

    pub(crate) builtin_module: Option<ModuleId>,
    pub(crate) active_module: Option<ModuleId>,
    pub(crate) last_module: Option<ModuleId>,

    pub(crate) next_class_id: u32,
    pub(crate) integer_class: Option<ClassHandle>,

    /// Classes kept alive for teardown after a hiding rewind
    hidden_class_chain: Option<ClassHandle>,
    hidden_var_chain: Option<VarHandle>,

    /// Symbols of discarded modules
    old_class_chain: Option<ClassHandle>,
    old_function_chain: Option<VarHandle>,

    main_function: Option<Rc<Function>>,

    /// Line stamped onto new vars
    line_num: u32,
}

impl SymbolTable {
    /// Create an empty table. Class ids start at 1.
    #[must_use]
    pub fn new(generics: GenericPool) -> Self {
        Self {
            classes: Arena::new(),
            vars: Arena::new(),
            properties: Arena::new(),
            modules: Vec::new(),
            literals: LiteralPool::new(),
            generics,
            builtin_module: None,
            active_module: None,
            last_module: None,
            next_class_id: 1,
            integer_class: None,
            hidden_class_chain: None,
            hidden_var_chain: None,
            old_class_chain: None,
            old_function_chain: None,
            main_function: None,
            line_num: 0,
        }
    }

    /// The module receiving new declarations.
    ///
    /// # Panics
    /// Panics if no module has been made active yet.
    pub(crate) fn active(&self) -> ModuleId {
        match self.active_module {
            Some(module) => module,
            None => panic!("symbol table has no active module"),
        }
    }

    /// Set the source line stamped onto vars created from now on
    pub fn set_line_num(&mut self, line_num: u32) {
        self.line_num = line_num;
    }

    #[must_use]
    pub fn line_num(&self) -> u32 {
        self.line_num
    }

    // Lookup by handle

    /// # Panics
    /// Panics if the class has been freed.
    #[must_use]
    pub fn class(&self, handle: ClassHandle) -> &Class {
        &self.classes[handle]
    }

    /// # Panics
    /// Panics if the var has been freed.
    #[must_use]
    pub fn var(&self, handle: VarHandle) -> &Var {
        &self.vars[handle]
    }

    pub fn var_mut(&mut self, handle: VarHandle) -> &mut Var {
        &mut self.vars[handle]
    }

    /// # Panics
    /// Panics if the property has been freed.
    #[must_use]
    pub fn property(&self, handle: PropertyHandle) -> &Property {
        &self.properties[handle]
    }

    #[must_use]
    pub fn contains_class(&self, handle: ClassHandle) -> bool {
        self.classes.contains(handle)
    }

    #[must_use]
    pub fn contains_var(&self, handle: VarHandle) -> bool {
        self.vars.contains(handle)
    }

    /// Live classes, including generics and variants
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.live_count()
    }

    #[must_use]
    pub fn var_count(&self) -> usize {
        self.vars.live_count()
    }

    #[must_use]
    pub fn property_count(&self) -> usize {
        self.properties.live_count()
    }

    #[must_use]
    pub fn generics(&self) -> &GenericPool {
        &self.generics
    }

    // Vars

    /// Declare a var in the active module
    pub fn new_var(&mut self, ty: Type, name: &str) -> VarHandle {
        let module = self.active();
        let next = self.module(module).var_chain;
        let var = self.alloc_var(ty, name, next);
        self.module_mut(module).var_chain = Some(var);
        var
    }

    /// Create a var that no module chain holds, such as a parameter
    pub fn new_unlinked_var(&mut self, ty: Type, name: &str) -> VarHandle {
        self.alloc_var(ty, name, None)
    }

    fn alloc_var(&mut self, ty: Type, name: &str, next: Option<VarHandle>) -> VarHandle {
        self.vars.alloc(Var {
            name: name.to_string(),
            shorthash: shorthash(name),
            ty,
            line_num: self.line_num,
            out_of_scope: false,
            parent: None,
            next,
        })
    }

    /// Take `var` out of `module`'s var chain, keeping it allocated
    pub(crate) fn unlink_var(&mut self, module: ModuleId, var: VarHandle) {
        let after = self.vars.get(var).and_then(|v| v.next);
        let head = self.module(module).var_chain;

        if head == Some(var) {
            self.module_mut(module).var_chain = after;
            return;
        }

        let mut iter = head;
        while let Some(handle) = iter {
            let node = &mut self.vars[handle];
            if node.next == Some(var) {
                node.next = after;
                return;
            }
            iter = node.next;
        }
    }

    /// Find a var by name.
    ///
    /// With a module, only that module's var chain is searched. Without one,
    /// the builtin module is searched and then the active module.
    #[must_use]
    pub fn find_var(&self, module: Option<ModuleId>, name: &str) -> Option<VarHandle> {
        let hash = shorthash(name);

        match module {
            Some(module) => self.find_var_in(self.module(module).var_chain, name, hash),
            None => self
                .builtin_module
                .and_then(|m| self.find_var_in(self.module(m).var_chain, name, hash))
                .or_else(|| {
                    self.active_module
                        .and_then(|m| self.find_var_in(self.module(m).var_chain, name, hash))
                }),
        }
    }

    fn find_var_in(&self, head: Option<VarHandle>, name: &str, hash: u64) -> Option<VarHandle> {
        self.var_chain_from(head)
            .find(|handle| self.vars[*handle].matches(name, hash))
    }

    /// Vars of `module`, most recent first, including out-of-scope ones
    pub fn vars_in(&self, module: ModuleId) -> impl Iterator<Item = VarHandle> + '_ {
        self.var_chain_from(self.module(module).var_chain)
    }

    fn var_chain_from(&self, head: Option<VarHandle>) -> impl Iterator<Item = VarHandle> + '_ {
        std::iter::successors(head, |handle| self.vars.get(*handle).and_then(|var| var.next))
    }

    /// Vars hidden by a rewind, most recent first
    pub fn hidden_vars(&self) -> impl Iterator<Item = VarHandle> + '_ {
        self.var_chain_from(self.hidden_var_chain)
    }

    /// Classes hidden by a rewind or module hide, most recent first
    pub fn hidden_classes(&self) -> impl Iterator<Item = ClassHandle> + '_ {
        self.class_chain_from(self.hidden_class_chain)
    }

    /// Flag every var declared after `stop` in the active module as out of
    /// scope. The vars stay linked.
    pub fn hide_block_vars(&mut self, stop: Option<VarHandle>) {
        let module = self.active();
        let block: Vec<_> = self
            .vars_in(module)
            .take_while(|handle| Some(*handle) != stop)
            .collect();

        for handle in block {
            self.vars[handle].out_of_scope = true;
        }
    }

    // Literals and functions

    /// Intern `value`, returning the existing literal if an equal one exists
    pub fn get_literal(&mut self, value: LiteralValue) -> LiteralId {
        self.literals.get(value)
    }

    pub fn get_integer_literal(&mut self, value: i64) -> LiteralId {
        self.literals.get(LiteralValue::Integer(value))
    }

    pub fn get_double_literal(&mut self, value: f64) -> LiteralId {
        self.literals.get(LiteralValue::Double(value))
    }

    pub fn get_string_literal(&mut self, value: &str) -> LiteralId {
        self.literals.get(LiteralValue::String(value.to_string()))
    }

    pub fn get_bytestring_literal(&mut self, value: &[u8]) -> LiteralId {
        self.literals.get(LiteralValue::ByteString(value.to_vec()))
    }

    #[must_use]
    pub fn literals(&self) -> &LiteralPool {
        &self.literals
    }

    /// Store the body of the function declared by `var`, tagged with the
    /// active module and the var's line
    pub fn store_function(&mut self, var: VarHandle, mut function: Function) -> LiteralId {
        function.module = Some(self.active());
        function.line_num = self.vars[var].line_num;
        self.literals.push_function(Rc::new(function))
    }

    /// Store a host-provided function under the builtin module
    pub fn store_builtin(&mut self, mut function: Function) -> LiteralId {
        function.module = self.builtin_module;
        self.literals.push_function(Rc::new(function))
    }

    /// Set the toplevel function that boots the interpreter
    pub fn set_main_function(&mut self, function: Function) -> Rc<Function> {
        let function = Rc::new(function);
        self.main_function = Some(Rc::clone(&function));
        function
    }

    #[must_use]
    pub fn main_function(&self) -> Option<&Rc<Function>> {
        self.main_function.as_ref()
    }

    // Rewind and teardown

    /// Restore `main_module` to the checkpoint `(stop_class, stop_var)` and
    /// make it active again.
    ///
    /// Symbols declared after the checkpoint are either hidden (kept alive
    /// until teardown but unreachable by lookup) or freed.
    pub fn rewind(
        &mut self,
        main_module: ModuleId,
        stop_class: Option<ClassHandle>,
        stop_var: Option<VarHandle>,
        hide: bool,
    ) {
        self.active_module = Some(main_module);

        let vars: Vec<_> = self
            .vars_in(main_module)
            .take_while(|handle| Some(*handle) != stop_var)
            .collect();
        let classes: Vec<_> = self
            .classes_in(main_module)
            .take_while(|handle| Some(*handle) != stop_class)
            .collect();

        tracing::debug!(
            module = %main_module,
            vars = vars.len(),
            classes = classes.len(),
            hide,
            "rewind"
        );

        if hide {
            for handle in &vars {
                self.vars[*handle].out_of_scope = true;
            }
            self.hidden_var_chain = self.splice_vars(&vars, self.hidden_var_chain);
            self.hidden_class_chain = self.splice_classes(&classes, self.hidden_class_chain);
        } else {
            for handle in vars {
                self.vars.free(handle);
            }
            for handle in classes {
                self.free_class(handle);
            }
        }

        let module = self.module_mut(main_module);
        module.var_chain = stop_var;
        module.class_chain = stop_class;
    }

    /// Hide every class of `module` and free its vars
    pub fn hide_module_symbols(&mut self, module: ModuleId) {
        let classes: Vec<_> = self.classes_in(module).collect();
        self.hidden_class_chain = self.splice_classes(&classes, self.hidden_class_chain);
        self.free_vars_of(module);
        self.module_mut(module).class_chain = None;
    }

    /// Free every class and var of `module`
    pub fn free_module_symbols(&mut self, module: ModuleId) {
        let classes: Vec<_> = self.classes_in(module).collect();
        for handle in classes {
            self.free_class(handle);
        }
        self.free_vars_of(module);
        self.module_mut(module).class_chain = None;
    }

    /// Move the symbols of `module` onto the discarded chains, which are
    /// released at teardown
    pub fn discard_module_symbols(&mut self, module: ModuleId) {
        let classes: Vec<_> = self.classes_in(module).collect();
        let vars: Vec<_> = self.vars_in(module).collect();
        self.old_class_chain = self.splice_classes(&classes, self.old_class_chain);
        self.old_function_chain = self.splice_vars(&vars, self.old_function_chain);

        let module = self.module_mut(module);
        module.class_chain = None;
        module.var_chain = None;
    }

    fn free_vars_of(&mut self, module: ModuleId) {
        let vars: Vec<_> = self.vars_in(module).collect();
        for handle in vars {
            self.vars.free(handle);
        }
        self.module_mut(module).var_chain = None;
    }

    /// Link the already-chained `segment` in front of `onto`, returning the
    /// new head
    fn splice_classes(
        &mut self,
        segment: &[ClassHandle],
        onto: Option<ClassHandle>,
    ) -> Option<ClassHandle> {
        let (Some(first), Some(last)) = (segment.first(), segment.last()) else {
            return onto;
        };
        self.classes[*last].next = onto;
        Some(*first)
    }

    fn splice_vars(&mut self, segment: &[VarHandle], onto: Option<VarHandle>) -> Option<VarHandle> {
        let (Some(first), Some(last)) = (segment.first(), segment.last()) else {
            return onto;
        };
        self.vars[*last].next = onto;
        Some(*first)
    }

    /// Free a class with its members, and the variants of a scoped enum.
    /// Returns the number of classes freed.
    fn free_class(&mut self, handle: ClassHandle) -> usize {
        let Some(class) = self.classes.free(handle) else {
            return 0;
        };

        for member in class.members {
            match member {
                Member::Method(var) => {
                    self.vars.free(var);
                }
                Member::Property(prop) => {
                    self.properties.free(prop);
                }
            }
        }

        let mut freed = 1;
        if class.kind == ClassKind::Enum && class.flags.enum_is_scoped {
            for variant in class.variants {
                freed += self.free_class(variant);
            }
        }
        freed
    }

    fn free_class_chain(&mut self, head: Option<ClassHandle>) -> usize {
        let chain: Vec<_> = self.class_chain_from(head).collect();
        chain.into_iter().map(|handle| self.free_class(handle)).sum()
    }

    fn free_var_chain(&mut self, head: Option<VarHandle>) -> usize {
        let chain: Vec<_> = self.var_chain_from(head).collect();
        chain
            .into_iter()
            .filter(|handle| self.vars.free(*handle).is_some())
            .count()
    }

    /// Release everything the table owns.
    ///
    /// The literal pool goes first, then hidden classes, discarded classes
    /// and functions, the main function, and finally what the modules still
    /// hold.
    pub fn teardown(mut self) -> TeardownStats {
        let mut stats = TeardownStats {
            literals: self.literals.release(),
            ..TeardownStats::default()
        };

        let hidden_classes = self.hidden_class_chain.take();
        stats.hidden_classes = self.free_class_chain(hidden_classes);
        let hidden_vars = self.hidden_var_chain.take();
        stats.hidden_vars = self.free_var_chain(hidden_vars);
        let old_classes = self.old_class_chain.take();
        stats.old_classes = self.free_class_chain(old_classes);
        let old_functions = self.old_function_chain.take();
        stats.old_functions = self.free_var_chain(old_functions);
        stats.main_function = self.main_function.take().is_some();

        for index in 0..self.modules.len() {
            let module = ModuleId(index as u32);
            let (classes, vars) = {
                let m = self.module_mut(module);
                (m.class_chain.take(), m.var_chain.take())
            };
            stats.module_classes += self.free_class_chain(classes);
            stats.module_vars += self.free_var_chain(vars);
        }

        tracing::debug!(?stats, "symbol table torn down");
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> (SymbolTable, ModuleId, Type) {
        let mut symtab = SymbolTable::new(GenericPool::new());
        let builtin = symtab.new_module("builtin", "[builtin]");
        symtab.set_builtin(builtin);
        let integer = symtab.new_class("Integer");
        symtab.set_integer_class(integer);

        let main = symtab.new_module("main", "main.ember");
        symtab.set_active_module(main);
        (symtab, main, Type::of(integer))
    }

    #[test]
    fn test_new_table_is_empty() {
        let symtab = SymbolTable::new(GenericPool::new());
        assert_eq!(symtab.next_class_id(), 1);
        assert!(symtab.literals().is_empty());
        assert!(symtab.active_module().is_none());
    }

    #[test]
    fn test_latest_var_shadows() {
        let (mut symtab, main, ty) = table();
        let first = symtab.new_var(ty.clone(), "x");
        let second = symtab.new_var(ty, "x");

        assert_eq!(symtab.find_var(Some(main), "x"), Some(second));
        assert_ne!(first, second);
    }

    #[test]
    fn test_builtin_searched_before_active() {
        let (mut symtab, main, ty) = table();
        let local = symtab.new_var(ty.clone(), "print");
        symtab.set_active_module(symtab.builtin_module().unwrap());
        let builtin = symtab.new_var(ty, "print");
        symtab.set_active_module(main);

        assert_eq!(symtab.find_var(None, "print"), Some(builtin));
        assert_eq!(symtab.find_var(Some(main), "print"), Some(local));
    }

    #[test]
    fn test_shared_prefix_names_stay_distinct() {
        let (mut symtab, _, ty) = table();
        let one = symtab.new_var(ty.clone(), "abcdefgh1");
        let two = symtab.new_var(ty, "abcdefgh2");

        assert_eq!(symtab.var(one).shorthash, symtab.var(two).shorthash);
        assert_eq!(symtab.find_var(None, "abcdefgh1"), Some(one));
        assert_eq!(symtab.find_var(None, "abcdefgh2"), Some(two));
        assert_eq!(symtab.find_var(None, "abcdefgh"), None);
    }

    #[test]
    fn test_hide_block_vars() {
        let (mut symtab, main, ty) = table();
        let outer = symtab.new_var(ty.clone(), "outer");
        let inner = symtab.new_var(ty.clone(), "inner");
        let other = symtab.new_var(ty, "other");

        symtab.hide_block_vars(Some(outer));

        assert_eq!(symtab.find_var(None, "outer"), Some(outer));
        assert_eq!(symtab.find_var(None, "inner"), None);
        assert_eq!(symtab.find_var(None, "other"), None);

        let chain: Vec<_> = symtab.vars_in(main).collect();
        assert_eq!(chain, vec![other, inner, outer]);
        assert!(symtab.var(inner).out_of_scope);
    }

    #[test]
    fn test_var_line_numbers() {
        let (mut symtab, _, ty) = table();
        symtab.set_line_num(12);
        let var = symtab.new_var(ty, "x");
        assert_eq!(symtab.var(var).line_num, 12);
    }

    #[test]
    fn test_rewind_free() {
        let (mut symtab, main, ty) = table();
        symtab.new_var(ty.clone(), "kept");
        symtab.new_class("Kept");
        let stop_var = symtab.module(main).var_chain();
        let stop_class = symtab.module(main).class_chain();
        let vars_before = symtab.var_count();
        let classes_before = symtab.class_count();

        let a = symtab.new_var(ty.clone(), "a");
        symtab.new_var(ty.clone(), "b");
        symtab.new_var(ty, "c");
        let shape = symtab.new_class("Shape");
        symtab.new_class("Point");

        symtab.rewind(main, stop_class, stop_var, false);

        assert_eq!(symtab.var_count(), vars_before);
        assert_eq!(symtab.class_count(), classes_before);
        assert!(!symtab.contains_var(a));
        assert!(!symtab.contains_class(shape));
        assert_eq!(symtab.module(main).var_chain(), stop_var);
        assert_eq!(symtab.module(main).class_chain(), stop_class);
        assert!(symtab.find_var(None, "kept").is_some());
    }

    #[test]
    fn test_rewind_hide() {
        let (mut symtab, main, ty) = table();
        let stop_var = symtab.module(main).var_chain();
        let stop_class = symtab.module(main).class_chain();
        let vars_before = symtab.var_count();

        let a = symtab.new_var(ty.clone(), "a");
        symtab.new_var(ty, "b");
        let shape = symtab.new_class("Shape");

        symtab.rewind(main, stop_class, stop_var, true);

        assert_eq!(symtab.var_count(), vars_before + 2);
        assert!(symtab.contains_class(shape));
        assert!(symtab.find_var(None, "a").is_none());
        assert!(symtab.find_class(None, "Shape").is_none());
        assert!(symtab.var(a).out_of_scope);
        assert_eq!(symtab.hidden_vars().count(), 2);
        assert_eq!(symtab.hidden_classes().collect::<Vec<_>>(), vec![shape]);
        assert_eq!(symtab.module(main).var_chain(), stop_var);
    }

    #[test]
    fn test_rewind_restores_active_module() {
        let (mut symtab, main, _) = table();
        let other = symtab.new_module("other", "other.ember");
        symtab.set_active_module(other);

        symtab.rewind(main, None, None, false);
        assert_eq!(symtab.active_module(), Some(main));
    }

    #[test]
    fn test_class_ids_are_dense() {
        let (mut symtab, _, _) = table();
        let start = symtab.next_class_id();
        let ids: Vec<_> = ["A1", "B1", "C1"]
            .iter()
            .map(|name| {
                let class = symtab.new_class(name);
                symtab.class(class).id
            })
            .collect();
        assert_eq!(ids, vec![start, start + 1, start + 2]);
    }

    #[test]
    fn test_enum_variants_in_declaration_order() {
        let (mut symtab, _, ty) = table();
        let color = symtab.new_enum_class("Color");
        let red = symtab.new_variant_class(color, "Red");
        let green = symtab.new_variant_class(color, "Green");
        let blue = symtab.new_variant_class(color, "Blue");
        let next_id = symtab.next_class_id();
        symtab.set_variant_payload(blue, ty);

        symtab.finish_enum(color, false, None);

        let class = symtab.class(color);
        assert_eq!(class.variants(), &[red, green, blue]);
        assert!(class.flags.valid_optarg);
        assert_eq!(symtab.class(red).id, 0);
        assert_eq!(symtab.class(blue).id, 0);
        assert_eq!(symtab.next_class_id(), next_id);
        assert_eq!(symtab.find_class(None, "Green"), Some(green));
    }

    #[test]
    fn test_enum_without_empty_variant_rejects_optarg() {
        let (mut symtab, _, ty) = table();
        let wrap = symtab.new_enum_class("Wrap");
        let one = symtab.new_variant_class(wrap, "One");
        symtab.set_variant_payload(one, ty);
        symtab.finish_enum(wrap, false, None);

        assert!(!symtab.class(wrap).flags.valid_optarg);
    }

    #[test]
    fn test_scoped_enum_hides_variants() {
        let (mut symtab, main, _) = table();
        let dir = symtab.new_enum_class("Dir");
        let north = symtab.new_variant_class(dir, "North");
        symtab.new_variant_class(dir, "South");
        symtab.finish_enum(dir, true, None);

        assert!(symtab.class(dir).is_scoped_enum());
        assert_eq!(symtab.find_class(None, "North"), None);
        assert_eq!(symtab.find_scoped_variant(dir, "North"), Some(north));
        assert_eq!(symtab.classes_in(main).next(), Some(dir));
    }

    #[test]
    fn test_freeing_scoped_enum_frees_variants() {
        let (mut symtab, main, _) = table();
        let stop = symtab.module(main).class_chain();
        let dir = symtab.new_enum_class("Dir");
        let north = symtab.new_variant_class(dir, "North");
        symtab.finish_enum(dir, true, None);

        symtab.rewind(main, stop, None, false);
        assert!(!symtab.contains_class(dir));
        assert!(!symtab.contains_class(north));
    }

    #[test]
    fn test_inherited_method_and_override() {
        let (mut symtab, main, ty) = table();
        let animal = symtab.new_class("Animal");
        let animal_speak = symtab.new_var(ty.clone(), "speak");
        symtab.add_class_method(animal, animal_speak);

        let dog = symtab.new_class("Dog");
        symtab.set_parent(dog, animal);
        assert_eq!(symtab.find_method(dog, "speak"), Some(animal_speak));

        let dog_speak = symtab.new_var(ty, "speak");
        symtab.add_class_method(dog, dog_speak);
        assert_eq!(symtab.find_method(dog, "speak"), Some(dog_speak));
        assert_eq!(symtab.find_method(animal, "speak"), Some(animal_speak));
        assert_eq!(symtab.var(animal_speak).parent, Some(animal));

        assert!(symtab.find_var(Some(main), "speak").is_none());
    }

    #[test]
    fn test_method_unlinked_from_middle_of_chain() {
        let (mut symtab, main, ty) = table();
        let point = symtab.new_class("Point");
        let first = symtab.new_var(ty.clone(), "first");
        let method = symtab.new_var(ty.clone(), "norm");
        let last = symtab.new_var(ty, "last");

        symtab.add_class_method(point, method);
        assert_eq!(symtab.vars_in(main).collect::<Vec<_>>(), vec![last, first]);
    }

    #[test]
    fn test_property_ids_continue_from_parent() {
        let (mut symtab, _, ty) = table();
        let base = symtab.new_class("Base");
        symtab.add_class_property(base, ty.clone(), "a", 0);
        symtab.add_class_property(base, ty.clone(), "b", 0);

        let child = symtab.new_class("Child");
        symtab.set_parent(child, base);
        let c = symtab.add_class_property(child, ty, "c", 0);

        assert_eq!(symtab.property(c).id, 2);
        assert_eq!(symtab.class(child).inherit_depth, 1);
        assert!(symtab.find_property(child, "a").is_some());
        assert!(symtab.find_method(child, "a").is_none());
    }

    #[test]
    fn test_single_letters_resolve_to_generics() {
        let (mut symtab, _, _) = table();
        let boxed = symtab.new_class("Box");
        symtab.set_generic_count(boxed, 2);

        let a = symtab.find_class(None, "A").unwrap();
        assert_eq!(symtab.class(a).kind, ClassKind::Generic);
        assert_eq!(symtab.class(boxed).self_type.subtypes.len(), 2);
        assert!(symtab.find_class(None, "C").is_none());
    }

    #[test]
    fn test_module_alias_rule() {
        let (mut symtab, main, _) = table();
        let math = symtab.new_module("math", "math.ember");
        let strings = symtab.new_module("strings", "strings.ember");
        symtab.add_module_link(main, math, None);
        symtab.add_module_link(main, strings, Some("s"));

        assert_eq!(symtab.find_module(None, "math"), Some(math));
        assert_eq!(symtab.find_module(None, "s"), Some(strings));
        assert_eq!(symtab.find_module(None, "strings"), None);
    }

    #[test]
    fn test_registered_module_lookup() {
        let (mut symtab, _, _) = table();
        let sys = symtab.new_module("sys", "[sys]");
        symtab.new_module("time", "time.ember");
        symtab.mark_registered(sys);

        assert_eq!(symtab.find_registered_module("sys"), Some(sys));
        assert_eq!(symtab.find_registered_module("time"), None);
    }

    #[test]
    fn test_store_function_tags_module_and_line() {
        let (mut symtab, main, ty) = table();
        symtab.set_line_num(7);
        let var = symtab.new_var(ty, "run");
        let id = symtab.store_function(var, Function::new("run", vec![0], 1));

        let function = symtab.literals().function(id).unwrap();
        assert_eq!(function.module, Some(main));
        assert_eq!(function.line_num, 7);
    }

    #[test]
    fn test_discard_then_teardown() {
        let (mut symtab, main, ty) = table();
        symtab.get_integer_literal(1);
        symtab.get_string_literal("one");
        symtab.new_var(ty.clone(), "f");
        symtab.new_class("Gone");
        symtab.discard_module_symbols(main);
        symtab.new_var(ty, "kept");
        symtab.set_main_function(Function::new("__main__", vec![], 0));

        let stats = symtab.teardown();
        assert_eq!(stats.literals, 2);
        assert_eq!(stats.old_classes, 1);
        assert_eq!(stats.old_functions, 1);
        assert!(stats.main_function);
        assert_eq!(stats.module_vars, 1);
        assert_eq!(stats.module_classes, 1);
    }

    #[test]
    fn test_hide_module_symbols() {
        let (mut symtab, main, ty) = table();
        let gone = symtab.new_class("Gone");
        symtab.new_var(ty, "x");
        symtab.hide_module_symbols(main);

        assert!(symtab.contains_class(gone));
        assert_eq!(symtab.var_count(), 0);
        assert!(symtab.find_class(None, "Gone").is_none());

        let stats = symtab.teardown();
        assert_eq!(stats.hidden_classes, 1);
    }
}
