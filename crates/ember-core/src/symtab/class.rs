//! Classes, enums, variants, and their members

use crate::keyword::shorthash;

use super::generic::MAX_GENERICS;
use super::{ClassHandle, ModuleId, PropertyHandle, SymbolTable, Type, VarHandle};

/// What a class entity represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    /// A user-defined or builtin class
    Class,
    /// An enum holding variants
    Enum,
    /// A case of an enum
    Variant,
    /// A generic parameter (`A`, `B`, ...)
    Generic,
}

/// Class flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassFlags {
    /// Variants are only reachable through the enum
    pub enum_is_scoped: bool,
    /// At least one variant takes no payload, so the enum can fill an
    /// optional argument by default
    pub valid_optarg: bool,
    /// Variant with no payload type
    pub empty_variant: bool,
}

/// A class entity
#[derive(Debug, Clone)]
pub struct Class {
    /// Runtime id; 0 for variants and generics
    pub id: u32,
    pub name: String,
    pub shorthash: u64,
    pub kind: ClassKind,
    pub flags: ClassFlags,
    pub generic_count: u16,

    /// Position in the generic pool, for generic classes
    pub generic_pos: u16,
    pub self_type: Type,

    /// Superclass, or the enum for a variant
    pub parent: Option<ClassHandle>,
    pub inherit_depth: u16,
    pub module: Option<ModuleId>,

    /// Methods and properties in declaration order
    pub(crate) members: Vec<Member>,
    pub prop_count: u16,

    /// Variants in declaration order, once the enum is finished
    pub(crate) variants: Vec<ClassHandle>,

    /// Payload type carried by a variant
    pub build_type: Option<Type>,

    pub(crate) next: Option<ClassHandle>,
}

impl Class {
    fn new(handle: ClassHandle, name: &str, kind: ClassKind) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            shorthash: shorthash(name),
            kind,
            flags: ClassFlags::default(),
            generic_count: 0,
            generic_pos: 0,
            self_type: Type::of(handle),
            parent: None,
            inherit_depth: 0,
            module: None,
            members: Vec::new(),
            prop_count: 0,
            variants: Vec::new(),
            build_type: None,
            next: None,
        }
    }

    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.kind == ClassKind::Enum
    }

    #[must_use]
    pub fn is_variant(&self) -> bool {
        self.kind == ClassKind::Variant
    }

    #[must_use]
    pub fn is_scoped_enum(&self) -> bool {
        self.is_enum() && self.flags.enum_is_scoped
    }

    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    #[must_use]
    pub fn variants(&self) -> &[ClassHandle] {
        &self.variants
    }

    /// The class declared before this one in the same chain
    #[must_use]
    pub fn declared_before(&self) -> Option<ClassHandle> {
        self.next
    }

    fn matches(&self, name: &str, shorthash: u64) -> bool {
        self.shorthash == shorthash && self.name == name
    }
}

/// A field declared on a class
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub shorthash: u64,
    pub ty: Type,
    pub class: ClassHandle,

    /// Sequential per class, continuing the parent's numbering
    pub id: u16,
    pub flags: u32,
}

/// A method or property found on a class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member {
    Method(VarHandle),
    Property(PropertyHandle),
}

impl SymbolTable {
    fn link_class(
        &mut self,
        name: &str,
        kind: ClassKind,
        id: u32,
        parent: Option<ClassHandle>,
    ) -> ClassHandle {
        let module = self.active();
        let next = self.module(module).class_chain;

        let handle = self.classes.alloc_with(|handle| {
            let mut class = Class::new(handle, name, kind);
            class.id = id;
            class.parent = parent;
            class.module = Some(module);
            class.flags.empty_variant = kind == ClassKind::Variant;
            class.next = next;
            class
        });
        self.module_mut(module).class_chain = Some(handle);
        handle
    }

    /// Create a class in the active module with the next class id
    pub fn new_class(&mut self, name: &str) -> ClassHandle {
        self.new_class_of_kind(name, ClassKind::Class)
    }

    /// Create an enum in the active module. Its variants must follow.
    pub fn new_enum_class(&mut self, name: &str) -> ClassHandle {
        self.new_class_of_kind(name, ClassKind::Enum)
    }

    fn new_class_of_kind(&mut self, name: &str, kind: ClassKind) -> ClassHandle {
        let id = self.next_class_id;
        self.next_class_id += 1;
        self.link_class(name, kind, id, None)
    }

    /// Create a variant of `enum_class`, linked at the head of the active
    /// module's class chain. Variants share id 0 and are addressed through
    /// their enum.
    pub fn new_variant_class(&mut self, enum_class: ClassHandle, name: &str) -> ClassHandle {
        self.link_class(name, ClassKind::Variant, 0, Some(enum_class))
    }

    /// Give a variant a payload type
    pub fn set_variant_payload(&mut self, variant: ClassHandle, payload: Type) {
        let class = &mut self.classes[variant];
        class.build_type = Some(payload);
        class.flags.empty_variant = false;
    }

    /// Collect the variants declared since `enum_class` into its variant
    /// array, in declaration order.
    ///
    /// A scoped enum takes its variants out of the module's class chain, so
    /// they only resolve through the enum.
    pub fn finish_enum(&mut self, enum_class: ClassHandle, is_scoped: bool, enum_type: Option<Type>) {
        let module = self.active();
        let mut variants = Vec::new();
        let mut iter = self.module(module).class_chain;

        loop {
            match iter {
                Some(handle) if handle == enum_class => break,
                Some(handle) => {
                    variants.push(handle);
                    iter = self.classes[handle].next;
                }
                None => {
                    tracing::warn!(enum_class = ?enum_class, "enum is not in the active module");
                    return;
                }
            }
        }

        variants.reverse();

        let valid_optarg = variants
            .iter()
            .any(|v| self.classes[*v].build_type.is_none());

        if is_scoped {
            for variant in &variants {
                self.classes[*variant].next = None;
            }
            self.module_mut(module).class_chain = Some(enum_class);
        }

        let class = &mut self.classes[enum_class];
        tracing::debug!(name = %class.name, variants = variants.len(), is_scoped, "enum finished");
        class.kind = ClassKind::Enum;
        class.variants = variants;
        class.flags.valid_optarg |= valid_optarg;
        class.flags.enum_is_scoped = is_scoped;
        if let Some(ty) = enum_type {
            class.self_type = ty;
        }
    }

    /// Find a variant stored inside a (usually scoped) enum
    #[must_use]
    pub fn find_scoped_variant(&self, enum_class: ClassHandle, name: &str) -> Option<ClassHandle> {
        let hash = shorthash(name);
        self.classes[enum_class]
            .variants
            .iter()
            .copied()
            .find(|v| self.classes[*v].matches(name, hash))
    }

    /// Make `parent` the superclass of `class`. Property ids of `class`
    /// continue after the parent's.
    pub fn set_parent(&mut self, class: ClassHandle, parent: ClassHandle) {
        let (depth, prop_count) = {
            let parent = &self.classes[parent];
            (parent.inherit_depth + 1, parent.prop_count)
        };

        let class = &mut self.classes[class];
        class.parent = Some(parent);
        class.inherit_depth = depth;
        class.prop_count = class.prop_count.max(prop_count);
    }

    /// Declare `count` generics on `class`, rebuilding its self type
    pub fn set_generic_count(&mut self, class: ClassHandle, count: u16) {
        let count = usize::from(count).min(MAX_GENERICS);
        self.reserve_generics(count);

        let subtypes = (0..count)
            .filter_map(|pos| self.generics.get(pos))
            .map(Type::of)
            .collect();

        let class_ref = &mut self.classes[class];
        class_ref.generic_count = count as u16;
        class_ref.self_type = Type::with_subtypes(class, subtypes);
    }

    /// Make sure the generic pool holds at least `count` generics
    pub fn reserve_generics(&mut self, count: usize) {
        let count = count.min(MAX_GENERICS);
        while self.generics.len() < count {
            let pos = self.generics.len();
            let name = char::from(b'A' + pos as u8).to_string();
            let handle = self.classes.alloc_with(|handle| {
                let mut class = Class::new(handle, &name, ClassKind::Generic);
                class.generic_pos = pos as u16;
                class
            });
            self.generics.push(handle);
        }
    }

    /// Search `class` and then its ancestors for a method or property
    #[must_use]
    pub fn find_member(&self, class: ClassHandle, name: &str) -> Option<Member> {
        let hash = shorthash(name);
        let mut iter = Some(class);

        while let Some(handle) = iter {
            let class = self.classes.get(handle)?;
            let found = class.members.iter().rev().copied().find(|member| match member {
                Member::Method(var) => self
                    .vars
                    .get(*var)
                    .is_some_and(|v| v.shorthash == hash && v.name == name),
                Member::Property(prop) => self
                    .properties
                    .get(*prop)
                    .is_some_and(|p| p.shorthash == hash && p.name == name),
            });

            if found.is_some() {
                return found;
            }
            iter = class.parent;
        }

        None
    }

    /// Like [`find_member`](Self::find_member), but only methods
    #[must_use]
    pub fn find_method(&self, class: ClassHandle, name: &str) -> Option<VarHandle> {
        match self.find_member(class, name)? {
            Member::Method(var) => Some(var),
            Member::Property(_) => None,
        }
    }

    /// Like [`find_member`](Self::find_member), but only properties
    #[must_use]
    pub fn find_property(&self, class: ClassHandle, name: &str) -> Option<PropertyHandle> {
        match self.find_member(class, name)? {
            Member::Property(prop) => Some(prop),
            Member::Method(_) => None,
        }
    }

    /// Move `var` out of the active module's var chain and make it a method
    /// of `class`. Methods are not visible as ordinary vars.
    pub fn add_class_method(&mut self, class: ClassHandle, var: VarHandle) {
        let module = self.active();
        self.unlink_var(module, var);

        let method = &mut self.vars[var];
        method.parent = Some(class);
        method.next = None;
        self.classes[class].members.push(Member::Method(var));
    }

    /// Add a property to `class` with the next property id
    pub fn add_class_property(
        &mut self,
        class: ClassHandle,
        ty: Type,
        name: &str,
        flags: u32,
    ) -> PropertyHandle {
        let id = self.classes[class].prop_count;
        let property = self.properties.alloc(Property {
            name: name.to_string(),
            shorthash: shorthash(name),
            ty,
            class,
            id,
            flags,
        });

        let class = &mut self.classes[class];
        class.prop_count += 1;
        class.members.push(Member::Property(property));
        property
    }

    /// Find a class by name.
    ///
    /// With a module, only that module's class chain is searched. Without
    /// one, the builtin module is searched and then the active module, except
    /// that single-letter names always resolve to generics.
    #[must_use]
    pub fn find_class(&self, module: Option<ModuleId>, name: &str) -> Option<ClassHandle> {
        let hash = shorthash(name);

        match module {
            Some(module) => self.find_class_in(self.module(module).class_chain, name, hash),
            None if name.len() == 1 => self.generics.find(name),
            None => self
                .builtin_module
                .and_then(|m| self.find_class_in(self.module(m).class_chain, name, hash))
                .or_else(|| {
                    self.active_module
                        .and_then(|m| self.find_class_in(self.module(m).class_chain, name, hash))
                }),
        }
    }

    fn find_class_in(&self, mut iter: Option<ClassHandle>, name: &str, hash: u64) -> Option<ClassHandle> {
        while let Some(handle) = iter {
            let class = self.classes.get(handle)?;
            if class.matches(name, hash) {
                return Some(handle);
            }
            iter = class.next;
        }
        None
    }

    /// Classes of `module`, most recent first
    pub fn classes_in(&self, module: ModuleId) -> impl Iterator<Item = ClassHandle> + '_ {
        self.class_chain_from(self.module(module).class_chain)
    }

    pub(crate) fn class_chain_from(
        &self,
        head: Option<ClassHandle>,
    ) -> impl Iterator<Item = ClassHandle> + '_ {
        std::iter::successors(head, |handle| {
            self.classes.get(*handle).and_then(|class| class.next)
        })
    }

    /// Pin the builtin Integer class, which must own its slot in the VM's
    /// class table even though variants share its id
    pub fn set_integer_class(&mut self, class: ClassHandle) {
        self.integer_class = Some(class);
    }

    #[must_use]
    pub fn integer_class(&self) -> Option<ClassHandle> {
        self.integer_class
    }

    /// One past the highest class id handed out so far
    #[must_use]
    pub fn next_class_id(&self) -> u32 {
        self.next_class_id
    }
}
