//! Modules: named scopes holding class and var chains, linked by imports

use std::fmt;

use super::{ClassHandle, SymbolTable, VarHandle};

/// A unique identifier for a loaded module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(pub u32);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module#{}", self.0)
    }
}

/// An import of one module into another
#[derive(Debug, Clone)]
pub struct ModuleLink {
    pub module: ModuleId,

    /// Set for `import x as y`; only the alias resolves then
    pub as_name: Option<String>,
}

/// A module and the symbols declared in it
#[derive(Debug, Clone)]
pub struct Module {
    /// Name used by `import`
    pub loadname: String,

    /// Where the module was loaded from
    pub path: String,

    /// Host-embedded modules found through `find_registered_module`
    pub registered: bool,

    /// Imports, most recent first
    pub(crate) links: Vec<ModuleLink>,

    pub(crate) class_chain: Option<ClassHandle>,
    pub(crate) var_chain: Option<VarHandle>,

    /// Next module in load order
    pub(crate) root_next: Option<ModuleId>,
}

impl Module {
    fn new(loadname: String, path: String) -> Self {
        Self {
            loadname,
            path,
            registered: false,
            links: Vec::new(),
            class_chain: None,
            var_chain: None,
            root_next: None,
        }
    }

    /// Most recently declared class
    #[must_use]
    pub fn class_chain(&self) -> Option<ClassHandle> {
        self.class_chain
    }

    /// Most recently declared var
    #[must_use]
    pub fn var_chain(&self) -> Option<VarHandle> {
        self.var_chain
    }

    /// Imports, most recent first
    #[must_use]
    pub fn links(&self) -> &[ModuleLink] {
        &self.links
    }
}

impl SymbolTable {
    /// Load a new, empty module and append it to the load order
    pub fn new_module(&mut self, loadname: impl Into<String>, path: impl Into<String>) -> ModuleId {
        let id = ModuleId(self.modules.len() as u32);
        self.modules.push(Module::new(loadname.into(), path.into()));

        if let Some(last) = self.last_module {
            self.modules[last.0 as usize].root_next = Some(id);
        }
        self.last_module = Some(id);

        id
    }

    /// Make `module` the builtin module, which also becomes active.
    ///
    /// The builtin module must be the first module loaded, since the chain of
    /// loaded modules is walked starting from it.
    pub fn set_builtin(&mut self, module: ModuleId) {
        self.builtin_module = Some(module);
        self.active_module = Some(module);
    }

    pub fn set_active_module(&mut self, module: ModuleId) {
        self.active_module = Some(module);
    }

    #[must_use]
    pub fn builtin_module(&self) -> Option<ModuleId> {
        self.builtin_module
    }

    #[must_use]
    pub fn active_module(&self) -> Option<ModuleId> {
        self.active_module
    }

    /// Look up a module record
    ///
    /// # Panics
    /// Panics if `id` was not produced by this table.
    #[must_use]
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.0 as usize]
    }

    pub(crate) fn module_mut(&mut self, id: ModuleId) -> &mut Module {
        &mut self.modules[id.0 as usize]
    }

    /// Record that `importer` imports `imported`, optionally under an alias
    pub fn add_module_link(
        &mut self,
        importer: ModuleId,
        imported: ModuleId,
        as_name: Option<&str>,
    ) {
        let link = ModuleLink {
            module: imported,
            as_name: as_name.map(str::to_string),
        };
        self.module_mut(importer).links.insert(0, link);
    }

    /// Flag `module` as provided by the host
    pub fn mark_registered(&mut self, module: ModuleId) {
        self.module_mut(module).registered = true;
    }

    /// Modules in load order, starting at the builtin module
    pub fn loaded_modules(&self) -> impl Iterator<Item = ModuleId> + '_ {
        std::iter::successors(self.builtin_module, |id| self.module(*id).root_next)
    }

    /// Find a module imported into `module` (the active module if `None`).
    ///
    /// A link made with an alias only resolves through the alias; otherwise
    /// the imported module's loadname resolves.
    #[must_use]
    pub fn find_module(&self, module: Option<ModuleId>, name: &str) -> Option<ModuleId> {
        let module = module.or(self.active_module)?;
        self.module(module).links.iter().find_map(|link| {
            let matches = match &link.as_name {
                Some(alias) => alias == name,
                None => self.module(link.module).loadname == name,
            };
            matches.then_some(link.module)
        })
    }

    /// Find a host-registered module by loadname
    #[must_use]
    pub fn find_registered_module(&self, name: &str) -> Option<ModuleId> {
        self.loaded_modules().find(|id| {
            let module = self.module(*id);
            module.registered && module.loadname == name
        })
    }
}
