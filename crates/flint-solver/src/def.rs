//! Definition identifiers and storage for the solver.
//!
//! Named types (aliases, classes, opaque types) are registered once in a
//! [`DefinitionStore`] and referenced from the type graph by [`DefId`]. This
//! is what gives self-referential definitions a back-edge instead of an
//! infinite unrolling:
//!
//! ```text
//! type Rec = null | Rec;     // Lazy(Rec) -> Union(null, Lazy(Rec))
//! ```
//!
//! | Kind | Expansion | Nominal |
//! |------|-----------|---------|
//! | TypeAlias | Always expand | No |
//! | Class | Instance shape on demand | Yes (with `extends` chain) |
//! | Opaque | Only inside the defining module | Yes |

use crate::types::{TypeId, TypeParamInfo};
use dashmap::DashMap;
use flint_common::Atom;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tracing::trace;

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

// =============================================================================
// DefId
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(pub u32);

impl DefId {
    /// Sentinel value for invalid `DefId`.
    pub const INVALID: Self = Self(0);

    /// First valid `DefId`.
    pub const FIRST_VALID: u32 = 1;

    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DefKind {
    /// `type Foo<T> = T | null`
    TypeAlias,
    /// `class C extends B { ... }`
    Class,
    /// `opaque type Id: string = string`
    Opaque,
}

// =============================================================================
// DefinitionInfo
// =============================================================================

#[derive(Clone, Debug)]
pub struct DefinitionInfo {
    pub kind: DefKind,

    /// Name of the definition (for printing)
    pub name: Atom,

    /// Module the definition was declared in
    pub module: Atom,

    pub type_params: Vec<TypeParamInfo>,

    /// Alias body, class instance shape, or opaque underlying type.
    /// `None` while the body is still being lowered, or for
    /// `declare opaque type` without a representation.
    pub body: Option<TypeId>,

    /// Opaque super type (`opaque type T: Bound`).
    pub bound: Option<TypeId>,

    /// For classes: parent class
    pub extends: Option<DefId>,

    /// For classes: the shape of static members
    pub statics: Option<TypeId>,
}

impl DefinitionInfo {
    pub fn type_alias(name: Atom, module: Atom, type_params: Vec<TypeParamInfo>) -> Self {
        Self {
            kind: DefKind::TypeAlias,
            name,
            module,
            type_params,
            body: None,
            bound: None,
            extends: None,
            statics: None,
        }
    }

    pub fn class(name: Atom, module: Atom, type_params: Vec<TypeParamInfo>) -> Self {
        Self {
            kind: DefKind::Class,
            ..Self::type_alias(name, module, type_params)
        }
    }

    pub fn opaque(name: Atom, module: Atom, type_params: Vec<TypeParamInfo>) -> Self {
        Self {
            kind: DefKind::Opaque,
            ..Self::type_alias(name, module, type_params)
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: TypeId) -> Self {
        self.body = Some(body);
        self
    }
}

// =============================================================================
// TypeResolver
// =============================================================================

/// Read access to definitions from the solver's algorithms.
pub trait TypeResolver {
    fn definition(&self, def_id: DefId) -> Option<DefinitionInfo>;

    /// Whether the representation of an opaque type is visible at the
    /// current checking site.
    fn opaque_is_transparent(&self, _info: &DefinitionInfo) -> bool {
        false
    }

    /// The body of a type alias.
    fn resolve_lazy(&self, def_id: DefId) -> Option<TypeId> {
        self.definition(def_id)
            .filter(|info| info.kind == DefKind::TypeAlias)
            .and_then(|info| info.body)
    }

    fn get_lazy_type_params(&self, def_id: DefId) -> Option<Vec<TypeParamInfo>> {
        self.definition(def_id).map(|info| info.type_params)
    }

    fn def_name(&self, def_id: DefId) -> Option<Atom> {
        self.definition(def_id).map(|info| info.name)
    }

    fn def_kind(&self, def_id: DefId) -> Option<DefKind> {
        self.definition(def_id).map(|info| info.kind)
    }

    /// Representation of an opaque type, if visible here.
    fn opaque_underlying(&self, def_id: DefId) -> Option<TypeId> {
        let info = self.definition(def_id)?;
        if info.kind == DefKind::Opaque && self.opaque_is_transparent(&info) {
            info.body
        } else {
            None
        }
    }

    fn opaque_bound(&self, def_id: DefId) -> Option<TypeId> {
        self.definition(def_id).and_then(|info| info.bound)
    }

    fn class_instance(&self, def_id: DefId) -> Option<TypeId> {
        self.definition(def_id)
            .filter(|info| info.kind == DefKind::Class)
            .and_then(|info| info.body)
    }

    fn class_extends(&self, def_id: DefId) -> Option<DefId> {
        self.definition(def_id).and_then(|info| info.extends)
    }

    fn class_statics(&self, def_id: DefId) -> Option<TypeId> {
        self.definition(def_id).and_then(|info| info.statics)
    }
}

/// Resolver with no definitions, for purely structural queries.
pub struct NoopResolver;

impl TypeResolver for NoopResolver {
    fn definition(&self, _def_id: DefId) -> Option<DefinitionInfo> {
        None
    }
}

// =============================================================================
// DefinitionStore
// =============================================================================

/// Thread-safe storage for type definitions.
///
/// Uses `DashMap` so module checks that share a session can register and
/// read definitions without an outer lock.
pub struct DefinitionStore {
    /// Unique instance ID for debugging (tracks which store instance this is)
    instance_id: u64,

    definitions: DashMap<DefId, DefinitionInfo>,

    next_id: AtomicU32,
}

impl Default for DefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionStore {
    pub fn new() -> Self {
        let instance_id = NEXT_INSTANCE_ID.fetch_add(1, Ordering::SeqCst);
        trace!(instance_id, "DefinitionStore::new");
        Self {
            instance_id,
            definitions: DashMap::new(),
            next_id: AtomicU32::new(DefId::FIRST_VALID),
        }
    }

    fn allocate(&self) -> DefId {
        DefId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Register a new definition and return its `DefId`.
    pub fn register(&self, info: DefinitionInfo) -> DefId {
        let id = self.allocate();
        trace!(
            instance_id = self.instance_id,
            def_id = id.0,
            kind = ?info.kind,
            "DefinitionStore::register"
        );
        self.definitions.insert(id, info);
        id
    }

    pub fn get(&self, id: DefId) -> Option<DefinitionInfo> {
        self.definitions.get(&id).map(|r| r.clone())
    }

    pub fn contains(&self, id: DefId) -> bool {
        self.definitions.contains_key(&id)
    }

    /// Update the body of a definition once it has been lowered.
    pub fn set_body(&self, id: DefId, body: TypeId) {
        if let Some(mut entry) = self.definitions.get_mut(&id) {
            entry.body = Some(body);
        }
    }

    pub fn set_bound(&self, id: DefId, bound: TypeId) {
        if let Some(mut entry) = self.definitions.get_mut(&id) {
            entry.bound = Some(bound);
        }
    }

    pub fn set_type_params(&self, id: DefId, params: Vec<TypeParamInfo>) {
        if let Some(mut entry) = self.definitions.get_mut(&id) {
            entry.type_params = params;
        }
    }

    pub fn set_class_info(&self, id: DefId, extends: Option<DefId>, statics: Option<TypeId>) {
        if let Some(mut entry) = self.definitions.get_mut(&id) {
            entry.extends = extends;
            entry.statics = statics;
        }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl TypeResolver for DefinitionStore {
    fn definition(&self, def_id: DefId) -> Option<DefinitionInfo> {
        self.get(def_id)
    }
}

/// A view of the store from inside one module: opaque types declared in
/// that module are transparent.
pub struct ModuleView<'a> {
    store: &'a DefinitionStore,
    module: Atom,
}

impl<'a> ModuleView<'a> {
    pub fn new(store: &'a DefinitionStore, module: Atom) -> Self {
        Self { store, module }
    }

    pub fn store(&self) -> &'a DefinitionStore {
        self.store
    }
}

impl TypeResolver for ModuleView<'_> {
    fn definition(&self, def_id: DefId) -> Option<DefinitionInfo> {
        self.store.get(def_id)
    }

    fn opaque_is_transparent(&self, info: &DefinitionInfo) -> bool {
        info.module == self.module
    }
}

#[cfg(test)]
#[path = "../tests/def_tests.rs"]
mod tests;
