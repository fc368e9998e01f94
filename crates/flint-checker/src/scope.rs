//! Lexical scopes and value bindings.

use bitflags::bitflags;
use flint_ast::VarKind;
use flint_common::Span;
use flint_solver::{NamedType, TypeId, TypeScope};
use rustc_hash::FxHashMap;

bitflags! {
    /// How a binding was introduced.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct BindingFlags: u16 {
        const LET = 1 << 0;
        const CONST = 1 << 1;
        const VAR = 1 << 2;
        const FUNCTION = 1 << 3;
        const CLASS = 1 << 4;
        const COMPONENT = 1 << 5;
        const PARAM = 1 << 6;
        const IMPORT = 1 << 7;
        const NAMESPACE_IMPORT = 1 << 8;
        /// `declare function` / `declare var`
        const DECLARED = 1 << 9;
        /// Has a type annotation; its declared type is not inferred.
        const ANNOTATED = 1 << 10;

        const IMMUTABLE = Self::CONST.bits() | Self::IMPORT.bits() | Self::NAMESPACE_IMPORT.bits();
    }
}

impl BindingFlags {
    pub fn from_var_kind(kind: VarKind) -> Self {
        match kind {
            VarKind::Let => Self::LET,
            VarKind::Const => Self::CONST,
            VarKind::Var => Self::VAR,
        }
    }
}

/// Coarse binding classification used by the mutability analysis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BindingKind {
    BlockScopedMutable,
    BlockScopedImmutable,
    FunctionDeclaration,
    ClassDeclaration,
}

impl BindingKind {
    pub fn classify(flags: BindingFlags) -> Self {
        if flags.intersects(BindingFlags::FUNCTION) {
            Self::FunctionDeclaration
        } else if flags.intersects(BindingFlags::CLASS | BindingFlags::COMPONENT) {
            Self::ClassDeclaration
        } else if flags.intersects(BindingFlags::IMMUTABLE) {
            Self::BlockScopedImmutable
        } else {
            Self::BlockScopedMutable
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub u32);

#[derive(Clone, Debug)]
pub struct Binding {
    pub name: String,
    pub flags: BindingFlags,
    /// Declared (or, for unannotated bindings, initializer) type.
    pub declared: TypeId,
    pub span: Span,
    /// Depth of the function that owns the binding; 0 is module level.
    pub function_depth: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Function,
    Block,
}

#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub values: FxHashMap<String, BindingId>,
    pub types: FxHashMap<String, NamedType>,
}

impl Scope {
    pub fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            values: FxHashMap::default(),
            types: FxHashMap::default(),
        }
    }
}

/// All scopes of one module check, innermost last, and the binding arena.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
    bindings: Vec<Binding>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(ScopeKind::Module)],
            bindings: Vec::new(),
        }
    }

    pub fn push(&mut self, kind: ScopeKind) {
        self.scopes.push(Scope::new(kind));
    }

    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Number of function scopes currently open.
    pub fn function_depth(&self) -> u32 {
        self.scopes
            .iter()
            .filter(|scope| scope.kind == ScopeKind::Function)
            .count() as u32
    }

    /// Declare `name` in the innermost scope. A second declaration of the
    /// same name in the same scope replaces the first.
    pub fn declare(&mut self, name: &str, flags: BindingFlags, declared: TypeId, span: Span) -> BindingId {
        let id = BindingId(self.bindings.len() as u32);
        let function_depth = self.function_depth();
        self.bindings.push(Binding {
            name: name.to_string(),
            flags,
            declared,
            span,
            function_depth,
        });
        if let Some(scope) = self.scopes.last_mut() {
            scope.values.insert(name.to_string(), id);
        }
        id
    }

    /// Declare `name` in the nearest function (or module) scope, for `var`
    /// and hoisted function declarations.
    pub fn declare_hoisted(
        &mut self,
        name: &str,
        flags: BindingFlags,
        declared: TypeId,
        span: Span,
    ) -> BindingId {
        let id = BindingId(self.bindings.len() as u32);
        let function_depth = self.function_depth();
        self.bindings.push(Binding {
            name: name.to_string(),
            flags,
            declared,
            span,
            function_depth,
        });
        if let Some(scope) = self
            .scopes
            .iter_mut()
            .rev()
            .find(|scope| scope.kind != ScopeKind::Block)
        {
            scope.values.insert(name.to_string(), id);
        }
        id
    }

    pub fn declare_type(&mut self, name: &str, named: NamedType) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.types.insert(name.to_string(), named);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<BindingId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.values.get(name).copied())
    }

    /// The binding declared in the innermost scope under `name`, if any.
    pub fn lookup_local(&self, name: &str) -> Option<BindingId> {
        self.scopes.last().and_then(|scope| scope.values.get(name).copied())
    }

    pub fn lookup_type(&self, name: &str) -> Option<NamedType> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.types.get(name).cloned())
    }

    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id.0 as usize]
    }

    pub fn binding_mut(&mut self, id: BindingId) -> &mut Binding {
        &mut self.bindings[id.0 as usize]
    }

    pub fn bindings(&self) -> impl Iterator<Item = (BindingId, &Binding)> {
        self.bindings
            .iter()
            .enumerate()
            .map(|(i, b)| (BindingId(i as u32), b))
    }

    /// Bindings declared directly in the module scope.
    pub fn module_scope(&self) -> &Scope {
        &self.scopes[0]
    }
}

/// Read-only view of a [`ScopeStack`] for annotation lowering.
pub struct LoweringScope<'s> {
    stack: &'s ScopeStack,
}

impl<'s> LoweringScope<'s> {
    pub fn new(stack: &'s ScopeStack) -> Self {
        Self { stack }
    }
}

impl TypeScope for LoweringScope<'_> {
    fn lookup_type(&self, name: &str) -> Option<NamedType> {
        self.stack.lookup_type(name)
    }

    fn value_type(&self, name: &str) -> Option<TypeId> {
        self.stack
            .lookup(name)
            .map(|id| self.stack.binding(id).declared)
    }
}

#[cfg(test)]
#[path = "../tests/scope_tests.rs"]
mod tests;
