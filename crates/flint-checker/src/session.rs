//! Checking session: the module table, the shared type arena and the
//! per-module caches.
//!
//! A session owns everything that outlives a single module check. Dropping
//! it drops the interner, the definition store and both caches; nothing is
//! kept in process-wide state.
//!
//! Two results are cached per module:
//!
//! - the **checked** module (diagnostics, type spans, inferred export
//!   signature), used by single-module mode imports and by queries;
//! - the **declared** signature, computed from annotations alone without
//!   checking any body. Whole-program mode imports see only this, and a
//!   single-module import that closes a cycle falls back to it.

use crate::context::{CheckerContext, CheckerOptions};
use crate::module_cache::ModuleCache;
use crate::state::CheckerState;
use flint_ast::{Module, Program};
use flint_common::{Atom, Diagnostic, Span};
use flint_solver::{
    CheckError, DefinitionStore, NamedType, TypeEvaluator, TypeId, TypeInterner, TypePrinter,
};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, info_span};

/// Module specifiers that resolve to untyped library code.
const UNTYPED_MODULES: &[&str] = &["react", "react-dom"];

/// What one module exposes to its importers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModuleSignature {
    pub values: IndexMap<String, TypeId>,
    pub types: IndexMap<String, NamedType>,
    pub default: Option<TypeId>,
}

impl ModuleSignature {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.types.is_empty() && self.default.is_none()
    }
}

/// Result of resolving an import specifier.
#[derive(Clone, Debug)]
pub enum ImportedModule {
    Signature(Arc<ModuleSignature>),
    /// Library module without checked source; every import is `any`.
    Untyped,
    Missing,
}

/// Gives a module check access to the signatures of other modules.
pub trait ModuleProvider {
    /// Resolve `specifier`. With `declared_only` the provider answers from
    /// declared signatures and never checks a module body.
    fn resolve(&self, specifier: &str, declared_only: bool) -> ImportedModule;
}

/// A provider with no modules besides the untyped libraries.
pub struct NoModules;

impl ModuleProvider for NoModules {
    fn resolve(&self, specifier: &str, _declared_only: bool) -> ImportedModule {
        if UNTYPED_MODULES.contains(&specifier) {
            ImportedModule::Untyped
        } else {
            ImportedModule::Missing
        }
    }
}

/// Output of checking one module.
#[derive(Debug)]
pub struct CheckedModule {
    pub name: String,
    pub errors: Vec<(Span, CheckError)>,
    pub diagnostics: Vec<Diagnostic>,
    /// Every typed position: annotations, expressions, JSX attribute names.
    pub type_spans: Vec<(Span, TypeId)>,
    pub signature: Arc<ModuleSignature>,
}

impl CheckedModule {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// The type recorded for the smallest span containing `offset`. Ties go
    /// to the span recorded last.
    pub fn type_at(&self, offset: u32) -> Option<TypeId> {
        let mut best: Option<(Span, TypeId)> = None;
        for &(span, ty) in &self.type_spans {
            if !span.contains(offset) {
                continue;
            }
            match best {
                Some((current, _)) if span.len() > current.len() => {}
                _ => best = Some((span, ty)),
            }
        }
        best.map(|(_, ty)| ty)
    }
}

pub struct CheckSession {
    interner: TypeInterner,
    defs: DefinitionStore,
    options: CheckerOptions,
    modules: IndexMap<String, Module>,
    checked: ModuleCache<CheckedModule>,
    declared: ModuleCache<ModuleSignature>,
}

impl CheckSession {
    pub fn new(program: Program, options: CheckerOptions) -> Self {
        let modules = program
            .modules
            .into_iter()
            .map(|module| (module.name.clone(), module))
            .collect();
        Self {
            interner: TypeInterner::new(),
            defs: DefinitionStore::new(),
            options,
            modules,
            checked: ModuleCache::new(),
            declared: ModuleCache::new(),
        }
    }

    pub fn interner(&self) -> &TypeInterner {
        &self.interner
    }

    pub fn defs(&self) -> &DefinitionStore {
        &self.defs
    }

    pub fn options(&self) -> &CheckerOptions {
        &self.options
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    fn module_atom(&self, name: &str) -> Atom {
        self.interner.intern_string(name)
    }

    /// Check every module, in program order.
    pub fn check_all(&self) -> Vec<Arc<CheckedModule>> {
        let names: Vec<&str> = self.module_names().collect();
        names
            .into_iter()
            .filter_map(|name| self.check_module(name))
            .collect()
    }

    /// All diagnostics of the program, in module order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.check_all()
            .iter()
            .flat_map(|module| module.diagnostics.iter().cloned())
            .collect()
    }

    /// Check `name`, reusing the cached result. `None` for an unknown module
    /// or while `name` itself is being checked.
    pub fn check_module(&self, name: &str) -> Option<Arc<CheckedModule>> {
        let module = self.modules.get(name)?;
        let atom = self.module_atom(name);
        self.checked
            .get_or_compute(atom, || self.run_check(module, atom))
    }

    /// The declared export signature of `name`.
    pub fn declared_signature(&self, name: &str) -> Option<Arc<ModuleSignature>> {
        let module = self.modules.get(name)?;
        let atom = self.module_atom(name);
        let signature = self
            .declared
            .get_or_compute(atom, || self.run_declare(module, atom));
        // A cycle among declared signatures sees an empty signature.
        Some(signature.unwrap_or_default())
    }

    /// Pretty-printed type at `offset` in module `file`.
    pub fn type_at_pos(&self, file: &str, offset: u32) -> Option<String> {
        let checked = self.check_module(file)?;
        let ty = checked.type_at(offset)?;
        let view = flint_solver::ModuleView::new(&self.defs, self.module_atom(file));
        let resolved = TypeEvaluator::new(&self.interner, &view)
            .with_max_depth(self.options.max_evaluate_depth)
            .evaluate(ty);
        Some(TypePrinter::new(&self.interner, &view).print(resolved))
    }

    fn context<'s>(&'s self, module: &'s Module, atom: Atom) -> CheckerContext<'s> {
        CheckerContext {
            interner: &self.interner,
            defs: &self.defs,
            options: &self.options,
            provider: self,
            module: atom,
            file: &module.name,
        }
    }

    fn run_check(&self, module: &Module, atom: Atom) -> CheckedModule {
        let _span = info_span!("check_module", module = %module.name).entered();
        let state = CheckerState::new(self.context(module, atom), &module.source);
        state.check_module(&module.body)
    }

    fn run_declare(&self, module: &Module, atom: Atom) -> ModuleSignature {
        let _span = info_span!("declare_module", module = %module.name).entered();
        let state = CheckerState::new(self.context(module, atom), &module.source);
        state.declare_module(&module.body)
    }
}

impl ModuleProvider for CheckSession {
    fn resolve(&self, specifier: &str, declared_only: bool) -> ImportedModule {
        if !self.modules.contains_key(specifier) {
            return NoModules.resolve(specifier, declared_only);
        }
        if !declared_only {
            if let Some(checked) = self.check_module(specifier) {
                return ImportedModule::Signature(Arc::clone(&checked.signature));
            }
            debug!(module = specifier, "import cycle, using declared signature");
        }
        match self.declared_signature(specifier) {
            Some(signature) => ImportedModule::Signature(signature),
            None => ImportedModule::Missing,
        }
    }
}

#[cfg(test)]
#[path = "../tests/session_tests.rs"]
mod tests;
