//! Generic instantiation: arity, defaults, bounds and argument inference.
//!
//! `instantiate_params` pairs declared type parameters with supplied
//! arguments. More arguments than parameters is an arity error. A missing
//! trailing argument (or a `_` placeholder, `TypeId::NONE`) comes from
//! inference when available, then from the parameter's default (itself
//! instantiated with the earlier arguments), then from its bound, then
//! `mixed`. Every argument is checked against its bound; violations are
//! collected, not fatal.

use crate::def::TypeResolver;
use crate::errors::{ArityKind, ArityTarget, CheckError, CheckResult};
use crate::evaluate::TypeEvaluator;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::intern::TypeInterner;
use crate::subtype::SubtypeChecker;
use crate::types::*;
use flint_common::Atom;
use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::debug;

const MAX_INFERENCE_DEPTH: u32 = 32;

/// Result of instantiating a parameter list.
#[derive(Clone, Debug, Default)]
pub struct GenericInstantiation {
    pub args: Vec<TypeId>,
    pub substitution: TypeSubstitution,
    /// Bound violations, reported by the caller.
    pub violations: Vec<CheckError>,
}

/// Fill in a full argument list without checking arity or bounds.
pub fn fill_type_arguments(
    interner: &TypeInterner,
    params: &[TypeParamInfo],
    supplied: &[TypeId],
) -> Vec<TypeId> {
    let mut subst = TypeSubstitution::new();
    let mut args = Vec::with_capacity(params.len());
    for (i, param) in params.iter().enumerate() {
        let arg = match supplied.get(i) {
            Some(&arg) if arg != TypeId::NONE => arg,
            _ => default_for(interner, param, &subst),
        };
        subst.insert(param.name, arg);
        args.push(arg);
    }
    args
}

fn default_for(interner: &TypeInterner, param: &TypeParamInfo, subst: &TypeSubstitution) -> TypeId {
    match (param.default, param.bound) {
        (Some(default), _) => instantiate_type(interner, default, subst),
        (None, Some(bound)) => instantiate_type(interner, bound, subst),
        (None, None) => TypeId::UNKNOWN,
    }
}

/// Instantiate `params` with `supplied` arguments.
///
/// `inferred` supplies arguments for placeholders and missing trailing
/// parameters, e.g. from call arguments.
pub fn instantiate_params<R: TypeResolver + ?Sized>(
    checker: &mut SubtypeChecker<'_, R>,
    name: &str,
    params: &[TypeParamInfo],
    supplied: &[TypeId],
    inferred: Option<&TypeSubstitution>,
) -> CheckResult<GenericInstantiation> {
    if supplied.len() > params.len() {
        return Err(CheckError::Arity {
            name: name.to_string(),
            expected: params.len(),
            got: supplied.len(),
            kind: ArityKind::TooMany,
            target: ArityTarget::TypeArguments,
        });
    }

    let interner = checker.interner();
    let mut result = GenericInstantiation::default();
    for (i, param) in params.iter().enumerate() {
        let explicit = supplied.get(i).copied().filter(|&arg| arg != TypeId::NONE);
        let arg = explicit
            .or_else(|| inferred.and_then(|subst| subst.get(param.name)))
            .unwrap_or_else(|| default_for(interner, param, &result.substitution));

        if let Some(bound) = param.bound {
            let bound = instantiate_type(interner, bound, &result.substitution);
            if !checker.is_subtype_of(arg, bound) {
                debug!(param = %interner.resolve_atom(param.name), "bound violation");
                result.violations.push(CheckError::BoundViolation {
                    param: param.name,
                    bound,
                    arg,
                });
            }
        }

        result.substitution.insert(param.name, arg);
        result.args.push(arg);
    }
    Ok(result)
}

// =============================================================================
// Inference
// =============================================================================

/// Collects candidate types for a set of type parameter (or `infer`) names
/// by matching a concrete type against a pattern that mentions them.
#[derive(Clone, Debug, Default)]
pub struct InferenceContext {
    names: Vec<Atom>,
    candidates: IndexMap<Atom, SmallVec<[TypeId; 2]>>,
}

impl InferenceContext {
    pub fn new(names: Vec<Atom>) -> Self {
        Self {
            names,
            candidates: IndexMap::new(),
        }
    }

    pub fn for_params(params: &[TypeParamInfo]) -> Self {
        Self::new(params.iter().map(|p| p.name).collect())
    }

    pub fn candidates(&self, name: Atom) -> &[TypeId] {
        self.candidates.get(&name).map_or(&[], |c| c.as_slice())
    }

    /// Match `source` against `pattern`.
    pub fn infer<R: TypeResolver + ?Sized>(
        &mut self,
        eval: &mut TypeEvaluator<'_, R>,
        source: TypeId,
        pattern: TypeId,
    ) {
        self.infer_inner(eval, source, pattern, 0);
    }

    /// One argument per name with candidates: the union of its candidates,
    /// with literals widened to their primitive when `widen` is set.
    pub fn resolve(&self, interner: &TypeInterner, widen: bool) -> TypeSubstitution {
        let mut subst = TypeSubstitution::new();
        for (&name, candidates) in &self.candidates {
            let members: Vec<TypeId> = candidates
                .iter()
                .map(|&c| if widen { widen_literal(interner, c) } else { c })
                .collect();
            subst.insert(name, interner.union(members));
        }
        subst
    }

    fn add(&mut self, name: Atom, candidate: TypeId) {
        let entry = self.candidates.entry(name).or_default();
        if !entry.contains(&candidate) {
            entry.push(candidate);
        }
    }

    fn binds(&self, interner: &TypeInterner, pattern: TypeId) -> Option<Atom> {
        match interner.lookup(pattern)? {
            TypeData::TypeParameter(info) | TypeData::Infer(info)
                if self.names.contains(&info.name) =>
            {
                Some(info.name)
            }
            _ => None,
        }
    }

    fn mentions_names(&self, interner: &TypeInterner, pattern: TypeId) -> bool {
        if self.binds(interner, pattern).is_some() {
            return true;
        }
        let Some(data) = interner.lookup(pattern) else {
            return false;
        };
        let mut found = false;
        crate::visitor::for_each_child(interner, &data, |child| {
            if !found && self.mentions_names(interner, child) {
                found = true;
            }
        });
        found
    }

    fn infer_inner<R: TypeResolver + ?Sized>(
        &mut self,
        eval: &mut TypeEvaluator<'_, R>,
        source: TypeId,
        pattern: TypeId,
        depth: u32,
    ) {
        let interner = eval.interner();
        if depth > MAX_INFERENCE_DEPTH || source == TypeId::NONE {
            return;
        }
        if let Some(name) = self.binds(interner, pattern) {
            self.add(name, source);
            return;
        }
        if source.is_any_or_error() || !self.mentions_names(interner, pattern) {
            return;
        }

        let source = eval.evaluate(source);
        let Some(pattern_data) = interner.lookup(pattern) else {
            return;
        };
        let source_data = interner.lookup(source);
        let depth = depth + 1;

        match (&pattern_data, &source_data) {
            (TypeData::Union(list), _) => {
                let members = interner.type_list(*list);
                let (generic, fixed): (Vec<TypeId>, Vec<TypeId>) = members
                    .iter()
                    .copied()
                    .partition(|&m| self.mentions_names(interner, m));
                for member in interner.union_members(source) {
                    if fixed.contains(&member) {
                        continue;
                    }
                    for &g in &generic {
                        self.infer_inner(eval, member, g, depth);
                    }
                }
            }
            (TypeData::ReadOnly { inner, .. }, _) => {
                self.infer_inner(eval, source, *inner, depth);
            }
            (TypeData::Object(p_shape), _) => {
                let Some(s_shape) = eval.resolve_object_shape(source) else {
                    return;
                };
                let p_shape = interner.object_shape(*p_shape);
                for p_prop in &p_shape.properties {
                    if let Some(s_prop) = s_shape.property(p_prop.name) {
                        self.infer_inner(eval, s_prop.type_id, p_prop.type_id, depth);
                    }
                }
                if let (Some(p_idx), Some(s_idx)) = (&p_shape.indexer, &s_shape.indexer) {
                    self.infer_inner(eval, s_idx.key_type, p_idx.key_type, depth);
                    self.infer_inner(eval, s_idx.value_type, p_idx.value_type, depth);
                }
            }
            (TypeData::Array { element: p, .. }, Some(TypeData::Array { element: s, .. })) => {
                self.infer_inner(eval, *s, *p, depth);
            }
            (TypeData::Array { element: p, .. }, Some(TypeData::Tuple(list))) => {
                let elements = interner.type_list(*list);
                for &e in elements.iter() {
                    self.infer_inner(eval, e, *p, depth);
                }
            }
            (TypeData::Tuple(p_list), Some(TypeData::Tuple(s_list))) => {
                let p_elems = interner.type_list(*p_list);
                let s_elems = interner.type_list(*s_list);
                for (&s, &p) in s_elems.iter().zip(p_elems.iter()) {
                    self.infer_inner(eval, s, p, depth);
                }
            }
            (TypeData::Function(p_id), Some(TypeData::Function(s_id))) => {
                let p_fn = interner.function_shape(*p_id);
                let s_fn = interner.function_shape(*s_id);
                for (s, p) in s_fn.params.iter().zip(p_fn.params.iter()) {
                    self.infer_inner(eval, s.type_id, p.type_id, depth);
                }
                self.infer_inner(eval, s_fn.return_type, p_fn.return_type, depth);
            }
            (TypeData::Builtin(p_kind, p_list), Some(TypeData::Builtin(s_kind, s_list)))
                if p_kind == s_kind =>
            {
                let p_args = interner.type_list(*p_list);
                let s_args = interner.type_list(*s_list);
                for (&s, &p) in s_args.iter().zip(p_args.iter()) {
                    self.infer_inner(eval, s, p, depth);
                }
            }
            (TypeData::Iterator(p), Some(TypeData::Iterator(s))) => {
                self.infer_inner(eval, s.yield_type, p.yield_type, depth);
                self.infer_inner(eval, s.return_type, p.return_type, depth);
                self.infer_inner(eval, s.next_type, p.next_type, depth);
            }
            (TypeData::Element(p), Some(TypeData::Element(s))) => {
                self.infer_inner(eval, *s, *p, depth);
            }
            (TypeData::Component(p), Some(TypeData::Component(s))) => {
                self.infer_inner(eval, s.config, p.config, depth);
                self.infer_inner(eval, s.props, p.props, depth);
                self.infer_inner(eval, s.instance, p.instance, depth);
                self.infer_inner(eval, s.renders, p.renders, depth);
            }
            // A function component supplies its props parameter as config.
            (TypeData::Component(p), Some(TypeData::Function(s_id))) => {
                let s_fn = interner.function_shape(*s_id);
                if let Some(props) = s_fn.params.first() {
                    self.infer_inner(eval, props.type_id, p.config, depth);
                    if p.props != p.config {
                        self.infer_inner(eval, props.type_id, p.props, depth);
                    }
                }
                self.infer_inner(eval, s_fn.return_type, p.renders, depth);
            }
            (TypeData::Application(p_id), Some(TypeData::Application(s_id))) => {
                let p_app = interner.type_application(*p_id);
                let s_app = interner.type_application(*s_id);
                if p_app.base == s_app.base {
                    for (&s, &p) in s_app.args.iter().zip(p_app.args.iter()) {
                        self.infer_inner(eval, s, p, depth);
                    }
                }
            }
            _ => {}
        }
    }
}

/// `1` becomes `number`, `'a'` becomes `string`.
pub fn widen_literal(interner: &TypeInterner, ty: TypeId) -> TypeId {
    match interner.lookup(ty) {
        Some(TypeData::Literal(lit)) => lit.primitive(),
        _ => ty,
    }
}

#[cfg(test)]
#[path = "../tests/generics_tests.rs"]
mod tests;
