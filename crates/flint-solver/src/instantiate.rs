//! Generic type instantiation.
//!
//! Substitutes type arguments for type parameters throughout a type. Binders
//! inside the type (generic function signatures, mapped type keys, `infer`)
//! shadow outer parameters of the same name.

use crate::intern::TypeInterner;
use crate::recursion::{RecursionGuard, RecursionProfile};
use crate::types::*;
use crate::visitor::collect_infer_names;
use flint_common::Atom;
use rustc_hash::FxHashMap;
use tracing::trace;

/// Mapping from type parameter names to their replacements.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSubstitution {
    map: FxHashMap<Atom, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair declared parameters with arguments positionally. Extra
    /// arguments are ignored; missing ones are left unmapped.
    pub fn from_args(params: &[TypeParamInfo], args: &[TypeId]) -> Self {
        let mut subst = Self::new();
        for (param, &arg) in params.iter().zip(args) {
            subst.insert(param.name, arg);
        }
        subst
    }

    pub fn insert(&mut self, name: Atom, ty: TypeId) {
        self.map.insert(name, ty);
    }

    pub fn get(&self, name: Atom) -> Option<TypeId> {
        self.map.get(&name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}

/// Apply `subst` to `ty`.
pub fn instantiate_type(interner: &TypeInterner, ty: TypeId, subst: &TypeSubstitution) -> TypeId {
    if subst.is_empty() {
        return ty;
    }
    let mut instantiator = TypeInstantiator {
        interner,
        subst,
        shadowed: Vec::new(),
        guard: RecursionGuard::with_profile(RecursionProfile::Instantiation),
        cache: FxHashMap::default(),
    };
    instantiator.instantiate(ty)
}

struct TypeInstantiator<'a> {
    interner: &'a TypeInterner,
    subst: &'a TypeSubstitution,
    shadowed: Vec<Atom>,
    guard: RecursionGuard<TypeId>,
    /// Only consulted while nothing is shadowed.
    cache: FxHashMap<TypeId, TypeId>,
}

impl TypeInstantiator<'_> {
    fn instantiate(&mut self, ty: TypeId) -> TypeId {
        if ty.is_intrinsic() {
            return ty;
        }
        if self.shadowed.is_empty() {
            if let Some(&cached) = self.cache.get(&ty) {
                return cached;
            }
        }
        let entered = self.guard.enter(ty);
        if !entered.is_entered() {
            trace!(type_id = ty.0, ?entered, "instantiate: limit reached");
            return ty;
        }
        let result = self.instantiate_inner(ty);
        self.guard.leave(ty);

        if self.shadowed.is_empty() {
            self.cache.insert(ty, result);
        }
        result
    }

    fn with_shadowed<T>(&mut self, names: &[Atom], f: impl FnOnce(&mut Self) -> T) -> T {
        let depth = self.shadowed.len();
        self.shadowed.extend_from_slice(names);
        let result = f(self);
        self.shadowed.truncate(depth);
        result
    }

    fn list(&mut self, list: TypeListId) -> Vec<TypeId> {
        let members = self.interner.type_list(list);
        members.iter().map(|&m| self.instantiate(m)).collect()
    }

    fn members(&mut self, ty: TypeId, list: TypeListId) -> Vec<TypeId> {
        let members = self.interner.declared_members(ty, list);
        members.iter().map(|&m| self.instantiate(m)).collect()
    }

    fn param_info(&mut self, info: &TypeParamInfo) -> TypeParamInfo {
        TypeParamInfo {
            name: info.name,
            bound: info.bound.map(|b| self.instantiate(b)),
            default: info.default.map(|d| self.instantiate(d)),
        }
    }

    fn instantiate_inner(&mut self, ty: TypeId) -> TypeId {
        let Some(data) = self.interner.lookup(ty) else {
            return ty;
        };
        let interner = self.interner;
        match data {
            TypeData::TypeParameter(info) | TypeData::Infer(info) => {
                if self.shadowed.contains(&info.name) {
                    ty
                } else {
                    self.subst.get(info.name).unwrap_or(ty)
                }
            }
            TypeData::Intrinsic(_)
            | TypeData::Literal(_)
            | TypeData::Lazy(_)
            | TypeData::Opaque(_)
            | TypeData::Instance(_)
            | TypeData::Class(_) => ty,
            TypeData::Object(shape_id) => {
                let shape = interner.object_shape(shape_id);
                let properties = shape
                    .properties
                    .iter()
                    .map(|p| PropertyInfo {
                        type_id: self.instantiate(p.type_id),
                        ..p.clone()
                    })
                    .collect();
                let indexer = shape.indexer.as_ref().map(|idx| IndexSignature {
                    key_type: self.instantiate(idx.key_type),
                    value_type: self.instantiate(idx.value_type),
                    variance: idx.variance,
                });
                interner.object_with_shape(ObjectShape {
                    properties,
                    indexer,
                    exact: shape.exact,
                })
            }
            TypeData::Union(list) => {
                let members = self.members(ty, list);
                interner.union(members)
            }
            TypeData::Intersection(list) => {
                let members = self.members(ty, list);
                interner.intersection(members)
            }
            TypeData::Tuple(list) => {
                let members = self.list(list);
                interner.tuple(members)
            }
            TypeData::Builtin(kind, list) => {
                let args = self.list(list);
                interner.builtin(kind, args)
            }
            TypeData::Spread(list, exact) => {
                let operands = self.list(list);
                interner.spread(operands, exact)
            }
            TypeData::Array { element, readonly } => {
                let element = self.instantiate(element);
                if readonly {
                    interner.readonly_array(element)
                } else {
                    interner.array(element)
                }
            }
            TypeData::Function(shape_id) => {
                let shape = interner.function_shape(shape_id);
                let names: Vec<Atom> = shape.type_params.iter().map(|p| p.name).collect();
                self.with_shadowed(&names, |this| {
                    let type_params = shape
                        .type_params
                        .iter()
                        .map(|p| this.param_info(p))
                        .collect();
                    let params = shape
                        .params
                        .iter()
                        .map(|p| ParamInfo {
                            type_id: this.instantiate(p.type_id),
                            ..p.clone()
                        })
                        .collect();
                    let return_type = this.instantiate(shape.return_type);
                    let predicate = shape.predicate.as_ref().map(|pred| TypePredicate {
                        param_index: pred.param_index,
                        type_id: this.instantiate(pred.type_id),
                    });
                    interner.function(FunctionShape {
                        type_params,
                        params,
                        return_type,
                        predicate,
                    })
                })
            }
            TypeData::Application(app_id) => {
                let app = interner.type_application(app_id);
                let base = self.instantiate(app.base);
                let args = app.args.iter().map(|&a| self.instantiate(a)).collect();
                interner.application(base, args)
            }
            TypeData::Mapped(mapped_id) => {
                let mapped = interner.mapped_type(mapped_id);
                let source = match mapped.source {
                    KeySource::KeyOf(t) => KeySource::KeyOf(self.instantiate(t)),
                    KeySource::Keys(t) => KeySource::Keys(self.instantiate(t)),
                };
                let key_name = mapped.key_param.name;
                let template = self.with_shadowed(&[key_name], |this| this.instantiate(mapped.template));
                interner.mapped(MappedType {
                    key_param: mapped.key_param.clone(),
                    source,
                    template,
                    optional: mapped.optional,
                    variance: mapped.variance,
                })
            }
            TypeData::KeyOf(inner) => {
                let inner = self.instantiate(inner);
                interner.keyof(inner)
            }
            TypeData::IndexAccess(object, index) => {
                let object = self.instantiate(object);
                let index = self.instantiate(index);
                interner.index_access(object, index)
            }
            TypeData::Conditional(cond_id) => {
                let cond = interner.conditional_type(cond_id);
                let mut infers = Vec::new();
                collect_infer_names(interner, cond.extends_type, &mut infers);
                let check_type = self.instantiate(cond.check_type);
                let false_type = self.instantiate(cond.false_type);
                let (extends_type, true_type) = self.with_shadowed(&infers, |this| {
                    (
                        this.instantiate(cond.extends_type),
                        this.instantiate(cond.true_type),
                    )
                });
                interner.conditional(ConditionalType {
                    check_type,
                    extends_type,
                    true_type,
                    false_type,
                })
            }
            TypeData::Iterator(it) => {
                let yield_type = self.instantiate(it.yield_type);
                let return_type = self.instantiate(it.return_type);
                let next_type = self.instantiate(it.next_type);
                interner.iterator(yield_type, return_type, next_type)
            }
            TypeData::Component(c) => {
                let component = ComponentType {
                    props: self.instantiate(c.props),
                    instance: self.instantiate(c.instance),
                    config: self.instantiate(c.config),
                    renders: self.instantiate(c.renders),
                };
                interner.component(component)
            }
            TypeData::Element(inner) => {
                let inner = self.instantiate(inner);
                interner.element(inner)
            }
            TypeData::ReadOnly { inner, deep } => {
                let inner = self.instantiate(inner);
                interner.readonly(inner, deep)
            }
            TypeData::Diff(left, right) => {
                let left = self.instantiate(left);
                let right = self.instantiate(right);
                interner.diff(left, right)
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod tests;
