//! Shallow structural walks over the type graph.
//!
//! Walks never expand `Lazy` references, so they terminate on recursive
//! aliases without a visited set; the depth guard covers the remaining
//! structural nesting.

use crate::intern::TypeInterner;
use crate::recursion::{RecursionGuard, RecursionProfile};
use crate::types::*;
use flint_common::Atom;

/// Call `f` on every direct child type of `data`.
pub fn for_each_child(interner: &TypeInterner, data: &TypeData, mut f: impl FnMut(TypeId)) {
    match data {
        TypeData::Intrinsic(_)
        | TypeData::Literal(_)
        | TypeData::TypeParameter(_)
        | TypeData::Infer(_)
        | TypeData::Lazy(_)
        | TypeData::Opaque(_)
        | TypeData::Instance(_)
        | TypeData::Class(_) => {}
        TypeData::Object(shape_id) => {
            let shape = interner.object_shape(*shape_id);
            for prop in &shape.properties {
                f(prop.type_id);
            }
            if let Some(indexer) = &shape.indexer {
                f(indexer.key_type);
                f(indexer.value_type);
            }
        }
        TypeData::Union(list)
        | TypeData::Intersection(list)
        | TypeData::Tuple(list)
        | TypeData::Builtin(_, list)
        | TypeData::Spread(list, _) => {
            for member in interner.type_list(*list).iter() {
                f(*member);
            }
        }
        TypeData::Array { element, .. } => f(*element),
        TypeData::Function(shape_id) => {
            let shape = interner.function_shape(*shape_id);
            for param in &shape.params {
                f(param.type_id);
            }
            f(shape.return_type);
            if let Some(predicate) = &shape.predicate {
                f(predicate.type_id);
            }
        }
        TypeData::Application(app_id) => {
            let app = interner.type_application(*app_id);
            f(app.base);
            for arg in &app.args {
                f(*arg);
            }
        }
        TypeData::Mapped(mapped_id) => {
            let mapped = interner.mapped_type(*mapped_id);
            f(mapped.source_type());
            f(mapped.template);
        }
        TypeData::KeyOf(inner) | TypeData::Element(inner) => f(*inner),
        TypeData::ReadOnly { inner, .. } => f(*inner),
        TypeData::IndexAccess(object, index) => {
            f(*object);
            f(*index);
        }
        TypeData::Diff(left, right) => {
            f(*left);
            f(*right);
        }
        TypeData::Conditional(cond_id) => {
            let cond = interner.conditional_type(*cond_id);
            f(cond.check_type);
            f(cond.extends_type);
            f(cond.true_type);
            f(cond.false_type);
        }
        TypeData::Iterator(it) => {
            f(it.yield_type);
            f(it.return_type);
            f(it.next_type);
        }
        TypeData::Component(c) => {
            f(c.props);
            f(c.instance);
            f(c.config);
            f(c.renders);
        }
    }
}

/// Whether `ty` mentions a type parameter that is not bound inside `ty`
/// itself (by a generic function signature, a mapped type key or an
/// `infer`).
pub fn contains_type_parameters(interner: &TypeInterner, ty: TypeId) -> bool {
    let mut guard = RecursionGuard::with_profile(RecursionProfile::ShallowTraversal);
    let mut bound = Vec::new();
    contains_free(interner, ty, &mut bound, &mut guard)
}

fn contains_free(
    interner: &TypeInterner,
    ty: TypeId,
    bound: &mut Vec<Atom>,
    guard: &mut RecursionGuard<TypeId>,
) -> bool {
    if ty.is_intrinsic() {
        return false;
    }
    let Some(data) = interner.lookup(ty) else {
        return false;
    };
    match &data {
        TypeData::TypeParameter(info) => return !bound.contains(&info.name),
        TypeData::Infer(_) => return true,
        _ => {}
    }

    // Re-entering the same node under the same binders adds nothing.
    if !guard.enter(ty).is_entered() {
        return false;
    }

    let scoped: Vec<Atom> = match &data {
        TypeData::Function(shape_id) => interner
            .function_shape(*shape_id)
            .type_params
            .iter()
            .map(|p| p.name)
            .collect(),
        TypeData::Mapped(mapped_id) => vec![interner.mapped_type(*mapped_id).key_param.name],
        _ => Vec::new(),
    };

    let result = if let TypeData::Conditional(cond_id) = &data {
        let cond = interner.conditional_type(*cond_id);
        let mut infers = Vec::new();
        collect_infer_names(interner, cond.extends_type, &mut infers);
        let depth = bound.len();
        bound.extend(infers);
        let found = contains_free(interner, cond.check_type, bound, guard)
            || contains_free(interner, cond.true_type, bound, guard)
            || contains_free(interner, cond.false_type, bound, guard)
            || contains_free_skipping_infer(interner, cond.extends_type, bound, guard);
        bound.truncate(depth);
        found
    } else {
        let depth = bound.len();
        bound.extend(scoped);
        let mut found = false;
        for_each_child(interner, &data, |child| {
            if !found && contains_free(interner, child, bound, guard) {
                found = true;
            }
        });
        bound.truncate(depth);
        found
    };

    guard.leave(ty);
    result
}

fn contains_free_skipping_infer(
    interner: &TypeInterner,
    ty: TypeId,
    bound: &mut Vec<Atom>,
    guard: &mut RecursionGuard<TypeId>,
) -> bool {
    match interner.lookup(ty) {
        Some(TypeData::Infer(_)) => false,
        Some(data) => {
            let mut found = false;
            for_each_child(interner, &data, |child| {
                if !found && contains_free_skipping_infer(interner, child, bound, guard) {
                    found = true;
                }
            });
            found || matches!(data, TypeData::TypeParameter(ref info) if !bound.contains(&info.name))
        }
        None => false,
    }
}

/// Names introduced by `infer` anywhere inside `ty`.
pub fn collect_infer_names(interner: &TypeInterner, ty: TypeId, out: &mut Vec<Atom>) {
    let Some(data) = interner.lookup(ty) else {
        return;
    };
    if let TypeData::Infer(info) = &data {
        if !out.contains(&info.name) {
            out.push(info.name);
        }
        return;
    }
    for_each_child(interner, &data, |child| collect_infer_names(interner, child, out));
}

/// Whether `ty` is exactly a reference to the type parameter `name`.
pub fn is_type_param_named(interner: &TypeInterner, ty: TypeId, name: Atom) -> bool {
    matches!(interner.lookup(ty), Some(TypeData::TypeParameter(info)) if info.name == name)
}

#[cfg(test)]
#[path = "../tests/visitor_tests.rs"]
mod tests;
