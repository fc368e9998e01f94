//! Iteration protocol: the element type produced by `for (x of e)` and
//! spreads of `e`.
//!
//! Resolution order:
//! 1. arrays (element) and tuples (union of slots)
//! 2. strings (`string`)
//! 3. `Map<K, V>` (`[K, V]`)
//! 4. `Set<T>` (`T`)
//! 5. anything exposing `@@iterator(): $Iterator<Y, R, N>` (`Y`); an
//!    iterator is itself iterable

use crate::def::TypeResolver;
use crate::errors::{CheckError, CheckResult};
use crate::evaluate::TypeEvaluator;
use crate::intern::TypeInterner;
use crate::objects::PropertyAccess;
use crate::types::*;
use tracing::trace;

/// Property name of the iterator-producing method.
pub const ITERATOR_METHOD: &str = "@@iterator";

/// `Iterable<T>`: an inexact object with a read-only `@@iterator` method.
pub fn iterable_of(interner: &TypeInterner, element: TypeId) -> TypeId {
    let iterator = interner.iterator(element, TypeId::ANY, TypeId::ANY);
    let method = interner.function(FunctionShape::new(Vec::new(), iterator));
    let name = interner.intern_string(ITERATOR_METHOD);
    interner.inexact_object(vec![PropertyInfo::method(name, method)])
}

impl<R: TypeResolver + ?Sized> TypeEvaluator<'_, R> {
    /// Element type of iterating `ty`.
    pub fn element_type_of(&mut self, ty: TypeId) -> CheckResult<TypeId> {
        self.element_type_inner(ty, 0)
    }

    fn element_type_inner(&mut self, ty: TypeId, depth: u32) -> CheckResult<TypeId> {
        if ty.is_any_or_error() {
            return Ok(TypeId::ANY);
        }
        if ty == TypeId::NEVER {
            return Ok(TypeId::NEVER);
        }
        if depth > 16 {
            return Err(CheckError::NotIterable { ty });
        }
        let evaluated = self.evaluate(ty);
        let interner = self.interner();
        match interner.lookup(evaluated) {
            Some(TypeData::Array { element, .. }) => Ok(element),
            Some(TypeData::Tuple(list)) => {
                let slots = interner.type_list(list);
                Ok(interner.union(slots.to_vec()))
            }
            Some(TypeData::Intrinsic(IntrinsicKind::String))
            | Some(TypeData::Literal(LiteralValue::String(_))) => Ok(TypeId::STRING),
            Some(TypeData::Builtin(BuiltinKind::Map, list)) => {
                let args = interner.type_list(list);
                let key = args.first().copied().unwrap_or(TypeId::ANY);
                let value = args.get(1).copied().unwrap_or(TypeId::ANY);
                Ok(interner.tuple(vec![key, value]))
            }
            Some(TypeData::Builtin(BuiltinKind::Set, list)) => {
                Ok(interner.type_list(list).first().copied().unwrap_or(TypeId::ANY))
            }
            Some(TypeData::Iterator(it)) => Ok(it.yield_type),
            Some(TypeData::Union(list)) => {
                let members = interner.type_list(list);
                let mut elements = Vec::with_capacity(members.len());
                for &member in members.iter() {
                    elements.push(self.element_type_inner(member, depth + 1)?);
                }
                Ok(interner.union(elements))
            }
            Some(TypeData::TypeParameter(info)) => match info.bound {
                Some(bound) => self.element_type_inner(bound, depth + 1),
                None => Err(CheckError::NotIterable { ty }),
            },
            _ => match self.iterator_of(evaluated) {
                Some(it) => Ok(it.yield_type),
                None => {
                    trace!(ty = ty.0, "element_type_of: not iterable");
                    Err(CheckError::NotIterable { ty })
                }
            },
        }
    }

    /// The iterator returned by `ty`'s `@@iterator` method, if any.
    pub fn iterator_of(&mut self, ty: TypeId) -> Option<IteratorType> {
        let interner = self.interner();
        let name = interner.intern_string(ITERATOR_METHOD);
        let PropertyAccess::Found { type_id, .. } = self.property_of(ty, name) else {
            return None;
        };
        let method = self.evaluate(type_id);
        let Some(TypeData::Function(fn_id)) = interner.lookup(method) else {
            return None;
        };
        let returned = self.evaluate(interner.function_shape(fn_id).return_type);
        match interner.lookup(returned) {
            Some(TypeData::Iterator(it)) => Some(it),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../tests/iterators_tests.rs"]
mod tests;
