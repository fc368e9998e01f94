//! Object composition and property access.
//!
//! Spread is right-biased: a later operand's key replaces an earlier one,
//! except that a later *optional* key only widens the earlier value. The
//! result is exact only if the spread site is exact and every operand is.

use crate::def::TypeResolver;
use crate::evaluate::TypeEvaluator;
use crate::intern::TypeInterner;
use crate::types::*;
use flint_common::Atom;
use std::sync::Arc;

/// Merge object shapes left to right.
pub fn compose(operands: &[Arc<ObjectShape>], exact: bool) -> ObjectShape {
    let mut result = ObjectShape {
        properties: Vec::new(),
        indexer: None,
        exact,
    };
    for operand in operands {
        result.exact &= operand.exact;
        for prop in &operand.properties {
            match result.properties.iter_mut().find(|p| p.name == prop.name) {
                // An optional override only widens; see `spread_objects`.
                Some(_) if prop.optional => {}
                Some(existing) => *existing = prop.clone(),
                None => result.properties.push(prop.clone()),
            }
        }
        if operand.indexer.is_some() {
            result.indexer.clone_from(&operand.indexer);
        }
    }
    result
}

/// [`compose`], widening keys that a later operand only optionally
/// overrides, and recording the merge history on the result.
pub fn spread_objects(
    interner: &TypeInterner,
    operand_ids: &[TypeId],
    operands: &[Arc<ObjectShape>],
    exact: bool,
) -> TypeId {
    let mut shape = compose(operands, exact);
    for prop in &mut shape.properties {
        let mut values: Vec<TypeId> = Vec::new();
        for operand in operands {
            let Some(p) = operand.property(prop.name) else {
                continue;
            };
            if !p.optional {
                values.clear();
            }
            values.push(p.type_id);
        }
        if values.len() > 1 {
            prop.type_id = interner.union(values);
        }
    }
    let result = interner.object_with_shape(shape);
    interner.record_spread_history(result, operand_ids);
    result
}

/// `$Diff<A, B>`: keys of `A` that `B` requires are removed; keys `B` has
/// as optional become optional.
pub fn diff_shapes(left: &ObjectShape, right: &ObjectShape) -> ObjectShape {
    let properties = left
        .properties
        .iter()
        .filter_map(|prop| match right.property(prop.name) {
            Some(r) if !r.optional => None,
            Some(_) => Some(PropertyInfo {
                optional: true,
                ..prop.clone()
            }),
            None => Some(prop.clone()),
        })
        .collect();
    ObjectShape {
        properties,
        indexer: left.indexer.clone(),
        exact: left.exact,
    }
}

/// Remove `keys` from `shape`.
pub fn omit_keys(shape: &ObjectShape, keys: &[Atom]) -> ObjectShape {
    ObjectShape {
        properties: shape
            .properties
            .iter()
            .filter(|p| !keys.contains(&p.name))
            .cloned()
            .collect(),
        indexer: shape.indexer.clone(),
        exact: shape.exact,
    }
}

/// Mark `keys` optional in `shape`; other keys are untouched.
pub fn mark_optional(shape: &ObjectShape, keys: &[Atom]) -> ObjectShape {
    ObjectShape {
        properties: shape
            .properties
            .iter()
            .map(|p| PropertyInfo {
                optional: p.optional || keys.contains(&p.name),
                ..p.clone()
            })
            .collect(),
        indexer: shape.indexer.clone(),
        exact: shape.exact,
    }
}

// =============================================================================
// Property access
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyAccess {
    Found {
        type_id: TypeId,
        /// Declared property, when the access hit a named key.
        info: Option<PropertyInfo>,
    },
    Missing,
}

impl PropertyAccess {
    fn found(type_id: TypeId) -> Self {
        Self::Found {
            type_id,
            info: None,
        }
    }

    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            Self::Found { type_id, .. } => Some(*type_id),
            Self::Missing => None,
        }
    }
}

impl<R: TypeResolver + ?Sized> TypeEvaluator<'_, R> {
    /// Type of reading `name` from a value of type `ty`.
    ///
    /// Built-in containers and primitives expose the handful of members the
    /// checker models; their remaining members read as `any`.
    pub fn property_of(&mut self, ty: TypeId, name: Atom) -> PropertyAccess {
        let interner = self.interner();
        if ty.is_any_or_error() {
            return PropertyAccess::found(TypeId::ANY);
        }
        let name_str = interner.resolve_atom_ref(name);
        let evaluated = self.evaluate(ty);

        if let Some(shape) = self.resolve_object_shape(evaluated) {
            if let Some(prop) = shape.property(name) {
                return PropertyAccess::Found {
                    type_id: prop.type_id,
                    info: Some(prop.clone()),
                };
            }
            if let Some(indexer) = &shape.indexer {
                if matches!(indexer.key_type, TypeId::STRING | TypeId::ANY) {
                    return PropertyAccess::found(indexer.value_type);
                }
            }
            return PropertyAccess::Missing;
        }

        match interner.lookup(evaluated) {
            Some(TypeData::Union(list)) => {
                let members = interner.type_list(list);
                let mut types = Vec::with_capacity(members.len());
                for &member in members.iter() {
                    match self.property_of(member, name) {
                        PropertyAccess::Found { type_id, .. } => types.push(type_id),
                        PropertyAccess::Missing => return PropertyAccess::Missing,
                    }
                }
                PropertyAccess::found(interner.union(types))
            }
            Some(TypeData::Intersection(list)) => {
                let members = interner.declared_members(evaluated, list);
                for &member in members.iter() {
                    if let found @ PropertyAccess::Found { .. } = self.property_of(member, name) {
                        return found;
                    }
                }
                PropertyAccess::Missing
            }
            Some(TypeData::TypeParameter(info)) => match info.bound {
                Some(bound) => self.property_of(bound, name),
                None => PropertyAccess::Missing,
            },
            // Unresolved spreads still answer for keys a known operand bound
            // provides; the rightmost operand wins.
            Some(TypeData::Spread(list, _)) => {
                let operands = interner.type_list(list);
                for &operand in operands.iter().rev() {
                    if let found @ PropertyAccess::Found { .. } = self.property_of(operand, name) {
                        return found;
                    }
                }
                PropertyAccess::Missing
            }
            Some(TypeData::Diff(left, right)) => match self.property_of(right, name) {
                PropertyAccess::Found { .. } => PropertyAccess::Missing,
                PropertyAccess::Missing => self.property_of(left, name),
            },
            Some(TypeData::Opaque(def_id)) => {
                let view = self
                    .resolver()
                    .opaque_underlying(def_id)
                    .or_else(|| self.resolver().opaque_bound(def_id));
                match view {
                    Some(view) => self.property_of(view, name),
                    None => PropertyAccess::Missing,
                }
            }
            Some(TypeData::Class(def_id)) => match self.resolver().class_statics(def_id) {
                Some(statics) => self.property_of(statics, name),
                None => PropertyAccess::Missing,
            },
            Some(TypeData::Array { .. } | TypeData::Tuple(_)) => match &*name_str {
                "length" => PropertyAccess::found(TypeId::NUMBER),
                _ => PropertyAccess::found(TypeId::ANY),
            },
            Some(TypeData::Builtin(kind, list)) => {
                let args = interner.type_list(list);
                self.builtin_member(kind, &args, &name_str)
            }
            Some(TypeData::Iterator(it)) if &*name_str == "next" => {
                let done = interner.intern_string("done");
                let value = interner.intern_string("value");
                let result = interner.inexact_object(vec![
                    PropertyInfo::new(done, TypeId::BOOLEAN),
                    PropertyInfo::new(value, interner.union2(it.yield_type, it.return_type)),
                ]);
                let param = ParamInfo {
                    optional: true,
                    ..ParamInfo::required(it.next_type)
                };
                PropertyAccess::found(interner.function(FunctionShape::new(vec![param], result)))
            }
            Some(TypeData::Component(_)) if &*name_str == "defaultProps" => {
                PropertyAccess::found(interner.object(Vec::new()))
            }
            Some(TypeData::Function(_)) => match &*name_str {
                "length" => PropertyAccess::found(TypeId::NUMBER),
                "name" => PropertyAccess::found(TypeId::STRING),
                "call" | "apply" | "bind" => PropertyAccess::found(TypeId::ANY),
                _ => PropertyAccess::Missing,
            },
            Some(TypeData::Element(_)) => PropertyAccess::found(TypeId::ANY),
            Some(TypeData::Intrinsic(IntrinsicKind::String))
            | Some(TypeData::Literal(LiteralValue::String(_))) => match &*name_str {
                "length" => PropertyAccess::found(TypeId::NUMBER),
                _ => PropertyAccess::found(TypeId::ANY),
            },
            Some(TypeData::Intrinsic(
                IntrinsicKind::Number | IntrinsicKind::Boolean | IntrinsicKind::Bigint,
            ))
            | Some(TypeData::Literal(_)) => PropertyAccess::found(TypeId::ANY),
            _ => PropertyAccess::Missing,
        }
    }

    fn builtin_member(&self, kind: BuiltinKind, args: &[TypeId], name: &str) -> PropertyAccess {
        let interner = self.interner();
        let arg = |i: usize| args.get(i).copied().unwrap_or(TypeId::ANY);
        let func = |params: Vec<TypeId>, ret: TypeId| {
            interner.function(FunctionShape::new(
                params.into_iter().map(ParamInfo::required).collect(),
                ret,
            ))
        };
        let ty = match (kind, name) {
            (BuiltinKind::Map | BuiltinKind::Set, "size") => TypeId::NUMBER,
            (BuiltinKind::Map | BuiltinKind::Set, "has" | "delete") => {
                func(vec![arg(0)], TypeId::BOOLEAN)
            }
            (BuiltinKind::Map, "get") => func(vec![arg(0)], interner.union2(arg(1), TypeId::VOID)),
            (BuiltinKind::Map, "set") => {
                let map = interner.builtin(BuiltinKind::Map, args.to_vec());
                func(vec![arg(0), arg(1)], map)
            }
            (BuiltinKind::Set, "add") => {
                let set = interner.builtin(BuiltinKind::Set, args.to_vec());
                func(vec![arg(0)], set)
            }
            _ => TypeId::ANY,
        };
        PropertyAccess::found(ty)
    }
}

#[cfg(test)]
#[path = "../tests/objects_tests.rs"]
mod tests;
