//! Type interning for structural deduplication.
//!
//! This module implements the type interning engine that converts
//! `TypeData` structures into lightweight `TypeId` handles.
//!
//! Benefits:
//! - O(1) type equality (just compare `TypeId` values)
//! - Memory efficient (each unique structure stored once)
//! - Cycle-safe: named types are `Lazy` references, never inlined
//!
//! `TypeData` values are only constructed here; everything else goes
//! through the typed constructors (`object`, `union`, `mapped`, ...).

use crate::def::DefId;
use crate::types::*;
use flint_common::{Atom, Interner};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

const TYPE_LIST_INLINE: usize = 8;

type TypeListBuffer = SmallVec<[TypeId; TYPE_LIST_INLINE]>;

struct SliceInterner<T> {
    items: Vec<Arc<[T]>>,
    map: FxHashMap<Arc<[T]>, u32>,
}

impl<T> SliceInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        let empty: Arc<[T]> = Arc::from(Vec::new());
        let mut map = FxHashMap::default();
        map.insert(empty.clone(), 0);
        SliceInterner {
            items: vec![empty],
            map,
        }
    }

    fn intern(&mut self, items: Vec<T>) -> u32 {
        if items.is_empty() {
            return 0;
        }
        if let Some(&id) = self.map.get(items.as_slice()) {
            return id;
        }
        let arc: Arc<[T]> = items.into();
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Arc<[T]> {
        self.items
            .get(id as usize)
            .cloned()
            .unwrap_or_else(|| self.items[0].clone())
    }
}

struct ValueInterner<T> {
    items: Vec<Arc<T>>,
    map: FxHashMap<Arc<T>, u32>,
}

impl<T> ValueInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        ValueInterner {
            items: Vec::new(),
            map: FxHashMap::default(),
        }
    }

    fn intern(&mut self, value: T) -> u32 {
        if let Some(&id) = self.map.get(&value) {
            return id;
        }
        let arc = Arc::new(value);
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<T>> {
        self.items.get(id as usize).cloned()
    }
}

struct TypeTable {
    key_to_id: FxHashMap<TypeData, TypeId>,
    id_to_key: Vec<TypeData>,
}

/// Type interning table.
/// Thread-safe via `RwLock` so a session can be shared by reference.
pub struct TypeInterner {
    table: RwLock<TypeTable>,
    /// String interner for property names, binding names and string literals
    pub string_interner: Interner,
    type_lists: RwLock<SliceInterner<TypeId>>,
    object_shapes: RwLock<ValueInterner<ObjectShape>>,
    function_shapes: RwLock<ValueInterner<FunctionShape>>,
    conditional_types: RwLock<ValueInterner<ConditionalType>>,
    mapped_types: RwLock<ValueInterner<MappedType>>,
    applications: RwLock<ValueInterner<TypeApplication>>,
    /// Operands an object type was spread-merged from, most recent merge
    /// wins. Kept outside the shape so merge history does not affect
    /// structural identity.
    spread_history: RwLock<FxHashMap<TypeId, Arc<[TypeId]>>>,
    /// Union and intersection members in the order they were first written.
    /// The interned list is sorted, so this only affects printing and
    /// first-match lookups.
    member_order: RwLock<FxHashMap<TypeId, Arc<[TypeId]>>>,
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInterner {
    /// Create a new type interner with pre-registered intrinsics
    pub fn new() -> Self {
        TypeInterner {
            table: RwLock::new(TypeTable {
                key_to_id: FxHashMap::default(),
                id_to_key: Vec::new(),
            }),
            string_interner: Interner::new(),
            type_lists: RwLock::new(SliceInterner::new()),
            object_shapes: RwLock::new(ValueInterner::new()),
            function_shapes: RwLock::new(ValueInterner::new()),
            conditional_types: RwLock::new(ValueInterner::new()),
            mapped_types: RwLock::new(ValueInterner::new()),
            applications: RwLock::new(ValueInterner::new()),
            spread_history: RwLock::new(FxHashMap::default()),
            member_order: RwLock::new(FxHashMap::default()),
        }
    }

    // =========================================================================
    // Strings
    // =========================================================================

    pub fn intern_string(&self, s: &str) -> Atom {
        self.string_interner.intern(s)
    }

    pub fn resolve_atom(&self, atom: Atom) -> String {
        self.string_interner.resolve(atom).to_string()
    }

    pub fn resolve_atom_ref(&self, atom: Atom) -> Arc<str> {
        self.string_interner.resolve(atom)
    }

    // =========================================================================
    // Core table
    // =========================================================================

    /// Intern a `TypeData` and return its `TypeId`.
    pub(crate) fn intern(&self, key: TypeData) -> TypeId {
        if let Some(id) = Self::get_intrinsic_id(&key) {
            return id;
        }

        {
            let table = self.table.read().expect("type table lock poisoned");
            if let Some(&id) = table.key_to_id.get(&key) {
                return id;
            }
        }

        let mut table = self.table.write().expect("type table lock poisoned");
        if let Some(&id) = table.key_to_id.get(&key) {
            return id;
        }
        let id = TypeId(TypeId::FIRST_USER + table.id_to_key.len() as u32);
        table.id_to_key.push(key.clone());
        table.key_to_id.insert(key, id);
        id
    }

    /// Look up the `TypeData` for a given `TypeId`.
    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        if id.is_intrinsic() {
            return Self::get_intrinsic_key(id);
        }
        let table = self.table.read().expect("type table lock poisoned");
        table
            .id_to_key
            .get((id.0 - TypeId::FIRST_USER) as usize)
            .cloned()
    }

    /// Number of interned types, intrinsics included.
    pub fn len(&self) -> usize {
        TypeId::FIRST_USER as usize + self.table.read().expect("type table lock poisoned").id_to_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= TypeId::FIRST_USER as usize
    }

    fn get_intrinsic_id(key: &TypeData) -> Option<TypeId> {
        match key {
            TypeData::Intrinsic(kind) => Some(kind.to_type_id()),
            TypeData::Literal(LiteralValue::Boolean(true)) => Some(TypeId::BOOLEAN_TRUE),
            TypeData::Literal(LiteralValue::Boolean(false)) => Some(TypeId::BOOLEAN_FALSE),
            _ => None,
        }
    }

    fn get_intrinsic_key(id: TypeId) -> Option<TypeData> {
        match id {
            TypeId::BOOLEAN_TRUE => Some(TypeData::Literal(LiteralValue::Boolean(true))),
            TypeId::BOOLEAN_FALSE => Some(TypeData::Literal(LiteralValue::Boolean(false))),
            _ => IntrinsicKind::from_type_id(id).map(TypeData::Intrinsic),
        }
    }

    // =========================================================================
    // Side tables
    // =========================================================================

    pub fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        self.type_lists
            .read()
            .expect("type_lists lock poisoned")
            .get(id.0)
    }

    pub fn object_shape(&self, id: ObjectShapeId) -> Arc<ObjectShape> {
        self.object_shapes
            .read()
            .expect("object_shapes lock poisoned")
            .get(id.0)
            .unwrap_or_else(|| Arc::new(ObjectShape::default()))
    }

    pub fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape> {
        self.function_shapes
            .read()
            .expect("function_shapes lock poisoned")
            .get(id.0)
            .unwrap_or_else(|| Arc::new(FunctionShape::new(Vec::new(), TypeId::ERROR)))
    }

    pub fn conditional_type(&self, id: ConditionalTypeId) -> Arc<ConditionalType> {
        self.conditional_types
            .read()
            .expect("conditional_types lock poisoned")
            .get(id.0)
            .unwrap_or_else(|| {
                Arc::new(ConditionalType {
                    check_type: TypeId::ERROR,
                    extends_type: TypeId::ERROR,
                    true_type: TypeId::ERROR,
                    false_type: TypeId::ERROR,
                })
            })
    }

    pub fn mapped_type(&self, id: MappedTypeId) -> Arc<MappedType> {
        self.mapped_types
            .read()
            .expect("mapped_types lock poisoned")
            .get(id.0)
            .unwrap_or_else(|| {
                Arc::new(MappedType {
                    key_param: TypeParamInfo::new(Atom::EMPTY),
                    source: KeySource::Keys(TypeId::NEVER),
                    template: TypeId::ERROR,
                    optional: None,
                    variance: None,
                })
            })
    }

    pub fn type_application(&self, id: TypeApplicationId) -> Arc<TypeApplication> {
        self.applications
            .read()
            .expect("applications lock poisoned")
            .get(id.0)
            .unwrap_or_else(|| {
                Arc::new(TypeApplication {
                    base: TypeId::ERROR,
                    args: Vec::new(),
                })
            })
    }

    fn intern_type_list(&self, members: Vec<TypeId>) -> TypeListId {
        let mut lists = self.type_lists.write().expect("type_lists lock poisoned");
        TypeListId(lists.intern(members))
    }

    // =========================================================================
    // Convenience accessors
    // =========================================================================

    /// Object shape of `id` when it is a plain object type.
    pub fn object_shape_of(&self, id: TypeId) -> Option<Arc<ObjectShape>> {
        match self.lookup(id)? {
            TypeData::Object(shape_id) => Some(self.object_shape(shape_id)),
            _ => None,
        }
    }

    /// Members of `id` when it is a union, otherwise `[id]`.
    pub fn union_members(&self, id: TypeId) -> Vec<TypeId> {
        match self.lookup(id) {
            Some(TypeData::Union(list)) => self.declared_members(id, list).to_vec(),
            _ => vec![id],
        }
    }

    pub fn record_spread_history(&self, result: TypeId, operands: &[TypeId]) {
        self.spread_history
            .write()
            .expect("spread_history lock poisoned")
            .insert(result, Arc::from(operands));
    }

    fn record_member_order(&self, id: TypeId, members: &[TypeId]) {
        self.member_order
            .write()
            .expect("member_order lock poisoned")
            .entry(id)
            .or_insert_with(|| Arc::from(members));
    }

    /// Members of the union or intersection `id` in first-written order.
    pub fn declared_members(&self, id: TypeId, list: TypeListId) -> Arc<[TypeId]> {
        let declared = self
            .member_order
            .read()
            .expect("member_order lock poisoned")
            .get(&id)
            .cloned();
        declared.unwrap_or_else(|| self.type_list(list))
    }

    /// Operands `id` was spread-merged from, if it came out of a merge.
    pub fn spread_history(&self, id: TypeId) -> Option<Arc<[TypeId]>> {
        self.spread_history
            .read()
            .expect("spread_history lock poisoned")
            .get(&id)
            .cloned()
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn literal_string(&self, value: &str) -> TypeId {
        let atom = self.intern_string(value);
        self.intern(TypeData::Literal(LiteralValue::String(atom)))
    }

    pub fn literal_string_atom(&self, atom: Atom) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::String(atom)))
    }

    pub fn literal_number(&self, value: f64) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::Number(NumberBits::from_f64(
            value,
        ))))
    }

    pub fn literal_boolean(&self, value: bool) -> TypeId {
        if value {
            TypeId::BOOLEAN_TRUE
        } else {
            TypeId::BOOLEAN_FALSE
        }
    }

    pub fn literal_bigint(&self, value: &str) -> TypeId {
        let atom = self.intern_string(value);
        self.intern(TypeData::Literal(LiteralValue::BigInt(atom)))
    }

    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        self.union_from_iter(members)
    }

    pub fn union2(&self, left: TypeId, right: TypeId) -> TypeId {
        self.union_from_iter([left, right])
    }

    fn union_from_iter<I>(&self, members: I) -> TypeId
    where
        I: IntoIterator<Item = TypeId>,
    {
        let mut flat: TypeListBuffer = SmallVec::new();
        for member in members {
            if let Some(TypeData::Union(inner)) = self.lookup(member) {
                flat.extend(self.declared_members(member, inner).iter().copied());
            } else {
                flat.push(member);
            }
        }
        self.normalize_union(flat)
    }

    /// Deduplicate and sort for consistent hashing: `A | B` and `B | A`
    /// intern to the same id.
    fn normalize_union(&self, flat: TypeListBuffer) -> TypeId {
        let mut members: TypeListBuffer = SmallVec::new();
        for id in flat {
            if !members.contains(&id) {
                members.push(id);
            }
        }

        if members.contains(&TypeId::ERROR) {
            return TypeId::ERROR;
        }
        if members.contains(&TypeId::ANY) {
            return TypeId::ANY;
        }
        if members.contains(&TypeId::UNKNOWN) {
            return TypeId::UNKNOWN;
        }
        members.retain(|id| *id != TypeId::NEVER);

        // "a" | string => string, true | boolean => boolean
        let primitives: SmallVec<[TypeId; 4]> = members
            .iter()
            .copied()
            .filter(|id| {
                matches!(
                    *id,
                    TypeId::STRING | TypeId::NUMBER | TypeId::BOOLEAN | TypeId::BIGINT
                )
            })
            .collect();
        if !primitives.is_empty() {
            members.retain(|id| match self.lookup(*id) {
                Some(TypeData::Literal(lit)) => !primitives.contains(&lit.primitive()),
                _ => true,
            });
        }

        match members.len() {
            0 => TypeId::NEVER,
            1 => members[0],
            _ => {
                let mut sorted = members.to_vec();
                sorted.sort_unstable();
                let list_id = self.intern_type_list(sorted);
                let id = self.intern(TypeData::Union(list_id));
                self.record_member_order(id, &members);
                id
            }
        }
    }

    pub fn intersection(&self, members: Vec<TypeId>) -> TypeId {
        let mut flat: TypeListBuffer = SmallVec::new();
        for member in members {
            let nested = match self.lookup(member) {
                Some(TypeData::Intersection(inner)) => Some(self.declared_members(member, inner)),
                _ => None,
            };
            match nested {
                Some(list) => {
                    for id in list.iter() {
                        if !flat.contains(id) {
                            flat.push(*id);
                        }
                    }
                }
                None => {
                    if !flat.contains(&member) {
                        flat.push(member);
                    }
                }
            }
        }

        if flat.contains(&TypeId::ERROR) {
            return TypeId::ERROR;
        }
        if flat.contains(&TypeId::NEVER) {
            return TypeId::NEVER;
        }
        if flat.contains(&TypeId::ANY) {
            return TypeId::ANY;
        }
        flat.retain(|id| *id != TypeId::UNKNOWN);

        match flat.len() {
            0 => TypeId::UNKNOWN,
            1 => flat[0],
            _ => {
                let mut sorted = flat.to_vec();
                sorted.sort_unstable();
                let list_id = self.intern_type_list(sorted);
                let id = self.intern(TypeData::Intersection(list_id));
                self.record_member_order(id, &flat);
                id
            }
        }
    }

    pub fn intersection2(&self, left: TypeId, right: TypeId) -> TypeId {
        self.intersection(vec![left, right])
    }

    pub fn array(&self, element: TypeId) -> TypeId {
        self.intern(TypeData::Array {
            element,
            readonly: false,
        })
    }

    pub fn readonly_array(&self, element: TypeId) -> TypeId {
        self.intern(TypeData::Array {
            element,
            readonly: true,
        })
    }

    pub fn tuple(&self, elements: Vec<TypeId>) -> TypeId {
        let list = self.intern_type_list(elements);
        self.intern(TypeData::Tuple(list))
    }

    /// Exact object type with the given properties.
    pub fn object(&self, properties: Vec<PropertyInfo>) -> TypeId {
        self.object_with_shape(ObjectShape::exact(properties))
    }

    pub fn inexact_object(&self, properties: Vec<PropertyInfo>) -> TypeId {
        self.object_with_shape(ObjectShape::inexact(properties))
    }

    pub fn object_with_shape(&self, shape: ObjectShape) -> TypeId {
        let shape_id = {
            let mut shapes = self.object_shapes.write().expect("object_shapes lock poisoned");
            ObjectShapeId(shapes.intern(shape))
        };
        self.intern(TypeData::Object(shape_id))
    }

    pub fn function(&self, shape: FunctionShape) -> TypeId {
        let shape_id = {
            let mut shapes = self
                .function_shapes
                .write()
                .expect("function_shapes lock poisoned");
            FunctionShapeId(shapes.intern(shape))
        };
        self.intern(TypeData::Function(shape_id))
    }

    pub fn type_param(&self, info: TypeParamInfo) -> TypeId {
        self.intern(TypeData::TypeParameter(info))
    }

    pub fn infer(&self, info: TypeParamInfo) -> TypeId {
        self.intern(TypeData::Infer(info))
    }

    pub fn application(&self, base: TypeId, args: Vec<TypeId>) -> TypeId {
        let app_id = {
            let mut apps = self.applications.write().expect("applications lock poisoned");
            TypeApplicationId(apps.intern(TypeApplication { base, args }))
        };
        self.intern(TypeData::Application(app_id))
    }

    pub fn lazy(&self, def_id: DefId) -> TypeId {
        self.intern(TypeData::Lazy(def_id))
    }

    pub fn mapped(&self, mapped: MappedType) -> TypeId {
        let mapped_id = {
            let mut types = self.mapped_types.write().expect("mapped_types lock poisoned");
            MappedTypeId(types.intern(mapped))
        };
        self.intern(TypeData::Mapped(mapped_id))
    }

    pub fn keyof(&self, inner: TypeId) -> TypeId {
        self.intern(TypeData::KeyOf(inner))
    }

    pub fn index_access(&self, object: TypeId, index: TypeId) -> TypeId {
        self.intern(TypeData::IndexAccess(object, index))
    }

    pub fn conditional(&self, conditional: ConditionalType) -> TypeId {
        let cond_id = {
            let mut types = self
                .conditional_types
                .write()
                .expect("conditional_types lock poisoned");
            ConditionalTypeId(types.intern(conditional))
        };
        self.intern(TypeData::Conditional(cond_id))
    }

    pub fn opaque(&self, def_id: DefId) -> TypeId {
        self.intern(TypeData::Opaque(def_id))
    }

    pub fn iterator(&self, yield_type: TypeId, return_type: TypeId, next_type: TypeId) -> TypeId {
        self.intern(TypeData::Iterator(IteratorType {
            yield_type,
            return_type,
            next_type,
        }))
    }

    pub fn component(&self, component: ComponentType) -> TypeId {
        self.intern(TypeData::Component(component))
    }

    pub fn element(&self, component: TypeId) -> TypeId {
        self.intern(TypeData::Element(component))
    }

    pub fn builtin(&self, kind: BuiltinKind, args: Vec<TypeId>) -> TypeId {
        let list = self.intern_type_list(args);
        self.intern(TypeData::Builtin(kind, list))
    }

    pub fn promise(&self, inner: TypeId) -> TypeId {
        self.builtin(BuiltinKind::Promise, vec![inner])
    }

    /// Deferred spread node; see `objects::compose` for the concrete merge.
    pub fn spread(&self, operands: Vec<TypeId>, exact: bool) -> TypeId {
        let list = self.intern_type_list(operands);
        self.intern(TypeData::Spread(list, exact))
    }

    pub fn readonly(&self, inner: TypeId, deep: bool) -> TypeId {
        self.intern(TypeData::ReadOnly { inner, deep })
    }

    pub fn diff(&self, left: TypeId, right: TypeId) -> TypeId {
        self.intern(TypeData::Diff(left, right))
    }

    pub fn instance(&self, def_id: DefId) -> TypeId {
        self.intern(TypeData::Instance(def_id))
    }

    pub fn class(&self, def_id: DefId) -> TypeId {
        self.intern(TypeData::Class(def_id))
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;
