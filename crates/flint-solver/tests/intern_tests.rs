use super::*;
use crate::types::*;

#[test]
fn test_intrinsics_are_preregistered() {
    let interner = TypeInterner::new();
    assert_eq!(
        interner.lookup(TypeId::NUMBER),
        Some(TypeData::Intrinsic(IntrinsicKind::Number))
    );
    assert_eq!(
        interner.lookup(TypeId::BOOLEAN_TRUE),
        Some(TypeData::Literal(LiteralValue::Boolean(true)))
    );
    assert_eq!(interner.literal_boolean(false), TypeId::BOOLEAN_FALSE);
    assert!(interner.is_empty());
}

#[test]
fn test_structural_deduplication() {
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let first = interner.object(vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    let second = interner.object(vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    assert_eq!(first, second);

    let inexact = interner.inexact_object(vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    assert_ne!(first, inexact);
    assert_eq!(interner.literal_string("x"), interner.literal_string("x"));
    assert_eq!(interner.literal_number(0.0), interner.literal_number(-0.0));
}

#[test]
fn test_union_normalization() {
    let interner = TypeInterner::new();
    let lit = interner.literal_string("a");

    assert_eq!(interner.union(vec![lit, TypeId::STRING]), TypeId::STRING);
    assert_eq!(interner.union(vec![TypeId::NUMBER, TypeId::NEVER]), TypeId::NUMBER);
    assert_eq!(interner.union(vec![TypeId::NUMBER, TypeId::UNKNOWN]), TypeId::UNKNOWN);
    assert_eq!(interner.union(vec![TypeId::NUMBER, TypeId::ANY]), TypeId::ANY);
    assert_eq!(interner.union(Vec::new()), TypeId::NEVER);

    let nested = interner.union2(TypeId::NUMBER, TypeId::STRING);
    let flat = interner.union(vec![nested, TypeId::NULL, TypeId::NUMBER]);
    assert_eq!(
        interner.union_members(flat),
        vec![TypeId::NUMBER, TypeId::STRING, TypeId::NULL]
    );
}

#[test]
fn test_union_is_order_independent() {
    let interner = TypeInterner::new();
    let ab = interner.union2(TypeId::STRING, TypeId::NUMBER);
    let ba = interner.union2(TypeId::NUMBER, TypeId::STRING);
    assert_eq!(ab, ba);
    // Members still come back in the order first written.
    assert_eq!(interner.union_members(ba), vec![TypeId::STRING, TypeId::NUMBER]);

    let a = interner.intern_string("a");
    let obj = interner.object(vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    let left = interner.union(vec![obj, TypeId::NULL, TypeId::VOID]);
    let right = interner.union(vec![TypeId::VOID, obj, TypeId::NULL]);
    assert_eq!(left, right);
}

#[test]
fn test_intersection_is_order_independent() {
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let has_a = interner.inexact_object(vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    let has_b = interner.inexact_object(vec![PropertyInfo::new(b, TypeId::STRING)]);
    assert_eq!(
        interner.intersection2(has_a, has_b),
        interner.intersection2(has_b, has_a)
    );
}

#[test]
fn test_intersection_normalization() {
    let interner = TypeInterner::new();
    assert_eq!(interner.intersection2(TypeId::NUMBER, TypeId::UNKNOWN), TypeId::NUMBER);
    assert_eq!(interner.intersection2(TypeId::NUMBER, TypeId::NEVER), TypeId::NEVER);
    assert_eq!(interner.intersection(Vec::new()), TypeId::UNKNOWN);
}

#[test]
fn test_spread_history_is_side_table() {
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let obj = interner.object(vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    assert!(interner.spread_history(obj).is_none());
    interner.record_spread_history(obj, &[TypeId::NULL, obj]);
    assert_eq!(interner.spread_history(obj).as_deref(), Some(&[TypeId::NULL, obj][..]));
    // History does not change identity.
    assert_eq!(interner.object(vec![PropertyInfo::new(a, TypeId::NUMBER)]), obj);
}
