use super::*;
use crate::def::NoopResolver;

fn narrow(interner: &TypeInterner, ty: TypeId, guard: &TypeGuard, sense: bool) -> TypeId {
    SubtypeChecker::new(interner, &NoopResolver).narrow(ty, guard, sense)
}

fn maybe(interner: &TypeInterner, ty: TypeId) -> TypeId {
    interner.union(vec![TypeId::NULL, TypeId::VOID, ty])
}

#[test]
fn test_truthiness_strips_null_and_void() {
    let interner = TypeInterner::new();
    let maybe_string = maybe(&interner, TypeId::STRING);
    assert_eq!(
        narrow(&interner, maybe_string, &TypeGuard::Truthy, true),
        TypeId::STRING
    );
    assert_eq!(
        narrow(&interner, maybe_string, &TypeGuard::Truthy, false),
        maybe_string
    );
}

#[test]
fn test_truthiness_of_literals() {
    let interner = TypeInterner::new();
    let empty = interner.literal_string("");
    let word = interner.literal_string("w");
    let zero = interner.literal_number(0.0);
    let union = interner.union(vec![empty, word, zero]);
    assert_eq!(narrow(&interner, union, &TypeGuard::Truthy, true), word);
    assert_eq!(
        narrow(&interner, union, &TypeGuard::Truthy, false),
        interner.union2(empty, zero)
    );
    assert_eq!(
        narrow(&interner, TypeId::BOOLEAN, &TypeGuard::Truthy, true),
        TypeId::BOOLEAN_TRUE
    );
}

#[test]
fn test_impossible_branch_is_empty() {
    let interner = TypeInterner::new();
    assert_eq!(
        narrow(&interner, TypeId::NULL, &TypeGuard::Truthy, true),
        TypeId::NEVER
    );
    let obj = interner.object(Vec::new());
    assert_eq!(narrow(&interner, obj, &TypeGuard::Truthy, false), TypeId::NEVER);
}

#[test]
fn test_nullish() {
    let interner = TypeInterner::new();
    let maybe_number = maybe(&interner, TypeId::NUMBER);
    assert_eq!(
        narrow(&interner, maybe_number, &TypeGuard::Nullish, true),
        interner.union2(TypeId::NULL, TypeId::VOID)
    );
    assert_eq!(
        narrow(&interner, maybe_number, &TypeGuard::Nullish, false),
        TypeId::NUMBER
    );
    assert_eq!(
        narrow(&interner, TypeId::UNKNOWN, &TypeGuard::Nullish, false),
        TypeId::UNKNOWN
    );
}

#[test]
fn test_literal_equality() {
    let interner = TypeInterner::new();
    let a = interner.literal_string("a");
    let b = interner.literal_string("b");
    let ab = interner.union2(a, b);
    let guard = TypeGuard::LiteralEquality(a);
    assert_eq!(narrow(&interner, ab, &guard, true), a);
    assert_eq!(narrow(&interner, ab, &guard, false), b);
    assert_eq!(narrow(&interner, TypeId::STRING, &guard, true), a);
    // `string` minus `'a'` is still `string`.
    assert_eq!(narrow(&interner, TypeId::STRING, &guard, false), TypeId::STRING);
}

#[test]
fn test_typeof() {
    let interner = TypeInterner::new();
    let num_or_str = interner.union2(TypeId::NUMBER, TypeId::STRING);
    let is_string = TypeGuard::Typeof(TypeofKind::String);
    assert_eq!(narrow(&interner, num_or_str, &is_string, true), TypeId::STRING);
    assert_eq!(narrow(&interner, num_or_str, &is_string, false), TypeId::NUMBER);
    assert_eq!(
        narrow(
            &interner,
            TypeId::UNKNOWN,
            &TypeGuard::Typeof(TypeofKind::Number),
            true
        ),
        TypeId::NUMBER
    );

    let f = interner.function(FunctionShape::new(Vec::new(), TypeId::VOID));
    let obj = interner.object(Vec::new());
    let either = interner.union2(f, obj);
    assert_eq!(
        narrow(&interner, either, &TypeGuard::Typeof(TypeofKind::Function), true),
        f
    );
    assert_eq!(
        narrow(&interner, either, &TypeGuard::Typeof(TypeofKind::Object), true),
        obj
    );
    assert_eq!(TypeofKind::parse("bigint"), Some(TypeofKind::Bigint));
    assert_eq!(TypeofKind::parse("nope"), None);
}

#[test]
fn test_discriminated_union() {
    let interner = TypeInterner::new();
    let kind = interner.intern_string("kind");
    let x = interner.intern_string("x");
    let y = interner.intern_string("y");
    let tag_a = interner.literal_string("a");
    let tag_b = interner.literal_string("b");
    let first = interner.object(vec![
        PropertyInfo::new(kind, tag_a),
        PropertyInfo::new(x, TypeId::NUMBER),
    ]);
    let second = interner.object(vec![
        PropertyInfo::new(kind, tag_b),
        PropertyInfo::new(y, TypeId::STRING),
    ]);
    let union = interner.union2(first, second);
    let guard = TypeGuard::Discriminant {
        property: kind,
        value: tag_a,
    };
    assert_eq!(narrow(&interner, union, &guard, true), first);
    assert_eq!(narrow(&interner, union, &guard, false), second);
}

#[test]
fn test_predicate() {
    let interner = TypeInterner::new();
    let num_or_str = interner.union2(TypeId::NUMBER, TypeId::STRING);
    let guard = TypeGuard::Predicate(TypeId::NUMBER);
    assert_eq!(narrow(&interner, num_or_str, &guard, true), TypeId::NUMBER);
    assert_eq!(narrow(&interner, num_or_str, &guard, false), TypeId::STRING);
    assert_eq!(
        narrow(&interner, TypeId::UNKNOWN, &guard, true),
        TypeId::NUMBER
    );
}

#[test]
fn test_error_passes_through() {
    let interner = TypeInterner::new();
    assert_eq!(
        narrow(&interner, TypeId::ERROR, &TypeGuard::Truthy, true),
        TypeId::ERROR
    );
}
