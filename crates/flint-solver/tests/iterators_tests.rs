use super::*;
use crate::def::NoopResolver;

fn element(interner: &TypeInterner, ty: TypeId) -> CheckResult<TypeId> {
    TypeEvaluator::new(interner, &NoopResolver).element_type_of(ty)
}

#[test]
fn test_builtin_iterables() {
    let interner = TypeInterner::new();
    assert_eq!(
        element(&interner, interner.array(TypeId::STRING)),
        Ok(TypeId::STRING)
    );
    assert_eq!(
        element(&interner, interner.tuple(vec![TypeId::NUMBER, TypeId::STRING])),
        Ok(interner.union2(TypeId::NUMBER, TypeId::STRING))
    );
    assert_eq!(element(&interner, TypeId::STRING), Ok(TypeId::STRING));
    assert_eq!(
        element(&interner, interner.literal_string("abc")),
        Ok(TypeId::STRING)
    );
    assert_eq!(
        element(
            &interner,
            interner.builtin(BuiltinKind::Map, vec![TypeId::STRING, TypeId::NUMBER])
        ),
        Ok(interner.tuple(vec![TypeId::STRING, TypeId::NUMBER]))
    );
    assert_eq!(
        element(&interner, interner.builtin(BuiltinKind::Set, vec![TypeId::BOOLEAN])),
        Ok(TypeId::BOOLEAN)
    );
}

#[test]
fn test_iterator_protocol_objects() {
    let interner = TypeInterner::new();
    assert_eq!(
        element(&interner, iterable_of(&interner, TypeId::NUMBER)),
        Ok(TypeId::NUMBER)
    );
    let it = interner.iterator(TypeId::STRING, TypeId::VOID, TypeId::VOID);
    assert_eq!(element(&interner, it), Ok(TypeId::STRING));
}

#[test]
fn test_unions_iterate_member_wise() {
    let interner = TypeInterner::new();
    let union = interner.union2(
        interner.array(TypeId::NUMBER),
        interner.builtin(BuiltinKind::Set, vec![TypeId::STRING]),
    );
    assert_eq!(
        element(&interner, union),
        Ok(interner.union2(TypeId::NUMBER, TypeId::STRING))
    );
}

#[test]
fn test_non_iterables() {
    let interner = TypeInterner::new();
    assert_eq!(
        element(&interner, TypeId::NUMBER),
        Err(CheckError::NotIterable { ty: TypeId::NUMBER })
    );
    let obj = interner.object(Vec::new());
    assert_eq!(
        element(&interner, obj),
        Err(CheckError::NotIterable { ty: obj })
    );
    let maybe_array = interner.union2(interner.array(TypeId::NUMBER), TypeId::NULL);
    assert!(element(&interner, maybe_array).is_err());
}

#[test]
fn test_any_and_empty() {
    let interner = TypeInterner::new();
    assert_eq!(element(&interner, TypeId::ANY), Ok(TypeId::ANY));
    assert_eq!(element(&interner, TypeId::ERROR), Ok(TypeId::ANY));
    assert_eq!(element(&interner, TypeId::NEVER), Ok(TypeId::NEVER));
}

#[test]
fn test_bounded_type_parameter() {
    let interner = TypeInterner::new();
    let t = interner.type_param(TypeParamInfo {
        bound: Some(interner.array(TypeId::NUMBER)),
        ..TypeParamInfo::new(interner.intern_string("T"))
    });
    assert_eq!(element(&interner, t), Ok(TypeId::NUMBER));
}
