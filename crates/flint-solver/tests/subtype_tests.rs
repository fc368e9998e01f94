use super::*;
use crate::def::{DefinitionInfo, DefinitionStore, NoopResolver};
use crate::diagnostics::SubtypeFailureReason;
use crate::iterators::iterable_of;

fn check(interner: &TypeInterner, s: TypeId, t: TypeId) -> Result<(), SubtypeFailureReason> {
    SubtypeChecker::new(interner, &NoopResolver).check(s, t)
}

fn holds(interner: &TypeInterner, s: TypeId, t: TypeId) -> bool {
    check(interner, s, t).is_ok()
}

fn func(interner: &TypeInterner, params: Vec<TypeId>, ret: TypeId) -> TypeId {
    interner.function(FunctionShape::new(
        params.into_iter().map(ParamInfo::required).collect(),
        ret,
    ))
}

#[test]
fn test_top_and_bottom() {
    let interner = TypeInterner::new();
    let obj = interner.object(Vec::new());
    assert!(holds(&interner, obj, TypeId::UNKNOWN));
    assert!(holds(&interner, TypeId::NEVER, obj));
    assert!(holds(&interner, TypeId::ANY, TypeId::NUMBER));
    assert!(holds(&interner, TypeId::STRING, TypeId::ANY));
    assert!(!holds(&interner, TypeId::UNKNOWN, TypeId::STRING));
}

#[test]
fn test_literals_widen_to_primitives() {
    let interner = TypeInterner::new();
    assert!(holds(&interner, interner.literal_string("a"), TypeId::STRING));
    assert!(holds(&interner, interner.literal_number(2.0), TypeId::NUMBER));
    assert!(!holds(&interner, TypeId::STRING, interner.literal_string("a")));
    assert!(!holds(
        &interner,
        interner.literal_string("a"),
        interner.literal_string("b")
    ));
}

#[test]
fn test_exact_and_inexact_objects() {
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let exact_a = interner.object(vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    let inexact_a = interner.inexact_object(vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    let exact_ab = interner.object(vec![
        PropertyInfo::new(a, TypeId::NUMBER),
        PropertyInfo::new(b, TypeId::STRING),
    ]);

    assert!(holds(&interner, exact_a, inexact_a));
    assert!(holds(&interner, exact_ab, inexact_a));
    assert!(matches!(
        check(&interner, inexact_a, exact_a),
        Err(SubtypeFailureReason::InexactToExact { .. })
    ));
    assert!(matches!(
        check(&interner, exact_ab, exact_a),
        Err(SubtypeFailureReason::ExtraProperty { property, .. }) if property == b
    ));
}

#[test]
fn test_optional_properties() {
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let exact_empty = interner.object(Vec::new());
    let inexact_empty = interner.inexact_object(Vec::new());
    let exact_opt = interner.object(vec![PropertyInfo::opt(a, TypeId::NUMBER)]);
    let inexact_opt = interner.inexact_object(vec![PropertyInfo::opt(a, TypeId::NUMBER)]);

    // Exact objects need the same key set, even for optional keys.
    assert!(matches!(
        check(&interner, exact_empty, exact_opt),
        Err(SubtypeFailureReason::MissingProperty { .. })
    ));
    assert!(holds(&interner, exact_empty, inexact_opt));
    assert!(holds(&interner, exact_opt, exact_opt));
    assert!(matches!(
        check(&interner, inexact_empty, inexact_opt),
        Err(SubtypeFailureReason::MissingProperty { .. })
    ));

    let required = interner.object(vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    assert!(matches!(
        check(&interner, exact_opt, required),
        Err(SubtypeFailureReason::OptionalProperty { .. })
    ));
}

#[test]
fn test_property_variance() {
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let one = interner.literal_number(1.0);
    let lit = interner.object(vec![PropertyInfo::new(a, one)]);
    let num = interner.object(vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    let ro_num = interner.object(vec![PropertyInfo::readonly(a, TypeId::NUMBER)]);
    let wo_lit = interner.object(vec![PropertyInfo {
        variance: Variance::WriteOnly,
        ..PropertyInfo::new(a, one)
    }]);

    // Plain properties are invariant.
    assert!(matches!(
        check(&interner, lit, num),
        Err(SubtypeFailureReason::PropertyMismatch { property, .. }) if property == a
    ));
    assert!(holds(&interner, lit, ro_num));
    assert!(holds(&interner, num, wo_lit));
    assert!(matches!(
        check(&interner, ro_num, num),
        Err(SubtypeFailureReason::PropertyNotWritable { .. })
    ));
}

#[test]
fn test_indexers() {
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let dict = |value, variance| {
        interner.object_with_shape(ObjectShape {
            properties: Vec::new(),
            indexer: Some(IndexSignature {
                key_type: TypeId::STRING,
                value_type: value,
                variance,
            }),
            exact: false,
        })
    };
    let named = interner.inexact_object(vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    assert!(holds(&interner, named, dict(TypeId::NUMBER, Variance::ReadWrite)));
    assert!(matches!(
        check(&interner, named, dict(TypeId::STRING, Variance::ReadWrite)),
        Err(SubtypeFailureReason::IndexerMismatch { .. })
    ));

    let one = interner.literal_number(1.0);
    assert!(holds(
        &interner,
        dict(one, Variance::ReadWrite),
        dict(TypeId::NUMBER, Variance::ReadOnly)
    ));
    assert!(!holds(
        &interner,
        dict(one, Variance::ReadWrite),
        dict(TypeId::NUMBER, Variance::ReadWrite)
    ));
}

#[test]
fn test_function_parameters_are_contravariant() {
    let interner = TypeInterner::new();
    let one = interner.literal_number(1.0);
    let takes_number = func(&interner, vec![TypeId::NUMBER], TypeId::VOID);
    let takes_one = func(&interner, vec![one], TypeId::VOID);
    assert!(holds(&interner, takes_number, takes_one));
    assert!(matches!(
        check(&interner, takes_one, takes_number),
        Err(SubtypeFailureReason::ParameterMismatch { index: 0, .. })
    ));
}

#[test]
fn test_function_returns() {
    let interner = TypeInterner::new();
    let returns_string = func(&interner, Vec::new(), TypeId::STRING);
    let returns_number = func(&interner, Vec::new(), TypeId::NUMBER);
    let returns_void = func(&interner, Vec::new(), TypeId::VOID);
    assert!(holds(&interner, returns_string, returns_void));
    assert!(matches!(
        check(&interner, returns_string, returns_number),
        Err(SubtypeFailureReason::ReturnMismatch { .. })
    ));
}

#[test]
fn test_function_arity() {
    let interner = TypeInterner::new();
    let unary = func(&interner, vec![TypeId::NUMBER], TypeId::VOID);
    let binary = func(&interner, vec![TypeId::NUMBER, TypeId::NUMBER], TypeId::VOID);
    // Ignoring extra arguments is fine.
    assert!(holds(&interner, unary, binary));
    assert!(matches!(
        check(&interner, binary, unary),
        Err(SubtypeFailureReason::TooFewParameters { .. })
    ));
}

#[test]
fn test_optional_target_parameter() {
    let interner = TypeInterner::new();
    let opt = interner.function(FunctionShape::new(
        vec![ParamInfo {
            optional: true,
            ..ParamInfo::required(TypeId::NUMBER)
        }],
        TypeId::VOID,
    ));
    let required = func(&interner, vec![TypeId::NUMBER], TypeId::VOID);
    let accepts_void = func(
        &interner,
        vec![interner.union2(TypeId::NUMBER, TypeId::VOID)],
        TypeId::VOID,
    );
    assert!(!holds(&interner, required, opt));
    assert!(holds(&interner, accepts_void, opt));
    assert!(holds(&interner, opt, required));
}

#[test]
fn test_arrays_and_tuples() {
    let interner = TypeInterner::new();
    let one = interner.literal_number(1.0);
    let arr_one = interner.array(one);
    let arr_num = interner.array(TypeId::NUMBER);
    let ro_num = interner.readonly_array(TypeId::NUMBER);

    assert!(matches!(
        check(&interner, arr_one, arr_num),
        Err(SubtypeFailureReason::ArrayElementMismatch { .. })
    ));
    assert!(holds(&interner, arr_one, ro_num));
    assert!(matches!(
        check(&interner, ro_num, arr_num),
        Err(SubtypeFailureReason::ReadOnlyConversion { .. })
    ));

    let pair = interner.tuple(vec![one, TypeId::STRING]);
    let wide_pair = interner.tuple(vec![TypeId::NUMBER, TypeId::STRING]);
    let single = interner.tuple(vec![TypeId::NUMBER]);
    assert!(holds(&interner, pair, wide_pair));
    assert!(matches!(
        check(&interner, pair, single),
        Err(SubtypeFailureReason::TupleArity {
            source_len: 2,
            target_len: 1
        })
    ));
    assert!(holds(
        &interner,
        pair,
        interner.array(interner.union2(TypeId::NUMBER, TypeId::STRING))
    ));
}

#[test]
fn test_unions() {
    let interner = TypeInterner::new();
    let num_or_str = interner.union2(TypeId::NUMBER, TypeId::STRING);
    assert!(holds(&interner, TypeId::NUMBER, num_or_str));
    assert!(matches!(
        check(&interner, num_or_str, TypeId::NUMBER),
        Err(SubtypeFailureReason::TypeMismatch { .. })
    ));
    assert!(matches!(
        check(&interner, TypeId::BOOLEAN, num_or_str),
        Err(SubtypeFailureReason::NoUnionMember { .. })
    ));
    let true_or_false = interner.union2(TypeId::BOOLEAN_TRUE, TypeId::BOOLEAN_FALSE);
    assert!(holds(&interner, TypeId::BOOLEAN, true_or_false));
}

#[test]
fn test_union_target_reports_same_kind_member() {
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let target_obj = interner.object(vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    let target = interner.union2(target_obj, TypeId::NULL);
    let source = interner.object(vec![PropertyInfo::new(a, TypeId::STRING)]);
    assert!(matches!(
        check(&interner, source, target),
        Err(SubtypeFailureReason::PropertyMismatch { .. })
    ));
}

#[test]
fn test_intersection_source_merges_objects() {
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let left = interner.inexact_object(vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    let right = interner.inexact_object(vec![PropertyInfo::new(b, TypeId::STRING)]);
    let both = interner.intersection2(left, right);
    let target = interner.inexact_object(vec![
        PropertyInfo::new(a, TypeId::NUMBER),
        PropertyInfo::new(b, TypeId::STRING),
    ]);
    assert!(holds(&interner, both, target));
    assert!(holds(&interner, both, left));
}

#[test]
fn test_builtin_container_variance() {
    let interner = TypeInterner::new();
    let one = interner.literal_number(1.0);
    let map = |k, v| interner.builtin(BuiltinKind::Map, vec![k, v]);
    assert!(matches!(
        check(&interner, map(TypeId::STRING, one), map(TypeId::STRING, TypeId::NUMBER)),
        Err(SubtypeFailureReason::TypeArgumentMismatch { name: "V", .. })
    ));
    assert!(holds(
        &interner,
        interner.promise(one),
        interner.promise(TypeId::NUMBER)
    ));
}

#[test]
fn test_iterators() {
    let interner = TypeInterner::new();
    let one = interner.literal_number(1.0);
    let narrow = interner.iterator(one, TypeId::VOID, TypeId::NUMBER);
    let wide = interner.iterator(TypeId::NUMBER, TypeId::VOID, one);
    assert!(holds(&interner, narrow, wide));
    assert!(matches!(
        check(&interner, wide, narrow),
        Err(SubtypeFailureReason::TypeArgumentMismatch { name: "Yield", .. })
    ));
}

#[test]
fn test_iterable_target() {
    let interner = TypeInterner::new();
    let iterable_number = iterable_of(&interner, TypeId::NUMBER);
    assert!(holds(&interner, interner.array(TypeId::NUMBER), iterable_number));
    assert!(holds(
        &interner,
        interner.builtin(BuiltinKind::Set, vec![TypeId::NUMBER]),
        iterable_number
    ));
    assert!(matches!(
        check(&interner, interner.array(TypeId::STRING), iterable_number),
        Err(SubtypeFailureReason::IteratedElementMismatch { .. })
    ));
    assert!(!holds(&interner, TypeId::NUMBER, iterable_number));
}

#[test]
fn test_components() {
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let small = interner.inexact_object(vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    let large = interner.inexact_object(vec![
        PropertyInfo::new(a, TypeId::NUMBER),
        PropertyInfo::new(b, TypeId::STRING),
    ]);
    let component = |config| {
        interner.component(ComponentType {
            props: config,
            instance: TypeId::UNKNOWN,
            config,
            renders: TypeId::REACT_NODE,
        })
    };
    // Accepting less is fine; accepting more is not.
    assert!(holds(&interner, component(small), component(large)));
    assert!(matches!(
        check(&interner, component(large), component(small)),
        Err(SubtypeFailureReason::TypeArgumentMismatch { name: "Config", .. })
    ));

    let function_component = func(&interner, vec![small], TypeId::NULL);
    assert!(holds(&interner, function_component, component(large)));
    let two_required = func(&interner, vec![small, TypeId::NUMBER], TypeId::NULL);
    assert!(!holds(&interner, two_required, component(large)));
}

#[test]
fn test_react_node() {
    let interner = TypeInterner::new();
    assert!(holds(&interner, TypeId::STRING, TypeId::REACT_NODE));
    assert!(holds(&interner, TypeId::NULL, TypeId::REACT_NODE));
    assert!(holds(
        &interner,
        interner.array(TypeId::NUMBER),
        TypeId::REACT_NODE
    ));
    assert!(!holds(&interner, interner.object(Vec::new()), TypeId::REACT_NODE));
}

#[test]
fn test_recursive_aliases_are_coinductive() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();
    let module = interner.intern_string("main");
    let head = interner.intern_string("head");
    let tail = interner.intern_string("tail");

    let mut lists = Vec::new();
    for name in ["ListA", "ListB"] {
        let def = store.register(DefinitionInfo::type_alias(
            interner.intern_string(name),
            module,
            Vec::new(),
        ));
        let lazy = interner.lazy(def);
        let body = interner.object(vec![
            PropertyInfo::new(head, TypeId::NUMBER),
            PropertyInfo::new(tail, interner.union2(lazy, TypeId::NULL)),
        ]);
        store.set_body(def, body);
        lists.push(lazy);
    }

    let mut checker = SubtypeChecker::new(&interner, &store);
    assert!(checker.is_subtype_of(lists[0], lists[1]));
    assert!(checker.is_subtype_of(lists[1], lists[0]));
    assert!(!checker.depth_exceeded());
}

#[test]
fn test_depth_limit_answers_true_and_is_recorded() {
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let nest = |leaf| {
        let inner = interner.object(vec![PropertyInfo::new(a, leaf)]);
        let middle = interner.object(vec![PropertyInfo::new(a, inner)]);
        interner.object(vec![PropertyInfo::new(a, middle)])
    };
    let mut checker = SubtypeChecker::new(&interner, &NoopResolver).with_max_depth(2);
    assert!(checker.is_subtype_of(nest(TypeId::NUMBER), nest(TypeId::STRING)));
    assert!(checker.depth_exceeded());

    let mut unlimited = SubtypeChecker::new(&interner, &NoopResolver);
    assert!(!unlimited.is_subtype_of(nest(TypeId::NUMBER), nest(TypeId::STRING)));
}

#[test]
fn test_class_instances_are_nominal() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();
    let module = interner.intern_string("main");
    let x = interner.intern_string("x");
    let body = interner.object(vec![PropertyInfo::new(x, TypeId::NUMBER)]);

    let base = store.register(
        DefinitionInfo::class(interner.intern_string("Base"), module, Vec::new()).with_body(body),
    );
    let derived = store.register(
        DefinitionInfo::class(interner.intern_string("Derived"), module, Vec::new())
            .with_body(body),
    );
    let other = store.register(
        DefinitionInfo::class(interner.intern_string("Other"), module, Vec::new())
            .with_body(body),
    );
    store.set_class_info(derived, Some(base), None);

    let mut checker = SubtypeChecker::new(&interner, &store);
    assert!(checker.is_subtype_of(interner.instance(derived), interner.instance(base)));
    assert!(!checker.is_subtype_of(interner.instance(other), interner.instance(base)));
    let structural = interner.inexact_object(vec![PropertyInfo::new(x, TypeId::NUMBER)]);
    assert!(checker.is_subtype_of(interner.instance(other), structural));
}

#[test]
fn test_type_parameter_uses_bound() {
    let interner = TypeInterner::new();
    let t = interner.intern_string("T");
    let bounded = interner.type_param(TypeParamInfo {
        bound: Some(TypeId::NUMBER),
        ..TypeParamInfo::new(t)
    });
    let unbounded = interner.type_param(TypeParamInfo::new(t));
    assert!(holds(&interner, bounded, TypeId::NUMBER));
    assert!(!holds(&interner, unbounded, TypeId::NUMBER));
    assert!(holds(&interner, unbounded, TypeId::UNKNOWN));
}

#[test]
fn test_exact_key_sets_must_match() {
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let narrow = interner.object(vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    let wide = interner.object(vec![
        PropertyInfo::new(a, TypeId::NUMBER),
        PropertyInfo::opt(b, TypeId::STRING),
    ]);
    assert!(!holds(&interner, narrow, wide));
    assert!(!holds(&interner, wide, narrow));

    let inexact_wide = interner.inexact_object(vec![
        PropertyInfo::new(a, TypeId::NUMBER),
        PropertyInfo::opt(b, TypeId::STRING),
    ]);
    assert!(holds(&interner, narrow, inexact_wide));
}

#[test]
fn test_rest_restored_by_spread() {
    let interner = TypeInterner::new();
    let x_key = interner.intern_string("x");
    let x = interner.type_param(TypeParamInfo {
        bound: Some(interner.inexact_object(Vec::new())),
        ..TypeParamInfo::new(interner.intern_string("X"))
    });
    let y = interner.type_param(TypeParamInfo {
        bound: Some(interner.inexact_object(vec![PropertyInfo::new(x_key, TypeId::NUMBER)])),
        ..TypeParamInfo::new(interner.intern_string("Y"))
    });
    let o = interner.spread(vec![x, y], true);
    let rest = interner.diff(o, interner.object(vec![PropertyInfo::new(x_key, TypeId::NUMBER)]));
    let restore = |value: TypeId| {
        let back = interner.object(vec![PropertyInfo::new(x_key, value)]);
        interner.spread(vec![rest, back], true)
    };

    assert!(holds(&interner, restore(interner.literal_number(42.0)), o));
    assert!(matches!(
        check(&interner, restore(TypeId::STRING), o),
        Err(SubtypeFailureReason::PropertyMismatch { .. })
    ));
    assert!(!holds(&interner, rest, o));

    let other = interner.intern_string("other");
    let wrong_keys = interner.spread(
        vec![rest, interner.object(vec![PropertyInfo::new(other, TypeId::NUMBER)])],
        true,
    );
    assert!(!holds(&interner, wrong_keys, o));
}
