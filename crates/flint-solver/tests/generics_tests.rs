use super::*;
use crate::def::NoopResolver;

fn tp(interner: &TypeInterner, name: &str) -> (TypeParamInfo, TypeId) {
    let info = TypeParamInfo::new(interner.intern_string(name));
    let ty = interner.type_param(info.clone());
    (info, ty)
}

#[test]
fn test_fill_defaults_with_earlier_arguments() {
    let interner = TypeInterner::new();
    let (a, a_ty) = tp(&interner, "A");
    let (b, _) = tp(&interner, "B");
    let b = TypeParamInfo {
        default: Some(interner.array(a_ty)),
        ..b
    };
    let args = fill_type_arguments(&interner, &[a, b], &[TypeId::NUMBER]);
    assert_eq!(args, vec![TypeId::NUMBER, interner.array(TypeId::NUMBER)]);
}

#[test]
fn test_fill_missing_without_default_uses_bound_then_mixed() {
    let interner = TypeInterner::new();
    let (a, _) = tp(&interner, "A");
    let a = TypeParamInfo {
        bound: Some(TypeId::STRING),
        ..a
    };
    let (b, _) = tp(&interner, "B");
    let args = fill_type_arguments(&interner, &[a, b], &[]);
    assert_eq!(args, vec![TypeId::STRING, TypeId::UNKNOWN]);
}

#[test]
fn test_too_many_arguments() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner, &NoopResolver);
    let (a, _) = tp(&interner, "A");
    let err = instantiate_params(
        &mut checker,
        "Box",
        &[a],
        &[TypeId::NUMBER, TypeId::STRING],
        None,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CheckError::Arity {
            expected: 1,
            got: 2,
            kind: ArityKind::TooMany,
            ..
        }
    ));
}

#[test]
fn test_bound_violation_is_collected() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner, &NoopResolver);
    let (t, _) = tp(&interner, "T");
    let t = TypeParamInfo {
        bound: Some(TypeId::NUMBER),
        ..t
    };
    let result = instantiate_params(&mut checker, "F", &[t], &[TypeId::STRING], None)
        .expect("arity is fine");
    assert_eq!(result.args, vec![TypeId::STRING]);
    assert_eq!(result.violations.len(), 1);

    let ok = instantiate_params(
        &mut checker,
        "F",
        &[TypeParamInfo {
            bound: Some(TypeId::NUMBER),
            ..TypeParamInfo::new(interner.intern_string("T"))
        }],
        &[interner.literal_number(1.0)],
        None,
    )
    .expect("arity is fine");
    assert!(ok.violations.is_empty());
}

#[test]
fn test_placeholder_uses_inferred_argument() {
    let interner = TypeInterner::new();
    let mut checker = SubtypeChecker::new(&interner, &NoopResolver);
    let (t, _) = tp(&interner, "T");
    let mut inferred = TypeSubstitution::new();
    inferred.insert(t.name, TypeId::BOOLEAN);
    let result =
        instantiate_params(&mut checker, "F", &[t], &[TypeId::NONE], Some(&inferred)).expect("ok");
    assert_eq!(result.args, vec![TypeId::BOOLEAN]);
}

#[test]
fn test_inference_widens_literals_on_request() {
    let interner = TypeInterner::new();
    let mut eval = TypeEvaluator::new(&interner, &NoopResolver);
    let (t, t_ty) = tp(&interner, "T");
    let mut context = InferenceContext::for_params(&[t.clone()]);
    let one = interner.literal_number(1.0);
    context.infer(&mut eval, one, t_ty);
    assert_eq!(context.candidates(t.name), &[one]);

    assert_eq!(context.resolve(&interner, true).get(t.name), Some(TypeId::NUMBER));
    assert_eq!(context.resolve(&interner, false).get(t.name), Some(one));
}

#[test]
fn test_inference_through_structure() {
    let interner = TypeInterner::new();
    let mut eval = TypeEvaluator::new(&interner, &NoopResolver);
    let (t, t_ty) = tp(&interner, "T");
    let value = interner.intern_string("value");
    let pattern = interner.object(vec![PropertyInfo::new(value, interner.array(t_ty))]);
    let source = interner.object(vec![PropertyInfo::new(
        value,
        interner.array(TypeId::STRING),
    )]);
    let mut context = InferenceContext::for_params(&[t.clone()]);
    context.infer(&mut eval, source, pattern);
    assert_eq!(context.resolve(&interner, true).get(t.name), Some(TypeId::STRING));
}

#[test]
fn test_inference_skips_fixed_union_members() {
    let interner = TypeInterner::new();
    let mut eval = TypeEvaluator::new(&interner, &NoopResolver);
    let (t, t_ty) = tp(&interner, "T");
    let pattern = interner.union2(t_ty, TypeId::NULL);
    let source = interner.union2(TypeId::STRING, TypeId::NULL);
    let mut context = InferenceContext::for_params(&[t.clone()]);
    context.infer(&mut eval, source, pattern);
    assert_eq!(context.candidates(t.name), &[TypeId::STRING]);
}

#[test]
fn test_widen_literal() {
    let interner = TypeInterner::new();
    assert_eq!(widen_literal(&interner, interner.literal_string("x")), TypeId::STRING);
    assert_eq!(widen_literal(&interner, TypeId::BOOLEAN_TRUE), TypeId::BOOLEAN);
    assert_eq!(widen_literal(&interner, TypeId::NULL), TypeId::NULL);
}
