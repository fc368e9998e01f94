use super::*;

fn param(interner: &TypeInterner, name: &str) -> (Atom, TypeId) {
    let atom = interner.intern_string(name);
    (atom, interner.type_param(TypeParamInfo::new(atom)))
}

#[test]
fn test_substitutes_nested_parameters() {
    let interner = TypeInterner::new();
    let (t, t_ty) = param(&interner, "T");
    let value = interner.intern_string("value");
    let boxed = interner.object(vec![PropertyInfo::new(value, interner.array(t_ty))]);

    let mut subst = TypeSubstitution::new();
    subst.insert(t, TypeId::NUMBER);
    let result = instantiate_type(&interner, boxed, &subst);

    let expected = interner.object(vec![PropertyInfo::new(value, interner.array(TypeId::NUMBER))]);
    assert_eq!(result, expected);
}

#[test]
fn test_empty_substitution_is_identity() {
    let interner = TypeInterner::new();
    let (_, t_ty) = param(&interner, "T");
    let ty = interner.union2(t_ty, TypeId::NULL);
    assert_eq!(instantiate_type(&interner, ty, &TypeSubstitution::new()), ty);
}

#[test]
fn test_function_type_params_shadow_outer() {
    let interner = TypeInterner::new();
    let (t, t_ty) = param(&interner, "T");
    let mut inner = FunctionShape::new(vec![ParamInfo::required(t_ty)], t_ty);
    inner.type_params = vec![TypeParamInfo::new(t)];
    let generic_fn = interner.function(inner);

    let outer = interner.tuple(vec![t_ty, generic_fn]);
    let mut subst = TypeSubstitution::new();
    subst.insert(t, TypeId::STRING);
    let result = instantiate_type(&interner, outer, &subst);

    assert_eq!(result, interner.tuple(vec![TypeId::STRING, generic_fn]));
}

#[test]
fn test_from_args_pairs_positionally() {
    let interner = TypeInterner::new();
    let (a, _) = param(&interner, "A");
    let (b, _) = param(&interner, "B");
    let params = vec![TypeParamInfo::new(a), TypeParamInfo::new(b)];
    let subst = TypeSubstitution::from_args(&params, &[TypeId::NUMBER]);
    assert_eq!(subst.get(a), Some(TypeId::NUMBER));
    assert_eq!(subst.get(b), None);
    assert_eq!(subst.len(), 1);
}

#[test]
fn test_instantiation_stops_at_depth_limit() {
    let interner = TypeInterner::new();
    let (t, t_ty) = param(&interner, "T");
    let nest = |levels: u32| (0..levels).fold(t_ty, |inner, _| interner.array(inner));
    let mut subst = TypeSubstitution::new();
    subst.insert(t, TypeId::NUMBER);

    let shallow = nest(10);
    let expected = (0..10).fold(TypeId::NUMBER, |inner, _| interner.array(inner));
    assert_eq!(instantiate_type(&interner, shallow, &subst), expected);

    // Past the limit the parameter is left in place, so the rebuilt
    // layers intern back to the original type.
    let deep = nest(flint_common::limits::MAX_INSTANTIATION_DEPTH + 10);
    assert_eq!(instantiate_type(&interner, deep, &subst), deep);
}
