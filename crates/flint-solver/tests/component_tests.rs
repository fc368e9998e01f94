use super::*;
use crate::def::NoopResolver;
use crate::subtype::SubtypeChecker;

#[test]
fn test_abstract_component_defaults() {
    let interner = TypeInterner::new();
    let config = interner.object(Vec::new());
    let ty = abstract_component(&interner, &[config]).expect("one argument");
    assert_eq!(
        interner.lookup(ty),
        Some(TypeData::Component(ComponentType {
            props: config,
            instance: TypeId::UNKNOWN,
            config,
            renders: TypeId::REACT_NODE,
        }))
    );
}

#[test]
fn test_abstract_component_arity() {
    let interner = TypeInterner::new();
    let too_many = abstract_component(&interner, &[TypeId::ANY; 4]);
    assert!(matches!(
        too_many,
        Err(CheckError::Arity {
            kind: ArityKind::TooMany,
            expected: 3,
            got: 4,
            ..
        })
    ));
    assert!(matches!(
        abstract_component(&interner, &[]),
        Err(CheckError::Arity {
            kind: ArityKind::TooFew,
            ..
        })
    ));
}

#[test]
fn test_renders_modes() {
    let interner = TypeInterner::new();
    let element = interner.element(TypeId::ANY);
    assert_eq!(renders_type(&interner, RendersMode::Exactly, element), element);

    let maybe = renders_type(&interner, RendersMode::Maybe, element);
    let mut checker = SubtypeChecker::new(&interner, &NoopResolver);
    assert!(checker.is_subtype_of(TypeId::NULL, maybe));
    assert!(checker.is_subtype_of(TypeId::BOOLEAN_FALSE, maybe));
    assert!(!checker.is_subtype_of(interner.array(element), maybe));

    let star = renders_type(&interner, RendersMode::Star, element);
    assert!(checker.is_subtype_of(interner.array(element), star));
}

#[test]
fn test_default_props_make_config_keys_optional() {
    let interner = TypeInterner::new();
    let mut eval = TypeEvaluator::new(&interner, &NoopResolver);
    let name = interner.intern_string("name");
    let size = interner.intern_string("size");
    let props = interner.object(vec![
        PropertyInfo::new(name, TypeId::STRING),
        PropertyInfo::new(size, TypeId::NUMBER),
    ]);
    let defaults = interner.object(vec![PropertyInfo::new(size, TypeId::NUMBER)]);
    let component = ComponentType {
        props,
        instance: TypeId::UNKNOWN,
        config: props,
        renders: TypeId::REACT_NODE,
    };
    let with_defaults = with_default_props(&mut eval, &component, defaults);

    let expected_config = interner.object(vec![
        PropertyInfo::new(name, TypeId::STRING),
        PropertyInfo::opt(size, TypeId::NUMBER),
    ]);
    assert_eq!(
        interner.lookup(with_defaults),
        Some(TypeData::Component(ComponentType {
            config: expected_config,
            ..component
        }))
    );
}

#[test]
fn test_default_props_on_generic_props_are_ignored() {
    let interner = TypeInterner::new();
    let mut eval = TypeEvaluator::new(&interner, &NoopResolver);
    let generic = interner.type_param(TypeParamInfo::new(interner.intern_string("P")));
    let defaults = interner.object(Vec::new());
    assert_eq!(props_with_defaults(&mut eval, generic, defaults), generic);
}

#[test]
fn test_hoc_props_transforms() {
    let interner = TypeInterner::new();
    let mut eval = TypeEvaluator::new(&interner, &NoopResolver);
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let props = interner.object(vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    let extra = interner.object(vec![PropertyInfo::new(b, TypeId::STRING)]);

    let extended = eval.evaluate(extend_props(&interner, props, extra));
    assert_eq!(
        extended,
        interner.object(vec![
            PropertyInfo::new(a, TypeId::NUMBER),
            PropertyInfo::new(b, TypeId::STRING),
        ])
    );

    let removed = remove_props(&mut eval, extended, &[a]);
    assert_eq!(removed, Some(extra));
}

#[test]
fn test_function_components() {
    let interner = TypeInterner::new();
    let mut eval = TypeEvaluator::new(&interner, &NoopResolver);
    let props = interner.object(Vec::new());
    let unary = interner.function(FunctionShape::new(
        vec![ParamInfo::required(props)],
        TypeId::NULL,
    ));
    let component = component_of(&mut eval, unary).expect("function component");
    assert_eq!(component.config, props);
    assert_eq!(component.instance, TypeId::VOID);
    assert_eq!(component.renders, TypeId::NULL);

    let nullary = interner.function(FunctionShape::new(Vec::new(), TypeId::NULL));
    assert_eq!(
        component_of(&mut eval, nullary).map(|c| c.props),
        Some(interner.object(Vec::new()))
    );

    let binary = interner.function(FunctionShape::new(
        vec![ParamInfo::required(props), ParamInfo::required(TypeId::NUMBER)],
        TypeId::NULL,
    ));
    assert_eq!(component_of(&mut eval, binary), None);
    assert_eq!(component_of(&mut eval, TypeId::NUMBER), None);
}
