//! Mapped type evaluation: identity, modifiers and deferral.

use super::*;
use flint_common::Atom;

struct Fixture {
    interner: TypeInterner,
    k: Atom,
    o: Atom,
}

impl Fixture {
    fn new() -> Self {
        let interner = TypeInterner::new();
        let k = interner.intern_string("K");
        let o = interner.intern_string("O");
        Self { interner, k, o }
    }

    fn k_ty(&self) -> TypeId {
        self.interner.type_param(TypeParamInfo::new(self.k))
    }

    fn o_ty(&self) -> TypeId {
        self.interner.type_param(TypeParamInfo::new(self.o))
    }

    /// `{[K in keyof source]: source[K]}` with modifiers.
    fn homomorphic(
        &self,
        source: TypeId,
        optional: Option<MappedModifier>,
        variance: Option<Variance>,
    ) -> TypeId {
        self.interner.mapped(MappedType {
            key_param: TypeParamInfo::new(self.k),
            source: KeySource::KeyOf(source),
            template: self.interner.index_access(source, self.k_ty()),
            optional,
            variance,
        })
    }

    fn eval(&self, ty: TypeId) -> TypeId {
        evaluate_type(&self.interner, &NoopResolver, ty)
    }

    fn subst_o(&self, ty: TypeId, arg: TypeId) -> TypeId {
        let mut subst = TypeSubstitution::new();
        subst.insert(self.o, arg);
        instantiate_type(&self.interner, ty, &subst)
    }
}

fn varied_object(interner: &TypeInterner) -> TypeId {
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let c = interner.intern_string("c");
    let m = interner.intern_string("m");
    let method = interner.function(FunctionShape::new(Vec::new(), TypeId::VOID));
    interner.object(vec![
        PropertyInfo::new(a, TypeId::NUMBER),
        PropertyInfo::opt(b, TypeId::STRING),
        PropertyInfo::readonly(c, interner.union2(TypeId::NULL, TypeId::BOOLEAN)),
        PropertyInfo::method(m, method),
    ])
}

#[test]
fn test_identity_mapping_reproduces_source() {
    let f = Fixture::new();
    let source = varied_object(&f.interner);
    let mapped = f.homomorphic(source, None, None);
    assert_eq!(f.eval(mapped), source);

    let inexact = f.interner.inexact_object(vec![PropertyInfo::new(
        f.interner.intern_string("x"),
        TypeId::NUMBER,
    )]);
    assert_eq!(f.eval(f.homomorphic(inexact, None, None)), inexact);
}

#[test]
fn test_generic_mapping_defers_until_instantiated() {
    let f = Fixture::new();
    let mapped = f.homomorphic(f.o_ty(), None, None);
    assert_eq!(f.eval(mapped), mapped);

    let source = varied_object(&f.interner);
    let instantiated = f.subst_o(mapped, source);
    assert_eq!(f.eval(instantiated), source);
}

#[test]
fn test_optional_modifiers() {
    let f = Fixture::new();
    let a = f.interner.intern_string("a");
    let b = f.interner.intern_string("b");
    let source = f.interner.object(vec![
        PropertyInfo::new(a, TypeId::NUMBER),
        PropertyInfo::opt(b, TypeId::STRING),
    ]);

    let partial = f.eval(f.homomorphic(source, Some(MappedModifier::Add), None));
    assert_eq!(
        partial,
        f.interner.object(vec![
            PropertyInfo::opt(a, TypeId::NUMBER),
            PropertyInfo::opt(b, TypeId::STRING),
        ])
    );

    let required = f.eval(f.homomorphic(source, Some(MappedModifier::Remove), None));
    assert_eq!(
        required,
        f.interner.object(vec![
            PropertyInfo::new(a, TypeId::NUMBER),
            PropertyInfo::new(b, TypeId::STRING),
        ])
    );
}

#[test]
fn test_variance_modifiers() {
    let f = Fixture::new();
    let a = f.interner.intern_string("a");
    let b = f.interner.intern_string("b");
    let source = f.interner.object(vec![
        PropertyInfo::new(a, TypeId::NUMBER),
        PropertyInfo {
            variance: Variance::WriteOnly,
            ..PropertyInfo::new(b, TypeId::STRING)
        },
    ]);

    // Read-only over a write-only key cannot be expressed.
    let covariant = f.eval(f.homomorphic(source, None, Some(Variance::ReadOnly)));
    assert_eq!(
        covariant,
        f.interner.object(vec![
            PropertyInfo::readonly(a, TypeId::NUMBER),
            PropertyInfo::readonly(b, TypeId::UNKNOWN),
        ])
    );
}

#[test]
fn test_key_union_mapping_is_exact() {
    let f = Fixture::new();
    let keys = f.interner.union2(
        f.interner.literal_string("x"),
        f.interner.literal_string("y"),
    );
    let mapped = f.interner.mapped(MappedType {
        key_param: TypeParamInfo::new(f.k),
        source: KeySource::Keys(keys),
        template: TypeId::BOOLEAN,
        optional: None,
        variance: None,
    });
    let x = f.interner.intern_string("x");
    let y = f.interner.intern_string("y");
    assert_eq!(
        f.eval(mapped),
        f.interner.object(vec![
            PropertyInfo::new(x, TypeId::BOOLEAN),
            PropertyInfo::new(y, TypeId::BOOLEAN),
        ])
    );
}

#[test]
fn test_string_keys_become_indexer() {
    let f = Fixture::new();
    let mapped = f.interner.mapped(MappedType {
        key_param: TypeParamInfo::new(f.k),
        source: KeySource::Keys(TypeId::STRING),
        template: TypeId::NUMBER,
        optional: None,
        variance: None,
    });
    let shape = f
        .interner
        .object_shape_of(f.eval(mapped))
        .expect("eager mapping");
    let indexer = shape.indexer.as_ref().expect("indexer");
    assert_eq!(indexer.key_type, TypeId::STRING);
    assert_eq!(indexer.value_type, TypeId::NUMBER);
}

#[test]
fn test_template_over_keys() {
    let f = Fixture::new();
    let a = f.interner.intern_string("a");
    let source = f.interner.object(vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    // {[K in keyof O]: Array<O[K]>}
    let mapped = f.interner.mapped(MappedType {
        key_param: TypeParamInfo::new(f.k),
        source: KeySource::KeyOf(source),
        template: f.interner.array(f.interner.index_access(source, f.k_ty())),
        optional: None,
        variance: None,
    });
    assert_eq!(
        f.eval(mapped),
        f.interner
            .object(vec![PropertyInfo::new(a, f.interner.array(TypeId::NUMBER))])
    );
}

#[test]
fn test_mapped_result_is_subtype_compatible() {
    let f = Fixture::new();
    let source = varied_object(&f.interner);
    let readonly = f.homomorphic(source, None, Some(Variance::ReadOnly));
    let mut checker = SubtypeChecker::new(&f.interner, &NoopResolver);
    assert!(checker.is_subtype_of(source, readonly));
}
