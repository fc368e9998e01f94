use super::*;
use crate::def::{DefinitionInfo, DefinitionStore, NoopResolver};

fn print(interner: &TypeInterner, ty: TypeId) -> String {
    format_type(interner, &NoopResolver, ty)
}

#[test]
fn test_intrinsics_and_literals() {
    let interner = TypeInterner::new();
    assert_eq!(print(&interner, TypeId::UNKNOWN), "mixed");
    assert_eq!(print(&interner, TypeId::NEVER), "empty");
    assert_eq!(print(&interner, TypeId::ERROR), "any");
    assert_eq!(print(&interner, interner.literal_string("a")), "'a'");
    assert_eq!(print(&interner, interner.literal_number(3.0)), "3");
    assert_eq!(print(&interner, interner.literal_number(1.5)), "1.5");
    assert_eq!(print(&interner, TypeId::BOOLEAN_TRUE), "true");
}

#[test]
fn test_objects() {
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let exact = interner.object(vec![
        PropertyInfo::new(a, TypeId::NUMBER),
        PropertyInfo::opt(b, TypeId::STRING),
    ]);
    assert_eq!(print(&interner, exact), "{|a: number, b?: string|}");

    let inexact = interner.inexact_object(vec![PropertyInfo::readonly(a, TypeId::NUMBER)]);
    assert_eq!(print(&interner, inexact), "{+a: number, ...}");
    assert_eq!(print(&interner, interner.object(Vec::new())), "{||}");
    assert_eq!(print(&interner, interner.inexact_object(Vec::new())), "{...}");
}

#[test]
fn test_functions_in_unions_are_parenthesized() {
    let interner = TypeInterner::new();
    let x = interner.intern_string("x");
    let f = interner.function(FunctionShape::new(
        vec![ParamInfo {
            name: Some(x),
            ..ParamInfo::required(TypeId::NUMBER)
        }],
        TypeId::VOID,
    ));
    assert_eq!(print(&interner, f), "(x: number) => void");
    let union = interner.union2(f, TypeId::NULL);
    assert_eq!(print(&interner, union), "((x: number) => void) | null");
}

#[test]
fn test_containers() {
    let interner = TypeInterner::new();
    assert_eq!(print(&interner, interner.array(TypeId::STRING)), "Array<string>");
    assert_eq!(
        print(&interner, interner.readonly_array(TypeId::STRING)),
        "$ReadOnlyArray<string>"
    );
    assert_eq!(
        print(&interner, interner.tuple(vec![TypeId::NUMBER, TypeId::STRING])),
        "[number, string]"
    );
    assert_eq!(
        print(
            &interner,
            interner.builtin(BuiltinKind::Map, vec![TypeId::STRING, TypeId::NUMBER])
        ),
        "Map<string, number>"
    );
    assert_eq!(
        print(&interner, interner.iterator(TypeId::NUMBER, TypeId::VOID, TypeId::VOID)),
        "$Iterator<number, void, void>"
    );
}

#[test]
fn test_recursive_alias_prints_by_name() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();
    let name = interner.intern_string("T");
    let module = interner.intern_string("main");
    let def = store.register(DefinitionInfo::type_alias(name, module, Vec::new()));
    let alias = interner.lazy(def);
    let body = interner.union2(TypeId::NULL, alias);
    store.set_body(def, body);

    assert_eq!(format_type(&interner, &store, body), "null | T");
    assert_eq!(format_type(&interner, &store, alias), "T");
}

#[test]
fn test_mapped_type() {
    let interner = TypeInterner::new();
    let k = interner.intern_string("K");
    let o = interner.intern_string("O");
    let o_ty = interner.type_param(TypeParamInfo::new(o));
    let k_ty = interner.type_param(TypeParamInfo::new(k));
    let mapped = interner.mapped(MappedType {
        key_param: TypeParamInfo::new(k),
        source: KeySource::KeyOf(o_ty),
        template: interner.index_access(o_ty, k_ty),
        optional: Some(MappedModifier::Add),
        variance: Some(Variance::ReadOnly),
    });
    assert_eq!(print(&interner, mapped), "{+[K in keyof O]?: O[K]}");
}
