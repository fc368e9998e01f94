use super::build::{ex, st, ty};
use super::*;

#[test]
fn test_module_deserializes_from_json() {
    let json = r#"{
        "name": "./box",
        "source": "let box: Box = null;",
        "body": [
            {
                "type": "typeAlias",
                "name": {"name": "Box"},
                "body": {
                    "type": "object",
                    "exact": true,
                    "members": [
                        {"member": "property", "name": "type", "variance": "plus",
                         "value": {"type": "stringLiteral", "value": "GOOD"}}
                    ]
                }
            },
            {
                "type": "varDecl",
                "kind": "let",
                "name": {"name": "box", "span": {"start": 4, "end": 7}},
                "annotation": {"type": "reference", "name": "Box"},
                "init": {"type": "null", "span": {"start": 15, "end": 19}},
                "span": {"start": 0, "end": 20}
            }
        ]
    }"#;

    let module: Module = serde_json::from_str(json).expect("valid module");
    assert_eq!(module.name, "./box");
    assert_eq!(module.body.len(), 2);

    let StmtKind::TypeAlias(alias) = &module.body[0].kind else {
        panic!("expected a type alias, got {:?}", module.body[0].kind);
    };
    let TypeNodeKind::Object { exact, members } = &alias.body.kind else {
        panic!("expected an object type");
    };
    assert!(*exact);
    assert!(matches!(
        &members[0],
        ObjectMember::Property { variance: VarianceAnnotation::Plus, optional: false, .. }
    ));

    let StmtKind::VarDecl(decl) = &module.body[1].kind else {
        panic!("expected a declaration");
    };
    assert_eq!(decl.kind, VarKind::Let);
    assert_eq!(decl.name.span, flint_common::Span::new(4, 7));
    assert_eq!(module.body[1].span, flint_common::Span::new(0, 20));
    assert_eq!(
        decl.init.as_ref().map(|e| e.span),
        Some(flint_common::Span::new(15, 19))
    );
}

#[test]
fn test_builders_match_serialized_shape() {
    let stmt = st::const_("x", Some(ty::nullable(ty::number())), ex::num(1.0)).at(0, 10);
    let json = serde_json::to_value(&stmt).expect("serializes");
    assert_eq!(json["type"], "varDecl");
    assert_eq!(json["annotation"]["type"], "nullable");
    assert_eq!(json["init"]["value"], 1.0);
    let back: Stmt = serde_json::from_value(json).expect("deserializes");
    assert_eq!(back, stmt);
}

#[test]
fn test_import_kinds() {
    let ns = st::import_namespace("./lib", "Lib");
    let json = serde_json::to_value(&ns).expect("serializes");
    assert_eq!(json["type"], "import");
    assert_eq!(json["kind"], "namespace");
    assert_eq!(json["local"]["name"], "Lib");

    let types = st::import_type("./sig", &["Component"]);
    let StmtKind::Import(decl) = &types.kind else {
        panic!("expected an import");
    };
    assert!(decl.type_only);
}

#[test]
fn test_object_pattern_from_json() {
    let json = r#"{
        "type": "destructure",
        "kind": "var",
        "properties": [{"key": "x", "binding": {"name": "x"}}],
        "rest": {"name": "rest"},
        "init": {"type": "ident", "name": "o"}
    }"#;
    let stmt: Stmt = serde_json::from_str(json).expect("valid pattern");
    let StmtKind::Destructure(pattern) = &stmt.kind else {
        panic!("expected a destructuring, got {:?}", stmt.kind);
    };
    let names: Vec<&str> = pattern.bindings().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["x", "rest"]);
    assert_eq!(pattern.kind, VarKind::Var);
    assert!(pattern.annotation.is_none());
    assert_eq!(stmt, st::destructure(VarKind::Var, &[("x", "x")], Some("rest"), ex::ident("o")));
}
