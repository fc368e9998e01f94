use super::*;
use crate::context::CheckerOptions;
use crate::session::CheckSession;
use flint_ast::build::{ex, st, ty};
use flint_ast::{Program, Stmt};

fn check(mut body: Vec<Stmt>, element: Expr) -> Vec<CheckError> {
    body.push(st::expr(element));
    let program = Program {
        modules: vec![st::module("main", body)],
    };
    let session = CheckSession::new(program, CheckerOptions::default());
    let module = session.check_module("main").expect("module is checked");
    module.errors.iter().map(|(_, error)| error.clone()).collect()
}

fn greeting() -> Vec<Stmt> {
    vec![st::component(
        "Greeting",
        vec![],
        vec![st::component_param("name", ty::string())],
        None,
        vec![],
    )]
}

fn single(errors: &[CheckError]) -> &CheckError {
    assert_eq!(errors.len(), 1, "{errors:?}");
    &errors[0]
}

#[test]
fn test_matching_attributes() {
    let element = ex::jsx("Greeting", vec![ex::attr("name", Some(ex::str("Ada")))], vec![]);
    assert!(check(greeting(), element).is_empty());
}

#[test]
fn test_missing_required_attribute() {
    let errors = check(greeting(), ex::jsx("Greeting", vec![], vec![]));
    assert!(matches!(single(&errors), CheckError::IncompatibleType { .. }));
}

#[test]
fn test_excess_attribute_against_exact_config() {
    let element = ex::jsx(
        "Greeting",
        vec![
            ex::attr("name", Some(ex::str("Ada"))),
            ex::attr("extra", Some(ex::num(1.0))),
        ],
        vec![],
    );
    let errors = check(greeting(), element);
    assert!(matches!(single(&errors), CheckError::IncompatibleType { .. }));
}

#[test]
fn test_attribute_type_mismatch() {
    let element = ex::jsx("Greeting", vec![ex::attr("name", Some(ex::num(1.0)))], vec![]);
    let errors = check(greeting(), element);
    assert!(matches!(single(&errors), CheckError::IncompatibleType { .. }));
}

#[test]
fn test_key_and_ref_are_not_props() {
    let element = ex::jsx(
        "Greeting",
        vec![
            ex::attr("name", Some(ex::str("Ada"))),
            ex::attr("key", Some(ex::num(3.0))),
            ex::attr("ref", Some(ex::null())),
        ],
        vec![],
    );
    assert!(check(greeting(), element).is_empty());

    let element = ex::jsx(
        "Greeting",
        vec![
            ex::attr("name", Some(ex::str("Ada"))),
            ex::attr("key", Some(ex::bool(true))),
        ],
        vec![],
    );
    let errors = check(greeting(), element);
    assert!(matches!(single(&errors), CheckError::IncompatibleType { .. }));
}

#[test]
fn test_spread_attributes() {
    let mut body = greeting();
    body.push(st::declare_var("props", ty::exact(vec![ty::prop("name", ty::string())])));
    let element = ex::jsx("Greeting", vec![ex::attr_spread(ex::ident("props"))], vec![]);
    assert!(check(body, element).is_empty());
}

#[test]
fn test_children_prop() {
    let label = || {
        vec![st::component(
            "Label",
            vec![],
            vec![st::component_param("children", ty::string())],
            None,
            vec![],
        )]
    };
    assert!(check(label(), ex::jsx("Label", vec![], vec![ex::str("hi")])).is_empty());

    let errors = check(
        label(),
        ex::jsx("Label", vec![], vec![ex::str("a"), ex::str("b")]),
    );
    assert!(matches!(single(&errors), CheckError::IncompatibleType { .. }));
}

#[test]
fn test_function_component() {
    let card = || {
        vec![st::declare_function(
            "Card",
            ty::func(
                vec![ty::exact(vec![ty::prop("title", ty::string())])],
                ty::named("React.Node"),
            ),
        )]
    };
    let element = ex::jsx("Card", vec![ex::attr("title", Some(ex::str("t")))], vec![]);
    assert!(check(card(), element).is_empty());

    let errors = check(card(), ex::jsx("Card", vec![], vec![]));
    assert!(matches!(single(&errors), CheckError::IncompatibleType { .. }));
}

#[test]
fn test_generic_function_component_bound() {
    let body = vec![st::declare_function(
        "Num",
        ty::generic_func(
            vec![ty::bounded("T", ty::number())],
            vec![ty::exact(vec![ty::prop("value", ty::named("T"))])],
            ty::named("React.Node"),
        ),
    )];
    let element = ex::jsx("Num", vec![ex::attr("value", Some(ex::str("a")))], vec![]);
    let errors = check(body, element);
    let violations = errors
        .iter()
        .filter(|error| matches!(error, CheckError::BoundViolation { .. }))
        .count();
    assert_eq!(violations, 1, "{errors:?}");
}

#[test]
fn test_intrinsic_elements_are_unchecked() {
    let element = ex::jsx(
        "div",
        vec![ex::attr("anything", None), ex::attr("id", Some(ex::num(1.0)))],
        vec![ex::str("text")],
    );
    assert!(check(vec![], element).is_empty());
}

#[test]
fn test_unresolved_and_non_component() {
    let errors = check(vec![], ex::jsx("Missing", vec![], vec![]));
    assert!(matches!(single(&errors), CheckError::UnresolvedName { .. }));

    let body = vec![st::declare_var("Count", ty::number())];
    let errors = check(body, ex::jsx("Count", vec![], vec![]));
    assert!(matches!(single(&errors), CheckError::NotAComponent { ty: TypeId::NUMBER }));
}

#[test]
fn test_member_component_name() {
    let body = vec![st::declare_var(
        "UI",
        ty::exact(vec![ty::prop(
            "Button",
            ty::func(
                vec![ty::exact(vec![ty::prop("label", ty::string())])],
                ty::named("React.Node"),
            ),
        )]),
    )];
    let element = ex::jsx("UI.Button", vec![ex::attr("label", Some(ex::str("ok")))], vec![]);
    assert!(check(body.clone(), element).is_empty());

    let errors = check(body, ex::jsx("UI.Link", vec![], vec![]));
    assert!(matches!(single(&errors), CheckError::MissingProperty { .. }));
}

#[test]
fn test_untyped_component() {
    let body = vec![st::import_named("react-dom", &["Portal"])];
    let element = ex::jsx("Portal", vec![ex::attr("whatever", Some(ex::num(1.0)))], vec![]);
    assert!(check(body, element).is_empty());
}

#[test]
fn test_optional_prop_may_be_omitted() {
    let body = vec![st::component(
        "Avatar",
        vec![],
        vec![
            st::component_param("name", ty::string()),
            flint_ast::ComponentParam {
                optional: true,
                ..st::component_param("size", ty::number())
            },
        ],
        None,
        vec![],
    )];
    let element = ex::jsx("Avatar", vec![ex::attr("name", Some(ex::str("Ada")))], vec![]);
    let errors = check(body.clone(), element);
    assert!(errors.is_empty(), "{errors:?}");

    let element = ex::jsx(
        "Avatar",
        vec![
            ex::attr("name", Some(ex::str("Ada"))),
            ex::attr("size", Some(ex::str("big"))),
        ],
        vec![],
    );
    assert!(matches!(single(&check(body, element)), CheckError::IncompatibleType { .. }));
}
