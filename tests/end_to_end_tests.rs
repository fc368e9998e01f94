//! End-to-end checks over hand-built programs.
//!
//! Each fixture is a small program of one or more modules, checked through
//! a `CheckSession` the way the `flint` binary does it.

use flint::ast::build::{ex, st, ty};
use flint::ast::{Function, OptionalModifier, Stmt, VarKind, VarianceAnnotation};
use flint::solver::{CheckError, ReassignmentReason};
use flint::{CheckMode, CheckSession, CheckerOptions, Program};

fn session_with(modules: Vec<(&str, Vec<Stmt>)>, options: CheckerOptions) -> CheckSession {
    let modules = modules
        .into_iter()
        .map(|(name, body)| st::module(name, body))
        .collect();
    CheckSession::new(Program { modules }, options)
}

fn errors(session: &CheckSession, module: &str) -> Vec<CheckError> {
    let checked = session.check_module(module).expect("module exists");
    checked.errors.iter().map(|(_, error)| error.clone()).collect()
}

fn check(body: Vec<Stmt>) -> Vec<CheckError> {
    let session = session_with(vec![("main", body)], CheckerOptions::default());
    errors(&session, "main")
}

fn is_incompatible(error: &CheckError) -> bool {
    matches!(error, CheckError::IncompatibleType { .. })
}

// =============================================================================
// Refinement across suspension points
// =============================================================================

/// `async function run() { let box: string | number = "a"; [schedule(() => box = 1)];
/// if (typeof box === "string") { await p; (box: string); } }`
fn await_fixture(closure_writes: bool) -> Vec<Stmt> {
    let mut body = vec![st::let_(
        "box",
        Some(ty::union(vec![ty::string(), ty::number()])),
        Some(ex::str("a")),
    )];
    if closure_writes {
        body.push(st::expr(ex::call(
            ex::ident("schedule"),
            vec![ex::arrow(
                vec![],
                vec![st::expr(ex::assign(ex::ident("box"), ex::num(1.0)))],
            )],
        )));
    }
    body.push(st::if_(
        ex::strict_eq(
            ex::unary(flint::ast::UnaryOp::Typeof, ex::ident("box")),
            ex::str("string"),
        ),
        vec![
            st::expr(ex::await_(ex::ident("p"))),
            st::expr(ex::cast(ex::ident("box"), ty::string())),
        ],
        None,
    ));
    vec![
        st::declare_var("p", ty::app("Promise", vec![ty::void()])),
        st::declare_function(
            "schedule",
            ty::func(vec![ty::func(vec![], ty::void())], ty::void()),
        ),
        st::function_decl(Function {
            is_async: true,
            ..st::function("run", vec![], Some(ty::app("Promise", vec![ty::void()])), body)
        }),
    ]
}

#[test]
fn test_refinement_survives_await_without_closure_writes() {
    let errors = check(await_fixture(false));
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn test_refinement_invalidated_by_closure_write_across_await() {
    let errors = check(await_fixture(true));
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(is_incompatible(&errors[0]));
}

// =============================================================================
// Export reachability
// =============================================================================

fn reassignments(errors: &[CheckError]) -> Vec<ReassignmentReason> {
    errors
        .iter()
        .filter_map(|error| match error {
            CheckError::InvalidReassignment { reason, .. } => Some(*reason),
            _ => None,
        })
        .collect()
}

#[test]
fn test_binding_reachable_from_default_export_is_pinned() {
    let body = || {
        vec![
            st::let_("state", None, Some(ex::num(0.0))),
            st::const_("api", None, ex::object(vec![ex::shorthand("state")])),
            st::export_default(ex::ident("api")),
            st::expr(ex::assign(ex::ident("state"), ex::num(1.0))),
        ]
    };

    let single = session_with(vec![("store", body())], CheckerOptions::default());
    assert!(reassignments(&errors(&single, "store")).is_empty());

    let whole = session_with(
        vec![("store", body())],
        CheckerOptions::default().with_mode(CheckMode::WholeProgram),
    );
    assert_eq!(
        reassignments(&errors(&whole, "store")),
        vec![ReassignmentReason::Exported]
    );
}

#[test]
fn test_imports_are_never_reassignable() {
    let lib = vec![st::export(st::let_("count", Some(ty::number()), Some(ex::num(0.0))))];
    let main = vec![
        st::import_named("lib", &["count"]),
        st::import_namespace("lib", "Lib"),
        st::expr(ex::assign(ex::ident("count"), ex::num(1.0))),
        st::expr(ex::assign(ex::member(ex::ident("Lib"), "count"), ex::num(2.0))),
    ];
    let session = session_with(vec![("lib", lib), ("main", main)], CheckerOptions::default());
    assert_eq!(
        reassignments(&errors(&session, "main")),
        vec![ReassignmentReason::Import, ReassignmentReason::NamespaceImport]
    );
}

// =============================================================================
// Opaque types
// =============================================================================

#[test]
fn test_opaque_type_is_transparent_only_at_home() {
    let lib = vec![
        st::export(st::opaque_type("Id", vec![], Some(ty::string()), Some(ty::string()))),
        st::const_("own", Some(ty::named("Id")), ex::str("x")),
    ];
    let main = vec![
        st::import_type("lib", &["Id"]),
        st::declare_var("id", ty::named("Id")),
        st::const_("s", Some(ty::string()), ex::ident("id")),
        st::const_("forged", Some(ty::named("Id")), ex::str("y")),
    ];
    let session = session_with(vec![("lib", lib), ("main", main)], CheckerOptions::default());
    assert!(errors(&session, "lib").is_empty());

    let errors = errors(&session, "main");
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(is_incompatible(&errors[0]));
}

// =============================================================================
// Mapped types and recursive aliases
// =============================================================================

fn props_alias() -> Stmt {
    st::type_alias(
        "Props",
        vec![],
        ty::exact(vec![ty::prop("a", ty::number()), ty::prop("b", ty::string())]),
    )
}

#[test]
fn test_mapped_type_over_alias_keys() {
    let partial = st::type_alias(
        "PartialProps",
        vec![],
        ty::mapped_with(
            "K",
            ty::keyof(ty::named("Props")),
            ty::index(ty::named("Props"), ty::named("K")),
            Some(OptionalModifier::Add),
            VarianceAnnotation::None,
        ),
    );

    let errors = check(vec![
        props_alias(),
        partial.clone(),
        st::const_(
            "p",
            Some(ty::named("PartialProps")),
            ex::object(vec![ex::init("a", ex::num(1.0))]),
        ),
    ]);
    assert!(errors.is_empty(), "{errors:?}");

    let errors = check(vec![
        props_alias(),
        partial,
        st::const_(
            "q",
            Some(ty::named("PartialProps")),
            ex::object(vec![ex::init("a", ex::str("one"))]),
        ),
    ]);
    assert!(!errors.is_empty());
    assert!(errors.iter().all(is_incompatible), "{errors:?}");
}

fn list_alias(name: &str) -> Stmt {
    st::type_alias(
        name,
        vec![],
        ty::inexact(vec![
            ty::prop("head", ty::number()),
            ty::prop("tail", ty::nullable(ty::named(name))),
        ]),
    )
}

#[test]
fn test_structurally_equal_recursive_aliases() {
    let errors = check(vec![
        list_alias("ListA"),
        list_alias("ListB"),
        st::declare_var("a", ty::named("ListA")),
        st::const_("b", Some(ty::named("ListB")), ex::ident("a")),
        st::const_("c", Some(ty::named("ListA")), ex::ident("b")),
    ]);
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn test_recursive_alias_rejects_bad_tail() {
    let errors = check(vec![
        list_alias("List"),
        st::declare_var(
            "bad",
            ty::inexact(vec![
                ty::prop("head", ty::number()),
                ty::prop(
                    "tail",
                    ty::inexact(vec![
                        ty::prop("head", ty::string()),
                        ty::prop("tail", ty::null()),
                    ]),
                ),
            ]),
        ),
        st::const_("l", Some(ty::named("List")), ex::ident("bad")),
    ]);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(is_incompatible(&errors[0]));
}

// =============================================================================
// Components
// =============================================================================

/// `declare function withTheme<P>(c: React.AbstractComponent<P>): React.AbstractComponent<P>`
fn hoc_fixture(element: flint::ast::Expr) -> Vec<Stmt> {
    vec![
        st::component(
            "Greeting",
            vec![],
            vec![st::component_param("name", ty::string())],
            None,
            vec![],
        ),
        st::declare_function(
            "withTheme",
            ty::generic_func(
                vec![ty::tparam("P")],
                vec![ty::app("React.AbstractComponent", vec![ty::named("P")])],
                ty::app("React.AbstractComponent", vec![ty::named("P")]),
            ),
        ),
        st::const_(
            "Themed",
            None,
            ex::call(ex::ident("withTheme"), vec![ex::ident("Greeting")]),
        ),
        st::expr(element),
    ]
}

#[test]
fn test_higher_order_component_keeps_config() {
    let ok = ex::jsx("Themed", vec![ex::attr("name", Some(ex::str("Ada")))], vec![]);
    let errors = check(hoc_fixture(ok));
    assert!(errors.is_empty(), "{errors:?}");

    let bad = ex::jsx("Themed", vec![ex::attr("name", Some(ex::num(1.0)))], vec![]);
    let errors = check(hoc_fixture(bad));
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(is_incompatible(&errors[0]));
}

// =============================================================================
// Iteration
// =============================================================================

#[test]
fn test_for_of_element_type() {
    let errors = check(vec![
        st::declare_var("names", ty::array(ty::string())),
        st::for_of(
            VarKind::Const,
            "name",
            ex::ident("names"),
            vec![st::const_("n", Some(ty::number()), ex::ident("name"))],
        ),
    ]);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(is_incompatible(&errors[0]));
}

#[test]
fn test_for_of_over_non_iterable() {
    let errors = check(vec![
        st::declare_var("count", ty::number()),
        st::for_of(VarKind::Const, "x", ex::ident("count"), vec![]),
    ]);
    assert!(
        errors.iter().any(|error| matches!(error, CheckError::NotIterable { .. })),
        "{errors:?}"
    );
}

// =============================================================================
// Queries and output
// =============================================================================

#[test]
fn test_type_at_position_after_inference() {
    let session = session_with(
        vec![(
            "main",
            vec![
                st::declare_var("s", ty::string()),
                st::declare_function(
                    "id",
                    ty::generic_func(vec![ty::tparam("T")], vec![ty::named("T")], ty::named("T")),
                ),
                st::const_("r", None, ex::call(ex::ident("id"), vec![ex::ident("s")])),
                st::expr(ex::ident("r").at(60, 61)),
            ],
        )],
        CheckerOptions::default(),
    );
    assert_eq!(session.type_at_pos("main", 60).as_deref(), Some("string"));
}

#[test]
fn test_diagnostics_serialize_as_camel_case_json() {
    let session = session_with(
        vec![(
            "main",
            vec![st::const_("x", Some(ty::string()), ex::num(1.0).at(16, 17)).at(0, 18)],
        )],
        CheckerOptions::default(),
    );
    let diagnostics = session.diagnostics();
    assert_eq!(diagnostics.len(), 1);

    let json = serde_json::to_value(&diagnostics[0]).expect("serializes");
    assert_eq!(json["severity"], "error");
    assert_eq!(json["file"], "main");
    assert!(json["primaryMessage"].is_array());
    assert!(json["extraInfo"].is_array());
    assert_eq!(json["primaryMessage"][0]["reference"]["span"]["start"], 16);
}
