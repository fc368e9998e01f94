use super::*;
use crate::context::CheckerOptions;
use crate::session::CheckSession;
use flint_ast::build::{ex, st, ty};
use flint_ast::{Program, TypeNode, UnaryOp, VarKind};

fn check_with(body: Vec<Stmt>, options: CheckerOptions) -> Vec<CheckError> {
    let program = Program {
        modules: vec![st::module("main", body)],
    };
    let session = CheckSession::new(program, options);
    let module = session.check_module("main").expect("module is checked");
    module.errors.iter().map(|(_, error)| error.clone()).collect()
}

fn check(body: Vec<Stmt>) -> Vec<CheckError> {
    check_with(body, CheckerOptions::default())
}

fn count(errors: &[CheckError], pred: impl Fn(&CheckError) -> bool) -> usize {
    errors.iter().filter(|error| pred(error)).count()
}

fn is_incompatible(error: &CheckError) -> bool {
    matches!(error, CheckError::IncompatibleType { .. })
}

fn is_unreachable(error: &CheckError) -> bool {
    matches!(error, CheckError::UnreachableCode)
}

fn typeof_is(name: &str, kind: &str) -> Expr {
    ex::strict_eq(ex::unary(UnaryOp::Typeof, ex::ident(name)), ex::str(kind))
}

#[test]
fn test_statement_after_return_is_unreachable() {
    let body = || {
        vec![st::function_decl(st::function(
            "f",
            vec![],
            Some(ty::number()),
            vec![
                st::ret(Some(ex::num(1.0))),
                st::let_("x", None, Some(ex::num(2.0))),
                st::let_("y", None, Some(ex::num(3.0))),
            ],
        ))]
    };
    let errors = check(body());
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(is_unreachable(&errors[0]));
    assert!(errors[0].is_warning());

    let quiet = CheckerOptions {
        report_unreachable: false,
        ..CheckerOptions::default()
    };
    assert!(check_with(body(), quiet).is_empty());
}

#[test]
fn test_hoisted_function_after_return_is_checked() {
    let body = vec![st::function_decl(st::function(
        "f",
        vec![],
        Some(ty::number()),
        vec![
            st::ret(Some(ex::call(ex::ident("g"), vec![]))),
            st::function_decl(st::function(
                "g",
                vec![],
                Some(ty::number()),
                vec![st::ret(Some(ex::str("no")))],
            )),
        ],
    ))];
    let errors = check(body);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(is_incompatible(&errors[0]));
}

#[test]
fn test_infinite_loop_does_not_complete() {
    let body = vec![st::function_decl(st::function(
        "spin",
        vec![],
        None,
        vec![
            st::while_(ex::bool(true), vec![]),
            st::let_("after", None, Some(ex::num(1.0))),
        ],
    ))];
    let errors = check(body);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(is_unreachable(&errors[0]));
}

#[test]
fn test_truthiness_removes_null_and_void() {
    let body = vec![
        st::declare_var("x", ty::nullable(ty::string())),
        st::if_(
            ex::ident("x"),
            vec![st::expr(ex::cast(ex::ident("x"), ty::string()))],
            None,
        ),
        st::expr(ex::cast(ex::ident("x"), ty::string())),
    ];
    let errors = check(body);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(is_incompatible(&errors[0]));
}

#[test]
fn test_impossible_branch_is_unreachable() {
    let body = vec![
        st::declare_var("s", ty::string()),
        st::if_(
            ex::strict_eq(ex::ident("s"), ex::null()),
            vec![st::expr(ex::cast(ex::ident("s"), ty::empty()))],
            None,
        ),
    ];
    let errors = check(body);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(is_unreachable(&errors[0]));
}

#[test]
fn test_branches_join_to_union() {
    let body = vec![
        st::declare_var("flag", ty::boolean()),
        st::let_("v", Some(ty::union(vec![ty::string(), ty::number()])), Some(ex::str("a"))),
        st::if_(
            ex::ident("flag"),
            vec![st::expr(ex::assign(ex::ident("v"), ex::num(1.0)))],
            None,
        ),
        // string | number after the join
        st::expr(ex::cast(ex::ident("v"), ty::string())),
    ];
    let errors = check(body);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(is_incompatible(&errors[0]));
}

#[test]
fn test_assignment_refines_declared_type() {
    let body = vec![
        st::let_("v", Some(ty::union(vec![ty::string(), ty::number()])), Some(ex::str("a"))),
        st::expr(ex::cast(ex::ident("v"), ty::string())),
        st::expr(ex::assign(ex::ident("v"), ex::num(2.0))),
        st::expr(ex::cast(ex::ident("v"), ty::number())),
    ];
    assert!(check(body).is_empty());
}

fn async_body(write_in_closure: bool, cast: TypeNode) -> Vec<Stmt> {
    let mut run_body = vec![st::let_(
        "box",
        Some(ty::union(vec![ty::string(), ty::number()])),
        Some(ex::str("a")),
    )];
    if write_in_closure {
        run_body.push(st::expr(ex::call(
            ex::ident("schedule"),
            vec![ex::arrow(
                vec![],
                vec![st::expr(ex::assign(ex::ident("box"), ex::num(1.0)))],
            )],
        )));
    }
    run_body.push(st::if_(
        typeof_is("box", "string"),
        vec![
            st::expr(ex::await_(ex::ident("p"))),
            st::expr(ex::cast(ex::ident("box"), cast)),
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
            ..st::function("run", vec![], Some(ty::app("Promise", vec![ty::void()])), run_body)
        }),
    ]
}

#[test]
fn test_await_forgets_refinements_written_by_closures() {
    let errors = check(async_body(true, ty::empty()));
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(is_incompatible(&errors[0]));
}

#[test]
fn test_await_keeps_refinements_without_closure_writes() {
    assert!(check(async_body(false, ty::string())).is_empty());
}

#[test]
fn test_await_keeps_refinement_when_closure_writes_own_local() {
    let mut body = async_body(false, ty::string());
    let closure = ex::arrow(
        vec![],
        vec![
            st::let_("box", Some(ty::number()), Some(ex::num(0.0))),
            st::expr(ex::assign(ex::ident("box"), ex::num(1.0))),
        ],
    );
    let StmtKind::FunctionDecl(run) = &mut body[2].kind else {
        panic!("expected the run function");
    };
    run.body
        .insert(1, st::expr(ex::call(ex::ident("schedule"), vec![closure])));
    let errors = check(body);
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn test_async_return_checked_against_promise_argument() {
    let body = vec![st::function_decl(Function {
        is_async: true,
        ..st::function(
            "f",
            vec![],
            Some(ty::app("Promise", vec![ty::number()])),
            vec![st::ret(Some(ex::str("s")))],
        )
    })];
    let errors = check(body);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(is_incompatible(&errors[0]));
}

#[test]
fn test_generator_yield_checked() {
    let body = vec![st::function_decl(Function {
        is_generator: true,
        ..st::function(
            "gen",
            vec![],
            Some(ty::app("Generator", vec![ty::number(), ty::void(), ty::void()])),
            vec![
                st::expr(ex::yield_(Some(ex::num(1.0)))),
                st::expr(ex::yield_(Some(ex::str("a")))),
            ],
        )
    })];
    let errors = check(body);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(is_incompatible(&errors[0]));
}

#[test]
fn test_inferred_generator_iterates_its_yields() {
    let body = vec![
        st::function_decl(Function {
            is_generator: true,
            ..st::function(
                "gen",
                vec![],
                None,
                vec![
                    st::expr(ex::yield_(Some(ex::num(1.0)))),
                    st::expr(ex::yield_(Some(ex::str("a")))),
                ],
            )
        }),
        st::for_of(
            VarKind::Const,
            "x",
            ex::call(ex::ident("gen"), vec![]),
            vec![st::expr(ex::cast(
                ex::ident("x"),
                ty::union(vec![ty::number(), ty::string()]),
            ))],
        ),
        st::for_of(
            VarKind::Const,
            "y",
            ex::call(ex::ident("gen"), vec![]),
            vec![st::expr(ex::cast(ex::ident("y"), ty::number()))],
        ),
    ];
    let errors = check(body);
    assert_eq!(count(&errors, is_incompatible), 1, "{errors:?}");
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_for_of_element_type() {
    let body = vec![
        st::declare_var("xs", ty::array(ty::number())),
        st::declare_var("n", ty::number()),
        st::for_of(
            VarKind::Const,
            "x",
            ex::ident("xs"),
            vec![st::expr(ex::cast(ex::ident("x"), ty::string()))],
        ),
        st::for_of(VarKind::Const, "y", ex::ident("n"), vec![]),
    ];
    let errors = check(body);
    assert_eq!(errors.len(), 2, "{errors:?}");
    assert_eq!(count(&errors, is_incompatible), 1);
    assert_eq!(
        count(&errors, |error| matches!(error, CheckError::NotIterable { .. })),
        1
    );
}

#[test]
fn test_typeof_narrowing_in_else_branch() {
    let body = vec![
        st::declare_var("v", ty::union(vec![ty::string(), ty::number()])),
        st::if_(
            typeof_is("v", "string"),
            vec![st::expr(ex::cast(ex::ident("v"), ty::string()))],
            Some(vec![st::expr(ex::cast(ex::ident("v"), ty::number()))]),
        ),
    ];
    assert!(check(body).is_empty());
}

#[test]
fn test_component_renders_checked() {
    let body = vec![st::component(
        "Label",
        vec![],
        vec![st::component_param("text", ty::string())],
        None,
        vec![st::ret(Some(ex::ident("text")))],
    )];
    assert!(check(body).is_empty());
}

fn spread_of(names: &[&str]) -> TypeNode {
    ty::exact(names.iter().map(|name| ty::spread(ty::named(name))).collect())
}

#[test]
fn test_object_rest_binds_remaining_keys() {
    let body = vec![
        st::declare_const(
            "obj",
            ty::exact(vec![ty::prop("a", ty::number()), ty::prop("b", ty::string())]),
        ),
        st::destructure(VarKind::Const, &[("a", "a")], Some("rest"), ex::ident("obj")),
        st::expr(ex::cast(ex::ident("a"), ty::number())),
        st::expr(ex::cast(
            ex::ident("rest"),
            ty::exact(vec![ty::prop("b", ty::string())]),
        )),
        st::expr(ex::cast(ex::member(ex::ident("rest"), "b"), ty::number())),
    ];
    let errors = check(body);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(is_incompatible(&errors[0]));
}

#[test]
fn test_destructuring_missing_key_is_reported() {
    let body = vec![
        st::declare_const("obj", ty::exact(vec![ty::prop("a", ty::number())])),
        st::destructure(VarKind::Const, &[("z", "z")], None, ex::ident("obj")),
    ];
    let errors = check(body);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(matches!(errors[0], CheckError::MissingProperty { .. }));
}

#[test]
fn test_generic_rest_restored_by_spread() {
    let body = vec![
        st::destructure(VarKind::Var, &[("x", "x")], Some("rest"), ex::ident("o")),
        st::expr(ex::cast(ex::ident("rest"), spread_of(&["X", "Y"]))),
        st::expr(ex::cast(
            ex::object(vec![ex::spread(ex::ident("rest")), ex::init("x", ex::num(42.0))]),
            spread_of(&["X", "Y"]),
        )),
        st::expr(ex::cast(ex::ident("rest"), spread_of(&["X"]))),
    ];
    let g = Function {
        type_params: vec![
            ty::bounded("X", ty::inexact(vec![])),
            ty::bounded("Y", ty::inexact(vec![ty::prop("x", ty::number())])),
        ],
        ..st::function("g", vec![st::param("o", Some(spread_of(&["X", "Y"])))], None, body)
    };
    let errors = check(vec![st::function_decl(g)]);
    assert_eq!(errors.len(), 2, "{errors:?}");
    assert_eq!(count(&errors, is_incompatible), 2);
}

#[test]
fn test_diff_removes_trailing_spread() {
    let diff = ty::app("$Diff", vec![spread_of(&["X", "Y"]), spread_of(&["Y"])]);
    let body = vec![
        st::expr(ex::cast(ex::ident("x"), diff.clone())),
        st::expr(ex::cast(ex::ident("y"), diff)),
    ];
    let f = Function {
        type_params: vec![
            ty::bounded("X", ty::inexact(vec![])),
            ty::bounded("Y", ty::inexact(vec![])),
        ],
        ..st::function(
            "f",
            vec![
                st::param("x", Some(spread_of(&["X"]))),
                st::param("y", Some(spread_of(&["Y"]))),
            ],
            None,
            body,
        )
    };
    let errors = check(vec![st::function_decl(f)]);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(is_incompatible(&errors[0]));
}
