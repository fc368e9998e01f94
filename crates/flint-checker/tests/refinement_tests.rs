use super::*;
use flint_ast::build::{ex, st};

const X: BindingId = BindingId(0);
const Y: BindingId = BindingId(1);

#[test]
fn test_narrowing_ends_with_block() {
    let mut tracker = RefinementTracker::new();
    tracker.enter();
    tracker.refine(X, TypeId::STRING);
    assert_eq!(tracker.current(X), Some(TypeId::STRING));
    tracker.exit();
    assert_eq!(tracker.current(X), None);
}

#[test]
fn test_assignment_outlives_block() {
    let mut tracker = RefinementTracker::new();
    tracker.refine(X, TypeId::NUMBER);
    tracker.enter();
    tracker.assign(X, TypeId::STRING);
    tracker.exit();
    assert_eq!(tracker.current(X), Some(TypeId::STRING));
    assert_eq!(tracker.depth(), 1);
}

#[test]
fn test_refine_after_assign_in_same_block_survives() {
    let mut tracker = RefinementTracker::new();
    tracker.enter();
    tracker.assign(X, TypeId::STRING);
    tracker.refine(X, TypeId::NEVER);
    tracker.exit();
    assert_eq!(tracker.current(X), Some(TypeId::NEVER));
}

#[test]
fn test_invalidate_clears_all_frames() {
    let mut tracker = RefinementTracker::new();
    tracker.refine(X, TypeId::NUMBER);
    tracker.enter();
    tracker.refine(X, TypeId::STRING);
    tracker.invalidate(X);
    assert_eq!(tracker.current(X), None);
}

#[test]
fn test_havoc_selected_bindings() {
    let mut tracker = RefinementTracker::new();
    tracker.refine(X, TypeId::NUMBER);
    tracker.enter();
    tracker.refine(Y, TypeId::STRING);
    tracker.refine(X, TypeId::NUMBER);
    let forgotten = tracker.havoc(|id| id == X);
    assert_eq!(forgotten, 2);
    assert_eq!(tracker.current(X), None);
    assert_eq!(tracker.current(Y), Some(TypeId::STRING));
}

#[test]
fn test_inherit_keeps_selected_narrowings() {
    let mut tracker = RefinementTracker::new();
    tracker.assign(X, TypeId::STRING);
    tracker.enter();
    tracker.refine(Y, TypeId::NUMBER);
    let inner = tracker.inherit(|id| id == Y);
    assert_eq!(inner.depth(), 1);
    assert_eq!(inner.current(Y), Some(TypeId::NUMBER));
    assert_eq!(inner.current(X), None);
}

#[test]
fn test_snapshot_restore() {
    let mut tracker = RefinementTracker::new();
    tracker.refine(X, TypeId::NUMBER);
    let snapshot = tracker.snapshot();
    tracker.enter();
    tracker.assign(X, TypeId::STRING);
    tracker.restore(snapshot);
    assert_eq!(tracker.depth(), 1);
    assert_eq!(tracker.current(X), Some(TypeId::NUMBER));
}

#[test]
fn test_join_unions_branch_results() {
    let mut tracker = RefinementTracker::new();
    let before = tracker.snapshot();

    tracker.enter();
    tracker.assign(X, TypeId::STRING);
    tracker.exit();
    let consequent = tracker.branch_state();
    tracker.restore(before);
    let alternate = tracker.branch_state();

    let mut unions = Vec::new();
    tracker.join(
        &[consequent, alternate],
        |_| TypeId::NUMBER,
        |types| {
            unions.push(types.clone());
            TypeId::ANY
        },
    );
    assert_eq!(unions, vec![vec![TypeId::STRING, TypeId::NUMBER]]);
    assert_eq!(tracker.current(X), Some(TypeId::ANY));
}

#[test]
fn test_join_skips_unchanged_bindings() {
    let mut tracker = RefinementTracker::new();
    tracker.refine(X, TypeId::STRING);
    let state = tracker.branch_state();
    tracker.join(&[state.clone(), state], |_| TypeId::NUMBER, |types| types[0]);
    assert_eq!(tracker.current(X), Some(TypeId::STRING));
    assert_eq!(tracker.branch_state().get(X), Some(TypeId::STRING));
}

#[test]
fn test_captured_writes_depth() {
    let body = vec![
        st::let_("x", None, Some(ex::num(1.0))),
        st::expr(ex::assign(ex::ident("x"), ex::num(2.0))),
        st::expr(ex::assign(ex::ident("y"), ex::num(3.0))),
        st::function_decl(st::function(
            "f",
            vec![],
            None,
            vec![st::expr(ex::assign(ex::ident("x"), ex::num(4.0)))],
        )),
    ];
    let writes = CapturedWrites::collect(&body);
    assert!(writes.is_assigned("x"));
    assert!(writes.is_assigned("y"));
    assert!(!writes.is_assigned("f"));
    assert!(writes.written_by_closure("x", 0));
    assert!(!writes.written_by_closure("x", 1));
    assert!(!writes.written_by_closure("y", 0));
}

#[test]
fn test_captured_writes_skip_closure_locals() {
    let shadowing = ex::arrow(
        vec![],
        vec![
            st::let_("x", None, Some(ex::num(1.0))),
            st::expr(ex::assign(ex::ident("x"), ex::num(2.0))),
        ],
    );
    let param = ex::arrow(
        vec![st::param("y", None)],
        vec![st::expr(ex::assign(ex::ident("y"), ex::num(3.0)))],
    );
    let body = vec![
        st::let_("x", None, Some(ex::num(0.0))),
        st::let_("y", None, Some(ex::num(0.0))),
        st::expr(shadowing),
        st::expr(param),
    ];
    let writes = CapturedWrites::collect(&body);
    assert!(writes.is_assigned("x"));
    assert!(!writes.written_by_closure("x", 0));
    assert!(!writes.written_by_closure("y", 0));
    assert!(!writes.written_by_closure("x", 1));
}
