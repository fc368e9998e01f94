use super::*;

#[test]
fn test_enter_leave_and_cycle() {
    let mut guard: RecursionGuard<u32> = RecursionGuard::with_profile(RecursionProfile::SubtypeCheck);
    assert!(guard.enter(1).is_entered());
    assert!(guard.enter(1).is_cycle());
    assert_eq!(guard.depth(), 1);
    guard.leave(1);
    assert_eq!(guard.depth(), 0);
    assert!(!guard.is_exceeded());
}

#[test]
fn test_depth_limit() {
    let mut guard: RecursionGuard<u32> = RecursionGuard::new(2, 100);
    assert!(guard.enter(1).is_entered());
    assert!(guard.enter(2).is_entered());
    assert_eq!(guard.enter(3), RecursionResult::DepthExceeded);
    assert!(guard.is_exceeded());
    guard.leave(2);
    guard.leave(1);
}

#[test]
fn test_iteration_limit() {
    let mut guard: RecursionGuard<u32> =
        RecursionGuard::with_profile(RecursionProfile::Custom { max_depth: 10, max_iterations: 3 });
    for key in 0..3 {
        assert!(guard.enter(key).is_entered());
        guard.leave(key);
    }
    assert_eq!(guard.enter(9), RecursionResult::IterationExceeded);
    guard.reset();
    assert!(guard.enter(9).is_entered());
    guard.leave(9);
}

#[test]
fn test_scope_leaves_on_exit() {
    let mut guard: RecursionGuard<&str> = RecursionGuard::new(4, 100);
    let value = guard.scope("a", || 7).expect("entered");
    assert_eq!(value, 7);
    assert!(!guard.is_visiting(&"a"));
}
