use super::*;

#[test]
fn test_intern_deduplicates() {
    let interner = Interner::new();
    let a = interner.intern("foo");
    let b = interner.intern("foo");
    let c = interner.intern("bar");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(&*interner.resolve(a), "foo");
    assert_eq!(&*interner.resolve(c), "bar");
}

#[test]
fn test_empty_string_is_preinterned() {
    let interner = Interner::new();
    assert!(interner.is_empty());
    assert_eq!(interner.intern(""), Atom::EMPTY);
    assert_eq!(interner.get("missing"), None);
}

#[test]
fn test_unknown_atom_resolves_empty() {
    let interner = Interner::new();
    assert_eq!(&*interner.resolve(Atom(999)), "");
}
