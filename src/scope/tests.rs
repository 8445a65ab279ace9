//! Unit tests for the scope chain.

use super::scope::{ScopeChain, ScopeError};

#[test]
fn test_declare_and_resolve() {
    let mut chain = ScopeChain::new();
    chain.declare("x", 1).unwrap();

    assert_eq!(chain.resolve("x"), Ok(&1));
    assert_eq!(
        chain.resolve("y"),
        Err(ScopeError::UndefinedName("y".to_string()))
    );
}

#[test]
fn test_duplicate_in_same_frame() {
    let mut chain = ScopeChain::new();
    chain.declare("x", 1).unwrap();

    assert_eq!(
        chain.declare("x", 2),
        Err(ScopeError::DuplicateDeclaration("x".to_string()))
    );
    assert_eq!(chain.resolve("x"), Ok(&1));
}

#[test]
fn test_shadowing_in_nested_frame() {
    let mut chain = ScopeChain::new();
    chain.declare("x", 1).unwrap();

    chain.push_frame();
    assert!(chain.declare("x", 2).is_ok());
    assert_eq!(chain.resolve("x"), Ok(&2));
    chain.pop_frame();

    assert_eq!(chain.resolve("x"), Ok(&1));
}

#[test]
fn test_assign_target_updates_nearest_frame() {
    let mut chain = ScopeChain::new();
    chain.declare("x", 1).unwrap();
    chain.declare("y", 10).unwrap();

    chain.push_frame();
    chain.declare("x", 2).unwrap();

    *chain.assign_target("x").unwrap() = 3;
    *chain.assign_target("y").unwrap() = 11;
    chain.pop_frame();

    assert_eq!(chain.resolve("x"), Ok(&1));
    assert_eq!(chain.resolve("y"), Ok(&11));
    assert_eq!(
        chain.assign_target("z").map(|slot| *slot),
        Err(ScopeError::UndefinedName("z".to_string()))
    );
}

#[test]
fn test_frame_guard_pops_on_drop() {
    let mut chain = ScopeChain::new();
    chain.declare("outer", 0).unwrap();

    {
        let mut inner = chain.enter();
        assert_eq!(inner.depth(), 2);
        inner.declare("inner", 1).unwrap();
        assert_eq!(inner.resolve("outer"), Ok(&0));
    }

    assert_eq!(chain.depth(), 1);
    assert!(chain.resolve("inner").is_err());
    assert!(chain.declared_in_current_frame("outer"));
}
