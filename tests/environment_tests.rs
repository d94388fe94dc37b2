use staq::environment::Environment;
use staq::Value;

#[test]
fn nested_scope_falls_back_to_outer() {
    let root = Environment::new();
    root.set("x", Value::Integer(42));

    let child = Environment::new_enclosed(root.clone());
    assert_eq!(child.get("x"), Some(Value::Integer(42)));

    child.set("x", Value::Integer(1));
    assert_eq!(child.get("x"), Some(Value::Integer(1)));
    assert_eq!(root.get("x"), Some(Value::Integer(42)));
}

#[test]
fn set_never_writes_through_to_outer_scopes() {
    let root = Environment::new();
    root.set("shared", Value::Integer(1));

    let child = Environment::new_enclosed(root.clone());
    child.set("shared", Value::Integer(2));
    child.set("local", Value::Integer(3));

    assert_eq!(root.get("shared"), Some(Value::Integer(1)));
    assert_eq!(root.get("local"), None);
}

#[test]
fn handles_share_one_underlying_scope() {
    let env = Environment::new();
    let alias = env.clone();

    alias.set("n", Value::Integer(7));
    assert_eq!(env.get("n"), Some(Value::Integer(7)));
}

#[test]
fn lookup_walks_multiple_levels() {
    let root = Environment::new();
    root.set("a", Value::Integer(1));

    let mid = Environment::new_enclosed(root);
    mid.set("b", Value::Integer(2));

    let leaf = Environment::new_enclosed(mid);
    leaf.set("c", Value::Integer(3));

    assert_eq!(leaf.get("a"), Some(Value::Integer(1)));
    assert_eq!(leaf.get("b"), Some(Value::Integer(2)));
    assert_eq!(leaf.get("c"), Some(Value::Integer(3)));
    assert_eq!(leaf.get("d"), None);
}
