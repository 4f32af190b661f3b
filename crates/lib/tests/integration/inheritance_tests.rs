use lineage_lib::{Key, UnitRuntime};
use serde_json::json;

use super::common::{Family, registry, root_data};

#[test]
fn child_and_grandchild_inherit_from_root() {
  let registry = registry();
  let family = Family::spawn(&registry);
  registry.scope(family.root).init(root_data()).unwrap();

  for unit in [family.child, family.grandchild] {
    let scope = registry.scope(unit);
    assert_eq!(scope.get("shared"), Some(json!("from_root")));
    assert_eq!(scope.get("level"), Some(json!("root")));
    assert_eq!(scope.get("missing"), None);
  }
}

#[test]
fn inherited_values_land_in_the_local_store() {
  let registry = registry();
  let family = Family::spawn(&registry);
  registry.scope(family.root).init(root_data()).unwrap();

  let grandchild = registry.scope(family.grandchild);
  assert!(registry.store(family.grandchild).is_none());

  grandchild.get("shared");

  let store = registry.store(family.grandchild).unwrap();
  assert_eq!(store.keys(), vec![Key::from("shared")]);
  assert_eq!(grandchild.get_local("shared"), Some(json!("from_root")));
}

#[test]
fn lookup_of_absent_key_leaves_no_trace() {
  let registry = registry();
  let family = Family::spawn(&registry);
  registry.scope(family.root).init(root_data()).unwrap();

  assert_eq!(registry.scope(family.child).get("missing"), None);
  assert!(registry.store(family.child).is_none());
  assert_eq!(registry.store(family.root).unwrap().len(), 2);
}

#[test]
fn cached_value_survives_root_changes_and_exit() {
  let registry = registry();
  let family = Family::spawn(&registry);
  let root = registry.scope(family.root);
  root.init(root_data()).unwrap();

  let child = registry.scope(family.child);
  assert_eq!(child.get("shared"), Some(json!("from_root")));

  root.unsafe_put([("shared", json!("changed"))]);
  assert_eq!(child.get("shared"), Some(json!("from_root")));

  registry.exit(family.root);
  assert_eq!(child.get("shared"), Some(json!("from_root")));
  assert_eq!(child.get("level"), None);
}

#[test]
fn grandchild_reuses_value_cached_by_child() {
  let registry = registry();
  let family = Family::spawn(&registry);
  registry.scope(family.root).init(root_data()).unwrap();

  registry.scope(family.child).get("shared");
  registry.scope(family.root).unsafe_put([("shared", json!("changed"))]);

  // The child is nearer than the root, so its cached copy wins.
  assert_eq!(registry.scope(family.grandchild).get("shared"), Some(json!("from_root")));
  assert_eq!(registry.scope(family.grandchild).inherited_from("level"), Some(family.root));
}

#[test]
fn dead_middle_unit_cuts_the_chain() {
  let registry = registry();
  let family = Family::spawn(&registry);
  registry.scope(family.root).init(root_data()).unwrap();

  registry.exit(family.child);

  assert_eq!(registry.scope(family.grandchild).get("shared"), None);
}

#[test]
fn siblings_see_each_other_through_the_parent() {
  let registry = registry();
  let parent = registry.spawn_root();
  let first = registry.spawn_linked(parent).unwrap();
  let second = registry.spawn_linked(parent).unwrap();

  registry.scope(first).unsafe_put([("request_id", json!(42))]);

  assert_eq!(registry.scope(second).get("request_id"), Some(json!(42)));
  assert_eq!(registry.scope(parent).get("request_id"), Some(json!(42)));
}

#[test]
fn unlinked_units_do_not_inherit() {
  let registry = registry();
  let root = registry.spawn_root();
  let stranger = registry.spawn_root();
  registry.scope(root).init(root_data()).unwrap();

  assert_eq!(registry.scope(stranger).get("shared"), None);

  registry.link(root, stranger).unwrap();
  assert_eq!(registry.scope(stranger).get("shared"), Some(json!("from_root")));

  registry.unlink(root, stranger).unwrap();
  // Already cached, so still visible locally.
  assert_eq!(registry.scope(stranger).get("shared"), Some(json!("from_root")));
  assert_eq!(registry.scope(stranger).get("level"), None);
}

#[test]
fn cyclic_links_terminate() {
  let registry = registry();
  let a = registry.spawn_root();
  let b = registry.spawn_linked(a).unwrap();
  let c = registry.spawn_linked(b).unwrap();
  registry.link(c, a).unwrap();

  assert_eq!(registry.scope(c).get("missing"), None);

  registry.scope(a).init(root_data()).unwrap();
  assert_eq!(registry.scope(c).get("level"), Some(json!("root")));
}

#[test]
fn scope_runtime_reports_current_unit() {
  let registry = registry();
  let family = Family::spawn(&registry);
  let scope = registry.scope(family.child);

  assert_eq!(scope.unit(), family.child);
  assert_eq!(scope.runtime().current_unit(), family.child);

  let mut neighbors = scope.runtime().neighbors_of(family.child);
  neighbors.sort();
  assert_eq!(neighbors, vec![family.root, family.grandchild]);
}
