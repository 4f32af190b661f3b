use std::collections::BTreeMap;

use lineage_lib::{Key, Registry, ScopeConfig, ScopeError};
use serde_json::{Value, json};

use super::common::{Family, registry, root_data};

#[test]
fn second_init_on_same_unit_fails() {
  let registry = registry();
  let unit = registry.spawn_root();
  let scope = registry.scope(unit);

  scope.init(root_data()).unwrap();

  assert_eq!(
    scope.init([("level", json!("again"))]),
    Err(ScopeError::AlreadyInitialized { unit })
  );
  assert_eq!(scope.get("level"), Some(json!("root")));
}

#[test]
fn linked_unit_cannot_initialize_after_root() {
  let registry = registry();
  let family = Family::spawn(&registry);
  registry.scope(family.root).init(root_data()).unwrap();

  for unit in [family.child, family.grandchild] {
    assert_eq!(
      registry.scope(unit).init([("level", json!("child"))]),
      Err(ScopeError::AncestorInitialized {
        unit,
        ancestor: family.root,
      })
    );
  }
}

#[test]
fn root_cannot_initialize_after_descendant() {
  let registry = registry();
  let family = Family::spawn(&registry);
  registry.scope(family.grandchild).init(root_data()).unwrap();

  let err = registry.scope(family.root).init(root_data()).unwrap_err();
  assert!(matches!(err, ScopeError::AncestorInitialized { ancestor, .. } if ancestor == family.grandchild));
}

#[test]
fn separate_groups_initialize_independently() {
  let registry = registry();
  let first = Family::spawn(&registry);
  let second = Family::spawn(&registry);

  registry.scope(first.root).init([("tenant", json!("acme"))]).unwrap();
  registry.scope(second.root).init([("tenant", json!("globex"))]).unwrap();

  assert_eq!(registry.scope(first.grandchild).get("tenant"), Some(json!("acme")));
  assert_eq!(registry.scope(second.grandchild).get("tenant"), Some(json!("globex")));
}

#[test]
fn init_is_allowed_once_initialized_unit_exits() {
  let registry = registry();
  let family = Family::spawn(&registry);
  registry.scope(family.root).init(root_data()).unwrap();

  registry.exit(family.root);

  assert!(registry.scope(family.child).init([("level", json!("child"))]).is_ok());
  assert_eq!(registry.scope(family.grandchild).get("level"), Some(json!("child")));
}

#[test]
fn mapping_and_pairs_init_are_equivalent() {
  let registry = registry();
  let by_pairs = registry.spawn_root();
  let by_map = registry.spawn_root();

  registry.scope(by_pairs).init(root_data()).unwrap();

  let map: BTreeMap<Key, Value> = root_data().into_iter().map(|(k, v)| (Key::from(k), v)).collect();
  registry.scope(by_map).init(map).unwrap();

  assert_eq!(registry.store(by_pairs), registry.store(by_map));
}

#[test]
fn error_messages_name_the_units() {
  let registry = registry();
  let family = Family::spawn(&registry);
  registry.scope(family.root).init(root_data()).unwrap();

  let err = registry.scope(family.child).init(root_data()).unwrap_err();
  let message = err.to_string();
  assert!(message.contains(&family.child.to_string()), "message: {}", message);
  assert!(message.contains(&family.root.to_string()), "message: {}", message);
}

#[test]
fn custom_scratch_key_keeps_guard_semantics() {
  let registry: Registry<Value> = Registry::with_config(ScopeConfig {
    scratch_key: "request_scope".to_string(),
  });
  let family = Family::spawn(&registry);

  registry.scope(family.root).init(root_data()).unwrap();

  assert!(registry.scratch(family.root, "request_scope").is_some());
  assert!(matches!(
    registry.scope(family.child).init(root_data()),
    Err(ScopeError::AncestorInitialized { .. })
  ));
}
