//! Tests for `[Definition]` parsing and the schema table

use super::super::schema::{MalformedDefinition, SchemaRegistry, parse_definition_line};

#[test]
fn test_definition_line_basic() {
    let def = parse_definition_line("GameInfo=Game;Group;Date").unwrap();

    assert_eq!(def.section, "gameinfo");
    assert_eq!(def.fields, vec!["Game", "Group", "Date"]);
}

#[test]
fn test_definition_splits_on_first_assign_only() {
    let def = parse_definition_line("foo=A=B;C").unwrap();

    assert_eq!(def.section, "foo");
    assert_eq!(def.fields, vec!["A=B", "C"]);
}

#[test]
fn test_definition_preserves_empty_fields() {
    let def = parse_definition_line("foo=A;;B;").unwrap();
    assert_eq!(def.fields, vec!["A", "", "B", ""]);
}

#[test]
fn test_definition_trims_section_name() {
    let def = parse_definition_line("  StatInd =Name;Nr").unwrap();
    assert_eq!(def.section, "statind");
}

#[test]
fn test_malformed_definitions() {
    assert!(matches!(
        parse_definition_line("gameinfo Game;Group"),
        Err(MalformedDefinition::MissingAssign { .. })
    ));
    assert!(matches!(
        parse_definition_line(" =A;B"),
        Err(MalformedDefinition::EmptySection { .. })
    ));
}

#[test]
fn test_registry_last_definition_wins() {
    let mut registry = SchemaRegistry::new();
    registry.register("foo=A;B").unwrap();
    registry.register("FOO=X;Y;Z").unwrap();

    assert_eq!(registry.fields("foo").unwrap(), ["X", "Y", "Z"]);
    assert_eq!(registry.table().len(), 1);
}

#[test]
fn test_registry_lookup_is_case_insensitive() {
    let mut registry = SchemaRegistry::new();
    registry.register("actions=Time;Text").unwrap();

    let table = registry.into_table();
    assert!(table.contains("Actions"));
    assert_eq!(table.fields("ACTIONS").unwrap().len(), 2);
    assert!(table.fields("statind").is_none());
}

#[test]
fn test_registry_rejects_without_losing_state() {
    let mut registry = SchemaRegistry::new();
    registry.register("foo=A").unwrap();
    assert!(registry.register("garbage").is_err());

    assert_eq!(registry.fields("foo").unwrap(), ["A"]);
}

#[test]
fn test_drifted_sections() {
    let mut old = SchemaRegistry::new();
    old.register("actions=Time;Text").unwrap();
    old.register("statind=Name;Nr").unwrap();
    old.register("referee=Name").unwrap();
    let old = old.into_table();

    let mut new = SchemaRegistry::new();
    new.register("actions=Time;Team;Text").unwrap();
    new.register("statind=Name;Nr").unwrap();
    new.register("statteam=Team").unwrap();
    let new = new.into_table();

    assert_eq!(old.drifted_sections(&new), vec!["actions", "referee"]);
    assert!(old.drifted_sections(&old).is_empty());
    // Additions alone are not drift
    assert_eq!(new.drifted_sections(&old), vec!["actions", "statteam"]);
}
