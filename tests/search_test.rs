mod helpers;

use helpers::{fixture_graph, ids, ACME, ALICE, BOB};
use nornicdb_accel::graph::{props, Properties, Value};
use nornicdb_accel::search::{calculate_score, highlight, SearchEngine};
use nornicdb_accel::storage::MemoryStorage;
use std::sync::Arc;

fn engine() -> SearchEngine {
    SearchEngine::new(fixture_graph())
}

#[test]
fn test_node_matches_label_and_value() {
    let engine = engine();

    let found = engine.node("Person", "name", &Value::from("Alice"));
    assert_eq!(ids(&found), vec![ALICE]);

    // right value, wrong label
    assert!(engine.node("Company", "name", &Value::from("Alice")).is_empty());
    // integer equality is per-variant
    assert_eq!(ids(&engine.node("Person", "age", &Value::from(30))), vec![ALICE]);
    assert!(engine.node("Person", "age", &Value::from(30.0)).is_empty());
}

#[test]
fn test_node_all_is_subset_of_node_any() {
    let engine = engine();
    let criteria = props([("name", Value::from("Alice")), ("age", Value::from(25))]);

    let all = engine.node_all("Person", &criteria);
    let any = engine.node_any("Person", &criteria);

    assert!(all.is_empty());
    assert_eq!(ids(&any), vec![ALICE, BOB]);
    assert!(ids(&all).iter().all(|id| ids(&any).contains(id)));

    let exact = props([("name", Value::from("Bob")), ("age", Value::from(25))]);
    assert_eq!(ids(&engine.node_all("Person", &exact)), vec![BOB]);
}

#[test]
fn test_node_reduced_truncates() {
    let storage = Arc::new(MemoryStorage::new());
    helpers::many_nodes(&storage, "Item", 5);
    let engine = SearchEngine::new(storage);

    assert_eq!(engine.node_reduced("Item", &Properties::new(), 3).len(), 3);
    assert!(engine.node_reduced("Item", &Properties::new(), 0).is_empty());
}

#[test]
fn test_multi_label_searches_concatenate() {
    let engine = engine();
    let criteria = props([("name", Value::from("Acme"))]);

    let all = engine.multi_search_all(&["Person", "Company"], &criteria);
    assert_eq!(ids(&all), vec![ACME]);
    assert_eq!(ids(&engine.multi_search_any(&["Person", "Company"], &criteria)), vec![ACME]);

    let parallel = engine.parallel(&["Person", "Company", "Missing"], "name", &Value::from("Bob"));
    assert_eq!(ids(&parallel), vec![BOB]);
}

#[test]
fn test_text_family() {
    let engine = engine();

    assert_eq!(ids(&engine.full_text("Person", "name", "carol bob")), vec![BOB]);
    assert_eq!(ids(&engine.prefix("Person", "name", "AL")), vec![ALICE]);
    assert_eq!(ids(&engine.suffix("Person", "email", ".COM")), vec![ALICE]);
    assert_eq!(ids(&engine.contains("Company", "name", "cm")), vec![ACME]);
    // non-string values never match text predicates
    assert!(engine.contains("Person", "age", "3").is_empty());
}

#[test]
fn test_fuzzy_alise() {
    let engine = engine();
    let found = engine.fuzzy("Person", "name", "Alise", 2);
    assert_eq!(ids(&found), vec![ALICE]);
}

#[test]
fn test_regex_and_wildcard() {
    let engine = engine();

    assert_eq!(ids(&engine.regex("Person", "name", "^B.b$")), vec![BOB]);
    assert!(engine.regex("Person", "name", "(unclosed").is_empty());

    assert_eq!(ids(&engine.wildcard("Person", "name", "A*e")), vec![ALICE]);
    assert_eq!(ids(&engine.wildcard("Person", "name", "B?b")), vec![BOB]);
    // anchored: a partial glob does not match
    assert!(engine.wildcard("Person", "name", "Ali").is_empty());
    // regex metacharacters in the glob are literal
    assert_eq!(engine.wildcard("Person", "email", "alice@example?com").len(), 1);
    assert!(engine.wildcard("Person", "email", "alice@example.c").is_empty());
}

#[test]
fn test_range_and_membership() {
    let engine = engine();

    assert_eq!(
        ids(&engine.range("Person", "age", &Value::from(25), &Value::from(30))),
        vec![ALICE, BOB]
    );
    assert_eq!(
        ids(&engine.range("Person", "age", &Value::from(26.5), &Value::from(40))),
        vec![ALICE]
    );
    assert_eq!(
        ids(&engine.range("Person", "name", &Value::from("A"), &Value::from("B"))),
        vec![ALICE]
    );
    // string value against numeric bounds is excluded
    assert!(engine.range("Person", "name", &Value::from(0), &Value::from(100)).is_empty());

    let values = [Value::from("Bob"), Value::from("Carol")];
    assert_eq!(ids(&engine.in_values("Person", "name", &values)), vec![BOB]);
    assert_eq!(ids(&engine.not_in("Person", "name", &values)), vec![ALICE]);
    assert!(engine.in_values("Person", "name", &[]).is_empty());
}

#[test]
fn test_presence_predicates() {
    let engine = engine();

    assert_eq!(ids(&engine.exists("Person", "email")), vec![ALICE]);
    assert_eq!(ids(&engine.missing("Person", "email")), vec![BOB]);
    assert_eq!(ids(&engine.null("Person", "nickname")), vec![BOB]);
    assert!(engine.not_null("Person", "nickname").is_empty());
    assert_eq!(ids(&engine.not_null("Person", "name")), vec![ALICE, BOB]);
    // exists counts explicit nulls as present
    assert_eq!(ids(&engine.exists("Person", "nickname")), vec![BOB]);
}

#[test]
fn test_score_tiers() {
    assert_eq!(calculate_score("alice", "alice"), 1.0);
    assert_eq!(calculate_score("alice smith", "alice"), 0.8);
    let bob = calculate_score("bob", "alice");
    assert!((0.0..0.6).contains(&bob));

    let engine = engine();
    let people = engine.exists("Person", "name");
    let scored = engine.score(&people, "name", "ALICE");
    let alice = scored.iter().find(|s| s.node.id == ALICE).unwrap();
    assert_eq!(alice.score, 1.0);
    // nodes without the property are skipped
    assert_eq!(engine.score(&people, "email", "x").len(), 1);
}

#[test]
fn test_highlight_examples() {
    assert_eq!(
        highlight("Hello Alice", "Alice", "<b>", "</b>"),
        "Hello <b>Alice</b>"
    );
    assert_eq!(highlight("hello ALICE", "Alice", "[", "]"), "hello [ALICE]");
}

#[test]
fn test_suggestions() {
    let engine = engine();

    assert_eq!(engine.suggest("Person", "name", "b", 10), vec!["Bob"]);
    assert_eq!(engine.suggest("Person", "name", "", 1).len(), 1);
    assert_eq!(engine.autocomplete("Company", "name", "ac"), vec!["Acme"]);
    assert_eq!(engine.did_you_mean("Person", "name", "Bobb"), vec!["Bob"]);
    assert!(engine.did_you_mean("Person", "name", "Zyxwv").is_empty());
}

#[test]
fn test_index_management_is_acknowledged() {
    let engine = engine();
    assert!(engine.index("Person", &["name"]).is_ok());
    assert!(engine.drop_index("Person", &["name"]).is_ok());
    assert!(engine.reindex("Person").is_ok());
}
