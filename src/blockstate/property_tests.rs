//! Property-based tests for condition evaluation and multipart parsing.

use proptest::prelude::*;
use std::collections::HashMap;

use crate::blockstate::{parse_multipart, Condition, ModelVariant, Multipart, VariantSet};

// Strategy generators

/// Property names and values are drawn from small pools so that generated
/// conditions actually hit generated blocks.
fn name_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["facing", "north", "half", "powered", "NOT"]).prop_map(String::from)
}

fn value_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["north", "south", "true", "false", "low", ""]).prop_map(String::from)
}

fn properties_strategy() -> impl Strategy<Value = HashMap<String, String>> {
    prop::collection::hash_map(name_strategy(), value_strategy(), 0..=5)
}

fn property_condition_strategy() -> impl Strategy<Value = Condition> {
    (name_strategy(), prop::collection::vec(value_strategy(), 1..=3)).prop_map(
        |(name, values)| Condition::Property {
            name,
            values: values.into_iter().collect(),
        },
    )
}

fn condition_strategy() -> impl Strategy<Value = Condition> {
    property_condition_strategy().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..=4).prop_map(Condition::All),
            prop::collection::vec(inner, 0..=4).prop_map(Condition::Any),
        ]
    })
}

/// Render a condition as a `when` object.
fn to_json(condition: &Condition) -> serde_json::Value {
    match condition {
        Condition::All(children) => serde_json::json!({
            "AND": children.iter().map(to_json).collect::<Vec<_>>()
        }),
        Condition::Any(children) => serde_json::json!({
            "OR": children.iter().map(to_json).collect::<Vec<_>>()
        }),
        Condition::Property { name, values } => {
            let mut object = serde_json::Map::new();
            object.insert(name.clone(), serde_json::Value::String(values.join("|")));
            serde_json::Value::Object(object)
        }
    }
}

proptest! {
    /// Wrapping a condition in a single-element AND or OR does not change it.
    #[test]
    fn prop_singleton_connectives(
        cond in condition_strategy(),
        props in properties_strategy()
    ) {
        let expected = cond.matches(&props);
        prop_assert_eq!(Condition::All(vec![cond.clone()]).matches(&props), expected);
        prop_assert_eq!(Condition::Any(vec![cond]).matches(&props), expected);
    }

    /// Empty AND is always true, empty OR always false.
    #[test]
    fn prop_empty_connectives(props in properties_strategy()) {
        prop_assert!(Condition::All(vec![]).matches(&props));
        prop_assert!(!Condition::Any(vec![]).matches(&props));
    }

    /// A property test holds exactly when the block's value is listed.
    #[test]
    fn prop_property_membership(
        name in name_strategy(),
        values in prop::collection::vec(value_strategy(), 1..=3),
        props in properties_strategy()
    ) {
        let cond = Condition::Property {
            name: name.clone(),
            values: values.iter().cloned().collect(),
        };
        let expected = props.get(&name).map_or(false, |v| values.contains(v));
        prop_assert_eq!(cond.matches(&props), expected);
    }

    /// Source text with pipes splits into exactly the joined values.
    #[test]
    fn prop_pipe_split(values in prop::collection::vec("[a-z]{0,4}", 1..=4)) {
        match Condition::property("p", &values.join("|")) {
            Condition::Property { values: parsed, .. } => {
                prop_assert_eq!(parsed.to_vec(), values);
            }
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }

    /// A parsed `when` object evaluates like the condition it was written from.
    #[test]
    fn prop_parsed_condition_agrees(
        cond in condition_strategy(),
        props in properties_strategy()
    ) {
        let json = serde_json::json!([{ "when": to_json(&cond), "apply": { "model": "v" } }]);
        let multipart: Multipart = parse_multipart(&json.to_string()).unwrap();
        prop_assert_eq!(multipart.len(), 1);
        prop_assert_eq!(multipart.parts()[0].condition.matches(&props), cond.matches(&props));
    }

    /// Parsing the same bytes twice gives the same structure.
    #[test]
    fn prop_parse_deterministic(cond in condition_strategy()) {
        let json = serde_json::json!([
            { "apply": { "model": "post" } },
            { "when": to_json(&cond), "apply": { "model": "side" } }
        ])
        .to_string();
        let first: Multipart = parse_multipart(&json).unwrap();
        let second: Multipart = parse_multipart(&json).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Key order inside a condition object does not change the result.
    #[test]
    fn prop_key_order_irrelevant(
        entries in prop::collection::btree_map(name_strategy(), value_strategy(), 0..=5),
        props in properties_strategy()
    ) {
        let forward: Vec<String> = entries
            .iter()
            .map(|(k, v)| format!("{:?}: {:?}", k, v))
            .collect();
        let mut backward = forward.clone();
        backward.reverse();

        let parse_when = |fields: &[String]| -> Multipart {
            let json = format!(r#"[{{ "when": {{ {} }}, "apply": {{ "model": "v" }} }}]"#, fields.join(", "));
            parse_multipart(&json).unwrap()
        };
        let a = parse_when(&forward);
        let b = parse_when(&backward);
        prop_assert_eq!(
            a.parts()[0].condition.matches(&props),
            b.parts()[0].condition.matches(&props)
        );
    }

    /// The same position always selects the same weighted variant.
    #[test]
    fn prop_weighted_selection_stable(
        weights in prop::collection::vec(0u32..=10, 1..=5),
        x in -1000i32..1000,
        y in -64i32..320,
        z in -1000i32..1000
    ) {
        let set = VariantSet::new(
            weights
                .iter()
                .enumerate()
                .map(|(i, w)| ModelVariant::new(format!("block/v{}", i)).with_weight(*w))
                .collect(),
        );
        let first = set.select(x, y, z).map(|v| v.model.clone());
        prop_assert!(first.is_some());
        prop_assert_eq!(first, set.select(x, y, z).map(|v| v.model.clone()));
    }
}

#[test]
fn test_shared_across_threads() {
    let multipart: Multipart = parse_multipart(
        r#"[
            { "apply": { "model": "post" } },
            { "when": { "north": "true" }, "apply": { "model": "side" } }
        ]"#,
    )
    .unwrap();

    std::thread::scope(|scope| {
        for i in 0..4 {
            let multipart = &multipart;
            scope.spawn(move || {
                let props: HashMap<String, String> =
                    [("north".to_string(), (i % 2 == 0).to_string())]
                        .into_iter()
                        .collect();
                let mut count = 0;
                multipart.for_each(&props, i, 0, 0, |_: &ModelVariant| count += 1);
                assert_eq!(count, if i % 2 == 0 { 2 } else { 1 });
            });
        }
    });
}
