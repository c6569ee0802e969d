use std::collections::HashSet;

use mixkit_core::{Error, FieldDef, Scheme, SchemeCatalog, Value};
use mixkit_engine::{Filters, Mixer, Overrides, Sequence};

fn catalog() -> SchemeCatalog {
    SchemeCatalog::new()
        .with(
            Scheme::new("Ticket")
                .field(FieldDef::new("id", "int").primary_key().auto())
                .field(FieldDef::new("code", "positive_small_int").unique())
                .field(FieldDef::new("title", "str")),
        )
        .with(Scheme::new("Flag").field(FieldDef::new("on", "bool").unique()))
}

#[test]
fn unique_fields_never_repeat() {
    let mixer = Mixer::from_catalog(catalog());
    let tickets = mixer
        .cycle(100)
        .blend("Ticket", &Overrides::new())
        .expect("cycle");
    assert_eq!(tickets.len(), 100);

    let codes: HashSet<String> = tickets
        .iter()
        .map(|ticket| ticket.get("code").expect("code").key())
        .collect();
    assert_eq!(codes.len(), 100);
}

#[test]
fn tiny_domains_exhaust() {
    let mixer = Mixer::from_catalog(catalog());
    mixer.blend("Flag", &Overrides::new()).expect("first");
    mixer.blend("Flag", &Overrides::new()).expect("second");
    let err = mixer.blend("Flag", &Overrides::new()).expect_err("exhausted");
    assert!(matches!(
        err.root(),
        Error::UniquenessExhausted { field, attempts: 100 } if field == "on"
    ));
}

#[test]
fn ledgers_are_per_mixer() {
    let first = Mixer::from_catalog(catalog());
    let second = Mixer::from_catalog(catalog());
    for mixer in [&first, &second] {
        mixer.blend("Flag", &Overrides::new()).expect("first");
        mixer.blend("Flag", &Overrides::new()).expect("second");
    }
}

#[test]
fn cycle_returns_independent_records() {
    let mixer = Mixer::from_catalog(catalog());
    let tickets = mixer
        .cycle(5)
        .blend("Ticket", &Overrides::new())
        .expect("cycle");
    assert_eq!(tickets.len(), 5);
    let ids: Vec<&Value> = tickets.iter().filter_map(|ticket| ticket.get("id")).collect();
    assert_eq!(
        ids,
        vec![&Value::Int(1), &Value::Int(2), &Value::Int(3), &Value::Int(4), &Value::Int(5)]
    );
}

#[test]
fn sequences_advance_across_a_cycle() {
    let mixer = Mixer::from_catalog(catalog());
    let tickets = mixer
        .cycle(3)
        .blend("Ticket", &Overrides::new().set("title", Mixer::sequence("item{0}")))
        .expect("cycle");
    let titles: Vec<&str> = tickets
        .iter()
        .filter_map(|ticket| ticket.get("title").and_then(Value::as_str))
        .collect();
    assert_eq!(titles, vec!["item0", "item1", "item2"]);
}

#[test]
fn cycle_and_function_sequences() {
    let mixer = Mixer::from_catalog(catalog());
    let overrides = Overrides::new()
        .set("title", Sequence::cycle(["a", "b"]))
        .set("code", Sequence::from_fn(|n| Value::Int(100 + n as i64)));
    let tickets = mixer.cycle(3).blend("Ticket", &overrides).expect("cycle");
    let titles: Vec<&str> = tickets
        .iter()
        .filter_map(|ticket| ticket.get("title").and_then(Value::as_str))
        .collect();
    assert_eq!(titles, vec!["a", "b", "a"]);
    assert_eq!(tickets[2].get("code"), Some(&Value::Int(102)));
}

#[test]
fn cycle_guard_returns_matches_or_blends_fresh() {
    let mixer = Mixer::from_catalog(catalog());
    let overrides = Overrides::new().set("title", "pinned");

    let fresh = mixer
        .cycle(2)
        .guard(Filters::new().eq("title", "pinned"))
        .blend("Ticket", &overrides)
        .expect("guard miss");
    assert_eq!(fresh.len(), 2);

    let found = mixer
        .cycle(5)
        .guard(Filters::new().eq("title", "pinned"))
        .blend("Ticket", &overrides)
        .expect("guard hit");
    assert_eq!(found, fresh);
}
