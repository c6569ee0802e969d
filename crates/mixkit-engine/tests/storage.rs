use std::sync::Arc;

use serde::Deserialize;

use mixkit_core::{Error, FieldDef, Scheme, SchemeCatalog, Value};
use mixkit_engine::{
    BackendAdapter, Blendable, Filters, MemoryBackend, Mixer, Overrides, ParamsPatch,
    PlainBackend,
};

fn catalog() -> SchemeCatalog {
    SchemeCatalog::new().with(
        Scheme::new("shop.Customer")
            .field(FieldDef::new("id", "int").primary_key().auto())
            .field(FieldDef::new("name", "str"))
            .field(FieldDef::new("email", "email").unique()),
    )
}

#[derive(Debug, Deserialize)]
struct Product {
    id: i64,
    name: String,
    price: f64,
    in_stock: bool,
}

impl Blendable for Product {
    fn scheme() -> Scheme {
        Scheme::new("Product")
            .field(FieldDef::new("id", "int").primary_key().auto())
            .field(FieldDef::new("name", "str").max_length(12))
            .field(FieldDef::new("price", "decimal").decimal(6, 2))
            .field(FieldDef::new("in_stock", "bool"))
    }
}

#[test]
fn short_scheme_names_resolve() {
    let mixer = Mixer::from_catalog(catalog());
    let customer = mixer
        .blend("Customer", &Overrides::new())
        .expect("blend")
        .expect("record");
    assert_eq!(customer.scheme(), "shop.Customer");
}

#[test]
fn guard_returns_existing_records_or_blends_once() {
    let backend = Arc::new(MemoryBackend::new(catalog()));
    let mixer = Mixer::new(backend.clone());
    let overrides = Overrides::new().set("name", "ada");

    let created = mixer
        .guard(Filters::new().eq("name", "ada"))
        .blend("Customer", &overrides)
        .expect("guard miss")
        .expect("record");
    let found = mixer
        .guard(Filters::new().eq("name", "ada"))
        .blend("Customer", &overrides)
        .expect("guard hit")
        .expect("record");

    assert_eq!(created, found);
    assert_eq!(backend.count("Customer").expect("count"), 1);
}

#[test]
fn reload_reads_the_stored_state() {
    let mixer = Mixer::from_catalog(catalog());
    let stored = mixer
        .blend("Customer", &Overrides::new().set("name", "ada"))
        .expect("blend")
        .expect("record");

    let mut local = stored.clone();
    local.set("name", Value::from("changed"));
    assert_eq!(mixer.reload(&local).expect("reload"), stored);

    let reloaded = mixer.reload_all(&[stored.clone(), local]).expect("reload all");
    assert_eq!(reloaded, vec![stored.clone(), stored]);
}

#[test]
fn uncommitted_records_cannot_be_reloaded() {
    let mixer = Mixer::from_catalog(catalog());
    let draft = {
        let _guard = mixer.ctx(ParamsPatch::new().commit(false)).expect("ctx");
        mixer
            .blend("Customer", &Overrides::new())
            .expect("blend")
            .expect("record")
    };
    let err = mixer.reload(&draft).expect_err("not stored");
    assert!(matches!(err.root(), Error::Commit(_)));

    mixer.commit(&draft).expect("commit");
    assert_eq!(mixer.reload(&draft).expect("reload"), draft);
}

#[test]
fn blend_as_registers_and_deserializes() {
    let mixer = Mixer::from_catalog(SchemeCatalog::new());
    let product: Product = mixer
        .blend_as(&Overrides::new().set("in_stock", true))
        .expect("blend")
        .expect("product");
    assert_eq!(product.id, 1);
    assert!(product.name.chars().count() <= 12);
    assert!(product.price.abs() < 10_000.0);
    assert!(product.in_stock);
    assert!(mixer.backend().resolve_scheme("Product").is_ok());
}

#[test]
fn plain_backend_neither_stores_nor_selects() {
    let backend = Arc::new(PlainBackend::new(catalog()));
    let mixer = Mixer::new(backend);
    let customer = mixer
        .blend("Customer", &Overrides::new())
        .expect("blend")
        .expect("record");
    assert!(!customer.contains("id"));
    assert_eq!(mixer.reload(&customer).expect("reload"), customer);
}
