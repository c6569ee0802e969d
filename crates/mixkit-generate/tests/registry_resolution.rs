use std::sync::Arc;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use mixkit_core::{Error, Result, TypeKey, Value};
use mixkit_generate::{
    Generator, GeneratorContext, GeneratorParams, GeneratorRegistry, LocaleKey,
};

struct Constant(&'static str, i64);

impl Generator for Constant {
    fn id(&self) -> &'static str {
        self.0
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        _params: &GeneratorParams,
        _rng: &mut dyn RngCore,
    ) -> Result<Value> {
        Ok(Value::Int(self.1))
    }
}

fn run(registry: &GeneratorRegistry, type_key: &str, name: &str, fake: bool) -> Value {
    let type_key = TypeKey::from(type_key);
    let generator = registry
        .resolve(&type_key, Some(name), fake)
        .expect("generator resolves");
    let ctx = GeneratorContext {
        field_name: name,
        type_key: &type_key,
        locale: LocaleKey::EnUs,
    };
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    generator
        .generate(&ctx, &GeneratorParams::new(), &mut rng)
        .expect("generate")
}

#[test]
fn resolves_exact_alias_and_ancestor() {
    let mut registry = GeneratorRegistry::empty();
    registry.register(["money"], Arc::new(Constant("test.money", 5)));
    registry.alias("cents", "money");
    registry.inherit("price", "cents");

    assert_eq!(run(&registry, "money", "amount", false), Value::Int(5));
    assert_eq!(run(&registry, "cents", "amount", false), Value::Int(5));
    assert_eq!(run(&registry, "price", "amount", false), Value::Int(5));
    assert_eq!(
        registry.simple_type(&TypeKey::from("price")),
        Some(TypeKey::from("money"))
    );
}

#[test]
fn later_registration_replaces_and_first_in_call_wins() {
    let mut registry = GeneratorRegistry::empty();
    registry.register(["a"], Arc::new(Constant("test.one", 1)));
    registry.register(["a", "a"], Arc::new(Constant("test.two", 2)));
    assert_eq!(run(&registry, "a", "x", false), Value::Int(2));
}

#[test]
fn fake_override_applies_only_in_fake_mode() {
    let mut registry = GeneratorRegistry::empty();
    registry.register(["str"], Arc::new(Constant("test.str", 1)));
    registry.register_faker("nickname", "str", Arc::new(Constant("test.nick", 9)));
    registry.alias("varchar", "str");

    assert_eq!(run(&registry, "varchar", "nickname", true), Value::Int(9));
    assert_eq!(run(&registry, "varchar", "Nickname", true), Value::Int(9));
    assert_eq!(run(&registry, "varchar", "nickname", false), Value::Int(1));
    assert_eq!(run(&registry, "varchar", "other", true), Value::Int(1));
}

#[test]
fn unknown_type_uses_fallback_or_fails() {
    let mut registry = GeneratorRegistry::empty();
    let result = registry.resolve(&TypeKey::from("mystery"), Some("field"), false);
    assert!(matches!(
        result,
        Err(Error::Generation { ref type_key, .. }) if type_key == "mystery"
    ));

    registry.register_fallback(Arc::new(Constant("test.fallback", 0)));
    assert_eq!(run(&registry, "mystery", "field", false), Value::Int(0));
}

#[test]
fn alias_cycles_do_not_hang() {
    let mut registry = GeneratorRegistry::empty();
    registry.alias("a", "b");
    registry.alias("b", "a");
    assert!(registry.simple_type(&TypeKey::from("a")).is_none());
}

#[test]
fn registries_have_distinct_ids() {
    let first = GeneratorRegistry::empty();
    let second = GeneratorRegistry::empty();
    assert_ne!(first.id(), second.id());
}

#[test]
fn default_registry_knows_builtin_types() {
    let registry = GeneratorRegistry::new();
    for type_key in ["bool", "int", "str", "text", "uuid", "date", "varchar", "bigint"] {
        assert!(
            registry.simple_type(&TypeKey::from(type_key)).is_some(),
            "missing {type_key}"
        );
    }
    let ids = registry.generator_ids();
    let mut sorted = ids.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(ids, sorted);
}
