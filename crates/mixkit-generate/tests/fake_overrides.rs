use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use mixkit_core::{TypeKey, Value};
use mixkit_generate::generators::fakers::fake_names;
use mixkit_generate::{GeneratorContext, GeneratorParams, GeneratorRegistry, LocaleKey};

fn fake(type_key: &str, name: &str, locale: LocaleKey) -> Value {
    let registry = GeneratorRegistry::new();
    let type_key = TypeKey::from(type_key);
    let generator = registry
        .resolve(&type_key, Some(name), true)
        .expect("resolve");
    let ctx = GeneratorContext {
        field_name: name,
        type_key: &type_key,
        locale,
    };
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    generator
        .generate(&ctx, &GeneratorParams::new(), &mut rng)
        .expect("generate")
}

#[test]
fn name_based_overrides_resolve_in_fake_mode() {
    let registry = GeneratorRegistry::new();
    let generator = registry
        .resolve(&TypeKey::from("str"), Some("first_name"), true)
        .expect("resolve");
    assert_eq!(generator.id(), "fake.first_name");

    let plain = registry
        .resolve(&TypeKey::from("str"), Some("first_name"), false)
        .expect("resolve");
    assert_eq!(plain.id(), "primitive.str");
}

#[test]
fn fake_values_are_non_empty_for_every_locale() {
    for locale in [LocaleKey::EnUs, LocaleKey::FrFr, LocaleKey::PtBr] {
        for name in ["name", "city", "company", "title", "username", "slug"] {
            let value = fake("str", name, locale);
            assert!(
                !value.as_str().expect("text").is_empty(),
                "{name} empty for {locale}"
            );
        }
    }
}

#[test]
fn email_override_contains_at() {
    let value = fake("email", "email", LocaleKey::EnUs);
    assert!(value.as_str().expect("text").contains('@'));
}

#[test]
fn coordinates_stay_in_range() {
    let lat = fake("float", "latitude", LocaleKey::EnUs).as_f64().expect("lat");
    let lon = fake("decimal", "lon", LocaleKey::EnUs).as_f64().expect("lon");
    assert!((-90.0..=90.0).contains(&lat));
    assert!((-180.0..=180.0).contains(&lon));
}

#[test]
fn percent_follows_declared_type() {
    assert!(matches!(fake("int", "percent", LocaleKey::EnUs), Value::Int(0..=100)));
    assert!(matches!(fake("float", "percent", LocaleKey::EnUs), Value::Float(_)));
}

#[test]
fn fake_names_cover_common_fields() {
    let names = fake_names();
    for name in ["email", "first_name", "timezone", "genre"] {
        assert!(names.contains(&name), "missing {name}");
    }
}

#[test]
fn locale_parsing() {
    assert_eq!(LocaleKey::parse("pt_BR"), Some(LocaleKey::PtBr));
    assert_eq!(LocaleKey::parse("fr"), Some(LocaleKey::FrFr));
    assert!(LocaleKey::resolve("xx_XX").is_err());
}
