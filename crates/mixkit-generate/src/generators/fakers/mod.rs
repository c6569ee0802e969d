//! Name-based fake overrides backed by the `fake` crate.
//!
//! A field whose name matches one of the keys below gets realistic data in
//! fake mode instead of the plain type generator.

use std::sync::Arc;

use fake::Fake;
use fake::faker::address::raw::{BuildingNumber, CityName, CountryName, StreetName};
use fake::faker::company::raw::{CompanyName, Industry};
use fake::faker::internet::raw::{DomainSuffix, SafeEmail, Username};
use fake::faker::lorem::raw::{Paragraph, Sentence, Words};
use fake::faker::name::raw::{FirstName, LastName, Name};
use fake::faker::phone_number::raw::PhoneNumber;
use fake::locales::{EN, FR_FR, PT_BR};
use rand::{Rng, RngCore};

use mixkit_core::types::builtin;
use mixkit_core::{Result, Value};

use crate::generators::{Generator, GeneratorContext, GeneratorRegistry};
use crate::locales::LocaleKey;
use crate::params::{GeneratorParams, ParamKind, ParamSpec, validate_params};

const FAKER_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("max_len", ParamKind::Int, false),
    ParamSpec::new("precision", ParamKind::Int, false),
    ParamSpec::new("scale", ParamKind::Int, false),
];

const TEXT_TYPES: &[&str] = &[builtin::STR, builtin::TEXT];
const NUMBER_TYPES: &[&str] = &[builtin::FLOAT, builtin::DECIMAL, builtin::POSITIVE_DECIMAL];
const INT_TYPES: &[&str] = &[
    builtin::INT,
    builtin::SMALL_INT,
    builtin::POSITIVE_INT,
    builtin::POSITIVE_SMALL_INT,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FakeKind {
    Address,
    Body,
    Category,
    City,
    Company,
    Country,
    Domain,
    Email,
    FirstName,
    Genre,
    LastName,
    Latitude,
    Longitude,
    Name,
    Percent,
    Phone,
    Slug,
    Street,
    TimeZone,
    Title,
    Url,
    Username,
}

const FAKERS: &[(&str, FakeKind, &[&str])] = &[
    ("address", FakeKind::Address, TEXT_TYPES),
    ("body", FakeKind::Body, TEXT_TYPES),
    ("category", FakeKind::Category, TEXT_TYPES),
    ("city", FakeKind::City, TEXT_TYPES),
    ("company", FakeKind::Company, TEXT_TYPES),
    ("content", FakeKind::Body, TEXT_TYPES),
    ("country", FakeKind::Country, TEXT_TYPES),
    ("description", FakeKind::Body, TEXT_TYPES),
    ("domain", FakeKind::Domain, TEXT_TYPES),
    ("email", FakeKind::Email, &[builtin::STR, builtin::EMAIL]),
    ("first_name", FakeKind::FirstName, TEXT_TYPES),
    ("firstname", FakeKind::FirstName, TEXT_TYPES),
    ("genre", FakeKind::Genre, TEXT_TYPES),
    ("last_name", FakeKind::LastName, TEXT_TYPES),
    ("lastname", FakeKind::LastName, TEXT_TYPES),
    ("lat", FakeKind::Latitude, NUMBER_TYPES),
    ("latitude", FakeKind::Latitude, NUMBER_TYPES),
    ("login", FakeKind::Username, TEXT_TYPES),
    ("lon", FakeKind::Longitude, NUMBER_TYPES),
    ("longitude", FakeKind::Longitude, NUMBER_TYPES),
    ("name", FakeKind::Name, TEXT_TYPES),
    ("percent", FakeKind::Percent, INT_TYPES),
    ("percent", FakeKind::Percent, NUMBER_TYPES),
    ("phone", FakeKind::Phone, TEXT_TYPES),
    ("site", FakeKind::Url, &[builtin::STR, builtin::URL]),
    ("slug", FakeKind::Slug, TEXT_TYPES),
    ("street", FakeKind::Street, TEXT_TYPES),
    ("time_zone", FakeKind::TimeZone, TEXT_TYPES),
    ("timezone", FakeKind::TimeZone, TEXT_TYPES),
    ("title", FakeKind::Title, TEXT_TYPES),
    ("url", FakeKind::Url, &[builtin::STR, builtin::URL]),
    ("username", FakeKind::Username, TEXT_TYPES),
];

pub fn register(registry: &mut GeneratorRegistry) {
    for (name, kind, types) in FAKERS {
        let id = fake_id(*kind);
        for type_key in *types {
            let generator = FakeGenerator {
                id,
                kind: *kind,
                integer: INT_TYPES.contains(type_key),
            };
            registry.register_faker(name, *type_key, Arc::new(generator));
        }
    }
}

/// Names with a registered fake override.
pub fn fake_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = FAKERS.iter().map(|(name, _, _)| *name).collect();
    names.dedup();
    names
}

fn fake_id(kind: FakeKind) -> &'static str {
    match kind {
        FakeKind::Address => "fake.address",
        FakeKind::Body => "fake.body",
        FakeKind::Category => "fake.category",
        FakeKind::City => "fake.city",
        FakeKind::Company => "fake.company",
        FakeKind::Country => "fake.country",
        FakeKind::Domain => "fake.domain",
        FakeKind::Email => "fake.email",
        FakeKind::FirstName => "fake.first_name",
        FakeKind::Genre => "fake.genre",
        FakeKind::LastName => "fake.last_name",
        FakeKind::Latitude => "fake.latitude",
        FakeKind::Longitude => "fake.longitude",
        FakeKind::Name => "fake.name",
        FakeKind::Percent => "fake.percent",
        FakeKind::Phone => "fake.phone",
        FakeKind::Slug => "fake.slug",
        FakeKind::Street => "fake.street",
        FakeKind::TimeZone => "fake.time_zone",
        FakeKind::Title => "fake.title",
        FakeKind::Url => "fake.url",
        FakeKind::Username => "fake.username",
    }
}

/// Runs a raw `fake` faker for the requested locale.
macro_rules! localized {
    ($locale:expr, $rng:expr, $faker:ident $(, $arg:expr)*) => {
        match $locale {
            LocaleKey::EnUs => $faker(EN $(, $arg)*).fake_with_rng($rng),
            LocaleKey::FrFr => $faker(FR_FR $(, $arg)*).fake_with_rng($rng),
            LocaleKey::PtBr => $faker(PT_BR $(, $arg)*).fake_with_rng($rng),
        }
    };
}

struct FakeGenerator {
    id: &'static str,
    kind: FakeKind,
    integer: bool,
}

impl Generator for FakeGenerator {
    fn id(&self) -> &'static str {
        self.id
    }

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        let params = validate_params(params, FAKER_PARAMS, self.id)?;
        let locale = ctx.locale;
        let text: String = match self.kind {
            FakeKind::Address => {
                let number: String = localized!(locale, rng, BuildingNumber);
                let street: String = localized!(locale, rng, StreetName);
                format!("{number} {street}")
            }
            FakeKind::Body => {
                let paragraph: String = localized!(locale, rng, Paragraph, 2..5);
                paragraph
            }
            FakeKind::Category => localized!(locale, rng, Industry),
            FakeKind::City => localized!(locale, rng, CityName),
            FakeKind::Company => localized!(locale, rng, CompanyName),
            FakeKind::Country => localized!(locale, rng, CountryName),
            FakeKind::Domain => domain(locale, rng),
            FakeKind::Email => localized!(locale, rng, SafeEmail),
            FakeKind::FirstName => localized!(locale, rng, FirstName),
            FakeKind::Genre => GENRES[rng.random_range(0..GENRES.len())].to_string(),
            FakeKind::LastName => localized!(locale, rng, LastName),
            FakeKind::Latitude => {
                let scale = params.get_u32("scale").unwrap_or(6).min(6);
                return Ok(Value::Float(coordinate(90.0, scale, rng)));
            }
            FakeKind::Longitude => {
                let scale = params.get_u32("scale").unwrap_or(6).min(6);
                return Ok(Value::Float(coordinate(180.0, scale, rng)));
            }
            FakeKind::Name => localized!(locale, rng, Name),
            FakeKind::Percent => {
                let percent = rng.random_range(0..=100_i64);
                return Ok(if self.integer {
                    Value::Int(percent)
                } else {
                    Value::Float(percent as f64)
                });
            }
            FakeKind::Phone => localized!(locale, rng, PhoneNumber),
            FakeKind::Slug => slug(locale, rng),
            FakeKind::Street => localized!(locale, rng, StreetName),
            FakeKind::TimeZone => TIME_ZONES[rng.random_range(0..TIME_ZONES.len())].to_string(),
            FakeKind::Title => {
                let sentence: String = localized!(locale, rng, Sentence, 2..6);
                sentence.trim_end_matches('.').to_string()
            }
            FakeKind::Url => format!("https://{}/{}", domain(locale, rng), slug(locale, rng)),
            FakeKind::Username => localized!(locale, rng, Username),
        };

        let text = match params.length("max_len", self.id)? {
            Some(max_len) => text.chars().take(max_len).collect(),
            None => text,
        };
        Ok(Value::Text(text))
    }
}

fn slug(locale: LocaleKey, rng: &mut dyn RngCore) -> String {
    let words: Vec<String> = localized!(locale, rng, Words, 2..4);
    words.join("-").to_lowercase()
}

fn domain(locale: LocaleKey, rng: &mut dyn RngCore) -> String {
    let words: Vec<String> = localized!(locale, rng, Words, 1..2);
    let suffix: String = localized!(locale, rng, DomainSuffix);
    format!("{}.{suffix}", words.concat().to_lowercase())
}

fn coordinate(bound: f64, scale: u32, rng: &mut dyn RngCore) -> f64 {
    let value: f64 = rng.random_range(-bound..=bound);
    let factor = 10_f64.powi(scale as i32);
    (value * factor).round() / factor
}

const GENRES: &[&str] = &[
    "blues",
    "classical",
    "country",
    "electronic",
    "folk",
    "hip hop",
    "jazz",
    "metal",
    "pop",
    "punk",
    "reggae",
    "rock",
    "soul",
];

const TIME_ZONES: &[&str] = &[
    "Africa/Cairo",
    "America/New_York",
    "America/Sao_Paulo",
    "Asia/Tokyo",
    "Australia/Sydney",
    "Europe/Berlin",
    "Europe/London",
    "Europe/Paris",
    "Pacific/Auckland",
    "UTC",
];
