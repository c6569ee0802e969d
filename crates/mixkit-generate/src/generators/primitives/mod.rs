use std::collections::{BTreeMap, BTreeSet};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rand::distr::{Distribution, Uniform};
use rand::{Rng, RngCore};
use rand_regex::Regex as RandRegex;

use mixkit_core::types::builtin;
use mixkit_core::{Error, Result, Value};

use crate::generators::{Generator, GeneratorContext, GeneratorRegistry};
use crate::params::{GeneratorParams, ParamKind, ParamSpec, validate_params};

const DEFAULT_FLOAT_MIN: f64 = -1_000_000.0;
const DEFAULT_FLOAT_MAX: f64 = 1_000_000.0;
const DEFAULT_STRING_LENGTH: usize = 8;
const DEFAULT_COLLECTION_LENGTH: usize = 3;
const DEFAULT_PRECISION: u32 = 12;
const DEFAULT_SCALE: u32 = 2;
const DEFAULT_MAX_REPEAT: u32 = 16;
const DEFAULT_CHARSET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const HOST_CHARSET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

const NO_PARAMS: &[ParamSpec] = &[];
const INT_RANGE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Int, false),
    ParamSpec::new("max", ParamKind::Int, false),
];
const FLOAT_RANGE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Float, false),
    ParamSpec::new("max", ParamKind::Float, false),
];
const DECIMAL_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Float, false),
    ParamSpec::new("max", ParamKind::Float, false),
    ParamSpec::new("precision", ParamKind::Int, false),
    ParamSpec::new("scale", ParamKind::Int, false),
];
const STRING_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("length", ParamKind::Int, false),
    ParamSpec::new("max_len", ParamKind::Int, false),
    ParamSpec::new("charset", ParamKind::String, false),
    ParamSpec::new("pattern", ParamKind::String, false),
    ParamSpec::new("max_repeat", ParamKind::Int, false),
];
const TEXT_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("words", ParamKind::Int, false),
    ParamSpec::new("max_len", ParamKind::Int, false),
];
const LENGTH_PARAMS: &[ParamSpec] = &[ParamSpec::new("length", ParamKind::Int, false)];
const COLLECTION_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("length", ParamKind::Int, false),
    ParamSpec::new("choices", ParamKind::List, false),
];
const DATE_RANGE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Date, false),
    ParamSpec::new("max", ParamKind::Date, false),
];
const TIME_RANGE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Time, false),
    ParamSpec::new("max", ParamKind::Time, false),
];
const TIMESTAMP_RANGE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Timestamp, false),
    ParamSpec::new("max", ParamKind::Timestamp, false),
];
const EMAIL_PARAMS: &[ParamSpec] = &[ParamSpec::new("host", ParamKind::String, false)];
const CHOICE_PARAMS: &[ParamSpec] = &[ParamSpec::new("choices", ParamKind::List, true)];

pub fn register(registry: &mut GeneratorRegistry) {
    registry.register([builtin::BOOL], Arc::new(BoolGenerator));
    registry.register([builtin::NULL_OR_BOOL], Arc::new(NullOrBoolGenerator));
    registry.register([builtin::NONE], Arc::new(NoneGenerator));
    registry.register(
        [builtin::INT],
        Arc::new(IntRangeGenerator {
            id: "primitive.int",
            min: i64::from(i32::MIN),
            max: i64::from(i32::MAX),
        }),
    );
    registry.register(
        [builtin::SMALL_INT],
        Arc::new(IntRangeGenerator {
            id: "primitive.small_int",
            min: i64::from(i16::MIN),
            max: i64::from(i16::MAX),
        }),
    );
    registry.register(
        [builtin::BIG_INT],
        Arc::new(IntRangeGenerator {
            id: "primitive.big_int",
            min: i64::MIN,
            max: i64::MAX,
        }),
    );
    registry.register(
        [builtin::POSITIVE_INT],
        Arc::new(IntRangeGenerator {
            id: "primitive.positive_int",
            min: 0,
            max: i64::from(i32::MAX),
        }),
    );
    registry.register(
        [builtin::POSITIVE_SMALL_INT],
        Arc::new(IntRangeGenerator {
            id: "primitive.positive_small_int",
            min: 0,
            max: i64::from(i16::MAX),
        }),
    );
    registry.register([builtin::FLOAT], Arc::new(FloatRangeGenerator));
    registry.register(
        [builtin::DECIMAL],
        Arc::new(DecimalGenerator {
            id: "primitive.decimal",
            positive: false,
        }),
    );
    registry.register(
        [builtin::POSITIVE_DECIMAL],
        Arc::new(DecimalGenerator {
            id: "primitive.positive_decimal",
            positive: true,
        }),
    );
    registry.register([builtin::STR], Arc::new(StringGenerator));
    registry.register([builtin::TEXT], Arc::new(LoremGenerator));
    registry.register([builtin::BYTES], Arc::new(BytesGenerator));
    registry.register([builtin::UUID], Arc::new(UuidGenerator));
    registry.register([builtin::DATE], Arc::new(DateRangeGenerator));
    registry.register([builtin::DATETIME], Arc::new(TimestampRangeGenerator));
    registry.register([builtin::TIME], Arc::new(TimeRangeGenerator));
    registry.register(
        [builtin::LIST],
        Arc::new(ListGenerator {
            id: "primitive.list",
            distinct: false,
        }),
    );
    registry.register(
        [builtin::TUPLE],
        Arc::new(ListGenerator {
            id: "primitive.tuple",
            distinct: false,
        }),
    );
    registry.register(
        [builtin::SET],
        Arc::new(ListGenerator {
            id: "primitive.set",
            distinct: true,
        }),
    );
    registry.register([builtin::DICT], Arc::new(DictGenerator));
    registry.register([builtin::EMAIL], Arc::new(EmailGenerator));
    registry.register([builtin::HOSTNAME], Arc::new(HostnameGenerator));
    registry.register([builtin::IP4], Arc::new(IpGenerator { id: "primitive.ip4", v4: Some(true) }));
    registry.register([builtin::IP6], Arc::new(IpGenerator { id: "primitive.ip6", v4: Some(false) }));
    registry.register([builtin::IP], Arc::new(IpGenerator { id: "primitive.ip", v4: None }));
    registry.register([builtin::URL], Arc::new(UrlGenerator));
    registry.register([builtin::CHOICE], Arc::new(ChoiceGenerator));
}

/// Storage-flavoured and language-flavoured type names mapped onto the
/// built-in simple types.
pub fn register_aliases(registry: &mut GeneratorRegistry) {
    const ALIASES: &[(&str, &str)] = &[
        ("boolean", builtin::BOOL),
        ("integer", builtin::INT),
        ("int4", builtin::INT),
        ("serial", builtin::INT),
        ("i32", builtin::INT),
        ("smallint", builtin::SMALL_INT),
        ("int2", builtin::SMALL_INT),
        ("i16", builtin::SMALL_INT),
        ("bigint", builtin::BIG_INT),
        ("int8", builtin::BIG_INT),
        ("bigserial", builtin::BIG_INT),
        ("i64", builtin::BIG_INT),
        ("u32", builtin::POSITIVE_INT),
        ("u16", builtin::POSITIVE_SMALL_INT),
        ("real", builtin::FLOAT),
        ("double", builtin::FLOAT),
        ("double precision", builtin::FLOAT),
        ("float8", builtin::FLOAT),
        ("f32", builtin::FLOAT),
        ("f64", builtin::FLOAT),
        ("numeric", builtin::DECIMAL),
        ("string", builtin::STR),
        ("varchar", builtin::STR),
        ("char", builtin::STR),
        ("character varying", builtin::STR),
        ("slug", builtin::STR),
        ("clob", builtin::TEXT),
        ("blob", builtin::BYTES),
        ("bytea", builtin::BYTES),
        ("binary", builtin::BYTES),
        ("timestamp", builtin::DATETIME),
        ("timestamptz", builtin::DATETIME),
        ("json", builtin::DICT),
        ("jsonb", builtin::DICT),
        ("array", builtin::LIST),
        ("inet", builtin::IP),
        ("uri", builtin::URL),
    ];
    for (type_key, simple) in ALIASES {
        registry.alias(*type_key, *simple);
    }
}

struct BoolGenerator;

impl Generator for BoolGenerator {
    fn id(&self) -> &'static str {
        "primitive.bool"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        validate_params(params, NO_PARAMS, self.id())?;
        Ok(Value::Bool(rng.random_bool(0.5)))
    }
}

struct NullOrBoolGenerator;

impl Generator for NullOrBoolGenerator {
    fn id(&self) -> &'static str {
        "primitive.null_or_bool"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        validate_params(params, NO_PARAMS, self.id())?;
        Ok(match rng.random_range(0..3) {
            0 => Value::Null,
            1 => Value::Bool(true),
            _ => Value::Bool(false),
        })
    }
}

struct NoneGenerator;

impl Generator for NoneGenerator {
    fn id(&self) -> &'static str {
        "primitive.none"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        _rng: &mut dyn RngCore,
    ) -> Result<Value> {
        validate_params(params, NO_PARAMS, self.id())?;
        Ok(Value::Null)
    }
}

struct IntRangeGenerator {
    id: &'static str,
    min: i64,
    max: i64,
}

impl Generator for IntRangeGenerator {
    fn id(&self) -> &'static str {
        self.id
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        let params = validate_params(params, INT_RANGE_PARAMS, self.id)?;
        let min = params.get_i64("min").unwrap_or(self.min);
        let max = params.get_i64("max").unwrap_or(self.max);
        if min > max {
            return Err(Error::InvalidParams(format!(
                "{} min must be <= max",
                self.id
            )));
        }
        Ok(Value::Int(rng.random_range(min..=max)))
    }
}

struct FloatRangeGenerator;

impl Generator for FloatRangeGenerator {
    fn id(&self) -> &'static str {
        "primitive.float"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        let params = validate_params(params, FLOAT_RANGE_PARAMS, self.id())?;
        let min = params.get_f64("min").unwrap_or(DEFAULT_FLOAT_MIN);
        let max = params.get_f64("max").unwrap_or(DEFAULT_FLOAT_MAX);
        if min > max {
            return Err(Error::InvalidParams(
                "primitive.float min must be <= max".to_string(),
            ));
        }
        float_between("primitive.float", min, max, rng).map(Value::Float)
    }
}

/// Samples `min..=max`; bounds and their width must be finite.
fn float_between(id: &str, min: f64, max: f64, rng: &mut dyn RngCore) -> Result<f64> {
    if !(max - min).is_finite() {
        return Err(Error::InvalidParams(format!(
            "{id} min and max must be finite and span a finite range"
        )));
    }
    let range = Uniform::new_inclusive(min, max)
        .map_err(|err| Error::InvalidParams(format!("{id} invalid range: {err}")))?;
    Ok(range.sample(rng))
}

/// Fixed-point numbers carried as rounded floats.
struct DecimalGenerator {
    id: &'static str,
    positive: bool,
}

impl Generator for DecimalGenerator {
    fn id(&self) -> &'static str {
        self.id
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        let params = validate_params(params, DECIMAL_PARAMS, self.id)?;
        let precision = params.get_u32("precision").unwrap_or(DEFAULT_PRECISION);
        let scale = params.get_u32("scale").unwrap_or(DEFAULT_SCALE);
        if scale > precision || precision == 0 {
            return Err(Error::InvalidParams(format!(
                "{} requires 0 < precision and scale <= precision",
                self.id
            )));
        }
        let scale = i32::try_from(scale)
            .map_err(|_| Error::InvalidParams(format!("{} scale must fit i32", self.id)))?;
        let digits = i32::try_from(precision)
            .map_err(|_| Error::InvalidParams(format!("{} precision must fit i32", self.id)))?
            - scale;
        let bound = 10_f64.powi(digits.min(15)) - 10_f64.powi(-scale);
        let min = params
            .get_f64("min")
            .unwrap_or(if self.positive { 0.0 } else { -bound });
        let max = params.get_f64("max").unwrap_or(bound);
        if min > max {
            return Err(Error::InvalidParams(format!(
                "{} min must be <= max",
                self.id
            )));
        }
        let value = float_between(self.id, min, max, rng)?;
        let factor = 10_f64.powi(scale);
        let rounded = (value * factor).round() / factor;
        Ok(Value::Float(rounded.clamp(min, max)))
    }
}

struct StringGenerator;

impl Generator for StringGenerator {
    fn id(&self) -> &'static str {
        "primitive.str"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        let params = validate_params(params, STRING_PARAMS, self.id())?;
        let length = params.length("length", self.id())?;
        let max_len = params.length("max_len", self.id())?;
        let pattern = params.get_str("pattern");
        let charset = params.get_str("charset");

        if pattern.is_some() && charset.is_some() {
            return Err(Error::InvalidParams(
                "primitive.str cannot combine pattern with charset".to_string(),
            ));
        }

        let mut value = if let Some(pattern) = pattern {
            let max_repeat = params.get_u32("max_repeat").unwrap_or(DEFAULT_MAX_REPEAT);
            let regex = RandRegex::compile(pattern, max_repeat).map_err(|err| {
                Error::InvalidParams(format!("invalid regex pattern for primitive.str: {err}"))
            })?;
            rng.sample::<String, _>(regex)
        } else {
            let len = length.unwrap_or_else(|| {
                max_len.map_or(DEFAULT_STRING_LENGTH, |max| max.min(DEFAULT_STRING_LENGTH))
            });
            random_chars(charset.unwrap_or(DEFAULT_CHARSET), len, rng)?
        };

        if let Some(max_len) = max_len
            && value.chars().count() > max_len
        {
            value = value.chars().take(max_len).collect();
        }
        Ok(Value::Text(value))
    }
}

struct LoremGenerator;

impl Generator for LoremGenerator {
    fn id(&self) -> &'static str {
        "primitive.text"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        let params = validate_params(params, TEXT_PARAMS, self.id())?;
        let words = match params.length("words", self.id())? {
            Some(words) => words,
            None => rng.random_range(8..=24),
        };
        let mut value = lorem_words(words, rng).join(" ");
        if let Some(max_len) = params.length("max_len", self.id())? {
            value = value.chars().take(max_len).collect::<String>().trim_end().to_string();
        }
        Ok(Value::Text(value))
    }
}

struct BytesGenerator;

impl Generator for BytesGenerator {
    fn id(&self) -> &'static str {
        "primitive.bytes"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        let params = validate_params(params, LENGTH_PARAMS, self.id())?;
        let len = params
            .length("length", self.id())?
            .unwrap_or(DEFAULT_STRING_LENGTH);
        let mut bytes = vec![0_u8; len];
        rng.fill_bytes(&mut bytes);
        Ok(Value::Bytes(bytes))
    }
}

struct UuidGenerator;

impl Generator for UuidGenerator {
    fn id(&self) -> &'static str {
        "primitive.uuid"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        validate_params(params, NO_PARAMS, self.id())?;
        let mut bytes = [0_u8; 16];
        rng.fill_bytes(&mut bytes);
        bytes[6] = (bytes[6] & 0x0f) | 0x40;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;
        Ok(Value::Uuid(uuid::Uuid::from_bytes(bytes)))
    }
}

struct DateRangeGenerator;

impl Generator for DateRangeGenerator {
    fn id(&self) -> &'static str {
        "primitive.date"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        let params = validate_params(params, DATE_RANGE_PARAMS, self.id())?;
        let min = params.get_date("min").unwrap_or_else(default_min_date);
        let max = params.get_date("max").unwrap_or_else(default_max_date);
        if min > max {
            return Err(Error::InvalidParams(
                "primitive.date min must be <= max".to_string(),
            ));
        }
        let span = (max - min).num_days();
        let offset = rng.random_range(0..=span);
        Ok(Value::Date(min + Duration::days(offset)))
    }
}

struct TimeRangeGenerator;

impl Generator for TimeRangeGenerator {
    fn id(&self) -> &'static str {
        "primitive.time"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        let params = validate_params(params, TIME_RANGE_PARAMS, self.id())?;
        let min = params.get_time("min").unwrap_or(NaiveTime::MIN);
        let max = params
            .get_time("max")
            .unwrap_or_else(|| safe_time(23, 59, 59));
        if min > max {
            return Err(Error::InvalidParams(
                "primitive.time min must be <= max".to_string(),
            ));
        }
        let seconds =
            rng.random_range(min.num_seconds_from_midnight()..=max.num_seconds_from_midnight());
        let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap_or(min);
        Ok(Value::Time(time))
    }
}

struct TimestampRangeGenerator;

impl Generator for TimestampRangeGenerator {
    fn id(&self) -> &'static str {
        "primitive.datetime"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        let params = validate_params(params, TIMESTAMP_RANGE_PARAMS, self.id())?;
        let min = params
            .get_timestamp("min")
            .unwrap_or_else(|| NaiveDateTime::new(default_min_date(), NaiveTime::MIN));
        let max = params
            .get_timestamp("max")
            .unwrap_or_else(|| NaiveDateTime::new(default_max_date(), safe_time(23, 59, 59)));
        if min > max {
            return Err(Error::InvalidParams(
                "primitive.datetime min must be <= max".to_string(),
            ));
        }
        let span = (max - min).num_seconds();
        let offset = rng.random_range(0..=span);
        Ok(Value::Timestamp(min + Duration::seconds(offset)))
    }
}

/// Lists, tuples and sets of words (or of the supplied `choices`).
struct ListGenerator {
    id: &'static str,
    distinct: bool,
}

impl Generator for ListGenerator {
    fn id(&self) -> &'static str {
        self.id
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        let params = validate_params(params, COLLECTION_PARAMS, self.id)?;
        let len = params
            .length("length", self.id)?
            .unwrap_or(DEFAULT_COLLECTION_LENGTH);
        let pool: Vec<Value> = match params.get_list("choices") {
            Some(choices) => choices.to_vec(),
            None => LOREM_WORDS.iter().map(|word| Value::from(*word)).collect(),
        };
        if pool.is_empty() && len > 0 {
            return Err(Error::InvalidParams(format!(
                "{} choices must not be empty",
                self.id
            )));
        }

        if self.distinct {
            let mut seen = BTreeSet::new();
            let mut items = Vec::with_capacity(len);
            let target = len.min(pool.len());
            while items.len() < target {
                let item = &pool[rng.random_range(0..pool.len())];
                if seen.insert(item.key()) {
                    items.push(item.clone());
                }
            }
            return Ok(Value::List(items));
        }

        let items = (0..len)
            .map(|_| pool[rng.random_range(0..pool.len())].clone())
            .collect();
        Ok(Value::List(items))
    }
}

struct DictGenerator;

impl Generator for DictGenerator {
    fn id(&self) -> &'static str {
        "primitive.dict"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        let params = validate_params(params, LENGTH_PARAMS, self.id())?;
        let len = params
            .length("length", self.id())?
            .unwrap_or(DEFAULT_COLLECTION_LENGTH)
            .min(LOREM_WORDS.len());
        let mut map = BTreeMap::new();
        while map.len() < len {
            let key = LOREM_WORDS[rng.random_range(0..LOREM_WORDS.len())];
            map.insert(key.to_string(), Value::Int(rng.random_range(0..=1000)));
        }
        Ok(Value::Map(map))
    }
}

struct EmailGenerator;

impl Generator for EmailGenerator {
    fn id(&self) -> &'static str {
        "primitive.email"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        let params = validate_params(params, EMAIL_PARAMS, self.id())?;
        let user = format!(
            "{}{}",
            LOREM_WORDS[rng.random_range(0..LOREM_WORDS.len())],
            rng.random_range(1..=9999)
        );
        let host = match params.get_str("host") {
            Some(host) => host.to_string(),
            None => random_host(rng)?,
        };
        Ok(Value::Text(format!("{user}@{host}")))
    }
}

struct HostnameGenerator;

impl Generator for HostnameGenerator {
    fn id(&self) -> &'static str {
        "primitive.hostname"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        validate_params(params, NO_PARAMS, self.id())?;
        Ok(Value::Text(random_host(rng)?))
    }
}

/// IPv4 when `v4` is `Some(true)`, IPv6 when `Some(false)`, either otherwise.
struct IpGenerator {
    id: &'static str,
    v4: Option<bool>,
}

impl Generator for IpGenerator {
    fn id(&self) -> &'static str {
        self.id
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        validate_params(params, NO_PARAMS, self.id)?;
        let v4 = self.v4.unwrap_or_else(|| rng.random_bool(0.5));
        let addr = if v4 {
            Ipv4Addr::from(rng.next_u32()).to_string()
        } else {
            let mut octets = [0_u8; 16];
            rng.fill_bytes(&mut octets);
            Ipv6Addr::from(octets).to_string()
        };
        Ok(Value::Text(addr))
    }
}

struct UrlGenerator;

impl Generator for UrlGenerator {
    fn id(&self) -> &'static str {
        "primitive.url"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        validate_params(params, NO_PARAMS, self.id())?;
        let host = random_host(rng)?;
        let path = lorem_words(2, rng).join("-");
        Ok(Value::Text(format!("https://{host}/{path}")))
    }
}

/// Picks one of the supplied `choices`.
struct ChoiceGenerator;

impl Generator for ChoiceGenerator {
    fn id(&self) -> &'static str {
        "primitive.choice"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        let params = validate_params(params, CHOICE_PARAMS, self.id())?;
        let choices = params.get_list("choices").unwrap_or_default();
        if choices.is_empty() {
            return Err(Error::InvalidParams(
                "primitive.choice choices must not be empty".to_string(),
            ));
        }
        Ok(choices[rng.random_range(0..choices.len())].clone())
    }
}

/// Random string of `len` characters drawn from `charset`.
pub fn random_chars(charset: &str, len: usize, rng: &mut dyn RngCore) -> Result<String> {
    let chars: Vec<char> = charset.chars().collect();
    if chars.is_empty() {
        return Err(Error::InvalidParams("charset must not be empty".to_string()));
    }
    Ok((0..len)
        .map(|_| chars[rng.random_range(0..chars.len())])
        .collect())
}

pub fn lorem_words(count: usize, rng: &mut dyn RngCore) -> Vec<&'static str> {
    (0..count)
        .map(|_| LOREM_WORDS[rng.random_range(0..LOREM_WORDS.len())])
        .collect()
}

fn random_host(rng: &mut dyn RngCore) -> Result<String> {
    let name = random_chars(HOST_CHARSET, rng.random_range(5..=10), rng)?;
    let tld = ["com", "org", "net", "io"][rng.random_range(0..4)];
    Ok(format!("{name}.{tld}"))
}

fn default_min_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

fn default_max_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2037, 12, 31).unwrap_or_default()
}

fn safe_time(hours: u32, minutes: u32, seconds: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hours, minutes, seconds).unwrap_or_default()
}

const LOREM_WORDS: &[&str] = &[
    "lorem",
    "ipsum",
    "dolor",
    "sit",
    "amet",
    "consectetur",
    "adipiscing",
    "elit",
    "sed",
    "do",
    "eiusmod",
    "tempor",
    "incididunt",
    "ut",
    "labore",
    "et",
    "dolore",
    "magna",
    "aliqua",
    "enim",
    "minim",
    "veniam",
    "quis",
    "nostrud",
];
