use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{Callable, TypeKey};
use crate::value::Value;

/// Description of a target type: a name plus an ordered list of fields.
#[derive(Debug, Clone)]
pub struct Scheme {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl Scheme {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn primary_key(&self) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.primary_key)
    }
}

/// Default value declared for a field.
#[derive(Debug, Clone)]
pub enum FieldDefault {
    Value(Value),
    Call(Callable),
}

impl FieldDefault {
    pub fn produce(&self) -> Value {
        match self {
            FieldDefault::Value(value) => value.clone(),
            FieldDefault::Call(func) => func.call(),
        }
    }
}

/// Cardinality of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// A single related record, blended before the owner exists.
    ToOne,
    /// A collection of related records, blended after the owner exists.
    ToMany { count: usize },
}

/// Relation metadata attached to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDef {
    pub target: String,
    pub kind: RelationKind,
    /// Field on the related scheme that receives the owner's primary key.
    pub back_ref: Option<String>,
    /// Forces a to-one relation into the second pass.
    pub deferred: bool,
}

impl RelationDef {
    pub fn to_one(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            kind: RelationKind::ToOne,
            back_ref: None,
            deferred: false,
        }
    }

    pub fn to_many(target: impl Into<String>, count: usize) -> Self {
        Self {
            target: target.into(),
            kind: RelationKind::ToMany { count },
            back_ref: None,
            deferred: true,
        }
    }

    /// True when the related value can only be built once the owner exists.
    pub fn is_deferred(&self) -> bool {
        self.deferred || matches!(self.kind, RelationKind::ToMany { .. }) || self.back_ref.is_some()
    }
}

/// Field declaration inside a scheme.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub type_key: TypeKey,
    pub nullable: bool,
    pub unique: bool,
    pub primary_key: bool,
    /// Value assigned by storage (auto-increment keys).
    pub auto: bool,
    pub default: Option<FieldDefault>,
    pub max_length: Option<usize>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub choices: Vec<Value>,
    pub relation: Option<RelationDef>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, type_key: impl Into<TypeKey>) -> Self {
        Self {
            name: name.into(),
            type_key: type_key.into(),
            nullable: false,
            unique: false,
            primary_key: false,
            auto: false,
            default: None,
            max_length: None,
            precision: None,
            scale: None,
            choices: Vec::new(),
            relation: None,
        }
    }

    pub fn to_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        let target = target.into();
        let mut field = Self::new(name, target.as_str());
        field.relation = Some(RelationDef::to_one(target));
        field
    }

    /// To-many relations are optional unless params are supplied.
    pub fn to_many(name: impl Into<String>, target: impl Into<String>, count: usize) -> Self {
        let target = target.into();
        let mut field = Self::new(name, target.as_str());
        field.relation = Some(RelationDef::to_many(target, count));
        field.nullable = true;
        field
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.unique = true;
        self
    }

    pub fn auto(mut self) -> Self {
        self.auto = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(FieldDefault::Value(value.into()));
        self
    }

    pub fn default_with<F>(mut self, func: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(FieldDefault::Call(Callable::new(func)));
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn decimal(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn back_ref(mut self, field: impl Into<String>) -> Self {
        if let Some(relation) = self.relation.as_mut() {
            relation.back_ref = Some(field.into());
        }
        self
    }

    pub fn deferred(mut self) -> Self {
        if let Some(relation) = self.relation.as_mut() {
            relation.deferred = true;
        }
        self
    }

    pub fn is_relation(&self) -> bool {
        self.relation.is_some()
    }

    pub fn is_deferred(&self) -> bool {
        self.relation.as_ref().is_some_and(RelationDef::is_deferred)
    }
}
