//! Core types shared by the compiler and the validation engine.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum nesting of validation calls before a run gives up on a branch.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One of the seven JSON Schema primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    Null,
    Boolean,
    Object,
    Array,
    String,
    Number,
    Integer,
}

impl JsonType {
    pub const ALL: [JsonType; 7] = [
        JsonType::Null,
        JsonType::Boolean,
        JsonType::Object,
        JsonType::Array,
        JsonType::String,
        JsonType::Number,
        JsonType::Integer,
    ];

    /// Parse a `type` keyword entry.
    ///
    /// Returns `None` for unknown names (caller should error).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "null" => Some(JsonType::Null),
            "boolean" => Some(JsonType::Boolean),
            "object" => Some(JsonType::Object),
            "array" => Some(JsonType::Array),
            "string" => Some(JsonType::String),
            "number" => Some(JsonType::Number),
            "integer" => Some(JsonType::Integer),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            JsonType::Null => "null",
            JsonType::Boolean => "boolean",
            JsonType::Object => "object",
            JsonType::Array => "array",
            JsonType::String => "string",
            JsonType::Number => "number",
            JsonType::Integer => "integer",
        }
    }

    /// Runtime type of a value.
    ///
    /// Numbers with an exact integral value report `Integer`, so `1.0` is an
    /// integer and `1.5` is a number.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Boolean,
            Value::Object(_) => JsonType::Object,
            Value::Array(_) => JsonType::Array,
            Value::String(_) => JsonType::String,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    JsonType::Integer
                } else {
                    match n.as_f64() {
                        Some(f) if f.is_finite() && f.fract() == 0.0 => JsonType::Integer,
                        _ => JsonType::Number,
                    }
                }
            }
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of permitted types for a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeMask(u8);

impl TypeMask {
    pub const EMPTY: TypeMask = TypeMask(0);
    pub const ALL: TypeMask = TypeMask(0b0111_1111);

    /// Add a type. `number` also admits `integer`.
    pub fn insert(&mut self, ty: JsonType) {
        self.0 |= ty.bit();
        if ty == JsonType::Number {
            self.0 |= JsonType::Integer.bit();
        }
    }

    pub fn contains(&self, ty: JsonType) -> bool {
        self.0 & ty.bit() != 0
    }

    pub fn is_all(&self) -> bool {
        *self == Self::ALL
    }

    pub fn iter(&self) -> impl Iterator<Item = JsonType> + '_ {
        JsonType::ALL.into_iter().filter(|ty| self.contains(*ty))
    }
}

impl fmt::Display for TypeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|ty| ty.name()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Schema dialect recorded from `$schema`.
///
/// Only recorded; validation semantics are the same for every draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Draft {
    #[serde(rename = "draft-04")]
    Draft4,
    #[serde(rename = "draft-06")]
    Draft6,
    #[serde(rename = "draft-07")]
    Draft7,
    #[default]
    #[serde(rename = "2019-09")]
    Draft2019_09,
    #[serde(rename = "2020-12")]
    Draft2020_12,
}

impl Draft {
    /// Look up a draft from a `$schema` URI.
    ///
    /// Accepts both `http` and `https` and an optional empty fragment.
    pub fn from_uri(uri: &str) -> Option<Self> {
        let rest = uri
            .strip_prefix("https://")
            .or_else(|| uri.strip_prefix("http://"))?;
        let rest = rest.trim_end_matches('#');
        match rest {
            "json-schema.org/draft-04/schema" => Some(Draft::Draft4),
            "json-schema.org/draft-06/schema" => Some(Draft::Draft6),
            "json-schema.org/draft-07/schema" => Some(Draft::Draft7),
            "json-schema.org/draft/2019-09/schema" => Some(Draft::Draft2019_09),
            "json-schema.org/draft/2020-12/schema" => Some(Draft::Draft2020_12),
            _ => None,
        }
    }
}

impl fmt::Display for Draft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Draft::Draft4 => "draft-04",
            Draft::Draft6 => "draft-06",
            Draft::Draft7 => "draft-07",
            Draft::Draft2019_09 => "2019-09",
            Draft::Draft2020_12 => "2020-12",
        };
        f.write_str(name)
    }
}

/// Options for a validation run.
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// Deepest nesting of sub-schema evaluations before the run reports an
    /// internal error for that branch.
    pub max_depth: usize,
}

impl ValidateOptions {
    /// Create options with the default depth limit.
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the depth limit. Zero is raised to one so the root can be checked.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self::new()
    }
}
