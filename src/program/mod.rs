//! Structured-program values.
//!
//! The dialogue core treats a [`Program`] as an opaque command against a
//! service ontology: it is set once when a dialogue item is created and never
//! edited in place. The concrete shape here exists for the token codec, the
//! simulation executor, and constant extraction.

pub mod codec;

pub use codec::{ProgramCodec, TokenCodec};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A numeric literal with total ordering.
///
/// Wraps `f64` so literal values can live in ordered sets; comparison uses
/// `total_cmp`, hashing uses the bit pattern.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Num(pub f64);

impl PartialEq for Num {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Num {}

impl PartialOrd for Num {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Num {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::hash::Hash for Num {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A literal value inside a program argument.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Value {
    Number { value: Num },
    Str { value: String },
    Bool { value: bool },
    Entity {
        value: String,
        display: Option<String>,
    },
    /// ISO-8601 calendar date.
    Date { value: String },
}

impl Value {
    /// Human-readable surface form, as it would appear in an utterance.
    pub fn surface(&self) -> String {
        match self {
            Value::Number { value } => value.to_string(),
            Value::Str { value } => value.clone(),
            Value::Bool { value } => value.to_string(),
            Value::Entity { value, display } => display.clone().unwrap_or_else(|| value.clone()),
            Value::Date { value } => value.clone(),
        }
    }
}

/// A named argument of a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arg {
    pub name: String,
    pub value: Value,
}

/// A structured command/query against the service ontology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub function: String,
    #[serde(default)]
    pub args: Vec<Arg>,
}

impl Program {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: Value) -> Self {
        self.args.push(Arg {
            name: name.into(),
            value,
        });
        self
    }

    /// All literal values appearing in this program, in argument order.
    pub fn literals(&self) -> impl Iterator<Item = &Value> {
        self.args.iter().map(|arg| &arg.value)
    }
}
