//! Literal extraction and placeholder-constant synthesis.
//!
//! Training-data augmentation swaps real literals for placeholder constants
//! (`NUMBER_0`, `QUOTED_STRING_1`, …). Extraction scans a state for the
//! literals it actually contains; creation synthesizes a bounded pool of
//! placeholders to sample from. Neither is ever used for execution.

use super::state::DialogueState;
use crate::program::{Num, Value};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Semantic type of a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantType {
    Number,
    Str,
    Bool,
    Entity,
    Date,
}

impl ConstantType {
    fn of(value: &Value) -> Self {
        match value {
            Value::Number { .. } => ConstantType::Number,
            Value::Str { .. } => ConstantType::Str,
            Value::Bool { .. } => ConstantType::Bool,
            Value::Entity { .. } => ConstantType::Entity,
            Value::Date { .. } => ConstantType::Date,
        }
    }

    /// Default placeholder token family for extracted literals.
    fn token(self) -> &'static str {
        match self {
            ConstantType::Number => "NUMBER",
            ConstantType::Str => "QUOTED_STRING",
            ConstantType::Bool => "BOOL",
            ConstantType::Entity => "GENERIC_ENTITY",
            ConstantType::Date => "DATE",
        }
    }
}

/// A literal value paired with its surface form, semantic type, and
/// placeholder token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Constant {
    pub typ: ConstantType,
    pub token: String,
    pub value: Value,
    pub surface: String,
}

/// Scans every program in the state and emits one constant per distinct
/// literal. The set is ordered, so extraction order never leaks into
/// downstream sampling.
pub fn extract_constants(state: &DialogueState) -> BTreeSet<Constant> {
    let mut constants = BTreeSet::new();
    for item in state.iter() {
        for value in item.program.literals() {
            let typ = ConstantType::of(value);
            constants.insert(Constant {
                typ,
                token: typ.token().to_string(),
                value: value.clone(),
                surface: value.surface(),
            });
        }
    }
    constants
}

fn synthesize(typ: ConstantType, token: &str, index: usize) -> Option<Value> {
    match typ {
        ConstantType::Number => Some(Value::Number {
            value: Num(index as f64),
        }),
        ConstantType::Str => Some(Value::Str {
            value: format!("{token}_{index}"),
        }),
        ConstantType::Bool => match index {
            0 => Some(Value::Bool { value: true }),
            1 => Some(Value::Bool { value: false }),
            _ => None,
        },
        ConstantType::Entity => Some(Value::Entity {
            value: format!("{token}_{index}"),
            display: None,
        }),
        ConstantType::Date => {
            let base = NaiveDate::from_ymd_opt(2020, 1, 1)?;
            let date = base.checked_add_days(Days::new(index as u64))?;
            Some(Value::Date {
                value: date.format("%Y-%m-%d").to_string(),
            })
        }
    }
}

/// Synthesizes a capped, ordered sequence of placeholder constants of the
/// given type, each labeled with `token`. Returns `min(max_constants,
/// available)` elements; bounded types (booleans) run out before the cap.
pub fn create_constants(token: &str, typ: ConstantType, max_constants: usize) -> Vec<Constant> {
    (0..max_constants)
        .map_while(|index| {
            let value = synthesize(typ, token, index)?;
            Some(Constant {
                typ,
                token: token.to_string(),
                surface: format!("{token}_{index}"),
                value,
            })
        })
        .collect()
}
