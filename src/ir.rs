// Abstract validation checks handed from the rule registry to the emitter.
// Nothing here knows Go syntax; `codegen` renders it, `eval` interprets it.

use std::collections::BTreeSet;
use std::fmt;

use ordered_float::OrderedFloat;
use serde::Serialize;

/// Something a condition compares. Field names refer to the record being validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// The field's value as declared.
    Field(String),
    /// Length of a string, slice or map field.
    Length(String),
    /// The field converted to a 64-bit float.
    Widened(String),
    Number(OrderedFloat<f64>),
    Nil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
}

impl Comparison {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
            Comparison::Lt => "<",
        }
    }
}

/// When this holds, the check fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Condition {
    pub lhs: Operand,
    pub op: Comparison,
    pub rhs: Operand,
}

impl Condition {
    pub fn new(lhs: Operand, op: Comparison, rhs: Operand) -> Self {
        Self { lhs, op, rhs }
    }
}

/// Failure message templates, parameterized by field names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "template", rename_all = "snake_case")]
pub enum FailureMessage {
    Required { field: String },
    EqualTo { field: String, other: String },
    GreaterOrEqual { field: String, other: String },
}

impl fmt::Display for FailureMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureMessage::Required { field } => write!(f, "field \"{field}\" is required"),
            FailureMessage::EqualTo { field, other } => {
                write!(f, "field \"{field}\" must be equal to \"{other}\"")
            }
            FailureMessage::GreaterOrEqual { field, other } => {
                write!(f, "field \"{field}\" must greater or equal than \"{other}\"")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Check {
    pub directive: String,
    pub field: String,
    pub condition: Condition,
    pub message: FailureMessage,
    /// Support symbols the rendered check needs (e.g. the `errors` package).
    pub imports: Vec<String>,
}

pub const ERRORS_IMPORT: &str = "errors";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    Check(Check),
    /// Unconditional "no error" result.
    ReturnNoError,
}

/// The complete validation logic of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedProcedure {
    pub record: String,
    /// Checks in order, always ending with [`Statement::ReturnNoError`].
    pub body: Vec<Statement>,
    pub imports: BTreeSet<String>,
}

impl GeneratedProcedure {
    pub fn checks(&self) -> impl Iterator<Item = &Check> {
        self.body.iter().filter_map(|s| match s {
            Statement::Check(c) => Some(c),
            Statement::ReturnNoError => None,
        })
    }
}
