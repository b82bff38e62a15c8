//! Dry-run a generated procedure against a sample record.
//!
//! A sample is a JSON object keyed by field name. `null` stands for a nil
//! pointer, slice or map; strings, arrays and objects have a length; numbers
//! widen to `f64`.
use serde_json::Value;

use crate::error::EvalError;
use crate::ir::{Check, Comparison, GeneratedProcedure, Operand, Statement};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    /// The first failing check's message.
    Invalid(String),
}

impl Verdict {
    pub fn is_valid(&self) -> bool { matches!(self, Verdict::Valid) }
}

enum Resolved<'v> {
    Json(&'v Value),
    Number(f64),
    Nil,
}

struct Sample<'v> {
    record: &'v str,
    fields: &'v serde_json::Map<String, Value>,
}

impl<'v> Sample<'v> {
    fn get(&self, field: &str) -> Result<&'v Value, EvalError> {
        self.fields.get(field).ok_or_else(|| EvalError::MissingField {
            record: self.record.to_string(),
            field: field.to_string(),
        })
    }

    fn resolve(&self, op: &Operand) -> Result<Resolved<'v>, EvalError> {
        Ok(match op {
            Operand::Field(name) => Resolved::Json(self.get(name)?),
            Operand::Length(name) => {
                let len = match self.get(name)? {
                    Value::Null => 0,
                    Value::String(s) => s.len(),
                    Value::Array(xs) => xs.len(),
                    Value::Object(m) => m.len(),
                    other => {
                        return Err(EvalError::NotMeasurable {
                            field: name.clone(),
                            value: other.to_string(),
                        });
                    }
                };
                Resolved::Number(len as f64)
            }
            Operand::Widened(name) => {
                let value = self.get(name)?;
                let n = value.as_f64().ok_or_else(|| EvalError::NotNumeric {
                    field: name.clone(),
                    value: value.to_string(),
                })?;
                Resolved::Number(n)
            }
            Operand::Number(n) => Resolved::Number(n.0),
            Operand::Nil => Resolved::Nil,
        })
    }

    fn holds(&self, check: &Check) -> Result<bool, EvalError> {
        let cond = &check.condition;
        let lhs = self.resolve(&cond.lhs)?;
        let rhs = self.resolve(&cond.rhs)?;
        Ok(match cond.op {
            Comparison::Eq => equal(&lhs, &rhs),
            Comparison::Ne => !equal(&lhs, &rhs),
            Comparison::Lt => {
                let (Some(a), Some(b)) = (number(&lhs), number(&rhs)) else {
                    return Err(EvalError::NotComparable { op: cond.op.symbol() });
                };
                a < b
            }
        })
    }
}

fn number(r: &Resolved<'_>) -> Option<f64> {
    match r {
        Resolved::Number(n) => Some(*n),
        Resolved::Json(v) => v.as_f64(),
        Resolved::Nil => None,
    }
}

fn equal(a: &Resolved<'_>, b: &Resolved<'_>) -> bool {
    match (a, b) {
        (Resolved::Nil, Resolved::Nil) => true,
        (Resolved::Nil, Resolved::Json(v)) | (Resolved::Json(v), Resolved::Nil) => v.is_null(),
        (Resolved::Json(x), Resolved::Json(y)) => x == y,
        (Resolved::Nil, Resolved::Number(_)) | (Resolved::Number(_), Resolved::Nil) => false,
        (x, y) => number(x).zip(number(y)).is_some_and(|(x, y)| x == y),
    }
}

/// Runs the procedure's statements in order and stops at the first failing check.
pub fn evaluate(procedure: &GeneratedProcedure, sample: &Value) -> Result<Verdict, EvalError> {
    let Some(fields) = sample.as_object() else {
        return Err(EvalError::NotAnObject { record: procedure.record.clone() });
    };
    let sample = Sample { record: &procedure.record, fields };

    for stmt in &procedure.body {
        match stmt {
            Statement::Check(check) => {
                if sample.holds(check)? {
                    return Ok(Verdict::Invalid(check.message.to_string()));
                }
            }
            Statement::ReturnNoError => return Ok(Verdict::Valid),
        }
    }
    Ok(Verdict::Valid)
}
