//! Directive registry: one variant per supported directive.
//!
//! Each directive declares how many arguments it takes; [`Directive::generate`]
//! checks that first, then builds the check for the field's type.
use ordered_float::OrderedFloat;

use crate::diagnostics::Diagnostics;
use crate::error::GenerateError;
use crate::ir::{Check, Comparison, Condition, FailureMessage, Operand, ERRORS_IMPORT};
use crate::model::{Field, Record, TypeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// Non-empty for strings, slices and maps; non-nil for pointers.
    Required,
    /// Equal to a sibling field.
    EqField,
    /// Greater than or equal to a sibling field, compared as `float64`.
    Gte,
}

impl Directive {
    pub const ALL: [Directive; 3] = [Directive::Required, Directive::EqField, Directive::Gte];

    pub fn lookup(name: &str) -> Option<Directive> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Directive::Required => "required",
            Directive::EqField => "eqfield",
            Directive::Gte => "gte",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Directive::Required => 0,
            Directive::EqField | Directive::Gte => 1,
        }
    }

    pub fn generate(
        self,
        record: &Record,
        field: &Field,
        args: &[String],
        log: &dyn Diagnostics,
    ) -> Result<Check, GenerateError> {
        if args.len() != self.arity() {
            return Err(GenerateError::Arity {
                record: record.name.clone(),
                field: field.name.clone(),
                directive: self.name().to_string(),
                expected: self.arity(),
                got: args.len(),
                args: args.to_vec(),
            });
        }

        log.debug("generating", &[
            ("record", &record.name),
            ("field", &field.name),
            ("directive", &self.name()),
        ]);

        let (condition, message) = match self {
            Directive::Required => required(record, field, log)?,
            Directive::EqField => eqfield(field, &args[0]),
            Directive::Gte => gte(record, field, &args[0])?,
        };

        Ok(Check {
            directive: self.name().to_string(),
            field: field.name.clone(),
            condition,
            message,
            imports: vec![ERRORS_IMPORT.to_string()],
        })
    }
}

/// Builds the check for directive `name` on `field`, taking its arguments from
/// the field's validations.
pub fn generate(
    name: &str,
    record: &Record,
    field: &Field,
    log: &dyn Diagnostics,
) -> Result<Check, GenerateError> {
    let directive = Directive::lookup(name).ok_or_else(|| GenerateError::UnsupportedDirective {
        record: record.name.clone(),
        field: field.name.clone(),
        directive: name.to_string(),
    })?;
    let args = field.validations.get(name).unwrap_or_default();
    directive.generate(record, field, args, log)
}

fn unsupported_type(record: &Record, field: &Field, directive: Directive) -> GenerateError {
    GenerateError::UnsupportedType {
        record: record.name.clone(),
        field: field.name.clone(),
        directive: directive.name().to_string(),
        ty: field.ty.raw.clone(),
    }
}

fn required(
    record: &Record,
    field: &Field,
    log: &dyn Diagnostics,
) -> Result<(Condition, FailureMessage), GenerateError> {
    let condition = match field.ty.kind {
        TypeKind::String | TypeKind::Sequence | TypeKind::Mapping => {
            log.debug("requiring non-zero length", &[("kind", &field.ty.kind)]);
            Condition::new(
                Operand::Length(field.name.clone()),
                Comparison::Eq,
                Operand::Number(OrderedFloat(0.0)),
            )
        }
        TypeKind::OptionalReference => {
            log.debug("requiring non-nil", &[("kind", &field.ty.kind)]);
            Condition::new(Operand::Field(field.name.clone()), Comparison::Eq, Operand::Nil)
        }
        TypeKind::Other => return Err(unsupported_type(record, field, Directive::Required)),
    };
    Ok((condition, FailureMessage::Required { field: field.name.clone() }))
}

fn eqfield(field: &Field, other: &str) -> (Condition, FailureMessage) {
    let condition = Condition::new(
        Operand::Field(field.name.clone()),
        Comparison::Ne,
        Operand::Field(other.to_string()),
    );
    let message = FailureMessage::EqualTo { field: field.name.clone(), other: other.to_string() };
    (condition, message)
}

// TODO: compare operands of the same numeric type directly instead of always
// widening to float64 (large int64 values lose precision today).
fn gte(
    record: &Record,
    field: &Field,
    other: &str,
) -> Result<(Condition, FailureMessage), GenerateError> {
    if field.ty.kind != TypeKind::Other {
        return Err(unsupported_type(record, field, Directive::Gte));
    }
    let condition = Condition::new(
        Operand::Widened(field.name.clone()),
        Comparison::Lt,
        Operand::Widened(other.to_string()),
    );
    let message =
        FailureMessage::GreaterOrEqual { field: field.name.clone(), other: other.to_string() };
    Ok((condition, message))
}

// ------------------------------- Tests ------------------------------------ //
