//! Error types for every pipeline stage.
//!
//! Each stage owns a `thiserror` enum; [`Error`] wraps them for callers that
//! drive the whole batch. None of these are recoverable mid-run: the first one
//! aborts generation and nothing is emitted.
use thiserror::Error;

use crate::tags::state::{Expected, ParseState};

/// A raw annotation that does not follow the tag grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed tag {tag}: expected {expected} at index {index} (found {}, state {state})", found_display(.found))]
pub struct TagFormatError {
    pub tag: String,
    /// Character index into `tag`.
    pub index: usize,
    /// `None` when the input ended early.
    pub found: Option<char>,
    pub state: ParseState,
    pub expected: Expected,
}

fn found_display(found: &Option<char>) -> String {
    match found {
        Some(c) => format!("{c:?}"),
        None => "end of input".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("record {record:?}, field {field:?}: {source}")]
    Tag {
        record: String,
        field: String,
        #[source]
        source: TagFormatError,
    },

    /// Two sightings of the same record declare the same field.
    #[error("record {record:?}: field {field:?} already exists")]
    DuplicateField { record: String, field: String },

    #[error("record names do not match: {left:?} vs {right:?}")]
    RecordNameMismatch { left: String, right: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("record {record:?}, field {field:?}: unsupported directive {directive:?}")]
    UnsupportedDirective {
        record: String,
        field: String,
        directive: String,
    },

    #[error(
        "record {record:?}, field {field:?}: directive {directive:?} expects exactly {expected} argument(s), but got {got}: {args:?}"
    )]
    Arity {
        record: String,
        field: String,
        directive: String,
        expected: usize,
        got: usize,
        args: Vec<String>,
    },

    #[error("record {record:?}, field {field:?}: directive {directive:?} is not supported for type {ty:?}")]
    UnsupportedType {
        record: String,
        field: String,
        directive: String,
        ty: String,
    },

    #[error("record {record:?}, field {field:?}: directives {directives:?} produced no checks")]
    DroppedDirectives {
        record: String,
        field: String,
        directives: Vec<String>,
    },
}

/// Failures reading the declaration document.
#[derive(Debug, Error)]
pub enum DeclError {
    #[error("at JSON path {path}: {message}")]
    Json { path: String, message: String },

    #[error("JSON pointer {0:?} does not select anything")]
    PointerNotFound(String),

    #[error("{kind} name {name:?} is not a valid identifier")]
    InvalidIdentifier { kind: &'static str, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ScanError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("sample for record {record:?} is not a JSON object")]
    NotAnObject { record: String },

    #[error("sample for record {record:?} has no field {field:?}")]
    MissingField { record: String, field: String },

    #[error("field {field:?} has no length (value: {value})")]
    NotMeasurable { field: String, value: String },

    #[error("field {field:?} is not numeric (value: {value})")]
    NotNumeric { field: String, value: String },

    #[error("operands of {op} are not numbers")]
    NotComparable { op: &'static str },
}

/// Any failure of a generation run.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Decl(#[from] DeclError),

    #[error(transparent)]
    Scan(#[from] ScanError),
}
