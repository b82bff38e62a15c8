//! Generate Go `Validate() error` methods from `validate:"..."` struct tags.
//!
//! Declarations come from Go source ([`scan`]) or JSON ([`decl`]). Tags are
//! parsed ([`tags`]) into records ([`model`]), each directive becomes a check
//! ([`rules`]), checks are assembled per record ([`assemble`]) and rendered as
//! Go ([`codegen`]). [`pipeline::generate`] runs all of it.
pub mod assemble;
pub mod cli;
pub mod codegen;
pub mod decl;
pub mod diagnostics;
pub mod error;
pub mod eval;
pub mod ir;
pub mod model;
pub mod pipeline;
pub mod rules;
pub mod scan;
pub mod tags;

pub use diagnostics::{Diagnostics, NoopDiagnostics, TracingDiagnostics};
pub use error::Error;
pub use pipeline::{generate, GenerateOptions};
