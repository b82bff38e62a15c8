//! Records and fields with their parsed directives.
//!
//! [`ModelBuilder`] turns scanned declarations into [`Record`]s. Only fields
//! carrying at least one directive end up in a record; the rest have nothing
//! to validate.
use indexmap::IndexMap;
use serde::Serialize;

use crate::decl::TypeDecl;
use crate::diagnostics::Diagnostics;
use crate::error::ModelError;
use crate::tags::{self, Validations};

// ------------------------------- Types ------------------------------------ //

/// Classification of a declared type, derived from its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    String,
    /// `[]T`
    Sequence,
    /// `map[K]V`
    Mapping,
    /// `*T`
    OptionalReference,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldType {
    pub raw: String,
    pub kind: TypeKind,
}

impl FieldType {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let kind = if raw.starts_with("[]") {
            TypeKind::Sequence
        } else if raw.starts_with("map[") {
            TypeKind::Mapping
        } else if raw.starts_with('*') {
            TypeKind::OptionalReference
        } else if raw == "string" {
            TypeKind::String
        } else {
            TypeKind::Other
        };
        Self { raw: raw.to_string(), kind }
    }

    /// Values with a length: strings, slices and maps.
    pub fn has_length(&self) -> bool {
        matches!(self.kind, TypeKind::String | TypeKind::Sequence | TypeKind::Mapping)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    pub validations: Validations,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: &str, validations: Validations) -> Self {
        Self { name: name.into(), ty: FieldType::parse(ty), validations }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub name: String,
    /// Declaration order; names are unique.
    pub fields: Vec<Field>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new() }
    }

    pub fn with_fields(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self { name: name.into(), fields }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Joins two sightings of the same record; `other`'s fields go last.
    ///
    /// An empty name on either side adopts the other's name.
    pub fn merge(mut self, other: Record) -> Result<Record, ModelError> {
        if self.name.is_empty() {
            self.name = other.name.clone();
        } else if !other.name.is_empty() && self.name != other.name {
            return Err(ModelError::RecordNameMismatch { left: self.name, right: other.name });
        }

        for field in &other.fields {
            if self.field(&field.name).is_some() {
                return Err(ModelError::DuplicateField {
                    record: self.name,
                    field: field.name.clone(),
                });
            }
        }

        self.fields.extend(other.fields);
        Ok(self)
    }
}

// ------------------------------- Builder ---------------------------------- //

pub struct ModelBuilder<'d> {
    log: &'d dyn Diagnostics,
    records: IndexMap<String, Record>,
}

impl<'d> ModelBuilder<'d> {
    pub fn new(log: &'d dyn Diagnostics) -> Self {
        Self { log, records: IndexMap::new() }
    }

    /// Scans one declared type. Calling this again for the same type name merges
    /// into the record built so far.
    pub fn scan(&mut self, decl: &TypeDecl) -> Result<(), ModelError> {
        for field in &decl.fields {
            self.log.debug("checking field", &[("type", &decl.name), ("field", &field.name)]);

            let Some(tag) = field.tag.as_deref().filter(|t| !t.is_empty()) else {
                self.log.debug("no tag found, skipping", &[("field", &field.name)]);
                continue;
            };

            let validations = tags::parse(tag, self.log).map_err(|source| ModelError::Tag {
                record: decl.name.clone(),
                field: field.name.clone(),
                source,
            })?;

            if validations.is_empty() {
                self.log.debug("no validations found", &[("field", &field.name)]);
                continue;
            }

            self.log.debug("found", &[("field", &field.name), ("validations", &validations)]);
            let sighting = Record::with_fields(
                decl.name.clone(),
                vec![Field::new(field.name.clone(), &field.ty, validations)],
            );
            let slot = self
                .records
                .entry(decl.name.clone())
                .or_insert_with(|| Record::new(decl.name.clone()));
            let current = std::mem::replace(slot, Record::new(""));
            *slot = current.merge(sighting)?;
        }
        Ok(())
    }

    /// Records in the order they were first seen.
    pub fn finish(self) -> Vec<Record> {
        self.log.debug("finished finding records", &[("count", &self.records.len())]);
        self.records.into_values().collect()
    }
}

pub fn build_records<'a, I>(decls: I, log: &dyn Diagnostics) -> Result<Vec<Record>, ModelError>
where
    I: IntoIterator<Item = &'a TypeDecl>,
{
    let mut builder = ModelBuilder::new(log);
    for decl in decls {
        builder.scan(decl)?;
    }
    Ok(builder.finish())
}

// ------------------------------- Tests ------------------------------------ //
