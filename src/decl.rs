//! Source declarations: what a scanner hands over before any tag is parsed.
//!
//! Besides the Go scanner in [`crate::scan`], declarations can be supplied as
//! JSON, e.g. from another front end:
//!
//! ```json
//! { "types": [ { "name": "Gte", "fields": [
//!     { "name": "One", "type": "int" },
//!     { "name": "Two", "type": "float64", "tag": "`validate:\"gte=One\"`" }
//! ] } ] }
//! ```
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::DeclError;

static IDENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub types: Vec<TypeDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    /// Raw tag literal, backquotes included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

pub fn is_identifier(name: &str) -> bool {
    IDENT.is_match(name)
}

impl SourceFile {
    /// Parses a declaration document, optionally narrowed by a JSON Pointer.
    pub fn from_json(src: &str, json_pointer: Option<&str>) -> Result<Self, DeclError> {
        let file: SourceFile = match json_pointer {
            None => from_str_with_path(src)?,
            Some(ptr) => {
                let root: serde_json::Value = from_str_with_path(src)?;
                let node = root
                    .pointer(ptr)
                    .ok_or_else(|| DeclError::PointerNotFound(ptr.to_string()))?;
                from_value_with_path(node.clone())?
            }
        };
        file.check_identifiers()?;
        Ok(file)
    }

    fn check_identifiers(&self) -> Result<(), DeclError> {
        for ty in &self.types {
            if !is_identifier(&ty.name) {
                return Err(DeclError::InvalidIdentifier { kind: "type", name: ty.name.clone() });
            }
            for field in &ty.fields {
                if !is_identifier(&field.name) {
                    return Err(DeclError::InvalidIdentifier {
                        kind: "field",
                        name: format!("{}.{}", ty.name, field.name),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, DeclError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| DeclError::Json {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

pub fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, DeclError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| DeclError::Json {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}
