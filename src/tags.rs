//! Struct tag parsing.
//!
//! A tag is the raw (backquoted) annotation of a field, e.g.
//!
//! ```text
//! `validate:"required,oneof=red green blue,oneof=r g b" json:"name"`
//! ```
//!
//! Only the `validate` pair is decoded; every other pair is checked for shape
//! and thrown away. The example above yields
//! `{"required": [], "oneof": ["red green blue", "r g b"]}`.
//!
//! There is no escaping: an argument cannot contain `,`, `=` or `"`.
pub mod state;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::error::TagFormatError;
use state::{transition, Action, CharClass, Expected, ParseState};

pub const VALIDATE_KEY: &str = "validate";

// ------------------------------ Validations ------------------------------- //

/// Directive name → arguments, in the order they were written.
///
/// A directive without arguments maps to an empty list. Repeating a directive
/// appends to its list instead of replacing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Validations(IndexMap<String, Vec<String>>);

impl Validations {
    pub fn new() -> Self { Self::default() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn get(&self, directive: &str) -> Option<&[String]> {
        self.0.get(directive).map(Vec::as_slice)
    }

    pub fn contains(&self, directive: &str) -> bool { self.0.contains_key(directive) }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Registers `directive` without adding an argument.
    pub fn insert_key(&mut self, directive: impl Into<String>) {
        self.0.entry(directive.into()).or_default();
    }

    pub fn push_arg(&mut self, directive: &str, arg: impl Into<String>) {
        self.0.entry(directive.to_string()).or_default().push(arg.into());
    }

    /// Renders back into a raw tag holding only the `validate` pair.
    pub fn to_tag(&self) -> String {
        let mut specs = Vec::new();
        for (name, args) in &self.0 {
            if args.is_empty() {
                specs.push(name.clone());
            }
            for arg in args {
                specs.push(format!("{name}={arg}"));
            }
        }
        format!("`{VALIDATE_KEY}:\"{}\"`", specs.join(","))
    }
}

impl<K: Into<String>, V: IntoIterator<Item = S>, S: Into<String>> FromIterator<(K, V)> for Validations {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = Validations::new();
        for (k, args) in iter {
            let k = k.into();
            out.insert_key(k.clone());
            for arg in args {
                out.push_arg(&k, arg);
            }
        }
        out
    }
}

// -------------------------------- Parser ---------------------------------- //

struct Parser<'t> {
    tag: &'t str,
    at: ParseState,
    /// Set while inside a tag whose key is not `validate`.
    skip: bool,
    buf: String,
    key: String,
    vals: Validations,
}

impl<'t> Parser<'t> {
    fn new(tag: &'t str) -> Self {
        Self {
            tag,
            at: ParseState::Begin,
            skip: false,
            buf: String::new(),
            key: String::new(),
            vals: Validations::new(),
        }
    }

    fn fail(&self, index: usize, found: Option<char>, expected: Expected) -> TagFormatError {
        TagFormatError {
            tag: self.tag.to_string(),
            index,
            found,
            state: self.at,
            expected,
        }
    }

    fn accept(&mut self, index: usize, c: char) -> Result<(), TagFormatError> {
        let (next, action) = match transition(self.at, CharClass::of(c), self.skip) {
            Ok(step) => step,
            // a bare `validate` key with no value at all
            Err(Expected::Colon) if self.at == ParseState::TagKey && self.buf == VALIDATE_KEY => {
                return Err(self.fail(index, Some(c), Expected::QuotedValidateValue));
            }
            Err(expected) => return Err(self.fail(index, Some(c), expected)),
        };

        match action {
            Action::Ignore => {}
            Action::Push => self.buf.push(c),
            Action::CloseTagKey => {
                self.skip = self.buf != VALIDATE_KEY;
                self.buf.clear();
            }
            Action::CloseKey => self.store_key(),
            Action::CloseValue => self.store_value(),
        }

        self.at = next;
        Ok(())
    }

    fn store_key(&mut self) {
        self.key = std::mem::take(&mut self.buf);
        self.vals.insert_key(self.key.clone());
    }

    fn store_value(&mut self) {
        let value = std::mem::take(&mut self.buf);
        self.vals.push_arg(&self.key, value);
    }
}

/// Parses one raw tag into its `validate` directives.
///
/// A tag without a `validate` pair yields empty [`Validations`].
pub fn parse(tag: &str, log: &dyn Diagnostics) -> Result<Validations, TagFormatError> {
    log.debug("parsing validations", &[("tag", &tag)]);

    let mut chars = tag.chars().enumerate();
    let mut parser = Parser::new(tag);

    match chars.next() {
        Some((_, '`')) => {}
        other => {
            return Err(parser.fail(0, other.map(|(_, c)| c), Expected::OpeningRawQuote));
        }
    }

    let mut len = 1;
    for (index, c) in chars {
        parser.accept(index, c)?;
        len = index + 1;
    }

    if parser.at != ParseState::End {
        return Err(parser.fail(len, None, Expected::ClosingRawQuote));
    }

    log.debug("parsed validations", &[("tag", &tag), ("validations", &parser.vals)]);
    Ok(parser.vals)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NoopDiagnostics;

    fn raw(s: &str) -> String { format!("`{s}`") }

    fn ok(tag: &str) -> Validations {
        parse(tag, &NoopDiagnostics).unwrap_or_else(|e| panic!("{tag}: {e}"))
    }

    fn err(tag: &str) -> TagFormatError {
        match parse(tag, &NoopDiagnostics) {
            Ok(v) => panic!("{tag}: expected error, got {v:?}"),
            Err(e) => e,
        }
    }

    fn vals(pairs: &[(&str, &[&str])]) -> Validations {
        pairs.iter().map(|(k, v)| (*k, v.iter().copied())).collect()
    }

    #[test]
    fn parses_known_tags() {
        let cases: Vec<(String, Validations)> = vec![
            (raw(r#"json:"foo""#), Validations::new()),
            (raw(r#"validate:"required""#), vals(&[("required", &[])])),
            (raw(r#"validate:"required" json:foo""#), vals(&[("required", &[])])),
            (
                raw(r#"validate:"required,oneof=red green blue,oneof=r g b""#),
                vals(&[("required", &[]), ("oneof", &["red green blue", "r g b"])]),
            ),
            (raw(r#"json:"name,omitempty" validate:"gte=One""#), vals(&[("gte", &["One"])])),
            (raw(r#"validate:"eqfield=Field1""#), vals(&[("eqfield", &["Field1"])])),
            (raw(""), Validations::new()),
            (raw(r#"validate:"""#), Validations::new()),
        ];

        for (tag, expected) in cases {
            assert_eq!(ok(&tag), expected, "tag: {tag}");
        }
    }

    #[test]
    fn repeated_directive_keeps_every_argument_in_order() {
        let v = ok(&raw(r#"validate:"oneof=a,required,oneof=b""#));
        assert_eq!(v.get("oneof"), Some(&["a".to_string(), "b".to_string()][..]));
        assert_eq!(v.get("required"), Some(&[][..]));
        assert_eq!(v.names().collect::<Vec<_>>(), ["oneof", "required"]);
    }

    #[test]
    fn bare_directive_is_present_with_no_arguments() {
        let v = ok(&raw(r#"validate:"required""#));
        assert!(v.contains("required"));
        assert!(v.get("required").unwrap().is_empty());
        assert!(!v.contains("gte"));
    }

    #[test]
    fn arguments_may_contain_colons_and_spaces() {
        let v = ok(&raw(r#"validate:"datetime=2006-01-02T15:04:05,oneof= a b ""#));
        assert_eq!(v.get("datetime").unwrap(), ["2006-01-02T15:04:05"]);
        assert_eq!(v.get("oneof").unwrap(), [" a b "]);
    }

    #[test]
    fn missing_raw_quotes_are_rejected() {
        let e = err(r#"validate:"required""#);
        assert_eq!((e.index, e.expected), (0, Expected::OpeningRawQuote));

        let e = err(r#"`validate:"required""#);
        assert_eq!(e.expected, Expected::ClosingRawQuote);
        assert_eq!(e.found, None);

        assert_eq!(err("").expected, Expected::OpeningRawQuote);
        assert_eq!(err("`").expected, Expected::ClosingRawQuote);
    }

    #[test]
    fn validate_must_be_followed_by_a_quoted_value() {
        assert_eq!(err(&raw("validate:required")).expected, Expected::QuotedValidateValue);
        assert_eq!(err(&raw("validate")).expected, Expected::QuotedValidateValue);
        assert_eq!(err(&raw("validate:")).expected, Expected::QuotedValidateValue);
    }

    #[test]
    fn spaces_where_not_permitted() {
        let e = err(&raw(r#"vali date:"required""#));
        assert_eq!((e.index, e.state, e.expected), (5, ParseState::TagKey, Expected::TagKeyWithoutSpace));

        let e = err(&raw(r#"validate: "required""#));
        assert_eq!((e.index, e.expected), (10, Expected::QuoteAfterSeparator));

        let e = err(&raw(r#"validate:"required, gte=One""#));
        assert_eq!(e.expected, Expected::DirectiveNameWithoutSpace);

        let e = err(&raw(r#"validate:"requ ired""#));
        assert_eq!(e.state, ParseState::PairKey);
    }

    #[test]
    fn dangling_separators_are_rejected() {
        let e = err(&raw(r#"validate:"gte=""#));
        assert_eq!((e.state, e.expected), (ParseState::PairKeyValueSeparator, Expected::DirectiveArgument));

        let e = err(&raw(r#"validate:"required,""#));
        assert_eq!((e.state, e.expected), (ParseState::PairSeparator, Expected::DirectiveName));

        let e = err(&raw(r#"validate:",required""#));
        assert_eq!(e.expected, Expected::DirectiveName);

        let e = err(&raw(r#"validate:"=One""#));
        assert_eq!(e.expected, Expected::DirectiveName);

        let e = err(&raw(r#"validate:"gte=a=b""#));
        assert_eq!((e.found, e.expected), (Some('='), Expected::ArgumentWithoutEquals));
    }

    #[test]
    fn unterminated_values_and_trailing_input_are_rejected() {
        assert_eq!(err(&raw(r#"validate:"required"#)).expected, Expected::ClosingQuote);
        assert_eq!(err(&raw(r#"json:"foo"#)).expected, Expected::ClosingQuote);
        assert_eq!(err(r#"`json:"foo"` "#).expected, Expected::NothingAfterEnd);
    }

    #[test]
    fn error_message_names_position_and_state() {
        let e = err(&raw(r#"validate:"gte=""#));
        let msg = e.to_string();
        assert!(msg.contains("index 15"), "{msg}");
        assert!(msg.contains("pairKeyValueSeparator"), "{msg}");
    }

    #[test]
    fn rendered_tags_parse_back_to_the_same_validations() {
        let sets = [
            vals(&[("required", &[])]),
            vals(&[("required", &[]), ("oneof", &["red green blue", "r g b"])]),
            vals(&[("gte", &["One"]), ("eqfield", &["Field1"]), ("min", &["0"])]),
            vals(&[("datetime", &["15:04"])]),
            Validations::new(),
        ];
        for v in sets {
            assert_eq!(ok(&v.to_tag()), v, "tag: {}", v.to_tag());
        }
    }
}
