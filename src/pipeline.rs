//! The whole batch: declarations in, one Go file out.
use crate::assemble::assemble_all;
use crate::codegen::Codegen;
use crate::decl::TypeDecl;
use crate::diagnostics::Diagnostics;
use crate::error::Error;
use crate::ir::GeneratedProcedure;
use crate::model::{build_records, Record};

pub const DEFAULT_PACKAGE: &str = "main";

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Package clause of the emitted file.
    pub package: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self { package: DEFAULT_PACKAGE.to_string() }
    }
}

/// Records and their procedures, before rendering.
#[derive(Debug)]
pub struct Batch {
    pub records: Vec<Record>,
    pub procedures: Vec<GeneratedProcedure>,
}

pub fn lower(decls: &[TypeDecl], log: &dyn Diagnostics) -> Result<Batch, Error> {
    let records = build_records(decls, log)?;
    let procedures = assemble_all(&records, log)?;
    Ok(Batch { records, procedures })
}

/// Builds records from every declaration, assembles them and renders the file.
/// Any failure aborts the run and nothing is returned.
pub fn generate(
    decls: &[TypeDecl],
    options: &GenerateOptions,
    log: &dyn Diagnostics,
) -> Result<String, Error> {
    let batch = lower(decls, log)?;
    let mut codegen = Codegen::new(options.package.clone());
    codegen.emit_all(&batch.procedures);
    Ok(codegen.into_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{FieldDecl, SourceFile};
    use crate::diagnostics::NoopDiagnostics;
    use crate::error::{GenerateError, ModelError};
    use crate::eval::{evaluate, Verdict};
    use crate::scan::scan_go;
    use serde_json::json;

    const FIXTURE: &str = include_str!("../testdata/generated_test.go");
    const GOLDEN: &str = include_str!("../testdata/generated_validations_test.go");

    fn field(name: &str, ty: &str, tag: Option<&str>) -> FieldDecl {
        FieldDecl { name: name.into(), ty: ty.into(), tag: tag.map(str::to_string) }
    }

    fn fixture_batch() -> Batch {
        let decls = scan_go(FIXTURE, &NoopDiagnostics).unwrap();
        lower(&decls, &NoopDiagnostics).unwrap()
    }

    fn procedure<'b>(batch: &'b Batch, record: &str) -> &'b GeneratedProcedure {
        batch.procedures.iter().find(|p| p.record == record).unwrap()
    }

    #[test]
    fn go_fixture_renders_the_golden_file() {
        let decls = scan_go(FIXTURE, &NoopDiagnostics).unwrap();
        let options = GenerateOptions { package: "main_test".into() };
        let out = generate(&decls, &options, &NoopDiagnostics).unwrap();
        assert_eq!(out, GOLDEN);
    }

    #[test]
    fn output_is_stable_across_runs() {
        let decls = scan_go(FIXTURE, &NoopDiagnostics).unwrap();
        let options = GenerateOptions::default();
        let a = generate(&decls, &options, &NoopDiagnostics).unwrap();
        let b = generate(&decls, &options, &NoopDiagnostics).unwrap();
        assert_eq!(a, b);
        assert!(a.contains("\npackage main\n"));
    }

    #[test]
    fn required_rejects_each_empty_field() {
        let batch = fixture_batch();
        let p = procedure(&batch, "Required");
        let valid = json!({
            "String": "string",
            "StringPointer": "",
            "Slice": [{}],
            "Map": { "key": {} },
        });
        assert_eq!(evaluate(p, &valid).unwrap(), Verdict::Valid);

        let cases = [
            ("String", json!(""), r#"field "String" is required"#),
            ("StringPointer", json!(null), r#"field "StringPointer" is required"#),
            ("Slice", json!([]), r#"field "Slice" is required"#),
            ("Slice", json!(null), r#"field "Slice" is required"#),
            ("Map", json!({}), r#"field "Map" is required"#),
            ("Map", json!(null), r#"field "Map" is required"#),
        ];
        for (name, value, message) in cases {
            let mut sample = valid.clone();
            sample[name] = value;
            assert_eq!(evaluate(p, &sample).unwrap(), Verdict::Invalid(message.into()), "{name}");
        }
    }

    #[test]
    fn eqfield_and_gte_compare_siblings() {
        let batch = fixture_batch();

        let eq = procedure(&batch, "Eqfield");
        assert!(evaluate(eq, &json!({ "Field1": "foo", "Field2": "foo" })).unwrap().is_valid());
        assert_eq!(
            evaluate(eq, &json!({ "Field1": "foo", "Field2": "bar" })).unwrap(),
            Verdict::Invalid(r#"field "Field2" must be equal to "Field1""#.into())
        );

        let gte = procedure(&batch, "Gte");
        assert!(evaluate(gte, &json!({ "One": 1, "Two": 1.2 })).unwrap().is_valid());
        assert!(evaluate(gte, &json!({ "One": 1, "Two": 1 })).unwrap().is_valid());
        assert!(!evaluate(gte, &json!({ "One": 2, "Two": -0.3 })).unwrap().is_valid());
    }

    #[test]
    fn same_type_across_files_is_merged() {
        let first = scan_go("package a\ntype Pair struct {\n\tA string `validate:\"required\"`\n}\n", &NoopDiagnostics).unwrap();
        let second = scan_go("package a\ntype Pair struct {\n\tB *int `validate:\"required\"`\n}\n", &NoopDiagnostics).unwrap();
        let decls: Vec<_> = first.into_iter().chain(second).collect();

        let batch = lower(&decls, &NoopDiagnostics).unwrap();
        assert_eq!(batch.records.len(), 1);
        let fields: Vec<_> = batch.procedures[0].checks().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, ["A", "B"]);
    }

    #[test]
    fn malformed_tag_aborts_the_run() {
        let decls = [TypeDecl {
            name: "T".into(),
            fields: vec![field("A", "string", Some(r#"`validate: "required"`"#))],
        }];
        let err = generate(&decls, &GenerateOptions::default(), &NoopDiagnostics).unwrap_err();
        match err {
            Error::Model(ModelError::Tag { source, .. }) => assert_eq!(source.index, 10),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_directive_aborts_the_run() {
        let decls = [TypeDecl {
            name: "T".into(),
            fields: vec![field("A", "string", Some(r#"`validate:"oneof=a b"`"#))],
        }];
        let err = generate(&decls, &GenerateOptions::default(), &NoopDiagnostics).unwrap_err();
        assert!(matches!(
            err,
            Error::Generate(GenerateError::UnsupportedDirective { ref directive, .. }) if directive == "oneof"
        ));
    }

    #[test]
    fn json_declarations_feed_the_same_pipeline() {
        let src = r#"{ "types": [ { "name": "Gte", "fields": [
            { "name": "One", "type": "int" },
            { "name": "Two", "type": "float64", "tag": "`validate:\"gte=One\"`" }
        ] } ] }"#;
        let file = SourceFile::from_json(src, None).unwrap();
        let out = generate(&file.types, &GenerateOptions::default(), &NoopDiagnostics).unwrap();
        assert!(out.contains("func (g Gte) Validate() error {"), "{out}");
        assert!(out.contains("val < than"), "{out}");
    }
}
