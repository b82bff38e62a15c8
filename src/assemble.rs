//! Lower records to generated procedures.
use std::collections::BTreeSet;

use rayon::prelude::*;

use crate::diagnostics::Diagnostics;
use crate::error::GenerateError;
use crate::ir::{GeneratedProcedure, Statement};
use crate::model::Record;
use crate::rules;

/// One check per (field, directive), fields in stored order, then `return nil`.
pub fn assemble(record: &Record, log: &dyn Diagnostics) -> Result<GeneratedProcedure, GenerateError> {
    let mut body = Vec::new();
    let mut imports = BTreeSet::new();

    for field in &record.fields {
        let before = body.len();
        for directive in field.validations.names() {
            let check = rules::generate(directive, record, field, log)?;
            imports.extend(check.imports.iter().cloned());
            body.push(Statement::Check(check));
        }

        if body.len() == before && !field.validations.is_empty() {
            return Err(GenerateError::DroppedDirectives {
                record: record.name.clone(),
                field: field.name.clone(),
                directives: field.validations.names().map(str::to_string).collect(),
            });
        }
    }

    log.debug("assembled", &[("record", &record.name), ("checks", &body.len())]);
    body.push(Statement::ReturnNoError);

    Ok(GeneratedProcedure { record: record.name.clone(), body, imports })
}

/// Assembles every record; the first failure fails the batch.
///
/// Records share nothing, so they are assembled in parallel. The result is
/// sorted by record name.
pub fn assemble_all(
    records: &[Record],
    log: &dyn Diagnostics,
) -> Result<Vec<GeneratedProcedure>, GenerateError> {
    let mut procedures = records
        .par_iter()
        .map(|record| assemble(record, log))
        .collect::<Result<Vec<_>, _>>()?;
    procedures.sort_by(|a, b| a.record.cmp(&b.record));
    Ok(procedures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NoopDiagnostics;
    use crate::ir::Check;
    use crate::model::Field;
    use crate::tags::Validations;

    fn validations(pairs: &[(&str, &[&str])]) -> Validations {
        pairs.iter().map(|(k, v)| (*k, v.iter().copied())).collect()
    }

    fn required_record() -> Record {
        Record::with_fields("Required", vec![
            Field::new("String", "string", validations(&[("required", &[])])),
            Field::new("StringPointer", "*string", validations(&[("required", &[])])),
            Field::new("Slice", "[]struct{}", validations(&[("required", &[])])),
            Field::new("Map", "map[string]struct{}", validations(&[("required", &[])])),
        ])
    }

    #[test]
    fn checks_follow_field_order_and_end_with_success() {
        let proc_ = assemble(&required_record(), &NoopDiagnostics).unwrap();
        let fields: Vec<_> = proc_.checks().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, ["String", "StringPointer", "Slice", "Map"]);
        assert_eq!(proc_.body.len(), 5);
        assert_eq!(proc_.body.last(), Some(&Statement::ReturnNoError));
        assert_eq!(proc_.imports.iter().collect::<Vec<_>>(), ["errors"]);
    }

    #[test]
    fn every_directive_of_a_field_yields_a_check() {
        let record = Record::with_fields("Both", vec![Field::new(
            "Name",
            "string",
            validations(&[("required", &[]), ("eqfield", &["Other"])]),
        )]);
        let proc_ = assemble(&record, &NoopDiagnostics).unwrap();
        let mut directives: Vec<&str> = proc_.checks().map(|c: &Check| c.directive.as_str()).collect();
        directives.sort();
        assert_eq!(directives, ["eqfield", "required"]);
    }

    #[test]
    fn record_without_fields_only_returns_success() {
        let proc_ = assemble(&Record::new("Empty"), &NoopDiagnostics).unwrap();
        assert_eq!(proc_.body, vec![Statement::ReturnNoError]);
        assert!(proc_.imports.is_empty());
    }

    #[test]
    fn one_bad_record_fails_the_whole_batch() {
        let bad = Record::with_fields("Bad", vec![Field::new(
            "Count",
            "int",
            validations(&[("required", &[])]),
        )]);
        let result = assemble_all(&[required_record(), bad], &NoopDiagnostics);
        assert!(matches!(result, Err(GenerateError::UnsupportedType { .. })));
    }

    #[test]
    fn batch_output_is_sorted_by_record_name() {
        let gte = Record::with_fields("Gte", vec![Field::new(
            "Two",
            "float64",
            validations(&[("gte", &["One"])]),
        )]);
        let procs = assemble_all(&[required_record(), gte], &NoopDiagnostics).unwrap();
        let names: Vec<_> = procs.iter().map(|p| p.record.as_str()).collect();
        assert_eq!(names, ["Gte", "Required"]);
    }
}
