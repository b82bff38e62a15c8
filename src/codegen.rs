//! Render generated procedures as a Go source file.
//!
//! Each record gets a `Validate() error` method on a value receiver named
//! after the record's lowercased first letter. The output is already in
//! gofmt layout.
use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::ir::{Check, GeneratedProcedure, Operand, Statement, ERRORS_IMPORT};

pub const HEADER: &str = "// File generated automatically by validator. DO NOT EDIT.";

pub struct Codegen {
    package: String,
    imports: BTreeSet<String>,
    methods: Vec<String>,
}

impl Codegen {
    pub fn new(package: impl Into<String>) -> Self {
        let mut imports = BTreeSet::new();
        imports.insert(ERRORS_IMPORT.to_string());
        Self { package: package.into(), imports, methods: Vec::new() }
    }

    pub fn emit(&mut self, procedure: &GeneratedProcedure) {
        self.imports.extend(procedure.imports.iter().cloned());

        let recv = receiver_name(&procedure.record);
        let mut out = String::new();
        out.push_str("// Validate implements Validator.\n");
        let _ = writeln!(out, "func ({recv} {}) Validate() error {{", procedure.record);
        for stmt in &procedure.body {
            match stmt {
                Statement::Check(check) => emit_check(&mut out, &recv, check),
                Statement::ReturnNoError => out.push_str("\treturn nil\n"),
            }
        }
        out.push_str("}\n");
        self.methods.push(out);
    }

    pub fn emit_all<'a, I>(&mut self, procedures: I)
    where
        I: IntoIterator<Item = &'a GeneratedProcedure>,
    {
        for p in procedures {
            self.emit(p);
        }
    }

    pub fn into_string(self) -> String {
        let mut out = String::new();
        out.push_str(HEADER);
        out.push_str("\n\n");
        let _ = writeln!(out, "package {}", self.package);
        out.push('\n');

        if self.imports.len() == 1 {
            for imp in &self.imports {
                let _ = writeln!(out, "import {}", go_quote(imp));
            }
        } else {
            out.push_str("import (\n");
            for imp in &self.imports {
                let _ = writeln!(out, "\t{}", go_quote(imp));
            }
            out.push_str(")\n");
        }

        for method in &self.methods {
            out.push('\n');
            out.push_str(method);
        }
        out
    }
}

fn emit_check(out: &mut String, recv: &str, check: &Check) {
    let cond = &check.condition;
    match (&cond.lhs, &cond.rhs) {
        // widened comparisons bind both sides first
        (Operand::Widened(a), Operand::Widened(b)) => {
            let _ = writeln!(
                out,
                "\tif val, than := float64({recv}.{a}), float64({recv}.{b}); val {} than {{",
                cond.op.symbol()
            );
        }
        (lhs, rhs) => {
            let _ = writeln!(
                out,
                "\tif {} {} {} {{",
                operand(recv, lhs),
                cond.op.symbol(),
                operand(recv, rhs)
            );
        }
    }
    let _ = writeln!(out, "\t\treturn errors.New({})", go_quote(&check.message.to_string()));
    out.push_str("\t}\n");
}

fn operand(recv: &str, op: &Operand) -> String {
    match op {
        Operand::Field(name) => format!("{recv}.{name}"),
        Operand::Length(name) => format!("len({recv}.{name})"),
        Operand::Widened(name) => format!("float64({recv}.{name})"),
        Operand::Number(n) if n.0.fract() == 0.0 && n.0.abs() < 1e15 => format!("{}", n.0 as i64),
        Operand::Number(n) => format!("{}", n.0),
        Operand::Nil => "nil".to_string(),
    }
}

pub fn receiver_name(record: &str) -> String {
    record.chars().next().map(|c| c.to_lowercase().collect()).unwrap_or_else(|| "v".to_string())
}

/// Interpreted Go string literal.
pub fn go_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
