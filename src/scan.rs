//! Find struct declarations in Go source.
//!
//! Handles `type X struct {...}`, grouped `type ( ... )` blocks, generic type
//! parameters and local types inside function bodies. Each struct body becomes
//! one [`TypeDecl`]; anonymous structs nested in a field's type stay part of
//! that field's type text.
pub mod lexer;

use crate::decl::{FieldDecl, TypeDecl};
use crate::diagnostics::Diagnostics;
use crate::error::ScanError;
use lexer::{tokenize, Tok, Token};

pub fn scan_go(src: &str, log: &dyn Diagnostics) -> Result<Vec<TypeDecl>, ScanError> {
    let toks = tokenize(src)?;
    let mut scanner = Scanner { toks, pos: 0, log, out: Vec::new() };
    scanner.run()?;
    Ok(scanner.out)
}

struct Scanner<'d> {
    toks: Vec<Token>,
    pos: usize,
    log: &'d dyn Diagnostics,
    out: Vec<TypeDecl>,
}

impl Scanner<'_> {
    fn peek(&self) -> Option<&Token> {
        self.toks.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.toks.get(self.pos + offset)
    }

    fn line(&self) -> usize {
        self.peek()
            .or_else(|| self.toks.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    fn fail(&self, message: impl Into<String>) -> ScanError {
        ScanError { line: self.line(), message: message.into() }
    }

    fn run(&mut self) -> Result<(), ScanError> {
        while let Some(tok) = self.peek() {
            if !tok.is_ident("type") {
                self.pos += 1;
                continue;
            }
            // `x.(type)` in a type switch is not a declaration
            match self.peek_at(1).map(|t| &t.tok) {
                Some(Tok::Ident(_)) => {
                    self.pos += 1;
                    self.type_spec()?;
                }
                Some(Tok::Punct('(')) => {
                    self.pos += 2;
                    self.type_group()?;
                }
                _ => self.pos += 1,
            }
        }
        Ok(())
    }

    fn type_group(&mut self) -> Result<(), ScanError> {
        loop {
            let Some(tok) = self.peek() else {
                return Err(self.fail("unterminated type group"));
            };
            match &tok.tok {
                Tok::Newline | Tok::Punct(';') => self.pos += 1,
                Tok::Punct(')') => {
                    self.pos += 1;
                    return Ok(());
                }
                Tok::Ident(_) => self.type_spec()?,
                _ => return Err(self.fail("expected a type name")),
            }
        }
    }

    /// At the type name.
    fn type_spec(&mut self) -> Result<(), ScanError> {
        let Some(name) = self.peek().and_then(Token::ident).map(str::to_string) else {
            return Err(self.fail("expected a type name"));
        };
        self.pos += 1;

        if self.at_type_params() {
            self.skip_balanced()?;
        }
        if self.peek().is_some_and(|t| t.is_punct('=')) {
            self.pos += 1;
        }

        let is_struct = self.peek().is_some_and(|t| t.is_ident("struct"))
            && self.peek_at(1).is_some_and(|t| t.is_punct('{'));
        if !is_struct {
            self.log.debug("not a struct, skipping", &[("type", &name)]);
            self.skip_type_expr()?;
            return Ok(());
        }

        self.pos += 2;
        self.log.debug("current type", &[("type", &name)]);
        let fields = self.struct_body(&name)?;
        self.out.push(TypeDecl { name, fields });
        Ok(())
    }

    /// `[T any]` and `[K comparable, V any]`, as opposed to `[N]T` or `[]T`.
    fn at_type_params(&self) -> bool {
        if !self.peek().is_some_and(|t| t.is_punct('[')) {
            return false;
        }
        let first_is_ident = matches!(self.peek_at(1).map(|t| &t.tok), Some(Tok::Ident(_)));
        let second = self.peek_at(2).map(|t| &t.tok);
        first_is_ident
            && matches!(second, Some(Tok::Ident(_) | Tok::Punct(',' | '~' | '[')))
    }

    /// At an opening bracket; moves past its closing partner.
    fn skip_balanced(&mut self) -> Result<(), ScanError> {
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            match tok.tok {
                Tok::Punct('(' | '[' | '{') => depth += 1,
                Tok::Punct(')' | ']' | '}') => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.pos += 1;
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        Err(self.fail("unbalanced brackets"))
    }

    /// Skips a non-struct type up to the end of its line or group.
    fn skip_type_expr(&mut self) -> Result<(), ScanError> {
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            match tok.tok {
                Tok::Newline | Tok::Punct(';') if depth == 0 => return Ok(()),
                Tok::Punct(')') if depth == 0 => return Ok(()),
                Tok::Punct('(' | '[' | '{') => depth += 1,
                Tok::Punct(')' | ']' | '}') => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.pos += 1;
        }
        if depth == 0 { Ok(()) } else { Err(self.fail("unbalanced brackets")) }
    }

    /// Just past the opening brace; consumes the closing one.
    fn struct_body(&mut self, type_name: &str) -> Result<Vec<FieldDecl>, ScanError> {
        let mut fields = Vec::new();
        loop {
            let Some(tok) = self.peek() else {
                return Err(self.fail(format!("unterminated struct {type_name}")));
            };
            match tok.tok {
                Tok::Newline | Tok::Punct(';') => self.pos += 1,
                Tok::Punct('}') => {
                    self.pos += 1;
                    return Ok(fields);
                }
                _ => {
                    let line = self.field_line()?;
                    fields.extend(self.field_decls(type_name, &line)?);
                }
            }
        }
    }

    /// Tokens of one field declaration, stopping before the terminator.
    fn field_line(&mut self) -> Result<Vec<Token>, ScanError> {
        let mut depth = 0usize;
        let mut line = Vec::new();
        while let Some(tok) = self.peek() {
            match tok.tok {
                Tok::Newline | Tok::Punct(';') | Tok::Punct('}') if depth == 0 => break,
                Tok::Punct('(' | '[' | '{') => depth += 1,
                Tok::Punct(')' | ']' | '}') => depth = depth.saturating_sub(1),
                _ => {}
            }
            line.push(tok.clone());
            self.pos += 1;
        }
        if depth != 0 {
            return Err(self.fail("unbalanced brackets in field"));
        }
        Ok(line)
    }

    fn field_decls(&self, type_name: &str, line: &[Token]) -> Result<Vec<FieldDecl>, ScanError> {
        let (rest, tag) = match line.split_last() {
            Some((last, rest)) => match &last.tok {
                Tok::RawString(s) | Tok::String(s) => (rest, Some(s.clone())),
                _ => (line, None),
            },
            None => return Ok(Vec::new()),
        };
        let line_no = line[0].line;

        let mut names = Vec::new();
        let mut i = 0;
        let named = match (rest.first().map(|t| &t.tok), rest.get(1).map(|t| &t.tok)) {
            (Some(Tok::Ident(_)), Some(Tok::Punct(','))) => true,
            (Some(Tok::Ident(_)), Some(Tok::Punct('.'))) => false,
            (Some(Tok::Ident(_)), Some(_)) => true,
            _ => false,
        };
        if !named {
            self.log.debug("embedded field, skipping", &[("type", &type_name), ("line", &line_no)]);
            return Ok(Vec::new());
        }

        while let Some(name) = rest.get(i).and_then(Token::ident) {
            names.push(name.to_string());
            i += 1;
            if rest.get(i).is_some_and(|t| t.is_punct(',')) {
                i += 1;
            } else {
                break;
            }
        }

        let ty = render_type(&rest[i..]);
        if ty.is_empty() {
            return Err(ScanError {
                line: line_no,
                message: format!("field {} of {type_name} has no type", names.join(", ")),
            });
        }

        Ok(names
            .into_iter()
            .map(|name| FieldDecl { name, ty: ty.clone(), tag: tag.clone() })
            .collect())
    }
}

fn wordy(tok: &Tok) -> bool {
    matches!(tok, Tok::Ident(_) | Tok::Literal(_))
}

/// Compact text of a type expression, e.g. `map[string]struct{}` or `func(a, b int) error`.
pub fn render_type(toks: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Tok> = None;
    let mut newline = false;

    for t in toks {
        if t.tok == Tok::Newline {
            newline = true;
            continue;
        }
        if let Some(p) = prev {
            let sep = if newline && *p != Tok::Punct('{') && t.tok != Tok::Punct('}') {
                "; "
            } else if (wordy(p) || *p == Tok::Punct(')') || *p == Tok::Punct(','))
                && (wordy(&t.tok) || matches!(t.tok, Tok::RawString(_) | Tok::String(_)))
            {
                " "
            } else {
                ""
            };
            out.push_str(sep);
        }
        newline = false;
        match &t.tok {
            Tok::Ident(s) | Tok::RawString(s) | Tok::String(s) | Tok::Literal(s) => out.push_str(s),
            Tok::Punct(c) => out.push(*c),
            Tok::Newline => {}
        }
        prev = Some(&t.tok);
    }
    out
}
