//! Just enough of a Go tokenizer to find struct declarations.
use crate::error::ScanError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tok {
    Ident(String),
    /// Literal text, backquotes included.
    RawString(String),
    /// Literal text, double quotes included.
    String(String),
    /// Numbers and rune literals.
    Literal(String),
    Punct(char),
    Newline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub tok: Tok,
    pub line: usize,
}

impl Token {
    pub fn is_punct(&self, c: char) -> bool {
        self.tok == Tok::Punct(c)
    }

    pub fn is_ident(&self, name: &str) -> bool {
        matches!(&self.tok, Tok::Ident(s) if s == name)
    }

    pub fn ident(&self) -> Option<&str> {
        match &self.tok {
            Tok::Ident(s) => Some(s),
            _ => None,
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

pub fn tokenize(src: &str) -> Result<Vec<Token>, ScanError> {
    let chars: Vec<char> = src.chars().collect();
    let mut toks = Vec::new();
    let mut line = 1;
    let mut i = 0;

    let err = |line: usize, message: &str| ScanError { line, message: message.to_string() };

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => {
                toks.push(Token { tok: Tok::Newline, line });
                line += 1;
                i += 1;
            }
            c if c.is_whitespace() => i += 1,
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                let start = line;
                let mut saw_newline = false;
                i += 2;
                loop {
                    match chars.get(i) {
                        None => return Err(err(start, "unterminated block comment")),
                        Some('*') if chars.get(i + 1) == Some(&'/') => {
                            i += 2;
                            break;
                        }
                        Some('\n') => {
                            saw_newline = true;
                            line += 1;
                            i += 1;
                        }
                        Some(_) => i += 1,
                    }
                }
                // a comment spanning lines separates like a newline
                if saw_newline {
                    toks.push(Token { tok: Tok::Newline, line });
                }
            }
            '`' => {
                let start = line;
                let mut text = String::from('`');
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(err(start, "unterminated raw string")),
                        Some('`') => {
                            text.push('`');
                            i += 1;
                            break;
                        }
                        Some(&c) => {
                            if c == '\n' {
                                line += 1;
                            }
                            text.push(c);
                            i += 1;
                        }
                    }
                }
                toks.push(Token { tok: Tok::RawString(text), line: start });
            }
            '"' | '\'' => {
                let quote = c;
                let mut text = String::from(quote);
                i += 1;
                loop {
                    match chars.get(i) {
                        None | Some('\n') => return Err(err(line, "unterminated string literal")),
                        Some('\\') => {
                            text.push('\\');
                            if let Some(&next) = chars.get(i + 1) {
                                text.push(next);
                            }
                            i += 2;
                        }
                        Some(&c) if c == quote => {
                            text.push(quote);
                            i += 1;
                            break;
                        }
                        Some(&c) => {
                            text.push(c);
                            i += 1;
                        }
                    }
                }
                let tok = if quote == '"' { Tok::String(text) } else { Tok::Literal(text) };
                toks.push(Token { tok, line });
            }
            c if is_ident_start(c) => {
                let start = i;
                while i < chars.len() && is_ident_continue(chars[i]) {
                    i += 1;
                }
                toks.push(Token { tok: Tok::Ident(chars[start..i].iter().collect()), line });
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '.' || chars[i] == '_') {
                    i += 1;
                }
                toks.push(Token { tok: Tok::Literal(chars[start..i].iter().collect()), line });
            }
            c => {
                toks.push(Token { tok: Tok::Punct(c), line });
                i += 1;
            }
        }
    }

    Ok(toks)
}
