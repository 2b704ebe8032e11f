//! Cypher lexer. Tokenizes filter expressions.
//!
//! Only as much of Cypher as a WHERE predicate needs: identifiers, literals,
//! parameters and punctuation. Keywords are left as identifiers; callers
//! compare token text themselves.

use crate::{Error, Result};

/// A token from the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

/// Byte span in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare word: variable, keyword, function name, label or property key.
    Identifier,
    /// `` `quoted name` ``: text holds the unquoted name.
    EscapedIdentifier,
    /// `$name`: text holds the name without `$`.
    Parameter,
    /// Text holds the unescaped contents.
    StringLiteral,
    Number,

    Dot, Colon, Comma, LBrace, RBrace,

    /// Any other operator or bracket.
    Punct,
}

/// Tokenize a filter expression.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => { chars.next(); }

            // Block comments /* ... */
            '/' if matches!(chars.clone().nth(1), Some((_, '*'))) => {
                chars.next();
                chars.next();
                loop {
                    match chars.next() {
                        Some((_, '*')) if matches!(chars.peek(), Some(&(_, '/'))) => {
                            chars.next();
                            break;
                        }
                        Some(_) => {}
                        None => return Err(Error::Syntax {
                            position: pos,
                            message: "Unterminated block comment".into(),
                        }),
                    }
                }
            }

            // Line comments
            '/' if matches!(chars.clone().nth(1), Some((_, '/'))) => {
                while chars.peek().is_some_and(|&(_, c)| c != '\n') {
                    chars.next();
                }
            }

            '\'' | '"' => {
                let quote = ch;
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some((_, '\\')) => {
                            if let Some((_, escaped)) = chars.next() {
                                match escaped {
                                    'n' => s.push('\n'),
                                    't' => s.push('\t'),
                                    '\\' => s.push('\\'),
                                    c if c == quote => s.push(c),
                                    c => { s.push('\\'); s.push(c); }
                                }
                            }
                        }
                        Some((end, c)) if c == quote => {
                            tokens.push(Token {
                                kind: TokenKind::StringLiteral,
                                span: Span { start: pos, end: end + c.len_utf8() },
                                text: s,
                            });
                            break;
                        }
                        Some((_, c)) => s.push(c),
                        None => return Err(Error::Syntax {
                            position: pos,
                            message: "Unterminated string literal".into(),
                        }),
                    }
                }
            }

            '`' => {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((end, '`')) => {
                            tokens.push(Token {
                                kind: TokenKind::EscapedIdentifier,
                                span: Span { start: pos, end: end + 1 },
                                text: name,
                            });
                            break;
                        }
                        Some((_, c)) => name.push(c),
                        None => return Err(Error::Syntax {
                            position: pos,
                            message: "Unterminated escaped identifier".into(),
                        }),
                    }
                }
            }

            c if c.is_ascii_digit() => {
                let mut end = pos;
                let mut seen_dot = false;
                while let Some(&(i, c)) = chars.peek() {
                    let fraction = c == '.'
                        && !seen_dot
                        && matches!(chars.clone().nth(1), Some((_, d)) if d.is_ascii_digit());
                    if c.is_ascii_alphanumeric() || fraction {
                        seen_dot |= fraction;
                        end = i + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Number,
                    span: Span { start: pos, end },
                    text: input[pos..end].to_string(),
                });
            }

            '$' => {
                chars.next();
                let mut end = pos + 1;
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        end = i + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Parameter,
                    span: Span { start: pos, end },
                    text: input[pos + 1..end].to_string(),
                });
            }

            c if c.is_alphabetic() || c == '_' => {
                let mut end = pos;
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        end = i + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Identifier,
                    span: Span { start: pos, end },
                    text: input[pos..end].to_string(),
                });
            }

            '.' => { chars.next(); tokens.push(punct(TokenKind::Dot, pos, ".")); }
            ':' => { chars.next(); tokens.push(punct(TokenKind::Colon, pos, ":")); }
            ',' => { chars.next(); tokens.push(punct(TokenKind::Comma, pos, ",")); }
            '{' => { chars.next(); tokens.push(punct(TokenKind::LBrace, pos, "{")); }
            '}' => { chars.next(); tokens.push(punct(TokenKind::RBrace, pos, "}")); }

            other => {
                chars.next();
                let mut text = String::new();
                text.push(other);
                tokens.push(punct(TokenKind::Punct, pos, &text));
            }
        }
    }

    Ok(tokens)
}

fn punct(kind: TokenKind, pos: usize, text: &str) -> Token {
    Token {
        kind,
        span: Span { start: pos, end: pos + text.len() },
        text: text.to_string(),
    }
}
