//! Keyword condition evaluation.
//!
//! A condition is a flat sequence of keyword fragments, `AND`/`OR` operators
//! and parenthesized groups. It is folded strictly left to right:
//!
//! - the result starts as `false` and the running operator as `OR`;
//! - an operator token only replaces the running operator;
//! - a keyword or group is combined into the result with the running
//!   operator, which stays in effect until the next operator token.
//!
//! There is no precedence between `AND` and `OR`: `A OR B AND C` means
//! `(A OR B) AND C`. Existing condition sheets are written against this
//! behavior.

use crate::error::ConditionError;
use crate::models::Post;

/// Deepest group nesting accepted by [`Condition::parse`].
pub const MAX_GROUP_DEPTH: usize = 64;

/// Logical operator carried between tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    fn combine(self, current: bool, next: bool) -> bool {
        match self {
            Operator::And => current && next,
            Operator::Or => current || next,
        }
    }
}

/// A token of a parsed condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Keyword(String),
    Operator(Operator),
    Group(Condition),
}

/// A parsed condition expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    tokens: Vec<Token>,
}

impl Condition {
    /// Parse an expression. Blank expressions, unbalanced or empty
    /// parentheses and groups nested deeper than [`MAX_GROUP_DEPTH`] are
    /// rejected.
    pub fn parse(expression: &str) -> Result<Self, ConditionError> {
        let tokens = tokenize(expression, 0, 0)?;
        if tokens.is_empty() {
            return Err(ConditionError::Empty);
        }
        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Evaluate against a post with the running-operator fold.
    pub fn evaluate(&self, post: &Post) -> bool {
        let mut result = false;
        let mut operation = Operator::Or;

        for token in &self.tokens {
            match token {
                Token::Operator(op) => operation = *op,
                Token::Group(nested) => {
                    result = operation.combine(result, nested.evaluate(post));
                }
                Token::Keyword(keyword) => {
                    result = operation.combine(result, post.contains(keyword));
                }
            }
        }

        result
    }
}

/// Parse and evaluate `expression` against `post`.
pub fn evaluate(expression: &str, post: &Post) -> Result<bool, ConditionError> {
    Ok(Condition::parse(expression)?.evaluate(post))
}

/// Like [`evaluate`], but a malformed expression is logged and counts as no match.
pub fn matches(expression: &str, post: &Post) -> bool {
    evaluate(expression, post).unwrap_or_else(|e| {
        log::warn!("Skipping condition '{}': {}", expression, e);
        false
    })
}

/// Split `expr` into tokens. `offset` is the position of `expr` inside the
/// top-level expression and only feeds error positions; `depth` is the number
/// of groups enclosing it.
fn tokenize(expr: &str, offset: usize, depth: usize) -> Result<Vec<Token>, ConditionError> {
    let bytes = expr.as_bytes();
    let mut tokens = Vec::new();
    let mut fragment_start = 0;
    let mut i = 0;

    // Delimiters are ASCII, so every index used for slicing is a char boundary.
    while i < bytes.len() {
        match bytes[i] {
            b'(' => {
                push_keyword(&mut tokens, &expr[fragment_start..i]);
                if depth == MAX_GROUP_DEPTH {
                    return Err(ConditionError::TooDeep {
                        position: offset + i,
                    });
                }
                let close = find_close(bytes, i).ok_or(ConditionError::UnclosedGroup {
                    position: offset + i,
                })?;
                let inner = tokenize(&expr[i + 1..close], offset + i + 1, depth + 1)?;
                if inner.is_empty() {
                    return Err(ConditionError::EmptyGroup {
                        position: offset + i,
                    });
                }
                tokens.push(Token::Group(Condition { tokens: inner }));
                i = close + 1;
                fragment_start = i;
            }
            b')' => {
                return Err(ConditionError::UnexpectedClose {
                    position: offset + i,
                });
            }
            _ => {
                if let Some((op, len)) = operator_at(bytes, i) {
                    push_keyword(&mut tokens, &expr[fragment_start..i]);
                    tokens.push(Token::Operator(op));
                    i += len;
                    fragment_start = i;
                } else {
                    i += 1;
                }
            }
        }
    }
    push_keyword(&mut tokens, &expr[fragment_start..]);

    Ok(tokens)
}

fn push_keyword(tokens: &mut Vec<Token>, fragment: &str) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        tokens.push(Token::Keyword(fragment.to_string()));
    }
}

/// Index of the `)` closing the `(` at `open`.
fn find_close(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// `AND` / `OR` standing alone at `i`, with its byte length.
fn operator_at(bytes: &[u8], i: usize) -> Option<(Operator, usize)> {
    let (op, len) = if bytes[i..].starts_with(b"AND") {
        (Operator::And, 3)
    } else if bytes[i..].starts_with(b"OR") {
        (Operator::Or, 2)
    } else {
        return None;
    };

    let before_ok = i == 0 || is_delimiter(bytes[i - 1]);
    let after_ok = bytes.get(i + len).is_none_or(|b| is_delimiter(*b));
    (before_ok && after_ok).then_some((op, len))
}

fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'(' || b == b')'
}
