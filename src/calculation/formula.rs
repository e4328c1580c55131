//! Arithmetic formula evaluation for payroll variables.
//!
//! Formulas are small decimal expressions such as
//! `min(worked_hours / 7, 22) * 5.5`. The grammar is:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := '-' unary | primary
//! primary := NUMBER | IDENT | IDENT '(' expr ',' expr ')' | '(' expr ')'
//! ```
//!
//! Identifiers are resolved through a caller-supplied lookup. The only
//! functions are `min` and `max`, each taking two arguments. Evaluation uses
//! checked `Decimal` arithmetic, so overflow is an error rather than a panic,
//! and nesting deeper than [`MAX_NESTING_DEPTH`] is rejected before it can
//! exhaust the stack.

use rust_decimal::Decimal;
use thiserror::Error;

/// Deepest allowed nesting of parentheses, function calls and unary minus.
pub const MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind<'a> {
    Number(&'a str),
    Identifier(&'a str),
    Punct(char),
    Unknown(char),
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token<'a> {
    kind: TokenKind<'a>,
    offset: usize,
}

/// Errors raised while evaluating a formula.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// A character that is not part of the formula language.
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedCharacter {
        /// The offending character.
        ch: char,
        /// Byte offset in the expression.
        offset: usize,
    },

    /// A token appeared where the grammar does not allow it.
    #[error("expected {expected} at offset {offset}, found {found}")]
    UnexpectedToken {
        /// What the grammar allows here.
        expected: &'static str,
        /// The token actually found.
        found: String,
        /// Byte offset in the expression.
        offset: usize,
    },

    /// A numeric literal that is not a valid decimal.
    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber {
        /// The literal as written.
        text: String,
        /// Byte offset in the expression.
        offset: usize,
    },

    /// An identifier with no value in the evaluation context.
    #[error("unknown identifier '{name}' at offset {offset}")]
    UnknownIdentifier {
        /// The identifier as written.
        name: String,
        /// Byte offset in the expression.
        offset: usize,
    },

    /// A call to something other than `min` or `max`.
    #[error("unknown function '{name}' at offset {offset}")]
    UnknownFunction {
        /// The function name as written.
        name: String,
        /// Byte offset in the expression.
        offset: usize,
    },

    /// Division with a zero divisor.
    #[error("division by zero at offset {offset}")]
    DivisionByZero {
        /// Byte offset of the `/` operator.
        offset: usize,
    },

    /// An intermediate value exceeded the decimal range.
    #[error("arithmetic overflow at offset {offset}")]
    Overflow {
        /// Byte offset of the operator.
        offset: usize,
    },

    /// The expression nests deeper than [`MAX_NESTING_DEPTH`].
    #[error("formula nests deeper than {} levels at offset {offset}", MAX_NESTING_DEPTH)]
    TooDeep {
        /// Byte offset where the limit was exceeded.
        offset: usize,
    },
}

struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    idx: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            idx: 0,
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token<'a>>, FormulaError> {
        let mut out = Vec::new();
        loop {
            let token = self.next_token();
            match token.kind {
                TokenKind::Unknown(ch) => {
                    return Err(FormulaError::UnexpectedCharacter {
                        ch,
                        offset: token.offset,
                    });
                }
                TokenKind::Eof => {
                    out.push(token);
                    break;
                }
                _ => out.push(token),
            }
        }
        Ok(out)
    }

    fn next_token(&mut self) -> Token<'a> {
        self.skip_whitespace();
        let start = self.idx;
        let Some(&b) = self.bytes.get(self.idx) else {
            return Token {
                kind: TokenKind::Eof,
                offset: start,
            };
        };

        if b.is_ascii_digit() || b == b'.' {
            return self.lex_number(start);
        }
        if b.is_ascii_alphabetic() || b == b'_' {
            return self.lex_identifier(start);
        }

        let ch = self.input[start..].chars().next().unwrap_or('\0');
        self.idx += ch.len_utf8();
        let kind = match ch {
            '+' | '-' | '*' | '/' | '(' | ')' | ',' => TokenKind::Punct(ch),
            other => TokenKind::Unknown(other),
        };
        Token {
            kind,
            offset: start,
        }
    }

    fn lex_number(&mut self, start: usize) -> Token<'a> {
        while let Some(&b) = self.bytes.get(self.idx) {
            if !b.is_ascii_digit() && b != b'.' {
                break;
            }
            self.idx += 1;
        }
        Token {
            kind: TokenKind::Number(&self.input[start..self.idx]),
            offset: start,
        }
    }

    fn lex_identifier(&mut self, start: usize) -> Token<'a> {
        while let Some(&b) = self.bytes.get(self.idx) {
            if !b.is_ascii_alphanumeric() && b != b'_' {
                break;
            }
            self.idx += 1;
        }
        Token {
            kind: TokenKind::Identifier(&self.input[start..self.idx]),
            offset: start,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&b) = self.bytes.get(self.idx) {
            if !b.is_ascii_whitespace() {
                break;
            }
            self.idx += 1;
        }
    }
}

struct Evaluator<'a, F> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    depth: usize,
    // parse only: identifiers are accepted unresolved and no arithmetic runs
    checking: bool,
    resolve: F,
}

impl<'a, F> Evaluator<'a, F>
where
    F: Fn(&str) -> Option<Decimal>,
{
    fn peek(&self) -> Token<'a> {
        // tokenize always ends with Eof, and the cursor never moves past it
        self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn bump(&mut self) -> Token<'a> {
        let token = self.peek();
        if !matches!(token.kind, TokenKind::Eof) {
            self.pos += 1;
        }
        token
    }

    fn expect_punct(&mut self, ch: char, expected: &'static str) -> Result<(), FormulaError> {
        let token = self.bump();
        if token.kind == TokenKind::Punct(ch) {
            Ok(())
        } else {
            Err(unexpected(expected, token))
        }
    }

    fn expr(&mut self) -> Result<Decimal, FormulaError> {
        let mut value = self.term()?;
        loop {
            let token = self.peek();
            let op = match token.kind {
                TokenKind::Punct(c @ ('+' | '-')) => c,
                _ => return Ok(value),
            };
            self.bump();
            let rhs = self.term()?;
            if self.checking {
                continue;
            }
            let offset = token.offset;
            value = if op == '+' {
                value.checked_add(rhs)
            } else {
                value.checked_sub(rhs)
            }
            .ok_or(FormulaError::Overflow { offset })?;
        }
    }

    fn term(&mut self) -> Result<Decimal, FormulaError> {
        let mut value = self.unary()?;
        loop {
            let token = self.peek();
            let op = match token.kind {
                TokenKind::Punct(c @ ('*' | '/')) => c,
                _ => return Ok(value),
            };
            self.bump();
            let rhs = self.unary()?;
            if self.checking {
                continue;
            }
            let offset = token.offset;
            value = if op == '*' {
                value
                    .checked_mul(rhs)
                    .ok_or(FormulaError::Overflow { offset })?
            } else {
                if rhs.is_zero() {
                    return Err(FormulaError::DivisionByZero { offset });
                }
                value
                    .checked_div(rhs)
                    .ok_or(FormulaError::Overflow { offset })?
            };
        }
    }

    fn unary(&mut self) -> Result<Decimal, FormulaError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(FormulaError::TooDeep {
                offset: self.peek().offset,
            });
        }
        self.depth += 1;
        let value = if self.peek().kind == TokenKind::Punct('-') {
            self.bump();
            self.unary().map(|v| -v)
        } else {
            self.primary()
        };
        self.depth -= 1;
        value
    }

    fn primary(&mut self) -> Result<Decimal, FormulaError> {
        let token = self.bump();
        match token.kind {
            TokenKind::Number(text) => {
                text.parse::<Decimal>()
                    .map_err(|_| FormulaError::InvalidNumber {
                        text: text.to_string(),
                        offset: token.offset,
                    })
            }
            TokenKind::Identifier(name) if self.peek().kind == TokenKind::Punct('(') => {
                self.call(name, token.offset)
            }
            TokenKind::Identifier(_) if self.checking => Ok(Decimal::ZERO),
            TokenKind::Identifier(name) => {
                (self.resolve)(name).ok_or_else(|| FormulaError::UnknownIdentifier {
                    name: name.to_string(),
                    offset: token.offset,
                })
            }
            TokenKind::Punct('(') => {
                let value = self.expr()?;
                self.expect_punct(')', "')'")?;
                Ok(value)
            }
            _ => Err(unexpected("a number, identifier or '('", token)),
        }
    }

    fn call(&mut self, name: &str, offset: usize) -> Result<Decimal, FormulaError> {
        let pick: fn(Decimal, Decimal) -> Decimal = match name {
            "min" => Decimal::min,
            "max" => Decimal::max,
            _ => {
                return Err(FormulaError::UnknownFunction {
                    name: name.to_string(),
                    offset,
                });
            }
        };

        self.expect_punct('(', "'('")?;
        let a = self.expr()?;
        self.expect_punct(',', "','")?;
        let b = self.expr()?;
        self.expect_punct(')', "')'")?;
        Ok(pick(a, b))
    }
}

fn unexpected(expected: &'static str, token: Token<'_>) -> FormulaError {
    let found = match token.kind {
        TokenKind::Number(text) | TokenKind::Identifier(text) => format!("'{}'", text),
        TokenKind::Punct(c) | TokenKind::Unknown(c) => format!("'{}'", c),
        TokenKind::Eof => "end of formula".to_string(),
    };
    FormulaError::UnexpectedToken {
        expected,
        found,
        offset: token.offset,
    }
}

/// Evaluates `expression`, resolving identifiers through `resolve`.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::evaluate_formula;
/// use rust_decimal::Decimal;
///
/// let value = evaluate_formula("min(worked_hours / 7, 22) * 5.5", |name| {
///     (name == "worked_hours").then(|| Decimal::from(140))
/// })
/// .unwrap();
/// assert_eq!(value, Decimal::from(110));
/// ```
pub fn evaluate_formula<F>(expression: &str, resolve: F) -> Result<Decimal, FormulaError>
where
    F: Fn(&str) -> Option<Decimal>,
{
    run(expression, false, resolve)
}

/// Parses `expression` without evaluating it.
///
/// Reports syntax errors, invalid numbers, unknown functions and excessive
/// nesting. Identifiers are not resolved and no arithmetic is performed, so
/// unknown identifiers, division by zero and overflow only surface when the
/// formula is evaluated for an employee.
pub fn check_formula(expression: &str) -> Result<(), FormulaError> {
    run(expression, true, |_| None).map(|_| ())
}

fn run<F>(expression: &str, checking: bool, resolve: F) -> Result<Decimal, FormulaError>
where
    F: Fn(&str) -> Option<Decimal>,
{
    let tokens = Lexer::new(expression).tokenize()?;
    let mut evaluator = Evaluator {
        tokens,
        pos: 0,
        depth: 0,
        checking,
        resolve,
    };

    let value = evaluator.expr()?;
    let trailing = evaluator.bump();
    if !matches!(trailing.kind, TokenKind::Eof) {
        return Err(unexpected("an operator or end of formula", trailing));
    }
    Ok(value)
}
