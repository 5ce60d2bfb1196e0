//! Metric formula engine: a closed arithmetic AST over named quality
//! placeholders, parsed from the configured formula strings and evaluated
//! numerically. Formula text is data, never executed as code.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::ScoringError;

/// Placeholder tokens in formula strings are this prefix followed by a
/// quality token, e.g. `lambda_TP`.
pub const PLACEHOLDER_PREFIX: &str = "lambda_";

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    /// Quality token as written after the placeholder prefix.
    Placeholder(String),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Expr {
    /// Distinct placeholder tokens referenced by the expression. This is the
    /// metric's required-quality set before family-scoped resolution.
    pub fn placeholder_set(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_placeholders(&mut out);
        out
    }

    fn collect_placeholders(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Number(_) => {}
            Expr::Placeholder(token) => {
                out.insert(token.clone());
            }
            Expr::Neg(operand) => operand.collect_placeholders(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_placeholders(out);
                rhs.collect_placeholders(out);
            }
        }
    }
}

/// Evaluate with standard precedence. A placeholder missing from `bindings`
/// takes `default_value` (the refill rule); a zero denominator anywhere in
/// the expression makes the whole evaluation collapse to `default_value`.
/// Those are the only two recoveries - anything malformed fails earlier, in
/// [`parse`].
pub fn evaluate(expr: &Expr, bindings: &BTreeMap<String, f64>, default_value: f64) -> f64 {
    match eval_inner(expr, bindings, default_value) {
        Ok(value) => value,
        Err(DivisionByZero) => default_value,
    }
}

struct DivisionByZero;

fn eval_inner(
    expr: &Expr,
    bindings: &BTreeMap<String, f64>,
    default_value: f64,
) -> Result<f64, DivisionByZero> {
    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Placeholder(token) => Ok(bindings.get(token).copied().unwrap_or(default_value)),
        Expr::Neg(operand) => Ok(-eval_inner(operand, bindings, default_value)?),
        Expr::Binary { op, lhs, rhs } => {
            let lhs = eval_inner(lhs, bindings, default_value)?;
            let rhs = eval_inner(rhs, bindings, default_value)?;
            match op {
                BinaryOp::Add => Ok(lhs + rhs),
                BinaryOp::Sub => Ok(lhs - rhs),
                BinaryOp::Mul => Ok(lhs * rhs),
                BinaryOp::Div => {
                    if rhs == 0.0 {
                        Err(DivisionByZero)
                    } else {
                        Ok(lhs / rhs)
                    }
                }
                BinaryOp::Pow => Ok(lhs.powf(rhs)),
            }
        }
    }
}

pub fn parse(formula: &str) -> Result<Expr, ScoringError> {
    let tokens = lex(formula)?;
    let mut parser = Parser {
        formula,
        tokens,
        pos: 0,
    };
    let expr = parser.expression()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(ScoringError::malformed_formula(
            formula,
            token.offset,
            "unexpected trailing input",
        )),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    LParen,
    RParen,
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

fn lex(formula: &str) -> Result<Vec<Token>, ScoringError> {
    let bytes = formula.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' => {
                i += 1;
            }
            '+' => {
                tokens.push(Token { kind: TokenKind::Plus, offset: i });
                i += 1;
            }
            '-' => {
                tokens.push(Token { kind: TokenKind::Minus, offset: i });
                i += 1;
            }
            '/' => {
                tokens.push(Token { kind: TokenKind::Slash, offset: i });
                i += 1;
            }
            '(' => {
                tokens.push(Token { kind: TokenKind::LParen, offset: i });
                i += 1;
            }
            ')' => {
                tokens.push(Token { kind: TokenKind::RParen, offset: i });
                i += 1;
            }
            '*' => {
                if bytes.get(i + 1) == Some(&b'*') {
                    tokens.push(Token { kind: TokenKind::StarStar, offset: i });
                    i += 2;
                } else {
                    tokens.push(Token { kind: TokenKind::Star, offset: i });
                    i += 1;
                }
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                let text = &formula[start..i];
                let value = text.parse::<f64>().map_err(|_| {
                    ScoringError::malformed_formula(
                        formula,
                        start,
                        format!("invalid numeric literal '{text}'"),
                    )
                })?;
                tokens.push(Token { kind: TokenKind::Number(value), offset: start });
            }
            _ if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < bytes.len()
                    && ((bytes[i] as char).is_ascii_alphanumeric() || bytes[i] == b'_')
                {
                    i += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Ident(formula[start..i].to_string()),
                    offset: start,
                });
            }
            _ => {
                return Err(ScoringError::malformed_formula(
                    formula,
                    i,
                    format!("unexpected character '{c}'"),
                ));
            }
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    formula: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().map(|t| &t.kind) == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expression(&mut self) -> Result<Expr, ScoringError> {
        let mut lhs = self.term()?;
        loop {
            let op = if self.eat(&TokenKind::Plus) {
                BinaryOp::Add
            } else if self.eat(&TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                return Ok(lhs);
            };
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn term(&mut self) -> Result<Expr, ScoringError> {
        let mut lhs = self.factor()?;
        loop {
            let op = if self.eat(&TokenKind::Star) {
                BinaryOp::Mul
            } else if self.eat(&TokenKind::Slash) {
                BinaryOp::Div
            } else {
                return Ok(lhs);
            };
            let rhs = self.factor()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    /// `**` binds tighter than unary minus and associates to the right, so
    /// `-x**2` is `-(x**2)` and `2**3**2` is `2**(3**2)`.
    fn factor(&mut self) -> Result<Expr, ScoringError> {
        if self.eat(&TokenKind::Minus) {
            let operand = self.factor()?;
            return Ok(Expr::Neg(Box::new(operand)));
        }
        let base = self.atom()?;
        if self.eat(&TokenKind::StarStar) {
            let exponent = self.factor()?;
            return Ok(Expr::Binary {
                op: BinaryOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, ScoringError> {
        let Some(token) = self.advance() else {
            return Err(ScoringError::malformed_formula(
                self.formula,
                self.formula.len(),
                "unexpected end of formula",
            ));
        };
        match token.kind {
            TokenKind::Number(value) => Ok(Expr::Number(value)),
            TokenKind::Ident(name) => match name.strip_prefix(PLACEHOLDER_PREFIX) {
                Some(quality) if !quality.is_empty() => {
                    Ok(Expr::Placeholder(quality.to_string()))
                }
                _ => Err(ScoringError::malformed_formula(
                    self.formula,
                    token.offset,
                    format!("identifier '{name}' is not a '{PLACEHOLDER_PREFIX}' placeholder"),
                )),
            },
            TokenKind::LParen => {
                let inner = self.expression()?;
                if self.eat(&TokenKind::RParen) {
                    Ok(inner)
                } else {
                    Err(ScoringError::malformed_formula(
                        self.formula,
                        token.offset,
                        "unbalanced parenthesis",
                    ))
                }
            }
            _ => Err(ScoringError::malformed_formula(
                self.formula,
                token.offset,
                "expected a number, placeholder or parenthesized expression",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries
            .iter()
            .map(|(token, value)| (token.to_string(), *value))
            .collect()
    }

    fn eval_str(formula: &str, entries: &[(&str, f64)], default_value: f64) -> f64 {
        let expr = parse(formula).expect("formula should parse");
        evaluate(&expr, &bindings(entries), default_value)
    }

    #[test]
    fn precedence_and_parentheses() {
        assert_eq!(eval_str("1 + 2 * 3", &[], 0.0), 7.0);
        assert_eq!(eval_str("(1 + 2) * 3", &[], 0.0), 9.0);
        assert_eq!(eval_str("8 / 2 / 2", &[], 0.0), 2.0);
    }

    #[test]
    fn power_is_right_associative_and_tighter_than_neg() {
        assert_eq!(eval_str("2 ** 3 ** 2", &[], 0.0), 512.0);
        assert_eq!(eval_str("-2 ** 2", &[], 0.0), -4.0);
        assert_eq!(eval_str("4 ** 0.5", &[], 0.0), 2.0);
    }

    #[test]
    fn bound_placeholders_substitute() {
        let value = eval_str(
            "(lambda_TP + lambda_TN)/2",
            &[("TP", 1.0), ("TN", 1.0)],
            0.0,
        );
        assert!((value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unbound_placeholder_takes_default() {
        let value = eval_str("(lambda_TP + lambda_TN)/2", &[("TP", 1.0)], 0.0);
        assert!((value - 0.5).abs() < 1e-12);
    }

    #[test]
    fn division_by_zero_collapses_to_default() {
        assert_eq!(eval_str("1 / (lambda_TP - lambda_TP)", &[("TP", 0.7)], -1.0), -1.0);
        assert_eq!(eval_str("1 / 0", &[], 0.25), 0.25);
    }

    #[test]
    fn mcc_with_degenerate_inputs_hits_the_fallback() {
        let formula =
            "0.5 * (((lambda_TP+lambda_TN-1)/(((lambda_TP+1-lambda_TN)*(lambda_TN+1-lambda_TP))**0.5)) + 1)";
        let value = eval_str(formula, &[("TP", 1.0)], 0.0);
        assert_eq!(value, 0.0);
    }

    #[test]
    fn placeholder_set_is_distinct_and_sorted() {
        let expr = parse("lambda_TP + lambda_TN * lambda_TP").expect("parse");
        let set: Vec<String> = expr.placeholder_set().into_iter().collect();
        assert_eq!(set, ["TN".to_string(), "TP".to_string()]);
    }

    #[test]
    fn rejects_identifier_without_prefix() {
        let err = parse("foo + 1").unwrap_err();
        assert!(matches!(err, ScoringError::MalformedFormula { offset: 0, .. }));
    }

    #[test]
    fn rejects_bare_prefix() {
        assert!(parse("lambda_").is_err());
    }

    #[test]
    fn rejects_unbalanced_parenthesis() {
        assert!(parse("(1 + 2").is_err());
    }

    #[test]
    fn rejects_trailing_input() {
        assert!(parse("1 + 2 )").is_err());
    }

    #[test]
    fn rejects_unexpected_character() {
        assert!(parse("1 % 2").is_err());
    }

    #[test]
    fn rejects_bad_numeric_literal() {
        assert!(parse("1.2.3").is_err());
    }
}
