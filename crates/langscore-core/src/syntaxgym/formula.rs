//! Prediction formulas over region surprisal totals.
//!
//! Grammar:
//! ```text
//! expr  := conj ('|' conj)*
//! conj  := cmp ('&' cmp)*
//! cmp   := sum (('<' | '>' | '=') sum)?
//! sum   := atom (('+' | '-') atom)*
//! atom  := '(' N ';' '%' cond '%' ')' | number | '(' expr ')' | '[' expr ']'
//! ```

use std::sync::OnceLock;

use regex::Regex;

use super::RegionTotals;
use crate::errors::FormulaError;

const EQ_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Region { region_number: u32, condition: String },
    Number(f64),
    Binary { op: Op, lhs: Box<Expr>, rhs: Box<Expr> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Lt,
    Gt,
    Eq,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Value {
    Num(f64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Region(u32, String),
    Number(f64),
    Op(Op),
    Open(char),
    Close(char),
}

fn region_ref() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\(\s*(\d+)\s*;\s*%([^%]+)%\s*\)").expect("static regex is valid")
    })
}

fn number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(\.\d+)?").expect("static regex is valid"))
}

fn tokenize(formula: &str) -> Result<Vec<Token>, FormulaError> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    while offset < formula.len() {
        let rest = &formula[offset..];
        let ch = match rest.chars().next() {
            Some(c) => c,
            None => break,
        };
        if ch.is_whitespace() {
            offset += ch.len_utf8();
            continue;
        }
        if let Some(caps) = region_ref().captures(rest) {
            let region_number = caps[1].parse::<u32>().map_err(|_| FormulaError::UnexpectedChar {
                formula: formula.to_string(),
                ch,
                offset,
            })?;
            tokens.push(Token::Region(region_number, caps[2].trim().to_string()));
            offset += caps[0].len();
            continue;
        }
        if let Some(m) = number().find(rest) {
            // find() on an anchored pattern only matches at offset 0
            let n = m.as_str().parse::<f64>().map_err(|_| FormulaError::UnexpectedChar {
                formula: formula.to_string(),
                ch,
                offset,
            })?;
            tokens.push(Token::Number(n));
            offset += m.end();
            continue;
        }
        let tok = match ch {
            '+' => Token::Op(Op::Add),
            '-' => Token::Op(Op::Sub),
            '<' => Token::Op(Op::Lt),
            '>' => Token::Op(Op::Gt),
            '=' => Token::Op(Op::Eq),
            '&' => Token::Op(Op::And),
            '|' => Token::Op(Op::Or),
            '(' | '[' => Token::Open(ch),
            ')' | ']' => Token::Close(ch),
            _ => {
                return Err(FormulaError::UnexpectedChar {
                    formula: formula.to_string(),
                    ch,
                    offset,
                })
            }
        };
        tokens.push(tok);
        offset += ch.len_utf8();
    }
    Ok(tokens)
}

struct Parser<'a> {
    formula: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<Token, FormulaError> {
        let tok = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| FormulaError::UnexpectedEnd(self.formula.to_string()))?;
        self.pos += 1;
        Ok(tok)
    }

    fn eat_op(&mut self, ops: &[Op]) -> Option<Op> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(op) => {
                let op = *op;
                self.pos += 1;
                Some(op)
            }
            _ => None,
        }
    }

    fn binary(
        &mut self,
        ops: &[Op],
        next: fn(&mut Self) -> Result<Expr, FormulaError>,
    ) -> Result<Expr, FormulaError> {
        let mut lhs = next(self)?;
        while let Some(op) = self.eat_op(ops) {
            let rhs = next(self)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn expr(&mut self) -> Result<Expr, FormulaError> {
        self.binary(&[Op::Or], Self::conj)
    }

    fn conj(&mut self) -> Result<Expr, FormulaError> {
        self.binary(&[Op::And], Self::cmp)
    }

    fn cmp(&mut self) -> Result<Expr, FormulaError> {
        let lhs = self.sum()?;
        match self.eat_op(&[Op::Lt, Op::Gt, Op::Eq]) {
            Some(op) => {
                let rhs = self.sum()?;
                Ok(Expr::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                })
            }
            None => Ok(lhs),
        }
    }

    fn sum(&mut self) -> Result<Expr, FormulaError> {
        self.binary(&[Op::Add, Op::Sub], Self::atom)
    }

    fn atom(&mut self) -> Result<Expr, FormulaError> {
        match self.next()? {
            Token::Region(region_number, condition) => Ok(Expr::Region {
                region_number,
                condition,
            }),
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Open(open) => {
                let inner = self.expr()?;
                let want = if open == '(' { ')' } else { ']' };
                match self.next()? {
                    Token::Close(c) if c == want => Ok(inner),
                    _ => Err(FormulaError::Type(format!(
                        "unbalanced '{}' in formula '{}'",
                        open, self.formula
                    ))),
                }
            }
            other => Err(FormulaError::Type(format!(
                "unexpected token {:?} in formula '{}'",
                other, self.formula
            ))),
        }
    }
}

pub fn parse(formula: &str) -> Result<Expr, FormulaError> {
    let tokens = tokenize(formula)?;
    let mut p = Parser {
        formula,
        tokens,
        pos: 0,
    };
    let expr = p.expr()?;
    if p.pos != p.tokens.len() {
        return Err(FormulaError::Trailing(formula.to_string()));
    }
    Ok(expr)
}

impl Expr {
    /// Evaluates a prediction; the top-level expression must be boolean.
    pub fn holds(&self, totals: &RegionTotals) -> Result<bool, FormulaError> {
        match self.eval(totals)? {
            Value::Bool(b) => Ok(b),
            Value::Num(_) => Err(FormulaError::Type(
                "prediction evaluates to a number, not a truth value".into(),
            )),
        }
    }

    fn eval(&self, totals: &RegionTotals) -> Result<Value, FormulaError> {
        match self {
            Expr::Number(n) => Ok(Value::Num(*n)),
            Expr::Region {
                region_number,
                condition,
            } => totals
                .get(&(condition.clone(), *region_number))
                .copied()
                .map(Value::Num)
                .ok_or_else(|| FormulaError::MissingRegion {
                    condition: condition.clone(),
                    region_number: *region_number,
                }),
            Expr::Binary { op, lhs, rhs } => {
                let l = lhs.eval(totals)?;
                let r = rhs.eval(totals)?;
                match (op, l, r) {
                    (Op::Add, Value::Num(a), Value::Num(b)) => Ok(Value::Num(a + b)),
                    (Op::Sub, Value::Num(a), Value::Num(b)) => Ok(Value::Num(a - b)),
                    (Op::Lt, Value::Num(a), Value::Num(b)) => Ok(Value::Bool(a < b)),
                    (Op::Gt, Value::Num(a), Value::Num(b)) => Ok(Value::Bool(a > b)),
                    (Op::Eq, Value::Num(a), Value::Num(b)) => {
                        Ok(Value::Bool((a - b).abs() < EQ_TOLERANCE))
                    }
                    (Op::And, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a && b)),
                    (Op::Or, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a || b)),
                    (op, l, r) => Err(FormulaError::Type(format!(
                        "operator {:?} cannot combine {:?} and {:?}",
                        op, l, r
                    ))),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(entries: &[(&str, u32, f64)]) -> RegionTotals {
        entries
            .iter()
            .map(|(c, r, v)| ((c.to_string(), *r), *v))
            .collect()
    }

    #[test]
    fn simple_comparison() {
        let e = parse("(6;%match%) < (6;%mismatch%)").unwrap();
        let t = totals(&[("match", 6, 2.0), ("mismatch", 6, 5.5)]);
        assert!(e.holds(&t).unwrap());
    }

    #[test]
    fn conjunction_of_grouped_comparisons() {
        let e = parse(
            "((5;%what_nogap%) >  (5;%that_nogap%)) & ((5;%what_gap%) < (5;%that_gap%))",
        )
        .unwrap();
        let t = totals(&[
            ("what_nogap", 5, 9.0),
            ("that_nogap", 5, 4.0),
            ("what_gap", 5, 1.0),
            ("that_gap", 5, 3.0),
        ]);
        assert!(e.holds(&t).unwrap());

        let t = totals(&[
            ("what_nogap", 5, 9.0),
            ("that_nogap", 5, 4.0),
            ("what_gap", 5, 7.0),
            ("that_gap", 5, 3.0),
        ]);
        assert!(!e.holds(&t).unwrap());
    }

    #[test]
    fn bracketed_sums() {
        let e = parse("[(3;%a%) + (4;%a%)] < [(3;%b%)+(4;%b%)] - 1").unwrap();
        let t = totals(&[("a", 3, 1.0), ("a", 4, 1.0), ("b", 3, 2.0), ("b", 4, 1.5)]);
        assert!(e.holds(&t).unwrap());
    }

    #[test]
    fn missing_region_is_reported() {
        let e = parse("(2;%x%) > (2;%y%)").unwrap();
        let err = e.holds(&totals(&[("x", 2, 1.0)])).unwrap_err();
        assert!(matches!(err, FormulaError::MissingRegion { region_number: 2, .. }));
    }

    #[test]
    fn malformed_formulas_fail_to_parse() {
        assert!(matches!(parse("(1;%a%) >"), Err(FormulaError::UnexpectedEnd(_))));
        assert!(matches!(parse("(1;%a%) ? 2"), Err(FormulaError::UnexpectedChar { ch: '?', .. })));
        assert!(matches!(parse("(1;%a%) > 2 3"), Err(FormulaError::Trailing(_))));
    }

    #[test]
    fn numeric_top_level_is_a_type_error() {
        let e = parse("(1;%a%) + 1").unwrap();
        assert!(matches!(e.holds(&totals(&[("a", 1, 0.0)])), Err(FormulaError::Type(_))));
    }
}
