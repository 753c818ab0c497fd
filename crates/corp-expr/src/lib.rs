#![deny(warnings)]

//! Constrained arithmetic expression language for player trading rules.
//!
//! Desired sell amounts, sell prices, and export amounts are player-supplied
//! strings such as `"MAX/2"`, `"MP+5"`, or `"(EINV-IINV)/2"`. This crate
//! parses them into a small tagged AST and evaluates the AST against a
//! per-invocation symbol table. The grammar is arithmetic only: numeric
//! literals, named placeholders, `+ - * / %`, unary minus, and parentheses.
//! There is no function call syntax and no other evaluation surface.
//!
//! Arithmetic follows IEEE-754: dividing by zero yields an infinity rather
//! than an error, so a formula that degenerates produces a non-finite value
//! the caller is expected to reject.

use thiserror::Error;

/// Named placeholders that may appear in player formulas.
///
/// Which placeholders are bound depends on the evaluation context:
/// sell-amount formulas see `MAX`/`PROD`/`INV`, sell-price formulas see
/// `MP`, and export-amount formulas see `MAX`/`EPROD`/`IPROD`/`EINV`/`IINV`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placeholder {
    /// Maximum sellable (or exportable) rate, per second.
    Max,
    /// Production rate of the item being sold, per second.
    Prod,
    /// Current inventory of the item being sold.
    Inv,
    /// Current market price.
    Mp,
    /// Exporter-side production rate, per second.
    EProd,
    /// Importer-side production rate, per second.
    IProd,
    /// Exporter-side inventory.
    EInv,
    /// Importer-side inventory.
    IInv,
}

impl Placeholder {
    /// The literal spelling recognized by the lexer.
    pub fn name(self) -> &'static str {
        match self {
            Placeholder::Max => "MAX",
            Placeholder::Prod => "PROD",
            Placeholder::Inv => "INV",
            Placeholder::Mp => "MP",
            Placeholder::EProd => "EPROD",
            Placeholder::IProd => "IPROD",
            Placeholder::EInv => "EINV",
            Placeholder::IInv => "IINV",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "MAX" => Some(Placeholder::Max),
            "PROD" => Some(Placeholder::Prod),
            "INV" => Some(Placeholder::Inv),
            "MP" => Some(Placeholder::Mp),
            "EPROD" => Some(Placeholder::EProd),
            "IPROD" => Some(Placeholder::IProd),
            "EINV" => Some(Placeholder::EInv),
            "IINV" => Some(Placeholder::IInv),
            _ => None,
        }
    }
}

/// Errors from parsing or evaluating a formula.
#[derive(Debug, Error, PartialEq)]
pub enum ExprError {
    /// A character outside the grammar.
    #[error("unexpected character {0:?} at byte {1}")]
    UnexpectedChar(char, usize),
    /// A numeric literal that does not parse as a finite number.
    #[error("malformed number {0:?}")]
    MalformedNumber(String),
    /// A name that is not one of the recognized placeholders.
    #[error("unknown name {0:?}")]
    UnknownName(String),
    /// The expression ended where an operand or operator was required.
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    /// A token that cannot start or continue an operand at this position.
    #[error("unexpected token at byte {0}")]
    UnexpectedToken(usize),
    /// Leftover input after a complete expression.
    #[error("trailing input at byte {0}")]
    TrailingInput(usize),
    /// The whole expression is empty or whitespace.
    #[error("empty expression")]
    Empty,
    /// A placeholder that is valid syntax but not bound in this context,
    /// e.g. `EINV` inside a sell-price formula.
    #[error("placeholder {0} is not available in this context")]
    UnboundPlaceholder(&'static str),
}

/// Binary arithmetic operators, lowest-to-highest precedence tiers:
/// `+ -` then `* / %`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
            BinaryOp::Rem => lhs % rhs,
        }
    }
}

/// A parsed formula as a tagged expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// A numeric literal.
    Literal(f64),
    /// A named placeholder resolved from the symbol table at evaluation.
    Placeholder(Placeholder),
    /// Unary negation.
    Neg(Box<Expr>),
    /// A binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Evaluate against `symbols`. Arithmetic never fails; the only error is
    /// a placeholder the symbol table does not bind. The result may be
    /// non-finite (e.g. after division by zero) and callers must check.
    pub fn eval(&self, symbols: &Symbols) -> Result<f64, ExprError> {
        match self {
            Expr::Literal(v) => Ok(*v),
            Expr::Placeholder(p) => symbols
                .lookup(*p)
                .ok_or(ExprError::UnboundPlaceholder(p.name())),
            Expr::Neg(inner) => Ok(-inner.eval(symbols)?),
            Expr::Binary { op, lhs, rhs } => Ok(op.apply(lhs.eval(symbols)?, rhs.eval(symbols)?)),
        }
    }

    /// Placeholders referenced anywhere in the tree.
    pub fn placeholders(&self) -> Vec<Placeholder> {
        let mut out = Vec::new();
        self.collect_placeholders(&mut out);
        out
    }

    fn collect_placeholders(&self, out: &mut Vec<Placeholder>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Placeholder(p) => {
                if !out.contains(p) {
                    out.push(*p);
                }
            }
            Expr::Neg(inner) => inner.collect_placeholders(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_placeholders(out);
                rhs.collect_placeholders(out);
            }
        }
    }
}

/// Per-invocation placeholder bindings.
///
/// Constructed through one of the context-specific constructors so a formula
/// cannot observe values from a context it does not belong to.
#[derive(Clone, Copy, Debug, Default)]
pub struct Symbols {
    max: Option<f64>,
    prod: Option<f64>,
    inv: Option<f64>,
    mp: Option<f64>,
    eprod: Option<f64>,
    iprod: Option<f64>,
    einv: Option<f64>,
    iinv: Option<f64>,
}

impl Symbols {
    /// Bindings for a desired-sell-amount formula.
    pub fn sell_amount(max: f64, prod: f64, inv: f64) -> Self {
        Symbols {
            max: Some(max),
            prod: Some(prod),
            inv: Some(inv),
            ..Symbols::default()
        }
    }

    /// Bindings for a desired-sell-price formula.
    pub fn sell_price(mp: f64) -> Self {
        Symbols {
            mp: Some(mp),
            ..Symbols::default()
        }
    }

    /// Bindings for an export-amount formula.
    pub fn export_amount(max: f64, eprod: f64, iprod: f64, einv: f64, iinv: f64) -> Self {
        Symbols {
            max: Some(max),
            eprod: Some(eprod),
            iprod: Some(iprod),
            einv: Some(einv),
            iinv: Some(iinv),
            ..Symbols::default()
        }
    }

    fn lookup(&self, p: Placeholder) -> Option<f64> {
        match p {
            Placeholder::Max => self.max,
            Placeholder::Prod => self.prod,
            Placeholder::Inv => self.inv,
            Placeholder::Mp => self.mp,
            Placeholder::EProd => self.eprod,
            Placeholder::IProd => self.iprod,
            Placeholder::EInv => self.einv,
            Placeholder::IInv => self.iinv,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token {
    Number(f64),
    Name(Placeholder),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
}

fn lex(src: &str) -> Result<Vec<(Token, usize)>, ExprError> {
    let mut tokens = Vec::new();
    let bytes = src.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' | '\r' | '\n' => i += 1,
            '+' => {
                tokens.push((Token::Plus, i));
                i += 1;
            }
            '-' => {
                tokens.push((Token::Minus, i));
                i += 1;
            }
            '*' => {
                tokens.push((Token::Star, i));
                i += 1;
            }
            '/' => {
                tokens.push((Token::Slash, i));
                i += 1;
            }
            '%' => {
                tokens.push((Token::Percent, i));
                i += 1;
            }
            '(' => {
                tokens.push((Token::LParen, i));
                i += 1;
            }
            ')' => {
                tokens.push((Token::RParen, i));
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < bytes.len() && matches!(bytes[i] as char, '0'..='9' | '.') {
                    i += 1;
                }
                // Optional exponent: 1e5, 2.5E-3
                if i < bytes.len() && matches!(bytes[i] as char, 'e' | 'E') {
                    let mut j = i + 1;
                    if j < bytes.len() && matches!(bytes[j] as char, '+' | '-') {
                        j += 1;
                    }
                    if j < bytes.len() && (bytes[j] as char).is_ascii_digit() {
                        i = j;
                        while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let text = &src[start..i];
                let value: f64 = text
                    .parse()
                    .map_err(|_| ExprError::MalformedNumber(text.to_string()))?;
                if !value.is_finite() {
                    return Err(ExprError::MalformedNumber(text.to_string()));
                }
                tokens.push((Token::Number(value), start));
            }
            'A'..='Z' | 'a'..='z' => {
                let start = i;
                while i < bytes.len() && (bytes[i] as char).is_ascii_alphabetic() {
                    i += 1;
                }
                let text = &src[start..i];
                let placeholder = Placeholder::from_name(&text.to_ascii_uppercase())
                    .ok_or_else(|| ExprError::UnknownName(text.to_string()))?;
                tokens.push((Token::Name(placeholder), start));
            }
            other => return Err(ExprError::UnexpectedChar(other, i)),
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [(Token, usize)],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(t, _)| *t)
    }

    fn bump(&mut self) -> Option<(Token, usize)> {
        let t = self.tokens.get(self.pos).copied();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.term()?;
        while let Some(tok) = self.peek() {
            let op = match tok {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    // term := unary (('*' | '/' | '%') unary)*
    fn term(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.unary()?;
        while let Some(tok) = self.peek() {
            let op = match tok {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Rem,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    // unary := '-' unary | primary
    fn unary(&mut self) -> Result<Expr, ExprError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            _ => self.primary(),
        }
    }

    // primary := number | placeholder | '(' expr ')'
    fn primary(&mut self) -> Result<Expr, ExprError> {
        match self.bump() {
            Some((Token::Number(v), _)) => Ok(Expr::Literal(v)),
            Some((Token::Name(p), _)) => Ok(Expr::Placeholder(p)),
            Some((Token::LParen, _)) => {
                let inner = self.expr()?;
                match self.bump() {
                    Some((Token::RParen, _)) => Ok(inner),
                    Some((_, at)) => Err(ExprError::UnexpectedToken(at)),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some((_, at)) => Err(ExprError::UnexpectedToken(at)),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

/// Parse a formula into its expression tree.
pub fn parse(src: &str) -> Result<Expr, ExprError> {
    let tokens = lex(src)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
    };
    let expr = parser.expr()?;
    if parser.pos < tokens.len() {
        return Err(ExprError::TrailingInput(tokens[parser.pos].1));
    }
    Ok(expr)
}

/// Parse and evaluate in one step. The result may be non-finite; callers
/// decide whether that constitutes a user-facing diagnostic.
pub fn evaluate(src: &str, symbols: &Symbols) -> Result<f64, ExprError> {
    parse(src)?.eval(symbols)
}
