//! Recursive-descent parser producing an [`Expr`] tree.
//!
//! Binary operators use precedence climbing. Nesting depth is bounded by
//! [`TransformLimits::max_depth`], counting both recursion and the loops that
//! build left-nested chains (`a.b.c`, `1 + 2 + 3`).

use serde_json::Value;

use super::ast::{Arrow, BinaryOp, Element, Expr, LogicalOp, Property, TemplatePart, UnaryOp};
use super::lexer::{TemplateToken, Token, TokenKind};
use super::value::{format_number, number_value};
use super::{TransformError, TransformLimits};

enum Operator {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: Vec<Token>, limits: &TransformLimits) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            depth: 0,
            max_depth: limits.max_depth,
        }
    }

    /// Parse a complete expression. Trailing semicolons are tolerated.
    pub fn parse(mut self) -> Result<Expr, TransformError> {
        if self.check(&TokenKind::Eof) {
            return Err(self.error_here("Empty expression"));
        }
        let expr = self.expression()?;
        while self.eat(&TokenKind::Semicolon) {}
        if !self.check(&TokenKind::Eof) {
            return Err(self.unexpected());
        }
        Ok(expr)
    }

    fn expression(&mut self) -> Result<Expr, TransformError> {
        self.enter()?;
        let expr = if self.arrow_ahead() {
            self.arrow()?
        } else {
            let test = self.binary(1)?;
            if self.eat(&TokenKind::Question) {
                let consequent = self.expression()?;
                self.expect(&TokenKind::Colon, "':'")?;
                let alternate = self.expression()?;
                Expr::Conditional {
                    test: Box::new(test),
                    consequent: Box::new(consequent),
                    alternate: Box::new(alternate),
                }
            } else {
                test
            }
        };
        self.depth -= 1;
        Ok(expr)
    }

    fn arrow_ahead(&self) -> bool {
        match self.kind_at(self.pos) {
            TokenKind::Ident(_) => matches!(self.kind_at(self.pos + 1), TokenKind::Arrow),
            TokenKind::LParen => {
                let mut i = self.pos + 1;
                if matches!(self.kind_at(i), TokenKind::RParen) {
                    return matches!(self.kind_at(i + 1), TokenKind::Arrow);
                }
                loop {
                    if !matches!(self.kind_at(i), TokenKind::Ident(_)) {
                        return false;
                    }
                    match self.kind_at(i + 1) {
                        TokenKind::Comma => i += 2,
                        TokenKind::RParen => return matches!(self.kind_at(i + 2), TokenKind::Arrow),
                        _ => return false,
                    }
                }
            }
            _ => false,
        }
    }

    fn arrow(&mut self) -> Result<Expr, TransformError> {
        let mut params = Vec::new();
        if self.eat(&TokenKind::LParen) {
            while let TokenKind::Ident(name) = self.kind_at(self.pos).clone() {
                self.pos += 1;
                params.push(name);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RParen, "')'")?;
        } else if let TokenKind::Ident(name) = self.kind_at(self.pos).clone() {
            self.pos += 1;
            params.push(name);
        }
        self.expect(&TokenKind::Arrow, "'=>'")?;

        if self.check(&TokenKind::LBrace) {
            return Err(self.error_here(
                "Arrow functions must have an expression body; wrap object literals in parentheses",
            ));
        }
        let body = self.expression()?;
        Ok(Expr::Arrow(Arrow {
            params,
            body: Box::new(body),
        }))
    }

    fn binary(&mut self, min_prec: u8) -> Result<Expr, TransformError> {
        let saved = self.depth;
        let mut left = self.unary()?;

        while let Some((prec, op)) = operator(self.kind_at(self.pos)) {
            if prec < min_prec {
                break;
            }
            self.enter()?;
            self.pos += 1;
            let right = self.binary(prec + 1)?;
            left = match op {
                Operator::Binary(op) => Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                Operator::Logical(op) => Expr::Logical {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }

        self.depth = saved;
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, TransformError> {
        let op = match self.kind_at(self.pos) {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Ident(name) if name == "typeof" => Some(UnaryOp::TypeOf),
            _ => None,
        };

        match op {
            Some(op) => {
                self.enter()?;
                self.pos += 1;
                let operand = self.unary()?;
                self.depth -= 1;
                Ok(Expr::Unary {
                    op,
                    operand: Box::new(operand),
                })
            }
            None => self.postfix(),
        }
    }

    fn postfix(&mut self) -> Result<Expr, TransformError> {
        let saved = self.depth;
        let mut expr = self.primary()?;

        loop {
            let (optional, next) = match self.kind_at(self.pos) {
                TokenKind::Dot => (false, self.kind_at(self.pos + 1).clone()),
                TokenKind::QuestionDot => (true, self.kind_at(self.pos + 1).clone()),
                TokenKind::LBracket => (false, TokenKind::LBracket),
                TokenKind::LParen => (false, TokenKind::LParen),
                _ => break,
            };
            self.enter()?;

            let is_dot = matches!(
                self.kind_at(self.pos),
                TokenKind::Dot | TokenKind::QuestionDot
            );
            if is_dot {
                self.pos += 1;
            }

            expr = match next {
                TokenKind::Ident(property) if is_dot => {
                    self.pos += 1;
                    Expr::Member {
                        object: Box::new(expr),
                        property,
                        optional,
                    }
                }
                TokenKind::LBracket if !is_dot || optional => {
                    self.pos += 1;
                    let index = self.expression()?;
                    self.expect(&TokenKind::RBracket, "']'")?;
                    Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                        optional,
                    }
                }
                TokenKind::LParen if !is_dot || optional => {
                    self.pos += 1;
                    let args = self.elements(&TokenKind::RParen, "')'")?;
                    Expr::Call {
                        callee: Box::new(expr),
                        args,
                        optional,
                    }
                }
                _ => return Err(self.unexpected()),
            };
        }

        self.depth = saved;
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, TransformError> {
        let token = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        let expr = match token.kind {
            TokenKind::Number(n) => Expr::Literal(number_value(n)),
            TokenKind::Str(s) => Expr::Literal(Value::String(s)),
            TokenKind::Template(parts) => {
                let mut out = Vec::with_capacity(parts.len());
                for part in parts {
                    out.push(match part {
                        TemplateToken::Text(text) => TemplatePart::Text(text),
                        TemplateToken::Expr(tokens) => TemplatePart::Expr(self.sub_expression(tokens)?),
                    });
                }
                Expr::Template(out)
            }
            TokenKind::Ident(name) => match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" | "undefined" | "NaN" => Expr::Literal(Value::Null),
                _ => Expr::Ident(name),
            },
            TokenKind::LParen => {
                self.pos += 1;
                let expr = self.expression()?;
                self.expect(&TokenKind::RParen, "')'")?;
                return Ok(expr);
            }
            TokenKind::LBracket => {
                self.pos += 1;
                return Ok(Expr::Array(self.elements(&TokenKind::RBracket, "']'")?));
            }
            TokenKind::LBrace => {
                self.pos += 1;
                return self.object();
            }
            _ => return Err(self.unexpected()),
        };
        self.pos += 1;
        Ok(expr)
    }

    /// Comma-separated items with optional spreads, up to `close`.
    fn elements(&mut self, close: &TokenKind, label: &str) -> Result<Vec<Element>, TransformError> {
        let mut items = Vec::new();
        while !self.check(close) {
            if self.eat(&TokenKind::Ellipsis) {
                items.push(Element::Spread(self.expression()?));
            } else {
                items.push(Element::Item(self.expression()?));
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(close, label)?;
        Ok(items)
    }

    fn object(&mut self) -> Result<Expr, TransformError> {
        let mut properties = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let property = match self.kind_at(self.pos).clone() {
                TokenKind::Ellipsis => {
                    self.pos += 1;
                    Property::Spread(self.expression()?)
                }
                TokenKind::LBracket => {
                    self.pos += 1;
                    let key = self.expression()?;
                    self.expect(&TokenKind::RBracket, "']'")?;
                    self.expect(&TokenKind::Colon, "':'")?;
                    Property::Computed(key, self.expression()?)
                }
                TokenKind::Ident(name) => {
                    self.pos += 1;
                    if self.eat(&TokenKind::Colon) {
                        Property::Named(name, self.expression()?)
                    } else {
                        Property::Named(name.clone(), Expr::Ident(name))
                    }
                }
                TokenKind::Str(key) => {
                    self.pos += 1;
                    self.expect(&TokenKind::Colon, "':'")?;
                    Property::Named(key, self.expression()?)
                }
                TokenKind::Number(n) => {
                    self.pos += 1;
                    self.expect(&TokenKind::Colon, "':'")?;
                    Property::Named(format_number(n), self.expression()?)
                }
                _ => return Err(self.unexpected()),
            };
            properties.push(property);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(Expr::Object(properties))
    }

    fn sub_expression(&mut self, tokens: Vec<Token>) -> Result<Expr, TransformError> {
        let mut parser = Parser {
            source: self.source,
            tokens,
            pos: 0,
            depth: self.depth,
            max_depth: self.max_depth,
        };
        let expr = parser.expression()?;
        if !parser.check(&TokenKind::Eof) {
            return Err(parser.unexpected());
        }
        Ok(expr)
    }

    fn enter(&mut self) -> Result<(), TransformError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(TransformError::DepthLimit {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn kind_at(&self, index: usize) -> &TokenKind {
        // The token stream always ends with Eof.
        &self.tokens[index.min(self.tokens.len() - 1)].kind
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.kind_at(self.pos) == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, label: &str) -> Result<(), TransformError> {
        if self.eat(kind) {
            Ok(())
        } else if self.check(&TokenKind::Eof) {
            Err(self.error_here(&format!("Unexpected end of input, expected {label}")))
        } else {
            Err(self.error_here(&format!(
                "Unexpected token {}, expected {label}",
                describe(self.kind_at(self.pos))
            )))
        }
    }

    fn unexpected(&self) -> TransformError {
        match self.kind_at(self.pos) {
            TokenKind::Eof => self.error_here("Unexpected end of input"),
            other => self.error_here(&format!("Unexpected token {}", describe(other))),
        }
    }

    fn error_here(&self, message: &str) -> TransformError {
        let pos = self.tokens[self.pos.min(self.tokens.len() - 1)].pos;
        TransformError::syntax(self.source, message, pos)
    }
}

fn operator(kind: &TokenKind) -> Option<(u8, Operator)> {
    Some(match kind {
        TokenKind::OrOr => (1, Operator::Logical(LogicalOp::Or)),
        TokenKind::Nullish => (1, Operator::Logical(LogicalOp::Nullish)),
        TokenKind::AndAnd => (2, Operator::Logical(LogicalOp::And)),
        TokenKind::EqEq => (3, Operator::Binary(BinaryOp::LooseEq)),
        TokenKind::NotEq => (3, Operator::Binary(BinaryOp::LooseNe)),
        TokenKind::EqEqEq => (3, Operator::Binary(BinaryOp::StrictEq)),
        TokenKind::NotEqEq => (3, Operator::Binary(BinaryOp::StrictNe)),
        TokenKind::Lt => (4, Operator::Binary(BinaryOp::Lt)),
        TokenKind::Le => (4, Operator::Binary(BinaryOp::Le)),
        TokenKind::Gt => (4, Operator::Binary(BinaryOp::Gt)),
        TokenKind::Ge => (4, Operator::Binary(BinaryOp::Ge)),
        TokenKind::Plus => (5, Operator::Binary(BinaryOp::Add)),
        TokenKind::Minus => (5, Operator::Binary(BinaryOp::Sub)),
        TokenKind::Star => (6, Operator::Binary(BinaryOp::Mul)),
        TokenKind::Slash => (6, Operator::Binary(BinaryOp::Div)),
        TokenKind::Percent => (6, Operator::Binary(BinaryOp::Rem)),
        _ => return None,
    })
}

fn describe(kind: &TokenKind) -> String {
    let text = match kind {
        TokenKind::Number(n) => return format_number(*n),
        TokenKind::Str(_) => return "string".into(),
        TokenKind::Template(_) => return "template literal".into(),
        TokenKind::Ident(name) => return format!("'{name}'"),
        TokenKind::LParen => "(",
        TokenKind::RParen => ")",
        TokenKind::LBracket => "[",
        TokenKind::RBracket => "]",
        TokenKind::LBrace => "{",
        TokenKind::RBrace => "}",
        TokenKind::Comma => ",",
        TokenKind::Dot => ".",
        TokenKind::QuestionDot => "?.",
        TokenKind::Colon => ":",
        TokenKind::Semicolon => ";",
        TokenKind::Question => "?",
        TokenKind::Arrow => "=>",
        TokenKind::Ellipsis => "...",
        TokenKind::Plus => "+",
        TokenKind::Minus => "-",
        TokenKind::Star => "*",
        TokenKind::Slash => "/",
        TokenKind::Percent => "%",
        TokenKind::Bang => "!",
        TokenKind::Lt => "<",
        TokenKind::Le => "<=",
        TokenKind::Gt => ">",
        TokenKind::Ge => ">=",
        TokenKind::EqEq => "==",
        TokenKind::NotEq => "!=",
        TokenKind::EqEqEq => "===",
        TokenKind::NotEqEq => "!==",
        TokenKind::AndAnd => "&&",
        TokenKind::OrOr => "||",
        TokenKind::Nullish => "??",
        TokenKind::Eof => return "end of input".into(),
    };
    format!("'{text}'")
}
