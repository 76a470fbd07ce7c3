//! Tokenizer for transform expressions.

use super::{TransformError, TransformLimits};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Str(String),
    Template(Vec<TemplateToken>),
    Ident(String),

    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    QuestionDot,
    Colon,
    Semicolon,
    Question,
    Arrow,
    Ellipsis,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    NotEq,
    EqEqEq,
    NotEqEq,
    AndAnd,
    OrOr,
    Nullish,

    Eof,
}

/// One piece of a template literal: literal text or an embedded expression
/// (already tokenized, terminated by [`TokenKind::Eof`]).
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateToken {
    Text(String),
    Expr(Vec<Token>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Character offset into the source.
    pub pos: usize,
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    /// Open template substitutions; each one recurses into `tokens_until`.
    depth: usize,
    max_depth: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, limits: &TransformLimits) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
            depth: 0,
            max_depth: limits.max_depth,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, TransformError> {
        let mut tokens = self.tokens_until(false)?;
        tokens.push(Token {
            kind: TokenKind::Eof,
            pos: self.pos,
        });
        Ok(tokens)
    }

    /// Lex tokens until end of input, or until the `}` closing a template
    /// substitution when `in_template` is set.
    fn tokens_until(&mut self, in_template: bool) -> Result<Vec<Token>, TransformError> {
        let mut tokens = Vec::new();
        let mut brace_depth = 0usize;

        loop {
            self.skip_trivia()?;
            let Some(c) = self.peek() else {
                if in_template {
                    return Err(self.error("Unterminated template literal", self.pos));
                }
                return Ok(tokens);
            };

            if in_template && c == '}' && brace_depth == 0 {
                self.pos += 1;
                return Ok(tokens);
            }

            let token = self.next_token()?;
            match token.kind {
                TokenKind::LBrace => brace_depth += 1,
                TokenKind::RBrace => brace_depth = brace_depth.saturating_sub(1),
                _ => {}
            }
            tokens.push(token);
        }
    }

    fn next_token(&mut self) -> Result<Token, TransformError> {
        let start = self.pos;
        let c = self.bump().unwrap_or('\0');

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '.' => {
                if self.peek().is_some_and(|d| d.is_ascii_digit()) {
                    self.pos = start;
                    return self.number(start);
                }
                if self.eat_str("..") {
                    TokenKind::Ellipsis
                } else {
                    TokenKind::Dot
                }
            }
            '?' => {
                if self.eat('?') {
                    TokenKind::Nullish
                } else if self.peek() == Some('.')
                    && !self.peek_at(1).is_some_and(|d| d.is_ascii_digit())
                {
                    self.pos += 1;
                    TokenKind::QuestionDot
                } else {
                    TokenKind::Question
                }
            }
            '!' => {
                if self.eat_str("==") {
                    TokenKind::NotEqEq
                } else if self.eat('=') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            '=' => {
                if self.eat_str("==") {
                    TokenKind::EqEqEq
                } else if self.eat('=') {
                    TokenKind::EqEq
                } else if self.eat('>') {
                    TokenKind::Arrow
                } else {
                    return Err(self.error("Assignment is not allowed", start));
                }
            }
            '<' => {
                if self.eat('=') {
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                if self.eat('&') {
                    TokenKind::AndAnd
                } else {
                    return Err(self.error("Unexpected token '&'", start));
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::OrOr
                } else {
                    return Err(self.error("Unexpected token '|'", start));
                }
            }
            '"' | '\'' => TokenKind::Str(self.string(c, start)?),
            '`' => TokenKind::Template(self.template(start)?),
            d if d.is_ascii_digit() => {
                self.pos = start;
                return self.number(start);
            }
            c if is_ident_start(c) => {
                let mut ident = String::from(c);
                while let Some(c) = self.peek().filter(|c| is_ident_part(*c)) {
                    ident.push(c);
                    self.pos += 1;
                }
                TokenKind::Ident(ident)
            }
            other => {
                return Err(self.error(&format!("Invalid or unexpected token '{other}'"), start));
            }
        };

        Ok(Token { kind, pos: start })
    }

    fn number(&mut self, start: usize) -> Result<Token, TransformError> {
        if self.peek() == Some('0') {
            let radix = match self.peek_at(1) {
                Some('x' | 'X') => Some(16),
                Some('b' | 'B') => Some(2),
                Some('o' | 'O') => Some(8),
                _ => None,
            };
            if let Some(radix) = radix {
                self.pos += 2;
                let digits = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
                let digits = digits.replace('_', "");
                let value = u64::from_str_radix(&digits, radix)
                    .map_err(|_| self.error("Invalid number literal", start))?;
                return Ok(Token {
                    kind: TokenKind::Number(value as f64),
                    pos: start,
                });
            }
        }

        let mut text = self.take_while(|c| c.is_ascii_digit() || c == '_');
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit() || c == '_'));
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let sign = self.peek_at(1);
            let exponent_start = match sign {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if self.peek_at(exponent_start).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..exponent_start {
                    text.push(self.bump().unwrap_or('e'));
                }
                text.push_str(&self.take_while(|c| c.is_ascii_digit()));
            }
        }
        if self.peek().is_some_and(is_ident_start) {
            return Err(self.error("Invalid or unexpected token", self.pos));
        }

        let value: f64 = text
            .replace('_', "")
            .parse()
            .map_err(|_| self.error("Invalid number literal", start))?;
        Ok(Token {
            kind: TokenKind::Number(value),
            pos: start,
        })
    }

    fn string(&mut self, quote: char, start: usize) -> Result<String, TransformError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error("Unterminated string literal", start)),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.escape(start)?),
                Some(c) => out.push(c),
            }
        }
    }

    fn template(&mut self, start: usize) -> Result<Vec<TemplateToken>, TransformError> {
        let mut parts = Vec::new();
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("Unterminated template literal", start)),
                Some('`') => break,
                Some('\\') => text.push(self.escape(start)?),
                Some('$') if self.peek() == Some('{') => {
                    self.pos += 1;
                    if !text.is_empty() {
                        parts.push(TemplateToken::Text(std::mem::take(&mut text)));
                    }
                    let expr_start = self.pos;
                    self.depth += 1;
                    if self.depth > self.max_depth {
                        return Err(TransformError::DepthLimit {
                            limit: self.max_depth,
                        });
                    }
                    let mut tokens = self.tokens_until(true)?;
                    self.depth -= 1;
                    if tokens.is_empty() {
                        return Err(self.error("Empty template substitution", expr_start));
                    }
                    tokens.push(Token {
                        kind: TokenKind::Eof,
                        pos: self.pos.saturating_sub(1),
                    });
                    parts.push(TemplateToken::Expr(tokens));
                }
                Some(c) => text.push(c),
            }
        }
        if !text.is_empty() {
            parts.push(TemplateToken::Text(text));
        }
        Ok(parts)
    }

    fn escape(&mut self, start: usize) -> Result<char, TransformError> {
        let c = self
            .bump()
            .ok_or_else(|| self.error("Unterminated string literal", start))?;
        Ok(match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            '0' => '\0',
            'u' => {
                let at = self.pos;
                let hex: String = if self.eat('{') {
                    let hex = self.take_while(|c| c.is_ascii_hexdigit());
                    if !self.eat('}') {
                        return Err(self.error("Invalid Unicode escape sequence", at));
                    }
                    hex
                } else {
                    let hex: String = self.chars.iter().skip(self.pos).take(4).collect();
                    self.pos += hex.chars().count();
                    hex
                };
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error("Invalid Unicode escape sequence", at))?
            }
            other => other,
        })
    }

    fn skip_trivia(&mut self) -> Result<(), TransformError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => self.pos += 1,
                Some('/') if self.peek_at(1) == Some('/') => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.pos += 1;
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    let start = self.pos;
                    self.pos += 2;
                    loop {
                        match self.bump() {
                            None => return Err(self.error("Unterminated comment", start)),
                            Some('*') if self.peek() == Some('/') => {
                                self.pos += 1;
                                break;
                            }
                            Some(_) => {}
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek().filter(|c| pred(*c)) {
            out.push(c);
            self.pos += 1;
        }
        out
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, expected: &str) -> bool {
        let matches = expected
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c));
        if matches {
            self.pos += expected.chars().count();
        }
        matches
    }

    fn error(&self, message: &str, pos: usize) -> TransformError {
        TransformError::syntax(self.source, message, pos)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source, &TransformLimits::default())
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn member_chain() {
        assert_eq!(
            kinds("response.items[0]"),
            vec![
                TokenKind::Ident("response".into()),
                TokenKind::Dot,
                TokenKind::Ident("items".into()),
                TokenKind::LBracket,
                TokenKind::Number(0.0),
                TokenKind::RBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("a // trailing\n /* block */ + 1"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Plus,
                TokenKind::Number(1.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn operators_take_longest_match() {
        assert_eq!(
            kinds("a === b ?? c?.d => ..."),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::EqEqEq,
                TokenKind::Ident("b".into()),
                TokenKind::Nullish,
                TokenKind::Ident("c".into()),
                TokenKind::QuestionDot,
                TokenKind::Ident("d".into()),
                TokenKind::Arrow,
                TokenKind::Ellipsis,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn ternary_with_decimal_is_not_optional_chain() {
        assert_eq!(
            kinds("a?.5:1"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Question,
                TokenKind::Number(0.5),
                TokenKind::Colon,
                TokenKind::Number(1.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn number_forms() {
        assert_eq!(
            kinds("1_000 0x1f 2.5e3 .25"),
            vec![
                TokenKind::Number(1000.0),
                TokenKind::Number(31.0),
                TokenKind::Number(2500.0),
                TokenKind::Number(0.25),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r#"'it\'s' "A\n""#),
            vec![
                TokenKind::Str("it's".into()),
                TokenKind::Str("A\n".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn template_with_nested_braces() {
        let tokens = kinds("`n=${ {a: 1}.a }!`");
        let TokenKind::Template(parts) = &tokens[0] else {
            panic!("expected template, got {tokens:?}");
        };
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], TemplateToken::Text("n=".into()));
        assert_eq!(parts[2], TemplateToken::Text("!".into()));
    }

    #[test]
    fn unterminated_string_reports_position() {
        let err = Lexer::new("a +\n 'oops", &TransformLimits::default())
            .tokenize()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "SyntaxError: Unterminated string literal (line 2, column 2)"
        );
    }

    #[test]
    fn assignment_is_rejected() {
        assert!(Lexer::new("a = 1", &TransformLimits::default()).tokenize().is_err());
    }

    #[test]
    fn nested_templates_within_limit() {
        let limits = TransformLimits {
            max_depth: 3,
            ..TransformLimits::default()
        };
        assert!(Lexer::new("`${`${`${1}`}`}`", &limits).tokenize().is_ok());
        assert_eq!(
            Lexer::new("`${`${`${`${1}`}`}`}`", &limits).tokenize(),
            Err(TransformError::DepthLimit { limit: 3 })
        );
    }
}
