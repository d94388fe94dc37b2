use thiserror::Error;

use crate::ast::{Block, Expr, InfixOp, PrefixOp, Program, Stmt};
use crate::lexer::{Span, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected {want}, got {got}")]
    ExpectedToken { want: String, got: String },
    #[error("no prefix parse function for {token}")]
    NoPrefixParseFn { token: String },
    #[error("could not parse {literal} as {target}")]
    MalformedNumber {
        literal: String,
        target: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at {}..{}: {kind}", .span.start, .span.end)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens
            .last()
            .is_some_and(|token| matches!(token.kind, TokenKind::Eof))
        {
            tokens.push(Token::new(TokenKind::Eof, Span::default()));
        }

        Self { tokens, cursor: 0 }
    }

    /// Parses the whole token stream. Syntax errors accumulate instead of
    /// aborting: after each one the parser skips ahead to a plausible
    /// statement boundary and keeps going, so a single pass reports as
    /// many diagnostics as possible.
    pub fn parse_program(mut self) -> Result<Program, Vec<ParseError>> {
        let mut statements = Vec::new();
        let mut errors = Vec::new();

        while !self.at_end() {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    errors.push(err);
                    self.synchronize();
                }
            }
        }

        if errors.is_empty() {
            Ok(Program::new(statements))
        } else {
            Err(errors)
        }
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        if self.check(|kind| matches!(kind, TokenKind::Let)) {
            self.parse_let_statement()
        } else if self.check(|kind| matches!(kind, TokenKind::Const)) {
            self.parse_const_statement()
        } else if self.check(|kind| matches!(kind, TokenKind::Return)) {
            self.parse_return_statement()
        } else {
            self.parse_expression_statement()
        }
    }

    fn parse_let_statement(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        let name = self.expect_ident()?;
        self.expect(|kind| matches!(kind, TokenKind::Assign), "'='")?;
        let value = self.parse_expression(Precedence::Lowest)?;
        self.consume_semicolon();

        Ok(Stmt::Let { name, value })
    }

    fn parse_const_statement(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        let name = self.expect_ident()?;
        self.expect(|kind| matches!(kind, TokenKind::Assign), "'='")?;
        let value = self.parse_expression(Precedence::Lowest)?;
        self.consume_semicolon();

        Ok(Stmt::Const { name, value })
    }

    fn parse_return_statement(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.consume_semicolon();

        Ok(Stmt::Return(value))
    }

    fn parse_expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let value = self.parse_expression(Precedence::Lowest)?;
        self.consume_semicolon();
        Ok(Stmt::Expr(value))
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Result<Expr, ParseError> {
        let mut left = self.parse_prefix()?;

        while !self.at_end()
            && !self.check(|kind| matches!(kind, TokenKind::Semicolon))
            && precedence < self.current_precedence()
        {
            let operator = self.advance();
            left = self.parse_infix(left, operator.kind)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Ident(name) => Ok(Expr::Identifier(name)),
            TokenKind::Int(literal) => {
                let value = literal.parse::<i64>().map_err(|_| {
                    ParseError::new(
                        ParseErrorKind::MalformedNumber {
                            literal,
                            target: "integer",
                        },
                        token.span,
                    )
                })?;
                Ok(Expr::IntegerLiteral(value))
            }
            TokenKind::Float(literal) => {
                let value = literal.parse::<f64>().map_err(|_| {
                    ParseError::new(
                        ParseErrorKind::MalformedNumber {
                            literal,
                            target: "float",
                        },
                        token.span,
                    )
                })?;
                Ok(Expr::FloatLiteral(value))
            }
            TokenKind::Str(value) => Ok(Expr::StringLiteral(value)),
            TokenKind::True => Ok(Expr::BooleanLiteral(true)),
            TokenKind::False => Ok(Expr::BooleanLiteral(false)),
            TokenKind::Null => Ok(Expr::NullLiteral),
            TokenKind::Bang => self.parse_prefix_operator(PrefixOp::Not),
            TokenKind::Minus => self.parse_prefix_operator(PrefixOp::Negate),
            TokenKind::BitNot => self.parse_prefix_operator(PrefixOp::BitNot),
            TokenKind::Inc => self.parse_prefix_operator(PrefixOp::Increment),
            TokenKind::Dec => self.parse_prefix_operator(PrefixOp::Decrement),
            TokenKind::LParen => {
                let expr = self.parse_expression(Precedence::Lowest)?;
                self.expect(|kind| matches!(kind, TokenKind::RParen), "')'")?;
                Ok(expr)
            }
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::If => self.parse_if_expression(),
            TokenKind::Function => self.parse_function_literal(),
            other => Err(ParseError::new(
                ParseErrorKind::NoPrefixParseFn {
                    token: other.describe(),
                },
                token.span,
            )),
        }
    }

    fn parse_prefix_operator(&mut self, op: PrefixOp) -> Result<Expr, ParseError> {
        let right = self.parse_expression(Precedence::Prefix)?;
        Ok(Expr::Prefix {
            op,
            right: Box::new(right),
        })
    }

    fn parse_infix(&mut self, left: Expr, operator: TokenKind) -> Result<Expr, ParseError> {
        if matches!(operator, TokenKind::LBracket) {
            return self.parse_index_expression(left);
        }
        if matches!(operator, TokenKind::LParen) {
            return self.parse_call_expression(left);
        }

        let (op, precedence) = match operator {
            TokenKind::Or => (InfixOp::Or, Precedence::LogicalOr),
            TokenKind::And => (InfixOp::And, Precedence::LogicalAnd),
            TokenKind::BitOr => (InfixOp::BitOr, Precedence::BitOr),
            TokenKind::BitXor => (InfixOp::BitXor, Precedence::BitXor),
            TokenKind::BitAnd => (InfixOp::BitAnd, Precedence::BitAnd),
            TokenKind::Eq => (InfixOp::Eq, Precedence::Equality),
            TokenKind::NotEq => (InfixOp::NotEq, Precedence::Equality),
            TokenKind::Lt => (InfixOp::Lt, Precedence::Comparison),
            TokenKind::Gt => (InfixOp::Gt, Precedence::Comparison),
            TokenKind::LtEq => (InfixOp::LtEq, Precedence::Comparison),
            TokenKind::GtEq => (InfixOp::GtEq, Precedence::Comparison),
            TokenKind::Shl => (InfixOp::Shl, Precedence::Shift),
            TokenKind::Shr => (InfixOp::Shr, Precedence::Shift),
            TokenKind::Plus => (InfixOp::Add, Precedence::Sum),
            TokenKind::Minus => (InfixOp::Subtract, Precedence::Sum),
            TokenKind::Asterisk => (InfixOp::Multiply, Precedence::Product),
            TokenKind::Slash => (InfixOp::Divide, Precedence::Product),
            TokenKind::IntDiv => (InfixOp::IntDivide, Precedence::Product),
            TokenKind::Percent => (InfixOp::Modulo, Precedence::Product),
            TokenKind::Pow => (InfixOp::Power, Precedence::Power),
            other => {
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedToken {
                        want: "an infix operator".to_string(),
                        got: other.describe(),
                    },
                    self.current().span,
                ));
            }
        };

        // Exponentiation is right-associative: its right operand is parsed
        // one level below, so a following `**` binds into it.
        let right = if matches!(op, InfixOp::Power) {
            self.parse_expression(Precedence::Product)?
        } else {
            self.parse_expression(precedence)?
        };

        Ok(Expr::Infix {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let mut elements = Vec::new();

        if self.check(|kind| matches!(kind, TokenKind::RBracket)) {
            self.advance();
            return Ok(Expr::ArrayLiteral(elements));
        }

        loop {
            elements.push(self.parse_expression(Precedence::Lowest)?);

            if self.check(|kind| matches!(kind, TokenKind::Comma)) {
                self.advance();
                continue;
            }

            self.expect(|kind| matches!(kind, TokenKind::RBracket), "']'")?;
            break;
        }

        Ok(Expr::ArrayLiteral(elements))
    }

    fn parse_index_expression(&mut self, left: Expr) -> Result<Expr, ParseError> {
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect(|kind| matches!(kind, TokenKind::RBracket), "']'")?;

        Ok(Expr::Index {
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    fn parse_call_expression(&mut self, callee: Expr) -> Result<Expr, ParseError> {
        let mut args = Vec::new();

        if self.check(|kind| matches!(kind, TokenKind::RParen)) {
            self.advance();
            return Ok(Expr::Call {
                callee: Box::new(callee),
                args,
            });
        }

        loop {
            args.push(self.parse_expression(Precedence::Lowest)?);

            if self.check(|kind| matches!(kind, TokenKind::Comma)) {
                self.advance();
                continue;
            }

            self.expect(|kind| matches!(kind, TokenKind::RParen), "')'")?;
            break;
        }

        Ok(Expr::Call {
            callee: Box::new(callee),
            args,
        })
    }

    fn parse_if_expression(&mut self) -> Result<Expr, ParseError> {
        self.expect(|kind| matches!(kind, TokenKind::LParen), "'('")?;
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect(|kind| matches!(kind, TokenKind::RParen), "')'")?;

        let consequence = self.parse_block()?;

        let alternative = if self.check(|kind| matches!(kind, TokenKind::Else)) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Expr::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_function_literal(&mut self) -> Result<Expr, ParseError> {
        self.expect(|kind| matches!(kind, TokenKind::LParen), "'('")?;

        let mut params = Vec::new();
        if !self.check(|kind| matches!(kind, TokenKind::RParen)) {
            loop {
                params.push(self.expect_ident()?);

                if self.check(|kind| matches!(kind, TokenKind::Comma)) {
                    self.advance();
                    continue;
                }
                break;
            }
        }

        self.expect(|kind| matches!(kind, TokenKind::RParen), "')'")?;
        let body = self.parse_block()?;

        Ok(Expr::FunctionLiteral { params, body })
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.expect(|kind| matches!(kind, TokenKind::LBrace), "'{'")?;

        let mut statements = Vec::new();
        while !self.at_end() && !self.check(|kind| matches!(kind, TokenKind::RBrace)) {
            statements.push(self.parse_statement()?);
        }

        self.expect(|kind| matches!(kind, TokenKind::RBrace), "'}'")?;

        Ok(Block::new(statements))
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Ident(name) => Ok(name),
            other => Err(ParseError::new(
                ParseErrorKind::ExpectedToken {
                    want: "an identifier".to_string(),
                    got: other.describe(),
                },
                token.span,
            )),
        }
    }

    fn expect(
        &mut self,
        predicate: impl Fn(&TokenKind) -> bool,
        want: &'static str,
    ) -> Result<(), ParseError> {
        if predicate(&self.current().kind) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::new(
                ParseErrorKind::ExpectedToken {
                    want: want.to_string(),
                    got: self.current().kind.describe(),
                },
                self.current().span,
            ))
        }
    }

    fn consume_semicolon(&mut self) {
        if self.check(|kind| matches!(kind, TokenKind::Semicolon)) {
            self.advance();
        }
    }

    // Recovery point after a syntax error: just past the next semicolon,
    // or at the next statement keyword, whichever comes first.
    fn synchronize(&mut self) {
        while !self.at_end() {
            if self.cursor > 0 {
                let prev = &self.tokens[self.cursor - 1];
                if matches!(prev.kind, TokenKind::Semicolon) {
                    return;
                }
            }

            if matches!(
                self.current().kind,
                TokenKind::Let | TokenKind::Const | TokenKind::Return
            ) {
                return;
            }

            self.advance();
        }
    }

    fn check(&self, predicate: impl Fn(&TokenKind) -> bool) -> bool {
        predicate(&self.current().kind)
    }

    fn current_precedence(&self) -> Precedence {
        precedence_of(&self.current().kind)
    }

    fn at_end(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    fn current(&self) -> &Token {
        &self.tokens[self.cursor]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.at_end() {
            self.cursor += 1;
        }
        token
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest = 0,
    LogicalOr = 1,
    LogicalAnd = 2,
    BitOr = 3,
    BitXor = 4,
    BitAnd = 5,
    Equality = 6,
    Comparison = 7,
    Shift = 8,
    Sum = 9,
    Product = 10,
    Power = 11,
    Prefix = 12,
    Postfix = 13,
}

fn precedence_of(kind: &TokenKind) -> Precedence {
    match kind {
        TokenKind::Or => Precedence::LogicalOr,
        TokenKind::And => Precedence::LogicalAnd,
        TokenKind::BitOr => Precedence::BitOr,
        TokenKind::BitXor => Precedence::BitXor,
        TokenKind::BitAnd => Precedence::BitAnd,
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equality,
        TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => Precedence::Comparison,
        TokenKind::Shl | TokenKind::Shr => Precedence::Shift,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk | TokenKind::Slash | TokenKind::IntDiv | TokenKind::Percent => {
            Precedence::Product
        }
        TokenKind::Pow => Precedence::Power,
        TokenKind::LBracket | TokenKind::LParen => Precedence::Postfix,
        _ => Precedence::Lowest,
    }
}
