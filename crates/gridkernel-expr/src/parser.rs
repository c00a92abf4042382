//! Recursive-descent parser over the token stream (spec §4.4/§6).
//!
//! Precedence, loosest to tightest: concat (`&`) < additive (`+ -`) <
//! multiplicative (`* /`) < unary (`-`) < primary. Each level pushes onto
//! the shared [`ast::Builder`] rather than building a tree and flattening
//! it afterward, so the emitted node array is already in the post-order
//! the evaluator expects.

use gridkernel_common::parse_position;

use crate::ast::{AggFn, AstBuilder, AstExpr, BinOp};
use crate::error::ParseError;
use crate::pool::LiteralPool;
use crate::tokenizer::{Token, TokenKind};

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    builder: AstBuilder,
    pool: LiteralPool,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: AstBuilder::new(),
            pool: LiteralPool::new(),
        }
    }

    pub fn into_pool(self) -> LiteralPool {
        self.pool
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, kind: &TokenKind, label: &'static str) -> Result<(), ParseError> {
        match self.advance() {
            Some(t) if &t.kind == kind => Ok(()),
            Some(t) => Err(ParseError::UnexpectedToken {
                expected: label,
                found: format!("{:?}", t.kind),
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    pub fn expect_eof(&self) -> Result<(), ParseError> {
        if self.pos == self.tokens.len() {
            Ok(())
        } else {
            Err(ParseError::TrailingInput)
        }
    }

    pub fn parse_expr(&mut self) -> Result<AstExpr, ParseError> {
        self.parse_concat()?;
        Ok(std::mem::replace(&mut self.builder, AstBuilder::new()).finish())
    }

    fn parse_concat(&mut self) -> Result<(), ParseError> {
        self.parse_additive()?;
        while matches!(self.peek(), Some(TokenKind::Amp)) {
            self.advance();
            self.parse_additive()?;
            self.builder.push_binary(BinOp::Concat);
        }
        Ok(())
    }

    fn parse_additive(&mut self) -> Result<(), ParseError> {
        self.parse_term()?;
        loop {
            match self.peek() {
                Some(TokenKind::Plus) => {
                    self.advance();
                    self.parse_term()?;
                    self.builder.push_binary(BinOp::Add);
                }
                Some(TokenKind::Minus) => {
                    self.advance();
                    self.parse_term()?;
                    self.builder.push_binary(BinOp::Sub);
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn parse_term(&mut self) -> Result<(), ParseError> {
        self.parse_unary()?;
        loop {
            match self.peek() {
                Some(TokenKind::Star) => {
                    self.advance();
                    self.parse_unary()?;
                    self.builder.push_binary(BinOp::Mul);
                }
                Some(TokenKind::Slash) => {
                    self.advance();
                    self.parse_unary()?;
                    self.builder.push_binary(BinOp::Div);
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn parse_unary(&mut self) -> Result<(), ParseError> {
        if matches!(self.peek(), Some(TokenKind::Minus)) {
            self.advance();
            self.parse_unary()?;
            self.builder.push_neg();
            Ok(())
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> Result<(), ParseError> {
        match self.advance().map(|t| t.kind.clone()) {
            Some(TokenKind::Number(n)) => {
                self.builder.push_number(n);
                Ok(())
            }
            Some(TokenKind::String(s)) => {
                let handle = self.pool.intern(s);
                self.builder.push_string(handle);
                Ok(())
            }
            Some(TokenKind::LParen) => {
                self.parse_concat()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(())
            }
            Some(TokenKind::At) => self.parse_aggregate(),
            Some(TokenKind::Ident(name)) => self.parse_ident_reference(name),
            Some(other) => Err(ParseError::UnexpectedToken {
                expected: "a value, reference, or '('",
                found: format!("{other:?}"),
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn parse_aggregate(&mut self) -> Result<(), ParseError> {
        let name = match self.advance().map(|t| t.kind.clone()) {
            Some(TokenKind::Ident(name)) => name,
            Some(other) => {
                return Err(ParseError::UnexpectedToken {
                    expected: "a function name",
                    found: format!("{other:?}"),
                })
            }
            None => return Err(ParseError::UnexpectedEof),
        };
        let f = AggFn::from_name(&name).ok_or(ParseError::UnknownFunction(name))?;
        self.expect(&TokenKind::LParen, "'('")?;
        let (a, b) = self.parse_address_range()?;
        self.expect(&TokenKind::RParen, "')'")?;
        self.builder.push_range_ref(a, b);
        self.builder.push_aggregate(f);
        Ok(())
    }

    /// An address, or an address:address pair, as required by an
    /// aggregate-function argument list.
    fn parse_address_range(&mut self) -> Result<(gridkernel_common::Position, gridkernel_common::Position), ParseError> {
        let first = self.parse_address_ident()?;
        if matches!(self.peek(), Some(TokenKind::Colon)) {
            self.advance();
            let second = self.parse_address_ident()?;
            Ok((first, second))
        } else {
            Ok((first, first))
        }
    }

    fn parse_address_ident(&mut self) -> Result<gridkernel_common::Position, ParseError> {
        match self.advance().map(|t| t.kind.clone()) {
            Some(TokenKind::Ident(name)) => {
                parse_position(&name).map_err(|_| ParseError::InvalidAddress(name))
            }
            Some(other) => Err(ParseError::UnexpectedToken {
                expected: "a cell address",
                found: format!("{other:?}"),
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn parse_ident_reference(&mut self, name: String) -> Result<(), ParseError> {
        let first = parse_position(&name).map_err(|_| ParseError::InvalidAddress(name))?;
        if matches!(self.peek(), Some(TokenKind::Colon)) {
            self.advance();
            let second = self.parse_address_ident()?;
            self.builder.push_range_ref(first, second);
        } else {
            self.builder.push_cell_ref(first);
        }
        Ok(())
    }
}
