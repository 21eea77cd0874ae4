use std::rc::Rc;

use tracing::debug;

use crate::ast::{
    AssignMode, BinaryOperator, Block, Expression, FunctionDecl, Literal, LogicalOperator,
    Program, Statement, StatementKind, StepOperator, UnaryOperator,
};
use crate::stack;
use crate::token::{Span, Token, TokenKind};

mod error;

pub use error::{ParseResult, SyntaxError};

/// Deepest nesting of blocks, parenthesised or array sub-expressions and
/// prefix operators accepted in one program.
pub const MAX_NESTING: usize = 256;

/// Recursive-descent parser; binary precedence from lowest to highest is
/// assignment, `||`, `&&`, equality, comparison, term, factor, prefix, postfix.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(Token { kind: TokenKind::EOF, .. })) {
            let span = tokens.last().map(|token| token.span).unwrap_or_default();
            tokens.push(Token::new(TokenKind::EOF, span));
        }
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    pub fn parse_program(mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();
        while !self.check(&TokenKind::EOF) {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        let span = self.current().span;
        let kind = match self.current().kind {
            TokenKind::Var => {
                let declaration = self.parse_declaration()?;
                self.expect(TokenKind::Semicolon)?;
                declaration
            }
            TokenKind::Function => self.parse_function()?,
            TokenKind::If => self.parse_if()?,
            TokenKind::While => self.parse_while()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::Break => {
                self.advance();
                self.expect(TokenKind::Semicolon)?;
                StatementKind::Break
            }
            TokenKind::Continue => {
                self.advance();
                self.expect(TokenKind::Semicolon)?;
                StatementKind::Continue
            }
            TokenKind::Return => {
                self.advance();
                StatementKind::Return(self.parse_optional_value()?)
            }
            TokenKind::Exit => {
                self.advance();
                StatementKind::Exit(self.parse_optional_value()?)
            }
            TokenKind::Print => self.parse_print()?,
            TokenKind::LBrace => StatementKind::Block(self.parse_block()?),
            _ => {
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Semicolon)?;
                StatementKind::Expr(expr)
            }
        };
        Ok(Statement::new(kind, span))
    }

    /// `var name (= expr)?` without the terminator, shared with `for` headers.
    fn parse_declaration(&mut self) -> ParseResult<StatementKind> {
        self.expect(TokenKind::Var)?;
        let name = self.expect_identifier()?;
        let initializer = if self.eat(&TokenKind::Equal) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(StatementKind::Declare { name, initializer })
    }

    fn parse_function(&mut self) -> ParseResult<StatementKind> {
        self.expect(TokenKind::Function)?;
        let name = self.expect_identifier()?;
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.expect_identifier()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
                self.reject_trailing_comma(&TokenKind::RParen, "')'")?;
            }
        }
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(StatementKind::Function(Rc::new(FunctionDecl {
            name,
            params,
            body,
        })))
    }

    fn parse_if(&mut self) -> ParseResult<StatementKind> {
        self.expect(TokenKind::If)?;
        let mut branches = vec![self.parse_condition_and_block()?];
        while self.eat(&TokenKind::Elif) {
            branches.push(self.parse_condition_and_block()?);
        }
        let else_block = if self.eat(&TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(StatementKind::If {
            branches,
            else_block,
        })
    }

    fn parse_while(&mut self) -> ParseResult<StatementKind> {
        self.expect(TokenKind::While)?;
        let (condition, body) = self.parse_condition_and_block()?;
        Ok(StatementKind::While { condition, body })
    }

    fn parse_condition_and_block(&mut self) -> ParseResult<(Expression, Block)> {
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok((condition, body))
    }

    fn parse_for(&mut self) -> ParseResult<StatementKind> {
        self.expect(TokenKind::For)?;
        self.expect(TokenKind::LParen)?;

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            let span = self.current().span;
            let kind = if self.check(&TokenKind::Var) {
                self.parse_declaration()?
            } else {
                StatementKind::Expr(self.parse_expression()?)
            };
            Some(Box::new(Statement::new(kind, span)))
        };
        self.expect(TokenKind::Semicolon)?;

        let test = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon)?;

        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::RParen)?;

        let body = self.parse_block()?;
        Ok(StatementKind::For {
            init,
            test,
            update,
            body,
        })
    }

    fn parse_print(&mut self) -> ParseResult<StatementKind> {
        self.expect(TokenKind::Print)?;
        self.expect(TokenKind::LParen)?;
        let format = match &self.current().kind {
            TokenKind::String(format) => format.clone(),
            _ => return Err(self.unexpected("format string")),
        };
        self.advance();
        let mut args = Vec::new();
        while self.eat(&TokenKind::Comma) {
            self.reject_trailing_comma(&TokenKind::RParen, "')'")?;
            args.push(self.parse_expression()?);
        }
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(StatementKind::Print { format, args })
    }

    /// Value of `return`/`exit`, followed by the terminator.
    fn parse_optional_value(&mut self) -> ParseResult<Option<Expression>> {
        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(value)
    }

    fn parse_block(&mut self) -> ParseResult<Block> {
        self.expect(TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.check(&TokenKind::EOF) {
            statements.push(self.nested(Self::parse_statement)?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Block { statements })
    }

    fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.nested(Self::parse_assignment)
    }

    fn parse_assignment(&mut self) -> ParseResult<Expression> {
        let span = self.current().span;
        let target = self.parse_logic_or()?;
        let mode = match self.current().kind {
            TokenKind::Equal => AssignMode::Simple,
            TokenKind::PlusEqual => AssignMode::Add,
            TokenKind::MinusEqual => AssignMode::Sub,
            TokenKind::StarEqual => AssignMode::Mul,
            TokenKind::SlashEqual => AssignMode::Div,
            _ => return Ok(target),
        };
        if !target.is_lvalue() {
            return Err(SyntaxError::InvalidAssignmentTarget {
                line: span.line,
                column: span.column,
            });
        }
        self.advance();
        let value = self.parse_expression()?;
        Ok(Expression::Assign {
            target: Box::new(target),
            mode,
            value: Box::new(value),
        })
    }

    fn parse_logic_or(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_logic_and()?;
        while self.eat(&TokenKind::PipePipe) {
            let right = self.parse_logic_and()?;
            expr = Expression::Logical {
                left: Box::new(expr),
                op: LogicalOperator::Or,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_logic_and(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_equality()?;
        while self.eat(&TokenKind::AmpersandAmpersand) {
            let right = self.parse_equality()?;
            expr = Expression::Logical {
                left: Box::new(expr),
                op: LogicalOperator::And,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> ParseResult<Expression> {
        self.parse_binary_level(
            |kind| match kind {
                TokenKind::EqualEqual => Some(BinaryOperator::Equal),
                TokenKind::BangEqual => Some(BinaryOperator::NotEqual),
                _ => None,
            },
            Self::parse_comparison,
        )
    }

    fn parse_comparison(&mut self) -> ParseResult<Expression> {
        self.parse_binary_level(
            |kind| match kind {
                TokenKind::Less => Some(BinaryOperator::Less),
                TokenKind::LessEqual => Some(BinaryOperator::LessEqual),
                TokenKind::Greater => Some(BinaryOperator::Greater),
                TokenKind::GreaterEqual => Some(BinaryOperator::GreaterEqual),
                _ => None,
            },
            Self::parse_term,
        )
    }

    fn parse_term(&mut self) -> ParseResult<Expression> {
        self.parse_binary_level(
            |kind| match kind {
                TokenKind::Plus => Some(BinaryOperator::Add),
                TokenKind::Minus => Some(BinaryOperator::Sub),
                _ => None,
            },
            Self::parse_factor,
        )
    }

    fn parse_factor(&mut self) -> ParseResult<Expression> {
        self.parse_binary_level(
            |kind| match kind {
                TokenKind::Star => Some(BinaryOperator::Mul),
                TokenKind::Slash => Some(BinaryOperator::Div),
                TokenKind::Percent => Some(BinaryOperator::Mod),
                _ => None,
            },
            Self::parse_unary,
        )
    }

    fn parse_binary_level(
        &mut self,
        operator_for: fn(&TokenKind) -> Option<BinaryOperator>,
        next: fn(&mut Self) -> ParseResult<Expression>,
    ) -> ParseResult<Expression> {
        let mut expr = next(self)?;
        while let Some(op) = operator_for(&self.current().kind) {
            self.advance();
            let right = next(self)?;
            expr = Expression::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        let span = self.current().span;
        let op = match self.current().kind {
            TokenKind::Minus => UnaryOperator::Negate,
            TokenKind::Bang => UnaryOperator::Not,
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = if self.check(&TokenKind::PlusPlus) {
                    StepOperator::Increment
                } else {
                    StepOperator::Decrement
                };
                self.advance();
                let target = self.nested(Self::parse_unary)?;
                if !target.is_lvalue() {
                    return Err(SyntaxError::InvalidAssignmentTarget {
                        line: span.line,
                        column: span.column,
                    });
                }
                return Ok(Expression::Step {
                    target: Box::new(target),
                    op,
                    postfix: false,
                });
            }
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.nested(Self::parse_unary)?;
        Ok(Expression::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_postfix(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.current().kind {
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RBracket)?;
                    expr = Expression::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_identifier()?;
                    let args = if self.eat(&TokenKind::LParen) {
                        Some(self.parse_arguments()?)
                    } else {
                        None
                    };
                    expr = Expression::Member {
                        object: Box::new(expr),
                        name,
                        args,
                    };
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    // A postfix step ends the chain: `x++++` is rejected by the caller.
                    if !expr.is_lvalue() {
                        return Err(self.invalid_target());
                    }
                    let op = if self.check(&TokenKind::PlusPlus) {
                        StepOperator::Increment
                    } else {
                        StepOperator::Decrement
                    };
                    self.advance();
                    return Ok(Expression::Step {
                        target: Box::new(expr),
                        op,
                        postfix: true,
                    });
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let expr = match &self.current().kind {
            TokenKind::Number(value) => Expression::Literal(Literal::Number(*value)),
            TokenKind::String(value) => Expression::Literal(Literal::String(value.clone())),
            TokenKind::True => Expression::Literal(Literal::Boolean(true)),
            TokenKind::False => Expression::Literal(Literal::Boolean(false)),
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                return Ok(expr);
            }
            TokenKind::LBrace => return self.parse_array(),
            TokenKind::New => {
                self.advance();
                let type_name = self.expect_identifier()?;
                self.expect(TokenKind::LParen)?;
                let args = self.parse_arguments()?;
                return Ok(Expression::New { type_name, args });
            }
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                if self.eat(&TokenKind::LParen) {
                    let args = self.parse_arguments()?;
                    return Ok(Expression::Call { name, args });
                }
                return Ok(Expression::Variable(name));
            }
            _ => return Err(self.unexpected("expression")),
        };
        self.advance();
        Ok(expr)
    }

    fn parse_array(&mut self) -> ParseResult<Expression> {
        self.expect(TokenKind::LBrace)?;
        let mut elements = Vec::new();
        if self.eat(&TokenKind::RBrace) {
            return Ok(Expression::Array(elements));
        }
        loop {
            elements.push(self.parse_expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
            self.reject_trailing_comma(&TokenKind::RBrace, "'}'")?;
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Expression::Array(elements))
    }

    /// Comma-separated arguments after an opening `(`, including the `)`.
    fn parse_arguments(&mut self) -> ParseResult<Vec<Expression>> {
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
            self.reject_trailing_comma(&TokenKind::RParen, "')'")?;
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    fn reject_trailing_comma(
        &self,
        closing_kind: &TokenKind,
        closing: &'static str,
    ) -> ParseResult<()> {
        if self.check(closing_kind) {
            let span = self.current().span;
            return Err(SyntaxError::TrailingComma {
                closing,
                line: span.line,
                column: span.column,
            });
        }
        Ok(())
    }

    fn nested<T>(&mut self, parse: fn(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            let span = self.current().span;
            return Err(SyntaxError::NestingTooDeep {
                limit: MAX_NESTING,
                line: span.line,
                column: span.column,
            });
        }
        self.depth += 1;
        let result = stack::ensure_sufficient_stack(|| parse(self));
        self.depth -= 1;
        result
    }

    fn current(&self) -> &Token {
        // `new` guarantees a trailing EOF and `advance` never moves past it.
        &self.tokens[self.position]
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Span> {
        if self.check(&kind) {
            let span = self.current().span;
            self.advance();
            Ok(span)
        } else {
            Err(self.unexpected(&kind.describe()))
        }
    }

    fn expect_identifier(&mut self) -> ParseResult<String> {
        if let TokenKind::Identifier(name) = &self.current().kind {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let token = self.current();
        SyntaxError::UnexpectedToken {
            expected: expected.to_string(),
            found: token.kind.describe(),
            line: token.span.line,
            column: token.span.column,
        }
    }

    fn invalid_target(&self) -> SyntaxError {
        let span = self.current().span;
        SyntaxError::InvalidAssignmentTarget {
            line: span.line,
            column: span.column,
        }
    }
}

pub fn parse_tokens(tokens: Vec<Token>) -> ParseResult<Program> {
    let program = Parser::new(tokens).parse_program()?;
    debug!(statements = program.statements.len(), "parsed program");
    Ok(program)
}
