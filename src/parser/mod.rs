//! Parser for the Luria language
//!
//! A recursive descent parser that produces an AST from a token stream.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! program     → declaration* EOF
//! declaration → varDecl | funDecl | statement
//! statement   → exprStmt | printStmt | ifStmt | whileStmt | returnStmt
//!             | readStmt | block
//! expression  → assignment
//! assignment  → ( IDENT | call "[" expression "]" ) "=" assignment | or
//! or          → and ( "or" and )*
//! and         → equality ( "and" equality )*
//! equality    → comparison ( ( "!=" | "==" ) comparison )*
//! comparison  → term ( ( ">" | ">=" | "<" | "<=" ) term )*
//! term        → factor ( ( "-" | "+" ) factor )*
//! factor      → power ( ( "/" | "*" | "%" ) power )*
//! power       → unary ( "^" unary )*
//! unary       → ( "!" | "-" ) unary | call
//! call        → primary ( "(" arguments? ")" | "[" expression "]" )*
//! primary     → "true" | "false" | "null" | NUMBER | STRING | IDENT
//!             | "(" expression ")" | "[" arguments? "]"
//! ```
//!
//! Syntax errors are recorded as diagnostics. The parser then skips to the
//! next statement boundary and carries on, so one pass reports every
//! independent error.

use std::rc::Rc;

use crate::ast::*;
use crate::diagnostics::Diagnostic;
use crate::lexer::{Token, TokenKind, TokenLiteral};

/// Output of the parser
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    pub program: Program,
    pub diagnostics: Vec<Diagnostic>,
}

impl Parsed {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Parse a token stream into a program
pub fn parse(tokens: &[Token]) -> Parsed {
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program();
    tracing::debug!(
        statements = program.statements.len(),
        errors = parser.diagnostics.len(),
        "parsed program"
    );
    Parsed {
        program,
        diagnostics: parser.diagnostics,
    }
}

/// Marker for "a diagnostic was recorded, unwind to the recovery point"
#[derive(Debug)]
struct ParseError;

type PResult<T> = Result<T, ParseError>;

/// Parser state
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    eof: Token,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        // Streams from `lex` always end in EOF; this covers hand-built ones.
        let eof = tokens
            .last()
            .map(|t| Token::eof(t.span.end, t.line))
            .unwrap_or_else(|| Token::eof(0, 1));
        Self {
            tokens,
            pos: 0,
            diagnostics: Vec::new(),
            eof,
        }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn previous(&self) -> &Token {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .unwrap_or(&self.eof)
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek())
    }

    fn at_end(&self) -> bool {
        self.at(TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        if !self.at_end() {
            self.pos += 1;
        }
        self.previous().clone()
    }

    /// Consume the current token if it is one of `kinds`
    fn eat(&mut self, kinds: &[TokenKind]) -> Option<Token> {
        if self.at_any(kinds) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> PResult<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            let found = self.current().clone();
            Err(self.error(&found, message))
        }
    }

    fn error(&mut self, token: &Token, message: &str) -> ParseError {
        tracing::trace!(line = token.line, lexeme = %token.lexeme, reason = message, "syntax error");
        self.diagnostics.push(Diagnostic::syntax(token, message));
        ParseError
    }

    /// Discard tokens up to a likely statement boundary
    fn synchronize(&mut self) {
        self.advance();
        while !self.at_end() {
            if self.previous().kind == TokenKind::Semi {
                return;
            }
            if self.peek().starts_statement() {
                return;
            }
            self.advance();
        }
    }

    // ==================== PROGRAM ====================

    fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        Program { statements }
    }

    // ==================== DECLARATIONS ====================

    /// Recovery point: a broken declaration yields `None`
    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.eat(&[TokenKind::Variable]).is_some() {
            self.parse_variable()
        } else if self.eat(&[TokenKind::Function]).is_some() {
            self.parse_function()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(ParseError) => {
                self.synchronize();
                None
            }
        }
    }

    fn parse_variable(&mut self) -> PResult<Stmt> {
        let name = self.expect(TokenKind::Identifier, "Expected variable name.")?;
        let init = if self.eat(&[TokenKind::Eq]).is_some() {
            Some(self.expression()?)
        } else {
            None
        };
        self.expect(
            TokenKind::Semi,
            "Expected ';' after variable declaration.",
        )?;
        Ok(Stmt::Variable { name, init })
    }

    fn parse_function(&mut self) -> PResult<Stmt> {
        let name = self.expect(TokenKind::Identifier, "Expected function name.")?;
        self.expect(TokenKind::LParen, "Expected '(' after function name.")?;

        let mut params = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                params.push(self.expect(TokenKind::Identifier, "Expected parameter name.")?);
                if self.eat(&[TokenKind::Comma]).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "Expected ')' after parameters.")?;
        self.expect(TokenKind::LBrace, "Expected '{' before function body.")?;
        let body = self.block()?;

        Ok(Stmt::Function(Rc::new(FunctionDecl { name, params, body })))
    }

    // ==================== STATEMENTS ====================

    fn statement(&mut self) -> PResult<Stmt> {
        match self.peek() {
            TokenKind::If => {
                self.advance();
                self.if_statement()
            }
            TokenKind::While => {
                self.advance();
                self.while_statement()
            }
            TokenKind::Print => {
                let keyword = self.advance();
                let value = self.expression()?;
                self.expect(TokenKind::Semi, "Expected ';' after value.")?;
                Ok(Stmt::Print { keyword, value })
            }
            TokenKind::Return => {
                let keyword = self.advance();
                self.return_statement(keyword)
            }
            TokenKind::ReadNumber => {
                let keyword = self.advance();
                self.read_statement(ReadKind::Number, keyword)
            }
            TokenKind::ReadString => {
                let keyword = self.advance();
                self.read_statement(ReadKind::String, keyword)
            }
            TokenKind::ReadBoolean => {
                let keyword = self.advance();
                self.read_statement(ReadKind::Boolean, keyword)
            }
            TokenKind::LBrace => {
                self.advance();
                Ok(Stmt::Block(self.block()?))
            }
            _ => {
                let expr = self.expression()?;
                self.expect(TokenKind::Semi, "Expected ';' after expression.")?;
                Ok(Stmt::Expression(expr))
            }
        }
    }

    /// `else` binds to the nearest `if`
    fn if_statement(&mut self) -> PResult<Stmt> {
        self.expect(TokenKind::LParen, "Expected '(' after 'if'.")?;
        let condition = self.expression()?;
        self.expect(TokenKind::RParen, "Expected ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.eat(&[TokenKind::Else]).is_some() {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> PResult<Stmt> {
        self.expect(TokenKind::LParen, "Expected '(' after 'while'.")?;
        let condition = self.expression()?;
        self.expect(TokenKind::RParen, "Expected ')' after condition.")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { condition, body })
    }

    fn return_statement(&mut self, keyword: Token) -> PResult<Stmt> {
        let value = if self.at(TokenKind::Semi) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenKind::Semi, "Expected ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn read_statement(&mut self, kind: ReadKind, keyword: Token) -> PResult<Stmt> {
        let target = self.expression()?;
        self.expect(TokenKind::Semi, "Expected ';' after read target.")?;
        Ok(Stmt::Read {
            kind,
            keyword,
            target,
        })
    }

    /// Statements up to the closing brace; the opening one is already consumed
    fn block(&mut self) -> PResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at_end() {
            if let Some(stmt) = self.declaration() {
                stmts.push(stmt);
            }
        }
        self.expect(TokenKind::RBrace, "Expected '}' after block.")?;
        Ok(stmts)
    }

    // ==================== EXPRESSIONS ====================

    fn expression(&mut self) -> PResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> PResult<Expr> {
        let expr = self.or()?;

        let Some(equals) = self.eat(&[TokenKind::Eq]) else {
            return Ok(expr);
        };
        // Right-associative: `a = b = c` assigns `c` to both.
        let value = Box::new(self.assignment()?);

        match expr {
            Expr::Variable { name } => Ok(Expr::Assign { name, value }),
            Expr::Index {
                object,
                index,
                bracket,
            } => Ok(Expr::IndexAssign {
                object,
                index,
                value,
                bracket,
            }),
            other => {
                // Recorded but not unwound: the statement still parses.
                self.error(&equals, "Invalid assignment target.");
                Ok(other)
            }
        }
    }

    fn or(&mut self) -> PResult<Expr> {
        let mut expr = self.and()?;
        while self.eat(&[TokenKind::Or]).is_some() {
            let right = self.and()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op: LogicalOp::Or,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn and(&mut self) -> PResult<Expr> {
        let mut expr = self.equality()?;
        while self.eat(&[TokenKind::And]).is_some() {
            let right = self.equality()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op: LogicalOp::And,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> PResult<Expr> {
        self.binary_level(&[TokenKind::Ne, TokenKind::EqEq], Self::comparison)
    }

    fn comparison(&mut self) -> PResult<Expr> {
        self.binary_level(
            &[TokenKind::Gt, TokenKind::Ge, TokenKind::Lt, TokenKind::Le],
            Self::term,
        )
    }

    fn term(&mut self) -> PResult<Expr> {
        self.binary_level(&[TokenKind::Plus, TokenKind::Minus], Self::factor)
    }

    fn factor(&mut self) -> PResult<Expr> {
        self.binary_level(
            &[TokenKind::Slash, TokenKind::Star, TokenKind::Percent],
            Self::power,
        )
    }

    fn power(&mut self) -> PResult<Expr> {
        self.binary_level(&[TokenKind::Caret], Self::unary)
    }

    /// One left-associative precedence level
    fn binary_level(
        &mut self,
        operators: &[TokenKind],
        operand: fn(&mut Self) -> PResult<Expr>,
    ) -> PResult<Expr> {
        let mut expr = operand(self)?;
        while let Some(token) = self.eat(operators) {
            let right = operand(self)?;
            let Some(op) = binary_op(token.kind) else {
                return Err(self.error(&token, "Expected binary operator."));
            };
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
                span: token.span,
            };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> PResult<Expr> {
        let op = match self.peek() {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.call(),
        };
        let token = self.advance();
        let operand = self.unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
            span: token.span,
        })
    }

    fn call(&mut self) -> PResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if self.eat(&[TokenKind::LParen]).is_some() {
                let args = self.arguments(TokenKind::RParen)?;
                let paren = self.expect(TokenKind::RParen, "Expected ')' after arguments.")?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    paren,
                };
            } else if self.eat(&[TokenKind::LBracket]).is_some() {
                let index = self.expression()?;
                let bracket = self.expect(TokenKind::RBracket, "Expected ']' after index.")?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                    bracket,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Comma-separated expressions, possibly none, up to `close` (not consumed)
    fn arguments(&mut self, close: TokenKind) -> PResult<Vec<Expr>> {
        let mut args = Vec::new();
        if !self.at(close) {
            loop {
                args.push(self.expression()?);
                if self.eat(&[TokenKind::Comma]).is_none() {
                    break;
                }
            }
        }
        Ok(args)
    }

    fn primary(&mut self) -> PResult<Expr> {
        let token = self.current().clone();
        let literal = match token.kind {
            TokenKind::False => Some(Literal::Bool(false)),
            TokenKind::True => Some(Literal::Bool(true)),
            TokenKind::Null => Some(Literal::Null),
            TokenKind::Number | TokenKind::String => match &token.literal {
                Some(TokenLiteral::Number(n)) => Some(Literal::Number(*n)),
                Some(TokenLiteral::String(s)) => Some(Literal::String(s.clone())),
                None => None,
            },
            _ => None,
        };
        if let Some(value) = literal {
            self.advance();
            return Ok(Expr::Literal { value });
        }

        match token.kind {
            TokenKind::Identifier => {
                let name = self.advance();
                Ok(Expr::Variable { name })
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.expect(TokenKind::RParen, "Expected ')' after expression.")?;
                Ok(Expr::Grouping {
                    inner: Box::new(inner),
                })
            }
            TokenKind::LBracket => {
                self.advance();
                let elements = self.arguments(TokenKind::RBracket)?;
                self.expect(TokenKind::RBracket, "Expected ']' after array elements.")?;
                Ok(Expr::Array { elements })
            }
            _ => Err(self.error(&token, "Expected expression.")),
        }
    }
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        TokenKind::Caret => BinaryOp::Pow,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::Ne => BinaryOp::Ne,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Le => BinaryOp::Le,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::Ge => BinaryOp::Ge,
        _ => return None,
    };
    Some(op)
}
