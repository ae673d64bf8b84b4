//! Recursive-descent JavaScript parser with Pratt-style operator-precedence
//! climbing for expressions.
//!
//! Parses a token stream into an AST (Abstract Syntax Tree). Every statement
//! and expression is produced with its [`Span`] attached. Failures are fatal
//! — the parser returns the first `SyntaxError` it hits rather than
//! recovering and re-synchronizing.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use alloc::vec;

use crate::token::{Token, TokenKind, Span};
use crate::ast::*;
use crate::error::JsError;

type PResult<T> = Result<T, JsError>;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    pub fn parse_program(&mut self) -> PResult<Program> {
        let mut body = Vec::new();
        while !self.at_end() {
            body.push(self.parse_statement()?);
        }
        Ok(Program { body, kind: ProgramKind::Script })
    }

    pub fn parse_module(&mut self) -> PResult<Program> {
        let mut body = Vec::new();
        while !self.at_end() {
            body.push(self.parse_statement()?);
        }
        Ok(Program { body, kind: ProgramKind::Module })
    }

    // ---- token helpers -------------------------------------------------

    fn peek(&self) -> &TokenKind {
        if self.pos < self.tokens.len() { &self.tokens[self.pos].kind } else { &TokenKind::Eof }
    }

    fn peek2(&self) -> &TokenKind {
        if self.pos + 1 < self.tokens.len() { &self.tokens[self.pos + 1].kind } else { &TokenKind::Eof }
    }

    fn span(&self) -> Span {
        if self.pos < self.tokens.len() { self.tokens[self.pos].span } else {
            self.tokens.last().map(|t| t.span).unwrap_or(Span::new(0, 0, 1, 1))
        }
    }

    fn prev_span(&self) -> Span {
        if self.pos == 0 { self.span() } else { self.tokens[self.pos - 1].span }
    }

    fn at_end(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() { self.pos += 1; }
        tok
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if core::mem::discriminant(self.peek()) == core::mem::discriminant(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> PResult<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(JsError::syntax(alloc::format!("expected {}", what), self.span()))
        }
    }

    fn unexpected(&self, what: &str) -> JsError {
        JsError::syntax(alloc::format!("unexpected token, expected {}", what), self.span())
    }

    fn eat_semicolon(&mut self) {
        self.eat(&TokenKind::Semicolon);
    }

    fn ident_str(&mut self) -> PResult<String> {
        match self.peek().clone() {
            TokenKind::Ident(s) => { self.pos += 1; Ok(s) }
            // contextual keywords usable as identifiers
            TokenKind::Of => { self.pos += 1; Ok("of".to_string()) }
            TokenKind::As => { self.pos += 1; Ok("as".to_string()) }
            TokenKind::From => { self.pos += 1; Ok("from".to_string()) }
            TokenKind::Async => { self.pos += 1; Ok("async".to_string()) }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    fn is_ident(&self, s: &str) -> bool {
        matches!(self.peek(), TokenKind::Ident(x) if x == s)
    }

    fn binding_ident(&mut self) -> PResult<String> {
        self.ident_str()
    }

    // ---- statements ------------------------------------------------------

    fn parse_statement(&mut self) -> PResult<Stmt> {
        let start = self.span();
        let kind = self.parse_statement_kind()?;
        let end = self.prev_span();
        Ok(Stmt::new(kind, join(start, end)))
    }

    fn parse_statement_kind(&mut self) -> PResult<StmtKind> {
        match self.peek().clone() {
            TokenKind::Semicolon => { self.pos += 1; Ok(StmtKind::Empty) }
            TokenKind::LBrace => self.parse_block_stmt(),
            TokenKind::Var | TokenKind::Let | TokenKind::Const => self.parse_var_decl(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => self.parse_break(),
            TokenKind::Continue => self.parse_continue(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Throw => self.parse_throw(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Function => {
                self.pos += 1;
                self.parse_function_decl(false)
            }
            TokenKind::Async if matches!(self.peek2(), TokenKind::Function) => {
                self.pos += 2;
                self.parse_function_decl(true)
            }
            TokenKind::Class => self.parse_class_decl(),
            TokenKind::Import if !matches!(self.peek2(), TokenKind::LParen | TokenKind::Dot) => self.parse_import(),
            TokenKind::Export => self.parse_export(),
            TokenKind::Debugger => {
                self.pos += 1;
                self.eat_semicolon();
                Ok(StmtKind::Debugger)
            }
            TokenKind::Ident(_) if matches!(self.peek2(), TokenKind::Colon) => {
                let label = self.ident_str()?;
                self.pos += 1; // colon
                let body = Box::new(self.parse_statement()?);
                Ok(StmtKind::Labeled { label, body })
            }
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_block_stmt(&mut self) -> PResult<StmtKind> {
        self.expect(&TokenKind::LBrace, "'{'")?;
        let stmts = self.parse_block_body()?;
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(StmtKind::Block(stmts))
    }

    fn parse_block_body(&mut self) -> PResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !matches!(self.peek(), TokenKind::RBrace | TokenKind::Eof) {
            stmts.push(self.parse_statement()?);
        }
        Ok(stmts)
    }

    fn parse_var_kind(&mut self) -> VarKind {
        match self.peek() {
            TokenKind::Var => { self.pos += 1; VarKind::Var }
            TokenKind::Let => { self.pos += 1; VarKind::Let }
            _ => { self.pos += 1; VarKind::Const }
        }
    }

    fn parse_var_decl(&mut self) -> PResult<StmtKind> {
        let kind = self.parse_var_kind();
        let decls = self.parse_var_declarators()?;
        self.eat_semicolon();
        Ok(StmtKind::VarDecl { kind, decls })
    }

    fn parse_var_declarators(&mut self) -> PResult<Vec<VarDeclarator>> {
        let mut decls = Vec::new();
        loop {
            let name = self.parse_binding_pattern()?;
            let init = if self.eat(&TokenKind::Eq) { Some(self.parse_assignment_expr()?) } else { None };
            decls.push(VarDeclarator { name, init });
            if !self.eat(&TokenKind::Comma) { break; }
        }
        Ok(decls)
    }

    fn parse_binding_pattern(&mut self) -> PResult<Pattern> {
        match self.peek() {
            TokenKind::LBracket => self.parse_array_pattern(),
            TokenKind::LBrace => self.parse_object_pattern(),
            _ => Ok(Pattern::Ident(self.binding_ident()?)),
        }
    }

    fn parse_array_pattern(&mut self) -> PResult<Pattern> {
        self.expect(&TokenKind::LBracket, "'['")?;
        let mut elements = Vec::new();
        while !matches!(self.peek(), TokenKind::RBracket | TokenKind::Eof) {
            if self.eat(&TokenKind::Comma) { elements.push(None); continue; }
            if self.eat(&TokenKind::DotDotDot) {
                let inner = self.parse_binding_pattern()?;
                elements.push(Some(Pattern::Rest(Box::new(inner))));
            } else {
                let pat = self.parse_binding_pattern()?;
                let pat = if self.eat(&TokenKind::Eq) {
                    let def = self.parse_assignment_expr()?;
                    Pattern::Assign(Box::new(pat), Box::new(def))
                } else { pat };
                elements.push(Some(pat));
            }
            if !self.eat(&TokenKind::Comma) { break; }
        }
        self.expect(&TokenKind::RBracket, "']'")?;
        Ok(Pattern::Array(elements))
    }

    fn parse_object_pattern(&mut self) -> PResult<Pattern> {
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut props = Vec::new();
        while !matches!(self.peek(), TokenKind::RBrace | TokenKind::Eof) {
            if self.eat(&TokenKind::DotDotDot) {
                let inner = self.binding_ident()?;
                props.push(ObjPatProp { key: inner.clone(), value: Pattern::Rest(Box::new(Pattern::Ident(inner))), computed: false });
                break;
            }
            let computed = matches!(self.peek(), TokenKind::LBracket);
            let key = if computed {
                self.pos += 1;
                let e = self.parse_assignment_expr()?;
                self.expect(&TokenKind::RBracket, "']'")?;
                let _ = e; // computed pattern keys resolved at destructure time by the compiler
                String::new()
            } else {
                self.property_name_str()?
            };
            let value = if self.eat(&TokenKind::Colon) {
                self.parse_binding_pattern()?
            } else {
                Pattern::Ident(key.clone())
            };
            let value = if self.eat(&TokenKind::Eq) {
                let def = self.parse_assignment_expr()?;
                Pattern::Assign(Box::new(value), Box::new(def))
            } else { value };
            props.push(ObjPatProp { key, value, computed });
            if !self.eat(&TokenKind::Comma) { break; }
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(Pattern::Object(props))
    }

    fn property_name_str(&mut self) -> PResult<String> {
        match self.peek().clone() {
            TokenKind::Ident(s) => { self.pos += 1; Ok(s) }
            TokenKind::String(s) => { self.pos += 1; Ok(s) }
            TokenKind::Number(n) => { self.pos += 1; Ok(crate::value::format_number(n)) }
            _ => self.ident_str(),
        }
    }

    fn parse_if(&mut self) -> PResult<StmtKind> {
        self.pos += 1;
        self.expect(&TokenKind::LParen, "'('")?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "')'")?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.eat(&TokenKind::Else) { Some(Box::new(self.parse_statement()?)) } else { None };
        Ok(StmtKind::If { condition, consequent, alternate })
    }

    fn parse_while(&mut self) -> PResult<StmtKind> {
        self.pos += 1;
        self.expect(&TokenKind::LParen, "'('")?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "')'")?;
        let body = Box::new(self.parse_statement()?);
        Ok(StmtKind::While { condition, body })
    }

    fn parse_do_while(&mut self) -> PResult<StmtKind> {
        self.pos += 1;
        let body = Box::new(self.parse_statement()?);
        self.expect(&TokenKind::While, "'while'")?;
        self.expect(&TokenKind::LParen, "'('")?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "')'")?;
        self.eat_semicolon();
        Ok(StmtKind::DoWhile { body, condition })
    }

    fn parse_for(&mut self) -> PResult<StmtKind> {
        self.pos += 1;
        let is_await = self.eat(&TokenKind::Await);
        self.expect(&TokenKind::LParen, "'('")?;

        if matches!(self.peek(), TokenKind::Var | TokenKind::Let | TokenKind::Const) {
            let kind = self.parse_var_kind();
            let name = self.parse_binding_pattern()?;
            if self.eat(&TokenKind::In) {
                let right = self.parse_expression()?;
                self.expect(&TokenKind::RParen, "')'")?;
                let body = Box::new(self.parse_statement()?);
                return Ok(StmtKind::ForIn {
                    left: Box::new(ForInit::VarDecl { kind, decls: vec![VarDeclarator { name, init: None }] }),
                    right, body,
                });
            }
            if self.eat(&TokenKind::Of) {
                let right = self.parse_assignment_expr()?;
                self.expect(&TokenKind::RParen, "')'")?;
                let body = Box::new(self.parse_statement()?);
                return Ok(StmtKind::ForOf {
                    left: Box::new(ForInit::VarDecl { kind, decls: vec![VarDeclarator { name, init: None }] }),
                    right, body, is_await,
                });
            }
            let init_val = if self.eat(&TokenKind::Eq) { Some(self.parse_assignment_expr()?) } else { None };
            let mut decls = vec![VarDeclarator { name, init: init_val }];
            while self.eat(&TokenKind::Comma) {
                let n = self.parse_binding_pattern()?;
                let i = if self.eat(&TokenKind::Eq) { Some(self.parse_assignment_expr()?) } else { None };
                decls.push(VarDeclarator { name: n, init: i });
            }
            self.expect(&TokenKind::Semicolon, "';'")?;
            let test = if !matches!(self.peek(), TokenKind::Semicolon) { Some(self.parse_expression()?) } else { None };
            self.expect(&TokenKind::Semicolon, "';'")?;
            let update = if !matches!(self.peek(), TokenKind::RParen) { Some(self.parse_expression()?) } else { None };
            self.expect(&TokenKind::RParen, "')'")?;
            let body = Box::new(self.parse_statement()?);
            return Ok(StmtKind::For { init: Some(Box::new(ForInit::VarDecl { kind, decls })), test, update, body });
        }

        if matches!(self.peek(), TokenKind::Semicolon) {
            self.pos += 1;
            let test = if !matches!(self.peek(), TokenKind::Semicolon) { Some(self.parse_expression()?) } else { None };
            self.expect(&TokenKind::Semicolon, "';'")?;
            let update = if !matches!(self.peek(), TokenKind::RParen) { Some(self.parse_expression()?) } else { None };
            self.expect(&TokenKind::RParen, "')'")?;
            let body = Box::new(self.parse_statement()?);
            return Ok(StmtKind::For { init: None, test, update, body });
        }

        let expr = self.parse_expression()?;
        if self.eat(&TokenKind::In) {
            let right = self.parse_expression()?;
            self.expect(&TokenKind::RParen, "')'")?;
            let body = Box::new(self.parse_statement()?);
            return Ok(StmtKind::ForIn { left: Box::new(ForInit::Expr(expr)), right, body });
        }
        if self.eat(&TokenKind::Of) {
            let right = self.parse_assignment_expr()?;
            self.expect(&TokenKind::RParen, "')'")?;
            let body = Box::new(self.parse_statement()?);
            return Ok(StmtKind::ForOf { left: Box::new(ForInit::Expr(expr)), right, body, is_await });
        }
        self.expect(&TokenKind::Semicolon, "';'")?;
        let test = if !matches!(self.peek(), TokenKind::Semicolon) { Some(self.parse_expression()?) } else { None };
        self.expect(&TokenKind::Semicolon, "';'")?;
        let update = if !matches!(self.peek(), TokenKind::RParen) { Some(self.parse_expression()?) } else { None };
        self.expect(&TokenKind::RParen, "')'")?;
        let body = Box::new(self.parse_statement()?);
        Ok(StmtKind::For { init: Some(Box::new(ForInit::Expr(expr))), test, update, body })
    }

    fn parse_return(&mut self) -> PResult<StmtKind> {
        self.pos += 1;
        let no_value = matches!(self.peek(), TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof)
            || (self.pos < self.tokens.len() && self.tokens[self.pos].preceded_by_line_terminator);
        let value = if no_value { None } else { Some(self.parse_expression()?) };
        self.eat_semicolon();
        Ok(StmtKind::Return(value))
    }

    fn parse_break(&mut self) -> PResult<StmtKind> {
        self.pos += 1;
        let label = if let TokenKind::Ident(s) = self.peek().clone() {
            if !self.tokens[self.pos].preceded_by_line_terminator { self.pos += 1; Some(s) } else { None }
        } else { None };
        self.eat_semicolon();
        Ok(StmtKind::Break(label))
    }

    fn parse_continue(&mut self) -> PResult<StmtKind> {
        self.pos += 1;
        let label = if let TokenKind::Ident(s) = self.peek().clone() {
            if !self.tokens[self.pos].preceded_by_line_terminator { self.pos += 1; Some(s) } else { None }
        } else { None };
        self.eat_semicolon();
        Ok(StmtKind::Continue(label))
    }

    fn parse_switch(&mut self) -> PResult<StmtKind> {
        self.pos += 1;
        self.expect(&TokenKind::LParen, "'('")?;
        let discriminant = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "')'")?;
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut cases = Vec::new();
        while !matches!(self.peek(), TokenKind::RBrace | TokenKind::Eof) {
            let test = if self.eat(&TokenKind::Case) {
                let e = self.parse_expression()?;
                self.expect(&TokenKind::Colon, "':'")?;
                Some(e)
            } else {
                self.expect(&TokenKind::Default, "'case' or 'default'")?;
                self.expect(&TokenKind::Colon, "':'")?;
                None
            };
            let mut consequent = Vec::new();
            while !matches!(self.peek(), TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof) {
                consequent.push(self.parse_statement()?);
            }
            cases.push(SwitchCase { test, consequent });
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(StmtKind::Switch { discriminant, cases })
    }

    fn parse_throw(&mut self) -> PResult<StmtKind> {
        self.pos += 1;
        let value = self.parse_expression()?;
        self.eat_semicolon();
        Ok(StmtKind::Throw(value))
    }

    fn parse_try(&mut self) -> PResult<StmtKind> {
        self.pos += 1;
        self.expect(&TokenKind::LBrace, "'{'")?;
        let block = self.parse_block_body()?;
        self.expect(&TokenKind::RBrace, "'}'")?;

        let catch = if self.eat(&TokenKind::Catch) {
            let param = if self.eat(&TokenKind::LParen) {
                let p = self.parse_binding_pattern()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Some(p)
            } else { None };
            self.expect(&TokenKind::LBrace, "'{'")?;
            let body = self.parse_block_body()?;
            self.expect(&TokenKind::RBrace, "'}'")?;
            Some(CatchClause { param, body })
        } else { None };

        let finally = if self.eat(&TokenKind::Finally) {
            self.expect(&TokenKind::LBrace, "'{'")?;
            let body = self.parse_block_body()?;
            self.expect(&TokenKind::RBrace, "'}'")?;
            Some(body)
        } else { None };

        Ok(StmtKind::Try { block, catch, finally })
    }

    fn parse_function_decl(&mut self, is_async: bool) -> PResult<StmtKind> {
        let is_generator = self.eat(&TokenKind::Star);
        let name = self.binding_ident()?;
        let params = self.parse_param_list()?;
        self.expect(&TokenKind::LBrace, "'{'")?;
        let body = self.parse_block_body()?;
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(StmtKind::FunctionDecl { name, params, body, is_async, is_generator })
    }

    fn parse_param_list(&mut self) -> PResult<Vec<Param>> {
        self.expect(&TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        while !matches!(self.peek(), TokenKind::RParen | TokenKind::Eof) {
            let is_rest = self.eat(&TokenKind::DotDotDot);
            let pattern = self.parse_binding_pattern()?;
            let default = if self.eat(&TokenKind::Eq) { Some(self.parse_assignment_expr()?) } else { None };
            params.push(Param { pattern, default, is_rest });
            if !self.eat(&TokenKind::Comma) { break; }
        }
        self.expect(&TokenKind::RParen, "')'")?;
        Ok(params)
    }

    fn parse_class_decl(&mut self) -> PResult<StmtKind> {
        self.pos += 1;
        let name = self.binding_ident()?;
        let super_class = if self.eat(&TokenKind::Extends) { Some(self.parse_lhs_expr()?) } else { None };
        let body = self.parse_class_body()?;
        Ok(StmtKind::ClassDecl { name, super_class, body })
    }

    fn parse_class_body(&mut self) -> PResult<Vec<ClassMember>> {
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut members = Vec::new();
        while !matches!(self.peek(), TokenKind::RBrace | TokenKind::Eof) {
            if self.eat(&TokenKind::Semicolon) { continue; }
            members.push(self.parse_class_member()?);
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(members)
    }

    fn parse_class_member(&mut self) -> PResult<ClassMember> {
        let is_static = matches!(self.peek(), TokenKind::Ident(s) if s == "static") && !matches!(self.peek2(), TokenKind::LParen | TokenKind::Eq);
        if is_static { self.pos += 1; }

        let mut is_async = false;
        let mut is_generator = false;
        let mut prop_kind = PropKind::Method;

        if matches!(self.peek(), TokenKind::Async) && !matches!(self.peek2(), TokenKind::LParen | TokenKind::Eq) {
            is_async = true;
            self.pos += 1;
        }
        if self.eat(&TokenKind::Star) {
            is_generator = true;
        }
        if self.is_ident("get") && !matches!(self.peek2(), TokenKind::LParen | TokenKind::Eq) {
            prop_kind = PropKind::Get;
            self.pos += 1;
        } else if self.is_ident("set") && !matches!(self.peek2(), TokenKind::LParen | TokenKind::Eq) {
            prop_kind = PropKind::Set;
            self.pos += 1;
        }

        let key = self.parse_property_key()?;
        let is_ctor = matches!(&key, PropKey::Ident(n) if n == "constructor");

        if matches!(self.peek(), TokenKind::LParen) {
            let params = self.parse_param_list()?;
            self.expect(&TokenKind::LBrace, "'{'")?;
            let body = self.parse_block_body()?;
            self.expect(&TokenKind::RBrace, "'}'")?;
            if is_ctor && !is_static {
                return Ok(ClassMember { key, kind: ClassMemberKind::Constructor { params, body }, is_static });
            }
            return Ok(ClassMember { key, kind: ClassMemberKind::Method { params, body, is_async, is_generator, prop_kind }, is_static });
        }

        // field declaration, optionally with an initializer
        let value = if self.eat(&TokenKind::Eq) { Some(self.parse_assignment_expr()?) } else { None };
        self.eat_semicolon();
        Ok(ClassMember { key, kind: ClassMemberKind::Property { value }, is_static })
    }

    fn parse_property_key(&mut self) -> PResult<PropKey> {
        match self.peek().clone() {
            TokenKind::LBracket => {
                self.pos += 1;
                let e = self.parse_assignment_expr()?;
                self.expect(&TokenKind::RBracket, "']'")?;
                Ok(PropKey::Computed(Box::new(e)))
            }
            TokenKind::String(s) => { self.pos += 1; Ok(PropKey::String(s)) }
            TokenKind::Number(n) => { self.pos += 1; Ok(PropKey::Number(n)) }
            TokenKind::PrivateName(n) => { self.pos += 1; Ok(PropKey::Private(n)) }
            _ => Ok(PropKey::Ident(self.ident_str()?)),
        }
    }

    fn parse_import(&mut self) -> PResult<StmtKind> {
        self.pos += 1; // import
        if let TokenKind::String(spec) = self.peek().clone() {
            self.pos += 1;
            self.eat_semicolon();
            return Ok(StmtKind::Import(ImportDeclaration { specifier: spec, default: None, namespace: None, named: Vec::new() }));
        }

        let mut default = None;
        let mut namespace = None;
        let mut named = Vec::new();

        if let TokenKind::Ident(_) = self.peek() {
            default = Some(self.ident_str()?);
            if self.eat(&TokenKind::Comma) {
                // falls through to `* as ns` or `{ ... }`
            }
        }

        if self.eat(&TokenKind::Star) {
            self.expect(&TokenKind::As, "'as'")?;
            namespace = Some(self.ident_str()?);
        } else if matches!(self.peek(), TokenKind::LBrace) {
            self.pos += 1;
            while !matches!(self.peek(), TokenKind::RBrace | TokenKind::Eof) {
                let imported = self.ident_str()?;
                let local = if self.eat(&TokenKind::As) { self.ident_str()? } else { imported.clone() };
                named.push(ImportSpecifier { imported, local });
                if !self.eat(&TokenKind::Comma) { break; }
            }
            self.expect(&TokenKind::RBrace, "'}'")?;
        }

        self.expect(&TokenKind::From, "'from'")?;
        let specifier = match self.peek().clone() {
            TokenKind::String(s) => { self.pos += 1; s }
            _ => return Err(self.unexpected("a module specifier string")),
        };
        self.eat_semicolon();
        Ok(StmtKind::Import(ImportDeclaration { specifier, default, namespace, named }))
    }

    fn parse_export(&mut self) -> PResult<StmtKind> {
        self.pos += 1; // export
        if self.eat(&TokenKind::Default) {
            let expr = self.parse_assignment_expr()?;
            self.eat_semicolon();
            return Ok(StmtKind::Export(ExportDeclaration::Default(expr)));
        }
        if self.eat(&TokenKind::Star) {
            let as_name = if self.eat(&TokenKind::As) { Some(self.ident_str()?) } else { None };
            self.expect(&TokenKind::From, "'from'")?;
            let from = match self.peek().clone() {
                TokenKind::String(s) => { self.pos += 1; s }
                _ => return Err(self.unexpected("a module specifier string")),
            };
            self.eat_semicolon();
            return Ok(StmtKind::Export(ExportDeclaration::All { from, as_name }));
        }
        if matches!(self.peek(), TokenKind::LBrace) {
            self.pos += 1;
            let mut specifiers = Vec::new();
            while !matches!(self.peek(), TokenKind::RBrace | TokenKind::Eof) {
                let local = self.ident_str()?;
                let exported = if self.eat(&TokenKind::As) { self.ident_str()? } else { local.clone() };
                specifiers.push(ExportSpecifier { local, exported });
                if !self.eat(&TokenKind::Comma) { break; }
            }
            self.expect(&TokenKind::RBrace, "'}'")?;
            let from = if self.eat(&TokenKind::From) {
                match self.peek().clone() {
                    TokenKind::String(s) => { self.pos += 1; Some(s) }
                    _ => return Err(self.unexpected("a module specifier string")),
                }
            } else { None };
            self.eat_semicolon();
            return Ok(StmtKind::Export(ExportDeclaration::Named { specifiers, from }));
        }
        let decl = Box::new(self.parse_statement()?);
        Ok(StmtKind::Export(ExportDeclaration::Declaration(decl)))
    }

    fn parse_expr_stmt(&mut self) -> PResult<StmtKind> {
        let expr = self.parse_expression()?;
        self.eat_semicolon();
        Ok(StmtKind::Expr(expr))
    }

    // ---- expressions -----------------------------------------------------

    fn parse_expression(&mut self) -> PResult<Expr> {
        let start = self.span();
        let first = self.parse_assignment_expr()?;
        if matches!(self.peek(), TokenKind::Comma) {
            let mut exprs = vec![first];
            while self.eat(&TokenKind::Comma) {
                exprs.push(self.parse_assignment_expr()?);
            }
            let end = self.prev_span();
            return Ok(Expr::new(ExprKind::Sequence(exprs), join(start, end)));
        }
        Ok(first)
    }

    fn parse_assignment_expr(&mut self) -> PResult<Expr> {
        let start = self.span();

        if self.looks_like_arrow() {
            return self.parse_arrow_function();
        }
        if matches!(self.peek(), TokenKind::Async) && self.looks_like_async_arrow() {
            self.pos += 1;
            return self.parse_arrow_function_async();
        }
        if matches!(self.peek(), TokenKind::Yield) {
            self.pos += 1;
            let delegate = self.eat(&TokenKind::Star);
            let argument = if matches!(self.peek(), TokenKind::Semicolon | TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket | TokenKind::Comma | TokenKind::Colon | TokenKind::Eof) {
                None
            } else {
                Some(Box::new(self.parse_assignment_expr()?))
            };
            let end = self.prev_span();
            return Ok(Expr::new(ExprKind::Yield { argument, delegate }, join(start, end)));
        }

        let left = self.parse_conditional_expr()?;

        let op = match self.peek() {
            TokenKind::Eq => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::AddAssign,
            TokenKind::MinusEq => AssignOp::SubAssign,
            TokenKind::StarEq => AssignOp::MulAssign,
            TokenKind::SlashEq => AssignOp::DivAssign,
            TokenKind::PercentEq => AssignOp::ModAssign,
            TokenKind::StarStarEq => AssignOp::ExpAssign,
            TokenKind::AmpEq => AssignOp::BitAndAssign,
            TokenKind::PipeEq => AssignOp::BitOrAssign,
            TokenKind::CaretEq => AssignOp::BitXorAssign,
            TokenKind::LtLtEq => AssignOp::ShlAssign,
            TokenKind::GtGtEq => AssignOp::ShrAssign,
            TokenKind::GtGtGtEq => AssignOp::UShrAssign,
            TokenKind::AmpAmpEq => AssignOp::AndAssign,
            TokenKind::PipePipeEq => AssignOp::OrAssign,
            TokenKind::QuestionQuestionEq => AssignOp::NullishAssign,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = Box::new(self.parse_assignment_expr()?);
        let end = self.prev_span();
        Ok(Expr::new(ExprKind::Assign { op, left: Box::new(left), right }, join(start, end)))
    }

    fn looks_like_arrow(&mut self) -> bool {
        let save = self.pos;
        let result = self.try_scan_arrow_params();
        self.pos = save;
        result
    }

    fn try_scan_arrow_params(&mut self) -> bool {
        match self.peek().clone() {
            TokenKind::Ident(_) => {
                self.pos += 1;
                matches!(self.peek(), TokenKind::Arrow) && !self.tokens[self.pos].preceded_by_line_terminator
            }
            TokenKind::LParen => {
                self.pos += 1;
                let mut depth = 1i32;
                while depth > 0 {
                    match self.peek() {
                        TokenKind::LParen => depth += 1,
                        TokenKind::RParen => depth -= 1,
                        TokenKind::Eof => return false,
                        _ => {}
                    }
                    self.pos += 1;
                }
                matches!(self.peek(), TokenKind::Arrow) && !self.tokens[self.pos].preceded_by_line_terminator
            }
            _ => false,
        }
    }

    fn looks_like_async_arrow(&mut self) -> bool {
        let save = self.pos;
        self.pos += 1;
        let result = !self.tokens[self.pos.min(self.tokens.len()-1)].preceded_by_line_terminator && self.try_scan_arrow_params();
        self.pos = save;
        result
    }

    fn parse_arrow_function(&mut self) -> PResult<Expr> {
        let start = self.span();
        let params = self.parse_arrow_params()?;
        self.expect(&TokenKind::Arrow, "'=>'")?;
        let body = self.parse_arrow_body()?;
        let end = self.prev_span();
        Ok(Expr::new(ExprKind::Arrow { params, body, is_async: false }, join(start, end)))
    }

    fn parse_arrow_function_async(&mut self) -> PResult<Expr> {
        let start = self.prev_span();
        let params = self.parse_arrow_params()?;
        self.expect(&TokenKind::Arrow, "'=>'")?;
        let body = self.parse_arrow_body()?;
        let end = self.prev_span();
        Ok(Expr::new(ExprKind::Arrow { params, body, is_async: true }, join(start, end)))
    }

    fn parse_arrow_params(&mut self) -> PResult<Vec<Param>> {
        if let TokenKind::Ident(_) = self.peek() {
            let name = self.ident_str()?;
            return Ok(vec![Param { pattern: Pattern::Ident(name), default: None, is_rest: false }]);
        }
        self.parse_param_list()
    }

    fn parse_arrow_body(&mut self) -> PResult<ArrowBody> {
        if matches!(self.peek(), TokenKind::LBrace) {
            self.pos += 1;
            let body = self.parse_block_body()?;
            self.expect(&TokenKind::RBrace, "'}'")?;
            Ok(ArrowBody::Block(body))
        } else {
            Ok(ArrowBody::Expr(Box::new(self.parse_assignment_expr()?)))
        }
    }

    fn parse_conditional_expr(&mut self) -> PResult<Expr> {
        let start = self.span();
        let test = self.parse_nullish_expr()?;
        if self.eat(&TokenKind::Question) {
            let consequent = Box::new(self.parse_assignment_expr()?);
            self.expect(&TokenKind::Colon, "':'")?;
            let alternate = Box::new(self.parse_assignment_expr()?);
            let end = self.prev_span();
            return Ok(Expr::new(ExprKind::Conditional { test: Box::new(test), consequent, alternate }, join(start, end)));
        }
        Ok(test)
    }

    fn parse_nullish_expr(&mut self) -> PResult<Expr> {
        let start = self.span();
        let mut left = self.parse_or_expr()?;
        while matches!(self.peek(), TokenKind::QuestionQuestion) {
            self.pos += 1;
            let right = self.parse_or_expr()?;
            let end = self.prev_span();
            left = Expr::new(ExprKind::Logical { op: LogicalOp::NullishCoalesce, left: Box::new(left), right: Box::new(right) }, join(start, end));
        }
        Ok(left)
    }

    fn parse_or_expr(&mut self) -> PResult<Expr> {
        let start = self.span();
        let mut left = self.parse_and_expr()?;
        while matches!(self.peek(), TokenKind::PipePipe) {
            self.pos += 1;
            let right = self.parse_and_expr()?;
            let end = self.prev_span();
            left = Expr::new(ExprKind::Logical { op: LogicalOp::Or, left: Box::new(left), right: Box::new(right) }, join(start, end));
        }
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> PResult<Expr> {
        let start = self.span();
        let mut left = self.parse_binary_expr(0)?;
        while matches!(self.peek(), TokenKind::AmpAmp) {
            self.pos += 1;
            let right = self.parse_binary_expr(0)?;
            let end = self.prev_span();
            left = Expr::new(ExprKind::Logical { op: LogicalOp::And, left: Box::new(left), right: Box::new(right) }, join(start, end));
        }
        Ok(left)
    }

    /// Pratt-style precedence climbing for the binary operator tier.
    fn parse_binary_expr(&mut self, min_prec: u8) -> PResult<Expr> {
        let start = self.span();
        let mut left = self.parse_unary_expr()?;
        loop {
            let (op, prec) = match binop_info(self.peek()) {
                Some(v) => v,
                None => break,
            };
            if prec < min_prec { break; }
            self.pos += 1;
            // `**` is right-associative; everything else here is left-associative.
            let next_min = if matches!(op, BinaryOp::Exp) { prec } else { prec + 1 };
            let right = self.parse_binary_expr(next_min)?;
            let end = self.prev_span();
            left = Expr::new(ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) }, join(start, end));
        }
        Ok(left)
    }

    fn parse_unary_expr(&mut self) -> PResult<Expr> {
        let start = self.span();
        let op = match self.peek() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Pos),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            _ => None,
        };
        if let Some(op) = op {
            self.pos += 1;
            let argument = Box::new(self.parse_unary_expr()?);
            let end = self.prev_span();
            return Ok(Expr::new(ExprKind::Unary { op, argument, prefix: true }, join(start, end)));
        }
        if matches!(self.peek(), TokenKind::PlusPlus | TokenKind::MinusMinus) {
            let op = if matches!(self.peek(), TokenKind::PlusPlus) { UpdateOp::Inc } else { UpdateOp::Dec };
            self.pos += 1;
            let argument = Box::new(self.parse_unary_expr()?);
            let end = self.prev_span();
            return Ok(Expr::new(ExprKind::Update { op, argument, prefix: true }, join(start, end)));
        }
        if matches!(self.peek(), TokenKind::Await) {
            self.pos += 1;
            let argument = Box::new(self.parse_unary_expr()?);
            let end = self.prev_span();
            return Ok(Expr::new(ExprKind::Await(argument), join(start, end)));
        }
        self.parse_postfix_expr()
    }

    fn parse_postfix_expr(&mut self) -> PResult<Expr> {
        let start = self.span();
        let expr = self.parse_lhs_expr()?;
        if matches!(self.peek(), TokenKind::PlusPlus | TokenKind::MinusMinus)
            && !self.tokens[self.pos].preceded_by_line_terminator
        {
            let op = if matches!(self.peek(), TokenKind::PlusPlus) { UpdateOp::Inc } else { UpdateOp::Dec };
            self.pos += 1;
            let end = self.prev_span();
            return Ok(Expr::new(ExprKind::Update { op, argument: Box::new(expr), prefix: false }, join(start, end)));
        }
        Ok(expr)
    }

    fn parse_lhs_expr(&mut self) -> PResult<Expr> {
        let start = self.span();
        let mut expr = if matches!(self.peek(), TokenKind::New) {
            self.parse_new_expr()?
        } else {
            self.parse_primary_expr()?
        };
        loop {
            expr = match self.peek().clone() {
                TokenKind::Dot => {
                    self.pos += 1;
                    let prop = self.member_name()?;
                    let end = self.prev_span();
                    Expr::new(ExprKind::Member { object: Box::new(expr), property: prop, computed: false, optional: false }, join(start, end))
                }
                TokenKind::QuestionDot => {
                    self.pos += 1;
                    if matches!(self.peek(), TokenKind::LParen) {
                        let args = self.parse_arguments()?;
                        let end = self.prev_span();
                        Expr::new(ExprKind::Call { callee: Box::new(expr), arguments: args, optional: true }, join(start, end))
                    } else if matches!(self.peek(), TokenKind::LBracket) {
                        self.pos += 1;
                        let index = self.parse_expression()?;
                        self.expect(&TokenKind::RBracket, "']'")?;
                        let end = self.prev_span();
                        Expr::new(ExprKind::Index { object: Box::new(expr), index: Box::new(index), optional: true }, join(start, end))
                    } else {
                        let prop = self.member_name()?;
                        let end = self.prev_span();
                        Expr::new(ExprKind::Member { object: Box::new(expr), property: prop, computed: false, optional: true }, join(start, end))
                    }
                }
                TokenKind::LBracket => {
                    self.pos += 1;
                    let index = self.parse_expression()?;
                    self.expect(&TokenKind::RBracket, "']'")?;
                    let end = self.prev_span();
                    Expr::new(ExprKind::Index { object: Box::new(expr), index: Box::new(index), optional: false }, join(start, end))
                }
                TokenKind::LParen => {
                    let args = self.parse_arguments()?;
                    let end = self.prev_span();
                    Expr::new(ExprKind::Call { callee: Box::new(expr), arguments: args, optional: false }, join(start, end))
                }
                TokenKind::Template { .. } => {
                    let (quasis, exprs) = self.parse_template_parts()?;
                    let end = self.prev_span();
                    Expr::new(ExprKind::TaggedTemplate { tag: Box::new(expr), quasis, exprs }, join(start, end))
                }
                _ => break,
            };
        }
        Ok(expr)
    }

    fn member_name(&mut self) -> PResult<String> {
        if let TokenKind::PrivateName(n) = self.peek().clone() {
            self.pos += 1;
            return Ok(alloc::format!("#{}", n));
        }
        self.ident_str()
    }

    fn parse_new_expr(&mut self) -> PResult<Expr> {
        let start = self.span();
        self.pos += 1; // new
        if matches!(self.peek(), TokenKind::Dot) {
            // new.target — modeled as a bare identifier the VM special-cases.
            self.pos += 1;
            let _ = self.ident_str()?; // "target"
            let end = self.prev_span();
            return Ok(Expr::new(ExprKind::Ident(String::from("new.target")), join(start, end)));
        }
        let callee = if matches!(self.peek(), TokenKind::New) {
            self.parse_new_expr()?
        } else {
            self.parse_member_only(start)?
        };
        let arguments = if matches!(self.peek(), TokenKind::LParen) { self.parse_arguments()? } else { Vec::new() };
        let end = self.prev_span();
        Ok(Expr::new(ExprKind::New { callee: Box::new(callee), arguments }, join(start, end)))
    }

    /// Member-expression chain without calls, used as a `new` callee.
    fn parse_member_only(&mut self, start: Span) -> PResult<Expr> {
        let mut expr = self.parse_primary_expr()?;
        loop {
            expr = match self.peek().clone() {
                TokenKind::Dot => {
                    self.pos += 1;
                    let prop = self.member_name()?;
                    let end = self.prev_span();
                    Expr::new(ExprKind::Member { object: Box::new(expr), property: prop, computed: false, optional: false }, join(start, end))
                }
                TokenKind::LBracket => {
                    self.pos += 1;
                    let index = self.parse_expression()?;
                    self.expect(&TokenKind::RBracket, "']'")?;
                    let end = self.prev_span();
                    Expr::new(ExprKind::Index { object: Box::new(expr), index: Box::new(index), optional: false }, join(start, end))
                }
                _ => break,
            };
        }
        Ok(expr)
    }

    fn parse_arguments(&mut self) -> PResult<Vec<Expr>> {
        self.expect(&TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        while !matches!(self.peek(), TokenKind::RParen | TokenKind::Eof) {
            if self.eat(&TokenKind::DotDotDot) {
                let start = self.span();
                let e = self.parse_assignment_expr()?;
                let end = self.prev_span();
                args.push(Expr::new(ExprKind::Spread(Box::new(e)), join(start, end)));
            } else {
                args.push(self.parse_assignment_expr()?);
            }
            if !self.eat(&TokenKind::Comma) { break; }
        }
        self.expect(&TokenKind::RParen, "')'")?;
        Ok(args)
    }

    fn parse_template_parts(&mut self) -> PResult<(Vec<String>, Vec<Expr>)> {
        let mut quasis = Vec::new();
        let mut exprs = Vec::new();
        loop {
            match self.peek().clone() {
                TokenKind::Template { cooked, tail, .. } => {
                    self.pos += 1;
                    quasis.push(cooked);
                    if tail { break; }
                    exprs.push(self.parse_expression()?);
                }
                _ => return Err(self.unexpected("a template literal segment")),
            }
        }
        Ok((quasis, exprs))
    }

    fn parse_primary_expr(&mut self) -> PResult<Expr> {
        let start = self.span();
        let tok = self.peek().clone();
        match tok {
            TokenKind::Number(n) => { self.pos += 1; Ok(Expr::new(ExprKind::Number(n), start)) }
            TokenKind::BigInt(n) => { self.pos += 1; Ok(Expr::new(ExprKind::BigInt(n), start)) }
            TokenKind::String(s) => { self.pos += 1; Ok(Expr::new(ExprKind::String(s), start)) }
            TokenKind::Bool(b) => { self.pos += 1; Ok(Expr::new(ExprKind::Bool(b), start)) }
            TokenKind::Null => { self.pos += 1; Ok(Expr::new(ExprKind::Null, start)) }
            TokenKind::Undefined => { self.pos += 1; Ok(Expr::new(ExprKind::Undefined, start)) }
            TokenKind::This => { self.pos += 1; Ok(Expr::new(ExprKind::This, start)) }
            TokenKind::Super => { self.pos += 1; Ok(Expr::new(ExprKind::Super, start)) }
            TokenKind::PrivateName(n) => { self.pos += 1; Ok(Expr::new(ExprKind::PrivateName(n), start)) }
            TokenKind::RegExp(pattern, flags) => { self.pos += 1; Ok(Expr::new(ExprKind::Regex { pattern, flags }, start)) }
            TokenKind::Template { .. } => {
                let (quasis, exprs) = self.parse_template_parts()?;
                let end = self.prev_span();
                Ok(Expr::new(ExprKind::Template { quasis, exprs }, join(start, end)))
            }
            TokenKind::Ident(name) => { self.pos += 1; Ok(Expr::new(ExprKind::Ident(name), start)) }
            TokenKind::Of | TokenKind::As | TokenKind::From => {
                let s = self.ident_str()?;
                Ok(Expr::new(ExprKind::Ident(s), start))
            }
            TokenKind::Async => {
                self.pos += 1;
                if matches!(self.peek(), TokenKind::Function) {
                    self.pos += 1;
                    self.parse_function_expr(true)
                } else {
                    Ok(Expr::new(ExprKind::Ident(String::from("async")), start))
                }
            }
            TokenKind::Function => { self.pos += 1; self.parse_function_expr(false) }
            TokenKind::Class => { self.pos += 1; self.parse_class_expr() }
            TokenKind::LParen => {
                self.pos += 1;
                let e = self.parse_expression()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(e)
            }
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_object_literal(),
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn parse_function_expr(&mut self, is_async: bool) -> PResult<Expr> {
        let start = self.prev_span();
        let is_generator = self.eat(&TokenKind::Star);
        let name = if let TokenKind::Ident(_) = self.peek() { Some(self.ident_str()?) } else { None };
        let params = self.parse_param_list()?;
        self.expect(&TokenKind::LBrace, "'{'")?;
        let body = self.parse_block_body()?;
        self.expect(&TokenKind::RBrace, "'}'")?;
        let end = self.prev_span();
        Ok(Expr::new(ExprKind::FunctionExpr { name, params, body, is_async, is_generator }, join(start, end)))
    }

    fn parse_class_expr(&mut self) -> PResult<Expr> {
        let start = self.prev_span();
        let name = if let TokenKind::Ident(_) = self.peek() { Some(self.ident_str()?) } else { None };
        let super_class = if self.eat(&TokenKind::Extends) { Some(Box::new(self.parse_lhs_expr()?)) } else { None };
        let body = self.parse_class_body()?;
        let end = self.prev_span();
        Ok(Expr::new(ExprKind::ClassExpr { name, super_class, body }, join(start, end)))
    }

    fn parse_array_literal(&mut self) -> PResult<Expr> {
        let start = self.span();
        self.pos += 1;
        let mut elements = Vec::new();
        while !matches!(self.peek(), TokenKind::RBracket | TokenKind::Eof) {
            if self.eat(&TokenKind::Comma) { elements.push(None); continue; }
            if self.eat(&TokenKind::DotDotDot) {
                let s2 = self.prev_span();
                let e = self.parse_assignment_expr()?;
                let end = self.prev_span();
                elements.push(Some(Expr::new(ExprKind::Spread(Box::new(e)), join(s2, end))));
            } else {
                elements.push(Some(self.parse_assignment_expr()?));
            }
            if !self.eat(&TokenKind::Comma) { break; }
        }
        self.expect(&TokenKind::RBracket, "']'")?;
        let end = self.prev_span();
        Ok(Expr::new(ExprKind::Array(elements), join(start, end)))
    }

    fn parse_object_literal(&mut self) -> PResult<Expr> {
        let start = self.span();
        self.pos += 1;
        let mut props = Vec::new();
        while !matches!(self.peek(), TokenKind::RBrace | TokenKind::Eof) {
            if self.eat(&TokenKind::DotDotDot) {
                let e = self.parse_assignment_expr()?;
                props.push(ObjProp { key: PropKey::Ident(String::new()), value: Expr::new(ExprKind::Spread(Box::new(e)), start), kind: PropKind::Init, shorthand: false });
                if !self.eat(&TokenKind::Comma) { break; }
                continue;
            }

            let mut is_async = false;
            let mut is_generator = false;
            let mut prop_kind = PropKind::Init;

            if matches!(self.peek(), TokenKind::Async) && !matches!(self.peek2(), TokenKind::Colon | TokenKind::Comma | TokenKind::RBrace | TokenKind::LParen) {
                is_async = true;
                self.pos += 1;
            }
            if self.eat(&TokenKind::Star) { is_generator = true; }
            if self.is_ident("get") && !matches!(self.peek2(), TokenKind::Colon | TokenKind::Comma | TokenKind::RBrace | TokenKind::LParen) {
                prop_kind = PropKind::Get;
                self.pos += 1;
            } else if self.is_ident("set") && !matches!(self.peek2(), TokenKind::Colon | TokenKind::Comma | TokenKind::RBrace | TokenKind::LParen) {
                prop_kind = PropKind::Set;
                self.pos += 1;
            }

            let key = self.parse_property_key()?;

            if matches!(self.peek(), TokenKind::LParen) {
                let params = self.parse_param_list()?;
                self.expect(&TokenKind::LBrace, "'{'")?;
                let body = self.parse_block_body()?;
                self.expect(&TokenKind::RBrace, "'}'")?;
                let fn_span = start;
                let value = Expr::new(ExprKind::FunctionExpr { name: None, params, body, is_async, is_generator }, fn_span);
                let kind = if matches!(prop_kind, PropKind::Init) { PropKind::Method } else { prop_kind };
                props.push(ObjProp { key, value, kind, shorthand: false });
            } else if self.eat(&TokenKind::Colon) {
                let value = self.parse_assignment_expr()?;
                props.push(ObjProp { key, value, kind: PropKind::Init, shorthand: false });
            } else {
                // shorthand `{ x }` or `{ x = default }` (the latter only valid in patterns,
                // accepted here too so object-literal-as-pattern reinterpretation is simple).
                let name = match &key { PropKey::Ident(s) => s.clone(), _ => String::new() };
                let value = if self.eat(&TokenKind::Eq) {
                    let def = self.parse_assignment_expr()?;
                    Expr::new(ExprKind::Assign { op: AssignOp::Assign, left: Box::new(Expr::new(ExprKind::Ident(name.clone()), start)), right: Box::new(def) }, start)
                } else {
                    Expr::new(ExprKind::Ident(name), start)
                };
                props.push(ObjProp { key, value, kind: PropKind::Init, shorthand: true });
            }

            if !self.eat(&TokenKind::Comma) { break; }
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        let end = self.prev_span();
        Ok(Expr::new(ExprKind::Object(props), join(start, end)))
    }
}

fn join(a: Span, b: Span) -> Span {
    Span::new(a.start, b.end, a.line, a.column)
}

fn binop_info(kind: &TokenKind) -> Option<(BinaryOp, u8)> {
    use BinaryOp::*;
    Some(match kind {
        TokenKind::StarStar => (Exp, 11),
        TokenKind::Star => (Mul, 10),
        TokenKind::Slash => (Div, 10),
        TokenKind::Percent => (Mod, 10),
        TokenKind::Plus => (Add, 9),
        TokenKind::Minus => (Sub, 9),
        TokenKind::LtLt => (Shl, 8),
        TokenKind::GtGt => (Shr, 8),
        TokenKind::GtGtGt => (UShr, 8),
        TokenKind::Lt => (Lt, 7),
        TokenKind::LtEq => (Le, 7),
        TokenKind::Gt => (Gt, 7),
        TokenKind::GtEq => (Ge, 7),
        TokenKind::Instanceof => (InstanceOf, 7),
        TokenKind::In => (In, 7),
        TokenKind::EqEq => (Eq, 6),
        TokenKind::BangEq => (Ne, 6),
        TokenKind::EqEqEq => (StrictEq, 6),
        TokenKind::BangEqEq => (StrictNe, 6),
        TokenKind::Amp => (BitAnd, 5),
        TokenKind::Caret => (BitXor, 4),
        TokenKind::Pipe => (BitOr, 3),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(src: &str) -> Program {
        let tokens = Lexer::tokenize(src).unwrap();
        Parser::new(tokens).parse_program().unwrap()
    }

    #[test]
    fn parses_binary_precedence() {
        let p = parse("1 + 2 * 3;");
        assert_eq!(p.body.len(), 1);
    }

    #[test]
    fn parses_try_finally_return() {
        let p = parse("(function(){try{return 1}finally{return 2}})()");
        assert_eq!(p.body.len(), 1);
    }

    #[test]
    fn parses_optional_chain() {
        let p = parse("a?.b?.();");
        assert_eq!(p.body.len(), 1);
    }

    #[test]
    fn parses_import_export() {
        let p = parse("import { a, b as c } from './m.js'; export default 1;");
        assert_eq!(p.body.len(), 2);
    }

    #[test]
    fn parses_template_with_tag() {
        let p = parse("tag`a${1+1}b`;");
        assert_eq!(p.body.len(), 1);
    }

    #[test]
    fn syntax_error_has_position() {
        let tokens = Lexer::tokenize("let = ;").unwrap();
        let err = Parser::new(tokens).parse_program().unwrap_err();
        assert!(err.span.is_some());
    }
}
