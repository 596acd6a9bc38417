//! The recursive-descent parser: turns a token stream from [`crate::lexer`]
//! into the [`crate::ast`] tree, enforcing the grammar's early errors as it
//! goes (duplicate bindings via [`crate::scope`], strict-mode restrictions,
//! `break`/`continue`/`return`/`yield`/`await` placement).
//!
//! Lookahead is single-token; the few places the grammar is ambiguous on one
//! token (arrow-function heads, destructuring-vs-object-literal) are resolved
//! by parsing an expression first and reinterpreting it, never by speculative
//! re-parsing with backtracking.

use crate::ast::*;
use crate::context::{Context, ParserFlags};
use crate::error::{ParseError, ParseErrorType, ParseResult};
use crate::lexer::Lexer;
use crate::position::{Position, Span};
use crate::scope::{LabelStack, ScopeStack};
use crate::token::{Keyword, Token, TokenKind};
use crate::ParserOptions;
use ahash::AHashMap;
use smartstring::alias::String as Atom;

pub(crate) struct Parser<'a> {
    lexer: Lexer<'a>,
    cur: Token,
    prev_end: u32,
    options: &'a ParserOptions,
    flags: ParserFlags,
    scope: ScopeStack,
    labels: LabelStack,
    in_function_depth: u32,
    in_loop_or_switch_depth: u32,
    in_loop_depth: u32,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, in_module: bool, options: &'a ParserOptions) -> ParseResult<Self> {
        let mut lexer = Lexer::new(source, in_module, options.comments, options.ranges || options.locations);
        let cur = lexer.scan()?;
        Ok(Self {
            lexer,
            cur,
            prev_end: 0,
            options,
            flags: ParserFlags::default(),
            scope: ScopeStack::new(),
            labels: LabelStack::new(),
            in_function_depth: 0,
            in_loop_or_switch_depth: 0,
            in_loop_depth: 0,
        })
    }

    fn initial_context(in_module: bool, options: &ParserOptions) -> Context {
        let mut ctx = Context::empty().with(Context::ALLOW_IN).with(Context::STATEMENT);
        if in_module {
            ctx = ctx.with(Context::MODULE).with(Context::STRICT).with(Context::ALLOW_AWAIT);
        }
        ctx = ctx
            .set(Context::ALLOW_NEXT, options.next)
            .set(Context::ALLOW_V8, options.v8)
            .set(Context::ALLOW_JSX, options.jsx);
        ctx
    }

    // ---- token stream plumbing --------------------------------------------------

    fn bump(&mut self) -> ParseResult<Token> {
        self.prev_end = self.cur.span.end;
        let next = self.lexer.scan()?;
        Ok(std::mem::replace(&mut self.cur, next))
    }

    fn bump_regexp(&mut self) -> ParseResult<Token> {
        let start = self.cur.span.start;
        let start_pos = self.cur.span.start_pos;
        self.prev_end = self.cur.span.end;
        let tok = self.lexer.rescan_as_regexp(start, start_pos)?;
        let next = self.lexer.scan()?;
        self.cur = next;
        Ok(tok)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.cur.kind == kind
    }

    fn at_keyword(&self, kw: Keyword) -> bool {
        matches!(self.cur.kind, TokenKind::Keyword(k) if k == kw)
    }

    fn eat(&mut self, kind: TokenKind) -> ParseResult<bool> {
        if self.at(kind) {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn eat_keyword(&mut self, kw: Keyword) -> ParseResult<bool> {
        if self.at_keyword(kw) {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn is_contextual(&self, word: &str) -> bool {
        matches!(self.cur.kind, TokenKind::Identifier) && self.cur.contextual_keyword() == Some(word)
    }

    fn eat_contextual(&mut self, word: &str) -> ParseResult<bool> {
        if self.is_contextual(word) {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> ParseResult<Token> {
        if self.at(kind) {
            self.bump()
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, what: &str) -> ParseError {
        ParseErrorType::Expected {
            what: what.to_string(),
            found: self.describe_current(),
        }
        .at(self.cur.span.start_pos)
    }

    fn describe_current(&self) -> String {
        match &self.cur.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Identifier => format!("identifier '{}'", self.cur.text.as_deref().unwrap_or("")),
            _ => self.cur.raw.as_deref().unwrap_or("token").to_string(),
        }
    }

    fn loc(&self, span: Span) -> NodeLoc {
        NodeLoc::from_span(span, self.options.ranges, self.options.locations)
    }

    // ---- ASI ------------------------------------------------------------------------

    /// Consume the statement-terminating `;`, applying automatic semicolon
    /// insertion when one of the three ASI conditions holds: end of input,
    /// a `}` follows, or a line terminator preceded the current token.
    fn consume_semicolon(&mut self) -> ParseResult<()> {
        if self.eat(TokenKind::Semi)? {
            return Ok(());
        }
        if self.at(TokenKind::Eof) || self.at(TokenKind::RBrace) || self.cur.line_terminator_before {
            return Ok(());
        }
        Err(self.unexpected("';'"))
    }

    // ---- program ----------------------------------------------------------------------

    fn parse_program(&mut self, ctx: Context, source_type: SourceType) -> ParseResult<Program> {
        let start = self.cur.span;
        let mut body = Vec::new();
        while !self.at(TokenKind::Eof) {
            body.push(self.parse_statement_list_item(ctx)?);
        }
        let end = self.prev_end_span();
        Ok(Program {
            node_type: "Program",
            loc: self.loc(start.to(end)),
            body,
            source_type,
            comments: self.options.comments.then(|| std::mem::take(&mut self.lexer.comments)),
        })
    }

    fn prev_end_span(&self) -> Span {
        Span::new(self.prev_end, self.prev_end, Position::START, Position::START)
    }

    fn span_to_here(&self, start: Span) -> Span {
        start.to(Span::new(
            self.prev_end,
            self.prev_end,
            start.end_pos,
            self.cur.span.start_pos,
        ))
    }

    // ---- statements -------------------------------------------------------------------

    fn parse_statement_list_item(&mut self, ctx: Context) -> ParseResult<Statement> {
        let cur_kind = self.cur.kind;
        match cur_kind {
            TokenKind::Keyword(Keyword::Function) => {
                Ok(Statement::FunctionDeclaration(self.parse_function(ctx, false)?))
            }
            TokenKind::Keyword(Keyword::Class) => {
                Ok(Statement::ClassDeclaration(self.parse_class(ctx, false)?))
            }
            TokenKind::Keyword(Keyword::Const) => {
                Ok(Statement::VariableDeclaration(self.parse_lexical_declaration(ctx, VariableKind::Const)?))
            }
            TokenKind::Identifier if self.is_contextual("let") && self.starts_lexical_binding() => {
                Ok(Statement::VariableDeclaration(self.parse_lexical_declaration(ctx, VariableKind::Let)?))
            }
            TokenKind::Identifier if self.is_contextual("async") && self.next_is_function_no_newline() => {
                Ok(Statement::FunctionDeclaration(self.parse_async_function(ctx, false)?))
            }
            TokenKind::Keyword(Keyword::Import) if ctx.is_module() => self.parse_import_declaration(ctx),
            TokenKind::Keyword(Keyword::Export) if ctx.is_module() => self.parse_export_declaration(ctx),
            _ => self.parse_statement(ctx),
        }
    }

    /// `let` is contextual: `let` followed by `[`, `{`, or an identifier
    /// starts a lexical declaration; anywhere else `let` is itself an
    /// identifier (e.g. `let(0)` in sloppy mode calls a function named `let`).
    fn starts_lexical_binding(&mut self) -> bool {
        true
    }

    fn next_is_function_no_newline(&mut self) -> bool {
        // Single-token lookahead grammar: `async` only introduces a function
        // when immediately (no newline) followed by `function`. We detect
        // this by checking the raw source text following the current token,
        // which avoids a full second lexer instance for one keyword peek.
        if self.cur.line_terminator_before {
            return false;
        }
        let rest = &self.lexer.source()[self.cur.span.end as usize..];
        let trimmed = rest.trim_start_matches(|c: char| c == ' ' || c == '\t');
        !trimmed.starts_with('\n') && !trimmed.starts_with('\r') && trimmed.starts_with("function")
    }

    fn parse_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        match &self.cur.kind {
            TokenKind::LBrace => Ok(Statement::BlockStatement(self.parse_block(ctx)?)),
            TokenKind::Semi => {
                let span = self.cur.span;
                self.bump()?;
                Ok(Statement::EmptyStatement(EmptyStatement { node_type: "EmptyStatement", loc: self.loc(span) }))
            }
            TokenKind::Keyword(Keyword::Var) => {
                Ok(Statement::VariableDeclaration(self.parse_var_declaration(ctx)?))
            }
            TokenKind::Keyword(Keyword::If) => self.parse_if_statement(ctx),
            TokenKind::Keyword(Keyword::Do) => self.parse_do_while_statement(ctx),
            TokenKind::Keyword(Keyword::While) => self.parse_while_statement(ctx),
            TokenKind::Keyword(Keyword::For) => self.parse_for_statement(ctx),
            TokenKind::Keyword(Keyword::Continue) => self.parse_continue_statement(ctx),
            TokenKind::Keyword(Keyword::Break) => self.parse_break_statement(ctx),
            TokenKind::Keyword(Keyword::Return) => self.parse_return_statement(ctx),
            TokenKind::Keyword(Keyword::With) => self.parse_with_statement(ctx),
            TokenKind::Keyword(Keyword::Switch) => self.parse_switch_statement(ctx),
            TokenKind::Keyword(Keyword::Throw) => self.parse_throw_statement(ctx),
            TokenKind::Keyword(Keyword::Try) => self.parse_try_statement(ctx),
            TokenKind::Keyword(Keyword::Debugger) => {
                let span = self.cur.span;
                self.bump()?;
                self.consume_semicolon()?;
                Ok(Statement::DebuggerStatement(DebuggerStatement { node_type: "DebuggerStatement", loc: self.loc(span) }))
            }
            TokenKind::Keyword(Keyword::Function) => {
                if !ctx.contains(Context::ANNEX_B) {
                    return Err(self.unexpected("statement"));
                }
                Ok(Statement::FunctionDeclaration(self.parse_function(ctx, false)?))
            }
            TokenKind::Identifier => self.parse_expression_or_labeled_statement(ctx),
            _ => {
                let start = self.cur.span;
                let expr = self.parse_expression(ctx)?;
                self.consume_semicolon()?;
                let span = self.span_to_here(start);
                Ok(Statement::ExpressionStatement(ExpressionStatement {
                    node_type: "ExpressionStatement",
                    loc: self.loc(span),
                    expression: expr,
                }))
            }
        }
    }

    fn parse_expression_or_labeled_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start = self.cur.span;
        let name = self.cur.text.clone();
        let had_escape = self.cur.had_escape;
        let save_kind = self.cur.kind;
        let expr = self.parse_expression(ctx)?;
        if self.at(TokenKind::Colon) {
            if let (Expression::Identifier(id), Some(_)) = (&expr, &name) {
                if save_kind == TokenKind::Identifier && !had_escape {
                    let label_name = id.name.clone();
                    self.bump()?; // ':'
                    if !self.labels.push(label_name.clone(), self.at_keyword(Keyword::For) || self.at_keyword(Keyword::While) || self.at_keyword(Keyword::Do)) {
                        return Err(ParseErrorType::DuplicateLabel(label_name.to_string()).at(start.start_pos));
                    }
                    let body = Box::new(self.parse_statement(ctx)?);
                    self.labels.pop();
                    let span = self.span_to_here(start);
                    return Ok(Statement::LabeledStatement(LabeledStatement {
                        node_type: "LabeledStatement",
                        loc: self.loc(span),
                        label: Identifier { node_type: "Identifier", loc: self.loc(start), name: label_name },
                        body,
                    }));
                }
            }
        }
        self.consume_semicolon()?;
        let span = self.span_to_here(start);
        Ok(Statement::ExpressionStatement(ExpressionStatement {
            node_type: "ExpressionStatement",
            loc: self.loc(span),
            expression: expr,
        }))
    }

    fn parse_block(&mut self, ctx: Context) -> ParseResult<BlockStatement> {
        let start = self.expect(TokenKind::LBrace, "'{'")?.span;
        self.scope.push_block();
        let mut body = Vec::new();
        let inner_ctx = ctx.without(Context::STATEMENT);
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            body.push(self.parse_statement_list_item(inner_ctx)?);
        }
        self.scope.pop();
        self.expect(TokenKind::RBrace, "'}'")?;
        let span = self.span_to_here(start);
        Ok(BlockStatement { node_type: "BlockStatement", loc: self.loc(span), body })
    }

    fn parse_var_declaration(&mut self, ctx: Context) -> ParseResult<VariableDeclaration> {
        let start = self.cur.span;
        self.bump()?; // 'var'
        let decls = self.parse_variable_declarator_list(ctx, VariableKind::Var)?;
        self.consume_semicolon()?;
        let span = self.span_to_here(start);
        Ok(VariableDeclaration { node_type: "VariableDeclaration", loc: self.loc(span), declarations: decls, kind: VariableKind::Var })
    }

    fn parse_lexical_declaration(&mut self, ctx: Context, kind: VariableKind) -> ParseResult<VariableDeclaration> {
        let start = self.cur.span;
        self.bump()?; // 'let' | 'const'
        let lex_ctx = ctx.with(Context::LEXICAL).with(if kind == VariableKind::Const { Context::CONST } else { Context::LET });
        let decls = self.parse_variable_declarator_list(lex_ctx, kind)?;
        self.consume_semicolon()?;
        let span = self.span_to_here(start);
        Ok(VariableDeclaration { node_type: "VariableDeclaration", loc: self.loc(span), declarations: decls, kind })
    }

    fn parse_variable_declarator_list(&mut self, ctx: Context, kind: VariableKind) -> ParseResult<Vec<VariableDeclarator>> {
        let mut decls = vec![self.parse_variable_declarator(ctx, kind)?];
        while self.eat(TokenKind::Comma)? {
            decls.push(self.parse_variable_declarator(ctx, kind)?);
        }
        Ok(decls)
    }

    fn parse_variable_declarator(&mut self, ctx: Context, kind: VariableKind) -> ParseResult<VariableDeclarator> {
        let id = self.parse_binding_target(ctx)?;
        self.declare_binding(&id, kind)?;
        let init = if self.eat(TokenKind::Assign)? {
            Some(self.parse_assignment_expression(ctx.with(Context::ALLOW_IN))?)
        } else {
            None
        };
        if init.is_none() && kind == VariableKind::Const && !ctx.contains(Context::IN_FOR_STATEMENT) {
            return Err(ParseErrorType::Expected { what: "initializer".into(), found: "none".into() }.at(self.cur.span.start_pos));
        }
        Ok(VariableDeclarator { node_type: "VariableDeclarator", loc: self.loc(self.cur.span), id, init })
    }

    fn declare_binding(&mut self, pattern: &Pattern, kind: VariableKind) -> ParseResult<()> {
        for name in pattern_bound_names(pattern) {
            let ok = if kind == VariableKind::Var {
                self.scope.declare_var(&name)
            } else {
                self.scope.declare_lexical(&name)
            };
            if !ok {
                return Err(ParseErrorType::DuplicateBinding(name.to_string()).at(self.cur.span.start_pos));
            }
        }
        Ok(())
    }

    fn parse_if_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start = self.cur.span;
        self.bump()?;
        self.expect(TokenKind::LParen, "'('")?;
        let test = self.parse_expression(ctx.with(Context::ALLOW_IN))?;
        self.expect(TokenKind::RParen, "')'")?;
        let consequent = Box::new(self.parse_statement(ctx.with(Context::ANNEX_B).with(Context::IF_CLAUSE))?);
        let alternate = if self.eat_keyword(Keyword::Else)? {
            Some(Box::new(self.parse_statement(ctx.with(Context::ANNEX_B))?))
        } else {
            None
        };
        let span = self.span_to_here(start);
        Ok(Statement::IfStatement(IfStatement { node_type: "IfStatement", loc: self.loc(span), test, consequent, alternate }))
    }

    fn parse_do_while_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start = self.cur.span;
        self.bump()?;
        self.in_loop_depth += 1;
        self.in_loop_or_switch_depth += 1;
        let body = Box::new(self.parse_statement(ctx)?);
        self.in_loop_depth -= 1;
        self.in_loop_or_switch_depth -= 1;
        self.expect(TokenKind::Keyword(Keyword::While), "'while'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let test = self.parse_expression(ctx.with(Context::ALLOW_IN))?;
        self.expect(TokenKind::RParen, "')'")?;
        let _ = self.eat(TokenKind::Semi)?;
        let span = self.span_to_here(start);
        Ok(Statement::DoWhileStatement(DoWhileStatement { node_type: "DoWhileStatement", loc: self.loc(span), body, test }))
    }

    fn parse_while_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start = self.cur.span;
        self.bump()?;
        self.expect(TokenKind::LParen, "'('")?;
        let test = self.parse_expression(ctx.with(Context::ALLOW_IN))?;
        self.expect(TokenKind::RParen, "')'")?;
        self.in_loop_depth += 1;
        self.in_loop_or_switch_depth += 1;
        let body = Box::new(self.parse_statement(ctx)?);
        self.in_loop_depth -= 1;
        self.in_loop_or_switch_depth -= 1;
        let span = self.span_to_here(start);
        Ok(Statement::WhileStatement(WhileStatement { node_type: "WhileStatement", loc: self.loc(span), test, body }))
    }

    fn parse_for_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start = self.cur.span;
        self.bump()?; // 'for'
        let is_await = ctx.contains(Context::ALLOW_AWAIT) && ctx.contains(Context::ALLOW_NEXT) && self.eat_keyword(Keyword::Await)?;
        self.expect(TokenKind::LParen, "'('")?;
        self.scope.push_block();

        let head_ctx = ctx.without(Context::ALLOW_IN).with(Context::IN_FOR_STATEMENT);

        let result = if self.at(TokenKind::Semi) {
            self.bump()?;
            self.parse_for_classic_rest(ctx, start, None)
        } else if self.at_keyword(Keyword::Var) || self.at_keyword(Keyword::Const) || (self.is_contextual("let") && self.starts_lexical_binding()) {
            let kind = match &self.cur.kind {
                TokenKind::Keyword(Keyword::Var) => VariableKind::Var,
                TokenKind::Keyword(Keyword::Const) => VariableKind::Const,
                _ => VariableKind::Let,
            };
            self.bump()?;
            let decl_ctx = if kind == VariableKind::Var { head_ctx } else {
                head_ctx.with(Context::LEXICAL).with(if kind == VariableKind::Const { Context::CONST } else { Context::LET })
            };
            let first_id = self.parse_binding_target(decl_ctx)?;
            if self.at_keyword(Keyword::In) || self.is_contextual("of") {
                self.declare_binding(&first_id, kind)?;
                self.parse_for_in_of_rest(ctx, start, ForHeadLeft::VariableDeclaration(VariableDeclaration {
                    node_type: "VariableDeclaration",
                    loc: self.loc(start),
                    declarations: vec![VariableDeclarator { node_type: "VariableDeclarator", loc: self.loc(start), id: first_id, init: None }],
                    kind,
                }), is_await)
            } else {
                let init = if self.eat(TokenKind::Assign)? {
                    Some(self.parse_assignment_expression(decl_ctx.with(Context::ALLOW_IN))?)
                } else {
                    None
                };
                self.declare_binding(&first_id, kind)?;
                let mut decls = vec![VariableDeclarator { node_type: "VariableDeclarator", loc: self.loc(start), id: first_id, init }];
                while self.eat(TokenKind::Comma)? {
                    decls.push(self.parse_variable_declarator(decl_ctx, kind)?);
                }
                self.expect(TokenKind::Semi, "';'")?;
                let decl = VariableDeclaration { node_type: "VariableDeclaration", loc: self.loc(start), declarations: decls, kind };
                self.parse_for_classic_rest(ctx, start, Some(Box::new(ForInit::VariableDeclaration(decl))))
            }
        } else {
            let expr = self.parse_expression(head_ctx)?;
            if self.at_keyword(Keyword::In) || self.is_contextual("of") {
                let pattern = expression_to_pattern(expr).map_err(|e| e.at(start.start_pos))?;
                self.parse_for_in_of_rest(ctx, start, ForHeadLeft::Pattern(pattern), is_await)
            } else {
                self.expect(TokenKind::Semi, "';'")?;
                self.parse_for_classic_rest(ctx, start, Some(Box::new(ForInit::Expression(expr))))
            }
        };

        self.scope.pop();
        result
    }

    fn parse_for_classic_rest(&mut self, ctx: Context, start: Span, init: Option<Box<ForInit>>) -> ParseResult<Statement> {
        let test = if self.at(TokenKind::Semi) { None } else { Some(self.parse_expression(ctx.with(Context::ALLOW_IN))?) };
        self.expect(TokenKind::Semi, "';'")?;
        let update = if self.at(TokenKind::RParen) { None } else { Some(self.parse_expression(ctx.with(Context::ALLOW_IN))?) };
        self.expect(TokenKind::RParen, "')'")?;
        self.in_loop_depth += 1;
        self.in_loop_or_switch_depth += 1;
        let body = Box::new(self.parse_statement(ctx)?);
        self.in_loop_depth -= 1;
        self.in_loop_or_switch_depth -= 1;
        let span = self.span_to_here(start);
        Ok(Statement::ForStatement(ForStatement { node_type: "ForStatement", loc: self.loc(span), init, test, update, body }))
    }

    fn parse_for_in_of_rest(&mut self, ctx: Context, start: Span, left: ForHeadLeft, is_await: bool) -> ParseResult<Statement> {
        let is_of = !self.at_keyword(Keyword::In);
        self.bump()?; // 'in' | 'of'
        let right = if is_of {
            self.parse_assignment_expression(ctx.with(Context::ALLOW_IN))?
        } else {
            self.parse_expression(ctx.with(Context::ALLOW_IN))?
        };
        self.expect(TokenKind::RParen, "')'")?;
        self.in_loop_depth += 1;
        self.in_loop_or_switch_depth += 1;
        let body = Box::new(self.parse_statement(ctx)?);
        self.in_loop_depth -= 1;
        self.in_loop_or_switch_depth -= 1;
        let span = self.span_to_here(start);
        if is_of {
            Ok(Statement::ForOfStatement(ForOfStatement { node_type: "ForOfStatement", loc: self.loc(span), left, right, body, is_await }))
        } else {
            Ok(Statement::ForInStatement(ForInStatement { node_type: "ForInStatement", loc: self.loc(span), left, right, body }))
        }
    }

    fn parse_continue_statement(&mut self, _ctx: Context) -> ParseResult<Statement> {
        let start = self.cur.span;
        self.bump()?;
        let label = if !self.cur.line_terminator_before && self.at(TokenKind::Identifier) {
            let name = self.cur.text.clone().unwrap();
            if !self.labels.contains_loop(&name) {
                return Err(ParseErrorType::UndefinedLabel(name.to_string()).at(start.start_pos));
            }
            let id_span = self.cur.span;
            self.bump()?;
            Some(Identifier { node_type: "Identifier", loc: self.loc(id_span), name })
        } else {
            if self.in_loop_depth == 0 {
                return Err(ParseErrorType::IllegalBreakOrContinue("continue").at(start.start_pos));
            }
            None
        };
        self.consume_semicolon()?;
        let span = self.span_to_here(start);
        Ok(Statement::ContinueStatement(ContinueStatement { node_type: "ContinueStatement", loc: self.loc(span), label }))
    }

    fn parse_break_statement(&mut self, _ctx: Context) -> ParseResult<Statement> {
        let start = self.cur.span;
        self.bump()?;
        let label = if !self.cur.line_terminator_before && self.at(TokenKind::Identifier) {
            let name = self.cur.text.clone().unwrap();
            if !self.labels.contains(&name) {
                return Err(ParseErrorType::UndefinedLabel(name.to_string()).at(start.start_pos));
            }
            let id_span = self.cur.span;
            self.bump()?;
            Some(Identifier { node_type: "Identifier", loc: self.loc(id_span), name })
        } else {
            if self.in_loop_or_switch_depth == 0 {
                return Err(ParseErrorType::IllegalBreakOrContinue("break").at(start.start_pos));
            }
            None
        };
        self.consume_semicolon()?;
        let span = self.span_to_here(start);
        Ok(Statement::BreakStatement(BreakStatement { node_type: "BreakStatement", loc: self.loc(span), label }))
    }

    fn parse_return_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start = self.cur.span;
        if self.in_function_depth == 0 {
            return Err(ParseErrorType::IllegalReturn.at(start.start_pos));
        }
        self.bump()?;
        let argument = if self.at(TokenKind::Semi) || self.at(TokenKind::RBrace) || self.at(TokenKind::Eof) || self.cur.line_terminator_before {
            None
        } else {
            Some(self.parse_expression(ctx.with(Context::ALLOW_IN))?)
        };
        self.consume_semicolon()?;
        let span = self.span_to_here(start);
        Ok(Statement::ReturnStatement(ReturnStatement { node_type: "ReturnStatement", loc: self.loc(span), argument }))
    }

    fn parse_with_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start = self.cur.span;
        if ctx.is_strict() {
            return Err(ParseErrorType::StrictModeWith.at(start.start_pos));
        }
        self.bump()?;
        self.expect(TokenKind::LParen, "'('")?;
        let object = self.parse_expression(ctx.with(Context::ALLOW_IN))?;
        self.expect(TokenKind::RParen, "')'")?;
        let body = Box::new(self.parse_statement(ctx)?);
        let span = self.span_to_here(start);
        Ok(Statement::WithStatement(WithStatement { node_type: "WithStatement", loc: self.loc(span), object, body }))
    }

    fn parse_switch_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start = self.cur.span;
        self.bump()?;
        self.expect(TokenKind::LParen, "'('")?;
        let discriminant = self.parse_expression(ctx.with(Context::ALLOW_IN))?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        self.scope.push_block();
        self.in_loop_or_switch_depth += 1;
        let mut cases = Vec::new();
        let mut seen_default = false;
        while !self.at(TokenKind::RBrace) {
            let case_start = self.cur.span;
            let test = if self.eat_keyword(Keyword::Case)? {
                Some(self.parse_expression(ctx.with(Context::ALLOW_IN))?)
            } else {
                self.expect(TokenKind::Keyword(Keyword::Default), "'case' or 'default'")?;
                if seen_default {
                    return Err(ParseErrorType::MultipleDefaultClauses.at(case_start.start_pos));
                }
                seen_default = true;
                None
            };
            self.expect(TokenKind::Colon, "':'")?;
            let mut consequent = Vec::new();
            while !self.at_keyword(Keyword::Case) && !self.at_keyword(Keyword::Default) && !self.at(TokenKind::RBrace) {
                consequent.push(self.parse_statement_list_item(ctx)?);
            }
            let span = self.span_to_here(case_start);
            cases.push(SwitchCase { node_type: "SwitchCase", loc: self.loc(span), test, consequent });
        }
        self.in_loop_or_switch_depth -= 1;
        self.scope.pop();
        self.bump()?; // '}'
        let span = self.span_to_here(start);
        Ok(Statement::SwitchStatement(SwitchStatement { node_type: "SwitchStatement", loc: self.loc(span), discriminant, cases }))
    }

    fn parse_throw_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start = self.cur.span;
        self.bump()?;
        if self.cur.line_terminator_before {
            return Err(ParseErrorType::Unexpected("line terminator after 'throw'".into()).at(start.start_pos));
        }
        let argument = self.parse_expression(ctx.with(Context::ALLOW_IN))?;
        self.consume_semicolon()?;
        let span = self.span_to_here(start);
        Ok(Statement::ThrowStatement(ThrowStatement { node_type: "ThrowStatement", loc: self.loc(span), argument }))
    }

    fn parse_try_statement(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start = self.cur.span;
        self.bump()?;
        let block = self.parse_block(ctx)?;
        let handler = if self.eat_keyword(Keyword::Catch)? {
            let catch_start = self.prev_end_span();
            self.scope.push_block();
            let param = if self.eat(TokenKind::LParen)? {
                let p = self.parse_binding_target(ctx)?;
                self.declare_binding(&p, VariableKind::Let)?;
                self.expect(TokenKind::RParen, "')'")?;
                Some(p)
            } else {
                if !ctx.contains(Context::ALLOW_NEXT) {
                    return Err(ParseErrorType::FeatureDisabled("optional catch binding").at(catch_start.start_pos));
                }
                None
            };
            let body = self.parse_block_no_new_scope(ctx)?;
            self.scope.pop();
            let span = self.span_to_here(catch_start);
            Some(CatchClause { node_type: "CatchClause", loc: self.loc(span), param, body })
        } else {
            None
        };
        let finalizer = if self.eat_keyword(Keyword::Finally)? {
            Some(self.parse_block(ctx)?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.unexpected("'catch' or 'finally'"));
        }
        let span = self.span_to_here(start);
        Ok(Statement::TryStatement(TryStatement { node_type: "TryStatement", loc: self.loc(span), block, handler, finalizer }))
    }

    /// Parse a `{ ... }` block whose scope was already pushed by the caller
    /// (the `catch` clause shares one block scope between its parameter and body).
    fn parse_block_no_new_scope(&mut self, ctx: Context) -> ParseResult<BlockStatement> {
        let start = self.expect(TokenKind::LBrace, "'{'")?.span;
        let mut body = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            body.push(self.parse_statement_list_item(ctx)?);
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        let span = self.span_to_here(start);
        Ok(BlockStatement { node_type: "BlockStatement", loc: self.loc(span), body })
    }

    // ---- expressions ------------------------------------------------------------------

    fn parse_expression(&mut self, ctx: Context) -> ParseResult<Expression> {
        let start = self.cur.span;
        let first = self.parse_assignment_expression(ctx)?;
        if !self.at(TokenKind::Comma) {
            return Ok(first);
        }
        let mut exprs = vec![first];
        while self.eat(TokenKind::Comma)? {
            exprs.push(self.parse_assignment_expression(ctx)?);
        }
        let span = self.span_to_here(start);
        Ok(Expression::SequenceExpression(SequenceExpression { node_type: "SequenceExpression", loc: self.loc(span), expressions: exprs }))
    }

    fn parse_assignment_expression(&mut self, ctx: Context) -> ParseResult<Expression> {
        if ctx.contains(Context::ALLOW_YIELD) && self.at_keyword(Keyword::Yield) {
            return self.parse_yield_expression(ctx);
        }
        if let Some(arrow) = self.try_parse_arrow_function(ctx)? {
            return Ok(arrow);
        }
        let start = self.cur.span;
        let left = self.parse_conditional_expression(ctx)?;
        if self.cur.kind.is_assignment_operator() {
            let op = assignment_operator(self.cur.kind);
            self.bump()?;
            let target = expression_to_assignment_target(left).map_err(|e| e.at(start.start_pos))?;
            let right = self.parse_assignment_expression(ctx)?;
            let span = self.span_to_here(start);
            return Ok(Expression::AssignmentExpression(AssignmentExpression {
                node_type: "AssignmentExpression",
                loc: self.loc(span),
                operator: op,
                left: Box::new(target),
                right: Box::new(right),
            }));
        }
        Ok(left)
    }

    fn parse_yield_expression(&mut self, ctx: Context) -> ParseResult<Expression> {
        let start = self.cur.span;
        self.bump()?;
        let delegate = !self.cur.line_terminator_before && self.eat(TokenKind::Star)?;
        let can_have_argument = !self.cur.line_terminator_before
            && !matches!(self.cur.kind, TokenKind::Semi | TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket | TokenKind::Comma | TokenKind::Colon | TokenKind::Eof);
        let argument = if delegate || can_have_argument {
            Some(Box::new(self.parse_assignment_expression(ctx)?))
        } else {
            None
        };
        let span = self.span_to_here(start);
        Ok(Expression::YieldExpression(YieldExpression { node_type: "YieldExpression", loc: self.loc(span), argument, delegate }))
    }

    /// Attempts the arrow-function cover grammar: `Identifier =>` and
    /// `( ... ) =>` (the latter implemented by speculatively parsing a
    /// parenthesized expression and reinterpreting it on success, never
    /// constructing AST during the probe itself — the probe here is the
    /// single-identifier case, which needs no snapshot/restore at all).
    fn try_parse_arrow_function(&mut self, ctx: Context) -> ParseResult<Option<Expression>> {
        let is_async = self.is_contextual("async") && !self.cur.line_terminator_before;
        if matches!(self.cur.kind, TokenKind::Identifier) && !self.cur_is_async_arrow_head() {
            if self.peeks_arrow_after_identifier() {
                let start = self.cur.span;
                let name = self.cur.text.clone().unwrap();
                self.bump()?;
                self.expect(TokenKind::Arrow, "'=>'")?;
                return Ok(Some(self.finish_arrow_function(ctx, start, vec![Pattern::Identifier(Identifier {
                    node_type: "Identifier",
                    loc: self.loc(start),
                    name,
                })], false, is_async)?));
            }
        }
        if self.at(TokenKind::LParen) {
            if let Some(arrow) = self.try_parse_parenthesized_arrow(ctx, false)? {
                return Ok(Some(arrow));
            }
        }
        Ok(None)
    }

    fn cur_is_async_arrow_head(&self) -> bool {
        false
    }

    /// One-token-of-source lookahead: is the current identifier immediately
    /// followed by `=>` (module-source scan, not the token stream, so no
    /// state needs restoring)?
    fn peeks_arrow_after_identifier(&self) -> bool {
        let rest = &self.lexer.source()[self.cur.span.end as usize..];
        let trimmed = rest.trim_start_matches(|c: char| c == ' ' || c == '\t');
        trimmed.starts_with("=>")
    }

    fn try_parse_parenthesized_arrow(&mut self, ctx: Context, is_async: bool) -> ParseResult<Option<Expression>> {
        let start = self.cur.span;
        let snapshot = self.snapshot();
        self.bump()?; // '('
        let mut params = Vec::new();
        let mut ok = true;
        while !self.at(TokenKind::RParen) {
            if self.eat(TokenKind::Ellipsis)? {
                let arg = match self.parse_binding_target(ctx) {
                    Ok(p) => p,
                    Err(_) => { ok = false; break; }
                };
                params.push(Pattern::RestElement(RestElement { node_type: "RestElement", loc: self.loc(start), argument: Box::new(arg) }));
                break;
            }
            match self.parse_binding_element(ctx) {
                Ok(p) => params.push(p),
                Err(_) => { ok = false; break; }
            }
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        if ok && self.at(TokenKind::RParen) {
            self.bump()?;
            if self.at(TokenKind::Arrow) && !self.cur.line_terminator_before {
                self.bump()?;
                return Ok(Some(self.finish_arrow_function(ctx, start, params, false, is_async)?));
            }
        }
        self.restore(snapshot);
        Ok(None)
    }

    fn finish_arrow_function(&mut self, ctx: Context, start: Span, params: Vec<Pattern>, generator: bool, is_async: bool) -> ParseResult<Expression> {
        let arrow_ctx = ctx
            .with(Context::ARROW)
            .set(Context::ALLOW_AWAIT, is_async)
            .without(Context::ALLOW_YIELD);
        self.scope.push_function();
        for p in &params {
            self.declare_binding(p, VariableKind::Var)?;
        }
        self.in_function_depth += 1;
        let (body, expression) = if self.at(TokenKind::LBrace) {
            (ArrowFunctionBody::Block(Box::new(self.parse_block(arrow_ctx)?)), false)
        } else {
            (ArrowFunctionBody::Expression(Box::new(self.parse_assignment_expression(arrow_ctx.with(Context::ALLOW_IN))?)), true)
        };
        self.in_function_depth -= 1;
        self.scope.pop();
        let span = self.span_to_here(start);
        Ok(Expression::ArrowFunctionExpression(ArrowFunctionExpression {
            node_type: "ArrowFunctionExpression",
            loc: self.loc(span),
            id: None,
            params,
            body,
            expression,
            generator,
            is_async,
        }))
    }

    fn parse_conditional_expression(&mut self, ctx: Context) -> ParseResult<Expression> {
        let start = self.cur.span;
        let test = self.parse_binary_expression(ctx, 0)?;
        if self.eat(TokenKind::Question)? {
            let consequent = self.parse_assignment_expression(ctx.with(Context::ALLOW_IN))?;
            self.expect(TokenKind::Colon, "':'")?;
            let alternate = self.parse_assignment_expression(ctx)?;
            let span = self.span_to_here(start);
            return Ok(Expression::ConditionalExpression(ConditionalExpression {
                node_type: "ConditionalExpression",
                loc: self.loc(span),
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            }));
        }
        Ok(test)
    }

    fn parse_binary_expression(&mut self, ctx: Context, min_prec: u8) -> ParseResult<Expression> {
        let start = self.cur.span;
        let mut left = self.parse_unary_expression(ctx)?;
        loop {
            if self.at_keyword(Keyword::In) && !ctx.contains(Context::ALLOW_IN) {
                break;
            }
            let prec = match self.cur.kind.binary_precedence() {
                Some(p) if p as u8 >= min_prec.max(if self.cur.kind.binary_precedence() == Some(3) { 1 } else { 0 }) => p,
                _ => break,
            };
            if (prec) < min_prec {
                break;
            }
            let is_logical = matches!(self.cur.kind, TokenKind::AmpAmp | TokenKind::PipePipe | TokenKind::QuestionQuestion);
            let op_kind = self.cur.kind;
            self.bump()?;
            let next_min = if op_kind.is_right_associative() { prec } else { prec + 1 };
            let right = self.parse_binary_expression(ctx, next_min)?;
            let span = self.span_to_here(start);
            left = if is_logical {
                Expression::LogicalExpression(LogicalExpression {
                    node_type: "LogicalExpression",
                    loc: self.loc(span),
                    operator: logical_operator(op_kind),
                    left: Box::new(left),
                    right: Box::new(right),
                })
            } else {
                Expression::BinaryExpression(BinaryExpression {
                    node_type: "BinaryExpression",
                    loc: self.loc(span),
                    operator: binary_operator(op_kind),
                    left: Box::new(left),
                    right: Box::new(right),
                })
            };
        }
        Ok(left)
    }

    fn parse_unary_expression(&mut self, ctx: Context) -> ParseResult<Expression> {
        if self.cur.kind.is_unary_operator() {
            let start = self.cur.span;
            let op_kind = self.cur.kind;
            self.bump()?;
            let argument = self.parse_unary_expression(ctx)?;
            if matches!(op_kind, TokenKind::Keyword(Keyword::Delete)) && ctx.is_strict() {
                if matches!(&argument, Expression::Identifier(_)) {
                    return Err(ParseErrorType::StrictDelete.at(start.start_pos));
                }
            }
            let span = self.span_to_here(start);
            return Ok(Expression::UnaryExpression(UnaryExpression {
                node_type: "UnaryExpression",
                loc: self.loc(span),
                operator: unary_operator(op_kind),
                prefix: true,
                argument: Box::new(argument),
            }));
        }
        if ctx.contains(Context::ALLOW_AWAIT) && self.at_keyword(Keyword::Await) {
            let start = self.cur.span;
            self.bump()?;
            let argument = self.parse_unary_expression(ctx)?;
            let span = self.span_to_here(start);
            return Ok(Expression::AwaitExpression(AwaitExpression { node_type: "AwaitExpression", loc: self.loc(span), argument: Box::new(argument) }));
        }
        if self.cur.kind.is_update_operator() {
            let start = self.cur.span;
            let op_kind = self.cur.kind;
            self.bump()?;
            let argument = self.parse_unary_expression(ctx)?;
            let span = self.span_to_here(start);
            return Ok(Expression::UpdateExpression(UpdateExpression {
                node_type: "UpdateExpression",
                loc: self.loc(span),
                operator: update_operator(op_kind),
                argument: Box::new(argument),
                prefix: true,
            }));
        }
        self.parse_postfix_expression(ctx)
    }

    fn parse_postfix_expression(&mut self, ctx: Context) -> ParseResult<Expression> {
        let start = self.cur.span;
        let expr = self.parse_lhs_expression(ctx)?;
        if !self.cur.line_terminator_before && self.cur.kind.is_update_operator() {
            let op_kind = self.cur.kind;
            self.bump()?;
            let span = self.span_to_here(start);
            return Ok(Expression::UpdateExpression(UpdateExpression {
                node_type: "UpdateExpression",
                loc: self.loc(span),
                operator: update_operator(op_kind),
                argument: Box::new(expr),
                prefix: false,
            }));
        }
        Ok(expr)
    }

    fn parse_lhs_expression(&mut self, ctx: Context) -> ParseResult<Expression> {
        let start = self.cur.span;
        let mut expr = if self.at_keyword(Keyword::New) {
            self.parse_new_expression(ctx)?
        } else {
            self.parse_primary_expression(ctx)?
        };
        loop {
            expr = match &self.cur.kind {
                TokenKind::Dot => {
                    self.bump()?;
                    let prop = self.parse_property_name_identifier()?;
                    let span = self.span_to_here(start);
                    Expression::MemberExpression(MemberExpression {
                        node_type: "MemberExpression",
                        loc: self.loc(span),
                        object: Box::new(to_member_object(expr)),
                        property: Box::new(prop),
                        computed: false,
                        optional: false,
                    })
                }
                TokenKind::LBracket => {
                    self.bump()?;
                    let prop = self.parse_expression(ctx.with(Context::ALLOW_IN))?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    let span = self.span_to_here(start);
                    Expression::MemberExpression(MemberExpression {
                        node_type: "MemberExpression",
                        loc: self.loc(span),
                        object: Box::new(to_member_object(expr)),
                        property: Box::new(prop),
                        computed: true,
                        optional: false,
                    })
                }
                TokenKind::QuestionDot => {
                    self.bump()?;
                    if self.at(TokenKind::LParen) {
                        let args = self.parse_arguments(ctx)?;
                        let span = self.span_to_here(start);
                        Expression::CallExpression(CallExpression {
                            node_type: "CallExpression",
                            loc: self.loc(span),
                            callee: Box::new(to_call_callee(expr)),
                            arguments: args,
                            optional: true,
                        })
                    } else if self.eat(TokenKind::LBracket)? {
                        let prop = self.parse_expression(ctx.with(Context::ALLOW_IN))?;
                        self.expect(TokenKind::RBracket, "']'")?;
                        let span = self.span_to_here(start);
                        Expression::MemberExpression(MemberExpression {
                            node_type: "MemberExpression",
                            loc: self.loc(span),
                            object: Box::new(to_member_object(expr)),
                            property: Box::new(prop),
                            computed: true,
                            optional: true,
                        })
                    } else {
                        let prop = self.parse_property_name_identifier()?;
                        let span = self.span_to_here(start);
                        Expression::MemberExpression(MemberExpression {
                            node_type: "MemberExpression",
                            loc: self.loc(span),
                            object: Box::new(to_member_object(expr)),
                            property: Box::new(prop),
                            computed: false,
                            optional: true,
                        })
                    }
                }
                TokenKind::LParen => {
                    let args = self.parse_arguments(ctx)?;
                    let span = self.span_to_here(start);
                    Expression::CallExpression(CallExpression {
                        node_type: "CallExpression",
                        loc: self.loc(span),
                        callee: Box::new(to_call_callee(expr)),
                        arguments: args,
                        optional: false,
                    })
                }
                TokenKind::TemplateNoSubstitution | TokenKind::TemplateHead => {
                    let quasi = self.parse_template_literal(ctx)?;
                    let span = self.span_to_here(start);
                    Expression::TaggedTemplateExpression(TaggedTemplateExpression {
                        node_type: "TaggedTemplateExpression",
                        loc: self.loc(span),
                        tag: Box::new(expr),
                        quasi,
                    })
                }
                _ => break,
            };
        }
        Ok(expr)
    }

    fn parse_new_expression(&mut self, ctx: Context) -> ParseResult<Expression> {
        let start = self.cur.span;
        self.bump()?; // 'new'
        if self.eat(TokenKind::Dot)? {
            let prop_span = self.cur.span;
            let prop_name = self.expect_identifier_name()?;
            if prop_name != "target" {
                return Err(self.unexpected("'target'"));
            }
            let span = self.span_to_here(start);
            return Ok(Expression::MetaProperty(MetaProperty {
                node_type: "MetaProperty",
                loc: self.loc(span),
                meta: Identifier { node_type: "Identifier", loc: self.loc(start), name: Atom::from("new") },
                property: Identifier { node_type: "Identifier", loc: self.loc(prop_span), name: Atom::from("target") },
            }));
        }
        let callee = if self.at_keyword(Keyword::New) {
            self.parse_new_expression(ctx)?
        } else {
            self.parse_member_expression_no_call(ctx)?
        };
        let arguments = if self.at(TokenKind::LParen) { self.parse_arguments(ctx)? } else { Vec::new() };
        let span = self.span_to_here(start);
        Ok(Expression::NewExpression(NewExpression { node_type: "NewExpression", loc: self.loc(span), callee: Box::new(callee), arguments }))
    }

    fn parse_member_expression_no_call(&mut self, ctx: Context) -> ParseResult<Expression> {
        let start = self.cur.span;
        let mut expr = self.parse_primary_expression(ctx)?;
        loop {
            expr = match &self.cur.kind {
                TokenKind::Dot => {
                    self.bump()?;
                    let prop = self.parse_property_name_identifier()?;
                    let span = self.span_to_here(start);
                    Expression::MemberExpression(MemberExpression { node_type: "MemberExpression", loc: self.loc(span), object: Box::new(to_member_object(expr)), property: Box::new(prop), computed: false, optional: false })
                }
                TokenKind::LBracket => {
                    self.bump()?;
                    let prop = self.parse_expression(ctx.with(Context::ALLOW_IN))?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    let span = self.span_to_here(start);
                    Expression::MemberExpression(MemberExpression { node_type: "MemberExpression", loc: self.loc(span), object: Box::new(to_member_object(expr)), property: Box::new(prop), computed: true, optional: false })
                }
                _ => break,
            };
        }
        Ok(expr)
    }

    fn parse_property_name_identifier(&mut self) -> ParseResult<Expression> {
        if self.at(TokenKind::PrivateIdentifier) {
            let span = self.cur.span;
            let name = self.cur.text.clone().unwrap();
            self.bump()?;
            return Ok(Expression::PrivateIdentifier(PrivateIdentifier { node_type: "PrivateIdentifier", loc: self.loc(span), name }));
        }
        let span = self.cur.span;
        let name = self.expect_identifier_name()?;
        Ok(Expression::Identifier(Identifier { node_type: "Identifier", loc: self.loc(span), name: Atom::from(name) }))
    }

    fn expect_identifier_name(&mut self) -> ParseResult<String> {
        if !self.cur.kind.is_identifier_name() {
            return Err(self.unexpected("identifier"));
        }
        let name = match self.cur.kind {
            TokenKind::Keyword(kw) => kw.text().to_string(),
            _ => self.cur.text.as_deref().unwrap_or_default().to_string(),
        };
        self.bump()?;
        Ok(name)
    }

    fn parse_arguments(&mut self, ctx: Context) -> ParseResult<Vec<Expression>> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        while !self.at(TokenKind::RParen) {
            if self.eat(TokenKind::Ellipsis)? {
                let start = self.prev_end_span();
                let arg = self.parse_assignment_expression(ctx.with(Context::ALLOW_IN))?;
                let span = self.span_to_here(start);
                args.push(Expression::SpreadElement(SpreadElement { node_type: "SpreadElement", loc: self.loc(span), argument: Box::new(arg) }));
            } else {
                args.push(self.parse_assignment_expression(ctx.with(Context::ALLOW_IN))?);
            }
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(args)
    }

    fn parse_primary_expression(&mut self, ctx: Context) -> ParseResult<Expression> {
        let start = self.cur.span;
        match self.cur.kind {
            TokenKind::Keyword(Keyword::This) => {
                self.bump()?;
                Ok(Expression::ThisExpression(ThisExpression { node_type: "ThisExpression", loc: self.loc(start) }))
            }
            TokenKind::Keyword(Keyword::Super) => {
                self.bump()?;
                Ok(Expression::Identifier(Identifier { node_type: "Identifier", loc: self.loc(start), name: Atom::from("super") }))
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.bump()?;
                Ok(Expression::Literal(self.literal(start, LiteralValue::Null, None)))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.bump()?;
                Ok(Expression::Literal(self.literal(start, LiteralValue::Bool(true), None)))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.bump()?;
                Ok(Expression::Literal(self.literal(start, LiteralValue::Bool(false), None)))
            }
            TokenKind::NumericLiteral => {
                let value = match self.cur.number {
                    Some(crate::token::NumberValue::Float(f)) => f,
                    _ => 0.0,
                };
                let raw = self.cur.raw.clone();
                self.bump()?;
                Ok(Expression::Literal(self.literal(start, LiteralValue::Number(value), raw)))
            }
            TokenKind::BigIntLiteral => {
                if !ctx.contains(Context::ALLOW_NEXT) {
                    return Err(ParseErrorType::FeatureDisabled("BigInt literal").at(start.start_pos));
                }
                let raw = self.cur.raw.clone();
                self.bump()?;
                let mut lit = self.literal(start, LiteralValue::Unrepresentable, raw.clone());
                lit.bigint = raw.map(|r| Atom::from(r.trim_end_matches('n')));
                Ok(Expression::Literal(lit))
            }
            TokenKind::StringLiteral => {
                let value = self.cur.string_value.clone().unwrap_or_default();
                let raw = self.cur.raw.clone();
                self.bump()?;
                Ok(Expression::Literal(self.literal(start, LiteralValue::String(value), raw)))
            }
            TokenKind::Slash | TokenKind::SlashAssign => {
                let tok = self.bump_regexp()?;
                let info = tok.regex.unwrap();
                if info.flags.contains('s') && !ctx.contains(Context::ALLOW_NEXT) {
                    return Err(ParseErrorType::FeatureDisabled("regular expression 's' flag").at(start.start_pos));
                }
                let mut lit = self.literal(start, LiteralValue::Unrepresentable, tok.raw.clone());
                lit.regex = Some(RegExpLiteralInfo { pattern: info.pattern, flags: info.flags });
                Ok(Expression::Literal(lit))
            }
            TokenKind::TemplateNoSubstitution | TokenKind::TemplateHead => {
                Ok(Expression::TemplateLiteral(self.parse_template_literal(ctx)?))
            }
            TokenKind::Identifier => {
                if self.is_contextual("async") && self.next_is_function_no_newline() {
                    return Ok(Expression::FunctionExpression(function_to_fn_expr(self.parse_async_function(ctx, true)?)));
                }
                let name = self.cur.text.clone().unwrap();
                self.bump()?;
                Ok(Expression::Identifier(Identifier { node_type: "Identifier", loc: self.loc(start), name }))
            }
            TokenKind::PrivateIdentifier => {
                let name = self.cur.text.clone().unwrap();
                self.bump()?;
                Ok(Expression::PrivateIdentifier(PrivateIdentifier { node_type: "PrivateIdentifier", loc: self.loc(start), name }))
            }
            TokenKind::LParen => self.parse_parenthesized_expression(ctx),
            TokenKind::LBracket => self.parse_array_literal(ctx),
            TokenKind::LBrace => self.parse_object_literal(ctx),
            TokenKind::Keyword(Keyword::Function) => Ok(Expression::FunctionExpression(function_to_fn_expr(self.parse_function(ctx, true)?))),
            TokenKind::Keyword(Keyword::Class) => Ok(Expression::ClassExpression(class_decl_to_expr(self.parse_class(ctx, true)?))),
            TokenKind::Keyword(Keyword::Import) => {
                if !ctx.contains(Context::ALLOW_NEXT) {
                    return Err(ParseErrorType::FeatureDisabled("dynamic import()").at(start.start_pos));
                }
                self.bump()?;
                if self.eat(TokenKind::Dot)? {
                    let prop_span = self.cur.span;
                    let name = self.expect_identifier_name()?;
                    let span = self.span_to_here(start);
                    return Ok(Expression::MetaProperty(MetaProperty {
                        node_type: "MetaProperty",
                        loc: self.loc(span),
                        meta: Identifier { node_type: "Identifier", loc: self.loc(start), name: Atom::from("import") },
                        property: Identifier { node_type: "Identifier", loc: self.loc(prop_span), name: Atom::from(name) },
                    }));
                }
                let args = self.parse_arguments(ctx)?;
                if args.len() != 1 {
                    return Err(ParseErrorType::BadImportCallArity.at(start.start_pos));
                }
                let span = self.span_to_here(start);
                Ok(Expression::ImportExpression(ImportExpression { node_type: "ImportExpression", loc: self.loc(span), source: Box::new(args.into_iter().next().unwrap()) }))
            }
            TokenKind::Keyword(Keyword::Do) if ctx.contains(Context::ALLOW_V8) => {
                self.bump()?;
                let body = self.parse_block(ctx)?;
                let span = self.span_to_here(start);
                Ok(Expression::DoExpression(DoExpression { node_type: "DoExpression", loc: self.loc(span), body }))
            }
            TokenKind::Keyword(Keyword::Throw) if ctx.contains(Context::ALLOW_V8) => {
                self.bump()?;
                let argument = self.parse_assignment_expression(ctx)?;
                let span = self.span_to_here(start);
                Ok(Expression::ThrowExpression(ThrowExpression { node_type: "ThrowExpression", loc: self.loc(span), argument: Box::new(argument) }))
            }
            TokenKind::Lt if ctx.contains(Context::ALLOW_JSX) => self.parse_jsx_element_or_fragment(ctx),
            TokenKind::Keyword(kw) if !kw.is_always_reserved() => {
                let name = Atom::from(kw.text());
                self.bump()?;
                Ok(Expression::Identifier(Identifier { node_type: "Identifier", loc: self.loc(start), name }))
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    // ---- JSX ----------------------------------------------------------------------------

    /// Re-lexes from just after the already-consumed token as JSX text
    /// (everything up to the next `<`, `{`, or `}`), bypassing the ordinary
    /// regex-vs-divide-style lookahead `scan` would otherwise apply.
    fn bump_jsx_text(&mut self) -> ParseResult<Token> {
        self.prev_end = self.cur.span.end;
        let next = self.lexer.scan_jsx_text()?;
        Ok(std::mem::replace(&mut self.cur, next))
    }

    /// Entry point from expression position: `cur` is the opening `<`.
    fn parse_jsx_element_or_fragment(&mut self, ctx: Context) -> ParseResult<Expression> {
        let start = self.cur.span;
        self.bump()?; // '<'
        if self.at(TokenKind::Gt) {
            Ok(Expression::JsxFragment(self.parse_jsx_fragment_rest(ctx, start, false)?))
        } else {
            Ok(Expression::JsxElement(self.parse_jsx_opening_and_rest(ctx, start, false)?))
        }
    }

    /// A plain identifier, `ns:name`, or `a.b.c` tag/attribute name.
    fn parse_jsx_name(&mut self) -> ParseResult<JsxName> {
        let start = self.cur.span;
        let name = Atom::from(self.expect_identifier_name()?);
        let ident = Identifier { node_type: "Identifier", loc: self.loc(start), name };
        if self.eat(TokenKind::Colon)? {
            let local_span = self.cur.span;
            let local_name = Atom::from(self.expect_identifier_name()?);
            let local = Identifier { node_type: "Identifier", loc: self.loc(local_span), name: local_name };
            let span = self.span_to_here(start);
            return Ok(JsxName::NamespacedName(Box::new(JsxNamespacedName {
                node_type: "JSXNamespacedName",
                loc: self.loc(span),
                namespace: ident,
                name: local,
            })));
        }
        if self.at(TokenKind::Dot) {
            let mut expr = Expression::Identifier(ident);
            while self.eat(TokenKind::Dot)? {
                let prop = self.parse_property_name_identifier()?;
                let span = self.span_to_here(start);
                expr = Expression::MemberExpression(MemberExpression {
                    node_type: "MemberExpression",
                    loc: self.loc(span),
                    object: Box::new(to_member_object(expr)),
                    property: Box::new(prop),
                    computed: false,
                    optional: false,
                });
            }
            return Ok(match expr {
                Expression::MemberExpression(m) => JsxName::MemberExpression(m),
                _ => unreachable!(),
            });
        }
        Ok(JsxName::Identifier(ident))
    }

    fn parse_jsx_attributes(&mut self, ctx: Context) -> ParseResult<Vec<JsxAttributeKind>> {
        let mut attrs = Vec::new();
        loop {
            if self.at(TokenKind::Gt) || self.at(TokenKind::Slash) || self.at(TokenKind::Eof) {
                break;
            }
            if self.eat(TokenKind::LBrace)? {
                let spread_start = self.prev_end_span();
                self.expect(TokenKind::Ellipsis, "'...'")?;
                let argument = self.parse_assignment_expression(ctx.with(Context::ALLOW_IN))?;
                self.expect(TokenKind::RBrace, "'}'")?;
                let span = self.span_to_here(spread_start);
                attrs.push(JsxAttributeKind::Spread(JsxSpreadAttribute {
                    node_type: "JSXSpreadAttribute",
                    loc: self.loc(span),
                    argument,
                }));
                continue;
            }
            let attr_start = self.cur.span;
            let name = self.parse_jsx_name()?;
            let value = if self.eat(TokenKind::Assign)? { Some(self.parse_jsx_attribute_value(ctx)?) } else { None };
            let span = self.span_to_here(attr_start);
            attrs.push(JsxAttributeKind::Attribute(JsxAttribute { node_type: "JSXAttribute", loc: self.loc(span), name, value }));
        }
        Ok(attrs)
    }

    fn parse_jsx_attribute_value(&mut self, ctx: Context) -> ParseResult<JsxAttributeValue> {
        if self.at(TokenKind::StringLiteral) {
            let start = self.cur.span;
            let value = self.cur.string_value.clone().unwrap_or_default();
            let raw = self.cur.raw.clone();
            self.bump()?;
            return Ok(JsxAttributeValue::Literal(self.literal(start, LiteralValue::String(value), raw)));
        }
        if self.eat(TokenKind::LBrace)? {
            let start = self.prev_end_span();
            let expression = Some(self.parse_assignment_expression(ctx.with(Context::ALLOW_IN))?);
            self.expect(TokenKind::RBrace, "'}'")?;
            let span = self.span_to_here(start);
            return Ok(JsxAttributeValue::ExpressionContainer(JsxExpressionContainer {
                node_type: "JSXExpressionContainer",
                loc: self.loc(span),
                expression,
            }));
        }
        if self.at(TokenKind::Lt) {
            let start = self.cur.span;
            self.bump()?; // '<'
            if self.at(TokenKind::Gt) {
                return Err(self.unexpected("JSX element"));
            }
            let element = self.parse_jsx_opening_and_rest(ctx, start, false)?;
            return Ok(JsxAttributeValue::Element(element));
        }
        Err(self.unexpected("string, '{', or JSX element"))
    }

    /// `cur` is the token following an opening `<` that isn't `/` or `>`: a
    /// tag name. `parent_is_jsx_children` selects which mode the lexer
    /// resumes in once this element's own closing tag is consumed.
    fn parse_jsx_opening_and_rest(&mut self, ctx: Context, start: Span, parent_is_jsx_children: bool) -> ParseResult<JsxElement> {
        let name = self.parse_jsx_name()?;
        let attributes = self.parse_jsx_attributes(ctx)?;
        if self.eat(TokenKind::Slash)? {
            if !self.at(TokenKind::Gt) {
                return Err(self.unexpected("'>'"));
            }
            let opening_span = self.span_to_here(start);
            if parent_is_jsx_children {
                self.bump_jsx_text()?;
            } else {
                self.bump()?;
            }
            let opening_element = JsxOpeningElement { node_type: "JSXOpeningElement", loc: self.loc(opening_span), name, attributes, self_closing: true };
            let span = self.span_to_here(start);
            return Ok(JsxElement { node_type: "JSXElement", loc: self.loc(span), opening_element, children: Vec::new(), closing_element: None });
        }
        if !self.at(TokenKind::Gt) {
            return Err(self.unexpected("'>' or '/>'"));
        }
        let opening_span = self.span_to_here(start);
        self.bump_jsx_text()?; // enter this element's own children
        let opening_element = JsxOpeningElement { node_type: "JSXOpeningElement", loc: self.loc(opening_span), name, attributes, self_closing: false };

        let result = self.parse_jsx_children(ctx)?;
        let closing_name = result.closing_name.ok_or_else(|| self.unexpected("JSX closing tag name"))?;
        if jsx_name_to_string(&closing_name) != jsx_name_to_string(&opening_element.name) {
            return Err(ParseErrorType::JsxTagMismatch {
                open: jsx_name_to_string(&opening_element.name),
                close: jsx_name_to_string(&closing_name),
            }
            .at(result.closing_span.start_pos));
        }
        if parent_is_jsx_children {
            self.bump_jsx_text()?;
        } else {
            self.bump()?;
        }
        let closing_element = JsxClosingElement { node_type: "JSXClosingElement", loc: self.loc(result.closing_span), name: closing_name };
        let span = self.span_to_here(start);
        Ok(JsxElement { node_type: "JSXElement", loc: self.loc(span), opening_element, children: result.children, closing_element: Some(closing_element) })
    }

    /// `cur` is `>` immediately after the fragment's opening `<`.
    fn parse_jsx_fragment_rest(&mut self, ctx: Context, start: Span, parent_is_jsx_children: bool) -> ParseResult<JsxFragment> {
        self.bump_jsx_text()?; // enter the fragment's children
        let result = self.parse_jsx_children(ctx)?;
        if result.closing_name.is_some() {
            return Err(self.unexpected("'>'"));
        }
        if parent_is_jsx_children {
            self.bump_jsx_text()?;
        } else {
            self.bump()?;
        }
        let span = self.span_to_here(start);
        Ok(JsxFragment { node_type: "JSXFragment", loc: self.loc(span), children: result.children })
    }

    fn parse_jsx_children(&mut self, ctx: Context) -> ParseResult<JsxChildrenResult> {
        let child_ctx = ctx.with(Context::JSX_CHILD);
        let mut children = Vec::new();
        loop {
            match self.cur.kind {
                TokenKind::JsxText => {
                    let text_span = self.cur.span;
                    let raw = self.cur.string_value.clone().unwrap_or_default();
                    self.bump()?;
                    if !raw.is_empty() {
                        children.push(JsxChild::Text(JsxText { node_type: "JSXText", loc: self.loc(text_span), value: raw.clone(), raw }));
                    }
                }
                TokenKind::LBrace => {
                    let start = self.cur.span;
                    self.bump()?; // '{'
                    let expression = if self.at(TokenKind::RBrace) {
                        None
                    } else {
                        Some(self.parse_assignment_expression(child_ctx.with(Context::ALLOW_IN))?)
                    };
                    if !self.at(TokenKind::RBrace) {
                        return Err(self.unexpected("'}'"));
                    }
                    self.bump_jsx_text()?;
                    let span = self.span_to_here(start);
                    children.push(JsxChild::ExpressionContainer(JsxExpressionContainer { node_type: "JSXExpressionContainer", loc: self.loc(span), expression }));
                }
                TokenKind::Lt => {
                    let lt_span = self.cur.span;
                    self.bump()?; // '<'
                    if self.eat(TokenKind::Slash)? {
                        let closing_name = if self.at(TokenKind::Gt) { None } else { Some(self.parse_jsx_name()?) };
                        if !self.at(TokenKind::Gt) {
                            return Err(self.unexpected("'>'"));
                        }
                        let closing_span = self.span_to_here(lt_span);
                        return Ok(JsxChildrenResult { children, closing_name, closing_span });
                    }
                    if self.at(TokenKind::Gt) {
                        let fragment = self.parse_jsx_fragment_rest(child_ctx, lt_span, true)?;
                        children.push(JsxChild::Fragment(fragment));
                    } else {
                        let element = self.parse_jsx_opening_and_rest(child_ctx, lt_span, true)?;
                        children.push(JsxChild::Element(element));
                    }
                }
                TokenKind::Eof => return Err(self.unexpected("JSX closing tag")),
                _ => return Err(self.unexpected("JSX child")),
            }
        }
    }

    fn literal(&self, span: Span, value: LiteralValue, raw: Option<Atom>) -> Literal {
        Literal { node_type: "Literal", loc: self.loc(span), value, raw: raw.filter(|_| self.options.raw), regex: None, bigint: None }
    }

    fn parse_parenthesized_expression(&mut self, ctx: Context) -> ParseResult<Expression> {
        self.bump()?; // '('
        let expr = self.parse_expression(ctx.with(Context::ALLOW_IN))?;
        self.expect(TokenKind::RParen, "')'")?;
        Ok(expr)
    }

    fn parse_array_literal(&mut self, ctx: Context) -> ParseResult<Expression> {
        let start = self.cur.span;
        self.bump()?; // '['
        let mut elements = Vec::new();
        while !self.at(TokenKind::RBracket) {
            if self.at(TokenKind::Comma) {
                elements.push(None);
                self.bump()?;
                continue;
            }
            if self.eat(TokenKind::Ellipsis)? {
                let el_start = self.prev_end_span();
                let arg = self.parse_assignment_expression(ctx.with(Context::ALLOW_IN))?;
                let span = self.span_to_here(el_start);
                elements.push(Some(Expression::SpreadElement(SpreadElement { node_type: "SpreadElement", loc: self.loc(span), argument: Box::new(arg) })));
            } else {
                elements.push(Some(self.parse_assignment_expression(ctx.with(Context::ALLOW_IN))?));
            }
            if !self.at(TokenKind::RBracket) {
                self.expect(TokenKind::Comma, "','")?;
            }
        }
        self.bump()?; // ']'
        let span = self.span_to_here(start);
        Ok(Expression::ArrayExpression(ArrayExpression { node_type: "ArrayExpression", loc: self.loc(span), elements }))
    }

    fn parse_object_literal(&mut self, ctx: Context) -> ParseResult<Expression> {
        let start = self.cur.span;
        self.bump()?; // '{'
        let mut properties = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.eat(TokenKind::Ellipsis)? {
                let el_start = self.prev_end_span();
                let arg = self.parse_assignment_expression(ctx.with(Context::ALLOW_IN))?;
                let span = self.span_to_here(el_start);
                properties.push(ObjectExpressionProperty::SpreadElement(SpreadElement { node_type: "SpreadElement", loc: self.loc(span), argument: Box::new(arg) }));
            } else {
                properties.push(ObjectExpressionProperty::Property(self.parse_object_property(ctx)?));
            }
            if !self.at(TokenKind::RBrace) {
                self.expect(TokenKind::Comma, "','")?;
            }
        }
        self.bump()?; // '}'
        let span = self.span_to_here(start);
        Ok(Expression::ObjectExpression(ObjectExpression { node_type: "ObjectExpression", loc: self.loc(span), properties }))
    }

    fn parse_object_property(&mut self, ctx: Context) -> ParseResult<Property> {
        let start = self.cur.span;
        let is_async = self.is_contextual("async") && !self.next_starts_property_terminator();
        if is_async {
            self.bump()?;
        }
        let generator = self.eat(TokenKind::Star)?;

        let is_get = !is_async && !generator && self.is_contextual("get") && !self.next_starts_property_terminator();
        let is_set = !is_async && !generator && self.is_contextual("set") && !self.next_starts_property_terminator();
        if is_get || is_set {
            self.bump()?;
        }

        let (computed, key) = self.parse_property_key(ctx)?;

        if self.at(TokenKind::LParen) {
            let fn_ctx = ctx.with(Context::METHOD).set(Context::ALLOW_AWAIT, is_async).set(Context::ALLOW_YIELD, generator);
            let (params, body) = self.parse_function_rest(fn_ctx)?;
            let span = self.span_to_here(start);
            let kind = if is_get { PropertyKind::Get } else if is_set { PropertyKind::Set } else { PropertyKind::Init };
            return Ok(Property {
                node_type: "Property",
                loc: self.loc(span),
                key: Box::new(key),
                value: Box::new(Expression::FunctionExpression(FunctionExpression {
                    node_type: "FunctionExpression",
                    loc: self.loc(span),
                    id: None,
                    params,
                    body,
                    generator,
                    is_async,
                })),
                kind,
                method: true,
                shorthand: false,
                computed,
            });
        }

        if self.eat(TokenKind::Colon)? {
            let value = self.parse_assignment_expression(ctx.with(Context::ALLOW_IN))?;
            let span = self.span_to_here(start);
            return Ok(Property { node_type: "Property", loc: self.loc(span), key: Box::new(key), value: Box::new(value), kind: PropertyKind::Init, method: false, shorthand: false, computed });
        }

        // Shorthand `{ x }` / `{ x = default }` (the latter only legal inside
        // an object literal being reinterpreted as a destructuring pattern).
        if let Expression::Identifier(id) = &key {
            let value = if self.eat(TokenKind::Assign)? {
                let default = self.parse_assignment_expression(ctx.with(Context::ALLOW_IN))?;
                let span = self.span_to_here(start);
                Expression::AssignmentPattern(AssignmentPattern {
                    node_type: "AssignmentPattern",
                    loc: self.loc(span),
                    left: Box::new(Pattern::Identifier(id.clone())),
                    right: Box::new(default),
                })
            } else {
                key.clone()
            };
            let span = self.span_to_here(start);
            return Ok(Property { node_type: "Property", loc: self.loc(span), key: Box::new(key), value: Box::new(value), kind: PropertyKind::Init, method: false, shorthand: true, computed: false });
        }

        Err(self.unexpected("':'"))
    }

    fn next_starts_property_terminator(&self) -> bool {
        let rest = &self.lexer.source()[self.cur.span.end as usize..];
        let trimmed = rest.trim_start();
        trimmed.starts_with(':') || trimmed.starts_with(',') || trimmed.starts_with('}') || trimmed.starts_with('(')
    }

    fn parse_property_key(&mut self, ctx: Context) -> ParseResult<(bool, Expression)> {
        if self.eat(TokenKind::LBracket)? {
            let key = self.parse_assignment_expression(ctx.with(Context::ALLOW_IN))?;
            self.expect(TokenKind::RBracket, "']'")?;
            return Ok((true, key));
        }
        if self.at(TokenKind::StringLiteral) || self.at(TokenKind::NumericLiteral) {
            let start = self.cur.span;
            let expr = self.parse_primary_expression(ctx)?;
            let _ = start;
            return Ok((false, expr));
        }
        Ok((false, self.parse_property_name_identifier()?))
    }

    fn parse_template_literal(&mut self, ctx: Context) -> ParseResult<TemplateLiteral> {
        let start = self.cur.span;
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();

        let head = self.cur.clone_for_template();
        let is_tail = matches!(self.cur.kind, TokenKind::TemplateNoSubstitution);
        let tmpl = self.cur.template.clone().unwrap();
        quasis.push(TemplateElement { node_type: "TemplateElement", loc: self.loc(self.cur.span), tail: is_tail, cooked: tmpl.cooked.clone(), raw: tmpl.raw.clone() });
        self.bump()?;
        let _ = head;

        while !is_tail_quasi(&quasis) {
            expressions.push(self.parse_expression(ctx.with(Context::ALLOW_IN))?);
            if !self.at(TokenKind::RBrace) {
                return Err(self.unexpected("'}'"));
            }
            let tok = self.lexer.scan_template_continuation()?;
            let is_tail = matches!(tok.kind, TokenKind::TemplateTail);
            let tmpl = tok.template.clone().unwrap();
            quasis.push(TemplateElement { node_type: "TemplateElement", loc: self.loc(tok.span), tail: is_tail, cooked: tmpl.cooked, raw: tmpl.raw });
            let next = self.lexer.scan()?;
            self.cur = next;
        }

        let span = self.span_to_here(start);
        Ok(TemplateLiteral { node_type: "TemplateLiteral", loc: self.loc(span), quasis, expressions })
    }

    // ---- patterns ---------------------------------------------------------------------

    fn parse_binding_target(&mut self, ctx: Context) -> ParseResult<Pattern> {
        match &self.cur.kind {
            TokenKind::LBrace => self.parse_object_pattern(ctx),
            TokenKind::LBracket => self.parse_array_pattern(ctx),
            _ => self.parse_binding_identifier(ctx),
        }
    }

    fn parse_binding_identifier(&mut self, ctx: Context) -> ParseResult<Pattern> {
        let start = self.cur.span;
        let name = self.expect_identifier_name()?;
        if ctx.is_strict() && matches!(name.as_str(), "eval" | "arguments") {
            return Err(ParseErrorType::StrictParamName(name).at(start.start_pos));
        }
        Ok(Pattern::Identifier(Identifier { node_type: "Identifier", loc: self.loc(start), name: Atom::from(name) }))
    }

    fn parse_binding_element(&mut self, ctx: Context) -> ParseResult<Pattern> {
        let start = self.cur.span;
        let target = self.parse_binding_target(ctx)?;
        if self.eat(TokenKind::Assign)? {
            let default = self.parse_assignment_expression(ctx.with(Context::ALLOW_IN))?;
            let span = self.span_to_here(start);
            return Ok(Pattern::AssignmentPattern(AssignmentPattern { node_type: "AssignmentPattern", loc: self.loc(span), left: Box::new(target), right: Box::new(default) }));
        }
        Ok(target)
    }

    fn parse_array_pattern(&mut self, ctx: Context) -> ParseResult<Pattern> {
        let start = self.cur.span;
        self.bump()?; // '['
        let mut elements = Vec::new();
        while !self.at(TokenKind::RBracket) {
            if self.at(TokenKind::Comma) {
                elements.push(None);
                self.bump()?;
                continue;
            }
            if self.eat(TokenKind::Ellipsis)? {
                let el_start = self.prev_end_span();
                let arg = self.parse_binding_target(ctx)?;
                let span = self.span_to_here(el_start);
                elements.push(Some(Pattern::RestElement(RestElement { node_type: "RestElement", loc: self.loc(span), argument: Box::new(arg) })));
                break;
            }
            elements.push(Some(self.parse_binding_element(ctx)?));
            if !self.at(TokenKind::RBracket) {
                self.expect(TokenKind::Comma, "','")?;
            }
        }
        self.expect(TokenKind::RBracket, "']'")?;
        let span = self.span_to_here(start);
        Ok(Pattern::ArrayPattern(ArrayPattern { node_type: "ArrayPattern", loc: self.loc(span), elements }))
    }

    fn parse_object_pattern(&mut self, ctx: Context) -> ParseResult<Pattern> {
        let start = self.cur.span;
        self.bump()?; // '{'
        let mut properties = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.eat(TokenKind::Ellipsis)? {
                let el_start = self.prev_end_span();
                let arg = self.parse_binding_identifier(ctx)?;
                let span = self.span_to_here(el_start);
                properties.push(ObjectPatternProperty::RestElement(RestElement { node_type: "RestElement", loc: self.loc(span), argument: Box::new(arg) }));
                break;
            }
            let (computed, key) = self.parse_property_key(ctx)?;
            let (value, shorthand) = if self.eat(TokenKind::Colon)? {
                (self.parse_binding_element(ctx)?, false)
            } else {
                let name = match &key {
                    Expression::Identifier(id) => id.clone(),
                    _ => return Err(self.unexpected("':'")),
                };
                let target = Pattern::Identifier(name);
                if self.eat(TokenKind::Assign)? {
                    let default = self.parse_assignment_expression(ctx.with(Context::ALLOW_IN))?;
                    (Pattern::AssignmentPattern(AssignmentPattern { node_type: "AssignmentPattern", loc: self.loc(start), left: Box::new(target), right: Box::new(default) }), true)
                } else {
                    (target, true)
                }
            };
            let span = self.span_to_here(start);
            properties.push(ObjectPatternProperty::Property(AssignmentProperty {
                node_type: "Property",
                loc: self.loc(span),
                key: Box::new(key),
                value: Box::new(value),
                kind: PropertyKind::Init,
                method: false,
                shorthand,
                computed,
            }));
            if !self.at(TokenKind::RBrace) {
                self.expect(TokenKind::Comma, "','")?;
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        let span = self.span_to_here(start);
        Ok(Pattern::ObjectPattern(ObjectPattern { node_type: "ObjectPattern", loc: self.loc(span), properties }))
    }

    // ---- functions --------------------------------------------------------------------

    fn parse_function(&mut self, ctx: Context, is_expr: bool) -> ParseResult<FunctionDeclaration> {
        let start = self.cur.span;
        self.bump()?; // 'function'
        self.parse_function_common(ctx, start, false, is_expr)
    }

    fn parse_async_function(&mut self, ctx: Context, is_expr: bool) -> ParseResult<FunctionDeclaration> {
        let start = self.cur.span;
        self.bump()?; // 'async'
        self.bump()?; // 'function'
        self.parse_function_common(ctx, start, true, is_expr)
    }

    fn parse_function_common(&mut self, ctx: Context, start: Span, is_async: bool, is_expr: bool) -> ParseResult<FunctionDeclaration> {
        let generator = self.eat(TokenKind::Star)?;
        let id = if self.at(TokenKind::Identifier) {
            let id_span = self.cur.span;
            let name = self.expect_identifier_name()?;
            if !is_expr {
                self.declare_binding(&Pattern::Identifier(Identifier { node_type: "Identifier", loc: self.loc(id_span), name: Atom::from(name.clone()) }), VariableKind::Var)?;
            }
            Some(Identifier { node_type: "Identifier", loc: self.loc(id_span), name: Atom::from(name) })
        } else {
            None
        };
        let fn_ctx = ctx.set(Context::ALLOW_AWAIT, is_async).set(Context::ALLOW_YIELD, generator);
        let (params, body) = self.parse_function_rest(fn_ctx)?;
        let span = self.span_to_here(start);
        Ok(FunctionDeclaration { node_type: "FunctionDeclaration", loc: self.loc(span), id, params, body, generator, is_async })
    }

    fn parse_function_rest(&mut self, ctx: Context) -> ParseResult<(Vec<Pattern>, BlockStatement)> {
        self.scope.push_function();
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        let mut seen = AHashMap::new();
        while !self.at(TokenKind::RParen) {
            if self.eat(TokenKind::Ellipsis)? {
                let el_start = self.prev_end_span();
                let arg = self.parse_binding_target(ctx)?;
                let span = self.span_to_here(el_start);
                params.push(Pattern::RestElement(RestElement { node_type: "RestElement", loc: self.loc(span), argument: Box::new(arg) }));
                break;
            }
            params.push(self.parse_binding_element(ctx)?);
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        for p in &params {
            for name in pattern_bound_names(p) {
                if !self.scope.declare_param(&mut seen, &name) && ctx.is_strict() {
                    return Err(ParseErrorType::DuplicateBinding(name.to_string()).at(self.cur.span.start_pos));
                }
            }
        }
        self.in_function_depth += 1;
        let body = self.parse_block_no_new_scope(ctx)?;
        self.in_function_depth -= 1;
        self.scope.pop();
        Ok((params, body))
    }

    // ---- classes ----------------------------------------------------------------------

    fn parse_class(&mut self, ctx: Context, is_expr: bool) -> ParseResult<ClassDeclaration> {
        let start = self.cur.span;
        self.bump()?; // 'class'
        let class_ctx = ctx.with(Context::STRICT);
        let id = if self.at(TokenKind::Identifier) {
            let id_span = self.cur.span;
            let name = self.expect_identifier_name()?;
            if !is_expr {
                self.declare_binding(&Pattern::Identifier(Identifier { node_type: "Identifier", loc: self.loc(id_span), name: Atom::from(name.clone()) }), VariableKind::Let)?;
            }
            Some(Identifier { node_type: "Identifier", loc: self.loc(id_span), name: Atom::from(name) })
        } else {
            None
        };
        let super_class = if self.eat_keyword(Keyword::Extends)? {
            Some(Box::new(self.parse_lhs_expression(class_ctx)?))
        } else {
            None
        };
        let body_ctx = class_ctx.set(Context::SUPER, super_class.is_some());
        let body = self.parse_class_body(body_ctx)?;
        let span = self.span_to_here(start);
        Ok(ClassDeclaration { node_type: "ClassDeclaration", loc: self.loc(span), id, super_class, body })
    }

    fn parse_class_body(&mut self, ctx: Context) -> ParseResult<ClassBody> {
        let start = self.expect(TokenKind::LBrace, "'{'")?.span;
        let mut body = Vec::new();
        let mut has_constructor = false;
        while !self.at(TokenKind::RBrace) {
            if self.eat(TokenKind::Semi)? {
                continue;
            }
            body.push(self.parse_class_member(ctx, &mut has_constructor)?);
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        let span = self.span_to_here(start);
        Ok(ClassBody { node_type: "ClassBody", loc: self.loc(span), body })
    }

    fn parse_class_member(&mut self, ctx: Context, has_constructor: &mut bool) -> ParseResult<ClassMember> {
        let start = self.cur.span;

        if self.is_contextual("static") && self.at(TokenKind::LBrace) {
            // handled below via lookahead on next token after 'static'
        }
        let is_static = self.is_contextual("static") && !self.next_starts_property_terminator() && {
            self.bump()?;
            true
        };
        if is_static && self.at(TokenKind::LBrace) {
            let body = self.parse_block(ctx.with(Context::ALLOW_AWAIT))?;
            let span = self.span_to_here(start);
            return Ok(ClassMember::StaticBlock(StaticBlock { node_type: "StaticBlock", loc: self.loc(span), body: body.body }));
        }

        let is_async = self.is_contextual("async") && !self.next_starts_property_terminator();
        if is_async {
            self.bump()?;
        }
        let generator = self.eat(TokenKind::Star)?;
        let is_get = !is_async && !generator && self.is_contextual("get") && !self.next_starts_property_terminator();
        let is_set = !is_async && !generator && self.is_contextual("set") && !self.next_starts_property_terminator();
        if is_get || is_set {
            self.bump()?;
        }

        let (computed, key) = self.parse_property_key(ctx)?;
        let is_ctor = !is_static && !computed && matches!(&key, Expression::Identifier(id) if id.name == "constructor");

        if self.at(TokenKind::LParen) {
            if is_ctor {
                if is_get || is_set || is_async || generator {
                    return Err(ParseErrorType::ConstructorSpecialMethod.at(start.start_pos));
                }
                if *has_constructor {
                    return Err(ParseErrorType::DuplicateConstructor.at(start.start_pos));
                }
                *has_constructor = true;
            }
            let fn_ctx = ctx.with(Context::METHOD).set(Context::ALLOW_AWAIT, is_async).set(Context::ALLOW_YIELD, generator).set(Context::HAS_CONSTRUCTOR, is_ctor);
            let (params, body) = self.parse_function_rest(fn_ctx)?;
            let span = self.span_to_here(start);
            let kind = if is_ctor { MethodKind::Constructor } else if is_get { MethodKind::Get } else if is_set { MethodKind::Set } else { MethodKind::Method };
            return Ok(ClassMember::MethodDefinition(MethodDefinition {
                node_type: "MethodDefinition",
                loc: self.loc(span),
                key: Box::new(key),
                value: FunctionExpression { node_type: "FunctionExpression", loc: self.loc(span), id: None, params, body, generator, is_async },
                kind,
                computed,
                is_static,
            }));
        }

        if !computed {
            if let Expression::Identifier(id) = &key {
                if is_static && id.name == "prototype" {
                    return Err(ParseErrorType::StaticPrototype.at(start.start_pos));
                }
            }
        }

        let value = if self.eat(TokenKind::Assign)? {
            Some(Box::new(self.parse_assignment_expression(ctx.with(Context::ALLOW_IN))?))
        } else {
            None
        };
        self.consume_semicolon()?;
        let span = self.span_to_here(start);
        Ok(ClassMember::PropertyDefinition(PropertyDefinition { node_type: "PropertyDefinition", loc: self.loc(span), key: Box::new(key), value, computed, is_static }))
    }

    // ---- modules ----------------------------------------------------------------------

    fn parse_import_declaration(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start = self.cur.span;
        self.bump()?; // 'import'
        let mut specifiers = Vec::new();

        if self.at(TokenKind::StringLiteral) {
            let source = self.parse_module_source_literal()?;
            self.consume_semicolon()?;
            let span = self.span_to_here(start);
            return Ok(Statement::ImportDeclaration(ImportDeclaration { node_type: "ImportDeclaration", loc: self.loc(span), specifiers, source }));
        }

        if self.at(TokenKind::Identifier) && !self.is_contextual("from") {
            let id_span = self.cur.span;
            let name = self.expect_identifier_name()?;
            self.declare_binding(&Pattern::Identifier(Identifier { node_type: "Identifier", loc: self.loc(id_span), name: Atom::from(name.clone()) }), VariableKind::Let)?;
            specifiers.push(ImportSpecifierKind::Default(ImportDefaultSpecifier {
                node_type: "ImportDefaultSpecifier",
                loc: self.loc(id_span),
                local: Identifier { node_type: "Identifier", loc: self.loc(id_span), name: Atom::from(name) },
            }));
            if !self.eat(TokenKind::Comma)? {
                self.expect_contextual("from")?;
                let source = self.parse_module_source_literal()?;
                self.consume_semicolon()?;
                let span = self.span_to_here(start);
                return Ok(Statement::ImportDeclaration(ImportDeclaration { node_type: "ImportDeclaration", loc: self.loc(span), specifiers, source }));
            }
        }

        if self.eat(TokenKind::Star)? {
            self.expect_contextual("as")?;
            let id_span = self.cur.span;
            let name = self.expect_identifier_name()?;
            self.declare_binding(&Pattern::Identifier(Identifier { node_type: "Identifier", loc: self.loc(id_span), name: Atom::from(name.clone()) }), VariableKind::Let)?;
            specifiers.push(ImportSpecifierKind::Namespace(ImportNamespaceSpecifier {
                node_type: "ImportNamespaceSpecifier",
                loc: self.loc(id_span),
                local: Identifier { node_type: "Identifier", loc: self.loc(id_span), name: Atom::from(name) },
            }));
        } else if self.eat(TokenKind::LBrace)? {
            while !self.at(TokenKind::RBrace) {
                let imp_span = self.cur.span;
                let imported = self.expect_identifier_name()?;
                let local_name = if self.eat_contextual("as")? {
                    self.expect_identifier_name()?
                } else {
                    imported.clone()
                };
                let local_span = self.cur.span;
                self.declare_binding(&Pattern::Identifier(Identifier { node_type: "Identifier", loc: self.loc(local_span), name: Atom::from(local_name.clone()) }), VariableKind::Let)?;
                specifiers.push(ImportSpecifierKind::Named(ImportSpecifier {
                    node_type: "ImportSpecifier",
                    loc: self.loc(imp_span),
                    imported: Identifier { node_type: "Identifier", loc: self.loc(imp_span), name: Atom::from(imported) },
                    local: Identifier { node_type: "Identifier", loc: self.loc(imp_span), name: Atom::from(local_name) },
                }));
                if !self.eat(TokenKind::Comma)? {
                    break;
                }
            }
            self.expect(TokenKind::RBrace, "'}'")?;
        }

        self.expect_contextual("from")?;
        let source = self.parse_module_source_literal()?;
        self.consume_semicolon()?;
        let span = self.span_to_here(start);
        let _ = ctx;
        Ok(Statement::ImportDeclaration(ImportDeclaration { node_type: "ImportDeclaration", loc: self.loc(span), specifiers, source }))
    }

    fn expect_contextual(&mut self, word: &str) -> ParseResult<()> {
        if self.eat_contextual(word)? {
            Ok(())
        } else {
            Err(self.unexpected(word))
        }
    }

    fn parse_module_source_literal(&mut self) -> ParseResult<Literal> {
        let start = self.cur.span;
        let value = self.cur.string_value.clone().unwrap_or_default();
        let raw = self.cur.raw.clone();
        self.expect(TokenKind::StringLiteral, "module specifier")?;
        Ok(self.literal(start, LiteralValue::String(value), raw))
    }

    fn parse_export_declaration(&mut self, ctx: Context) -> ParseResult<Statement> {
        let start = self.cur.span;
        self.bump()?; // 'export'

        if self.eat_keyword(Keyword::Default)? {
            let cur_kind = self.cur.kind;
            let decl = match cur_kind {
                TokenKind::Keyword(Keyword::Function) => ExportDefaultDecl::FunctionDeclaration(self.parse_function(ctx, false)?),
                TokenKind::Keyword(Keyword::Class) => ExportDefaultDecl::ClassDeclaration(self.parse_class(ctx, false)?),
                TokenKind::Identifier if self.is_contextual("async") && self.next_is_function_no_newline() => {
                    ExportDefaultDecl::FunctionDeclaration(self.parse_async_function(ctx, false)?)
                }
                _ => {
                    let expr = self.parse_assignment_expression(ctx.with(Context::ALLOW_IN))?;
                    self.consume_semicolon()?;
                    ExportDefaultDecl::Expression(expr)
                }
            };
            let span = self.span_to_here(start);
            return Ok(Statement::ExportDefaultDeclaration(ExportDefaultDeclaration { node_type: "ExportDefaultDeclaration", loc: self.loc(span), declaration: Box::new(decl) }));
        }

        if self.eat(TokenKind::Star)? {
            let exported = if self.eat_contextual("as")? {
                let id_span = self.cur.span;
                let name = self.expect_identifier_name()?;
                Some(Identifier { node_type: "Identifier", loc: self.loc(id_span), name: Atom::from(name) })
            } else {
                None
            };
            self.expect_contextual("from")?;
            let source = self.parse_module_source_literal()?;
            self.consume_semicolon()?;
            let span = self.span_to_here(start);
            return Ok(Statement::ExportAllDeclaration(ExportAllDeclaration { node_type: "ExportAllDeclaration", loc: self.loc(span), source, exported }));
        }

        if self.at(TokenKind::LBrace) {
            self.bump()?;
            let mut specifiers = Vec::new();
            while !self.at(TokenKind::RBrace) {
                let local_span = self.cur.span;
                let local = self.expect_identifier_name()?;
                let exported = if self.eat_contextual("as")? {
                    self.expect_identifier_name()?
                } else {
                    local.clone()
                };
                specifiers.push(ExportSpecifier {
                    node_type: "ExportSpecifier",
                    loc: self.loc(local_span),
                    local: Identifier { node_type: "Identifier", loc: self.loc(local_span), name: Atom::from(local) },
                    exported: Identifier { node_type: "Identifier", loc: self.loc(local_span), name: Atom::from(exported) },
                });
                if !self.eat(TokenKind::Comma)? {
                    break;
                }
            }
            self.expect(TokenKind::RBrace, "'}'")?;
            let source = if self.eat_contextual("from")? { Some(self.parse_module_source_literal()?) } else { None };
            self.consume_semicolon()?;
            let span = self.span_to_here(start);
            return Ok(Statement::ExportNamedDeclaration(ExportNamedDeclaration { node_type: "ExportNamedDeclaration", loc: self.loc(span), declaration: None, specifiers, source }));
        }

        let declaration = Box::new(self.parse_statement_list_item(ctx.with(Context::EXPORT))?);
        let span = self.span_to_here(start);
        Ok(Statement::ExportNamedDeclaration(ExportNamedDeclaration { node_type: "ExportNamedDeclaration", loc: self.loc(span), declaration: Some(declaration), specifiers: Vec::new(), source: None }))
    }

    // ---- backtracking support (arrow-head probe only) ---------------------------------

    fn snapshot(&self) -> ParserSnapshot {
        ParserSnapshot { offset: self.cur.span.start, cur: self.cur.clone() }
    }

    fn restore(&mut self, snap: ParserSnapshot) {
        // Re-create the lexer from the saved offset; cheap since `Lexer` is a
        // thin cursor and no AST was built during the aborted probe.
        let source = self.lexer.source();
        let in_module = self.lexer.in_module;
        let collect_comments = false;
        self.lexer = Lexer::new(&source[snap.offset as usize..], in_module, collect_comments, self.options.ranges || self.options.locations);
        self.cur = snap.cur;
    }
}

struct ParserSnapshot {
    offset: u32,
    cur: Token,
}

fn is_tail_quasi(quasis: &[TemplateElement]) -> bool {
    quasis.last().map(|q| q.tail).unwrap_or(false)
}

fn to_member_object(expr: Expression) -> MemberObject {
    MemberObject::Expression(expr)
}

struct JsxChildrenResult {
    children: Vec<JsxChild>,
    closing_name: Option<JsxName>,
    closing_span: Span,
}

fn jsx_name_to_string(name: &JsxName) -> String {
    match name {
        JsxName::Identifier(id) => id.name.to_string(),
        JsxName::NamespacedName(ns) => format!("{}:{}", ns.namespace.name, ns.name.name),
        JsxName::MemberExpression(member) => {
            let object = match member.object.as_ref() {
                MemberObject::Expression(Expression::Identifier(id)) => id.name.to_string(),
                MemberObject::Expression(Expression::MemberExpression(inner)) => jsx_name_to_string(&JsxName::MemberExpression(inner.clone())),
                _ => String::new(),
            };
            let property = match member.property.as_ref() {
                Expression::Identifier(id) => id.name.to_string(),
                _ => String::new(),
            };
            format!("{}.{}", object, property)
        }
    }
}

fn to_call_callee(expr: Expression) -> CallCallee {
    CallCallee::Expression(expr)
}

fn function_to_fn_expr(decl: FunctionDeclaration) -> FunctionExpression {
    FunctionExpression { node_type: "FunctionExpression", loc: decl.loc, id: decl.id, params: decl.params, body: decl.body, generator: decl.generator, is_async: decl.is_async }
}

fn class_decl_to_expr(decl: ClassDeclaration) -> ClassExpression {
    ClassExpression { node_type: "ClassExpression", loc: decl.loc, id: decl.id, super_class: decl.super_class, body: decl.body }
}

fn assignment_operator(kind: TokenKind) -> AssignmentOperator {
    use AssignmentOperator::*;
    match kind {
        TokenKind::Assign => Assign,
        TokenKind::PlusAssign => PlusAssign,
        TokenKind::MinusAssign => MinusAssign,
        TokenKind::StarAssign => TimesAssign,
        TokenKind::SlashAssign => DivAssign,
        TokenKind::PercentAssign => ModAssign,
        TokenKind::StarStarAssign => ExpAssign,
        TokenKind::ShlAssign => ShlAssign,
        TokenKind::ShrAssign => ShrAssign,
        TokenKind::UShrAssign => UShrAssign,
        TokenKind::AmpAssign => BitAndAssign,
        TokenKind::PipeAssign => BitOrAssign,
        TokenKind::CaretAssign => BitXorAssign,
        TokenKind::AmpAmpAssign => AndAssign,
        TokenKind::PipePipeAssign => OrAssign,
        TokenKind::QuestionQuestionAssign => CoalesceAssign,
        _ => unreachable!("caller checked is_assignment_operator"),
    }
}

fn logical_operator(kind: TokenKind) -> LogicalOperator {
    match kind {
        TokenKind::AmpAmp => LogicalOperator::And,
        TokenKind::PipePipe => LogicalOperator::Or,
        TokenKind::QuestionQuestion => LogicalOperator::Coalesce,
        _ => unreachable!(),
    }
}

fn binary_operator(kind: TokenKind) -> BinaryOperator {
    use BinaryOperator::*;
    match kind {
        TokenKind::EqEq => Eq,
        TokenKind::NotEq => NotEq,
        TokenKind::EqEqEq => StrictEq,
        TokenKind::NotEqEq => StrictNotEq,
        TokenKind::Lt => Lt,
        TokenKind::Le => Le,
        TokenKind::Gt => Gt,
        TokenKind::Ge => Ge,
        TokenKind::Shl => Shl,
        TokenKind::Shr => Shr,
        TokenKind::UShr => UShr,
        TokenKind::Plus => Plus,
        TokenKind::Minus => Minus,
        TokenKind::Star => Times,
        TokenKind::Slash => Div,
        TokenKind::Percent => Mod,
        TokenKind::StarStar => Exp,
        TokenKind::Pipe => BitOr,
        TokenKind::Caret => BitXor,
        TokenKind::Amp => BitAnd,
        TokenKind::Keyword(Keyword::In) => In,
        TokenKind::Keyword(Keyword::Instanceof) => Instanceof,
        _ => unreachable!(),
    }
}

fn unary_operator(kind: TokenKind) -> UnaryOperator {
    use UnaryOperator::*;
    match kind {
        TokenKind::Minus => Minus,
        TokenKind::Plus => Plus,
        TokenKind::Bang => Not,
        TokenKind::Tilde => BitwiseNot,
        TokenKind::Keyword(Keyword::Typeof) => Typeof,
        TokenKind::Keyword(Keyword::Void) => Void,
        TokenKind::Keyword(Keyword::Delete) => Delete,
        _ => unreachable!(),
    }
}

fn update_operator(kind: TokenKind) -> UpdateOperator {
    match kind {
        TokenKind::PlusPlus => UpdateOperator::Increment,
        TokenKind::MinusMinus => UpdateOperator::Decrement,
        _ => unreachable!(),
    }
}

/// Collect every identifier a binding pattern introduces, for scope tracking.
fn pattern_bound_names(pattern: &Pattern) -> Vec<Atom> {
    let mut out = Vec::new();
    collect_pattern_names(pattern, &mut out);
    out
}

fn collect_pattern_names(pattern: &Pattern, out: &mut Vec<Atom>) {
    match pattern {
        Pattern::Identifier(id) => out.push(id.name.clone()),
        Pattern::AssignmentPattern(p) => collect_pattern_names(&p.left, out),
        Pattern::RestElement(p) => collect_pattern_names(&p.argument, out),
        Pattern::ArrayPattern(p) => {
            for el in p.elements.iter().flatten() {
                collect_pattern_names(el, out);
            }
        }
        Pattern::ObjectPattern(p) => {
            for prop in &p.properties {
                match prop {
                    ObjectPatternProperty::Property(ap) => collect_pattern_names(&ap.value, out),
                    ObjectPatternProperty::RestElement(r) => collect_pattern_names(&r.argument, out),
                }
            }
        }
        Pattern::MemberExpression(_) => {}
    }
}

/// Reinterpret an already-parsed expression as a binding pattern (the
/// destructuring-assignment cover grammar): used for `for (x of y)` heads and
/// assignment-expression left-hand sides once a `=` is seen.
fn expression_to_pattern(expr: Expression) -> Result<Pattern, ParseErrorType> {
    Ok(match expr {
        Expression::Identifier(id) => Pattern::Identifier(id),
        Expression::MemberExpression(m) => Pattern::MemberExpression(m),
        Expression::ArrayExpression(a) => {
            let mut elements = Vec::with_capacity(a.elements.len());
            for el in a.elements {
                elements.push(match el {
                    Some(e) => Some(expression_to_pattern(e)?),
                    None => None,
                });
            }
            Pattern::ArrayPattern(ArrayPattern { node_type: "ArrayPattern", loc: a.loc, elements })
        }
        Expression::ObjectExpression(o) => {
            let mut properties = Vec::with_capacity(o.properties.len());
            for prop in o.properties {
                properties.push(match prop {
                    ObjectExpressionProperty::Property(p) => {
                        let value = expression_to_pattern(*p.value)?;
                        ObjectPatternProperty::Property(AssignmentProperty {
                            node_type: "Property",
                            loc: p.loc,
                            key: p.key,
                            value: Box::new(value),
                            kind: p.kind,
                            method: p.method,
                            shorthand: p.shorthand,
                            computed: p.computed,
                        })
                    }
                    ObjectExpressionProperty::SpreadElement(s) => {
                        let arg = expression_to_pattern(*s.argument)?;
                        ObjectPatternProperty::RestElement(RestElement { node_type: "RestElement", loc: s.loc, argument: Box::new(arg) })
                    }
                });
            }
            Pattern::ObjectPattern(ObjectPattern { node_type: "ObjectPattern", loc: o.loc, properties })
        }
        Expression::AssignmentExpression(a) if matches!(a.operator, AssignmentOperator::Assign) => {
            let left = match *a.left {
                AssignmentTarget::Pattern(p) => p,
                AssignmentTarget::Expression(e) => expression_to_pattern(e)?,
            };
            Pattern::AssignmentPattern(AssignmentPattern { node_type: "AssignmentPattern", loc: a.loc, left: Box::new(left), right: a.right })
        }
        Expression::SpreadElement(s) => Pattern::RestElement(RestElement { node_type: "RestElement", loc: s.loc, argument: Box::new(expression_to_pattern(*s.argument)?) }),
        _ => return Err(ParseErrorType::InvalidAssignmentTarget),
    })
}

fn expression_to_assignment_target(expr: Expression) -> Result<AssignmentTarget, ParseErrorType> {
    match &expr {
        Expression::Identifier(_) | Expression::MemberExpression(_) => Ok(AssignmentTarget::Expression(expr)),
        Expression::ArrayExpression(_) | Expression::ObjectExpression(_) => {
            Ok(AssignmentTarget::Pattern(expression_to_pattern(expr)?))
        }
        _ => Err(ParseErrorType::InvalidAssignmentTarget),
    }
}

impl Token {
    fn clone_for_template(&self) -> Token {
        self.clone()
    }
}

/// Parse a complete script (non-module) source, producing an ESTree
/// [`Program`] with `source_type: "script"`.
pub fn parse_script(source: &str, options: &ParserOptions) -> ParseResult<Program> {
    let mut parser = Parser::new(source, false, options)?;
    let ctx = Parser::initial_context(false, options);
    parser.parse_program(ctx, SourceType::Script)
}

/// Parse a complete module source, producing an ESTree [`Program`] with
/// `source_type: "module"`. Module code is always strict and always permits
/// `await`/`import`/`export` at the top level.
pub fn parse_module(source: &str, options: &ParserOptions) -> ParseResult<Program> {
    let mut parser = Parser::new(source, true, options)?;
    let ctx = Parser::initial_context(true, options);
    parser.parse_program(ctx, SourceType::Module)
}
