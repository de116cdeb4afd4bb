//! Recursive-descent parser from tokens to a [`Node`] tree.
//!
//! Rules live in submodules by grammar area and all return
//! `Result<_, Diagnostic>`. Errors are recorded and recovered from at two
//! levels: each top-level construct, and each method-body item. Recovery
//! inserts an `Error` node spanning the skipped tokens.

use serde::Serialize;

use crate::ast::{ClassDef, Node, Span};
use crate::categories::{is_instruction, is_top_level, starts_body_item};
use crate::config::ParserConfig;
use crate::cursor::{Checkpoint, TokenCursor};
use crate::error::{display_token, Diagnostic, DiagnosticKind};
use crate::lexer::{describe_invalid, lex};
use crate::opcodes::{LegacyOracle, OpcodeTable};
use crate::scope::ScopeStack;
use crate::token::{Token, TokenKind};

mod body;
mod file;
mod instructions;
mod literals;
mod types;

pub use types::scan_type_run;

pub(crate) type PResult<T> = Result<T, Diagnostic>;

/// Result of parsing one unit: the root `ClassDef` and everything reported
/// along the way. A unit with any diagnostic is not successfully assembled,
/// even though a best-effort tree is always returned.
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutput {
    pub root: Node,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    pub fn is_success(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn class_def(&self) -> Option<ClassDef<'_>> {
        self.root.as_class_def()
    }

    pub fn has_kind(&self, kind: DiagnosticKind) -> bool {
        self.diagnostics.iter().any(|d| d.kind == kind)
    }
}

/// Parse a lexed unit.
pub fn parse(tokens: Vec<Token>, config: &ParserConfig, oracle: &dyn LegacyOracle) -> ParseOutput {
    let mut parser = Parser::new(tokens, config, oracle);
    let root = parser.smali_file();
    ParseOutput {
        root,
        diagnostics: parser.diagnostics,
    }
}

/// Lex and parse `src` with the built-in opcode table.
pub fn parse_str(src: &str, config: &ParserConfig) -> ParseOutput {
    parse(lex(src), config, &OpcodeTable)
}

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

pub(crate) struct Parser<'a> {
    cursor: TokenCursor,
    config: &'a ParserConfig,
    oracle: &'a dyn LegacyOracle,
    scopes: ScopeStack,
    diagnostics: Vec<Diagnostic>,
    rule_stack: Vec<&'static str>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token>, config: &'a ParserConfig, oracle: &'a dyn LegacyOracle) -> Self {
        Parser {
            cursor: TokenCursor::new(tokens),
            config,
            oracle,
            scopes: ScopeStack::new(),
            diagnostics: Vec::new(),
            rule_stack: Vec::new(),
            depth: 0,
        }
    }

    // -- Token access --------------------------------------------

    fn peek(&self, k: usize) -> TokenKind {
        self.cursor.peek(k)
    }

    fn peek_token(&self, k: usize) -> &Token {
        self.cursor.peek_token(k)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek(0) == kind
    }

    fn consume(&mut self) -> Token {
        self.cursor.consume()
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if self.at(kind) {
            Ok(self.consume())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    fn expect_one_of(&mut self, kinds: &[TokenKind], what: &str) -> PResult<Token> {
        if kinds.contains(&self.peek(0)) {
            Ok(self.consume())
        } else {
            Err(self.unexpected(what))
        }
    }

    // -- Diagnostics ---------------------------------------------

    /// Build a diagnostic, attaching the rule stack in verbose mode.
    fn diag(&self, kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Diagnostic {
        let mut d = Diagnostic::new(kind, message, span);
        if self.config.verbose_errors {
            d.rule_stack = self.rule_stack.iter().map(|r| r.to_string()).collect();
        }
        d
    }

    fn show(&self, token: &Token, k: usize) -> String {
        display_token(token, self.cursor.position() + k, self.config.verbose_errors)
    }

    /// Error for the current token not fitting `what`. An invalid token is
    /// reported as a lexical error instead.
    fn unexpected(&self, what: &str) -> Diagnostic {
        let tok = self.peek_token(0);
        let span = Span::of(tok);
        if tok.kind == TokenKind::InvalidToken {
            let msg = format!("{} {}", describe_invalid(&tok.text), self.show(tok, 0));
            return self.diag(DiagnosticKind::Lexical, msg, span);
        }
        let msg = format!("expected {}, found {}", what, self.show(tok, 0));
        self.diag(DiagnosticKind::Syntax, msg, span)
    }

    fn semantic_at(&self, token: &Token, message: impl Into<String>) -> Diagnostic {
        self.diag(DiagnosticKind::Semantic, message, Span::of(token))
    }

    fn report(&mut self, d: Diagnostic) {
        log::debug!("{}", d);
        self.diagnostics.push(d);
    }

    // -- Rule plumbing -------------------------------------------

    /// Run `f` as grammar rule `name`, tracked on the rule stack.
    fn rule<T>(&mut self, name: &'static str, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        self.rule_stack.push(name);
        let result = f(self);
        self.rule_stack.pop();
        result
    }

    /// Attempt an alternative; on failure rewind the cursor so the caller
    /// can try another.
    fn try_parse<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let start = self.cursor.mark();
        let result = f(self);
        if result.is_err() {
            self.cursor.rewind(start);
        }
        result
    }

    /// Run a recursive rule, failing once nesting exceeds the configured
    /// maximum.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= self.config.max_depth {
            let tok = self.peek_token(0);
            return Err(self.semantic_at(
                tok,
                format!("nesting exceeds the maximum depth of {}", self.config.max_depth),
            ));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Span from `start` through the last consumed token.
    fn span_since(&self, start: Checkpoint) -> Span {
        let consumed = self.cursor.consumed_since(start);
        match (consumed.first(), consumed.last()) {
            (Some(first), Some(last)) => Span::of(first).cover(Span::of(last)),
            _ => Span::of(self.peek_token(0)),
        }
    }

    // -- Recovery ------------------------------------------------

    /// Record `d`, then skip to the next point where a method-body item can
    /// start: a directive, a `.end method`, a top-level directive, or an
    /// instruction or label on a later line. Block items (`.array-data`,
    /// switches, annotations) skip through their own end directive.
    fn recover_body_item(&mut self, start: Checkpoint, start_kind: TokenKind, start_line: u32, d: Diagnostic) -> Node {
        self.report(d);
        if self.cursor.position() == start.index() {
            self.consume();
        }

        let block_end = match start_kind {
            TokenKind::ArrayDataDirective => Some(TokenKind::EndArrayDataDirective),
            TokenKind::PackedSwitchDirective => Some(TokenKind::EndPackedSwitchDirective),
            TokenKind::SparseSwitchDirective => Some(TokenKind::EndSparseSwitchDirective),
            TokenKind::AnnotationDirective => Some(TokenKind::EndAnnotationDirective),
            _ => None,
        };
        // The item may have failed on its own closing directive.
        let already_closed = block_end.is_some()
            && self.cursor.previous().map(|t| t.kind) == block_end;

        loop {
            let tok = self.peek_token(0);
            let (kind, line) = (tok.kind, tok.line);
            if kind == TokenKind::Eof
                || kind == TokenKind::EndMethodDirective
                || (is_top_level(kind) && kind != TokenKind::SourceDirective)
            {
                break;
            }
            if let (Some(end), false) = (block_end, already_closed) {
                self.consume();
                if kind == end {
                    break;
                }
                continue;
            }
            if starts_body_item(kind) {
                let line_sensitive = is_instruction(kind) || kind == TokenKind::Colon;
                if !line_sensitive || line > start_line {
                    break;
                }
            }
            self.consume();
        }

        log::debug!(
            "recovered method body item, skipped {} token(s)",
            self.cursor.consumed_since(start).len()
        );
        Node::error(self.cursor.consumed_since(start))
    }

    /// Record `d` and skip past the end of a broken method: through
    /// `.end method`, or up to the next top-level directive.
    fn recover_method(&mut self, start: Checkpoint, d: Diagnostic) -> Node {
        self.report(d);
        if self.cursor.position() == start.index() {
            self.consume();
        }
        while !self.cursor.at_eof() {
            let kind = self.peek(0);
            if kind == TokenKind::EndMethodDirective {
                self.consume();
                break;
            }
            if is_top_level(kind) && kind != TokenKind::SourceDirective {
                break;
            }
            self.consume();
        }
        log::debug!("recovered method, skipped {} token(s)", self.cursor.consumed_since(start).len());
        Node::error(self.cursor.consumed_since(start))
    }

    /// Record `d` and skip to the next top-level construct. A `terminator`
    /// met on the way (`.end field`, `.end annotation`) is consumed and ends
    /// the skip.
    fn recover_top_level(&mut self, start: Checkpoint, terminator: Option<TokenKind>, d: Diagnostic) -> Node {
        self.report(d);
        if self.cursor.position() == start.index() {
            self.consume();
        }
        let closed = terminator.is_some() && self.cursor.previous().map(|t| t.kind) == terminator;
        while !closed && !self.cursor.at_eof() {
            let kind = self.peek(0);
            if is_top_level(kind) {
                break;
            }
            if terminator.is_none() && kind == TokenKind::AnnotationDirective {
                break;
            }
            self.consume();
            if Some(kind) == terminator {
                break;
            }
        }
        log::debug!("recovered top-level construct, skipped {} token(s)", self.cursor.consumed_since(start).len());
        Node::error(self.cursor.consumed_since(start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_default(src: &str) -> ParseOutput {
        parse_str(src, &ParserConfig::default())
    }

    #[test]
    fn try_parse_rewinds_on_failure() {
        let config = ParserConfig::default();
        let mut p = Parser::new(lex("v0 v1"), &config, &OpcodeTable);
        let r = p.try_parse(|p| {
            p.expect(TokenKind::Register)?;
            p.expect(TokenKind::Comma)
        });
        assert!(r.is_err());
        assert_eq!(p.cursor.position(), 0);
    }

    #[test]
    fn nesting_limit_is_reported() {
        let config = ParserConfig {
            max_depth: 2,
            ..ParserConfig::default()
        };
        let mut p = Parser::new(lex("x"), &config, &OpcodeTable);
        let r = p.nested(|p| p.nested(|p| p.nested(|_| Ok(()))));
        let d = r.unwrap_err();
        assert_eq!(d.kind, DiagnosticKind::Semantic);
        assert!(d.message.contains("maximum depth of 2"));
        assert_eq!(p.depth, 0);
    }

    #[test]
    fn verbose_errors_carry_rule_stack() {
        let config = ParserConfig {
            verbose_errors: true,
            ..ParserConfig::default()
        };
        let mut p = Parser::new(lex("}"), &config, &OpcodeTable);
        let d = p
            .rule("outer", |p| p.rule("inner", |p| p.expect(TokenKind::Register)))
            .unwrap_err();
        assert_eq!(d.rule_stack, vec!["outer", "inner"]);
        assert!(d.message.contains("<CloseBrace>"));
        assert!(p.rule_stack.is_empty());
    }

    #[test]
    fn invalid_token_is_lexical() {
        let out = parse_default(".class public LFoo;\n.super Ljava/lang/Object;\n.bogus\n");
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::Lexical);
        assert!(out.diagnostics[0].message.contains("unknown directive"));
    }
}
