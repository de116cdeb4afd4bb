//! Method bodies: labels, instructions, debug directives, catch blocks,
//! parameters and method annotations.

use super::{PResult, Parser};
use crate::ast::{Node, NodeKind};
use crate::categories::{is_instruction, is_top_level, starts_body_item};
use crate::literal;
use crate::token::TokenKind;

/// The containers a method body contributes to its `Method` node. Method
/// annotations are collected in the method scope instead.
#[derive(Debug, Default)]
pub(super) struct MethodBody {
    pub registers: Option<Node>,
    pub ordered_items: Vec<Node>,
    pub catches: Vec<Node>,
    pub catchalls: Vec<Node>,
    pub parameters: Vec<Node>,
}

impl<'a> Parser<'a> {
    /// Body items up to `.end method`, a top-level directive or end of
    /// input. Broken items are recovered in place; only a second
    /// `.registers`/`.locals` aborts the whole body.
    pub(super) fn statements_and_directives(&mut self) -> PResult<MethodBody> {
        self.rule("statements_and_directives", |p| {
            let mut body = MethodBody::default();
            loop {
                let kind = p.peek(0);
                if kind == TokenKind::Eof
                    || kind == TokenKind::EndMethodDirective
                    || (is_top_level(kind) && kind != TokenKind::SourceDirective)
                {
                    return Ok(body);
                }
                match kind {
                    TokenKind::RegistersDirective | TokenKind::LocalsDirective => {
                        let seen = p
                            .scopes
                            .current_method()
                            .map_or(false, |m| std::mem::replace(&mut m.has_registers_directive, true));
                        if seen {
                            let tok = p.peek_token(0);
                            return Err(p.semantic_at(
                                tok,
                                format!(
                                    "duplicate {} directive: a method may have only one .registers or .locals",
                                    tok.text
                                ),
                            ));
                        }
                        let node = p.recovering(Self::registers_directive);
                        if node.is_error() {
                            body.ordered_items.push(node);
                        } else {
                            body.registers = Some(node);
                        }
                    }
                    TokenKind::CatchDirective => {
                        let node = p.recovering(Self::catch_directive);
                        body.catches.push(node);
                    }
                    TokenKind::CatchallDirective => {
                        let node = p.recovering(Self::catchall_directive);
                        body.catchalls.push(node);
                    }
                    TokenKind::ParameterDirective => {
                        let node = p.recovering(Self::parameter_directive);
                        body.parameters.push(node);
                    }
                    TokenKind::AnnotationDirective => {
                        let node = p.recovering(Self::annotation);
                        if let Some(m) = p.scopes.current_method() {
                            m.pending_method_annotations.push(node);
                        }
                    }
                    _ if starts_body_item(kind) => {
                        let node = p.recovering(Self::ordered_method_item);
                        body.ordered_items.push(node);
                    }
                    _ => {
                        let node = p.recovering(|p| {
                            Err(p.unexpected("label, instruction or directive in method body"))
                        });
                        body.ordered_items.push(node);
                    }
                }
            }
        })
    }

    /// Run a body-item rule, turning a failure into a recorded diagnostic
    /// and an error node.
    fn recovering(&mut self, f: impl FnOnce(&mut Self) -> PResult<Node>) -> Node {
        let start = self.cursor.mark();
        let start_kind = self.peek(0);
        let start_line = self.peek_token(0).line;
        match f(self) {
            Ok(node) => node,
            Err(d) => self.recover_body_item(start, start_kind, start_line, d),
        }
    }

    /// Label, instruction, pseudo-instruction or debug directive.
    fn ordered_method_item(&mut self) -> PResult<Node> {
        let kind = self.peek(0);
        match kind {
            TokenKind::Colon => self.label(),
            TokenKind::ArrayDataDirective => self.array_data(),
            TokenKind::PackedSwitchDirective => self.packed_switch(),
            TokenKind::SparseSwitchDirective => self.sparse_switch(),
            _ if is_instruction(kind) => self.instruction(),
            _ => self.debug_directive(),
        }
    }

    /// `':' simple_name`
    fn label(&mut self) -> PResult<Node> {
        self.expect(TokenKind::Colon)?;
        let name = self.simple_name()?;
        Ok(Node::synthetic(NodeKind::Label, vec![name]))
    }

    /// `.registers N` or `.locals N`
    fn registers_directive(&mut self) -> PResult<Node> {
        self.rule("registers_directive", |p| {
            let directive = p.expect_one_of(
                &[TokenKind::RegistersDirective, TokenKind::LocalsDirective],
                "'.registers' or '.locals'",
            )?;
            let count = p.integral_literal()?;
            if count.kind == NodeKind::IntegerLiteral {
                let n = literal::parse_int(count.text())
                    .map_err(|e| p.semantic_at(&directive, e.to_string()))?;
                if !(0..=65535).contains(&n) {
                    return Err(p.semantic_at(
                        &directive,
                        format!("register count {} is outside 0..=65535", n),
                    ));
                }
            }
            let kind = if directive.kind == TokenKind::RegistersDirective {
                NodeKind::Registers
            } else {
                NodeKind::Locals
            };
            Ok(Node::synthetic(kind, vec![count]))
        })
    }

    /// `.catch CLASS_DESCRIPTOR { :from .. :to } :using`
    fn catch_directive(&mut self) -> PResult<Node> {
        self.rule("catch_directive", |p| {
            p.expect(TokenKind::CatchDirective)?;
            let exception = p.expect(TokenKind::ClassDescriptor)?;
            let mut children = vec![Node::literal(NodeKind::ClassDescriptor, exception)];
            children.extend(p.catch_range()?);
            Ok(Node::synthetic(NodeKind::Catch, children))
        })
    }

    /// `.catchall { :from .. :to } :using`
    fn catchall_directive(&mut self) -> PResult<Node> {
        self.rule("catchall_directive", |p| {
            p.expect(TokenKind::CatchallDirective)?;
            let children = p.catch_range()?;
            Ok(Node::synthetic(NodeKind::Catchall, children))
        })
    }

    fn catch_range(&mut self) -> PResult<Vec<Node>> {
        self.expect(TokenKind::OpenBrace)?;
        let from = self.label_ref()?;
        self.expect(TokenKind::DotDot)?;
        let to = self.label_ref()?;
        self.expect(TokenKind::CloseBrace)?;
        let using = self.label_ref()?;
        Ok(vec![from, to, using])
    }

    /// `.param REGISTER (, STRING)? annotation* (.end param)?`
    ///
    /// Without `.end param` the annotations belong to the method, and the
    /// parameter keeps an empty annotations container.
    fn parameter_directive(&mut self) -> PResult<Node> {
        self.rule("parameter_directive", |p| {
            p.expect(TokenKind::ParameterDirective)?;
            let register = p.expect(TokenKind::Register)?;
            let mut children = vec![Node::literal(NodeKind::Register, register)];
            if p.at(TokenKind::Comma) {
                p.consume();
                children.push(p.string_literal()?);
            }

            let mut annotations = Vec::new();
            while p.at(TokenKind::AnnotationDirective) {
                annotations.push(p.annotation()?);
            }
            if p.at(TokenKind::EndParameterDirective) {
                p.consume();
            } else if !annotations.is_empty() {
                if let Some(m) = p.scopes.current_method() {
                    m.pending_method_annotations.append(&mut annotations);
                }
            }
            children.push(Node::synthetic(NodeKind::Annotations, annotations));
            Ok(Node::synthetic(NodeKind::Parameter, children))
        })
    }

    // -- Debug directives ----------------------------------------

    fn debug_directive(&mut self) -> PResult<Node> {
        match self.peek(0) {
            TokenKind::LineDirective => {
                self.consume();
                let line = self.integral_literal()?;
                Ok(Node::synthetic(NodeKind::Line, vec![line]))
            }
            TokenKind::LocalDirective => self.local_directive(),
            TokenKind::EndLocalDirective | TokenKind::RestartLocalDirective => {
                let directive = self.consume();
                let register = self.expect(TokenKind::Register)?;
                let kind = if directive.kind == TokenKind::EndLocalDirective {
                    NodeKind::EndLocal
                } else {
                    NodeKind::RestartLocal
                };
                Ok(Node::synthetic(kind, vec![Node::literal(NodeKind::Register, register)]))
            }
            TokenKind::PrologueDirective => {
                self.consume();
                Ok(Node::synthetic(NodeKind::Prologue, vec![]))
            }
            TokenKind::EpilogueDirective => {
                self.consume();
                Ok(Node::synthetic(NodeKind::Epilogue, vec![]))
            }
            TokenKind::SourceDirective => {
                self.consume();
                let mut children = Vec::new();
                if self.at(TokenKind::StringLiteral) {
                    children.push(self.string_literal()?);
                }
                Ok(Node::synthetic(NodeKind::Source, children))
            }
            _ => Err(self.unexpected("debug directive")),
        }
    }

    /// `.local REGISTER (, (null | NAME) : (V | type) (, (null | SIGNATURE))?)?`
    fn local_directive(&mut self) -> PResult<Node> {
        self.rule("local_directive", |p| {
            p.expect(TokenKind::LocalDirective)?;
            let register = p.expect(TokenKind::Register)?;
            let mut children = vec![Node::literal(NodeKind::Register, register)];
            if p.at(TokenKind::Comma) {
                p.consume();
                children.push(p.string_or_null("local name string or null")?);
                p.expect(TokenKind::Colon)?;
                children.push(p.type_descriptor()?);
                if p.at(TokenKind::Comma) {
                    p.consume();
                    children.push(p.string_or_null("local signature string or null")?);
                }
            }
            Ok(Node::synthetic(NodeKind::Local, children))
        })
    }

    fn string_or_null(&mut self, what: &str) -> PResult<Node> {
        let tok = self.expect_one_of(&[TokenKind::NullLiteral, TokenKind::StringLiteral], what)?;
        let kind = if tok.kind == TokenKind::NullLiteral {
            NodeKind::NullLiteral
        } else {
            NodeKind::StringLiteral
        };
        Ok(Node::literal(kind, tok))
    }
}
