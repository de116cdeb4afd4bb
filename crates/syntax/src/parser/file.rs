//! File level: class header directives, fields and methods.

use super::body::MethodBody;
use super::{PResult, Parser};
use crate::ast::{Node, NodeKind};
use crate::scope::{MethodScope, Scope};
use crate::token::TokenKind;

/// Class that needs no `.super` directive.
const ROOT_OBJECT: &str = "Ljava/lang/Object;";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UseOnce {
    Class,
    Super,
    Source,
}

impl<'a> Parser<'a> {
    /// Parse a whole unit into the root `ClassDef`.
    ///
    /// Header directives, members and class annotations may come in any
    /// order; the root always gets its seven children in the same order.
    pub(super) fn smali_file(&mut self) -> Node {
        self.rule_stack.push("smali_file");
        self.scopes.push_file_scope();

        let mut class_spec: Option<Node> = None;
        let mut super_spec: Option<Node> = None;
        let mut implements = Vec::new();
        let mut source: Option<Node> = None;
        let mut methods = Vec::new();
        let mut fields = Vec::new();

        loop {
            let start = self.cursor.mark();
            let kind = self.peek(0);
            match kind {
                TokenKind::Eof => break,
                TokenKind::ClassDirective => {
                    if let Some(d) = self.check_use_once(UseOnce::Class) {
                        self.recover_top_level(start, None, d);
                        continue;
                    }
                    class_spec = Some(match self.rule("class_spec", Self::class_spec) {
                        Ok(node) => {
                            self.mark_seen(UseOnce::Class);
                            node
                        }
                        Err(d) => self.recover_top_level(start, None, d),
                    });
                }
                TokenKind::SuperDirective => {
                    if let Some(d) = self.check_use_once(UseOnce::Super) {
                        self.recover_top_level(start, None, d);
                        continue;
                    }
                    super_spec = Some(match self.rule("super_spec", Self::super_spec) {
                        Ok(node) => {
                            self.mark_seen(UseOnce::Super);
                            node
                        }
                        Err(d) => self.recover_top_level(start, None, d),
                    });
                }
                TokenKind::SourceDirective => {
                    if let Some(d) = self.check_use_once(UseOnce::Source) {
                        self.recover_top_level(start, None, d);
                        continue;
                    }
                    source = Some(match self.rule("source_spec", Self::source_spec) {
                        Ok(node) => {
                            self.mark_seen(UseOnce::Source);
                            node
                        }
                        Err(d) => self.recover_top_level(start, None, d),
                    });
                }
                TokenKind::ImplementsDirective => {
                    let node = match self.rule("implements_spec", Self::implements_spec) {
                        Ok(node) => node,
                        Err(d) => self.recover_top_level(start, None, d),
                    };
                    implements.push(node);
                }
                TokenKind::FieldDirective => {
                    let node = match self.rule("field", Self::field) {
                        Ok(node) => node,
                        Err(d) => {
                            self.recover_top_level(start, Some(TokenKind::EndFieldDirective), d)
                        }
                    };
                    fields.push(node);
                }
                TokenKind::MethodDirective => {
                    let node = match self.rule("method", Self::method) {
                        Ok(node) => node,
                        Err(d) => self.recover_method(start, d),
                    };
                    methods.push(node);
                }
                TokenKind::AnnotationDirective => {
                    let node = match self.annotation() {
                        Ok(node) => node,
                        Err(d) => {
                            self.recover_top_level(start, Some(TokenKind::EndAnnotationDirective), d)
                        }
                    };
                    if let Some(file) = self.scopes.current_file() {
                        file.pending_class_annotations.push(node);
                    }
                }
                _ => {
                    let d = self.unexpected("'.class', '.super', '.implements', '.source', '.field', '.method' or '.annotation'");
                    self.recover_top_level(start, None, d);
                }
            }
        }

        let class_node = self.finish_header(class_spec, super_spec.is_some());
        let annotations = match self.scopes.pop() {
            Scope::File(file) => file.pending_class_annotations,
            other => panic!("unbalanced scope stack: expected file scope, found {:?}", other),
        };
        self.rule_stack.pop();

        Node::synthetic(
            NodeKind::ClassDef,
            vec![
                class_node,
                Node::synthetic(NodeKind::Super, super_spec.into_iter().collect()),
                Node::synthetic(NodeKind::ImplementsList, implements),
                Node::synthetic(NodeKind::Source, source.into_iter().collect()),
                Node::synthetic(NodeKind::Methods, methods),
                Node::synthetic(NodeKind::Fields, fields),
                Node::synthetic(NodeKind::Annotations, annotations),
            ],
        )
    }

    /// End-of-input checks: a class must have been declared, and any class
    /// other than the root object needs a super class.
    fn finish_header(&mut self, class_spec: Option<Node>, has_super: bool) -> Node {
        let eof = self.peek_token(0).clone();
        match class_spec {
            None => {
                let d = self.semantic_at(&eof, "missing class declaration: no .class directive found");
                self.report(d);
                Node::error(&[])
            }
            Some(node) => {
                if node.kind == NodeKind::ClassDescriptor && !has_super && node.text() != ROOT_OBJECT {
                    let d = self.semantic_at(
                        &eof,
                        format!("missing super declaration: {} has no .super directive", node.text()),
                    );
                    self.report(d);
                }
                node
            }
        }
    }

    // -- Use-once guards -----------------------------------------

    /// Error for a second `.class`, `.super` or `.source` directive, checked
    /// before the directive is parsed.
    fn check_use_once(&mut self, which: UseOnce) -> Option<crate::error::Diagnostic> {
        let seen = self.scopes.current_file().map_or(false, |f| match which {
            UseOnce::Class => f.has_class_spec,
            UseOnce::Super => f.has_super_spec,
            UseOnce::Source => f.has_source_spec,
        });
        if !seen {
            return None;
        }
        let tok = self.peek_token(0);
        Some(self.semantic_at(tok, format!("duplicate {} directive", tok.text)))
    }

    fn mark_seen(&mut self, which: UseOnce) {
        if let Some(f) = self.scopes.current_file() {
            match which {
                UseOnce::Class => f.has_class_spec = true,
                UseOnce::Super => f.has_super_spec = true,
                UseOnce::Source => f.has_source_spec = true,
            }
        }
    }

    // -- Header directives ---------------------------------------

    /// `.class access_list CLASS_DESCRIPTOR`, as the descriptor node owning
    /// its access list.
    fn class_spec(&mut self) -> PResult<Node> {
        self.expect(TokenKind::ClassDirective)?;
        let access = self.access_list();
        let class = self.expect(TokenKind::ClassDescriptor)?;
        Ok(Node::literal_with(NodeKind::ClassDescriptor, class, vec![access]))
    }

    fn super_spec(&mut self) -> PResult<Node> {
        self.expect(TokenKind::SuperDirective)?;
        let class = self.expect(TokenKind::ClassDescriptor)?;
        Ok(Node::literal(NodeKind::ClassDescriptor, class))
    }

    fn implements_spec(&mut self) -> PResult<Node> {
        self.expect(TokenKind::ImplementsDirective)?;
        let class = self.expect(TokenKind::ClassDescriptor)?;
        Ok(Node::synthetic(
            NodeKind::Implements,
            vec![Node::literal(NodeKind::ClassDescriptor, class)],
        ))
    }

    fn source_spec(&mut self) -> PResult<Node> {
        self.expect(TokenKind::SourceDirective)?;
        self.string_literal()
    }

    /// Access flags before a name. A flag word directly followed by `:` or
    /// `(` is the member's name, not a flag.
    fn access_list(&mut self) -> Node {
        let mut flags = Vec::new();
        while self.at(TokenKind::AccessSpec)
            && !matches!(self.peek(1), TokenKind::Colon | TokenKind::OpenParen)
        {
            flags.push(Node::literal(NodeKind::AccessSpec, self.consume()));
        }
        Node::synthetic(NodeKind::AccessList, flags)
    }

    // -- Members -------------------------------------------------

    /// `.field access_list member_name ':' type ('=' literal)? annotation* (.end field)?`
    ///
    /// Without `.end field` the annotations collected after the field are
    /// class annotations and the field keeps an empty annotations container.
    fn field(&mut self) -> PResult<Node> {
        self.expect(TokenKind::FieldDirective)?;
        let access = self.access_list();
        let name = self.member_name()?;
        self.expect(TokenKind::Colon)?;
        let field_type = self.nonvoid_type_descriptor()?;

        let mut initial = Vec::new();
        if self.at(TokenKind::Equal) {
            self.consume();
            initial.push(self.literal()?);
        }

        let mut annotations = Vec::new();
        while self.at(TokenKind::AnnotationDirective) {
            annotations.push(self.annotation()?);
        }
        if self.at(TokenKind::EndFieldDirective) {
            self.consume();
        } else if !annotations.is_empty() {
            log::debug!(
                "field {} has no .end field; {} annotation(s) move to the class",
                name.text(),
                annotations.len()
            );
            if let Some(file) = self.scopes.current_file() {
                file.pending_class_annotations.append(&mut annotations);
            }
        }

        Ok(Node::synthetic(
            NodeKind::Field,
            vec![
                name,
                access,
                Node::synthetic(NodeKind::FieldType, vec![field_type]),
                Node::synthetic(NodeKind::FieldInitialValue, initial),
                Node::synthetic(NodeKind::Annotations, annotations),
            ],
        ))
    }

    /// `.method access_list member_name method_prototype body .end method`
    fn method(&mut self) -> PResult<Node> {
        self.expect(TokenKind::MethodDirective)?;
        let access = self.access_list();
        let name = self.member_name()?;
        let prototype = self.method_prototype()?;

        let (body, scope) = self.with_method_scope(|p| {
            let body = p.statements_and_directives()?;
            p.expect(TokenKind::EndMethodDirective)?;
            Ok(body)
        })?;
        let MethodBody {
            registers,
            ordered_items,
            mut catches,
            catchalls,
            parameters,
        } = body;
        catches.extend(catchalls);

        let mut children = vec![name, prototype, access];
        children.extend(registers);
        children.push(Node::synthetic(NodeKind::OrderedMethodItems, ordered_items));
        children.push(Node::synthetic(NodeKind::Catches, catches));
        children.push(Node::synthetic(NodeKind::Parameters, parameters));
        children.push(Node::synthetic(
            NodeKind::Annotations,
            scope.pending_method_annotations,
        ));
        Ok(Node::synthetic(NodeKind::Method, children))
    }

    /// Run `f` inside a fresh method scope, popping it on every exit path.
    fn with_method_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<(T, MethodScope)> {
        self.scopes.push_method_scope();
        let result = f(self);
        let scope = match self.scopes.pop() {
            Scope::Method(m) => m,
            other => panic!("unbalanced scope stack: expected method scope, found {:?}", other),
        };
        result.map(|value| (value, scope))
    }
}
