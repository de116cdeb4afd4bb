//! Identifiers, literals, member references and annotations.

use super::{PResult, Parser};
use crate::ast::{Node, NodeKind};
use crate::categories::{
    is_fixed_32bit_literal, is_fixed_literal, is_identifier, is_integral_literal, is_member_name,
    is_reference_type,
};
use crate::error::DiagnosticKind;
use crate::literal;
use crate::token::{Token, TokenKind};

/// Identifier node for `token` if its kind may be read as a simple name.
/// The token is kept as-is, so the node text is the original spelling.
pub fn as_identifier(token: &Token) -> Option<Node> {
    is_identifier(token.kind).then(|| Node::literal(NodeKind::SimpleName, token.clone()))
}

impl<'a> Parser<'a> {
    // -- Names ---------------------------------------------------

    pub(super) fn simple_name(&mut self) -> PResult<Node> {
        match as_identifier(self.peek_token(0)) {
            Some(node) => {
                self.consume();
                Ok(node)
            }
            None => Err(self.unexpected("identifier")),
        }
    }

    /// A simple name or `<init>`/`<clinit>`.
    pub(super) fn member_name(&mut self) -> PResult<Node> {
        if self.at(TokenKind::MemberName) {
            let tok = self.consume();
            return Ok(Node::literal(NodeKind::SimpleName, tok));
        }
        self.simple_name()
    }

    /// `':' simple_name`, as the bare name node.
    pub(super) fn label_ref(&mut self) -> PResult<Node> {
        self.expect(TokenKind::Colon)?;
        self.simple_name()
    }

    // -- Literals ------------------------------------------------

    /// A numeric, char, bool or string token as its literal node. Integer
    /// tokens are range-checked for their width.
    fn literal_token(&mut self) -> PResult<Node> {
        let tok = self.consume();
        let checked = match tok.kind {
            TokenKind::PositiveIntegerLiteral | TokenKind::NegativeIntegerLiteral => {
                literal::parse_int(&tok.text).map(|_| NodeKind::IntegerLiteral)
            }
            TokenKind::LongLiteral => literal::parse_long(&tok.text).map(|_| NodeKind::LongLiteral),
            TokenKind::ShortLiteral => literal::parse_short(&tok.text).map(|_| NodeKind::ShortLiteral),
            TokenKind::ByteLiteral => literal::parse_byte(&tok.text).map(|_| NodeKind::ByteLiteral),
            TokenKind::FloatLiteral | TokenKind::FloatLiteralOrId => Ok(NodeKind::FloatLiteral),
            TokenKind::DoubleLiteral | TokenKind::DoubleLiteralOrId => Ok(NodeKind::DoubleLiteral),
            TokenKind::CharLiteral => Ok(NodeKind::CharLiteral),
            TokenKind::StringLiteral => Ok(NodeKind::StringLiteral),
            TokenKind::BoolLiteral => Ok(NodeKind::BoolLiteral),
            TokenKind::NullLiteral => Ok(NodeKind::NullLiteral),
            _ => {
                let msg = format!("expected literal, found {}", self.show(&tok, 0));
                return Err(self.diag(DiagnosticKind::Syntax, msg, crate::ast::Span::of(&tok)));
            }
        };
        match checked {
            Ok(kind) => Ok(Node::literal(kind, tok)),
            Err(e) => Err(self.semantic_at(&tok, e.to_string())),
        }
    }

    pub(super) fn integral_literal(&mut self) -> PResult<Node> {
        if is_integral_literal(self.peek(0)) {
            self.literal_token()
        } else {
            Err(self.unexpected("integral literal"))
        }
    }

    pub(super) fn fixed_32bit_literal(&mut self) -> PResult<Node> {
        if is_fixed_32bit_literal(self.peek(0)) {
            self.literal_token()
        } else {
            Err(self.unexpected("32-bit literal"))
        }
    }

    pub(super) fn fixed_literal(&mut self) -> PResult<Node> {
        if is_fixed_literal(self.peek(0)) {
            self.literal_token()
        } else {
            Err(self.unexpected("fixed-width literal"))
        }
    }

    pub(super) fn string_literal(&mut self) -> PResult<Node> {
        let tok = self.expect(TokenKind::StringLiteral)?;
        Ok(Node::literal(NodeKind::StringLiteral, tok))
    }

    /// Any value that may appear in an annotation element or field
    /// initializer.
    pub(super) fn literal(&mut self) -> PResult<Node> {
        self.rule("literal", |p| {
            let kind = p.peek(0);
            if is_member_name(kind) && matches!(p.peek(1), TokenKind::Colon | TokenKind::OpenParen) {
                return p.type_field_method_literal();
            }
            match kind {
                TokenKind::LongLiteral
                | TokenKind::PositiveIntegerLiteral
                | TokenKind::NegativeIntegerLiteral
                | TokenKind::ShortLiteral
                | TokenKind::ByteLiteral
                | TokenKind::FloatLiteral
                | TokenKind::FloatLiteralOrId
                | TokenKind::DoubleLiteral
                | TokenKind::DoubleLiteralOrId
                | TokenKind::CharLiteral
                | TokenKind::StringLiteral
                | TokenKind::BoolLiteral
                | TokenKind::NullLiteral => p.literal_token(),
                TokenKind::OpenBrace => p.array_literal(),
                TokenKind::SubannotationDirective => p.subannotation(),
                TokenKind::EnumDirective => p.enum_literal(),
                _ => p.type_field_method_literal(),
            }
        })
    }

    /// `{ literal (, literal)* }`, possibly empty.
    fn array_literal(&mut self) -> PResult<Node> {
        self.nested(|p| {
            p.expect(TokenKind::OpenBrace)?;
            let mut elements = Vec::new();
            if !p.at(TokenKind::CloseBrace) {
                elements.push(p.literal()?);
                while p.at(TokenKind::Comma) {
                    p.consume();
                    elements.push(p.literal()?);
                }
            }
            p.expect(TokenKind::CloseBrace)?;
            Ok(Node::synthetic(NodeKind::EncodedArray, elements))
        })
    }

    /// `.enum field_reference`
    fn enum_literal(&mut self) -> PResult<Node> {
        self.expect(TokenKind::EnumDirective)?;
        let parts = self.field_reference()?;
        Ok(Node::synthetic(NodeKind::EncodedEnum, parts))
    }

    /// A bare type, or a field/method reference with an optional owner.
    fn type_field_method_literal(&mut self) -> PResult<Node> {
        let kind = self.peek(0);
        if is_reference_type(kind) && self.peek(1) != TokenKind::Arrow {
            return self.reference_type_descriptor();
        }
        if !is_reference_type(kind) && !matches!(self.peek(1), TokenKind::Colon | TokenKind::OpenParen) {
            match kind {
                TokenKind::PrimitiveType => {
                    let tok = self.consume();
                    return Ok(Node::literal(NodeKind::PrimitiveType, tok));
                }
                TokenKind::VoidType => {
                    let tok = self.consume();
                    return Ok(Node::literal(NodeKind::VoidType, tok));
                }
                _ if !is_member_name(kind) => return Err(self.unexpected("literal")),
                _ => {}
            }
        }
        match self.field_or_method_reference()? {
            MemberRef::Field(parts) => Ok(Node::synthetic(NodeKind::EncodedField, parts)),
            MemberRef::Method(parts) => Ok(Node::synthetic(NodeKind::EncodedMethod, parts)),
        }
    }

    // -- Member references ---------------------------------------

    /// `(reference_type '->')?`
    fn owner_prefix(&mut self) -> PResult<Option<Node>> {
        if is_reference_type(self.peek(0)) && self.peek(1) == TokenKind::Arrow {
            let owner = self.reference_type_descriptor()?;
            self.expect(TokenKind::Arrow)?;
            Ok(Some(owner))
        } else {
            Ok(None)
        }
    }

    /// `(reference_type '->')? member_name ':' nonvoid_type`, flattened.
    pub(super) fn field_reference(&mut self) -> PResult<Vec<Node>> {
        self.rule("field_reference", |p| {
            let mut parts: Vec<Node> = p.owner_prefix()?.into_iter().collect();
            parts.push(p.member_name()?);
            p.expect(TokenKind::Colon)?;
            parts.push(p.nonvoid_type_descriptor()?);
            Ok(parts)
        })
    }

    /// `(reference_type '->')? member_name method_prototype`, flattened.
    pub(super) fn method_reference(&mut self) -> PResult<Vec<Node>> {
        self.rule("method_reference", |p| {
            let mut parts: Vec<Node> = p.owner_prefix()?.into_iter().collect();
            parts.push(p.member_name()?);
            parts.push(p.method_prototype()?);
            Ok(parts)
        })
    }

    /// Field or method reference, decided by backtracking: the field shape
    /// is tried first, then the method shape. If neither fits, the error
    /// from whichever got further is reported as no viable alternative.
    pub(super) fn field_or_method_reference(&mut self) -> PResult<MemberRef> {
        let as_field = self.try_parse(|p| p.field_reference());
        let field_err = match as_field {
            Ok(parts) => return Ok(MemberRef::Field(parts)),
            Err(e) => e,
        };
        let method_err = match self.try_parse(|p| p.method_reference()) {
            Ok(parts) => return Ok(MemberRef::Method(parts)),
            Err(e) => e,
        };
        let furthest = if method_err.span.start_offset >= field_err.span.start_offset {
            method_err
        } else {
            field_err
        };
        // Structural problems inside a descriptor are more precise than a
        // generic no-viable-alternative.
        if furthest.kind == DiagnosticKind::Structural || furthest.kind == DiagnosticKind::Lexical {
            return Err(furthest);
        }
        let message = format!(
            "no viable alternative: expected field or method reference ({})",
            furthest.message
        );
        let mut d = self.diag(DiagnosticKind::NoViableAlternative, message, furthest.span);
        if !furthest.rule_stack.is_empty() {
            d.rule_stack = furthest.rule_stack;
        }
        Err(d)
    }

    /// Operand of `throw-verification-error`: a bare class descriptor, a
    /// field reference or a method reference.
    pub(super) fn verification_error_reference(&mut self) -> PResult<Vec<Node>> {
        if self.at(TokenKind::ClassDescriptor) && self.peek(1) != TokenKind::Arrow {
            let tok = self.consume();
            return Ok(vec![Node::literal(NodeKind::ClassDescriptor, tok)]);
        }
        match self.field_or_method_reference()? {
            MemberRef::Field(parts) | MemberRef::Method(parts) => Ok(parts),
        }
    }

    // -- Annotations ---------------------------------------------

    /// `.annotation VISIBILITY CLASS_DESCRIPTOR annotation_element* .end annotation`
    pub(super) fn annotation(&mut self) -> PResult<Node> {
        self.rule("annotation", |p| {
            p.nested(|p| {
                p.expect(TokenKind::AnnotationDirective)?;
                let visibility = p.expect(TokenKind::AnnotationVisibility)?;
                let class = p.expect(TokenKind::ClassDescriptor)?;
                let mut sub = vec![Node::literal(NodeKind::ClassDescriptor, class)];
                while !p.at(TokenKind::EndAnnotationDirective) {
                    sub.push(p.annotation_element()?);
                }
                p.expect(TokenKind::EndAnnotationDirective)?;
                Ok(Node::synthetic(
                    NodeKind::Annotation,
                    vec![
                        Node::literal(NodeKind::AnnotationVisibility, visibility),
                        Node::synthetic(NodeKind::Subannotation, sub),
                    ],
                ))
            })
        })
    }

    /// `.subannotation CLASS_DESCRIPTOR annotation_element* .end subannotation`
    fn subannotation(&mut self) -> PResult<Node> {
        self.nested(|p| {
            p.expect(TokenKind::SubannotationDirective)?;
            let class = p.expect(TokenKind::ClassDescriptor)?;
            let mut children = vec![Node::literal(NodeKind::ClassDescriptor, class)];
            while !p.at(TokenKind::EndSubannotationDirective) {
                children.push(p.annotation_element()?);
            }
            p.expect(TokenKind::EndSubannotationDirective)?;
            Ok(Node::synthetic(NodeKind::Subannotation, children))
        })
    }

    /// `simple_name '=' literal`
    fn annotation_element(&mut self) -> PResult<Node> {
        let name = self.simple_name()?;
        self.expect(TokenKind::Equal)?;
        let value = self.literal()?;
        Ok(Node::synthetic(NodeKind::AnnotationElement, vec![name, value]))
    }
}

pub(crate) enum MemberRef {
    Field(Vec<Node>),
    Method(Vec<Node>),
}
