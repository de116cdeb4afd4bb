//! Syntax tree produced by the parser.
//!
//! Every node is either a literal node, carrying the token it was built
//! from, or a synthetic container with no token of its own. Containers are
//! always present even when empty, so consumers never special-case an
//! absent list.

use std::fmt::Write as _;

use serde::Serialize;

use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    // ── File structure ──────────────────────────────
    ClassDef,
    Super,
    ImplementsList,
    Implements,
    Source,
    Methods,
    Fields,
    Annotations,
    AccessList,

    // ── Members ─────────────────────────────────────
    Field,
    FieldType,
    FieldInitialValue,
    Method,
    MethodPrototype,
    MethodReturnType,
    Registers,
    Locals,
    OrderedMethodItems,
    Catches,
    Catch,
    Catchall,
    Parameters,
    Parameter,

    // ── Annotations and encoded values ──────────────
    Annotation,
    Subannotation,
    AnnotationElement,
    EncodedField,
    EncodedMethod,
    EncodedEnum,
    EncodedArray,

    // ── Method body items ───────────────────────────
    Label,
    RegisterList,
    RegisterRange,
    Line,
    Local,
    EndLocal,
    RestartLocal,
    Prologue,
    Epilogue,
    ArrayData,
    ArrayElementSize,
    ArrayElements,
    PackedSwitch,
    PackedSwitchStartKey,
    PackedSwitchElements,
    SparseSwitch,
    SparseSwitchElements,

    // ── Statements, one kind per instruction format ─
    StatementFormat10t,
    StatementFormat10x,
    StatementFormat11n,
    StatementFormat11x,
    StatementFormat12x,
    StatementFormat20t,
    StatementFormat21cField,
    StatementFormat21cString,
    StatementFormat21cType,
    StatementFormat21ih,
    StatementFormat21lh,
    StatementFormat21s,
    StatementFormat21t,
    StatementFormat22b,
    StatementFormat22cField,
    StatementFormat22cType,
    StatementFormat22s,
    StatementFormat22t,
    StatementFormat22x,
    StatementFormat23x,
    StatementFormat30t,
    StatementFormat31c,
    StatementFormat31i,
    StatementFormat31t,
    StatementFormat32x,
    StatementFormat35cMethod,
    StatementFormat35cType,
    StatementFormat3rcMethod,
    StatementFormat3rcType,
    StatementFormat51l,

    // ── Literal nodes (carry a token) ───────────────
    IntegerLiteral,
    LongLiteral,
    ShortLiteral,
    ByteLiteral,
    FloatLiteral,
    DoubleLiteral,
    CharLiteral,
    StringLiteral,
    BoolLiteral,
    NullLiteral,
    SimpleName,
    ClassDescriptor,
    ArrayDescriptor,
    PrimitiveType,
    VoidType,
    Register,
    AccessSpec,
    AnnotationVisibility,
    VerificationErrorType,
    Mnemonic,

    /// Recovery placeholder covering the skipped tokens.
    Error,
}

impl NodeKind {
    pub fn is_statement(self) -> bool {
        use NodeKind::*;
        matches!(
            self,
            StatementFormat10t
                | StatementFormat10x
                | StatementFormat11n
                | StatementFormat11x
                | StatementFormat12x
                | StatementFormat20t
                | StatementFormat21cField
                | StatementFormat21cString
                | StatementFormat21cType
                | StatementFormat21ih
                | StatementFormat21lh
                | StatementFormat21s
                | StatementFormat21t
                | StatementFormat22b
                | StatementFormat22cField
                | StatementFormat22cType
                | StatementFormat22s
                | StatementFormat22t
                | StatementFormat22x
                | StatementFormat23x
                | StatementFormat30t
                | StatementFormat31c
                | StatementFormat31i
                | StatementFormat31t
                | StatementFormat32x
                | StatementFormat35cMethod
                | StatementFormat35cType
                | StatementFormat3rcMethod
                | StatementFormat3rcType
                | StatementFormat51l
                | ArrayData
                | PackedSwitch
                | SparseSwitch
        )
    }
}

/// Source region of a node: 1-based start line/column and 0-based char
/// offsets, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl Span {
    pub fn of(token: &Token) -> Span {
        Span {
            line: token.line,
            column: token.column,
            start_offset: token.start_offset,
            end_offset: token.end_offset,
        }
    }

    /// Smallest span covering both.
    pub fn cover(self, other: Span) -> Span {
        let first = if other.start_offset < self.start_offset {
            other
        } else {
            self
        };
        Span {
            line: first.line,
            column: first.column,
            start_offset: first.start_offset,
            end_offset: self.end_offset.max(other.end_offset),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<Token>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn literal(kind: NodeKind, token: Token) -> Node {
        Node {
            kind,
            token: Some(token),
            children: Vec::new(),
        }
    }

    /// Literal node that also owns children, e.g. a class descriptor
    /// carrying its access list.
    pub fn literal_with(kind: NodeKind, token: Token, children: Vec<Node>) -> Node {
        Node {
            kind,
            token: Some(token),
            children,
        }
    }

    pub fn synthetic(kind: NodeKind, children: Vec<Node>) -> Node {
        Node {
            kind,
            token: None,
            children,
        }
    }

    /// Placeholder for a construct that failed to parse. The token spans
    /// every skipped token; its text is their texts joined by spaces.
    pub fn error(skipped: &[Token]) -> Node {
        let token = match (skipped.first(), skipped.last()) {
            (Some(first), Some(last)) => {
                let text = skipped
                    .iter()
                    .map(|t| t.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                Some(Token {
                    kind: TokenKind::InvalidToken,
                    text,
                    line: first.line,
                    column: first.column,
                    start_offset: first.start_offset,
                    end_offset: last.end_offset,
                    channel: first.channel,
                })
            }
            _ => None,
        };
        Node {
            kind: NodeKind::Error,
            token,
            children: Vec::new(),
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.token.is_none()
    }

    pub fn is_error(&self) -> bool {
        self.kind == NodeKind::Error
    }

    /// Token text, or `""` for synthetic nodes.
    pub fn text(&self) -> &str {
        self.token.as_ref().map_or("", |t| t.text.as_str())
    }

    pub fn child(&self, i: usize) -> Option<&Node> {
        self.children.get(i)
    }

    pub fn children_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    pub fn first_of_kind(&self, kind: NodeKind) -> Option<&Node> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// True if this node or any descendant is an error placeholder.
    pub fn contains_error(&self) -> bool {
        self.is_error() || self.children.iter().any(Node::contains_error)
    }

    /// Source span. Synthetic nodes cover their children; an empty
    /// container has no span.
    pub fn span(&self) -> Option<Span> {
        let own = self.token.as_ref().map(Span::of);
        self.children
            .iter()
            .filter_map(Node::span)
            .fold(own, |acc, s| Some(acc.map_or(s, |a| a.cover(s))))
    }

    pub fn as_class_def(&self) -> Option<ClassDef<'_>> {
        (self.kind == NodeKind::ClassDef).then_some(ClassDef(self))
    }

    /// Parenthesised dump: synthetic nodes print their kind, literal nodes
    /// their token text, e.g. `(Method foo (MethodPrototype ...) ...)`.
    pub fn to_sexpr(&self) -> String {
        let mut out = String::new();
        self.write_sexpr(&mut out);
        out
    }

    fn write_sexpr(&self, out: &mut String) {
        let head = match &self.token {
            Some(tok) if self.kind != NodeKind::Error => tok.text.clone(),
            _ => format!("{:?}", self.kind),
        };
        if self.children.is_empty() {
            out.push_str(&head);
            return;
        }
        let _ = write!(out, "({}", head);
        for child in &self.children {
            out.push(' ');
            child.write_sexpr(out);
        }
        out.push(')');
    }
}

/// Typed view over a `ClassDef` root.
///
/// The root always has seven children: class descriptor (owning the access
/// list), super, implements list, source, methods, fields, annotations.
#[derive(Debug, Clone, Copy)]
pub struct ClassDef<'a>(&'a Node);

impl<'a> ClassDef<'a> {
    pub const CHILD_COUNT: usize = 7;

    pub fn node(&self) -> &'a Node {
        self.0
    }

    /// The class descriptor, or `None` if the declaration failed to parse.
    pub fn class_descriptor(&self) -> Option<&'a Node> {
        self.0.child(0).filter(|n| n.kind == NodeKind::ClassDescriptor)
    }

    pub fn access_list(&self) -> Option<&'a Node> {
        self.class_descriptor()
            .and_then(|d| d.first_of_kind(NodeKind::AccessList))
    }

    pub fn super_class(&self) -> Option<&'a Node> {
        self.slot(1).and_then(|s| s.first_of_kind(NodeKind::ClassDescriptor))
    }

    pub fn implements(&self) -> impl Iterator<Item = &'a Node> {
        self.slot_children(2)
            .iter()
            .filter_map(|i| i.first_of_kind(NodeKind::ClassDescriptor))
    }

    pub fn source(&self) -> Option<&'a Node> {
        self.slot(3).and_then(|s| s.first_of_kind(NodeKind::StringLiteral))
    }

    pub fn methods(&self) -> &'a [Node] {
        self.slot_children(4)
    }

    pub fn fields(&self) -> &'a [Node] {
        self.slot_children(5)
    }

    pub fn annotations(&self) -> &'a [Node] {
        self.slot_children(6)
    }

    fn slot(&self, i: usize) -> Option<&'a Node> {
        self.0.child(i)
    }

    fn slot_children(&self, i: usize) -> &'a [Node] {
        self.slot(i).map_or(&[], |n| n.children.as_slice())
    }
}
