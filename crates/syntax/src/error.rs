use serde::Serialize;

use crate::ast::Span;
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Unexpected token or unterminated construct.
    Syntax,
    /// None of the backtracking alternatives matched.
    NoViableAlternative,
    /// Use-once violations, missing class/super, out-of-range counts.
    Semantic,
    /// Malformed descriptor text or illegal array-data width.
    Structural,
    /// Optimized instruction rejected by the compatibility gate.
    Unsupported,
    /// Input the lexer could not turn into a token.
    Lexical,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DiagnosticKind::Syntax => "syntax error",
            DiagnosticKind::NoViableAlternative => "no viable alternative",
            DiagnosticKind::Semantic => "semantic error",
            DiagnosticKind::Structural => "structural error",
            DiagnosticKind::Unsupported => "unsupported instruction",
            DiagnosticKind::Lexical => "lexical error",
        };
        f.write_str(s)
    }
}

/// A reported problem with its source span.
///
/// `rule_stack` is only filled when the parser runs with verbose errors; it
/// lists the grammar rules active when the error was raised, outermost first.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{}:{}: {}: {}", .span.line, .span.column, .kind, .message)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rule_stack: Vec<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Self {
        Diagnostic {
            kind,
            message: message.into(),
            span,
            rule_stack: Vec::new(),
        }
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::Syntax, message, span)
    }

    pub fn no_viable_alternative(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::NoViableAlternative, message, span)
    }

    pub fn semantic(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::Semantic, message, span)
    }

    pub fn structural(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::Structural, message, span)
    }

    pub fn unsupported(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::Unsupported, message, span)
    }

    pub fn lexical(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::Lexical, message, span)
    }

    /// Display form plus, when present, the rule stack on a second line.
    pub fn render(&self) -> String {
        if self.rule_stack.is_empty() {
            self.to_string()
        } else {
            format!("{}\n    rule stack: {}", self, self.rule_stack.join(" > "))
        }
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "kind":       self.kind,
            "message":    self.message,
            "line":       self.span.line,
            "column":     self.span.column,
            "start":      self.span.start_offset,
            "end":        self.span.end_offset,
            "rule_stack": self.rule_stack,
        })
    }
}

/// Token as shown inside an error message.
///
/// Compact: the quoted text with control characters escaped, e.g. `'foo'`
/// or `'\n'`. Verbose: a full token dump with index, offsets, kind and
/// position, e.g. `[@3,10:12='v0',<Register>,2:5]`.
pub fn display_token(token: &Token, index: usize, verbose: bool) -> String {
    let text = if token.kind == TokenKind::Eof {
        "<EOF>".to_string()
    } else {
        escape_text(&token.text)
    };
    if verbose {
        format!(
            "[@{},{}:{}='{}',<{:?}>,{}:{}]",
            index,
            token.start_offset,
            token.end_offset.saturating_sub(1),
            text,
            token.kind,
            token.line,
            token.column
        )
    } else {
        format!("'{}'", text)
    }
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}
