//! Type descriptors, parameter lists and method prototypes.

use super::{PResult, Parser};
use crate::ast::{Node, NodeKind, Span};
use crate::categories::{is_nonvoid_type, is_reference_type};
use crate::error::DiagnosticKind;
use crate::token::{Token, TokenKind};

/// Largest array dimension a descriptor may carry.
const MAX_ARRAY_DIMENSIONS: usize = 255;

/// Split a run of concatenated type descriptors into `(start, end, kind)`
/// triples, in char offsets. `V` is rejected; it is only valid as a return
/// type and is handled by the caller.
pub fn scan_type_run(text: &str) -> Result<Vec<(usize, usize, TokenKind)>, String> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let start = i;
        while i < chars.len() && chars[i] == '[' {
            i += 1;
        }
        let dims = i - start;
        if dims > MAX_ARRAY_DIMENSIONS {
            return Err(format!(
                "array descriptor '{}' has {} dimensions, more than the maximum of {}",
                text, dims, MAX_ARRAY_DIMENSIONS
            ));
        }
        match chars.get(i) {
            Some('Z' | 'B' | 'S' | 'C' | 'I' | 'J' | 'F' | 'D') => i += 1,
            Some('L') => {
                i = class_name_end(&chars, i).ok_or_else(|| {
                    let element: String = chars[i..].iter().collect();
                    format!("unterminated or malformed class name '{}' in '{}'", element, text)
                })?;
            }
            Some('V') => return Err(format!("void is not a valid element type in '{}'", text)),
            Some(c) => return Err(format!("invalid type descriptor character '{}' in '{}'", c, text)),
            None => return Err(format!("array descriptor '{}' has no element type", text)),
        }
        let kind = if dims > 0 {
            TokenKind::ArrayDescriptor
        } else if chars[start] == 'L' {
            TokenKind::ClassDescriptor
        } else {
            TokenKind::PrimitiveType
        };
        out.push((start, i, kind));
    }
    Ok(out)
}

/// End (exclusive) of the class name starting at `chars[at] == 'L'`.
fn class_name_end(chars: &[char], at: usize) -> Option<usize> {
    let mut i = at + 1;
    let mut segment = 0usize;
    while i < chars.len() {
        match chars[i] {
            ';' => return (segment > 0).then_some(i + 1),
            '/' if segment > 0 => segment = 0,
            c if crate::lexer::is_name_char(c) => segment += 1,
            _ => return None,
        }
        i += 1;
    }
    None
}

impl<'a> Parser<'a> {
    fn structural(&self, token: &Token, message: String) -> crate::error::Diagnostic {
        self.diag(DiagnosticKind::Structural, message, Span::of(token))
    }

    /// Check that an array-descriptor token holds exactly one well-formed
    /// descriptor.
    fn checked_array_descriptor(&self, token: Token) -> PResult<Node> {
        match scan_type_run(&token.text) {
            Ok(parts) if parts.len() == 1 && parts[0].2 == TokenKind::ArrayDescriptor => {
                Ok(Node::literal(NodeKind::ArrayDescriptor, token))
            }
            Ok(_) => Err(self.structural(
                &token,
                format!("malformed array descriptor '{}'", token.text),
            )),
            Err(msg) => Err(self.structural(&token, msg)),
        }
    }

    pub(super) fn reference_type_descriptor(&mut self) -> PResult<Node> {
        match self.peek(0) {
            TokenKind::ClassDescriptor => {
                let tok = self.consume();
                Ok(Node::literal(NodeKind::ClassDescriptor, tok))
            }
            TokenKind::ArrayDescriptor => {
                let tok = self.consume();
                self.checked_array_descriptor(tok)
            }
            _ => Err(self.unexpected("class or array descriptor")),
        }
    }

    pub(super) fn nonvoid_type_descriptor(&mut self) -> PResult<Node> {
        if self.at(TokenKind::PrimitiveType) {
            let tok = self.consume();
            return Ok(Node::literal(NodeKind::PrimitiveType, tok));
        }
        if is_reference_type(self.peek(0)) {
            return self.reference_type_descriptor();
        }
        Err(self.unexpected("type descriptor"))
    }

    pub(super) fn type_descriptor(&mut self) -> PResult<Node> {
        if self.at(TokenKind::VoidType) {
            let tok = self.consume();
            return Ok(Node::literal(NodeKind::VoidType, tok));
        }
        self.nonvoid_type_descriptor()
    }

    /// `'(' param_list ')' type_descriptor`, as
    /// `MethodPrototype[MethodReturnType[type], param...]`.
    pub(super) fn method_prototype(&mut self) -> PResult<Node> {
        self.rule("method_prototype", |p| {
            p.expect(TokenKind::OpenParen)?;
            let params = p.param_list()?;
            p.expect(TokenKind::CloseParen)?;
            let ret = p.type_descriptor()?;
            let mut children = Vec::with_capacity(params.len() + 1);
            children.push(Node::synthetic(NodeKind::MethodReturnType, vec![ret]));
            children.extend(params);
            Ok(Node::synthetic(NodeKind::MethodPrototype, children))
        })
    }

    /// Parameter types up to the closing parenthesis, flattened to one node
    /// per type whatever their surface form: separate descriptors, a run of
    /// primitive letters, or one concatenated descriptor run.
    fn param_list(&mut self) -> PResult<Vec<Node>> {
        let mut params = Vec::new();
        loop {
            match self.peek(0) {
                TokenKind::CloseParen => return Ok(params),
                kind if is_nonvoid_type(kind) => {
                    params.push(self.nonvoid_type_descriptor()?);
                }
                TokenKind::ParamList | TokenKind::ParamListOrIdPrimitiveType => {
                    let tok = self.consume();
                    params.extend(self.split_param_run(&tok)?);
                }
                TokenKind::VoidType => {
                    let tok = self.peek_token(0);
                    return Err(self.structural(tok, "void is not a valid parameter type".to_string()));
                }
                _ => return Err(self.unexpected("parameter type or ')'")),
            }
        }
    }

    fn split_param_run(&self, token: &Token) -> PResult<Vec<Node>> {
        let parts = scan_type_run(&token.text).map_err(|msg| self.structural(token, msg))?;
        Ok(parts
            .into_iter()
            .map(|(start, end, kind)| {
                let node_kind = match kind {
                    TokenKind::ArrayDescriptor => NodeKind::ArrayDescriptor,
                    TokenKind::ClassDescriptor => NodeKind::ClassDescriptor,
                    _ => NodeKind::PrimitiveType,
                };
                Node::literal(node_kind, token.sub_token(kind, start, end))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_concatenated_descriptors() {
        let parts = scan_type_run("ILjava/lang/String;[[JZ").unwrap();
        assert_eq!(
            parts,
            vec![
                (0, 1, TokenKind::PrimitiveType),
                (1, 19, TokenKind::ClassDescriptor),
                (19, 22, TokenKind::ArrayDescriptor),
                (22, 23, TokenKind::PrimitiveType),
            ]
        );
    }

    #[test]
    fn rejects_unterminated_class_in_array() {
        let err = scan_type_run("[Ljava/lang/String").unwrap_err();
        assert!(err.contains("unterminated"), "{}", err);
    }

    #[test]
    fn rejects_too_many_dimensions() {
        let text = format!("{}I", "[".repeat(256));
        assert!(scan_type_run(&text).unwrap_err().contains("maximum of 255"));
        let ok = format!("{}I", "[".repeat(255));
        assert_eq!(scan_type_run(&ok).unwrap().len(), 1);
    }

    #[test]
    fn rejects_void_and_bare_brackets() {
        assert!(scan_type_run("[V").is_err());
        assert!(scan_type_run("[").is_err());
        assert!(scan_type_run("IQ").is_err());
        assert!(scan_type_run("L;").is_err());
        assert!(scan_type_run("La//b;").is_err());
    }
}
