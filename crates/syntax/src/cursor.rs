//! Lookahead cursor over the lexed token vector.
//!
//! Hidden-channel tokens are filtered out once at construction, so grammar
//! rules only ever see default-channel tokens. Peeking past the end yields
//! the trailing `Eof`.

use crate::token::{Token, TokenKind};

/// Opaque cursor position returned by [`TokenCursor::mark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

impl Checkpoint {
    pub fn index(self) -> usize {
        self.0
    }
}

pub struct TokenCursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenCursor {
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut tokens: Vec<Token> = tokens.into_iter().filter(|t| !t.is_hidden()).collect();
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let (line, column, offset) = match tokens.last() {
                Some(t) => (t.line, t.column + t.text.chars().count() as u32, t.end_offset),
                None => (1, 1, 0),
            };
            tokens.push(Token::new(TokenKind::Eof, "", line, column, offset));
        }
        TokenCursor { tokens, pos: 0 }
    }

    pub fn peek(&self, k: usize) -> TokenKind {
        self.peek_token(k).kind
    }

    pub fn peek_token(&self, k: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + k).min(last)]
    }

    /// Take the current token. At `Eof` the cursor stays put and keeps
    /// returning it.
    pub fn consume(&mut self) -> Token {
        let tok = self.peek_token(0).clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    pub fn mark(&self) -> Checkpoint {
        Checkpoint(self.pos)
    }

    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.0;
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// The most recently consumed token, if any.
    pub fn previous(&self) -> Option<&Token> {
        self.pos.checked_sub(1).map(|i| &self.tokens[i])
    }

    /// Tokens consumed since `checkpoint`, in order.
    pub fn consumed_since(&self, checkpoint: Checkpoint) -> &[Token] {
        &self.tokens[checkpoint.0.min(self.pos)..self.pos]
    }

    pub fn at_eof(&self) -> bool {
        self.peek(0) == TokenKind::Eof
    }
}
