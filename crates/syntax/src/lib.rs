#![allow(clippy::result_large_err)]
//! smali-syntax: front end for smali-style Dalvik assembly.
//!
//! Turns assembly source into a syntax tree plus diagnostics. The tree is
//! what an encoder consumes to produce class, field, method and
//! instruction records.
//!
//! # Public API
//!
//! - [`lex()`] -- source text to tokens (never fails; bad input becomes
//!   an invalid token)
//! - [`parse()`] / [`parse_str()`] -- tokens or text to a [`ParseOutput`]
//! - [`Node`], [`NodeKind`], [`ClassDef`] -- the tree
//! - [`Diagnostic`], [`DiagnosticKind`] -- reported problems
//! - [`ParserConfig`] -- verbose errors, legacy-encoding compatibility,
//!   API level
//! - [`LegacyOracle`], [`OpcodeTable`] -- eligibility of optimized
//!   instructions

pub mod ast;
pub mod categories;
pub mod config;
pub mod cursor;
pub mod error;
pub mod lexer;
pub mod literal;
pub mod opcodes;
pub mod parser;
pub mod scope;
pub mod token;

// ── Convenience re-exports ───────────────────────────────────────────

pub use ast::{ClassDef, Node, NodeKind, Span};
pub use config::ParserConfig;
pub use error::{Diagnostic, DiagnosticKind};
pub use lexer::lex;
pub use opcodes::{LegacyOracle, OpcodeTable};
pub use parser::{parse, parse_str, ParseOutput};
pub use token::{Token, TokenKind};
