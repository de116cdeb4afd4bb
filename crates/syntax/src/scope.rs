//! Per-unit and per-method bookkeeping for use-once directives and
//! annotation accumulation.
//!
//! The stack is owned by the parser and pushed/popped around the file and
//! method rules, error exits included.

use crate::ast::Node;

#[derive(Debug, Default)]
pub struct FileScope {
    pub has_class_spec: bool,
    pub has_super_spec: bool,
    pub has_source_spec: bool,
    pub pending_class_annotations: Vec<Node>,
}

#[derive(Debug, Default)]
pub struct MethodScope {
    pub has_registers_directive: bool,
    pub pending_method_annotations: Vec<Node>,
}

#[derive(Debug)]
pub enum Scope {
    File(FileScope),
    Method(MethodScope),
}

#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_file_scope(&mut self) {
        self.scopes.push(Scope::File(FileScope::default()));
    }

    pub fn push_method_scope(&mut self) {
        self.scopes.push(Scope::Method(MethodScope::default()));
    }

    /// Pop the innermost scope.
    ///
    /// # Panics
    ///
    /// Panics if the stack is empty; push and pop are always paired by the
    /// parser, so an empty pop is a bug in the grammar code.
    pub fn pop(&mut self) -> Scope {
        match self.scopes.pop() {
            Some(scope) => scope,
            None => panic!("scope stack popped while empty"),
        }
    }

    /// Innermost file scope.
    pub fn current_file(&mut self) -> Option<&mut FileScope> {
        self.scopes.iter_mut().rev().find_map(|s| match s {
            Scope::File(f) => Some(f),
            Scope::Method(_) => None,
        })
    }

    /// Innermost method scope.
    pub fn current_method(&mut self) -> Option<&mut MethodScope> {
        self.scopes.iter_mut().rev().find_map(|s| match s {
            Scope::Method(m) => Some(m),
            Scope::File(_) => None,
        })
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}
