//! The lexically scoped symbol table.

use crate::types::Ty;
use faxc_lex::Token;
use faxc_util::Symbol;
use indexmap::IndexMap;

/// What a name is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function,
}

/// A single binding: declared type, defining token, and the mutable flags
/// the checker updates in place as it walks the program.
#[derive(Clone, Debug)]
pub struct SymbolEntry {
    pub name: Symbol,
    pub kind: SymbolKind,
    pub ty: Ty,
    pub ret_ty: Ty,
    pub def_token: Token,
    pub scope_depth: usize,
    pub is_initialized: bool,
    pub is_constant: bool,
    pub is_modified: bool,
    /// Parameter types, in declaration order, for a `Function` symbol.
    pub params: Vec<Ty>,
}

impl SymbolEntry {
    pub fn variable(name: Symbol, ty: Ty, def_token: Token, scope_depth: usize, is_constant: bool, is_initialized: bool) -> Self {
        SymbolEntry {
            name,
            kind: SymbolKind::Variable,
            ty,
            ret_ty: Ty::None,
            def_token,
            scope_depth,
            is_initialized,
            is_constant,
            is_modified: false,
            params: Vec::new(),
        }
    }

    pub fn parameter(name: Symbol, ty: Ty, def_token: Token, scope_depth: usize) -> Self {
        SymbolEntry {
            name,
            kind: SymbolKind::Parameter,
            ty,
            ret_ty: Ty::None,
            def_token,
            scope_depth,
            // A parameter is initialized on entry to its function scope.
            is_initialized: true,
            is_constant: false,
            is_modified: false,
            params: Vec::new(),
        }
    }

    pub fn function(name: Symbol, ret_ty: Ty, def_token: Token, scope_depth: usize, params: Vec<Ty>) -> Self {
        SymbolEntry {
            name,
            kind: SymbolKind::Function,
            ty: ret_ty,
            ret_ty,
            def_token,
            scope_depth,
            is_initialized: true,
            is_constant: true,
            is_modified: false,
            params,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
}

struct Scope {
    kind: ScopeKind,
    bindings: IndexMap<Symbol, SymbolEntry>,
}

/// A stack of scopes mapping identifier to symbol.
///
/// The global scope (depth 0) is pushed by `new` and is never popped;
/// `end_scope` on an empty stack-of-one is a no-op.
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![Scope {
                kind: ScopeKind::Global,
                bindings: IndexMap::new(),
            }],
        }
    }

    pub fn begin_scope(&mut self, kind: ScopeKind) {
        self.scopes.push(Scope {
            kind,
            bindings: IndexMap::new(),
        });
    }

    pub fn end_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn current_scope_level(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn is_defined_in_current_scope(&self, name: Symbol) -> bool {
        self.scopes
            .last()
            .map(|s| s.bindings.contains_key(&name))
            .unwrap_or(false)
    }

    /// Inserts into the current scope. Fails if the name already exists at
    /// this depth; shadowing an outer scope is always legal.
    pub fn define(&mut self, entry: SymbolEntry) -> Result<(), ()> {
        if self.is_defined_in_current_scope(entry.name) {
            return Err(());
        }
        self.scopes.last_mut().unwrap().bindings.insert(entry.name, entry);
        Ok(())
    }

    /// True while any enclosing scope (inclusive) is a `Function` scope,
    /// i.e. we are currently inside a function body.
    fn inside_function(&self) -> bool {
        self.scopes.iter().any(|s| s.kind == ScopeKind::Function)
    }

    /// Resolves a name for a call target or duplicate-declaration check:
    /// a plain inside-out walk with no restriction.
    pub fn resolve(&self, name: Symbol) -> Option<&SymbolEntry> {
        self.scopes.iter().rev().find_map(|s| s.bindings.get(&name))
    }

    pub fn resolve_mut(&mut self, name: Symbol) -> Option<&mut SymbolEntry> {
        self.scopes.iter_mut().rev().find_map(|s| s.bindings.get_mut(&name))
    }

    /// Resolves a name for a variable read/write.
    ///
    /// The analyzer forbids referencing a global variable from inside a
    /// function body (see `DESIGN.md`): when the walk is about to fall
    /// through to the global scope while already inside a function, it
    /// stops one scope short instead. Function symbols at global scope
    /// remain callable from anywhere via `resolve`.
    pub fn resolve_variable(&self, name: Symbol) -> Option<&SymbolEntry> {
        let in_function = self.inside_function();
        for (depth, scope) in self.scopes.iter().enumerate().rev() {
            if in_function && depth == 0 {
                return None;
            }
            if let Some(entry) = scope.bindings.get(&name) {
                return Some(entry);
            }
        }
        None
    }

    pub fn resolve_variable_mut(&mut self, name: Symbol) -> Option<&mut SymbolEntry> {
        let in_function = self.inside_function();
        let len = self.scopes.len();
        for depth in (0..len).rev() {
            if in_function && depth == 0 {
                return None;
            }
            if self.scopes[depth].bindings.contains_key(&name) {
                return self.scopes[depth].bindings.get_mut(&name);
            }
        }
        None
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faxc_lex::TokenKind;

    fn tok() -> Token {
        Token::new(TokenKind::Identifier, "x", 1, 1)
    }

    #[test]
    fn shadowing_across_scopes_is_legal() {
        let mut table = SymbolTable::new();
        let x = Symbol::intern("x");
        table
            .define(SymbolEntry::variable(x, Ty::Number, tok(), 0, false, true))
            .unwrap();
        table.begin_scope(ScopeKind::Block);
        table
            .define(SymbolEntry::variable(x, Ty::String, tok(), 1, false, true))
            .unwrap();
        assert_eq!(table.resolve(x).unwrap().ty, Ty::String);
        table.end_scope();
        assert_eq!(table.resolve(x).unwrap().ty, Ty::Number);
    }

    #[test]
    fn redefinition_in_same_scope_fails() {
        let mut table = SymbolTable::new();
        let x = Symbol::intern("dup");
        table
            .define(SymbolEntry::variable(x, Ty::Number, tok(), 0, false, true))
            .unwrap();
        assert!(table
            .define(SymbolEntry::variable(x, Ty::Number, tok(), 0, false, true))
            .is_err());
    }

    #[test]
    fn global_scope_is_never_popped() {
        let mut table = SymbolTable::new();
        table.end_scope();
        assert_eq!(table.current_scope_level(), 0);
    }

    #[test]
    fn function_scope_hides_global_variables() {
        let mut table = SymbolTable::new();
        let g = Symbol::intern("g");
        table
            .define(SymbolEntry::variable(g, Ty::Number, tok(), 0, false, true))
            .unwrap();
        table.begin_scope(ScopeKind::Function);
        assert!(table.resolve_variable(g).is_none());
        assert!(table.resolve(g).is_some());
    }
}
