//! faxc-sem - semantic analysis
//!
//! Walks a parsed program, resolving every name through a lexically scoped
//! symbol table and checking every expression against the type lattice in
//! [`types`]. Unlike the parser, the analyzer never aborts on the first
//! mistake: it keeps walking and collects every error it finds, up to
//! [`analysis::MAX_ERRORS`].

pub mod analysis;
#[cfg(test)]
mod edge_cases;
pub mod error;
pub mod hir;
pub mod scope;
pub mod types;

pub use analysis::{AnalysisReport, SemanticAnalyzer, MAX_ERRORS};
pub use error::SemanticError;
pub use hir::{HirExpr, HirStmt};
pub use scope::{ScopeKind, SymbolEntry, SymbolKind, SymbolTable};
pub use types::Ty;

use faxc_par::Stmt;

/// Runs the analyzer over a parsed program and returns every error found.
pub fn analyze(program: &[Stmt]) -> AnalysisReport {
    SemanticAnalyzer::new().analyze(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use faxc_par::Parser;

    fn check(src: &str) -> AnalysisReport {
        let output = Parser::new(src).parse_program();
        assert!(output.errors.is_empty(), "parse errors: {:?}", output.errors);
        analyze(&output.statements)
    }

    #[test]
    fn valid_program_has_no_errors() {
        let report = check("number x = 1; number y = x + 2;");
        assert!(!report.has_errors(), "{:?}", report.errors);
    }

    #[test]
    fn undefined_identifier_is_an_error() {
        let report = check("number x = y;");
        assert!(report.has_errors());
    }

    #[test]
    fn duplicate_declaration_in_same_scope_is_an_error() {
        let report = check("number x = 1; number x = 2;");
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn const_without_initializer_is_rejected_by_the_parser() {
        // The parser itself refuses a `const` with no initializer, so this
        // never reaches the analyzer; `check_var_decl`'s own guard against
        // it is defense in depth for HIR built by other means.
        let output = Parser::new("const number x;").parse_program();
        assert!(!output.errors.is_empty());
    }

    #[test]
    fn assigning_to_constant_is_an_error() {
        let report = check("const number x = 1; x = 2;");
        assert!(report.has_errors());
    }

    #[test]
    fn type_mismatch_in_initializer_is_an_error() {
        let report = check("number x = \"hi\";");
        assert!(report.has_errors());
    }

    #[test]
    fn if_condition_must_be_bool() {
        let report = check("if (1) { number x = 1; }");
        assert!(report.has_errors());
    }

    #[test]
    fn break_outside_loop_is_an_error() {
        let report = check("break;");
        assert!(report.has_errors());
    }

    #[test]
    fn break_inside_loop_is_fine() {
        let report = check("while (true) { break; }");
        assert!(!report.has_errors(), "{:?}", report.errors);
    }

    #[test]
    fn function_cannot_see_outer_local() {
        let report = check("number g = 1; number f() { number y = g; return y; }");
        assert!(report.has_errors());
    }

    #[test]
    fn function_call_checks_argument_count_and_types() {
        let report = check("number add(number a, number b) { return a + b; } number r = add(1);");
        assert!(report.has_errors());
    }

    #[test]
    fn error_cascade_does_not_suppress_later_independent_errors() {
        // `w`'s undefined-name error shouldn't prevent the assignment to
        // `y` from also being flagged as a constant violation.
        let report = check("const number y = 1; number z = y + w; y = 2;");
        assert_eq!(report.errors.len(), 2);
    }
}
