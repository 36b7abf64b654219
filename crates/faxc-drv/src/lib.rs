//! faxc-drv — the pipeline driver: wires lexing, parsing, semantic
//! analysis, IR lowering, and optimization into a single [`compile`]
//! entry point, and backs the `faxc` CLI binary.

use faxc_lex::Encoding;
use faxc_mir::{lower_program, Module, OptConfig, PassManager};
use faxc_par::Parser;
use faxc_sem::analyze;
use faxc_util::diagnostic::{Diagnostic, Level};
use faxc_util::Span;
use log::debug;
use thiserror::Error;

/// Options governing a single [`compile`] call.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub encoding: Encoding,
    pub opt: OptConfig,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            encoding: Encoding::Utf8,
            opt: OptConfig::default(),
        }
    }
}

/// Everything a successful (or partially successful) compile produced.
#[derive(Debug)]
pub struct CompileOutput {
    pub tokens_lexed: usize,
    pub module: Module,
    pub diagnostics: Vec<Diagnostic>,
}

/// An error that stops compilation before a [`Module`] can be produced.
/// `ParseFailed`/`SemanticFailed` still carry the diagnostics collected up
/// to that point — the caller reports them exactly as it would a
/// successful compile's warnings, it just has no `Module` to go with
/// them. `Encoding` is the one truly unreportable case: without a decoded
/// source there is nothing to run the diagnostic machinery over.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("source encoding error: {0}")]
    Encoding(#[from] faxc_lex::LexError),
    #[error("parsing failed with {} error(s)", .0.len())]
    ParseFailed(Vec<Diagnostic>),
    #[error("semantic analysis failed with {} error(s)", .0.len())]
    SemanticFailed(Vec<Diagnostic>),
}

/// Runs the full pipeline over `source`: decode, lex, parse, analyze,
/// lower to IR, and optimize at `opts.opt.level`.
///
/// Per the parser's and analyzer's own error-recovery contracts, a single
/// bad statement does not stop parsing or analysis early — but a parse
/// that ends with any recorded error does not proceed to semantic
/// analysis, and an analysis that records any error does not proceed to
/// IR generation, since neither stage's output can be trusted once it has
/// recorded a mistake.
pub fn compile(source: &[u8], opts: CompileOptions) -> Result<CompileOutput, DriverError> {
    let decoded = faxc_lex::encoding::decode(source, opts.encoding)?;

    let tokens = faxc_lex::tokenize_source(source, opts.encoding)?;
    debug!("lexed {} tokens", tokens.len());

    let parsed = Parser::new(&decoded).parse_program();
    let mut diagnostics: Vec<Diagnostic> = parsed.errors.iter().map(parse_error_to_diagnostic).collect();
    if !parsed.errors.is_empty() {
        return Err(DriverError::ParseFailed(diagnostics));
    }
    debug!("parsed {} top-level statement(s)", parsed.statements.len());

    let report = analyze(&parsed.statements);
    diagnostics.extend(report.errors.iter().map(semantic_error_to_diagnostic));
    if report.has_errors() {
        return Err(DriverError::SemanticFailed(diagnostics));
    }
    debug!("semantic analysis produced {} HIR statement(s)", report.hir.len());

    let mut module = lower_program(&report.hir);
    debug!("lowered to {} function(s)", module.functions.len());

    let manager = PassManager::new();
    manager.run_on_module(&mut module, &opts.opt);

    Ok(CompileOutput {
        tokens_lexed: tokens.len(),
        module,
        diagnostics,
    })
}

fn parse_error_to_diagnostic(err: &faxc_par::ParseError) -> Diagnostic {
    Diagnostic::error(err.message.clone(), Span::point(err.line, err.column))
}

fn semantic_error_to_diagnostic(err: &faxc_sem::SemanticError) -> Diagnostic {
    Diagnostic::error(err.message.clone(), Span::point(err.line, err.column))
}

/// True if any collected diagnostic is at [`Level::Error`] — the exit-code
/// gate the CLI checks.
pub fn has_error_diagnostics(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.level == Level::Error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_a_trivial_program() {
        let output = compile(b"number x = 2 + 3;", CompileOptions::default()).unwrap();
        assert!(output.tokens_lexed > 0);
        assert!(!output.module.functions.is_empty());
        assert!(!has_error_diagnostics(&output.diagnostics));
    }

    #[test]
    fn reports_a_parse_error_without_panicking() {
        let err = compile(b"number x = ;", CompileOptions::default()).unwrap_err();
        match err {
            DriverError::ParseFailed(diags) => assert!(!diags.is_empty()),
            other => panic!("expected ParseFailed, got {other:?}"),
        }
    }

    #[test]
    fn reports_a_semantic_error_without_panicking() {
        let err = compile(b"number x = true;", CompileOptions::default()).unwrap_err();
        match err {
            DriverError::SemanticFailed(diags) => assert!(!diags.is_empty()),
            other => panic!("expected SemanticFailed, got {other:?}"),
        }
    }

    #[test]
    fn runs_optimizations_at_the_requested_level() {
        let opts = CompileOptions {
            opt: OptConfig { level: faxc_mir::OptLevel::O1, ..OptConfig::default() },
            ..CompileOptions::default()
        };
        let output = compile(b"number x = 2 + 3;", opts).unwrap();
        let func = &output.module.functions[0];
        let folded = func.insts.iter().any(|inst| {
            inst.opcode == faxc_mir::Opcode::Add
                && inst.operands == vec![faxc_mir::Operand::Constant(faxc_mir::Constant::Int(5))]
        });
        assert!(folded);
    }
}
