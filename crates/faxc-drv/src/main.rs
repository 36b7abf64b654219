//! `faxc` — the command-line front end over [`faxc_drv::compile`].

use anyhow::Context;
use faxc_drv::{compile, has_error_diagnostics, CompileOptions, DriverError};
use clap::Parser as ClapParser;
use faxc_lex::Encoding;
use faxc_mir::{OptConfig, OptLevel};
use faxc_util::diagnostic::Diagnostic;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(ClapParser, Debug)]
#[command(name = "faxc", version, about = "Fax language front-end and optimizer")]
struct Cli {
    /// Source file to compile.
    input: PathBuf,

    /// Optimization level.
    #[arg(short = 'O', long, value_enum, default_value_t = OptLevelArg::O1)]
    opt: OptLevelArg,

    /// Source encoding.
    #[arg(long, value_enum, default_value_t = EncodingArg::Utf8)]
    encoding: EncodingArg,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OptLevelArg {
    #[value(name = "o0")]
    O0,
    #[value(name = "o1")]
    O1,
    #[value(name = "o2")]
    O2,
    #[value(name = "o3")]
    O3,
}

impl From<OptLevelArg> for OptLevel {
    fn from(level: OptLevelArg) -> Self {
        match level {
            OptLevelArg::O0 => OptLevel::O0,
            OptLevelArg::O1 => OptLevel::O1,
            OptLevelArg::O2 => OptLevel::O2,
            OptLevelArg::O3 => OptLevel::O3,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum EncodingArg {
    Utf8,
    Utf16,
}

impl From<EncodingArg> for Encoding {
    fn from(encoding: EncodingArg) -> Self {
        match encoding {
            EncodingArg::Utf8 => Encoding::Utf8,
            EncodingArg::Utf16 => Encoding::Utf16,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { log::Level::Debug } else { log::Level::Warn };
    simple_logger::init_with_level(level).ok();

    match run(&cli) {
        Ok(had_errors) => ExitCode::from(u8::from(had_errors)),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Reads and compiles `cli.input`, printing a one-line progress message
/// per phase to stdout and any diagnostics to stderr. Returns whether any
/// diagnostic at [`Level::Error`](faxc_util::diagnostic::Level::Error)
/// was recorded. An `Err` here means the pipeline aborted before any
/// diagnostics could even be produced (a bad file path, an encoding
/// error) — distinct from a parse or semantic failure, which still
/// carries diagnostics to report and is handled as an ordinary
/// error-bearing run below.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let source = std::fs::read(&cli.input)
        .with_context(|| format!("could not read {}", cli.input.display()))?;

    println!("lexing {}", cli.input.display());
    println!("parsing {}", cli.input.display());
    println!("analyzing {}", cli.input.display());

    let opts = CompileOptions {
        encoding: cli.encoding.into(),
        opt: OptConfig { level: cli.opt.into(), ..OptConfig::default() },
    };

    match compile(&source, opts) {
        Ok(output) => {
            println!(
                "lowering + optimizing ({} token(s), {} function(s))",
                output.tokens_lexed,
                output.module.functions.len()
            );
            print_diagnostics(&output.diagnostics);
            Ok(has_error_diagnostics(&output.diagnostics))
        }
        Err(DriverError::ParseFailed(diags)) | Err(DriverError::SemanticFailed(diags)) => {
            print_diagnostics(&diags);
            Ok(has_error_diagnostics(&diags))
        }
        Err(e @ DriverError::Encoding(_)) => Err(e).context("compilation failed"),
    }
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diag in diagnostics {
        eprintln!("{}: {}", diag.level, diag.message);
    }
}
