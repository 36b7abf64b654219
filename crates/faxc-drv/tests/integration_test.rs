//! Integration tests over [`faxc_drv::compile`]: source text through the
//! whole pipeline, checked at the `Module` level.

use faxc_drv::{compile, has_error_diagnostics, CompileOptions};
use faxc_mir::{OptConfig, OptLevel};

#[test]
fn compiles_a_function_with_control_flow() {
    let src = r#"
        number square(number n) {
            return n * n;
        }
        number f() {
            number total = 0;
            number i = 0;
            while (i < 5) {
                total = total + square(i);
                i = i + 1;
            }
            return total;
        }
    "#;
    let output = compile(src.as_bytes(), CompileOptions::default()).expect("should compile");
    assert!(!has_error_diagnostics(&output.diagnostics));
    assert!(output.module.functions.iter().any(|f| f.name.as_str() == "square"));
    assert!(output.module.functions.iter().any(|f| f.name.as_str() == "f"));
}

#[test]
fn optimizing_at_o3_still_terminates_every_function() {
    let src = "number f() { number i = 0; while (i < 20) { i = i + 1; } return i; }";
    let opts = CompileOptions {
        opt: OptConfig { level: OptLevel::O3, ..OptConfig::default() },
        ..CompileOptions::default()
    };
    let output = compile(src.as_bytes(), opts).expect("should compile");
    for func in &output.module.functions {
        let has_terminator = func.blocks.iter().any(|b| {
            b.instructions
                .last()
                .is_some_and(|&id| func.insts[id].opcode.is_terminator())
        });
        assert!(has_terminator, "function {} lost its terminator under O3", func.name.as_str());
    }
}

#[test]
fn a_parse_error_short_circuits_before_semantic_analysis() {
    let err = compile(b"number x = ;", CompileOptions::default()).unwrap_err();
    assert!(matches!(err, faxc_drv::DriverError::ParseFailed(_)));
}

#[test]
fn a_semantic_error_short_circuits_before_lowering() {
    let err = compile(b"return 1;", CompileOptions::default()).unwrap_err();
    assert!(matches!(err, faxc_drv::DriverError::SemanticFailed(_)));
}

#[test]
fn reports_token_count_alongside_the_module() {
    let output = compile(b"number x = 1;", CompileOptions::default()).unwrap();
    // number, x, =, 1, ;, EOF
    assert_eq!(output.tokens_lexed, 6);
}
