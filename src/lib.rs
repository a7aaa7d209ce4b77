//! `splc`: a source-to-source compiler from a small statically-typed
//! scripting language to C.
//!
//! The pipeline is four stages run in strict sequence: [`frontend::parse`]
//! (text → [`ast::Program`]), [`typeck::check_program`] (annotates the AST
//! in place), [`irgen::generate`] ([`ast::Program`] → flat [`ir::Ir`]
//! stream), an optional [`mir_opt::optimize`] pass, and [`emit::emit`]
//! (IR → C source text).

pub mod ast;
pub mod coord;
pub mod emit;
pub mod error;
pub mod frontend;
pub mod ir;
pub mod irgen;
pub mod mir_opt;
pub mod ops;
pub mod symbol;
pub mod symtab;
pub mod types;
pub mod typeck;

use error::{CompileError, Result};

/// Knobs controlling how far [`compile`] carries a source file through the
/// pipeline, and whether the optimizer runs. Mirrors the CLI driver's own
/// flags one-to-one so the binary is a thin wrapper over this function.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
  pub optimize: bool,
}

/// Parse `src`, returning the raw AST without type-checking it.
pub fn parse(src: &str) -> Result<ast::Program> {
  frontend::parse(src)
}

/// Parse and type-check `src`, returning the annotated AST.
pub fn typecheck(src: &str) -> Result<ast::Program> {
  let program = parse(src)?;
  typeck::check_program(&program)?;
  Ok(program)
}

/// Run the full pipeline through IR generation and (if requested) the
/// optimizer, without emitting C text.
pub fn to_ir(src: &str, options: CompileOptions) -> Result<Vec<ir::Ir>> {
  let program = typecheck(src)?;
  let ir = irgen::generate(&program);
  if options.optimize { mir_opt::optimize(&ir) } else { Ok(ir) }
}

/// Compile `src` all the way to C source text.
pub fn compile(src: &str, options: CompileOptions) -> Result<String> {
  let ir = to_ir(src, options)?;
  Ok(emit::emit(&ir))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn compiles_a_trivial_program_to_c() {
    let c = compile("def main() -> int:\n    return 0\n", CompileOptions::default()).unwrap();
    assert!(c.contains("int main"));
    assert!(c.contains("return 0"));
  }

  #[test]
  fn optimizer_flag_eliminates_a_dead_branch() {
    let src = "def main() -> int:\n    if False:\n        print(1)\n    return 0\n";
    let unoptimized = compile(src, CompileOptions { optimize: false }).unwrap();
    let optimized = compile(src, CompileOptions { optimize: true }).unwrap();
    assert!(unoptimized.contains("if ("));
    assert!(!optimized.contains("printf(\"%d\\n\", 1)"));
  }

  #[test]
  fn a_type_error_surfaces_as_a_compile_error() {
    let err = compile("def main() -> int:\n    x = 1\n    x = \"s\"\n    return 0\n", CompileOptions::default()).unwrap_err();
    assert!(matches!(err, CompileError::TypeMismatch(..)));
  }

  #[test]
  fn a_syntax_error_surfaces_as_a_compile_error() {
    let err = compile("def main() -> int:\nreturn 0\n", CompileOptions::default()).unwrap_err();
    assert!(matches!(err, CompileError::SyntaxError(..)));
  }
}
