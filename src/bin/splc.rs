//! Command-line driver: reads a source file, runs it through as much of
//! the pipeline as the flags ask for, and writes the result to stdout or
//! the `-o` output file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use splc::error::CompileError;
use splc::CompileOptions;

#[derive(Parser, Debug)]
#[command(name = "splc", about = "Compile a SimplePython source file to C")]
struct Cli {
  /// Source file to compile.
  file: PathBuf,

  /// Where to write the emitted C source. Ignored by `-a`/`-p`/`-t`/`-i`.
  #[arg(short, long, default_value = "a.c")]
  output: PathBuf,

  /// Print the parsed AST and stop.
  #[arg(short = 'a', long)]
  print_ast: bool,

  /// Stop after parsing (implied by `--print-ast`).
  #[arg(short, long)]
  parse_only: bool,

  /// Stop after type checking, printing nothing but diagnostics.
  #[arg(short, long)]
  typecheck_only: bool,

  /// Print the generated IR (post-optimization if `-O` is also given) and stop.
  #[arg(short = 'i', long)]
  ir: bool,

  /// Run the constant-folding / dead-branch-elimination pass.
  #[arg(short = 'O', long)]
  optimize: bool,

  /// Enable verbose (`debug`-level) tracing output on stderr.
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::new(if cli.verbose { "debug" } else { "warn" }))
    .with_writer(std::io::stderr)
    .init();

  match run(&cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(Failure::Compile(e)) => { eprintln!("splc: {e}"); ExitCode::from(1) }
    Err(Failure::Io(e)) => { eprintln!("splc: {e}"); ExitCode::from(2) }
  }
}

enum Failure {
  Compile(CompileError),
  Io(std::io::Error),
}

impl From<CompileError> for Failure {
  fn from(e: CompileError) -> Self { Self::Compile(e) }
}

impl From<std::io::Error> for Failure {
  fn from(e: std::io::Error) -> Self { Self::Io(e) }
}

fn run(cli: &Cli) -> Result<(), Failure> {
  let src = std::fs::read_to_string(&cli.file)?;

  if cli.print_ast || cli.parse_only {
    let program = splc::parse(&src)?;
    if cli.print_ast { println!("{program:#?}"); }
    return Ok(());
  }

  if cli.typecheck_only {
    splc::typecheck(&src)?;
    return Ok(());
  }

  let options = CompileOptions { optimize: cli.optimize };

  if cli.ir {
    let ir = splc::to_ir(&src, options)?;
    println!("{ir:#?}");
    return Ok(());
  }

  let c = splc::compile(&src, options)?;
  std::fs::write(&cli.output, c)?;
  Ok(())
}
