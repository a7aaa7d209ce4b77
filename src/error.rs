//! The compiler's error taxonomy. Every variant carries the [`Coord`] of the
//! construct that failed; nothing in the core recovers from an error, so a
//! `Result<T, CompileError>` bubbling out of any stage aborts the
//! compilation.

use crate::coord::Coord;
use crate::symbol::Symbol;
use crate::types::Ty;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
  #[error("{1}: variable \"{0}\" is already declared in this scope")]
  Redeclaration(Symbol, Coord),

  #[error("{1}: function \"{0}\" is already declared")]
  FuncRedeclaration(Symbol, Coord),

  #[error("{1}: reference to undefined variable \"{0}\"")]
  UndefinedVariable(Symbol, Coord),

  #[error("{1}: call to undefined function \"{0}\"")]
  UndefinedFunction(Symbol, Coord),

  #[error("{2}: type mismatch: expected {0}, found {1}")]
  TypeMismatch(Ty, Ty, Coord),

  #[error("{2}: \"{0}\" was called with {1} arguments")]
  ArityMismatch(Symbol, usize, Coord),

  #[error("{1}: \"{0}\" is not an array")]
  NotAnArray(String, Coord),

  #[error("{1}: array index must be a scalar int, found {0}")]
  NonIntegerIndex(Ty, Coord),

  #[error("{2}: \"+\" requires arrays of equal depth, found {0} and {1}")]
  ArrayDepthMismatch(Ty, Ty, Coord),

  #[error("{1}: array accessed with negative index {0}")]
  NegativeIndex(i64, Coord),

  #[error("{2}: array index {0} out of bounds for array of length {1}")]
  OutOfBounds(i64, usize, Coord),

  #[error("{1}: operator \"{0}\" is not supported")]
  UnsupportedOperator(String, Coord),

  #[error("{0}: {1}")]
  SyntaxError(Coord, String),
}

impl CompileError {
  #[must_use] pub fn coord(&self) -> Coord {
    match *self {
      Self::Redeclaration(_, c)
      | Self::FuncRedeclaration(_, c)
      | Self::UndefinedVariable(_, c)
      | Self::UndefinedFunction(_, c)
      | Self::TypeMismatch(_, _, c)
      | Self::ArityMismatch(_, _, c)
      | Self::NotAnArray(_, c)
      | Self::NonIntegerIndex(_, c)
      | Self::ArrayDepthMismatch(_, _, c)
      | Self::NegativeIndex(_, c)
      | Self::OutOfBounds(_, _, c)
      | Self::UnsupportedOperator(_, c)
      | Self::SyntaxError(c, _) => c,
    }
  }
}

pub type Result<T> = std::result::Result<T, CompileError>;
