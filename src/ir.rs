//! The linear intermediate representation: a flat, ordered stream mixing
//! three-address-code instructions with structured control markers.
//!
//! Shaped after `SimplePythonIRGen.py`'s single flat `instructions` list
//! (rather than a basic-block graph): every stage downstream of `irgen`
//! — the optimizer and the emitter — walks this one `Vec<Ir>` start to
//! end, tracking nesting with simple depth counters instead of consulting
//! a CFG. This mirrors the teacher's own choice in `build_mir.rs` to keep
//! its MIR a flat per-function instruction vector before VCode
//! lowering introduces real basic blocks.

use std::fmt;

use smallvec::SmallVec;

use crate::coord::Coord;
use crate::ops::{BinOp, UnaryOp};
use crate::symbol::Symbol;
use crate::types::Ty;

/// Call arguments, array elements, and print arguments are almost always a
/// handful of operands — inline the common case instead of heap-allocating
/// a `Vec` for every one of them.
pub type OperandList = SmallVec<[Operand; 4]>;

/// A temporary or variable operand, or an immediate constant. `irgen`
/// always materializes a fresh `Temp` for every intermediate value; the
/// optimizer is the only stage that ever turns a `Temp` into a `Const`.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
  Temp(u32),
  Var(Symbol),
  ConstInt(i64),
  ConstBool(bool),
  ConstStr(String),
}

impl fmt::Display for Operand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Temp(n) => write!(f, "t{n}"),
      Self::Var(s) => write!(f, "{s}"),
      Self::ConstInt(n) => write!(f, "{n}"),
      Self::ConstBool(b) => write!(f, "{b}"),
      Self::ConstStr(s) => write!(f, "{s:?}"),
    }
  }
}

/// One three-address-code instruction. Every instruction that produces a
/// value names its destination as the first field.
#[derive(Debug, Clone)]
pub enum Tac {
  /// `dst = src`. `is_decl` distinguishes a fresh declaration (`DECL` in
  /// spec terms, emits a typed C declaration) from a reassignment (`ASSIGN`,
  /// emits a bare `id = val;` into the already-declared C local).
  Copy { dst: Operand, src: Operand, ty: Ty, is_decl: bool },
  BinOp { dst: Operand, op: BinOp, lhs: Operand, rhs: Operand, ty: Ty },
  UnaryOp { dst: Operand, op: UnaryOp, src: Operand, ty: Ty },
  /// `dst = name(args...)`.
  Call { dst: Operand, name: Symbol, args: OperandList, ty: Ty },
  /// `dst = [elems...]`, a fresh array literal.
  MakeArray { dst: Operand, elems: OperandList, elem_ty: Ty },
  /// `dst = array[index]`. Carries a [`Coord`] (unlike every other `Tac`
  /// variant) because a constant index can be provably invalid, which the
  /// optimizer reports as a [`crate::error::CompileError`] rather than
  /// silently folding.
  Index { dst: Operand, array: Operand, index: Operand, ty: Ty, coord: Coord },
}

impl Tac {
  #[must_use] pub fn dst(&self) -> &Operand {
    match self {
      Self::Copy { dst, .. }
      | Self::BinOp { dst, .. }
      | Self::UnaryOp { dst, .. }
      | Self::Call { dst, .. }
      | Self::MakeArray { dst, .. }
      | Self::Index { dst, .. } => dst,
    }
  }
}

/// Structured markers bracketing the regions a pure TAC stream can't
/// express on its own: function bodies, conditionals, loops, and the two
/// statements (`print`, `return`) that are control-flow-adjacent but not
/// value-producing.
#[derive(Debug, Clone)]
pub enum IrControl {
  Func { name: Symbol, params: Vec<(Symbol, Ty)>, ret: Ty },
  EndFunc,
  If { cond: Operand },
  Else,
  EndIf,
  /// Marks the top of a loop, before the condition is (re-)evaluated —
  /// the TAC instructions computing `cond` for the next iteration sit
  /// between this marker and the paired `While`.
  BeginLoopCond,
  While { cond: Operand },
  EndWhile,
  Print { args: Vec<(Operand, Ty)> },
  Ret { value: Option<Operand> },
}

/// One entry in the flat IR stream.
#[derive(Debug, Clone)]
pub enum Ir {
  Tac(Tac),
  Control(IrControl),
}

impl From<Tac> for Ir {
  fn from(t: Tac) -> Self { Self::Tac(t) }
}

impl From<IrControl> for Ir {
  fn from(c: IrControl) -> Self { Self::Control(c) }
}
