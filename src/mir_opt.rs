//! Constant propagation and dead-branch elimination over the flat IR
//! stream, in a single forward pass.
//!
//! `SimplePythonOptimizer.py` folds constants by mutating a temp's
//! recorded value in place (reference identity lets every later read see
//! the fold). Rust's ownership makes that approach awkward, so this pass
//! keeps an explicit `temp -> constant` map instead — the Open Question
//! this resolves is recorded in DESIGN.md. Two nesting counters track
//! where in the stream we are: `unknown_depth` counts enclosing regions
//! whose exit condition isn't known at compile time (loops, and
//! non-constant `if`s), and `dead_depth` counts enclosing regions whose
//! *body* is unreachable because a constant condition already decided
//! against it. `should_eliminate` is true exactly when `dead_depth > 0`.
//!
//! Every `If` pushes one [`IfState`] onto `if_stack`; the matching
//! `Else`/`EndIf` pops or mutates it. This is the same
//! push-on-enter/pop-on-exit shape the teacher's `VCodeBuilder` uses in
//! `build_vcode.rs` to track block nesting.
//!
//! Variables, unlike temps, can be reassigned along different branches of
//! a runtime-conditional or inside a loop body, so constant/array
//! knowledge about a `Var` slot is conservatively dropped whenever control
//! flow merges back together (`Else`, `EndIf`, `EndWhile`) rather than
//! trusting whichever branch happened to run last in this single forward
//! pass. Temp slots need no such invalidation: `irgen` never reassigns a
//! temp once created.

use hashbrown::HashMap;
use tracing::instrument;

use crate::error::{CompileError, Result};
use crate::ir::{Ir, IrControl, Operand, Tac};
use crate::ops::{BinOp, UnaryOp};
use crate::symbol::Symbol;

/// A storage location a folded constant (or known array contents) can be
/// attached to.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
  Temp(u32),
  Var(Symbol),
}

fn slot_of(op: &Operand) -> Option<Slot> {
  match op {
    Operand::Temp(n) => Some(Slot::Temp(*n)),
    Operand::Var(s) => Some(Slot::Var(*s)),
    _ => None,
  }
}

/// What an `If` resolved to, remembered until its matching `EndIf` so
/// `Else`/`EndIf` know how to unwind `dead_depth`.
enum IfState {
  /// Nested entirely inside an already-dead region, which suppresses
  /// everything regardless of this `If`'s own condition.
  Suppressed,
  /// Condition wasn't constant; both branches are kept and `If`/`Else`/
  /// `EndIf` markers are re-emitted.
  Runtime,
  /// Condition was `true`: the `if`-branch is live. `else_seen` records
  /// whether an `Else` has been crossed yet, so `EndIf` knows whether it
  /// needs to undo the `dead_depth` bump `Else` applied for the dead
  /// `else`-branch.
  ConstTrue { else_seen: bool },
  /// Condition was `false`: the `if`-branch is dead from the start.
  ConstFalse { else_seen: bool },
}

struct Optimizer {
  /// Known compile-time values of temps and variables, as constant-folding
  /// has proven them so far on this linear pass.
  consts: HashMap<Slot, Operand>,
  /// Known contents of array literals assigned to a temp or variable, so a
  /// constant index into them can be folded (or proven out of bounds).
  arrays: HashMap<Slot, Vec<Operand>>,
  /// Enclosing regions (loops, non-constant `if`s) whose liveness can't be
  /// determined here, so nothing inside them can be assumed dead.
  unknown_depth: u32,
  /// Enclosing regions whose body is known-unreachable (the `if`/`else`
  /// branch not taken by a constant condition). Instructions are dropped
  /// while this is nonzero.
  dead_depth: u32,
  if_stack: Vec<IfState>,
}

/// Run constant propagation and dead-branch elimination over `ir`,
/// returning the optimized stream, or the first [`CompileError`] raised by
/// a provably-invalid constant array index. Idempotent on success: running
/// it again on its own output is a no-op (property covered by
/// `idempotent_on_own_output`).
#[instrument(skip_all)]
pub fn optimize(ir: &[Ir]) -> Result<Vec<Ir>> {
  let mut opt = Optimizer {
    consts: HashMap::new(),
    arrays: HashMap::new(),
    unknown_depth: 0,
    dead_depth: 0,
    if_stack: Vec::new(),
  };
  let mut out = Vec::with_capacity(ir.len());
  for item in ir {
    opt.step(item, &mut out)?;
  }
  Ok(out)
}

impl Optimizer {
  fn should_eliminate(&self) -> bool { self.dead_depth > 0 }

  fn resolve(&self, op: &Operand) -> Operand {
    if let Some(slot) = slot_of(op) {
      if let Some(c) = self.consts.get(&slot) { return c.clone() }
    }
    op.clone()
  }

  fn const_of(op: &Operand) -> Option<Operand> {
    matches!(op, Operand::ConstInt(_) | Operand::ConstBool(_) | Operand::ConstStr(_)).then(|| op.clone())
  }

  /// Drop all knowledge about variables (but not temps) gained so far —
  /// called whenever two branches of a runtime-decided region merge back
  /// together, since only one of them actually ran.
  fn clear_vars(&mut self) {
    self.consts.retain(|slot, _| matches!(slot, Slot::Temp(_)));
    self.arrays.retain(|slot, _| matches!(slot, Slot::Temp(_)));
  }

  fn step(&mut self, item: &Ir, out: &mut Vec<Ir>) -> Result<()> {
    match item {
      Ir::Tac(tac) => self.step_tac(tac, out),
      Ir::Control(ctrl) => { self.step_control(ctrl, out); Ok(()) }
    }
  }

  fn step_tac(&mut self, tac: &Tac, out: &mut Vec<Ir>) -> Result<()> {
    if self.should_eliminate() { return Ok(()) }

    match tac {
      Tac::BinOp { dst, op, lhs, rhs, ty } => {
        let lhs = self.resolve(lhs);
        let rhs = self.resolve(rhs);
        if let (Some(slot), Some(c)) = (slot_of(dst), fold_binop(*op, &lhs, &rhs)) {
          self.consts.insert(slot, c);
        } else if *op == BinOp::Add && ty.is_array() {
          // `fold_binop` only folds scalar operands; array concatenation's
          // known contents (if both sides are known arrays) are tracked
          // separately here so a later constant index into the result can
          // still fold.
          let known = slot_of(&lhs).and_then(|s| self.arrays.get(&s).cloned())
            .zip(slot_of(&rhs).and_then(|s| self.arrays.get(&s).cloned()));
          if let (Some(slot), Some((mut a, b))) = (slot_of(dst), known) {
            a.extend(b);
            self.arrays.insert(slot, a);
          }
        }
        out.push(Ir::Tac(Tac::BinOp { dst: dst.clone(), op: *op, lhs, rhs, ty: *ty }));
      }
      Tac::UnaryOp { dst, op, src, ty } => {
        let src = self.resolve(src);
        if let (Some(slot), Some(c)) = (slot_of(dst), fold_unaryop(*op, &src)) {
          self.consts.insert(slot, c);
        }
        out.push(Ir::Tac(Tac::UnaryOp { dst: dst.clone(), op: *op, src, ty: *ty }));
      }
      Tac::Copy { dst, src, ty, is_decl } => {
        let src = self.resolve(src);
        if let Some(dst_slot) = slot_of(dst) {
          match Self::const_of(&src) {
            Some(c) => { self.consts.insert(dst_slot, c); }
            None => { self.consts.remove(&dst_slot); }
          }
          match slot_of(&src).and_then(|s| self.arrays.get(&s).cloned()) {
            Some(elems) => { self.arrays.insert(dst_slot, elems); }
            None => { self.arrays.remove(&dst_slot); }
          }
        }
        out.push(Ir::Tac(Tac::Copy { dst: dst.clone(), src, ty: *ty, is_decl: *is_decl }));
      }
      Tac::Call { dst, name, args, ty } => {
        let args = args.iter().map(|a| self.resolve(a)).collect();
        out.push(Ir::Tac(Tac::Call { dst: dst.clone(), name: *name, args, ty: *ty }));
      }
      Tac::MakeArray { dst, elems, elem_ty } => {
        let elems: crate::ir::OperandList = elems.iter().map(|e| self.resolve(e)).collect();
        if let Some(slot) = slot_of(dst) {
          self.arrays.insert(slot, elems.iter().cloned().collect());
        }
        out.push(Ir::Tac(Tac::MakeArray { dst: dst.clone(), elems, elem_ty: *elem_ty }));
      }
      Tac::Index { dst, array, index, ty, coord } => {
        let array = self.resolve(array);
        let index = self.resolve(index);
        if let Operand::ConstInt(i) = index {
          if let Some(elems) = slot_of(&array).and_then(|s| self.arrays.get(&s)) {
            if i < 0 {
              return Err(CompileError::NegativeIndex(i, *coord));
            }
            let idx = usize::try_from(i).expect("already checked non-negative");
            if idx >= elems.len() {
              return Err(CompileError::OutOfBounds(i, elems.len(), *coord));
            }
            if let (Some(slot), Some(c)) = (slot_of(dst), Self::const_of(&elems[idx])) {
              self.consts.insert(slot, c);
            }
          }
        }
        out.push(Ir::Tac(Tac::Index { dst: dst.clone(), array, index, ty: *ty, coord: *coord }));
      }
    }
    Ok(())
  }

  fn step_control(&mut self, ctrl: &IrControl, out: &mut Vec<Ir>) {
    match ctrl {
      IrControl::Func { .. } => {
        // A fresh function body starts with no known constants (temp ids
        // are per-function and would otherwise collide with a prior
        // function's folded values).
        self.consts.clear();
        self.arrays.clear();
        out.push(Ir::Control(ctrl.clone()));
      }
      IrControl::EndFunc => out.push(Ir::Control(ctrl.clone())),

      IrControl::If { cond } => {
        if self.should_eliminate() {
          self.if_stack.push(IfState::Suppressed);
          return;
        }
        match self.resolve(cond) {
          Operand::ConstBool(true) => self.if_stack.push(IfState::ConstTrue { else_seen: false }),
          Operand::ConstBool(false) => {
            self.dead_depth += 1;
            self.if_stack.push(IfState::ConstFalse { else_seen: false });
          }
          cond => {
            self.unknown_depth += 1;
            self.if_stack.push(IfState::Runtime);
            out.push(Ir::Control(IrControl::If { cond }));
          }
        }
      }

      IrControl::Else => match self.if_stack.last_mut() {
        Some(IfState::Suppressed) => {}
        Some(IfState::Runtime) => {
          out.push(Ir::Control(IrControl::Else));
          self.clear_vars();
        }
        Some(state @ IfState::ConstTrue { .. }) => {
          self.dead_depth += 1;
          *state = IfState::ConstTrue { else_seen: true };
        }
        Some(state @ IfState::ConstFalse { .. }) => {
          self.dead_depth -= 1;
          *state = IfState::ConstFalse { else_seen: true };
        }
        None => unreachable!("Else with no matching If"),
      },

      IrControl::EndIf => match self.if_stack.pop() {
        Some(IfState::Suppressed) => {}
        Some(IfState::Runtime) => {
          self.unknown_depth -= 1;
          out.push(Ir::Control(IrControl::EndIf));
          self.clear_vars();
        }
        Some(IfState::ConstTrue { else_seen }) => { if else_seen { self.dead_depth -= 1; } }
        Some(IfState::ConstFalse { else_seen }) => { if !else_seen { self.dead_depth -= 1; } }
        None => unreachable!("EndIf with no matching If"),
      },

      // Each loop lowers to one `BeginLoopCond`/`While` pair, bracketing
      // the body, closed by a matching `EndWhile`.
      IrControl::BeginLoopCond => {
        if !self.should_eliminate() {
          self.unknown_depth += 1;
          out.push(Ir::Control(ctrl.clone()));
        }
      }
      IrControl::While { cond } => {
        if !self.should_eliminate() {
          let cond = self.resolve(cond);
          out.push(Ir::Control(IrControl::While { cond }));
        }
      }
      IrControl::EndWhile => {
        if !self.should_eliminate() {
          self.unknown_depth -= 1;
          out.push(Ir::Control(ctrl.clone()));
          self.clear_vars();
        }
      }

      IrControl::Print { args } => {
        if !self.should_eliminate() {
          let args = args.iter().map(|(a, ty)| (self.resolve(a), *ty)).collect();
          out.push(Ir::Control(IrControl::Print { args }));
        }
      }
      IrControl::Ret { value } => {
        if !self.should_eliminate() {
          let value = value.as_ref().map(|v| self.resolve(v));
          out.push(Ir::Control(IrControl::Ret { value }));
        }
      }
    }
  }
}

fn fold_binop(op: BinOp, lhs: &Operand, rhs: &Operand) -> Option<Operand> {
  match (lhs, rhs) {
    (Operand::ConstInt(a), Operand::ConstInt(b)) => {
      let (a, b) = (*a, *b);
      if op.is_int_arith() || op == BinOp::Add {
        let v = match op {
          BinOp::Add => a.checked_add(b)?,
          BinOp::Sub => a.checked_sub(b)?,
          BinOp::Mul => a.checked_mul(b)?,
          BinOp::Div if b != 0 => a.checked_div(b)?,
          BinOp::Mod if b != 0 => a.checked_rem(b)?,
          _ => return None,
        };
        return Some(Operand::ConstInt(v));
      }
      if op.is_int_comparison() || op.is_equality() {
        let v = match op {
          BinOp::Lt => a < b,
          BinOp::Le => a <= b,
          BinOp::Gt => a > b,
          BinOp::Ge => a >= b,
          BinOp::Eq => a == b,
          BinOp::Neq => a != b,
          _ => return None,
        };
        return Some(Operand::ConstBool(v));
      }
      None
    }
    (Operand::ConstBool(a), Operand::ConstBool(b)) if op.is_logical() => {
      let v = match op { BinOp::And => *a && *b, BinOp::Or => *a || *b, _ => return None };
      Some(Operand::ConstBool(v))
    }
    (Operand::ConstStr(a), Operand::ConstStr(b)) if op == BinOp::Add => {
      Some(Operand::ConstStr(format!("{a}{b}")))
    }
    _ => None,
  }
}

fn fold_unaryop(op: UnaryOp, src: &Operand) -> Option<Operand> {
  match (op, src) {
    (UnaryOp::Neg, Operand::ConstInt(n)) => n.checked_neg().map(Operand::ConstInt),
    (UnaryOp::Not, Operand::ConstBool(b)) => Some(Operand::ConstBool(!b)),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::coord::Coord;
  use crate::symbol::intern;
  use crate::types::Ty;

  fn folds_to_int(ir: &[Ir], expect: i64) {
    let dst = match ir.last() {
      Some(Ir::Control(IrControl::Ret { value: Some(v) })) => v.clone(),
      other => panic!("expected a Ret with a value, got {other:?}"),
    };
    assert_eq!(dst, Operand::ConstInt(expect));
  }

  #[test]
  fn folds_arithmetic_chain() {
    let ir = vec![
      Ir::Control(IrControl::Func { name: intern("main"), params: vec![], ret: Ty::int() }),
      Ir::Tac(Tac::BinOp { dst: Operand::Temp(0), op: BinOp::Add, lhs: Operand::ConstInt(2), rhs: Operand::ConstInt(3), ty: Ty::int() }),
      Ir::Tac(Tac::BinOp { dst: Operand::Temp(1), op: BinOp::Mul, lhs: Operand::Temp(0), rhs: Operand::ConstInt(10), ty: Ty::int() }),
      Ir::Control(IrControl::Ret { value: Some(Operand::Temp(1)) }),
      Ir::Control(IrControl::EndFunc),
    ];
    let out = optimize(&ir).unwrap();
    folds_to_int(&out, 50);
  }

  #[test]
  fn eliminates_the_dead_branch_of_a_constant_if() {
    let ir = vec![
      Ir::Control(IrControl::Func { name: intern("main"), params: vec![], ret: Ty::int() }),
      Ir::Control(IrControl::If { cond: Operand::ConstBool(false) }),
      Ir::Control(IrControl::Print { args: vec![(Operand::ConstInt(1), Ty::int())] }),
      Ir::Control(IrControl::Else),
      Ir::Control(IrControl::Print { args: vec![(Operand::ConstInt(2), Ty::int())] }),
      Ir::Control(IrControl::EndIf),
      Ir::Control(IrControl::Ret { value: Some(Operand::ConstInt(0)) }),
      Ir::Control(IrControl::EndFunc),
    ];
    let out = optimize(&ir).unwrap();
    let prints: Vec<_> = out.iter().filter_map(|i| match i {
      Ir::Control(IrControl::Print { args }) => Some(args.clone()),
      _ => None,
    }).collect();
    assert_eq!(prints, vec![vec![(Operand::ConstInt(2), Ty::int())]]);
    assert!(!out.iter().any(|i| matches!(i, Ir::Control(IrControl::If { .. } | IrControl::Else | IrControl::EndIf))));
  }

  #[test]
  fn nested_dead_branch_inside_a_live_if_is_also_dropped() {
    let ir = vec![
      Ir::Control(IrControl::Func { name: intern("main"), params: vec![], ret: Ty::int() }),
      Ir::Control(IrControl::If { cond: Operand::ConstBool(true) }),
      Ir::Control(IrControl::If { cond: Operand::ConstBool(false) }),
      Ir::Control(IrControl::Print { args: vec![(Operand::ConstInt(99), Ty::int())] }),
      Ir::Control(IrControl::EndIf),
      Ir::Control(IrControl::Print { args: vec![(Operand::ConstInt(1), Ty::int())] }),
      Ir::Control(IrControl::EndIf),
      Ir::Control(IrControl::Ret { value: Some(Operand::ConstInt(0)) }),
      Ir::Control(IrControl::EndFunc),
    ];
    let out = optimize(&ir).unwrap();
    let prints: Vec<_> = out.iter().filter_map(|i| match i {
      Ir::Control(IrControl::Print { args }) => Some(args.clone()),
      _ => None,
    }).collect();
    assert_eq!(prints, vec![vec![(Operand::ConstInt(1), Ty::int())]]);
  }

  #[test]
  fn non_constant_if_keeps_both_branches_and_markers() {
    let ir = vec![
      Ir::Control(IrControl::Func { name: intern("main"), params: vec![], ret: Ty::int() }),
      Ir::Control(IrControl::If { cond: Operand::Var(intern("flag")) }),
      Ir::Control(IrControl::Print { args: vec![(Operand::ConstInt(1), Ty::int())] }),
      Ir::Control(IrControl::Else),
      Ir::Control(IrControl::Print { args: vec![(Operand::ConstInt(2), Ty::int())] }),
      Ir::Control(IrControl::EndIf),
      Ir::Control(IrControl::Ret { value: Some(Operand::ConstInt(0)) }),
      Ir::Control(IrControl::EndFunc),
    ];
    let out = optimize(&ir).unwrap();
    let markers = out.iter().filter(|i| matches!(i, Ir::Control(IrControl::If { .. } | IrControl::Else | IrControl::EndIf))).count();
    assert_eq!(markers, 3);
  }

  #[test]
  fn a_runtime_if_does_not_leak_variable_constants_past_its_endif() {
    let x = intern("x");
    let ir = vec![
      Ir::Control(IrControl::Func { name: intern("main"), params: vec![], ret: Ty::int() }),
      Ir::Control(IrControl::If { cond: Operand::Var(intern("flag")) }),
      Ir::Tac(Tac::Copy { dst: Operand::Var(x), src: Operand::ConstInt(1), ty: Ty::int(), is_decl: false }),
      Ir::Control(IrControl::Else),
      Ir::Tac(Tac::Copy { dst: Operand::Var(x), src: Operand::ConstInt(2), ty: Ty::int(), is_decl: false }),
      Ir::Control(IrControl::EndIf),
      Ir::Control(IrControl::Ret { value: Some(Operand::Var(x)) }),
      Ir::Control(IrControl::EndFunc),
    ];
    let out = optimize(&ir).unwrap();
    // `x` is branch-dependent, so the final `Ret` must keep reading the
    // variable rather than folding to whichever branch ran last in this pass.
    assert!(matches!(out.last(), Some(Ir::Control(IrControl::Ret { value: Some(Operand::Var(_)) }))));
  }

  #[test]
  fn idempotent_on_own_output() {
    let ir = vec![
      Ir::Control(IrControl::Func { name: intern("main"), params: vec![], ret: Ty::int() }),
      Ir::Tac(Tac::BinOp { dst: Operand::Temp(0), op: BinOp::Add, lhs: Operand::ConstInt(1), rhs: Operand::ConstInt(1), ty: Ty::int() }),
      Ir::Control(IrControl::Ret { value: Some(Operand::Temp(0)) }),
      Ir::Control(IrControl::EndFunc),
    ];
    let once = optimize(&ir).unwrap();
    let twice = optimize(&once).unwrap();
    assert_eq!(format!("{once:?}"), format!("{twice:?}"));
  }

  #[test]
  fn division_by_zero_is_left_unfolded_for_the_emitter_to_surface_at_runtime() {
    let ir = vec![
      Ir::Control(IrControl::Func { name: intern("main"), params: vec![], ret: Ty::int() }),
      Ir::Tac(Tac::BinOp { dst: Operand::Temp(0), op: BinOp::Div, lhs: Operand::ConstInt(1), rhs: Operand::ConstInt(0), ty: Ty::int() }),
      Ir::Control(IrControl::Ret { value: Some(Operand::Temp(0)) }),
      Ir::Control(IrControl::EndFunc),
    ];
    let out = optimize(&ir).unwrap();
    assert!(matches!(&out[1], Ir::Tac(Tac::BinOp { .. })));
  }

  fn array_ir(index: Operand, coord: Coord) -> Vec<Ir> {
    let a = intern("a");
    vec![
      Ir::Control(IrControl::Func { name: intern("main"), params: vec![], ret: Ty::int() }),
      Ir::Tac(Tac::MakeArray {
        dst: Operand::Temp(0),
        elems: smallvec::smallvec![Operand::ConstInt(1), Operand::ConstInt(2), Operand::ConstInt(3)],
        elem_ty: Ty::int(),
      }),
      Ir::Tac(Tac::Copy { dst: Operand::Var(a), src: Operand::Temp(0), ty: Ty::array(crate::types::BaseTy::Int, 1), is_decl: true }),
      Ir::Tac(Tac::Index { dst: Operand::Temp(1), array: Operand::Var(a), index, ty: Ty::int(), coord }),
      Ir::Control(IrControl::Ret { value: Some(Operand::Temp(1)) }),
      Ir::Control(IrControl::EndFunc),
    ]
  }

  #[test]
  fn folds_a_constant_index_into_a_known_array_literal() {
    let ir = array_ir(Operand::ConstInt(1), Coord::synthetic());
    let out = optimize(&ir).unwrap();
    folds_to_int(&out, 2);
  }

  #[test]
  fn negative_constant_index_is_a_compile_error() {
    let ir = array_ir(Operand::ConstInt(-1), Coord::new(3, 5));
    let err = optimize(&ir).unwrap_err();
    assert!(matches!(err, CompileError::NegativeIndex(-1, c) if c == Coord::new(3, 5)));
  }

  #[test]
  fn out_of_range_constant_index_is_a_compile_error() {
    let ir = array_ir(Operand::ConstInt(5), Coord::synthetic());
    let err = optimize(&ir).unwrap_err();
    assert!(matches!(err, CompileError::OutOfBounds(5, 3, _)));
  }

  proptest::proptest! {
    /// A chain of `BinOp::Add`/`Sub`/`Mul` over small int constants, however
    /// long, should fold to a single `ConstInt` with no `Tac::BinOp` left in
    /// the output — constant folding has nothing left to learn once every
    /// leaf is already a constant.
    #[test]
    fn chains_of_constant_arithmetic_fully_fold(ops in proptest::collection::vec((0u8..3, -10i64..10), 1..8)) {
      let mut ir = vec![Ir::Control(IrControl::Func { name: intern("main"), params: vec![], ret: Ty::int() })];
      let mut acc = Operand::ConstInt(0);
      let mut next_temp = 0u32;
      for (op_tag, n) in ops {
        let op = match op_tag { 0 => BinOp::Add, 1 => BinOp::Sub, _ => BinOp::Mul };
        let dst = Operand::Temp(next_temp);
        next_temp += 1;
        ir.push(Ir::Tac(Tac::BinOp { dst: dst.clone(), op, lhs: acc, rhs: Operand::ConstInt(n), ty: Ty::int() }));
        acc = dst;
      }
      ir.push(Ir::Control(IrControl::Ret { value: Some(acc) }));
      ir.push(Ir::Control(IrControl::EndFunc));

      let out = optimize(&ir).unwrap();
      proptest::prop_assert!(!out.iter().any(|i| matches!(i, Ir::Tac(Tac::BinOp { .. }))));
      proptest::prop_assert!(matches!(out.last(), Some(Ir::Control(IrControl::Ret { value: Some(Operand::ConstInt(_)) }))));
    }
  }
}
