//! Lowering a type-checked [`Program`] into the flat [`Ir`] stream.
//!
//! `IrGen` plays the same role as the teacher's `Translator` in
//! `build_mir.rs`: a struct owning a monotonic id counter and emitting
//! into an output buffer as it walks typed nodes, handing back a fresh
//! `Operand::Temp` for every subexpression instead of returning a value.
//! The counter resets per function, matching `SimplePythonIRGen.py`'s
//! `self.temp_count = 0` at the top of every `visit_MethodDecl`.

use tracing::instrument;

use crate::ast::{ConstKind, Expr, ExprKind, MethodDecl, Program, Stmt};
use crate::ir::{Ir, IrControl, Operand, Tac};
use crate::types::Ty;

pub struct IrGen {
  next_temp: u32,
  out: Vec<Ir>,
}

/// Lower an entire (already type-checked) program to its flat IR stream.
#[instrument(skip_all)]
#[must_use] pub fn generate(program: &Program) -> Vec<Ir> {
  let mut gen = IrGen { next_temp: 0, out: Vec::new() };
  for func in &program.func_decl {
    gen.lower_method(func);
  }
  gen.lower_method(&program.main_func);
  gen.out
}

impl IrGen {
  fn fresh_temp(&mut self) -> Operand {
    let t = Operand::Temp(self.next_temp);
    self.next_temp += 1;
    t
  }

  fn emit(&mut self, ir: impl Into<Ir>) { self.out.push(ir.into()); }

  fn lower_method(&mut self, method: &MethodDecl) {
    self.next_temp = 0;
    let params = method.params.iter().map(|p| (p.name, p.ty.resolve())).collect();
    self.emit(IrControl::Func { name: method.name, params, ret: method.ret_type.resolve() });
    for stmt in &method.body {
      self.lower_stmt(stmt);
    }
    self.emit(IrControl::EndFunc);
  }

  fn lower_stmt(&mut self, stmt: &Stmt) {
    match stmt {
      Stmt::Assign { name, expr, is_decl, .. } => {
        let src = self.lower_expr(expr);
        let is_decl = is_decl.get().expect("typeck sets is_decl on every AssignStmt");
        self.emit(Tac::Copy { dst: Operand::Var(*name), src, ty: expr.ty(), is_decl });
      }
      Stmt::Expr { expr, .. } => {
        // Evaluated for side effects only (a bare call); the result temp is
        // left unused downstream.
        self.lower_expr(expr);
      }
      Stmt::Print { args, .. } => {
        let args = args.iter().map(|a| (self.lower_expr(a), a.ty())).collect();
        self.emit(IrControl::Print { args });
      }
      Stmt::Ret { expr, .. } => {
        let value = self.lower_expr(expr);
        self.emit(IrControl::Ret { value: Some(value) });
      }
      Stmt::If { cond, true_body, false_body, .. } => {
        let cond = self.lower_expr(cond);
        self.emit(IrControl::If { cond });
        for s in true_body { self.lower_stmt(s); }
        if let Some(false_body) = false_body {
          self.emit(IrControl::Else);
          for s in false_body { self.lower_stmt(s); }
        }
        self.emit(IrControl::EndIf);
      }
      Stmt::While { cond, body, .. } => {
        self.emit(IrControl::BeginLoopCond);
        let cond_op = self.lower_expr(cond);
        self.emit(IrControl::While { cond: cond_op });
        for s in body { self.lower_stmt(s); }
        self.emit(IrControl::EndWhile);
      }
    }
  }

  fn lower_expr(&mut self, expr: &Expr) -> Operand {
    match &expr.kind {
      ExprKind::Constant(ConstKind::Int(n)) => Operand::ConstInt(*n),
      ExprKind::Constant(ConstKind::Bool(b)) => Operand::ConstBool(*b),
      ExprKind::Constant(ConstKind::Str(s)) => Operand::ConstStr(s.clone()),
      ExprKind::Constant(ConstKind::Id(name)) => Operand::Var(*name),

      ExprKind::BinOp { op, left, right } => {
        let lhs = self.lower_expr(left);
        let rhs = self.lower_expr(right);
        let dst = self.fresh_temp();
        self.emit(Tac::BinOp { dst: dst.clone(), op: *op, lhs, rhs, ty: expr.ty() });
        dst
      }
      ExprKind::UnaryOp { op, expr: inner } => {
        let src = self.lower_expr(inner);
        let dst = self.fresh_temp();
        self.emit(Tac::UnaryOp { dst: dst.clone(), op: *op, src, ty: expr.ty() });
        dst
      }
      ExprKind::Call { name, args } => {
        let args = args.iter().map(|a| self.lower_expr(a)).collect();
        let dst = self.fresh_temp();
        self.emit(Tac::Call { dst: dst.clone(), name: *name, args, ty: expr.ty() });
        dst
      }
      ExprKind::Array { elems } => {
        let elems = elems.iter().map(|e| self.lower_expr(e)).collect();
        let elem_ty = if expr.ty().is_array() { expr.ty().element() } else { Ty::int() };
        let dst = self.fresh_temp();
        self.emit(Tac::MakeArray { dst: dst.clone(), elems, elem_ty });
        dst
      }
      ExprKind::Index { array, index } => {
        let array = self.lower_expr(array);
        let index = self.lower_expr(index);
        let dst = self.fresh_temp();
        self.emit(Tac::Index { dst: dst.clone(), array, index, ty: expr.ty(), coord: expr.coord });
        dst
      }
    }
  }
}
