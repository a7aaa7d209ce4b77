//! Type checking: an exhaustive, node-kind-dispatched traversal that
//! mutates every [`Expr`]'s type slot and every [`Stmt::Assign`]'s
//! `is_decl` slot in place, rejecting the program on the first ill-typed
//! construct found.
//!
//! Dispatch-by-node-kind here is the same idiom the teacher's
//! `Translate`/`TranslateBase` traits use in `build_mir.rs` to walk typed
//! HIR — one method per node kind, no fallback arm, so an unhandled kind
//! is a compile-time (Rust) error rather than the Python original's
//! `generic_typecheck` string-concatenation fallback.

use if_chain::if_chain;
use tracing::instrument;

use crate::ast::{ConstKind, Expr, ExprKind, MethodDecl, Program, Stmt};
use crate::error::{CompileError, Result};
use crate::ops::{BinOp, UnaryOp};
use crate::symbol::Symbol;
use crate::symtab::{FuncSig, SymbolTable};
use crate::types::{BaseTy, Ty};

struct TypeChecker {
  /// The function whose body is currently being checked, so `RetStmt` can
  /// look its declared return type back up.
  current_func: Option<Symbol>,
}

/// Type-check an entire program. Mutates every node's type slot in place;
/// returns the first type error encountered, in AST visitation order.
#[instrument(skip_all)]
pub fn check_program(program: &Program) -> Result<()> {
  let mut checker = TypeChecker { current_func: None };
  let mut st = SymbolTable::new();
  for func in &program.func_decl {
    checker.check_method(func, &mut st)?;
  }
  checker.check_method(&program.main_func, &mut st)?;
  Ok(())
}

impl TypeChecker {
  fn check_method(&mut self, method: &MethodDecl, st: &mut SymbolTable) -> Result<()> {
    let params = method.params.iter().map(|p| p.ty.resolve()).collect();
    let ret = method.ret_type.resolve();
    st.declare_func(method.name, FuncSig { params, ret }, method.coord)?;

    self.current_func = Some(method.name);
    st.push_scope();
    for param in &method.params {
      st.declare_variable(param.name, param.ty.resolve(), param.coord)?;
    }
    self.check_block(&method.body, st)?;
    st.pop_scope();
    Ok(())
  }

  /// A statement block pushes and pops its own scope — matching
  /// `check_StmtList`'s behavior for every occurrence of a block (function
  /// bodies additionally get a parameter scope around this one, per
  /// `check_method` above, exactly as the original's comment about
  /// "ending up creating two scopes" describes).
  fn check_block(&mut self, stmts: &[Stmt], st: &mut SymbolTable) -> Result<()> {
    st.push_scope();
    for stmt in stmts {
      self.check_stmt(stmt, st)?;
    }
    st.pop_scope();
    Ok(())
  }

  fn check_stmt(&mut self, stmt: &Stmt, st: &mut SymbolTable) -> Result<()> {
    match stmt {
      Stmt::Assign { name, expr, coord, is_decl } => {
        let expr_ty = self.check_expr(expr, st)?;
        match st.lookup_variable(*name) {
          None => {
            st.declare_variable(*name, expr_ty, *coord)?;
            is_decl.set(Some(true));
          }
          Some(existing) if existing == expr_ty => is_decl.set(Some(false)),
          Some(existing) => return Err(CompileError::TypeMismatch(existing, expr_ty, *coord)),
        }
        Ok(())
      }
      Stmt::Expr { expr, .. } => { self.check_expr(expr, st)?; Ok(()) }
      Stmt::Print { args, .. } => {
        for arg in args { self.check_expr(arg, st)?; }
        Ok(())
      }
      Stmt::Ret { expr, coord } => {
        let expr_ty = self.check_expr(expr, st)?;
        let func = self.current_func.expect("RetStmt outside of a function body");
        let sig = st.lookup_func(func, *coord)?;
        if expr_ty != sig.ret { return Err(CompileError::TypeMismatch(sig.ret, expr_ty, *coord)) }
        Ok(())
      }
      Stmt::If { cond, true_body, false_body, coord } => {
        let cond_ty = self.check_expr(cond, st)?;
        if cond_ty != Ty::boolean() { return Err(CompileError::TypeMismatch(Ty::boolean(), cond_ty, *coord)) }
        self.check_block(true_body, st)?;
        if let Some(false_body) = false_body { self.check_block(false_body, st)?; }
        Ok(())
      }
      Stmt::While { cond, body, coord } => {
        let cond_ty = self.check_expr(cond, st)?;
        if cond_ty != Ty::boolean() { return Err(CompileError::TypeMismatch(Ty::boolean(), cond_ty, *coord)) }
        self.check_block(body, st)?;
        Ok(())
      }
    }
  }

  fn check_expr(&mut self, expr: &Expr, st: &mut SymbolTable) -> Result<Ty> {
    let ty = match &expr.kind {
      ExprKind::Constant(c) => self.check_constant(c, expr.coord, st)?,
      ExprKind::BinOp { op, left, right } => self.check_binop(*op, left, right, expr.coord, st)?,
      ExprKind::UnaryOp { op, expr: inner } => self.check_unaryop(*op, inner, expr.coord, st)?,
      ExprKind::Call { name, args } => self.check_call(*name, args, expr.coord, st)?,
      ExprKind::Array { elems } => self.check_array(elems, expr.coord, st)?,
      ExprKind::Index { array, index } => self.check_index(array, index, expr.coord, st)?,
    };
    expr.ty.set(Some(ty));
    Ok(ty)
  }

  fn check_constant(&mut self, c: &ConstKind, coord: crate::coord::Coord, st: &SymbolTable) -> Result<Ty> {
    match c {
      ConstKind::Int(_) => Ok(Ty::int()),
      ConstKind::Bool(_) => Ok(Ty::boolean()),
      ConstKind::Str(_) => Ok(Ty::str()),
      ConstKind::Id(name) => st.lookup_variable(*name).ok_or(CompileError::UndefinedVariable(*name, coord)),
    }
  }

  fn check_binop(&mut self, op: BinOp, left: &Expr, right: &Expr, coord: crate::coord::Coord, st: &mut SymbolTable) -> Result<Ty> {
    let lt = self.check_expr(left, st)?;
    let rt = self.check_expr(right, st)?;

    if lt != rt {
      if_chain! {
        if op == BinOp::Add;
        if lt.base == rt.base;
        if lt.is_array() || rt.is_array();
        then { return Err(CompileError::ArrayDepthMismatch(lt, rt, coord)) }
      }
      return Err(CompileError::TypeMismatch(lt, rt, coord));
    }

    if op.is_int_arith() {
      if lt != Ty::int() { return Err(CompileError::TypeMismatch(Ty::int(), lt, coord)) }
      return Ok(Ty::int());
    }
    if op == BinOp::Add {
      if lt.is_array() { return Ok(lt) }
      if lt == Ty::int() { return Ok(Ty::int()) }
      if lt == Ty::str() { return Ok(Ty::str()) }
      return Err(CompileError::TypeMismatch(Ty::int(), lt, coord));
    }
    if op.is_int_comparison() || op.is_equality() {
      if lt != Ty::int() { return Err(CompileError::TypeMismatch(Ty::int(), lt, coord)) }
      return Ok(Ty::boolean());
    }
    if op.is_logical() {
      if lt != Ty::boolean() { return Err(CompileError::TypeMismatch(Ty::boolean(), lt, coord)) }
      return Ok(Ty::boolean());
    }
    unreachable!("BinOp dispatch covers every BinOp variant")
  }

  fn check_unaryop(&mut self, op: UnaryOp, inner: &Expr, coord: crate::coord::Coord, st: &mut SymbolTable) -> Result<Ty> {
    let ty = self.check_expr(inner, st)?;
    match op {
      UnaryOp::Neg if ty == Ty::int() => Ok(Ty::int()),
      UnaryOp::Neg => Err(CompileError::TypeMismatch(Ty::int(), ty, coord)),
      UnaryOp::Not if ty == Ty::boolean() => Ok(Ty::boolean()),
      UnaryOp::Not => Err(CompileError::TypeMismatch(Ty::boolean(), ty, coord)),
    }
  }

  fn check_call(&mut self, name: Symbol, args: &[Expr], coord: crate::coord::Coord, st: &mut SymbolTable) -> Result<Ty> {
    let sig = st.lookup_func(name, coord)?.clone();
    if args.len() != sig.params.len() { return Err(CompileError::ArityMismatch(name, args.len(), coord)) }
    for (arg, param_ty) in args.iter().zip(&sig.params) {
      let arg_ty = self.check_expr(arg, st)?;
      if arg_ty != *param_ty { return Err(CompileError::TypeMismatch(*param_ty, arg_ty, coord)) }
    }
    Ok(sig.ret)
  }

  fn check_array(&mut self, elems: &[Expr], coord: crate::coord::Coord, st: &mut SymbolTable) -> Result<Ty> {
    let Some((first, rest)) = elems.split_first() else { return Ok(Ty::array(BaseTy::Int, 1)) };
    let elem_ty = self.check_expr(first, st)?;
    for elem in rest {
      let ty = self.check_expr(elem, st)?;
      if ty != elem_ty { return Err(CompileError::TypeMismatch(elem_ty, ty, coord)) }
    }
    Ok(elem_ty.wrap_array())
  }

  fn check_index(&mut self, array: &Expr, index: &Expr, coord: crate::coord::Coord, st: &mut SymbolTable) -> Result<Ty> {
    let arr_ty = self.check_expr(array, st)?;
    let idx_ty = self.check_expr(index, st)?;
    if !arr_ty.is_array() { return Err(CompileError::NotAnArray(describe(array), coord)) }
    if idx_ty != Ty::int() { return Err(CompileError::NonIntegerIndex(idx_ty, coord)) }
    Ok(arr_ty.element())
  }
}

fn describe(expr: &Expr) -> String {
  match &expr.kind {
    ExprKind::Constant(ConstKind::Id(name)) => name.to_string(),
    _ => format!("{:?}", expr.kind),
  }
}
