//! Recursive-descent parser over the token stream `lexer` produces.
//!
//! Shaped directly on `SimplePythonParser.py`'s grammar: one `parse_*`
//! method per production, binary-operator precedence handled as a
//! precedence-climbing chain (`parse_or` → `parse_and` → `parse_equality`
//! → `parse_comparison` → `parse_additive` → `parse_multiplicative` →
//! `parse_unary` → `parse_atom`) rather than a yacc precedence table,
//! since that's the idiomatic hand-written-recursive-descent shape. The
//! relative ordering of these tiers (and `MOD` sharing a tier with the
//! relational operators, not with `PLUS`/`MINUS`) is carried over from
//! the original grammar's own `precedence` declaration.

use std::cell::Cell;

use crate::ast::{ConstKind, Expr, ExprKind, Formal, MethodDecl, Program, Stmt, TypeNode};
use crate::coord::Coord;
use crate::error::{CompileError, Result};
use crate::frontend::lexer::{self, Token};
use crate::ops::{BinOp, UnaryOp};
use crate::symbol::{intern, Symbol};
use crate::types::BaseTy;

struct Parser {
  tokens: Vec<Token>,
  coords: Vec<Coord>,
  pos: usize,
}

/// Parse a complete source file into a [`Program`].
pub fn parse(src: &str) -> Result<Program> {
  let lexed = lexer::lex(src)?;
  let (tokens, coords) = lexed.into_iter().unzip();
  Parser { tokens, coords, pos: 0 }.parse_program()
}

impl Parser {
  fn peek(&self) -> &Token { &self.tokens[self.pos] }
  fn coord(&self) -> Coord { self.coords[self.pos] }

  fn bump(&mut self) -> Token {
    let tok = self.tokens[self.pos].clone();
    if self.pos + 1 < self.tokens.len() { self.pos += 1; }
    tok
  }

  fn expect(&mut self, want: &Token) -> Result<()> {
    if self.peek() == want { self.bump(); Ok(()) }
    else { Err(CompileError::SyntaxError(self.coord(), format!("expected {want:?}, found {:?}", self.peek()))) }
  }

  fn expect_ident(&mut self) -> Result<Symbol> {
    match self.bump() {
      Token::Ident(name) => Ok(intern(&name)),
      other => Err(CompileError::SyntaxError(self.coord(), format!("expected an identifier, found {other:?}"))),
    }
  }

  fn parse_program(&mut self) -> Result<Program> {
    let mut func_decl = Vec::new();
    while self.peek() == &Token::KwDef && self.tokens.get(self.pos + 1) != Some(&Token::KwMain) {
      func_decl.push(self.parse_func_decl()?);
    }
    let main_func = self.parse_main_func_decl()?;
    Ok(Program { main_func, func_decl })
  }

  fn parse_main_func_decl(&mut self) -> Result<MethodDecl> {
    let coord = self.coord();
    self.expect(&Token::KwDef)?;
    self.expect(&Token::KwMain)?;
    self.expect(&Token::LParen)?;
    self.expect(&Token::RParen)?;
    self.expect(&Token::Arrow)?;
    self.expect(&Token::KwInt)?;
    self.expect(&Token::Colon)?;
    self.expect(&Token::Newline)?;
    let body = self.parse_block()?;
    Ok(MethodDecl { name: intern("main"), ret_type: TypeNode { base: BaseTy::Int, arr_depth: 0, coord }, params: vec![], body, coord })
  }

  fn parse_func_decl(&mut self) -> Result<MethodDecl> {
    let coord = self.coord();
    self.expect(&Token::KwDef)?;
    let name = self.expect_ident()?;
    self.expect(&Token::LParen)?;
    let params = self.parse_formals()?;
    self.expect(&Token::RParen)?;
    self.expect(&Token::Arrow)?;
    let ret_type = self.parse_type()?;
    self.expect(&Token::Colon)?;
    self.expect(&Token::Newline)?;
    let body = self.parse_block()?;
    Ok(MethodDecl { name, ret_type, params, body, coord })
  }

  fn parse_formals(&mut self) -> Result<Vec<Formal>> {
    if self.peek() == &Token::RParen { return Ok(vec![]) }
    let mut formals = vec![self.parse_formal()?];
    while self.peek() == &Token::Comma {
      self.bump();
      formals.push(self.parse_formal()?);
    }
    Ok(formals)
  }

  fn parse_formal(&mut self) -> Result<Formal> {
    let coord = self.coord();
    let name = self.expect_ident()?;
    self.expect(&Token::Colon)?;
    let ty = self.parse_type()?;
    Ok(Formal { name, ty, coord })
  }

  fn parse_type(&mut self) -> Result<TypeNode> {
    let coord = self.coord();
    let base = match self.bump() {
      Token::KwInt => BaseTy::Int,
      Token::KwBool => BaseTy::Bool,
      Token::KwStr => BaseTy::Str,
      other => return Err(CompileError::SyntaxError(coord, format!("expected a type, found {other:?}"))),
    };
    Ok(TypeNode { base, arr_depth: 0, coord })
  }

  fn parse_block(&mut self) -> Result<Vec<Stmt>> {
    self.expect(&Token::Indent)?;
    let mut stmts = Vec::new();
    while self.peek() != &Token::Dedent {
      stmts.push(self.parse_statement()?);
    }
    self.expect(&Token::Dedent)?;
    Ok(stmts)
  }

  fn parse_statement(&mut self) -> Result<Stmt> {
    match self.peek() {
      Token::KwIf => self.parse_if(),
      Token::KwWhile => self.parse_while(),
      Token::KwPrint => self.parse_print(),
      Token::KwReturn => self.parse_return(),
      _ => self.parse_simple_statement(),
    }
  }

  fn parse_simple_statement(&mut self) -> Result<Stmt> {
    let coord = self.coord();
    // Only `ID = expr` is an assignment; any other leading token starts a
    // bare expression statement (matching `p_expr_statement`).
    if let Token::Ident(name) = self.peek().clone() {
      if self.tokens.get(self.pos + 1) == Some(&Token::Assign) {
        self.bump();
        self.bump();
        let expr = self.parse_expr()?;
        self.expect(&Token::Newline)?;
        return Ok(Stmt::Assign { name: intern(&name), expr, coord, is_decl: Cell::new(None) });
      }
    }
    let expr = self.parse_expr()?;
    self.expect(&Token::Newline)?;
    Ok(Stmt::Expr { expr, coord })
  }

  fn parse_if(&mut self) -> Result<Stmt> {
    let coord = self.coord();
    self.expect(&Token::KwIf)?;
    let cond = self.parse_expr()?;
    self.expect(&Token::Colon)?;
    self.expect(&Token::Newline)?;
    let true_body = self.parse_block()?;
    let false_body = if self.peek() == &Token::KwElse {
      self.bump();
      self.expect(&Token::Colon)?;
      self.expect(&Token::Newline)?;
      Some(self.parse_block()?)
    } else {
      None
    };
    Ok(Stmt::If { cond, true_body, false_body, coord })
  }

  fn parse_while(&mut self) -> Result<Stmt> {
    let coord = self.coord();
    self.expect(&Token::KwWhile)?;
    let cond = self.parse_expr()?;
    self.expect(&Token::Colon)?;
    self.expect(&Token::Newline)?;
    let body = self.parse_block()?;
    Ok(Stmt::While { cond, body, coord })
  }

  fn parse_print(&mut self) -> Result<Stmt> {
    let coord = self.coord();
    self.expect(&Token::KwPrint)?;
    self.expect(&Token::LParen)?;
    let args = self.parse_args_list()?;
    self.expect(&Token::RParen)?;
    self.expect(&Token::Newline)?;
    Ok(Stmt::Print { args, coord })
  }

  fn parse_return(&mut self) -> Result<Stmt> {
    let coord = self.coord();
    self.expect(&Token::KwReturn)?;
    let expr = self.parse_expr()?;
    self.expect(&Token::Newline)?;
    Ok(Stmt::Ret { expr, coord })
  }

  fn parse_args_list(&mut self) -> Result<Vec<Expr>> {
    if self.peek() == &Token::RParen { return Ok(vec![]) }
    let mut args = vec![self.parse_expr()?];
    while self.peek() == &Token::Comma {
      self.bump();
      args.push(self.parse_expr()?);
    }
    Ok(args)
  }

  // expr : expr OR expr   (lowest precedence; not in the original grammar's
  // own `precedence` table, which omits OR entirely — treated here as
  // binding looser than AND, the natural reading of the omission)
  fn parse_expr(&mut self) -> Result<Expr> { self.parse_or() }

  fn parse_or(&mut self) -> Result<Expr> {
    let mut lhs = self.parse_and()?;
    while self.peek() == &Token::KwOr {
      let coord = self.coord();
      self.bump();
      let rhs = self.parse_and()?;
      lhs = Expr::new(ExprKind::BinOp { op: BinOp::Or, left: Box::new(lhs), right: Box::new(rhs) }, coord);
    }
    Ok(lhs)
  }

  fn parse_and(&mut self) -> Result<Expr> {
    let mut lhs = self.parse_equality()?;
    while self.peek() == &Token::KwAnd {
      let coord = self.coord();
      self.bump();
      let rhs = self.parse_equality()?;
      lhs = Expr::new(ExprKind::BinOp { op: BinOp::And, left: Box::new(lhs), right: Box::new(rhs) }, coord);
    }
    Ok(lhs)
  }

  fn parse_equality(&mut self) -> Result<Expr> {
    let mut lhs = self.parse_comparison()?;
    loop {
      let op = match self.peek() { Token::EqEq => BinOp::Eq, Token::NotEq => BinOp::Neq, _ => break };
      let coord = self.coord();
      self.bump();
      let rhs = self.parse_comparison()?;
      lhs = Expr::new(ExprKind::BinOp { op, left: Box::new(lhs), right: Box::new(rhs) }, coord);
    }
    Ok(lhs)
  }

  // Relational operators share a precedence tier with MOD, per the
  // original grammar's `precedence` table.
  fn parse_comparison(&mut self) -> Result<Expr> {
    let mut lhs = self.parse_additive()?;
    loop {
      let op = match self.peek() {
        Token::Less => BinOp::Lt,
        Token::LessEq => BinOp::Le,
        Token::Greater => BinOp::Gt,
        Token::GreaterEq => BinOp::Ge,
        Token::Percent => BinOp::Mod,
        _ => break,
      };
      let coord = self.coord();
      self.bump();
      let rhs = self.parse_additive()?;
      lhs = Expr::new(ExprKind::BinOp { op, left: Box::new(lhs), right: Box::new(rhs) }, coord);
    }
    Ok(lhs)
  }

  fn parse_additive(&mut self) -> Result<Expr> {
    let mut lhs = self.parse_multiplicative()?;
    loop {
      let op = match self.peek() { Token::Plus => BinOp::Add, Token::Minus => BinOp::Sub, _ => break };
      let coord = self.coord();
      self.bump();
      let rhs = self.parse_multiplicative()?;
      lhs = Expr::new(ExprKind::BinOp { op, left: Box::new(lhs), right: Box::new(rhs) }, coord);
    }
    Ok(lhs)
  }

  fn parse_multiplicative(&mut self) -> Result<Expr> {
    let mut lhs = self.parse_unary()?;
    loop {
      let op = match self.peek() { Token::Star => BinOp::Mul, Token::Slash => BinOp::Div, _ => break };
      let coord = self.coord();
      self.bump();
      let rhs = self.parse_unary()?;
      lhs = Expr::new(ExprKind::BinOp { op, left: Box::new(lhs), right: Box::new(rhs) }, coord);
    }
    Ok(lhs)
  }

  fn parse_unary(&mut self) -> Result<Expr> {
    let coord = self.coord();
    match self.peek() {
      Token::Minus => { self.bump(); let e = self.parse_unary()?; Ok(Expr::new(ExprKind::UnaryOp { op: UnaryOp::Neg, expr: Box::new(e) }, coord)) }
      Token::KwNot => { self.bump(); let e = self.parse_unary()?; Ok(Expr::new(ExprKind::UnaryOp { op: UnaryOp::Not, expr: Box::new(e) }, coord)) }
      _ => self.parse_atom(),
    }
  }

  fn parse_atom(&mut self) -> Result<Expr> {
    let coord = self.coord();
    match self.peek().clone() {
      Token::Int(n) => { self.bump(); Ok(Expr::new(ExprKind::Constant(ConstKind::Int(n)), coord)) }
      Token::Str(s) => { self.bump(); Ok(Expr::new(ExprKind::Constant(ConstKind::Str(s)), coord)) }
      Token::KwTrue => { self.bump(); Ok(Expr::new(ExprKind::Constant(ConstKind::Bool(true)), coord)) }
      Token::KwFalse => { self.bump(); Ok(Expr::new(ExprKind::Constant(ConstKind::Bool(false)), coord)) }
      Token::LBrack => self.parse_array(),
      Token::LParen => { self.bump(); let e = self.parse_expr()?; self.expect(&Token::RParen)?; Ok(e) }
      Token::Ident(name) => self.parse_ident_led(name, coord),
      other => Err(CompileError::SyntaxError(coord, format!("unexpected token {other:?}"))),
    }
  }

  /// An identifier can start a bare variable reference, a function call
  /// (`name(args)`), or an array index (`name[expr]`).
  fn parse_ident_led(&mut self, name: String, coord: Coord) -> Result<Expr> {
    self.bump();
    match self.peek() {
      Token::LParen => {
        self.bump();
        let args = self.parse_args_list()?;
        self.expect(&Token::RParen)?;
        Ok(Expr::new(ExprKind::Call { name: intern(&name), args }, coord))
      }
      Token::LBrack => {
        self.bump();
        let index = self.parse_expr()?;
        self.expect(&Token::RBrack)?;
        let array = Expr::new(ExprKind::Constant(ConstKind::Id(intern(&name))), coord);
        Ok(Expr::new(ExprKind::Index { array: Box::new(array), index: Box::new(index) }, coord))
      }
      _ => Ok(Expr::new(ExprKind::Constant(ConstKind::Id(intern(&name))), coord)),
    }
  }

  fn parse_array(&mut self) -> Result<Expr> {
    let coord = self.coord();
    self.expect(&Token::LBrack)?;
    let elems = if self.peek() == &Token::RBrack { vec![] } else { self.parse_args_list()? };
    self.expect(&Token::RBrack)?;
    Ok(Expr::new(ExprKind::Array { elems }, coord))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_minimal_main() {
    let program = parse("def main() -> int:\n    return 0\n").unwrap();
    assert_eq!(program.main_func.body.len(), 1);
    assert!(program.func_decl.is_empty());
  }

  #[test]
  fn parses_a_user_function_before_main() {
    let src = "def add(a: int, b: int) -> int:\n    return a + b\n\ndef main() -> int:\n    print(add(1, 2))\n    return 0\n";
    let program = parse(src).unwrap();
    assert_eq!(program.func_decl.len(), 1);
    assert_eq!(program.func_decl[0].params.len(), 2);
  }

  #[test]
  fn parses_if_else_and_while() {
    let src = "def main() -> int:\n    if True:\n        x = 1\n    else:\n        x = 2\n    while x:\n        x = 0\n    return 0\n";
    let program = parse(src).unwrap();
    assert_eq!(program.main_func.body.len(), 3);
    assert!(matches!(program.main_func.body[0], Stmt::If { false_body: Some(_), .. }));
    assert!(matches!(program.main_func.body[1], Stmt::While { .. }));
  }

  #[test]
  fn mod_binds_with_comparisons_not_additive() {
    // `1 + 2 % 3` should parse as `1 + (2 % 3)`: MOD shares a tier with
    // the relational operators, which is looser than PLUS/MINUS, so MOD
    // binds its operands *before* being combined with the `+`.
    let src = "def main() -> int:\n    return 1 + 2 % 3\n";
    let program = parse(src).unwrap();
    let Stmt::Ret { expr, .. } = &program.main_func.body[0] else { unreachable!() };
    let ExprKind::BinOp { op: BinOp::Add, right, .. } = &expr.kind else { panic!("expected a top-level +") };
    assert!(matches!(right.kind, ExprKind::BinOp { op: BinOp::Mod, .. }));
  }

  #[test]
  fn array_literal_and_indexing_round_trip() {
    let src = "def main() -> int:\n    xs = [1, 2, 3]\n    return xs[0]\n";
    let program = parse(src).unwrap();
    assert!(matches!(&program.main_func.body[0], Stmt::Assign { .. }));
    let Stmt::Ret { expr, .. } = &program.main_func.body[1] else { unreachable!() };
    assert!(matches!(expr.kind, ExprKind::Index { .. }));
  }

  #[test]
  fn rejects_a_function_body_missing_indentation() {
    let err = parse("def main() -> int:\nreturn 0\n").unwrap_err();
    assert!(matches!(err, CompileError::SyntaxError(..)));
  }
}
