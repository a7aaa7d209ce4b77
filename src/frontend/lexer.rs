//! Hand-written lexer. Indentation is significant (4 spaces per level, as
//! in `SimplePythonLexer.py`'s `t_INDENTATION` rule): the lexer tracks a
//! stack of open indentation widths and synthesizes `Indent`/`Dedent`
//! tokens the same way Python's own tokenizer does, rather than leaving
//! that to the grammar.

use arrayvec::ArrayVec;

use crate::coord::Coord;
use crate::error::{CompileError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
  Int(i64),
  Str(String),
  Ident(String),

  Plus, Minus, Star, Slash, Percent,
  Less, LessEq, Greater, GreaterEq, EqEq, NotEq,
  Comma, Colon, Arrow, Assign,
  LParen, RParen, LBrack, RBrack,

  Indent, Dedent, Newline,

  KwInt, KwBool, KwStr, KwDef, KwMain, KwTrue, KwFalse,
  KwAnd, KwOr, KwNot, KwIf, KwElse, KwWhile, KwPrint, KwReturn,

  Eof,
}

fn keyword(word: &str) -> Option<Token> {
  Some(match word {
    "int" => Token::KwInt,
    "bool" => Token::KwBool,
    "str" => Token::KwStr,
    "def" => Token::KwDef,
    "main" => Token::KwMain,
    "True" => Token::KwTrue,
    "False" => Token::KwFalse,
    "and" => Token::KwAnd,
    "or" => Token::KwOr,
    "not" => Token::KwNot,
    "if" => Token::KwIf,
    "else" => Token::KwElse,
    "while" => Token::KwWhile,
    "print" => Token::KwPrint,
    "return" => Token::KwReturn,
    _ => return None,
  })
}

struct Lexer<'a> {
  src: &'a [u8],
  pos: usize,
  line: u32,
  col: u32,
  indent_stack: Vec<u32>,
  /// True at the start of a logical line, before any non-whitespace
  /// character has been seen — indentation is only measured here.
  at_line_start: bool,
  out: Vec<(Token, Coord)>,
}

/// Tokenize an entire source file, including trailing synthetic `Dedent`s
/// back to column zero and a final `Eof`.
pub fn lex(src: &str) -> Result<Vec<(Token, Coord)>> {
  let mut lexer = Lexer {
    src: src.as_bytes(),
    pos: 0,
    line: 1,
    col: 1,
    indent_stack: vec![0],
    at_line_start: true,
    out: Vec::new(),
  };
  lexer.run()?;
  Ok(lexer.out)
}

impl<'a> Lexer<'a> {
  fn coord(&self) -> Coord { Coord::new(self.line, self.col) }

  fn peek(&self) -> Option<u8> { self.src.get(self.pos).copied() }
  fn peek2(&self) -> ArrayVec<[u8; 2]> {
    let mut buf = ArrayVec::new();
    if let Some(c) = self.src.get(self.pos) { buf.push(*c); }
    if let Some(c) = self.src.get(self.pos + 1) { buf.push(*c); }
    buf
  }

  fn bump(&mut self) -> Option<u8> {
    let c = self.peek()?;
    self.pos += 1;
    if c == b'\n' { self.line += 1; self.col = 1; } else { self.col += 1; }
    Some(c)
  }

  fn push(&mut self, tok: Token, coord: Coord) { self.out.push((tok, coord)); }

  fn run(&mut self) -> Result<()> {
    loop {
      if self.at_line_start {
        self.handle_line_start()?;
        if self.pos >= self.src.len() { break }
      }
      match self.peek() {
        None => break,
        Some(b' ' | b'\t') => { self.bump(); }
        Some(b'\n') => {
          self.bump();
          self.push(Token::Newline, self.coord());
          self.at_line_start = true;
        }
        Some(c) if c.is_ascii_digit() => self.lex_number(),
        Some(b'\'' | b'"') => self.lex_string()?,
        Some(c) if c.is_ascii_alphabetic() || c == b'_' => self.lex_ident(),
        Some(_) => self.lex_operator()?,
      }
    }
    // Unwind any remaining indentation and terminate the stream.
    let coord = self.coord();
    while self.indent_stack.len() > 1 {
      self.indent_stack.pop();
      self.push(Token::Dedent, coord);
    }
    self.push(Token::Eof, coord);
    Ok(())
  }

  /// Measure leading whitespace on a fresh logical line and emit the
  /// matching `Indent`/`Dedent` run. Blank lines (all whitespace, or a
  /// line consisting only of a trailing newline) don't affect the
  /// indentation stack and produce no tokens at all.
  fn handle_line_start(&mut self) -> Result<()> {
    let coord = self.coord();
    let mut width = 0u32;
    loop {
      match self.peek() {
        Some(b' ') => { self.bump(); width += 1; }
        Some(b'\t') => { self.bump(); width += 1; }
        _ => break,
      }
    }
    match self.peek() {
      None | Some(b'\n') => { self.at_line_start = false; return Ok(()) }
      _ => {}
    }
    self.at_line_start = false;
    let top = *self.indent_stack.last().expect("indent stack is never empty");
    if width > top {
      self.indent_stack.push(width);
      self.push(Token::Indent, coord);
    } else if width < top {
      while *self.indent_stack.last().expect("indent stack is never empty") > width {
        self.indent_stack.pop();
        self.push(Token::Dedent, coord);
      }
      if *self.indent_stack.last().expect("indent stack is never empty") != width {
        return Err(CompileError::SyntaxError(coord, "inconsistent indentation".to_string()));
      }
    }
    Ok(())
  }

  fn lex_number(&mut self) {
    let coord = self.coord();
    let start = self.pos;
    while self.peek().is_some_and(|c| c.is_ascii_digit()) { self.bump(); }
    let text = std::str::from_utf8(&self.src[start..self.pos]).expect("digits are valid utf8");
    let n: i64 = text.parse().expect("digit-only text always parses");
    self.push(Token::Int(n), coord);
  }

  fn lex_ident(&mut self) {
    let coord = self.coord();
    let start = self.pos;
    while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_') { self.bump(); }
    let text = std::str::from_utf8(&self.src[start..self.pos]).expect("identifier text is valid utf8").to_string();
    let tok = keyword(&text).unwrap_or(Token::Ident(text));
    self.push(tok, coord);
  }

  fn lex_string(&mut self) -> Result<()> {
    let coord = self.coord();
    let quote = self.bump().expect("caller already peeked a quote");
    let mut s = String::new();
    loop {
      match self.bump() {
        None => return Err(CompileError::SyntaxError(coord, "unterminated string literal".to_string())),
        Some(c) if c == quote => break,
        Some(b'\\') => match self.bump() {
          Some(c) if c == quote => s.push(c as char),
          Some(c) => { s.push('\\'); s.push(c as char); }
          None => return Err(CompileError::SyntaxError(coord, "unterminated string literal".to_string())),
        },
        Some(c) => s.push(c as char),
      }
    }
    self.push(Token::Str(s), coord);
    Ok(())
  }

  fn lex_operator(&mut self) -> Result<()> {
    let coord = self.coord();
    let two = self.peek2();
    let tok = match two.as_slice() {
      [b'<', b'='] => { self.bump(); self.bump(); Token::LessEq }
      [b'>', b'='] => { self.bump(); self.bump(); Token::GreaterEq }
      [b'=', b'='] => { self.bump(); self.bump(); Token::EqEq }
      [b'!', b'='] => { self.bump(); self.bump(); Token::NotEq }
      [b'-', b'>'] => { self.bump(); self.bump(); Token::Arrow }
      _ => match self.bump().expect("caller already peeked a non-whitespace byte") {
        b'+' => Token::Plus,
        b'-' => Token::Minus,
        b'*' => Token::Star,
        b'/' => Token::Slash,
        b'%' => Token::Percent,
        b'<' => Token::Less,
        b'>' => Token::Greater,
        b'=' => Token::Assign,
        b',' => Token::Comma,
        b':' => Token::Colon,
        b'(' => Token::LParen,
        b')' => Token::RParen,
        b'[' => Token::LBrack,
        b']' => Token::RBrack,
        c => return Err(CompileError::SyntaxError(coord, format!("unexpected character '{}'", c as char))),
      },
    };
    self.push(tok, coord);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn kinds(src: &str) -> Vec<Token> {
    lex(src).unwrap().into_iter().map(|(t, _)| t).collect()
  }

  #[test]
  fn lexes_an_assignment_and_a_return() {
    let toks = kinds("x = 1\nreturn x\n");
    assert_eq!(toks, vec![
      Token::Ident("x".into()), Token::Assign, Token::Int(1), Token::Newline,
      Token::KwReturn, Token::Ident("x".into()), Token::Newline,
      Token::Eof,
    ]);
  }

  #[test]
  fn indent_and_dedent_are_tracked_by_leading_spaces() {
    let toks = kinds("def main() -> int:\n    return 0\n");
    assert_eq!(toks, vec![
      Token::KwDef, Token::KwMain, Token::LParen, Token::RParen, Token::Arrow, Token::KwInt, Token::Colon, Token::Newline,
      Token::Indent,
      Token::KwReturn, Token::Int(0), Token::Newline,
      Token::Dedent,
      Token::Eof,
    ]);
  }

  #[test]
  fn blank_lines_do_not_affect_indentation() {
    let toks = kinds("if True:\n    x = 1\n\n    y = 2\n");
    let dedent_count = toks.iter().filter(|t| **t == Token::Dedent).count();
    let indent_count = toks.iter().filter(|t| **t == Token::Indent).count();
    assert_eq!((indent_count, dedent_count), (1, 1));
  }

  #[test]
  fn string_literals_keep_their_contents() {
    let toks = kinds("print(\"hi\")\n");
    assert_eq!(toks[2], Token::Str("hi".to_string()));
  }

  #[test]
  fn multi_char_operators_are_not_split() {
    let toks = kinds("a <= b != c\n");
    assert_eq!(toks, vec![
      Token::Ident("a".into()), Token::LessEq, Token::Ident("b".into()), Token::NotEq, Token::Ident("c".into()),
      Token::Newline, Token::Eof,
    ]);
  }
}
