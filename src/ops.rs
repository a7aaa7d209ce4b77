//! Binary and unary operator tokens, plus the per-operator allow-lists the
//! type checker and emitter both need.
//!
//! The enum-with-a-source-spelling shape here is the same trick the
//! teacher's `make_prims!` macro in `entity.rs` uses for `PrimOp`: give
//! every variant its surface-syntax spelling right in the declaration, and
//! derive the string round-trip instead of hand-writing a `match` for it.

use bitflags::bitflags;

bitflags! {
  /// Which operand-type class a `BinOp` accepts, as a set of flags rather
  /// than four separate boolean methods — mirrors how the teacher groups
  /// related yes/no facts about an operator into one `bitflags!` set
  /// instead of a handful of `is_*` predicates.
  #[derive(Debug, Clone, Copy, PartialEq, Eq)]
  pub struct BinOpClass: u8 {
    const INT_ARITH      = 1 << 0;
    const INT_COMPARISON = 1 << 1;
    const EQUALITY       = 1 << 2;
    const LOGICAL        = 1 << 3;
  }
}

macro_rules! make_ops {
  ($(#[$attr0:meta])* enum $name:ident { $($variant:ident = $spelling:literal),* $(,)? }) => {
    $(#[$attr0])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum $name { $($variant),* }

    impl $name {
      /// The SimplePython source spelling of this operator.
      #[must_use] pub const fn spelling(self) -> &'static str {
        match self { $(Self::$variant => $spelling),* }
      }

      /// Parse a source spelling back into an operator token.
      #[must_use] pub fn from_spelling(s: &str) -> Option<Self> {
        match s { $($spelling => Some(Self::$variant),)* _ => None }
      }
    }

    impl std::fmt::Display for $name {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.spelling()) }
    }
  }
}

make_ops! {
  /// Binary operators, in source spelling.
  enum BinOp {
    Add = "+",
    Sub = "-",
    Mul = "*",
    Div = "/",
    Mod = "%",
    Eq = "==",
    Neq = "!=",
    Lt = "<",
    Le = "<=",
    Gt = ">",
    Ge = ">=",
    And = "and",
    Or = "or",
  }
}

make_ops! {
  /// Unary operators, in source spelling.
  enum UnaryOp {
    Neg = "-",
    Not = "not",
  }
}

impl BinOp {
  /// Which operand-type class this operator belongs to, consulted by both
  /// the type checker's allow-list rules and the constant optimizer's
  /// per-class folding logic.
  #[must_use] pub const fn class(self) -> BinOpClass {
    match self {
      Self::Sub | Self::Mul | Self::Div | Self::Mod => BinOpClass::INT_ARITH,
      Self::Lt | Self::Le | Self::Gt | Self::Ge => BinOpClass::INT_COMPARISON,
      Self::Eq | Self::Neq => BinOpClass::EQUALITY,
      Self::And | Self::Or => BinOpClass::LOGICAL,
      // `Add` is polymorphic (int/str/array) and checked by its own rule
      // in `typeck::check_binop`, not through a single operand-class flag.
      Self::Add => BinOpClass::empty(),
    }
  }

  /// Arithmetic operators valid only on `int` operands.
  #[must_use] pub const fn is_int_arith(self) -> bool { self.class().contains(BinOpClass::INT_ARITH) }

  /// Relational comparisons, valid only on `int` operands, always producing `bool`.
  #[must_use] pub const fn is_int_comparison(self) -> bool { self.class().contains(BinOpClass::INT_COMPARISON) }

  /// `==`/`!=`, valid only on `int` operands, always producing `bool`.
  #[must_use] pub const fn is_equality(self) -> bool { self.class().contains(BinOpClass::EQUALITY) }

  /// `and`/`or`, valid only on `bool` operands.
  #[must_use] pub const fn is_logical(self) -> bool { self.class().contains(BinOpClass::LOGICAL) }

  /// The C spelling of this operator (identical for every operator except
  /// the two short-circuiting boolean connectives).
  #[must_use] pub const fn c_spelling(self) -> &'static str {
    match self {
      Self::And => "&&",
      Self::Or => "||",
      other => other.spelling(),
    }
  }
}

impl UnaryOp {
  /// The C spelling of this operator.
  #[must_use] pub const fn c_spelling(self) -> &'static str {
    match self {
      Self::Neg => "-",
      Self::Not => "!",
    }
  }
}
