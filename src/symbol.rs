//! Interned identifiers.
//!
//! Variable and function names are interned once into a global table so
//! that every later comparison (scope lookups, `var_to_value` keys,
//! function-signature lookups) is a cheap integer compare instead of a
//! string compare, matching the interning scheme `entity.rs`'s `Symbol`
//! plays the same role for in the teacher crate.

use std::fmt;
use std::sync::{LazyLock, Mutex};
use hashbrown::HashMap;

/// An interned string. Cheap to copy, compare, and hash.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

struct Interner {
  strings: Vec<Box<str>>,
  map: HashMap<Box<str>, u32>,
}

impl Interner {
  fn new() -> Self { Self { strings: Vec::new(), map: HashMap::new() } }

  fn intern(&mut self, s: &str) -> Symbol {
    if let Some(&id) = self.map.get(s) { return Symbol(id) }
    let id = u32::try_from(self.strings.len()).expect("too many interned symbols");
    let boxed: Box<str> = s.into();
    self.strings.push(boxed.clone());
    self.map.insert(boxed, id);
    Symbol(id)
  }

  fn resolve(&self, sym: Symbol) -> &str { &self.strings[sym.0 as usize] }
}

static INTERNER: LazyLock<Mutex<Interner>> = LazyLock::new(|| Mutex::new(Interner::new()));

/// Intern `s`, returning a [`Symbol`] that compares equal for any two calls
/// with equal string contents.
#[must_use] pub fn intern(s: &str) -> Symbol {
  INTERNER.lock().unwrap_or_else(std::sync::PoisonError::into_inner).intern(s)
}

impl Symbol {
  /// Look up the original string. Allocates a fresh `String` since the
  /// interner table cannot safely hand out a `&'static str` behind a mutex.
  #[must_use] pub fn as_str(self) -> String {
    INTERNER.lock().unwrap_or_else(std::sync::PoisonError::into_inner).resolve(self).to_owned()
  }
}

impl fmt::Debug for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:?}", self.as_str()) }
}

impl fmt::Display for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn interning_is_idempotent() {
    let a = intern("foo");
    let b = intern("foo");
    let c = intern("bar");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.as_str(), "foo");
  }
}
