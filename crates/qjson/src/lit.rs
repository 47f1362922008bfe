//! Literal value trees, for building and checking values in tests and
//! static tables.

use crate::{Dict, List, Value};

/// A borrowed, `const`-friendly description of a value tree.
///
/// ```
/// use qjson::Lit;
///
/// const EXPECTED: Lit<'static> = Lit::Dict(&[
///     ("return", Lit::Dict(&[])),
///     ("id", Lit::List(&[Lit::Int(1), Lit::Str("a")])),
/// ]);
///
/// let v = qjson::parse("{'id': [1, 'a'], 'return': {}}").unwrap();
/// assert!(EXPECTED.matches(&v));
/// assert_eq!(v, EXPECTED);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lit<'a> {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(&'a str),
    List(&'a [Lit<'a>]),
    /// Key order is irrelevant when matching.
    Dict(&'a [(&'a str, Lit<'a>)]),
}

impl Lit<'_> {
    /// Structural comparison against `value`, stopping at the first
    /// mismatch. Integers and floats never match each other.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        match (*self, value) {
            (Lit::Null, Value::Null) => true,
            (Lit::Int(a), Value::Int(b)) => a == *b,
            #[allow(clippy::float_cmp)]
            (Lit::Float(a), Value::Float(b)) => a == *b,
            (Lit::Bool(a), Value::Bool(b)) => a == *b,
            (Lit::Str(a), Value::String(b)) => a.as_bytes() == b.as_slice(),
            (Lit::List(items), Value::List(list)) => {
                items.len() == list.len()
                    && items.iter().zip(list.iter()).all(|(lit, v)| lit.matches(v))
            }
            (Lit::Dict(entries), Value::Dict(dict)) => {
                entries.len() == dict.len()
                    && entries
                        .iter()
                        .all(|(key, lit)| dict.get(key).is_some_and(|v| lit.matches(v)))
            }
            _ => false,
        }
    }

    /// Builds the value tree this literal describes.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match *self {
            Lit::Null => Value::Null,
            Lit::Int(i) => Value::Int(i),
            Lit::Float(f) => Value::Float(f),
            Lit::Bool(b) => Value::Bool(b),
            Lit::Str(s) => Value::from(s),
            Lit::List(items) => Value::List(items.iter().map(Lit::to_value).collect::<List>()),
            Lit::Dict(entries) => Value::Dict(
                entries
                    .iter()
                    .map(|(key, lit)| (*key, lit.to_value()))
                    .collect::<Dict>(),
            ),
        }
    }
}

impl PartialEq<Value> for Lit<'_> {
    fn eq(&self, other: &Value) -> bool {
        self.matches(other)
    }
}

impl PartialEq<Lit<'_>> for Value {
    fn eq(&self, other: &Lit<'_>) -> bool {
        other.matches(self)
    }
}

impl From<Lit<'_>> for Value {
    fn from(lit: Lit<'_>) -> Self {
        lit.to_value()
    }
}
