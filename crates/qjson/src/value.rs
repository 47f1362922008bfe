//! The dynamically typed value tree.
//!
//! [`Value`] is a closed sum type over the seven QObject variants. Containers
//! hold their children as [`SharedValue`]s (`Arc<Value>`), so a subtree can be
//! handed out to another holder by cloning the `Arc` and lives as long as its
//! longest holder. Dropping the last handle tears the subtree down
//! recursively; the tree has no back references, so no cycle collection is
//! needed.
//!
//! Accessors that hand out `&Value` are weak borrows. Use the `*_shared`
//! accessors and clone the returned `Arc` to keep a child alive beyond its
//! parent.

use alloc::{
    string::String,
    sync::Arc,
    vec::Vec,
};
use core::fmt;

use bstr::{BStr, BString, ByteSlice};

use crate::{AccessError, Dict, List, writer};

/// Reference-counted handle to a [`Value`].
pub type SharedValue = Arc<Value>;

/// A QObject: one node of a JSON value tree.
///
/// # Examples
///
/// ```
/// use qjson::{Dict, Value};
///
/// let mut dict = Dict::new();
/// dict.put_int("foo", 42);
/// let v = Value::Dict(dict);
/// assert_eq!(v.to_string(), r#"{"foo": 42}"#);
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    /// Absence marker. Serializes to nothing.
    #[default]
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Raw bytes. Escape decoding produces UTF-8, but bytes handed in by
    /// embedders are stored unvalidated.
    String(BString),
    List(List),
    Dict(Dict),
}

/// The type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Int,
    Float,
    Bool,
    String,
    List,
    Dict,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Null => "null",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Bool => "bool",
            Kind::String => "string",
            Kind::List => "list",
            Kind::Dict => "dict",
        })
    }
}

impl Value {
    /// Returns an empty list value.
    #[must_use]
    pub fn new_list() -> Self {
        Self::List(List::new())
    }

    /// Returns an empty dict value.
    #[must_use]
    pub fn new_dict() -> Self {
        Self::Dict(Dict::new())
    }

    /// Moves the value behind a fresh reference-counted handle.
    #[must_use]
    pub fn shared(self) -> SharedValue {
        Arc::new(self)
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Bool(_) => Kind::Bool,
            Value::String(_) => Kind::String,
            Value::List(_) => Kind::List,
            Value::Dict(_) => Kind::Dict,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the number as a float. Integers are widened, like
    /// `qnum_get_double` does.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            #[allow(clippy::cast_precision_loss)]
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bstr(&self) -> Option<&BStr> {
        match self {
            Self::String(s) => Some(s.as_bstr()),
            _ => None,
        }
    }

    /// Returns the string contents if this is a string holding valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_bstr().and_then(|s| s.to_str().ok())
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut List> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Self::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dict> {
        match self {
            Self::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Checks the type tag, reporting a mismatch as [`AccessError::WrongType`].
    pub fn expect_kind(&self, expected: Kind) -> Result<&Self, AccessError> {
        let found = self.kind();
        if found == expected {
            Ok(self)
        } else {
            Err(AccessError::WrongType { expected, found })
        }
    }

    /// Renders the value as compact JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        writer::to_json(self)
    }

    /// Renders the value as indented JSON.
    #[must_use]
    pub fn to_json_pretty(&self) -> String {
        writer::to_json_pretty(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writer::write_json(self, false, f)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(BString::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(BString::from(v))
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::String(BString::from(v))
    }
}

impl From<BString> for Value {
    fn from(v: BString) -> Self {
        Self::String(v)
    }
}

impl From<List> for Value {
    fn from(v: List) -> Self {
        Self::List(v)
    }
}

impl From<Dict> for Value {
    fn from(v: Dict) -> Self {
        Self::Dict(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v.into_iter().collect())
    }
}

impl TryFrom<&Value> for i64 {
    type Error = AccessError;

    fn try_from(v: &Value) -> Result<Self, Self::Error> {
        v.as_int().ok_or(AccessError::WrongType {
            expected: Kind::Int,
            found: v.kind(),
        })
    }
}

impl TryFrom<&Value> for f64 {
    type Error = AccessError;

    fn try_from(v: &Value) -> Result<Self, Self::Error> {
        v.as_float().ok_or(AccessError::WrongType {
            expected: Kind::Float,
            found: v.kind(),
        })
    }
}

impl TryFrom<&Value> for bool {
    type Error = AccessError;

    fn try_from(v: &Value) -> Result<Self, Self::Error> {
        v.as_bool().ok_or(AccessError::WrongType {
            expected: Kind::Bool,
            found: v.kind(),
        })
    }
}

impl<'a> TryFrom<&'a Value> for &'a BStr {
    type Error = AccessError;

    fn try_from(v: &'a Value) -> Result<Self, Self::Error> {
        v.as_bstr().ok_or(AccessError::WrongType {
            expected: Kind::String,
            found: v.kind(),
        })
    }
}

impl<'a> TryFrom<&'a Value> for &'a Dict {
    type Error = AccessError;

    fn try_from(v: &'a Value) -> Result<Self, Self::Error> {
        v.as_dict().ok_or(AccessError::WrongType {
            expected: Kind::Dict,
            found: v.kind(),
        })
    }
}

impl<'a> TryFrom<&'a Value> for &'a List {
    type Error = AccessError;

    fn try_from(v: &'a Value) -> Result<Self, Self::Error> {
        v.as_list().ok_or(AccessError::WrongType {
            expected: Kind::List,
            found: v.kind(),
        })
    }
}
