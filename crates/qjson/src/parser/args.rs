//! Arguments consumed by interpolation placeholders.

use alloc::sync::Arc;

use crate::{SharedValue, Value};

/// One argument for [`parse_with_args`](crate::parse_with_args).
///
/// Placeholders accept these variants:
///
/// | placeholder          | accepts                 | produces         |
/// |----------------------|-------------------------|------------------|
/// | `%d`                 | `Int`                   | `Value::Int`     |
/// | `%ld` `%lld` `%I64d` | `Int`, `Long`           | `Value::Int`     |
/// | `%u`                 | `UInt`                  | `Value::Int`     |
/// | `%lu` `%llu` `%I64u` | `UInt`, `ULong`         | `Value::Int`, or `Value::Float` above `i64::MAX` |
/// | `%i`                 | `Bool`, `Int` (non-zero)| `Value::Bool`    |
/// | `%f`                 | `Double`                | `Value::Float`   |
/// | `%s`                 | `Str`, `Bytes`          | `Value::String`  |
/// | `%p`                 | `Value`                 | the same handle  |
#[derive(Debug, Clone, Copy)]
pub enum Arg<'a> {
    Int(i32),
    Long(i64),
    UInt(u32),
    ULong(u64),
    Bool(bool),
    Double(f64),
    Str(&'a str),
    Bytes(&'a [u8]),
    /// An existing value, spliced in without copying. The caller keeps its
    /// own handle.
    Value(&'a SharedValue),
}

impl Arg<'_> {
    /// Short type name used in mismatch errors.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Arg::Int(_) => "int",
            Arg::Long(_) => "long",
            Arg::UInt(_) => "uint",
            Arg::ULong(_) => "ulong",
            Arg::Bool(_) => "bool",
            Arg::Double(_) => "double",
            Arg::Str(_) => "string",
            Arg::Bytes(_) => "bytes",
            Arg::Value(_) => "value",
        }
    }

    /// Converts the argument for `escape`, or `None` when the placeholder
    /// does not take this kind of argument.
    pub(crate) fn interpolate(&self, escape: &[u8]) -> Option<SharedValue> {
        let value = match (escape, *self) {
            (b"%d", Arg::Int(i)) => Value::Int(i64::from(i)),
            (b"%ld" | b"%lld" | b"%I64d", Arg::Int(i)) => Value::Int(i64::from(i)),
            (b"%ld" | b"%lld" | b"%I64d", Arg::Long(i)) => Value::Int(i),
            (b"%u" | b"%lu" | b"%llu" | b"%I64u", Arg::UInt(u)) => Value::Int(i64::from(u)),
            (b"%lu" | b"%llu" | b"%I64u", Arg::ULong(u)) => unsigned(u),
            (b"%i", Arg::Bool(b)) => Value::Bool(b),
            (b"%i", Arg::Int(i)) => Value::Bool(i != 0),
            (b"%f", Arg::Double(f)) => Value::Float(f),
            (b"%s", Arg::Str(s)) => Value::from(s),
            (b"%s", Arg::Bytes(b)) => Value::from(b),
            (b"%p", Arg::Value(v)) => return Some(Arc::clone(v)),
            _ => return None,
        };
        Some(value.shared())
    }
}

#[allow(clippy::cast_precision_loss)]
fn unsigned(u: u64) -> Value {
    i64::try_from(u).map_or(Value::Float(u as f64), Value::Int)
}

impl From<i32> for Arg<'_> {
    fn from(v: i32) -> Self {
        Arg::Int(v)
    }
}

impl From<i64> for Arg<'_> {
    fn from(v: i64) -> Self {
        Arg::Long(v)
    }
}

impl From<u32> for Arg<'_> {
    fn from(v: u32) -> Self {
        Arg::UInt(v)
    }
}

impl From<u64> for Arg<'_> {
    fn from(v: u64) -> Self {
        Arg::ULong(v)
    }
}

impl From<bool> for Arg<'_> {
    fn from(v: bool) -> Self {
        Arg::Bool(v)
    }
}

impl From<f64> for Arg<'_> {
    fn from(v: f64) -> Self {
        Arg::Double(v)
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(v: &'a str) -> Self {
        Arg::Str(v)
    }
}

impl<'a> From<&'a alloc::string::String> for Arg<'a> {
    fn from(v: &'a alloc::string::String) -> Self {
        Arg::Str(v)
    }
}

impl<'a> From<&'a [u8]> for Arg<'a> {
    fn from(v: &'a [u8]) -> Self {
        Arg::Bytes(v)
    }
}

impl<'a> From<&'a SharedValue> for Arg<'a> {
    fn from(v: &'a SharedValue) -> Self {
        Arg::Value(v)
    }
}
