//! String-keyed dictionary (QDict).
//!
//! Storage is a bucket array with separate chaining. Keys are hashed with the
//! length-seeded rotating-shift hash the monitor code has always used, and
//! the bucket array doubles once the load factor passes one. Each entry owns
//! its key and a [`SharedValue`] handle, so rehashing moves handles, never the
//! values they point to.
//!
//! Iteration has no defined order. Each call to [`Dict::iter`] (or
//! [`Dict::first`]) starts over from the first bucket, independent of any
//! earlier traversal.

use alloc::{string::ToString, sync::Arc, vec::Vec};
use core::{fmt, slice};

use bstr::{BStr, BString, ByteSlice};

use crate::{AccessError, Kind, List, SharedValue, Value};

const INITIAL_BUCKETS: usize = 16;

#[derive(Clone)]
struct Entry {
    key: BString,
    value: SharedValue,
}

/// A dictionary of unique byte-string keys.
#[derive(Clone, Default)]
pub struct Dict {
    buckets: Vec<Vec<Entry>>,
    len: usize,
}

fn hash(key: &[u8]) -> u32 {
    #[allow(clippy::cast_possible_truncation)]
    let mut value = 0x238F_13AF_u32.wrapping_mul(key.len() as u32);
    for (i, &byte) in key.iter().enumerate() {
        value = value.wrapping_add(u32::from(byte) << ((i * 5) % 24));
    }
    1_103_515_243_u32.wrapping_mul(value).wrapping_add(12345)
}

impl Dict {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn bucket_of(&self, key: &[u8]) -> usize {
        debug_assert!(!self.buckets.is_empty());
        hash(key) as usize % self.buckets.len()
    }

    fn find(&self, key: &[u8]) -> Option<&Entry> {
        if self.buckets.is_empty() {
            return None;
        }
        self.buckets[self.bucket_of(key)]
            .iter()
            .find(|e| e.key.as_bytes() == key)
    }

    fn find_mut(&mut self, key: &[u8]) -> Option<&mut Entry> {
        if self.buckets.is_empty() {
            return None;
        }
        let bucket = self.bucket_of(key);
        self.buckets[bucket]
            .iter_mut()
            .find(|e| e.key.as_bytes() == key)
    }

    fn grow(&mut self) {
        let size = if self.buckets.is_empty() {
            INITIAL_BUCKETS
        } else {
            self.buckets.len() * 2
        };
        let old = core::mem::replace(&mut self.buckets, (0..size).map(|_| Vec::new()).collect());
        for entry in old.into_iter().flatten() {
            let bucket = self.bucket_of(&entry.key);
            self.buckets[bucket].push(entry);
        }
    }

    /// Inserts `value` under `key`.
    ///
    /// An existing entry is replaced and its previous value returned; dropping
    /// the returned handle releases it. The size does not change on replace.
    pub fn put(
        &mut self,
        key: impl Into<BString>,
        value: impl Into<SharedValue>,
    ) -> Option<SharedValue> {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.find_mut(&key) {
            return Some(core::mem::replace(&mut entry.value, value));
        }
        if self.len >= self.buckets.len() {
            self.grow();
        }
        let bucket = self.bucket_of(&key);
        self.buckets[bucket].push(Entry { key, value });
        self.len += 1;
        None
    }

    pub fn put_int(&mut self, key: impl Into<BString>, value: i64) {
        self.put(key, Value::Int(value));
    }

    pub fn put_float(&mut self, key: impl Into<BString>, value: f64) {
        self.put(key, Value::Float(value));
    }

    pub fn put_bool(&mut self, key: impl Into<BString>, value: bool) {
        self.put(key, Value::Bool(value));
    }

    pub fn put_str(&mut self, key: impl Into<BString>, value: impl Into<BString>) {
        self.put(key, Value::String(value.into()));
    }

    pub fn put_null(&mut self, key: impl Into<BString>) {
        self.put(key, Value::Null);
    }

    /// Borrows the value stored under `key`.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&Value> {
        self.find(key.as_ref()).map(|e| &*e.value)
    }

    /// Returns the handle stored under `key`; clone it to retain the value
    /// past the lifetime of this dict.
    pub fn get_shared(&self, key: impl AsRef<[u8]>) -> Option<&SharedValue> {
        self.find(key.as_ref()).map(|e| &e.value)
    }

    /// Mutable access to the value under `key`, cloning it first if another
    /// holder shares it.
    pub fn get_mut(&mut self, key: impl AsRef<[u8]>) -> Option<&mut Value> {
        self.find_mut(key.as_ref()).map(|e| Arc::make_mut(&mut e.value))
    }

    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.find(key.as_ref()).is_some()
    }

    /// Removes the entry under `key` and returns its value. Absent keys are a
    /// no-op.
    pub fn remove(&mut self, key: impl AsRef<[u8]>) -> Option<SharedValue> {
        let key = key.as_ref();
        if self.buckets.is_empty() {
            return None;
        }
        let bucket = self.bucket_of(key);
        let chain = &mut self.buckets[bucket];
        let pos = chain.iter().position(|e| e.key.as_bytes() == key)?;
        self.len -= 1;
        Some(chain.swap_remove(pos).value)
    }

    /// Starts a traversal over every entry.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            buckets: self.buckets.iter(),
            chain: Default::default(),
            remaining: self.len,
        }
    }

    /// The first entry of a fresh traversal.
    #[must_use]
    pub fn first(&self) -> Option<(&BStr, &Value)> {
        self.iter().next()
    }

    pub fn keys(&self) -> impl Iterator<Item = &BStr> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.iter().map(|(_, v)| v)
    }

    fn typed<'a, T>(
        &'a self,
        key: &[u8],
        expected: Kind,
        pick: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T, AccessError> {
        let value = self
            .get(key)
            .ok_or_else(|| AccessError::KeyNotFound(BString::from(key)))?;
        pick(value).ok_or(AccessError::WrongType {
            expected,
            found: value.kind(),
        })
    }

    /// The integer under `key`; missing keys and other types are errors.
    pub fn get_int(&self, key: impl AsRef<[u8]>) -> Result<i64, AccessError> {
        self.typed(key.as_ref(), Kind::Int, Value::as_int)
    }

    /// The number under `key` as a float; integers are widened.
    pub fn get_float(&self, key: impl AsRef<[u8]>) -> Result<f64, AccessError> {
        self.typed(key.as_ref(), Kind::Float, Value::as_float)
    }

    pub fn get_bool(&self, key: impl AsRef<[u8]>) -> Result<bool, AccessError> {
        self.typed(key.as_ref(), Kind::Bool, Value::as_bool)
    }

    pub fn get_str(&self, key: impl AsRef<[u8]>) -> Result<&BStr, AccessError> {
        self.typed(key.as_ref(), Kind::String, Value::as_bstr)
    }

    /// The integer under `key`, or `default` when the key is absent or holds
    /// another type.
    pub fn get_try_int(&self, key: impl AsRef<[u8]>, default: i64) -> i64 {
        self.get(key).and_then(Value::as_int).unwrap_or(default)
    }

    pub fn get_try_bool(&self, key: impl AsRef<[u8]>, default: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    /// The string under `key`, or `None` when absent or not a string.
    pub fn get_try_str(&self, key: impl AsRef<[u8]>) -> Option<&BStr> {
        self.get(key).and_then(Value::as_bstr)
    }

    /// The dict under `key`, or `None` when absent or not a dict.
    pub fn get_dict(&self, key: impl AsRef<[u8]>) -> Option<&Dict> {
        self.get(key).and_then(Value::as_dict)
    }

    pub fn get_list(&self, key: impl AsRef<[u8]>) -> Option<&List> {
        self.get(key).and_then(Value::as_list)
    }

    /// Stores `value` under `key` unless the key is already present.
    pub fn set_default_str(&mut self, key: impl Into<BString>, value: impl Into<BString>) {
        let key = key.into();
        if !self.contains_key(&key) {
            self.put_str(key, value);
        }
    }

    /// Copies the entry for `key` from `src` if this dict lacks it. The value
    /// is shared with `src`, not duplicated.
    pub fn copy_default(&mut self, src: &Dict, key: impl AsRef<[u8]>) {
        let key = key.as_ref();
        if self.contains_key(key) {
            return;
        }
        if let Some(value) = src.get_shared(key) {
            self.put(key, Arc::clone(value));
        }
    }

    /// A new dict whose entries share their values with this one.
    #[must_use]
    pub fn clone_shallow(&self) -> Dict {
        self.clone()
    }

    /// Moves every entry whose key starts with `prefix` into a new dict,
    /// keyed by the remainder of the original key.
    pub fn extract_subdict(&mut self, prefix: impl AsRef<[u8]>) -> Dict {
        let prefix = prefix.as_ref();
        let keys: Vec<BString> = self
            .keys()
            .filter(|k| k.starts_with(prefix))
            .map(BString::from)
            .collect();
        let mut sub = Dict::new();
        for key in keys {
            if let Some(value) = self.remove(&key) {
                sub.put(&key.as_bytes()[prefix.len()..], value);
            }
        }
        sub
    }

    /// Replaces nested non-empty dicts and lists by dotted keys:
    /// `{"a": {"b": 1}, "l": [2]}` becomes `{"a.b": 1, "l.0": 2}`. Empty
    /// containers are kept as they are.
    pub fn flatten(&mut self) {
        let mut flat = Dict::new();
        for (key, value) in self.iter_shared() {
            flatten_into(&mut flat, key, value);
        }
        *self = flat;
    }

    fn iter_shared(&self) -> impl Iterator<Item = (&BStr, &SharedValue)> {
        self.buckets
            .iter()
            .flatten()
            .map(|e| (e.key.as_bstr(), &e.value))
    }

    /// Moves entries from `src` into this dict. With `overwrite` unset, keys
    /// already present here stay in `src`.
    pub fn join(&mut self, src: &mut Dict, overwrite: bool) {
        let keys: Vec<BString> = src.keys().map(BString::from).collect();
        for key in keys {
            if !overwrite && self.contains_key(&key) {
                continue;
            }
            if let Some(value) = src.remove(&key) {
                self.put(key, value);
            }
        }
    }
}

fn flatten_into(flat: &mut Dict, key: &BStr, value: &SharedValue) {
    match &**value {
        Value::Dict(dict) if !dict.is_empty() => {
            for (sub_key, sub_value) in dict.iter_shared() {
                flatten_into(flat, dotted(key, sub_key).as_bstr(), sub_value);
            }
        }
        Value::List(list) if !list.is_empty() => {
            for (index, element) in list.iter_shared().enumerate() {
                let index = index.to_string();
                flatten_into(flat, dotted(key, index.as_bytes()).as_bstr(), element);
            }
        }
        _ => {
            flat.put(key, Arc::clone(value));
        }
    }
}

/// `key.suffix`, byte for byte.
fn dotted(key: &BStr, suffix: &[u8]) -> BString {
    let mut joined = BString::from(key.as_bytes());
    joined.push(b'.');
    joined.extend_from_slice(suffix);
    joined
}

/// Traversal over the entries of a [`Dict`].
pub struct Iter<'a> {
    buckets: slice::Iter<'a, Vec<Entry>>,
    chain: slice::Iter<'a, Entry>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a BStr, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.chain.next() {
                self.remaining -= 1;
                return Some((entry.key.as_bstr(), &*entry.value));
            }
            self.chain = self.buckets.next()?.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Dict {
    type Item = (&'a BStr, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Into<BString>, V: Into<SharedValue>> FromIterator<(K, V)> for Dict {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Dict::new();
        for (k, v) in iter {
            dict.put(k, v);
        }
        dict
    }
}

impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl fmt::Debug for Dict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
