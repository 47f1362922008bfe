//! Ordered sequence of shared values (QList).

use alloc::{collections::VecDeque, sync::Arc};
use core::fmt;

use bstr::BString;

use crate::{SharedValue, Value};

/// An ordered list of values. Appending is O(1) and insertion order is kept.
///
/// Every call to [`List::iter`] starts a fresh traversal from the head.
#[derive(Clone, Default, PartialEq)]
pub struct List {
    items: VecDeque<SharedValue>,
}

impl List {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value at the tail. Passing a [`SharedValue`] stores that
    /// handle, so the element keeps its identity.
    pub fn append(&mut self, value: impl Into<SharedValue>) {
        self.items.push_back(value.into());
    }

    pub fn append_int(&mut self, value: i64) {
        self.append(Value::Int(value));
    }

    pub fn append_bool(&mut self, value: bool) {
        self.append(Value::Bool(value));
    }

    pub fn append_str(&mut self, value: impl Into<BString>) {
        self.append(Value::String(value.into()));
    }

    /// Removes and returns the head element.
    pub fn pop(&mut self) -> Option<SharedValue> {
        self.items.pop_front()
    }

    /// Borrows the head element without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&Value> {
        self.items.front().map(|v| &**v)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index).map(|v| &**v)
    }

    /// Returns the element handle at `index`; clone it to retain the element.
    #[must_use]
    pub fn get_shared(&self, index: usize) -> Option<&SharedValue> {
        self.items.get(index)
    }

    /// Mutable access to an element, cloning it first if it is shared.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.items.get_mut(index).map(Arc::make_mut)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Value> + DoubleEndedIterator {
        self.items.iter().map(|v| &**v)
    }

    pub fn iter_shared(&self) -> impl ExactSizeIterator<Item = &SharedValue> + DoubleEndedIterator {
        self.items.iter()
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl FromIterator<Value> for List {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Arc::new).collect(),
        }
    }
}

impl FromIterator<SharedValue> for List {
    fn from_iter<I: IntoIterator<Item = SharedValue>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl Extend<SharedValue> for List {
    fn extend<I: IntoIterator<Item = SharedValue>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}
