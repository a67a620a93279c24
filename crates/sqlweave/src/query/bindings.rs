//! Bound parameter storage, bucketed by clause category.

use crate::value::Value;

/// Category a bound value belongs to.
///
/// Compiled SQL emits clauses in this order, so flattening the buckets in
/// declaration order yields values in placeholder order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingKind {
    Select,
    Join,
    Where,
    Having,
    Order,
    Union,
    UnionOrder,
}

impl BindingKind {
    /// Every category in flattening order.
    pub const ALL: [BindingKind; 7] = [
        BindingKind::Select,
        BindingKind::Join,
        BindingKind::Where,
        BindingKind::Having,
        BindingKind::Order,
        BindingKind::Union,
        BindingKind::UnionOrder,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Values bound to a builder, one bucket per [`BindingKind`].
///
/// Raw values never enter a bucket; they are rendered inline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    buckets: [Vec<Value>; 7],
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value. Raw expressions are skipped.
    pub fn add(&mut self, kind: BindingKind, value: Value) {
        if !value.is_raw() {
            self.buckets[kind.index()].push(value);
        }
    }

    /// Bind several values in order.
    pub fn extend<I>(&mut self, kind: BindingKind, values: I)
    where
        I: IntoIterator<Item = Value>,
    {
        for value in values {
            self.add(kind, value);
        }
    }

    /// Replace a bucket.
    pub fn set(&mut self, kind: BindingKind, values: Vec<Value>) {
        self.buckets[kind.index()] = values.into_iter().filter(|v| !v.is_raw()).collect();
    }

    /// Values of one bucket.
    pub fn get(&self, kind: BindingKind) -> &[Value] {
        &self.buckets[kind.index()]
    }

    /// Empty a bucket, returning what it held.
    pub fn take(&mut self, kind: BindingKind) -> Vec<Value> {
        std::mem::take(&mut self.buckets[kind.index()])
    }

    /// Empty a bucket.
    pub fn clear(&mut self, kind: BindingKind) {
        self.buckets[kind.index()].clear();
    }

    /// Append every bucket of `other` to the matching bucket here.
    pub fn merge(&mut self, other: &Bindings) {
        for kind in BindingKind::ALL {
            self.buckets[kind.index()].extend(other.get(kind).iter().cloned());
        }
    }

    /// All values in placeholder order.
    pub fn flatten(&self) -> Vec<Value> {
        self.buckets.iter().flatten().cloned().collect()
    }

    /// `(kind, values)` pairs in placeholder order.
    pub fn iter(&self) -> impl Iterator<Item = (BindingKind, &[Value])> {
        BindingKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.get(kind)))
    }

    /// Total number of bound values.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}
