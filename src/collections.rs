//! Insertion ordered set and map types used for alphabets and for the group bookkeeping of
//! the minimizer.
//!
//! Both types are thin wrappers around the `indexmap` collections. The set operations
//! `union`, `intersection` and `difference` return new sets and never touch their operands.

use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

/// A set that remembers the insertion order of its elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Set<T: Hash + Eq> {
    elements: IndexSet<T>,
}

impl<T: Hash + Eq> Default for Set<T> {
    fn default() -> Self {
        Self {
            elements: IndexSet::new(),
        }
    }
}

impl<T: Hash + Eq + Clone> Set<T> {
    /// Create a new empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an element. Returns false if the element was already present.
    pub fn insert(&mut self, element: T) -> bool {
        self.elements.insert(element)
    }

    /// Remove an element while keeping the order of the remaining ones.
    pub fn remove(&mut self, element: &T) -> bool {
        self.elements.shift_remove(element)
    }

    /// Check if the set contains the element.
    pub fn contains(&self, element: &T) -> bool {
        self.elements.contains(element)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the set has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.elements.iter()
    }

    /// All elements of `self` followed by the new elements of `other`.
    pub fn union(&self, other: &Set<T>) -> Set<T> {
        Set {
            elements: self.elements.union(&other.elements).cloned().collect(),
        }
    }

    /// Elements of `self` that are also in `other`, in the order of `self`.
    pub fn intersection(&self, other: &Set<T>) -> Set<T> {
        Set {
            elements: self
                .elements
                .intersection(&other.elements)
                .cloned()
                .collect(),
        }
    }

    /// Elements of `self` that are not in `other`, in the order of `self`.
    pub fn difference(&self, other: &Set<T>) -> Set<T> {
        Set {
            elements: self.elements.difference(&other.elements).cloned().collect(),
        }
    }

    /// Returns true if every element of `self` is in `other`.
    pub fn is_subset(&self, other: &Set<T>) -> bool {
        self.elements.is_subset(&other.elements)
    }
}

impl<T: Hash + Eq> FromIterator<T> for Set<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Set {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<'a, T: Hash + Eq> IntoIterator for &'a Set<T> {
    type Item = &'a T;
    type IntoIter = indexmap::set::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

/// A map that remembers the insertion order of its keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map<K: Hash + Eq, V> {
    entries: IndexMap<K, V>,
}

impl<K: Hash + Eq, V> Default for Map<K, V> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<K: Hash + Eq, V> Map<K, V> {
    /// Create a new empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert a value, returning the previous value of the key.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    /// Get the value of a key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    /// Remove a key while keeping the order of the remaining entries.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.shift_remove(key)
    }

    /// Check if the key is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.entries.iter()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
