// NetPlan: Multilayer Network Planning Model
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # Identity and index registry
//!
//! Every element is stored in exactly one [`Registry`]. The registry keeps the elements ordered,
//! and assigns each element a dense index (its position). Removing an element shifts the index of
//! all elements after it down by one.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// Element with a stable identity and a dense index
pub trait Indexed {
    /// Raw identifier of the element
    fn raw_id(&self) -> u64;
    /// Current index of the element inside its collection
    fn index(&self) -> usize;
    /// Update the index. Only the registry may call this.
    fn set_index(&mut self, index: usize);
}

/// Ordered collection of elements with O(1) lookup by identifier.
#[derive(Debug, Clone)]
pub(crate) struct Registry<T> {
    items: Vec<T>,
    positions: HashMap<u64, usize>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self { items: Vec::new(), positions: HashMap::new() }
    }
}

impl<T: Indexed> Registry<T> {
    /// Build a registry from an ordered list of elements. Indices are reassigned.
    pub fn from_items(items: Vec<T>) -> Self {
        let mut registry = Self::default();
        for item in items {
            registry.insert(item);
        }
        registry
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no element is stored
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append a new element and return its index.
    pub fn insert(&mut self, mut item: T) -> usize {
        let index = self.items.len();
        item.set_index(index);
        self.positions.insert(item.raw_id(), index);
        self.items.push(item);
        index
    }

    /// Remove an element, shifting the index of all following elements.
    pub fn remove(&mut self, raw_id: u64) -> Option<T> {
        let pos = self.positions.remove(&raw_id)?;
        let item = self.items.remove(pos);
        for (i, shifted) in self.items.iter_mut().enumerate().skip(pos) {
            shifted.set_index(i);
            self.positions.insert(shifted.raw_id(), i);
        }
        Some(item)
    }

    pub fn contains(&self, raw_id: u64) -> bool {
        self.positions.contains_key(&raw_id)
    }

    pub fn get(&self, raw_id: u64) -> Option<&T> {
        self.positions.get(&raw_id).map(|pos| &self.items[*pos])
    }

    pub fn get_mut(&mut self, raw_id: u64) -> Option<&mut T> {
        match self.positions.get(&raw_id) {
            Some(pos) => self.items.get_mut(*pos),
            None => None,
        }
    }

    /// Returns the element at the given index
    pub fn by_index(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Check that the indices are contiguous and that the lookup table matches the positions.
    pub fn check_contiguity(&self) -> Result<(), String> {
        if self.positions.len() != self.items.len() {
            return Err(format!(
                "lookup has {} entries, but {} elements are stored",
                self.positions.len(),
                self.items.len()
            ));
        }
        for (i, item) in self.items.iter().enumerate() {
            if item.index() != i {
                return Err(format!(
                    "element {} has index {}, expected {}",
                    item.raw_id(),
                    item.index(),
                    i
                ));
            }
            if self.positions.get(&item.raw_id()) != Some(&i) {
                return Err(format!("lookup of element {} does not point to {}", item.raw_id(), i));
            }
        }
        Ok(())
    }
}

impl<T: PartialEq> PartialEq for Registry<T> {
    /// The lookup table is derived from the ordered elements, so comparing those is enough.
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Serialize> Serialize for Registry<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, T: Indexed + Deserialize<'de>> Deserialize<'de> for Registry<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_items(Vec::<T>::deserialize(deserializer)?))
    }
}
