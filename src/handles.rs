// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Generational handle tables.
//!
//! Handles given to callers are opaque 64-bit values:
//!
//! ```text
//!  63      56 55          32 31                 0
//! +----------+--------------+-------------------+
//! |   kind   |  generation  |    slot index     |
//! +----------+--------------+-------------------+
//! ```
//!
//! A slot's generation is bumped each time it is freed, so a stale handle
//! (or one of the wrong kind) resolves to an invalid-handle error instead of
//! reaching a different live object.

use crate::error::{Error, Result};

const GENERATION_MASK: u32 = 0x00FF_FFFF;

/// Object type a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Connection = 1,
    Statement = 2,
}

impl HandleKind {
    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(HandleKind::Connection),
            2 => Some(HandleKind::Statement),
            _ => None,
        }
    }
}

/// Opaque reference to a slot of a [`HandleTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    kind: HandleKind,
    generation: u32,
    index: u32,
}

impl Handle {
    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    /// Encoded form handed across the call-level boundary. Never zero.
    pub fn as_raw(&self) -> u64 {
        ((self.kind as u64) << 56) | ((self.generation as u64) << 32) | self.index as u64
    }

    /// Decodes a raw handle; `None` when the kind tag is unknown.
    pub fn from_raw(raw: u64) -> Option<Self> {
        let kind = HandleKind::from_tag((raw >> 56) as u8)?;
        Some(Self {
            kind,
            generation: ((raw >> 32) as u32) & GENERATION_MASK,
            index: raw as u32,
        })
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Arena of live objects of one kind.
#[derive(Debug)]
pub struct HandleTable<T> {
    kind: HandleKind,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> HandleTable<T> {
    pub fn new(kind: HandleKind) -> Self {
        Self {
            kind,
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Stores `value` and returns its handle.
    pub fn insert(&mut self, value: T) -> Handle {
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize].value = Some(value);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 1,
                    value: Some(value),
                });
                (self.slots.len() - 1) as u32
            }
        };
        Handle {
            kind: self.kind,
            generation: self.slots[index as usize].generation,
            index,
        }
    }

    fn slot(&self, handle: Handle) -> Result<&Slot<T>> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| {
                handle.kind == self.kind && s.generation == handle.generation && s.value.is_some()
            })
            .ok_or_else(Error::invalid_handle)
    }

    pub fn get(&self, handle: Handle) -> Result<&T> {
        self.slot(handle)?
            .value
            .as_ref()
            .ok_or_else(Error::invalid_handle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut T> {
        self.slot(handle)?;
        self.slots[handle.index as usize]
            .value
            .as_mut()
            .ok_or_else(Error::invalid_handle)
    }

    /// Frees the slot; the handle and every copy of it become invalid.
    pub fn remove(&mut self, handle: Handle) -> Result<T> {
        self.slot(handle)?;
        let slot = &mut self.slots[handle.index as usize];
        let value = slot.value.take().ok_or_else(Error::invalid_handle)?;
        slot.generation = match (slot.generation + 1) & GENERATION_MASK {
            0 => 1,
            g => g,
        };
        self.free.push(handle.index);
        Ok(value)
    }

    /// Live handles with their values.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(move |(i, s)| {
            s.value.as_ref().map(|v| {
                (
                    Handle {
                        kind: self.kind,
                        generation: s.generation,
                        index: i as u32,
                    },
                    v,
                )
            })
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every live value.
    pub fn clear(&mut self) {
        let handles: Vec<Handle> = self.iter().map(|(h, _)| h).collect();
        for handle in handles {
            let _ = self.remove(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_insert_get_remove() {
        let mut table = HandleTable::new(HandleKind::Statement);
        let a = table.insert("a");
        let b = table.insert("b");
        assert_eq!(*table.get(a).unwrap(), "a");
        assert_eq!(*table.get(b).unwrap(), "b");
        assert_eq!(table.len(), 2);

        assert_eq!(table.remove(a).unwrap(), "a");
        assert_eq!(table.get(a).unwrap_err().kind(), ErrorKind::InvalidHandle);
        assert_eq!(table.remove(a).unwrap_err().kind(), ErrorKind::InvalidHandle);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_reused_slot_rejects_stale_handle() {
        let mut table = HandleTable::new(HandleKind::Connection);
        let old = table.insert(1);
        table.remove(old).unwrap();
        let new = table.insert(2);
        assert_ne!(old, new);
        assert!(table.get(old).is_err());
        assert_eq!(*table.get(new).unwrap(), 2);
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let mut connections = HandleTable::new(HandleKind::Connection);
        let mut statements = HandleTable::new(HandleKind::Statement);
        let c = connections.insert(());
        statements.insert(());
        assert!(statements.get(c).is_err());
    }

    #[test]
    fn test_raw_encoding() {
        let mut table = HandleTable::new(HandleKind::Statement);
        let h = table.insert(());
        let raw = h.as_raw();
        assert_ne!(raw, 0);
        assert_eq!(Handle::from_raw(raw), Some(h));
        assert_eq!(Handle::from_raw(0), None);
        assert_eq!(Handle::from_raw(7 << 56), None);
    }

    #[test]
    fn test_get_mut_and_clear() {
        let mut table = HandleTable::new(HandleKind::Statement);
        let h = table.insert(vec![1]);
        table.get_mut(h).unwrap().push(2);
        assert_eq!(table.get(h).unwrap(), &vec![1, 2]);
        table.clear();
        assert!(table.is_empty());
        assert!(table.get(h).is_err());
    }
}
