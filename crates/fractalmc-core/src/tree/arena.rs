use std::slice::Iter;

/// Holds all items and allows for fast allocation and is cache friendly.
/// Slots are dense positions; the tree maps its own node ids onto them.
#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    storage: Vec<T>,
}

impl<T> Arena<T> {
    /// Create a new empty storage
    pub fn new() -> Self {
        Arena {
            storage: Vec::new(),
        }
    }

    /// Allocate a new item to the storage and return the slot it landed in
    pub fn allocate(&mut self, item: T) -> usize {
        let slot = self.storage.len();
        self.storage.push(item);
        slot
    }

    /// Retrieve the item stored in a slot
    pub fn get(&self, slot: usize) -> Option<&T> {
        self.storage.get(slot)
    }

    /// Check the length of the Arena
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if the Arena is empty
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Drop every stored item.
    pub fn clear(&mut self) {
        self.storage.clear();
    }

    /// Iteration helper for the Arena, in allocation order
    pub fn iter(&self) -> Iter<'_, T> {
        self.storage.iter()
    }
}
