//! Bounded entity storage.
//!
//! A `Pool` keeps its live entries contiguous: removal swaps the last entry
//! into the freed slot, so `len()` is always the number of live entities and
//! iteration follows insertion order apart from those swaps.

#[derive(Clone, Debug)]
pub struct Pool<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> Pool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Pool {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends `item`, returning its index, or `None` when the pool is full.
    pub fn insert(&mut self, item: T) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        self.items.push(item);
        Some(self.items.len() - 1)
    }

    /// Removes the entry at `index`, moving the last entry into its slot.
    pub fn swap_remove(&mut self, index: usize) -> Option<T> {
        if index < self.items.len() {
            Some(self.items.swap_remove(index))
        } else {
            None
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Runs `update` on every entry, last to first, and swap-removes each one
    /// for which it returns `false`. Walking backward means the entry swapped
    /// into a freed slot has already been visited.
    pub fn update_retain<F>(&mut self, mut update: F) -> usize
    where
        F: FnMut(&mut T) -> bool,
    {
        let mut removed = 0;
        for index in (0..self.items.len()).rev() {
            if !update(&mut self.items[index]) {
                self.items.swap_remove(index);
                removed += 1;
            }
        }
        removed
    }
}

impl<'a, T> IntoIterator for &'a Pool<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
