use crate::error::Error;
use std::fmt;

/// Fixed-capacity circular buffer keeping the most recent samples of one finger.
///
/// Slots are filled in write order until the buffer is full, after which every
/// push overwrites the oldest retained slot. Reads never observe a slot that was
/// not written or that has already been overwritten.
pub struct RingHistory<T> {
    slots: Vec<T>,
    cursor: usize,
    capacity: usize,
}

impl<T: Clone> Clone for RingHistory<T> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            cursor: self.cursor,
            capacity: self.capacity,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for RingHistory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.asc_iter()).finish()
    }
}

impl<T> RingHistory<T> {
    /// Creates an empty history. A zero capacity is bumped to one slot.
    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        let capacity = cap.max(1);

        Self {
            slots: Vec::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.slots.len() < self.capacity {
            self.slots.push(item);
        } else {
            self.slots[self.cursor] = item;
        }

        self.cursor = (self.cursor + 1) % self.capacity;
    }

    /// Returns the sample `i` positions back from the newest one.
    pub fn read_from_newest(&self, i: usize) -> Result<&T, Error> {
        let len = self.len();
        if i >= len {
            return Err(Error::OutOfRange { index: i, len });
        }

        let idx = (self.cursor + self.capacity - 1 - i) % self.capacity;

        Ok(&self.slots[idx])
    }

    /// Returns the sample `i` positions forward from the oldest retained one.
    pub fn read_from_oldest(&self, i: usize) -> Result<&T, Error> {
        let len = self.len();
        if i >= len {
            return Err(Error::OutOfRange { index: i, len });
        }

        Ok(&self.slots[(self.oldest() + i) % self.capacity])
    }

    #[inline]
    pub fn newest(&self) -> Option<&T> {
        self.read_from_newest(0).ok()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates from the oldest retained sample to the newest.
    #[inline]
    pub fn asc_iter(&self) -> impl Iterator<Item = &'_ T> {
        let (head, tail) = self.slots.split_at(self.oldest());

        tail.iter().chain(head.iter())
    }

    // until the first wrap the write cursor runs ahead of slot 0
    #[inline]
    fn oldest(&self) -> usize {
        if self.is_full() {
            self.cursor
        } else {
            0
        }
    }
}
