//! History buffer - fixed-capacity ring indexed by "ticks ago"

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rolling log of the last `capacity` values, newest first.
///
/// Index 0 is the most recent push, index 1 the one before it, and so on.
/// Once full, each push overwrites the oldest slot in place; nothing is
/// shifted or reallocated.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistoryBuffer<T> {
    /// Backing slots, at most `capacity` long.
    slots: Vec<T>,

    /// Maximum number of retained values.
    capacity: usize,

    /// Slot holding the newest value.
    write_head: usize,

    /// Total pushes since creation or the last clear.
    push_count: u64,
}

impl<T> HistoryBuffer<T> {
    /// Create an empty buffer. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            write_head: 0,
            push_count: 0,
        }
    }

    // =========================================================================
    // WRITING
    // =========================================================================

    /// Record a new value as index 0. Returns the evicted oldest value once
    /// the buffer is full.
    pub fn push(&mut self, value: T) -> Option<T> {
        self.push_count += 1;
        if self.slots.len() < self.capacity {
            self.slots.push(value);
            self.write_head = self.slots.len() - 1;
            return None;
        }
        self.write_head = (self.write_head + 1) % self.capacity;
        Some(std::mem::replace(&mut self.slots[self.write_head], value))
    }

    /// Drop every value.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.write_head = 0;
        self.push_count = 0;
    }

    // =========================================================================
    // READING
    // =========================================================================

    /// Value recorded `ticks_ago` pushes back.
    pub fn get(&self, ticks_ago: usize) -> Option<&T> {
        let len = self.slots.len();
        if ticks_ago >= len {
            return None;
        }
        Some(&self.slots[(self.write_head + len - ticks_ago) % len])
    }

    pub fn newest(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn oldest(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Iterate newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get write head position.
    pub fn write_head(&self) -> usize {
        self.write_head
    }

    /// Total pushes since creation or the last clear.
    pub fn push_count(&self) -> u64 {
        self.push_count
    }
}

impl<T: Clone> HistoryBuffer<T> {
    /// Create a full buffer where every slot holds `value`.
    pub fn filled(capacity: usize, value: T) -> Self {
        let mut buffer = Self::new(capacity);
        buffer.refill(value);
        buffer
    }

    /// Replace the contents with `capacity` copies of `value`.
    pub fn refill(&mut self, value: T) {
        self.slots.clear();
        self.slots.resize(self.capacity, value);
        self.write_head = self.capacity - 1;
        self.push_count = 0;
    }
}

/// Buffers are equal when they hold the same values in the same order.
/// Slot layout and push count are ignored.
impl<T: PartialEq> PartialEq for HistoryBuffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.capacity == other.capacity && self.iter().eq(other.iter())
    }
}

impl HistoryBuffer<f32> {
    /// Largest recorded value, or 0 when empty.
    pub fn max(&self) -> f32 {
        self.slots.iter().copied().fold(0.0f32, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first_indexing() {
        let mut buffer = HistoryBuffer::new(3);
        buffer.push(1);
        buffer.push(2);

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.get(0), Some(&2));
        assert_eq!(buffer.get(1), Some(&1));
        assert_eq!(buffer.get(2), None);
        assert_eq!(buffer.oldest(), Some(&1));
    }

    #[test]
    fn test_ring_buffer_wrap() {
        let mut buffer = HistoryBuffer::new(3);

        // Write 5 values (should wrap around)
        let evicted: Vec<_> = (1..=5).filter_map(|i| buffer.push(i)).collect();

        assert_eq!(evicted, vec![1, 2]);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![5, 4, 3]);
        assert_eq!(buffer.push_count(), 5);
    }

    #[test]
    fn test_filled_then_push() {
        let mut buffer = HistoryBuffer::filled(4, 0.0f32);
        assert!(buffer.is_full());

        buffer.push(1.5);
        assert_eq!(buffer.newest(), Some(&1.5));
        assert_eq!(buffer.oldest(), Some(&0.0));
        assert_eq!(buffer.len(), 4);
        assert!((buffer.max() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_capacity_raised() {
        let mut buffer = HistoryBuffer::new(0);
        buffer.push('a');
        buffer.push('b');
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.iter().collect::<Vec<_>>(), vec![&'b']);
    }

    #[test]
    fn test_equality_ignores_slot_layout() {
        let mut wrapped = HistoryBuffer::new(3);
        for i in 1..=4 {
            wrapped.push(i);
        }
        let mut fresh = HistoryBuffer::new(3);
        for i in 2..=4 {
            fresh.push(i);
        }

        assert_ne!(wrapped.write_head(), fresh.write_head());
        assert_ne!(wrapped.push_count(), fresh.push_count());
        assert_eq!(wrapped, fresh);

        fresh.push(5);
        assert_ne!(wrapped, fresh);
        assert_ne!(HistoryBuffer::<i32>::new(2), HistoryBuffer::new(3));
    }

    #[test]
    fn test_clear() {
        let mut buffer = HistoryBuffer::filled(2, 7u8);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.newest(), None);
    }
}
