//! A fixed-capacity overwriting ring buffer.

/// A circular buffer that overwrites its oldest element once full.
///
/// Not synchronized; wrap it in a lock for shared use.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Vec<T>,
    head: usize,
    pushed: usize,
}

impl<T: Default + Clone> RingBuffer<T> {
    /// Create a buffer holding at most `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `capacity < 2`; a one-slot ring degenerates to a cell.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "ring buffer capacity must be at least 2");
        RingBuffer {
            slots: vec![T::default(); capacity],
            head: 0,
            pushed: 0,
        }
    }

    /// Copy the contents of `other` into a new buffer of a different
    /// capacity, keeping the newest elements when shrinking.
    pub fn resized(other: &RingBuffer<T>, capacity: usize) -> Self {
        let mut buffer = RingBuffer::new(capacity);
        let skip = other.len().saturating_sub(capacity);
        for item in other.iter().skip(skip) {
            buffer.push(item.clone());
        }
        buffer
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live elements, at most the capacity.
    pub fn len(&self) -> usize {
        self.pushed.min(self.slots.len())
    }

    pub fn is_empty(&self) -> bool {
        self.pushed == 0
    }

    /// Append an element, overwriting the oldest one when full.
    pub fn push(&mut self, item: T) {
        self.slots[self.head] = item;
        self.head = (self.head + 1) % self.slots.len();
        self.pushed += 1;
    }

    /// The most recently pushed element.
    pub fn latest(&self) -> Option<&T> {
        if self.pushed == 0 {
            return None;
        }
        let i = (self.head + self.slots.len() - 1) % self.slots.len();
        Some(&self.slots[i])
    }

    /// The element `index` positions from the oldest, or `None` past the
    /// live range.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }
        Some(&self.slots[(self.start() + index) % self.slots.len()])
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let start = self.start();
        let cap = self.slots.len();
        (0..self.len()).map(move |i| &self.slots[(start + i) % cap])
    }

    fn start(&self) -> usize {
        if self.pushed >= self.slots.len() {
            self.head
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_in_order() {
        let mut ring = RingBuffer::new(4);
        ring.push(1);
        ring.push(2);
        ring.push(3);

        assert_eq!(ring.len(), 3);
        assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(ring.latest(), Some(&3));
        assert_eq!(ring.get(0), Some(&1));
        assert_eq!(ring.get(3), None);
    }

    #[test]
    fn test_overwrites_oldest_when_full() {
        let mut ring = RingBuffer::new(3);
        for i in 1..=5 {
            ring.push(i);
        }

        assert_eq!(ring.len(), 3);
        assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(ring.latest(), Some(&5));
        assert_eq!(ring.get(0), Some(&3));
    }

    #[test]
    fn test_empty_buffer() {
        let ring: RingBuffer<i32> = RingBuffer::new(2);
        assert!(ring.is_empty());
        assert_eq!(ring.latest(), None);
        assert_eq!(ring.get(0), None);
    }

    #[test]
    fn test_resized_keeps_newest_when_shrinking() {
        let mut ring = RingBuffer::new(5);
        for i in 1..=5 {
            ring.push(i);
        }

        let shrunk = RingBuffer::resized(&ring, 3);
        assert_eq!(shrunk.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5]);

        let grown = RingBuffer::resized(&ring, 8);
        assert_eq!(grown.len(), 5);
        assert_eq!(grown.get(0), Some(&1));
    }

    #[test]
    #[should_panic(expected = "at least 2")]
    fn test_capacity_of_one_panics() {
        let _ = RingBuffer::<i32>::new(1);
    }
}
