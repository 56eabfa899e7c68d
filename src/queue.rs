//! Ring buffer with an offset permutation (spec section 3, 9). Shared shape
//! between the base-observation queue and each hypothesis's stats queue:
//! storage is pre-allocated once and reused by rotating a permutation vector
//! instead of reallocating or shifting elements.

/// A fixed-capacity ring buffer indexed head-newest externally while storing
/// elements tail-newest internally, exactly mirroring
/// `rtk_stats_queue_t`/`rtk_queue_t` from the source.
#[derive(Debug, Clone)]
pub struct RingQueue<T> {
    storage: Vec<T>,
    /// `offset[i]` is the storage slot holding logical position `i`, where
    /// logical position 0 is the oldest and `length - 1` is the newest.
    offset: Vec<usize>,
    length: usize,
    capacity: usize,
}

impl<T: Default + Clone> RingQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            storage: vec![T::default(); capacity],
            offset: (0..capacity).collect(),
            length: 0,
            capacity,
        }
    }
}

impl<T> RingQueue<T> {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn clear(&mut self) {
        self.length = 0;
    }

    /// Invariant check: `offset` is a permutation of `0..capacity`,
    /// `length <= capacity` (spec section 3, 8).
    pub fn is_valid(&self) -> bool {
        if self.length > self.capacity || self.offset.len() != self.capacity {
            return false;
        }
        let mut seen = vec![false; self.capacity];
        for &o in &self.offset {
            if o >= self.capacity || seen[o] {
                return false;
            }
            seen[o] = true;
        }
        true
    }

    /// Appends `value`, evicting the oldest element (FIFO) when at capacity
    /// (spec 4.1, 7: "resource exhaustion ... oldest element evicted, never
    /// fails").
    pub fn push(&mut self, value: T) {
        if self.length < self.capacity {
            let slot = self.offset[self.length];
            self.storage[slot] = value;
            self.length += 1;
        } else {
            // Evict logical position 0 (oldest): rotate its storage slot to
            // the tail of the permutation and overwrite it.
            let slot = self.offset.remove(0);
            self.storage[slot] = value;
            self.offset.push(slot);
        }
    }

    /// Truncates the queue to retain only the oldest `new_len` elements.
    pub fn truncate(&mut self, new_len: usize) {
        self.length = new_len.min(self.length);
    }

    /// Logical position `i`, `0` = oldest, `len() - 1` = newest.
    pub fn get(&self, i: usize) -> Option<&T> {
        if i >= self.length {
            return None;
        }
        Some(&self.storage[self.offset[i]])
    }

    /// Head-newest accessor: `get_from_head(0)` is the most recent entry,
    /// matching `get_stats(index_from_head)` in spec 4.3 (`storage index =
    /// length - 1 - i`).
    pub fn get_from_head(&self, index_from_head: usize) -> Option<&T> {
        if index_from_head >= self.length {
            return None;
        }
        self.get(self.length - 1 - index_from_head)
    }

    pub fn last(&self) -> Option<&T> {
        self.get_from_head(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        (0..self.length).map(move |i| self.get(i).unwrap())
    }
}

impl<T: Clone> RingQueue<T> {
    /// Replaces this queue's contents with `src`'s oldest `up_to` elements,
    /// used by `copy_stats_history` (spec 4.3, 4.4).
    pub fn copy_prefix_from(&mut self, src: &RingQueue<T>, up_to: usize) {
        let n = up_to.min(src.length).min(self.capacity);
        self.length = 0;
        for i in 0..n {
            self.push(src.get(i).unwrap().clone());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fresh_queue_is_valid_and_empty() {
        let q: RingQueue<u32> = RingQueue::new(4);
        assert!(q.is_valid());
        assert!(q.is_empty());
        assert_eq!(q.len(), 0);
    }

    #[test]
    fn push_preserves_fifo_order_under_eviction() {
        let mut q: RingQueue<u32> = RingQueue::new(3);
        for v in 0..5 {
            q.push(v);
            assert!(q.is_valid());
        }
        assert_eq!(q.len(), 3);
        // oldest two (0, 1) evicted; remaining 2, 3, 4 in order
        assert_eq!(q.get(0).copied(), Some(2));
        assert_eq!(q.get(1).copied(), Some(3));
        assert_eq!(q.get(2).copied(), Some(4));
        assert_eq!(q.get_from_head(0).copied(), Some(4));
        assert_eq!(q.get_from_head(2).copied(), Some(2));
        assert_eq!(q.get_from_head(3), None);
    }

    #[test]
    fn copy_prefix_from_truncates_to_second_most_recent() {
        let mut src: RingQueue<u32> = RingQueue::new(5);
        for v in 0..5 {
            src.push(v);
        }
        let mut dst: RingQueue<u32> = RingQueue::new(5);
        dst.copy_prefix_from(&src, src.len() - 1);
        assert_eq!(dst.len(), 4);
        assert_eq!(dst.get_from_head(0).copied(), Some(3));
    }
}
