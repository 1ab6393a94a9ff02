//! Nearest-first traversal needs the node with the smallest entry
//! distance next. **BBoxPriorityQueue** is a binary min-heap stored
//! in a growable array, using the classic 1-based index arithmetic
//! (the children of element `i` are `2*i` and `2*i+1`).
//!
//! A queue belongs to exactly one render thread and is reused for
//! every ray that thread traces: **clear** forgets the entries but
//! keeps the storage.
//!
//! ```rust
//! use rs_slabs::accelerators::priority_queue::BBoxPriorityQueue;
//!
//!     let mut queue: BBoxPriorityQueue<char> = BBoxPriorityQueue::new();
//!     queue.insert(3.0, 'c');
//!     queue.insert(-1.0, 'a');
//!     queue.insert(2.0, 'b');
//!     assert_eq!(queue.remove_min(), (-1.0, 'a'));
//!     assert_eq!(queue.remove_min(), (2.0, 'b'));
//!     assert_eq!(queue.len(), 1);
//! ```

// slabs
use crate::core::slabs::Float;

pub const INITIAL_PRIORITY_QUEUE_SIZE: usize = 256;
pub const MAX_PRIORITY_QUEUE_SIZE: usize = (i32::MAX / 2) as usize;

/// Position of the root in the 1-based heap layout.
const BBQ_FIRST_ELEMENT: usize = 1;

#[derive(Debug, Copy, Clone)]
struct QElem<T> {
    depth: Float,
    node: T,
}

#[derive(Debug, Clone)]
pub struct BBoxPriorityQueue<T: Copy> {
    queue: Vec<QElem<T>>,
    capacity: usize,
    max_size: usize,
}

impl<T: Copy> Default for BBoxPriorityQueue<T> {
    fn default() -> Self {
        BBoxPriorityQueue::new()
    }
}

impl<T: Copy> BBoxPriorityQueue<T> {
    pub fn new() -> Self {
        BBoxPriorityQueue::with_limits(INITIAL_PRIORITY_QUEUE_SIZE, MAX_PRIORITY_QUEUE_SIZE)
    }
    /// A queue with a custom initial capacity and size ceiling.
    pub fn with_limits(initial_size: usize, max_size: usize) -> Self {
        let capacity: usize = initial_size.max(1).min(max_size);
        BBoxPriorityQueue {
            queue: Vec::with_capacity(capacity),
            capacity,
            max_size,
        }
    }
    pub fn len(&self) -> usize {
        self.queue.len()
    }
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
    /// Number of entries the queue can hold before it has to grow.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    pub fn clear(&mut self) {
        self.queue.clear();
    }
    /// Insert *node* with key *depth*, sifting it up past every parent
    /// with a larger key.
    pub fn insert(&mut self, depth: Float, node: T) {
        if self.queue.len() == self.capacity {
            self.grow();
        }
        // the new element starts out in the (1-based) slot after the last one
        let mut i: usize = self.queue.len() + BBQ_FIRST_ELEMENT;
        self.queue.push(QElem { depth, node });
        while i > BBQ_FIRST_ELEMENT && depth < self.at(i / 2).depth {
            let parent: QElem<T> = *self.at(i / 2);
            *self.at_mut(i) = parent;
            i /= 2;
        }
        *self.at_mut(i) = QElem { depth, node };
    }
    /// Remove the entry with the smallest key. Calling this on an empty
    /// queue is a bug in the caller.
    pub fn remove_min(&mut self) -> (Float, T) {
        let size: usize = self.queue.len();
        assert!(size > 0, "remove_min() called on an empty BBoxPriorityQueue");
        let min: QElem<T> = *self.at(BBQ_FIRST_ELEMENT);
        let last: QElem<T> = *self.at(size);
        let mut i: usize = BBQ_FIRST_ELEMENT;
        while i <= size / 2 {
            let j: usize = if 2 * i == size || self.at(2 * i).depth < self.at(2 * i + 1).depth {
                2 * i
            } else {
                2 * i + 1
            };
            if last.depth <= self.at(j).depth {
                break;
            }
            let child: QElem<T> = *self.at(j);
            *self.at_mut(i) = child;
            i = j;
        }
        if i != size {
            *self.at_mut(i) = last;
        }
        self.queue.pop();
        (min.depth, min.node)
    }
    fn grow(&mut self) {
        let new_capacity: usize = self.capacity * 2;
        if new_capacity > self.max_size {
            panic!(
                "BBoxPriorityQueue overflow: {} entries exceed the limit of {}",
                new_capacity, self.max_size
            );
        }
        self.queue.reserve_exact(new_capacity - self.queue.len());
        self.capacity = new_capacity;
    }
    fn at(&self, i: usize) -> &QElem<T> {
        &self.queue[i - BBQ_FIRST_ELEMENT]
    }
    fn at_mut(&mut self, i: usize) -> &mut QElem<T> {
        &mut self.queue[i - BBQ_FIRST_ELEMENT]
    }
}
