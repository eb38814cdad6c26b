//! Scoped object pool
//!
//! Nested parsers often need a scratch object per nesting level: an event
//! builder, a stack of attribute maps, a reusable line buffer. [`ScopedPool`]
//! hands them out in LIFO order. [`start`](ScopedPool::start) activates an
//! object and [`end`](ScopedPool::end) deactivates the most recent one,
//! returning it to the free list so the next `start` reuses it instead of
//! allocating.
//!
//! ```rust
//! use tracescan::ScopedPool;
//!
//! let mut pool = ScopedPool::with_reset(Vec::<u32>::new, |v: &mut Vec<u32>| v.clear());
//! pool.start(|outer| outer.push(1));
//! pool.start(|inner| inner.push(2));
//! assert_eq!(pool.end(|inner| inner.iter().sum::<u32>()), Some(2));
//! assert_eq!(pool.end(|outer| outer.len()), Some(1));
//! assert_eq!(pool.allocated(), 2);
//! ```

use std::fmt;

/// Creates a new pooled object
type Factory<T> = Box<dyn FnMut() -> T>;

/// Restores a released object to a reusable state
type Reset<T> = Box<dyn FnMut(&mut T)>;

/// LIFO pool of reusable objects
pub struct ScopedPool<T> {
    /// Every object ever created; indices are stable
    slots: Vec<T>,
    /// Active slots, innermost last
    active: Vec<usize>,
    /// Released slots ready for reuse
    free: Vec<usize>,
    factory: Factory<T>,
    reset: Option<Reset<T>>,
}

impl<T> ScopedPool<T> {
    /// A pool that creates objects with `factory`
    ///
    /// Released objects are reused as they are; the `init` closure passed
    /// to [`start`](Self::start) is responsible for preparing them.
    pub fn new<F>(factory: F) -> Self
    where
        F: FnMut() -> T + 'static,
    {
        Self {
            slots: Vec::new(),
            active: Vec::new(),
            free: Vec::new(),
            factory: Box::new(factory),
            reset: None,
        }
    }

    /// A pool that runs `reset` on every object it takes back
    pub fn with_reset<F, R>(factory: F, reset: R) -> Self
    where
        F: FnMut() -> T + 'static,
        R: FnMut(&mut T) + 'static,
    {
        let mut pool = Self::new(factory);
        pool.reset = Some(Box::new(reset));
        pool
    }

    /// Activate an object, run `init` on it, and make it current
    ///
    /// Returns the object's slot index.
    pub fn start<I: FnOnce(&mut T)>(&mut self, init: I) -> usize {
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push((self.factory)());
                self.slots.len() - 1
            }
        };
        self.active.push(slot);
        init(&mut self.slots[slot]);
        slot
    }

    /// Deactivate the current object, passing it to `finish` first
    ///
    /// Returns `finish`'s result, or `None` when nothing is active.
    pub fn end<R, F: FnOnce(&mut T) -> R>(&mut self, finish: F) -> Option<R> {
        let slot = self.active.pop()?;
        let result = finish(&mut self.slots[slot]);
        self.release(slot);
        Some(result)
    }

    fn release(&mut self, slot: usize) {
        if let Some(reset) = self.reset.as_mut() {
            reset(&mut self.slots[slot]);
        }
        self.free.push(slot);
    }

    /// The innermost active object
    #[inline]
    pub fn current(&self) -> Option<&T> {
        self.active.last().map(|&slot| &self.slots[slot])
    }

    #[inline]
    pub fn current_mut(&mut self) -> Option<&mut T> {
        let slot = *self.active.last()?;
        Some(&mut self.slots[slot])
    }

    /// Active objects from outermost to innermost
    pub fn active(&self) -> impl Iterator<Item = &T> + '_ {
        self.active.iter().map(|&slot| &self.slots[slot])
    }

    /// Number of active objects
    #[inline]
    pub fn depth(&self) -> usize {
        self.active.len()
    }

    /// Number of objects created so far
    #[inline]
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }

    /// Whether no object is active
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Deactivate every active object, innermost first
    ///
    /// Objects stay allocated for reuse.
    pub fn clear(&mut self) {
        while let Some(slot) = self.active.pop() {
            self.release(slot);
        }
    }
}

impl<T> fmt::Debug for ScopedPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedPool")
            .field("depth", &self.depth())
            .field("allocated", &self.allocated())
            .field("free", &self.free.len())
            .finish()
    }
}
