//! Pool of temporary color targets with scoped acquisition.
//!
//! Passes borrow temporaries for the duration of one camera's processing.
//! A [`TemporaryTarget`] hands its storage back to the [`TargetPool`] when
//! dropped, so every exit path (early skip, error, success) releases it.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::color::ColorBuffer;

/// Size of a temporary target. Single-sampled, no depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub width: u32,
    pub height: u32,
}

impl TargetDescriptor {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Descriptor matching an existing buffer.
    pub fn matching(buffer: &ColorBuffer) -> Self {
        let (width, height) = buffer.dimensions();
        Self { width, height }
    }
}

/// Host-owned pool of reusable color storage.
pub struct TargetPool {
    free: Mutex<Vec<Vec<[f32; 4]>>>,
    in_use: AtomicUsize,
    total_allocated: AtomicUsize,
}

impl TargetPool {
    /// Create a new empty pool.
    pub fn new() -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            in_use: AtomicUsize::new(0),
            total_allocated: AtomicUsize::new(0),
        }
    }

    /// Acquire a cleared target of the given size.
    ///
    /// Returns pooled storage if available, or allocates a new buffer.
    pub fn acquire(&self, desc: TargetDescriptor, label: &'static str) -> TemporaryTarget<'_> {
        let pooled = self
            .free
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop();

        let buffer = match pooled {
            Some(storage) => {
                let mut buffer = ColorBuffer::from_storage(storage);
                buffer.reset(desc.width, desc.height);
                buffer
            }
            None => {
                self.total_allocated.fetch_add(1, Ordering::Relaxed);
                ColorBuffer::new(desc.width, desc.height)
            }
        };
        self.in_use.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(label, width = desc.width, height = desc.height, "acquired temporary target");

        TemporaryTarget {
            pool: self,
            buffer,
            label,
        }
    }

    /// Number of temporaries currently checked out.
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Relaxed)
    }

    /// Number of free buffers waiting for reuse.
    pub fn free_count(&self) -> usize {
        self.free
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Total buffers ever allocated by this pool.
    pub fn total_allocated(&self) -> usize {
        self.total_allocated.load(Ordering::Relaxed)
    }

    fn release(&self, buffer: ColorBuffer, label: &'static str) {
        tracing::trace!(label, "released temporary target");
        self.free
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(buffer.into_storage());
        self.in_use.fetch_sub(1, Ordering::Relaxed);
    }
}

impl Default for TargetPool {
    fn default() -> Self {
        Self::new()
    }
}

/// A temporary target borrowed from a [`TargetPool`].
pub struct TemporaryTarget<'a> {
    pool: &'a TargetPool,
    buffer: ColorBuffer,
    label: &'static str,
}

impl TemporaryTarget<'_> {
    /// Name the target was acquired under.
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl Deref for TemporaryTarget<'_> {
    type Target = ColorBuffer;

    fn deref(&self) -> &ColorBuffer {
        &self.buffer
    }
}

impl DerefMut for TemporaryTarget<'_> {
    fn deref_mut(&mut self) -> &mut ColorBuffer {
        &mut self.buffer
    }
}

impl Drop for TemporaryTarget<'_> {
    fn drop(&mut self) {
        // An empty buffer holds no allocation.
        let buffer = std::mem::replace(&mut self.buffer, ColorBuffer::new(0, 0));
        self.pool.release(buffer, self.label);
    }
}
