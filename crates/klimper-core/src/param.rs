//! Lock-free parameter cells shared between the control and audio threads.
//!
//! An `f32` is stored as its bit pattern in an [`AtomicU32`]. A single store
//! or load is never torn, so the audio thread always sees either the old or the
//! new value. Related values that must change together are grouped behind a
//! [`Generation`] counter bumped after the writes.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::param_info::ParamDescriptor;

/// An `f32` that can be shared between threads without locks.
#[derive(Debug, Default)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    /// Creates a cell holding `value`.
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    /// Reads the current value.
    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Replaces the current value.
    #[inline]
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// An atomic value bound to its [`ParamDescriptor`].
///
/// Writes are clamped to the descriptor's range. Non-finite writes are ignored.
///
/// # Example
///
/// ```rust
/// use klimper_core::{AtomicParam, ParamDescriptor};
///
/// let volume = AtomicParam::new(ParamDescriptor::level("Volume", "Vol", 0.2));
/// volume.set(1.5);
/// assert_eq!(volume.get(), 1.0);
/// volume.reset();
/// assert_eq!(volume.get(), 0.2);
/// ```
#[derive(Debug)]
pub struct AtomicParam {
    value: AtomicF32,
    descriptor: ParamDescriptor,
}

impl AtomicParam {
    /// Creates a parameter holding the descriptor's default.
    pub fn new(descriptor: ParamDescriptor) -> Self {
        Self {
            value: AtomicF32::new(descriptor.clamp(descriptor.default)),
            descriptor,
        }
    }

    /// Creates a parameter holding `value` (clamped) instead of the default.
    pub fn with_value(descriptor: ParamDescriptor, value: f32) -> Self {
        let param = Self::new(descriptor);
        param.set(value);
        param
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> f32 {
        self.value.load()
    }

    /// Stores `value` clamped to the descriptor's range.
    #[inline]
    pub fn set(&self, value: f32) {
        if value.is_finite() {
            self.value.store(self.descriptor.clamp(value));
        }
    }

    /// Restores the descriptor's default.
    pub fn reset(&self) {
        self.set(self.descriptor.default);
    }

    /// The descriptor this parameter was created with.
    pub fn descriptor(&self) -> &ParamDescriptor {
        &self.descriptor
    }
}

/// Change counter for a group of parameters read together.
///
/// The writer stores every field, then calls [`bump`](Self::bump). The reader
/// compares [`current`](Self::current) against the last value it applied and
/// re-reads the group when they differ.
#[derive(Debug, Default)]
pub struct Generation(AtomicU32);

impl Generation {
    /// Creates a counter at zero.
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Marks the group as changed.
    #[inline]
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::Release);
    }

    /// Current counter value.
    #[inline]
    pub fn current(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }
}
