//! # Write-Once Cell

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicU8, Ordering};

const EMPTY: u8 = 0;
const WRITING: u8 = 1;
const READY: u8 = 2;

/// A cell that is filled at most once during boot and read from anywhere
/// afterwards, including the panic handler.
///
/// Unlike a lazily initialized cell, readers never wait: a value is either
/// published or absent.
pub struct BootCell<T> {
    state: AtomicU8,
    value: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Default for BootCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BootCell<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(EMPTY),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// Publishes `value`.
    ///
    /// # Errors
    /// Hands `value` back if the cell was already filled or is being filled.
    pub fn set(&self, value: T) -> Result<(), T> {
        if self
            .state
            .compare_exchange(EMPTY, WRITING, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(value);
        }

        // SAFETY: the WRITING state grants exclusive access to the slot.
        unsafe { (*self.value.get()).write(value) };
        self.state.store(READY, Ordering::Release);
        Ok(())
    }

    #[must_use]
    pub fn get(&self) -> Option<&T> {
        if self.state.load(Ordering::Acquire) == READY {
            // SAFETY: READY is only stored after the write completed.
            Some(unsafe { (*self.value.get()).assume_init_ref() })
        } else {
            None
        }
    }
}

impl<T> Drop for BootCell<T> {
    fn drop(&mut self) {
        if *self.state.get_mut() == READY {
            // SAFETY: READY means the slot holds an initialized value.
            unsafe { self.value.get_mut().assume_init_drop() };
        }
    }
}

// SAFETY: the value is written once before READY is published, then only shared.
unsafe impl<T: Send + Sync> Sync for BootCell<T> {}
unsafe impl<T: Send> Send for BootCell<T> {}
