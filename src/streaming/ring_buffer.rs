/*
 * // Copyright (c) Radzivon Bartoshyk 12/2025. All rights reserved.
 * //
 * // Redistribution and use in source and binary forms, with or without modification,
 * // are permitted provided that the following conditions are met:
 * //
 * // 1.  Redistributions of source code must retain the above copyright notice, this
 * // list of conditions and the following disclaimer.
 * //
 * // 2.  Redistributions in binary form must reproduce the above copyright notice,
 * // this list of conditions and the following disclaimer in the documentation
 * // and/or other materials provided with the distribution.
 * //
 * // 3.  Neither the name of the copyright holder nor the names of its
 * // contributors may be used to endorse or promote products derived from
 * // this software without specific prior written permission.
 * //
 * // THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * // AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * // IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * // DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * // FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * // DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * // SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * // CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * // OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * // OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */
//! Lock-free single-producer/single-consumer ring buffer (spec §4 C5).
//!
//! Two monotonically increasing atomic counters — `write_pos` and
//! `read_pos` — track how much has ever been written and consumed; the
//! physical index is always `pos & mask`. The producer only ever advances
//! `write_pos`, the consumer only ever advances `read_pos`, so the two
//! sides never contend on the same atomic, only observe each other's via
//! acquire/release, matching the teacher's `parking_lot`-free concurrency
//! style elsewhere in the crate (the teacher reaches for `OnceLock` for
//! one-shot init; this reaches for bare atomics because the ring buffer is
//! the one data structure in the crate that's on the hot streaming path
//! and must never block).

use crate::error::{ErrorContext, VectorWaveError};
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// A contiguous or staged view over `window_len` samples. Staged views copy
/// out of the ring because the window wrapped the physical buffer; direct
/// views borrow straight from it.
pub enum WindowView<'a, T> {
    Direct(&'a [T]),
    Staged(&'a [T]),
}

impl<'a, T> std::ops::Deref for WindowView<'a, T> {
    type Target = [T];
    fn deref(&self) -> &[T] {
        match self {
            WindowView::Direct(s) | WindowView::Staged(s) => s,
        }
    }
}

/// Lock-free SPSC ring of capacity `2^k`. `T` must be `Copy` so a slot can
/// be read without taking ownership away from the buffer.
pub struct RingBuffer<T> {
    capacity: usize,
    mask: usize,
    data: Box<[UnsafeCell<T>]>,
    write_pos: AtomicUsize,
    read_pos: AtomicUsize,
    /// Staging buffer for windows that wrap the physical end. Per the SPSC
    /// contract only the consumer thread ever calls `window_direct`, so no
    /// synchronization is needed around this allocation — it behaves like
    /// consumer-thread-local storage scoped to this buffer's lifetime
    /// rather than the whole thread's.
    staging: UnsafeCell<Vec<T>>,
}

// SAFETY: `write_pos`/`read_pos` gate all access to `data` and `staging`;
// the producer only touches indices `[read_pos, write_pos)` are never
// written concurrently by both sides because of the acquire/release
// handshake in `write`/`advance_window`.
unsafe impl<T: Send> Sync for RingBuffer<T> {}
unsafe impl<T: Send> Send for RingBuffer<T> {}

impl<T: Copy + Default> RingBuffer<T> {
    /// `capacity` must be a power of two (spec §4.6) so index wrapping is a
    /// mask instead of a modulo.
    pub fn with_capacity(capacity: usize) -> Result<Self, VectorWaveError> {
        if capacity == 0 || !capacity.is_power_of_two() {
            return Err(VectorWaveError::invalid_argument(
                ErrorContext::new("RingBuffer::with_capacity").with_sizes([capacity]),
                "capacity must be a nonzero power of two",
                "round up to the next power of two, e.g. 4096",
            ));
        }
        let data: Box<[UnsafeCell<T>]> = (0..capacity)
            .map(|_| UnsafeCell::new(T::default()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Ok(Self {
            capacity,
            mask: capacity - 1,
            data,
            write_pos: AtomicUsize::new(0),
            read_pos: AtomicUsize::new(0),
            staging: UnsafeCell::new(Vec::new()),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples currently buffered (written but not yet consumed).
    pub fn len(&self) -> usize {
        let w = self.write_pos.load(Ordering::Acquire);
        let r = self.read_pos.load(Ordering::Acquire);
        w - r
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn available_space(&self) -> usize {
        self.capacity - self.len()
    }

    /// Producer-only. Writes as many leading samples of `samples` as fit
    /// and returns the count actually written — callers that need
    /// guaranteed delivery should retry the remainder.
    pub fn write(&self, samples: &[T]) -> usize {
        let w = self.write_pos.load(Ordering::Relaxed);
        let r = self.read_pos.load(Ordering::Acquire);
        let space = self.capacity - (w - r);
        let n = samples.len().min(space);
        for (i, &sample) in samples.iter().take(n).enumerate() {
            let idx = (w + i) & self.mask;
            unsafe { *self.data[idx].get() = sample };
        }
        self.write_pos.store(w + n, Ordering::Release);
        n
    }

    /// Consumer-only. Returns the oldest `window_len` unconsumed samples —
    /// i.e. the `window_len`-sample slice starting at the current read
    /// position — without consuming them (spec §3 "streaming window view":
    /// offset = read). Call [`advance_window`](Self::advance_window) to
    /// slide the window forward by the hop size once it has been
    /// processed.
    pub fn window_direct(&self, window_len: usize) -> Result<WindowView<'_, T>, VectorWaveError> {
        let w = self.write_pos.load(Ordering::Acquire);
        let r = self.read_pos.load(Ordering::Acquire);
        if window_len == 0 {
            return Err(VectorWaveError::invalid_argument(
                ErrorContext::new("RingBuffer::window_direct"),
                "window_len must be > 0",
                "request at least one sample",
            ));
        }
        if window_len > w - r {
            return Err(VectorWaveError::state_error(
                ErrorContext::new("RingBuffer::window_direct").with_sizes([window_len, w - r]),
                "requested window is larger than the buffered data",
                "write more samples or request a shorter window",
            ));
        }
        let start = r;
        let start_idx = start & self.mask;
        if start_idx + window_len <= self.capacity {
            let ptr = self.data[start_idx].get() as *const T;
            let slice = unsafe { std::slice::from_raw_parts(ptr, window_len) };
            Ok(WindowView::Direct(slice))
        } else {
            let staging = unsafe { &mut *self.staging.get() };
            staging.clear();
            staging.reserve(window_len);
            for i in 0..window_len {
                let idx = (start + i) & self.mask;
                staging.push(unsafe { *self.data[idx].get() });
            }
            Ok(WindowView::Staged(staging.as_slice()))
        }
    }

    /// Consumer-only. Releases the oldest `n` samples, making room for the
    /// producer.
    pub fn advance_window(&self, n: usize) -> Result<(), VectorWaveError> {
        let w = self.write_pos.load(Ordering::Acquire);
        let r = self.read_pos.load(Ordering::Relaxed);
        if n > w - r {
            return Err(VectorWaveError::invalid_argument(
                ErrorContext::new("RingBuffer::advance_window").with_sizes([n, w - r]),
                "cannot advance past what has been written",
                "advance by at most `len()` samples",
            ));
        }
        self.read_pos.store(r + n, Ordering::Release);
        Ok(())
    }

    /// Releases the consumer-thread staging allocation. Call this when a
    /// consumer thread is done pulling from this buffer (e.g. before
    /// parking for a long idle period) to avoid holding onto a
    /// worst-case-sized scratch buffer indefinitely.
    pub fn cleanup_thread(&self) {
        let staging = unsafe { &mut *self.staging.get() };
        if !staging.is_empty() {
            log::debug!("releasing {}-element ring buffer staging allocation on thread exit", staging.len());
        }
        *staging = Vec::new();
    }

    /// Blocks the calling (consumer) thread with exponential backoff until
    /// at least `min_len` samples are buffered or `timeout` elapses.
    /// Returns `true` if the condition was met, `false` on timeout.
    pub fn wait_for_data(&self, min_len: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut backoff = Duration::from_micros(1);
        let max_backoff = Duration::from_millis(1);
        loop {
            if self.len() >= min_len {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::yield_now();
            std::thread::sleep(backoff.min(max_backoff));
            backoff *= 2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_and_window_round_trip() {
        let ring = RingBuffer::<f64>::with_capacity(16).unwrap();
        let written = ring.write(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(written, 4);
        let view = ring.window_direct(4).unwrap();
        assert_eq!(&*view, &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn window_wraps_and_uses_staging() {
        let ring = RingBuffer::<f64>::with_capacity(8).unwrap();
        ring.write(&[0.0; 6]);
        ring.advance_window(6).unwrap();
        ring.write(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let view = ring.window_direct(6).unwrap();
        assert_eq!(&*view, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn write_partially_fills_when_full() {
        let ring = RingBuffer::<f64>::with_capacity(4).unwrap();
        let written = ring.write(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(written, 4);
    }

    #[test]
    fn non_power_of_two_capacity_rejected() {
        assert!(RingBuffer::<f64>::with_capacity(10).is_err());
    }

    #[test]
    fn advance_past_written_is_rejected() {
        let ring = RingBuffer::<f64>::with_capacity(8).unwrap();
        ring.write(&[1.0, 2.0]);
        assert!(ring.advance_window(3).is_err());
    }
}
