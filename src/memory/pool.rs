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
//! Size-bucketed aligned buffer pool (spec §4 C7).
//!
//! Buckets are powers of two from 64 to 16384 elements; each bucket is a
//! bounded `crossbeam_queue::ArrayQueue` of reusable 64-byte-aligned
//! buffers — the same lock-free bounded-queue crate the dependency stack
//! carries for the streaming ring buffer's backing allocator use case.
//! Every checkout is zeroed before the caller sees it, so a buffer that
//! previously held another signal never leaks old samples into a new
//! computation.

use crossbeam_queue::ArrayQueue;
use std::alloc::{Layout, alloc, dealloc, handle_alloc_error};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

const ALIGNMENT: usize = 64;
const BUCKET_SIZES: [usize; 9] = [64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384];

/// A heap buffer aligned to a 64-byte boundary — the granularity the SIMD
/// kernels in [`crate::simd`] want so loads never straddle a cache line
/// unnecessarily.
pub struct AlignedVec<T> {
    ptr: NonNull<T>,
    len: usize,
}

unsafe impl<T: Send> Send for AlignedVec<T> {}
unsafe impl<T: Send> Sync for AlignedVec<T> {}

impl<T: Copy + Default> AlignedVec<T> {
    fn layout_for(len: usize) -> Layout {
        Layout::from_size_align(len * std::mem::size_of::<T>(), ALIGNMENT)
            .expect("buffer size/alignment must be representable")
    }

    pub fn zeroed(len: usize) -> Self {
        if len == 0 {
            return Self {
                ptr: NonNull::dangling(),
                len: 0,
            };
        }
        let layout = Self::layout_for(len);
        let raw = unsafe { alloc(layout) } as *mut T;
        let Some(ptr) = NonNull::new(raw) else {
            handle_alloc_error(layout);
        };
        for i in 0..len {
            unsafe { ptr.as_ptr().add(i).write(T::default()) };
        }
        Self { ptr, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Resets every element to `T::default()` without reallocating.
    pub fn zero_fill(&mut self) {
        self.as_mut_slice().iter_mut().for_each(|x| *x = T::default());
    }
}

impl<T> Deref for AlignedVec<T> {
    type Target = [T];
    fn deref(&self) -> &[T] {
        if self.len == 0 {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
        }
    }
}

impl<T> DerefMut for AlignedVec<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        if self.len == 0 {
            &mut []
        } else {
            unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
        }
    }
}

impl<T> AlignedVec<T> {
    fn as_mut_slice(&mut self) -> &mut [T] {
        self.deref_mut()
    }
}

impl<T> Drop for AlignedVec<T> {
    fn drop(&mut self) {
        if self.len > 0 {
            let layout = Layout::from_size_align(self.len * std::mem::size_of::<T>(), ALIGNMENT)
                .expect("buffer size/alignment must be representable");
            unsafe { dealloc(self.ptr.as_ptr() as *mut u8, layout) };
        }
    }
}

/// A pool of aligned buffers bucketed by power-of-two size. Checkouts
/// return to their bucket automatically when the returned [`PooledBuffer`]
/// drops; if the bucket's queue is already full (bounded by
/// `queue_capacity_per_bucket`), the buffer is simply deallocated instead
/// of leaking or blocking.
pub struct MemoryPool<T> {
    buckets: Vec<(usize, ArrayQueue<AlignedVec<T>>)>,
}

impl<T: Copy + Default> MemoryPool<T> {
    pub fn new(queue_capacity_per_bucket: usize) -> Self {
        let buckets = BUCKET_SIZES
            .iter()
            .map(|&size| (size, ArrayQueue::new(queue_capacity_per_bucket)))
            .collect();
        Self { buckets }
    }

    fn bucket_index_for(&self, min_len: usize) -> Option<usize> {
        self.buckets.iter().position(|&(size, _)| size >= min_len)
    }

    /// Checks out a zeroed buffer of at least `min_len` elements. Requests
    /// larger than the largest bucket (16384) bypass the pool entirely and
    /// allocate directly — they are never recycled, matching the pool's
    /// role as a cache for the common small/medium sizes MODWT levels
    /// actually use.
    pub fn acquire(&self, min_len: usize) -> PooledBuffer<'_, T> {
        match self.bucket_index_for(min_len) {
            Some(bucket) => {
                let (size, queue) = &self.buckets[bucket];
                let mut buf = queue.pop().unwrap_or_else(|| AlignedVec::zeroed(*size));
                buf.zero_fill();
                PooledBuffer {
                    pool: Some(self),
                    bucket: Some(bucket),
                    data: Some(buf),
                }
            }
            None => PooledBuffer {
                pool: None,
                bucket: None,
                data: Some(AlignedVec::zeroed(min_len)),
            },
        }
    }

    /// Runs `f` with a scoped, zeroed buffer of at least `min_len`
    /// elements; the buffer returns to the pool as soon as `f` returns.
    pub fn with_buffer<R>(&self, min_len: usize, f: impl FnOnce(&mut [T]) -> R) -> R {
        let mut buffer = self.acquire(min_len);
        f(&mut buffer)
    }
}

/// RAII handle returned by [`MemoryPool::acquire`]. Dereferences to the
/// underlying buffer; returns it to the pool on drop.
pub struct PooledBuffer<'a, T: Copy + Default> {
    pool: Option<&'a MemoryPool<T>>,
    bucket: Option<usize>,
    data: Option<AlignedVec<T>>,
}

impl<'a, T: Copy + Default> Deref for PooledBuffer<'a, T> {
    type Target = [T];
    fn deref(&self) -> &[T] {
        self.data.as_ref().expect("buffer taken before drop")
    }
}

impl<'a, T: Copy + Default> DerefMut for PooledBuffer<'a, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.data.as_mut().expect("buffer taken before drop")
    }
}

impl<'a, T: Copy + Default> Drop for PooledBuffer<'a, T> {
    fn drop(&mut self) {
        if let (Some(pool), Some(bucket), Some(data)) = (self.pool, self.bucket, self.data.take()) {
            let (size, queue) = &pool.buckets[bucket];
            if queue.push(data).is_err() {
                log::debug!("memory pool bucket {size} is full, dropping returned buffer instead of recycling it");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquired_buffer_is_zeroed_and_at_least_requested_len() {
        let pool: MemoryPool<f64> = MemoryPool::new(4);
        let buf = pool.acquire(100);
        assert!(buf.len() >= 100);
        assert!(buf.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn buffer_recycles_through_bucket_queue() {
        let pool: MemoryPool<f64> = MemoryPool::new(4);
        {
            let mut buf = pool.acquire(64);
            buf[0] = 42.0;
        }
        let buf2 = pool.acquire(64);
        assert_eq!(buf2[0], 0.0, "recycled buffer must be re-zeroed");
    }

    #[test]
    fn oversized_request_bypasses_pooling() {
        let pool: MemoryPool<f64> = MemoryPool::new(4);
        let buf = pool.acquire(1_000_000);
        assert!(buf.len() >= 1_000_000);
    }

    #[test]
    fn with_buffer_scopes_checkout() {
        let pool: MemoryPool<f64> = MemoryPool::new(4);
        let sum: f64 = pool.with_buffer(16, |buf| {
            buf.iter_mut().enumerate().for_each(|(i, x)| *x = i as f64);
            buf.iter().sum()
        });
        assert_eq!(sum, (0..16).sum::<usize>() as f64);
    }
}
