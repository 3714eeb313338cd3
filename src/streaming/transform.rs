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
//! Block-wise streaming MODWT over a [`RingBuffer`] (spec §4 C6).
//!
//! Configured with (wavelet, levels, boundary, block_size, overlap_ratio,
//! buffer_multiplier) per spec §4.6: successive windows overlap by
//! `overlap_ratio` and advance by `hop = block_size * (1 - overlap_ratio)`,
//! rounded to at least one sample. `close` is idempotent: the first call
//! runs `flush` exactly once via a one-shot compare-and-set and returns its
//! result; every later call is a harmless no-op returning `Ok(None)`.

use crate::error::{ErrorContext, VectorWaveError};
use crate::modwt::multilevel::{self, Decomposition};
use crate::modwt::single::Boundary;
use crate::sample::WaveSample;
use crate::streaming::ring_buffer::RingBuffer;
use crate::wavelet::Wavelet;
use std::sync::atomic::{AtomicBool, Ordering};

/// Hard ceiling from spec §4.6's overflow guard: `(block_size +
/// overlap_size) * 8` bytes must not exceed 100 MiB.
const MAX_BUFFER_BYTES: usize = 100 * 1024 * 1024;

pub struct StreamingTransform<T: WaveSample> {
    wavelet: Wavelet<T>,
    levels: usize,
    block_size: usize,
    hop: usize,
    boundary: Boundary,
    ring: RingBuffer<T>,
    closed: AtomicBool,
}

impl<T: WaveSample> StreamingTransform<T> {
    /// Validates every constructor rule in spec §4.6 before any data flows:
    /// `block_size >= filter_length`, `hop >= 1`, the 100 MiB allocation
    /// guard, the signed-32-bit overflow guard, and that `levels` is
    /// achievable on a `block_size`-sample window.
    pub fn new(
        wavelet: Wavelet<T>,
        levels: usize,
        boundary: Boundary,
        block_size: usize,
        overlap_ratio: f64,
        buffer_multiplier: usize,
    ) -> Result<Self, VectorWaveError> {
        if block_size == 0 || block_size < wavelet.len() {
            return Err(VectorWaveError::invalid_configuration(
                ErrorContext::new("StreamingTransform::new")
                    .with_wavelet(wavelet.id)
                    .with_sizes([block_size, wavelet.len()]),
                format!("block_size={block_size} must be >= filter_length={}", wavelet.len()),
                "choose a block size at least as long as the wavelet's filter",
            ));
        }
        if !(0.0..1.0).contains(&overlap_ratio) {
            return Err(VectorWaveError::invalid_configuration(
                ErrorContext::new("StreamingTransform::new"),
                format!("overlap_ratio={overlap_ratio} must be in [0.0, 1.0)"),
                "pick a ratio in [0.0, 1.0), e.g. 0.5 for 50% overlap",
            ));
        }
        if buffer_multiplier < 2 {
            return Err(VectorWaveError::invalid_configuration(
                ErrorContext::new("StreamingTransform::new").with_sizes([buffer_multiplier]),
                "buffer_multiplier must be >= 2",
                "the ring must hold at least two blocks to absorb streaming jitter",
            ));
        }
        let overlap_size = (block_size as f64 * overlap_ratio).round() as usize;
        if overlap_size >= block_size {
            return Err(VectorWaveError::invalid_configuration(
                ErrorContext::new("StreamingTransform::new").with_sizes([block_size, overlap_size]),
                "overlap_size must be strictly less than block_size so hop >= 1",
                "lower overlap_ratio",
            ));
        }
        let hop = block_size - overlap_size;
        let combined = block_size
            .checked_add(overlap_size)
            .ok_or_else(|| {
                VectorWaveError::invalid_configuration(
                    ErrorContext::new("StreamingTransform::new"),
                    "block_size + overlap_size overflows",
                    "lower block_size or overlap_ratio",
                )
            })?;
        if combined > i32::MAX as usize {
            return Err(VectorWaveError::invalid_configuration(
                ErrorContext::new("StreamingTransform::new").with_sizes([combined]),
                "block_size + overlap_size overflows a signed 32-bit counter",
                "lower block_size or overlap_ratio",
            ));
        }
        if combined.saturating_mul(std::mem::size_of::<T>()) > MAX_BUFFER_BYTES {
            return Err(VectorWaveError::invalid_configuration(
                ErrorContext::new("StreamingTransform::new").with_sizes([combined]),
                "(block_size + overlap_size) * sample size exceeds the 100 MiB guard",
                "lower block_size or buffer_multiplier",
            ));
        }
        let max_levels = multilevel::max_level(block_size, wavelet.len(), multilevel::DEFAULT_MAX_LEVEL);
        if levels == 0 || levels > max_levels {
            return Err(VectorWaveError::invalid_configuration(
                ErrorContext::new("StreamingTransform::new")
                    .with_wavelet(wavelet.id)
                    .with_sizes([block_size, levels, max_levels]),
                format!("levels={levels} is not achievable with block_size={block_size} (max {max_levels})"),
                "increase block_size or lower levels",
            ));
        }
        let ring_capacity = (block_size * buffer_multiplier).next_power_of_two();
        let ring = RingBuffer::with_capacity(ring_capacity)?;
        Ok(Self {
            wavelet,
            levels,
            block_size,
            hop,
            boundary,
            ring,
            closed: AtomicBool::new(false),
        })
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    fn check_open(&self, operation: &'static str) -> Result<(), VectorWaveError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(VectorWaveError::state_error(
                ErrorContext::new(operation),
                "transform is closed",
                "create a new StreamingTransform to process more data",
            ));
        }
        Ok(())
    }

    /// Pushes samples into the backing ring buffer; returns how many were
    /// accepted (fewer than `samples.len()` if the ring is full). A short
    /// write is logged, not an error — spec §4.5 treats it as backpressure
    /// the caller retries, not a failure.
    pub fn push(&self, samples: &[T]) -> Result<usize, VectorWaveError> {
        self.check_open("StreamingTransform::push")?;
        let accepted = self.ring.write(samples);
        if accepted < samples.len() {
            log::warn!(
                "streaming ring buffer backpressure: accepted {accepted}/{} samples, caller must retry the remainder",
                samples.len(),
            );
        }
        Ok(accepted)
    }

    /// Decomposes the oldest `block_size` samples if a full block is
    /// buffered, then advances the window by `hop` (not `block_size`) so
    /// consecutive blocks overlap by `overlap_ratio`. Returns `None` if less
    /// than a full block is available yet.
    pub fn try_process_block(&self) -> Result<Option<Decomposition<T>>, VectorWaveError> {
        self.check_open("StreamingTransform::try_process_block")?;
        if self.ring.len() < self.block_size {
            return Ok(None);
        }
        let view = self.ring.window_direct(self.block_size)?;
        let cache = T::global_filter_cache();
        let decomposition = multilevel::decompose(&view, &self.wavelet, self.levels, self.boundary, cache)?;
        self.ring.advance_window(self.hop)?;
        Ok(Some(decomposition))
    }

    fn flush_internal(&self) -> Result<Option<Decomposition<T>>, VectorWaveError> {
        let remaining = self.ring.len();
        if remaining == 0 {
            return Ok(None);
        }
        let view = self.ring.window_direct(remaining)?;
        let mut padded: Vec<T> = view.to_vec();
        self.ring.advance_window(remaining)?;
        if padded.len() < self.block_size {
            padded.resize(self.block_size, T::zero());
        }
        let cache = T::global_filter_cache();
        let decomposition = multilevel::decompose(&padded, &self.wavelet, self.levels, self.boundary, cache)?;
        Ok(Some(decomposition))
    }

    /// Decomposes whatever remains in the ring, zero-padded up to
    /// `block_size` if shorter (spec §4.6 end-of-stream partial block).
    /// Returns `None` if the ring is empty. Does not close the transform.
    pub fn flush(&self) -> Result<Option<Decomposition<T>>, VectorWaveError> {
        self.check_open("StreamingTransform::flush")?;
        self.flush_internal()
    }

    /// Idempotent close (spec §4.6): the first caller to win the
    /// compare-and-set runs `flush` and returns its result; every later call
    /// observes the flag already set and returns `Ok(None)` without
    /// re-entering the closed check (flush is used during close).
    pub fn close(&self) -> Result<Option<Decomposition<T>>, VectorWaveError> {
        match self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => self.flush_internal(),
            Err(_) => Ok(None),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wavelet::WaveletCatalog;

    #[test]
    fn processes_full_blocks_with_overlap_hop_and_flushes_remainder() {
        let wavelet = WaveletCatalog::global().get::<f64>("haar").unwrap();
        // 50% overlap: block 32, hop 16.
        let transform = StreamingTransform::new(wavelet, 2, Boundary::Periodic, 32, 0.5, 4).unwrap();
        assert_eq!(transform.hop(), 16);
        let samples: Vec<f64> = (0..70).map(|i| i as f64).collect();
        transform.push(&samples).unwrap();

        let first = transform.try_process_block().unwrap();
        assert!(first.is_some());
        let second = transform.try_process_block().unwrap();
        assert!(second.is_some());

        let flushed = transform.close().unwrap();
        assert!(flushed.is_some());
        assert!(transform.close().unwrap().is_none());
    }

    #[test]
    fn close_is_idempotent_and_blocks_further_work() {
        let wavelet = WaveletCatalog::global().get::<f64>("haar").unwrap();
        let transform = StreamingTransform::new(wavelet, 1, Boundary::Periodic, 16, 0.0, 4).unwrap();
        transform.close().unwrap();
        transform.close().unwrap();
        assert!(transform.push(&[1.0]).is_err());
    }

    #[test]
    fn flush_zero_pads_partial_tail_block() {
        let wavelet = WaveletCatalog::global().get::<f64>("db4").unwrap();
        let transform = StreamingTransform::new(wavelet, 1, Boundary::Periodic, 333, 0.0, 4).unwrap();
        let samples: Vec<f64> = (0..500).map(|i| i as f64 * 0.01).collect();
        transform.push(&samples).unwrap();
        assert!(transform.try_process_block().unwrap().is_some());
        assert!(transform.try_process_block().unwrap().is_none());
        let tail = transform.close().unwrap().unwrap();
        assert_eq!(tail.smooth.len(), 333);
    }

    #[test]
    fn rejects_levels_exceeding_block_capacity() {
        let wavelet = WaveletCatalog::global().get::<f64>("db4").unwrap();
        assert!(StreamingTransform::new(wavelet, 8, Boundary::Periodic, 16, 0.0, 4).is_err());
    }

    #[test]
    fn rejects_block_size_shorter_than_filter() {
        let wavelet = WaveletCatalog::global().get::<f64>("db4").unwrap();
        assert!(StreamingTransform::new(wavelet, 1, Boundary::Periodic, 4, 0.0, 4).is_err());
    }

    #[test]
    fn rejects_overlap_ratio_out_of_range() {
        let wavelet = WaveletCatalog::global().get::<f64>("haar").unwrap();
        assert!(StreamingTransform::new(wavelet, 1, Boundary::Periodic, 16, 1.0, 4).is_err());
    }
}
