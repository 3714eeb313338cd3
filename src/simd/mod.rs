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
//! Structure-of-arrays batch MODWT execution (spec §4 C4).
//!
//! Directly grounded on the teacher's `spetrum_arith.rs`
//! `SpectrumArithmeticFactory`: an `OnceLock`-memoized factory that probes
//! `is_x86_feature_detected!`/`is_aarch64_feature_detected!` once per
//! process and hands back a boxed kernel, so every call after the first
//! pays no detection cost. The kernels themselves follow the teacher's
//! `avx/spectrum_f32.rs` style — raw `std::arch` intrinsics over
//! `chunks_exact`, scalar remainder, no external SIMD crate.
//!
//! MODWT has no complex/frequency-domain step, so the kernel's actual job
//! changes: instead of a complex-conjugate spectral multiply, it is a
//! scaled row accumulate (`acc[lane] += coeff * row[lane]`) applied once
//! per filter tap, with the *lanes* being independent signals in a batch
//! rather than frequency bins. `batch_modwt_soa` is the non-decimated
//! convolution from [`crate::modwt::single`] re-expressed over that SoA
//! layout.
//!
//! Per spec §4.3 "thread-local staging", the two row accumulators are kept
//! in per-thread scratch (grown on demand, never per-call allocated) with
//! an explicit [`cleanup_thread`] hook for hosted runtimes that recycle
//! worker threads — the same pattern [`crate::streaming::ring_buffer`] uses
//! for its wrap-around staging buffer.

mod avx;
mod neon;
mod scalar;
mod sse;

use crate::error::{ErrorContext, VectorWaveError};
use crate::filter::LevelFilter;
use crate::modwt::single::{Boundary, resolve_index};
use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

/// Below this lane count, dispatching into a wide SIMD kernel costs more
/// than it saves; `batch_modwt_soa` routes straight to the scalar kernel.
pub const MIN_BATCH_FOR_SIMD: usize = 8;

/// One row-accumulate step: `acc[lane] += coeff * row[lane]` for every
/// lane. Implementors operate on a single concrete precision because SIMD
/// intrinsics are not generic over `WaveSample`.
pub trait TapAccumulator<T>: Send + Sync {
    fn madd_row(&self, coeff: T, row: &[T], acc: &mut [T]);
}

/// Structure-of-arrays batch of signals: `data[t * n_signals + s]` is
/// sample `t` of signal `s`. This layout puts every signal's sample at a
/// given time contiguous in memory, so a tap accumulate is a single
/// vectorizable pass over a `n_signals`-long slice.
#[derive(Clone)]
pub struct BatchSoA<T> {
    pub n_signals: usize,
    pub n_samples: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> BatchSoA<T> {
    pub fn zeros(n_signals: usize, n_samples: usize) -> Self {
        Self {
            n_signals,
            n_samples,
            data: vec![T::default(); n_signals * n_samples],
        }
    }

    pub fn row(&self, t: usize) -> &[T] {
        let start = t * self.n_signals;
        &self.data[start..start + self.n_signals]
    }

    pub fn set_row(&mut self, t: usize, values: &[T]) {
        let start = t * self.n_signals;
        self.data[start..start + self.n_signals].copy_from_slice(values);
    }

    /// Builds a batch from equal-length signals (spec §4 "SoA conversion").
    pub fn from_signals(signals: &[Vec<T>]) -> Result<Self, VectorWaveError> {
        if signals.is_empty() {
            return Ok(Self::zeros(0, 0));
        }
        let n_samples = signals[0].len();
        if signals.iter().any(|s| s.len() != n_samples) {
            return Err(VectorWaveError::invalid_argument(
                ErrorContext::new("BatchSoA::from_signals"),
                "all signals in a batch must share the same length",
                "pad or truncate signals to a common length before batching",
            ));
        }
        let n_signals = signals.len();
        let mut out = Self::zeros(n_signals, n_samples);
        for t in 0..n_samples {
            for (s, signal) in signals.iter().enumerate() {
                out.data[t * n_signals + s] = signal[t];
            }
        }
        Ok(out)
    }

    pub fn into_signals(&self) -> Vec<Vec<T>> {
        (0..self.n_signals)
            .map(|s| (0..self.n_samples).map(|t| self.data[t * self.n_signals + s]).collect())
            .collect()
    }
}

fn f32_kernel() -> Arc<dyn TapAccumulator<f32>> {
    static FACTORY: OnceLock<Arc<dyn TapAccumulator<f32>>> = OnceLock::new();
    FACTORY
        .get_or_init(|| {
            #[cfg(all(target_arch = "x86_64", feature = "avx"))]
            if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
                return Arc::new(avx::Avx2F32) as Arc<dyn TapAccumulator<f32>>;
            }
            #[cfg(all(target_arch = "x86_64", feature = "sse"))]
            if is_x86_feature_detected!("sse4.2") {
                return Arc::new(sse::Sse42F32) as Arc<dyn TapAccumulator<f32>>;
            }
            #[cfg(all(target_arch = "aarch64", feature = "neon"))]
            if std::arch::is_aarch64_feature_detected!("neon") {
                return Arc::new(neon::NeonF32) as Arc<dyn TapAccumulator<f32>>;
            }
            Arc::new(scalar::ScalarKernel) as Arc<dyn TapAccumulator<f32>>
        })
        .clone()
}

fn f64_kernel() -> Arc<dyn TapAccumulator<f64>> {
    static FACTORY: OnceLock<Arc<dyn TapAccumulator<f64>>> = OnceLock::new();
    FACTORY
        .get_or_init(|| {
            #[cfg(all(target_arch = "x86_64", feature = "avx"))]
            if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
                return Arc::new(avx::Avx2F64) as Arc<dyn TapAccumulator<f64>>;
            }
            #[cfg(all(target_arch = "aarch64", feature = "neon"))]
            if std::arch::is_aarch64_feature_detected!("neon") {
                return Arc::new(neon::NeonF64) as Arc<dyn TapAccumulator<f64>>;
            }
            Arc::new(scalar::ScalarKernel) as Arc<dyn TapAccumulator<f64>>
        })
        .clone()
}

fn batch_modwt_soa_with<T: Copy + Default>(
    soa: &BatchSoA<T>,
    level_filter: &LevelFilter<T>,
    boundary: Boundary,
    kernel: &dyn TapAccumulator<T>,
    d_acc: &mut [T],
    s_acc: &mut [T],
) -> (BatchSoA<T>, BatchSoA<T>) {
    let n = soa.n_samples;
    let lanes = soa.n_signals;
    let mut detail = BatchSoA::zeros(lanes, n);
    let mut smooth = BatchSoA::zeros(lanes, n);
    let taps = level_filter.dec_lo.len();
    for t in 0..n {
        d_acc.iter_mut().for_each(|v| *v = T::default());
        s_acc.iter_mut().for_each(|v| *v = T::default());
        for tap in 0..taps {
            let idx = t as isize - tap as isize;
            if let Some(i) = resolve_index(idx, n, boundary) {
                let row = soa.row(i);
                kernel.madd_row(level_filter.dec_hi[tap], row, d_acc);
                kernel.madd_row(level_filter.dec_lo[tap], row, s_acc);
            }
        }
        detail.set_row(t, d_acc);
        smooth.set_row(t, s_acc);
    }
    (detail, smooth)
}

thread_local! {
    /// Per-worker scratch accumulators (spec §4.3 "thread-local staging"):
    /// reused across `batch_modwt_soa_f32`/`_f64` calls on the same thread
    /// instead of allocating two `lanes`-length vectors per call, grown
    /// (never shrunk) to the widest batch that thread has processed so far.
    static SCRATCH_F32: RefCell<(Vec<f32>, Vec<f32>)> = const { RefCell::new((Vec::new(), Vec::new())) };
    static SCRATCH_F64: RefCell<(Vec<f64>, Vec<f64>)> = const { RefCell::new((Vec::new(), Vec::new())) };
}

fn with_scratch_f32<R>(lanes: usize, f: impl FnOnce(&mut [f32], &mut [f32]) -> R) -> R {
    SCRATCH_F32.with(|cell| {
        let mut scratch = cell.borrow_mut();
        if scratch.0.len() < lanes {
            scratch.0.resize(lanes, 0.0);
            scratch.1.resize(lanes, 0.0);
        }
        f(&mut scratch.0[..lanes], &mut scratch.1[..lanes])
    })
}

fn with_scratch_f64<R>(lanes: usize, f: impl FnOnce(&mut [f64], &mut [f64]) -> R) -> R {
    SCRATCH_F64.with(|cell| {
        let mut scratch = cell.borrow_mut();
        if scratch.0.len() < lanes {
            scratch.0.resize(lanes, 0.0);
            scratch.1.resize(lanes, 0.0);
        }
        f(&mut scratch.0[..lanes], &mut scratch.1[..lanes])
    })
}

/// Releases this thread's batch-kernel scratch accumulators (spec §4.3:
/// "cleanup hook releases them when a thread exits a worker pool"). Safe to
/// call from a thread that never ran a batch kernel; the next call on this
/// thread simply reallocates on demand.
pub fn cleanup_thread() {
    SCRATCH_F32.with(|cell| *cell.borrow_mut() = (Vec::new(), Vec::new()));
    SCRATCH_F64.with(|cell| *cell.borrow_mut() = (Vec::new(), Vec::new()));
}

/// Single-precision batch MODWT over an SoA layout (spec §4 C4). Falls
/// back to the scalar kernel below [`MIN_BATCH_FOR_SIMD`] lanes, where
/// dispatch overhead would dominate.
pub fn batch_modwt_soa_f32(
    soa: &BatchSoA<f32>,
    level_filter: &LevelFilter<f32>,
    boundary: Boundary,
) -> Result<(BatchSoA<f32>, BatchSoA<f32>), VectorWaveError> {
    if soa.n_samples == 0 {
        return Err(VectorWaveError::invalid_signal(
            ErrorContext::new("simd::batch_modwt_soa_f32"),
            "batch has zero samples",
        ));
    }
    let kernel: Arc<dyn TapAccumulator<f32>> = if soa.n_signals >= MIN_BATCH_FOR_SIMD {
        f32_kernel()
    } else {
        Arc::new(scalar::ScalarKernel)
    };
    Ok(with_scratch_f32(soa.n_signals, |d_acc, s_acc| {
        batch_modwt_soa_with(soa, level_filter, boundary, kernel.as_ref(), d_acc, s_acc)
    }))
}

/// Double-precision counterpart of [`batch_modwt_soa_f32`].
pub fn batch_modwt_soa_f64(
    soa: &BatchSoA<f64>,
    level_filter: &LevelFilter<f64>,
    boundary: Boundary,
) -> Result<(BatchSoA<f64>, BatchSoA<f64>), VectorWaveError> {
    if soa.n_samples == 0 {
        return Err(VectorWaveError::invalid_signal(
            ErrorContext::new("simd::batch_modwt_soa_f64"),
            "batch has zero samples",
        ));
    }
    let kernel: Arc<dyn TapAccumulator<f64>> = if soa.n_signals >= MIN_BATCH_FOR_SIMD {
        f64_kernel()
    } else {
        Arc::new(scalar::ScalarKernel)
    };
    Ok(with_scratch_f64(soa.n_signals, |d_acc, s_acc| {
        batch_modwt_soa_with(soa, level_filter, boundary, kernel.as_ref(), d_acc, s_acc)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterCache;
    use crate::wavelet::WaveletCatalog;
    use approx::assert_abs_diff_eq;

    #[test]
    fn soa_round_trips_through_signal_list() {
        let signals: Vec<Vec<f32>> = (0..3).map(|k| vec![k as f32, k as f32 + 1.0, k as f32 + 2.0]).collect();
        let soa = BatchSoA::from_signals(&signals).unwrap();
        assert_eq!(soa.into_signals(), signals);
    }

    #[test]
    fn mismatched_lengths_rejected() {
        let signals = vec![vec![1.0_f32, 2.0], vec![1.0_f32]];
        assert!(BatchSoA::from_signals(&signals).is_err());
    }

    /// Equivalence harness (spec §4 C4): the dispatched kernel (whichever
    /// the host CPU qualifies for) must agree with the scalar kernel to
    /// floating-point tolerance. Exact bitwise equality is not claimed
    /// across kernels that use fused multiply-add versus separate
    /// multiply/add, since FMA rounds once where the scalar path rounds
    /// twice.
    #[test]
    fn dispatched_kernel_matches_scalar_reference() {
        let wavelet = WaveletCatalog::global().get::<f32>("db4").unwrap();
        let cache = FilterCache::new();
        let level_filter = cache.get_or_build(&wavelet, 2).unwrap();
        let signals: Vec<Vec<f32>> = (0..16)
            .map(|k| (0..40).map(|i| ((i + k) as f32 * 0.1).sin()).collect())
            .collect();
        let soa = BatchSoA::from_signals(&signals).unwrap();

        let (detail_dispatched, smooth_dispatched) =
            batch_modwt_soa_f32(&soa, &level_filter, Boundary::Periodic).unwrap();
        let mut d_acc = vec![0.0f32; soa.n_signals];
        let mut s_acc = vec![0.0f32; soa.n_signals];
        let (detail_scalar, smooth_scalar) = batch_modwt_soa_with(
            &soa,
            &level_filter,
            Boundary::Periodic,
            &scalar::ScalarKernel,
            &mut d_acc,
            &mut s_acc,
        );

        for t in 0..soa.n_samples {
            for (a, b) in detail_dispatched.row(t).iter().zip(detail_scalar.row(t).iter()) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-4);
            }
            for (a, b) in smooth_dispatched.row(t).iter().zip(smooth_scalar.row(t).iter()) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn small_batch_falls_back_to_scalar_without_panicking() {
        let wavelet = WaveletCatalog::global().get::<f32>("haar").unwrap();
        let cache = FilterCache::new();
        let level_filter = cache.get_or_build(&wavelet, 1).unwrap();
        let signals: Vec<Vec<f32>> = vec![vec![1.0, 2.0, 3.0, 4.0]];
        let soa = BatchSoA::from_signals(&signals).unwrap();
        assert!(batch_modwt_soa_f32(&soa, &level_filter, Boundary::Periodic).is_ok());
    }

    #[test]
    fn cleanup_thread_releases_scratch_and_later_calls_still_work() {
        let wavelet = WaveletCatalog::global().get::<f64>("haar").unwrap();
        let cache = FilterCache::new();
        let level_filter = cache.get_or_build(&wavelet, 1).unwrap();
        let signals: Vec<Vec<f64>> = (0..4).map(|k| vec![k as f64, k as f64 + 1.0, k as f64 + 2.0]).collect();
        let soa = BatchSoA::from_signals(&signals).unwrap();
        assert!(batch_modwt_soa_f64(&soa, &level_filter, Boundary::Periodic).is_ok());
        cleanup_thread();
        assert!(batch_modwt_soa_f64(&soa, &level_filter, Boundary::Periodic).is_ok());
    }
}
