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
//! Rayon-backed batch MODWT (spec §4 C3 extension): independent signals
//! decompose concurrently into a pre-allocated output slice, with a
//! cancellation token so a caller can abort a large batch without waiting
//! for every task to finish its own cascade.
//!
//! Grounded on the teacher's workspace-wide reliance on `rayon` for
//! data-parallel batch work (the teacher itself dispatches per-sample SIMD
//! rather than per-item rayon, but the pack's other repos use
//! `par_iter`/`par_iter_mut` zipped against pre-sized output buffers for
//! exactly this "one task per independent item" shape).

use crate::error::{ErrorContext, VectorWaveError};
use crate::filter::FilterCache;
use crate::modwt::multilevel::{Decomposition, decompose};
use crate::modwt::single::Boundary;
use crate::sample::WaveSample;
use crate::wavelet::Wavelet;
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A shared, cheaply-cloned flag a caller can raise to ask in-flight batch
/// tasks to stop starting new work. Already-running tasks finish; queued
/// tasks short-circuit with [`VectorWaveError::Cancelled`].
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Decomposes every signal in `signals` independently and concurrently.
/// Output slots are pre-allocated before any task runs; each task writes
/// its own slot and never touches another's. The first task to fail raises
/// `token` so sibling tasks that haven't started their cascade yet bail out
/// early instead of doing wasted work.
pub fn decompose_batch<T: WaveSample>(
    signals: &[Vec<T>],
    wavelet: &Wavelet<T>,
    levels: usize,
    boundary: Boundary,
    cache: &FilterCache<T>,
    token: &CancellationToken,
) -> Result<Vec<Decomposition<T>>, VectorWaveError> {
    if signals.is_empty() {
        return Ok(Vec::new());
    }

    let mut outputs: Vec<Result<Decomposition<T>, VectorWaveError>> = signals
        .iter()
        .map(|_| {
            Err(VectorWaveError::cancelled(ErrorContext::new(
                "modwt::parallel::decompose_batch",
            )))
        })
        .collect();

    signals
        .par_iter()
        .zip(outputs.par_iter_mut())
        .for_each(|(signal, slot)| {
            if token.is_cancelled() {
                return;
            }
            let result = decompose(signal, wavelet, levels, boundary, cache);
            if result.is_err() {
                token.cancel();
            }
            *slot = result;
        });

    outputs.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wavelet::WaveletCatalog;
    use crate::modwt::multilevel::reconstruct;
    use approx::assert_abs_diff_eq;

    #[test]
    fn batch_matches_sequential_decompose() {
        let wavelet = WaveletCatalog::global().get::<f64>("haar").unwrap();
        let cache = FilterCache::new();
        let signals: Vec<Vec<f64>> = (0..4)
            .map(|k| (0..64).map(|i| (i as f64 * 0.1 + k as f64).sin()).collect())
            .collect();
        let token = CancellationToken::new();
        let batch = decompose_batch(&signals, &wavelet, 3, Boundary::Periodic, &cache, &token)
            .unwrap();
        assert_eq!(batch.len(), signals.len());
        for (signal, decomposition) in signals.iter().zip(batch.iter()) {
            let recon = reconstruct(decomposition, &wavelet, Boundary::Periodic, &cache).unwrap();
            for (a, b) in signal.iter().zip(recon.iter()) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn empty_batch_is_ok() {
        let wavelet = WaveletCatalog::global().get::<f64>("haar").unwrap();
        let cache = FilterCache::new();
        let token = CancellationToken::new();
        let signals: Vec<Vec<f64>> = Vec::new();
        let batch = decompose_batch(&signals, &wavelet, 1, Boundary::Periodic, &cache, &token)
            .unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn cancelled_token_short_circuits_unstarted_tasks() {
        let wavelet = WaveletCatalog::global().get::<f64>("haar").unwrap();
        let cache = FilterCache::new();
        let signals: Vec<Vec<f64>> = vec![vec![1.0, 2.0, 3.0, 4.0]];
        let token = CancellationToken::new();
        token.cancel();
        let batch = decompose_batch(&signals, &wavelet, 1, Boundary::Periodic, &cache, &token);
        assert!(batch.is_err());
    }
}
