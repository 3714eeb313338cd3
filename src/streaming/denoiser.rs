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
//! Wavelet shrinkage denoiser (spec §4 C6): per-level noise estimation,
//! threshold selection, and soft/hard shrinkage, composed around a single
//! forward-then-inverse MODWT pass — the pyramid is decomposed once,
//! thresholded level by level, and reconstructed once. No level is ever
//! re-decomposed to "improve" an estimate; that would make denoising
//! strength depend on iteration count rather than the chosen threshold
//! method, which the configuration already determines (spec §9 Open
//! Questions).

use crate::error::{ErrorContext, VectorWaveError};
use crate::filter::FilterCache;
use crate::modwt::multilevel::{self, Decomposition};
use crate::modwt::single::Boundary;
use crate::sample::WaveSample;
use crate::streaming::transform::StreamingTransform;
use crate::wavelet::Wavelet;

/// How level noise is estimated from that level's detail coefficients.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NoiseEstimator {
    /// Median absolute deviation, scaled by the standard normal's
    /// 0.75-quantile so it estimates `sigma` consistently for Gaussian
    /// noise. Robust to the occasional large wavelet coefficient a real
    /// signal (as opposed to pure noise) produces.
    Mad,
    /// Plain sample standard deviation. Cheaper, but biased upward by
    /// genuine signal energy leaking into the detail level.
    Std,
    /// Switches estimator by how full the noise window is: `Std` while the
    /// window is still filling (any reading beats none), `Mad` once full
    /// (robust, the steady-state choice). Only meaningful for
    /// [`NoiseWindow`]; [`estimate_noise_sigma`] on a one-shot slice treats
    /// it as `Mad` since there is no fill history to adapt over.
    Adaptive,
}

/// How the shrinkage threshold is chosen, given a per-level `sigma`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ThresholdMethod {
    /// `sigma * sqrt(2 ln N)` (Donoho & Johnstone's universal threshold).
    Universal,
    /// Stein's Unbiased Risk Estimate, minimized over the level's own
    /// coefficients — adapts to how sparse the level actually is.
    Sure,
    /// Minimax threshold: the lookup-table approximation from Donoho &
    /// Johnstone 1994, near-optimal for bounded worst-case risk.
    Minimax,
}

/// How a level's coefficients are shrunk once the threshold is known.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ThresholdRule {
    /// Zero out anything below the threshold, keep the rest unchanged.
    Hard,
    /// Zero out anything below the threshold, shrink the rest toward zero
    /// by the threshold amount (continuous, no discontinuity at `lambda`).
    Soft,
}

/// Selects the `k`-th smallest element of `data` in expected linear time,
/// partitioning around a median-of-three pivot (grounded on the classic
/// introselect shape, adapted for the denoiser's median/MAD calls rather
/// than a general sort).
fn quickselect<T: WaveSample>(data: &mut [T], k: usize) -> T {
    let mut lo = 0usize;
    let mut hi = data.len() - 1;
    loop {
        if lo == hi {
            return data[lo];
        }
        let mid = lo + (hi - lo) / 2;
        let mut candidates = [lo, mid, hi];
        candidates.sort_by(|&a, &b| data[a].partial_cmp(&data[b]).unwrap());
        let pivot_idx = candidates[1];
        let pivot = data[pivot_idx];
        data.swap(pivot_idx, hi);
        let mut store = lo;
        for i in lo..hi {
            if data[i] < pivot {
                data.swap(i, store);
                store += 1;
            }
        }
        data.swap(store, hi);
        if store == k {
            return data[store];
        } else if k < store {
            hi = store - 1;
        } else {
            lo = store + 1;
        }
    }
}

/// Median via quickselect; even-length inputs average the two central
/// elements (the lower one recovered from the partition quickselect
/// already produced, so no second full select is needed).
pub fn median<T: WaveSample>(data: &[T]) -> T {
    if data.is_empty() {
        return T::zero();
    }
    let mut buf = data.to_vec();
    let n = buf.len();
    let mid = n / 2;
    let upper = quickselect(&mut buf, mid);
    if n % 2 == 1 {
        upper
    } else {
        let lower = buf[..mid]
            .iter()
            .copied()
            .fold(T::neg_infinity(), |acc, v| if v > acc { v } else { acc });
        (lower + upper) / T::from_f64(2.0)
    }
}

/// Median absolute deviation, scaled to estimate Gaussian `sigma`.
pub fn mad<T: WaveSample>(data: &[T]) -> T {
    let center = median(data);
    let deviations: Vec<T> = data.iter().map(|&x| (x - center).abs()).collect();
    median(&deviations) / T::from_f64(0.674_489_750_196_081_7)
}

pub fn std_dev<T: WaveSample>(data: &[T]) -> T {
    let n = data.len();
    if n == 0 {
        return T::zero();
    }
    let n_t = T::from_usize_lossy(n);
    let mean = data.iter().fold(T::zero(), |acc, &x| acc + x) / n_t;
    let var = data.iter().fold(T::zero(), |acc, &x| acc + (x - mean) * (x - mean)) / n_t;
    var.sqrt()
}

pub fn estimate_noise_sigma<T: WaveSample>(detail: &[T], estimator: NoiseEstimator) -> T {
    match estimator {
        NoiseEstimator::Mad | NoiseEstimator::Adaptive => mad(detail),
        NoiseEstimator::Std => std_dev(detail),
    }
}

fn universal_threshold<T: WaveSample>(n: usize, sigma: T) -> T {
    if n == 0 {
        return T::zero();
    }
    T::from_f64((2.0 * (n as f64).ln()).sqrt()) * sigma
}

/// Minimizes Stein's Unbiased Risk Estimate over the level's own
/// coefficients: `risk(t) = n - 2*#{|x_i| <= t} + sum_{|x_i|<=t} x_i^2 +
/// t^2 * #{|x_i| > t}`, evaluated only at candidate thresholds equal to
/// each `|x_i|` (the risk function is piecewise and only changes slope at
/// those points).
fn sure_threshold<T: WaveSample>(detail: &[T], sigma: T) -> T {
    let n = detail.len();
    if n == 0 || sigma <= T::zero() {
        return T::zero();
    }
    let mut squared: Vec<T> = detail.iter().map(|&x| (x / sigma) * (x / sigma)).collect();
    squared.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n_t = T::from_usize_lossy(n);
    let mut cumulative = T::zero();
    let mut best_risk = T::infinity();
    let mut best_squared_threshold = squared[n - 1];
    for (i, &s) in squared.iter().enumerate() {
        cumulative += s;
        let below = T::from_usize_lossy(i + 1);
        let above = T::from_usize_lossy(n - i - 1);
        let risk = n_t - T::from_f64(2.0) * below + cumulative + above * s;
        if risk < best_risk {
            best_risk = risk;
            best_squared_threshold = s;
        }
    }
    best_squared_threshold.sqrt() * sigma
}

/// Donoho & Johnstone's minimax threshold lookup-table approximation;
/// below 32 samples the table is undefined and no shrinkage is applied.
fn minimax_threshold<T: WaveSample>(n: usize, sigma: T) -> T {
    if n < 32 {
        return T::zero();
    }
    let log2n = (n as f64).log2();
    T::from_f64(0.3936 + 0.1829 * log2n) * sigma
}

pub fn compute_threshold<T: WaveSample>(detail: &[T], sigma: T, method: ThresholdMethod) -> T {
    match method {
        ThresholdMethod::Universal => universal_threshold(detail.len(), sigma),
        ThresholdMethod::Sure => sure_threshold(detail, sigma),
        ThresholdMethod::Minimax => minimax_threshold(detail.len(), sigma),
    }
}

pub fn apply_threshold<T: WaveSample>(detail: &mut [T], lambda: T, rule: ThresholdRule) {
    for x in detail.iter_mut() {
        *x = match rule {
            ThresholdRule::Hard => {
                if x.abs() > lambda {
                    *x
                } else {
                    T::zero()
                }
            }
            ThresholdRule::Soft => {
                let magnitude = x.abs();
                if magnitude <= lambda {
                    T::zero()
                } else {
                    let sign = if *x < T::zero() { -T::one() } else { T::one() };
                    sign * (magnitude - lambda)
                }
            }
        };
    }
}

/// Denoiser configuration (spec §6 options surface).
#[derive(Debug, Copy, Clone, serde::Serialize, serde::Deserialize)]
pub struct DenoiseConfig {
    pub estimator: NoiseEstimator,
    pub method: ThresholdMethod,
    pub rule: ThresholdRule,
    pub levels: usize,
}

/// Denoises `signal`: one MODWT decomposition, per-level threshold
/// selection and shrinkage, one reconstruction.
pub fn denoise<T: WaveSample>(
    signal: &[T],
    wavelet: &Wavelet<T>,
    boundary: Boundary,
    cache: &FilterCache<T>,
    config: &DenoiseConfig,
) -> Result<Vec<T>, VectorWaveError> {
    let mut decomposition: Decomposition<T> =
        multilevel::decompose(signal, wavelet, config.levels, boundary, cache)?;
    for level_detail in decomposition.details.iter_mut() {
        let sigma = estimate_noise_sigma(level_detail, config.estimator);
        let lambda = compute_threshold(level_detail, sigma, config.method);
        apply_threshold(level_detail, lambda, config.rule);
    }
    multilevel::reconstruct(&decomposition, wavelet, boundary, cache)
}

/// Online noise-estimation window (spec §3 "noise-estimation window" /
/// §4.6 streaming denoiser): a fixed-length ring of recent fine-scale
/// detail coefficients, pushed in O(1) per sample (overwrite, no
/// reallocation) and queried in O(W) via the same `mad`/`std_dev` used by
/// the whole-signal denoiser above.
pub struct NoiseWindow<T> {
    buffer: Vec<T>,
    write_idx: usize,
    filled: usize,
    estimator: NoiseEstimator,
}

impl<T: WaveSample> NoiseWindow<T> {
    pub fn new(capacity: usize, estimator: NoiseEstimator) -> Result<Self, VectorWaveError> {
        if capacity < 2 {
            return Err(VectorWaveError::invalid_configuration(
                ErrorContext::new("NoiseWindow::new").with_sizes([capacity]),
                "noise_window must be >= 2",
                "a window needs at least two samples to estimate spread",
            ));
        }
        Ok(Self {
            buffer: vec![T::zero(); capacity],
            write_idx: 0,
            filled: 0,
            estimator,
        })
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_full(&self) -> bool {
        self.filled >= self.buffer.len()
    }

    /// Overwrites the next slot and advances, wrapping at capacity.
    pub fn push(&mut self, value: T) {
        self.buffer[self.write_idx] = value;
        self.write_idx = (self.write_idx + 1) % self.buffer.len();
        self.filled = (self.filled + 1).min(self.buffer.len());
    }

    pub fn push_slice(&mut self, values: &[T]) {
        for &v in values {
            self.push(v);
        }
    }

    /// Current sigma estimate over whatever has been pushed so far (may be
    /// fewer than `capacity` samples). `0` before anything has been pushed.
    pub fn sigma(&self) -> T {
        if self.filled == 0 {
            return T::zero();
        }
        let data = &self.buffer[..self.filled];
        match self.estimator {
            NoiseEstimator::Mad => mad(data),
            NoiseEstimator::Std => std_dev(data),
            NoiseEstimator::Adaptive => {
                if self.is_full() { mad(data) } else { std_dev(data) }
            }
        }
    }
}

/// Combines a [`StreamingTransform`] with an online [`NoiseWindow`] (spec
/// §3 "streaming denoiser owns its ring buffer and its noise window", §4.6
/// "streaming denoiser"). Each processed block feeds its finest-level
/// detail into the window, thresholds every level against the window's
/// current sigma, and reconstructs — one forward/inverse pass per block,
/// never chained (spec §4.6 "never chain forward-denoise-inverse-forward-
/// denoise").
pub struct StreamingDenoiser<T: WaveSample> {
    transform: StreamingTransform<T>,
    wavelet: Wavelet<T>,
    boundary: Boundary,
    noise_window: parking_lot::Mutex<NoiseWindow<T>>,
    method: ThresholdMethod,
    rule: ThresholdRule,
}

impl<T: WaveSample> StreamingDenoiser<T> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        wavelet: Wavelet<T>,
        levels: usize,
        boundary: Boundary,
        block_size: usize,
        overlap_ratio: f64,
        buffer_multiplier: usize,
        noise_window_len: usize,
        estimator: NoiseEstimator,
        method: ThresholdMethod,
        rule: ThresholdRule,
    ) -> Result<Self, VectorWaveError> {
        let transform = StreamingTransform::new(
            wavelet.clone(),
            levels,
            boundary,
            block_size,
            overlap_ratio,
            buffer_multiplier,
        )?;
        let noise_window = NoiseWindow::new(noise_window_len, estimator)?;
        Ok(Self {
            transform,
            wavelet,
            boundary,
            noise_window: parking_lot::Mutex::new(noise_window),
            method,
            rule,
        })
    }

    pub fn push(&self, samples: &[T]) -> Result<usize, VectorWaveError> {
        self.transform.push(samples)
    }

    /// Current sigma estimate from the noise window, independent of
    /// whether a block has finished processing yet.
    pub fn current_sigma(&self) -> T {
        self.noise_window.lock().sigma()
    }

    fn denoise_decomposition(&self, decomposition: &mut Decomposition<T>) {
        let mut window = self.noise_window.lock();
        if let Some(finest) = decomposition.details.first() {
            window.push_slice(finest);
        }
        let sigma = window.sigma();
        for detail in decomposition.details.iter_mut() {
            let lambda = compute_threshold(detail, sigma, self.method);
            apply_threshold(detail, lambda, self.rule);
        }
    }

    /// Decomposes the next full block if available, thresholds it against
    /// the running noise estimate, and reconstructs. `None` if less than a
    /// full block is buffered yet.
    pub fn try_process_block(&self) -> Result<Option<Vec<T>>, VectorWaveError> {
        let Some(mut decomposition) = self.transform.try_process_block()? else {
            return Ok(None);
        };
        self.denoise_decomposition(&mut decomposition);
        multilevel::reconstruct(&decomposition, &self.wavelet, self.boundary, T::global_filter_cache())
            .map(Some)
    }

    /// Idempotent close, mirroring [`StreamingTransform::close`]: the first
    /// call flushes and denoises the tail block, later calls return `Ok(None)`.
    pub fn close(&self) -> Result<Option<Vec<T>>, VectorWaveError> {
        let Some(mut decomposition) = self.transform.close()? else {
            return Ok(None);
        };
        self.denoise_decomposition(&mut decomposition);
        multilevel::reconstruct(&decomposition, &self.wavelet, self.boundary, T::global_filter_cache())
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wavelet::WaveletCatalog;

    #[test]
    fn median_matches_sorted_reference_odd_and_even() {
        assert_eq!(median(&[3.0_f64, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0_f64, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn mad_is_zero_for_constant_input() {
        let data = vec![5.0_f64; 10];
        assert_eq!(mad(&data), 0.0);
    }

    #[test]
    fn soft_threshold_shrinks_and_hard_keeps_magnitude() {
        let mut soft = vec![0.1_f64, -2.0, 3.0];
        apply_threshold(&mut soft, 1.0, ThresholdRule::Soft);
        assert_eq!(soft, vec![0.0, -1.0, 2.0]);

        let mut hard = vec![0.1_f64, -2.0, 3.0];
        apply_threshold(&mut hard, 1.0, ThresholdRule::Hard);
        assert_eq!(hard, vec![0.0, -2.0, 3.0]);
    }

    #[test]
    fn denoise_reduces_noise_energy_on_synthetic_signal() {
        let wavelet = WaveletCatalog::global().get::<f64>("db4").unwrap();
        let cache = FilterCache::new();
        let n = 512;
        let clean: Vec<f64> = (0..n).map(|i| (i as f64 * 0.05).sin()).collect();
        // Deterministic pseudo-noise (no RNG dependency in tests).
        let noisy: Vec<f64> = clean
            .iter()
            .enumerate()
            .map(|(i, &x)| x + 0.3 * ((i as f64 * 12.9898).sin() * 43758.5453).fract())
            .collect();
        let config = DenoiseConfig {
            estimator: NoiseEstimator::Mad,
            method: ThresholdMethod::Universal,
            rule: ThresholdRule::Soft,
            levels: 3,
        };
        let denoised = denoise(&noisy, &wavelet, Boundary::Periodic, &cache, &config).unwrap();

        let error_before: f64 = clean.iter().zip(noisy.iter()).map(|(a, b)| (a - b).powi(2)).sum();
        let error_after: f64 = clean.iter().zip(denoised.iter()).map(|(a, b)| (a - b).powi(2)).sum();
        assert!(error_after < error_before);
    }

    #[test]
    fn noise_window_tracks_sigma_of_pure_noise() {
        let mut window: NoiseWindow<f64> = NoiseWindow::new(2000, NoiseEstimator::Mad).unwrap();
        for i in 0..2000 {
            let pseudo_noise = ((i as f64 * 12.9898).sin() * 43758.5453).fract() - 0.5;
            window.push(pseudo_noise * 0.5 * 2.0); // roughly uniform in [-0.5, 0.5]
        }
        assert!(window.is_full());
        let sigma = window.sigma();
        assert!(sigma > 0.0);
    }

    #[test]
    fn noise_window_rejects_undersized_capacity() {
        assert!(NoiseWindow::<f64>::new(1, NoiseEstimator::Std).is_err());
    }

    #[test]
    fn noise_window_adaptive_switches_estimator_once_full() {
        let mut window: NoiseWindow<f64> = NoiseWindow::new(4, NoiseEstimator::Adaptive).unwrap();
        window.push(1.0);
        assert!(!window.is_full());
        window.push(2.0);
        window.push(3.0);
        window.push(4.0);
        assert!(window.is_full());
    }

    #[test]
    fn streaming_denoiser_processes_blocks_and_closes() {
        let wavelet = WaveletCatalog::global().get::<f64>("db4").unwrap();
        let denoiser = StreamingDenoiser::new(
            wavelet,
            2,
            Boundary::Periodic,
            64,
            0.0,
            4,
            256,
            NoiseEstimator::Mad,
            ThresholdMethod::Universal,
            ThresholdRule::Soft,
        )
        .unwrap();
        let samples: Vec<f64> = (0..150).map(|i| (i as f64 * 0.1).sin()).collect();
        denoiser.push(&samples).unwrap();
        let first = denoiser.try_process_block().unwrap();
        assert!(first.is_some());
        assert_eq!(first.unwrap().len(), 64);
        let tail = denoiser.close().unwrap();
        assert!(tail.is_some());
        assert!(denoiser.close().unwrap().is_none());
    }
}
