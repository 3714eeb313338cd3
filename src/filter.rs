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
//! Per-level MODWT filter construction (spec §4 C2/§5): à-trous dilation of
//! the base wavelet's four taps plus the constant per-stage `1/√2` rescaling
//! (the cascade in `modwt::multilevel` accumulates this into the overall
//! `2^(-j/2)` level normalization), and a cache so repeated decompositions
//! at the same (wavelet, level) pay the dilation cost once.
//!
//! Grounded on the teacher's `OnceLock`-memoized factory shape
//! (`spetrum_arith.rs`'s `SpectrumArithmeticFactory`), generalized from "one
//! dispatch per process" to "one dilated filter per (wavelet id, level)".

use crate::error::VectorWaveError;
use crate::sample::WaveSample;
use crate::wavelet::Wavelet;
use dashmap::DashMap;
use std::sync::{Arc, OnceLock};

/// The four dilated, rescaled filters used to compute one MODWT level.
pub struct LevelFilter<T> {
    pub level: usize,
    pub dec_lo: Arc<[T]>,
    pub dec_hi: Arc<[T]>,
    pub rec_lo: Arc<[T]>,
    pub rec_hi: Arc<[T]>,
}

impl<T: WaveSample> LevelFilter<T> {
    /// Effective filter length at this level: `(L-1) * 2^(j-1) + 1` (spec §4,
    /// used for max-level and boundary-handling computations).
    pub fn effective_len(&self) -> usize {
        self.dec_lo.len()
    }
}

/// Dilates `base` by inserting `2^(level-1) - 1` zeros between consecutive
/// taps (the "à trous" step) and rescales by the constant per-stage factor
/// `1/√2`. The pyramid cascade (`decompose` in `modwt::multilevel`) feeds
/// each level's smooth output into the next level's `forward_level`, so the
/// cumulative `2^(-j/2)` normalization falls out of applying `1/√2` once per
/// stage rather than baking the cumulative exponent into each level's own
/// filter — using `2^(-level/2)` here would double it.
fn upsample_and_scale<T: WaveSample>(base: &[T], level: usize) -> Arc<[T]> {
    let stride = 1usize << (level - 1);
    let dilated_len = (base.len() - 1) * stride + 1;
    let mut out = vec![T::zero(); dilated_len];
    let scale = T::from_f64(std::f64::consts::FRAC_1_SQRT_2);
    for (k, &c) in base.iter().enumerate() {
        out[k * stride] = c * scale;
    }
    out.into()
}

fn build_level<T: WaveSample>(wavelet: &Wavelet<T>, level: usize) -> LevelFilter<T> {
    LevelFilter {
        level,
        dec_lo: upsample_and_scale(&wavelet.dec_lo, level),
        dec_hi: upsample_and_scale(&wavelet.dec_hi, level),
        rec_lo: upsample_and_scale(&wavelet.rec_lo, level),
        rec_hi: upsample_and_scale(&wavelet.rec_hi, level),
    }
}

/// Thread-safe cache of dilated filters keyed by `(wavelet id, level)`, plus
/// a secondary cache of length-truncated variants keyed by `(wavelet id,
/// level, target length)` — spec §3/§4.2's truncation cache, needed
/// whenever the dilated filter's effective length exceeds the signal being
/// decomposed. Both caches are idempotent-insert: two threads racing to
/// build the same entry both pay the build cost, but only one write is
/// observed afterward (double-compute is acceptable, double-store is not).
pub struct FilterCache<T> {
    entries: DashMap<(&'static str, usize), Arc<LevelFilter<T>>>,
    truncated: DashMap<(&'static str, usize, usize), Arc<LevelFilter<T>>>,
}

impl<T: WaveSample> FilterCache<T> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            truncated: DashMap::new(),
        }
    }

    /// Returns the cached dilated filter for `(wavelet.id, level)`, building
    /// and inserting it on first request. `level` must be at least 1.
    pub fn get_or_build(
        &self,
        wavelet: &Wavelet<T>,
        level: usize,
    ) -> Result<Arc<LevelFilter<T>>, VectorWaveError> {
        if level == 0 {
            return Err(VectorWaveError::invalid_argument(
                crate::error::ErrorContext::new("FilterCache::get_or_build")
                    .with_wavelet(wavelet.id),
                "level must be >= 1",
                "MODWT levels are 1-indexed; level 0 is the original signal",
            ));
        }
        let key = (wavelet.id, level);
        if let Some(existing) = self.entries.get(&key) {
            return Ok(existing.clone());
        }
        let built = Arc::new(build_level(wavelet, level));
        self.entries.entry(key).or_insert_with(|| built.clone());
        Ok(built)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the level-`j` filter truncated to `target_len` taps (spec
    /// §3 "Filter may be truncated to the signal length N when L_j > N").
    /// If the dilated filter already fits (`effective_len() <=
    /// target_len`), the untruncated filter from [`Self::get_or_build`] is
    /// returned unchanged — truncation only ever shortens, never pads.
    pub fn get_or_build_truncated(
        &self,
        wavelet: &Wavelet<T>,
        level: usize,
        target_len: usize,
    ) -> Result<Arc<LevelFilter<T>>, VectorWaveError> {
        let full = self.get_or_build(wavelet, level)?;
        if full.effective_len() <= target_len {
            return Ok(full);
        }
        if target_len == 0 {
            return Err(VectorWaveError::invalid_argument(
                crate::error::ErrorContext::new("FilterCache::get_or_build_truncated")
                    .with_wavelet(wavelet.id),
                "truncation target length must be > 0",
                "signals passed to MODWT must be non-empty",
            ));
        }
        let key = (wavelet.id, level, target_len);
        if let Some(existing) = self.truncated.get(&key) {
            return Ok(existing.clone());
        }
        log::debug!(
            "truncating level-{level} filter for wavelet '{}' from {} taps to {target_len} (signal shorter than dilated filter)",
            wavelet.id,
            full.effective_len(),
        );
        let truncate = |taps: &Arc<[T]>| -> Arc<[T]> { taps[..target_len].into() };
        let built = Arc::new(LevelFilter {
            level,
            dec_lo: truncate(&full.dec_lo),
            dec_hi: truncate(&full.dec_hi),
            rec_lo: truncate(&full.rec_lo),
            rec_hi: truncate(&full.rec_hi),
        });
        self.truncated.entry(key).or_insert_with(|| built.clone());
        Ok(built)
    }
}

impl<T: WaveSample> Default for FilterCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide filter cache, one per precision. A single generic `static`
/// can't exist (statics can't be generic), so each precision gets its own
/// named accessor backed by its own `OnceLock`.
pub fn global_cache_f32() -> &'static FilterCache<f32> {
    static CACHE: OnceLock<FilterCache<f32>> = OnceLock::new();
    CACHE.get_or_init(FilterCache::new)
}

pub fn global_cache_f64() -> &'static FilterCache<f64> {
    static CACHE: OnceLock<FilterCache<f64>> = OnceLock::new();
    CACHE.get_or_init(FilterCache::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wavelet::WaveletCatalog;

    #[test]
    fn level_filter_length_matches_atrous_formula() {
        let wavelet: Wavelet<f64> = WaveletCatalog::global().get("db4").unwrap();
        let cache = FilterCache::new();
        let lf = cache.get_or_build(&wavelet, 3).unwrap();
        let l = wavelet.len();
        let stride = 1usize << 2;
        assert_eq!(lf.effective_len(), (l - 1) * stride + 1);
    }

    #[test]
    fn cache_returns_same_allocation() {
        let wavelet: Wavelet<f64> = WaveletCatalog::global().get("haar").unwrap();
        let cache = FilterCache::new();
        let a = cache.get_or_build(&wavelet, 2).unwrap();
        let b = cache.get_or_build(&wavelet, 2).unwrap();
        assert!(Arc::ptr_eq(&a.dec_lo, &b.dec_lo));
    }

    #[test]
    fn truncated_filter_is_shortened_and_cached() {
        let wavelet: Wavelet<f64> = WaveletCatalog::global().get("db4").unwrap();
        let cache = FilterCache::new();
        let full = cache.get_or_build(&wavelet, 4).unwrap();
        assert!(full.effective_len() > 5);
        let truncated = cache.get_or_build_truncated(&wavelet, 4, 5).unwrap();
        assert_eq!(truncated.effective_len(), 5);
        let again = cache.get_or_build_truncated(&wavelet, 4, 5).unwrap();
        assert!(Arc::ptr_eq(&truncated.dec_lo, &again.dec_lo));
    }

    #[test]
    fn truncation_is_noop_when_filter_already_fits() {
        let wavelet: Wavelet<f64> = WaveletCatalog::global().get("haar").unwrap();
        let cache = FilterCache::new();
        let lf = cache.get_or_build_truncated(&wavelet, 1, 1000).unwrap();
        assert_eq!(lf.effective_len(), wavelet.len());
    }

    #[test]
    fn level_zero_is_rejected() {
        let wavelet: Wavelet<f64> = WaveletCatalog::global().get("haar").unwrap();
        let cache = FilterCache::new();
        assert!(cache.get_or_build(&wavelet, 0).is_err());
    }
}
