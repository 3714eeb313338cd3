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
//! Multi-level MODWT pyramid (spec §4 C3): cascaded decomposition down to
//! `J` levels, full reconstruction, and band-pass reconstruction that zeros
//! a subset of the pyramid before inverting.

use crate::error::{ErrorContext, VectorWaveError};
use crate::filter::FilterCache;
use crate::modwt::single::{Boundary, forward_level, inverse_level};
use crate::sample::WaveSample;
use crate::wavelet::Wavelet;

/// Hard ceiling on decomposition depth regardless of signal length (spec §4
/// Open Question: kept as a default, overridable via configuration).
pub const DEFAULT_MAX_LEVEL: usize = 10;

/// A full MODWT pyramid: one detail sequence per level plus the final
/// coarse (smooth) sequence, all the same length as the input signal.
#[derive(Clone)]
pub struct Decomposition<T> {
    /// `details[j - 1]` is the level-`j` detail (`W_j`).
    pub details: Vec<Vec<T>>,
    /// The coarsest-level smooth (`V_J`).
    pub smooth: Vec<T>,
    pub levels: usize,
    /// Set when at least one level's dilated filter exceeded the signal
    /// length and was truncated (spec §3 multi-level invariant: "filter
    /// truncation is forced and the result flags this").
    pub truncated: bool,
}

/// Largest level `j` for which the dilated filter (length
/// `(L-1)*2^(j-1)+1`) still fits within `signal_len`, capped at `max_level`.
pub fn max_level(signal_len: usize, filter_len: usize, max_level: usize) -> usize {
    let mut j = 0usize;
    loop {
        let next = j + 1;
        let l_j = (filter_len - 1) * (1usize << (next - 1)) + 1;
        if l_j > signal_len || next > max_level {
            break;
        }
        j = next;
    }
    j
}

/// Validates only the hard administrative bound on decomposition depth
/// (spec §4.2: `1 <= J <= 10` by default, configurable). Whether any
/// individual level's dilated filter actually *fits* `signal_len` is a
/// separate question resolved per level during [`decompose`] by forced
/// truncation rather than rejection here — spec §3's multi-level invariant
/// states that when `(L-1)*(2^J-1) < N` fails, "filter truncation is
/// forced and the result flags this", not that the call errors.
fn validate_levels(levels: usize, signal_len: usize, max_level_cap: usize) -> Result<(), VectorWaveError> {
    if levels == 0 {
        return Err(VectorWaveError::invalid_argument(
            ErrorContext::new("modwt::multilevel").with_sizes([signal_len]),
            "levels must be >= 1",
            "request at least one decomposition level",
        ));
    }
    if levels > max_level_cap {
        return Err(VectorWaveError::invalid_argument(
            ErrorContext::new("modwt::multilevel").with_sizes([signal_len, levels, max_level_cap]),
            format!("requested {levels} levels but the configured hard cap is {max_level_cap}"),
            "lower the requested depth or raise max_level_cap in configuration",
        ));
    }
    Ok(())
}

/// Cascades `forward_level` down to `levels`, each level's smooth feeding
/// the next level's input (spec §4 C3).
pub fn decompose<T: WaveSample>(
    signal: &[T],
    wavelet: &Wavelet<T>,
    levels: usize,
    boundary: Boundary,
    cache: &FilterCache<T>,
) -> Result<Decomposition<T>, VectorWaveError> {
    validate_levels(levels, signal.len(), DEFAULT_MAX_LEVEL)?;
    let n = signal.len();
    let mut details = Vec::with_capacity(levels);
    let mut current = signal.to_vec();
    let mut truncated = false;
    for j in 1..=levels {
        let level_filter = if cache.get_or_build(wavelet, j)?.effective_len() > n {
            truncated = true;
            cache.get_or_build_truncated(wavelet, j, n)?
        } else {
            cache.get_or_build(wavelet, j)?
        };
        let (detail, smooth) = forward_level(&current, &level_filter, boundary)?;
        details.push(detail);
        current = smooth;
    }
    Ok(Decomposition {
        details,
        smooth: current,
        levels,
        truncated,
    })
}

/// Inverts a full pyramid back to the original signal length, coarsest
/// level first.
pub fn reconstruct<T: WaveSample>(
    decomposition: &Decomposition<T>,
    wavelet: &Wavelet<T>,
    boundary: Boundary,
    cache: &FilterCache<T>,
) -> Result<Vec<T>, VectorWaveError> {
    reconstruct_band(
        decomposition,
        wavelet,
        boundary,
        cache,
        &(1..=decomposition.levels).collect::<Vec<_>>(),
        true,
    )
}

/// Reconstructs using only the named detail levels and, if `keep_smooth`,
/// the coarsest smooth — every other component is treated as zero before
/// inverting (spec §4 "band-pass reconstruction"). Passing all levels plus
/// `keep_smooth = true` is equivalent to [`reconstruct`].
pub fn reconstruct_band<T: WaveSample>(
    decomposition: &Decomposition<T>,
    wavelet: &Wavelet<T>,
    boundary: Boundary,
    cache: &FilterCache<T>,
    levels_to_keep: &[usize],
    keep_smooth: bool,
) -> Result<Vec<T>, VectorWaveError> {
    let n = decomposition.smooth.len();
    let mut current = if keep_smooth {
        decomposition.smooth.clone()
    } else {
        vec![T::zero(); n]
    };
    for j in (1..=decomposition.levels).rev() {
        let level_filter = if cache.get_or_build(wavelet, j)?.effective_len() > n {
            cache.get_or_build_truncated(wavelet, j, n)?
        } else {
            cache.get_or_build(wavelet, j)?
        };
        let zeroed;
        let detail: &[T] = if levels_to_keep.contains(&j) {
            &decomposition.details[j - 1]
        } else {
            zeroed = vec![T::zero(); n];
            &zeroed
        };
        current = inverse_level(detail, &current, &level_filter, boundary)?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wavelet::WaveletCatalog;
    use approx::assert_abs_diff_eq;

    #[test]
    fn full_pyramid_round_trips() {
        let wavelet = WaveletCatalog::global().get::<f64>("db4").unwrap();
        let cache = FilterCache::new();
        let signal: Vec<f64> = (0..256).map(|i| (i as f64 * 0.05).sin()).collect();
        let decomposition = decompose(&signal, &wavelet, 4, Boundary::Periodic, &cache).unwrap();
        let recon = reconstruct(&decomposition, &wavelet, Boundary::Periodic, &cache).unwrap();
        for (a, b) in signal.iter().zip(recon.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn band_pass_drops_energy_from_excluded_levels() {
        let wavelet = WaveletCatalog::global().get::<f64>("haar").unwrap();
        let cache = FilterCache::new();
        let signal: Vec<f64> = (0..128).map(|i| (i as f64 * 0.2).sin()).collect();
        let decomposition = decompose(&signal, &wavelet, 3, Boundary::Periodic, &cache).unwrap();
        let full = reconstruct(&decomposition, &wavelet, Boundary::Periodic, &cache).unwrap();
        let partial =
            reconstruct_band(&decomposition, &wavelet, Boundary::Periodic, &cache, &[1], false)
                .unwrap();
        let full_energy: f64 = full.iter().map(|x| x * x).sum();
        let partial_energy: f64 = partial.iter().map(|x| x * x).sum();
        assert!(partial_energy < full_energy);
    }

    #[test]
    fn short_signal_forces_truncation_and_still_round_trips() {
        let wavelet = WaveletCatalog::global().get::<f64>("db4").unwrap();
        let cache = FilterCache::new();
        // db4 has 8 taps; level 3's dilated filter is (8-1)*4+1 = 29 taps,
        // longer than this 20-sample signal, forcing truncation rather
        // than rejection (spec §3 multi-level invariant).
        let signal: Vec<f64> = (0..20).map(|i| (i as f64 * 0.3).sin()).collect();
        let decomposition = decompose(&signal, &wavelet, 3, Boundary::Periodic, &cache).unwrap();
        assert!(decomposition.truncated);
        let recon = reconstruct(&decomposition, &wavelet, Boundary::Periodic, &cache).unwrap();
        assert_eq!(recon.len(), signal.len());
    }

    #[test]
    fn levels_beyond_hard_cap_rejected() {
        let wavelet = WaveletCatalog::global().get::<f64>("db4").unwrap();
        let cache = FilterCache::new();
        let signal: Vec<f64> = (0..1024).map(|i| i as f64).collect();
        assert!(decompose(&signal, &wavelet, DEFAULT_MAX_LEVEL + 1, Boundary::Periodic, &cache).is_err());
    }

    #[test]
    fn zero_levels_rejected() {
        let wavelet = WaveletCatalog::global().get::<f64>("db4").unwrap();
        let cache = FilterCache::new();
        let signal = vec![1.0_f64; 64];
        assert!(decompose(&signal, &wavelet, 0, Boundary::Periodic, &cache).is_err());
    }
}
