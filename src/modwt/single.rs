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
//! Single-level MODWT convolution (spec §4 C2): one decomposition step
//! producing a detail/smooth pair, and its adjoint reconstruction step.

use crate::error::{ErrorContext, VectorWaveError, try_vec};
use crate::filter::LevelFilter;
use crate::sample::WaveSample;

/// Boundary-handling mode for the convolution sum (spec §4.6).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Boundary {
    /// Circular indexing — the only mode with an exact mathematical inverse.
    Periodic,
    /// Out-of-range taps contribute zero.
    Zero,
    /// Whole-point mirror without repeating the edge sample (`… 2 1 0 1 2 …`).
    Symmetric,
    /// Half-point mirror that repeats the edge sample (`… 1 0 0 1 2 …`).
    Reflect,
}

impl Boundary {
    fn name(self) -> &'static str {
        match self {
            Boundary::Periodic => "periodic",
            Boundary::Zero => "zero",
            Boundary::Symmetric => "symmetric",
            Boundary::Reflect => "reflect",
        }
    }
}

fn validate_signal<T: WaveSample>(
    signal: &[T],
    operation: &'static str,
) -> Result<(), VectorWaveError> {
    if signal.is_empty() {
        return Err(VectorWaveError::invalid_signal(
            ErrorContext::new(operation),
            "signal must not be empty",
        ));
    }
    if signal.iter().any(|x| !x.is_finite()) {
        return Err(VectorWaveError::invalid_signal(
            ErrorContext::new(operation),
            "signal contains a non-finite value",
        ));
    }
    Ok(())
}

/// Resolves `idx` (which may be negative or `>= n`) to an in-range index
/// under `boundary`, or `None` for [`Boundary::Zero`] taps that fall
/// outside the signal (those taps simply contribute nothing).
pub(crate) fn resolve_index(idx: isize, n: usize, boundary: Boundary) -> Option<usize> {
    if n == 0 {
        return None;
    }
    match boundary {
        Boundary::Zero => {
            if idx < 0 || idx >= n as isize {
                None
            } else {
                Some(idx as usize)
            }
        }
        Boundary::Periodic => {
            let n = n as isize;
            Some((((idx % n) + n) % n) as usize)
        }
        Boundary::Symmetric => Some(mirror_index(idx, n, false)),
        Boundary::Reflect => Some(mirror_index(idx, n, true)),
    }
}

fn mirror_index(idx: isize, n: usize, repeat_edge: bool) -> usize {
    if n == 1 {
        return 0;
    }
    let n_i = n as isize;
    let period = if repeat_edge { 2 * n_i } else { 2 * n_i - 2 };
    let mut i = idx % period;
    if i < 0 {
        i += period;
    }
    if repeat_edge {
        if i < n_i { i as usize } else { (2 * n_i - 1 - i) as usize }
    } else if i < n_i {
        i as usize
    } else {
        (2 * n_i - 2 - i) as usize
    }
}

/// Decomposes `input` one level, producing `(detail, smooth)` of the same
/// length as `input` (MODWT is non-decimated, spec §4 invariant).
pub fn forward_level<T: WaveSample>(
    input: &[T],
    level_filter: &LevelFilter<T>,
    boundary: Boundary,
) -> Result<(Vec<T>, Vec<T>), VectorWaveError> {
    validate_signal(input, "modwt::forward_level")?;
    let n = input.len();
    let l = level_filter.dec_lo.len();
    let mut detail = try_vec!(T::zero(); n);
    let mut smooth = try_vec!(T::zero(); n);
    for t in 0..n {
        let mut d = T::zero();
        let mut s = T::zero();
        for tap in 0..l {
            let idx = t as isize - tap as isize;
            if let Some(i) = resolve_index(idx, n, boundary) {
                d += level_filter.dec_hi[tap] * input[i];
                s += level_filter.dec_lo[tap] * input[i];
            }
        }
        detail[t] = d;
        smooth[t] = s;
    }
    Ok((detail, smooth))
}

/// Reconstructs the length-`n` signal that `(detail, smooth)` decomposed
/// from, the adjoint of [`forward_level`]. Only [`Boundary::Periodic`] and
/// [`Boundary::Zero`] have a well-defined adjoint here; mirrored boundaries
/// are rejected (spec §9 Open Questions — the per-sample adjoint of a
/// mirrored forward pass is not itself a mirror, so accepting those modes
/// silently would produce a plausible-looking but wrong reconstruction).
pub fn inverse_level<T: WaveSample>(
    detail: &[T],
    smooth: &[T],
    level_filter: &LevelFilter<T>,
    boundary: Boundary,
) -> Result<Vec<T>, VectorWaveError> {
    if matches!(boundary, Boundary::Symmetric | Boundary::Reflect) {
        return Err(VectorWaveError::unsupported_boundary(
            ErrorContext::new("modwt::inverse_level").with_boundary(boundary.name()),
            "mirrored boundary modes have no well-defined MODWT inverse; use Periodic or Zero",
        ));
    }
    validate_signal(detail, "modwt::inverse_level")?;
    validate_signal(smooth, "modwt::inverse_level")?;
    if detail.len() != smooth.len() {
        return Err(VectorWaveError::invalid_argument(
            ErrorContext::new("modwt::inverse_level")
                .with_sizes([detail.len(), smooth.len()]),
            "detail and smooth must have equal length",
            "forward_level always returns a matching pair; pass them through unmodified",
        ));
    }
    let n = detail.len();
    let l = level_filter.rec_lo.len();
    let mut out = try_vec!(T::zero(); n);
    for t in 0..n {
        let mut acc = T::zero();
        for tap in 0..l {
            let idx = t as isize + tap as isize;
            if let Some(i) = resolve_index(idx, n, boundary) {
                acc += level_filter.rec_lo[tap] * smooth[i] + level_filter.rec_hi[tap] * detail[i];
            }
        }
        out[t] = acc;
    }
    Ok(out)
}

/// Applies [`forward_level`] to every signal in `signals` independently
/// (spec §4.1 C2 `forward_batch`). Unlike [`crate::simd::batch_modwt_soa_f32`]/
/// `_f64`, this is plain sequential per-signal convolution with no SoA
/// conversion — the entry point for callers who want the batch shape
/// without committing to the SIMD layout.
pub fn forward_batch<T: WaveSample>(
    signals: &[Vec<T>],
    level_filter: &LevelFilter<T>,
    boundary: Boundary,
) -> Result<Vec<(Vec<T>, Vec<T>)>, VectorWaveError> {
    signals
        .iter()
        .map(|signal| forward_level(signal, level_filter, boundary))
        .collect()
}

/// Applies [`inverse_level`] to every `(detail, smooth)` pair independently
/// (spec §4.1 C2 `inverse_batch`).
pub fn inverse_batch<T: WaveSample>(
    pairs: &[(Vec<T>, Vec<T>)],
    level_filter: &LevelFilter<T>,
    boundary: Boundary,
) -> Result<Vec<Vec<T>>, VectorWaveError> {
    pairs
        .iter()
        .map(|(detail, smooth)| inverse_level(detail, smooth, level_filter, boundary))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterCache;
    use crate::wavelet::WaveletCatalog;
    use approx::assert_abs_diff_eq;

    #[test]
    fn haar_periodic_round_trip() {
        let wavelet = WaveletCatalog::global().get::<f64>("haar").unwrap();
        let cache = FilterCache::new();
        let lf = cache.get_or_build(&wavelet, 1).unwrap();
        let signal: Vec<f64> = (0..16).map(|i| (i as f64).sin()).collect();
        let (detail, smooth) = forward_level(&signal, &lf, Boundary::Periodic).unwrap();
        let recon = inverse_level(&detail, &smooth, &lf, Boundary::Periodic).unwrap();
        for (a, b) in signal.iter().zip(recon.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn db4_periodic_round_trip_odd_length() {
        let wavelet = WaveletCatalog::global().get::<f64>("db4").unwrap();
        let cache = FilterCache::new();
        let lf = cache.get_or_build(&wavelet, 1).unwrap();
        let signal: Vec<f64> = (0..777).map(|i| (i as f64 * 0.01).cos()).collect();
        let (detail, smooth) = forward_level(&signal, &lf, Boundary::Periodic).unwrap();
        let recon = inverse_level(&detail, &smooth, &lf, Boundary::Periodic).unwrap();
        for (a, b) in signal.iter().zip(recon.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn mirrored_boundary_inverse_rejected() {
        let wavelet = WaveletCatalog::global().get::<f64>("haar").unwrap();
        let cache = FilterCache::new();
        let lf = cache.get_or_build(&wavelet, 1).unwrap();
        let err = inverse_level(&[1.0, 2.0], &[1.0, 2.0], &lf, Boundary::Reflect).unwrap_err();
        assert!(matches!(err, VectorWaveError::UnsupportedBoundary { .. }));
    }

    #[test]
    fn batch_matches_per_signal_calls() {
        let wavelet = WaveletCatalog::global().get::<f64>("haar").unwrap();
        let cache = FilterCache::new();
        let lf = cache.get_or_build(&wavelet, 1).unwrap();
        let signals: Vec<Vec<f64>> = (0..3)
            .map(|k| (0..32).map(|i| (i as f64 * 0.1 + k as f64).cos()).collect())
            .collect();
        let batch = forward_batch(&signals, &lf, Boundary::Periodic).unwrap();
        assert_eq!(batch.len(), signals.len());
        for (signal, (detail, smooth)) in signals.iter().zip(batch.iter()) {
            let (d, s) = forward_level(signal, &lf, Boundary::Periodic).unwrap();
            assert_eq!(detail, &d);
            assert_eq!(smooth, &s);
        }
        let recon = inverse_batch(&batch, &lf, Boundary::Periodic).unwrap();
        for (signal, r) in signals.iter().zip(recon.iter()) {
            for (a, b) in signal.iter().zip(r.iter()) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn empty_signal_rejected() {
        let wavelet = WaveletCatalog::global().get::<f64>("haar").unwrap();
        let cache = FilterCache::new();
        let lf = cache.get_or_build(&wavelet, 1).unwrap();
        let empty: Vec<f64> = Vec::new();
        assert!(forward_level(&empty, &lf, Boundary::Periodic).is_err());
    }
}
