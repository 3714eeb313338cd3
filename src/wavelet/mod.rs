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
//! Wavelet catalog interface (spec §4 C1, §9 "sealed wavelet type hierarchy").
//!
//! The teacher crate modeled a single analytic-wavelet trait
//! (`CwtWavelet<T>`) with concrete implementors (`MorletWavelet`,
//! `CmhatWavelet`, `GaborWavelet`, `HhhatWavelet`) constructed directly by
//! callers. A MODWT filter bank needs four finite coefficient sequences
//! (decomposition low/high, reconstruction low/high) rather than a
//! frequency-domain closure, so the trait shape changes, but the pattern —
//! a narrow trait plus a handful of concrete catalog entries, with no
//! inheritance — is the same.
//!
//! Per §9's "sealed wavelet type hierarchy" redesign note, wavelets are
//! modeled as a tagged variant (`WaveletKind`) carrying the filter tables,
//! not a class hierarchy. Per "provider plugins", the catalog exposes an
//! explicit `register` rather than service-loader discovery.

mod catalog;

use crate::error::{ErrorContext, VectorWaveError};
use crate::sample::WaveSample;
use std::sync::Arc;

/// Classification of a wavelet family (spec §3 "wavelet descriptor").
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum WaveletKind {
    /// g\[n\] = (-1)^n h\[L-1-n\]; reconstruction filters equal decomposition
    /// filters (Haar, Daubechies, Symlets, Coiflets).
    Orthogonal,
    /// Reconstruction filters are distinct from decomposition filters
    /// (Biorthogonal/CDF families). Perfect reconstruction holds only up to
    /// the accepted limitation recorded in DESIGN.md (§9 Open Questions).
    Biorthogonal,
    /// Continuous wavelets (Morlet, Mexican hat, Gabor, …) are out of scope
    /// for this crate (spec §1) — the variant exists so the catalog's type
    /// stays a complete tagged union for callers that enumerate kinds, but
    /// no `Wavelet` with this kind is ever registered here.
    Continuous,
}

/// A wavelet's four filter sequences plus its classification (spec §3).
///
/// Filters are immutable and shared by reference (`Arc<[T]>`) — every level
/// of every decomposition and every batch signal reads the same allocation.
#[derive(Clone)]
pub struct Wavelet<T> {
    pub id: &'static str,
    pub kind: WaveletKind,
    /// Decomposition low-pass (h).
    pub dec_lo: Arc<[T]>,
    /// Decomposition high-pass (g).
    pub dec_hi: Arc<[T]>,
    /// Reconstruction low-pass (h̃). Equals `dec_lo` for orthogonal wavelets.
    pub rec_lo: Arc<[T]>,
    /// Reconstruction high-pass (g̃). Equals `dec_hi` for orthogonal wavelets.
    pub rec_hi: Arc<[T]>,
}

impl<T: WaveSample> Wavelet<T> {
    /// Filter length `L` used throughout §3/§4 for level-effective-length
    /// and max-decomposition-level computations.
    pub fn len(&self) -> usize {
        self.dec_lo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dec_lo.is_empty()
    }

    /// Builds an orthogonal wavelet from its low-pass decomposition filter
    /// alone, deriving `g[n] = (-1)^n h[L-1-n]` and setting the
    /// reconstruction filters equal to the decomposition filters (spec §3).
    pub fn orthogonal(id: &'static str, dec_lo: Vec<T>) -> Result<Self, VectorWaveError> {
        let l = dec_lo.len();
        let mut dec_hi = vec![T::zero(); l];
        for (n, dst) in dec_hi.iter_mut().enumerate() {
            let sign = if n % 2 == 0 { T::one() } else { -T::one() };
            *dst = sign * dec_lo[l - 1 - n];
        }
        let dec_lo: Arc<[T]> = dec_lo.into();
        let dec_hi: Arc<[T]> = dec_hi.into();
        Self::validate_normalization(id, &dec_lo)?;
        Ok(Self {
            id,
            kind: WaveletKind::Orthogonal,
            dec_lo: dec_lo.clone(),
            dec_hi: dec_hi.clone(),
            rec_lo: dec_lo,
            rec_hi: dec_hi,
        })
    }

    /// Builds a biorthogonal wavelet from four independently supplied
    /// filters (spec §3: "reconstruction filters equal decomposition
    /// filters" holds only for orthogonal wavelets).
    pub fn biorthogonal(
        id: &'static str,
        dec_lo: Vec<T>,
        dec_hi: Vec<T>,
        rec_lo: Vec<T>,
        rec_hi: Vec<T>,
    ) -> Result<Self, VectorWaveError> {
        if dec_lo.len() != dec_hi.len() {
            return Err(VectorWaveError::invalid_wavelet(
                ErrorContext::new("Wavelet::biorthogonal").with_wavelet(id),
                format!(
                    "dec_lo len {} != dec_hi len {}",
                    dec_lo.len(),
                    dec_hi.len()
                ),
            ));
        }
        Ok(Self {
            id,
            kind: WaveletKind::Biorthogonal,
            dec_lo: dec_lo.into(),
            dec_hi: dec_hi.into(),
            rec_lo: rec_lo.into(),
            rec_hi: rec_hi.into(),
        })
    }

    fn validate_normalization(id: &'static str, dec_lo: &[T]) -> Result<(), VectorWaveError> {
        let sum_sq = dec_lo.iter().fold(T::zero(), |acc, &h| acc + h * h);
        let one = T::one();
        let tol = T::from_f64(1e-6);
        if (sum_sq - one).abs() > tol {
            return Err(VectorWaveError::invalid_wavelet(
                ErrorContext::new("Wavelet::orthogonal").with_wavelet(id),
                format!("sum(h^2) = {sum_sq}, expected 1.0 within {tol}"),
            ));
        }
        Ok(())
    }
}

pub use catalog::{WaveletCatalog, WaveletProvider};
