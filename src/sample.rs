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
use crate::filter::FilterCache;
use num_traits::{AsPrimitive, Float, FromPrimitive, NumAssignOps};
use std::fmt::{Debug, Display};

/// Bound satisfied by the floating-point types VectorWave operates on.
///
/// Every public kernel (MODWT, SIMD batch execution, streaming transform,
/// denoiser) is generic over `WaveSample` rather than hard-coded to `f64`,
/// mirroring the teacher crate's `CwtSample` split between `f32` and `f64`
/// precision. `f32` is useful for embedded/real-time callers that already
/// carry audio or sensor data in single precision; `f64` is the precision
/// the perfect-reconstruction tolerances in the testable properties assume.
pub trait WaveSample:
    Float
    + FromPrimitive
    + NumAssignOps
    + Default
    + Debug
    + Display
    + Send
    + Sync
    + 'static
    + AsPrimitive<f64>
{
    /// Machine epsilon scaled tolerance used for "is this effectively zero"
    /// checks in the denoiser and perfect-reconstruction assertions.
    const DEFAULT_EPS: Self;

    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).unwrap_or_else(Self::zero)
    }

    fn from_usize_lossy(v: usize) -> Self {
        <Self as FromPrimitive>::from_usize(v).unwrap_or_else(Self::zero)
    }

    /// The process-wide dilated-filter cache for this precision. A plain
    /// `static` can't be generic, so each precision routes through its own
    /// `OnceLock` behind this associated function.
    fn global_filter_cache() -> &'static FilterCache<Self>;
}

impl WaveSample for f32 {
    const DEFAULT_EPS: Self = 1.0e-6;

    fn global_filter_cache() -> &'static FilterCache<Self> {
        crate::filter::global_cache_f32()
    }
}

impl WaveSample for f64 {
    const DEFAULT_EPS: Self = 1.0e-10;

    fn global_filter_cache() -> &'static FilterCache<Self> {
        crate::filter::global_cache_f64()
    }
}
