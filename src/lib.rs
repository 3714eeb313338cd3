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
#![allow(clippy::excessive_precision)]

//! VectorWave: a Maximal Overlap Discrete Wavelet Transform (MODWT) library.
//!
//! Three subsystems, each independently usable:
//!
//! - [`modwt`] — single-level and multi-level MODWT kernels over the
//!   [`wavelet`] catalog, plus a rayon-backed parallel batch variant.
//! - [`simd`] — a Structure-of-Arrays batch engine with per-architecture
//!   kernels behind runtime feature detection.
//! - [`streaming`] — a lock-free SPSC ring buffer feeding a block-wise
//!   streaming MODWT and an online wavelet-shrinkage denoiser.
//!
//! [`memory`] and [`perf`] are supporting fabric: an aligned buffer pool and
//! an empirical per-bucket cost model, respectively. [`config`] aggregates
//! every tunable into one `serde`-derived struct for embedding applications.

pub mod config;
pub mod error;
pub mod filter;
pub mod memory;
pub mod modwt;
pub mod perf;
pub mod sample;
pub mod simd;
pub mod streaming;
pub mod wavelet;

pub use config::{ExecutionMode, VectorWaveConfig};
pub use error::{ErrorContext, VectorWaveError};
pub use filter::{FilterCache, LevelFilter};
pub use modwt::{
    CancellationToken, Decomposition, DEFAULT_MAX_LEVEL, Boundary, decompose, decompose_batch,
    forward_batch, forward_level, inverse_batch, inverse_level, max_level, reconstruct,
    reconstruct_band,
};
pub use sample::WaveSample;
pub use streaming::{
    DenoiseConfig, NoiseEstimator, NoiseWindow, RingBuffer, StreamingDenoiser, StreamingTransform,
    ThresholdMethod, ThresholdRule, denoise,
};
pub use wavelet::{Wavelet, WaveletCatalog, WaveletKind, WaveletProvider};
