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
//! MODWT engine (spec §4 C2/C3): single-level convolution, multi-level
//! pyramid decomposition/reconstruction, and a rayon-backed parallel
//! variant.
//!
//! Grounded on the teacher's `cwt_executor.rs` `CommonCwtExecutor<T>` shape
//! (a struct wrapping a wavelet plus options, exposing `execute`/`length`),
//! generalized from an FFT convolution-theorem executor to direct
//! time-domain MODWT convolution — MODWT has no frequency-domain step, so
//! the FFT plumbing itself is not reused, only the "executor struct wraps
//! wavelet + config" shape.

pub mod multilevel;
pub mod parallel;
pub mod single;

pub use multilevel::{DEFAULT_MAX_LEVEL, Decomposition, decompose, max_level, reconstruct, reconstruct_band};
pub use parallel::{CancellationToken, decompose_batch};
pub use single::{Boundary, forward_batch, forward_level, inverse_batch, inverse_level};
