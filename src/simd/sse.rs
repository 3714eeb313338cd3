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
//! SSE4.2 tap-accumulate kernel (spec §4 C4), x86_64 only. No FMA on the
//! SSE4.2 baseline, so this is a separate multiply then add rather than a
//! single fused instruction — grounded on the teacher's `sse/spectrum_f32.rs`
//! sibling kernel to its AVX one.

#![cfg(target_arch = "x86_64")]

use crate::simd::TapAccumulator;
use std::arch::x86_64::*;

pub struct Sse42F32;

impl TapAccumulator<f32> for Sse42F32 {
    fn madd_row(&self, coeff: f32, row: &[f32], acc: &mut [f32]) {
        debug_assert_eq!(row.len(), acc.len());
        unsafe { madd_row_f32(coeff, row, acc) }
    }
}

#[target_feature(enable = "sse4.2")]
unsafe fn madd_row_f32(coeff: f32, row: &[f32], acc: &mut [f32]) {
    let lanes = row.len();
    let c = _mm_set1_ps(coeff);
    let chunks = lanes / 4;
    for i in 0..chunks {
        let base = i * 4;
        let r = unsafe { _mm_loadu_ps(row.as_ptr().add(base)) };
        let a = unsafe { _mm_loadu_ps(acc.as_ptr().add(base)) };
        let sum = unsafe { _mm_add_ps(a, _mm_mul_ps(c, r)) };
        unsafe { _mm_storeu_ps(acc.as_mut_ptr().add(base), sum) };
    }
    for i in (chunks * 4)..lanes {
        acc[i] += coeff * row[i];
    }
}
