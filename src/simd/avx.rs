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
//! AVX2+FMA tap-accumulate kernels (spec §4 C4), x86_64 only.
//!
//! Grounded on the teacher's `avx/spectrum_f32.rs`: raw `std::arch::x86_64`
//! intrinsics, `chunks_exact`-style lane processing with a scalar
//! remainder, gated by a `#[target_feature]` function called only after
//! `is_x86_feature_detected!` has confirmed the CPU supports it.

#![cfg(target_arch = "x86_64")]

use crate::simd::TapAccumulator;
use std::arch::x86_64::*;

pub struct Avx2F32;
pub struct Avx2F64;

impl TapAccumulator<f32> for Avx2F32 {
    fn madd_row(&self, coeff: f32, row: &[f32], acc: &mut [f32]) {
        debug_assert_eq!(row.len(), acc.len());
        unsafe { madd_row_f32(coeff, row, acc) }
    }
}

impl TapAccumulator<f64> for Avx2F64 {
    fn madd_row(&self, coeff: f64, row: &[f64], acc: &mut [f64]) {
        debug_assert_eq!(row.len(), acc.len());
        unsafe { madd_row_f64(coeff, row, acc) }
    }
}

#[target_feature(enable = "avx2,fma")]
unsafe fn madd_row_f32(coeff: f32, row: &[f32], acc: &mut [f32]) {
    let lanes = row.len();
    let c = _mm256_set1_ps(coeff);
    let chunks = lanes / 8;
    for i in 0..chunks {
        let base = i * 8;
        let r = unsafe { _mm256_loadu_ps(row.as_ptr().add(base)) };
        let a = unsafe { _mm256_loadu_ps(acc.as_ptr().add(base)) };
        let sum = unsafe { _mm256_fmadd_ps(c, r, a) };
        unsafe { _mm256_storeu_ps(acc.as_mut_ptr().add(base), sum) };
    }
    for i in (chunks * 8)..lanes {
        acc[i] += coeff * row[i];
    }
}

#[target_feature(enable = "avx2,fma")]
unsafe fn madd_row_f64(coeff: f64, row: &[f64], acc: &mut [f64]) {
    let lanes = row.len();
    let c = _mm256_set1_pd(coeff);
    let chunks = lanes / 4;
    for i in 0..chunks {
        let base = i * 4;
        let r = unsafe { _mm256_loadu_pd(row.as_ptr().add(base)) };
        let a = unsafe { _mm256_loadu_pd(acc.as_ptr().add(base)) };
        let sum = unsafe { _mm256_fmadd_pd(c, r, a) };
        unsafe { _mm256_storeu_pd(acc.as_mut_ptr().add(base), sum) };
    }
    for i in (chunks * 4)..lanes {
        acc[i] += coeff * row[i];
    }
}
