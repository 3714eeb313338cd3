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
//! NEON tap-accumulate kernels (spec §4 C4), aarch64 only. Grounded on the
//! teacher's `neon/spectrum_f32.rs` and `neon/util.rs`: NEON has no runtime
//! feature-detection cost worth memoizing on aarch64 targets where it's
//! part of the baseline ISA, but the crate still probes
//! `is_aarch64_feature_detected!("neon")` for uniformity with the x86_64
//! dispatch path and to keep this kernel unreachable on targets that lack
//! it (older 32-bit ARM is out of scope).

#![cfg(target_arch = "aarch64")]

use crate::simd::TapAccumulator;
use std::arch::aarch64::*;

pub struct NeonF32;
pub struct NeonF64;

impl TapAccumulator<f32> for NeonF32 {
    fn madd_row(&self, coeff: f32, row: &[f32], acc: &mut [f32]) {
        debug_assert_eq!(row.len(), acc.len());
        unsafe { madd_row_f32(coeff, row, acc) }
    }
}

impl TapAccumulator<f64> for NeonF64 {
    fn madd_row(&self, coeff: f64, row: &[f64], acc: &mut [f64]) {
        debug_assert_eq!(row.len(), acc.len());
        unsafe { madd_row_f64(coeff, row, acc) }
    }
}

#[target_feature(enable = "neon")]
unsafe fn madd_row_f32(coeff: f32, row: &[f32], acc: &mut [f32]) {
    let lanes = row.len();
    let c = vdupq_n_f32(coeff);
    let chunks = lanes / 4;
    for i in 0..chunks {
        let base = i * 4;
        let r = unsafe { vld1q_f32(row.as_ptr().add(base)) };
        let a = unsafe { vld1q_f32(acc.as_ptr().add(base)) };
        let sum = unsafe { vfmaq_f32(a, c, r) };
        unsafe { vst1q_f32(acc.as_mut_ptr().add(base), sum) };
    }
    for i in (chunks * 4)..lanes {
        acc[i] += coeff * row[i];
    }
}

#[target_feature(enable = "neon")]
unsafe fn madd_row_f64(coeff: f64, row: &[f64], acc: &mut [f64]) {
    let lanes = row.len();
    let c = vdupq_n_f64(coeff);
    let chunks = lanes / 2;
    for i in 0..chunks {
        let base = i * 2;
        let r = unsafe { vld1q_f64(row.as_ptr().add(base)) };
        let a = unsafe { vld1q_f64(acc.as_ptr().add(base)) };
        let sum = unsafe { vfmaq_f64(a, c, r) };
        unsafe { vst1q_f64(acc.as_mut_ptr().add(base), sum) };
    }
    for i in (chunks * 2)..lanes {
        acc[i] += coeff * row[i];
    }
}
