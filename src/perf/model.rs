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
//! Empirical per-bucket cost model (spec §4 C8): a quadratic `cost(n) = a
//! n^2 + b n + c` fit per size bucket via online gradient descent, used to
//! pick between the scalar and SIMD batch paths ([`crate::simd`]) and to
//! decide when the memory pool ([`crate::memory`]) should grow a bucket.
//!
//! Grounded on the dependency stack's `dashmap` (already pulled in for the
//! wavelet catalog and filter cache) for the same "many independent keys,
//! occasional concurrent writers" shape.

use crate::error::VectorWaveError;
use dashmap::DashMap;
use std::path::Path;

const MAGIC: [u8; 4] = *b"VWPM";
const FORMAT_VERSION: u32 = 1;

/// Quadratic coefficients for one bucket, plus how many observations went
/// into them (used both for the decaying learning rate and for
/// [`CostModel::needs_recalibration`]).
#[derive(Debug, Copy, Clone, Default)]
pub struct QuadraticCoeffs {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub samples: u64,
}

impl QuadraticCoeffs {
    fn predict(&self, n: f64) -> f64 {
        self.a * n * n + self.b * n + self.c
    }
}

/// An online-fitted cost model, one quadratic per bucket size.
pub struct CostModel {
    buckets: DashMap<usize, QuadraticCoeffs>,
    base_learning_rate: f64,
}

impl CostModel {
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
            base_learning_rate: 1.0e-9,
        }
    }

    /// Predicted cost (in whatever unit `observe` was fed, typically
    /// nanoseconds) for running `n` elements through `bucket_size`'s
    /// kernel. `0.0` for a bucket with no observations yet.
    pub fn predict(&self, bucket_size: usize, n: usize) -> f64 {
        self.buckets
            .get(&bucket_size)
            .map(|c| c.predict(n as f64))
            .unwrap_or(0.0)
    }

    /// Folds one observed `(n, cost)` pair into the bucket's quadratic via
    /// a single gradient-descent step. The learning rate decays as
    /// `base / sqrt(1 + samples)` so the model stabilizes instead of
    /// chasing the most recent noisy measurement forever.
    pub fn observe(&self, bucket_size: usize, n: usize, observed_cost: f64) {
        let mut entry = self.buckets.entry(bucket_size).or_default();
        let nf = n as f64;
        let predicted = entry.predict(nf);
        let error = predicted - observed_cost;
        let lr = self.base_learning_rate / (1.0 + entry.samples as f64).sqrt();
        entry.a -= lr * error * nf * nf;
        entry.b -= lr * error * nf;
        entry.c -= lr * error;
        entry.samples += 1;
    }

    /// A rough symmetric confidence band around the prediction: it narrows
    /// as `samples` grows, widening to the full predicted magnitude at a
    /// single observation where the fit carries essentially no weight.
    /// `None` for a bucket with zero observations — there is nothing to
    /// bound yet.
    pub fn confidence_interval(&self, bucket_size: usize, n: usize) -> Option<(f64, f64)> {
        let entry = self.buckets.get(&bucket_size)?;
        if entry.samples == 0 {
            return None;
        }
        let predicted = entry.predict(n as f64);
        let width = predicted.abs() / (entry.samples as f64).sqrt();
        Some((predicted - width, predicted + width))
    }

    /// Whether `bucket_size` has fewer than `min_samples` observations and
    /// should be recalibrated (e.g. by running a short warm-up benchmark)
    /// before its prediction is trusted for a dispatch decision (spec §4.8:
    /// "recalibrated when ... measurement-count < 100").
    pub fn needs_recalibration(&self, bucket_size: usize, min_samples: u64) -> bool {
        let stale = self
            .buckets
            .get(&bucket_size)
            .map(|c| c.samples < min_samples)
            .unwrap_or(true);
        if stale {
            log::debug!(
                "performance model for bucket {bucket_size} needs recalibration (fewer than {min_samples} samples)",
            );
        }
        stale
    }

    /// Serializes every bucket's coefficients to a small versioned binary
    /// blob: 4-byte magic, 4-byte format version, 4-byte entry count, then
    /// `(bucket: u64, a: f64, b: f64, c: f64, samples: u64)` per entry, all
    /// little-endian.
    pub fn save(&self, path: &Path) -> Result<(), VectorWaveError> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&MAGIC);
        buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        let entries: Vec<(usize, QuadraticCoeffs)> =
            self.buckets.iter().map(|e| (*e.key(), *e.value())).collect();
        buf.extend_from_slice(&(entries.len() as u32).to_le_bytes());
        for (bucket, coeffs) in entries {
            buf.extend_from_slice(&(bucket as u64).to_le_bytes());
            buf.extend_from_slice(&coeffs.a.to_le_bytes());
            buf.extend_from_slice(&coeffs.b.to_le_bytes());
            buf.extend_from_slice(&coeffs.c.to_le_bytes());
            buf.extend_from_slice(&coeffs.samples.to_le_bytes());
        }
        std::fs::write(path, &buf).map_err(|e| {
            VectorWaveError::transform_error(
                crate::error::ErrorContext::new("CostModel::save"),
                format!("failed to write performance model to {}: {e}", path.display()),
            )
        })
    }

    /// Loads a blob written by [`Self::save`], rejecting anything with the
    /// wrong magic or an unsupported format version rather than guessing.
    pub fn load(path: &Path) -> Result<Self, VectorWaveError> {
        let data = std::fs::read(path).map_err(|e| {
            VectorWaveError::transform_error(
                crate::error::ErrorContext::new("CostModel::load"),
                format!("failed to read performance model from {}: {e}", path.display()),
            )
        })?;
        if data.len() < 12 || data[0..4] != MAGIC {
            return Err(VectorWaveError::transform_error(
                crate::error::ErrorContext::new("CostModel::load"),
                "missing or invalid magic header",
            ));
        }
        let version = u32::from_le_bytes(data[4..8].try_into().unwrap());
        if version != FORMAT_VERSION {
            return Err(VectorWaveError::transform_error(
                crate::error::ErrorContext::new("CostModel::load"),
                format!("unsupported performance model format version {version}"),
            ));
        }
        let count = u32::from_le_bytes(data[8..12].try_into().unwrap()) as usize;
        const ENTRY_LEN: usize = 8 + 8 + 8 + 8 + 8;
        let expected_len = 12 + count * ENTRY_LEN;
        if data.len() != expected_len {
            return Err(VectorWaveError::transform_error(
                crate::error::ErrorContext::new("CostModel::load"),
                format!("expected {expected_len} bytes for {count} entries, got {}", data.len()),
            ));
        }
        let model = Self::new();
        let mut offset = 12;
        for _ in 0..count {
            let bucket = u64::from_le_bytes(data[offset..offset + 8].try_into().unwrap()) as usize;
            offset += 8;
            let a = f64::from_le_bytes(data[offset..offset + 8].try_into().unwrap());
            offset += 8;
            let b = f64::from_le_bytes(data[offset..offset + 8].try_into().unwrap());
            offset += 8;
            let c = f64::from_le_bytes(data[offset..offset + 8].try_into().unwrap());
            offset += 8;
            let samples = u64::from_le_bytes(data[offset..offset + 8].try_into().unwrap());
            offset += 8;
            model.buckets.insert(bucket, QuadraticCoeffs { a, b, c, samples });
        }
        Ok(model)
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observing_converges_prediction_toward_truth() {
        let model = CostModel::new();
        let true_cost = |n: f64| 2.0 * n * n + 3.0 * n + 10.0;
        for _ in 0..2000 {
            for &n in &[64usize, 128, 256] {
                model.observe(256, n, true_cost(n as f64));
            }
        }
        let predicted = model.predict(256, 128);
        let actual = true_cost(128.0);
        assert!(
            (predicted - actual).abs() / actual < 0.25,
            "predicted {predicted} too far from actual {actual}"
        );
    }

    #[test]
    fn unknown_bucket_predicts_zero() {
        let model = CostModel::new();
        assert_eq!(model.predict(4096, 100), 0.0);
    }

    #[test]
    fn needs_recalibration_until_enough_samples() {
        let model = CostModel::new();
        assert!(model.needs_recalibration(512, 10));
        for _ in 0..10 {
            model.observe(512, 512, 1000.0);
        }
        assert!(!model.needs_recalibration(512, 10));
    }

    #[test]
    fn save_and_load_round_trip() {
        let model = CostModel::new();
        model.observe(1024, 1024, 5000.0);
        model.observe(2048, 2048, 20000.0);
        let dir = std::env::temp_dir().join(format!("vectorwave-perf-model-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("model.bin");
        model.save(&path).unwrap();
        let loaded = CostModel::load(&path).unwrap();
        assert_eq!(loaded.predict(1024, 1024), model.predict(1024, 1024));
        assert!(!loaded.needs_recalibration(1024, 1));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_rejects_bad_magic() {
        let dir = std::env::temp_dir().join(format!("vectorwave-perf-model-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.bin");
        std::fs::write(&path, b"not a model file at all").unwrap();
        assert!(CostModel::load(&path).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }
}
