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
//! Aggregate configuration surface (SPEC_FULL.md §1, spec §6 option table).
//!
//! `VectorWaveConfig` is a plain, `serde`-derived struct so an embedding
//! application can load it from TOML/JSON — VectorWave itself performs no
//! file I/O (out of scope per spec §1). `validate()` runs every check in
//! §6's table plus the streaming constructor rules of §4.6 so a caller can
//! fail fast on a whole configuration rather than rediscovering each bound
//! one constructor call at a time.

use crate::error::{ErrorContext, VectorWaveError};
use crate::modwt::multilevel::DEFAULT_MAX_LEVEL;
use crate::modwt::single::Boundary;
use crate::streaming::denoiser::{NoiseEstimator, ThresholdMethod, ThresholdRule};

/// Kernel dispatch preference (spec §6 `execution` option).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ExecutionMode {
    /// Always use the scalar per-signal kernel.
    Scalar,
    /// Always use the SIMD batch kernel, even below
    /// [`crate::simd::MIN_BATCH_FOR_SIMD`].
    Simd,
    /// Let the batch engine choose based on batch size (the default).
    Auto,
}

/// The full recognised configuration surface (spec §6 table).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct VectorWaveConfig {
    pub boundary: Boundary,
    pub wavelet: String,
    pub levels: usize,
    pub block_size: usize,
    pub overlap_ratio: f64,
    pub buffer_multiplier: usize,
    pub threshold_method: ThresholdMethod,
    pub threshold_type: ThresholdRule,
    pub noise_estimation: NoiseEstimator,
    pub noise_window: usize,
    pub max_pool_per_size: usize,
    pub execution: ExecutionMode,
}

impl Default for VectorWaveConfig {
    fn default() -> Self {
        Self {
            boundary: Boundary::Periodic,
            wavelet: "db4".to_string(),
            levels: 4,
            block_size: 1024,
            overlap_ratio: 0.5,
            buffer_multiplier: 4,
            threshold_method: ThresholdMethod::Universal,
            threshold_type: ThresholdRule::Soft,
            noise_estimation: NoiseEstimator::Mad,
            noise_window: 1000,
            max_pool_per_size: 16,
            execution: ExecutionMode::Auto,
        }
    }
}

impl VectorWaveConfig {
    /// Runs every bound spec §6's table and §4.6's streaming constructor
    /// rules place on these fields. Does not touch the wavelet catalog —
    /// `wavelet` is checked for non-emptiness only; resolving it against
    /// [`crate::wavelet::WaveletCatalog`] happens where it is actually used,
    /// since that is the point an unknown identifier becomes meaningful.
    pub fn validate(&self) -> Result<(), VectorWaveError> {
        let ctx = || ErrorContext::new("VectorWaveConfig::validate");
        if self.wavelet.is_empty() {
            return Err(VectorWaveError::invalid_configuration(
                ctx(),
                "wavelet identifier must not be empty",
                "choose a catalog identifier, e.g. \"db4\"",
            ));
        }
        if self.levels == 0 || self.levels > DEFAULT_MAX_LEVEL {
            return Err(VectorWaveError::invalid_configuration(
                ctx().with_sizes([self.levels, DEFAULT_MAX_LEVEL]),
                format!("levels={} must be in 1..={DEFAULT_MAX_LEVEL}", self.levels),
                "lower levels or raise the hard cap deliberately",
            ));
        }
        if self.block_size == 0 {
            return Err(VectorWaveError::invalid_configuration(
                ctx(),
                "block_size must be > 0",
                "choose a block size matching your latency budget, e.g. 1024",
            ));
        }
        if !(0.0..1.0).contains(&self.overlap_ratio) {
            return Err(VectorWaveError::invalid_configuration(
                ctx(),
                format!("overlap_ratio={} must be in [0.0, 1.0)", self.overlap_ratio),
                "pick a ratio in [0.0, 1.0), e.g. 0.5 for 50% overlap",
            ));
        }
        if self.buffer_multiplier < 2 {
            return Err(VectorWaveError::invalid_configuration(
                ctx().with_sizes([self.buffer_multiplier]),
                "buffer_multiplier must be >= 2",
                "the ring must hold at least two blocks",
            ));
        }
        let overlap_size = (self.block_size as f64 * self.overlap_ratio).round() as usize;
        let combined = self.block_size.checked_add(overlap_size).ok_or_else(|| {
            VectorWaveError::invalid_configuration(
                ctx(),
                "block_size + overlap_size overflows",
                "lower block_size or overlap_ratio",
            )
        })?;
        if combined > i32::MAX as usize {
            return Err(VectorWaveError::invalid_configuration(
                ctx().with_sizes([combined]),
                "block_size + overlap_size overflows a signed 32-bit counter",
                "lower block_size or overlap_ratio",
            ));
        }
        const MAX_BUFFER_BYTES: usize = 100 * 1024 * 1024;
        if combined.saturating_mul(8) > MAX_BUFFER_BYTES {
            return Err(VectorWaveError::invalid_configuration(
                ctx().with_sizes([combined]),
                "(block_size + overlap_size) * 8 bytes exceeds the 100 MiB guard",
                "lower block_size or buffer_multiplier",
            ));
        }
        if self.noise_window < 2 {
            return Err(VectorWaveError::invalid_configuration(
                ctx().with_sizes([self.noise_window]),
                "noise_window must be >= 2",
                "a window needs at least two samples to estimate spread",
            ));
        }
        if self.max_pool_per_size < 1 {
            return Err(VectorWaveError::invalid_configuration(
                ctx().with_sizes([self.max_pool_per_size]),
                "max_pool_per_size must be >= 1",
                "allow at least one buffer per bucket",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        VectorWaveConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_block_size_rejected() {
        let mut config = VectorWaveConfig::default();
        config.block_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn overlap_ratio_out_of_range_rejected() {
        let mut config = VectorWaveConfig::default();
        config.overlap_ratio = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn levels_beyond_hard_cap_rejected() {
        let mut config = VectorWaveConfig::default();
        config.levels = DEFAULT_MAX_LEVEL + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn buffer_multiplier_below_two_rejected() {
        let mut config = VectorWaveConfig::default();
        config.buffer_multiplier = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_buffer_rejected() {
        let mut config = VectorWaveConfig::default();
        config.block_size = 20_000_000;
        config.buffer_multiplier = 2;
        assert!(config.validate().is_err());
    }
}
