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
//! Error taxonomy shared by every VectorWave subsystem (spec §6/§7).
//!
//! Every public entry point fails fast: null/empty/non-finite checks,
//! size-consistency checks, and configuration-bounds checks all happen
//! before any work starts. Internal helpers on hot paths assume validated
//! input and skip the checks again.

use std::fmt;
use thiserror::Error;

/// Structured context attached to an error: which operation, against which
/// wavelet/boundary, at which sizes. Kept separate from the error message so
/// callers can match on it without string-parsing.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub operation: &'static str,
    pub wavelet: Option<&'static str>,
    pub boundary: Option<&'static str>,
    pub sizes: Vec<usize>,
}

impl ErrorContext {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            ..Default::default()
        }
    }

    pub fn with_wavelet(mut self, wavelet: &'static str) -> Self {
        self.wavelet = Some(wavelet);
        self
    }

    pub fn with_boundary(mut self, boundary: &'static str) -> Self {
        self.boundary = Some(boundary);
        self
    }

    pub fn with_sizes(mut self, sizes: impl IntoIterator<Item = usize>) -> Self {
        self.sizes = sizes.into_iter().collect();
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation={}", self.operation)?;
        if let Some(w) = self.wavelet {
            write!(f, ", wavelet={w}")?;
        }
        if let Some(b) = self.boundary {
            write!(f, ", boundary={b}")?;
        }
        if !self.sizes.is_empty() {
            write!(f, ", sizes={:?}", self.sizes)?;
        }
        Ok(())
    }
}

/// The full error taxonomy surfaced to callers (spec §6 table).
///
/// Every variant carries an [`ErrorContext`] and a remediation hint so a
/// caller sees "one error = one message" with enough information to fix the
/// call, per §7.
#[derive(Debug, Error)]
pub enum VectorWaveError {
    #[error("invalid signal ({ctx}): {reason} — {hint}")]
    InvalidSignal {
        reason: String,
        hint: &'static str,
        ctx: ErrorContext,
    },
    #[error("invalid wavelet ({ctx}): {reason} — {hint}")]
    InvalidWavelet {
        reason: String,
        hint: &'static str,
        ctx: ErrorContext,
    },
    #[error("invalid configuration ({ctx}): {reason} — {hint}")]
    InvalidConfiguration {
        reason: String,
        hint: &'static str,
        ctx: ErrorContext,
    },
    #[error("invalid argument ({ctx}): {reason} — {hint}")]
    InvalidArgument {
        reason: String,
        hint: &'static str,
        ctx: ErrorContext,
    },
    #[error("unsupported boundary mode ({ctx}): {reason}")]
    UnsupportedBoundary { reason: String, ctx: ErrorContext },
    #[error("transform error ({ctx}): {reason}")]
    TransformError { reason: String, ctx: ErrorContext },
    #[error("state error ({ctx}): {reason} — {hint}")]
    StateError {
        reason: String,
        hint: &'static str,
        ctx: ErrorContext,
    },
    #[error("operation cancelled ({ctx})")]
    Cancelled { ctx: ErrorContext },
    #[error("failed to allocate buffer of {0} elements")]
    Allocation(usize),
}

impl VectorWaveError {
    pub fn invalid_signal(ctx: ErrorContext, reason: impl Into<String>) -> Self {
        Self::InvalidSignal {
            reason: reason.into(),
            hint: "signals must be non-null, non-empty, and contain only finite values",
            ctx,
        }
    }

    pub fn invalid_wavelet(ctx: ErrorContext, reason: impl Into<String>) -> Self {
        Self::InvalidWavelet {
            reason: reason.into(),
            hint: "orthogonal wavelet filters must satisfy sum(h^2) == 1",
            ctx,
        }
    }

    pub fn invalid_configuration(
        ctx: ErrorContext,
        reason: impl Into<String>,
        hint: &'static str,
    ) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
            hint,
            ctx,
        }
    }

    pub fn invalid_argument(
        ctx: ErrorContext,
        reason: impl Into<String>,
        hint: &'static str,
    ) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
            hint,
            ctx,
        }
    }

    pub fn unsupported_boundary(ctx: ErrorContext, reason: impl Into<String>) -> Self {
        Self::UnsupportedBoundary {
            reason: reason.into(),
            ctx,
        }
    }

    pub fn transform_error(ctx: ErrorContext, reason: impl Into<String>) -> Self {
        Self::TransformError {
            reason: reason.into(),
            ctx,
        }
    }

    pub fn state_error(ctx: ErrorContext, reason: impl Into<String>, hint: &'static str) -> Self {
        Self::StateError {
            reason: reason.into(),
            hint,
            ctx,
        }
    }

    pub fn cancelled(ctx: ErrorContext) -> Self {
        Self::Cancelled { ctx }
    }
}

/// Fallible-allocation vector construction, kept from the teacher crate:
/// rather than let an oversized length abort the process, surface
/// [`VectorWaveError::Allocation`] to the caller.
macro_rules! try_vec {
    ($elem:expr; $n:expr) => {{
        let mut v = Vec::new();
        v.try_reserve_exact($n)
            .map_err(|_| $crate::error::VectorWaveError::Allocation($n))?;
        v.resize($n, $elem);
        v
    }};
}

pub(crate) use try_vec;
