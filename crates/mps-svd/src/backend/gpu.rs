//! GPU tensor-SVD provider contract.
//!
//! The engine does not link a GPU runtime itself; instead, a host process
//! that has one installs an implementation of [`GpuTensorSvd`] at startup
//! through [`install_gpu_backend`]. Once installed, the dispatcher routes
//! every factorization through it, regardless of the `use_library` flag.
//!
//! Implementations own a device handle and per-call device allocations
//! (input tensor, U, S, V, scratch). They must release every device buffer
//! and every descriptor acquired during the call before returning, on the
//! error path included, and must synchronize their stream before reading
//! the result back. No background work may outlive the call.

use std::sync::OnceLock;

use crate::error::SvdError;
use crate::matrix::ComplexMatrix;

/// Algorithm the device solver should run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GpuSvdAlgorithm {
    /// One-shot QR-iteration solver.
    Gesvd,
    /// Jacobi eigensolve-based solver.
    Gesvdj { tol: f64, max_sweeps: u32 },
}

/// Truncation and algorithm configuration passed to the provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpuSvdConfig {
    /// Coefficients below this absolute value may be cut by the device.
    pub abs_cutoff: f64,
    /// Coefficients below `rel_cutoff · σ_max` may be cut by the device.
    pub rel_cutoff: f64,
    pub algorithm: GpuSvdAlgorithm,
}

impl Default for GpuSvdConfig {
    /// No device-side truncation; the engine truncates on the host. The
    /// Jacobi solver defaults follow the device library's recommendation.
    fn default() -> Self {
        Self {
            abs_cutoff: 0.0,
            rel_cutoff: 0.0,
            algorithm: GpuSvdAlgorithm::Gesvdj {
                tol: 1e-12,
                max_sweeps: 80,
            },
        }
    }
}

/// Runtime truncation report returned by the provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpuSvdInfo {
    /// Sum of squared magnitudes of coefficients the device cut.
    pub discarded_weight: f64,
    /// Shared extent of U and V after device-side truncation.
    pub reduced_extent: usize,
    /// Whether the device solver converged within its sweep budget.
    pub converged: bool,
}

/// Provider result: U with the row extent of the input, S, and V† with the
/// column extent of the input; the shared extent is `info.reduced_extent`.
#[derive(Debug, Clone)]
pub struct GpuSvdOutput {
    pub u: ComplexMatrix,
    pub s: Vec<f64>,
    pub vh: ComplexMatrix,
    pub info: GpuSvdInfo,
}

/// Contract for an externally supplied GPU tensor-SVD.
pub trait GpuTensorSvd: Send + Sync {
    /// Factor `a` on the device. The returned V component is V†.
    ///
    /// # Errors
    ///
    /// [`SvdError::Backend`] for any device or solver failure. Device
    /// resources must already be released when the error is returned.
    fn tensor_svd(&self, a: &ComplexMatrix, config: &GpuSvdConfig)
        -> Result<GpuSvdOutput, SvdError>;
}

static GPU_BACKEND: OnceLock<Box<dyn GpuTensorSvd>> = OnceLock::new();

/// Install the process-wide GPU provider. Call once at startup, before the
/// first factorization; a second call reports the rejected provider back.
pub fn install_gpu_backend(provider: Box<dyn GpuTensorSvd>) -> Result<(), Box<dyn GpuTensorSvd>> {
    GPU_BACKEND.set(provider)
}

pub(crate) fn installed_backend() -> Option<&'static dyn GpuTensorSvd> {
    GPU_BACKEND.get().map(|b| b.as_ref())
}
