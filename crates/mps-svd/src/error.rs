//! Error types for the SVD engine.

use thiserror::Error;

/// Errors that can occur during factorization, truncation and reshaping.
#[derive(Debug, Error)]
pub enum SvdError {
    /// The in-house kernel failed to converge even after rescaled retries.
    #[error("SVD did not converge after {tries} rescaled attempts")]
    Convergence { tries: usize },

    /// An external back-end reported a failure.
    #[error("SVD back-end failed: {message}")]
    Backend { message: String },

    /// The factors do not reproduce the input matrix. Indicates a bug in a
    /// back-end and is always fatal.
    #[error(
        "wrong SVD calculation at ({row}, {col}): |A| = {expected}, |U diag(S) V*| = {actual}"
    )]
    Reconstruction {
        row: usize,
        col: usize,
        expected: f64,
        actual: f64,
    },

    /// Concatenated matrices disagree on the shared extent.
    #[error("concat shape mismatch along {axis}: {left} vs {right}")]
    ConcatMismatch {
        axis: &'static str,
        left: usize,
        right: usize,
    },

    /// Splitting at the midpoint requires an even extent.
    #[error("cannot split axis of odd extent {extent}")]
    OddSplit { extent: usize },

    /// In-place resize may only drop trailing rows/columns.
    #[error("resize may only shrink a dimension: {from} -> {to}")]
    ResizeGrow { from: usize, to: usize },

    /// Storage length disagrees with the requested dimensions.
    #[error("shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}
