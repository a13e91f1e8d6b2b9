//! Tunable constants of the engine.

/// Default chop used when counting significant Schmidt coefficients;
/// inherited from the surrounding MPS engine.
pub const CHOP_THRESHOLD: f64 = 1e-16;

/// Tolerance for reconstruction checks and for deciding whether the
/// retained spectrum needs renormalization.
pub const THRESHOLD: f64 = 1e-9;

/// Maximum number of rescaled kernel retries before giving up.
pub const NUM_SVD_TRIES: usize = 15;

/// Multiplicative rescue factor applied to A between kernel retries.
pub const MUL_FACTOR: f64 = 1e2;

/// Scale applied to each operand when recomputing an underflowed Givens
/// input in extended precision.
pub const TINY_FACTOR: f64 = 1e30;

/// Relative factor for the implicit-QR convergence threshold.
pub const ETA: f64 = 1e-10;

/// Squared-norm floor below which a Householder column/row is treated as
/// already zero during bidiagonalization.
pub const TOL: f64 = 1.5e-34;

/// Absolute threshold for comparing floating-point values against zero.
pub const ZERO_THRESHOLD: f64 = 1e-50;

/// `true` when `a` and `b` agree to within `eps` absolutely.
#[inline]
pub(crate) fn almost_equal(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() < eps
}
