//! Reconstruction validator.

use crate::constants::{almost_equal, THRESHOLD};
use crate::error::SvdError;
use crate::matrix::ComplexMatrix;

/// Check that `U · diag(S) · V†` reproduces `a` element-wise.
///
/// Pass `v_is_dagger` when `v` already holds V† (library and GPU
/// back-ends). Magnitudes are compared rather than complex values because
/// column-sign and phase conventions differ across back-ends.
///
/// # Errors
///
/// [`SvdError::Reconstruction`] at the first element whose magnitudes
/// disagree by more than the tolerance; this signals a back-end bug and is
/// always fatal.
pub fn validate_svd(
    a: &ComplexMatrix,
    u: &ComplexMatrix,
    s: &[f64],
    v: &ComplexMatrix,
    v_is_dagger: bool,
) -> Result<(), SvdError> {
    let diag_s = ComplexMatrix::diag(s, a.nrows(), a.ncols());
    let product = if v_is_dagger {
        u.matmul(&diag_s).matmul(v)
    } else {
        u.matmul(&diag_s).matmul(&v.dagger())
    };

    for j in 0..a.ncols() {
        for i in 0..a.nrows() {
            let expected = a[(i, j)].norm();
            let actual = product[(i, j)].norm();
            if !almost_equal(expected, actual, THRESHOLD) {
                return Err(SvdError::Reconstruction {
                    row: i,
                    col: j,
                    expected,
                    actual,
                });
            }
        }
    }
    Ok(())
}
