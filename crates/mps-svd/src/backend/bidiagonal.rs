//! Dense-library SVD provider backed by faer.
//!
//! faer's bidiagonal SVD solver plays the role of the external dense
//! provider: it receives the column-major input through a zero-copy view,
//! owns its own workspace and algorithm selection, and reports failure
//! through a status value that is mapped onto [`SvdError::Backend`].

use faer::linalg::solvers::Svd;

use crate::c64;
use crate::error::SvdError;
use crate::matrix::ComplexMatrix;

/// Full SVD through faer, consuming `a`.
///
/// Returns `(U, S, V†)` with U of shape m×m, S of length min(m, n) sorted
/// non-increasing, and V† of shape n×n — the dense-library convention, in
/// contrast to the in-house kernel which returns V.
pub(crate) fn bidiagonal_svd(
    a: ComplexMatrix,
) -> Result<(ComplexMatrix, Vec<f64>, ComplexMatrix), SvdError> {
    let m = a.nrows();
    let n = a.ncols();
    let k = m.min(n);

    let decomp: Svd<c64> = Svd::new(a.as_faer_mat()).map_err(|e| SvdError::Backend {
        message: format!("{e:?}"),
    })?;

    let u_mat = decomp.U();
    let s_diag = decomp.S();
    let v_mat = decomp.V();

    let mut s = Vec::with_capacity(k);
    for i in 0..k {
        s.push(faer_traits::math_utils::real(&s_diag[i]));
    }

    let u = ComplexMatrix::from_fn(m, m, |i, j| u_mat[(i, j)]);
    // faer hands back V; the provider contract is V†.
    let vh = ComplexMatrix::from_fn(n, n, |i, j| v_mat[(j, i)].conj());

    Ok((u, s, vh))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn re(v: f64) -> c64 {
        c64::new(v, 0.0)
    }

    #[test]
    fn test_known_spectrum() {
        // A^H A has eigenvalues 25 and 1.
        let a = ComplexMatrix::from_rows(&[vec![re(3.0), re(2.0)], vec![re(2.0), re(3.0)]]);
        let (_, s, _) = bidiagonal_svd(a).unwrap();

        assert_relative_eq!(s[0], 5.0, epsilon = 1e-10);
        assert_relative_eq!(s[1], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_reconstruction_with_v_dagger() {
        let a = ComplexMatrix::from_rows(&[
            vec![c64::new(1.0, 0.5), c64::new(0.0, -1.0)],
            vec![c64::new(2.0, 0.0), c64::new(-0.5, 0.5)],
            vec![c64::new(0.0, 1.0), c64::new(1.0, 1.0)],
        ]);
        let (u, s, vh) = bidiagonal_svd(a.clone()).unwrap();

        let p = u
            .matmul(&ComplexMatrix::diag(&s, 3, 2))
            .matmul(&vh);
        for j in 0..2 {
            for i in 0..3 {
                assert_relative_eq!(p[(i, j)].re, a[(i, j)].re, epsilon = 1e-9);
                assert_relative_eq!(p[(i, j)].im, a[(i, j)].im, epsilon = 1e-9);
            }
        }
    }
}
