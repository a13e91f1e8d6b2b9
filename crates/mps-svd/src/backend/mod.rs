//! Back-end selection and the public factorization entry point.
//!
//! Three interchangeable back-ends sit behind [`svd`]:
//!
//! - the in-house kernel ([`crate::kernel::kernel_svd`]), wrapped in a
//!   rescale-and-retry loop;
//! - a dense-library provider backed by faer ([`bidiagonal`]);
//! - an externally installed GPU tensor-SVD provider ([`gpu`]).
//!
//! An installed GPU provider is always preferred. Otherwise `use_library`
//! picks between the faer provider and the in-house kernel. The two
//! external providers return V†; the in-house kernel returns V. The
//! [`SvdOutput::v_is_dagger`] flag records which convention the caller got.

pub mod bidiagonal;
pub mod gpu;

use crate::constants::{MUL_FACTOR, NUM_SVD_TRIES};
use crate::error::SvdError;
use crate::kernel::{kernel_svd, DegenerateGivens};
use crate::matrix::ComplexMatrix;
use crate::validate::validate_svd;

/// Factorization result. `v` holds V† when `v_is_dagger` is set (library
/// and GPU back-ends), V itself otherwise (in-house kernel).
#[derive(Debug, Clone)]
pub struct SvdOutput {
    pub u: ComplexMatrix,
    pub s: Vec<f64>,
    pub v: ComplexMatrix,
    pub v_is_dagger: bool,
}

/// Factor `a` into `U · diag(S) · V†`, consuming it.
///
/// Back-end selection: an installed GPU provider always wins; otherwise
/// `use_library` routes to the faer provider, and `false` to the in-house
/// kernel with its retry loop. The library path re-checks the
/// reconstruction on every call; the kernel path re-checks it in debug
/// builds only.
///
/// # Errors
///
/// [`SvdError::Convergence`] when the kernel fails even after all rescaled
/// retries, [`SvdError::Backend`] when an external provider reports
/// failure, [`SvdError::Reconstruction`] when a back-end returned factors
/// that do not reproduce `a`.
pub fn svd(a: ComplexMatrix, use_library: bool) -> Result<SvdOutput, SvdError> {
    if let Some(provider) = gpu::installed_backend() {
        let out = provider.tensor_svd(&a, &gpu::GpuSvdConfig::default())?;
        return Ok(SvdOutput {
            u: out.u,
            s: out.s,
            v: out.vh,
            v_is_dagger: true,
        });
    }

    if use_library {
        let original = a.clone();
        let (u, s, vh) = bidiagonal::bidiagonal_svd(a)?;
        validate_svd(&original, &u, &s, &vh, true)?;
        Ok(SvdOutput {
            u,
            s,
            v: vh,
            v_is_dagger: true,
        })
    } else {
        let original = if cfg!(debug_assertions) {
            Some(a.clone())
        } else {
            None
        };
        let (u, s, v) = kernel_svd_with_retry(a)?;
        if let Some(original) = original {
            validate_svd(&original, &u, &s, &v, false)?;
        }
        Ok(SvdOutput {
            u,
            s,
            v,
            v_is_dagger: false,
        })
    }
}

/// Run the in-house kernel, rescuing convergence failures by rescaling.
///
/// The pristine input is kept aside; each retry multiplies it by a further
/// factor of [`MUL_FACTOR`], shifting the computation away from the
/// underflow region without changing the singular subspaces. A success
/// after `k` retries divides every singular value by `MUL_FACTOR^k`, which
/// undoes the scaling exactly.
pub(crate) fn kernel_svd_with_retry(
    a: ComplexMatrix,
) -> Result<(ComplexMatrix, Vec<f64>, ComplexMatrix), SvdError> {
    let pristine = a.clone();
    if let Ok(out) = kernel_svd(a) {
        return Ok(out);
    }

    let mut scaled = pristine;
    for attempt in 1..=NUM_SVD_TRIES {
        scaled.scale(MUL_FACTOR);
        log::debug!("SVD retry #{attempt}: input rescaled by {MUL_FACTOR:e}");
        match kernel_svd(scaled.clone()) {
            Ok((u, mut s, v)) => {
                let undo = MUL_FACTOR.powi(attempt as i32);
                for x in &mut s {
                    *x /= undo;
                }
                return Ok((u, s, v));
            }
            Err(DegenerateGivens) => continue,
        }
    }
    log::warn!("SVD failed: {NUM_SVD_TRIES} rescaled attempts exhausted");
    Err(SvdError::Convergence {
        tries: NUM_SVD_TRIES,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::c64;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_kernel_path_returns_v() {
        let a = ComplexMatrix::from_rows(&[
            vec![c64::new(0.0, 0.0), c64::new(1.0, 0.0)],
            vec![c64::new(1.0, 0.0), c64::new(0.0, 0.0)],
        ]);
        let out = svd(a, false).unwrap();
        assert!(!out.v_is_dagger);
        assert_relative_eq!(out.s[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(out.s[1], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_library_path_returns_v_dagger() {
        let mut rng = StdRng::seed_from_u64(11);
        let a = ComplexMatrix::randn_with_rng(5, 3, &mut rng);
        let out = svd(a, true).unwrap();

        assert!(out.v_is_dagger);
        assert_eq!((out.u.nrows(), out.u.ncols()), (5, 5));
        assert_eq!((out.v.nrows(), out.v.ncols()), (3, 3));
        assert_eq!(out.s.len(), 3);
        for w in out.s.windows(2) {
            assert!(w[0] >= w[1]);
        }
    }

    #[test]
    fn test_backends_agree_on_spectrum() {
        let mut rng = StdRng::seed_from_u64(23);
        let a = ComplexMatrix::randn_with_rng(4, 4, &mut rng);

        let kernel = svd(a.clone(), false).unwrap();
        let library = svd(a, true).unwrap();

        for (&x, &y) in kernel.s.iter().zip(library.s.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_retry_wrapper_is_transparent_on_success() {
        let mut rng = StdRng::seed_from_u64(31);
        let a = ComplexMatrix::randn_with_rng(3, 3, &mut rng);

        let (_, s_direct, _) = kernel_svd(a.clone()).unwrap();
        let (_, s_retry, _) = kernel_svd_with_retry(a).unwrap();
        assert_eq!(s_direct, s_retry);
    }
}
