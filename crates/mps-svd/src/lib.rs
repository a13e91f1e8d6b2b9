//! mps-svd — complex SVD engine with Schmidt-coefficient truncation.
//!
//! A matrix-product-state simulator factors one dense complex matrix per
//! bipartition into `U · diag(S) · V†`, truncates the Schmidt spectrum S
//! under a bond-dimension cap and a discarded-weight budget, and
//! renormalizes the survivors to unit 2-norm. This crate is that engine:
//!
//! - [`svd`] dispatches between the in-house Businger–Golub kernel (with
//!   its rescale-and-retry underflow rescue), a dense-library back-end
//!   (faer) and an optional externally installed GPU provider;
//! - [`truncate_and_renormalize`] applies the bond truncation policy and
//!   reports the discarded weight;
//! - [`pack`], [`unpack_u`], [`unpack_v`] convert between the four-block
//!   form a 2-qubit gate application produces and the single matrix the
//!   factorization consumes.
//!
//! # Example
//!
//! ```
//! use mps_svd::{svd, truncate_and_renormalize, ComplexMatrix, c64};
//!
//! let a = ComplexMatrix::from_rows(&[
//!     vec![c64::new(0.0, 0.0), c64::new(1.0, 0.0)],
//!     vec![c64::new(1.0, 0.0), c64::new(0.0, 0.0)],
//! ]);
//! let mut out = svd(a, false).unwrap();
//!
//! let discarded = truncate_and_renormalize(
//!     &mut out.u, &mut out.s, &mut out.v,
//!     2,    // bond-dimension cap
//!     0.0,  // discarded-weight budget
//!     out.v_is_dagger,
//! ).unwrap();
//!
//! assert_eq!(discarded, 0.0);
//! let sum: f64 = out.s.iter().map(|x| x * x).sum();
//! assert!((sum - 1.0).abs() < 1e-9);
//! ```
//!
//! The engine holds no cross-call state; separate calls on disjoint
//! matrices may run in parallel with no coordination.

pub mod backend;
pub mod constants;
pub mod error;
pub mod kernel;
pub mod matrix;
pub mod reshape;
pub mod spectrum;
pub mod validate;

pub use faer::c64;

pub use backend::gpu::{
    install_gpu_backend, GpuSvdAlgorithm, GpuSvdConfig, GpuSvdInfo, GpuSvdOutput, GpuTensorSvd,
};
pub use backend::{svd, SvdOutput};
pub use error::SvdError;
pub use kernel::kernel_svd;
pub use matrix::{Axis, ComplexMatrix};
pub use reshape::{pack, unpack_u, unpack_v, unpack_v_output, unpack_vh};
pub use spectrum::{num_significant, truncate_and_renormalize};
pub use validate::validate_svd;
