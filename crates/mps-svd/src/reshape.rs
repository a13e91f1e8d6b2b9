//! Bipartition reshaper: 4-block ↔ matrix conversions at the boundary to
//! the MPS engine.
//!
//! A 2-qubit operation on adjacent sites hands the engine four equally
//! shaped blocks. [`pack`] assembles them into the single matrix that gets
//! factored,
//!
//! ```text
//! A00 A01
//! A10 A11
//! ```
//!
//! and the unpack functions split the factors back into the block pairs the
//! two sites keep.

use crate::backend::SvdOutput;
use crate::error::SvdError;
use crate::matrix::{Axis, ComplexMatrix};

/// Assemble the four bipartition blocks into one matrix.
///
/// # Errors
///
/// [`SvdError::ConcatMismatch`] when the blocks do not share a shape.
pub fn pack(blocks: &[ComplexMatrix; 4]) -> Result<ComplexMatrix, SvdError> {
    let top = ComplexMatrix::concat(&blocks[0], &blocks[1], Axis::Cols)?;
    let bottom = ComplexMatrix::concat(&blocks[2], &blocks[3], Axis::Cols)?;
    ComplexMatrix::concat(&top, &bottom, Axis::Rows)
}

/// Split U into the two left-site blocks.
pub fn unpack_u(u: &ComplexMatrix) -> Result<[ComplexMatrix; 2], SvdError> {
    let (upper, lower) = u.split(Axis::Rows)?;
    Ok([upper, lower])
}

/// Split V into the two right-site blocks; `v` holds V itself, so it is
/// conjugate-transposed first.
pub fn unpack_v(v: &ComplexMatrix) -> Result<[ComplexMatrix; 2], SvdError> {
    let (left, right) = v.dagger().split(Axis::Cols)?;
    Ok([left, right])
}

/// Split an already conjugate-transposed V† into the two right-site blocks.
pub fn unpack_vh(vh: &ComplexMatrix) -> Result<[ComplexMatrix; 2], SvdError> {
    let (left, right) = vh.split(Axis::Cols)?;
    Ok([left, right])
}

/// Split the V component of a factorization, honoring the back-end's
/// convention recorded in [`SvdOutput::v_is_dagger`].
pub fn unpack_v_output(out: &SvdOutput) -> Result<[ComplexMatrix; 2], SvdError> {
    if out.v_is_dagger {
        unpack_vh(&out.v)
    } else {
        unpack_v(&out.v)
    }
}
