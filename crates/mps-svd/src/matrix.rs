//! Dense complex matrix primitives.
//!
//! [`ComplexMatrix`] is the only container the engine operates on: a dense,
//! column-major rectangular block of `c64` values. Column-major storage
//! matches faer, so the library back-end and the reconstruction validator
//! get zero-copy views of the data.

use std::ops::{Index, IndexMut};

use faer::{Mat, MatMut, MatRef};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::c64;
use crate::error::SvdError;

/// Axis selector for [`concat`](ComplexMatrix::concat) and
/// [`split`](ComplexMatrix::split).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Stack blocks vertically (extend the row count).
    Rows,
    /// Place blocks side by side (extend the column count).
    Cols,
}

/// A dense complex matrix with column-major storage.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexMatrix {
    data: Vec<c64>,
    nrows: usize,
    ncols: usize,
}

impl ComplexMatrix {
    /// Create a zero-initialized matrix.
    ///
    /// # Examples
    ///
    /// ```
    /// use mps_svd::ComplexMatrix;
    ///
    /// let m = ComplexMatrix::zeros(2, 3);
    /// assert_eq!((m.nrows(), m.ncols()), (2, 3));
    /// ```
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            data: vec![c64::new(0.0, 0.0); nrows * ncols],
            nrows,
            ncols,
        }
    }

    /// Create the n×n identity.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = c64::new(1.0, 0.0);
        }
        m
    }

    /// Create a matrix from column-major data.
    ///
    /// # Errors
    ///
    /// Returns [`SvdError::ShapeMismatch`] if the data length does not
    /// equal `nrows * ncols`.
    pub fn from_vec(data: Vec<c64>, nrows: usize, ncols: usize) -> Result<Self, SvdError> {
        if data.len() != nrows * ncols {
            return Err(SvdError::ShapeMismatch {
                expected: nrows * ncols,
                actual: data.len(),
            });
        }
        Ok(Self { data, nrows, ncols })
    }

    /// Build a matrix element by element.
    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> c64) -> Self {
        let mut m = Self::zeros(nrows, ncols);
        for j in 0..ncols {
            for i in 0..nrows {
                m[(i, j)] = f(i, j);
            }
        }
        m
    }

    /// Row-major construction convenience, mostly for tests and doctests.
    ///
    /// # Panics
    ///
    /// Panics if the rows have uneven lengths.
    pub fn from_rows(rows: &[Vec<c64>]) -> Self {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|r| r.len() == ncols),
            "all rows must have length {}",
            ncols
        );
        Self::from_fn(nrows, ncols, |i, j| rows[i][j])
    }

    /// Number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Underlying column-major data.
    #[inline]
    pub fn data(&self) -> &[c64] {
        &self.data
    }

    /// Get element `(i, j)`, or `None` when out of bounds.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Option<&c64> {
        if i < self.nrows && j < self.ncols {
            self.data.get(i + j * self.nrows)
        } else {
            None
        }
    }

    /// Concatenate two matrices along `axis`.
    ///
    /// Along [`Axis::Rows`] the column counts must agree; along
    /// [`Axis::Cols`] the row counts must agree.
    ///
    /// # Examples
    ///
    /// ```
    /// use mps_svd::{Axis, ComplexMatrix};
    ///
    /// let a = ComplexMatrix::identity(2);
    /// let b = ComplexMatrix::zeros(2, 2);
    /// let m = ComplexMatrix::concat(&a, &b, Axis::Cols).unwrap();
    /// assert_eq!((m.nrows(), m.ncols()), (2, 4));
    /// ```
    pub fn concat(a: &Self, b: &Self, axis: Axis) -> Result<Self, SvdError> {
        match axis {
            Axis::Rows => {
                if a.ncols != b.ncols {
                    return Err(SvdError::ConcatMismatch {
                        axis: "columns",
                        left: a.ncols,
                        right: b.ncols,
                    });
                }
                Ok(Self::from_fn(a.nrows + b.nrows, a.ncols, |i, j| {
                    if i < a.nrows {
                        a[(i, j)]
                    } else {
                        b[(i - a.nrows, j)]
                    }
                }))
            }
            Axis::Cols => {
                if a.nrows != b.nrows {
                    return Err(SvdError::ConcatMismatch {
                        axis: "rows",
                        left: a.nrows,
                        right: b.nrows,
                    });
                }
                // Column-major: the second block's columns follow the first's.
                let mut data = Vec::with_capacity(a.data.len() + b.data.len());
                data.extend_from_slice(&a.data);
                data.extend_from_slice(&b.data);
                Ok(Self {
                    data,
                    nrows: a.nrows,
                    ncols: a.ncols + b.ncols,
                })
            }
        }
    }

    /// Split a matrix at the midpoint of `axis` into two equal halves.
    ///
    /// # Errors
    ///
    /// Returns [`SvdError::OddSplit`] if the chosen axis has odd extent.
    pub fn split(&self, axis: Axis) -> Result<(Self, Self), SvdError> {
        match axis {
            Axis::Rows => {
                if self.nrows % 2 != 0 {
                    return Err(SvdError::OddSplit { extent: self.nrows });
                }
                let half = self.nrows / 2;
                let top = Self::from_fn(half, self.ncols, |i, j| self[(i, j)]);
                let bottom = Self::from_fn(half, self.ncols, |i, j| self[(i + half, j)]);
                Ok((top, bottom))
            }
            Axis::Cols => {
                if self.ncols % 2 != 0 {
                    return Err(SvdError::OddSplit { extent: self.ncols });
                }
                let half = self.ncols / 2;
                let split_at = self.nrows * half;
                let left = Self {
                    data: self.data[..split_at].to_vec(),
                    nrows: self.nrows,
                    ncols: half,
                };
                let right = Self {
                    data: self.data[split_at..].to_vec(),
                    nrows: self.nrows,
                    ncols: half,
                };
                Ok((left, right))
            }
        }
    }

    /// Conjugate transpose; always allocates.
    pub fn dagger(&self) -> Self {
        Self::from_fn(self.ncols, self.nrows, |i, j| self[(j, i)].conj())
    }

    /// m×n matrix with `s[i]` on the main diagonal for
    /// `i < min(m, n, s.len())`, zeros elsewhere.
    pub fn diag(s: &[f64], nrows: usize, ncols: usize) -> Self {
        let mut m = Self::zeros(nrows, ncols);
        for (i, &v) in s.iter().enumerate().take(nrows.min(ncols)) {
            m[(i, i)] = c64::new(v, 0.0);
        }
        m
    }

    /// Drop trailing rows in place, keeping the first `r`.
    ///
    /// # Errors
    ///
    /// Returns [`SvdError::ResizeGrow`] if `r > nrows`; growth is never
    /// allowed.
    pub fn truncate_rows(&mut self, r: usize) -> Result<(), SvdError> {
        if r > self.nrows {
            return Err(SvdError::ResizeGrow {
                from: self.nrows,
                to: r,
            });
        }
        if r == self.nrows {
            return Ok(());
        }
        // Repack columns leftwards; reads never precede writes since r < nrows.
        for j in 0..self.ncols {
            for i in 0..r {
                self.data[i + j * r] = self.data[i + j * self.nrows];
            }
        }
        self.data.truncate(r * self.ncols);
        self.nrows = r;
        Ok(())
    }

    /// Drop trailing columns in place, keeping the first `c`.
    ///
    /// # Errors
    ///
    /// Returns [`SvdError::ResizeGrow`] if `c > ncols`.
    pub fn truncate_cols(&mut self, c: usize) -> Result<(), SvdError> {
        if c > self.ncols {
            return Err(SvdError::ResizeGrow {
                from: self.ncols,
                to: c,
            });
        }
        self.data.truncate(self.nrows * c);
        self.ncols = c;
        Ok(())
    }

    /// Multiply every element by a real factor in place.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.data {
            *v *= factor;
        }
    }

    /// View the data as an immutable faer matrix (zero-copy).
    #[inline]
    pub fn as_faer_mat(&self) -> MatRef<'_, c64> {
        MatRef::from_column_major_slice(&self.data, self.nrows, self.ncols)
    }

    /// View the data as a mutable faer matrix (zero-copy).
    #[inline]
    pub fn as_faer_mat_mut(&mut self) -> MatMut<'_, c64> {
        MatMut::from_column_major_slice_mut(&mut self.data, self.nrows, self.ncols)
    }

    /// Copy a faer matrix into a new [`ComplexMatrix`].
    pub fn from_faer(mat: MatRef<'_, c64>) -> Self {
        Self::from_fn(mat.nrows(), mat.ncols(), |i, j| mat[(i, j)])
    }

    /// Matrix product through faer.
    ///
    /// # Panics
    ///
    /// Panics if the inner dimensions disagree.
    pub fn matmul(&self, rhs: &Self) -> Self {
        assert_eq!(
            self.ncols, rhs.nrows,
            "inner dimensions must agree: {} vs {}",
            self.ncols, rhs.nrows
        );
        let product: Mat<c64> = self.as_faer_mat() * rhs.as_faer_mat();
        Self::from_faer(product.as_ref())
    }

    /// Matrix with independent standard complex normal entries
    /// (real and imaginary parts N(0, 1/2), so E|z|² = 1), drawn from the
    /// supplied RNG for reproducibility.
    pub fn randn_with_rng<R: Rng>(nrows: usize, ncols: usize, rng: &mut R) -> Self {
        let scale = std::f64::consts::FRAC_1_SQRT_2;
        Self::from_fn(nrows, ncols, |_, _| {
            c64::new(
                rng.sample::<f64, _>(StandardNormal) * scale,
                rng.sample::<f64, _>(StandardNormal) * scale,
            )
        })
    }
}

impl Index<(usize, usize)> for ComplexMatrix {
    type Output = c64;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &c64 {
        debug_assert!(i < self.nrows && j < self.ncols);
        &self.data[i + j * self.nrows]
    }
}

impl IndexMut<(usize, usize)> for ComplexMatrix {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut c64 {
        debug_assert!(i < self.nrows && j < self.ncols);
        &mut self.data[i + j * self.nrows]
    }
}
