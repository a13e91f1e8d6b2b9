//! In-house complex SVD kernel.
//!
//! Adapted from P. A. Businger and G. H. Golub, Comm. ACM 12, 564 (1969):
//! complex Householder bidiagonalization with phase corrections that keep
//! the bidiagonal core real, followed by an implicit-shift QR sweep on that
//! core, then back-accumulation of the reflectors into U and V.
//!
//! The Givens chase can underflow when the shifted column is built from
//! values near the subnormal range; the affected product is then recomputed
//! in double-double precision ([`twofloat::TwoFloat`]) after scaling each
//! operand up, and the rotation is treated as trivial when the wide result
//! shows the value was merely too small for `f64`. When even that fails,
//! the kernel reports [`DegenerateGivens`]; the caller recovers by
//! rescaling the whole input and retrying.

use twofloat::TwoFloat;

use crate::c64;
use crate::constants::{almost_equal, ETA, TINY_FACTOR, TOL, ZERO_THRESHOLD};
use crate::matrix::ComplexMatrix;

/// Failure marker: a Givens normalization degenerated beyond what the
/// extended-precision rescue can resolve. Recoverable by rescaling the
/// input and calling the kernel again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegenerateGivens;

/// Compute the SVD of `a`, consuming it.
///
/// Returns `(U, S, V)` with U of shape m×m, S of length n sorted
/// non-increasing and non-negative, and V of shape n×n, such that
/// `A = U · diag(S) · V†`. Inputs with m < n are conjugate-transposed on
/// entry and U and V are swapped back on return, so the caller always sees
/// factors matching the original orientation.
///
/// Storage convention: bidiagonalization overwrites `a` in place. After
/// phase 1, column k at and below the diagonal holds the k-th left
/// reflector vector, row k to the right of the superdiagonal holds the
/// k-th right reflector vector, and the pivot positions hold `q·(z + w)`
/// carrying the pivot's phase. Back-accumulation reads the reflectors from
/// exactly these positions, which is why it may divide by `|A(k, k)|`
/// after A has been "destroyed".
pub fn kernel_svd(
    mut a: ComplexMatrix,
) -> Result<(ComplexMatrix, Vec<f64>, ComplexMatrix), DegenerateGivens> {
    let mut m = a.nrows();
    let mut n = a.ncols();

    let mut transposed = false;
    if m < n {
        transposed = true;
        a = a.dagger();
        std::mem::swap(&mut m, &mut n);
    }

    if n == 0 {
        let (u, v) = (ComplexMatrix::identity(m), ComplexMatrix::identity(0));
        return Ok(if transposed { (v, vec![], u) } else { (u, vec![], v) });
    }

    let size = m.max(n);
    let mut b = vec![0.0_f64; size];
    let mut c = vec![0.0_f64; size];
    let mut t = vec![0.0_f64; size];

    // Phase 1: bidiagonalization. b[k] collects the column norms
    // (diagonal), c[k] the row norms (superdiagonal).
    let mut k = 0;
    loop {
        let k1 = k + 1;

        let mut z = 0.0;
        for i in k..m {
            z += a[(i, k)].norm_sqr();
        }
        b[k] = 0.0;
        if TOL < z {
            z = z.sqrt();
            b[k] = z;
            let w = a[(k, k)].norm();
            let q = if almost_equal(w, 0.0, ZERO_THRESHOLD) {
                c64::new(1.0, 0.0)
            } else {
                a[(k, k)] / w
            };
            a[(k, k)] = q * (z + w);

            if k != n - 1 {
                for j in k1..n {
                    let mut q = c64::new(0.0, 0.0);
                    for i in k..m {
                        q += a[(i, k)].conj() * a[(i, j)];
                    }
                    q /= z * (z + w);
                    for i in k..m {
                        let delta = q * a[(i, k)];
                        a[(i, j)] -= delta;
                    }
                }
                // Phase transformation: make the pivot row consistent with
                // a real-positive diagonal.
                let q = -a[(k, k)].conj() / a[(k, k)].norm();
                for j in k1..n {
                    let val = q * a[(k, j)];
                    a[(k, j)] = val;
                }
            }
        }
        if k == n - 1 {
            break;
        }

        let mut z = 0.0;
        for j in k1..n {
            z += a[(k, j)].norm_sqr();
        }
        c[k1] = 0.0;
        if TOL < z {
            z = z.sqrt();
            c[k1] = z;
            let w = a[(k, k1)].norm();
            let q = if almost_equal(w, 0.0, ZERO_THRESHOLD) {
                c64::new(1.0, 0.0)
            } else {
                a[(k, k1)] / w
            };
            a[(k, k1)] = q * (z + w);

            for i in k1..m {
                let mut q = c64::new(0.0, 0.0);
                for j in k1..n {
                    q += a[(k, j)].conj() * a[(i, j)];
                }
                q /= z * (z + w);
                for j in k1..n {
                    let delta = q * a[(k, j)];
                    a[(i, j)] -= delta;
                }
            }
            // Phase transformation.
            let q = -a[(k, k1)].conj() / a[(k, k1)].norm();
            for i in k1..m {
                let val = a[(i, k1)] * q;
                a[(i, k1)] = val;
            }
        }
        k = k1;
    }

    let mut s = vec![0.0_f64; n];
    let mut eps = 0.0_f64;
    for k in 0..n {
        s[k] = b[k];
        t[k] = c[k];
        eps = eps.max(s[k] + t[k]);
    }
    eps *= ETA;

    let mut u = ComplexMatrix::identity(m);
    let mut v = ComplexMatrix::identity(n);

    if eps == 0.0 {
        // Every column and row norm sat below the bidiagonalization floor:
        // the input is numerically zero and identity factors are exact.
        return Ok(if transposed { (v, s, u) } else { (u, s, v) });
    }

    // Phase 2: diagonalization of the real bidiagonal core by implicit QR
    // shifts, processing the trailing index first.
    for k in (0..n).rev() {
        let mut w;
        loop {
            // Locate the deflation index l. t[0] is always zero, so the
            // scan terminates with `jump` set at the latest at l = 0.
            let mut l = 0;
            let mut jump = false;
            for ll in (0..=k).rev() {
                if t[ll].abs() < eps {
                    l = ll;
                    jump = true;
                    break;
                }
                if ll > 0 && s[ll - 1].abs() < eps {
                    l = ll;
                    break;
                }
            }
            if !jump {
                // s[l-1] is negligible: zero out t[l..=k] with rotations
                // folded into column l-1 of U. l >= 1 here since the scan
                // can only take this branch off the s[ll-1] test.
                let mut cs = 0.0;
                let mut sn = 1.0;
                let l1 = l - 1;
                for i in l..=k {
                    let f = sn * t[i];
                    t[i] = cs * t[i];
                    if f.abs() < eps {
                        break;
                    }
                    let h = s[i];
                    let wi = (f * f + h * h).sqrt();
                    s[i] = wi;
                    cs = h / wi;
                    sn = -f / wi;
                    for j in 0..n {
                        let x = u[(j, l1)].re;
                        let y = u[(j, i)].re;
                        u[(j, l1)] = c64::new(x * cs + y * sn, 0.0);
                        u[(j, i)] = c64::new(y * cs - x * sn, 0.0);
                    }
                }
            }
            w = s[k];
            if l == k {
                break;
            }

            // Shift from the trailing 2x2 of the implicitly squared core.
            let mut x = s[l];
            let y = s[k - 1];
            let mut g = t[k - 1];
            let mut h = t[k];
            let mut f = ((y - w) * (y + w) + (g - h) * (g + h)) / (2.0 * h * y);
            g = (f * f + 1.0).sqrt();
            // Sign selection must tolerate f being negative only through
            // rounding noise.
            if f < -1e-13 {
                g = -g;
            }
            f = ((x - w) * (x + w) + (y / (f + g) - h) * h) / x;

            let mut cs = 1.0;
            let mut sn = 1.0;
            let l1 = l + 1;
            for i in l1..=k {
                g = t[i];
                let mut y = s[i];
                h = sn * g;
                g = cs * g;
                let wi = (h * h + f * f).sqrt();
                t[i - 1] = wi;
                cs = f / wi;
                sn = h / wi;
                f = x * cs + g * sn;

                let mut large_f = TwoFloat::from(0.0);
                if almost_equal(f, 0.0, ZERO_THRESHOLD) {
                    log::debug!(
                        "Givens chase underflow: x = {x:e}, cs = {cs:e}, g = {g:e}, sn = {sn:e}"
                    );
                    let large_x = TwoFloat::from(x) * TINY_FACTOR;
                    let large_g = TwoFloat::from(g) * TINY_FACTOR;
                    let large_cs = TwoFloat::from(cs) * TINY_FACTOR;
                    let large_sn = TwoFloat::from(sn) * TINY_FACTOR;
                    large_f = large_x * large_cs + large_g * large_sn;
                }
                g = g * cs - x * sn;
                h = y * sn;
                y *= cs;

                for j in 0..n {
                    let xv = v[(j, i - 1)].re;
                    let wv = v[(j, i)].re;
                    v[(j, i - 1)] = c64::new(xv * cs + wv * sn, 0.0);
                    v[(j, i)] = c64::new(wv * cs - xv * sn, 0.0);
                }

                let tiny_w = h.abs() < 1e-13
                    && f.abs() < 1e-13
                    && large_f.abs() > TwoFloat::from(ZERO_THRESHOLD);
                let wn = (h * h + f * f).sqrt();
                if almost_equal(wn, 0.0, ZERO_THRESHOLD) && !tiny_w {
                    log::debug!("Givens normalization is exactly zero: h = {h:e}, f = {f:e}");
                    return Err(DegenerateGivens);
                }
                s[i - 1] = wn;
                if tiny_w {
                    // h underflowed to zero while the wide product shows f
                    // did not, so the rotation is the identity with w = f.
                    cs = 1.0;
                    sn = 0.0;
                } else {
                    cs = f / wn;
                    sn = h / wn;
                }
                f = cs * g + sn * y;
                x = cs * y - sn * g;
                for j in 0..n {
                    let yu = u[(j, i - 1)].re;
                    let wu = u[(j, i)].re;
                    u[(j, i - 1)] = c64::new(yu * cs + wu * sn, 0.0);
                    u[(j, i)] = c64::new(wu * cs - yu * sn, 0.0);
                }
            }
            t[l] = 0.0;
            t[k] = f;
            s[k] = x;
        }

        // Sign fix on the deflation-time value w rather than s[k].
        if w < -1e-13 {
            s[k] = -w;
            for j in 0..n {
                let val = -v[(j, k)];
                v[(j, k)] = val;
            }
        }
    }

    // Selection sort into non-increasing order, permuting U and V columns
    // in lockstep.
    for k in 0..n {
        let mut g = -1.0;
        let mut jmax = k;
        for i in k..n {
            if g < s[i] {
                g = s[i];
                jmax = i;
            }
        }
        if jmax != k {
            s[jmax] = s[k];
            s[k] = g;
            for i in 0..n {
                let q = v[(i, jmax)];
                v[(i, jmax)] = v[(i, k)];
                v[(i, k)] = q;
            }
            for i in 0..n {
                let q = u[(i, jmax)];
                u[(i, jmax)] = u[(i, k)];
                u[(i, k)] = q;
            }
        }
    }

    // Back-accumulation of the left reflectors into U. The vectors live in
    // the factored A (see the storage convention above).
    for k in (0..n).rev() {
        if !almost_equal(b[k], 0.0, ZERO_THRESHOLD) {
            let q = -a[(k, k)] / a[(k, k)].norm();
            for j in 0..m {
                let val = q * u[(k, j)];
                u[(k, j)] = val;
            }
            for j in 0..m {
                let mut q = c64::new(0.0, 0.0);
                for i in k..m {
                    q += a[(i, k)].conj() * u[(i, j)];
                }
                q /= a[(k, k)].norm() * b[k];
                for i in k..m {
                    let delta = q * a[(i, k)];
                    u[(i, j)] -= delta;
                }
            }
        }
    }

    // Back-accumulation of the right reflectors into V.
    for k in (0..n.saturating_sub(1)).rev() {
        let k1 = k + 1;
        if !almost_equal(c[k1], 0.0, ZERO_THRESHOLD) {
            let q = -a[(k, k1)].conj() / a[(k, k1)].norm();
            for j in 0..n {
                let val = q * v[(k1, j)];
                v[(k1, j)] = val;
            }
            for j in 0..n {
                let mut q = c64::new(0.0, 0.0);
                for i in k1..n {
                    q += a[(k, i)] * v[(i, j)];
                }
                q /= a[(k, k1)].norm() * c[k1];
                for i in k1..n {
                    let delta = q * a[(k, i)].conj();
                    v[(i, j)] -= delta;
                }
            }
        }
    }

    Ok(if transposed { (v, s, u) } else { (u, s, v) })
}
