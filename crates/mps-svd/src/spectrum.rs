//! Singular-spectrum utilities: counting, truncating and renormalizing the
//! Schmidt coefficients across a bond.

use crate::constants::{almost_equal, CHOP_THRESHOLD, THRESHOLD};
use crate::error::SvdError;
use crate::matrix::ComplexMatrix;

/// Number of coefficients whose squared magnitude exceeds `chop`.
///
/// # Examples
///
/// ```
/// use mps_svd::num_significant;
///
/// assert_eq!(num_significant(&[1.0, 1e-7, 0.0], 1e-16), 2);
/// ```
pub fn num_significant(s: &[f64], chop: f64) -> usize {
    s.iter().filter(|&&v| v * v > chop).count()
}

/// Truncate the Schmidt spectrum to at most `max_rank` coefficients, drop a
/// trailing run whose total squared weight stays below `truncation_budget`,
/// and renormalize the survivors to unit 2-norm.
///
/// The sweep walks the tail upwards from the cap: a coefficient is dropped
/// while the accumulated squared weight plus its own stays strictly under
/// the budget; the first coefficient that would reach the budget is
/// retained, as is everything above it. Index 0 is never dropped.
///
/// `U` keeps its first `new_rank` columns; `V` keeps its first `new_rank`
/// rows when the back-end produced V† (`v_is_dagger`), columns otherwise.
///
/// Returns the discarded weight: the sum of squared magnitudes of every
/// dropped coefficient, taken from the spectrum *before* renormalization.
pub fn truncate_and_renormalize(
    u: &mut ComplexMatrix,
    s: &mut Vec<f64>,
    v: &mut ComplexMatrix,
    max_rank: usize,
    truncation_budget: f64,
    v_is_dagger: bool,
) -> Result<f64, SvdError> {
    let significant = num_significant(s, CHOP_THRESHOLD);
    let capped = significant.min(max_rank);
    let mut new_rank = capped;

    let mut sum_squares = 0.0;
    for i in (1..capped).rev() {
        let weight = s[i] * s[i];
        if sum_squares + weight < truncation_budget {
            sum_squares += weight;
            new_rank = i;
        } else {
            new_rank = i + 1;
            break;
        }
    }

    let discarded: f64 = s[new_rank..].iter().map(|x| x * x).sum();

    u.truncate_cols(new_rank)?;
    s.truncate(new_rank);
    if v_is_dagger {
        v.truncate_rows(new_rank)?;
    } else {
        v.truncate_cols(new_rank)?;
    }

    let retained: f64 = s.iter().map(|x| x * x).sum();
    if !almost_equal(1.0 - retained, 0.0, THRESHOLD) && retained > 0.0 {
        let sqrt_sum = retained.sqrt();
        for x in s.iter_mut() {
            *x /= sqrt_sum;
        }
    }
    Ok(discarded)
}
