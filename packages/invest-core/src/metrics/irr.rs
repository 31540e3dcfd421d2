//! Internal rate of return.

use crate::{Error, Result};

/// Bisection stops once the bracket is this small relative to its upper end.
const RELATIVE_TOLERANCE: f64 = 4.0 * f64::EPSILON;

/// Bisection and golden-section iteration cap.
const MAX_ITERATIONS: usize = 200;

/// Log-spaced samples between the root bounds when the flows change sign
/// more than once.
const SCAN_POINTS: usize = 2000;

/// A local extremum this close to zero, relative to the magnitude of the
/// terms, counts as a double root.
const TANGENT_TOLERANCE: f64 = 1e-12;

/// Net present value of `cash_flows` discounted at `rate`.
///
/// The first flow is at t = 0 and is not discounted.
pub fn npv(rate: f64, cash_flows: &[f64]) -> f64 {
    let factor = 1.0 + rate;
    cash_flows
        .iter()
        .enumerate()
        .map(|(t, cf)| cf / factor.powi(t as i32))
        .sum()
}

/// Discount rate at which the NPV of `cash_flows` is zero.
///
/// Negative flows are investments, positive flows are returns, one per
/// period. With `x = 1 / (1 + r)` the NPV is the polynomial
/// `sum(cf[t] * x^t)`, and rates above -100% are exactly its positive roots,
/// which lie between the Cauchy bounds of the polynomial. A single sign
/// change in the flows means a single positive root, found by bisecting the
/// whole bound interval. Otherwise the interval is scanned on a log grid and
/// every local dip of |NPV| that stays on one side of zero is searched for a
/// hidden pair of roots. The root closest to zero wins.
///
/// # Errors
///
/// `NoSolution` when there are fewer than two flows, the flows never change
/// sign, or no real root exists above -100%. `InvalidInput` for NaN or
/// infinite flows.
///
/// # Example
///
/// ```rust
/// use invest_core::metrics::{irr, npv};
///
/// let flows = [-100.0, 60.0, 60.0];
/// let rate = irr(&flows).unwrap();
/// assert!(npv(rate, &flows).abs() < 1e-6);
/// ```
pub fn irr(cash_flows: &[f64]) -> Result<f64> {
    if cash_flows.len() < 2 {
        return Err(Error::NoSolution(format!(
            "IRR needs at least 2 cash flows, got {}",
            cash_flows.len()
        )));
    }
    if let Some(cf) = cash_flows.iter().find(|cf| !cf.is_finite()) {
        return Err(Error::InvalidInput(format!("cash flow {cf} is not finite")));
    }

    let has_outflow = cash_flows.iter().any(|&cf| cf < 0.0);
    let has_inflow = cash_flows.iter().any(|&cf| cf > 0.0);
    if !(has_outflow && has_inflow) {
        return Err(Error::NoSolution(
            "cash flows never change sign, so no rate makes the NPV zero".to_string(),
        ));
    }

    positive_roots(trim_zeros(cash_flows))
        .into_iter()
        .map(|x| 1.0 / x - 1.0)
        .min_by(|a, b| a.abs().total_cmp(&b.abs()))
        .ok_or_else(|| {
            Error::NoSolution("no real discount rate above -100% sets the NPV to zero".to_string())
        })
}

/// Strip zero flows from both ends. Leading zeros only factor out powers of
/// `x`, whose root at zero is an infinite rate.
fn trim_zeros(cash_flows: &[f64]) -> &[f64] {
    let start = cash_flows.iter().position(|&cf| cf != 0.0).unwrap_or(0);
    let end = cash_flows
        .iter()
        .rposition(|&cf| cf != 0.0)
        .map_or(start, |i| i + 1);
    &cash_flows[start..end]
}

/// Positive real roots of `poly` (coefficients by ascending power, nonzero at
/// both ends).
fn positive_roots(poly: &[f64]) -> Vec<f64> {
    let n = poly.len() - 1;
    let (constant, lead) = (poly[0], poly[n]);
    let upper = 1.0 + poly[..n].iter().map(|a| (a / lead).abs()).fold(0.0, f64::max);
    let lower = 1.0 / (1.0 + poly[1..].iter().map(|a| (a / constant).abs()).fold(0.0, f64::max));

    if sign_changes(poly) == 1 {
        return vec![bisect(poly, lower, upper)];
    }

    let magnitudes: Vec<f64> = poly.iter().map(|a| a.abs()).collect();
    let xs: Vec<f64> = (0..=SCAN_POINTS)
        .map(|i| lower * (upper / lower).powf(i as f64 / SCAN_POINTS as f64))
        .collect();
    let values: Vec<f64> = xs.iter().map(|&x| scaled_npv(poly, x)).collect();

    let mut roots = Vec::new();
    for i in 0..=SCAN_POINTS {
        if values[i] == 0.0 {
            roots.push(xs[i]);
            continue;
        }
        if i < SCAN_POINTS && values[i + 1] != 0.0 && values[i].signum() != values[i + 1].signum() {
            roots.push(bisect(poly, xs[i], xs[i + 1]));
        }

        if i == 0 || i == SCAN_POINTS {
            continue;
        }
        let (before, here, after) = (values[i - 1], values[i], values[i + 1]);
        let same_side = before.signum() == here.signum() && here.signum() == after.signum();
        if !(same_side && here.abs() <= before.abs() && here.abs() <= after.abs()) {
            continue;
        }

        // Two roots closer than the grid spacing hide inside a dip
        let side = here.signum();
        let (x_min, toward_zero) =
            golden_min(|x| side * scaled_npv(poly, x), xs[i - 1], xs[i + 1]);
        if toward_zero < 0.0 {
            roots.push(bisect(poly, xs[i - 1], x_min));
            roots.push(bisect(poly, x_min, xs[i + 1]));
        } else if toward_zero <= TANGENT_TOLERANCE * scaled_npv(&magnitudes, x_min) {
            roots.push(x_min);
        }
    }
    roots
}

/// `poly(x)` for `x <= 1`, `poly(x) / x^n` beyond. Same sign and roots as
/// the polynomial, without overflow for large `x`.
fn scaled_npv(poly: &[f64], x: f64) -> f64 {
    if x <= 1.0 {
        poly.iter().rev().fold(0.0, |acc, &a| acc * x + a)
    } else {
        let y = 1.0 / x;
        poly.iter().fold(0.0, |acc, &a| acc * y + a)
    }
}

fn sign_changes(poly: &[f64]) -> usize {
    let signs: Vec<f64> = poly.iter().filter(|&&a| a != 0.0).map(|a| a.signum()).collect();
    signs.windows(2).filter(|pair| pair[0] != pair[1]).count()
}

/// Bisect a bracket in `x` whose endpoints have opposite signs.
fn bisect(poly: &[f64], mut lo: f64, mut hi: f64) -> f64 {
    let lo_sign = scaled_npv(poly, lo).signum();

    for _ in 0..MAX_ITERATIONS {
        // Geometric midpoints cross brackets spanning many decades quickly
        let mid = if hi > 2.0 * lo {
            (lo * hi).sqrt()
        } else {
            0.5 * (lo + hi)
        };
        let value = scaled_npv(poly, mid);
        if value == 0.0 || hi - lo <= RELATIVE_TOLERANCE * hi {
            return mid;
        }
        if value.signum() == lo_sign {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    0.5 * (lo + hi)
}

/// Golden-section search for the minimum of `f` on `[lo, hi]`.
fn golden_min(f: impl Fn(f64) -> f64, mut lo: f64, mut hi: f64) -> (f64, f64) {
    let ratio = (5.0_f64.sqrt() - 1.0) / 2.0;
    let mut a = hi - ratio * (hi - lo);
    let mut b = lo + ratio * (hi - lo);
    let (mut fa, mut fb) = (f(a), f(b));

    for _ in 0..MAX_ITERATIONS {
        if hi - lo <= RELATIVE_TOLERANCE * hi {
            break;
        }
        if fa < fb {
            hi = b;
            b = a;
            fb = fa;
            a = hi - ratio * (hi - lo);
            fa = f(a);
        } else {
            lo = a;
            a = b;
            fa = fb;
            b = lo + ratio * (hi - lo);
            fb = f(b);
        }
    }

    if fa < fb {
        (a, fa)
    } else {
        (b, fb)
    }
}
