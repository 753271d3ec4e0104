//! Real roots of low-degree polynomials.
//!
//! Quadratics use the cancellation-free formulation; cubics use Cardano's
//! formula or Vieta's trigonometric form; quartics use Ferrari's method
//! through the largest root of the resolvent cubic. Cubic and quartic roots
//! are refined with Newton steps on the input polynomial.
//!
//! Roots come back sorted ascending and are never deduplicated: a double
//! root is reported twice, so callers can rely on root-count parity.

use std::f64::consts::PI;

/// Leading coefficients below this are treated as zero.
pub const DEGENERATE_COEF: f64 = 1e-12;

/// Up to four real roots, ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Roots {
    values: [f64; 4],
    len: usize,
}

impl Roots {
    fn push(&mut self, x: f64) {
        debug_assert!(self.len < 4);
        self.values[self.len] = x;
        self.len += 1;
    }

    fn sorted(mut self) -> Self {
        self.values[..self.len].sort_by(f64::total_cmp);
        self
    }

    /// The roots as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.values[..self.len]
    }

    /// Number of real roots found.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when there are no real roots.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over the roots in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.as_slice().iter().copied()
    }
}

/// True when `a` is negligible next to `b` and `c`, so that
/// `a*x^2 + b*x + c = 0` is solved as a linear equation.
///
/// The test is relative: scaling all three coefficients by the same factor
/// never changes the answer.
pub fn quadratic_is_linear(a: f64, b: f64, c: f64) -> bool {
    a.abs() <= f64::EPSILON * (b.abs() + c.abs())
}

/// Solve `a*x^2 + b*x + c = 0`.
///
/// A zero discriminant gives a single root. A leading coefficient that is
/// negligible relative to the others (see [`quadratic_is_linear`]) degrades
/// to the linear equation.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Roots {
    let mut roots = Roots::default();
    if quadratic_is_linear(a, b, c) {
        if b != 0.0 {
            roots.push(-c / b);
        }
        return roots;
    }

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return roots;
    }
    if disc == 0.0 {
        roots.push(-0.5 * b / a);
        return roots;
    }

    let sqrt_disc = disc.sqrt();
    let q = if b >= 0.0 {
        -0.5 * (b + sqrt_disc)
    } else {
        -0.5 * (b - sqrt_disc)
    };
    roots.push(q / a);
    roots.push(c / q);
    roots.sorted()
}

/// Solve `a*x^3 + b*x^2 + c*x + d = 0`.
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> Roots {
    if a.abs() < DEGENERATE_COEF {
        return solve_quadratic(b, c, d);
    }

    // Normalize: x^3 + px^2 + qx + r = 0
    let p = b / a;
    let q = c / a;
    let r = d / a;

    // Depressed cubic via substitution x = t - p/3
    let p2 = p * p;
    let aa = q - p2 / 3.0;
    let bb = r - p * q / 3.0 + 2.0 * p2 * p / 27.0;
    let delta = bb * bb / 4.0 + aa * aa * aa / 27.0;
    let shift = p / 3.0;

    let mut roots = Roots::default();
    if delta > DEGENERATE_COEF {
        // One real root
        let sqrt_delta = delta.sqrt();
        let u = (-bb / 2.0 + sqrt_delta).cbrt();
        let v = (-bb / 2.0 - sqrt_delta).cbrt();
        roots.push(u + v - shift);
    } else if delta.abs() <= DEGENERATE_COEF {
        if aa.abs() < DEGENERATE_COEF && bb.abs() < DEGENERATE_COEF {
            // Triple root
            roots.push(-shift);
        } else {
            // Double root
            let u = (-bb / 2.0).cbrt();
            roots.push(2.0 * u - shift);
            roots.push(-u - shift);
        }
    } else {
        // Three real roots (Vieta's trigonometric solution)
        let m = 2.0 * (-aa / 3.0).sqrt();
        let theta = (3.0 * bb / (aa * m)).clamp(-1.0, 1.0).acos() / 3.0;
        roots.push(m * theta.cos() - shift);
        roots.push(m * (theta - 2.0 * PI / 3.0).cos() - shift);
        roots.push(m * (theta + 2.0 * PI / 3.0).cos() - shift);
    }

    polish(&[1.0, p, q, r], roots).sorted()
}

/// Solve `a*x^4 + b*x^3 + c*x^2 + d*x + e = 0`.
pub fn solve_quartic(a: f64, b: f64, c: f64, d: f64, e: f64) -> Roots {
    if a.abs() < DEGENERATE_COEF {
        return solve_cubic(b, c, d, e);
    }

    // Normalize: x^4 + bx^3 + cx^2 + dx + e = 0
    let (b, c, d, e) = (b / a, c / a, d / a, e / a);

    // Depressed quartic via x = y - b/4: y^4 + p*y^2 + q*y + r = 0
    let b2 = b * b;
    let p = c - 3.0 * b2 / 8.0;
    let q = d - b * c / 2.0 + b2 * b / 8.0;
    let r = e - b * d / 4.0 + b2 * c / 16.0 - 3.0 * b2 * b2 / 256.0;

    // Resolvent cubic m^3 + p*m^2 + (p^2/4 - r)*m - q^2/8 = 0. With q != 0
    // it has a positive root; the largest one is the best conditioned.
    let m = if q == 0.0 {
        0.0
    } else {
        solve_cubic(1.0, p, p * p / 4.0 - r, -q * q / 8.0)
            .iter()
            .fold(0.0, f64::max)
    };

    let mut ys = Roots::default();
    if m > 0.0 {
        // (y^2 + p/2 + m)^2 = 2m (y - q/(4m))^2 factors into two quadratics:
        // y^2 -+ s*y + (p/2 + m +- q/(2s)) with s = sqrt(2m).
        let s = (2.0 * m).sqrt();
        for sign in [1.0, -1.0] {
            let lin = -sign * s;
            let constant = p / 2.0 + m + sign * q / (2.0 * s);
            let disc = lin * lin - 4.0 * constant;
            if disc >= 0.0 {
                let sqrt_disc = disc.sqrt();
                ys.push((-lin - sqrt_disc) / 2.0);
                ys.push((-lin + sqrt_disc) / 2.0);
            }
        }
    } else {
        // Biquadratic: y^4 + p*y^2 + r = 0
        let disc = p * p - 4.0 * r;
        if disc >= 0.0 {
            let sqrt_disc = disc.sqrt();
            for z in [(-p - sqrt_disc) / 2.0, (-p + sqrt_disc) / 2.0] {
                if z >= 0.0 {
                    let y = z.sqrt();
                    ys.push(-y);
                    ys.push(y);
                }
            }
        }
    }

    let mut roots = Roots::default();
    for y in ys.iter() {
        roots.push(y - b / 4.0);
    }
    polish(&[1.0, b, c, d, e], roots).sorted()
}

/// Refine each root with Newton steps, keeping a step only if it reduces
/// the residual.
fn polish(coefs: &[f64], mut roots: Roots) -> Roots {
    for x in &mut roots.values[..roots.len] {
        let mut residual = eval_with_derivative(coefs, *x).0.abs();
        for _ in 0..2 {
            let (value, slope) = eval_with_derivative(coefs, *x);
            if slope == 0.0 {
                break;
            }
            let next = *x - value / slope;
            let next_residual = eval_with_derivative(coefs, next).0.abs();
            if next_residual >= residual {
                break;
            }
            *x = next;
            residual = next_residual;
        }
    }
    roots
}

/// Horner evaluation of a polynomial (highest degree first) and its derivative.
fn eval_with_derivative(coefs: &[f64], x: f64) -> (f64, f64) {
    let mut value = 0.0;
    let mut slope = 0.0;
    for &c in coefs {
        slope = slope * x + value;
        value = value * x + c;
    }
    (value, slope)
}
