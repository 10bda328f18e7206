/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 26/02/2024
Last Modified: 14/06/2024
License: MIT
*/

//! Closed-form moment integrals of the boundary-element kernels over one
//! straight source segment.
//!
//! The segment occupies [y1, y2] on the local y-axis and the field point
//! sits at perpendicular offset x (see `convert_pq`). With the segment
//! parameter s = (y - ym)/(y2 - y1) in [-1/2, 1/2]:
//!
//! * `W`, `V` are the 0th and 1st s-moments of the double-layer kernel
//!   x / (x^2 + y^2),
//! * `M`, `L`, `K`, `J` are the 0th..3rd s-moments of the single-layer
//!   kernel ln sqrt(x^2 + y^2),
//!
//! each negated and divided by 2 pi. The sign and scale follow from the
//! collocation system: the diagonal angle matrix supplies the free term
//! +theta/(2 pi) of the boundary integral equation, which puts the
//! principal-value moments on the other side of the equation, so the
//! interior potential comes out as cgv.bcv - vgv.bvv with no further
//! normalization. The on-segment branch is the x -> 0 limit: the
//! double-layer principal value over the point's own straight segment
//! vanishes and the log moments keep their finite parts. First- and
//! second-derivative variants (with respect to the field point, in the
//! local frame) carry the same sign but not the 1/(2 pi); the field
//! evaluator divides by 2 pi once.

use std::f64::consts::PI;

use crate::algorithms::atan3;
use crate::structures::{MatrixElement, Point2D, Tensor2};

/// y * ln(y^2) continued by 0 at y = 0.
#[inline]
fn y_ln_y2(y: f64) -> f64 {
    if y == 0f64 {
        0f64
    } else {
        y * (y * y).ln()
    }
}

/// y^2 * (ln(y^2) - 1) continued by 0 at y = 0.
#[inline]
fn y2_ln_y2_m1(y: f64) -> f64 {
    if y == 0f64 {
        0f64
    } else {
        y * y * ((y * y).ln() - 1f64)
    }
}

/// Raw s-moments (I0..I3) of ln sqrt(x^2 + y^2) about y, in the
/// monomial basis {1, y, y^2, y^3}; the caller recenters onto s.
fn log_moments(x: f64, y1: f64, y2: f64, on_segment: bool) -> (f64, f64, f64, f64) {
    let d = y2 - y1;
    if on_segment {
        let l1 = if y1 == 0f64 { 0f64 } else { (y1 * y1).ln() };
        let l2 = if y2 == 0f64 { 0f64 } else { (y2 * y2).ln() };
        let i0 = 0.5 * (y_ln_y2(y2) - y_ln_y2(y1)) - d;
        let i1 = 0.25 * (y2_ln_y2_m1(y2) - y2_ln_y2_m1(y1));
        let i2 = (y2 * y2 * y2 * l2 - y1 * y1 * y1 * l1) / 6f64
            - (y2 * y2 * y2 - y1 * y1 * y1) / 9f64;
        let i3 = (y2 * y2 * y2 * y2 * l2 - y1 * y1 * y1 * y1 * l1) / 8f64
            - (y2 * y2 * y2 * y2 - y1 * y1 * y1 * y1) / 16f64;
        (i0, i1, i2, i3)
    } else {
        let r1sq = x * x + y1 * y1;
        let r2sq = x * x + y2 * y2;
        let l1 = r1sq.ln();
        let l2 = r2sq.ln();
        let t = atan3(y2, y1, x);
        let i0 = 0.5 * (y2 * l2 - y1 * l1) - d + x * t;
        let i1 = 0.25 * (r2sq * (l2 - 1f64) - r1sq * (l1 - 1f64));
        let i2 = (y2 * y2 * y2 * l2 - y1 * y1 * y1 * l1) / 6f64
            - (y2 * y2 * y2 - y1 * y1 * y1) / 9f64
            + x * x * d / 3f64
            - x * x * x * t / 3f64;
        let x4 = x * x * x * x;
        let i3 = ((y2 * y2 * y2 * y2 - x4) * l2 - (y1 * y1 * y1 * y1 - x4) * l1) / 8f64
            - (y2 * y2 * y2 * y2 - y1 * y1 * y1 * y1) / 16f64
            + x * x * (y2 * y2 - y1 * y1) / 8f64;
        (i0, i1, i2, i3)
    }
}

/// Potential (double-layer) terms (V, W). `on_segment` selects the
/// principal-value branch for a field point on the source segment.
pub fn potential_terms(x: f64, y1: f64, y2: f64, on_segment: bool) -> (f64, f64) {
    if on_segment {
        return (0f64, 0f64);
    }
    let d = y2 - y1;
    let ym = 0.5 * (y1 + y2);
    let t = atan3(y2, y1, x);
    let lg = ((x * x + y2 * y2) / (x * x + y1 * y1)).ln();
    let w = -t / (2f64 * PI);
    let v = -(0.5 * x * lg - ym * t) / d / (2f64 * PI);
    (v, w)
}

/// Current (single-layer) terms (J, K, L, M).
pub fn current_terms(x: f64, y1: f64, y2: f64, on_segment: bool) -> (f64, f64, f64, f64) {
    let d = y2 - y1;
    let ym = 0.5 * (y1 + y2);
    let (i0, i1, i2, i3) = log_moments(x, y1, y2, on_segment);
    let inv = -1f64 / (2f64 * PI);
    let m = i0 * inv;
    let l = (i1 - ym * i0) / d * inv;
    let k = (i2 - 2f64 * ym * i1 + ym * ym * i0) / (d * d) * inv;
    let j = (i3 - 3f64 * ym * i2 + 3f64 * ym * ym * i1 - ym * ym * ym * i0) / (d * d * d) * inv;
    (j, k, l, m)
}

/// Inverse-power moments A_n = int y^n / r^2, D_n = int y^n / r^4,
/// E_n = int y^n / r^6 over the segment. Only needed off the boundary;
/// the x = 0 guards cover a field point collinear with a segment it does
/// not touch.
struct InversePowerMoments {
    a: [f64; 6],
    d: [f64; 6],
    e: [f64; 6],
}

fn inverse_power_moments(x: f64, y1: f64, y2: f64) -> InversePowerMoments {
    let dy = y2 - y1;
    let r1sq = x * x + y1 * y1;
    let r2sq = x * x + y2 * y2;
    let t = atan3(y2, y1, x);
    let lg = (r2sq / r1sq).ln();

    let a0 = if x != 0f64 { t / x } else { 1f64 / y1 - 1f64 / y2 };
    let a1 = 0.5 * lg;
    let a2 = dy - x * t;
    let a3 = 0.5 * (y2 * y2 - y1 * y1) - x * x * a1;
    let a4 = (y2 * y2 * y2 - y1 * y1 * y1) / 3f64 - x * x * a2;
    let a5 = (y2 * y2 * y2 * y2 - y1 * y1 * y1 * y1) / 4f64 - x * x * a3;

    let d0 = if x != 0f64 {
        (y2 / r2sq - y1 / r1sq) / (2f64 * x * x) + t / (2f64 * x * x * x)
    } else {
        (1f64 / (y1 * y1 * y1) - 1f64 / (y2 * y2 * y2)) / 3f64
    };
    let d1 = 0.5 * (1f64 / r1sq - 1f64 / r2sq);
    let d2 = a0 - x * x * d0;
    let d3 = a1 - x * x * d1;
    let d4 = a2 - x * x * d2;
    let d5 = a3 - x * x * d3;

    let e0 = if x != 0f64 {
        (y2 / (r2sq * r2sq) - y1 / (r1sq * r1sq)) / (4f64 * x * x) + 3f64 * d0 / (4f64 * x * x)
    } else {
        (1f64 / (y1 * y1 * y1 * y1 * y1) - 1f64 / (y2 * y2 * y2 * y2 * y2)) / 5f64
    };
    let e1 = 0.25 * (1f64 / (r1sq * r1sq) - 1f64 / (r2sq * r2sq));
    let e2 = d0 - x * x * e0;
    let e3 = d1 - x * x * e1;
    let e4 = d2 - x * x * e2;
    let e5 = d3 - x * x * e3;

    InversePowerMoments {
        a: [a0, a1, a2, a3, a4, a5],
        d: [d0, d1, d2, d3, d4, d5],
        e: [e0, e1, e2, e3, e4, e5],
    }
}

/// Recenters monomial moments f_n = int y^n g dy onto the segment
/// parameter: returns the s^k-weighted integrals for k = 0..3.
#[inline]
fn recenter(f: [f64; 4], ym: f64, d: f64) -> [f64; 4] {
    let s0 = f[0];
    let s1 = (f[1] - ym * f[0]) / d;
    let s2 = (f[2] - 2f64 * ym * f[1] + ym * ym * f[0]) / (d * d);
    let s3 = (f[3] - 3f64 * ym * f[2] + 3f64 * ym * ym * f[1] - ym * ym * ym * f[0])
        / (d * d * d);
    [s0, s1, s2, s3]
}

/// Gradients of (V, W) with respect to the field point, in the local
/// frame (x = segment normal, y = along segment). Not normalized by 2 pi.
pub fn potential_terms_grad(x: f64, y1: f64, y2: f64) -> (Point2D, Point2D) {
    let d = y2 - y1;
    let ym = 0.5 * (y1 + y2);
    let m = inverse_power_moments(x, y1, y2);
    // kernel gradient: d/dP of x/r^2 is -((y^2-x^2)/r^4, -2xy/r^4)
    let gx = [
        m.d[2] - x * x * m.d[0],
        m.d[3] - x * x * m.d[1],
        m.d[4] - x * x * m.d[2],
        m.d[5] - x * x * m.d[3],
    ];
    let gy = [m.d[1], m.d[2], m.d[3], m.d[4]];
    let sx = recenter(gx, ym, d);
    let sy = recenter(gy, ym, d);
    let w1 = Point2D::new(sx[0], -2f64 * x * sy[0]);
    let v1 = Point2D::new(sx[1], -2f64 * x * sy[1]);
    (v1, w1)
}

/// Gradients of (J, K, L, M) in the local frame. Not normalized by 2 pi.
pub fn current_terms_grad(x: f64, y1: f64, y2: f64) -> (Point2D, Point2D, Point2D, Point2D) {
    let d = y2 - y1;
    let ym = 0.5 * (y1 + y2);
    let m = inverse_power_moments(x, y1, y2);
    // kernel gradient: d/dP of ln r is -(x/r^2, y/r^2)
    let gx = [m.a[0], m.a[1], m.a[2], m.a[3]];
    let gy = [m.a[1], m.a[2], m.a[3], m.a[4]];
    let sx = recenter(gx, ym, d);
    let sy = recenter(gy, ym, d);
    let grad = |k: usize| Point2D::new(x * sx[k], sy[k]);
    (grad(3), grad(2), grad(1), grad(0))
}

/// Hessians of (V, W) in the local frame. Not normalized by 2 pi.
pub fn potential_terms_hessian(x: f64, y1: f64, y2: f64) -> (Tensor2, Tensor2) {
    let d = y2 - y1;
    let ym = 0.5 * (y1 + y2);
    let m = inverse_power_moments(x, y1, y2);
    // d2/dP2 of x/r^2: xx = 2x(x^2-3y^2)/r^6, xy = 2y(3x^2-y^2)/r^6, yy = -xx
    let hxx = [
        2f64 * x * (x * x * m.e[0] - 3f64 * m.e[2]),
        2f64 * x * (x * x * m.e[1] - 3f64 * m.e[3]),
        2f64 * x * (x * x * m.e[2] - 3f64 * m.e[4]),
        2f64 * x * (x * x * m.e[3] - 3f64 * m.e[5]),
    ];
    let hxy = [
        2f64 * (3f64 * x * x * m.e[1] - m.e[3]),
        2f64 * (3f64 * x * x * m.e[2] - m.e[4]),
        2f64 * (3f64 * x * x * m.e[3] - m.e[5]),
        0f64, // s^3 moment unused for the 2-basis
    ];
    let sxx = recenter(hxx, ym, d);
    let sxy = recenter(hxy, ym, d);
    let w2 = Tensor2::new(-sxx[0], -sxy[0], -sxy[0], sxx[0]);
    let v2 = Tensor2::new(-sxx[1], -sxy[1], -sxy[1], sxx[1]);
    (v2, w2)
}

/// Hessians of (J, K, L, M) in the local frame. Not normalized by 2 pi.
pub fn current_terms_hessian(x: f64, y1: f64, y2: f64) -> (Tensor2, Tensor2, Tensor2, Tensor2) {
    let d = y2 - y1;
    let ym = 0.5 * (y1 + y2);
    let m = inverse_power_moments(x, y1, y2);
    // d2/dP2 of ln r: xx = (y^2-x^2)/r^4, xy = -2xy/r^4, yy = -xx
    let hxx = [
        m.d[2] - x * x * m.d[0],
        m.d[3] - x * x * m.d[1],
        m.d[4] - x * x * m.d[2],
        m.d[5] - x * x * m.d[3],
    ];
    let hxy = [m.d[1], m.d[2], m.d[3], m.d[4]];
    let sxx = recenter(hxx, ym, d);
    let sxy = recenter(hxy, ym, d);
    let hess = |k: usize| {
        Tensor2::new(-sxx[k], 2f64 * x * sxy[k], 2f64 * x * sxy[k], sxx[k])
    };
    (hess(3), hess(2), hess(1), hess(0))
}

/// Basis change from the monomial moments to the segment's Chebyshev-style
/// basis for the two potential shape functions: (V, W) -> (W, 4V).
pub fn p2c_2basis<T: MatrixElement>(v: T, w: T) -> (T, T) {
    (w, v.scale(4f64))
}

/// Basis change for the four current shape functions:
/// (J, K, L, M) -> (M, 4L, 16K - M, 64J - 8L).
pub fn p2c_4basis<T: MatrixElement>(j: T, k: T, l: T, m: T) -> (T, T, T, T) {
    (
        m,
        l.scale(4f64),
        k.scale(16f64) - m,
        j.scale(64f64) - l.scale(8f64),
    )
}

/// Chebyshev coefficients of the linear boundary voltage on one segment
/// from its node jump and mean: (v2 - v1, (v1 + v2)/2) -> (a0, a1).
pub fn p2c_2coeff(v: f64, w: f64) -> (f64, f64) {
    (w, v / 4f64)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algorithms::{convert_pq, rotate_to_pq};
    use crate::structures::Point2D;
    use std::f64::consts::PI;

    // Composite Simpson quadrature of an s-weighted kernel moment.
    fn quad<F: Fn(f64) -> f64>(y1: f64, y2: f64, f: F) -> f64 {
        let n = 4000usize; // even
        let h = (y2 - y1) / n as f64;
        let mut sum = f(y1) + f(y2);
        for i in 1..n {
            let w = if i % 2 == 1 { 4f64 } else { 2f64 };
            sum += w * f(y1 + i as f64 * h);
        }
        sum * h / 3f64
    }

    fn s_of(y: f64, y1: f64, y2: f64) -> f64 {
        (y - 0.5 * (y1 + y2)) / (y2 - y1)
    }

    #[test]
    fn test_potential_terms_match_quadrature() {
        // the terms are the negated kernel moments over 2 pi
        let (x, y1, y2) = (0.7, -0.4, 1.1);
        let (v, w) = potential_terms(x, y1, y2, false);
        let wq = -quad(y1, y2, |y| x / (x * x + y * y)) / (2.0 * PI);
        let vq = -quad(y1, y2, |y| s_of(y, y1, y2) * x / (x * x + y * y)) / (2.0 * PI);
        assert!((w - wq).abs() < 1e-10, "W {} vs {}", w, wq);
        assert!((v - vq).abs() < 1e-10, "V {} vs {}", v, vq);
    }

    #[test]
    fn test_current_terms_match_quadrature() {
        let (x, y1, y2) = (0.45, -0.8, 0.6);
        let (j, k, l, m) = current_terms(x, y1, y2, false);
        let g = |y: f64| 0.5 * (x * x + y * y).ln();
        let mq = -quad(y1, y2, g) / (2.0 * PI);
        let lq = -quad(y1, y2, |y| s_of(y, y1, y2) * g(y)) / (2.0 * PI);
        let kq = -quad(y1, y2, |y| s_of(y, y1, y2).powi(2) * g(y)) / (2.0 * PI);
        let jq = -quad(y1, y2, |y| s_of(y, y1, y2).powi(3) * g(y)) / (2.0 * PI);
        assert!((m - mq).abs() < 1e-10, "M {} vs {}", m, mq);
        assert!((l - lq).abs() < 1e-10, "L {} vs {}", l, lq);
        assert!((k - kq).abs() < 1e-10, "K {} vs {}", k, kq);
        assert!((j - jq).abs() < 1e-10, "J {} vs {}", j, jq);
    }

    #[test]
    fn test_on_segment_limit_of_current_terms() {
        // the off-segment forms converge to the on-segment branch as the
        // field point approaches the segment midline
        let (y1, y2) = (-0.35, 0.65);
        let on = current_terms(0.0, y1, y2, true);
        let off = current_terms(1e-7, y1, y2, false);
        assert!((on.0 - off.0).abs() < 1e-6);
        assert!((on.1 - off.1).abs() < 1e-6);
        assert!((on.2 - off.2).abs() < 1e-6);
        assert!((on.3 - off.3).abs() < 1e-6);
    }

    #[test]
    fn test_on_segment_endpoint_forms_are_finite() {
        // field point sitting exactly on a segment endpoint (y1 = 0)
        let (j, k, l, m) = current_terms(0.0, 0.0, 1.0, true);
        for v in [j, k, l, m] {
            assert!(v.is_finite());
        }
        let (v, w) = potential_terms(0.0, 0.0, 1.0, true);
        assert_eq!((v, w), (0.0, 0.0));
    }

    // Full scalar pipeline for one segment in global coordinates.
    fn scalar_terms_at(p: &Point2D, qa: &Point2D, qb: &Point2D) -> [f64; 6] {
        let (x, y1, y2) = convert_pq(qa, qb, p);
        let (v, w) = potential_terms(x, y1, y2, false);
        let (j, k, l, m) = current_terms(x, y1, y2, false);
        [v, w, j, k, l, m]
    }

    #[test]
    fn test_gradient_terms_match_finite_differences() {
        let qa = Point2D::new(0.3, -0.2);
        let qb = Point2D::new(1.4, 0.9);
        let p = Point2D::new(0.8, 1.1);
        let h = 1e-6;

        let (x, y1, y2) = convert_pq(&qa, &qb, &p);
        let (v1, w1) = potential_terms_grad(x, y1, y2);
        let (j1, k1, l1, m1) = current_terms_grad(x, y1, y2);
        let analytic = [
            rotate_to_pq(v1.x, v1.y, &qa, &qb),
            rotate_to_pq(w1.x, w1.y, &qa, &qb),
            rotate_to_pq(j1.x, j1.y, &qa, &qb),
            rotate_to_pq(k1.x, k1.y, &qa, &qb),
            rotate_to_pq(l1.x, l1.y, &qa, &qb),
            rotate_to_pq(m1.x, m1.y, &qa, &qb),
        ];

        for axis in 0..2 {
            let dp = if axis == 0 {
                Point2D::new(h, 0.0)
            } else {
                Point2D::new(0.0, h)
            };
            let fp = scalar_terms_at(&(p + dp), &qa, &qb);
            let fm = scalar_terms_at(&(p - dp), &qa, &qb);
            for t in 0..6 {
                // scalar terms carry 1/(2 pi); derivative terms are raw
                let numeric = (fp[t] - fm[t]) / (2.0 * h) * 2.0 * PI;
                let a = if axis == 0 { analytic[t].x } else { analytic[t].y };
                assert!(
                    (numeric - a).abs() < 1e-5 * (1.0 + a.abs()),
                    "term {} axis {}: numeric {} vs analytic {}",
                    t,
                    axis,
                    numeric,
                    a
                );
            }
        }
    }

    #[test]
    fn test_hessian_terms_match_finite_differences_of_gradients() {
        let qa = Point2D::new(-0.5, 0.1);
        let qb = Point2D::new(0.6, 0.8);
        let p = Point2D::new(0.9, -0.7);
        let h = 1e-6;

        let (x, y1, y2) = convert_pq(&qa, &qb, &p);
        use crate::algorithms::double_rotate_to_pq;
        let (v2, w2) = potential_terms_hessian(x, y1, y2);
        let (j2, k2, l2, m2) = current_terms_hessian(x, y1, y2);
        let analytic = [
            double_rotate_to_pq(&v2, &qa, &qb),
            double_rotate_to_pq(&w2, &qa, &qb),
            double_rotate_to_pq(&j2, &qa, &qb),
            double_rotate_to_pq(&k2, &qa, &qb),
            double_rotate_to_pq(&l2, &qa, &qb),
            double_rotate_to_pq(&m2, &qa, &qb),
        ];

        let grads_at = |pt: &Point2D| -> [Point2D; 6] {
            let (x, y1, y2) = convert_pq(&qa, &qb, pt);
            let (v1, w1) = potential_terms_grad(x, y1, y2);
            let (j1, k1, l1, m1) = current_terms_grad(x, y1, y2);
            [
                rotate_to_pq(v1.x, v1.y, &qa, &qb),
                rotate_to_pq(w1.x, w1.y, &qa, &qb),
                rotate_to_pq(j1.x, j1.y, &qa, &qb),
                rotate_to_pq(k1.x, k1.y, &qa, &qb),
                rotate_to_pq(l1.x, l1.y, &qa, &qb),
                rotate_to_pq(m1.x, m1.y, &qa, &qb),
            ]
        };

        let fxp = grads_at(&(p + Point2D::new(h, 0.0)));
        let fxm = grads_at(&(p - Point2D::new(h, 0.0)));
        let fyp = grads_at(&(p + Point2D::new(0.0, h)));
        let fym = grads_at(&(p - Point2D::new(0.0, h)));
        for t in 0..6 {
            let nxx = (fxp[t].x - fxm[t].x) / (2.0 * h);
            let nxy = (fyp[t].x - fym[t].x) / (2.0 * h);
            let nyx = (fxp[t].y - fxm[t].y) / (2.0 * h);
            let nyy = (fyp[t].y - fym[t].y) / (2.0 * h);
            let a = analytic[t];
            let tol = 1e-4 * (1.0 + a.max_abs());
            assert!((nxx - a.xx).abs() < tol, "term {} xx: {} vs {}", t, nxx, a.xx);
            assert!((nxy - a.xy).abs() < tol, "term {} xy: {} vs {}", t, nxy, a.xy);
            assert!((nyx - a.yx).abs() < tol, "term {} yx: {} vs {}", t, nyx, a.yx);
            assert!((nyy - a.yy).abs() < tol, "term {} yy: {} vs {}", t, nyy, a.yy);
        }
    }

    #[test]
    fn test_basis_change_constants() {
        let (a0, a1) = p2c_2basis(2.0, 3.0);
        assert_eq!((a0, a1), (3.0, 8.0));
        let (b0, b1, b2, b3) = p2c_4basis(1.0, 2.0, 3.0, 4.0);
        assert_eq!(b0, 4.0);
        assert_eq!(b1, 12.0);
        assert_eq!(b2, 16.0 * 2.0 - 4.0);
        assert_eq!(b3, 64.0 * 1.0 - 8.0 * 3.0);
        let (c0, c1) = p2c_2coeff(8.0, 5.0);
        assert_eq!((c0, c1), (5.0, 2.0));
    }

    #[test]
    fn test_chebyshev_basis_duality() {
        // the Chebyshev-mapped term pair dotted with the p2c_2coeff
        // coefficients equals the plain moment of the linear density:
        // integral of kern(s) * (w + v s) ds
        let (x, y1, y2) = (0.9, -0.3, 0.8);
        let (v_node, w_node) = (0.6, 1.7); // jump and mean of the density
        let (vt, wt) = potential_terms(x, y1, y2, false);
        let (t0, t1) = p2c_2basis(vt, wt);
        let (a0, a1) = p2c_2coeff(v_node, w_node);
        let lhs = t0 * a0 + t1 * a1;
        let rhs = -quad(y1, y2, |y| {
            (w_node + v_node * s_of(y, y1, y2)) * x / (x * x + y * y)
        }) / (2.0 * PI);
        assert!((lhs - rhs).abs() < 1e-10, "{} vs {}", lhs, rhs);
    }
}
