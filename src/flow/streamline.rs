/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 25/03/2024
Last Modified: 17/06/2024
License: MIT
*/

//! Gradient-following streamline integration.
//!
//! Each step evaluates the field, proposes a displacement of at most the
//! step radius along the ascending or descending unit gradient with a
//! second-order curvature correction, and checks the zone membership of
//! the endpoint. A step that would change zones is halved until it lands
//! on the boundary; once no admissible sub-step remains the trace either
//! enters the neighbouring zone or, if none claims the endpoint, leaves
//! the catchment and terminates.

use crate::bem::{evaluate_in_catchment, BemWorkspace, FieldSolution};
use crate::catchment::Catchment;
use crate::errors::FlowpathError;
use crate::structures::{Contour, Point2D, Tensor2};

/// Which way to follow the gradient field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowDirection {
    /// Towards the potential maximum (upslope).
    Ascend,
    /// Towards the potential minimum (downslope).
    Descend,
}

/// A gradient below this magnitude reads as a stationary point and ends
/// the trace.
const GRAD_EPS: f64 = 1e-30;

/// A sub-step is halved at most this many times while it keeps changing
/// zones; the remaining gap to the boundary is then below step/4096 and
/// the step is taken as a crossing.
const MAX_HALVINGS: usize = 12;

/// Real roots of c[0] + c[1] x + c[2] x^2, ascending coefficient order.
pub fn quadratic_roots(c: [f64; 3]) -> Vec<f64> {
    if c[2].abs() < 1e-300 {
        if c[1].abs() < 1e-300 {
            return vec![];
        }
        return vec![-c[0] / c[1]];
    }
    let disc = c[1] * c[1] - 4f64 * c[2] * c[0];
    if disc < 0f64 {
        return vec![];
    }
    let sq = disc.sqrt();
    // the stable quadratic formula: avoid cancellation in b +/- sqrt
    let q = -0.5 * (c[1] + c[1].signum() * sq);
    if q == 0f64 {
        return vec![0f64];
    }
    let r1 = q / c[2];
    let r2 = c[0] / q;
    vec![r1, r2]
}

/// Real roots of c[0] + c[1] x + c[2] x^2 + c[3] x^3.
pub fn cubic_roots(c: [f64; 4]) -> Vec<f64> {
    if c[3].abs() < 1e-300 {
        return quadratic_roots([c[0], c[1], c[2]]);
    }
    // normalize and depress: x = t - b/3 turns it into t^3 + p t + q
    let b = c[2] / c[3];
    let c1 = c[1] / c[3];
    let c0 = c[0] / c[3];
    let p = c1 - b * b / 3f64;
    let q = 2f64 * b * b * b / 27f64 - b * c1 / 3f64 + c0;
    let shift = -b / 3f64;

    let disc = -4f64 * p * p * p - 27f64 * q * q;
    if disc > 0f64 {
        // three real roots, trigonometric form
        let m = 2f64 * (-p / 3f64).sqrt();
        let arg = (3f64 * q / (p * m)).clamp(-1f64, 1f64);
        let phi = arg.acos() / 3f64;
        (0..3)
            .map(|k| m * (phi - 2f64 * std::f64::consts::PI * k as f64 / 3f64).cos() + shift)
            .collect()
    } else {
        // one real root, Cardano
        let h = (q * q / 4f64 + p * p * p / 27f64).sqrt();
        let u = (-q / 2f64 + h).cbrt();
        let v = (-q / 2f64 - h).cbrt();
        vec![u + v + shift]
    }
}

/// Real roots of c[0] + .. + c[4] x^4, by Ferrari's factorization into
/// two quadratics through a resolvent cubic.
pub fn quartic_roots(c: [f64; 5]) -> Vec<f64> {
    if c[4].abs() < 1e-300 {
        return cubic_roots([c[0], c[1], c[2], c[3]]);
    }
    let b = c[3] / c[4];
    let c2 = c[2] / c[4];
    let c1 = c[1] / c[4];
    let c0 = c[0] / c[4];
    // depress: x = t - b/4 gives t^4 + p t^2 + q t + r
    let p = c2 - 3f64 * b * b / 8f64;
    let q = c1 - b * c2 / 2f64 + b * b * b / 8f64;
    let r = c0 - b * c1 / 4f64 + b * b * c2 / 16f64 - 3f64 * b * b * b * b / 256f64;
    let shift = -b / 4f64;

    let mut roots = vec![];
    if q.abs() < 1e-12 {
        // biquadratic
        for u in quadratic_roots([r, p, 1f64]) {
            if u >= 0f64 {
                roots.push(u.sqrt() + shift);
                roots.push(-u.sqrt() + shift);
            }
        }
        return roots;
    }

    // resolvent: 8 m^3 + 8 p m^2 + (2 p^2 - 8 r) m - q^2 = 0 has a
    // positive real root, which splits the quartic
    let m = cubic_roots([-q * q, 2f64 * p * p - 8f64 * r, 8f64 * p, 8f64])
        .into_iter()
        .filter(|&m| m > 0f64)
        .fold(f64::NAN, f64::max);
    if !m.is_finite() {
        return roots;
    }
    let w = (2f64 * m).sqrt();
    let t1 = p / 2f64 + m - q / (2f64 * w);
    let t2 = p / 2f64 + m + q / (2f64 * w);
    for t in quadratic_roots([t1, w, 1f64]) {
        roots.push(t + shift);
    }
    for t in quadratic_roots([t2, -w, 1f64]) {
        roots.push(t + shift);
    }
    roots
}

/// Selects the step scale: the largest root of
/// |alpha T + alpha^2/2 C|^2 = r^2 lying in (0, r]. With T a unit vector
/// orthogonal to C this is the quartic
/// (|C|^2/4) a^4 + a^2 - r^2 = 0. When no root qualifies a half-radius
/// default is used.
fn choose_step_scale(curv_sq: f64, r: f64) -> f64 {
    let roots = if curv_sq * r * r < 1e-24 {
        quadratic_roots([-r * r, 0f64, 1f64])
    } else {
        quartic_roots([-r * r, 0f64, 1f64, 0f64, curv_sq / 4f64])
    };
    let best = roots
        .into_iter()
        .filter(|&a| a > 0f64 && a <= r * (1f64 + 1e-12))
        .fold(f64::NAN, f64::max);
    if best.is_finite() {
        best.min(r)
    } else {
        r / 2f64
    }
}

/// Proposes the next displacement: the unit tangent of the requested
/// direction scaled to the step radius, bent by the streamline curvature
/// (I - g g^T) H g / |grad|. When the curvature radius drops below the
/// step radius the correction is untrustworthy and a plain tangent step
/// is taken.
pub fn propose_step(
    direction: FlowDirection,
    grad: &Point2D,
    hessian: &Tensor2,
    r: f64,
) -> Point2D {
    let g = grad.magnitude();
    let ghat = grad.scaled(1f64 / g);
    let sign = match direction {
        FlowDirection::Ascend => 1f64,
        FlowDirection::Descend => -1f64,
    };
    let t = ghat.scaled(sign);

    let hg = hessian.apply(&ghat);
    let curv = (hg - ghat.scaled(ghat * hg)).scaled(1f64 / g);
    let curv_sq = curv * curv;
    if curv_sq.sqrt() * r > 1f64 || !curv_sq.is_finite() {
        return t.scaled(r);
    }

    let alpha = choose_step_scale(curv_sq, r);
    t.scaled(alpha) + curv.scaled(alpha * alpha / 2f64)
}

/// Follows the gradient curve from `start` until it leaves the catchment,
/// reaches a stationary point, or exhausts `max_steps`. Returns the arc
/// length traversed and the final field evaluation; when a trace buffer
/// is supplied every accepted point is recorded into it.
pub fn streamline_loop(
    start: Point2D,
    c: &mut Catchment,
    direction: FlowDirection,
    max_steps: usize,
    step_size: f64,
    mut trace: Option<&mut Contour>,
    ws: &mut BemWorkspace,
) -> Result<(f64, FieldSolution), FlowpathError> {
    if let Some(t) = trace.as_deref_mut() {
        t.clear();
    }

    let mut p = start;
    let (mut sol, zq) = evaluate_in_catchment(c, &p, ws)?;
    let mut zone = match zq.zone() {
        Some(k) => k,
        None => return Ok((0f64, FieldSolution::default())),
    };
    if let Some(t) = trace.as_deref_mut() {
        t.push(p);
    }

    let mut length = 0f64;
    for _ in 0..max_steps {
        if sol.grad.magnitude() < GRAD_EPS {
            break;
        }
        let dp = propose_step(direction, &sol.grad, &sol.hessian, step_size);

        let mut sub = dp;
        let mut target = p + sub;
        let mut target_zone = c.find_zone(&target);
        let mut halvings = 0usize;
        while target_zone != Some(zone) && halvings < MAX_HALVINGS {
            sub = sub.scaled(0.5);
            target = p + sub;
            target_zone = c.find_zone(&target);
            halvings += 1;
        }

        length += sub.magnitude();
        p = target;
        if let Some(t) = trace.as_deref_mut() {
            t.push(p);
        }

        if target_zone == Some(zone) {
            let (s, _) = evaluate_in_catchment(c, &p, ws)?;
            sol = s;
        } else {
            match target_zone {
                None => {
                    // the step leaves every zone: the trace has exited
                    return Ok((length, sol));
                }
                Some(k) => {
                    zone = k;
                    let (s, _) = evaluate_in_catchment(c, &p, ws)?;
                    sol = s;
                }
            }
        }
    }
    Ok((length, sol))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bem::BemWorkspace;
    use crate::catchment::{Catchment, Zone};
    use crate::structures::{Contour, Point2D};

    fn sorted(mut v: Vec<f64>) -> Vec<f64> {
        v.sort_by(|a, b| a.partial_cmp(b).unwrap());
        v
    }

    #[test]
    fn test_quadratic_roots() {
        let r = sorted(quadratic_roots([-6.0, 1.0, 1.0])); // (x+3)(x-2)
        assert_eq!(r.len(), 2);
        assert!((r[0] + 3.0).abs() < 1e-12);
        assert!((r[1] - 2.0).abs() < 1e-12);
        assert!(quadratic_roots([1.0, 0.0, 1.0]).is_empty());
    }

    #[test]
    fn test_cubic_roots() {
        // (x-1)(x-2)(x+3) = x^3 - 7x + 6
        let r = sorted(cubic_roots([6.0, -7.0, 0.0, 1.0]));
        assert_eq!(r.len(), 3);
        for (got, want) in r.iter().zip([-3.0, 1.0, 2.0]) {
            assert!((got - want).abs() < 1e-9, "{} vs {}", got, want);
        }
        // single real root
        let r = cubic_roots([-1.0, 0.0, 0.0, 1.0]); // x^3 = 1
        assert_eq!(r.len(), 1);
        assert!((r[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_quartic_roots() {
        // (x-1)(x-2)(x+3)(x-1/2) = x^4 - x^3/2 ... build by convolution
        let want = [1.0, 2.0, -3.0, 0.5];
        let mut c = [0.0f64; 5];
        c[0] = 1.0;
        let mut deg = 0;
        for w in want {
            let mut next = [0.0f64; 5];
            for i in 0..=deg {
                next[i + 1] += c[i];
                next[i] += c[i] * (-w);
            }
            c = next;
            deg += 1;
        }
        let r = sorted(quartic_roots(c));
        assert_eq!(r.len(), 4);
        for (got, want) in r.iter().zip([-3.0, 0.5, 1.0, 2.0]) {
            assert!((got - want).abs() < 1e-8, "{} vs {}", got, want);
        }
    }

    #[test]
    fn test_step_scale_respects_radius() {
        for curv in [0.0, 0.1, 1.0, 5.0] {
            let a = choose_step_scale(curv * curv, 0.5);
            assert!(a > 0.0 && a <= 0.5 + 1e-9, "curv {}: alpha {}", curv, a);
            // the bent step must land on the radius
            let dp2 = a * a + a * a * a * a * curv * curv / 4.0;
            if curv * 0.5 <= 1.0 {
                assert!((dp2.sqrt() - 0.5).abs() < 1e-9, "curv {}", curv);
            }
        }
    }

    #[test]
    fn test_propose_step_direction() {
        use crate::structures::Tensor2;
        let grad = Point2D::new(3.0, 4.0);
        let hess = Tensor2::new(0.2, 0.0, 0.0, -0.1);
        let up = propose_step(FlowDirection::Ascend, &grad, &hess, 0.1);
        let down = propose_step(FlowDirection::Descend, &grad, &hess, 0.1);
        assert!(up * grad > 0.0);
        assert!(down * grad < 0.0);
        assert!(up.magnitude() <= 0.1 + 1e-9);
        assert!(down.magnitude() <= 0.1 + 1e-9);
    }

    fn unit_square_catchment() -> Catchment {
        let mut c = Catchment::new(1, 2);
        let i = c
            .pool_mut()
            .insert(
                "sq.txt",
                Contour::new_closed(
                    vec![
                        Point2D::new(0.0, 0.0),
                        Point2D::new(1.0, 0.0),
                        Point2D::new(1.0, 1.0),
                        Point2D::new(0.0, 1.0),
                    ],
                    vec![0.0, 1.0, 2.0, 1.0],
                ),
            )
            .unwrap();
        let z = Zone::assemble(vec![i], c.pool()).unwrap();
        c.push_zone(z).unwrap();
        c
    }

    #[test]
    fn test_streamline_ascends_to_boundary() {
        let mut c = unit_square_catchment();
        let mut ws = BemWorkspace::for_catchment(&c);
        let mut trace = Contour::with_capacity(600);
        let (len, last) = streamline_loop(
            Point2D::new(0.5, 0.5),
            &mut c,
            FlowDirection::Ascend,
            500,
            0.05,
            Some(&mut trace),
            &mut ws,
        )
        .unwrap();
        // V = x + y ascends along the diagonal towards (1,1), about
        // sqrt(2)/2 away
        assert!(len > 0.0 && len.is_finite());
        assert!((len - 0.7071).abs() < 0.02, "length {}", len);
        assert!(!trace.is_empty());
        let end = trace.xy(trace.len() - 1);
        assert!(end.x > 0.95 && end.y > 0.95, "ended at {}", end);
        // the last recorded field evaluation is from inside the zone
        assert!(last.voltage > 1.5);
    }

    #[test]
    fn test_streamline_descends_to_origin_corner() {
        let mut c = unit_square_catchment();
        let mut ws = BemWorkspace::for_catchment(&c);
        let (len, _) = streamline_loop(
            Point2D::new(0.5, 0.5),
            &mut c,
            FlowDirection::Descend,
            500,
            0.05,
            None,
            &mut ws,
        )
        .unwrap();
        assert!(len > 0.0 && len.is_finite());
        assert!((len - 0.7071).abs() < 0.02, "length {}", len);
    }

    #[test]
    fn test_streamline_from_outside_is_empty() {
        let mut c = unit_square_catchment();
        let mut ws = BemWorkspace::for_catchment(&c);
        let (len, sol) = streamline_loop(
            Point2D::new(5.0, 5.0),
            &mut c,
            FlowDirection::Ascend,
            100,
            0.05,
            None,
            &mut ws,
        )
        .unwrap();
        assert_eq!(len, 0.0);
        assert_eq!(sol.voltage, 0.0);
    }

    #[test]
    fn test_streamline_respects_step_budget() {
        let mut c = unit_square_catchment();
        let mut ws = BemWorkspace::for_catchment(&c);
        let mut trace = Contour::with_capacity(8);
        let (len, _) = streamline_loop(
            Point2D::new(0.1, 0.1),
            &mut c,
            FlowDirection::Ascend,
            3,
            0.05,
            Some(&mut trace),
            &mut ws,
        )
        .unwrap();
        assert!(trace.len() <= 4); // start plus at most three steps
        assert!(len <= 3.0 * 0.05 + 1e-9);
    }
}
