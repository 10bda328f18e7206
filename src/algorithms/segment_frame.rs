/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 09/02/2024
Last Modified: 21/05/2024
License: MIT
*/
use crate::structures::{Point2D, Tensor2};

/// Projects the field point `p` into the local frame of the segment
/// qa -> qb. The frame's y-axis runs along the segment and its x-axis is
/// the segment normal (right of travel). Returns `(x, y1, y2)` where `x`
/// is the signed perpendicular offset of the segment line from `p` and
/// `y1`, `y2` are the along-segment coordinates of qa and qb relative to
/// `p`, so the segment occupies [y1, y2] on the local y-axis.
pub fn convert_pq(qa: &Point2D, qb: &Point2D, p: &Point2D) -> (f64, f64, f64) {
    let mut yu = qb.x - qa.x;
    let mut yv = qb.y - qa.y;
    let d = (yu * yu + yv * yv).sqrt();
    yu /= d;
    yv /= d;
    let xu = yv;
    let xv = -yu;
    let y1 = (qa.x - p.x) * yu + (qa.y - p.y) * yv;
    let y2 = (qb.x - p.x) * yu + (qb.y - p.y) * yv;
    let x = (qa.x - p.x) * xu + (qa.y - p.y) * xv;
    (x, y1, y2)
}

/// Rotates local-frame vector components (x along the segment normal, y
/// along the segment) back to the global frame.
pub fn rotate_to_pq(x: f64, y: f64, qa: &Point2D, qb: &Point2D) -> Point2D {
    let mut yu = qb.x - qa.x;
    let mut yv = qb.y - qa.y;
    let d = (yu * yu + yv * yv).sqrt();
    yu /= d;
    yv /= d;
    let xu = yv;
    let xv = -yu;
    Point2D::new(x * xu + y * yu, x * xv + y * yv)
}

/// Rotates a local-frame 2-tensor back to the global frame: R Q R^T for
/// the frame rotation R, expanded component-wise.
pub fn double_rotate_to_pq(t: &Tensor2, qa: &Point2D, qb: &Point2D) -> Tensor2 {
    let mut yu = qb.x - qa.x;
    let mut yv = qb.y - qa.y;
    let dd = (yu * yu + yv * yv).sqrt();
    yu /= dd;
    yv /= dd;
    let alpha_sq = yv * yv;
    let alpha_beta = -yu * yv;
    let beta_sq = yu * yu;
    let (a, b, c, d) = (t.xx, t.xy, t.yx, t.yy);
    Tensor2::new(
        a * alpha_sq - (b + c) * alpha_beta + d * beta_sq,
        b * alpha_sq + (a - d) * alpha_beta - c * beta_sq,
        c * alpha_sq + (a - d) * alpha_beta - b * beta_sq,
        d * alpha_sq + (b + c) * alpha_beta + a * beta_sq,
    )
}

/// atan(y2/x) - atan(y1/x) evaluated without quadrant ambiguity.
pub fn atan3(y2: f64, y1: f64, x: f64) -> f64 {
    (x * (y2 - y1)).atan2(x * x + y1 * y2)
}

/// Signed planar angle q1-p-q2 in (-pi, pi].
pub fn atanv(q1: &Point2D, q2: &Point2D, p: &Point2D) -> f64 {
    let x1 = q1.x - p.x;
    let y1 = q1.y - p.y;
    let x2 = q2.x - p.x;
    let y2 = q2.y - p.y;
    (x1 * y2 - y1 * x2).atan2(x1 * x2 + y1 * y2)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::structures::{Point2D, Tensor2};

    #[test]
    fn test_convert_pq_frame() {
        // horizontal segment, point above it: the right-of-travel normal
        // points downward, so the offset is positive
        let qa = Point2D::new(1.0, 0.0);
        let qb = Point2D::new(3.0, 0.0);
        let p = Point2D::new(0.0, 2.0);
        let (x, y1, y2) = convert_pq(&qa, &qb, &p);
        assert!((x - 2.0).abs() < 1e-12);
        assert!((y1 - 1.0).abs() < 1e-12);
        assert!((y2 - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotate_round_trip() {
        let qa = Point2D::new(0.0, 0.0);
        let qb = Point2D::new(1.0, 2.0);
        let p = Point2D::new(0.7, -0.3);
        let (x, y1, _) = convert_pq(&qa, &qb, &p);
        // qa expressed in the local frame, rotated back, lands on qa - p
        let r = rotate_to_pq(x, y1, &qa, &qb);
        assert!((r.x - (qa.x - p.x)).abs() < 1e-12);
        assert!((r.y - (qa.y - p.y)).abs() < 1e-12);
    }

    #[test]
    fn test_double_rotate_preserves_trace() {
        let qa = Point2D::new(0.0, 0.0);
        let qb = Point2D::new(2.0, 1.0);
        let t = Tensor2::new(1.0, 0.5, 0.5, -2.0);
        let r = double_rotate_to_pq(&t, &qa, &qb);
        assert!((r.trace() - t.trace()).abs() < 1e-12);
    }

    #[test]
    fn test_atan3_matches_difference_of_atans() {
        let (y2, y1, x): (f64, f64, f64) = (3.0, -1.0, 0.5);
        let expect = (y2 / x).atan() - (y1 / x).atan();
        assert!((atan3(y2, y1, x) - expect).abs() < 1e-12);
    }

    #[test]
    fn test_atanv_right_angle() {
        let p = Point2D::new(0.0, 0.0);
        let q1 = Point2D::new(1.0, 0.0);
        let q2 = Point2D::new(0.0, 1.0);
        assert!((atanv(&q1, &q2, &p) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
