/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 12/02/2024
Last Modified: 03/06/2024
License: MIT
*/
use super::convert_pq;
use crate::structures::{Contour, Point2D};

/// Result of locating a point against one closed loop: the membership
/// verdict plus the nearest boundary segment, the perpendicular-ish
/// distance to it, and the position parameter s in [-1/2, 1/2] along it.
#[derive(Clone, Copy, Debug)]
pub struct PointOnLoop {
    pub inside: bool,
    pub distance: f64,
    pub s: f64,
    pub segment: usize,
}

/// Classifies `p` against a closed loop, optionally traversed with an
/// extra orientation flip composed over the contour's own reverse flag.
///
/// "Inside" means the region to the left of travel: a point at infinity is
/// outside an anticlockwise loop and inside a clockwise one. The test
/// walks every segment through the local frame, keeping the horizontal-ray
/// crossings (y1 <= 0 <= y2) with the smallest |x|; when no segment is
/// crossed, the two segments adjacent to the nearest vertex arbitrate.
/// The verdict is the sign of the accumulated signed offset.
pub fn classify_point(p: &Point2D, c: &Contour, flip: bool) -> PointOnLoop {
    let n = c.len();

    let mut dmin = c.xy_oriented(0, flip).distance_squared(p);
    let mut imin = 0usize;
    for i in 1..n {
        let dsq = c.xy_oriented(i, flip).distance_squared(p);
        if dsq < dmin {
            dmin = dsq;
            imin = i;
        }
    }
    dmin = dmin.sqrt();

    let mut s = -0.5f64;
    let mut crossed = false;
    for i in 0..n {
        let qa = c.xy_oriented(i, flip);
        let qb = c.xy_oriented(i + 1, flip);
        let (x, y1, y2) = convert_pq(&qa, &qb, p);
        if y1 <= 0f64 && y2 >= 0f64 {
            let ax = x.abs();
            if ax < dmin {
                crossed = true;
                dmin = ax;
                imin = i;
            }
        }
    }

    let p_minus_q_dot_n;
    if !crossed {
        // no horizontal crossing: sum the signed offsets of the two
        // segments meeting at the nearest vertex
        let qa = c.xy_oriented(imin + n - 1, flip);
        let qb = c.xy_oriented(imin, flip);
        let (x0, _, _) = convert_pq(&qa, &qb, p);
        let qa = c.xy_oriented(imin, flip);
        let qb = c.xy_oriented(imin + 1, flip);
        let (x1, _, _) = convert_pq(&qa, &qb, p);
        p_minus_q_dot_n = -x0 - x1;
    } else {
        let qa = c.xy_oriented(imin, flip);
        let qb = c.xy_oriented(imin + 1, flip);
        let (x, y1, y2) = convert_pq(&qa, &qb, p);
        p_minus_q_dot_n = -x;
        s = -(y1 + y2) / 2f64 / (y2 - y1);
    }

    PointOnLoop {
        inside: p_minus_q_dot_n < 0f64,
        distance: dmin,
        s,
        segment: imin,
    }
}

/// Determines the natural traversal sense of a closed loop by probing a
/// point constructed strictly outside its bounding box (min - (max-min)/2,
/// in the same connected region as infinity). If the loop excludes that
/// point it runs anticlockwise; if it includes it, clockwise.
pub fn is_clockwise_loop(c: &Contour) -> bool {
    let probe = c.get_bounding_box().exterior_probe();
    classify_point(&probe, c, false).inside
}
