/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 18/03/2024
Last Modified: 14/06/2024
License: MIT
*/

//! Evaluation of the potential and its first two derivatives at interior
//! points, through the per-query geometry vectors and the zone's solved
//! boundary vectors.

use std::f64::consts::PI;

use super::assembly::{
    make_co_current_geometry_vector, make_co_voltage_geometry_vector,
    make_current_geometry_vector, make_ten_current_geometry_vector,
    make_ten_voltage_geometry_vector, make_voltage_geometry_vector,
};
use super::solver::ensure_boundary_vectors;
use crate::catchment::Catchment;
use crate::errors::FlowpathError;
use crate::structures::{DenseMatrix, Point2D, Tensor2};

/// The field at one query point.
#[derive(Default, Clone, Copy, Debug)]
pub struct FieldSolution {
    pub voltage: f64,
    pub grad: Point2D,
    pub hessian: Tensor2,
}

/// How the query point was resolved against the catchment. A point
/// outside every zone is a value, not an error: the field is zero there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoneQuery {
    /// Outside every zone.
    Outside,
    /// Inside this zone; its boundary vectors were already available.
    Cached(usize),
    /// Inside this zone; this query ran the dense boundary solve.
    Solved(usize),
}

impl ZoneQuery {
    pub fn zone(&self) -> Option<usize> {
        match *self {
            ZoneQuery::Outside => None,
            ZoneQuery::Cached(k) | ZoneQuery::Solved(k) => Some(k),
        }
    }
}

/// Per-query scratch vectors, allocated once against the worst-case zone
/// size and re-dimensioned per zone without reallocating.
pub struct BemWorkspace {
    vgv: DenseMatrix<f64>,
    cgv: DenseMatrix<f64>,
    co_vgv: DenseMatrix<Point2D>,
    co_cgv: DenseMatrix<Point2D>,
    ten_vgv: DenseMatrix<Tensor2>,
    ten_cgv: DenseMatrix<Tensor2>,
}

impl BemWorkspace {
    pub fn new(max_points: usize) -> BemWorkspace {
        BemWorkspace {
            vgv: DenseMatrix::new(1, 2 * max_points),
            cgv: DenseMatrix::new(1, 4 * max_points),
            co_vgv: DenseMatrix::new(1, 2 * max_points),
            co_cgv: DenseMatrix::new(1, 4 * max_points),
            ten_vgv: DenseMatrix::new(1, 2 * max_points),
            ten_cgv: DenseMatrix::new(1, 4 * max_points),
        }
    }

    /// Sizes a workspace for every zone of a catchment.
    pub fn for_catchment(c: &Catchment) -> BemWorkspace {
        BemWorkspace::new(c.max_points_in_any_zone())
    }
}

/// Resolves the zone containing `p`, solves its boundary problem if this
/// is the first visit, and evaluates (V, grad V, Hessian V).
///
/// Zone resolution scans zones in catchment order and the first claimant
/// wins. The one-slot `previous_zone` cache distinguishes a repeat query
/// (geometry vectors only) from a first visit (full dense solve); the
/// solved vectors themselves stay memoized on each zone either way.
pub fn evaluate_in_catchment(
    c: &mut Catchment,
    p: &Point2D,
    ws: &mut BemWorkspace,
) -> Result<(FieldSolution, ZoneQuery), FlowpathError> {
    let this_zone = match c.find_zone(p) {
        Some(k) => k,
        None => return Ok((FieldSolution::default(), ZoneQuery::Outside)),
    };

    let solved = {
        let (zone, pool) = c.zone_and_pool_mut(this_zone);
        ensure_boundary_vectors(zone, pool)?
    };
    c.previous_zone = Some(this_zone);

    let zone = c.zone(this_zone);
    let pool = c.pool();
    let n = zone.num_points(pool);
    let bvv = zone.bvv.as_ref().expect("boundary voltage vector present");
    let bcv = zone.bcv.as_ref().expect("boundary current vector present");

    ws.vgv.reshape(1, 2 * n);
    ws.cgv.reshape(1, 4 * n);
    ws.co_vgv.reshape(1, 2 * n);
    ws.co_cgv.reshape(1, 4 * n);
    ws.ten_vgv.reshape(1, 2 * n);
    ws.ten_cgv.reshape(1, 4 * n);

    make_voltage_geometry_vector(p, zone, pool, &mut ws.vgv);
    make_current_geometry_vector(p, zone, pool, &mut ws.cgv);
    make_co_voltage_geometry_vector(p, zone, pool, &mut ws.co_vgv);
    make_co_current_geometry_vector(p, zone, pool, &mut ws.co_cgv);
    make_ten_voltage_geometry_vector(p, zone, pool, &mut ws.ten_vgv);
    make_ten_current_geometry_vector(p, zone, pool, &mut ws.ten_cgv);

    let voltage = ws.cgv.dot_coefficients(bcv) - ws.vgv.dot_coefficients(bvv);
    let grad = (ws.co_cgv.dot_coefficients(bcv) - ws.co_vgv.dot_coefficients(bvv))
        .scaled(1f64 / (2f64 * PI));
    let hessian = (ws.ten_cgv.dot_coefficients(bcv) - ws.ten_vgv.dot_coefficients(bvv))
        .scaled(1f64 / (2f64 * PI));

    if !voltage.is_finite() || !grad.x.is_finite() || !grad.y.is_finite() {
        return Err(FlowpathError::Numerical(format!(
            "non-finite field at ({}, {})",
            p.x, p.y
        )));
    }

    let solution = FieldSolution {
        voltage,
        grad,
        hessian,
    };
    let query = if solved {
        ZoneQuery::Solved(this_zone)
    } else {
        ZoneQuery::Cached(this_zone)
    };
    Ok((solution, query))
}

#[cfg(test)]
mod test {
    use super::{evaluate_in_catchment, BemWorkspace, ZoneQuery};
    use crate::catchment::{Catchment, Zone};
    use crate::structures::{Contour, Point2D};

    /// Unit square carrying the boundary trace of V = x + y.
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

    /// Two concentric octagons (outer radius 2, inner radius 1), both at
    /// the same potential.
    fn annulus_catchment(v_outer: f64, v_inner: f64) -> Catchment {
        let mut c = Catchment::new(1, 2);
        let ring = |r: f64, v: f64, m: usize| {
            let mut pts = vec![];
            for k in 0..m {
                let a = 2.0 * std::f64::consts::PI * k as f64 / m as f64;
                pts.push(Point2D::new(r * a.cos(), r * a.sin()));
            }
            Contour::new_closed(pts, vec![v; m])
        };
        let outer = c.pool_mut().insert("outer.txt", ring(2.0, v_outer, 16)).unwrap();
        let inner = c.pool_mut().insert("inner.txt", ring(1.0, v_inner, 16)).unwrap();
        let z = Zone::assemble(vec![outer, inner], c.pool()).unwrap();
        c.push_zone(z).unwrap();
        c
    }

    #[test]
    fn test_unit_square_linear_field() {
        let mut c = unit_square_catchment();
        let mut ws = BemWorkspace::for_catchment(&c);
        let (sol, zq) = evaluate_in_catchment(&mut c, &Point2D::new(0.5, 0.5), &mut ws).unwrap();
        assert_eq!(zq, ZoneQuery::Solved(0));
        assert!((sol.voltage - 1.0).abs() < 1e-6, "V = {}", sol.voltage);
        assert!((sol.grad.x - 1.0).abs() < 1e-6, "Vx = {}", sol.grad.x);
        assert!((sol.grad.y - 1.0).abs() < 1e-6, "Vy = {}", sol.grad.y);
        assert!(sol.hessian.max_abs() < 1e-5, "H = {}", sol.hessian);
    }

    #[test]
    fn test_off_centre_query_of_linear_field() {
        let mut c = unit_square_catchment();
        let mut ws = BemWorkspace::for_catchment(&c);
        let (sol, _) = evaluate_in_catchment(&mut c, &Point2D::new(0.3, 0.7), &mut ws).unwrap();
        assert!((sol.voltage - 1.0).abs() < 1e-6, "V = {}", sol.voltage);
        let (sol, _) = evaluate_in_catchment(&mut c, &Point2D::new(0.25, 0.4), &mut ws).unwrap();
        assert!((sol.voltage - 0.65).abs() < 1e-6, "V = {}", sol.voltage);
    }

    #[test]
    fn test_outside_point_returns_zero_fields() {
        let mut c = unit_square_catchment();
        let mut ws = BemWorkspace::for_catchment(&c);
        let (sol, zq) = evaluate_in_catchment(&mut c, &Point2D::new(3.0, 3.0), &mut ws).unwrap();
        assert_eq!(zq, ZoneQuery::Outside);
        assert_eq!(sol.voltage, 0.0);
        assert_eq!(sol.grad, Point2D::new(0.0, 0.0));
        // an outside query does not disturb the cache
        assert_eq!(c.previous_zone(), None);
    }

    #[test]
    fn test_second_query_reuses_the_solve() {
        let mut c = unit_square_catchment();
        let mut ws = BemWorkspace::for_catchment(&c);
        let (_, q1) = evaluate_in_catchment(&mut c, &Point2D::new(0.5, 0.5), &mut ws).unwrap();
        let (_, q2) = evaluate_in_catchment(&mut c, &Point2D::new(0.25, 0.75), &mut ws).unwrap();
        assert_eq!(q1, ZoneQuery::Solved(0));
        assert_eq!(q2, ZoneQuery::Cached(0));
        assert_eq!(c.previous_zone(), Some(0));
    }

    #[test]
    fn test_annulus_equipotential_centreline() {
        // same potential on both circles: the field is constant between
        // them and the gradient vanishes on the centreline of the ring
        let mut c = annulus_catchment(3.0, 3.0);
        let mut ws = BemWorkspace::for_catchment(&c);
        let (sol, _) = evaluate_in_catchment(&mut c, &Point2D::new(1.5, 0.0), &mut ws).unwrap();
        assert!((sol.voltage - 3.0).abs() < 1e-3, "V = {}", sol.voltage);
        assert!(sol.grad.magnitude() < 1e-3, "grad = {}", sol.grad);
    }

    #[test]
    fn test_annulus_with_core_zone_at_centre() {
        // the inner circle also bounds a second zone (the core); the
        // centre point resolves to the core and carries the shared
        // potential with no gradient
        let mut c = Catchment::new(2, 2);
        let ring = |r: f64, v: f64, m: usize| {
            let mut pts = vec![];
            for k in 0..m {
                let a = 2.0 * std::f64::consts::PI * k as f64 / m as f64;
                pts.push(Point2D::new(r * a.cos(), r * a.sin()));
            }
            Contour::new_closed(pts, vec![v; m])
        };
        let outer = c.pool_mut().insert("outer.txt", ring(2.0, 3.0, 16)).unwrap();
        let inner = c.pool_mut().insert("inner.txt", ring(1.0, 3.0, 16)).unwrap();
        let ring_zone = Zone::assemble(vec![outer, inner], c.pool()).unwrap();
        c.push_zone(ring_zone).unwrap();
        let core_zone = Zone::assemble(vec![inner], c.pool()).unwrap();
        c.push_zone(core_zone).unwrap();

        let mut ws = BemWorkspace::for_catchment(&c);
        let centre = Point2D::new(0.0, 0.0);
        let (sol, zq) = evaluate_in_catchment(&mut c, &centre, &mut ws).unwrap();
        assert_eq!(zq.zone(), Some(1));
        assert!((sol.voltage - 3.0).abs() < 1e-3, "V = {}", sol.voltage);
        assert!(sol.grad.magnitude() < 1e-3, "grad = {}", sol.grad);
    }

    #[test]
    fn test_field_linearity_at_interior_point() {
        let mut c1 = annulus_catchment(2.0, 1.0);
        let mut c2 = annulus_catchment(4.0, 2.0);
        let mut ws1 = BemWorkspace::for_catchment(&c1);
        let mut ws2 = BemWorkspace::for_catchment(&c2);
        let p = Point2D::new(1.4, 0.3);
        let (s1, _) = evaluate_in_catchment(&mut c1, &p, &mut ws1).unwrap();
        let (s2, _) = evaluate_in_catchment(&mut c2, &p, &mut ws2).unwrap();
        assert!((2.0 * s1.voltage - s2.voltage).abs() < 1e-8);
        assert!((2.0 * s1.grad.x - s2.grad.x).abs() < 1e-8);
        assert!((2.0 * s1.grad.y - s2.grad.y).abs() < 1e-8);
        assert!((s1.hessian.scaled(2.0) - s2.hessian).max_abs() < 1e-8);
    }
}
