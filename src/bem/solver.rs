/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 11/03/2024
Last Modified: 14/06/2024
License: MIT
*/

//! The dense boundary solve: given the node potentials along a zone's
//! loops, find the Chebyshev coefficients of the boundary current.
//!
//! The collocation system is overdetermined (five samples per segment,
//! plus the Kirchhoff closure row for finite zones) and is solved in
//! normal-equation form: J = (B^T B)^-1 B^T (DA V). Both boundary
//! vectors are memoized on the zone; a second query in the same zone
//! reuses them.

use super::assembly::{
    make_current_geometry_matrix, make_diagonal_matrix, make_kcl_row,
    make_voltage_geometry_matrix,
};
use super::terms::p2c_2coeff;
use crate::catchment::{ContourPool, Zone};
use crate::errors::FlowpathError;
use crate::structures::DenseMatrix;

/// Builds the boundary voltage vector (length 2N): per segment, the
/// Chebyshev coefficients of the linear potential between its two nodes.
pub fn build_boundary_voltage_vector(zone: &Zone, pool: &ContourPool) -> Vec<f64> {
    let n = zone.num_points(pool);
    let mut bvv = vec![0f64; 2 * n];
    let mut offset = 0usize;
    for j in 0..zone.num_components() {
        let contour = pool.get(zone.component(j));
        let flip = zone.solve_flip(j);
        let points = contour.len();
        for segment in 0..points {
            let v1 = contour.value_oriented(segment, flip);
            let v2 = contour.value_oriented(segment + 1, flip);
            let (a0, a1) = p2c_2coeff(v2 - v1, (v2 + v1) / 2f64);
            bvv[2 * (offset + segment)] = a0;
            bvv[2 * (offset + segment) + 1] = a1;
        }
        offset += points;
    }
    bvv
}

/// Solves for the boundary current vector (length 4N). Finite zones get
/// the KCL closure row in place of the last collocation row; unbounded
/// zones use the plain 5N-row system.
pub fn solve_boundary_current_vector(
    zone: &Zone,
    pool: &ContourPool,
    bvv: &[f64],
) -> Result<Vec<f64>, FlowpathError> {
    let n = zone.num_points(pool);
    let use_kcl = zone.is_finite();
    let rows = if use_kcl { 5 * n + 1 } else { 5 * n };

    let mut a = DenseMatrix::new(rows, 2 * n);
    let mut d = DenseMatrix::new(rows, 2 * n);
    make_voltage_geometry_matrix(zone, pool, &mut a);
    make_diagonal_matrix(zone, pool, &mut d);
    if use_kcl {
        a.zero_last_row();
        d.zero_last_row();
    }

    let mut da = DenseMatrix::new(rows, 2 * n);
    DenseMatrix::add_into(&d, &a, &mut da);

    let mut v = DenseMatrix::new(2 * n, 1);
    for (i, &coeff) in bvv.iter().enumerate() {
        v.set(i, 0, coeff);
    }
    let mut dav = DenseMatrix::new(rows, 1);
    DenseMatrix::multiply(&da, &v, &mut dav);

    let mut b = DenseMatrix::new(rows, 4 * n);
    make_current_geometry_matrix(zone, pool, &mut b);
    if use_kcl {
        let mut kcl = DenseMatrix::new(1, 4 * n);
        make_kcl_row(zone, pool, &mut kcl);
        b.fill_last_row(&kcl);
    }

    let mut bt = b.clone();
    bt.toggle_transpose();

    let mut btb = DenseMatrix::new(4 * n, 4 * n);
    DenseMatrix::multiply(&bt, &b, &mut btb);
    btb.invert()?;

    let mut btdav = DenseMatrix::new(4 * n, 1);
    DenseMatrix::multiply(&bt, &dav, &mut btdav);

    let mut j = DenseMatrix::new(4 * n, 1);
    DenseMatrix::multiply(&btb, &btdav, &mut j);

    let mut bcv = vec![0f64; 4 * n];
    for (i, out) in bcv.iter_mut().enumerate() {
        let value = j.get(i, 0);
        if !value.is_finite() {
            return Err(FlowpathError::Numerical(
                "non-finite boundary current from least-squares solve".to_string(),
            ));
        }
        *out = value;
    }
    Ok(bcv)
}

/// Ensures the zone's memoized boundary vectors exist, running the dense
/// solve when they do not. Returns true when a solve was performed.
pub fn ensure_boundary_vectors(
    zone: &mut Zone,
    pool: &ContourPool,
) -> Result<bool, FlowpathError> {
    if zone.has_boundary_vectors() {
        return Ok(false);
    }
    let bvv = if let Some(v) = zone.bvv.take() {
        v
    } else {
        build_boundary_voltage_vector(zone, pool)
    };
    let bcv = solve_boundary_current_vector(zone, pool, &bvv)?;
    zone.bvv = Some(bvv);
    zone.bcv = Some(bcv);
    Ok(true)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::catchment::{ContourPool, Zone};
    use crate::structures::{Contour, DenseMatrix, Point2D};

    /// Unit square with the node potentials of V = x + y.
    fn unit_square_zone() -> (Zone, ContourPool) {
        let mut pool = ContourPool::new(1);
        let i = pool
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
        let z = Zone::assemble(vec![i], &pool).unwrap();
        (z, pool)
    }

    #[test]
    fn test_boundary_voltage_vector_coefficients() {
        let (z, pool) = unit_square_zone();
        let bvv = build_boundary_voltage_vector(&z, &pool);
        // first segment runs from potential 0 to 1: mean 1/2, jump/4 = 1/4
        assert!((bvv[0] - 0.5).abs() < 1e-12);
        assert!((bvv[1] - 0.25).abs() < 1e-12);
        // third segment runs from 2 down to 1
        assert!((bvv[4] - 1.5).abs() < 1e-12);
        assert!((bvv[5] + 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_solved_current_matches_normal_derivative() {
        // for V = x + y the outward normal derivative on the bottom edge
        // of the unit square is -1 and on the right edge +1; those are
        // constant currents, i.e. Chebyshev coefficient a0 per segment
        let (mut z, pool) = unit_square_zone();
        ensure_boundary_vectors(&mut z, &pool).unwrap();
        let bcv = z.bcv.as_ref().unwrap();
        let expected = [-1.0, 1.0, 1.0, -1.0]; // bottom, right, top, left
        for seg in 0..4 {
            assert!(
                (bcv[4 * seg] - expected[seg]).abs() < 1e-6,
                "segment {}: a0 = {} vs {}",
                seg,
                bcv[4 * seg],
                expected[seg]
            );
            for c in 1..4 {
                assert!(
                    bcv[4 * seg + c].abs() < 1e-6,
                    "segment {} coefficient {} should vanish, got {}",
                    seg,
                    c,
                    bcv[4 * seg + c]
                );
            }
        }
    }

    #[test]
    fn test_kcl_residual_vanishes() {
        let (mut z, pool) = unit_square_zone();
        ensure_boundary_vectors(&mut z, &pool).unwrap();
        let n = z.num_points(&pool);
        let mut kcl = DenseMatrix::new(1, 4 * n);
        make_kcl_row(&z, &pool, &mut kcl);
        let bcv = z.bcv.as_ref().unwrap();
        let mut residual = 0.0;
        for k in 0..4 * n {
            residual += kcl.get(0, k) * bcv[k];
        }
        assert!(residual.abs() < 1e-8, "KCL residual {}", residual);
    }

    #[test]
    fn test_unbounded_zone_solves_without_kcl() {
        // a single clockwise loop bounds the unbounded zone around it;
        // with a constant boundary potential the normal current vanishes
        let mut pool = ContourPool::new(1);
        let i = pool
            .insert(
                "island.txt",
                Contour::new_closed(
                    vec![
                        Point2D::new(0.0, 1.0),
                        Point2D::new(1.0, 1.0),
                        Point2D::new(1.0, 0.0),
                        Point2D::new(0.0, 0.0),
                    ],
                    vec![2.0, 2.0, 2.0, 2.0],
                ),
            )
            .unwrap();
        let mut z = Zone::assemble(vec![i], &pool).unwrap();
        assert!(!z.is_finite());
        ensure_boundary_vectors(&mut z, &pool).unwrap();
        let bcv = z.bcv.as_ref().unwrap();
        for (k, &c) in bcv.iter().enumerate() {
            assert!(c.is_finite());
            assert!(c.abs() < 1e-6, "coefficient {} = {}", k, c);
        }
    }

    #[test]
    fn test_solve_runs_once_per_zone() {
        let (mut z, pool) = unit_square_zone();
        assert!(ensure_boundary_vectors(&mut z, &pool).unwrap());
        assert!(!ensure_boundary_vectors(&mut z, &pool).unwrap());
    }

    #[test]
    fn test_field_linearity_of_boundary_vectors() {
        // doubling all node potentials doubles both boundary vectors
        let (mut z1, pool1) = unit_square_zone();
        ensure_boundary_vectors(&mut z1, &pool1).unwrap();

        let mut pool2 = ContourPool::new(1);
        let i = pool2
            .insert(
                "sq.txt",
                Contour::new_closed(
                    vec![
                        Point2D::new(0.0, 0.0),
                        Point2D::new(1.0, 0.0),
                        Point2D::new(1.0, 1.0),
                        Point2D::new(0.0, 1.0),
                    ],
                    vec![0.0, 2.0, 4.0, 2.0],
                ),
            )
            .unwrap();
        let mut z2 = Zone::assemble(vec![i], &pool2).unwrap();
        ensure_boundary_vectors(&mut z2, &pool2).unwrap();

        let (b1, b2) = (z1.bcv.as_ref().unwrap(), z2.bcv.as_ref().unwrap());
        for k in 0..b1.len() {
            assert!(
                (2.0 * b1[k] - b2[k]).abs() < 1e-8,
                "coefficient {}: {} vs {}",
                k,
                b1[k],
                b2[k]
            );
        }
    }
}
