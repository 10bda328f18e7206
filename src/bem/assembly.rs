/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 04/03/2024
Last Modified: 14/06/2024
License: MIT
*/

//! Assembly of the collocation matrices and per-query geometry vectors.
//!
//! Rows sample each boundary segment at five points (parameters 0.0, 0.2,
//! 0.4, 0.6, 0.8 along the segment, i.e. s in {-0.5, -0.3, -0.1, 0.1,
//! 0.3}); columns hold two potential shape functions or four current
//! shape functions per source segment, in the Chebyshev basis. Loops are
//! always traversed through the zone's oriented view, interior on the
//! left.

use std::f64::consts::PI;

use super::terms::{
    current_terms, current_terms_grad, current_terms_hessian, p2c_2basis, p2c_4basis,
    potential_terms, potential_terms_grad, potential_terms_hessian,
};
use crate::algorithms::{convert_pq, double_rotate_to_pq, rotate_to_pq};
use crate::catchment::{ContourPool, Zone};
use crate::structures::{Contour, DenseMatrix, Point2D, Tensor2};

/// Fractional positions of the five collocation samples along a segment.
const SAMPLE_FRACTIONS: [f64; 5] = [0.0, 0.2, 0.4, 0.6, 0.8];

/// Diagonal-matrix position weights for the four samples interior to a
/// segment, in the monomial basis (the node sample uses the interior
/// angle instead).
const INTERIOR_STENCIL: [f64; 4] = [-0.3, -0.1, 0.1, 0.3];

fn oriented<'a>(zone: &Zone, pool: &'a ContourPool, j: usize) -> (&'a Contour, bool) {
    (pool.get(zone.component(j)), zone.solve_flip(j))
}

/// Voltage geometry matrix A: five V/W-term rows per observation segment
/// against two columns per source segment.
pub fn make_voltage_geometry_matrix(zone: &Zone, pool: &ContourPool, vgm: &mut DenseMatrix<f64>) {
    let paths = zone.num_components();
    let mut offset_j = 0;
    for pj in 0..paths {
        let (loop_j, flip_j) = oriented(zone, pool, pj);
        let mut offset_i = 0;
        for pi in 0..paths {
            let (loop_i, flip_i) = oriented(zone, pool, pi);
            fill_voltage_block(
                offset_i * 5,
                offset_j * 2,
                loop_i,
                flip_i,
                loop_j,
                flip_j,
                zone.component(pi) == zone.component(pj),
                vgm,
            );
            offset_i += loop_i.len();
        }
        offset_j += loop_j.len();
    }
}

#[allow(clippy::too_many_arguments)]
fn fill_voltage_block(
    offset_i: usize,
    offset_j: usize,
    loop_i: &Contour,
    flip_i: bool,
    loop_j: &Contour,
    flip_j: bool,
    same_loop: bool,
    vgm: &mut DenseMatrix<f64>,
) {
    let points_i = loop_i.len();
    let points_j = loop_j.len();
    for segment_j in 0..points_j {
        let qa = loop_j.xy_oriented(segment_j, flip_j);
        let qb = loop_j.xy_oriented(segment_j + 1, flip_j);
        let col = segment_j * 2;
        for segment_i in 0..points_i {
            let row = segment_i * 5;
            let pa = loop_i.xy_oriented(segment_i, flip_i);
            let pf = loop_i.xy_oriented(segment_i + 1, flip_i);
            let on_samples = if same_loop {
                match (segment_i + points_i - segment_j) % points_i {
                    0 => 5,
                    1 => 1,
                    _ => 0,
                }
            } else {
                0
            };
            for (k, frac) in SAMPLE_FRACTIONS.iter().enumerate() {
                let p = Point2D::interpolate(&pa, &pf, *frac);
                let (x, y1, y2) = convert_pq(&qa, &qb, &p);
                let (v, w) = potential_terms(x, y1, y2, k < on_samples);
                let (a0, a1) = p2c_2basis(v, w);
                vgm.set_block(offset_i, offset_j, row + k, col, a0);
                vgm.set_block(offset_i, offset_j, row + k, col + 1, a1);
            }
        }
    }
}

/// Current geometry matrix B: five J/K/L/M-term rows per observation
/// segment against four columns per source segment.
pub fn make_current_geometry_matrix(zone: &Zone, pool: &ContourPool, cgm: &mut DenseMatrix<f64>) {
    let paths = zone.num_components();
    let mut offset_j = 0;
    for pj in 0..paths {
        let (loop_j, flip_j) = oriented(zone, pool, pj);
        let mut offset_i = 0;
        for pi in 0..paths {
            let (loop_i, flip_i) = oriented(zone, pool, pi);
            fill_current_block(
                offset_i * 5,
                offset_j * 4,
                loop_i,
                flip_i,
                loop_j,
                flip_j,
                zone.component(pi) == zone.component(pj),
                cgm,
            );
            offset_i += loop_i.len();
        }
        offset_j += loop_j.len();
    }
}

#[allow(clippy::too_many_arguments)]
fn fill_current_block(
    offset_i: usize,
    offset_j: usize,
    loop_i: &Contour,
    flip_i: bool,
    loop_j: &Contour,
    flip_j: bool,
    same_loop: bool,
    cgm: &mut DenseMatrix<f64>,
) {
    let points_i = loop_i.len();
    let points_j = loop_j.len();
    for segment_j in 0..points_j {
        let qa = loop_j.xy_oriented(segment_j, flip_j);
        let qb = loop_j.xy_oriented(segment_j + 1, flip_j);
        let col = segment_j * 4;
        for segment_i in 0..points_i {
            let row = segment_i * 5;
            let pa = loop_i.xy_oriented(segment_i, flip_i);
            let pf = loop_i.xy_oriented(segment_i + 1, flip_i);
            let on_samples = if same_loop {
                match (segment_i + points_i - segment_j) % points_i {
                    0 => 5,
                    1 => 1,
                    _ => 0,
                }
            } else {
                0
            };
            for (k, frac) in SAMPLE_FRACTIONS.iter().enumerate() {
                let p = Point2D::interpolate(&pa, &pf, *frac);
                let (x, y1, y2) = convert_pq(&qa, &qb, &p);
                let (j, kk, l, m) = current_terms(x, y1, y2, k < on_samples);
                let (a0, a1, a2, a3) = p2c_4basis(j, kk, l, m);
                cgm.set_block(offset_i, offset_j, row + k, col, a0);
                cgm.set_block(offset_i, offset_j, row + k, col + 1, a1);
                cgm.set_block(offset_i, offset_j, row + k, col + 2, a2);
                cgm.set_block(offset_i, offset_j, row + k, col + 3, a3);
            }
        }
    }
}

/// Diagonal angle matrix D: nonzero only where the sample point lies on
/// the source segment. The node sample carries the interior angle at the
/// node over 2 pi; the four interior samples carry the flat angle 1/2
/// with the position stencil {-0.3, -0.1, 0.1, 0.3}. The matrix must be
/// zeroed beforehand (reshape does this).
pub fn make_diagonal_matrix(zone: &Zone, pool: &ContourPool, dm: &mut DenseMatrix<f64>) {
    let paths = zone.num_components();
    let mut offset = 0;
    for pj in 0..paths {
        let (loop_j, flip_j) = oriented(zone, pool, pj);
        let points = loop_j.len();
        for segment in 0..points {
            let row = segment * 5;
            let col = segment * 2;

            let a = loop_j.xy_oriented(segment + points - 1, flip_j);
            let b = loop_j.xy_oriented(segment, flip_j);
            let c = loop_j.xy_oriented(segment + 1, flip_j);

            let syn_y = (a.y - b.y) * (c.x - b.x) - (c.y - b.y) * (a.x - b.x);
            let syn_x = (a.x - b.x) * (c.x - b.x) + (c.y - b.y) * (a.y - b.y);
            let mut syn = syn_y.atan2(syn_x) / (2f64 * PI);
            if syn < 0f64 {
                syn += 1f64;
            }

            let (a0, a1) = p2c_2basis(-0.5 * syn, syn);
            dm.set_block(offset * 5, offset * 2, row, col, a0);
            dm.set_block(offset * 5, offset * 2, row, col + 1, a1);
            for (k, stencil) in INTERIOR_STENCIL.iter().enumerate() {
                let (a0, a1) = p2c_2basis(stencil * 0.5, 0.5);
                dm.set_block(offset * 5, offset * 2, row + k + 1, col, a0);
                dm.set_block(offset * 5, offset * 2, row + k + 1, col + 1, a1);
            }
        }
        offset += points;
    }
}

/// Kirchhoff closure row: the integral of each current shape function
/// over its segment, (0, d/12, 0, d) in the monomial basis.
pub fn make_kcl_row(zone: &Zone, pool: &ContourPool, kcl: &mut DenseMatrix<f64>) {
    let paths = zone.num_components();
    let mut offset_j = 0;
    for pj in 0..paths {
        let (loop_j, flip_j) = oriented(zone, pool, pj);
        let points = loop_j.len();
        for segment_j in 0..points {
            let qa = loop_j.xy_oriented(segment_j, flip_j);
            let qb = loop_j.xy_oriented(segment_j + 1, flip_j);
            let p = Point2D::midpoint(&qa, &qb);
            let (_x, y1, y2) = convert_pq(&qa, &qb, &p);
            let d = y2 - y1;
            let (a0, a1, a2, a3) = p2c_4basis(0f64, d / 12f64, 0f64, d);
            let col = segment_j * 4;
            kcl.set_block(0, offset_j * 4, 0, col, a0);
            kcl.set_block(0, offset_j * 4, 0, col + 1, a1);
            kcl.set_block(0, offset_j * 4, 0, col + 2, a2);
            kcl.set_block(0, offset_j * 4, 0, col + 3, a3);
        }
        offset_j += points;
    }
}

/// Scalar voltage geometry vector at a query point: one V/W pair per
/// boundary segment.
pub fn make_voltage_geometry_vector(
    p: &Point2D,
    zone: &Zone,
    pool: &ContourPool,
    vgv: &mut DenseMatrix<f64>,
) {
    let paths = zone.num_components();
    let mut offset_j = 0;
    for pj in 0..paths {
        let (loop_j, flip_j) = oriented(zone, pool, pj);
        for segment_j in 0..loop_j.len() {
            let qa = loop_j.xy_oriented(segment_j, flip_j);
            let qb = loop_j.xy_oriented(segment_j + 1, flip_j);
            let (x, y1, y2) = convert_pq(&qa, &qb, p);
            let (v, w) = potential_terms(x, y1, y2, false);
            let (a0, a1) = p2c_2basis(v, w);
            let col = segment_j * 2;
            vgv.set_block(0, offset_j * 2, 0, col, a0);
            vgv.set_block(0, offset_j * 2, 0, col + 1, a1);
        }
        offset_j += loop_j.len();
    }
}

/// Scalar current geometry vector at a query point: one J/K/L/M quad per
/// boundary segment.
pub fn make_current_geometry_vector(
    p: &Point2D,
    zone: &Zone,
    pool: &ContourPool,
    cgv: &mut DenseMatrix<f64>,
) {
    let paths = zone.num_components();
    let mut offset_j = 0;
    for pj in 0..paths {
        let (loop_j, flip_j) = oriented(zone, pool, pj);
        for segment_j in 0..loop_j.len() {
            let qa = loop_j.xy_oriented(segment_j, flip_j);
            let qb = loop_j.xy_oriented(segment_j + 1, flip_j);
            let (x, y1, y2) = convert_pq(&qa, &qb, p);
            let (j, k, l, m) = current_terms(x, y1, y2, false);
            let (a0, a1, a2, a3) = p2c_4basis(j, k, l, m);
            let col = segment_j * 4;
            cgv.set_block(0, offset_j * 4, 0, col, a0);
            cgv.set_block(0, offset_j * 4, 0, col + 1, a1);
            cgv.set_block(0, offset_j * 4, 0, col + 2, a2);
            cgv.set_block(0, offset_j * 4, 0, col + 3, a3);
        }
        offset_j += loop_j.len();
    }
}

/// Gradient-valued voltage geometry vector; local-frame derivatives are
/// rotated into the global frame per segment.
pub fn make_co_voltage_geometry_vector(
    p: &Point2D,
    zone: &Zone,
    pool: &ContourPool,
    co_vgv: &mut DenseMatrix<Point2D>,
) {
    let paths = zone.num_components();
    let mut offset_j = 0;
    for pj in 0..paths {
        let (loop_j, flip_j) = oriented(zone, pool, pj);
        for segment_j in 0..loop_j.len() {
            let qa = loop_j.xy_oriented(segment_j, flip_j);
            let qb = loop_j.xy_oriented(segment_j + 1, flip_j);
            let (x, y1, y2) = convert_pq(&qa, &qb, p);
            let (v1, w1) = potential_terms_grad(x, y1, y2);
            let v1 = rotate_to_pq(v1.x, v1.y, &qa, &qb);
            let w1 = rotate_to_pq(w1.x, w1.y, &qa, &qb);
            let (a0, a1) = p2c_2basis(v1, w1);
            let col = segment_j * 2;
            co_vgv.set_block(0, offset_j * 2, 0, col, a0);
            co_vgv.set_block(0, offset_j * 2, 0, col + 1, a1);
        }
        offset_j += loop_j.len();
    }
}

/// Gradient-valued current geometry vector.
pub fn make_co_current_geometry_vector(
    p: &Point2D,
    zone: &Zone,
    pool: &ContourPool,
    co_cgv: &mut DenseMatrix<Point2D>,
) {
    let paths = zone.num_components();
    let mut offset_j = 0;
    for pj in 0..paths {
        let (loop_j, flip_j) = oriented(zone, pool, pj);
        for segment_j in 0..loop_j.len() {
            let qa = loop_j.xy_oriented(segment_j, flip_j);
            let qb = loop_j.xy_oriented(segment_j + 1, flip_j);
            let (x, y1, y2) = convert_pq(&qa, &qb, p);
            let (j1, k1, l1, m1) = current_terms_grad(x, y1, y2);
            let j1 = rotate_to_pq(j1.x, j1.y, &qa, &qb);
            let k1 = rotate_to_pq(k1.x, k1.y, &qa, &qb);
            let l1 = rotate_to_pq(l1.x, l1.y, &qa, &qb);
            let m1 = rotate_to_pq(m1.x, m1.y, &qa, &qb);
            let (a0, a1, a2, a3) = p2c_4basis(j1, k1, l1, m1);
            let col = segment_j * 4;
            co_cgv.set_block(0, offset_j * 4, 0, col, a0);
            co_cgv.set_block(0, offset_j * 4, 0, col + 1, a1);
            co_cgv.set_block(0, offset_j * 4, 0, col + 2, a2);
            co_cgv.set_block(0, offset_j * 4, 0, col + 3, a3);
        }
        offset_j += loop_j.len();
    }
}

/// Hessian-valued voltage geometry vector.
pub fn make_ten_voltage_geometry_vector(
    p: &Point2D,
    zone: &Zone,
    pool: &ContourPool,
    ten_vgv: &mut DenseMatrix<Tensor2>,
) {
    let paths = zone.num_components();
    let mut offset_j = 0;
    for pj in 0..paths {
        let (loop_j, flip_j) = oriented(zone, pool, pj);
        for segment_j in 0..loop_j.len() {
            let qa = loop_j.xy_oriented(segment_j, flip_j);
            let qb = loop_j.xy_oriented(segment_j + 1, flip_j);
            let (x, y1, y2) = convert_pq(&qa, &qb, p);
            let (v2, w2) = potential_terms_hessian(x, y1, y2);
            let v2 = double_rotate_to_pq(&v2, &qa, &qb);
            let w2 = double_rotate_to_pq(&w2, &qa, &qb);
            let (a0, a1) = p2c_2basis(v2, w2);
            let col = segment_j * 2;
            ten_vgv.set_block(0, offset_j * 2, 0, col, a0);
            ten_vgv.set_block(0, offset_j * 2, 0, col + 1, a1);
        }
        offset_j += loop_j.len();
    }
}

/// Hessian-valued current geometry vector.
pub fn make_ten_current_geometry_vector(
    p: &Point2D,
    zone: &Zone,
    pool: &ContourPool,
    ten_cgv: &mut DenseMatrix<Tensor2>,
) {
    let paths = zone.num_components();
    let mut offset_j = 0;
    for pj in 0..paths {
        let (loop_j, flip_j) = oriented(zone, pool, pj);
        for segment_j in 0..loop_j.len() {
            let qa = loop_j.xy_oriented(segment_j, flip_j);
            let qb = loop_j.xy_oriented(segment_j + 1, flip_j);
            let (x, y1, y2) = convert_pq(&qa, &qb, p);
            let (j2, k2, l2, m2) = current_terms_hessian(x, y1, y2);
            let j2 = double_rotate_to_pq(&j2, &qa, &qb);
            let k2 = double_rotate_to_pq(&k2, &qa, &qb);
            let l2 = double_rotate_to_pq(&l2, &qa, &qb);
            let m2 = double_rotate_to_pq(&m2, &qa, &qb);
            let (a0, a1, a2, a3) = p2c_4basis(j2, k2, l2, m2);
            let col = segment_j * 4;
            ten_cgv.set_block(0, offset_j * 4, 0, col, a0);
            ten_cgv.set_block(0, offset_j * 4, 0, col + 1, a1);
            ten_cgv.set_block(0, offset_j * 4, 0, col + 2, a2);
            ten_cgv.set_block(0, offset_j * 4, 0, col + 3, a3);
        }
        offset_j += loop_j.len();
    }
}
