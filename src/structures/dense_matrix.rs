/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 16/02/2024
Last Modified: 08/06/2024
License: MIT
*/
use std::fmt;
use std::ops::{Add, Sub};

use nalgebra::DMatrix;
use rayon::prelude::*;

use super::{Point2D, Tensor2};
use crate::errors::FlowpathError;

/// Element types the dense container can hold: plain scalars, 2-vectors for
/// gradient-valued geometry rows, and 2-tensors for Hessian-valued rows.
pub trait MatrixElement:
    Copy + Default + PartialEq + fmt::Debug + Add<Output = Self> + Sub<Output = Self> + Send + Sync
{
    fn scale(self, s: f64) -> Self;
}

impl MatrixElement for f64 {
    fn scale(self, s: f64) -> f64 {
        self * s
    }
}

impl MatrixElement for Point2D {
    fn scale(self, s: f64) -> Point2D {
        self.scaled(s)
    }
}

impl MatrixElement for Tensor2 {
    fn scale(self, s: f64) -> Tensor2 {
        self.scaled(s)
    }
}

/// A dense matrix in column-major storage with a lazy transpose view:
/// element (i, j) lives at value[j*rows + i] unless the transpose bit is
/// set, in which case reads and writes swap the indices. Row- and
/// column-vectors are matrices with one row or one column. Block-addressed
/// access treats the matrix as a grid of sub-blocks without copying.
#[derive(Clone, Debug)]
pub struct DenseMatrix<T: MatrixElement> {
    rows: usize,
    columns: usize,
    transposed: bool,
    values: Vec<T>,
}

impl<T: MatrixElement> DenseMatrix<T> {
    pub fn new(rows: usize, columns: usize) -> DenseMatrix<T> {
        DenseMatrix {
            rows,
            columns,
            transposed: false,
            values: vec![T::default(); rows * columns],
        }
    }

    /// Re-dimensions the matrix in place, reusing the existing allocation
    /// where possible. All elements are reset to zero and the transpose
    /// bit is cleared. Per-zone scratch vectors are resized this way for
    /// every query without reallocating.
    pub fn reshape(&mut self, rows: usize, columns: usize) {
        self.rows = rows;
        self.columns = columns;
        self.transposed = false;
        self.values.clear();
        self.values.resize(rows * columns, T::default());
    }

    /// Number of rows of the viewed matrix (transpose respected).
    pub fn num_rows(&self) -> usize {
        if self.transposed {
            self.columns
        } else {
            self.rows
        }
    }

    /// Number of columns of the viewed matrix (transpose respected).
    pub fn num_columns(&self) -> usize {
        if self.transposed {
            self.rows
        } else {
            self.columns
        }
    }

    pub fn is_transposed(&self) -> bool {
        self.transposed
    }

    /// Flips the transpose view without touching storage.
    pub fn toggle_transpose(&mut self) {
        self.transposed = !self.transposed;
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        if self.transposed {
            i * self.rows + j
        } else {
            j * self.rows + i
        }
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.values[self.offset(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        let k = self.offset(i, j);
        self.values[k] = value;
    }

    #[inline]
    pub fn get_block(&self, offset_i: usize, offset_j: usize, i: usize, j: usize) -> T {
        self.get(offset_i + i, offset_j + j)
    }

    #[inline]
    pub fn set_block(&mut self, offset_i: usize, offset_j: usize, i: usize, j: usize, value: T) {
        self.set(offset_i + i, offset_j + j, value);
    }

    /// Writes zeros into the last row of the viewed matrix.
    pub fn zero_last_row(&mut self) {
        let i = self.num_rows() - 1;
        for j in 0..self.num_columns() {
            self.set(i, j, T::default());
        }
    }

    /// Copies a row vector into the last row of the viewed matrix.
    pub fn fill_last_row(&mut self, row: &DenseMatrix<T>) {
        assert_eq!(row.num_rows(), 1, "last-row source must be a row vector");
        assert_eq!(
            row.num_columns(),
            self.num_columns(),
            "last-row source has wrong length"
        );
        let i = self.num_rows() - 1;
        for j in 0..self.num_columns() {
            self.set(i, j, row.get(0, j));
        }
    }

    /// X := A + B, all shapes equal under their current views.
    pub fn add_into(a: &DenseMatrix<T>, b: &DenseMatrix<T>, x: &mut DenseMatrix<T>) {
        let (rows, columns) = (a.num_rows(), a.num_columns());
        assert_eq!(rows, b.num_rows(), "cannot add differently shaped matrices");
        assert_eq!(columns, b.num_columns(), "cannot add differently shaped matrices");
        x.reshape(rows, columns);
        for j in 0..columns {
            for i in 0..rows {
                x.set(i, j, a.get(i, j) + b.get(i, j));
            }
        }
    }

    /// Dot product of a 1 x n element-valued row vector with a scalar
    /// coefficient vector. This is how the vector- and tensor-valued
    /// geometry rows contract against the boundary coefficient vectors.
    pub fn dot_coefficients(&self, col: &[f64]) -> T {
        assert_eq!(self.num_rows(), 1, "dot_coefficients needs a row vector");
        assert_eq!(
            self.num_columns(),
            col.len(),
            "dot_coefficients length mismatch"
        );
        let mut sum = T::default();
        for (k, &c) in col.iter().enumerate() {
            sum = sum + self.get(0, k).scale(c);
        }
        sum
    }
}

// Columns below this size are multiplied serially; the rayon split only
// pays for itself on the big B^T B products.
const PAR_MIN_WORK: usize = 64 * 64;

impl DenseMatrix<f64> {
    /// X := op(A) op(B), where op resolves the transpose views. X must be
    /// distinct storage from both inputs; it is re-dimensioned to the
    /// product shape. The inner kernel is a pure function and is
    /// parallelized over output columns.
    pub fn multiply(a: &DenseMatrix<f64>, b: &DenseMatrix<f64>, x: &mut DenseMatrix<f64>) {
        let m = a.num_rows();
        let k = a.num_columns();
        let n = b.num_columns();
        assert_eq!(
            k,
            b.num_rows(),
            "cannot multiply ({}x{}) by ({}x{})",
            m,
            k,
            b.num_rows(),
            n
        );
        x.reshape(m, n);

        let work = m * k * n;
        if work >= PAR_MIN_WORK && n > 1 {
            let num_threads = num_cpus::get().max(1);
            let chunk_cols = (n + num_threads - 1) / num_threads;
            x.values
                .par_chunks_mut(m * chunk_cols.max(1))
                .enumerate()
                .for_each(|(chunk, slab)| {
                    let j0 = chunk * chunk_cols;
                    for (jc, col) in slab.chunks_mut(m).enumerate() {
                        let j = j0 + jc;
                        for l in 0..k {
                            let bv = b.get(l, j);
                            if bv != 0f64 {
                                for (i, out) in col.iter_mut().enumerate() {
                                    *out += a.get(i, l) * bv;
                                }
                            }
                        }
                    }
                });
        } else {
            for j in 0..n {
                for l in 0..k {
                    let bv = b.get(l, j);
                    if bv != 0f64 {
                        for i in 0..m {
                            let v = x.values[j * m + i] + a.get(i, l) * bv;
                            x.values[j * m + i] = v;
                        }
                    }
                }
            }
        }
    }

    /// In-place inversion of a square matrix by LU factorization. A
    /// singular factorization is fatal for the current query.
    pub fn invert(&mut self) -> Result<(), FlowpathError> {
        let n = self.num_rows();
        assert_eq!(
            n,
            self.num_columns(),
            "cannot invert a {}x{} matrix",
            n,
            self.num_columns()
        );
        let m = DMatrix::from_fn(n, n, |i, j| self.get(i, j));
        let inv = m.lu().try_inverse().ok_or_else(|| {
            FlowpathError::Numerical(format!("singular {}x{} matrix in boundary solve", n, n))
        })?;
        self.transposed = false;
        self.rows = n;
        self.columns = n;
        for j in 0..n {
            for i in 0..n {
                self.values[j * n + i] = inv[(i, j)];
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::DenseMatrix;

    #[test]
    fn test_block_addressing_is_column_major() {
        let mut m: DenseMatrix<f64> = DenseMatrix::new(4, 4);
        m.set_block(2, 2, 1, 0, 7.0);
        assert_eq!(m.get(3, 2), 7.0);
    }

    #[test]
    fn test_transpose_view_reads() {
        let mut m: DenseMatrix<f64> = DenseMatrix::new(2, 3);
        m.set(0, 2, 5.0);
        m.toggle_transpose();
        assert_eq!(m.num_rows(), 3);
        assert_eq!(m.get(2, 0), 5.0);
    }

    #[test]
    fn test_multiply_resolves_transpose_flags() {
        // A = [1 2; 3 4], B = A^T taken through the view
        let mut a: DenseMatrix<f64> = DenseMatrix::new(2, 2);
        a.set(0, 0, 1.0);
        a.set(0, 1, 2.0);
        a.set(1, 0, 3.0);
        a.set(1, 1, 4.0);
        let mut at = a.clone();
        at.toggle_transpose();
        let mut x: DenseMatrix<f64> = DenseMatrix::new(2, 2);
        DenseMatrix::multiply(&at, &a, &mut x);
        // A^T A = [10 14; 14 20]
        assert_eq!(x.get(0, 0), 10.0);
        assert_eq!(x.get(0, 1), 14.0);
        assert_eq!(x.get(1, 0), 14.0);
        assert_eq!(x.get(1, 1), 20.0);
    }

    #[test]
    fn test_invert_round_trip() {
        let mut m: DenseMatrix<f64> = DenseMatrix::new(2, 2);
        m.set(0, 0, 4.0);
        m.set(0, 1, 7.0);
        m.set(1, 0, 2.0);
        m.set(1, 1, 6.0);
        let orig = m.clone();
        m.invert().unwrap();
        let mut x: DenseMatrix<f64> = DenseMatrix::new(2, 2);
        DenseMatrix::multiply(&orig, &m, &mut x);
        assert!((x.get(0, 0) - 1.0).abs() < 1e-12);
        assert!(x.get(0, 1).abs() < 1e-12);
        assert!(x.get(1, 0).abs() < 1e-12);
        assert!((x.get(1, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_invert_singular_is_an_error() {
        let mut m: DenseMatrix<f64> = DenseMatrix::new(2, 2);
        m.set(0, 0, 1.0);
        m.set(0, 1, 2.0);
        m.set(1, 0, 2.0);
        m.set(1, 1, 4.0);
        assert!(m.invert().is_err());
    }

    #[test]
    fn test_last_row_injection() {
        let mut b: DenseMatrix<f64> = DenseMatrix::new(3, 2);
        let mut row: DenseMatrix<f64> = DenseMatrix::new(1, 2);
        row.set(0, 0, 1.0);
        row.set(0, 1, 2.0);
        b.fill_last_row(&row);
        assert_eq!(b.get(2, 0), 1.0);
        assert_eq!(b.get(2, 1), 2.0);
        b.zero_last_row();
        assert_eq!(b.get(2, 0), 0.0);
    }
}
