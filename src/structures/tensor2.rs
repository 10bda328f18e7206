/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 04/02/2024
Last Modified: 17/04/2024
License: MIT
*/
use std::fmt;
use std::ops::{Add, Sub};

use super::Point2D;

/// A 2x2 Cartesian tensor, used for second derivatives of the potential
/// field and for tensor-valued boundary geometry terms.
#[derive(Default, Copy, Clone, Debug, PartialEq)]
pub struct Tensor2 {
    pub xx: f64,
    pub xy: f64,
    pub yx: f64,
    pub yy: f64,
}

impl fmt::Display for Tensor2 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[[{}, {}], [{}, {}]]",
            self.xx, self.xy, self.yx, self.yy
        )
    }
}

impl Tensor2 {
    pub fn new(xx: f64, xy: f64, yx: f64, yy: f64) -> Tensor2 {
        Tensor2 { xx, xy, yx, yy }
    }

    /// Returns the tensor scaled by a constant.
    pub fn scaled(&self, s: f64) -> Tensor2 {
        Tensor2::new(self.xx * s, self.xy * s, self.yx * s, self.yy * s)
    }

    /// Applies the tensor to a vector, returning T v.
    pub fn apply(&self, v: &Point2D) -> Point2D {
        Point2D::new(
            self.xx * v.x + self.xy * v.y,
            self.yx * v.x + self.yy * v.y,
        )
    }

    pub fn trace(&self) -> f64 {
        self.xx + self.yy
    }

    /// Largest absolute component; used for tolerance checks.
    pub fn max_abs(&self) -> f64 {
        self.xx
            .abs()
            .max(self.xy.abs())
            .max(self.yx.abs())
            .max(self.yy.abs())
    }
}

impl Add for Tensor2 {
    type Output = Tensor2;
    fn add(self, other: Self) -> Tensor2 {
        Tensor2 {
            xx: self.xx + other.xx,
            xy: self.xy + other.xy,
            yx: self.yx + other.yx,
            yy: self.yy + other.yy,
        }
    }
}

impl Sub for Tensor2 {
    type Output = Tensor2;
    fn sub(self, other: Self) -> Tensor2 {
        Tensor2 {
            xx: self.xx - other.xx,
            xy: self.xy - other.xy,
            yx: self.yx - other.yx,
            yy: self.yy - other.yy,
        }
    }
}
