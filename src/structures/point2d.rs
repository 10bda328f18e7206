/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 04/02/2024
Last Modified: 22/05/2024
License: MIT
*/
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A 2-D point, with x and y fields.
#[derive(Default, Copy, Clone, Debug, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

impl Point2D {
    /// Creates a new Point2D.
    pub fn new(x: f64, y: f64) -> Point2D {
        Point2D { x, y }
    }

    /// Calculates the midpoint between two Point2Ds.
    pub fn midpoint(p1: &Point2D, p2: &Point2D) -> Point2D {
        Point2D::new((p1.x + p2.x) / 2f64, (p1.y + p2.y) / 2f64)
    }

    /// Linear interpolation between two points; t=0 gives p1, t=1 gives p2.
    pub fn interpolate(p1: &Point2D, p2: &Point2D, t: f64) -> Point2D {
        Point2D::new(
            (1f64 - t) * p1.x + t * p2.x,
            (1f64 - t) * p1.y + t * p2.y,
        )
    }

    /// Calculates the cross product.
    pub fn cross(&self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Calculate Euclidean distance between the point and another.
    pub fn distance(&self, other: &Self) -> f64 {
        ((self.x - other.x) * (self.x - other.x) + (self.y - other.y) * (self.y - other.y)).sqrt()
    }

    /// Calculate squared Euclidean distance between the point and another.
    pub fn distance_squared(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Calculates the magnitude sqrt(x^2 + y^2) of the point.
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Returns the point scaled by a constant.
    pub fn scaled(&self, s: f64) -> Point2D {
        Point2D::new(self.x * s, self.y * s)
    }

    pub fn translate(&self, delta_x: f64, delta_y: f64) -> Point2D {
        Point2D::new(self.x + delta_x, self.y + delta_y)
    }

    /// Tests if a point is Left|On|Right of an infinite line,
    /// based on http://geomalgorithms.com/a03-_inclusion.html.
    ///
    /// Input:  two points, p0 and p1, on the line
    ///
    /// Return: > 0 for self left of the line through p0 and p1
    ///         = 0 for self on the line through p0 and p1
    ///         < 0 for self right of the line through p0 and p1
    pub fn is_left(&self, p0: &Point2D, p1: &Point2D) -> f64 {
        (p1.x - p0.x) * (self.y - p0.y) - (self.x - p0.x) * (p1.y - p0.y)
    }

    pub fn nearly_equals(&self, other: &Self) -> bool {
        (self.x - other.x).hypot(self.y - other.y) <= 1e-10
    }
}

impl Eq for Point2D {}

impl Add for Point2D {
    type Output = Point2D;
    fn add(self, other: Self) -> Point2D {
        Point2D {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Point2D {
    type Output = Point2D;
    fn sub(self, other: Self) -> Point2D {
        Point2D {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

// dot product
impl Mul for Point2D {
    type Output = f64;
    fn mul(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }
}
