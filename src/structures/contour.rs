/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 09/02/2024
Last Modified: 03/06/2024
License: MIT
*/
use super::{BoundingBox, Point2D};

/// A plane curve sampled at N vertices, each carrying the potential value
/// observed at that node. Contour-line inputs are closed; streamline traces
/// are open and carry no values.
///
/// The `reverse` flag is a zero-copy orientation flip: index i of a reversed
/// contour reads node N-1-i. Closed contours index modulo N, so vertex N is
/// the first vertex again.
#[derive(Default, Clone, Debug)]
pub struct Contour {
    vertices: Vec<Point2D>,
    values: Vec<f64>,
    closed: bool,
    reversed: bool,
}

impl Contour {
    pub fn new(vertices: Vec<Point2D>, values: Vec<f64>) -> Contour {
        Contour {
            vertices,
            values,
            closed: false,
            reversed: false,
        }
    }

    pub fn new_closed(vertices: Vec<Point2D>, values: Vec<f64>) -> Contour {
        Contour {
            vertices,
            values,
            closed: true,
            reversed: false,
        }
    }

    /// An empty open trace with preallocated capacity (streamline buffers).
    pub fn with_capacity(capacity: usize) -> Contour {
        Contour {
            vertices: Vec::with_capacity(capacity),
            values: vec![],
            closed: false,
            reversed: false,
        }
    }

    /// Returns the number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn set_reversed(&mut self, reversed: bool) {
        self.reversed = reversed;
    }

    fn map_index(&self, index: usize, flip: bool) -> usize {
        let n = self.vertices.len();
        let i = if self.closed {
            index % n
        } else {
            debug_assert!(index < n);
            index
        };
        if self.reversed != flip {
            n - 1 - i
        } else {
            i
        }
    }

    pub fn xy(&self, index: usize) -> Point2D {
        self.vertices[self.map_index(index, false)]
    }

    pub fn value(&self, index: usize) -> f64 {
        self.values[self.map_index(index, false)]
    }

    /// Vertex lookup with an additional orientation flip composed over the
    /// contour's own reverse flag. Zones use this to present every loop
    /// with the region interior on the left without mutating shared data.
    pub fn xy_oriented(&self, index: usize, flip: bool) -> Point2D {
        self.vertices[self.map_index(index, flip)]
    }

    pub fn value_oriented(&self, index: usize, flip: bool) -> f64 {
        self.values[self.map_index(index, flip)]
    }

    /// Appends a vertex to an open trace.
    pub fn push(&mut self, v: Point2D) {
        self.vertices.push(v);
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.values.clear();
    }

    /// Returns the total geometric length of the traversal, including the
    /// closing segment for closed contours.
    pub fn length(&self) -> f64 {
        let n = self.vertices.len();
        if n < 2 {
            return 0f64;
        }
        let mut ret = 0f64;
        for a in 0..n - 1 {
            ret += self.vertices[a].distance(&self.vertices[a + 1]);
        }
        if self.closed {
            ret += self.vertices[n - 1].distance(&self.vertices[0]);
        }
        ret
    }

    pub fn get_bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }

    pub fn vertices(&self) -> &[Point2D] {
        &self.vertices
    }
}
