/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 14/02/2024
Last Modified: 11/06/2024
License: MIT
*/
use super::ContourPool;
use crate::algorithms::{classify_point, is_clockwise_loop};
use crate::errors::FlowpathError;
use crate::structures::Point2D;

/// The common traversal sense of every loop in a zone, as loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoneOrientation {
    /// Region on the left of travel.
    Anticlockwise,
    /// Region on the right of travel.
    Clockwise,
}

/// Role of one loop within its zone's boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopLevel {
    /// Separates the zone from infinity.
    Outer,
    /// A hole: separated from infinity by the zone.
    Hole,
}

/// One region between contour levels, bounded by one or more closed loops
/// drawn from the shared pool. At most one loop is the outer boundary; the
/// rest are holes. A zone with no outer loop extends to infinity.
///
/// The solved boundary voltage and current vectors are memoized here and
/// live until the catchment is dropped.
#[derive(Debug)]
pub struct Zone {
    orientation: ZoneOrientation,
    components: Vec<usize>,
    levels: Vec<LoopLevel>,
    pub(crate) bvv: Option<Vec<f64>>,
    pub(crate) bcv: Option<Vec<f64>>,
}

impl Zone {
    /// Builds a zone from pool indices, detecting the common traversal
    /// sense and classifying each loop as outer or hole. A mix of senses,
    /// more than one outer loop, or loops that are neither outer nor hole
    /// are Topology errors.
    pub fn assemble(components: Vec<usize>, pool: &ContourPool) -> Result<Zone, FlowpathError> {
        if components.is_empty() {
            return Err(FlowpathError::Topology(
                "zone has no boundary loops".to_string(),
            ));
        }
        let orientation = common_orientation(&components, pool)?;
        let levels = mark_levels(&components, orientation, pool)?;
        Ok(Zone {
            orientation,
            components,
            levels,
            bvv: None,
            bcv: None,
        })
    }

    pub fn orientation(&self) -> ZoneOrientation {
        self.orientation
    }

    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    pub fn component(&self, j: usize) -> usize {
        self.components[j]
    }

    pub fn level(&self, j: usize) -> LoopLevel {
        self.levels[j]
    }

    /// Total number of boundary nodes (and, for closed loops, segments).
    pub fn num_points(&self, pool: &ContourPool) -> usize {
        self.components.iter().map(|&c| pool.get(c).len()).sum()
    }

    /// Whether loop j must be traversed opposite to its stored order to
    /// put the zone interior on the left: holes of an anticlockwise zone
    /// and the outer loop of a clockwise zone. Every boundary-element
    /// computation and membership test reads loops through this view; the
    /// stored contours are never mutated.
    pub fn solve_flip(&self, j: usize) -> bool {
        match (self.orientation, self.levels[j]) {
            (ZoneOrientation::Anticlockwise, LoopLevel::Hole) => true,
            (ZoneOrientation::Clockwise, LoopLevel::Outer) => true,
            _ => false,
        }
    }

    /// A zone is finite when some loop separates it from infinity.
    pub fn is_finite(&self) -> bool {
        self.levels.iter().any(|&l| l == LoopLevel::Outer)
    }

    /// True when `p` lies in this zone: inside the oriented view of every
    /// boundary loop (for a hole traversed clockwise, "inside" admits the
    /// region around it).
    pub fn contains_point(&self, p: &Point2D, pool: &ContourPool) -> bool {
        self.components.iter().enumerate().all(|(j, &c)| {
            classify_point(p, pool.get(c), self.solve_flip(j)).inside
        })
    }

    pub fn has_boundary_vectors(&self) -> bool {
        self.bvv.is_some() && self.bcv.is_some()
    }
}

fn common_orientation(
    components: &[usize],
    pool: &ContourPool,
) -> Result<ZoneOrientation, FlowpathError> {
    let clockwise = components
        .iter()
        .filter(|&&c| is_clockwise_loop(pool.get(c)))
        .count();
    if clockwise == components.len() {
        Ok(ZoneOrientation::Clockwise)
    } else if clockwise == 0 {
        Ok(ZoneOrientation::Anticlockwise)
    } else {
        Err(FlowpathError::Topology(
            "zone has mixed clockwise and anticlockwise loops".to_string(),
        ))
    }
}

/// Classifies each loop by counting, for each loop, how many of the other
/// loops it encloses: enclosing none makes it a hole, enclosing all the
/// others makes it the outer boundary. A single anticlockwise loop is
/// outer; a single clockwise loop is a hole (the zone is the unbounded
/// region around it).
fn mark_levels(
    components: &[usize],
    orientation: ZoneOrientation,
    pool: &ContourPool,
) -> Result<Vec<LoopLevel>, FlowpathError> {
    let n = components.len();
    let mut levels = vec![LoopLevel::Hole; n];

    let mut outer_count = 0usize;
    let mut hole_count = 0usize;
    let mut outer_index = None;

    if n == 1 {
        if orientation == ZoneOrientation::Anticlockwise {
            outer_count = 1;
            outer_index = Some(0);
        } else {
            hole_count = 1;
        }
    } else {
        // probe with every loop traversed anticlockwise
        let flip_all = orientation == ZoneOrientation::Clockwise;
        for j in 0..n {
            let loop_j = pool.get(components[j]);
            let mut enclosed = 0usize;
            for i in 0..n {
                if i != j {
                    let probe = pool.get(components[i]).xy_oriented(0, flip_all);
                    if classify_point(&probe, loop_j, flip_all).inside {
                        enclosed += 1;
                    }
                }
            }
            if enclosed == 0 {
                hole_count += 1;
            }
            if enclosed == n - 1 {
                outer_count += 1;
                outer_index = Some(j);
            }
        }
    }

    if outer_count > 1 {
        return Err(FlowpathError::Topology(
            "found more than one loop outside the zone".to_string(),
        ));
    }
    if let Some(j) = outer_index {
        levels[j] = LoopLevel::Outer;
    }
    if outer_count + hole_count != n {
        return Err(FlowpathError::Topology(
            "outer plus hole loops do not account for every loop in the zone".to_string(),
        ));
    }
    Ok(levels)
}
