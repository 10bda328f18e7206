/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 14/02/2024
Last Modified: 11/06/2024
License: MIT
*/

// private sub-module defined in other files
mod pool;
mod zone;

// exports identifiers from private sub-modules in the current module namespace
pub use self::pool::ContourPool;
pub use self::zone::{LoopLevel, Zone, ZoneOrientation};

use std::path::Path;

use crate::errors::FlowpathError;
use crate::io_utils::{prefixed_path, read_data_lines};
use crate::structures::{Contour, Point2D};

/// An ordered collection of zones sharing one pool of boundary contours.
///
/// A catchment file names one zone file per line; a zone file names one
/// loop file per line; a loop file holds `x y value` triples, one node per
/// line, implicitly closed. Loop files named by several zones are loaded
/// once and shared.
///
/// `previous_zone` is a one-slot cache holding the index of the zone whose
/// boundary vectors were computed most recently; re-querying inside the
/// same zone skips the dense solve. It is meaningful only for
/// single-threaded evaluation loops.
#[derive(Debug)]
pub struct Catchment {
    zones: Vec<Zone>,
    pool: ContourPool,
    max_zones: usize,
    pub(crate) previous_zone: Option<usize>,
}

impl Catchment {
    pub fn new(max_zones: usize, max_contours: usize) -> Catchment {
        Catchment {
            zones: Vec::with_capacity(max_zones),
            pool: ContourPool::new(max_contours),
            max_zones,
            previous_zone: None,
        }
    }

    /// Loads a catchment description and every zone and loop file it
    /// names, resolving names relative to `data_dir`.
    pub fn from_file(
        catchment_file: &Path,
        data_dir: &Path,
        max_contours: usize,
    ) -> Result<Catchment, FlowpathError> {
        let zone_files = read_data_lines(catchment_file)?;
        let mut c = Catchment::new(zone_files.len(), max_contours);
        for zone_file in &zone_files {
            let zone_path = prefixed_path(data_dir, zone_file);
            let loop_files = read_data_lines(&zone_path)?;
            if loop_files.is_empty() {
                return Err(FlowpathError::parse(
                    zone_path.display().to_string(),
                    "zone file names no loop files",
                ));
            }
            let mut components = vec![];
            for loop_file in &loop_files {
                let index = match c.pool.find(loop_file) {
                    Some(i) => i,
                    None => {
                        let loop_path = prefixed_path(data_dir, loop_file);
                        let contour = read_loop_file(&loop_path)?;
                        c.pool.insert(loop_file, contour)?
                    }
                };
                components.push(index);
            }
            let zone = Zone::assemble(components, &c.pool)?;
            c.push_zone(zone)?;
        }
        Ok(c)
    }

    pub fn push_zone(&mut self, zone: Zone) -> Result<usize, FlowpathError> {
        if self.zones.len() >= self.max_zones {
            return Err(FlowpathError::Capacity(format!(
                "only {} zones reserved for catchment but trying to load more",
                self.max_zones
            )));
        }
        self.zones.push(zone);
        Ok(self.zones.len() - 1)
    }

    pub fn num_zones(&self) -> usize {
        self.zones.len()
    }

    pub fn zone(&self, index: usize) -> &Zone {
        &self.zones[index]
    }

    /// Mutable access to one zone together with the (read-only) pool; the
    /// boundary solver writes a zone's memoized vectors while reading the
    /// shared contours.
    pub(crate) fn zone_and_pool_mut(&mut self, index: usize) -> (&mut Zone, &ContourPool) {
        (&mut self.zones[index], &self.pool)
    }

    pub fn pool(&self) -> &ContourPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ContourPool {
        &mut self.pool
    }

    /// Index of the zone last solved, if any.
    pub fn previous_zone(&self) -> Option<usize> {
        self.previous_zone
    }

    /// Finds the zone containing `p` by scanning zones in catchment
    /// order; the first zone claiming the point wins. Exactly one zone
    /// contains any interior point of a well-formed catchment.
    pub fn find_zone(&self, p: &Point2D) -> Option<usize> {
        self.zones
            .iter()
            .position(|z| z.contains_point(p, &self.pool))
    }

    /// The worst-case boundary-node count over all zones; scratch vectors
    /// are sized once against this.
    pub fn max_points_in_any_zone(&self) -> usize {
        self.zones
            .iter()
            .map(|z| z.num_points(&self.pool))
            .max()
            .unwrap_or(0)
    }

    /// Every boundary loop of every zone, deduplicated (pool order).
    pub fn outline_loops(&self) -> Vec<&Contour> {
        (0..self.pool.len()).map(|i| self.pool.get(i)).collect()
    }
}

/// Reads one loop file: three whitespace-separated decimal fields per data
/// line (x, y, node potential). The loop closes implicitly.
fn read_loop_file(path: &Path) -> Result<Contour, FlowpathError> {
    let lines = read_data_lines(path)?;
    let file = path.display().to_string();
    let mut vertices = Vec::with_capacity(lines.len());
    let mut values = Vec::with_capacity(lines.len());
    for (lineno, line) in lines.iter().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            return Err(FlowpathError::parse(
                file.clone(),
                format!("fewer than 3 data values on line {}", lineno + 1),
            ));
        }
        let x: f64 = fields[0]
            .parse()
            .map_err(|_| FlowpathError::parse(file.clone(), format!("bad x on line {}", lineno + 1)))?;
        let y: f64 = fields[1]
            .parse()
            .map_err(|_| FlowpathError::parse(file.clone(), format!("bad y on line {}", lineno + 1)))?;
        let v: f64 = fields[2].parse().map_err(|_| {
            FlowpathError::parse(file.clone(), format!("bad value on line {}", lineno + 1))
        })?;
        vertices.push(Point2D::new(x, y));
        values.push(v);
    }
    if vertices.len() < 3 {
        return Err(FlowpathError::parse(
            file,
            format!("a closed loop needs at least 3 nodes, found {}", vertices.len()),
        ));
    }
    Ok(Contour::new_closed(vertices, values))
}

#[cfg(test)]
mod test {
    use super::Catchment;
    use crate::structures::Point2D;
    use std::io::Write;
    use std::path::Path;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let mut f = std::fs::File::create(dir.join(name)).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    fn build_two_ring_catchment(dir: &Path) {
        // inner square shared between both zone files
        write_file(
            dir,
            "outer.txt",
            "0.0 0.0 2.0\n4.0 0.0 2.0\n4.0 4.0 2.0\n0.0 4.0 2.0\n",
        );
        write_file(
            dir,
            "inner.txt",
            "1.0 1.0 1.0\n3.0 1.0 1.0\n3.0 3.0 1.0\n1.0 3.0 1.0\n",
        );
        write_file(dir, "zone_ring.txt", "# ring between squares\nouter.txt\ninner.txt\n");
        write_file(dir, "zone_core.txt", "inner.txt\n");
        write_file(dir, "catchment.txt", "# two nested zones\nzone_ring.txt\nzone_core.txt\n");
    }

    #[test]
    fn test_load_shares_contours_between_zones() {
        let dir = tempfile::tempdir().unwrap();
        build_two_ring_catchment(dir.path());
        let c = Catchment::from_file(&dir.path().join("catchment.txt"), dir.path(), 16).unwrap();
        assert_eq!(c.num_zones(), 2);
        // inner.txt appears in both zones but is pooled once
        assert_eq!(c.pool().len(), 2);
        assert_eq!(c.zone(0).num_components(), 2);
        assert_eq!(c.zone(1).num_components(), 1);
        assert_eq!(c.max_points_in_any_zone(), 8);
    }

    #[test]
    fn test_zone_membership_is_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        build_two_ring_catchment(dir.path());
        let c = Catchment::from_file(&dir.path().join("catchment.txt"), dir.path(), 16).unwrap();
        // in the ring
        assert_eq!(c.find_zone(&Point2D::new(0.5, 2.0)), Some(0));
        // in the core
        assert_eq!(c.find_zone(&Point2D::new(2.0, 2.0)), Some(1));
        // outside everything
        assert_eq!(c.find_zone(&Point2D::new(9.0, 9.0)), None);
        // each interior point is claimed by exactly one zone
        for (p, expect) in [
            (Point2D::new(3.5, 3.5), 0usize),
            (Point2D::new(1.5, 1.5), 1usize),
        ] {
            let claims: Vec<usize> = (0..c.num_zones())
                .filter(|&k| c.zone(k).contains_point(&p, c.pool()))
                .collect();
            assert_eq!(claims, vec![expect]);
        }
    }

    #[test]
    fn test_short_line_parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "bad.txt", "0.0 0.0 1.0\n1.0 0.0\n1.0 1.0 1.0\n");
        write_file(dir.path(), "zone.txt", "bad.txt\n");
        write_file(dir.path(), "catchment.txt", "zone.txt\n");
        let err =
            Catchment::from_file(&dir.path().join("catchment.txt"), dir.path(), 4).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("bad.txt"), "error should name the file: {}", msg);
        assert!(msg.contains("line 2"));
    }

    #[test]
    fn test_contour_capacity_is_enforced() {
        let dir = tempfile::tempdir().unwrap();
        build_two_ring_catchment(dir.path());
        let err =
            Catchment::from_file(&dir.path().join("catchment.txt"), dir.path(), 1).unwrap_err();
        assert!(err.to_string().contains("capacity"));
    }
}
