/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 22/02/2024
Last Modified: 30/05/2024
License: MIT
*/
use regex::Regex;

use super::Point2D;
use crate::errors::FlowpathError;

/// A straight cross-section through the catchment (the "mouth"), sampled
/// at n equispaced points. Parsed from specifications of the form
/// `P(0) = (2.0,3.0) P(40) = (3.0,2.0)`, giving n = i2 - i1 + 1.
#[derive(Clone, Debug)]
pub struct Section {
    pub n: usize,
    pub p1: Point2D,
    pub p2: Point2D,
    /// Distance between adjacent sample points.
    pub step: f64,
}

impl Section {
    pub fn new(n: usize, p1: Point2D, p2: Point2D) -> Section {
        let step = p1.distance(&p2) / (n - 1) as f64;
        Section { n, p1, p2, step }
    }

    pub fn parse(spec: &str) -> Result<Section, FlowpathError> {
        let re = Regex::new(
            r"P\(\s*(-?\d+)\s*\)\s*=\s*\(\s*(-?[0-9.eE+-]+)\s*,\s*(-?[0-9.eE+-]+)\s*\)",
        )
        .unwrap();
        let mut ends = vec![];
        for cap in re.captures_iter(spec) {
            let i: i64 = cap[1].parse().map_err(|_| bad_section(spec))?;
            let x: f64 = cap[2].parse().map_err(|_| bad_section(spec))?;
            let y: f64 = cap[3].parse().map_err(|_| bad_section(spec))?;
            ends.push((i, Point2D::new(x, y)));
        }
        if ends.len() != 2 {
            return Err(bad_section(spec));
        }
        let (i1, p1) = ends[0];
        let (i2, p2) = ends[1];
        if i2 <= i1 {
            return Err(bad_section(spec));
        }
        Ok(Section::new((i2 - i1 + 1) as usize, p1, p2))
    }

    /// Sample point i, with the endpoints returned exactly at i = 0 and
    /// i = n-1.
    pub fn xy(&self, i: usize) -> Point2D {
        if i == 0 {
            self.p1
        } else if i == self.n - 1 {
            self.p2
        } else {
            let w = (self.n - 1) as f64;
            Point2D::new(
                (self.p1.x * (w - i as f64) + self.p2.x * i as f64) / w,
                (self.p1.y * (w - i as f64) + self.p2.y * i as f64) / w,
            )
        }
    }
}

fn bad_section(spec: &str) -> FlowpathError {
    FlowpathError::parse(
        "section specification",
        format!("'{}' does not match P(i1) = (x1,y1) P(i2) = (x2,y2)", spec),
    )
}

/// A rectangular sample grid between two corner points, parsed from
/// `P(i1,j1) = (x1,y1) P(i2,j2) = (x2,y2)`.
#[derive(Clone, Debug)]
pub struct RasterGrid {
    pub nx: usize,
    pub ny: usize,
    pub p1: Point2D,
    pub p2: Point2D,
}

impl RasterGrid {
    pub fn parse(spec: &str) -> Result<RasterGrid, FlowpathError> {
        let re = Regex::new(
            r"P\(\s*(-?\d+)\s*,\s*(-?\d+)\s*\)\s*=\s*\(\s*(-?[0-9.eE+-]+)\s*,\s*(-?[0-9.eE+-]+)\s*\)",
        )
        .unwrap();
        let mut ends = vec![];
        for cap in re.captures_iter(spec) {
            let i: i64 = cap[1].parse().map_err(|_| bad_raster(spec))?;
            let j: i64 = cap[2].parse().map_err(|_| bad_raster(spec))?;
            let x: f64 = cap[3].parse().map_err(|_| bad_raster(spec))?;
            let y: f64 = cap[4].parse().map_err(|_| bad_raster(spec))?;
            ends.push((i, j, Point2D::new(x, y)));
        }
        if ends.len() != 2 {
            return Err(bad_raster(spec));
        }
        let (i1, j1, p1) = ends[0];
        let (i2, j2, p2) = ends[1];
        if i2 < i1 || j2 < j1 {
            return Err(bad_raster(spec));
        }
        Ok(RasterGrid {
            nx: (i2 - i1 + 1) as usize,
            ny: (j2 - j1 + 1) as usize,
            p1,
            p2,
        })
    }

    pub fn x(&self, i: usize) -> f64 {
        if i == 0 {
            self.p1.x
        } else if i == self.nx - 1 {
            self.p2.x
        } else {
            let w = (self.nx - 1) as f64;
            (self.p1.x * (w - i as f64) + self.p2.x * i as f64) / w
        }
    }

    pub fn y(&self, j: usize) -> f64 {
        if j == 0 {
            self.p1.y
        } else if j == self.ny - 1 {
            self.p2.y
        } else {
            let w = (self.ny - 1) as f64;
            (self.p1.y * (w - j as f64) + self.p2.y * j as f64) / w
        }
    }
}

fn bad_raster(spec: &str) -> FlowpathError {
    FlowpathError::parse(
        "raster specification",
        format!(
            "'{}' does not match P(i1,j1) = (x1,y1) P(i2,j2) = (x2,y2)",
            spec
        ),
    )
}

#[cfg(test)]
mod test {
    use super::{RasterGrid, Section};

    #[test]
    fn test_parse_section() {
        let s = Section::parse("P(0) = (2.0,3.0)  P(40) = (3.0,2.0)").unwrap();
        assert_eq!(s.n, 41);
        assert!((s.step - (2f64).sqrt() / 40.0).abs() < 1e-12);
        assert_eq!(s.xy(0), s.p1);
        assert_eq!(s.xy(40), s.p2);
    }

    #[test]
    fn test_parse_section_rejects_garbage() {
        assert!(Section::parse("P(0) = (2.0,3.0)").is_err());
        assert!(Section::parse("mouth from here to there").is_err());
    }

    #[test]
    fn test_parse_raster() {
        let r = RasterGrid::parse("P(0,0)=(0.0,0.0) P(20,10)=(20.0,10.0)").unwrap();
        assert_eq!((r.nx, r.ny), (21, 11));
        assert!((r.x(10) - 10.0).abs() < 1e-12);
        assert!((r.y(10) - 10.0).abs() < 1e-12);
    }
}
