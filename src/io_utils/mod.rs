/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 19/02/2024
Last Modified: 11/06/2024
License: MIT
*/
use std::env;
use std::fs::{self, File};
use std::io::{BufWriter, Error, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::errors::FlowpathError;
use crate::structures::Contour;

/// Directory that input file names are resolved against: the explicit
/// working directory when one was given, otherwise the CATCHMENT
/// environment variable. Needing a prefix with neither set is fatal.
pub fn resolve_data_dir(working_directory: &str) -> Result<PathBuf, FlowpathError> {
    if !working_directory.is_empty() {
        return Ok(PathBuf::from(working_directory));
    }
    match env::var("CATCHMENT") {
        Ok(dir) => Ok(PathBuf::from(dir)),
        Err(_) => Err(FlowpathError::file_io(
            "CATCHMENT",
            Error::new(
                ErrorKind::NotFound,
                "cannot find environment variable: CATCHMENT",
            ),
        )),
    }
}

/// Joins a file name onto the data directory unless it is already an
/// absolute path.
pub fn prefixed_path(dir: &Path, name: &str) -> PathBuf {
    let p = Path::new(name);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        dir.join(p)
    }
}

/// Reads the data lines of a catchment-format text file: UTF-8, one record
/// per line, lines beginning with '#' are comments, blank lines ignored.
pub fn read_data_lines(path: &Path) -> Result<Vec<String>, FlowpathError> {
    let text =
        fs::read_to_string(path).map_err(|e| FlowpathError::file_io(path.to_path_buf(), e))?;
    Ok(text
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| l.to_string())
        .collect())
}

pub fn create_output_file(path: &Path) -> Result<BufWriter<File>, FlowpathError> {
    let f = File::create(path).map_err(|e| FlowpathError::file_io(path.to_path_buf(), e))?;
    Ok(BufWriter::new(f))
}

/// Writes the outline of every loop: each vertex as `x y`, the first
/// vertex repeated at the end to close the figure, loops separated by a
/// blank line.
pub fn write_loop_outlines<'a, I>(loops: I, path: &Path) -> Result<(), FlowpathError>
where
    I: IntoIterator<Item = &'a Contour>,
{
    let mut out = create_output_file(path)?;
    for c in loops {
        for i in 0..c.len() + 1 {
            let p = c.xy(i);
            writeln!(out, "{} {}", p.x, p.y)
                .map_err(|e| FlowpathError::file_io(path.to_path_buf(), e))?;
        }
        writeln!(out).map_err(|e| FlowpathError::file_io(path.to_path_buf(), e))?;
    }
    Ok(())
}

/// Writes open traces (streamlines): each vertex as `x y`, traces
/// separated by a blank line; empty traces are skipped.
pub fn write_traces<'a, I>(traces: I, path: &Path) -> Result<(), FlowpathError>
where
    I: IntoIterator<Item = &'a Contour>,
{
    let mut out = create_output_file(path)?;
    for c in traces {
        if c.is_empty() {
            continue;
        }
        for i in 0..c.len() {
            let p = c.xy(i);
            writeln!(out, "{} {}", p.x, p.y)
                .map_err(|e| FlowpathError::file_io(path.to_path_buf(), e))?;
        }
        writeln!(out).map_err(|e| FlowpathError::file_io(path.to_path_buf(), e))?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::{prefixed_path, read_data_lines};
    use std::io::Write;
    use std::path::Path;

    #[test]
    fn test_comment_and_blank_filtering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zones.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "# catchment zones").unwrap();
        writeln!(f, "ring1.txt").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "ring2.txt").unwrap();
        drop(f);
        let lines = read_data_lines(&path).unwrap();
        assert_eq!(lines, vec!["ring1.txt", "ring2.txt"]);
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = read_data_lines(Path::new("no_such_catchment.txt")).unwrap_err();
        assert!(err.to_string().contains("no_such_catchment.txt"));
    }

    #[test]
    fn test_prefixing_respects_absolute_paths() {
        let joined = prefixed_path(Path::new("/data"), "loops/a.txt");
        assert_eq!(joined, Path::new("/data/loops/a.txt"));
        let abs = prefixed_path(Path::new("/data"), "/tmp/a.txt");
        assert_eq!(abs, Path::new("/tmp/a.txt"));
    }
}
