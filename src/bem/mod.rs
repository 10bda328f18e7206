// private sub-module defined in other files
pub mod assembly;
mod field;
mod solver;
pub mod terms;

// exports identifiers from private sub-modules in the current module namespace
pub use self::field::{evaluate_in_catchment, BemWorkspace, FieldSolution, ZoneQuery};
pub use self::solver::{
    build_boundary_voltage_vector, ensure_boundary_vectors, solve_boundary_current_vector,
};
