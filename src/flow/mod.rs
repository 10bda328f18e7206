// private sub-module defined in other files
mod area;
pub mod model;
mod streamline;

// exports identifiers from private sub-modules in the current module namespace
pub use self::area::{catchment_area, mouth_flow_rate};
pub use self::streamline::{
    cubic_roots, propose_step, quadratic_roots, quartic_roots, streamline_loop, FlowDirection,
};
