// private sub-module defined in other files
mod loop_membership;
mod segment_frame;

// exports identifiers from private sub-modules in the current module namespace
pub use self::loop_membership::{classify_point, is_clockwise_loop, PointOnLoop};
pub use self::segment_frame::{atan3, atanv, convert_pq, double_rotate_to_pq, rotate_to_pq};
