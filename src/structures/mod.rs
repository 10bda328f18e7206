// private sub-module defined in other files
mod bounding_box;
mod contour;
mod dense_matrix;
mod point2d;
mod section;
mod tensor2;

// exports identifiers from private sub-modules in the current module namespace
pub use self::bounding_box::BoundingBox;
pub use self::contour::Contour;
pub use self::dense_matrix::{DenseMatrix, MatrixElement};
pub use self::point2d::Point2D;
pub use self::section::{RasterGrid, Section};
pub use self::tensor2::Tensor2;
