/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 04/02/2024
Last Modified: 17/06/2024
License: MIT
*/

/*!
A library for computing hydrological flow-path quantities on a 2-D
terrain described by nested, oriented contour loops.

A catchment is an ordered collection of zones, each the region between
contour levels bounded by one or more closed loops sharing a pool of
contours. The potential field inside a zone is recovered from the node
potentials on its boundary with a boundary-element solve; streamlines
follow the gradient field through the zones, and the drained area across
a mouth cross-section integrates streamline lengths against the mouth.
*/

#[macro_use]
extern crate serde_derive;

pub mod algorithms;
pub mod bem;
pub mod catchment;
pub mod errors;
pub mod flow;
pub mod io_utils;
pub mod structures;
pub mod tools;
pub mod utils;
