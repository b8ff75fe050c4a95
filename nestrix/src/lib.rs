//! A nesting engine for the 2D irregular bin packing problem.
//!
//! Given a set of sheets (rectangles, possibly with forbidden regions) and a set of
//! parts (polygons, possibly with holes), the engine places as many parts as possible
//! onto the sheets under translation and discrete rotation, without overlap and without
//! leaving a sheet. Feasibility is computed exactly on the polygonal representation
//! through no-fit polygons, and the pairwise no-fit polygons are memoized in a [`State`](nfp::State)
//! so that repeated packings of overlapping shape sets are incremental.

/// Boolean operations (union, intersection, difference) on polygons with holes
pub mod boolean;

/// Entities modelling parts, sheets, placements and solutions
pub mod entities;

/// Geometric primitives and transformations
pub mod geometry;

/// The no-fit polygon engine and its cache
pub mod nfp;

/// Polygon dilation, erosion and simplification
pub mod offset;

/// The first-fit-decreasing placement driver
pub mod pack;

/// Helper functions which do not belong to any specific module
pub mod util;

/// The floating point type used throughout the engine
#[allow(non_camel_case_types)]
pub type fsize = f64;
