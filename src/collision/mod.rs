//! Collision-aware positioning: live measurement, edge checks, anchored
//! offsets, and the reposition protocol.

pub mod dimensions;
pub mod offsets;
pub mod reposition;

pub use dimensions::{fits_without_collision, get_dimensions, overlap_area, Dimensions, Geometry, Measure};
pub use offsets::{compute_anchored_offset, Position};
pub use reposition::{Placement, Repositioner, Side};
