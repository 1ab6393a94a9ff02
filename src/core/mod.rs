//! Shared foundations of the bounding slab hierarchy: numbers and
//! geometry, bounding boxes, the interface to scene objects, scenes,
//! statistics and the threading around it all.

pub mod bbox;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod parallel;
pub mod paramset;
pub mod primitive;
pub mod scene;
pub mod slabs;
pub mod stats;
pub mod transform;
