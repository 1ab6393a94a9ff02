//! Acceleration structures are one of the components at the heart of
//! any ray tracer. Without algorithms to reduce the number of
//! unnecessary ray intersection tests, tracing a single ray through a
//! scene would take time linear in the number of objects in the
//! scene, since the ray would need to be tested against each object
//! in turn to find the closest intersection.
//!
//! - BBoxPriorityQueue
//! - BBoxTree (bounding slabs)
//! - RayInfo and the nearest-first traversal

pub mod bbox_tree;
pub mod priority_queue;
pub mod traversal;
