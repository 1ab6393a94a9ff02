//! # rs_slabs
//!
//! [Rust][rust] crate implementing a *bounding slab* hierarchy, the
//! bounding volume hierarchy used to find the nearest object hit by a
//! ray without testing every object of a scene.
//!
//! The hierarchy is built once per scene with a surface area
//! heuristic (see [bbox_tree]) and is then shared read-only by all
//! render threads. Each query visits the tree nearest-first with a
//! per-thread priority queue and stops as soon as no queued box can
//! contain anything closer than the best hit so far (see
//! [traversal]).
//!
//! [rust]: https://www.rust-lang.org
//! [bbox_tree]: accelerators/bbox_tree/index.html
//! [traversal]: accelerators/traversal/index.html

#[macro_use]
extern crate impl_ops;

pub mod accelerators;
pub mod core;
pub mod shapes;
