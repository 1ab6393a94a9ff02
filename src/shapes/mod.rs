//! The bounding slab hierarchy only ever sees shapes through the
//! **Primitive** trait. Two simple shapes are provided, one of each
//! kind the hierarchy distinguishes:
//!
//! - Sphere
//! - Plane
//!
//! ## Spheres
//!
//! Spheres have a finite bounding box, which is recomputed from the
//! transformation if the sphere was moved into place by one.
//!
//! ## Planes
//!
//! Planes are infinite objects. The hierarchy keeps them in a bucket
//! of their own and tests them for every ray.

pub mod plane;
pub mod sphere;
