//! The geometry of a particular point on a surface is represented by
//! an **Intersection**. Objects fill in the depth and the hit point,
//! the traversal adds the back-reference to the object it tested.

// std
use std::fmt;
// slabs
use crate::core::geometry::{Point3f, Ray};
use crate::core::primitive::{same_object, Primitive};
use crate::core::slabs::{Float, BOUND_HUGE};

#[derive(Clone, Copy)]
pub struct Intersection<'a> {
    /// distance along the ray, in units of the ray direction
    pub depth: Float,
    pub ipoint: Point3f,
    pub object: Option<&'a dyn Primitive>,
}

impl<'a> Default for Intersection<'a> {
    /// "No intersection found yet."
    fn default() -> Self {
        Intersection {
            depth: BOUND_HUGE,
            ipoint: Point3f::default(),
            object: None,
        }
    }
}

impl<'a> Intersection<'a> {
    pub fn new(depth: Float, ipoint: Point3f) -> Self {
        Intersection {
            depth,
            ipoint,
            object: None,
        }
    }
    pub fn at(ray: &Ray, depth: Float) -> Self {
        Intersection::new(depth, ray.position(depth))
    }
    pub fn is_hit(&self) -> bool {
        self.object.is_some()
    }
    /// Is the hit on the given object (identity, not equality)?
    pub fn is_on(&self, object: &dyn Primitive) -> bool {
        match self.object {
            Some(hit) => same_object(hit, object),
            None => false,
        }
    }
}

impl<'a> fmt::Debug for Intersection<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Intersection")
            .field("depth", &self.depth)
            .field("ipoint", &self.ipoint)
            .field(
                "object",
                &self
                    .object
                    .map(|o| o as *const _ as *const u8),
            )
            .finish()
    }
}
