// slabs
use crate::core::bbox::BoundingBox;
use crate::core::geometry::{vec3_dot_vec3f, Ray, Vector3f};
use crate::core::interaction::Intersection;
use crate::core::primitive::Primitive;
use crate::core::slabs::{Float, MAX_DISTANCE};

/// All points *p* with `dot(normal, p) == offset`. Planes are
/// unbounded, so they never end up inside a finite bounding box.
#[derive(Debug, Clone)]
pub struct Plane {
    pub normal: Vector3f,
    pub offset: Float,
    no_shadow: bool,
}

impl Plane {
    pub fn new(normal: Vector3f, offset: Float) -> Self {
        let length: Float = normal.length();
        assert!(length > 0.0, "plane normal must not be zero");
        Plane {
            normal: normal / length,
            offset: offset / length,
            no_shadow: false,
        }
    }
    pub fn with_no_shadow(mut self) -> Self {
        self.no_shadow = true;
        self
    }
}

impl Primitive for Plane {
    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::infinite()
    }
    fn is_infinite(&self) -> bool {
        true
    }
    fn all_intersections<'a>(&self, ray: &Ray, depth_stack: &mut Vec<Intersection<'a>>) -> bool {
        let denom: Float = vec3_dot_vec3f(&self.normal, &ray.d);
        if denom == 0.0 {
            return false;
        }
        let o: Vector3f = Vector3f::from(ray.o);
        let t: Float = (self.offset - vec3_dot_vec3f(&self.normal, &o)) / denom;
        if t > 0.0 && t < MAX_DISTANCE {
            depth_stack.push(Intersection::at(ray, t));
            true
        } else {
            false
        }
    }
    fn casts_shadow(&self) -> bool {
        !self.no_shadow
    }
}
