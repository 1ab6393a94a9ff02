// slabs
use crate::core::bbox::BoundingBox;
use crate::core::geometry::{vec3_dot_vec3f, Point3f, Ray, Vector3f};
use crate::core::interaction::Intersection;
use crate::core::primitive::Primitive;
use crate::core::slabs::{quadratic, Float, MAX_DISTANCE};
use crate::core::transform::Transform;

#[derive(Debug, Clone)]
pub struct Sphere {
    pub center: Point3f,
    pub radius: Float,
    // optional placement in the scene, applied after center/radius
    object_to_world: Option<Transform>,
    no_shadow: bool,
}

impl Default for Sphere {
    fn default() -> Self {
        Sphere::new(Point3f::default(), 1.0)
    }
}

impl Sphere {
    pub fn new(center: Point3f, radius: Float) -> Self {
        Sphere {
            center,
            radius,
            object_to_world: None,
            no_shadow: false,
        }
    }
    pub fn with_transform(mut self, object_to_world: Transform) -> Self {
        if object_to_world.is_identity() {
            self.object_to_world = None;
        } else {
            self.object_to_world = Some(object_to_world);
        }
        self
    }
    /// Shadow rays pass through spheres created like this.
    pub fn with_no_shadow(mut self) -> Self {
        self.no_shadow = true;
        self
    }
    fn object_bound(&self) -> BoundingBox {
        let r: Float = self.radius;
        BoundingBox::new(
            self.center - Vector3f::new(r, r, r),
            Vector3f::new(2.0 * r, 2.0 * r, 2.0 * r),
        )
    }
}

impl Primitive for Sphere {
    fn bounding_box(&self) -> BoundingBox {
        match &self.object_to_world {
            Some(trans) => self.object_bound().recompute(trans),
            None => self.object_bound(),
        }
    }
    fn all_intersections<'a>(&self, r: &Ray, depth_stack: &mut Vec<Intersection<'a>>) -> bool {
        // transform _Ray_ to object space, keeping the parametrization
        let ray: Ray = match &self.object_to_world {
            Some(trans) => Ray::new(
                trans.inverse_transform_point(&r.o),
                trans.inverse_transform_vector(&r.d),
            ),
            None => *r,
        };
        let oc: Vector3f = ray.o - self.center;
        let a: Float = ray.d.length_squared();
        if a == 0.0 {
            return false;
        }
        let b: Float = 2.0 * vec3_dot_vec3f(&ray.d, &oc);
        let c: Float = oc.length_squared() - self.radius * self.radius;
        let (t0, t1) = match quadratic(a, b, c) {
            Some(roots) => roots,
            None => return false,
        };
        let mut found: bool = false;
        for t in [t0, t1].iter() {
            if *t > 0.0 && *t < MAX_DISTANCE {
                // the hit point is reported in world space
                depth_stack.push(Intersection::at(r, *t));
                found = true;
            }
        }
        found
    }
    fn casts_shadow(&self) -> bool {
        !self.no_shadow
    }
}
