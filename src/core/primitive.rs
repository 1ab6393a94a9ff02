//! The abstract **Primitive** trait is the bridge between the bounding
//! slab hierarchy and whatever geometry the renderer knows about.
//! The hierarchy only needs to know where an object is (its
//! **BoundingBox**), whether it is unbounded, and how to intersect a
//! ray with it. Everything else about the object stays opaque.

// slabs
use crate::core::bbox::BoundingBox;
use crate::core::geometry::Ray;
use crate::core::interaction::Intersection;
use crate::core::slabs::{Float, MIN_ISECT_DEPTH};

pub trait Primitive: Send + Sync {
    fn bounding_box(&self) -> BoundingBox;
    /// Infinite objects (planes, ...) are never culled by their box.
    fn is_infinite(&self) -> bool {
        false
    }
    /// Push every intersection of *ray* with the object onto
    /// *depth_stack*. Returns `true` if at least one was pushed.
    fn all_intersections<'a>(&self, ray: &Ray, depth_stack: &mut Vec<Intersection<'a>>) -> bool;
    fn casts_shadow(&self) -> bool {
        true
    }
}

/// Do both references point to the same object?
pub fn same_object(a: &dyn Primitive, b: &dyn Primitive) -> bool {
    // compare addresses only, vtables may be duplicated
    std::ptr::eq(a as *const _ as *const u8, b as *const _ as *const u8)
}

/// Nearest intersection of *ray* with *object* that is not closer than
/// `MIN_ISECT_DEPTH`.
pub fn find_intersection<'a>(
    object: &'a dyn Primitive,
    ray: &Ray,
    depth_stack: &mut Vec<Intersection<'a>>,
) -> Option<Intersection<'a>> {
    let accept_all = |_: &Ray, _: &dyn Primitive, _: Float| true;
    find_intersection_with_condition(object, ray, depth_stack, &accept_all)
}

/// Like **find_intersection**, but only intersections accepted by
/// *postcondition* qualify.
pub fn find_intersection_with_condition<'a, P>(
    object: &'a dyn Primitive,
    ray: &Ray,
    depth_stack: &mut Vec<Intersection<'a>>,
    postcondition: &P,
) -> Option<Intersection<'a>>
where
    P: Fn(&Ray, &dyn Primitive, Float) -> bool + ?Sized,
{
    depth_stack.clear();
    if !object.all_intersections(ray, depth_stack) {
        return None;
    }
    let mut closest: Float = Float::INFINITY;
    let mut found: Option<Intersection<'a>> = None;
    while let Some(isect) = depth_stack.pop() {
        let depth: Float = isect.depth;
        if depth < closest && depth >= MIN_ISECT_DEPTH && postcondition(ray, object, depth) {
            closest = depth;
            found = Some(isect);
        }
    }
    found.map(|mut isect| {
        isect.object = Some(object);
        isect
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::geometry::{Point3f, Vector3f};

    /// Reports a fixed list of depths.
    struct Layers(Vec<Float>);

    impl Primitive for Layers {
        fn bounding_box(&self) -> BoundingBox {
            BoundingBox::infinite()
        }
        fn all_intersections<'a>(
            &self,
            ray: &Ray,
            depth_stack: &mut Vec<Intersection<'a>>,
        ) -> bool {
            for depth in &self.0 {
                depth_stack.push(Intersection::at(ray, *depth));
            }
            !self.0.is_empty()
        }
    }

    fn ray() -> Ray {
        Ray::new(Point3f::default(), Vector3f::new(0.0, 0.0, 1.0))
    }

    #[test]
    fn closest_valid_depth_wins() {
        let layers = Layers(vec![7.0, 0.00001, 3.0, 5.0]);
        let mut stack = Vec::new();
        let isect = find_intersection(&layers, &ray(), &mut stack).unwrap();
        assert_eq!(isect.depth, 3.0);
        assert_eq!(isect.ipoint.z, 3.0);
        assert!(isect.is_on(&layers));
        assert!(stack.is_empty());
    }

    #[test]
    fn no_intersections_is_none() {
        let layers = Layers(Vec::new());
        let mut stack = Vec::new();
        assert!(find_intersection(&layers, &ray(), &mut stack).is_none());
        let too_close = Layers(vec![0.0, -1.0]);
        assert!(find_intersection(&too_close, &ray(), &mut stack).is_none());
    }

    #[test]
    fn postcondition_filters_depths() {
        let layers = Layers(vec![2.0, 4.0, 6.0]);
        let mut stack = Vec::new();
        let beyond_three = |_: &Ray, _: &dyn Primitive, d: Float| d > 3.0;
        let isect = find_intersection_with_condition(&layers, &ray(), &mut stack, &beyond_three)
            .unwrap();
        assert_eq!(isect.depth, 4.0);
        let reject_all = |_: &Ray, _: &dyn Primitive, _: Float| false;
        let none = find_intersection_with_condition(&layers, &ray(), &mut stack, &reject_all);
        assert!(none.is_none());
    }
}
