//! # Nearest-first traversal
//!
//! A query walks the bounding slab hierarchy in order of increasing
//! entry distance. Nodes whose box the ray hits are put into the
//! render thread's **BBoxPriorityQueue** keyed by the distance at
//! which the ray enters the box; the closest one is expanded next.
//! As soon as the closest queued box starts behind the best
//! intersection found so far, nothing left in the queue can beat it
//! and the walk stops.
//!
//! Nodes flagged as infinite are never culled. They get a key of
//! `-MAX_DISTANCE` and are therefore expanded before anything else.

// others
use strum::IntoEnumIterator;
// slabs
use crate::accelerators::bbox_tree::{BBoxNode, BBoxTree};
use crate::accelerators::priority_queue::BBoxPriorityQueue;
use crate::core::bbox::BoundingBox;
use crate::core::geometry::{Point3f, Ray, Vector3f, XYZEnum};
use crate::core::interaction::Intersection;
use crate::core::parallel::TraceThreadData;
use crate::core::primitive::{find_intersection_with_condition, Primitive};
use crate::core::slabs::{Float, BOUND_HUGE, EPSILON, MAX_DISTANCE};
use crate::core::stats::RenderStatistics;

/// Per-ray values used by every slab test of one query.
#[derive(Debug, Default, Copy, Clone)]
pub struct RayInfo {
    pub slab_num: Point3f,
    /// reciprocal direction, only valid where `nonzero` is set
    pub slab_den: Vector3f,
    pub nonzero: [bool; 3],
    pub positive: [bool; 3],
}

impl RayInfo {
    pub fn new(ray: &Ray) -> Self {
        let mut info = RayInfo {
            slab_num: ray.o,
            ..Default::default()
        };
        for axis in XYZEnum::iter() {
            let t: Float = ray.d[axis];
            if t != 0.0 {
                info.nonzero[axis as usize] = true;
                info.slab_den[axis] = 1.0 as Float / t;
                info.positive[axis as usize] = t > 0.0;
            }
        }
        info
    }
    /// Slab test: the distance at which the ray enters *bbox*, or
    /// `None` if it misses the box or the box lies behind the ray.
    pub fn entry_distance(&self, bbox: &BoundingBox) -> Option<Float> {
        let mut dmin: Float = -BOUND_HUGE;
        let mut dmax: Float = BOUND_HUGE;
        for axis in XYZEnum::iter() {
            let lower: Float = bbox.lower_left[axis];
            let size: Float = bbox.lengths[axis];
            let num: Float = self.slab_num[axis];
            if self.nonzero[axis as usize] {
                let den: Float = self.slab_den[axis];
                let t: Float = (lower - num) * den;
                let (tmin, tmax) = if self.positive[axis as usize] {
                    (t, t + size * den)
                } else {
                    (t + size * den, t)
                };
                if tmax < dmax {
                    if tmax < EPSILON {
                        return None;
                    }
                    dmax = tmax;
                }
                if tmin > dmin {
                    dmin = tmin;
                }
                if dmin > dmax {
                    return None;
                }
            } else if num < lower || num > lower + size {
                // parallel to the slab and outside of it
                return None;
            }
        }
        Some(dmin)
    }
}

/// Put *node* into the queue if the ray can hit anything inside it.
pub fn check_and_enqueue<'t, 'a>(
    queue: &mut BBoxPriorityQueue<&'t BBoxNode<'a>>,
    node: &'t BBoxNode<'a>,
    rayinfo: &RayInfo,
    stats: &mut RenderStatistics,
) {
    if node.is_infinite() {
        queue.insert(-MAX_DISTANCE, node);
        return;
    }
    stats.bbox_checked += 1;
    if let Some(dmin) = rayinfo.entry_distance(&node.bounds()) {
        stats.bbox_enqueued += 1;
        queue.insert(dmin, node);
    }
}

impl<'a> BBoxTree<'a> {
    /// Find the closest intersection of *ray* which is closer than
    /// `best.depth`. Returns `true` and updates *best* if there is one.
    pub fn intersect<'t>(
        &'t self,
        ray: &Ray,
        best: &mut Intersection<'a>,
        thread: &mut TraceThreadData<'t, 'a>,
    ) -> bool {
        let accept_all = |_: &Ray, _: &dyn Primitive, _: Float| true;
        self.intersect_with_conditions(ray, best, &accept_all, &accept_all, thread)
    }
    /// Like **intersect**, but objects rejected by *precondition* are
    /// never tested and hits rejected by *postcondition* don't count.
    pub fn intersect_with_conditions<'t, Pre, Post>(
        &'t self,
        ray: &Ray,
        best: &mut Intersection<'a>,
        precondition: &Pre,
        postcondition: &Post,
        thread: &mut TraceThreadData<'t, 'a>,
    ) -> bool
    where
        Pre: Fn(&Ray, &dyn Primitive, Float) -> bool + ?Sized,
        Post: Fn(&Ray, &dyn Primitive, Float) -> bool + ?Sized,
    {
        thread.stats.rays_traced += 1;
        thread.queue.clear();
        let root: &'t BBoxNode<'a> = match self.root() {
            Some(root) => root,
            None => return false,
        };
        let rayinfo: RayInfo = RayInfo::new(ray);
        let mut found: bool = false;
        check_and_enqueue(&mut thread.queue, root, &rayinfo, &mut thread.stats);
        while !thread.queue.is_empty() {
            let (depth, node) = thread.queue.remove_min();
            // everything left in the queue starts even further away
            if depth > best.depth {
                thread.stats.early_exits += 1;
                break;
            }
            match node {
                BBoxNode::Internal { children, .. } => {
                    for child in children.iter() {
                        check_and_enqueue(&mut thread.queue, child, &rayinfo, &mut thread.stats);
                    }
                }
                BBoxNode::Leaf { object, .. } => {
                    let object: &'a dyn Primitive = *object;
                    if !precondition(ray, object, 0.0) {
                        continue;
                    }
                    thread.stats.leaf_tests += 1;
                    if let Some(isect) = find_intersection_with_condition(
                        object,
                        ray,
                        &mut thread.depth_stack,
                        postcondition,
                    ) {
                        if isect.depth < best.depth {
                            *best = isect;
                            found = true;
                            thread.stats.leaf_hits += 1;
                        }
                    }
                }
            }
        }
        found
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::accelerators::bbox_tree::BUNCHING_FACTOR;
    use crate::core::primitive::{find_intersection, same_object};
    use crate::shapes::plane::Plane;
    use crate::shapes::sphere::Sphere;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts how often the traversal asks for its intersections.
    struct Counted<P: Primitive> {
        inner: P,
        tests: AtomicUsize,
    }

    impl<P: Primitive> Counted<P> {
        fn new(inner: P) -> Self {
            Counted {
                inner,
                tests: AtomicUsize::new(0),
            }
        }
        fn tests(&self) -> usize {
            self.tests.load(Ordering::SeqCst)
        }
    }

    impl<P: Primitive> Primitive for Counted<P> {
        fn bounding_box(&self) -> BoundingBox {
            self.inner.bounding_box()
        }
        fn is_infinite(&self) -> bool {
            self.inner.is_infinite()
        }
        fn all_intersections<'a>(&self, ray: &Ray, stack: &mut Vec<Intersection<'a>>) -> bool {
            self.tests.fetch_add(1, Ordering::SeqCst);
            self.inner.all_intersections(ray, stack)
        }
    }

    fn unit_sphere(x: Float, y: Float, z: Float) -> Counted<Sphere> {
        Counted::new(Sphere::new(Point3f::new(x, y, z), 1.0))
    }

    fn split<'a>(objects: &[&'a dyn Primitive]) -> (Vec<&'a dyn Primitive>, Vec<&'a dyn Primitive>) {
        objects.iter().partition(|o| !o.is_infinite())
    }

    fn brute_force<'a>(objects: &[&'a dyn Primitive], ray: &Ray) -> Intersection<'a> {
        let mut best: Intersection<'a> = Intersection::default();
        let mut stack: Vec<Intersection<'a>> = Vec::new();
        for object in objects {
            if let Some(isect) = find_intersection(*object, ray, &mut stack) {
                if isect.depth < best.depth {
                    best = isect;
                }
            }
        }
        best
    }

    fn random_ray(rng: &mut StdRng) -> Ray {
        let o = Point3f::new(
            rng.gen_range(-60.0..60.0),
            rng.gen_range(-60.0..60.0),
            rng.gen_range(-60.0..60.0),
        );
        let mut d = Vector3f::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        // now and then a ray parallel to some of the axes
        match rng.gen_range(0..6) {
            0 => d.x = 0.0,
            1 => {
                d.y = 0.0;
                d.z = 0.0;
            }
            _ => {}
        }
        if d.length_squared() == 0.0 {
            d.x = 1.0;
        }
        Ray::new(o, d)
    }

    #[test]
    fn rayinfo_flags_axes() {
        let info = RayInfo::new(&Ray::new(
            Point3f::new(1.0, 2.0, 3.0),
            Vector3f::new(0.5, 0.0, -2.0),
        ));
        assert_eq!(info.nonzero, [true, false, true]);
        assert_eq!(info.positive, [true, false, false]);
        assert_eq!(info.slab_den.x, 2.0);
        assert_eq!(info.slab_den.z, -0.5);
        assert_eq!(info.slab_num, Point3f::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn slab_test_entry_distance() {
        let bbox = BoundingBox::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Point3f::new(-5.0, 0.5, 0.5), Vector3f::new(1.0, 0.0, 0.0));
        assert_eq!(RayInfo::new(&ray).entry_distance(&bbox), Some(5.0));
        // coming from the other side
        let ray = Ray::new(Point3f::new(3.0, 0.5, 0.5), Vector3f::new(-2.0, 0.0, 0.0));
        assert_eq!(RayInfo::new(&ray).entry_distance(&bbox), Some(1.0));
        // box behind the ray
        let ray = Ray::new(Point3f::new(3.0, 0.5, 0.5), Vector3f::new(1.0, 0.0, 0.0));
        assert_eq!(RayInfo::new(&ray).entry_distance(&bbox), None);
        // diagonal miss
        let ray = Ray::new(Point3f::new(-1.0, 3.0, 0.5), Vector3f::new(1.0, 1.0, 0.0));
        assert_eq!(RayInfo::new(&ray).entry_distance(&bbox), None);
        // origin inside: the entry lies behind the origin
        let ray = Ray::new(Point3f::new(0.5, 0.5, 0.5), Vector3f::new(0.0, 0.0, 1.0));
        let entry: Float = RayInfo::new(&ray).entry_distance(&bbox).unwrap();
        assert_relative_eq!(entry, -0.5);
    }

    #[test]
    fn slab_test_with_zero_direction_axes() {
        let bbox = BoundingBox::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(1.0, 1.0, 1.0));
        let inside = Ray::new(Point3f::new(0.0, 0.5, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(RayInfo::new(&inside).entry_distance(&bbox), Some(5.0));
        let outside = Ray::new(Point3f::new(2.0, 0.5, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(RayInfo::new(&outside).entry_distance(&bbox), None);
        let below = Ray::new(Point3f::new(0.5, -0.001, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(RayInfo::new(&below).entry_distance(&bbox), None);
        // flat box, ray running within its plane
        let flat = BoundingBox::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(4.0, 4.0, 0.0));
        let grazing = Ray::new(Point3f::new(-1.0, 2.0, 0.0), Vector3f::new(1.0, 0.0, 0.0));
        assert_eq!(RayInfo::new(&grazing).entry_distance(&flat), Some(1.0));
    }

    #[test]
    fn three_spheres_in_a_row() {
        let spheres: Vec<Counted<Sphere>> = vec![
            unit_sphere(0.0, 0.0, 0.0),
            unit_sphere(10.0, 0.0, 0.0),
            unit_sphere(20.0, 0.0, 0.0),
        ];
        let objects: Vec<&dyn Primitive> = spheres.iter().map(|s| s as &dyn Primitive).collect();
        let tree = BBoxTree::build(&objects, &[], BUNCHING_FACTOR);
        let mut thread = TraceThreadData::new();
        let ray = Ray::new(Point3f::new(-5.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0));
        let mut best: Intersection = Intersection::default();
        assert!(tree.intersect(&ray, &mut best, &mut thread));
        assert_relative_eq!(best.depth, 4.0, epsilon = 1e-5);
        assert!(best.is_on(&spheres[0]));
        assert_relative_eq!(best.ipoint.x, -1.0, epsilon = 1e-5);
        assert_eq!(spheres[0].tests(), 1);
        assert_eq!(spheres[2].tests(), 0);
        assert_eq!(thread.stats.leaf_hits, 1);
        assert_eq!(thread.stats.early_exits, 1);
    }

    #[test]
    fn a_closer_best_prunes_everything() {
        let spheres: Vec<Counted<Sphere>> = (0..10)
            .map(|i| unit_sphere(10.0 * i as Float, 0.0, 0.0))
            .collect();
        let objects: Vec<&dyn Primitive> = spheres.iter().map(|s| s as &dyn Primitive).collect();
        let tree = BBoxTree::build(&objects, &[], BUNCHING_FACTOR);
        let mut thread = TraceThreadData::new();
        let ray = Ray::new(Point3f::new(-5.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0));
        let mut best: Intersection = Intersection::new(2.0, Point3f::default());
        assert!(!tree.intersect(&ray, &mut best, &mut thread));
        assert_eq!(best.depth, 2.0);
        assert!(spheres.iter().all(|s| s.tests() == 0));
    }

    #[test]
    fn total_miss_tests_no_object() {
        let mut rng = StdRng::seed_from_u64(3);
        let spheres: Vec<Counted<Sphere>> = (0..50)
            .map(|_| {
                unit_sphere(
                    rng.gen_range(-20.0..20.0),
                    rng.gen_range(-20.0..20.0),
                    rng.gen_range(-20.0..20.0),
                )
            })
            .collect();
        let objects: Vec<&dyn Primitive> = spheres.iter().map(|s| s as &dyn Primitive).collect();
        let tree = BBoxTree::build(&objects, &[], BUNCHING_FACTOR);
        let mut thread = TraceThreadData::new();
        let rays = [
            // far above everything
            Ray::new(Point3f::new(-100.0, 50.0, 0.0), Vector3f::new(1.0, 0.0, 0.0)),
            // pointing away from the scene
            Ray::new(Point3f::new(40.0, 0.0, 0.0), Vector3f::new(1.0, 0.2, 0.0)),
            // parallel to an axis, outside the slab
            Ray::new(Point3f::new(0.0, 0.0, 30.0), Vector3f::new(0.0, 1.0, 0.0)),
        ];
        for ray in &rays {
            let mut best: Intersection = Intersection::default();
            assert!(!tree.intersect(ray, &mut best, &mut thread));
            assert!(!best.is_hit());
        }
        assert_eq!(thread.stats.leaf_tests, 0);
        assert!(spheres.iter().all(|s| s.tests() == 0));
    }

    #[test]
    fn one_box_hit_means_one_object_test() {
        let spheres: Vec<Counted<Sphere>> = (0..16)
            .map(|i| unit_sphere(10.0 * (i % 4) as Float, 10.0 * (i / 4) as Float, 0.0))
            .collect();
        let objects: Vec<&dyn Primitive> = spheres.iter().map(|s| s as &dyn Primitive).collect();
        let tree = BBoxTree::build(&objects, &[], BUNCHING_FACTOR);
        let mut thread = TraceThreadData::new();
        // only the box of the sphere at (20, 10, 0) lies on this ray
        let ray = Ray::new(Point3f::new(20.0, 10.0, -10.0), Vector3f::new(0.0, 0.0, 1.0));
        let mut best: Intersection = Intersection::default();
        assert!(tree.intersect(&ray, &mut best, &mut thread));
        assert_relative_eq!(best.depth, 9.0, epsilon = 1e-5);
        assert!(best.is_on(&spheres[6]));
        assert_eq!(thread.stats.leaf_tests, 1);
        let tested: usize = spheres.iter().map(|s| s.tests()).sum();
        assert_eq!(tested, 1);
    }

    #[test]
    fn infinite_objects_are_tested_exactly_once() {
        let mut rng = StdRng::seed_from_u64(11);
        let spheres: Vec<Counted<Sphere>> = (0..30)
            .map(|i| unit_sphere(3.0 * i as Float, 0.0, 0.0))
            .collect();
        let planes: Vec<Counted<Plane>> = vec![
            Counted::new(Plane::new(Vector3f::new(0.0, 1.0, 0.0), -50.0)),
            Counted::new(Plane::new(Vector3f::new(0.0, 0.0, 1.0), 1.0e5)),
        ];
        let mut objects: Vec<&dyn Primitive> =
            spheres.iter().map(|s| s as &dyn Primitive).collect();
        objects.extend(planes.iter().map(|p| p as &dyn Primitive));
        let (finite, infinite) = split(&objects);
        let tree = BBoxTree::build(&finite, &infinite, BUNCHING_FACTOR);
        let mut thread = TraceThreadData::new();
        for n in 1..=100_usize {
            let ray: Ray = random_ray(&mut rng);
            let mut best: Intersection = Intersection::default();
            tree.intersect(&ray, &mut best, &mut thread);
            for plane in &planes {
                assert_eq!(plane.tests(), n);
            }
        }
        // also when there is nothing else
        let only_planes: Vec<&dyn Primitive> = planes.iter().map(|p| p as &dyn Primitive).collect();
        let tree = BBoxTree::build(&[], &only_planes, BUNCHING_FACTOR);
        let mut thread = TraceThreadData::new();
        let ray = Ray::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, -1.0, 0.0));
        let mut best: Intersection = Intersection::default();
        assert!(tree.intersect(&ray, &mut best, &mut thread));
        assert_relative_eq!(best.depth, 50.0);
        assert!(best.is_on(&planes[0]));
        assert!(planes.iter().all(|p| p.tests() == 101));
    }

    #[test]
    fn empty_tree_always_misses() {
        let tree = BBoxTree::build(&[], &[], BUNCHING_FACTOR);
        let mut thread = TraceThreadData::new();
        let ray = Ray::new(Point3f::default(), Vector3f::new(1.0, 0.0, 0.0));
        let mut best: Intersection = Intersection::default();
        assert!(!tree.intersect(&ray, &mut best, &mut thread));
        assert_eq!(best.depth, BOUND_HUGE);
        assert_eq!(thread.stats.bbox_checked, 0);
    }

    #[test]
    fn matches_brute_force_on_random_scenes() {
        let mut rng = StdRng::seed_from_u64(1234);
        for _scene in 0..8 {
            let n: usize = rng.gen_range(1..300);
            let spheres: Vec<Sphere> = (0..n)
                .map(|_| {
                    Sphere::new(
                        Point3f::new(
                            rng.gen_range(-40.0..40.0),
                            rng.gen_range(-40.0..40.0),
                            rng.gen_range(-40.0..40.0),
                        ),
                        rng.gen_range(0.1..4.0),
                    )
                })
                .collect();
            let ground = Plane::new(Vector3f::new(0.0, 1.0, 0.0), -45.0);
            let mut objects: Vec<&dyn Primitive> =
                spheres.iter().map(|s| s as &dyn Primitive).collect();
            objects.push(&ground);
            let (finite, infinite) = split(&objects);
            let tree = BBoxTree::build(&finite, &infinite, BUNCHING_FACTOR);
            let mut thread = TraceThreadData::new();
            for _ in 0..500 {
                let ray: Ray = random_ray(&mut rng);
                let expected: Intersection = brute_force(&objects, &ray);
                let mut best: Intersection = Intersection::default();
                let found: bool = tree.intersect(&ray, &mut best, &mut thread);
                assert_eq!(found, expected.is_hit());
                if found {
                    assert_relative_eq!(best.depth, expected.depth, max_relative = 1e-5);
                    let object: &dyn Primitive = expected.object.unwrap();
                    assert!(best.is_on(object));
                }
            }
        }
    }

    #[test]
    fn rebuilding_gives_identical_results() {
        let mut rng = StdRng::seed_from_u64(99);
        let spheres: Vec<Sphere> = (0..200)
            .map(|i| {
                // plenty of coincident centers to provoke ties
                let c: Float = (i % 20) as Float * 2.0;
                Sphere::new(Point3f::new(c, c * 0.5, 0.0), 1.0 + (i % 3) as Float)
            })
            .collect();
        let objects: Vec<&dyn Primitive> = spheres.iter().map(|s| s as &dyn Primitive).collect();
        let first = BBoxTree::build(&objects, &[], BUNCHING_FACTOR);
        let second = BBoxTree::build(&objects, &[], BUNCHING_FACTOR);
        let mut thread = TraceThreadData::new();
        for _ in 0..1000 {
            let ray: Ray = random_ray(&mut rng);
            let mut a: Intersection = Intersection::default();
            let mut b: Intersection = Intersection::default();
            let found_a: bool = first.intersect(&ray, &mut a, &mut thread);
            let found_b: bool = second.intersect(&ray, &mut b, &mut thread);
            assert_eq!(found_a, found_b);
            assert_eq!(a.depth, b.depth);
            assert_eq!(a.ipoint, b.ipoint);
        }
    }

    #[test]
    fn conditions_exclude_objects_and_hits() {
        let spheres: Vec<Counted<Sphere>> = vec![
            unit_sphere(0.0, 0.0, 0.0),
            unit_sphere(10.0, 0.0, 0.0),
            unit_sphere(20.0, 0.0, 0.0),
        ];
        let objects: Vec<&dyn Primitive> = spheres.iter().map(|s| s as &dyn Primitive).collect();
        let tree = BBoxTree::build(&objects, &[], BUNCHING_FACTOR);
        let mut thread = TraceThreadData::new();
        let ray = Ray::new(Point3f::new(-5.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0));
        // skip the first sphere entirely
        let first: &dyn Primitive = &spheres[0];
        let not_first = |_: &Ray, o: &dyn Primitive, _: Float| !same_object(o, first);
        let any = |_: &Ray, _: &dyn Primitive, _: Float| true;
        let mut best: Intersection = Intersection::default();
        assert!(tree.intersect_with_conditions(&ray, &mut best, &not_first, &any, &mut thread));
        assert_relative_eq!(best.depth, 14.0, epsilon = 1e-5);
        assert!(best.is_on(&spheres[1]));
        assert_eq!(spheres[0].tests(), 0);
        // only exit points count
        let far_side = |_: &Ray, _: &dyn Primitive, d: Float| d > 5.0;
        let mut best: Intersection = Intersection::default();
        assert!(tree.intersect_with_conditions(&ray, &mut best, &any, &far_side, &mut thread));
        assert_relative_eq!(best.depth, 6.0, epsilon = 1e-5);
        assert!(best.is_on(&spheres[0]));
    }
}
