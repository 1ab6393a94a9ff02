//! # Scene
//!
//! The **Scene** owns every object that can be hit by a ray, together
//! with the **BoundingOptions** which decide whether (and how) a
//! bounding slab hierarchy is built for them.
//!
//! **Scene::build_bounding_slabs** sorts the objects into finite and
//! infinite ones and returns **BoundingSlabs**, the read-only query
//! structure all render threads share. Small scenes, or scenes with
//! bounding switched off, are answered by testing every object.
//!
//! ```rust
//! use rs_slabs::core::geometry::{Point3f, Ray, Vector3f};
//! use rs_slabs::core::interaction::Intersection;
//! use rs_slabs::core::parallel::TraceThreadData;
//! use rs_slabs::core::scene::{BoundingOptions, Scene};
//! use rs_slabs::shapes::sphere::Sphere;
//!
//!     let mut scene = Scene::new(BoundingOptions::default());
//!     for i in 0..3 {
//!         scene.add_object(Box::new(Sphere::new(Point3f::new(10.0 * i as f32, 0.0, 0.0), 1.0)));
//!     }
//!     let slabs = scene.build_bounding_slabs();
//!     let mut thread = TraceThreadData::new();
//!     let ray = Ray::new(Point3f::new(-5.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0));
//!     let mut best = Intersection::default();
//!     assert!(slabs.intersect(&ray, &mut best, &mut thread));
//!     assert!((best.depth - 4.0).abs() < 1e-5);
//! ```

// others
use log::{debug, warn};
// slabs
use crate::accelerators::bbox_tree::{BBoxTree, BUNCHING_FACTOR};
use crate::core::bbox::BoundingBox;
use crate::core::error::{Result, SlabsError};
use crate::core::geometry::Ray;
use crate::core::interaction::Intersection;
use crate::core::parallel::TraceThreadData;
use crate::core::paramset::ParamSet;
use crate::core::primitive::{find_intersection_with_condition, Primitive};
use crate::core::slabs::Float;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingOptions {
    pub bounding: bool,
    /// scenes with fewer objects are not bounded
    pub bounding_threshold: usize,
    pub bunching_factor: usize,
}

impl Default for BoundingOptions {
    fn default() -> Self {
        BoundingOptions {
            bounding: true,
            bounding_threshold: 3,
            bunching_factor: BUNCHING_FACTOR,
        }
    }
}

impl BoundingOptions {
    /// Read `"bounding"`, `"boundingthreshold"` and `"bunchingfactor"`,
    /// falling back to the defaults for missing ones.
    pub fn from_params(ps: &ParamSet) -> Result<BoundingOptions> {
        let defaults = BoundingOptions::default();
        check_type(ps, "bounding", "bool")?;
        check_type(ps, "boundingthreshold", "integer")?;
        check_type(ps, "bunchingfactor", "integer")?;
        let bounding: bool = ps.find_one_bool("bounding", defaults.bounding);
        let threshold: i32 =
            ps.find_one_int("boundingthreshold", defaults.bounding_threshold as i32);
        if threshold < 0 {
            return Err(SlabsError::NegativeThreshold(threshold));
        }
        let bunching_factor: i32 =
            ps.find_one_int("bunchingfactor", defaults.bunching_factor as i32);
        if bunching_factor < 2 {
            return Err(SlabsError::InvalidBunchingFactor(bunching_factor));
        }
        Ok(BoundingOptions {
            bounding,
            bounding_threshold: threshold as usize,
            bunching_factor: bunching_factor as usize,
        })
    }
}

fn check_type(ps: &ParamSet, name: &str, expected: &'static str) -> Result<()> {
    match ps.type_of(name) {
        Some(found) if found != expected => Err(SlabsError::WrongParameterType {
            name: name.to_string(),
            expected,
        }),
        _ => Ok(()),
    }
}

#[derive(Default)]
pub struct Scene {
    pub objects: Vec<Box<dyn Primitive>>,
    pub options: BoundingOptions,
}

impl Scene {
    pub fn new(options: BoundingOptions) -> Self {
        Scene {
            objects: Vec::new(),
            options,
        }
    }
    pub fn add_object(&mut self, object: Box<dyn Primitive>) {
        self.objects.push(object);
    }
    pub fn len(&self) -> usize {
        self.objects.len()
    }
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
    pub fn build_bounding_slabs(&self) -> BoundingSlabs<'_> {
        let objects: Vec<&dyn Primitive> = self.objects.iter().map(|o| o.as_ref()).collect();
        let (finite, infinite): (Vec<&dyn Primitive>, Vec<&dyn Primitive>) =
            objects.iter().partition(|o| !o.is_infinite());
        let tree: Option<BBoxTree> = if !self.options.bounding {
            if objects.len() >= self.options.bounding_threshold {
                warn!(
                    "Bounding is switched off, every ray is tested against all {} objects",
                    objects.len()
                );
            }
            None
        } else if objects.len() < self.options.bounding_threshold {
            debug!(
                "{} object(s) below bounding threshold {}, no bounding slabs",
                objects.len(),
                self.options.bounding_threshold
            );
            None
        } else {
            Some(BBoxTree::build(
                &finite,
                &infinite,
                self.options.bunching_factor,
            ))
        };
        BoundingSlabs {
            tree,
            n_finite: finite.len(),
            n_infinite: infinite.len(),
            objects,
        }
    }
}

/// The query side of a scene: the bounding slab hierarchy, or the
/// plain object list if no hierarchy was built.
pub struct BoundingSlabs<'a> {
    tree: Option<BBoxTree<'a>>,
    objects: Vec<&'a dyn Primitive>,
    pub n_finite: usize,
    pub n_infinite: usize,
}

impl<'a> BoundingSlabs<'a> {
    pub fn tree(&self) -> Option<&BBoxTree<'a>> {
        self.tree.as_ref()
    }
    pub fn objects(&self) -> &[&'a dyn Primitive] {
        &self.objects
    }
    pub fn world_bound(&self) -> BoundingBox {
        match &self.tree {
            Some(tree) => tree.world_bound(),
            None => {
                let boxes: Vec<BoundingBox> =
                    self.objects.iter().map(|o| o.bounding_box()).collect();
                BoundingBox::union_of(&boxes)
            }
        }
    }
    pub fn intersect<'t>(
        &'t self,
        ray: &Ray,
        best: &mut Intersection<'a>,
        thread: &mut TraceThreadData<'t, 'a>,
    ) -> bool {
        let accept_all = |_: &Ray, _: &dyn Primitive, _: Float| true;
        self.intersect_with_conditions(ray, best, &accept_all, &accept_all, thread)
    }
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
        match &self.tree {
            Some(tree) => {
                tree.intersect_with_conditions(ray, best, precondition, postcondition, thread)
            }
            None => self.intersect_all(ray, best, precondition, postcondition, thread),
        }
    }
    /// Is anything casting a shadow closer than *max_depth*? Returns
    /// the blocking intersection found.
    pub fn intersect_shadow<'t>(
        &'t self,
        ray: &Ray,
        max_depth: Float,
        thread: &mut TraceThreadData<'t, 'a>,
    ) -> Option<Intersection<'a>> {
        let mut best: Intersection<'a> = Intersection {
            depth: max_depth,
            ..Default::default()
        };
        let casts_shadow = |_: &Ray, object: &dyn Primitive, _: Float| object.casts_shadow();
        let accept_all = |_: &Ray, _: &dyn Primitive, _: Float| true;
        if self.intersect_with_conditions(ray, &mut best, &casts_shadow, &accept_all, thread) {
            Some(best)
        } else {
            None
        }
    }
    /// Test every object; used when no tree was built.
    fn intersect_all<Pre, Post>(
        &self,
        ray: &Ray,
        best: &mut Intersection<'a>,
        precondition: &Pre,
        postcondition: &Post,
        thread: &mut TraceThreadData<'_, 'a>,
    ) -> bool
    where
        Pre: Fn(&Ray, &dyn Primitive, Float) -> bool + ?Sized,
        Post: Fn(&Ray, &dyn Primitive, Float) -> bool + ?Sized,
    {
        thread.stats.rays_traced += 1;
        let mut found: bool = false;
        for object in &self.objects {
            let object: &'a dyn Primitive = *object;
            if !precondition(ray, object, 0.0) {
                continue;
            }
            thread.stats.leaf_tests += 1;
            if let Some(isect) =
                find_intersection_with_condition(object, ray, &mut thread.depth_stack, postcondition)
            {
                if isect.depth < best.depth {
                    *best = isect;
                    found = true;
                    thread.stats.leaf_hits += 1;
                }
            }
        }
        found
    }
}
