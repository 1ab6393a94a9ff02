//! Every render thread counts what the bounding slab hierarchy does
//! for it in its own **RenderStatistics**. Nothing is shared while
//! rays are traced; the per-thread counters are added up once all
//! workers have joined.

// std
use std::ops;
// others
use log::info;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RenderStatistics {
    pub rays_traced: u64,
    /// slab tests against finite boxes
    pub bbox_checked: u64,
    /// slab tests which let the node into the queue
    pub bbox_enqueued: u64,
    /// calls into an object's own intersection routine
    pub leaf_tests: u64,
    /// leaf tests which improved the best intersection
    pub leaf_hits: u64,
    /// traversals stopped because the queue head was behind the best hit
    pub early_exits: u64,
}

impl RenderStatistics {
    pub fn new() -> Self {
        RenderStatistics::default()
    }
    pub fn clear(&mut self) {
        *self = RenderStatistics::default();
    }
    /// Fraction of slab tests that were passed.
    pub fn bbox_hit_ratio(&self) -> f64 {
        if self.bbox_checked == 0 {
            0.0
        } else {
            self.bbox_enqueued as f64 / self.bbox_checked as f64
        }
    }
    /// Average number of object tests per traced ray.
    pub fn leaf_tests_per_ray(&self) -> f64 {
        if self.rays_traced == 0 {
            0.0
        } else {
            self.leaf_tests as f64 / self.rays_traced as f64
        }
    }
    pub fn report(&self) {
        info!("Bounding slab statistics:");
        info!("  rays traced          {:>12}", self.rays_traced);
        info!(
            "  bounding box tests   {:>12} ({:>12} enqueued, {:.1}%)",
            self.bbox_checked,
            self.bbox_enqueued,
            100.0 * self.bbox_hit_ratio()
        );
        info!(
            "  object tests         {:>12} ({:.2} per ray)",
            self.leaf_tests,
            self.leaf_tests_per_ray()
        );
        info!("  object hits          {:>12}", self.leaf_hits);
        info!("  early exits          {:>12}", self.early_exits);
    }
}

impl_op_ex!(+|a: &RenderStatistics, b: &RenderStatistics| -> RenderStatistics {
    RenderStatistics {
        rays_traced: a.rays_traced + b.rays_traced,
        bbox_checked: a.bbox_checked + b.bbox_checked,
        bbox_enqueued: a.bbox_enqueued + b.bbox_enqueued,
        leaf_tests: a.leaf_tests + b.leaf_tests,
        leaf_hits: a.leaf_hits + b.leaf_hits,
        early_exits: a.early_exits + b.early_exits,
    }
});

impl_op_ex!(+=|a: &mut RenderStatistics, b: &RenderStatistics| {
    a.rays_traced += b.rays_traced;
    a.bbox_checked += b.bbox_checked;
    a.bbox_enqueued += b.bbox_enqueued;
    a.leaf_tests += b.leaf_tests;
    a.leaf_hits += b.leaf_hits;
    a.early_exits += b.early_exits;
});

impl std::iter::Sum for RenderStatistics {
    fn sum<I: Iterator<Item = RenderStatistics>>(iter: I) -> Self {
        iter.fold(RenderStatistics::default(), |acc, s| acc + s)
    }
}
