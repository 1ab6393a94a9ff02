//! Rays are traced by a pool of worker threads which share the
//! bounding slab hierarchy read-only. Everything a worker modifies
//! while tracing lives in its own **TraceThreadData**: the priority
//! queue of the traversal, the stack objects report intersections on
//! and the statistics counters. Nothing is locked while tracing.

// others
use log::debug;
// slabs
use crate::accelerators::bbox_tree::BBoxNode;
use crate::accelerators::priority_queue::BBoxPriorityQueue;
use crate::core::geometry::Ray;
use crate::core::interaction::Intersection;
use crate::core::scene::BoundingSlabs;
use crate::core::stats::RenderStatistics;

/// Per-thread scratch space, reused for every ray the thread traces.
/// `'t` is the borrow of the tree, `'a` the lifetime of the objects.
#[derive(Default)]
pub struct TraceThreadData<'t, 'a> {
    pub queue: BBoxPriorityQueue<&'t BBoxNode<'a>>,
    pub depth_stack: Vec<Intersection<'a>>,
    pub stats: RenderStatistics,
}

impl<'t, 'a> TraceThreadData<'t, 'a> {
    pub fn new() -> Self {
        TraceThreadData {
            queue: BBoxPriorityQueue::new(),
            depth_stack: Vec::new(),
            stats: RenderStatistics::default(),
        }
    }
}

/// Find the closest intersection for every ray in *rays*, using
/// *n_threads* workers (all cores if zero). Results come back in the
/// order of the rays, together with the merged statistics of all
/// workers.
pub fn trace_rays<'a>(
    slabs: &BoundingSlabs<'a>,
    rays: &[Ray],
    n_threads: usize,
) -> (Vec<Intersection<'a>>, RenderStatistics) {
    let num_cores: usize = if n_threads == 0 {
        num_cpus::get()
    } else {
        n_threads
    };
    let mut hits: Vec<Intersection<'a>> = vec![Intersection::default(); rays.len()];
    let mut stats: RenderStatistics = RenderStatistics::default();
    if rays.is_empty() {
        return (hits, stats);
    }
    debug!("Tracing {} rays with {:?} thread(s) ...", rays.len(), num_cores);
    let chunk_size: usize = (rays.len() + num_cores - 1) / num_cores;
    {
        let ray_bands: Vec<&[Ray]> = rays.chunks(chunk_size).collect();
        let hit_bands: Vec<&mut [Intersection<'a>]> = hits.chunks_mut(chunk_size).collect();
        let n_bands: usize = ray_bands.len();
        crossbeam::scope(|scope| {
            let (band_tx, band_rx) = crossbeam_channel::bounded(n_bands);
            // spawn worker threads
            for (b, (ray_band, hit_band)) in ray_bands.into_iter().zip(hit_bands).enumerate() {
                let band_tx = band_tx.clone();
                scope.spawn(move |_| {
                    let mut thread: TraceThreadData = TraceThreadData::new();
                    for (ray, hit) in ray_band.iter().zip(hit_band.iter_mut()) {
                        let mut best: Intersection = Intersection::default();
                        slabs.intersect(ray, &mut best, &mut thread);
                        *hit = best;
                    }
                    // send statistics through the channel to main thread
                    band_tx
                        .send((b, thread.stats))
                        .unwrap_or_else(|_| panic!("Failed to send statistics of band {}", b));
                });
            }
            drop(band_tx);
            for (_b, band_stats) in band_rx.iter() {
                stats += band_stats;
            }
        })
        .unwrap_or_else(|e| std::panic::resume_unwind(e));
    }
    (hits, stats)
}
