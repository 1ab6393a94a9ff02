//! Build a bounding slab hierarchy for a random cloud of spheres and
//! shoot random rays through it.
//!
//! ```shell
//! RUST_LOG=debug cargo run --release -- --spheres 10000 --rays 100000 --plane --verify
//! ```

// std
use std::time::Instant;
// others
use anyhow::{bail, Result};
use clap::Parser;
use env_logger::Env;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
// slabs
use rs_slabs::core::geometry::{Point3f, Ray, Vector3f};
use rs_slabs::core::interaction::Intersection;
use rs_slabs::core::paramset::ParamSet;
use rs_slabs::core::parallel::trace_rays;
use rs_slabs::core::primitive::{find_intersection, Primitive};
use rs_slabs::core::scene::{BoundingOptions, BoundingSlabs, Scene};
use rs_slabs::core::slabs::Float;
use rs_slabs::core::stats::RenderStatistics;
use rs_slabs::shapes::plane::Plane;
use rs_slabs::shapes::sphere::Sphere;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const BATCHES: usize = 32;

/// Trace random rays through a bounding slab hierarchy.
#[derive(Parser)]
#[command(name = "rs_slabs", version)]
struct Cli {
    /// number of random spheres
    #[arg(long, default_value_t = 1000)]
    spheres: usize,
    /// number of random rays
    #[arg(long, default_value_t = 100_000)]
    rays: usize,
    /// use specified number of threads for tracing (0 = all cores)
    #[arg(short = 't', long = "nthreads", default_value_t = 0)]
    nthreads: u8,
    /// seed of the random scene and rays
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// maximum number of children per bounding box
    #[arg(long, default_value_t = 4)]
    bunching: i32,
    /// minimum number of objects before a hierarchy is built
    #[arg(long, default_value_t = 3)]
    threshold: i32,
    /// add an infinite ground plane
    #[arg(long)]
    plane: bool,
    /// compare every result with testing all objects
    #[arg(long)]
    verify: bool,
}

fn random_scene(args: &Cli, options: BoundingOptions, rng: &mut StdRng) -> Scene {
    let mut scene = Scene::new(options);
    let extent: Float = (args.spheres as Float).cbrt() * 4.0 + 10.0;
    for _ in 0..args.spheres {
        let center = Point3f::new(
            rng.gen_range(-extent..extent),
            rng.gen_range(0.0..2.0 * extent),
            rng.gen_range(-extent..extent),
        );
        scene.add_object(Box::new(Sphere::new(center, rng.gen_range(0.1..1.5))));
    }
    if args.plane {
        scene.add_object(Box::new(Plane::new(Vector3f::new(0.0, 1.0, 0.0), -1.0)));
    }
    scene
}

fn random_rays(n: usize, extent: Float, rng: &mut StdRng) -> Vec<Ray> {
    let eye = Point3f::new(0.0, extent, -3.0 * extent);
    (0..n)
        .map(|_| {
            let target = Point3f::new(
                rng.gen_range(-extent..extent),
                rng.gen_range(-0.5 * extent..2.5 * extent),
                rng.gen_range(-extent..extent),
            );
            Ray::new(eye, target - eye)
        })
        .collect()
}

/// Closest hit found by testing every object.
fn closest_of_all<'a>(objects: &[&'a dyn Primitive], ray: &Ray) -> Intersection<'a> {
    let mut stack: Vec<Intersection<'a>> = Vec::new();
    let mut best: Intersection<'a> = Intersection::default();
    for object in objects {
        if let Some(isect) = find_intersection(*object, ray, &mut stack) {
            if isect.depth < best.depth {
                best = isect;
            }
        }
    }
    best
}

fn verify(slabs: &BoundingSlabs, rays: &[Ray], hits: &[Intersection]) -> Result<()> {
    for (i, (ray, hit)) in rays.iter().zip(hits.iter()).enumerate() {
        let expected: Intersection = closest_of_all(slabs.objects(), ray);
        if expected.is_hit() != hit.is_hit() {
            bail!(
                "ray {}: hierarchy reports hit = {}, testing all objects reports hit = {}",
                i,
                hit.is_hit(),
                expected.is_hit()
            );
        }
        if expected.is_hit() && (expected.depth - hit.depth).abs() > 1e-4 * expected.depth.max(1.0)
        {
            bail!(
                "ray {}: hierarchy depth {} differs from closest depth {}",
                i,
                hit.depth,
                expected.depth
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    // handle command line options
    let args = Cli::parse();
    let num_cores = num_cpus::get();
    println!(
        "rs_slabs version {} [Detected {} cores]",
        VERSION, num_cores
    );
    let mut ps = ParamSet::default();
    ps.add_int(String::from("bunchingfactor"), args.bunching);
    ps.add_int(String::from("boundingthreshold"), args.threshold);
    let options: BoundingOptions = BoundingOptions::from_params(&ps)?;
    let mut rng = StdRng::seed_from_u64(args.seed);
    let scene: Scene = random_scene(&args, options, &mut rng);
    // build
    let start = Instant::now();
    let slabs = scene.build_bounding_slabs();
    info!(
        "Bounding slabs for {} finite and {} infinite object(s) built in {:?}",
        slabs.n_finite,
        slabs.n_infinite,
        start.elapsed()
    );
    if let Some(tree) = slabs.tree() {
        let build = tree.build_statistics();
        info!(
            "  {} bucket(s) in {} pass(es), {} leaves, depth {}",
            tree.bucket_count(),
            build.passes,
            tree.leaf_count(),
            tree.depth()
        );
    }
    // trace
    let extent: Float = (args.spheres as Float).cbrt() * 4.0 + 10.0;
    let rays: Vec<Ray> = random_rays(args.rays, extent, &mut rng);
    let batch_size: usize = std::cmp::max(1, (rays.len() + BATCHES - 1) / BATCHES);
    let mut hits: Vec<Intersection> = Vec::with_capacity(rays.len());
    let mut stats = RenderStatistics::new();
    let start = Instant::now();
    let mut pb = pbr::ProgressBar::new(rays.chunks(batch_size).count() as u64);
    for batch in rays.chunks(batch_size) {
        let (batch_hits, batch_stats) = trace_rays(&slabs, batch, args.nthreads as usize);
        hits.extend(batch_hits);
        stats += batch_stats;
        pb.inc();
    }
    pb.finish_println("");
    let n_hits: usize = hits.iter().filter(|hit| hit.is_hit()).count();
    info!(
        "{} of {} rays hit something, traced in {:?}",
        n_hits,
        rays.len(),
        start.elapsed()
    );
    stats.report();
    if args.verify {
        verify(&slabs, &rays, &hits)?;
        info!("All {} results match testing every object", rays.len());
    }
    Ok(())
}
