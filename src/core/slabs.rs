//! Type definitions of Float, the scene-wide distance constants and
//! small numeric helpers which can be used almost everywhere else in
//! the code.

// std
use std::f32::consts::PI;

pub type Float = f32;

/// Distance used for "no intersection found yet". Bounding boxes are
/// clamped to half of it on every axis.
pub const BOUND_HUGE: Float = 2.0e10;
/// Infinite nodes are enqueued with `-MAX_DISTANCE` so they are
/// always dequeued first.
pub const MAX_DISTANCE: Float = 1.0e7;
/// Boxes whose exit distance is below this are behind the ray.
pub const EPSILON: Float = 1.0e-10;
/// Object intersections closer to the ray origin are ignored.
pub const MIN_ISECT_DEPTH: Float = 1.0e-4;

/// Clamp the given value *val* to lie between the values *low* and *high*.
pub fn clamp_t<T>(val: T, low: T, high: T) -> T
where
    T: PartialOrd,
{
    if val < low {
        low
    } else if val > high {
        high
    } else {
        val
    }
}

/// Convert from angles expressed in degrees to radians.
pub fn radians(deg: Float) -> Float {
    (PI / 180.0) * deg
}

/// Solve `a*t^2 + b*t + c = 0`, returning the roots in ascending order.
pub fn quadratic(a: Float, b: Float, c: Float) -> Option<(Float, Float)> {
    // use double precision for the discriminant
    let discrim: f64 = b as f64 * b as f64 - 4.0 * a as f64 * c as f64;
    if discrim < 0.0 {
        return None;
    }
    let root_discrim: f64 = discrim.sqrt();
    let q: f64 = if b < 0.0 {
        -0.5 * (b as f64 - root_discrim)
    } else {
        -0.5 * (b as f64 + root_discrim)
    };
    let mut t0: Float = (q / a as f64) as Float;
    let mut t1: Float = (c as f64 / q) as Float;
    if t0 > t1 {
        std::mem::swap(&mut t0, &mut t1);
    }
    Some((t0, t1))
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quadratic_roots_are_ordered() {
        // (t - 2) * (t - 3)
        let (t0, t1) = quadratic(1.0, -5.0, 6.0).unwrap();
        assert_relative_eq!(t0, 2.0, epsilon = 1e-5);
        assert_relative_eq!(t1, 3.0, epsilon = 1e-5);
        assert!(quadratic(1.0, 0.0, 1.0).is_none());
    }

    #[test]
    fn clamp_to_range() {
        assert_eq!(clamp_t(5.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp_t(-5, 0, 1), 0);
        assert_eq!(clamp_t(0.5, 0.0, 1.0), 0.5);
    }
}
