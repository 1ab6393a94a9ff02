//! Axis-aligned bounding boxes in *lower left corner plus lengths*
//! form.
//!
//! Every object handed to the bounding slab hierarchy reports one of
//! these. Lengths are never negative for a valid box, but they may be
//! zero (point-like or flat objects), which gives a box of zero volume
//! and possibly zero surface area. Both are legitimate values for the
//! split heuristic.
//!
//! ```rust
//! use rs_slabs::core::bbox::BoundingBox;
//! use rs_slabs::core::geometry::{Point3f, Vector3f};
//!
//!     let unit = BoundingBox::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(1.0, 1.0, 1.0));
//!     let moved = BoundingBox::new(Point3f::new(2.0, 0.0, 0.0), Vector3f::new(1.0, 1.0, 1.0));
//!     let both = unit.union(&moved);
//!     assert_eq!(both.lengths.x, 3.0);
//!     assert_eq!(both.surface_area(), 14.0);
//! ```

// others
use strum::IntoEnumIterator;
// slabs
use crate::core::geometry::{Point3f, Vector3f, XYZEnum};
use crate::core::slabs::{clamp_t, Float, BOUND_HUGE};
use crate::core::transform::Transform;

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct BoundingBox {
    pub lower_left: Point3f,
    pub lengths: Vector3f,
}

impl BoundingBox {
    pub fn new(lower_left: Point3f, lengths: Vector3f) -> Self {
        BoundingBox {
            lower_left,
            lengths,
        }
    }
    pub fn from_min_max(mins: &Point3f, maxs: &Point3f) -> Self {
        BoundingBox {
            lower_left: *mins,
            lengths: maxs - mins,
        }
    }
    /// The box every infinite object reports.
    pub fn infinite() -> Self {
        let half: Float = BOUND_HUGE / 2.0;
        BoundingBox {
            lower_left: Point3f::new(-half, -half, -half),
            lengths: Vector3f::new(BOUND_HUGE, BOUND_HUGE, BOUND_HUGE),
        }
    }
    /// Start value for accumulating unions: negative lengths, so it
    /// counts as empty until something is merged into it.
    pub fn empty() -> Self {
        BoundingBox::from_min_max(
            &Point3f::new(BOUND_HUGE, BOUND_HUGE, BOUND_HUGE),
            &Point3f::new(-BOUND_HUGE, -BOUND_HUGE, -BOUND_HUGE),
        )
    }
    pub fn is_empty(&self) -> bool {
        self.lengths.x < 0.0 || self.lengths.y < 0.0 || self.lengths.z < 0.0
    }
    pub fn upper_right(&self) -> Point3f {
        self.lower_left + self.lengths
    }
    pub fn min_max(&self) -> (Point3f, Point3f) {
        (self.lower_left, self.upper_right())
    }
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let (amin, amax) = self.min_max();
        let (bmin, bmax) = other.min_max();
        let mut mins: Point3f = amin;
        let mut maxs: Point3f = amax;
        for axis in XYZEnum::iter() {
            if bmin[axis] < mins[axis] {
                mins[axis] = bmin[axis];
            }
            if bmax[axis] > maxs[axis] {
                maxs[axis] = bmax[axis];
            }
        }
        BoundingBox::from_min_max(&mins, &maxs)
    }
    /// Union of any number of boxes; an empty iterator gives an empty
    /// box.
    pub fn union_of<'b, I>(boxes: I) -> BoundingBox
    where
        I: IntoIterator<Item = &'b BoundingBox>,
    {
        let mut mins: Point3f = Point3f::new(BOUND_HUGE, BOUND_HUGE, BOUND_HUGE);
        let mut maxs: Point3f = Point3f::new(-BOUND_HUGE, -BOUND_HUGE, -BOUND_HUGE);
        for b in boxes {
            let (bmin, bmax) = b.min_max();
            for axis in XYZEnum::iter() {
                if bmin[axis] < mins[axis] {
                    mins[axis] = bmin[axis];
                }
                if bmax[axis] > maxs[axis] {
                    maxs[axis] = bmax[axis];
                }
            }
        }
        BoundingBox::from_min_max(&mins, &maxs)
    }
    /// Determine if a given point is inside (or on the border of) the
    /// bounding box.
    pub fn inside(&self, p: &Point3f) -> bool {
        let upper: Point3f = self.upper_right();
        p.x >= self.lower_left.x
            && p.y >= self.lower_left.y
            && p.z >= self.lower_left.z
            && p.x <= upper.x
            && p.y <= upper.y
            && p.z <= upper.z
    }
    pub fn surface_area(&self) -> Float {
        let d: Vector3f = self.lengths;
        // 2 * (d.x * d.y + d.x * d.z + d.y * d.z)
        let r: Float = d.x * d.y + d.x * d.z + d.y * d.z;
        r + r // avoid '2 *'
    }
    pub fn volume(&self) -> Float {
        self.lengths.x * self.lengths.y * self.lengths.z
    }
    /// Twice the midpoint along *axis*; the builder sorts by it.
    pub fn sort_key(&self, axis: XYZEnum) -> Float {
        2.0 as Float * self.lower_left[axis] + self.lengths[axis]
    }
    /// Bound the box after it has been moved by *trans*.
    pub fn recompute(&self, trans: &Transform) -> BoundingBox {
        self.rebound(|corner| trans.transform_point(corner))
    }
    /// Bound the box after it has been moved by the inverse of *trans*.
    pub fn recompute_inverse(&self, trans: &Transform) -> BoundingBox {
        self.rebound(|corner| trans.inverse_transform_point(corner))
    }
    fn rebound<F>(&self, map: F) -> BoundingBox
    where
        F: Fn(&Point3f) -> Point3f,
    {
        let mut mins: Point3f = Point3f::new(BOUND_HUGE, BOUND_HUGE, BOUND_HUGE);
        let mut maxs: Point3f = Point3f::new(-BOUND_HUGE, -BOUND_HUGE, -BOUND_HUGE);
        for i in 1..=8_u8 {
            let mut corner: Point3f = self.lower_left;
            if i & 1 != 0 {
                corner.x += self.lengths.x;
            }
            if i & 2 != 0 {
                corner.y += self.lengths.y;
            }
            if i & 4 != 0 {
                corner.z += self.lengths.z;
            }
            let corner: Point3f = map(&corner);
            for axis in XYZEnum::iter() {
                if corner[axis] < mins[axis] {
                    mins[axis] = corner[axis];
                }
                if corner[axis] > maxs[axis] {
                    maxs[axis] = corner[axis];
                }
            }
        }
        // clip at the largest allowed bounding box
        let half: Float = BOUND_HUGE / 2.0;
        for axis in XYZEnum::iter() {
            mins[axis] = clamp_t(mins[axis], -half, half);
            maxs[axis] = clamp_t(maxs[axis], -half, half);
        }
        BoundingBox::from_min_max(&mins, &maxs)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn cube(x: Float, y: Float, z: Float, size: Float) -> BoundingBox {
        BoundingBox::new(Point3f::new(x, y, z), Vector3f::new(size, size, size))
    }

    #[test]
    fn union_of_nothing_is_empty() {
        let none: Vec<BoundingBox> = Vec::new();
        assert!(BoundingBox::union_of(&none).is_empty());
        assert!(BoundingBox::empty().is_empty());
        assert!(!cube(0.0, 0.0, 0.0, 0.0).is_empty());
    }

    #[test]
    fn union_matches_pairwise_union() {
        let boxes = vec![
            cube(0.0, 0.0, 0.0, 1.0),
            cube(-3.0, 2.0, 0.5, 0.5),
            cube(4.0, -1.0, -7.0, 2.0),
        ];
        let all: BoundingBox = BoundingBox::union_of(&boxes);
        let pairwise: BoundingBox = boxes[0].union(&boxes[1]).union(&boxes[2]);
        assert_eq!(all, pairwise);
        assert_eq!(all.lower_left, Point3f::new(-3.0, -1.0, -7.0));
        assert_eq!(all.upper_right(), Point3f::new(6.0, 2.5, 1.0));
    }

    #[test]
    fn degenerate_boxes_have_zero_area() {
        let point: BoundingBox = cube(1.0, 2.0, 3.0, 0.0);
        assert_eq!(point.surface_area(), 0.0);
        assert_eq!(point.volume(), 0.0);
        assert!(point.inside(&Point3f::new(1.0, 2.0, 3.0)));
        let flat = BoundingBox::new(Point3f::default(), Vector3f::new(2.0, 3.0, 0.0));
        assert_eq!(flat.surface_area(), 12.0);
    }

    #[test]
    fn inside_is_closed() {
        let b: BoundingBox = cube(0.0, 0.0, 0.0, 1.0);
        assert!(b.inside(&Point3f::new(1.0, 1.0, 1.0)));
        assert!(b.inside(&Point3f::new(0.5, 0.0, 0.5)));
        assert!(!b.inside(&Point3f::new(1.0001, 0.5, 0.5)));
        assert!(!b.inside(&Point3f::new(0.5, -0.0001, 0.5)));
    }

    #[test]
    fn sort_key_is_doubled_midpoint() {
        let b = BoundingBox::new(Point3f::new(1.0, -4.0, 0.0), Vector3f::new(2.0, 2.0, 0.0));
        assert_eq!(b.sort_key(XYZEnum::X), 4.0);
        assert_eq!(b.sort_key(XYZEnum::Y), -6.0);
        assert_eq!(b.sort_key(XYZEnum::Z), 0.0);
    }

    #[test]
    fn recompute_under_translation_and_rotation() {
        let b: BoundingBox = cube(0.0, 0.0, 0.0, 1.0);
        let moved: BoundingBox =
            b.recompute(&Transform::translate(&Vector3f::new(10.0, 0.0, -1.0)));
        assert_relative_eq!(moved.lower_left.x, 10.0);
        assert_relative_eq!(moved.lower_left.z, -1.0);
        assert_relative_eq!(moved.lengths.x, 1.0);
        let back: BoundingBox =
            moved.recompute_inverse(&Transform::translate(&Vector3f::new(10.0, 0.0, -1.0)));
        assert_relative_eq!(back.lower_left.x, 0.0);
        // a 45 degree turn around z widens the box to the diagonal
        let turned: BoundingBox = b.recompute(&Transform::rotate_z(45.0));
        assert_relative_eq!(turned.lengths.x, (2.0 as Float).sqrt(), epsilon = 1e-5);
        assert_relative_eq!(turned.lengths.z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn recompute_clamps_huge_boxes() {
        let b: BoundingBox = BoundingBox::infinite();
        let scaled: BoundingBox = b.recompute(&Transform::scale(10.0, 10.0, 10.0));
        let half: Float = BOUND_HUGE / 2.0;
        assert_eq!(scaled.lower_left.x, -half);
        assert_eq!(scaled.upper_right().y, half);
        assert!(!scaled.is_empty());
    }
}
