//! # Bounding Slabs
//!
//! The bounding slab hierarchy is a tree of axis-aligned boxes. Every
//! **Leaf** refers to exactly one scene object; every **Internal**
//! node (a *bucket*) owns a small, fixed list of children and a box
//! enclosing all of them.
//!
//! ## Construction
//!
//! The tree is built bottom-up in passes over a growable working
//! array. Each pass partitions the nodes appended by the previous
//! pass with a surface area heuristic:
//!
//! 1. find the axis along which the range extends the most,
//! 2. sort the range by the (doubled) midpoints of the boxes along
//!    that axis,
//! 3. evaluate `N1 * A1 + N2 * A2` for every split position, where
//!    `N` are the object counts and `A` the surface areas of the two
//!    halves,
//! 4. either split at the cheapest position and handle both halves,
//!    left one first, or, if the range is small enough or no split
//!    beats leaving the range alone, collapse the whole range into
//!    one new bucket appended at the end of the working array.
//!
//! A pass which does not split its range at all produced the root.
//!
//! Infinite objects (planes, ...) can't be sorted into boxes. They are
//! collected into one extra bucket, flagged as infinite, which becomes
//! the first child of the root. Traversal never culls infinite nodes.

// std
use std::cmp::Ordering;
// others
use log::debug;
use strum::IntoEnumIterator;
// slabs
use crate::core::bbox::BoundingBox;
use crate::core::geometry::XYZEnum;
use crate::core::primitive::Primitive;
use crate::core::slabs::Float;

pub const BUNCHING_FACTOR: usize = 4;

pub enum BBoxNode<'a> {
    Leaf {
        bounds: BoundingBox,
        infinite: bool,
        object: &'a dyn Primitive,
    },
    Internal {
        bounds: BoundingBox,
        infinite: bool,
        children: Box<[BBoxNode<'a>]>,
    },
}

impl<'a> BBoxNode<'a> {
    fn leaf(object: &'a dyn Primitive, infinite: bool) -> Self {
        BBoxNode::Leaf {
            bounds: object.bounding_box(),
            infinite,
            object,
        }
    }
    fn bucket(children: Vec<BBoxNode<'a>>, infinite: bool) -> Self {
        let bounds: BoundingBox = BoundingBox::union_of(children.iter().map(|c| c.bounds_ref()));
        BBoxNode::Internal {
            bounds,
            infinite,
            children: children.into_boxed_slice(),
        }
    }
    pub fn bounds(&self) -> BoundingBox {
        *self.bounds_ref()
    }
    fn bounds_ref(&self) -> &BoundingBox {
        match self {
            BBoxNode::Leaf { bounds, .. } => bounds,
            BBoxNode::Internal { bounds, .. } => bounds,
        }
    }
    pub fn is_infinite(&self) -> bool {
        match self {
            BBoxNode::Leaf { infinite, .. } => *infinite,
            BBoxNode::Internal { infinite, .. } => *infinite,
        }
    }
    pub fn is_leaf(&self) -> bool {
        match self {
            BBoxNode::Leaf { .. } => true,
            BBoxNode::Internal { .. } => false,
        }
    }
    /// Children of a bucket, an empty slice for leaves.
    pub fn children(&self) -> &[BBoxNode<'a>] {
        match self {
            BBoxNode::Leaf { .. } => &[],
            BBoxNode::Internal { children, .. } => children,
        }
    }
    pub fn object(&self) -> Option<&'a dyn Primitive> {
        match self {
            BBoxNode::Leaf { object, .. } => Some(*object),
            BBoxNode::Internal { .. } => None,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct BuildStatistics {
    pub n_finite: usize,
    pub n_infinite: usize,
    /// buckets appended to the working array while sorting finite objects
    pub buckets: usize,
    /// passes of the driving loop
    pub passes: usize,
}

pub struct BBoxTree<'a> {
    root: Option<BBoxNode<'a>>,
    build_stats: BuildStatistics,
}

impl<'a> BBoxTree<'a> {
    /// Build the hierarchy for the given objects. Buckets get at most
    /// *bunching_factor* children unless no split of a larger range
    /// pays off.
    pub fn build(
        finite: &[&'a dyn Primitive],
        infinite: &[&'a dyn Primitive],
        bunching_factor: usize,
    ) -> BBoxTree<'a> {
        let mut build_stats = BuildStatistics {
            n_finite: finite.len(),
            n_infinite: infinite.len(),
            ..Default::default()
        };
        let infinite_node: Option<BBoxNode<'a>> = if infinite.is_empty() {
            None
        } else {
            let leaves: Vec<BBoxNode<'a>> = infinite
                .iter()
                .map(|object| BBoxNode::leaf(*object, true))
                .collect();
            Some(BBoxNode::bucket(leaves, true))
        };
        let root: Option<BBoxNode<'a>> = if finite.is_empty() {
            // with no finite objects the infinite bucket (if any) is the root
            infinite_node
        } else {
            let mut builder = TreeBuilder::new(finite, bunching_factor);
            let mut low: usize = 0;
            let mut high: usize = finite.len();
            loop {
                build_stats.passes += 1;
                if builder.sort_and_split(low, high) {
                    break;
                }
                low = high;
                high = builder.nodes.len();
            }
            build_stats.buckets = builder.buckets;
            let root: Option<BBoxNode<'a>> = builder.nodes.pop().and_then(|last| last);
            match (root, infinite_node) {
                (Some(BBoxNode::Internal { children, .. }), Some(infinite_node)) => {
                    // the infinite objects go first, so every query meets them
                    let mut children: Vec<BBoxNode<'a>> = children.into_vec();
                    children.insert(0, infinite_node);
                    Some(BBoxNode::bucket(children, true))
                }
                (root, _) => root,
            }
        };
        let tree = BBoxTree { root, build_stats };
        debug!(
            "Bounding slabs: {} finite, {} infinite objects, {} buckets in {} passes, depth {}",
            build_stats.n_finite,
            build_stats.n_infinite,
            build_stats.buckets,
            build_stats.passes,
            tree.depth()
        );
        tree
    }
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
    pub fn root(&self) -> Option<&BBoxNode<'a>> {
        self.root.as_ref()
    }
    /// Box around everything in the tree. Covers the infinite bound as
    /// soon as one infinite object is present.
    pub fn world_bound(&self) -> BoundingBox {
        match &self.root {
            Some(root) => root.bounds(),
            None => BoundingBox::empty(),
        }
    }
    pub fn build_statistics(&self) -> BuildStatistics {
        self.build_stats
    }
    pub fn leaf_count(&self) -> usize {
        self.fold_nodes(0, |n, node| if node.is_leaf() { n + 1 } else { n })
    }
    pub fn bucket_count(&self) -> usize {
        self.fold_nodes(0, |n, node| if node.is_leaf() { n } else { n + 1 })
    }
    /// Number of levels, a single leaf (or bucket) counts as one.
    pub fn depth(&self) -> usize {
        let mut max_depth: usize = 0;
        let mut todo: Vec<(&BBoxNode<'a>, usize)> = Vec::new();
        if let Some(root) = &self.root {
            todo.push((root, 1));
        }
        while let Some((node, level)) = todo.pop() {
            max_depth = max_depth.max(level);
            for child in node.children() {
                todo.push((child, level + 1));
            }
        }
        max_depth
    }
    fn fold_nodes<B, F>(&self, init: B, mut f: F) -> B
    where
        F: FnMut(B, &BBoxNode<'a>) -> B,
    {
        let mut acc: B = init;
        let mut todo: Vec<&BBoxNode<'a>> = Vec::new();
        if let Some(root) = &self.root {
            todo.push(root);
        }
        while let Some(node) = todo.pop() {
            acc = f(acc, node);
            todo.extend(node.children().iter());
        }
        acc
    }
    #[cfg(test)]
    pub(crate) fn from_root(root: BBoxNode<'a>) -> BBoxTree<'a> {
        BBoxTree {
            root: Some(root),
            build_stats: BuildStatistics::default(),
        }
    }
}

impl<'a> Drop for BBoxTree<'a> {
    /// Tear the tree down level by level instead of recursively.
    fn drop(&mut self) {
        let mut todo: Vec<BBoxNode<'a>> = Vec::new();
        if let Some(root) = self.root.take() {
            todo.push(root);
        }
        while let Some(node) = todo.pop() {
            if let BBoxNode::Internal { children, .. } = node {
                todo.extend(children.into_vec());
            }
        }
    }
}

struct TreeBuilder<'a> {
    /// Consumed slots are `None`, new buckets are appended at the end.
    nodes: Vec<Option<BBoxNode<'a>>>,
    bunching_factor: usize,
    buckets: usize,
}

impl<'a> TreeBuilder<'a> {
    fn new(finite: &[&'a dyn Primitive], bunching_factor: usize) -> Self {
        let mut nodes: Vec<Option<BBoxNode<'a>>> = Vec::with_capacity(2 * finite.len());
        for object in finite {
            nodes.push(Some(BBoxNode::leaf(*object, false)));
        }
        TreeBuilder {
            nodes,
            bunching_factor,
            buckets: 0,
        }
    }
    /// Partition the nodes in `[first, last)`. Returns `true` if the
    /// whole range went into a single bucket.
    fn sort_and_split(&mut self, first: usize, last: usize) -> bool {
        if last <= first {
            return true;
        }
        let mut terminal: bool = false;
        // right ranges are pushed first, so every left range (and the
        // buckets it appends) is finished before its right sibling starts
        let mut todo: Vec<(usize, usize)> = vec![(first, last)];
        while let Some((start, end)) = todo.pop() {
            match self.split_range(start, end) {
                Some(best_loc) => {
                    todo.push((best_loc + 1, end));
                    todo.push((start, best_loc + 1));
                }
                None => {
                    if start == first && end == last {
                        terminal = true;
                    }
                }
            }
        }
        terminal
    }
    /// Either find the split position for `[first, last)` or turn the
    /// range into a bucket (and return `None`).
    fn split_range(&mut self, first: usize, last: usize) -> Option<usize> {
        let size: usize = last - first;
        let axis: XYZEnum = self.find_axis(first, last);
        self.nodes[first..last].sort_by(|a, b| {
            let ka: Float = sort_key(a, axis);
            let kb: Float = sort_key(b, axis);
            ka.partial_cmp(&kb).unwrap_or(Ordering::Equal)
        });
        // area_left[i] covers first..=first+i, area_right[i] covers first+i..last
        let area_left: Vec<Float> = self.area_table(first..last);
        let mut area_right: Vec<Float> = self.area_table((first..last).rev());
        area_right.reverse();
        let mut best_index: Float = area_right[0] * (size as Float - 3.0);
        let mut best_loc: Option<usize> = None;
        for i in 0..size - 1 {
            let new_index: Float = (i + 1) as Float * area_left[i]
                + (size - 1 - i) as Float * area_right[i + 1];
            if new_index < best_index {
                best_index = new_index;
                best_loc = Some(first + i);
            }
        }
        if size <= self.bunching_factor || best_loc.is_none() {
            let children: Vec<BBoxNode<'a>> = self.nodes[first..last]
                .iter_mut()
                .filter_map(Option::take)
                .collect();
            self.nodes.push(Some(BBoxNode::bucket(children, false)));
            self.buckets += 1;
            return None;
        }
        best_loc
    }
    fn find_axis(&self, first: usize, last: usize) -> XYZEnum {
        let bounds: BoundingBox = BoundingBox::union_of(
            self.nodes[first..last]
                .iter()
                .flatten()
                .map(|node| node.bounds_ref()),
        );
        let mut which: XYZEnum = XYZEnum::X;
        let mut d: Float = Float::NEG_INFINITY;
        for axis in XYZEnum::iter() {
            let e: Float = bounds.lengths[axis];
            if e > d {
                d = e;
                which = axis;
            }
        }
        which
    }
    /// Surface areas of the growing unions, in iteration order.
    fn area_table<I>(&self, range: I) -> Vec<Float>
    where
        I: Iterator<Item = usize>,
    {
        let mut acc: BoundingBox = BoundingBox::empty();
        let mut areas: Vec<Float> = Vec::new();
        for i in range {
            if let Some(node) = &self.nodes[i] {
                acc = acc.union(node.bounds_ref());
            }
            areas.push(acc.surface_area());
        }
        areas
    }
}

fn sort_key(node: &Option<BBoxNode>, axis: XYZEnum) -> Float {
    match node {
        Some(node) => node.bounds_ref().sort_key(axis),
        None => 0.0,
    }
}
