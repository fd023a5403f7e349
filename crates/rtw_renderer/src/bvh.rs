//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree with exactly one primitive per leaf. Nodes live in a flat
//! arena and refer to each other by index; the primitives are reordered in
//! place during the build so every subtree covers a contiguous range.
//!
//! Splits are chosen with a binned surface area heuristic (SAH). When the
//! chosen plane leaves one side empty, the range is split at its median
//! centroid instead, so every build terminates with `2n - 1` nodes.

use crate::{stats, HitRecord, Hittable, HittableList, Ray};
use partition::partition;
use rtw_math::{axis_component, Aabb, Interval, Vec3};
use std::time::Instant;

/// Number of equal-width bins along the split axis.
pub const BIN_COUNT: usize = 16;

/// BVH node, stored in [`Bvh`]'s node arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BvhNode {
    /// Internal node with two children (arena indices).
    Branch { bbox: Aabb, left: usize, right: usize },
    /// Leaf holding a single primitive (index into the primitive list).
    Leaf { bbox: Aabb, primitive: usize },
}

impl BvhNode {
    /// Bounding box of everything below this node.
    pub fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => *bbox,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, BvhNode::Leaf { .. })
    }
}

/// Summary of a finished build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub primitives: usize,
    pub nodes: usize,
    pub leaves: usize,
    /// Ranges where the SAH plane was unusable and the median split was taken
    pub median_splits: usize,
    /// Depth of the deepest leaf (the root is at depth 0)
    pub max_depth: usize,
}

/// Per-bin accumulator for the SAH sweep.
#[derive(Clone, Copy)]
struct Bin {
    count: usize,
    bbox: Aabb,
}

impl Default for Bin {
    fn default() -> Self {
        Self {
            count: 0,
            bbox: Aabb::EMPTY,
        }
    }
}

/// A built hierarchy over a set of primitives.
///
/// The tree is read-only once built and can be shared between render
/// threads. It is [`Hittable`] itself, so a BVH can be placed inside
/// another BVH or used anywhere a single primitive is expected.
pub struct Bvh {
    primitives: Vec<Box<dyn Hittable>>,
    nodes: Vec<BvhNode>,
    root: Option<usize>,
    centroid: Vec3,
    stats: BuildStats,
}

impl Bvh {
    /// Build a BVH over `primitives`.
    ///
    /// An empty input produces an empty tree that never reports a hit.
    pub fn new(mut primitives: Vec<Box<dyn Hittable>>) -> Self {
        if primitives.is_empty() {
            log::warn!("Building BVH over an empty scene; every ray will miss");
            return Self {
                primitives,
                nodes: Vec::new(),
                root: None,
                centroid: Vec3::ZERO,
                stats: BuildStats::default(),
            };
        }

        let start = Instant::now();
        let mut builder = Builder {
            nodes: Vec::with_capacity(2 * primitives.len() - 1),
            stats: BuildStats {
                primitives: primitives.len(),
                ..Default::default()
            },
        };
        let root = builder.build(&mut primitives, 0, 0);
        let Builder { nodes, mut stats } = builder;
        stats.nodes = nodes.len();

        log::info!(
            "BVH built: {} primitives, {} nodes, depth {}, {} median splits in {:.2?}",
            stats.primitives,
            stats.nodes,
            stats.max_depth,
            stats.median_splits,
            start.elapsed()
        );

        let centroid = nodes[root].bbox().center();
        Self {
            primitives,
            nodes,
            root: Some(root),
            centroid,
            stats,
        }
    }

    /// Build a BVH over the objects of a list.
    pub fn from_list(list: HittableList) -> Self {
        Self::new(list.into_objects())
    }

    pub fn build_stats(&self) -> BuildStats {
        self.stats
    }

    /// Node arena; children always precede their parent.
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Arena index of the root, `None` for an empty tree.
    pub fn root(&self) -> Option<usize> {
        self.root
    }

    /// Primitives in tree order (leaves refer to them by index).
    pub fn primitives(&self) -> &[Box<dyn Hittable>] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Entry distance into a node's box, or [`Aabb::MISS`].
    #[inline]
    fn entry_distance(&self, index: usize, ray: &Ray, range: Interval) -> f32 {
        let t = self.nodes[index].bbox().intersect(ray, range.min, range.max);
        stats::box_test(t >= 0.0);
        t
    }

    /// Descend into a node whose box the ray is already known to enter.
    fn visit<'a>(&'a self, index: usize, ray: &Ray, range: Interval) -> Option<HitRecord<'a>> {
        match self.nodes[index] {
            BvhNode::Leaf { primitive, .. } => {
                stats::leaf_visit();
                self.primitives[primitive].hit(ray, range)
            }
            BvhNode::Branch { left, right, .. } => {
                let t_left = self.entry_distance(left, ray, range);
                let t_right = self.entry_distance(right, ray, range);

                // Nearer child first; a missed box sorts last, ties keep left first
                let right_first = t_right >= 0.0 && (t_left < 0.0 || t_right < t_left);
                let ((near, t_near), (far, t_far)) = if right_first {
                    ((right, t_right), (left, t_left))
                } else {
                    ((left, t_left), (right, t_right))
                };

                let mut range = range;
                let mut closest = None;

                if t_near >= 0.0 {
                    if let Some(rec) = self.visit(near, ray, range) {
                        range = range.with_max(rec.t);
                        closest = Some(rec);
                    }
                }

                // Anything found in the far child lies inside the tightened range
                if t_far >= 0.0 && t_far < range.max {
                    if let Some(rec) = self.visit(far, ray, range) {
                        closest = Some(rec);
                    }
                }

                closest
            }
        }
    }
}

/// Build a BVH over `primitives`. Alias for [`Bvh::new`].
pub fn build_acceleration_structure(primitives: Vec<Box<dyn Hittable>>) -> Bvh {
    Bvh::new(primitives)
}

impl Hittable for Bvh {
    /// Closest hit within `ray_t`. The lower bound is expected to be
    /// non-negative, since negative box entry distances mean "miss".
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        debug_assert!(
            ray_t.min >= 0.0,
            "BVH queries need a non-negative t_min, got {}",
            ray_t.min
        );
        let root = self.root?;
        if self.entry_distance(root, ray, ray_t) < 0.0 {
            return None;
        }
        self.visit(root, ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        self.root.map_or(Aabb::EMPTY, |root| self.nodes[root].bbox())
    }

    fn centroid(&self) -> Vec3 {
        self.centroid
    }
}

/// Recursive top-down construction state.
struct Builder {
    nodes: Vec<BvhNode>,
    stats: BuildStats,
}

impl Builder {
    fn push(&mut self, node: BvhNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Build the subtree over `prims`, which start at `offset` in the full
    /// primitive list. Returns the arena index of the subtree root.
    fn build(&mut self, prims: &mut [Box<dyn Hittable>], offset: usize, depth: usize) -> usize {
        if prims.len() == 1 {
            self.stats.leaves += 1;
            self.stats.max_depth = self.stats.max_depth.max(depth);
            return self.push(BvhNode::Leaf {
                bbox: prims[0].bounding_box(),
                primitive: offset,
            });
        }

        let node_box = prims
            .iter()
            .fold(Aabb::EMPTY, |acc, p| acc.union(&p.bounding_box()));
        let centroid_box = prims
            .iter()
            .fold(Aabb::EMPTY, |acc, p| acc.union_point(p.centroid()));
        let axis = centroid_box.dominant_axis();

        let sah_mid = sah_split_position(prims, &centroid_box, axis, &node_box).and_then(|pos| {
            let (left, right) = partition(prims, |p| axis_component(p.centroid(), axis) < pos);
            (!left.is_empty() && !right.is_empty()).then_some(left.len())
        });
        let mid = match sah_mid {
            Some(mid) => mid,
            None => self.median_split(prims, axis, offset, depth),
        };

        let (lo, hi) = prims.split_at_mut(mid);
        let left = self.build(lo, offset, depth + 1);
        let right = self.build(hi, offset + mid, depth + 1);

        let bbox = self.nodes[left].bbox().union(&self.nodes[right].bbox());
        self.push(BvhNode::Branch { bbox, left, right })
    }

    /// Split at the median centroid along `axis`. Both halves are non-empty
    /// for any range of two or more primitives.
    fn median_split(
        &mut self,
        prims: &mut [Box<dyn Hittable>],
        axis: usize,
        offset: usize,
        depth: usize,
    ) -> usize {
        let mid = prims.len() / 2;
        prims.select_nth_unstable_by(mid, |a, b| {
            axis_component(a.centroid(), axis).total_cmp(&axis_component(b.centroid(), axis))
        });

        self.stats.median_splits += 1;
        log::debug!(
            "BVH median split: {} primitives at [{}, {}), axis {}, depth {}",
            prims.len(),
            offset,
            offset + prims.len(),
            axis,
            depth
        );
        mid
    }
}

/// Pick the SAH split plane along `axis`.
///
/// Returns the plane's position, or `None` when the centroids do not spread
/// along the axis (zero bin width).
fn sah_split_position(
    prims: &[Box<dyn Hittable>],
    centroid_box: &Aabb,
    axis: usize,
    node_box: &Aabb,
) -> Option<f32> {
    let start = axis_component(centroid_box.min, axis);
    let delta = (axis_component(centroid_box.max, axis) - start) / BIN_COUNT as f32;
    if !(delta > 0.0) {
        return None;
    }
    let inv_delta = 1.0 / delta;

    let mut bins = [Bin::default(); BIN_COUNT];
    for p in prims {
        // Float-to-int casts saturate, so values below `start` land in bin 0
        let i = (((axis_component(p.centroid(), axis) - start) * inv_delta) as usize)
            .min(BIN_COUNT - 1);
        bins[i].count += 1;
        bins[i].bbox = bins[i].bbox.union(&p.bounding_box());
    }

    // Right-hand sweep: accumulated count and area of bins (b, BIN_COUNT)
    let mut right = [(0usize, 0.0f32); BIN_COUNT - 1];
    let mut count = 0;
    let mut bbox = Aabb::EMPTY;
    for b in (1..BIN_COUNT).rev() {
        count += bins[b].count;
        bbox = bbox.union(&bins[b].bbox);
        right[b - 1] = (count, bbox.half_surface_area());
    }

    let node_area = node_box.half_surface_area();
    let mut best = (f32::INFINITY, 0);
    let mut count = 0;
    let mut bbox = Aabb::EMPTY;
    for (b, &(right_count, right_area)) in right.iter().enumerate() {
        count += bins[b].count;
        bbox = bbox.union(&bins[b].bbox);

        let mut cost = count as f32 * bbox.half_surface_area() + right_count as f32 * right_area;
        if node_area > 0.0 {
            cost /= node_area;
        }
        if cost < best.0 {
            best = (cost, b);
        }
    }

    Some(start + delta * (best.1 + 1) as f32)
}
