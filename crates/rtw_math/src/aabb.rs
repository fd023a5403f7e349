use crate::{axis_component, Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// Stored as its two corner points. [`Aabb::EMPTY`] has `min = +inf` and
/// `max = -inf` on every axis, so it only becomes a valid box after the
/// first union.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box that contains nothing; the identity for [`Aabb::union`].
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// Returned by [`Aabb::intersect`] when the ray misses the box.
    pub const MISS: f32 = -1.0;

    /// Create an AABB from its corners. The caller guarantees `min <= max`.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from two arbitrary corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest box containing both `self` and `other`.
    #[inline]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Smallest box containing both `self` and the point `p`.
    #[inline]
    pub fn union_point(&self, p: Vec3) -> Aabb {
        Aabb {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// True until the box has absorbed at least one point or box.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Size of the box along each axis (max - min).
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns the center point of the bounding box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half of the surface area: `dx*dy + dy*dz + dz*dx`.
    ///
    /// Only used to compare split candidates against each other, so the
    /// factor of two is dropped everywhere. An empty box has zero area.
    pub fn half_surface_area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.extent();
        d.x * d.y + d.y * d.z + d.z * d.x
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    ///
    /// Ties go to the lower axis index.
    pub fn dominant_axis(&self) -> usize {
        let d = self.extent();
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    /// Slab test returning the distance at which the ray enters the box.
    ///
    /// The range `[t_min, t_max]` is narrowed axis by axis. As soon as it
    /// becomes empty the ray misses and [`Aabb::MISS`] is returned, otherwise
    /// the narrowed `t_min` is the entry distance. `t_min` is expected to be
    /// non-negative so a valid entry can never be confused with the sentinel.
    ///
    /// A zero direction component turns into an infinite reciprocal; the
    /// resulting `±inf` (or NaN, when the origin lies exactly on the slab
    /// plane) bounds are absorbed by `f32::max`/`f32::min`.
    #[inline]
    pub fn intersect(&self, ray: &Ray, mut t_min: f32, mut t_max: f32) -> f32 {
        for axis in 0..3 {
            let inv_d = 1.0 / axis_component(ray.direction, axis);
            let origin = axis_component(ray.origin, axis);
            let mut t0 = (axis_component(self.min, axis) - origin) * inv_d;
            let mut t1 = (axis_component(self.max, axis) - origin) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t0.max(t_min);
            t_max = t1.min(t_max);
            if t_max <= t_min {
                return Self::MISS;
            }
        }
        t_min
    }

    /// True if `other` lies entirely inside this box (boundaries included).
    pub fn contains_box(&self, other: &Aabb) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    /// Grow any axis thinner than `delta` so the box keeps a non-zero extent.
    ///
    /// Flat geometry (axis-aligned triangles) would otherwise produce boxes
    /// that a grazing ray can slip through.
    pub fn pad_to_minimum(&self, delta: f32) -> Aabb {
        let extent = self.extent();
        let mut max = self.max;
        for axis in 0..3 {
            if axis_component(extent, axis) < delta {
                max[axis] = self.min[axis] + delta;
            }
        }
        Aabb::new(self.min, max)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
