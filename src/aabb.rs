use crate::math::Point3;
use crate::ray::Ray;

/// An axis-aligned bounding box used as the bounding volume in the BVH.
/// Intersection is tested via the slab method, which checks overlap of the
/// ray's parameter interval across all three axes simultaneously.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    pub const fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self::new(
            Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        )
    }

    /// Slab-method ray-AABB intersection test. Returns the near-t of the
    /// intersection interval when the ray hits the box within
    /// `[t_min, t_max]`, or `None` otherwise. The swap-on-negative-inverse
    /// formulation handles rays travelling in either direction along each
    /// axis without branching on the ray's sign up front.
    pub fn hit(&self, ray: &Ray, mut t_min: f32, mut t_max: f32) -> Option<f32> {
        for axis in 0..3 {
            let inv_d = 1.0 / ray.direction[axis];
            let mut t0 = (self.min[axis] - ray.origin[axis]) * inv_d;
            let mut t1 = (self.max[axis] - ray.origin[axis]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t0.max(t_min);
            t_max = t1.min(t_max);
            if t_max < t_min {
                return None;
            }
        }
        Some(t_min)
    }

    /// Union of two AABBs — used during BVH construction to find the
    /// bounding volume of a set of child nodes.
    pub fn union(a: &Aabb, b: &Aabb) -> Aabb {
        Aabb::new(a.min.min(b.min), a.max.max(b.max))
    }

    pub fn grow(&mut self, p: Point3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Index of the longest axis (0=x, 1=y, 2=z) — the split dimension used
    /// by the BVH's median-split build.
    pub fn longest_axis(&self) -> usize {
        let d = self.max - self.min;
        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    #[test]
    fn hit_returns_near_t_for_a_straight_on_ray() {
        let bbox = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let t = bbox.hit(&ray, 0.0, f32::INFINITY).expect("ray should hit box");
        assert!((t - 4.0).abs() < 1e-4);
    }

    #[test]
    fn hit_misses_a_ray_travelling_away_from_the_box() {
        let bbox = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(bbox.hit(&ray, 0.0, f32::INFINITY).is_none());
    }

    #[test]
    fn union_contains_both_inputs() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(-2.0, 0.5, 0.0), Point3::new(0.5, 3.0, 0.5));
        let u = Aabb::union(&a, &b);
        assert_eq!(u.min, Point3::new(-2.0, 0.0, 0.0));
        assert_eq!(u.max, Point3::new(1.0, 3.0, 1.0));
    }
}
