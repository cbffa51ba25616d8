use rand::Rng;

use crate::aabb::Aabb;
use crate::math::{Point3, Vec2, Vec3};
use crate::ray::{HitRecord, MatIndex, PrimIndex, Ray};
use crate::rng::uniform01;

/// Intersection epsilon: Möller–Trumbore rejects near-parallel rays below
/// this determinant magnitude, and shadow rays start this far past their
/// origin to avoid self-intersection ("shadow acne").
pub const EPS: f32 = 1e-7;
pub const HIT_EPS: f32 = 1e-3;

/// A single triangle, the sole geometric primitive in the scene. Vertex
/// positions are stored directly (no shared vertex buffer) since the BVH
/// only ever needs per-triangle bounding boxes and intersection, not mesh
/// topology.
#[derive(Debug, Clone)]
pub struct Triangle {
    pub p0: Point3,
    pub p1: Point3,
    pub p2: Point3,
    pub uv0: Vec2,
    pub uv1: Vec2,
    pub uv2: Vec2,
    pub has_uv: bool,
    /// Static face normal, precomputed at load time from vertex positions
    /// (or the mesh-supplied normal, when present and not disagreeing with
    /// the winding order). Never flipped per-ray; callers that need a
    /// shading-side normal flip it themselves.
    pub normal: Vec3,
    /// Twice the geometric triangle area (the cross-product magnitude of
    /// two edges), matching the area-to-solid-angle pdf formula this value
    /// feeds directly — not a "true area" correction.
    pub area: f32,
    pub mat: MatIndex,
    bbox: Aabb,
}

impl Triangle {
    #[cfg(test)]
    pub fn new(p0: Point3, p1: Point3, p2: Point3, mat: MatIndex) -> Self {
        Self::with_uv(p0, p1, p2, Vec2::zero(), Vec2::zero(), Vec2::zero(), false, mat)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_uv(
        p0: Point3,
        p1: Point3,
        p2: Point3,
        uv0: Vec2,
        uv1: Vec2,
        uv2: Vec2,
        has_uv: bool,
        mat: MatIndex,
    ) -> Self {
        let e1 = p1 - p0;
        let e2 = p2 - p0;
        let cross = e1.cross(e2);
        let area = cross.length();
        let normal = cross.normalized();
        let mut bbox = Aabb::new(p0, p0);
        bbox.grow(p1);
        bbox.grow(p2);
        Self {
            p0,
            p1,
            p2,
            uv0,
            uv1,
            uv2,
            has_uv,
            normal,
            area,
            mat,
            bbox,
        }
    }

    /// Builds a triangle using a mesh-supplied normal when it doesn't
    /// disagree with the winding-order normal, flipping the winding-derived
    /// normal to match it otherwise, so authored normals are trusted over
    /// face winding.
    #[allow(clippy::too_many_arguments)]
    pub fn with_normal_hint(
        p0: Point3,
        p1: Point3,
        p2: Point3,
        uv0: Vec2,
        uv1: Vec2,
        uv2: Vec2,
        has_uv: bool,
        hint: Option<Vec3>,
        mat: MatIndex,
    ) -> Self {
        let mut tri = Self::with_uv(p0, p1, p2, uv0, uv1, uv2, has_uv, mat);
        if let Some(hint) = hint {
            if tri.normal.dot(hint) < 0.0 {
                tri.normal = -tri.normal;
            }
        }
        tri
    }

    pub fn bbox(&self) -> Aabb {
        self.bbox
    }

    /// Möller–Trumbore ray/triangle intersection. `prim_index` is written
    /// into the returned hit record's `obj` field so callers don't need to
    /// track which arena slot produced the hit separately.
    pub fn hit(&self, ray: &Ray, t_min: f32, t_max: f32, prim_index: PrimIndex) -> Option<HitRecord> {
        let e1 = self.p1 - self.p0;
        let e2 = self.p2 - self.p0;
        let pvec = ray.direction.cross(e2);
        let det = e1.dot(pvec);
        if det.abs() < EPS {
            return None;
        }
        let inv_det = 1.0 / det;
        let tvec = ray.origin - self.p0;
        let u = tvec.dot(pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let qvec = tvec.cross(e1);
        let v = ray.direction.dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = e2.dot(qvec) * inv_det;
        if t < t_min || t > t_max {
            return None;
        }
        let uv = if self.has_uv {
            let w = 1.0 - u - v;
            self.uv0 * w + self.uv1 * u + self.uv2 * v
        } else {
            Vec2::zero()
        };
        Some(HitRecord {
            p: ray.at(t),
            normal: self.normal,
            t,
            uv,
            mat: self.mat,
            obj: prim_index,
        })
    }

    /// Uniformly samples a point on the triangle's surface via the standard
    /// square-root barycentric transform (Shirley & Chiu).
    pub fn sample_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point3 {
        let r1 = uniform01(rng).sqrt();
        let r2 = uniform01(rng);
        self.p0 * (1.0 - r1) + self.p1 * (r1 * (1.0 - r2)) + self.p2 * (r1 * r2)
    }
}
