use std::collections::HashMap;

use rand::Rng;

use crate::bvh::Bvh;
use crate::material::MaterialKind;
use crate::math::Vec3;
use crate::ray::{PrimIndex, Ray};
use crate::rng::uniform01;
use crate::triangle::{Triangle, EPS, HIT_EPS};

/// The set of emissive triangles in the scene, sampled uniformly for
/// next-event estimation. Stores a prefix sum over (currently uniform)
/// per-light weights rather than per-triangle probabilities directly, so
/// picking a light is a binary search rather than a linear scan.
pub struct EmissiveGroup {
    prims: Vec<PrimIndex>,
    prefix_sum: Vec<f32>,
    index_of: HashMap<PrimIndex, usize>,
}

impl EmissiveGroup {
    pub fn new(prims: Vec<PrimIndex>) -> Self {
        let mut prefix_sum = Vec::with_capacity(prims.len());
        let mut index_of = HashMap::with_capacity(prims.len());
        for (i, &p) in prims.iter().enumerate() {
            prefix_sum.push((i + 1) as f32);
            index_of.insert(p, i);
        }
        Self {
            prims,
            prefix_sum,
            index_of,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prims.is_empty()
    }

    fn weight_of(&self, idx: usize) -> f32 {
        if idx == 0 {
            self.prefix_sum[0]
        } else {
            self.prefix_sum[idx] - self.prefix_sum[idx - 1]
        }
    }

    /// Samples a shadow-tested direction toward a uniformly chosen light,
    /// returning the incident direction, its pdf with respect to solid
    /// angle at the shading point, and the light's emitted radiance.
    /// `None` means the sample is occluded, faces away, or the cast ray
    /// didn't land back on the sampled point (a near-miss that would
    /// otherwise divide by a near-zero denominator).
    pub fn sample_ray<R: Rng + ?Sized>(
        &self,
        triangles: &[Triangle],
        materials: &[crate::material::Material],
        bvh: &Bvh,
        shading_point: Vec3,
        shading_normal: Vec3,
        rng: &mut R,
    ) -> Option<(Vec3, f32, Vec3)> {
        if self.is_empty() {
            return None;
        }
        let total = *self.prefix_sum.last().unwrap();
        let target = uniform01(rng) * total;
        let idx = self
            .prefix_sum
            .partition_point(|&cum| cum < target)
            .min(self.prims.len() - 1);
        let prim = self.prims[idx];
        let tri = &triangles[prim as usize];

        let sample_p = tri.sample_point(rng);
        let to_light = sample_p - shading_point;
        let wi = to_light.normalized();
        if shading_normal.dot(wi) <= 0.0 {
            return None;
        }

        let ray = Ray::new(shading_point, wi);
        let hit = bvh.hit(triangles, &ray, HIT_EPS, f32::INFINITY)?;
        if (hit.p - sample_p).length_squared() >= EPS {
            return None;
        }
        if tri.normal.dot(wi) >= 0.0 {
            return None;
        }

        let ke = match materials[hit.mat as usize].kind() {
            MaterialKind::Light(ke) => ke,
            _ => return None,
        };

        let dist2 = (shading_point - hit.p).length_squared();
        let cos_light = (-wi).dot(tri.normal);
        let area_pdf = dist2 / (tri.area * cos_light);
        let pick_pdf = self.weight_of(idx) / total;
        Some((wi, area_pdf * pick_pdf, ke))
    }

    /// Evaluates the pdf (w.r.t. solid angle at the ray's origin) of having
    /// generated `ray` via `sample_ray`, for the BSDF-sampling half of the
    /// MIS estimator. Returns `None` when the ray doesn't land on a
    /// member of this group.
    pub fn pdf(
        &self,
        triangles: &[Triangle],
        materials: &[crate::material::Material],
        bvh: &Bvh,
        ray: &Ray,
    ) -> Option<(f32, Vec3)> {
        if self.is_empty() {
            return None;
        }
        let hit = bvh.hit(triangles, ray, HIT_EPS, f32::INFINITY)?;
        let &idx = self.index_of.get(&hit.obj)?;
        let tri = &triangles[hit.obj as usize];
        if tri.normal.dot(ray.direction) >= 0.0 {
            return None;
        }
        let ke = match materials[hit.mat as usize].kind() {
            MaterialKind::Light(ke) => ke,
            _ => return None,
        };
        let dist2 = (ray.origin - hit.p).length_squared();
        let cos_light = (-ray.direction).dot(tri.normal);
        let area_pdf = dist2 / (tri.area * cos_light);
        let total = *self.prefix_sum.last().unwrap();
        Some((area_pdf * self.weight_of(idx) / total, ke))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::math::Point3;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn single_light_scene() -> (Vec<Triangle>, Vec<Material>, Bvh, EmissiveGroup) {
        let light_mat = 0u32;
        let tri = Triangle::new(
            Point3::new(-1.0, 2.0, -1.0),
            Point3::new(1.0, 2.0, -1.0),
            Point3::new(0.0, 2.0, 1.0),
            light_mat,
        );
        let triangles = vec![tri];
        let materials = vec![Material::Phong {
            kd: Vec3::zero(),
            ks: Vec3::zero(),
            ns: 1.0,
            emissive: Some(Vec3::new(4.0, 4.0, 4.0)),
            texture: None,
        }];
        let bvh = Bvh::build(&triangles);
        let group = EmissiveGroup::new(vec![0]);
        (triangles, materials, bvh, group)
    }

    #[test]
    fn sample_ray_returns_positive_pdf_and_matching_radiance() {
        let (triangles, materials, bvh, group) = single_light_scene();
        let mut rng = SmallRng::seed_from_u64(11);
        let shading_point = Point3::new(0.0, 0.0, 0.0);
        let normal = Vec3::new(0.0, 1.0, 0.0);
        let mut successes = 0;
        for _ in 0..200 {
            if let Some((wi, pdf, ke)) =
                group.sample_ray(&triangles, &materials, &bvh, shading_point, normal, &mut rng)
            {
                assert!(pdf > 0.0);
                assert_eq!(ke, Vec3::new(4.0, 4.0, 4.0));
                assert!(wi.y > 0.0);
                successes += 1;
            }
        }
        assert!(successes > 0, "expected at least some unoccluded samples");
    }

    #[test]
    fn pdf_is_zero_for_a_ray_that_misses_the_light() {
        let (triangles, materials, bvh, group) = single_light_scene();
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(group.pdf(&triangles, &materials, &bvh, &ray).is_none());
    }
}
