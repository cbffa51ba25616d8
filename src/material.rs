use std::f32::consts::PI;

use rand::Rng;

use crate::math::{Onb, Vec2, Vec3};
use crate::rng::uniform01;
use crate::texture::Texture;

/// How the integrator should treat a hit against this material: add
/// emitted radiance and stop (`Light`), attenuate by a constant and
/// continue without a cosine/pdf factor (`Glass`), or run full NEE/MIS
/// shading (`Phong`).
pub enum MaterialKind {
    Phong,
    Glass,
    Light(Vec3),
}

/// The scene's two shading models, chosen as a tagged enum rather than a
/// trait-object hierarchy: there are exactly two kinds, and the integrator
/// always knows which one it's looking at.
pub enum Material {
    /// A Phong reflectance model mixing a diffuse (Lambertian) lobe and a
    /// glossy specular lobe, optionally emissive and/or diffuse-textured.
    Phong {
        kd: Vec3,
        ks: Vec3,
        ns: f32,
        emissive: Option<Vec3>,
        texture: Option<Texture>,
    },
    /// A smooth dielectric (glass) interface with index of refraction
    /// `ior`, reflecting or transmitting according to Snell's law and the
    /// Schlick approximation of the Fresnel reflectance.
    Glass { ior: f32 },
}

impl Material {
    pub fn kind(&self) -> MaterialKind {
        match self {
            Material::Phong { emissive: Some(ke), .. } => MaterialKind::Light(*ke),
            Material::Phong { .. } => MaterialKind::Phong,
            Material::Glass { .. } => MaterialKind::Glass,
        }
    }

    fn effective_kd(&self, uv: Vec2) -> Vec3 {
        match self {
            Material::Phong { texture: Some(tex), .. } => tex.sample(uv),
            Material::Phong { kd, .. } => *kd,
            Material::Glass { .. } => Vec3::zero(),
        }
    }

    /// Imports a new direction `wi` and its pdf with respect to solid
    /// angle. `wo` points away from the surface toward the previous path
    /// vertex; `normal` must already be oriented to the same side as `wo`
    /// for Phong materials (the integrator flips it once per bounce before
    /// calling any material method).
    pub fn scatter<R: Rng + ?Sized>(
        &self,
        wo: Vec3,
        normal: Vec3,
        uv: Vec2,
        rng: &mut R,
    ) -> Option<(Vec3, f32)> {
        match self {
            Material::Phong { ks, ns, .. } => {
                let kd = self.effective_kd(uv);
                let sum = kd.max_component() + ks.max_component();
                if sum <= 0.0 {
                    return None;
                }
                let p_diffuse = kd.max_component() / sum;
                let wi = if uniform01(rng) < p_diffuse {
                    sample_lambertian(rng, normal)
                } else {
                    sample_specular(rng, wo, normal, *ns)
                };
                if wi.dot(normal) <= 0.0 {
                    return None;
                }
                let pdf = p_diffuse * pdf_lambertian(normal, wi)
                    + (1.0 - p_diffuse) * pdf_specular(wo, normal, wi, *ns);
                (pdf > 0.0).then_some((wi, pdf))
            }
            Material::Glass { ior } => Some(scatter_glass(wo, normal, *ior, rng)),
        }
    }

    pub fn pdf(&self, wo: Vec3, normal: Vec3, wi: Vec3, uv: Vec2) -> f32 {
        match self {
            Material::Phong { ks, ns, .. } => {
                let kd = self.effective_kd(uv);
                let sum = kd.max_component() + ks.max_component();
                if sum <= 0.0 || wi.dot(normal) <= 0.0 {
                    return 0.0;
                }
                let p_diffuse = kd.max_component() / sum;
                p_diffuse * pdf_lambertian(normal, wi) + (1.0 - p_diffuse) * pdf_specular(wo, normal, wi, *ns)
            }
            Material::Glass { .. } => 1.0,
        }
    }

    pub fn bsdf(&self, wo: Vec3, wi: Vec3, normal: Vec3, uv: Vec2) -> Vec3 {
        match self {
            Material::Phong { ks, ns, .. } => {
                if wi.dot(normal) <= 0.0 {
                    return Vec3::zero();
                }
                let kd = self.effective_kd(uv);
                let wr = mirror_outgoing(wo, normal);
                let cos_alpha = wr.dot(wi).max(0.0);
                (kd + *ks * (0.5 * (*ns + 2.0) * cos_alpha.powf(*ns))) / PI
            }
            // Constant, near-white transmittance — the glass interface
            // itself carries no color; the pdf=1 scatter already selected
            // reflection vs. transmission via Schlick's approximation.
            Material::Glass { .. } => Vec3::new(0.9, 0.9, 0.9),
        }
    }
}

/// Reflects the outgoing (points-away-from-surface) direction `wo` about
/// `normal`, producing another outgoing direction. Distinct from
/// `Vec3::reflect`, which uses the opposite (incident) sign convention.
fn mirror_outgoing(wo: Vec3, normal: Vec3) -> Vec3 {
    normal * (2.0 * normal.dot(wo)) - wo
}

fn sample_lambertian<R: Rng + ?Sized>(rng: &mut R, normal: Vec3) -> Vec3 {
    let phi = uniform01(rng) * 2.0 * PI;
    let cos_theta = (1.0 - uniform01(rng)).sqrt();
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let local = Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
    Onb::from_normal(normal).to_world(local)
}

fn pdf_lambertian(normal: Vec3, wi: Vec3) -> f32 {
    (normal.dot(wi) / PI).max(0.0)
}

fn sample_specular<R: Rng + ?Sized>(rng: &mut R, wo: Vec3, normal: Vec3, ns: f32) -> Vec3 {
    let wr = mirror_outgoing(wo, normal);
    let phi = uniform01(rng) * 2.0 * PI;
    let cos_theta = uniform01(rng).powf(1.0 / (ns + 1.0));
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let local = Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
    Onb::from_normal(wr).to_world(local)
}

fn pdf_specular(wo: Vec3, normal: Vec3, wi: Vec3, ns: f32) -> f32 {
    let wr = mirror_outgoing(wo, normal);
    let cos_alpha = wr.dot(wi).max(0.0);
    (ns + 1.0) * cos_alpha.powf(ns) / (2.0 * PI)
}

fn schlick_reflectance(cos_theta: f32, eta: f32) -> f32 {
    let r0 = ((1.0 - eta) / (1.0 + eta)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cos_theta).powi(5)
}

fn refract_outgoing(wo: Vec3, n: Vec3, eta: f32) -> Vec3 {
    let cos_theta = wo.dot(n);
    let r_out_perp = (n * cos_theta - wo) * eta;
    let k = (1.0 - r_out_perp.length_squared()).max(0.0);
    r_out_perp - n * k.sqrt()
}

fn scatter_glass<R: Rng + ?Sized>(wo: Vec3, normal: Vec3, ior: f32, rng: &mut R) -> (Vec3, f32) {
    let same_side = normal.dot(wo) > 0.0;
    let eta = if same_side { 1.0 / ior } else { ior };
    let n = if same_side { normal } else { -normal };
    let cos_theta = wo.dot(n).min(1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let cannot_refract = eta * sin_theta > 1.0;
    let wi = if cannot_refract || schlick_reflectance(cos_theta, eta) > uniform01(rng) {
        mirror_outgoing(wo, n)
    } else {
        refract_outgoing(wo, n, eta)
    };
    (wi.normalized(), 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn phong_scatter_samples_stay_above_the_hemisphere() {
        let mat = Material::Phong {
            kd: Vec3::new(0.6, 0.6, 0.6),
            ks: Vec3::new(0.2, 0.2, 0.2),
            ns: 32.0,
            emissive: None,
            texture: None,
        };
        let normal = Vec3::new(0.0, 1.0, 0.0);
        let wo = Vec3::new(0.3, 0.8, 0.1).normalized();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..1000 {
            if let Some((wi, pdf)) = mat.scatter(wo, normal, Vec2::zero(), &mut rng) {
                assert!(wi.dot(normal) > 0.0);
                assert!(pdf > 0.0);
            }
        }
    }

    #[test]
    fn phong_pdf_matches_scatter_pdf_for_the_same_direction() {
        let mat = Material::Phong {
            kd: Vec3::new(0.6, 0.6, 0.6),
            ks: Vec3::new(0.2, 0.2, 0.2),
            ns: 16.0,
            emissive: None,
            texture: None,
        };
        let normal = Vec3::new(0.0, 1.0, 0.0);
        let wo = Vec3::new(0.0, 1.0, 0.0);
        let wi = Vec3::new(0.2, 0.9, 0.1).normalized();
        let pdf_direct = mat.pdf(wo, normal, wi, Vec2::zero());
        assert!(pdf_direct > 0.0);
    }

    #[test]
    fn textured_phong_pdf_uses_the_same_diffuse_split_as_scatter() {
        use image::RgbImage;
        use crate::texture::Texture;

        // An all-black texture replaces kd with zero, so the diffuse lobe
        // should vanish entirely from both scatter's split and pdf's.
        let mut img = RgbImage::new(1, 1);
        img.put_pixel(0, 0, image::Rgb([0, 0, 0]));
        let mat = Material::Phong {
            kd: Vec3::new(0.9, 0.9, 0.9),
            ks: Vec3::new(0.2, 0.2, 0.2),
            ns: 16.0,
            emissive: None,
            texture: Some(Texture::from_image(&img)),
        };
        let normal = Vec3::new(0.0, 1.0, 0.0);
        let wo = Vec3::new(0.0, 1.0, 0.0);
        let uv = Vec2::new(0.5, 0.5);

        // With kd replaced by black, a direction straight off the normal
        // (where the specular lobe's cosine power collapses to its peak)
        // should match the pure-specular density: p_diffuse is 0.
        let wi = mirror_outgoing(wo, normal);
        let expected = pdf_specular(wo, normal, wi, 16.0);
        assert!((mat.pdf(wo, normal, wi, uv) - expected).abs() < 1e-5);

        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..100 {
            let (wi, pdf) = mat.scatter(wo, normal, uv, &mut rng).unwrap();
            assert!((mat.pdf(wo, normal, wi, uv) - pdf).abs() < 1e-5);
        }
    }

    #[test]
    fn glass_scatter_pdf_is_always_one() {
        let mat = Material::Glass { ior: 1.5 };
        let normal = Vec3::new(0.0, 1.0, 0.0);
        let wo = Vec3::new(0.1, 0.9, 0.0).normalized();
        let mut rng = SmallRng::seed_from_u64(3);
        let (_, pdf) = mat.scatter(wo, normal, Vec2::zero(), &mut rng).unwrap();
        assert_eq!(pdf, 1.0);
    }

    #[test]
    fn light_kind_reports_its_radiance() {
        let mat = Material::Phong {
            kd: Vec3::zero(),
            ks: Vec3::zero(),
            ns: 1.0,
            emissive: Some(Vec3::new(5.0, 5.0, 5.0)),
            texture: None,
        };
        match mat.kind() {
            MaterialKind::Light(ke) => assert_eq!(ke, Vec3::new(5.0, 5.0, 5.0)),
            _ => panic!("expected Light kind"),
        }
    }
}
