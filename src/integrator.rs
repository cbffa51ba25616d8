use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::accumulator::Accumulator;
use crate::material::{Material, MaterialKind};
use crate::math::{Color, Vec2, Vec3};
use crate::ray::Ray;
use crate::rng::uniform01;
use crate::scene::Scene;
use crate::triangle::HIT_EPS;

/// Render-time tunables: resolution, sample count, and the Russian-
/// roulette-eligible bounce cap.
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    pub max_bounces: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 300,
            samples_per_pixel: 30,
            max_bounces: 12,
        }
    }
}

/// The Russian-roulette threshold bounce count — survival probability
/// kicks in only once a path has accumulated this many bounces.
const ROULETTE_MIN_BOUNCE: u32 = 3;

/// Power heuristic weight for multiple importance sampling: w(a,b) =
/// a² / (a² + b²). Symmetric in the sense that `power_heuristic(a,b) +
/// power_heuristic(b,a) == 1` whenever at least one of a, b is positive.
pub fn power_heuristic(a: f32, b: f32) -> f32 {
    if a <= 0.0 {
        return 0.0;
    }
    let a2 = a * a;
    let b2 = b * b;
    a2 / (a2 + b2)
}

/// The unidirectional path tracer: next-event estimation with multiple
/// importance sampling against the scene's light, one material bounce at a
/// time, Russian-roulette termination past a minimum bounce count.
pub struct PathTracer<'a> {
    pub scene: &'a Scene,
    pub config: &'a RenderConfig,
}

impl<'a> PathTracer<'a> {
    /// Renders `spp` additional samples per pixel, adding each pixel's raw
    /// (un-normalized) radiance sum into `acc`. Called repeatedly in small
    /// batches so the caller can snapshot a progressively-refining preview;
    /// `acc`'s own running sum is what makes batches composable — the
    /// caller just needs to track the cumulative sample count for
    /// `Accumulator::snapshot`. Rows are distributed across a `rayon`
    /// work-stealing pool; each row seeds its own `SmallRng` so no two
    /// threads ever touch the same generator state.
    pub fn render(&self, acc: &mut Accumulator, spp: u32) {
        let w = self.config.width;
        let h = self.config.height;

        let row_base_seed: u64 = rand::random();
        let rows: Vec<Vec<Color>> = (0..h)
            .into_par_iter()
            .map(|y| {
                let mut rng = SmallRng::seed_from_u64(row_base_seed ^ (y as u64).wrapping_mul(0x9E3779B97F4A7C15));
                let mut row = vec![Color::zero(); w as usize];
                for x in 0..w {
                    let mut pixel = Color::zero();
                    for _ in 0..spp {
                        let ray = self.scene.camera.cast_ray(x, y, &mut rng);
                        let sample = self.trace(ray, &mut rng);
                        if sample.is_finite() {
                            pixel += sample;
                        } else {
                            tracing::debug!(x, y, "dropped non-finite radiance sample");
                        }
                    }
                    row[x as usize] = pixel;
                }
                row
            })
            .collect();

        for (y, row) in rows.into_iter().enumerate() {
            for (x, color) in row.into_iter().enumerate() {
                acc.add_sample(x as u32, y as u32, color);
            }
        }
    }

    /// Traces a single camera ray to completion, returning its contribution
    /// to the pixel (not yet divided by the sample count).
    fn trace(&self, mut ray: Ray, rng: &mut SmallRng) -> Color {
        let mut color = Color::zero();
        let mut throughput = Color::ones();
        let mut emissive_flag = true;
        let mut bounce = 0u32;

        loop {
            if bounce >= self.config.max_bounces {
                break;
            }
            let Some(hit) = self.scene.hit(&ray, HIT_EPS, f32::INFINITY) else {
                break;
            };
            let material = &self.scene.materials[hit.mat as usize];
            let wo = -ray.direction;

            match material.kind() {
                MaterialKind::Light(ke) => {
                    if emissive_flag && ray.direction.dot(hit.normal) < 0.0 {
                        color += throughput.hadamard(ke);
                    }
                    break;
                }
                MaterialKind::Glass => {
                    let (wi, _pdf) = material
                        .scatter(wo, hit.normal, hit.uv, rng)
                        .expect("glass scatter always produces a direction");
                    let f = material.bsdf(wo, wi, hit.normal, hit.uv);
                    throughput = throughput.hadamard(f);
                    emissive_flag = true;
                    ray = Ray::new(hit.p, wi);
                }
                MaterialKind::Phong => {
                    emissive_flag = false;
                    let n = if hit.normal.dot(wo) > 0.0 {
                        hit.normal
                    } else {
                        -hit.normal
                    };
                    color += throughput.hadamard(self.sample_light(hit.p, n, wo, material, hit.uv, rng));

                    match material.scatter(wo, n, hit.uv, rng) {
                        Some((wi, pdf)) if wi.dot(n) > 0.0 && pdf > 0.0 => {
                            let f = material.bsdf(wo, wi, n, hit.uv);
                            throughput = throughput.hadamard(f) * (wi.dot(n) / pdf);
                            ray = Ray::new(hit.p, wi);
                        }
                        _ => break,
                    }
                }
            }

            if bounce >= ROULETTE_MIN_BOUNCE {
                let q = throughput.max_component().min(1.0);
                if q <= 0.0 {
                    break;
                }
                if uniform01(rng) < q {
                    throughput /= q;
                } else {
                    break;
                }
            }
            bounce += 1;
        }

        color
    }

    /// Next-event estimation with MIS: one sample toward a uniformly chosen
    /// light, one sample along the material's own scatter distribution,
    /// combined with the power heuristic. `p`/`n` are the shading point and
    /// its normal already oriented to face `wo`.
    fn sample_light(
        &self,
        p: Vec3,
        n: Vec3,
        wo: Vec3,
        material: &Material,
        uv: Vec2,
        rng: &mut SmallRng,
    ) -> Color {
        let mut color = Color::zero();

        if let Some((wi, light_pdf, ke)) =
            self.scene
                .lights
                .sample_ray(&self.scene.triangles, &self.scene.materials, &self.scene.bvh, p, n, rng)
        {
            let bsdf_pdf = material.pdf(wo, n, wi, uv);
            if bsdf_pdf > 0.0 {
                let f = material.bsdf(wo, wi, n, uv);
                let w = power_heuristic(light_pdf, bsdf_pdf);
                color += ke.hadamard(f) * (n.dot(wi) * w / light_pdf);
            }
        }

        if let Some((wi, bsdf_pdf)) = material.scatter(wo, n, uv, rng) {
            if bsdf_pdf > 0.0 {
                let ray = Ray::new(p, wi);
                if let Some((light_pdf, ke)) =
                    self.scene
                        .lights
                        .pdf(&self.scene.triangles, &self.scene.materials, &self.scene.bvh, &ray)
                {
                    if light_pdf > 0.0 {
                        let f = material.bsdf(wo, wi, n, uv);
                        let w = power_heuristic(bsdf_pdf, light_pdf);
                        color += ke.hadamard(f) * (n.dot(wi) * w / bsdf_pdf);
                    }
                }
            }
        }

        color
    }
}
