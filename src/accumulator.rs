use image::RgbImage;

use crate::math::Color;

/// Constant gamma for the final tonemap.
pub const GAMMA: f32 = 2.0;

/// A running-sum radiance buffer. Samples accumulate in linear HDR space;
/// conversion to a displayable image (divide by sample count, clamp,
/// gamma) only happens at snapshot/finalize time, so intermediate
/// snapshots are cheap and don't perturb the accumulated state.
pub struct Accumulator {
    width: u32,
    height: u32,
    sums: Vec<Color>,
}

impl Accumulator {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            sums: vec![Color::zero(); (width * height) as usize],
        }
    }

    /// Adds a radiance contribution to pixel (x, y) — either a single
    /// sample or the raw sum of several, left to the caller to track
    /// against the sample count passed to `snapshot`. Non-finite
    /// contributions (NaN/inf from a degenerate pdf division) are dropped
    /// rather than poisoning the whole pixel.
    #[inline]
    pub fn add_sample(&mut self, x: u32, y: u32, color: Color) {
        if !color.is_finite() {
            tracing::debug!(x, y, "dropped non-finite radiance sample");
            return;
        }
        self.sums[(y * self.width + x) as usize] += color;
    }

    /// Renders the current accumulated state as an 8-bit RGB image, dividing
    /// by `n_samples`, clamping to [0,1], and applying the fixed gamma.
    /// Negative radiance is a programming error, not a valid physical state:
    /// it's logged and `debug_assert!`-checked rather than silently clamped
    /// away, so debug builds fail loudly while release builds still degrade
    /// to a clamped pixel instead of propagating NaN/garbage downstream.
    pub fn snapshot(&self, n_samples: u32) -> RgbImage {
        let mut img = RgbImage::new(self.width, self.height);
        let inv_n = 1.0 / n_samples.max(1) as f32;
        for y in 0..self.height {
            for x in 0..self.width {
                let raw = self.sums[(y * self.width + x) as usize] * inv_n;
                if raw.x < 0.0 || raw.y < 0.0 || raw.z < 0.0 {
                    tracing::debug!(x, y, ?raw, "negative radiance in accumulator");
                }
                debug_assert!(
                    raw.x >= 0.0 && raw.y >= 0.0 && raw.z >= 0.0,
                    "negative radiance at ({x}, {y}): {raw:?}"
                );
                let tone = raw.saturate().gamma_correct(GAMMA);
                img.put_pixel(x, y, image::Rgb(tone.to_rgb8()));
            }
        }
        img
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_divides_by_sample_count() {
        let mut acc = Accumulator::new(1, 1);
        acc.add_sample(0, 0, Color::new(2.0, 2.0, 2.0));
        acc.add_sample(0, 0, Color::new(2.0, 2.0, 2.0));
        let img = acc.snapshot(2);
        // raw average is 2.0, clamped to 1.0, gamma(1.0)=1.0 -> full white.
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn non_finite_samples_are_dropped() {
        let mut acc = Accumulator::new(1, 1);
        acc.add_sample(0, 0, Color::new(f32::NAN, 0.0, 0.0));
        acc.add_sample(0, 0, Color::new(0.5, 0.5, 0.5));
        let img = acc.snapshot(1);
        assert!(img.get_pixel(0, 0).0[0] > 0);
    }

    #[test]
    #[should_panic(expected = "negative radiance")]
    #[cfg(debug_assertions)]
    fn snapshot_asserts_on_negative_radiance() {
        let mut acc = Accumulator::new(1, 1);
        // `add_sample` is finite-only, not sign-only — a negative but
        // finite value (e.g. from a buggy bsdf) must still reach the
        // debug_assert in `snapshot`.
        acc.add_sample(0, 0, Color::new(-1.0, 0.0, 0.0));
        let _ = acc.snapshot(1);
    }
}
