//! Thread-local uniform float source. Every worker thread gets its own
//! `SmallRng` stream (seeded independently per row by the integrator), so
//! sampling never contends across threads and never shares mutable state.

use rand::Rng;

/// Draws a uniform float in `[0, 1)`.
#[inline(always)]
pub fn uniform01<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>()
}

/// Draws a uniform float in `[a, b)`.
#[inline(always)]
pub fn uniform_range<R: Rng + ?Sized>(rng: &mut R, a: f32, b: f32) -> f32 {
    a + (b - a) * uniform01(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn uniform01_stays_in_range() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let x = uniform01(&mut rng);
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn uniform_range_stays_within_bounds() {
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..10_000 {
            let x = uniform_range(&mut rng, -2.0, 5.0);
            assert!((-2.0..5.0).contains(&x));
        }
    }
}
