use rand::Rng;

use crate::math::{Point3, Vec3};
use crate::ray::Ray;
use crate::rng::uniform_range;

/// Configuration for the pinhole camera: eye position, look-at target, up
/// vector, vertical field of view in degrees, and the output resolution
/// (the aspect ratio is derived from width/height, not supplied separately).
pub struct CameraConfig {
    pub eye: Point3,
    pub look_at: Point3,
    pub up: Vec3,
    pub fovy_degrees: f32,
    pub width: u32,
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Point3::new(0.0, 1.0, 3.0),
            look_at: Point3::zero(),
            up: Vec3::unit_y(),
            fovy_degrees: 40.0,
            width: 400,
            height: 300,
        }
    }
}

/// A thin-lens-free pinhole camera. The image plane's top-left corner and
/// the per-pixel world-space deltas across it are cached at construction
/// time, so casting a ray is a handful of multiply-adds rather than a
/// fresh basis reconstruction per sample.
pub struct Camera {
    eye: Point3,
    left_top_corner: Point3,
    dw: Vec3,
    dh: Vec3,
}

impl Camera {
    /// Builds the camera basis the same way as a `lookAt` matrix inverse:
    ///   forward = normalize(look_at - eye)
    ///   right   = normalize(forward × up)
    ///   true_up = right × forward
    /// then caches the world-space top-left image-plane corner one unit
    /// ahead of the eye along `forward`, plus the per-column/per-row deltas
    /// across the plane.
    pub fn new(config: &CameraConfig) -> Self {
        let aspect = config.width as f32 / config.height as f32;
        let y_len = 2.0 * (config.fovy_degrees.to_radians() * 0.5).tan();
        let x_len = y_len * aspect;

        let forward = (config.look_at - config.eye).normalized();
        let right = forward.cross(config.up).normalized();
        let true_up = right.cross(forward);

        let left_top_corner =
            config.eye + forward - right * (x_len / 2.0) + true_up * (y_len / 2.0);
        let right_top_corner =
            config.eye + forward + right * (x_len / 2.0) + true_up * (y_len / 2.0);
        let left_bottom_corner =
            config.eye + forward - right * (x_len / 2.0) - true_up * (y_len / 2.0);

        let dw = (right_top_corner - left_top_corner) / config.width as f32;
        let dh = (left_bottom_corner - left_top_corner) / config.height as f32;

        Self {
            eye: config.eye,
            left_top_corner,
            dw,
            dh,
        }
    }

    /// Casts a jittered primary ray through pixel (x, y). The jitter is
    /// drawn fresh per call so repeated samples of the same pixel cover its
    /// footprint rather than retracing the same ray.
    pub fn cast_ray<R: Rng + ?Sized>(&self, x: u32, y: u32, rng: &mut R) -> Ray {
        let jx = x as f32 + uniform_range(rng, -0.5, 0.5);
        let jy = y as f32 + uniform_range(rng, -0.5, 0.5);
        let target = self.left_top_corner + self.dw * jx + self.dh * jy;
        Ray::new(self.eye, target - self.eye)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn centered_ray_points_roughly_toward_look_at() {
        let config = CameraConfig {
            eye: Point3::new(0.0, 0.0, 5.0),
            look_at: Point3::zero(),
            up: Vec3::unit_y(),
            fovy_degrees: 40.0,
            width: 100,
            height: 100,
        };
        let cam = Camera::new(&config);
        let mut rng = SmallRng::seed_from_u64(0);
        let ray = cam.cast_ray(50, 50, &mut rng);
        assert!(ray.direction.z < -0.9);
    }
}
