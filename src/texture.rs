use image::RgbImage;

use crate::math::{Vec2, Vec3};

/// A decoded RGB texture sampled by wrap-around nearest-neighbor lookup,
/// with the v coordinate flipped to match the image's top-to-bottom row
/// order against the OBJ/MTL convention of v increasing upward.
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<Vec3>,
}

impl Texture {
    pub fn from_image(img: &RgbImage) -> Self {
        let width = img.width();
        let height = img.height();
        let pixels = img
            .pixels()
            .map(|p| {
                Vec3::new(
                    p.0[0] as f32 / 255.0,
                    p.0[1] as f32 / 255.0,
                    p.0[2] as f32 / 255.0,
                )
            })
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn at(&self, x: u32, y: u32) -> Vec3 {
        let x = x % self.width;
        let y = y % self.height;
        self.pixels[(y * self.width + x) as usize]
    }

    /// Samples at texture coordinate `uv`, wrapping both axes and flipping v
    /// so that v=0 maps to the bottom row of the source image.
    pub fn sample(&self, uv: Vec2) -> Vec3 {
        let u = uv.x.rem_euclid(1.0);
        let v = uv.y.rem_euclid(1.0);
        let x = ((u * self.width as f32) as i64).rem_euclid(self.width as i64) as u32;
        let y = (((1.0 - v) * self.height as f32) as i64).rem_euclid(self.height as i64) as u32;
        self.at(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_wraps_around_both_axes() {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(1, 0, image::Rgb([0, 255, 0]));
        img.put_pixel(0, 1, image::Rgb([0, 0, 255]));
        img.put_pixel(1, 1, image::Rgb([255, 255, 0]));
        let tex = Texture::from_image(&img);

        let in_range = tex.sample(Vec2::new(0.25, 0.75));
        let wrapped = tex.sample(Vec2::new(1.25, -0.25));
        assert_eq!(in_range, wrapped);
    }
}
