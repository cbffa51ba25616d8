use crate::math::{Point3, Vec2, Vec3};

/// Index into the scene's flat triangle arena. Not a pointer or reference —
/// hit records outlive the borrow of the scene that produced them.
pub type PrimIndex = u32;

/// Index into the scene's flat material table.
pub type MatIndex = u32;

/// Parametric ray R(t) = origin + t·direction. `direction` is unit length
/// after construction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vec3,
}

impl Ray {
    #[inline(always)]
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalized(),
        }
    }

    #[inline(always)]
    pub fn at(&self, t: f32) -> Point3 {
        self.origin + self.direction * t
    }
}

/// The result of a successful ray/primitive intersection. `normal` is the
/// primitive's geometric normal, not flipped to face the ray — callers that
/// need a shading-side normal (the integrator, for Phong-kind materials)
/// flip it themselves.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord {
    pub p: Point3,
    pub normal: Vec3,
    pub t: f32,
    pub uv: Vec2,
    pub mat: MatIndex,
    pub obj: PrimIndex,
}
