use crate::bvh::Bvh;
use crate::camera::Camera;
use crate::light::EmissiveGroup;
use crate::material::{Material, MaterialKind};
use crate::ray::{HitRecord, Ray};
use crate::triangle::Triangle;

/// Owns every piece of world state needed for the duration of a render:
/// the flat triangle arena, the material table triangles index into, the
/// BVH built over that arena, the set of emissive triangles for next-event
/// estimation, and the camera.
pub struct Scene {
    pub triangles: Vec<Triangle>,
    pub materials: Vec<Material>,
    pub bvh: Bvh,
    pub lights: EmissiveGroup,
    pub camera: Camera,
}

impl Scene {
    pub fn new(triangles: Vec<Triangle>, materials: Vec<Material>, camera: Camera) -> Self {
        let bvh = Bvh::build(&triangles);
        let emissive_prims = triangles
            .iter()
            .enumerate()
            .filter(|(_, tri)| matches!(materials[tri.mat as usize].kind(), MaterialKind::Light(_)))
            .map(|(i, _)| i as u32)
            .collect();
        let lights = EmissiveGroup::new(emissive_prims);
        Self {
            triangles,
            materials,
            bvh,
            lights,
            camera,
        }
    }

    pub fn hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<HitRecord> {
        self.bvh.hit(&self.triangles, ray, t_min, t_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraConfig;
    use crate::math::{Point3, Vec3};

    #[test]
    fn scene_classifies_emissive_triangles_as_lights() {
        let light_tri = Triangle::new(
            Point3::new(-1.0, 2.0, -1.0),
            Point3::new(1.0, 2.0, -1.0),
            Point3::new(0.0, 2.0, 1.0),
            0,
        );
        let floor_tri = Triangle::new(
            Point3::new(-5.0, 0.0, -5.0),
            Point3::new(5.0, 0.0, -5.0),
            Point3::new(0.0, 0.0, 5.0),
            1,
        );
        let materials = vec![
            Material::Phong {
                kd: Vec3::zero(),
                ks: Vec3::zero(),
                ns: 1.0,
                emissive: Some(Vec3::new(3.0, 3.0, 3.0)),
                texture: None,
            },
            Material::Phong {
                kd: Vec3::new(0.8, 0.8, 0.8),
                ks: Vec3::zero(),
                ns: 1.0,
                emissive: None,
                texture: None,
            },
        ];
        let camera = Camera::new(&CameraConfig::default());
        let scene = Scene::new(vec![light_tri, floor_tri], materials, camera);
        assert!(!scene.lights.is_empty());
    }

    #[test]
    fn an_empty_mesh_builds_a_scene_whose_rays_always_miss() {
        let camera = Camera::new(&CameraConfig::default());
        let scene = Scene::new(Vec::new(), Vec::new(), camera);
        assert!(scene.lights.is_empty());
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(scene.hit(&ray, 0.0, f32::INFINITY).is_none());
    }
}
