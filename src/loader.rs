use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::camera::CameraConfig;
use crate::error::SceneError;
use crate::material::Material;
use crate::math::{Point3, Vec2, Vec3};
use crate::texture::Texture;
use crate::triangle::Triangle;

/// The `<inputname>.toml` sidecar: camera parameters plus the mapping from
/// material name to emitted radiance.
#[derive(Debug, Deserialize)]
pub struct SceneConfig {
    pub camera: CameraConfigToml,
    #[serde(default)]
    pub lights: HashMap<String, [f32; 3]>,
}

#[derive(Debug, Deserialize)]
pub struct CameraConfigToml {
    pub eye: [f32; 3],
    pub lookat: [f32; 3],
    #[serde(default = "default_up")]
    pub up: [f32; 3],
    pub fovy: f32,
    pub width: u32,
    pub height: u32,
}

fn default_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

fn vec3_of(a: [f32; 3]) -> Vec3 {
    Vec3::new(a[0], a[1], a[2])
}

impl SceneConfig {
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| SceneError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn camera_config(&self) -> CameraConfig {
        CameraConfig {
            eye: vec3_of(self.camera.eye),
            look_at: vec3_of(self.camera.lookat),
            up: vec3_of(self.camera.up),
            fovy_degrees: self.camera.fovy,
            width: self.camera.width,
            height: self.camera.height,
        }
    }
}

/// Loads an OBJ/MTL mesh pair via `tobj`, rejecting non-triangulated faces,
/// and builds the `Material` table from each `tobj::Material`'s
/// diffuse/specular/shininess/optical_density fields plus the config's
/// emissive declarations.
pub fn load_mesh(
    obj_path: &Path,
    lights: &HashMap<String, [f32; 3]>,
) -> Result<(Vec<Triangle>, Vec<Material>), SceneError> {
    let load_options = tobj::LoadOptions {
        triangulate: false,
        single_index: true,
        ignore_lines: true,
        ignore_points: true,
    };
    let (models, materials_result) =
        tobj::load_obj(obj_path, &load_options).map_err(|source| SceneError::Obj {
            path: obj_path.to_path_buf(),
            source,
        })?;
    let tobj_materials = materials_result.map_err(|source| SceneError::Obj {
        path: obj_path.to_path_buf(),
        source,
    })?;
    if tobj_materials.is_empty() {
        return Err(SceneError::MissingMaterials {
            path: obj_path.to_path_buf(),
        });
    }

    let base_dir = obj_path.parent().unwrap_or_else(|| Path::new("."));
    let materials = tobj_materials
        .iter()
        .map(|m| build_material(m, lights, base_dir))
        .collect::<Result<Vec<_>, _>>()?;

    let mut triangles = Vec::new();
    for model in &models {
        let mesh = &model.mesh;
        let mat_index = mesh.material_id.unwrap_or(0) as u32;
        if mat_index as usize >= materials.len() {
            return Err(SceneError::MaterialIndexOutOfRange {
                shape: model.name.clone(),
                index: mat_index as usize,
                len: materials.len(),
            });
        }

        // `face_arities` is empty both when every face happens to already be
        // a triangle and when the load used `triangulate: true`; either way
        // that means "3 indices per face" uniformly across the mesh.
        let arities: Vec<u32> = if mesh.face_arities.is_empty() {
            vec![3; mesh.indices.len() / 3]
        } else {
            mesh.face_arities.clone()
        };

        let mut offset = 0usize;
        for (face, &fv) in arities.iter().enumerate() {
            if fv != 3 {
                return Err(SceneError::NonTriangulatedFace {
                    shape: model.name.clone(),
                    face,
                    vertex_count: fv as usize,
                });
            }
            let idx = [
                mesh.indices[offset] as usize,
                mesh.indices[offset + 1] as usize,
                mesh.indices[offset + 2] as usize,
            ];
            let p: Vec<Point3> = idx
                .iter()
                .map(|&i| {
                    Point3::new(
                        mesh.positions[3 * i],
                        mesh.positions[3 * i + 1],
                        mesh.positions[3 * i + 2],
                    )
                })
                .collect();
            let has_uv = !mesh.texcoords.is_empty();
            let uv: Vec<Vec2> = idx
                .iter()
                .map(|&i| {
                    if has_uv {
                        Vec2::new(mesh.texcoords[2 * i], mesh.texcoords[2 * i + 1])
                    } else {
                        Vec2::zero()
                    }
                })
                .collect();
            let normal_hint = if !mesh.normals.is_empty() {
                let n0 = Vec3::new(
                    mesh.normals[3 * idx[0]],
                    mesh.normals[3 * idx[0] + 1],
                    mesh.normals[3 * idx[0] + 2],
                );
                Some(n0)
            } else {
                None
            };

            triangles.push(Triangle::with_normal_hint(
                p[0], p[1], p[2], uv[0], uv[1], uv[2], has_uv, normal_hint, mat_index,
            ));
            offset += 3;
        }
    }

    Ok((triangles, materials))
}

fn build_material(
    m: &tobj::Material,
    lights: &HashMap<String, [f32; 3]>,
    base_dir: &Path,
) -> Result<Material, SceneError> {
    let ior = m.optical_density.unwrap_or(1.0);
    if ior > 1.0 {
        return Ok(Material::Glass { ior });
    }

    let kd = m.diffuse.map(Vec3::from).unwrap_or_else(Vec3::zero);
    let ks = m.specular.map(Vec3::from).unwrap_or_else(Vec3::zero);
    let ns = m.shininess.unwrap_or(1.0);
    let emissive = lights.get(&m.name).map(|&rgb| Vec3::from(rgb));

    let texture = match &m.diffuse_texture {
        Some(tex_path) => {
            let full_path = base_dir.join(tex_path);
            let decoded = image::open(&full_path).map_err(|source| SceneError::Image {
                path: full_path.clone(),
                source,
            })?;
            let channels = decoded.color().channel_count();
            if channels != 3 {
                return Err(SceneError::TextureChannels {
                    path: full_path,
                    channels,
                });
            }
            Some(Texture::from_image(&decoded.to_rgb8()))
        }
        None => None,
    };

    Ok(Material::Phong {
        kd,
        ks,
        ns,
        emissive,
        texture,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material_with_texture(name: &str) -> tobj::Material {
        tobj::Material {
            name: "m".to_string(),
            diffuse_texture: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn a_grayscale_diffuse_texture_is_a_fatal_error() {
        let dir = std::env::temp_dir().join(format!("photon-tracer-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("gray.png");
        image::GrayImage::new(4, 4).save(&path).unwrap();

        let result = build_material(&material_with_texture("gray.png"), &HashMap::new(), &dir);
        assert!(matches!(result, Err(SceneError::TextureChannels { channels: 1, .. })));

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(&dir).ok();
    }

    #[test]
    fn an_rgb_diffuse_texture_loads_successfully() {
        let dir = std::env::temp_dir().join(format!("photon-tracer-test-rgb-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rgb.png");
        image::RgbImage::new(4, 4).save(&path).unwrap();

        let result = build_material(&material_with_texture("rgb.png"), &HashMap::new(), &dir);
        assert!(result.is_ok());

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(&dir).ok();
    }
}
