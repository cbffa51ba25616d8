use std::path::PathBuf;

use thiserror::Error;

/// Fatal, non-retryable failures from scene ingestion: malformed or missing
/// input files.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load mesh {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("failed to parse scene config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to decode texture {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("texture {path} has {channels} channels, expected 3 (RGB)")]
    TextureChannels { path: PathBuf, channels: u8 },

    #[error("face {face} of shape \"{shape}\" is not triangulated ({vertex_count} vertices)")]
    NonTriangulatedFace {
        shape: String,
        face: usize,
        vertex_count: usize,
    },

    #[error("material index {index} referenced by shape \"{shape}\" is out of range (have {len})")]
    MaterialIndexOutOfRange {
        shape: String,
        index: usize,
        len: usize,
    },

    #[error("mesh {path} has no associated materials")]
    MissingMaterials { path: PathBuf },
}
