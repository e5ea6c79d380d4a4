use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading scene resources. Always fatal for scene construction.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to load texture '{}': {source}", path.display())]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to load OBJ '{}': {source}", path.display())]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("OBJ '{}' contains no triangles", path.display())]
    EmptyMesh { path: PathBuf },
}
