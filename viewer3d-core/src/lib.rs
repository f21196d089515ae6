/// viewer3d core library - scene state for a build-volume viewer
///
/// This library holds everything that does not need a GPU: STL loading,
/// mesh connectivity and splitting, the element registry, selection,
/// transforms, keyboard actions, settings and camera placement. Drawing is
/// delegated to a [`backend::RenderBackend`].

pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod grouping;
pub mod keyboard;
pub mod material;
pub mod projection;
pub mod scene;
pub mod stl;
pub mod transform;
pub mod vertex_key;

// Re-export commonly used types
pub use backend::{HeadlessBackend, RenderBackend, RenderHandle, Renderable};
pub use config::{ViewerSettings, VolumeSize};
pub use error::{SceneError, SceneResult, StlError};
pub use events::SceneEvent;
pub use geometry::{Face, MeshGeometry, Triangle};
pub use grouping::{group_faces, group_faces_union_find, FaceGroup};
pub use keyboard::{Key, KeyboardController, KeyboardNotice};
pub use material::Color;
pub use projection::{Camera, View};
pub use scene::{ElementKind, MeshEntity, MeshId, Scene, SceneElement, SetOptions, SplitOutcome};
pub use transform::{Axis, Operation, Transform, TransformAction, TransformTarget};
pub use vertex_key::VertexKey;
