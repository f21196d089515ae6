//! Scene elements: built-in helpers and user meshes.

use std::fmt;

use nalgebra::{Point3, Vector3};

use crate::backend::RenderHandle;
use crate::geometry::MeshGeometry;
use crate::material::{Color, Material};
use crate::transform::Transform;

/// First draw-order index handed to meshes; built-ins sit below it.
pub const MESH_DRAW_ORDER_START: u64 = 10;

/// Process-unique mesh identifier. Its [`key`](MeshId::key) is the
/// mesh's registry name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u64);

impl MeshId {
    pub fn key(self) -> String {
        format!("mesh-{}", self.0)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        key.strip_prefix("mesh-")?.parse().ok().map(MeshId)
    }
}

impl fmt::Display for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mesh-{}", self.0)
    }
}

/// A user mesh: geometry, material and selection state.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshEntity {
    id: MeshId,
    name: String,
    geometry: MeshGeometry,
    material: Material,
    selected: bool,
}

impl MeshEntity {
    pub fn new(id: MeshId, name: impl Into<String>, geometry: MeshGeometry, material: Material) -> Self {
        Self {
            id,
            name: name.into(),
            geometry,
            material,
            selected: false,
        }
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    /// Display name; may be empty.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> &MeshGeometry {
        &self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut MeshGeometry {
        &mut self.geometry
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn color(&self) -> Color {
        self.material.color()
    }

    pub fn face_count(&self) -> usize {
        self.geometry.face_count()
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn mark_selected(&mut self, selected: bool, highlight: Color) {
        if selected {
            self.material.highlight(highlight);
        } else {
            self.material.restore();
        }
        self.selected = selected;
    }
}

/// What a registered element is.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// Anchor the camera and lights aim at.
    Center,
    AmbientLight {
        color: Color,
    },
    DirectionalLight {
        index: u8,
        color: Color,
        intensity: f32,
        cast_shadow: bool,
        target: Point3<f32>,
    },
    Floor {
        width: f32,
        depth: f32,
        color: Color,
        receive_shadow: bool,
    },
    Grid {
        width: f32,
        depth: f32,
        minor_step: f32,
        major_step: f32,
        minor_color: Color,
        major_color: Color,
    },
    Axes {
        length: Vector3<f32>,
    },
    BuildVolume {
        size: Vector3<f32>,
        color: Color,
        opacity: f32,
    },
    Mesh(MeshEntity),
}

/// Pointer input an element reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputBinding {
    DoubleClick,
}

/// One registry entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneElement {
    pub kind: ElementKind,
    pub transform: Transform,
    pub up: Vector3<f32>,
    pub visible: bool,
    pub render_order: u64,
    pub handle: RenderHandle,
    pub bindings: Vec<InputBinding>,
}

impl SceneElement {
    pub fn new(kind: ElementKind, handle: RenderHandle) -> Self {
        Self {
            kind,
            transform: Transform::identity(),
            up: Vector3::y(),
            visible: true,
            render_order: 0,
            handle,
            bindings: Vec::new(),
        }
    }

    pub fn as_mesh(&self) -> Option<&MeshEntity> {
        match &self.kind {
            ElementKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut MeshEntity> {
        match &mut self.kind {
            ElementKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Meshes carry their display name; built-ins are unnamed.
    pub fn display_name(&self) -> &str {
        self.as_mesh().map(MeshEntity::name).unwrap_or("")
    }

    pub fn reacts_to(&self, binding: InputBinding) -> bool {
        self.bindings.contains(&binding)
    }
}

/// Strictly increasing draw-order counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawOrder {
    next: u64,
}

impl DrawOrder {
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    pub fn next(&mut self) -> u64 {
        let order = self.next;
        self.next += 1;
        order
    }

    /// The index the next call to [`next`](DrawOrder::next) will return.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for DrawOrder {
    fn default() -> Self {
        Self::starting_at(MESH_DRAW_ORDER_START)
    }
}
