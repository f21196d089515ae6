//! The seam between the scene core and a rendering library.
//!
//! The scene decides *what* exists; a [`RenderBackend`] owns the GPU-side
//! resources behind each element and draws the registry on request.

use std::collections::BTreeSet;

use crate::geometry::MeshGeometry;
use crate::material::{Color, MaterialColor, MaterialSettings};
use crate::scene::{ElementKind, ElementRegistry, InputBinding};

/// Opaque id of renderer-side resources (geometry, material, helper objects).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderHandle(pub u64);

/// What the backend hands back for a new mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderable {
    pub handle: RenderHandle,
    /// Resolved material colour (random materials get one assigned here).
    pub color: Color,
}

pub trait RenderBackend {
    /// Instantiate renderable resources for mesh geometry with a material.
    fn create_mesh(&mut self, geometry: &MeshGeometry, material: &MaterialSettings) -> Renderable;

    /// Instantiate a built-in helper (light, floor, grid, ...).
    fn create_helper(&mut self, name: &str, kind: &ElementKind) -> RenderHandle;

    /// Replace the geometry behind an existing handle.
    fn update_geometry(&mut self, handle: RenderHandle, geometry: &MeshGeometry);

    /// Release every resource behind `handle`.
    fn dispose(&mut self, handle: RenderHandle);

    fn bind_events(&mut self, _handle: RenderHandle, _bindings: &[InputBinding]) {}

    fn unbind_events(&mut self, _handle: RenderHandle) {}

    /// Draw the current scene.
    fn render(&mut self, elements: &ElementRegistry);
}

/// Colours handed out, in turn, to meshes with a random material.
pub const PALETTE: [Color; 8] = [
    Color(0x4e79a7),
    Color(0xf28e2b),
    Color(0x59a14f),
    Color(0xedc948),
    Color(0xb07aa1),
    Color(0x76b7b2),
    Color(0xff9da7),
    Color(0x9c755f),
];

/// A backend with no GPU: it tracks handle lifetimes and render requests.
///
/// Random material colours cycle through [`PALETTE`], so runs are
/// reproducible.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_handle: u64,
    palette_cursor: usize,
    live: BTreeSet<RenderHandle>,
    bound: BTreeSet<RenderHandle>,
    disposed: Vec<RenderHandle>,
    geometry_updates: usize,
    renders: usize,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> RenderHandle {
        let handle = RenderHandle(self.next_handle);
        self.next_handle += 1;
        self.live.insert(handle);
        handle
    }

    pub fn is_live(&self, handle: RenderHandle) -> bool {
        self.live.contains(&handle)
    }

    pub fn is_bound(&self, handle: RenderHandle) -> bool {
        self.bound.contains(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Handles released so far, in release order.
    pub fn disposed(&self) -> &[RenderHandle] {
        &self.disposed
    }

    pub fn geometry_updates(&self) -> usize {
        self.geometry_updates
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_mesh(&mut self, _geometry: &MeshGeometry, material: &MaterialSettings) -> Renderable {
        let color = match material.color {
            MaterialColor::Fixed(color) => color,
            MaterialColor::Random => {
                let color = PALETTE[self.palette_cursor % PALETTE.len()];
                self.palette_cursor += 1;
                color
            }
        };
        Renderable {
            handle: self.allocate(),
            color,
        }
    }

    fn create_helper(&mut self, _name: &str, _kind: &ElementKind) -> RenderHandle {
        self.allocate()
    }

    fn update_geometry(&mut self, _handle: RenderHandle, _geometry: &MeshGeometry) {
        self.geometry_updates += 1;
    }

    fn dispose(&mut self, handle: RenderHandle) {
        if self.live.remove(&handle) {
            self.disposed.push(handle);
        }
    }

    fn bind_events(&mut self, handle: RenderHandle, bindings: &[InputBinding]) {
        if !bindings.is_empty() {
            self.bound.insert(handle);
        }
    }

    fn unbind_events(&mut self, handle: RenderHandle) {
        self.bound.remove(&handle);
    }

    fn render(&mut self, _elements: &ElementRegistry) {
        self.renders += 1;
    }
}
