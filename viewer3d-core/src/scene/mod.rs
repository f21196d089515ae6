//! The scene manager: registry, selection, mesh lifecycle and notifications.
//!
//! All state lives in one [`Scene`] value and every operation runs to
//! completion on the caller's thread. Rendering is delegated to a
//! [`RenderBackend`]; call [`Scene::render`] after a batch of changes.

mod builtins;
mod dispatch;
mod element;
mod registry;
mod selection;
mod split;

pub use builtins::{BuiltIn, BuiltInElement};
pub use element::{
    DrawOrder, ElementKind, InputBinding, MeshEntity, MeshId, SceneElement, MESH_DRAW_ORDER_START,
};
pub use registry::{AxisOverrides, ElementRegistry, SetOptions};
pub use selection::Selection;
pub use split::SplitOutcome;

use nalgebra::Point3;

use crate::backend::RenderBackend;
use crate::config::{VolumeSize, ViewerSettings, DEFAULT_MATERIAL};
use crate::error::{SceneError, SceneResult};
use crate::events::{EventBus, SceneEvent};
use crate::geometry::{MeshGeometry, Triangle};
use crate::material::Material;

pub struct Scene<B: RenderBackend> {
    settings: ViewerSettings,
    backend: B,
    registry: ElementRegistry,
    selection: Selection,
    draw_order: DrawOrder,
    next_mesh_id: u64,
    events: EventBus,
}

impl<B: RenderBackend> Scene<B> {
    /// Create a scene and install the built-in elements the settings enable.
    pub fn new(settings: ViewerSettings, backend: B) -> SceneResult<Self> {
        let mut scene = Self {
            settings,
            backend,
            registry: ElementRegistry::new(),
            selection: Selection::default(),
            draw_order: DrawOrder::default(),
            next_mesh_id: 0,
            events: EventBus::new(),
        };

        scene.set_center(None, None, None)?;
        for builtin in BuiltIn::ALL {
            if builtin != BuiltIn::Center && builtin.enabled(&scene.settings) {
                scene.install_builtin(builtin, false)?;
            }
        }
        Ok(scene)
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The index the next added or (de)selected mesh will be drawn at.
    pub fn next_draw_order(&self) -> u64 {
        self.draw_order.peek()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&SceneEvent<'_>) + 'static) {
        self.events.subscribe(listener);
    }

    /// Ask the backend to draw the current state.
    pub fn render(&mut self) {
        self.backend.render(&self.registry);
    }

    // -------------------------------------------------------------------------
    // Elements
    // -------------------------------------------------------------------------

    pub fn element(&self, name: &str) -> Option<&SceneElement> {
        self.registry.get(name)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&MeshEntity> {
        self.registry.mesh(id)
    }

    pub fn set_element(
        &mut self,
        name: &str,
        element: SceneElement,
        options: SetOptions,
    ) -> SceneResult<()> {
        self.registry.set(name, element, options, &mut self.backend)
    }

    pub fn remove_element(&mut self, name: &str) -> SceneResult<()> {
        match self.registry.remove(name, &mut self.backend) {
            Some(_) => Ok(()),
            None => self.missing(name),
        }
    }

    /// Show, hide or flip (`visible = None`) an element. A missing built-in
    /// is created on demand unless it is being hidden.
    pub fn toggle_element(&mut self, name: &str, visible: Option<bool>) -> SceneResult<()> {
        if let Some(element) = self.registry.get_mut(name) {
            element.visible = visible.unwrap_or(!element.visible);
            return Ok(());
        }

        match BuiltIn::from_name(name) {
            Some(_) if visible == Some(false) => Ok(()),
            Some(BuiltIn::Center) => self.set_center(None, None, None),
            Some(builtin) => self.install_builtin(builtin, false),
            None => self.missing(name),
        }
    }

    /// Move the center anchor, creating it if needed. Axes left as `None`
    /// go back to the middle of the build volume.
    pub fn set_center(&mut self, x: Option<f32>, y: Option<f32>, z: Option<f32>) -> SceneResult<()> {
        let default = self.settings.volume_center();
        if !self.registry.contains(BuiltIn::Center.name()) {
            self.install_builtin(BuiltIn::Center, false)?;
        }
        let position = Point3::new(
            x.unwrap_or(default.x),
            y.unwrap_or(default.y),
            z.unwrap_or(default.z),
        );
        if let Some(center) = self.registry.get_mut(BuiltIn::Center.name()) {
            center.transform.position = position.coords;
        }
        // Directional lights stay aimed at the anchor.
        for light in [BuiltIn::DirectionalLight1, BuiltIn::DirectionalLight2] {
            if let Some(element) = self.registry.get_mut(light.name()) {
                if let ElementKind::DirectionalLight { target, .. } = &mut element.kind {
                    *target = position;
                }
            }
        }
        Ok(())
    }

    pub fn center_position(&self) -> Point3<f32> {
        self.registry
            .get(BuiltIn::Center.name())
            .map(|center| Point3::from(center.transform.position))
            .unwrap_or_else(|| self.settings.volume_center())
    }

    /// Change the build volume, rebuilding the size-dependent built-ins that
    /// are currently present and re-centring the anchor.
    pub fn resize_build_volume(&mut self, size: VolumeSize) -> SceneResult<()> {
        self.settings.build_volume.size = size;
        for builtin in [BuiltIn::Floor, BuiltIn::Grid, BuiltIn::Axes, BuiltIn::BuildVolume] {
            if self.registry.contains(builtin.name()) {
                self.install_builtin(builtin, true)?;
            }
        }
        self.set_center(None, None, None)
    }

    fn install_builtin(&mut self, builtin: BuiltIn, replace: bool) -> SceneResult<()> {
        let spec = builtin.build(&self.settings, self.center_position());
        let handle = self.backend.create_helper(builtin.name(), &spec.kind);
        let mut element = SceneElement::new(spec.kind, handle);
        element.transform.position = spec.position;
        element.render_order = spec.render_order;
        element.bindings = spec.bindings;
        self.registry.set(
            builtin.name(),
            element,
            SetOptions::replacing(replace),
            &mut self.backend,
        )
    }

    /// Outcome for an operation addressed at a name that is not registered.
    fn missing(&self, name: &str) -> SceneResult<()> {
        if self.settings.strict {
            log::warn!("no element named {name}");
            Err(SceneError::MissingElement {
                name: name.to_owned(),
            })
        } else {
            log::debug!("ignoring missing element {name}");
            Ok(())
        }
    }

    // -------------------------------------------------------------------------
    // Meshes
    // -------------------------------------------------------------------------

    /// Build a mesh from `triangles` and register it on the build plate.
    ///
    /// With `center`, the geometry is centred and rests on `z = 0`.
    /// `material` defaults to the `default` material.
    pub fn add_mesh(
        &mut self,
        name: &str,
        triangles: &[Triangle],
        material: Option<&str>,
        center: bool,
    ) -> SceneResult<MeshId> {
        let mut geometry = MeshGeometry::from_triangles(triangles);
        if center {
            geometry.center_on_floor();
        }

        let material_id = material.unwrap_or(DEFAULT_MATERIAL);
        let renderable = self
            .backend
            .create_mesh(&geometry, &self.settings.material(material_id));

        let id = MeshId(self.next_mesh_id);
        self.next_mesh_id += 1;

        let entity = MeshEntity::new(id, name, geometry, Material::new(material_id, renderable.color));
        let mut element = SceneElement::new(ElementKind::Mesh(entity), renderable.handle);
        element.render_order = self.draw_order.next();
        element.bindings.push(InputBinding::DoubleClick);

        let plate = self.settings.volume_center();
        let options = SetOptions {
            position: AxisOverrides::xy(plate.x, plate.y),
            ..SetOptions::default()
        };
        self.registry.set(&id.key(), element, options, &mut self.backend)?;

        log::debug!("added mesh {id} ({name:?}, {} faces)", triangles.len());
        if let Some(mesh) = self.registry.mesh(id) {
            self.events.emit(&SceneEvent::MeshAdded(mesh));
        }
        Ok(id)
    }

    /// Destroy a mesh: drop it from the selection, release its resources and
    /// announce the removal.
    pub fn remove_mesh(&mut self, id: MeshId) -> SceneResult<()> {
        let key = id.key();
        if self.registry.mesh(id).is_none() {
            return self.missing(&key);
        }
        self.selection.remove(id);
        self.registry.remove(&key, &mut self.backend);
        self.events.emit(&SceneEvent::MeshRemoved(id));
        Ok(())
    }

    /// Re-centre a mesh's geometry on its origin and put it down on the
    /// plate, keeping its x/y footprint where it was.
    pub fn drop_mesh(&mut self, id: MeshId) -> SceneResult<()> {
        let key = id.key();
        if !self.registry.contains(&key) {
            return self.missing(&key);
        }
        let Some(element) = self.registry.get_mut(&key) else {
            return Ok(());
        };
        let handle = element.handle;
        let Some(mesh) = element.as_mesh_mut() else {
            return Err(SceneError::NotAMesh { name: key });
        };

        let offset = mesh.geometry_mut().center_on_floor();
        self.backend.update_geometry(handle, mesh.geometry());

        let position = &mut element.transform.position;
        position.x -= offset.x;
        position.y -= offset.y;
        position.z = 0.0;
        Ok(())
    }

    pub fn drop_selected(&mut self) -> SceneResult<()> {
        for id in self.selection.ids().to_vec() {
            self.drop_mesh(id)?;
        }
        Ok(())
    }
}

impl<B: RenderBackend + std::fmt::Debug> std::fmt::Debug for Scene<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("backend", &self.backend)
            .field("elements", &self.registry.len())
            .field("selected", &self.selection.len())
            .field("next_draw_order", &self.draw_order.peek())
            .finish()
    }
}
