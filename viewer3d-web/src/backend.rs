/// Render backend that forwards to JavaScript callbacks
///
/// The page supplies an object with any of `createMesh`, `createHelper`,
/// `updateGeometry`, `dispose`, `bindEvents`, `unbindEvents` and `render`.
/// Handles are allocated here; missing callbacks are skipped.
use js_sys::{Function, Reflect};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};

use viewer3d_core::backend::{RenderBackend, RenderHandle, Renderable, PALETTE};
use viewer3d_core::material::{MaterialColor, MaterialSettings, Shading};
use viewer3d_core::scene::{ElementKind, ElementRegistry, InputBinding, SceneElement};
use viewer3d_core::MeshGeometry;

/// Flat buffers for a JS geometry object.
#[derive(Debug, Serialize)]
pub struct GeometryBuffers {
    /// `[x0, y0, z0, x1, ...]`, three vertices per face.
    pub positions: Vec<f32>,
    /// One normal per vertex.
    pub normals: Vec<f32>,
}

impl From<&MeshGeometry> for GeometryBuffers {
    fn from(geometry: &MeshGeometry) -> Self {
        let mut positions = Vec::with_capacity(geometry.faces.len() * 9);
        let mut normals = Vec::with_capacity(geometry.faces.len() * 9);
        for face in &geometry.faces {
            for index in face.indices() {
                let vertex = geometry.vertices[index];
                positions.extend([vertex.x, vertex.y, vertex.z]);
                normals.extend([face.normal.x, face.normal.y, face.normal.z]);
            }
        }
        Self { positions, normals }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MaterialDescriptor {
    shading: &'static str,
    color: u32,
}

/// Per-element state handed to the JS `render` callback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementState {
    pub name: String,
    pub handle: u64,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub up: [f32; 3],
    pub visible: bool,
    pub render_order: u64,
    /// Current mesh colour; `None` for built-ins.
    pub color: Option<u32>,
}

impl ElementState {
    pub fn new(name: &str, element: &SceneElement) -> Self {
        let transform = &element.transform;
        Self {
            name: name.to_owned(),
            handle: element.handle.0,
            position: transform.position.into(),
            rotation: transform.rotation.into(),
            scale: transform.scale.into(),
            up: element.up.into(),
            visible: element.visible,
            render_order: element.render_order,
            color: element.as_mesh().map(|mesh| mesh.color().hex()),
        }
    }
}

#[derive(Debug, Default)]
pub struct JsBackend {
    create_mesh: Option<Function>,
    create_helper: Option<Function>,
    update_geometry: Option<Function>,
    dispose: Option<Function>,
    bind_events: Option<Function>,
    unbind_events: Option<Function>,
    render: Option<Function>,
    next_handle: u64,
    palette_cursor: usize,
}

fn hook(hooks: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(hooks, &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

/// Invoke an optional callback. Arguments are only built when it is present.
fn call(function: &Option<Function>, name: &str, args: impl FnOnce() -> Vec<JsValue>) {
    let Some(function) = function else {
        return;
    };
    let result = match args().as_slice() {
        [] => function.call0(&JsValue::NULL),
        [a] => function.call1(&JsValue::NULL, a),
        [a, b] => function.call2(&JsValue::NULL, a, b),
        [a, b, c, ..] => function.call3(&JsValue::NULL, a, b, c),
    };
    if let Err(error) = result {
        log::warn!("{name} callback failed: {error:?}");
    }
}

impl JsBackend {
    pub fn from_hooks(hooks: &JsValue) -> Self {
        if hooks.is_undefined() || hooks.is_null() {
            return Self::default();
        }
        Self {
            create_mesh: hook(hooks, "createMesh"),
            create_helper: hook(hooks, "createHelper"),
            update_geometry: hook(hooks, "updateGeometry"),
            dispose: hook(hooks, "dispose"),
            bind_events: hook(hooks, "bindEvents"),
            unbind_events: hook(hooks, "unbindEvents"),
            render: hook(hooks, "render"),
            next_handle: 0,
            palette_cursor: 0,
        }
    }

    fn allocate(&mut self) -> RenderHandle {
        let handle = RenderHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }
}

fn handle_value(handle: RenderHandle) -> JsValue {
    JsValue::from_f64(handle.0 as f64)
}

impl RenderBackend for JsBackend {
    fn create_mesh(&mut self, geometry: &MeshGeometry, material: &MaterialSettings) -> Renderable {
        let color = match material.color {
            MaterialColor::Fixed(color) => color,
            MaterialColor::Random => {
                let color = PALETTE[self.palette_cursor % PALETTE.len()];
                self.palette_cursor += 1;
                color
            }
        };
        let handle = self.allocate();

        let descriptor = MaterialDescriptor {
            shading: match material.shading {
                Shading::Lambert => "lambert",
                Shading::Phong => "phong",
                Shading::Basic => "basic",
            },
            color: color.hex(),
        };
        call(&self.create_mesh, "createMesh", || {
            vec![
                handle_value(handle),
                to_js(&GeometryBuffers::from(geometry)),
                to_js(&descriptor),
            ]
        });
        Renderable { handle, color }
    }

    fn create_helper(&mut self, name: &str, kind: &ElementKind) -> RenderHandle {
        let handle = self.allocate();
        call(&self.create_helper, "createHelper", || {
            vec![
                handle_value(handle),
                JsValue::from_str(name),
                JsValue::from_str(&format!("{kind:?}")),
            ]
        });
        handle
    }

    fn update_geometry(&mut self, handle: RenderHandle, geometry: &MeshGeometry) {
        call(&self.update_geometry, "updateGeometry", || {
            vec![handle_value(handle), to_js(&GeometryBuffers::from(geometry))]
        });
    }

    fn dispose(&mut self, handle: RenderHandle) {
        call(&self.dispose, "dispose", || vec![handle_value(handle)]);
    }

    fn bind_events(&mut self, handle: RenderHandle, bindings: &[InputBinding]) {
        if bindings.contains(&InputBinding::DoubleClick) {
            call(&self.bind_events, "bindEvents", || {
                vec![handle_value(handle), JsValue::from_str("dblclick")]
            });
        }
    }

    fn unbind_events(&mut self, handle: RenderHandle) {
        call(&self.unbind_events, "unbindEvents", || vec![handle_value(handle)]);
    }

    fn render(&mut self, elements: &ElementRegistry) {
        call(&self.render, "render", || {
            let states: Vec<ElementState> = elements
                .iter()
                .map(|(name, element)| ElementState::new(name, element))
                .collect();
            vec![to_js(&states)]
        });
    }
}
