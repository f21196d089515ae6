/// viewer3d web - WASM bindings for the build-volume viewer
///
/// Exposes a [`Viewer`] class to JavaScript. Scene state lives in Rust; the
/// page draws it through the callbacks it hands to the constructor (see
/// [`backend::JsBackend`]).
use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use viewer3d_core::keyboard::{Key, KeyboardNotice};
use viewer3d_core::{
    KeyboardController, MeshEntity, MeshId, Scene, SceneEvent, SplitOutcome, Triangle,
    TransformAction, ViewerSettings, VolumeSize,
};

pub mod backend;
mod console;

use backend::JsBackend;

/// Initialize the WASM module (sets up panic hook and console logging).
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    console::init(log::LevelFilter::Info);
}

/// Mesh description passed to the `onMesh*` listeners.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct MeshSummary<'a> {
    id: String,
    name: &'a str,
    face_count: usize,
    color: u32,
    selected: bool,
}

impl<'a> From<&'a MeshEntity> for MeshSummary<'a> {
    fn from(mesh: &'a MeshEntity) -> Self {
        Self {
            id: mesh.id().key(),
            name: mesh.name(),
            face_count: mesh.face_count(),
            color: mesh.color().hex(),
            selected: mesh.is_selected(),
        }
    }
}

/// Arguments for one `onMesh*` listener call.
#[derive(Debug, PartialEq)]
enum Notification<'a> {
    Added(MeshSummary<'a>),
    Removed(String),
    Selected(MeshSummary<'a>, bool),
}

impl<'a> From<&SceneEvent<'a>> for Notification<'a> {
    fn from(event: &SceneEvent<'a>) -> Self {
        match event {
            SceneEvent::MeshAdded(mesh) => Notification::Added(MeshSummary::from(*mesh)),
            SceneEvent::MeshRemoved(id) => Notification::Removed(id.key()),
            SceneEvent::MeshSelected { mesh, selected } => {
                Notification::Selected(MeshSummary::from(*mesh), *selected)
            }
        }
    }
}

type Slot = Rc<RefCell<Option<Function>>>;

#[derive(Default)]
struct Listeners {
    added: Slot,
    removed: Slot,
    selected: Slot,
}

fn notify(slot: &Slot, args: impl FnOnce() -> (JsValue, Option<JsValue>)) {
    let slot = slot.borrow();
    let Some(listener) = slot.as_ref() else {
        return;
    };
    let result = match args() {
        (first, None) => listener.call1(&JsValue::NULL, &first),
        (first, Some(second)) => listener.call2(&JsValue::NULL, &first, &second),
    };
    if let Err(error) = result {
        log::warn!("listener failed: {error:?}");
    }
}

fn mesh_id(key: &str) -> Result<MeshId, JsError> {
    MeshId::from_key(key).ok_or_else(|| JsError::new(&format!("invalid mesh id: {key}")))
}

fn js_error(error: impl std::fmt::Display) -> JsError {
    JsError::new(&error.to_string())
}

/// A build-volume scene driven from JavaScript.
#[wasm_bindgen]
pub struct Viewer {
    scene: Scene<JsBackend>,
    keyboard: KeyboardController,
    listeners: Listeners,
}

#[wasm_bindgen]
impl Viewer {
    /// Create a viewer from a (partial) settings object and an object of
    /// backend callbacks. Either may be `undefined`.
    #[wasm_bindgen(constructor)]
    pub fn new(settings: JsValue, hooks: JsValue) -> Result<Viewer, JsError> {
        let settings: ViewerSettings = if settings.is_undefined() || settings.is_null() {
            ViewerSettings::default()
        } else {
            serde_wasm_bindgen::from_value(settings)
                .map_err(|e| JsError::new(&format!("Invalid settings: {}", e)))?
        };

        let mut scene = Scene::new(settings, JsBackend::from_hooks(&hooks)).map_err(js_error)?;
        let listeners = Listeners::default();

        let (added, removed, selected) = (
            Rc::clone(&listeners.added),
            Rc::clone(&listeners.removed),
            Rc::clone(&listeners.selected),
        );
        scene.subscribe(move |event| match Notification::from(event) {
            Notification::Added(mesh) => notify(&added, || (to_js(&mesh), None)),
            Notification::Removed(id) => notify(&removed, || (JsValue::from_str(&id), None)),
            Notification::Selected(mesh, flag) => notify(&selected, || {
                (to_js(&mesh), Some(JsValue::from_bool(flag)))
            }),
        });

        Ok(Viewer {
            scene,
            keyboard: KeyboardController::new(),
            listeners,
        })
    }

    #[wasm_bindgen(js_name = onMeshAdded)]
    pub fn on_mesh_added(&mut self, listener: Option<Function>) {
        *self.listeners.added.borrow_mut() = listener;
    }

    #[wasm_bindgen(js_name = onMeshRemoved)]
    pub fn on_mesh_removed(&mut self, listener: Option<Function>) {
        *self.listeners.removed.borrow_mut() = listener;
    }

    #[wasm_bindgen(js_name = onMeshSelected)]
    pub fn on_mesh_selected(&mut self, listener: Option<Function>) {
        *self.listeners.selected.borrow_mut() = listener;
    }

    pub fn render(&mut self) {
        self.scene.render();
    }

    /// Add a mesh from `[{ normals, vertices }]` faces. Returns its id.
    #[wasm_bindgen(js_name = addMesh)]
    pub fn add_mesh(
        &mut self,
        name: &str,
        faces: JsValue,
        material: Option<String>,
        center: Option<bool>,
    ) -> Result<String, JsError> {
        let triangles: Vec<Triangle> = serde_wasm_bindgen::from_value(faces)
            .map_err(|e| JsError::new(&format!("Invalid faces: {}", e)))?;
        let id = self
            .scene
            .add_mesh(name, &triangles, material.as_deref(), center.unwrap_or(true))
            .map_err(js_error)?;
        Ok(id.key())
    }

    #[wasm_bindgen(js_name = removeMesh)]
    pub fn remove_mesh(&mut self, id: &str) -> Result<(), JsError> {
        self.scene.remove_mesh(mesh_id(id)?).map_err(js_error)
    }

    /// Split a mesh into its connected pieces. Returns the new ids, or an
    /// empty array when the mesh is a single piece.
    #[wasm_bindgen(js_name = splitMesh)]
    pub fn split_mesh(&mut self, id: &str) -> Result<Vec<String>, JsError> {
        let outcome = self.scene.split_mesh(mesh_id(id)?).map_err(js_error)?;
        Ok(piece_keys(&outcome))
    }

    #[wasm_bindgen(js_name = splitSelectedMeshes)]
    pub fn split_selected_meshes(&mut self) -> Result<Vec<String>, JsError> {
        let outcomes = self.scene.split_selected().map_err(js_error)?;
        Ok(outcomes
            .iter()
            .flat_map(|(_, outcome)| piece_keys(outcome))
            .collect())
    }

    #[wasm_bindgen(js_name = dropMesh)]
    pub fn drop_mesh(&mut self, id: &str) -> Result<(), JsError> {
        self.scene.drop_mesh(mesh_id(id)?).map_err(js_error)
    }

    #[wasm_bindgen(js_name = dropSelectedMeshes)]
    pub fn drop_selected_meshes(&mut self) -> Result<(), JsError> {
        self.scene.drop_selected().map_err(js_error)
    }

    #[wasm_bindgen(js_name = setMeshSelected)]
    pub fn set_mesh_selected(&mut self, id: &str, selected: bool) -> Result<(), JsError> {
        self.scene.select(mesh_id(id)?, selected).map_err(js_error)
    }

    #[wasm_bindgen(js_name = selectAllMeshes)]
    pub fn select_all_meshes(&mut self) -> Result<(), JsError> {
        self.scene.select_all().map_err(js_error)
    }

    #[wasm_bindgen(js_name = unselectAllMeshes)]
    pub fn unselect_all_meshes(&mut self) -> Result<(), JsError> {
        self.scene.unselect_all().map_err(js_error)
    }

    #[wasm_bindgen(js_name = selectedMeshes)]
    pub fn selected_meshes(&self) -> Vec<String> {
        self.scene.selection().iter().map(MeshId::key).collect()
    }

    /// Apply `{ target, axis, unit, operation }` to the selection.
    #[wasm_bindgen(js_name = transformSelectedMeshes)]
    pub fn transform_selected_meshes(&mut self, action: JsValue) -> Result<(), JsError> {
        let action: TransformAction = serde_wasm_bindgen::from_value(action)
            .map_err(|e| JsError::new(&format!("Invalid action: {}", e)))?;
        self.scene.transform_selected(&action);
        Ok(())
    }

    /// Show, hide or (with `visible` undefined) flip an element.
    #[wasm_bindgen(js_name = toggleElement)]
    pub fn toggle_element(&mut self, name: &str, visible: Option<bool>) -> Result<(), JsError> {
        self.scene.toggle_element(name, visible).map_err(js_error)
    }

    /// Forward a double-click on the element registered as `name`.
    #[wasm_bindgen(js_name = doubleClick)]
    pub fn double_click(&mut self, name: &str) -> Result<(), JsError> {
        self.scene.double_click(name).map_err(js_error)
    }

    #[wasm_bindgen(js_name = resizeBuildVolume)]
    pub fn resize_build_volume(&mut self, x: f32, y: f32, z: f32) -> Result<(), JsError> {
        self.scene
            .resize_build_volume(VolumeSize::new(x, y, z))
            .map_err(js_error)
    }

    /// Feed a `KeyboardEvent.key` value. Returns the notices it produced
    /// (`"enabled"`, `"disabled"`, `"changed"`).
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&mut self, key: &str) -> Vec<String> {
        let Some(key) = Key::from_name(key) else {
            return Vec::new();
        };
        let response = self.keyboard.handle(key);
        if let Some(action) = response.transform {
            self.scene.transform_selected(&action);
            self.scene.render();
        }
        response
            .notices
            .iter()
            .map(|notice| {
                match notice {
                    KeyboardNotice::Enabled => "enabled",
                    KeyboardNotice::Disabled => "disabled",
                    KeyboardNotice::Changed => "changed",
                }
                .to_owned()
            })
            .collect()
    }
}

fn piece_keys(outcome: &SplitOutcome) -> Vec<String> {
    outcome.pieces().iter().map(|id| id.key()).collect()
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}
