//! Named-slot bookkeeping for everything in the scene.

use std::collections::HashMap;

use nalgebra::Vector3;

use crate::backend::RenderBackend;
use crate::error::{SceneError, SceneResult};
use crate::scene::element::{MeshEntity, MeshId, SceneElement};

/// Per-axis overrides; `None` keeps the element's current value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisOverrides {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
}

impl AxisOverrides {
    pub fn xy(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: None,
        }
    }

    pub fn xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    pub fn apply(&self, target: &mut Vector3<f32>) {
        for (axis, value) in [self.x, self.y, self.z].into_iter().enumerate() {
            if let Some(value) = value {
                target[axis] = value;
            }
        }
    }
}

/// Options for [`ElementRegistry::set`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SetOptions {
    /// Remove an element already registered under the name instead of failing.
    pub replace: bool,
    pub position: AxisOverrides,
    pub rotation: AxisOverrides,
}

impl SetOptions {
    pub fn replacing(replace: bool) -> Self {
        Self {
            replace,
            ..Self::default()
        }
    }
}

/// Owner of every registered element, keyed by unique name, in insertion order.
///
/// The registry is the only place render handles are released.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementRegistry {
    order: Vec<String>,
    elements: HashMap<String, SceneElement>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&SceneElement> {
        self.elements.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SceneElement> {
        self.elements.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.elements.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registered names, oldest first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SceneElement)> {
        self.order
            .iter()
            .filter_map(|name| self.elements.get(name).map(|element| (name.as_str(), element)))
    }

    pub fn meshes(&self) -> impl Iterator<Item = &MeshEntity> {
        self.iter().filter_map(|(_, element)| element.as_mesh())
    }

    pub fn mesh(&self, id: MeshId) -> Option<&MeshEntity> {
        self.get(&id.key()).and_then(SceneElement::as_mesh)
    }

    /// Register `element` under `name`.
    ///
    /// An occupied name without `options.replace` is logged and rejected
    /// with [`SceneError::DuplicateName`]; the registry is left untouched and
    /// the rejected element's resources are released. With `replace`, the
    /// previous element is removed first.
    pub fn set(
        &mut self,
        name: &str,
        mut element: SceneElement,
        options: SetOptions,
        backend: &mut dyn RenderBackend,
    ) -> SceneResult<()> {
        if self.contains(name) {
            if !options.replace {
                log::error!("duplicateElementName {name}");
                backend.dispose(element.handle);
                return Err(SceneError::DuplicateName {
                    name: name.to_owned(),
                });
            }
            self.remove(name, backend);
        }

        options.position.apply(&mut element.transform.position);
        options.rotation.apply(&mut element.transform.rotation);
        element.up = Vector3::z();

        if !element.bindings.is_empty() {
            backend.bind_events(element.handle, &element.bindings);
        }

        log::debug!("registered {name} (draw order {})", element.render_order);
        self.order.push(name.to_owned());
        self.elements.insert(name.to_owned(), element);
        Ok(())
    }

    /// Unregister `name`, detaching its input bindings and releasing its
    /// resources. Returns the removed element, or `None` if absent.
    pub fn remove(&mut self, name: &str, backend: &mut dyn RenderBackend) -> Option<SceneElement> {
        let element = self.elements.remove(name)?;
        self.order.retain(|entry| entry != name);

        if !element.bindings.is_empty() {
            backend.unbind_events(element.handle);
        }
        backend.dispose(element.handle);
        log::debug!("removed {name}");
        Some(element)
    }
}
