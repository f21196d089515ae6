//! Mesh selection and the pointer gestures that drive it.

use crate::backend::RenderBackend;
use crate::error::{SceneError, SceneResult};
use crate::events::SceneEvent;
use crate::scene::builtins::BuiltIn;
use crate::scene::element::{InputBinding, MeshId};
use crate::scene::Scene;

/// Ids of the selected meshes, in the order they were selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<MeshId>,
}

impl Selection {
    /// Returns `false` if `id` was already selected.
    pub fn insert(&mut self, id: MeshId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn remove(&mut self, id: MeshId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|selected| *selected != id);
        self.ids.len() != before
    }

    pub fn contains(&self, id: MeshId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[MeshId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = MeshId> + '_ {
        self.ids.iter().copied()
    }
}

impl<B: RenderBackend> Scene<B> {
    /// Select or unselect one mesh.
    ///
    /// The mesh is moved to the top of the draw order either way, its colour
    /// switches between the highlight and its original colour, and listeners
    /// hear about it.
    pub fn select(&mut self, id: MeshId, selected: bool) -> SceneResult<()> {
        let key = id.key();
        let highlight = self.settings.colors.selected;
        let order = self.draw_order.peek();

        let Some(element) = self.registry.get_mut(&key) else {
            return self.missing(&key);
        };
        let Some(mesh) = element.as_mesh_mut() else {
            return Err(SceneError::NotAMesh { name: key });
        };
        mesh.mark_selected(selected, highlight);
        element.render_order = order;
        self.draw_order.next();

        if selected {
            self.selection.insert(id);
        } else {
            self.selection.remove(id);
        }

        if let Some(mesh) = self.registry.mesh(id) {
            self.events.emit(&SceneEvent::MeshSelected { mesh, selected });
        }
        Ok(())
    }

    /// Select every named mesh, in registration order.
    pub fn select_all(&mut self) -> SceneResult<()> {
        let named: Vec<MeshId> = self
            .registry
            .meshes()
            .filter(|mesh| !mesh.name().is_empty())
            .map(|mesh| mesh.id())
            .collect();
        for id in named {
            self.select(id, true)?;
        }
        Ok(())
    }

    pub fn unselect_all(&mut self) -> SceneResult<()> {
        for id in self.selection.ids().to_vec() {
            self.select(id, false)?;
        }
        Ok(())
    }

    /// React to a double-click on the element registered as `name`.
    ///
    /// A mesh toggles its own selection. The floor clears the selection if
    /// there is one and selects everything otherwise. Elements without a
    /// double-click binding are ignored.
    pub fn double_click(&mut self, name: &str) -> SceneResult<()> {
        let Some(element) = self.registry.get(name) else {
            return self.missing(name);
        };
        if !element.reacts_to(InputBinding::DoubleClick) {
            return Ok(());
        }

        if let Some(mesh) = element.as_mesh() {
            let (id, selected) = (mesh.id(), mesh.is_selected());
            self.select(id, !selected)?;
        } else if name == BuiltIn::Floor.name() {
            if self.selection.is_empty() {
                self.select_all()?;
            } else {
                self.unselect_all()?;
            }
        }

        self.render();
        Ok(())
    }
}
