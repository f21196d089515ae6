//! Splitting a mesh into its connected pieces.

use crate::backend::RenderBackend;
use crate::config::DEFAULT_MATERIAL;
use crate::error::{SceneError, SceneResult};
use crate::grouping::group_faces;
use crate::scene::element::MeshId;
use crate::scene::Scene;

/// Result of [`Scene::split_mesh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitOutcome {
    /// The mesh is a single connected piece and was left alone.
    NotSplittable,
    /// The mesh was replaced by these pieces, one per connected group.
    Split(Vec<MeshId>),
}

impl SplitOutcome {
    pub fn pieces(&self) -> &[MeshId] {
        match self {
            SplitOutcome::NotSplittable => &[],
            SplitOutcome::Split(pieces) => pieces,
        }
    }
}

impl<B: RenderBackend> Scene<B> {
    /// Replace a mesh with one new mesh per connected group of faces.
    ///
    /// Pieces are named `"<name> [<i>]"` and use the default material. A
    /// single-group mesh yields [`SplitOutcome::NotSplittable`] and leaves the
    /// scene untouched.
    pub fn split_mesh(&mut self, id: MeshId) -> SceneResult<SplitOutcome> {
        let Some(mesh) = self.registry.mesh(id) else {
            return Err(SceneError::MissingElement { name: id.key() });
        };

        let geometry = mesh.geometry();
        let groups = group_faces(&geometry.faces, &geometry.vertices);
        if groups.len() < 2 {
            log::debug!("{id} is a single piece");
            return Ok(SplitOutcome::NotSplittable);
        }

        let name = mesh.name().to_owned();
        let pieces: Vec<_> = groups
            .iter()
            .map(|group| geometry.triangles(group.faces()))
            .collect();

        self.selection.remove(id);
        let center = self.settings.split.center_pieces;
        let mut ids = Vec::with_capacity(pieces.len());
        for (index, triangles) in pieces.iter().enumerate() {
            let piece = format!("{name} [{index}]");
            ids.push(self.add_mesh(&piece, triangles, Some(DEFAULT_MATERIAL), center)?);
        }
        self.remove_mesh(id)?;

        log::info!("split {id} ({name:?}) into {} pieces", ids.len());
        Ok(SplitOutcome::Split(ids))
    }

    /// Split every selected mesh, returning each one's outcome in selection
    /// order.
    pub fn split_selected(&mut self) -> SceneResult<Vec<(MeshId, SplitOutcome)>> {
        let mut outcomes = Vec::with_capacity(self.selection.len());
        for id in self.selection.ids().to_vec() {
            outcomes.push((id, self.split_mesh(id)?));
        }
        Ok(outcomes)
    }
}
