//! Applying transform actions to the selection.

use crate::backend::RenderBackend;
use crate::scene::Scene;
use crate::transform::TransformAction;

impl<B: RenderBackend> Scene<B> {
    /// Apply `action` to every selected mesh. Does not render.
    pub fn transform_selected(&mut self, action: &TransformAction) {
        for id in self.selection.iter() {
            if let Some(element) = self.registry.get_mut(&id.key()) {
                element.transform = action.apply(&element.transform);
            }
        }
        log::trace!("applied {action:?} to {} meshes", self.selection.len());
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::HeadlessBackend;
    use crate::config::ViewerSettings;
    use crate::geometry::cube;
    use crate::scene::{MeshId, Scene};
    use crate::transform::{Axis, Operation, TransformAction, TransformTarget};
    use approx::assert_relative_eq;

    #[test]
    fn test_only_selected_meshes_move() {
        let mut scene = Scene::new(ViewerSettings::default(), HeadlessBackend::new()).unwrap();
        let moved = scene.add_mesh("moved", &cube(1.0), None, true).unwrap();
        let still = scene.add_mesh("still", &cube(1.0), None, true).unwrap();
        scene.select(moved, true).unwrap();

        let action = TransformAction::new(TransformTarget::Position, Axis::Z, 3.0, Operation::Plus);
        scene.transform_selected(&action);
        scene.transform_selected(&action);

        let position = |id: MeshId| scene.element(&id.key()).unwrap().transform.position;
        assert_relative_eq!(position(moved).z, 6.0);
        assert_relative_eq!(position(still).z, 0.0);
        assert_eq!(position(moved).x, 100.0);
        assert_eq!(scene.backend().render_count(), 0);
    }

    #[test]
    fn test_rotation_and_scale_steps() {
        let mut scene = Scene::new(ViewerSettings::default(), HeadlessBackend::new()).unwrap();
        let id = scene.add_mesh("part", &cube(1.0), None, true).unwrap();
        scene.select(id, true).unwrap();

        scene.transform_selected(&TransformAction::new(
            TransformTarget::Rotation,
            Axis::X,
            90.0,
            Operation::Minus,
        ));
        scene.transform_selected(&TransformAction::new(
            TransformTarget::Scale,
            Axis::Y,
            0.1,
            Operation::Plus,
        ));

        let transform = scene.element(&id.key()).unwrap().transform;
        assert_relative_eq!(transform.rotation.x, -std::f32::consts::FRAC_PI_2);
        assert_relative_eq!(transform.scale.y, 1.1);
    }
}
