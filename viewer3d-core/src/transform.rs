/// Object transforms and the incremental actions applied to selected meshes
use nalgebra::{Matrix4, Vector3};
use serde::{Deserialize, Serialize};

/// Position, Euler rotation (radians, XYZ order) and scale of a scene element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: Vector3::repeat(1.0),
        }
    }

    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            ..Self::identity()
        }
    }

    /// Model matrix: scale, then rotate, then translate.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        translation_matrix(&self.position)
            * rotation_matrix(&self.rotation)
            * scale_matrix(&self.scale)
    }

    fn component_mut(&mut self, target: TransformTarget) -> &mut Vector3<f32> {
        match target {
            TransformTarget::Position => &mut self.position,
            TransformTarget::Rotation => &mut self.rotation,
            TransformTarget::Scale => &mut self.scale,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Create a rotation matrix from XYZ Euler angles (in radians)
pub fn rotation_matrix(rotation: &Vector3<f32>) -> Matrix4<f32> {
    let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
    let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
    let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

    rx * ry * rz
}

pub fn translation_matrix(offset: &Vector3<f32>) -> Matrix4<f32> {
    Matrix4::new_translation(offset)
}

pub fn scale_matrix(scale: &Vector3<f32>) -> Matrix4<f32> {
    Matrix4::new_nonuniform_scaling(scale)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformTarget {
    Position,
    Rotation,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

/// One incremental step: add or subtract `unit` on one axis of one attribute.
///
/// Rotation units are degrees; position and scale units are used as given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformAction {
    pub target: TransformTarget,
    pub axis: Axis,
    pub unit: f32,
    pub operation: Operation,
}

impl TransformAction {
    pub fn new(target: TransformTarget, axis: Axis, unit: f32, operation: Operation) -> Self {
        Self {
            target,
            axis,
            unit,
            operation,
        }
    }

    fn step(&self) -> f32 {
        match self.target {
            TransformTarget::Rotation => self.unit.to_radians(),
            TransformTarget::Position | TransformTarget::Scale => self.unit,
        }
    }

    /// Return `transform` with this action applied.
    pub fn apply(&self, transform: &Transform) -> Transform {
        let step = self.step();
        let mut next = *transform;
        let component = &mut next.component_mut(self.target)[self.axis.index()];
        match self.operation {
            Operation::Plus => *component += step,
            Operation::Minus => *component -= step,
        }
        next
    }
}

impl Default for TransformAction {
    fn default() -> Self {
        Self::new(TransformTarget::Position, Axis::X, 1.0, Operation::Plus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_identity_model_matrix() {
        let matrix = Transform::identity().model_matrix();
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_position_step() {
        let action = TransformAction::new(TransformTarget::Position, Axis::Y, 2.5, Operation::Minus);
        let next = action.apply(&Transform::at(1.0, 1.0, 1.0));
        assert_eq!(next.position, Vector3::new(1.0, -1.5, 1.0));
        assert_eq!(next.rotation, Vector3::zeros());
    }

    #[test]
    fn test_rotation_uses_degrees() {
        let action = TransformAction::new(TransformTarget::Rotation, Axis::Z, 90.0, Operation::Plus);
        let next = action.apply(&Transform::identity());
        assert_relative_eq!(next.rotation.z, FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn test_scale_step_leaves_input_untouched() {
        let start = Transform::identity();
        let action = TransformAction::new(TransformTarget::Scale, Axis::X, 0.1, Operation::Plus);
        let next = action.apply(&start);
        assert_relative_eq!(next.scale.x, 1.1, epsilon = 1e-6);
        assert_eq!(start.scale.x, 1.0);
    }

    #[test]
    fn test_model_matrix_translates() {
        let transform = Transform::at(10.0, 20.0, 0.0);
        let moved = transform
            .model_matrix()
            .transform_point(&nalgebra::Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(moved, nalgebra::Point3::new(11.0, 20.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_action_json() {
        let action: TransformAction = serde_json::from_str(
            r#"{"target":"rotation","axis":"z","unit":1,"operation":"-"}"#,
        )
        .unwrap();
        assert_eq!(action.target, TransformTarget::Rotation);
        assert_eq!(action.operation, Operation::Minus);
    }
}
