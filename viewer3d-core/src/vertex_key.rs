//! Exact-equality keys for vertex positions.
//!
//! Two positions share a key iff their coordinates are equal component-wise.
//! There is no tolerance: vertices that differ in the last bit
//! are different vertices, so meshes exported with slightly perturbed shared
//! corners will be treated as disconnected.

use nalgebra::Point3;

/// Hashable identity of a vertex position, packed from the `f32` bit patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexKey([u32; 3]);

impl VertexKey {
    pub fn of(position: &Point3<f32>) -> Self {
        Self([
            canonical_bits(position.x),
            canonical_bits(position.y),
            canonical_bits(position.z),
        ])
    }

    pub fn from_coords(x: f32, y: f32, z: f32) -> Self {
        Self::of(&Point3::new(x, y, z))
    }
}

impl From<&Point3<f32>> for VertexKey {
    fn from(position: &Point3<f32>) -> Self {
        Self::of(position)
    }
}

// -0.0 and +0.0 compare equal, and all NaNs print the same: fold both.
fn canonical_bits(value: f32) -> u32 {
    if value == 0.0 {
        0
    } else if value.is_nan() {
        f32::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_coordinates_share_key() {
        assert_eq!(
            VertexKey::from_coords(1.5, -2.0, 3.25),
            VertexKey::from_coords(1.5, -2.0, 3.25)
        );
    }

    #[test]
    fn test_no_tolerance() {
        let x = 1.0_f32;
        let next = f32::from_bits(x.to_bits() + 1);
        assert_ne!(
            VertexKey::from_coords(x, 0.0, 0.0),
            VertexKey::from_coords(next, 0.0, 0.0)
        );
    }

    #[test]
    fn test_axis_order_matters() {
        assert_ne!(
            VertexKey::from_coords(1.0, 2.0, 3.0),
            VertexKey::from_coords(3.0, 2.0, 1.0)
        );
    }

    #[test]
    fn test_signed_zero_folds() {
        assert_eq!(
            VertexKey::from_coords(-0.0, 0.0, -0.0),
            VertexKey::from_coords(0.0, -0.0, 0.0)
        );
    }
}
