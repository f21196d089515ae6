//! Viewer settings.
//!
//! Every struct is `#[serde(default)]`, so a partial user document (TOML,
//! JSON or a JS object) is merged field by field over the defaults.

use std::collections::BTreeMap;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::material::{Color, MaterialSettings};

/// Id of the material used when a mesh is added without one.
pub const DEFAULT_MATERIAL: &str = "default";

/// A plain `{ x, y, z }` triple as it appears in settings documents.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Xyz {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Xyz {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_vector(self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }
}

/// Extent of the build volume; missing axes keep the 200 mm default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSize {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl VolumeSize {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_vector(self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl Default for VolumeSize {
    fn default() -> Self {
        Self::new(200.0, 200.0, 200.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerSettings {
    pub build_volume: BuildVolumeSettings,
    pub camera: CameraSettings,
    pub shadow_map: ShadowMapSettings,
    pub lights: LightSettings,
    pub floor: FloorSettings,
    pub grid: GridSettings,
    pub axes: AxesSettings,
    pub materials: BTreeMap<String, MaterialSettings>,
    pub colors: ColorSettings,
    pub split: SplitSettings,
    /// Report operations on missing elements as errors instead of ignoring them.
    pub strict: bool,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            build_volume: BuildVolumeSettings::default(),
            camera: CameraSettings::default(),
            shadow_map: ShadowMapSettings::default(),
            lights: LightSettings::default(),
            floor: FloorSettings::default(),
            grid: GridSettings::default(),
            axes: AxesSettings::default(),
            materials: BTreeMap::from([(DEFAULT_MATERIAL.to_owned(), MaterialSettings::default())]),
            colors: ColorSettings::default(),
            split: SplitSettings::default(),
            strict: false,
        }
    }
}

impl ViewerSettings {
    /// Material recipe for `id`, falling back to the default recipe.
    pub fn material(&self, id: &str) -> MaterialSettings {
        self.materials
            .get(id)
            .or_else(|| self.materials.get(DEFAULT_MATERIAL))
            .cloned()
            .unwrap_or_default()
    }

    /// Centre of the build volume.
    pub fn volume_center(&self) -> Point3<f32> {
        Point3::from(self.build_volume.size.to_vector() / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildVolumeSettings {
    pub size: VolumeSize,
    pub enabled: bool,
    pub color: Color,
    pub alpha: f32,
}

impl Default for BuildVolumeSettings {
    fn default() -> Self {
        Self {
            size: VolumeSize::default(),
            enabled: true,
            color: Color(0xffa500),
            alpha: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Vertical field of view, in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 1.0,
            far: 10000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowMapSettings {
    pub enabled: bool,
}

impl Default for ShadowMapSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightSettings {
    pub ambient: AmbientLightSettings,
    pub directional1: DirectionalLightSettings,
    pub directional2: DirectionalLightSettings,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            ambient: AmbientLightSettings::default(),
            directional1: DirectionalLightSettings {
                intensity: 0.6,
                ..DirectionalLightSettings::default()
            },
            directional2: DirectionalLightSettings {
                intensity: 0.1,
                ..DirectionalLightSettings::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientLightSettings {
    pub enabled: bool,
    pub color: Color,
}

impl Default for AmbientLightSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            color: Color(0x404040),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightPosition {
    /// Placed above the front edge of the build volume.
    Auto,
    Fixed(Xyz),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalLightSettings {
    pub enabled: bool,
    pub color: Color,
    #[serde(alias = "alpha")]
    pub intensity: f32,
    pub position: LightPosition,
}

impl Default for DirectionalLightSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            color: Color::WHITE,
            intensity: 1.0,
            position: LightPosition::Auto,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorSettings {
    pub enabled: bool,
    pub color: Color,
    /// Extra extent around the build plate, also used to pad camera framing.
    pub margin: f32,
}

impl Default for FloorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            color: Color(0x222222),
            margin: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub enabled: bool,
    pub size1: f32,
    pub size2: f32,
    pub color1: Color,
    pub color2: Color,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            size1: 10.0,
            size2: 100.0,
            color1: Color(0x444444),
            color2: Color(0x333333),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesSettings {
    pub enabled: bool,
}

impl Default for AxesSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    /// Colour applied to selected meshes.
    pub selected: Color,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            selected: Color(0xff0000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SplitSettings {
    /// Centre each split piece on the build plate, resting on `z = 0`.
    pub center_pieces: bool,
}

impl Default for SplitSettings {
    fn default() -> Self {
        Self {
            center_pieces: true,
        }
    }
}
