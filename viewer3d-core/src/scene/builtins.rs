//! Built-in scene elements and their constructors.

use nalgebra::{Point3, Vector3};

use crate::config::{DirectionalLightSettings, LightPosition, ViewerSettings};
use crate::scene::element::{ElementKind, InputBinding};

/// The fixed set of infrastructure elements a viewer can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltIn {
    Center,
    AmbientLight,
    DirectionalLight1,
    DirectionalLight2,
    Floor,
    Grid,
    Axes,
    BuildVolume,
}

/// Everything needed to register a built-in, minus its render handle.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltInElement {
    pub kind: ElementKind,
    pub position: Vector3<f32>,
    pub render_order: u64,
    pub bindings: Vec<InputBinding>,
}

impl BuiltInElement {
    fn new(kind: ElementKind, position: Vector3<f32>) -> Self {
        Self {
            kind,
            position,
            render_order: 0,
            bindings: Vec::new(),
        }
    }

    fn drawn_at(mut self, render_order: u64) -> Self {
        self.render_order = render_order;
        self
    }
}

impl BuiltIn {
    pub const ALL: [BuiltIn; 8] = [
        BuiltIn::Center,
        BuiltIn::AmbientLight,
        BuiltIn::DirectionalLight1,
        BuiltIn::DirectionalLight2,
        BuiltIn::Floor,
        BuiltIn::Grid,
        BuiltIn::Axes,
        BuiltIn::BuildVolume,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltIn::Center => "center",
            BuiltIn::AmbientLight => "ambientLight",
            BuiltIn::DirectionalLight1 => "directionalLight1",
            BuiltIn::DirectionalLight2 => "directionalLight2",
            BuiltIn::Floor => "floor",
            BuiltIn::Grid => "grid",
            BuiltIn::Axes => "axes",
            BuiltIn::BuildVolume => "buildVolume",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    /// Whether the settings ask for this element at start-up.
    pub fn enabled(self, settings: &ViewerSettings) -> bool {
        match self {
            BuiltIn::Center => true,
            BuiltIn::AmbientLight => settings.lights.ambient.enabled,
            BuiltIn::DirectionalLight1 => settings.lights.directional1.enabled,
            BuiltIn::DirectionalLight2 => settings.lights.directional2.enabled,
            BuiltIn::Floor => settings.floor.enabled,
            BuiltIn::Grid => settings.grid.enabled,
            BuiltIn::Axes => settings.axes.enabled,
            BuiltIn::BuildVolume => settings.build_volume.enabled,
        }
    }

    /// Construct the element from the current settings. `center` is where
    /// the `center` anchor currently is.
    pub fn build(self, settings: &ViewerSettings, center: Point3<f32>) -> BuiltInElement {
        match self {
            BuiltIn::Center => center_anchor(center),
            BuiltIn::AmbientLight => ambient_light(settings),
            BuiltIn::DirectionalLight1 => {
                directional_light(1, &settings.lights.directional1, settings, center)
            }
            BuiltIn::DirectionalLight2 => {
                directional_light(2, &settings.lights.directional2, settings, center)
            }
            BuiltIn::Floor => floor(settings),
            BuiltIn::Grid => grid(settings),
            BuiltIn::Axes => axes(settings),
            BuiltIn::BuildVolume => build_volume(settings),
        }
    }
}

fn center_anchor(center: Point3<f32>) -> BuiltInElement {
    BuiltInElement::new(ElementKind::Center, center.coords)
}

fn ambient_light(settings: &ViewerSettings) -> BuiltInElement {
    let kind = ElementKind::AmbientLight {
        color: settings.lights.ambient.color,
    };
    BuiltInElement::new(kind, Vector3::zeros())
}

fn directional_light(
    index: u8,
    light: &DirectionalLightSettings,
    settings: &ViewerSettings,
    center: Point3<f32>,
) -> BuiltInElement {
    let size = settings.build_volume.size;
    let position = match light.position {
        // Light 1 sits over the front-left corner, light 2 over the front-right.
        LightPosition::Auto => {
            let x = if index == 1 { 0.0 } else { size.x };
            Vector3::new(x, 0.0, size.z / 1.5)
        }
        LightPosition::Fixed(xyz) => xyz.to_vector(),
    };
    let kind = ElementKind::DirectionalLight {
        index,
        color: light.color,
        intensity: light.intensity,
        cast_shadow: settings.shadow_map.enabled,
        target: center,
    };
    BuiltInElement::new(kind, position)
}

fn floor(settings: &ViewerSettings) -> BuiltInElement {
    let size = settings.build_volume.size;
    let margin = settings.floor.margin;
    let kind = ElementKind::Floor {
        width: size.x + margin,
        depth: size.y + margin,
        color: settings.floor.color,
        receive_shadow: settings.shadow_map.enabled,
    };
    let mut element =
        BuiltInElement::new(kind, Vector3::new(size.x / 2.0, size.y / 2.0, 0.0)).drawn_at(1);
    element.bindings.push(InputBinding::DoubleClick);
    element
}

fn grid(settings: &ViewerSettings) -> BuiltInElement {
    let size = settings.build_volume.size;
    let kind = ElementKind::Grid {
        width: size.x,
        depth: size.y,
        minor_step: settings.grid.size1,
        major_step: settings.grid.size2,
        minor_color: settings.grid.color1,
        major_color: settings.grid.color2,
    };
    BuiltInElement::new(kind, Vector3::zeros()).drawn_at(2)
}

fn axes(settings: &ViewerSettings) -> BuiltInElement {
    let kind = ElementKind::Axes {
        length: settings.build_volume.size.to_vector(),
    };
    BuiltInElement::new(kind, Vector3::zeros()).drawn_at(3)
}

fn build_volume(settings: &ViewerSettings) -> BuiltInElement {
    let volume = &settings.build_volume;
    let size = volume.size.to_vector();
    let kind = ElementKind::BuildVolume {
        size,
        color: volume.color,
        opacity: volume.alpha,
    };
    BuiltInElement::new(kind, size / 2.0).drawn_at(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_table_round_trip() {
        for builtin in BuiltIn::ALL {
            assert_eq!(BuiltIn::from_name(builtin.name()), Some(builtin));
        }
        assert_eq!(BuiltIn::from_name("mesh-1"), None);
    }

    #[test]
    fn test_floor_is_clickable_and_padded() {
        let settings = ViewerSettings::default();
        let floor = BuiltIn::Floor.build(&settings, settings.volume_center());
        assert_eq!(floor.bindings, vec![InputBinding::DoubleClick]);
        assert_eq!(floor.render_order, 1);
        assert_eq!(floor.position, Vector3::new(100.0, 100.0, 0.0));
        match floor.kind {
            ElementKind::Floor { width, depth, .. } => {
                assert_eq!((width, depth), (210.0, 210.0));
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_directional_lights_flank_the_volume() {
        let settings = ViewerSettings::default();
        let center = settings.volume_center();
        let left = BuiltIn::DirectionalLight1.build(&settings, center);
        let right = BuiltIn::DirectionalLight2.build(&settings, center);
        assert_eq!(left.position.x, 0.0);
        assert_eq!(right.position.x, 200.0);
        match right.kind {
            ElementKind::DirectionalLight { target, intensity, .. } => {
                assert_eq!(target, center);
                assert_eq!(intensity, 0.1);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_build_volume_box_is_centred() {
        let settings = ViewerSettings::default();
        let element = BuiltIn::BuildVolume.build(&settings, settings.volume_center());
        assert_eq!(element.position, Vector3::new(100.0, 100.0, 100.0));
        assert_eq!(element.render_order, 4);
    }
}
