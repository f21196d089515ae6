//! Colours and mesh materials.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 24-bit RGB colour, stored as `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xffffff);

    pub fn hex(self) -> u32 {
        self.0
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xff) as u8,
            ((self.0 >> 8) & 0xff) as u8,
            (self.0 & 0xff) as u8,
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0 & 0xffffff)
    }
}

/// How a material picks its colour when a mesh is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialColor {
    /// The backend chooses a colour per mesh.
    Random,
    Fixed(Color),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shading {
    Lambert,
    Phong,
    Basic,
}

/// A registered material recipe, looked up by id when a mesh is added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialSettings {
    pub shading: Shading,
    pub color: MaterialColor,
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            shading: Shading::Lambert,
            color: MaterialColor::Random,
        }
    }
}

/// Material state of one mesh.
///
/// The colour shown before the first highlight is cached once, so any
/// number of highlight/restore cycles returns to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    id: String,
    color: Color,
    original_color: Option<Color>,
}

impl Material {
    pub fn new(id: impl Into<String>, color: Color) -> Self {
        Self {
            id: id.into(),
            color,
            original_color: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn original_color(&self) -> Option<Color> {
        self.original_color
    }

    pub fn highlight(&mut self, highlight: Color) {
        let current = self.color;
        self.original_color.get_or_insert(current);
        self.color = highlight;
    }

    pub fn restore(&mut self) {
        if let Some(original) = self.original_color {
            self.color = original;
        }
    }
}
