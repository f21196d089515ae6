/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Matrix4;
use std::collections::HashSet;
use std::io::Write;
use viewer3d_core::backend::{RenderBackend, RenderHandle, Renderable, PALETTE};
use viewer3d_core::material::{Color as MeshColor, MaterialColor, MaterialSettings};
use viewer3d_core::scene::{ElementKind, ElementRegistry};
use viewer3d_core::{Camera, MeshGeometry, Triangle};

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Lowest brightness a lit face is drawn with, so back-lit faces stay visible.
const AMBIENT: f32 = 0.15;

/// Renders the scene's meshes into a character grid
pub struct AsciiBackend {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
    camera: Camera,
    next_handle: u64,
    palette_cursor: usize,
    live: HashSet<RenderHandle>,
    frames: usize,
}

impl AsciiBackend {
    pub fn new(width: usize, height: usize, camera: Camera) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
            camera,
            next_handle: 0,
            palette_cursor: 0,
            live: HashSet::new(),
            frames: 0,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        let size = width * height;
        self.width = width;
        self.height = height;
        self.depth_buffer = vec![f32::INFINITY; size];
        self.char_buffer = vec![' '; size];
        self.color_buffer = vec![Color::Reset; size];
        self.camera.resize(width as u32, height as u32);
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Rows of the last rendered frame.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.char_buffer
            .chunks(self.width.max(1))
            .map(|row| row.iter().collect())
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    fn allocate(&mut self) -> RenderHandle {
        let handle = RenderHandle(self.next_handle);
        self.next_handle += 1;
        self.live.insert(handle);
        handle
    }

    fn render_mesh(&mut self, geometry: &MeshGeometry, model_matrix: &Matrix4<f32>, color: MeshColor) {
        for face in &geometry.faces {
            let triangle = geometry.triangle(face);
            self.render_triangle(&triangle, model_matrix, color);
        }
    }

    fn render_triangle(&mut self, triangle: &Triangle, model_matrix: &Matrix4<f32>, color: MeshColor) {
        // Project vertices to screen space
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (slot, vertex) in screen_coords.iter_mut().zip(triangle.positions()) {
            match self.camera.project_to_screen(
                &vertex,
                model_matrix,
                self.width as u32,
                self.height as u32,
            ) {
                Some(projected) => *slot = projected,
                None => return, // Triangle is clipped
            }
        }

        // Shade against a light sitting at the camera
        let normal = model_matrix.transform_vector(&triangle.calculate_normal());
        let light_dir = (self.camera.position - self.camera.target).normalize();
        let brightness = normal
            .try_normalize(1e-6)
            .map_or(0.0, |normal| normal.dot(&light_dir).abs())
            .max(AMBIENT);

        // Map brightness to character
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let char_index = char_index.min(LUMINOSITY_RAMP.len() - 1);
        let character = LUMINOSITY_RAMP[char_index];

        self.rasterize_triangle(&screen_coords, character, shade(color, brightness));
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char, color: Color) {
        let [v0, v1, v2] = *coords;

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        // Scanline rasterization
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                // Interpolate depth
                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.char_buffer[idx] = character;
                    self.color_buffer[idx] = color;
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl RenderBackend for AsciiBackend {
    fn create_mesh(&mut self, _geometry: &MeshGeometry, material: &MaterialSettings) -> Renderable {
        let color = match material.color {
            MaterialColor::Fixed(color) => color,
            MaterialColor::Random => {
                let color = PALETTE[self.palette_cursor % PALETTE.len()];
                self.palette_cursor += 1;
                color
            }
        };
        Renderable {
            handle: self.allocate(),
            color,
        }
    }

    fn create_helper(&mut self, name: &str, _kind: &ElementKind) -> RenderHandle {
        log::trace!("helper {name}");
        self.allocate()
    }

    // Geometry is read from the registry on every frame.
    fn update_geometry(&mut self, _handle: RenderHandle, _geometry: &MeshGeometry) {}

    fn dispose(&mut self, handle: RenderHandle) {
        self.live.remove(&handle);
    }

    fn render(&mut self, elements: &ElementRegistry) {
        self.clear();

        let mut meshes: Vec<_> = elements
            .iter()
            .filter(|(_, element)| element.visible)
            .filter_map(|(_, element)| element.as_mesh().map(|mesh| (element, mesh)))
            .collect();
        meshes.sort_by_key(|(element, _)| element.render_order);

        for (element, mesh) in meshes {
            let model = element.transform.model_matrix();
            self.render_mesh(mesh.geometry(), &model, mesh.color());
        }
        self.frames += 1;
    }
}

/// Scale a mesh colour by the face brightness.
fn shade(color: MeshColor, brightness: f32) -> Color {
    let (r, g, b) = color.rgb();
    let scale = |channel: u8| (channel as f32 * brightness).round().clamp(0.0, 255.0) as u8;
    Color::Rgb {
        r: scale(r),
        g: scale(g),
        b: scale(b),
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewer3d_core::config::ViewerSettings;
    use viewer3d_core::geometry::cube;
    use viewer3d_core::{Scene, View};
    use nalgebra::Point3;

    fn world_centroid(geometry: &MeshGeometry, model: &Matrix4<f32>) -> Point3<f32> {
        let sum = geometry
            .vertices
            .iter()
            .fold(Point3::origin().coords, |acc, vertex| acc + vertex.coords);
        model.transform_point(&Point3::from(sum / geometry.vertices.len().max(1) as f32))
    }

    fn backend(settings: &ViewerSettings) -> AsciiBackend {
        let mut camera = Camera::new(&settings.camera, 80, 40);
        camera.set_view(
            View::Front,
            &settings.build_volume.size,
            settings.floor.margin,
            settings.volume_center(),
        );
        AsciiBackend::new(80, 40, camera)
    }

    #[test]
    fn test_barycentric_inside_and_degenerate() {
        let (w0, w1, w2) = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (1.0, 1.0)).unwrap();
        assert!(w0 > 0.0 && w1 > 0.0 && w2 > 0.0);
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 1.0)).is_none());
    }

    #[test]
    fn test_shade_scales_channels() {
        assert_eq!(shade(MeshColor(0xff8000), 0.5), Color::Rgb { r: 128, g: 64, b: 0 });
    }

    #[test]
    fn test_scene_renders_mesh_pixels() {
        let settings = ViewerSettings::default();
        let mut scene = Scene::new(settings.clone(), backend(&settings)).unwrap();
        let id = scene.add_mesh("cube", &cube(60.0), None, true).unwrap();
        scene.render();

        let element = scene.element(&id.key()).unwrap();
        let centroid = world_centroid(
            scene.mesh(id).unwrap().geometry(),
            &element.transform.model_matrix(),
        );
        assert!(scene
            .backend()
            .camera()
            .project_to_screen(&centroid, &Matrix4::identity(), 80, 40)
            .is_some());

        let drawn: usize = scene
            .backend()
            .lines()
            .map(|line| line.chars().filter(|c| *c != ' ').count())
            .sum();
        assert!(drawn > 0);
        assert_eq!(scene.backend().frames(), 1);
    }

    #[test]
    fn test_hidden_and_removed_meshes_are_not_drawn() {
        let settings = ViewerSettings::default();
        let mut scene = Scene::new(settings.clone(), backend(&settings)).unwrap();
        let id = scene.add_mesh("cube", &cube(60.0), None, true).unwrap();
        let live = scene.backend().live_count();

        scene.toggle_element(&id.key(), Some(false)).unwrap();
        scene.render();
        assert!(scene.backend().lines().all(|line| line.trim().is_empty()));

        scene.remove_mesh(id).unwrap();
        assert_eq!(scene.backend().live_count(), live - 1);
    }
}
