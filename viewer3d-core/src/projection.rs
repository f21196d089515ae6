/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

use crate::config::{CameraSettings, VolumeSize};

/// Preset camera placements around the build volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Raised three-quarter view from the front.
    #[default]
    Default,
    Front,
    Right,
    Back,
    Left,
    Top,
    Bottom,
}

impl View {
    pub const ALL: [View; 7] = [
        View::Default,
        View::Front,
        View::Right,
        View::Back,
        View::Left,
        View::Top,
        View::Bottom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            View::Default => "default",
            View::Front => "front",
            View::Right => "right",
            View::Back => "back",
            View::Left => "left",
            View::Top => "top",
            View::Bottom => "bottom",
        }
    }

    /// The preset after this one, wrapping around.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|view| *view == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

/// Z-up camera looking at the build volume.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view, in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(settings: &CameraSettings, width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, -5.0, 0.0),
            target: Point3::origin(),
            up: Vector3::z(),
            fov: settings.fov,
            aspect: aspect_ratio(width, height),
            near: settings.near,
            far: settings.far,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    /// Distance at which a `width` x `height` plane, padded by the floor
    /// margin on both sides, fills the view.
    pub fn visible_distance(&self, width: f32, height: f32, margin: f32) -> f32 {
        let margin = margin * 2.0;
        let aspect = width / height;
        let size = if self.aspect < aspect {
            (width + margin) / self.aspect
        } else {
            height + margin
        };
        size / 2.0 / (self.fov.to_radians() / 2.0).tan()
    }

    /// Place the camera for `view`, looking at `target`.
    pub fn set_view(&mut self, view: View, size: &VolumeSize, margin: f32, target: Point3<f32>) {
        let (mut x, mut y, mut z, w, h) = match view {
            View::Default | View::Front => (size.x / 2.0, 0.0, size.z / 2.0, size.x, size.z),
            View::Right => (size.x, size.y / 2.0, size.z / 2.0, size.y, size.z),
            View::Back => (size.x / 2.0, size.y, size.z / 2.0, size.x, size.z),
            View::Left => (0.0, size.y / 2.0, size.z / 2.0, size.y, size.z),
            View::Top => (size.x / 2.0, size.y / 2.0, size.z, size.x, size.y),
            View::Bottom => (size.x / 2.0, size.y / 2.0, 0.0, size.x, size.y),
        };

        let distance = self.visible_distance(w, h, margin);
        match view {
            View::Default | View::Front => y -= distance,
            View::Right => x += distance,
            View::Back => y += distance,
            View::Left => x -= distance,
            View::Top => z += distance,
            View::Bottom => z -= distance,
        }
        if view == View::Default {
            x *= 2.5;
            z *= 2.5;
        }

        self.position = Point3::new(x, y, z);
        self.target = target;
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let forward = (self.target - self.position).normalize();
        // Looking straight along the up axis leaves the roll undefined.
        let up = if forward.cross(&self.up).norm() < 1e-6 {
            Vector3::y()
        } else {
            self.up
        };
        Matrix4::look_at_rh(&self.position, &self.target, &up)
    }

    /// Create the perspective projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov.to_radians(), self.near, self.far)
    }

    /// Project a 3D point to screen space: `(x, y, depth)` with depth in
    /// normalised device coordinates.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = self.projection_matrix() * self.view_matrix() * model_matrix;
        let clip = mvp * Vector4::new(point.x, point.y, point.z, 1.0);

        // Behind the camera or on its plane.
        if clip.w <= 1e-6 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        if !(-1.0..=1.0).contains(&ndc.x) || !(-1.0..=1.0).contains(&ndc.y) {
            return None;
        }

        let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;
        Some((screen_x, screen_y, ndc.z))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&CameraSettings::default(), 800, 600)
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(&CameraSettings::default(), 800, 600);
        assert_eq!(camera.up, Vector3::z());
        assert_relative_eq!(camera.aspect, 800.0 / 600.0);
    }

    #[test]
    fn test_front_view_frames_volume() {
        let mut camera = Camera::new(&CameraSettings::default(), 100, 100);
        let size = VolumeSize::default();
        let center = Point3::new(100.0, 100.0, 100.0);
        camera.set_view(View::Front, &size, 10.0, center);

        let distance = camera.visible_distance(200.0, 200.0, 10.0);
        assert_relative_eq!(camera.position.x, 100.0);
        assert_relative_eq!(camera.position.y, -distance);
        assert_relative_eq!(camera.position.z, 100.0);
        assert_relative_eq!(distance, 110.0 / (37.5f32).to_radians().tan(), epsilon = 1e-3);

        let (x, y, _) = camera
            .project_to_screen(&center, &Matrix4::identity(), 100, 100)
            .unwrap();
        assert_relative_eq!(x, 50.0, epsilon = 1e-3);
        assert_relative_eq!(y, 50.0, epsilon = 1e-3);
    }

    #[test]
    fn test_top_view_has_valid_view_matrix() {
        let mut camera = Camera::default();
        camera.set_view(View::Top, &VolumeSize::default(), 10.0, Point3::new(100.0, 100.0, 100.0));
        let view = camera.view_matrix();
        assert!(view.iter().all(|value| value.is_finite()));
    }

    #[test]
    fn test_points_behind_camera_are_culled() {
        let mut camera = Camera::default();
        camera.set_view(View::Front, &VolumeSize::default(), 10.0, Point3::new(100.0, 100.0, 100.0));
        let behind = Point3::new(100.0, camera.position.y - 50.0, 100.0);
        assert!(camera
            .project_to_screen(&behind, &Matrix4::identity(), 100, 100)
            .is_none());
    }

    #[test]
    fn test_far_points_project_closer_to_center() {
        let mut camera = Camera::new(&CameraSettings::default(), 100, 100);
        camera.position = Point3::new(0.0, -10.0, 0.0);
        camera.target = Point3::origin();

        let near = Point3::new(1.0, 0.0, 0.0);
        let far = Point3::new(1.0, 20.0, 0.0);
        let (near_x, _, near_depth) = camera
            .project_to_screen(&near, &Matrix4::identity(), 100, 100)
            .unwrap();
        let (far_x, _, far_depth) = camera
            .project_to_screen(&far, &Matrix4::identity(), 100, 100)
            .unwrap();
        assert!(near_x > far_x);
        assert!(far_x > 50.0);
        assert!(near_depth < far_depth);
    }

    #[test]
    fn test_views_cycle() {
        assert_eq!(View::Bottom.next(), View::Default);
        assert_eq!(View::Default.next(), View::Front);
    }
}
