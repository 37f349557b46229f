//! A first-person fly camera driven by WASD, mouse look, and scroll zoom.
//!
//! Angles are kept in degrees. Yaw −90° looks down −Z; pitch is clamped to
//! ±89° so the view never flips over the pole, and the field of view is
//! clamped to [1°, 45°].
//!
//! ```
//! use primer::{Camera, CameraMovement, Vec3};
//!
//! let mut camera = Camera::new(Vec3::new(-1.0, 2.0, 3.0));
//! camera.process_keyboard(CameraMovement::Forward, 0.016);
//! camera.process_mouse_movement(12.0, -4.0);
//! camera.process_mouse_scroll(1.0);
//!
//! let view = camera.view_matrix();
//! let proj = camera.projection_matrix(800.0 / 600.0);
//! # let _ = (view, proj);
//! ```

use glam::{Mat4, Vec2, Vec3};
use winit::keyboard::KeyCode;

use crate::input::Input;

/// Degrees; looks down −Z.
pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
/// Units per second.
pub const DEFAULT_SPEED: f32 = 2.5;
/// Degrees per pixel.
pub const DEFAULT_SENSITIVITY: f32 = 0.1;
/// Vertical field of view in degrees.
pub const DEFAULT_FOV: f32 = 45.0;

/// Largest pitch magnitude in degrees.
pub const PITCH_LIMIT: f32 = 89.0;
/// Narrowest zoom in degrees.
pub const MIN_FOV: f32 = 1.0;
/// Widest zoom in degrees.
pub const MAX_FOV: f32 = 45.0;

/// Discrete movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    /// Along the view direction (W).
    Forward,
    /// Against the view direction (S).
    Backward,
    /// Strafe left (A).
    Left,
    /// Strafe right (D).
    Right,
}

/// Fly camera state.
///
/// `front`, `right`, and `up` are derived from yaw and pitch and refreshed
/// whenever the angles change.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    /// Degrees.
    yaw: f32,
    /// Degrees.
    pitch: f32,
    /// Vertical field of view in degrees.
    fov: f32,
    /// Units per second.
    pub speed: f32,
    /// Degrees per pixel of mouse movement.
    pub sensitivity: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Camera {
    /// A camera at `position` looking down −Z with +Y up.
    pub fn new(position: Vec3) -> Self {
        Self::with_angles(position, Vec3::Y, DEFAULT_YAW, DEFAULT_PITCH)
    }

    /// A camera with explicit angles in degrees. `pitch` is clamped to
    /// [`PITCH_LIMIT`].
    pub fn with_angles(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: world_up,
            right: Vec3::X,
            world_up,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            fov: DEFAULT_FOV,
            speed: DEFAULT_SPEED,
            sensitivity: DEFAULT_SENSITIVITY,
            near: 0.1,
            far: 100.0,
        };
        camera.update_vectors();
        camera
    }

    /// World-space eye position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit view direction.
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Unit vector to the camera's right, perpendicular to world up.
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Unit camera up vector.
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Degrees.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Degrees, within ±[`PITCH_LIMIT`].
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees, within [[`MIN_FOV`], [`MAX_FOV`]].
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Right-handed look-at matrix from the position along `front`.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection with a `[0, 1]` depth range.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near, self.far)
    }

    /// Moves the camera by `speed * dt` along the given direction.
    pub fn process_keyboard(&mut self, direction: CameraMovement, dt: f32) {
        let velocity = self.speed * dt;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Rotates by a mouse offset in pixels. Positive `y_offset` looks up.
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.sensitivity;
        self.pitch = (self.pitch + y_offset * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// Zooms in for positive scroll, out for negative.
    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.fov = (self.fov - y_offset).clamp(MIN_FOV, MAX_FOV);
    }

    /// Applies one frame of WASD, mouse, and scroll input.
    pub fn update(&mut self, input: &Input, dt: f32) {
        const BINDINGS: [(KeyCode, CameraMovement); 4] = [
            (KeyCode::KeyW, CameraMovement::Forward),
            (KeyCode::KeyS, CameraMovement::Backward),
            (KeyCode::KeyA, CameraMovement::Left),
            (KeyCode::KeyD, CameraMovement::Right),
        ];

        for (key, movement) in BINDINGS {
            if input.key_down(key) {
                self.process_keyboard(movement, dt);
            }
        }

        // window y grows downward
        let delta = input.mouse_delta();
        if delta != Vec2::ZERO {
            self.process_mouse_movement(delta.x, -delta.y);
        }

        let scroll = input.scroll_delta().y;
        if scroll != 0.0 {
            self.process_mouse_scroll(scroll);
        }
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert!(a.abs_diff_eq(b, 1e-5), "{a} != {b}");
    }

    #[test]
    fn default_orientation_looks_down_negative_z() {
        let camera = Camera::new(Vec3::ZERO);
        assert_vec_eq(camera.front(), Vec3::NEG_Z);
        assert_vec_eq(camera.right(), Vec3::X);
        assert_vec_eq(camera.up(), Vec3::Y);
    }

    #[test]
    fn forward_move_scales_with_dt() {
        for dt in [0.0, 0.001, 0.016, 0.5, 3.0] {
            let start = Vec3::new(-1.0, 2.0, 3.0);
            let mut camera = Camera::new(start);
            camera.process_mouse_movement(37.0, 12.0);
            let front = camera.front();

            camera.process_keyboard(CameraMovement::Forward, dt);
            assert_vec_eq(camera.position(), start + front * DEFAULT_SPEED * dt);
        }
    }

    #[test]
    fn strafing_is_perpendicular_to_front() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_keyboard(CameraMovement::Right, 1.0);
        assert_vec_eq(camera.position(), Vec3::X * DEFAULT_SPEED);
        camera.process_keyboard(CameraMovement::Left, 2.0);
        assert_vec_eq(camera.position(), -Vec3::X * DEFAULT_SPEED);
    }

    #[test]
    fn backward_undoes_forward() {
        let mut camera = Camera::new(Vec3::new(1.0, 1.0, 1.0));
        camera.process_keyboard(CameraMovement::Forward, 0.25);
        camera.process_keyboard(CameraMovement::Backward, 0.25);
        assert_vec_eq(camera.position(), Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn huge_mouse_y_clamps_pitch() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_mouse_movement(0.0, 1000.0);
        assert_eq!(camera.pitch(), PITCH_LIMIT);
        assert!(camera.front().y < 1.0);

        camera.process_mouse_movement(0.0, -5000.0);
        assert_eq!(camera.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn mouse_x_changes_yaw_by_sensitivity() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_mouse_movement(900.0, 0.0);
        assert!((camera.yaw() - 0.0).abs() < 1e-4);
        assert_vec_eq(camera.front(), Vec3::X);
    }

    #[test]
    fn scroll_zoom_is_clamped() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_mouse_scroll(10.0);
        assert_eq!(camera.fov(), 35.0);
        camera.process_mouse_scroll(100.0);
        assert_eq!(camera.fov(), MIN_FOV);
        camera.process_mouse_scroll(-100.0);
        assert_eq!(camera.fov(), MAX_FOV);
    }

    #[test]
    fn view_matrix_moves_eye_to_origin() {
        let camera = Camera::new(Vec3::new(-1.0, 2.0, 3.0));
        let eye = camera.view_matrix().transform_point3(camera.position());
        assert_vec_eq(eye, Vec3::ZERO);
    }

    #[test]
    fn projection_uses_zero_to_one_depth() {
        let camera = Camera::new(Vec3::ZERO);
        let proj = camera.projection_matrix(4.0 / 3.0);
        let near = proj.project_point3(Vec3::new(0.0, 0.0, -camera.near));
        let far = proj.project_point3(Vec3::new(0.0, 0.0, -camera.far));
        assert!(near.z.abs() < 1e-4);
        assert!((far.z - 1.0).abs() < 1e-4);
    }
}
