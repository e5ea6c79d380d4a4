//! First-person camera
//!
//! # Coordinate System
//!
//! Uses a **left-handed** coordinate system:
//! - X: positive right
//! - Y: positive up
//! - Z: positive forward (into screen)
//!
//! # Orientation
//!
//! Orientation is accumulated as yaw/pitch in degrees. The forward vector is
//! rebuilt from them; right and up follow from cross products with world up.
//!
//! - **Yaw**: decreases when the mouse moves right
//! - **Pitch**: increases when the mouse moves down (positive = look down)
//!
//! [`Camera::update`] takes the camera by value and returns the next state,
//! so it can be driven by recorded input in tests.

use crate::math::mat4::Mat4;
use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;
use crate::projection::Projection;

const PITCH_LIMIT_DEGREES: f32 = 89.0;

/// Per-frame input consumed by the camera.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraInput {
    /// `x` strafes along right, `y` moves along forward. Each in `[-1, 1]`.
    pub movement: Vec2,
    /// Relative mouse motion in pixels (`x` right, `y` down). Zero when the
    /// look button is not held.
    pub look_delta: Vec2,
}

/// First-person camera with position, accumulated yaw/pitch and the derived
/// view and projection matrices.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Vec3,
    forward: Vec3,
    up: Vec3,
    right: Vec3,

    total_pitch: f32, // degrees
    total_yaw: f32,   // degrees

    /// Movement speed in units per second.
    pub movement_speed: f32,
    /// Look speed in degrees per mouse pixel per second.
    pub rotation_speed: f32,

    projection: Projection,
    projection_dirty: bool,

    inv_view_matrix: Mat4,
    view_matrix: Mat4,
    projection_matrix: Mat4,
}

impl Camera {
    /// Creates a camera at `origin` looking along +Z.
    pub fn new(fov_angle_degrees: f32, origin: Vec3, aspect_ratio: f32) -> Self {
        let mut camera = Self {
            origin,
            forward: Vec3::UNIT_Z,
            up: Vec3::UNIT_Y,
            right: Vec3::UNIT_X,
            total_pitch: 0.0,
            total_yaw: 0.0,
            movement_speed: 10.0,
            rotation_speed: 10.0,
            projection: Projection::from_degrees(fov_angle_degrees, aspect_ratio, 0.1, 100.0),
            projection_dirty: true,
            inv_view_matrix: Mat4::IDENTITY,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
        };
        camera.calculate_view_matrix();
        camera.calculate_projection_matrix();
        camera
    }

    /// Sets near and far planes.
    pub fn with_planes(mut self, near: f32, far: f32) -> Self {
        self.projection = Projection::new(
            self.projection.fov_y(),
            self.projection.aspect_ratio(),
            near,
            far,
        );
        self.calculate_projection_matrix();
        self
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Advances the camera by one frame.
    ///
    /// Movement is integrated along the current basis, then look input
    /// rebuilds the orientation, then the matrices are refreshed. The
    /// projection is only rebuilt after FOV or aspect ratio changed.
    pub fn update(mut self, input: &CameraInput, delta_time: f32) -> Self {
        let direction = self.forward * input.movement.y + self.right * input.movement.x;
        if direction != Vec3::ZERO {
            self.origin += direction.normalize_or_zero() * self.movement_speed * delta_time;
        }

        self.rotate(input.look_delta, delta_time);

        self.calculate_view_matrix();
        if self.projection_dirty {
            self.calculate_projection_matrix();
        }
        self
    }

    fn rotate(&mut self, look_delta: Vec2, delta_time: f32) {
        if look_delta == Vec2::ZERO {
            return;
        }

        self.total_yaw -= look_delta.x * self.rotation_speed * delta_time;
        self.total_pitch += look_delta.y * self.rotation_speed * delta_time;
        self.total_pitch = self
            .total_pitch
            .clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES);

        let rotation = Mat4::rotation(
            self.total_pitch.to_radians(),
            self.total_yaw.to_radians(),
            0.0,
        );
        self.forward = rotation.transform_vector(Vec3::UNIT_Z).normalize();
    }

    // =========================================================================
    // Matrix Generation
    // =========================================================================

    fn calculate_view_matrix(&mut self) {
        self.right = Vec3::UNIT_Y.cross(self.forward).normalize();
        self.up = self.forward.cross(self.right).normalize();

        self.inv_view_matrix = Mat4::from_axes(self.right, self.up, self.forward, self.origin);
        // An orthonormal basis plus translation is always invertible
        self.view_matrix = self.inv_view_matrix.inverse().unwrap_or(Mat4::IDENTITY);
    }

    fn calculate_projection_matrix(&mut self) {
        self.projection_matrix = self.projection.matrix();
        self.projection_dirty = false;
    }

    // =========================================================================
    // Setters
    // =========================================================================

    pub fn set_fov_angle(&mut self, fov_angle_degrees: f32) {
        self.projection.set_fov_y(fov_angle_degrees.to_radians());
        self.projection_dirty = true;
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.projection.set_aspect_ratio(aspect_ratio);
        self.projection_dirty = true;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Accumulated yaw in degrees.
    pub fn total_yaw(&self) -> f32 {
        self.total_yaw
    }

    /// Accumulated pitch in degrees.
    pub fn total_pitch(&self) -> f32 {
        self.total_pitch
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Camera-to-world matrix (basis rows plus origin).
    pub fn inv_view_matrix(&self) -> &Mat4 {
        &self.inv_view_matrix
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec4::Vec4;
    use approx::assert_relative_eq;

    fn camera() -> Camera {
        Camera::new(60.0, Vec3::ZERO, 1.0)
    }

    #[test]
    fn camera_starts_looking_forward() {
        let camera = camera();
        assert_eq!(camera.forward(), Vec3::UNIT_Z);
        assert_eq!(camera.right(), Vec3::UNIT_X);
        assert_eq!(camera.up(), Vec3::UNIT_Y);
    }

    #[test]
    fn view_matrix_is_valid() {
        let camera = Camera::new(60.0, Vec3::new(0.0, 0.0, -5.0), 1.0);
        let p = camera.view_matrix().transform_point(Vec4::point(0.0, 0.0, 5.0));
        assert_relative_eq!(p.z, 10.0, epsilon = 1e-5);
    }

    #[test]
    fn view_is_inverse_of_inv_view() {
        let input = CameraInput {
            movement: Vec2::new(1.0, 1.0),
            look_delta: Vec2::new(30.0, -12.0),
        };
        let camera = camera().update(&input, 0.1);
        let product = *camera.inv_view_matrix() * *camera.view_matrix();
        for row in 0..4 {
            for col in 0..4 {
                let expected = if row == col { 1.0 } else { 0.0 };
                assert_relative_eq!(product.get(row, col), expected, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn move_forward_changes_position() {
        let input = CameraInput {
            movement: Vec2::new(0.0, 1.0),
            ..Default::default()
        };
        let mut camera = camera();
        camera.movement_speed = 3.0;
        let camera = camera.update(&input, 0.5);
        assert_relative_eq!(camera.origin().z, 1.5, epsilon = 1e-5);
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let input = CameraInput {
            movement: Vec2::new(1.0, 1.0),
            ..Default::default()
        };
        let mut camera = camera();
        camera.movement_speed = 2.0;
        let camera = camera.update(&input, 1.0);
        assert_relative_eq!(camera.origin().magnitude(), 2.0, epsilon = 1e-5);
        assert!(camera.origin().x > 0.0 && camera.origin().z > 0.0);
    }

    #[test]
    fn mouse_right_decreases_yaw_and_mouse_down_increases_pitch() {
        let input = CameraInput {
            look_delta: Vec2::new(5.0, 3.0),
            ..Default::default()
        };
        let camera = camera().update(&input, 0.1);
        assert_relative_eq!(camera.total_yaw(), -5.0, epsilon = 1e-5);
        assert_relative_eq!(camera.total_pitch(), 3.0, epsilon = 1e-5);
        // Positive pitch looks down
        assert!(camera.forward().y < 0.0);
    }

    #[test]
    fn pitch_is_clamped() {
        let input = CameraInput {
            look_delta: Vec2::new(0.0, 10_000.0),
            ..Default::default()
        };
        let camera = camera().update(&input, 1.0);
        assert_eq!(camera.total_pitch(), PITCH_LIMIT_DEGREES);
        assert!(camera.right().is_finite());
    }

    #[test]
    fn update_leaves_previous_state_untouched() {
        let before = camera();
        let input = CameraInput {
            movement: Vec2::new(0.0, 1.0),
            look_delta: Vec2::new(1.0, 1.0),
        };
        let after = before.clone().update(&input, 1.0);
        assert_eq!(before.origin(), Vec3::ZERO);
        assert_ne!(after.origin(), before.origin());
    }

    #[test]
    fn projection_rebuilds_after_aspect_change() {
        let mut camera = camera();
        let before = *camera.projection_matrix();
        camera.set_aspect_ratio(2.0);
        assert_eq!(*camera.projection_matrix(), before);

        let camera = camera.update(&CameraInput::default(), 0.016);
        assert_relative_eq!(
            camera.projection_matrix().get(0, 0),
            before.get(0, 0) / 2.0,
            epsilon = 1e-5
        );
    }
}
