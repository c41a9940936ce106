//! Perspective camera for view and projection matrix generation.
//!
//! Uses conventional depth: the near plane maps to 0.0 and the far plane to
//! 1.0, so ordinary geometry is depth-tested with `Less` and the stencil
//! volume passes can flip to `GreaterEqual`.

use glam::{Mat4, Quat, Vec3};

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye position in world space.
    pub position: Vec3,
    /// Orientation as a unit quaternion; identity looks down -Z.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl Camera {
    /// Camera with the given projection, at the origin looking down -Z.
    pub fn perspective(fov_y: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y,
            aspect_ratio,
            near,
            far,
        }
    }

    /// Moves the eye and turns it toward `target`.
    ///
    /// `up` must not be parallel to the view direction.
    pub fn look_at(&mut self, position: Vec3, target: Vec3, up: Vec3) {
        self.position = position;
        let view = Mat4::look_at_rh(position, target, up);
        self.rotation = Quat::from_mat4(&view.inverse()).normalize();
    }

    /// Compute the view matrix (inverse of camera transform).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.near, self.far)
    }

    /// Compute the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// The forward direction vector (-Z in camera space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// The up direction vector (+Y in camera space).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// The right direction vector (+X in camera space).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Update the aspect ratio from a drawable size.
    ///
    /// Zero-sized drawables are ignored so the projection never degenerates.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(70f32.to_radians(), 1.0, 0.01, 10000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_identity_camera_looks_down_neg_z() {
        let forward = Camera::default().forward();
        assert!((forward - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_set_aspect_ratio() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(800.0, 600.0);
        assert!((camera.aspect_ratio - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_height_keeps_aspect() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(800.0, 0.0);
        assert_eq!(camera.aspect_ratio, 1.0);
    }

    #[test]
    fn test_look_at_points_forward_at_target() {
        let mut camera = Camera::default();
        camera.look_at(Vec3::splat(2.5), Vec3::ZERO, Vec3::Y);
        let expected = (Vec3::ZERO - Vec3::splat(2.5)).normalize();
        assert!((camera.forward() - expected).length() < 1e-5);
        assert!(camera.up().y > 0.0);
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let mut camera = Camera::default();
        camera.look_at(Vec3::new(2.5, 2.5, 2.5), Vec3::ZERO, Vec3::Y);
        let clip = camera.view_projection_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_depth_range_is_zero_to_one() {
        let camera = Camera::default();
        let proj = camera.projection_matrix();
        let near = proj * Vec4::new(0.0, 0.0, -camera.near, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -camera.far, 1.0);
        assert!((near.z / near.w).abs() < 1e-4);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_up_right_forward_orthogonal() {
        let mut camera = Camera::default();
        camera.look_at(Vec3::new(2.5, 2.5, 2.5), Vec3::ZERO, Vec3::Y);
        let (f, u, r) = (camera.forward(), camera.up(), camera.right());
        assert!(f.dot(u).abs() < 1e-5);
        assert!(f.dot(r).abs() < 1e-5);
        assert!(u.dot(r).abs() < 1e-5);
    }
}
