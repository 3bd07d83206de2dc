//! This module implements the Camera structure. Cameras can either be perspective (typical for 3D)
//! or orthographic (typical for 2D and tools), and hand the renderer the five-plane frustum used
//! for visibility culling.

use super::frustum::Frustum;
use super::plane::Plane;

#[derive(Debug, Copy, Clone)]
/// Which kind of projection the camera uses.
pub enum ProjectionKind {
    Perspective {
        fov: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

impl Default for ProjectionKind {
    fn default() -> Self {
        Self::Perspective {
            fov: 1.2,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Default, Debug, Copy, Clone)]
/// A camera data structure
pub struct Camera {
    position: nalgebra_glm::Vec3,
    lookat: nalgebra_glm::Vec3,
    up: nalgebra_glm::Vec3,
    pub projection_kind: ProjectionKind,

    view_matrix: nalgebra_glm::Mat4,
    proj_matrix: nalgebra_glm::Mat4,
}

/// The orthographic volume recovered from a projection matrix
struct OrthoExtents {
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    near: f32,
}

/// Recover the orthographic extents from the projection matrix's scale and translation terms
fn ortho_extents(proj: &nalgebra_glm::Mat4) -> OrthoExtents {
    OrthoExtents {
        left: -(proj[(0, 3)] + 1.0) / proj[(0, 0)],
        right: (1.0 - proj[(0, 3)]) / proj[(0, 0)],
        bottom: -(proj[(1, 3)] + 1.0) / proj[(1, 1)],
        top: (1.0 - proj[(1, 3)]) / proj[(1, 1)],
        near: (proj[(2, 3)] + 1.0) / proj[(2, 2)],
    }
}

impl Camera {
    /// Creates a new camera data structure
    pub fn new(
        position: nalgebra_glm::Vec3,
        lookat: nalgebra_glm::Vec3,
        up: nalgebra_glm::Vec3,
        projection_kind: ProjectionKind,
    ) -> Self {
        let mut retval = Self {
            position,
            lookat,
            up,
            projection_kind,
            view_matrix: nalgebra_glm::identity(),
            proj_matrix: nalgebra_glm::identity(),
        };
        retval.regen_view_proj_matrices();
        retval
    }

    /// Retrieves the camera's view and projection matrices
    pub fn view_proj_matrices(&self) -> (nalgebra_glm::Mat4, nalgebra_glm::Mat4) {
        (self.view_matrix, self.proj_matrix)
    }

    /// Regenerates the camera's view and projection matrices. Call after mutating
    /// `projection_kind` directly.
    pub fn regen_view_proj_matrices(&mut self) {
        let view_matrix = nalgebra_glm::look_at(&self.position, &self.lookat, &self.up);
        let proj_matrix = match self.projection_kind {
            ProjectionKind::Perspective {
                fov,
                aspect,
                near,
                far,
            } => nalgebra_glm::perspective(aspect, fov, near, far),
            ProjectionKind::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => nalgebra_glm::ortho(left, right, bottom, top, near, far),
        };

        self.view_matrix = view_matrix;
        self.proj_matrix = proj_matrix;
    }

    /// Whether this camera uses an orthographic projection
    pub fn is_orthographic(&self) -> bool {
        matches!(self.projection_kind, ProjectionKind::Orthographic { .. })
    }

    /// Build the five culling planes for this camera, with inward-facing normals.
    ///
    /// Perspective planes all pass through the eye point, so a sphere's visibility depends only
    /// on its offset from the eye. Orthographic planes do not converge, so each is anchored at
    /// `position + axis * extent`, with the axes taken from the inverse view matrix and the
    /// extents recovered from the projection matrix.
    pub fn build_frustum(&self) -> Frustum {
        let inv_view = nalgebra_glm::inverse(&self.view_matrix);
        let right = nalgebra_glm::vec3(inv_view[(0, 0)], inv_view[(1, 0)], inv_view[(2, 0)]).normalize();
        let up = nalgebra_glm::vec3(inv_view[(0, 1)], inv_view[(1, 1)], inv_view[(2, 1)]).normalize();
        // The view looks down -z, so the third basis column points backward
        let forward = -nalgebra_glm::vec3(inv_view[(0, 2)], inv_view[(1, 2)], inv_view[(2, 2)]).normalize();

        match self.projection_kind {
            ProjectionKind::Perspective { fov, aspect, .. } => {
                let eye = self.position;
                let tan_v = (fov * 0.5).tan();
                let tan_h = tan_v * aspect;
                Frustum::new(
                    Plane::from_center_normal(eye, forward),
                    Plane::from_center_normal(eye, forward * tan_v - up),
                    Plane::from_center_normal(eye, forward * tan_v + up),
                    Plane::from_center_normal(eye, forward * tan_h - right),
                    Plane::from_center_normal(eye, forward * tan_h + right),
                )
            }
            ProjectionKind::Orthographic { .. } => {
                let eye = nalgebra_glm::vec3(inv_view[(0, 3)], inv_view[(1, 3)], inv_view[(2, 3)]);
                let extents = ortho_extents(&self.proj_matrix);
                Frustum::new(
                    Plane::from_center_normal(eye + forward * extents.near, forward),
                    Plane::from_center_normal(eye + up * extents.top, -up),
                    Plane::from_center_normal(eye + up * extents.bottom, up),
                    Plane::from_center_normal(eye + right * extents.right, -right),
                    Plane::from_center_normal(eye + right * extents.left, right),
                )
            }
        }
    }

    /// Sets the position of the camera. This regenerates the view and projection matrix.
    pub fn set_position(&mut self, position: nalgebra_glm::Vec3) {
        self.position = position;
        self.regen_view_proj_matrices()
    }

    /// Sets the lookat of the camera. This regenerates the view and projection matrix.
    pub fn set_lookat(&mut self, lookat: nalgebra_glm::Vec3) {
        self.lookat = lookat;
        self.regen_view_proj_matrices()
    }

    /// Retrieves the position of the camera
    pub fn position(&self) -> nalgebra_glm::Vec3 {
        self.position
    }

    /// Retrieves the lookat of the camera
    pub fn lookat(&self) -> nalgebra_glm::Vec3 {
        self.lookat
    }

    /// Retrieves the up direction for the camera
    pub fn up(&self) -> nalgebra_glm::Vec3 {
        self.up
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sphere::BoundingSphere;

    fn perspective_camera(position: nalgebra_glm::Vec3) -> Camera {
        Camera::new(
            position,
            nalgebra_glm::vec3(0.0, 0.0, 0.0),
            nalgebra_glm::vec3(0.0, 1.0, 0.0),
            ProjectionKind::Perspective {
                fov: 1.2,
                aspect: 16.0 / 9.0,
                near: 0.1,
                far: 1000.0,
            },
        )
    }

    fn orthographic_camera(position: nalgebra_glm::Vec3) -> Camera {
        Camera::new(
            position,
            nalgebra_glm::vec3(0.0, 0.0, 0.0),
            nalgebra_glm::vec3(0.0, 1.0, 0.0),
            ProjectionKind::Orthographic {
                left: -10.0,
                right: 10.0,
                bottom: -10.0,
                top: 10.0,
                near: -1000.0,
                far: 1000.0,
            },
        )
    }

    #[test]
    fn test_ortho_extents_roundtrip() {
        let proj = nalgebra_glm::ortho(-4.0, 6.0, -2.0, 8.0, 0.5, 100.0);
        let extents = ortho_extents(&proj);
        assert!((extents.left - -4.0).abs() < 1e-4);
        assert!((extents.right - 6.0).abs() < 1e-4);
        assert!((extents.bottom - -2.0).abs() < 1e-4);
        assert!((extents.top - 8.0).abs() < 1e-4);
        assert!((extents.near - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_is_orthographic() {
        assert!(!perspective_camera(nalgebra_glm::vec3(0.0, 0.0, 5.0)).is_orthographic());
        assert!(orthographic_camera(nalgebra_glm::vec3(0.0, 0.0, 5.0)).is_orthographic());
    }

    #[test]
    fn test_eye_sphere_visible_in_both_projections() {
        // A tiny sphere sitting right at the eye point is visible either way.
        let eye = nalgebra_glm::vec3(3.0, 4.0, 5.0);
        let sphere = BoundingSphere::new(nalgebra_glm::vec3(0.0, 0.0, 0.0), 0.01);
        let at_eye = nalgebra_glm::translation(&eye);

        let perspective = perspective_camera(eye);
        assert!(sphere.within_frustum(&perspective.build_frustum(), &at_eye));

        let orthographic = orthographic_camera(eye);
        assert!(sphere.within_frustum(&orthographic.build_frustum(), &at_eye));
    }

    #[test]
    fn test_sphere_ahead_and_behind_perspective() {
        let camera = perspective_camera(nalgebra_glm::vec3(0.0, 0.0, 10.0));
        let frustum = camera.build_frustum();
        let sphere = BoundingSphere::new(nalgebra_glm::vec3(0.0, 0.0, 0.0), 1.0);

        // Looking from +z toward the origin: the origin is ahead, +z beyond the eye is behind.
        let ahead: nalgebra_glm::Mat4 = nalgebra_glm::identity();
        assert!(sphere.within_frustum(&frustum, &ahead));

        let behind = nalgebra_glm::translation(&nalgebra_glm::vec3(0.0, 0.0, 20.0));
        assert!(!sphere.within_frustum(&frustum, &behind));
    }

    #[test]
    fn test_sphere_outside_ortho_side_plane() {
        let camera = orthographic_camera(nalgebra_glm::vec3(0.0, 0.0, 10.0));
        let frustum = camera.build_frustum();
        let sphere = BoundingSphere::new(nalgebra_glm::vec3(0.0, 0.0, 0.0), 1.0);

        let inside: nalgebra_glm::Mat4 = nalgebra_glm::identity();
        assert!(sphere.within_frustum(&frustum, &inside));

        // Beyond the right extent (10) by more than the radius
        let outside = nalgebra_glm::translation(&nalgebra_glm::vec3(12.0, 0.0, 0.0));
        assert!(!sphere.within_frustum(&frustum, &outside));

        // Poking past the extent by less than the radius: still visible
        let straddling = nalgebra_glm::translation(&nalgebra_glm::vec3(10.5, 0.0, 0.0));
        assert!(sphere.within_frustum(&frustum, &straddling));
    }
}
