//! This module defines the bounding sphere used for visibility culling. Every mesh carries one,
//! computed once from its vertex positions, and the renderer tests it against the camera frustum
//! before dispatching a draw.

use super::aabb::Aabb;
use super::frustum::Frustum;

#[derive(Debug, Copy, Clone)]
/// A sphere guaranteed to enclose all of a mesh's vertices
pub struct BoundingSphere {
    pub origin: nalgebra_glm::Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    /// Create a new bounding sphere
    pub fn new(origin: nalgebra_glm::Vec3, radius: f32) -> Self {
        Self { origin, radius }
    }

    /// The degenerate sphere of an empty vertex set. Never visible.
    pub fn empty() -> Self {
        Self {
            origin: nalgebra_glm::vec3(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            radius: 0.0,
        }
    }

    /// Compute a sphere enclosing every point in the sequence: the center of the points' AABB,
    /// with half the box's space diagonal as the radius. Conservative, not minimal.
    pub fn enclosing(points: impl IntoIterator<Item = nalgebra_glm::Vec3>) -> Self {
        match Aabb::from_points(points) {
            Some(aabb) => Self::new(aabb.center(), aabb.half_diagonal()),
            None => Self::empty(),
        }
    }

    /// Whether this is the degenerate/empty sphere
    pub fn is_empty(&self) -> bool {
        self.radius <= 0.0
    }

    /// Test whether the sphere, carried into world space by `transform`, could intersect the
    /// frustum. Conservative: may report visible for a sphere that is not, never the reverse.
    ///
    /// The local radius is scaled by the longest basis column of the transform's linear part,
    /// which is exact for uniform scale and oversized (never undersized) for non-uniform scale.
    pub fn within_frustum(&self, frustum: &Frustum, transform: &nalgebra_glm::Mat4) -> bool {
        if self.radius <= 0.0 {
            return false;
        }

        let sx = nalgebra_glm::length(&nalgebra_glm::vec3(
            transform[(0, 0)],
            transform[(1, 0)],
            transform[(2, 0)],
        ));
        let sy = nalgebra_glm::length(&nalgebra_glm::vec3(
            transform[(0, 1)],
            transform[(1, 1)],
            transform[(2, 1)],
        ));
        let sz = nalgebra_glm::length(&nalgebra_glm::vec3(
            transform[(0, 2)],
            transform[(1, 2)],
            transform[(2, 2)],
        ));
        let world_radius = self.radius * sx.max(sy).max(sz);

        let world_origin = (transform
            * nalgebra_glm::vec4(self.origin.x, self.origin.y, self.origin.z, 1.0))
        .xyz();

        // A plane excludes the sphere when the center sits at or beyond `radius` behind it.
        // Inclusion is strict: signed distance exactly -radius is out.
        for plane in frustum.planes() {
            if plane.signed_distance(world_origin) <= -world_radius {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::Plane;

    /// A frustum whose planes all sit far away from the origin, facing it
    fn generous_frustum() -> Frustum {
        Frustum::new(
            Plane::from_center_normal(nalgebra_glm::vec3(0.0, 0.0, -100.0), nalgebra_glm::vec3(0.0, 0.0, 1.0)),
            Plane::from_center_normal(nalgebra_glm::vec3(0.0, 100.0, 0.0), nalgebra_glm::vec3(0.0, -1.0, 0.0)),
            Plane::from_center_normal(nalgebra_glm::vec3(0.0, -100.0, 0.0), nalgebra_glm::vec3(0.0, 1.0, 0.0)),
            Plane::from_center_normal(nalgebra_glm::vec3(100.0, 0.0, 0.0), nalgebra_glm::vec3(-1.0, 0.0, 0.0)),
            Plane::from_center_normal(nalgebra_glm::vec3(-100.0, 0.0, 0.0), nalgebra_glm::vec3(1.0, 0.0, 0.0)),
        )
    }

    /// Same as `generous_frustum`, but with the right plane replaced
    fn frustum_with_right_plane(plane: Plane) -> Frustum {
        let generous = generous_frustum();
        let [near, top, bottom, _, left] = generous.planes();
        Frustum::new(near, top, bottom, plane, left)
    }

    #[test]
    fn test_enclosing_contains_all_points() {
        let points = vec![
            nalgebra_glm::vec3(1.0, 2.0, 3.0),
            nalgebra_glm::vec3(-4.0, 0.5, 2.0),
            nalgebra_glm::vec3(0.0, -3.0, -7.0),
            nalgebra_glm::vec3(2.5, 2.5, 2.5),
        ];
        let sphere = BoundingSphere::enclosing(points.iter().copied());

        for point in points {
            let dist = nalgebra_glm::length(&(point - sphere.origin));
            assert!(
                dist <= sphere.radius + 1e-5,
                "point {:?} outside sphere (dist {} radius {})",
                point,
                dist,
                sphere.radius
            );
        }
    }

    #[test]
    fn test_empty_sphere_never_visible() {
        let sphere = BoundingSphere::enclosing(std::iter::empty::<nalgebra_glm::Vec3>());
        assert_eq!(sphere.radius, 0.0);
        assert!(sphere.is_empty());

        let identity = nalgebra_glm::identity();
        assert!(!sphere.within_frustum(&generous_frustum(), &identity));

        let offset = nalgebra_glm::translation(&nalgebra_glm::vec3(5.0, 0.0, 0.0));
        assert!(!sphere.within_frustum(&generous_frustum(), &offset));
    }

    #[test]
    fn test_boundary_is_excluded() {
        // Center exactly radius behind the plane: excluded, strictly.
        let sphere = BoundingSphere::new(nalgebra_glm::vec3(0.0, 0.0, 0.0), 1.0);
        let identity: nalgebra_glm::Mat4 = nalgebra_glm::identity();

        let at_radius = Plane::from_center_normal(
            nalgebra_glm::vec3(1.0, 0.0, 0.0),
            nalgebra_glm::vec3(1.0, 0.0, 0.0),
        );
        assert!(!sphere.within_frustum(&frustum_with_right_plane(at_radius), &identity));

        let just_inside = Plane::from_center_normal(
            nalgebra_glm::vec3(0.5, 0.0, 0.0),
            nalgebra_glm::vec3(1.0, 0.0, 0.0),
        );
        assert!(sphere.within_frustum(&frustum_with_right_plane(just_inside), &identity));
    }

    #[test]
    fn test_uniform_scale_scales_radius() {
        // Plane 1.5 units behind the center. Radius 1 is excluded; scaled by 2 it reaches.
        let sphere = BoundingSphere::new(nalgebra_glm::vec3(0.0, 0.0, 0.0), 1.0);
        let plane = Plane::from_center_normal(
            nalgebra_glm::vec3(1.5, 0.0, 0.0),
            nalgebra_glm::vec3(1.0, 0.0, 0.0),
        );
        let frustum = frustum_with_right_plane(plane);

        let identity: nalgebra_glm::Mat4 = nalgebra_glm::identity();
        assert!(!sphere.within_frustum(&frustum, &identity));

        let scaled = nalgebra_glm::scaling(&nalgebra_glm::vec3(2.0, 2.0, 2.0));
        assert!(sphere.within_frustum(&frustum, &scaled));
    }

    #[test]
    fn test_non_uniform_scale_is_conservative() {
        // Scale only along z; the x-facing plane still sees the largest basis length.
        let sphere = BoundingSphere::new(nalgebra_glm::vec3(0.0, 0.0, 0.0), 1.0);
        let plane = Plane::from_center_normal(
            nalgebra_glm::vec3(2.0, 0.0, 0.0),
            nalgebra_glm::vec3(1.0, 0.0, 0.0),
        );
        let frustum = frustum_with_right_plane(plane);

        let stretched = nalgebra_glm::scaling(&nalgebra_glm::vec3(1.0, 1.0, 3.0));
        assert!(sphere.within_frustum(&frustum, &stretched));
    }

    #[test]
    fn test_translation_moves_center() {
        let sphere = BoundingSphere::new(nalgebra_glm::vec3(0.0, 0.0, 0.0), 1.0);
        let plane = Plane::from_center_normal(
            nalgebra_glm::vec3(3.0, 0.0, 0.0),
            nalgebra_glm::vec3(1.0, 0.0, 0.0),
        );
        let frustum = frustum_with_right_plane(plane);

        let identity: nalgebra_glm::Mat4 = nalgebra_glm::identity();
        assert!(!sphere.within_frustum(&frustum, &identity));

        let toward = nalgebra_glm::translation(&nalgebra_glm::vec3(2.5, 0.0, 0.0));
        assert!(sphere.within_frustum(&frustum, &toward));
    }
}
