//! This module defines the frustum data structure. A frustum is often used to represent the volume
//! that is visible to a camera.

use super::plane::Plane;

#[derive(Debug, Copy, Clone)]
/// A camera frustum, as five half-space planes with inward-facing normals. There is deliberately
/// no far plane.
pub struct Frustum {
    near: Plane,
    top: Plane,
    bottom: Plane,
    right: Plane,
    left: Plane,
}

impl Frustum {
    /// Create a new frustum from its planes
    pub fn new(near: Plane, top: Plane, bottom: Plane, right: Plane, left: Plane) -> Self {
        Self {
            near,
            top,
            bottom,
            right,
            left,
        }
    }

    /// Get a frustum's planes
    pub fn planes(&self) -> [Plane; 5] {
        [self.near, self.top, self.bottom, self.right, self.left]
    }
}
