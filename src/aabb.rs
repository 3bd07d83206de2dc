//! This module defines an axis-aligned bounding box.

#[derive(Debug, Copy, Clone)]
/// An axis-aligned bounding box, stored as its component-wise min and max corners
pub struct Aabb {
    pub min: nalgebra_glm::Vec3,
    pub max: nalgebra_glm::Vec3,
}

impl Aabb {
    /// Create a new AABB from its corners
    pub fn new(min: nalgebra_glm::Vec3, max: nalgebra_glm::Vec3) -> Self {
        Self { min, max }
    }

    /// Compute the smallest AABB containing every point in the sequence. Returns `None` if the
    /// sequence is empty.
    pub fn from_points(points: impl IntoIterator<Item = nalgebra_glm::Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut retval = Self::new(first, first);
        for point in points {
            retval.grow(point);
        }
        Some(retval)
    }

    /// Expand the box just enough to contain a point
    pub fn grow(&mut self, point: nalgebra_glm::Vec3) {
        self.min = nalgebra_glm::vec3(
            self.min.x.min(point.x),
            self.min.y.min(point.y),
            self.min.z.min(point.z),
        );
        self.max = nalgebra_glm::vec3(
            self.max.x.max(point.x),
            self.max.y.max(point.y),
            self.max.z.max(point.z),
        );
    }

    /// The centerpoint of the box
    pub fn center(&self) -> nalgebra_glm::Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half the length of the box's space diagonal
    pub fn half_diagonal(&self) -> f32 {
        nalgebra_glm::length(&(self.max - self.min)) * 0.5
    }
}
