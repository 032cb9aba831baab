use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Axis-aligned box enclosing `points`, or `None` when empty.
    pub fn from_points(points: &[[f32; 3]]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut min = Vec3::from_array(*first);
        let mut max = min;
        for p in rest {
            let p = Vec3::from_array(*p);
            min = min.min(p);
            max = max.max(p);
        }
        Some(Self { min, max })
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Vertex data of one primitive, shared read-only between the cached model
/// and every scene instance built from it.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub uvs: Option<Vec<[f32; 2]>>,
    pub indices: Option<Vec<u32>>,
    pub bounding_box: Option<BoundingBox>,
}

impl Geometry {
    #[must_use]
    pub fn new(positions: Vec<[f32; 3]>) -> Self {
        let bounding_box = BoundingBox::from_points(&positions);
        Self {
            positions,
            bounding_box,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_normals(mut self, normals: Vec<[f32; 3]>) -> Self {
        self.normals = Some(normals);
        self
    }

    #[must_use]
    pub fn with_uvs(mut self, uvs: Vec<[f32; 2]>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    #[must_use]
    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Triangle count, assuming a triangle-list topology.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices
            .as_ref()
            .map_or(self.positions.len(), Vec::len)
            / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_encloses_points() {
        let bb = BoundingBox::from_points(&[[0.0, -1.0, 2.0], [3.0, 1.0, -2.0], [1.0, 0.0, 0.0]])
            .unwrap();
        assert_eq!(bb.min, Vec3::new(0.0, -1.0, -2.0));
        assert_eq!(bb.max, Vec3::new(3.0, 1.0, 2.0));
        assert_eq!(bb.center(), Vec3::new(1.5, 0.0, 0.0));
    }

    #[test]
    fn empty_geometry_has_no_bounds() {
        assert!(Geometry::new(Vec::new()).bounding_box.is_none());
    }

    #[test]
    fn triangle_count_prefers_indices() {
        let quad = Geometry::new(vec![[0.0; 3]; 4]).with_indices(vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(quad.triangle_count(), 2);
        assert_eq!(Geometry::new(vec![[0.0; 3]; 3]).triangle_count(), 1);
    }
}
