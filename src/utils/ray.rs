use glam::{IVec3, Vec3};

#[derive(Debug, Clone)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// First solid cell struck by a grid traversal: the cell coordinate, the
/// outward face normal pointing back toward the ray origin (zero when the
/// origin already sat inside the cell), and the distance traveled.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub cell: IVec3,
    pub normal: IVec3,
    pub distance: f32,
}
