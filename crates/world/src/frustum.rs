use glam::{Mat4, Vec3, Vec4};

/// World-space axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Box spanning `min..max`.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Corner furthest along `normal`.
    fn positive_vertex(&self, normal: Vec3) -> Vec3 {
        Vec3::new(
            if normal.x >= 0.0 { self.max.x } else { self.min.x },
            if normal.y >= 0.0 { self.max.y } else { self.min.y },
            if normal.z >= 0.0 { self.max.z } else { self.min.z },
        )
    }
}

/// Six clip planes `(n, d)` with `n·p + d >= 0` meaning inside.
///
/// Expects a 0..1 depth range, the convention of `Mat4::perspective_rh`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Extract normalized planes from a view-projection matrix.
    pub fn from_view_projection(view_projection: Mat4) -> Self {
        let r0 = view_projection.row(0);
        let r1 = view_projection.row(1);
        let r2 = view_projection.row(2);
        let r3 = view_projection.row(3);

        let planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r2,      // near
            r3 - r2, // far
        ]
        .map(|plane| {
            let len = plane.truncate().length();
            if len > f32::EPSILON {
                plane / len
            } else {
                plane
            }
        });

        Self { planes }
    }

    /// Planes in left, right, bottom, top, near, far order.
    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    /// False only when `aabb` lies fully outside at least one plane.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.planes.iter().all(|plane| {
            let normal = plane.truncate();
            normal.dot(aabb.positive_vertex(normal)) + plane.w >= 0.0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Frustum {
        let view = Mat4::look_at_rh(Vec3::new(8.0, 70.0, 40.0), Vec3::new(8.0, 70.0, 0.0), Vec3::Y);
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        Frustum::from_view_projection(proj * view)
    }

    #[test]
    fn planes_are_normalized() {
        for plane in camera().planes() {
            assert!((plane.truncate().length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn box_in_front_is_visible() {
        let aabb = Aabb::new(Vec3::new(0.0, 60.0, 0.0), Vec3::new(16.0, 80.0, 16.0));
        assert!(camera().intersects_aabb(&aabb));
    }

    #[test]
    fn box_behind_camera_is_culled() {
        let aabb = Aabb::new(Vec3::new(0.0, 60.0, 48.0), Vec3::new(16.0, 80.0, 64.0));
        assert!(!camera().intersects_aabb(&aabb));
    }

    #[test]
    fn box_past_far_plane_is_culled() {
        let aabb = Aabb::new(Vec3::new(0.0, 60.0, -96.0), Vec3::new(16.0, 80.0, -80.0));
        assert!(!camera().intersects_aabb(&aabb));
    }

    #[test]
    fn box_straddling_far_plane_is_kept() {
        let aabb = Aabb::new(Vec3::new(0.0, 60.0, -64.0), Vec3::new(16.0, 80.0, -48.0));
        assert!(camera().intersects_aabb(&aabb));
    }
}
