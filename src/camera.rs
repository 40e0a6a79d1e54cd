use glam::{Mat4, Vec2, Vec3};

/// Camera parameters supplied by the rendering host each frame.
#[derive(Clone, Debug)]
pub struct CameraParams {
    pub view_proj: Mat4,
    pub position: Vec3,
}

impl CameraParams {
    /// Convenience constructor for hosts without a tracked camera pose.
    pub fn looking_at(position: Vec3, target: Vec3, fov_degrees: f32, aspect: f32) -> Self {
        let view = Mat4::look_at_rh(position, target, Vec3::Y);
        let projection =
            Mat4::perspective_rh_gl(fov_degrees.to_radians(), aspect.max(0.01), 0.1, 100.0);
        Self {
            view_proj: projection * view,
            position,
        }
    }
}

/// World-space picking ray.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Unprojects a normalized-device-coordinate point (x and y in [-1, 1])
    /// through the camera into a world-space ray.
    pub fn from_ndc(ndc: Vec2, camera: &CameraParams) -> Self {
        let inverse = camera.view_proj.inverse();
        let near = inverse.project_point3(Vec3::new(ndc.x, ndc.y, -1.0));
        let far = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        let direction = (far - near).normalize_or_zero();
        Self {
            origin: near,
            direction,
        }
    }

    /// Standard ray-sphere intersection; hits behind the origin are ignored.
    pub fn hits_sphere(&self, center: Vec3, radius: f32) -> bool {
        if radius <= 0.0 {
            return false;
        }
        let to_center = center - self.origin;
        let along = to_center.dot(self.direction);
        if along < 0.0 {
            return to_center.length_squared() <= radius * radius;
        }
        let closest = to_center - self.direction * along;
        closest.length_squared() <= radius * radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_ndc_ray_points_at_target() {
        let camera = CameraParams::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 60.0, 1.0);
        let ray = Ray::from_ndc(Vec2::ZERO, &camera);
        assert!(ray.hits_sphere(Vec3::ZERO, 0.25));
        assert!(!ray.hits_sphere(Vec3::new(4.0, 0.0, 0.0), 0.25));
    }

    #[test]
    fn sphere_behind_ray_is_not_hit() {
        let ray = Ray {
            origin: Vec3::ZERO,
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        assert!(!ray.hits_sphere(Vec3::new(0.0, 0.0, 5.0), 1.0));
        assert!(ray.hits_sphere(Vec3::new(0.0, 0.0, -5.0), 1.0));
    }
}
