use glam::{Mat4, Vec3};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::camera::Ray;

/// One node of a decoded model's scene graph. Offsets are relative to the
/// parent node; `radius` bounds the node's own geometry for picking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelNode {
    pub name: String,
    #[serde(default)]
    pub offset: Vec3,
    pub radius: f32,
    #[serde(default)]
    pub children: Vec<ModelNode>,
}

impl ModelNode {
    pub fn leaf(name: impl Into<String>, offset: Vec3, radius: f32) -> Self {
        Self {
            name: name.into(),
            offset,
            radius,
            children: Vec::new(),
        }
    }
}

/// Mutable placement of a model in the anchor's space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler rotation in radians, applied Z then Y then X.
    pub rotation: Vec3,
    pub scale: Vec3,
    pub visible: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            visible: false,
        }
    }
}

/// Shared handle to a decoded model: immutable node tree plus the mutable
/// transform manipulated by anchors and gestures.
#[derive(Debug)]
pub struct SceneModel {
    nodes: Vec<ModelNode>,
    base_scale: Vec3,
    transform: RwLock<Transform>,
}

impl SceneModel {
    /// Creates a model placed per the page configuration. Models start
    /// hidden; the anchor's found transition reveals them.
    pub fn new(nodes: Vec<ModelNode>, position: Vec3, scale: Vec3) -> Self {
        Self {
            nodes,
            base_scale: scale,
            transform: RwLock::new(Transform {
                position,
                scale,
                ..Transform::default()
            }),
        }
    }

    pub fn nodes(&self) -> &[ModelNode] {
        &self.nodes
    }

    /// The scale authored in the page record, before any pinch zoom.
    pub fn base_scale(&self) -> Vec3 {
        self.base_scale
    }

    pub fn transform(&self) -> Transform {
        *self.transform.read()
    }

    pub fn set_visible(&self, visible: bool) {
        self.transform.write().visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.transform.read().visible
    }

    pub fn rotate_by(&self, yaw: f32, pitch: f32) {
        let mut guard = self.transform.write();
        guard.rotation.y += yaw;
        guard.rotation.x += pitch;
    }

    /// Applies a uniform zoom factor on top of the authored base scale.
    pub fn set_zoom(&self, factor: f32) {
        self.transform.write().scale = self.base_scale * factor;
    }

    /// Recursive ray test against every node's bounding sphere. Hidden
    /// models never report hits.
    pub fn intersects_ray(&self, ray: &Ray) -> bool {
        let transform = *self.transform.read();
        if !transform.visible {
            return false;
        }
        let rotation = Mat4::from_rotation_z(transform.rotation.z)
            * Mat4::from_rotation_y(transform.rotation.y)
            * Mat4::from_rotation_x(transform.rotation.x);
        let world =
            Mat4::from_translation(transform.position) * rotation * Mat4::from_scale(transform.scale);
        let radius_scale = transform.scale.x.max(transform.scale.y).max(transform.scale.z);
        self.nodes
            .iter()
            .any(|node| node_hit(node, Vec3::ZERO, &world, radius_scale, ray))
    }
}

fn node_hit(node: &ModelNode, parent_offset: Vec3, world: &Mat4, radius_scale: f32, ray: &Ray) -> bool {
    let local_center = parent_offset + node.offset;
    let center = world.transform_point3(local_center);
    if ray.hits_sphere(center, node.radius * radius_scale) {
        return true;
    }
    node.children
        .iter()
        .any(|child| node_hit(child, local_center, world, radius_scale, ray))
}
