//! Flat registry of interactable scene nodes.
//!
//! Nodes are grouped into named groups toggled as a unit by the navigation
//! state machine; groups that are not visible are excluded from raycasting
//! entirely, not just hidden. A node's pickable geometry lives on the leaf,
//! while the `Interactable` record may sit on an ancestor: a hit on a
//! child resolves to its nearest interactable ancestor, mirroring how
//! compound widgets (card + icon) are built.
//!
//! The registry stores no platform handles. The frontend keeps its own
//! node-id-keyed table of billboards/meshes and drops them when a group or
//! hotspot set is removed, so releasing visuals is tied to registry
//! removal rather than call-site discipline.

use fnv::FnvHashMap;
use glam::{Quat, Vec2, Vec3};

use crate::constants::ACTIVATION_TIME;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// The fixed set of interactable groups; which ones are visible is fully
/// determined by the current navigation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupKind {
    Welcome,
    MainMenu,
    SubMenu,
    /// Sphere plus hotspot arrows; never yaw-follows the camera.
    Panorama,
    /// Back/audio controls; follows the camera yaw as one unit.
    Dock,
    Tutorial,
}

/// What activating a node means. The driver matches on this; the gaze
/// engine only carries it.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    StartExperience,
    SelectLocation(usize),
    SelectSubLocation(usize),
    SubMenuBack,
    PanoramaBack,
    HotspotLink { target: String },
    ToggleAudio,
    ToggleMute,
    TutorialOrb,
    SkipTutorial,
}

/// Interaction metadata attached to a node.
#[derive(Clone, Debug)]
pub struct Interactable {
    pub action: Action,
    /// Dwell override in seconds; engine default applies when `None`.
    pub activation_time: Option<f32>,
    /// When set, continuous dwell fires once until the gaze leaves the
    /// node. Default is repeat-fire (scene-advance hotspots rely on it).
    pub single_shot: bool,
}

impl Interactable {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            activation_time: None,
            single_shot: false,
        }
    }

    pub fn with_dwell(mut self, seconds: f32) -> Self {
        self.activation_time = Some(seconds);
        self
    }

    pub fn single_shot(mut self) -> Self {
        self.single_shot = true;
        self
    }

    pub fn activation_time(&self) -> f32 {
        self.activation_time.unwrap_or(ACTIVATION_TIME)
    }
}

/// Pickable geometry, in group-local space (the group yaw is applied by the
/// raycast).
#[derive(Clone, Copy, Debug)]
pub enum BoundingVolume {
    Sphere {
        center: Vec3,
        radius: f32,
    },
    /// Oriented rectangle spanned by `right`/`up` around `center`.
    Quad {
        center: Vec3,
        right: Vec3,
        up: Vec3,
        half_extents: Vec2,
    },
}

impl BoundingVolume {
    /// A quad at `center` facing `target` with `Vec3::Y` as the up hint,
    /// the orientation menu cards and dock buttons use.
    pub fn quad_facing(center: Vec3, target: Vec3, half_extents: Vec2) -> Self {
        let normal = (target - center).normalize_or_zero();
        let right = Vec3::Y.cross(normal).normalize_or_zero();
        let up = normal.cross(right);
        BoundingVolume::Quad {
            center,
            right,
            up,
            half_extents,
        }
    }
}

#[derive(Clone, Copy, Debug)]
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
}

/// Result of a raycast; `node` is the leaf that was hit, not the resolved
/// interactable ancestor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub node: NodeId,
    pub point: Vec3,
    pub distance: f32,
}

pub struct Node {
    pub group: GroupKind,
    pub parent: Option<NodeId>,
    pub volume: Option<BoundingVolume>,
    pub interactable: Option<Interactable>,
    /// Per-node toggle inside a visible group (e.g. the panorama back
    /// control while a sub-menu owns back). Invisible nodes are skipped by
    /// the raycast.
    pub visible: bool,
}

impl Node {
    pub fn new(group: GroupKind) -> Self {
        Self {
            group,
            parent: None,
            volume: None,
            interactable: None,
            visible: true,
        }
    }

    pub fn with_volume(mut self, volume: BoundingVolume) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_interactable(mut self, interactable: Interactable) -> Self {
        self.interactable = Some(interactable);
        self
    }
}

#[derive(Default)]
struct Group {
    visible: bool,
    /// Yaw applied to the whole group (camera-following docks).
    yaw: f32,
    nodes: Vec<NodeId>,
}

#[derive(Default)]
pub struct SceneRegistry {
    nodes: FnvHashMap<NodeId, Node>,
    groups: FnvHashMap<GroupKind, Group>,
    next_id: u32,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.groups.entry(node.group).or_default().nodes.push(id);
        self.nodes.insert(id, node);
        id
    }

    pub fn remove(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            if let Some(group) = self.groups.get_mut(&node.group) {
                group.nodes.retain(|n| *n != id);
            }
        }
    }

    /// Remove every node of a group, returning the removed ids so the
    /// frontend can drop the matching visuals.
    pub fn clear_group(&mut self, kind: GroupKind) -> Vec<NodeId> {
        let ids = match self.groups.get_mut(&kind) {
            Some(group) => std::mem::take(&mut group.nodes),
            None => Vec::new(),
        };
        for id in &ids {
            self.nodes.remove(id);
        }
        ids
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn set_visible(&mut self, kind: GroupKind, visible: bool) {
        self.groups.entry(kind).or_default().visible = visible;
    }

    pub fn set_node_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visible = visible;
        }
    }

    pub fn is_visible(&self, kind: GroupKind) -> bool {
        self.groups.get(&kind).map(|g| g.visible).unwrap_or(false)
    }

    pub fn set_group_yaw(&mut self, kind: GroupKind, yaw: f32) {
        self.groups.entry(kind).or_default().yaw = yaw;
    }

    pub fn group_yaw(&self, kind: GroupKind) -> f32 {
        self.groups.get(&kind).map(|g| g.yaw).unwrap_or(0.0)
    }

    /// Nearest hit across all visible groups.
    pub fn raycast(&self, ray: Ray) -> Option<Hit> {
        let mut best: Option<Hit> = None;
        for group in self.groups.values().filter(|g| g.visible) {
            // Cast in group-local space; volumes are authored pre-yaw.
            let unspin = Quat::from_rotation_y(-group.yaw);
            let local = Ray {
                origin: unspin * ray.origin,
                direction: unspin * ray.direction,
            };
            let respin = Quat::from_rotation_y(group.yaw);
            for id in &group.nodes {
                let Some(node) = self.nodes.get(id) else {
                    continue;
                };
                let Some(volume) = node.volume.filter(|_| node.visible) else {
                    continue;
                };
                let Some(t) = intersect(local, volume) else {
                    continue;
                };
                if best.map(|b| t < b.distance).unwrap_or(true) {
                    best = Some(Hit {
                        node: *id,
                        point: respin * (local.origin + local.direction * t),
                        distance: t,
                    });
                }
            }
        }
        best
    }

    /// Walk up the parent chain to the nearest node carrying an
    /// `Interactable` record.
    pub fn resolve_interactable(&self, leaf: NodeId) -> Option<NodeId> {
        let mut cursor = Some(leaf);
        while let Some(id) = cursor {
            let node = self.nodes.get(&id)?;
            if node.interactable.is_some() {
                return Some(id);
            }
            cursor = node.parent;
        }
        None
    }

    pub fn interactable(&self, id: NodeId) -> Option<&Interactable> {
        self.nodes.get(&id)?.interactable.as_ref()
    }
}

fn intersect(ray: Ray, volume: BoundingVolume) -> Option<f32> {
    match volume {
        BoundingVolume::Sphere { center, radius } => ray_sphere(ray, center, radius),
        BoundingVolume::Quad {
            center,
            right,
            up,
            half_extents,
        } => ray_quad(ray, center, right, up, half_extents),
    }
}

#[inline]
pub fn ray_sphere(ray: Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

#[inline]
pub fn ray_quad(ray: Ray, center: Vec3, right: Vec3, up: Vec3, half_extents: Vec2) -> Option<f32> {
    let normal = right.cross(up);
    let denom = normal.dot(ray.direction);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = normal.dot(center - ray.origin) / denom;
    if t < 0.0 {
        return None;
    }
    let local = ray.origin + ray.direction * t - center;
    let u = local.dot(right);
    let v = local.dot(up);
    (u.abs() <= half_extents.x && v.abs() <= half_extents.y).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_intersection_respects_extents() {
        let quad = BoundingVolume::quad_facing(
            Vec3::new(0.0, 0.0, -2.0),
            Vec3::ZERO,
            Vec2::new(0.3, 0.2),
        );
        let hit = intersect(Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)), quad);
        assert!(hit.is_some());

        // Just past the horizontal extent
        let miss = intersect(Ray::new(Vec3::ZERO, Vec3::new(0.2, 0.0, -1.0)), quad);
        assert!(miss.is_none());
    }

    #[test]
    fn invisible_groups_are_not_raycast() {
        let mut scene = SceneRegistry::new();
        scene.insert(
            Node::new(GroupKind::MainMenu)
                .with_volume(BoundingVolume::Sphere {
                    center: Vec3::new(0.0, 0.0, -3.0),
                    radius: 1.0,
                })
                .with_interactable(Interactable::new(Action::SelectLocation(0))),
        );
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(scene.raycast(ray).is_none());
        scene.set_visible(GroupKind::MainMenu, true);
        assert!(scene.raycast(ray).is_some());
    }

    #[test]
    fn invisible_nodes_are_not_raycast() {
        let mut scene = SceneRegistry::new();
        let back = scene.insert(
            Node::new(GroupKind::Dock)
                .with_volume(BoundingVolume::Sphere {
                    center: Vec3::new(0.0, 0.0, -2.0),
                    radius: 0.4,
                })
                .with_interactable(Interactable::new(Action::PanoramaBack)),
        );
        scene.set_visible(GroupKind::Dock, true);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(scene.raycast(ray).is_some());
        scene.set_node_visible(back, false);
        assert!(scene.raycast(ray).is_none());
    }

    #[test]
    fn hit_on_child_resolves_to_interactable_ancestor() {
        let mut scene = SceneRegistry::new();
        let parent = scene
            .insert(Node::new(GroupKind::Panorama).with_interactable(Interactable::new(
                Action::PanoramaBack,
            )));
        let child = scene.insert(
            Node::new(GroupKind::Panorama)
                .with_parent(parent)
                .with_volume(BoundingVolume::Sphere {
                    center: Vec3::new(0.0, 0.0, -3.0),
                    radius: 0.5,
                }),
        );
        scene.set_visible(GroupKind::Panorama, true);

        let hit = scene
            .raycast(Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)))
            .unwrap();
        assert_eq!(hit.node, child);
        assert_eq!(scene.resolve_interactable(hit.node), Some(parent));
    }

    #[test]
    fn group_yaw_spins_volumes_with_the_dock() {
        let mut scene = SceneRegistry::new();
        scene.insert(
            Node::new(GroupKind::SubMenu)
                .with_volume(BoundingVolume::Sphere {
                    center: Vec3::new(0.0, 0.0, -2.0),
                    radius: 0.3,
                })
                .with_interactable(Interactable::new(Action::SubMenuBack)),
        );
        scene.set_visible(GroupKind::SubMenu, true);

        // Quarter turn moves the node from -Z to -X.
        scene.set_group_yaw(GroupKind::SubMenu, std::f32::consts::FRAC_PI_2);
        assert!(scene
            .raycast(Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)))
            .is_none());
        assert!(scene
            .raycast(Ray::new(Vec3::ZERO, Vec3::new(-1.0, 0.0, 0.0)))
            .is_some());
    }
}
