//! Static location catalog: the read-only tour description supplied by the
//! frontend at startup.
//!
//! A `Location` either carries a single panorama, or a list of
//! `SubLocation`s browsed through a persistent sub-menu. Either level may
//! carry a `scenes` list: linked panoramas forming a directed graph of
//! hotspot jumps. Scene links reference sibling scene ids; back-links are
//! authored explicitly, cycles are allowed.

use thiserror::Error;

#[derive(Clone, Debug)]
pub struct Link {
    /// Id of the target scene within the same scene list.
    pub target: String,
    pub label: String,
    /// Degrees clockwise from forward (0 = straight ahead, 90 = right).
    pub angle: f32,
}

#[derive(Clone, Debug)]
pub struct Scene {
    /// Unique within the parent's scene list.
    pub id: String,
    pub path: String,
    pub links: Vec<Link>,
}

#[derive(Clone, Debug, Default)]
pub struct SubLocation {
    pub name: String,
    pub thumbnail: String,
    pub panorama: Option<String>,
    pub audio: Option<String>,
    pub scenes: Vec<Scene>,
}

#[derive(Clone, Debug, Default)]
pub struct Location {
    pub name: String,
    pub thumbnail: String,
    pub panorama: Option<String>,
    pub audio: Option<String>,
    pub scenes: Vec<Scene>,
    pub sub_locations: Vec<SubLocation>,
}

impl Location {
    pub fn has_sub_locations(&self) -> bool {
        !self.sub_locations.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub locations: Vec<Location>,
}

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("{owner}: duplicate scene id {id:?}")]
    DuplicateSceneId { owner: String, id: String },
    #[error("{owner}: scene {scene:?} links to unknown scene {target:?}")]
    DanglingLink {
        owner: String,
        scene: String,
        target: String,
    },
    #[error("{owner}: scene {scene:?} link angle {angle} outside 0..360")]
    BadLinkAngle {
        owner: String,
        scene: String,
        angle: f32,
    },
}

impl Catalog {
    pub fn new(locations: Vec<Location>) -> Self {
        Self { locations }
    }

    pub fn location(&self, index: usize) -> Option<&Location> {
        self.locations.get(index)
    }

    pub fn sub_location(&self, parent: usize, child: usize) -> Option<&SubLocation> {
        self.locations.get(parent)?.sub_locations.get(child)
    }

    /// Check scene-graph integrity once at startup. The rest of the core
    /// assumes a validated catalog and treats missing references as
    /// authoring errors (logged, never fatal).
    pub fn validate(&self) -> Result<(), CatalogError> {
        for loc in &self.locations {
            validate_scenes(&loc.name, &loc.scenes)?;
            for sub in &loc.sub_locations {
                validate_scenes(&sub.name, &sub.scenes)?;
            }
        }
        Ok(())
    }
}

fn validate_scenes(owner: &str, scenes: &[Scene]) -> Result<(), CatalogError> {
    for (i, scene) in scenes.iter().enumerate() {
        if scenes[..i].iter().any(|s| s.id == scene.id) {
            return Err(CatalogError::DuplicateSceneId {
                owner: owner.to_string(),
                id: scene.id.clone(),
            });
        }
        for link in &scene.links {
            if !scenes.iter().any(|s| s.id == link.target) {
                return Err(CatalogError::DanglingLink {
                    owner: owner.to_string(),
                    scene: scene.id.clone(),
                    target: link.target.clone(),
                });
            }
            if !(0.0..360.0).contains(&link.angle) {
                return Err(CatalogError::BadLinkAngle {
                    owner: owner.to_string(),
                    scene: scene.id.clone(),
                    angle: link.angle,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(id: &str, links: &[(&str, f32)]) -> Scene {
        Scene {
            id: id.to_string(),
            path: format!("/pano/{id}.jpg"),
            links: links
                .iter()
                .map(|(target, angle)| Link {
                    target: target.to_string(),
                    label: String::new(),
                    angle: *angle,
                })
                .collect(),
        }
    }

    #[test]
    fn validate_accepts_cycles() {
        let catalog = Catalog::new(vec![Location {
            name: "Loop".into(),
            scenes: vec![scene("1", &[("2", 270.0)]), scene("2", &[("1", 90.0)])],
            ..Default::default()
        }]);
        assert_eq!(catalog.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_dangling_link() {
        let catalog = Catalog::new(vec![Location {
            name: "Broken".into(),
            scenes: vec![scene("1", &[("nope", 0.0)])],
            ..Default::default()
        }]);
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::DanglingLink { .. })
        ));
    }

    #[test]
    fn validate_rejects_duplicate_scene_ids() {
        let catalog = Catalog::new(vec![Location {
            name: "Dup".into(),
            sub_locations: vec![SubLocation {
                name: "Leaf".into(),
                scenes: vec![scene("1", &[]), scene("1", &[])],
                ..Default::default()
            }],
            ..Default::default()
        }]);
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::DuplicateSceneId { .. })
        ));
    }
}
