//! Panorama session: which location/scene is on the sphere, and what a
//! change of either means.
//!
//! Methods return a [`LoadPlan`] describing the texture to fetch, the
//! hotspot set to (re)build, the neighbor paths to preload and what to do
//! with narration audio; the frontend executes the plan. Every plan bumps
//! the session epoch and stamps its texture request with it. A completion
//! for an older epoch must only populate the cache, never the sphere, so a
//! slow load can never paint over a scene the user has already left.

use glam::Vec3;

use crate::catalog::{Catalog, Scene};
use crate::constants::{HOTSPOT_RADIUS, HOTSPOT_Y};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanoSource {
    Location(usize),
    SubLocation { parent: usize, child: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub enum AudioCue {
    /// Scene hop inside one location; narration keeps playing.
    Keep,
    Stop,
    Start(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextureRequest {
    pub path: String,
    pub epoch: u64,
}

/// One directional hotspot arrow, already placed on the panorama floor.
#[derive(Clone, Debug, PartialEq)]
pub struct HotspotSpec {
    pub target: String,
    pub label: String,
    pub position: Vec3,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoadPlan {
    pub texture: TextureRequest,
    /// Replacement hotspot set; empty clears the previous set.
    pub hotspots: Vec<HotspotSpec>,
    /// Immediate link neighbors only, never the transitive closure.
    pub preload: Vec<String>,
    pub audio: AudioCue,
}

/// Place a link arrow: degrees clockwise from forward, on a circle of
/// [`HOTSPOT_RADIUS`] at [`HOTSPOT_Y`]. 0 degrees is -Z (straight ahead).
pub fn hotspot_position(angle_deg: f32) -> Vec3 {
    let a = angle_deg.to_radians();
    Vec3::new(
        a.sin() * HOTSPOT_RADIUS,
        HOTSPOT_Y,
        -a.cos() * HOTSPOT_RADIUS,
    )
}

#[derive(Default)]
pub struct PanoSession {
    source: Option<PanoSource>,
    current_scene: Option<String>,
    epoch: u64,
}

impl PanoSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> Option<PanoSource> {
        self.source
    }

    pub fn current_scene(&self) -> Option<&str> {
        self.current_scene.as_deref()
    }

    /// True while `epoch` still names the latest request; the guard the
    /// frontend checks before installing a finished panorama texture.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    /// Load a location or sub-location: scene 1 of its scene list when it
    /// has one, otherwise its single panorama with hotspots cleared.
    pub fn load_source(&mut self, catalog: &Catalog, source: PanoSource) -> Option<LoadPlan> {
        let (name, panorama, audio, scenes) = match source {
            PanoSource::Location(index) => {
                let loc = catalog.location(index)?;
                (&loc.name, &loc.panorama, &loc.audio, &loc.scenes)
            }
            PanoSource::SubLocation { parent, child } => {
                let sub = catalog.sub_location(parent, child)?;
                (&sub.name, &sub.panorama, &sub.audio, &sub.scenes)
            }
        };
        self.source = Some(source);

        let audio_cue = match audio {
            Some(path) => AudioCue::Start(path.clone()),
            None => AudioCue::Stop,
        };

        if let Some(first) = scenes.first() {
            let mut plan = self.plan_scene(first, scenes);
            plan.audio = audio_cue;
            Some(plan)
        } else if let Some(path) = panorama {
            self.current_scene = None;
            self.epoch += 1;
            Some(LoadPlan {
                texture: TextureRequest {
                    path: path.clone(),
                    epoch: self.epoch,
                },
                hotspots: Vec::new(),
                preload: Vec::new(),
                audio: audio_cue,
            })
        } else {
            log::error!("location {name:?} has neither scenes nor a panorama");
            None
        }
    }

    /// Follow a hotspot to a sibling scene. Unknown target ids log and
    /// return `None`; the displayed scene stays put.
    pub fn activate_link(&mut self, catalog: &Catalog, target: &str) -> Option<LoadPlan> {
        let scenes = match self.source {
            Some(PanoSource::Location(index)) => &catalog.location(index)?.scenes,
            Some(PanoSource::SubLocation { parent, child }) => {
                &catalog.sub_location(parent, child)?.scenes
            }
            None => {
                log::warn!("hotspot activated with no active panorama");
                return None;
            }
        };
        let Some(scene) = scenes.iter().find(|s| s.id == target) else {
            log::error!("hotspot target {target:?} not found in current scene list");
            return None;
        };
        Some(self.plan_scene(scene, scenes))
    }

    /// Tear down on hide; bumping the epoch strands any in-flight load.
    pub fn deactivate(&mut self) {
        self.source = None;
        self.current_scene = None;
        self.epoch += 1;
    }

    fn plan_scene(&mut self, scene: &Scene, siblings: &[Scene]) -> LoadPlan {
        self.current_scene = Some(scene.id.clone());
        self.epoch += 1;

        let hotspots = scene
            .links
            .iter()
            .map(|link| HotspotSpec {
                target: link.target.clone(),
                label: link.label.clone(),
                position: hotspot_position(link.angle),
            })
            .collect();

        // Preload the directly linked scenes, each path once.
        let mut preload: Vec<String> = Vec::new();
        for link in &scene.links {
            if let Some(next) = siblings.iter().find(|s| s.id == link.target) {
                if !preload.contains(&next.path) {
                    preload.push(next.path.clone());
                }
            }
        }

        LoadPlan {
            texture: TextureRequest {
                path: scene.path.clone(),
                epoch: self.epoch,
            },
            hotspots,
            preload,
            audio: AudioCue::Keep,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hotspot_position_quadrants() {
        let fwd = hotspot_position(0.0);
        assert!((fwd.x).abs() < 1e-5 && (fwd.z + HOTSPOT_RADIUS).abs() < 1e-5);
        let right = hotspot_position(90.0);
        assert!((right.x - HOTSPOT_RADIUS).abs() < 1e-5 && right.z.abs() < 1e-4);
        let left = hotspot_position(270.0);
        assert!((left.x + HOTSPOT_RADIUS).abs() < 1e-4 && left.z.abs() < 1e-4);
        assert!((fwd.y - HOTSPOT_Y).abs() < 1e-6);
    }
}
