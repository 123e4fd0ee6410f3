//! Dwell-based gaze interaction.
//!
//! One engine instance per session; the caller supplies the eye ray and the
//! registry each tick, so the engine holds no reference to camera or scene
//! and is trivially testable with a fake of either. Events come back as a
//! typed stream the driver dispatches; the engine never catches a fault in
//! a downstream handler.

use crate::scene::{Action, Hit, NodeId, Ray, SceneRegistry};

#[derive(Clone, Debug, PartialEq)]
pub enum GazeEvent {
    HoverOut(NodeId),
    HoverIn(NodeId),
    Activated {
        node: NodeId,
        action: Action,
        hit: Hit,
    },
}

/// Per-tick feedback for the reticle: which node is hovered and how far
/// the dwell has progressed (0..=1).
#[derive(Clone, Copy, Debug, Default)]
pub struct GazeStatus {
    pub hovered: Option<NodeId>,
    pub progress: f32,
}

pub struct GazeEngine {
    hovered: Option<NodeId>,
    hover_elapsed: f32,
    /// Set once a single-shot node has fired; cleared when the gaze leaves.
    fired: bool,
}

impl GazeEngine {
    pub fn new() -> Self {
        Self {
            hovered: None,
            hover_elapsed: 0.0,
            fired: false,
        }
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    /// Advance the dwell state by one frame.
    ///
    /// Resolves the nearest hit to its interactable ancestor, emits
    /// hover-out before hover-in on a target change, accumulates dwell
    /// while the target holds, and emits `Activated` each time the dwell
    /// crosses the node's activation time (re-arming immediately unless
    /// the node is single-shot).
    pub fn tick(
        &mut self,
        ray: Ray,
        scene: &SceneRegistry,
        dt: f32,
        out: &mut Vec<GazeEvent>,
    ) -> GazeStatus {
        let target = scene
            .raycast(ray)
            .map(|hit| (scene.resolve_interactable(hit.node), hit));

        let Some((Some(node), hit)) = target else {
            // Nothing interactable under the gaze.
            self.clear(out);
            return GazeStatus::default();
        };

        if self.hovered != Some(node) {
            if let Some(old) = self.hovered.take() {
                out.push(GazeEvent::HoverOut(old));
            }
            self.hovered = Some(node);
            self.hover_elapsed = 0.0;
            self.fired = false;
            out.push(GazeEvent::HoverIn(node));
        }

        let Some(interactable) = scene.interactable(node) else {
            // Interactable removed out from under a held hover.
            self.clear(out);
            return GazeStatus::default();
        };
        let activation = interactable.activation_time();

        self.hover_elapsed += dt;
        let mut progress = (self.hover_elapsed / activation).min(1.0);

        if self.hover_elapsed >= activation && !self.fired {
            out.push(GazeEvent::Activated {
                node,
                action: interactable.action.clone(),
                hit,
            });
            self.hover_elapsed = 0.0;
            progress = 0.0;
            if interactable.single_shot {
                self.fired = true;
            }
        }

        GazeStatus {
            hovered: Some(node),
            progress,
        }
    }

    fn clear(&mut self, out: &mut Vec<GazeEvent>) {
        if let Some(old) = self.hovered.take() {
            out.push(GazeEvent::HoverOut(old));
        }
        self.hover_elapsed = 0.0;
        self.fired = false;
    }
}

impl Default for GazeEngine {
    fn default() -> Self {
        Self::new()
    }
}
