//! First-run onboarding: look around, hold a gaze, pick a location.
//!
//! Pure step machine; the driver feeds it camera rotation deltas and gaze
//! activations, renders the HUD text for the current step, and persists the
//! completion flag when `finished` flips.

use crate::constants::TUTORIAL_LOOK_THRESHOLD;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TutorialStep {
    /// Rotate the view past a total-angle threshold.
    LookAround,
    /// Dwell on the target orb.
    GazeTarget,
    /// Select any location from the main menu.
    Navigate,
    Done,
}

pub struct Tutorial {
    step: TutorialStep,
    active: bool,
    accumulated_rotation: f32,
}

impl Tutorial {
    /// `completed` is the persisted flag; when set the tutorial never
    /// activates.
    pub fn new(completed: bool) -> Self {
        Self {
            step: if completed {
                TutorialStep::Done
            } else {
                TutorialStep::LookAround
            },
            active: false,
            accumulated_rotation: 0.0,
        }
    }

    pub fn start(&mut self) {
        if self.step != TutorialStep::Done {
            self.active = true;
            log::info!("starting onboarding tutorial");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn step(&self) -> TutorialStep {
        self.step
    }

    /// Total head rotation this frame (radians, any axis). Returns `true`
    /// when this advanced the tutorial past the look-around step.
    pub fn note_head_rotation(&mut self, delta_angle: f32) -> bool {
        if !self.active || self.step != TutorialStep::LookAround {
            return false;
        }
        self.accumulated_rotation += delta_angle;
        if self.accumulated_rotation > TUTORIAL_LOOK_THRESHOLD {
            self.step = TutorialStep::GazeTarget;
            return true;
        }
        false
    }

    /// The target orb fired (its own dwell time is on the node).
    pub fn orb_activated(&mut self) -> bool {
        if self.active && self.step == TutorialStep::GazeTarget {
            self.step = TutorialStep::Navigate;
            return true;
        }
        false
    }

    /// A main-menu location was selected; finishes the final step.
    /// Returns `true` when the tutorial just completed.
    pub fn location_selected(&mut self) -> bool {
        if self.active && self.step == TutorialStep::Navigate {
            self.finish();
            return true;
        }
        false
    }

    /// Skip from any step; also used by the skip button.
    pub fn skip(&mut self) -> bool {
        if self.active {
            self.finish();
            return true;
        }
        false
    }

    fn finish(&mut self) {
        log::info!("tutorial completed");
        self.step = TutorialStep::Done;
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_flag_suppresses_tutorial() {
        let mut tutorial = Tutorial::new(true);
        tutorial.start();
        assert!(!tutorial.is_active());
        assert_eq!(tutorial.step(), TutorialStep::Done);
    }

    #[test]
    fn steps_progress_in_order() {
        let mut tutorial = Tutorial::new(false);
        tutorial.start();
        assert_eq!(tutorial.step(), TutorialStep::LookAround);

        // Orb and selection do nothing before their step.
        assert!(!tutorial.orb_activated());
        assert!(!tutorial.location_selected());

        // Accumulate rotation in small increments until the threshold.
        let mut advanced = false;
        for _ in 0..70 {
            advanced |= tutorial.note_head_rotation(0.02);
        }
        assert!(advanced);
        assert_eq!(tutorial.step(), TutorialStep::GazeTarget);

        assert!(tutorial.orb_activated());
        assert_eq!(tutorial.step(), TutorialStep::Navigate);

        assert!(tutorial.location_selected());
        assert_eq!(tutorial.step(), TutorialStep::Done);
        assert!(!tutorial.is_active());
    }

    #[test]
    fn skip_finishes_from_any_step() {
        let mut tutorial = Tutorial::new(false);
        tutorial.start();
        assert!(tutorial.skip());
        assert_eq!(tutorial.step(), TutorialStep::Done);
    }
}
