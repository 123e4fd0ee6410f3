//! Top-level navigation state machine.
//!
//! `transition` is a pure function from (state, event, catalog) to the next
//! state plus an ordered effect list; the driver executes the effects
//! (show/hide groups, kick off loads, stop audio). Transitions originate
//! only from gaze activations or external completion callbacks. Hotspot
//! jumps inside a panorama are handled by [`crate::session::PanoSession`]
//! and never appear here.

use smallvec::SmallVec;

use crate::catalog::Catalog;
use crate::scene::GroupKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavState {
    Welcome,
    MainMenu,
    Panorama { location: usize },
    MultiScene { parent: usize, active_child: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavEvent {
    StartActivated,
    LocationSelected(usize),
    SubLocationSelected(usize),
    SubMenuBack,
    PanoramaBack,
}

/// Where the panorama's audio buttons sit: near the back pill, or pushed
/// right to clear the sub-menu dock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioLayout {
    Standalone,
    WithDock,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    ShowGroup(GroupKind),
    HideGroup(GroupKind),
    /// Build the sub-menu dock for `parent.sub_locations`.
    BuildSubMenu { parent: usize },
    TearDownSubMenu,
    MarkSubActive { index: usize },
    LoadLocation { location: usize },
    LoadSubLocation { parent: usize, child: usize },
    SetPanoramaBack { visible: bool },
    SetAudioLayout(AudioLayout),
    StopAudio,
}

pub type Effects = SmallVec<[Effect; 10]>;

/// Visible (raycastable) groups for a state; the invariant the registry is
/// driven to after every transition.
pub fn visible_groups(state: &NavState) -> &'static [GroupKind] {
    match state {
        NavState::Welcome => &[GroupKind::Welcome],
        NavState::MainMenu => &[GroupKind::MainMenu],
        NavState::Panorama { .. } => &[GroupKind::Panorama, GroupKind::Dock],
        NavState::MultiScene { .. } => &[
            GroupKind::SubMenu,
            GroupKind::Panorama,
            GroupKind::Dock,
        ],
    }
}

/// Apply `event` to `state`. Returns `None` (state unchanged) for events
/// that do not apply to the current state or reference unknown catalog
/// entries; both cases log and no-op rather than crash.
pub fn transition(
    state: &NavState,
    event: &NavEvent,
    catalog: &Catalog,
) -> Option<(NavState, Effects)> {
    use Effect::*;

    match (state, event) {
        (NavState::Welcome, NavEvent::StartActivated) => Some((
            NavState::MainMenu,
            SmallVec::from_slice(&[
                HideGroup(GroupKind::Welcome),
                ShowGroup(GroupKind::MainMenu),
            ]),
        )),

        (NavState::MainMenu, NavEvent::LocationSelected(index)) => {
            let Some(location) = catalog.location(*index) else {
                log::error!("selected unknown location index {index}");
                return None;
            };
            if location.has_sub_locations() {
                // Multi-scene set: persistent sub-menu owns back, first
                // child auto-loads.
                Some((
                    NavState::MultiScene {
                        parent: *index,
                        active_child: 0,
                    },
                    SmallVec::from_slice(&[
                        HideGroup(GroupKind::MainMenu),
                        BuildSubMenu { parent: *index },
                        ShowGroup(GroupKind::SubMenu),
                        LoadSubLocation {
                            parent: *index,
                            child: 0,
                        },
                        ShowGroup(GroupKind::Panorama),
                        ShowGroup(GroupKind::Dock),
                        SetPanoramaBack { visible: false },
                        SetAudioLayout(AudioLayout::WithDock),
                        MarkSubActive { index: 0 },
                    ]),
                ))
            } else {
                Some((
                    NavState::Panorama { location: *index },
                    SmallVec::from_slice(&[
                        HideGroup(GroupKind::MainMenu),
                        LoadLocation { location: *index },
                        ShowGroup(GroupKind::Panorama),
                        ShowGroup(GroupKind::Dock),
                        SetPanoramaBack { visible: true },
                        SetAudioLayout(AudioLayout::Standalone),
                    ]),
                ))
            }
        }

        (NavState::MultiScene { parent, .. }, NavEvent::SubLocationSelected(child)) => {
            if catalog.sub_location(*parent, *child).is_none() {
                log::error!("selected unknown sub-location {child} of location {parent}");
                return None;
            }
            // Sub-menu stays visible; only the panorama content changes.
            Some((
                NavState::MultiScene {
                    parent: *parent,
                    active_child: *child,
                },
                SmallVec::from_slice(&[
                    LoadSubLocation {
                        parent: *parent,
                        child: *child,
                    },
                    MarkSubActive { index: *child },
                ]),
            ))
        }

        (NavState::MultiScene { .. }, NavEvent::SubMenuBack) => Some((
            NavState::MainMenu,
            SmallVec::from_slice(&[
                HideGroup(GroupKind::SubMenu),
                TearDownSubMenu,
                StopAudio,
                HideGroup(GroupKind::Panorama),
                HideGroup(GroupKind::Dock),
                ShowGroup(GroupKind::MainMenu),
            ]),
        )),

        (NavState::Panorama { .. }, NavEvent::PanoramaBack) => Some((
            NavState::MainMenu,
            SmallVec::from_slice(&[
                StopAudio,
                HideGroup(GroupKind::Panorama),
                HideGroup(GroupKind::Dock),
                ShowGroup(GroupKind::MainMenu),
            ]),
        )),

        _ => {
            log::warn!("navigation event {event:?} ignored in state {state:?}");
            None
        }
    }
}
