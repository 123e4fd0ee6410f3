// State machine tests: transitions are pure, effects are asserted as data.

use app_core::{
    transition, AudioLayout, Catalog, Effect, GroupKind, Link, Location, NavEvent, NavState, Scene,
    SubLocation,
};

fn sub(name: &str) -> SubLocation {
    SubLocation {
        name: name.to_string(),
        thumbnail: format!("/thumbs/{name}.jpg"),
        panorama: Some(format!("/pano/{name}.jpg")),
        audio: Some(format!("/audio/{name}.m4a")),
        scenes: Vec::new(),
    }
}

fn catalog() -> Catalog {
    Catalog::new(vec![
        Location {
            name: "Fort".into(),
            thumbnail: "/thumbs/fort.jpg".into(),
            panorama: Some("/pano/fort.jpg".into()),
            audio: Some("/audio/fort.m4a".into()),
            ..Default::default()
        },
        Location {
            name: "Highlands".into(),
            thumbnail: "/thumbs/highlands.jpg".into(),
            sub_locations: vec![sub("welcome"), sub("statue")],
            ..Default::default()
        },
        Location {
            name: "Trail".into(),
            thumbnail: "/thumbs/trail.jpg".into(),
            scenes: vec![
                Scene {
                    id: "1".into(),
                    path: "/pano/trail-1.jpg".into(),
                    links: vec![Link {
                        target: "2".into(),
                        label: "Onward".into(),
                        angle: 270.0,
                    }],
                },
                Scene {
                    id: "2".into(),
                    path: "/pano/trail-2.jpg".into(),
                    links: vec![Link {
                        target: "1".into(),
                        label: "Back".into(),
                        angle: 90.0,
                    }],
                },
            ],
            ..Default::default()
        },
    ])
}

#[test]
fn welcome_start_reveals_main_menu() {
    let (state, effects) =
        transition(&NavState::Welcome, &NavEvent::StartActivated, &catalog()).unwrap();
    assert_eq!(state, NavState::MainMenu);
    assert_eq!(
        effects.as_slice(),
        &[
            Effect::HideGroup(GroupKind::Welcome),
            Effect::ShowGroup(GroupKind::MainMenu),
        ]
    );
}

#[test]
fn plain_location_opens_standalone_panorama() {
    let (state, effects) = transition(
        &NavState::MainMenu,
        &NavEvent::LocationSelected(0),
        &catalog(),
    )
    .unwrap();
    assert_eq!(state, NavState::Panorama { location: 0 });
    assert!(effects.contains(&Effect::LoadLocation { location: 0 }));
    assert!(effects.contains(&Effect::SetPanoramaBack { visible: true }));
    assert!(effects.contains(&Effect::SetAudioLayout(AudioLayout::Standalone)));
    assert!(!effects.iter().any(|e| matches!(e, Effect::BuildSubMenu { .. })));
}

#[test]
fn multi_location_opens_sub_menu_with_first_child_active() {
    let (state, effects) = transition(
        &NavState::MainMenu,
        &NavEvent::LocationSelected(1),
        &catalog(),
    )
    .unwrap();
    assert_eq!(
        state,
        NavState::MultiScene {
            parent: 1,
            active_child: 0
        }
    );
    assert!(effects.contains(&Effect::BuildSubMenu { parent: 1 }));
    assert!(effects.contains(&Effect::ShowGroup(GroupKind::SubMenu)));
    assert!(effects.contains(&Effect::LoadSubLocation { parent: 1, child: 0 }));
    // Sub-menu owns back; the panorama's own control is disabled.
    assert!(effects.contains(&Effect::SetPanoramaBack { visible: false }));
    assert!(effects.contains(&Effect::SetAudioLayout(AudioLayout::WithDock)));
    assert!(effects.contains(&Effect::MarkSubActive { index: 0 }));
}

#[test]
fn selecting_sibling_sub_location_keeps_sub_menu() {
    let state = NavState::MultiScene {
        parent: 1,
        active_child: 0,
    };
    let (next, effects) =
        transition(&state, &NavEvent::SubLocationSelected(1), &catalog()).unwrap();
    assert_eq!(
        next,
        NavState::MultiScene {
            parent: 1,
            active_child: 1
        }
    );
    assert!(effects.contains(&Effect::LoadSubLocation { parent: 1, child: 1 }));
    assert!(effects.contains(&Effect::MarkSubActive { index: 1 }));
    // The sub-menu must stay visible: no hide effect for it.
    assert!(!effects.contains(&Effect::HideGroup(GroupKind::SubMenu)));
}

#[test]
fn sub_menu_back_stops_audio_and_returns_to_main_menu() {
    let state = NavState::MultiScene {
        parent: 1,
        active_child: 1,
    };
    let (next, effects) = transition(&state, &NavEvent::SubMenuBack, &catalog()).unwrap();
    assert_eq!(next, NavState::MainMenu);
    assert!(effects.contains(&Effect::StopAudio));
    assert!(effects.contains(&Effect::HideGroup(GroupKind::SubMenu)));
    assert!(effects.contains(&Effect::HideGroup(GroupKind::Panorama)));
    assert!(effects.contains(&Effect::ShowGroup(GroupKind::MainMenu)));
}

#[test]
fn panorama_back_stops_audio_and_returns_to_main_menu() {
    let state = NavState::Panorama { location: 0 };
    let (next, effects) = transition(&state, &NavEvent::PanoramaBack, &catalog()).unwrap();
    assert_eq!(next, NavState::MainMenu);
    assert!(effects.contains(&Effect::StopAudio));
    assert!(effects.contains(&Effect::HideGroup(GroupKind::Panorama)));
    assert!(effects.contains(&Effect::ShowGroup(GroupKind::MainMenu)));
}

#[test]
fn unknown_location_index_is_rejected() {
    assert!(transition(
        &NavState::MainMenu,
        &NavEvent::LocationSelected(99),
        &catalog()
    )
    .is_none());
    let state = NavState::MultiScene {
        parent: 1,
        active_child: 0,
    };
    assert!(transition(&state, &NavEvent::SubLocationSelected(99), &catalog()).is_none());
}

#[test]
fn mismatched_events_leave_state_unchanged() {
    assert!(transition(&NavState::Welcome, &NavEvent::PanoramaBack, &catalog()).is_none());
    assert!(transition(&NavState::MainMenu, &NavEvent::SubMenuBack, &catalog()).is_none());
}

#[test]
fn visible_groups_follow_state() {
    use app_core::visible_groups;
    assert_eq!(visible_groups(&NavState::Welcome), &[GroupKind::Welcome]);
    assert_eq!(visible_groups(&NavState::MainMenu), &[GroupKind::MainMenu]);
    assert_eq!(
        visible_groups(&NavState::Panorama { location: 0 }),
        &[GroupKind::Panorama, GroupKind::Dock]
    );
    assert_eq!(
        visible_groups(&NavState::MultiScene {
            parent: 1,
            active_child: 0
        }),
        &[GroupKind::SubMenu, GroupKind::Panorama, GroupKind::Dock]
    );
}
