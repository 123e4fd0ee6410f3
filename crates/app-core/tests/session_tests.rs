// Scene/hotspot loader planning: cycles, staleness, fallbacks.

use app_core::{
    AudioCue, Catalog, Link, Location, PanoSession, PanoSource, Scene, HOTSPOT_RADIUS,
};

fn linked_scene(id: &str, path: &str, links: &[(&str, f32)]) -> Scene {
    Scene {
        id: id.to_string(),
        path: path.to_string(),
        links: links
            .iter()
            .map(|(target, angle)| Link {
                target: target.to_string(),
                label: "Go".to_string(),
                angle: *angle,
            })
            .collect(),
    }
}

fn catalog() -> Catalog {
    Catalog::new(vec![
        Location {
            name: "Single".into(),
            thumbnail: "/thumbs/single.jpg".into(),
            panorama: Some("/pano/single.jpg".into()),
            audio: Some("/audio/single.m4a".into()),
            ..Default::default()
        },
        Location {
            name: "Walk".into(),
            thumbnail: "/thumbs/walk.jpg".into(),
            audio: Some("/audio/walk.m4a".into()),
            scenes: vec![
                linked_scene("1", "/pano/walk-1.jpg", &[("2", 270.0)]),
                linked_scene("2", "/pano/walk-2.jpg", &[("1", 90.0), ("3", 270.0)]),
                linked_scene("3", "/pano/walk-3.jpg", &[("2", 270.0)]),
            ],
            ..Default::default()
        },
    ])
}

#[test]
fn single_panorama_location_clears_hotspots() {
    let catalog = catalog();
    let mut session = PanoSession::new();
    let plan = session
        .load_source(&catalog, PanoSource::Location(0))
        .unwrap();
    assert_eq!(plan.texture.path, "/pano/single.jpg");
    assert!(plan.hotspots.is_empty());
    assert!(plan.preload.is_empty());
    assert_eq!(plan.audio, AudioCue::Start("/audio/single.m4a".into()));
    assert_eq!(session.current_scene(), None);
}

#[test]
fn scene_location_loads_first_scene_and_preloads_neighbors() {
    let catalog = catalog();
    let mut session = PanoSession::new();
    let plan = session
        .load_source(&catalog, PanoSource::Location(1))
        .unwrap();
    assert_eq!(plan.texture.path, "/pano/walk-1.jpg");
    assert_eq!(session.current_scene(), Some("1"));
    assert_eq!(plan.hotspots.len(), 1);
    assert_eq!(plan.hotspots[0].target, "2");
    // Immediate neighbors only.
    assert_eq!(plan.preload, vec!["/pano/walk-2.jpg".to_string()]);
    assert_eq!(plan.audio, AudioCue::Start("/audio/walk.m4a".into()));

    // Hotspot placed to the left for a 270 degree link.
    let pos = plan.hotspots[0].position;
    assert!((pos.x + HOTSPOT_RADIUS).abs() < 1e-3);
    assert!(pos.z.abs() < 1e-3);
}

#[test]
fn hotspot_cycle_navigates_both_ways_without_preload_explosion() {
    let catalog = catalog();
    let mut session = PanoSession::new();
    session
        .load_source(&catalog, PanoSource::Location(1))
        .unwrap();

    let forward = session.activate_link(&catalog, "2").unwrap();
    assert_eq!(session.current_scene(), Some("2"));
    assert_eq!(forward.texture.path, "/pano/walk-2.jpg");
    // Scene 2 links back to 1 and on to 3; nothing further.
    assert_eq!(
        forward.preload,
        vec!["/pano/walk-1.jpg".to_string(), "/pano/walk-3.jpg".to_string()]
    );
    // Scene hops keep the location narration running.
    assert_eq!(forward.audio, AudioCue::Keep);

    let back = session.activate_link(&catalog, "1").unwrap();
    assert_eq!(session.current_scene(), Some("1"));
    assert_eq!(back.texture.path, "/pano/walk-1.jpg");
}

#[test]
fn unknown_hotspot_target_is_a_no_op() {
    let catalog = catalog();
    let mut session = PanoSession::new();
    session
        .load_source(&catalog, PanoSource::Location(1))
        .unwrap();
    assert!(session.activate_link(&catalog, "99").is_none());
    assert_eq!(session.current_scene(), Some("1"), "scene unchanged");
}

#[test]
fn stale_epochs_are_rejected_after_navigation() {
    let catalog = catalog();
    let mut session = PanoSession::new();
    let first = session
        .load_source(&catalog, PanoSource::Location(1))
        .unwrap();
    assert!(session.is_current(first.texture.epoch));

    // Navigate on before the first load completes.
    let second = session.activate_link(&catalog, "2").unwrap();
    assert!(!session.is_current(first.texture.epoch));
    assert!(session.is_current(second.texture.epoch));

    // Hiding the panorama strands everything in flight.
    session.deactivate();
    assert!(!session.is_current(second.texture.epoch));
}

#[test]
fn activating_link_without_active_source_is_rejected() {
    let catalog = catalog();
    let mut session = PanoSession::new();
    assert!(session.activate_link(&catalog, "1").is_none());
}
