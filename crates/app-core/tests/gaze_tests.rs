// Host-side tests for the gaze/dwell engine against a fake scene.

use app_core::{
    Action, BoundingVolume, GazeEngine, GazeEvent, GroupKind, Interactable, Node, NodeId, Ray,
    SceneRegistry,
};
use glam::Vec3;

fn sphere_node(scene: &mut SceneRegistry, center: Vec3, action: Action) -> NodeId {
    scene.insert(
        Node::new(GroupKind::MainMenu)
            .with_volume(BoundingVolume::Sphere {
                center,
                radius: 0.4,
            })
            .with_interactable(Interactable::new(action)),
    )
}

fn ray_towards(target: Vec3) -> Ray {
    Ray::new(Vec3::ZERO, target)
}

#[test]
fn dwell_fires_exactly_once_per_activation_period() {
    let mut scene = SceneRegistry::new();
    let node = sphere_node(&mut scene, Vec3::new(0.0, 0.0, -3.0), Action::PanoramaBack);
    scene.set_visible(GroupKind::MainMenu, true);

    let mut gaze = GazeEngine::new();
    let ray = ray_towards(Vec3::new(0.0, 0.0, -1.0));
    let mut events = Vec::new();

    // Default activation time 1.5s, delta 0.1s: the 15th update fires,
    // then the 30th fires again while the gaze holds.
    let mut activations = Vec::new();
    for frame in 1..=30 {
        events.clear();
        gaze.tick(ray, &scene, 0.1, &mut events);
        for ev in &events {
            if matches!(ev, GazeEvent::Activated { node: n, .. } if *n == node) {
                activations.push(frame);
            }
        }
    }
    assert_eq!(activations, vec![15, 30]);
}

#[test]
fn progress_resets_on_activation() {
    let mut scene = SceneRegistry::new();
    sphere_node(&mut scene, Vec3::new(0.0, 0.0, -3.0), Action::PanoramaBack);
    scene.set_visible(GroupKind::MainMenu, true);

    let mut gaze = GazeEngine::new();
    let ray = ray_towards(Vec3::new(0.0, 0.0, -1.0));
    let mut events = Vec::new();

    let mut last_progress = 0.0;
    for _ in 0..14 {
        let status = gaze.tick(ray, &scene, 0.1, &mut events);
        assert!(status.progress >= last_progress);
        last_progress = status.progress;
    }
    let status = gaze.tick(ray, &scene, 0.1, &mut events);
    assert_eq!(status.progress, 0.0, "activation frame resets progress");
}

#[test]
fn hover_handoff_fires_out_then_in_and_resets_dwell() {
    let mut scene = SceneRegistry::new();
    let a = sphere_node(&mut scene, Vec3::new(0.0, 0.0, -3.0), Action::PanoramaBack);
    let b = sphere_node(&mut scene, Vec3::new(2.0, 0.0, -3.0), Action::SubMenuBack);
    scene.set_visible(GroupKind::MainMenu, true);

    let mut gaze = GazeEngine::new();
    let mut events = Vec::new();

    // Dwell on A for a while, then flick to B in a single frame.
    for _ in 0..10 {
        gaze.tick(ray_towards(Vec3::new(0.0, 0.0, -1.0)), &scene, 0.1, &mut events);
    }
    events.clear();
    let status = gaze.tick(ray_towards(Vec3::new(2.0, 0.0, -3.0)), &scene, 0.1, &mut events);

    assert_eq!(
        events,
        vec![GazeEvent::HoverOut(a), GazeEvent::HoverIn(b)],
        "hover-out must precede hover-in"
    );
    // One frame of dwell on B only.
    assert!(status.progress <= 0.1 / 1.5 + 1e-5);
}

#[test]
fn losing_all_targets_clears_hover_and_progress() {
    let mut scene = SceneRegistry::new();
    let node = sphere_node(&mut scene, Vec3::new(0.0, 0.0, -3.0), Action::PanoramaBack);
    scene.set_visible(GroupKind::MainMenu, true);

    let mut gaze = GazeEngine::new();
    let mut events = Vec::new();
    for _ in 0..12 {
        gaze.tick(ray_towards(Vec3::new(0.0, 0.0, -1.0)), &scene, 0.1, &mut events);
    }
    events.clear();

    // Look away entirely.
    let status = gaze.tick(ray_towards(Vec3::new(0.0, 1.0, 1.0)), &scene, 0.1, &mut events);
    assert_eq!(events, vec![GazeEvent::HoverOut(node)]);
    assert_eq!(status.hovered, None);
    assert_eq!(status.progress, 0.0);

    // Coming back starts the dwell from scratch.
    let status = gaze.tick(ray_towards(Vec3::new(0.0, 0.0, -1.0)), &scene, 0.1, &mut events);
    assert!(status.progress <= 0.1 / 1.5 + 1e-5);
}

#[test]
fn activation_time_override_is_respected() {
    let mut scene = SceneRegistry::new();
    let node = scene.insert(
        Node::new(GroupKind::Tutorial)
            .with_volume(BoundingVolume::Sphere {
                center: Vec3::new(0.0, 0.0, -2.0),
                radius: 0.3,
            })
            .with_interactable(Interactable::new(Action::TutorialOrb).with_dwell(2.0)),
    );
    scene.set_visible(GroupKind::Tutorial, true);

    let mut gaze = GazeEngine::new();
    let ray = ray_towards(Vec3::new(0.0, 0.0, -1.0));
    let mut events = Vec::new();
    for _ in 0..19 {
        gaze.tick(ray, &scene, 0.1, &mut events);
    }
    assert!(!events
        .iter()
        .any(|e| matches!(e, GazeEvent::Activated { .. })));
    gaze.tick(ray, &scene, 0.1, &mut events);
    assert!(events
        .iter()
        .any(|e| matches!(e, GazeEvent::Activated { node: n, .. } if *n == node)));
}

#[test]
fn single_shot_nodes_fire_once_until_gaze_leaves() {
    let mut scene = SceneRegistry::new();
    let node = scene.insert(
        Node::new(GroupKind::Welcome)
            .with_volume(BoundingVolume::Sphere {
                center: Vec3::new(0.0, 0.0, -2.0),
                radius: 0.3,
            })
            .with_interactable(Interactable::new(Action::StartExperience).single_shot()),
    );
    scene.set_visible(GroupKind::Welcome, true);

    let mut gaze = GazeEngine::new();
    let ray = ray_towards(Vec3::new(0.0, 0.0, -1.0));
    let mut events = Vec::new();

    // Dwell for four full activation periods: only one fire.
    for _ in 0..60 {
        gaze.tick(ray, &scene, 0.1, &mut events);
    }
    let fires = events
        .iter()
        .filter(|e| matches!(e, GazeEvent::Activated { .. }))
        .count();
    assert_eq!(fires, 1);

    // Leave and return: re-armed.
    gaze.tick(ray_towards(Vec3::new(0.0, 1.0, 1.0)), &scene, 0.1, &mut events);
    events.clear();
    for _ in 0..16 {
        gaze.tick(ray, &scene, 0.1, &mut events);
    }
    assert!(events
        .iter()
        .any(|e| matches!(e, GazeEvent::Activated { node: n, .. } if *n == node)));
}
