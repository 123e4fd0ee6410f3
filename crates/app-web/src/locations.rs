//! Static tour catalog: four South Sulawesi locations, one of them a
//! multi-scene set browsed through the persistent sub-menu. Read-only
//! after startup; `Catalog::validate` runs once in init.

use app_core::{Catalog, Link, Location, Scene, SubLocation};

fn link(target: &str, label: &str, angle: f32) -> Link {
    Link {
        target: target.to_string(),
        label: label.to_string(),
        angle,
    }
}

fn scene(id: &str, path: &str, links: Vec<Link>) -> Scene {
    Scene {
        id: id.to_string(),
        path: path.to_string(),
        links,
    }
}

fn simple(name: &str, slug: &str) -> Location {
    Location {
        name: name.to_string(),
        thumbnail: format!("/assets/{slug}/thumbnail.jpg"),
        panorama: Some(format!("/assets/{slug}/pano-1.jpg")),
        audio: Some(format!("/assets/{slug}/narration.m4a")),
        ..Default::default()
    }
}

fn toraja_sub(name: &str, slug: &str, scenes: Vec<Scene>) -> SubLocation {
    SubLocation {
        name: name.to_string(),
        thumbnail: format!("/assets/toraja/{slug}/1.jpg"),
        panorama: Some(format!("/assets/toraja/{slug}/1.jpg")),
        audio: Some(format!("/assets/toraja/{slug}/narration.m4a")),
        scenes,
    }
}

pub fn build_catalog() -> Catalog {
    let patung_yesus = toraja_sub(
        "Patung Yesus",
        "patung-yesus",
        vec![
            scene(
                "1",
                "/assets/toraja/patung-yesus/1.jpg",
                vec![link("2", "Maju", 270.0)],
            ),
            scene(
                "2",
                "/assets/toraja/patung-yesus/2.jpg",
                vec![link("1", "Kembali", 90.0), link("3", "Maju", 270.0)],
            ),
            scene(
                "3",
                "/assets/toraja/patung-yesus/3.jpg",
                vec![link("2", "Kembali", 270.0)],
            ),
        ],
    );

    let lolai = toraja_sub(
        "Lolai",
        "lolai",
        vec![
            scene(
                "1",
                "/assets/toraja/lolai/1.jpg",
                vec![link("2", "Maju", 270.0)],
            ),
            scene(
                "2",
                "/assets/toraja/lolai/2.jpg",
                vec![link("1", "Kembali", 90.0), link("3", "Maju", 270.0)],
            ),
            scene(
                "3",
                "/assets/toraja/lolai/3.jpg",
                vec![link("2", "Kembali", 90.0), link("4", "Maju", 270.0)],
            ),
            scene(
                "4",
                "/assets/toraja/lolai/4.jpg",
                vec![link("3", "Kembali", 90.0)],
            ),
        ],
    );

    let toraja = Location {
        name: "Toraja".to_string(),
        thumbnail: "/assets/toraja/thumbnail.jpg".to_string(),
        panorama: None,
        audio: None,
        scenes: Vec::new(),
        sub_locations: vec![
            toraja_sub("Welcome", "welcome", Vec::new()),
            patung_yesus,
            toraja_sub("Rante Kalimbuang", "rante-kalimbuang", Vec::new()),
            lolai,
            toraja_sub("Londa Graveyard", "londa", Vec::new()),
            toraja_sub("Kete' Kesu", "kete-kesu", Vec::new()),
            toraja_sub("Kuburan Batu Lemo", "batu-lemo", Vec::new()),
        ],
    };

    Catalog::new(vec![
        simple("Fort Rotterdam", "fort-rotterdam"),
        simple("Losari Beach", "losari-beach"),
        simple("Malino", "malino"),
        toraja,
    ])
}
