//! Application driver: owns the scene registry, the gaze engine, the
//! navigation state and the panorama session, executes the effect lists
//! the core hands back, and turns the whole thing into a draw list.
//!
//! Group visibility is driven exclusively by transition effects (plus the
//! tutorial overlay, which sits on top of the main menu); nothing else
//! touches it.

use std::f32::consts::PI;
use std::rc::Rc;

use fnv::FnvHashMap;
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use web_sys as web;

use app_core::{
    transition, Action, AudioCue, BoundingVolume, Catalog, Effect, Effects, GazeEngine, GazeEvent,
    GroupKind, Interactable, LoadPlan, NavEvent, NavState, Node, NodeId, PanoSession, PanoSource,
    Ray, SceneRegistry, TextureCache, Tutorial, TutorialStep, DOCK_FOLLOW_EASE,
    DOCK_FOLLOW_PITCH_GATE, DOCK_RADIUS, DOCK_Y, EYE_HEIGHT, HOTSPOT_Y, MENU_ARC, MENU_RADIUS,
    MENU_Y, SUBMENU_ARC, SUBMENU_RADIUS, SUBMENU_Y, TUTORIAL_ORB_DWELL,
};

use crate::audio::Narration;
use crate::camera::OrbitCamera;
use crate::canvas_tex;
use crate::constants::WELCOME_PANORAMA;
use crate::render::{BillboardDraw, DrawList, GpuState, GpuTexture, ReticleDraw};
use crate::textures::{self, RgbaImage, TexArrival, TexPurpose, TexQueue};
use crate::ui;

/// Draw-side state for one node. Scale/opacity carry the hover and
/// active-item feedback; dropping the entry releases the GPU texture.
struct Billboard {
    group: GroupKind,
    center: Vec3,
    face_target: Vec3,
    size: Vec2,
    tilt_x: f32,
    scale: f32,
    rest_scale: f32,
    hover_scale: f32,
    opacity: f32,
    rest_opacity: f32,
    hover_opacity: f32,
    visible: bool,
    /// Name and palette index for regenerating a thumbnail card once its
    /// image arrives (or fails).
    card: Option<(String, usize)>,
    texture: Rc<GpuTexture>,
}

impl Billboard {
    fn new(
        group: GroupKind,
        center: Vec3,
        face_target: Vec3,
        size: Vec2,
        texture: Rc<GpuTexture>,
    ) -> Self {
        Self {
            group,
            center,
            face_target,
            size,
            tilt_x: 0.0,
            scale: 1.0,
            rest_scale: 1.0,
            hover_scale: 1.1,
            opacity: 1.0,
            rest_opacity: 1.0,
            hover_opacity: 1.0,
            visible: true,
            card: None,
            texture,
        }
    }

    fn model(&self, group_yaw: f32) -> Mat4 {
        let (right, up) = quad_basis(self.center, self.face_target, self.tilt_x);
        let normal = right.cross(up);
        let orient = Mat4::from_cols(
            right.extend(0.0),
            up.extend(0.0),
            normal.extend(0.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        );
        Mat4::from_rotation_y(group_yaw)
            * Mat4::from_translation(self.center)
            * orient
            * Mat4::from_scale(Vec3::new(
                self.size.x * self.scale,
                self.size.y * self.scale,
                1.0,
            ))
    }
}

/// Shared orientation for a quad's visual and its pick volume, so the gaze
/// always agrees with what is on screen.
fn quad_basis(center: Vec3, target: Vec3, tilt_x: f32) -> (Vec3, Vec3) {
    let normal = (target - center).normalize_or_zero();
    let right = Vec3::Y.cross(normal).normalize_or_zero();
    let up = normal.cross(right);
    if tilt_x == 0.0 {
        (right, up)
    } else {
        let tilt = Quat::from_axis_angle(right, tilt_x);
        (right, tilt * up)
    }
}

fn quad_volume(center: Vec3, target: Vec3, tilt_x: f32, half: Vec2) -> BoundingVolume {
    let (right, up) = quad_basis(center, target, tilt_x);
    BoundingVolume::Quad {
        center,
        right,
        up,
        half_extents: half,
    }
}

/// Group yaw that puts the group's local forward (-Z) under the camera's
/// horizontal look direction.
fn yaw_towards(dir: Vec3) -> f32 {
    (-dir.x).atan2(-dir.z)
}

fn ease_yaw(current: f32, target: f32, ease: f32) -> f32 {
    let mut diff = target - current;
    while diff > PI {
        diff -= PI * 2.0;
    }
    while diff < -PI {
        diff += PI * 2.0;
    }
    current + diff * ease
}

const DRAW_ORDER: [GroupKind; 6] = [
    GroupKind::Panorama,
    GroupKind::Dock,
    GroupKind::SubMenu,
    GroupKind::MainMenu,
    GroupKind::Welcome,
    GroupKind::Tutorial,
];

pub struct App {
    pub gpu: GpuState<'static>,
    document: web::Document,

    catalog: Catalog,
    registry: SceneRegistry,
    gaze: GazeEngine,
    nav: NavState,
    session: PanoSession,
    tutorial: Tutorial,

    cache: TextureCache<Rc<GpuTexture>>,
    pub tex_queue: TexQueue,
    narration: Narration,

    billboards: FnvHashMap<NodeId, Billboard>,
    pano_texture: Option<Rc<GpuTexture>>,
    welcome_texture: Option<Rc<GpuTexture>>,
    /// Path + epoch the sphere is waiting for; anything else that
    /// completes goes to the cache only.
    desired_pano: Option<(String, u64)>,

    arrow_texture: Rc<GpuTexture>,

    back_btn: NodeId,
    play_btn: NodeId,
    mute_btn: NodeId,
    submenu_items: Vec<NodeId>,
    hotspots: Vec<NodeId>,

    hud_node: Option<NodeId>,
    orb_node: Option<NodeId>,
    skip_node: Option<NodeId>,
    hud_yaw: f32,

    camera_yaw: f32,
    prev_look: Vec3,
    reticle: ReticleDraw,
    events_scratch: Vec<GazeEvent>,
}

impl App {
    pub fn new(gpu: GpuState<'static>, document: web::Document, catalog: Catalog) -> Self {
        let tex_queue: TexQueue = Rc::default();
        let arrow_texture = Rc::new(make_texture(&gpu, canvas_tex::arrow_icon()));

        let mut app = Self {
            gpu,
            document,
            catalog,
            registry: SceneRegistry::new(),
            gaze: GazeEngine::new(),
            nav: NavState::Welcome,
            session: PanoSession::new(),
            tutorial: Tutorial::new(crate::dom::tutorial_completed()),
            cache: TextureCache::new(),
            tex_queue,
            narration: Narration::new(),
            billboards: FnvHashMap::default(),
            pano_texture: None,
            welcome_texture: None,
            desired_pano: None,
            arrow_texture,
            back_btn: NodeId(0),
            play_btn: NodeId(0),
            mute_btn: NodeId(0),
            submenu_items: Vec::new(),
            hotspots: Vec::new(),
            hud_node: None,
            orb_node: None,
            skip_node: None,
            hud_yaw: 0.0,
            camera_yaw: 0.0,
            prev_look: Vec3::NEG_Z,
            reticle: ReticleDraw {
                visible: true,
                progress: 0.0,
            },
            events_scratch: Vec::new(),
        };

        app.build_welcome();
        app.build_main_menu();
        app.build_dock_controls();
        app.registry.set_visible(GroupKind::Welcome, true);

        // Welcome background sphere.
        if app.cache.begin_load(WELCOME_PANORAMA) {
            textures::request(
                &app.tex_queue,
                WELCOME_PANORAMA.to_string(),
                TexPurpose::Welcome,
            );
        }
        app
    }

    // ---------------- view construction ----------------

    fn build_welcome(&mut self) {
        let panel_center = Vec3::new(0.0, EYE_HEIGHT, -2.5);
        let panel = self.registry.insert(Node::new(GroupKind::Welcome));
        let panel_tex = Rc::new(make_texture(
            &self.gpu,
            canvas_tex::welcome_panel("VIRTUAL TOUR", "Explore South Sulawesi in 360\u{b0}"),
        ));
        self.billboards.insert(
            panel,
            Billboard::new(
                GroupKind::Welcome,
                panel_center,
                Vec3::new(0.0, EYE_HEIGHT, 0.0),
                Vec2::new(2.0, 1.2),
                panel_tex,
            ),
        );

        let btn_center = Vec3::new(0.0, EYE_HEIGHT - 0.45, -2.4);
        let btn_size = Vec2::new(0.8, 0.2);
        let start = self.registry.insert(
            Node::new(GroupKind::Welcome)
                .with_volume(quad_volume(
                    btn_center,
                    Vec3::new(0.0, EYE_HEIGHT - 0.45, 0.0),
                    0.0,
                    btn_size / 2.0,
                ))
                .with_interactable(Interactable::new(Action::StartExperience).single_shot()),
        );
        let btn_tex = Rc::new(make_texture(
            &self.gpu,
            canvas_tex::pill_label(
                "ENTER EXPERIENCE",
                "rgba(255, 255, 255, 0.1)",
                "#ffffff",
            ),
        ));
        self.billboards.insert(
            start,
            Billboard::new(
                GroupKind::Welcome,
                btn_center,
                Vec3::new(0.0, EYE_HEIGHT - 0.45, 0.0),
                btn_size,
                btn_tex,
            ),
        );
    }

    fn build_main_menu(&mut self) {
        let count = self.catalog.locations.len();
        let start_angle = PI - MENU_ARC / 2.0;
        let step = if count > 1 {
            MENU_ARC / (count - 1) as f32
        } else {
            0.0
        };
        let size = Vec2::new(0.6, 0.4);
        let face = Vec3::new(0.0, MENU_Y, 0.0);

        for index in 0..count {
            let (name, thumbnail) = {
                let loc = &self.catalog.locations[index];
                (loc.name.clone(), loc.thumbnail.clone())
            };
            let theta = start_angle + index as f32 * step;
            let center = Vec3::new(theta.sin() * MENU_RADIUS, MENU_Y, theta.cos() * MENU_RADIUS);
            let node = self.registry.insert(
                Node::new(GroupKind::MainMenu)
                    .with_volume(quad_volume(center, face, 0.0, size / 2.0))
                    .with_interactable(Interactable::new(Action::SelectLocation(index))),
            );
            let placeholder = Rc::new(make_texture(
                &self.gpu,
                canvas_tex::thumbnail_card(&name, index, None),
            ));
            let mut billboard =
                Billboard::new(GroupKind::MainMenu, center, face, size, placeholder);
            billboard.hover_scale = 1.2;
            billboard.card = Some((name, index));
            self.billboards.insert(node, billboard);

            textures::request(&self.tex_queue, thumbnail, TexPurpose::Thumbnail { node });
        }
    }

    /// Back pill plus play/mute buttons; created once, repositioned per
    /// audio layout.
    fn build_dock_controls(&mut self) {
        let back_center = Vec3::new(0.0, DOCK_Y, -1.8);
        let back_size = Vec2::new(0.5, 0.2);
        let back_face = Vec3::new(0.0, DOCK_Y, 0.0);
        self.back_btn = self.registry.insert(
            Node::new(GroupKind::Dock)
                .with_volume(quad_volume(back_center, back_face, 0.0, back_size / 2.0))
                .with_interactable(Interactable::new(Action::PanoramaBack)),
        );
        let back_tex = Rc::new(make_texture(
            &self.gpu,
            canvas_tex::pill_label("BACK", "rgba(200, 50, 50, 0.4)", "rgba(255, 100, 100, 0.8)"),
        ));
        self.billboards.insert(
            self.back_btn,
            Billboard::new(GroupKind::Dock, back_center, back_face, back_size, back_tex),
        );

        let play_tex = Rc::new(make_texture(&self.gpu, canvas_tex::play_icon(false)));
        let mute_tex = Rc::new(make_texture(&self.gpu, canvas_tex::mute_icon(false)));
        let icon_size = Vec2::new(0.18, 0.18);
        self.play_btn = self.registry.insert(
            Node::new(GroupKind::Dock)
                .with_interactable(Interactable::new(Action::ToggleAudio)),
        );
        self.mute_btn = self.registry.insert(
            Node::new(GroupKind::Dock)
                .with_interactable(Interactable::new(Action::ToggleMute)),
        );
        for (node, tex) in [(self.play_btn, play_tex), (self.mute_btn, mute_tex)] {
            let mut billboard = Billboard::new(
                GroupKind::Dock,
                Vec3::ZERO,
                Vec3::new(0.0, DOCK_Y, 0.0),
                icon_size,
                tex,
            );
            billboard.hover_scale = 1.2;
            self.billboards.insert(node, billboard);
        }
        self.apply_audio_layout(app_core::AudioLayout::Standalone);
    }

    fn apply_audio_layout(&mut self, layout: app_core::AudioLayout) {
        // Angles clockwise from forward, matched to the dock artwork: far
        // right when the sub-menu dock occupies the bottom arc, tucked in
        // next to BACK otherwise.
        let (play_angle, mute_angle, y) = match layout {
            app_core::AudioLayout::WithDock => (PI * 0.3, PI * 0.34, DOCK_Y),
            app_core::AudioLayout::Standalone => (PI * 0.067, PI * 0.106, -0.55),
        };
        for (node, angle) in [(self.play_btn, play_angle), (self.mute_btn, mute_angle)] {
            let center = Vec3::new(angle.sin() * DOCK_RADIUS, y, -angle.cos() * DOCK_RADIUS);
            let face = Vec3::new(0.0, y, 0.0);
            let half = Vec2::new(0.09, 0.09);
            if let Some(n) = self.registry.node_mut(node) {
                n.volume = Some(quad_volume(center, face, 0.0, half));
            }
            if let Some(b) = self.billboards.get_mut(&node) {
                b.center = center;
                b.face_target = face;
            }
        }
    }

    fn build_sub_menu(&mut self, parent: usize) {
        self.teardown_sub_menu();
        let Some(location) = self.catalog.location(parent) else {
            return;
        };
        let subs: Vec<(String, String)> = location
            .sub_locations
            .iter()
            .map(|s| (s.name.clone(), s.thumbnail.clone()))
            .collect();

        let count = subs.len();
        let start_angle = PI - SUBMENU_ARC / 2.0;
        let step = if count > 1 {
            SUBMENU_ARC / (count - 1) as f32
        } else {
            0.0
        };
        let size = Vec2::new(0.3, 0.2);

        for (index, (name, thumbnail)) in subs.into_iter().enumerate() {
            // Reverse order keeps the first item on the left of the dock.
            let theta = start_angle + (count - 1 - index) as f32 * step;
            let center = Vec3::new(
                theta.sin() * SUBMENU_RADIUS,
                SUBMENU_Y,
                theta.cos() * SUBMENU_RADIUS,
            );
            let face = Vec3::new(0.0, SUBMENU_Y, 0.0);
            let node = self.registry.insert(
                Node::new(GroupKind::SubMenu)
                    .with_volume(quad_volume(center, face, 0.0, size / 2.0))
                    .with_interactable(Interactable::new(Action::SelectSubLocation(index))),
            );
            let placeholder = Rc::new(make_texture(
                &self.gpu,
                canvas_tex::thumbnail_card(&name, index, None),
            ));
            let mut billboard = Billboard::new(GroupKind::SubMenu, center, face, size, placeholder);
            billboard.hover_scale = 1.2;
            billboard.rest_opacity = 0.5;
            billboard.opacity = 0.5;
            billboard.card = Some((name, index));
            self.billboards.insert(node, billboard);
            self.submenu_items.push(node);

            textures::request(&self.tex_queue, thumbnail, TexPurpose::Thumbnail { node });
        }

        // The sub-menu's own back pill, below the dock.
        let back_center = Vec3::new(0.0, -0.85, -1.5);
        let back_size = Vec2::new(0.4, 0.15);
        let back_face = Vec3::new(0.0, -0.85, 0.0);
        let back = self.registry.insert(
            Node::new(GroupKind::SubMenu)
                .with_volume(quad_volume(back_center, back_face, 0.0, back_size / 2.0))
                .with_interactable(Interactable::new(Action::SubMenuBack)),
        );
        let back_tex = Rc::new(make_texture(
            &self.gpu,
            canvas_tex::pill_label(
                "\u{2190} BACK",
                "rgba(180, 80, 80, 0.4)",
                "rgba(255, 120, 120, 0.7)",
            ),
        ));
        self.billboards.insert(
            back,
            Billboard::new(GroupKind::SubMenu, back_center, back_face, back_size, back_tex),
        );
    }

    fn teardown_sub_menu(&mut self) {
        for id in self.registry.clear_group(GroupKind::SubMenu) {
            self.billboards.remove(&id);
        }
        self.submenu_items.clear();
    }

    fn mark_sub_active(&mut self, index: usize) {
        for (i, node) in self.submenu_items.iter().enumerate() {
            if let Some(b) = self.billboards.get_mut(node) {
                if i == index {
                    b.rest_scale = 1.2;
                    b.rest_opacity = 1.0;
                } else {
                    b.rest_scale = 1.0;
                    b.rest_opacity = 0.5;
                }
                b.scale = b.rest_scale;
                b.opacity = b.rest_opacity;
            }
        }
    }

    // ---------------- tutorial overlay ----------------

    fn build_tutorial(&mut self) {
        let hud_center = Vec3::new(0.0, EYE_HEIGHT + 0.3, -2.0);
        let hud = self.registry.insert(Node::new(GroupKind::Tutorial));
        let hud_tex = Rc::new(make_texture(
            &self.gpu,
            canvas_tex::hud_text("Selamat Datang!", "Coba lihat ke KIRI dan ke KANAN"),
        ));
        self.billboards.insert(
            hud,
            Billboard::new(
                GroupKind::Tutorial,
                hud_center,
                Vec3::new(0.0, EYE_HEIGHT, 0.0),
                Vec2::new(2.0, 0.5),
                hud_tex,
            ),
        );
        self.hud_node = Some(hud);

        let orb_center = Vec3::new(0.0, EYE_HEIGHT, -2.0);
        let orb = self.registry.insert(
            Node::new(GroupKind::Tutorial)
                .with_volume(BoundingVolume::Sphere {
                    center: orb_center,
                    radius: 0.15,
                })
                .with_interactable(
                    Interactable::new(Action::TutorialOrb)
                        .with_dwell(TUTORIAL_ORB_DWELL)
                        .single_shot(),
                ),
        );
        let orb_tex = Rc::new(make_texture(&self.gpu, canvas_tex::orb_icon()));
        let mut orb_billboard = Billboard::new(
            GroupKind::Tutorial,
            orb_center,
            Vec3::new(0.0, EYE_HEIGHT, 0.0),
            Vec2::new(0.3, 0.3),
            orb_tex,
        );
        orb_billboard.hover_scale = 1.5;
        orb_billboard.visible = false;
        self.billboards.insert(orb, orb_billboard);
        self.registry.set_node_visible(orb, false);
        self.orb_node = Some(orb);

        let skip_center = Vec3::new(0.0, EYE_HEIGHT - 0.9, -1.5);
        let skip_size = Vec2::new(0.6, 0.15);
        let skip = self.registry.insert(
            Node::new(GroupKind::Tutorial)
                .with_volume(quad_volume(
                    skip_center,
                    Vec3::new(0.0, EYE_HEIGHT - 0.9, 0.0),
                    0.0,
                    skip_size / 2.0,
                ))
                .with_interactable(Interactable::new(Action::SkipTutorial).single_shot()),
        );
        let skip_tex = Rc::new(make_texture(
            &self.gpu,
            canvas_tex::pill_label(
                "Skip Tutorial",
                "rgba(50, 50, 50, 0.8)",
                "rgba(255, 255, 255, 0.5)",
            ),
        ));
        self.billboards.insert(
            skip,
            Billboard::new(
                GroupKind::Tutorial,
                skip_center,
                Vec3::new(0.0, EYE_HEIGHT - 0.9, 0.0),
                skip_size,
                skip_tex,
            ),
        );
        self.skip_node = Some(skip);

        self.registry.set_visible(GroupKind::Tutorial, true);
    }

    fn update_tutorial_visuals(&mut self) {
        let (text, subtext, orb_visible) = match self.tutorial.step() {
            TutorialStep::LookAround => {
                ("Selamat Datang!", "Coba lihat ke KIRI dan ke KANAN", false)
            }
            TutorialStep::GazeTarget => ("Bagus!", "Sekarang TATAP bola hijau ini", true),
            TutorialStep::Navigate => ("Navigasi", "Coba pilih salah satu lokasi di menu", false),
            TutorialStep::Done => ("", "", false),
        };
        if let Some(hud) = self.hud_node {
            if let Some(b) = self.billboards.get_mut(&hud) {
                b.texture = Rc::new(make_texture(&self.gpu, canvas_tex::hud_text(text, subtext)));
            }
        }
        if let Some(orb) = self.orb_node {
            self.registry.set_node_visible(orb, orb_visible);
            if let Some(b) = self.billboards.get_mut(&orb) {
                b.visible = orb_visible;
            }
        }
    }

    fn finish_tutorial(&mut self) {
        crate::dom::set_tutorial_completed();
        for id in self.registry.clear_group(GroupKind::Tutorial) {
            self.billboards.remove(&id);
        }
        self.registry.set_visible(GroupKind::Tutorial, false);
        self.hud_node = None;
        self.orb_node = None;
        self.skip_node = None;
    }

    // ---------------- effects & plans ----------------

    fn apply_event(&mut self, event: NavEvent) {
        if let Some((next, effects)) = transition(&self.nav, &event, &self.catalog) {
            self.nav = next;
            self.apply_effects(effects);
        }
    }

    fn apply_effects(&mut self, effects: Effects) {
        for effect in effects {
            match effect {
                Effect::ShowGroup(kind) => {
                    self.registry.set_visible(kind, true);
                    if kind == GroupKind::MainMenu {
                        // Re-face the menu arc to wherever the user is
                        // looking right now.
                        self.registry.set_group_yaw(kind, self.camera_yaw);
                    }
                }
                Effect::HideGroup(kind) => {
                    self.registry.set_visible(kind, false);
                    if kind == GroupKind::Panorama {
                        self.session.deactivate();
                        self.pano_texture = None;
                        self.desired_pano = None;
                        ui::set_loading_visible(&self.document, false);
                    }
                }
                Effect::BuildSubMenu { parent } => self.build_sub_menu(parent),
                Effect::TearDownSubMenu => self.teardown_sub_menu(),
                Effect::MarkSubActive { index } => self.mark_sub_active(index),
                Effect::LoadLocation { location } => {
                    let plan = self
                        .session
                        .load_source(&self.catalog, PanoSource::Location(location));
                    if let Some(plan) = plan {
                        self.execute_plan(plan);
                    }
                }
                Effect::LoadSubLocation { parent, child } => {
                    let plan = self
                        .session
                        .load_source(&self.catalog, PanoSource::SubLocation { parent, child });
                    if let Some(plan) = plan {
                        self.execute_plan(plan);
                    }
                }
                Effect::SetPanoramaBack { visible } => {
                    self.registry.set_node_visible(self.back_btn, visible);
                    if let Some(b) = self.billboards.get_mut(&self.back_btn) {
                        b.visible = visible;
                    }
                }
                Effect::SetAudioLayout(layout) => self.apply_audio_layout(layout),
                Effect::StopAudio => {
                    self.narration.stop();
                    self.refresh_play_icon();
                }
            }
        }
    }

    fn execute_plan(&mut self, plan: LoadPlan) {
        // Replace the hotspot set; removing the nodes drops their draw
        // state (and with it the only non-shared GPU handles).
        for id in self.hotspots.drain(..) {
            self.registry.remove(id);
            self.billboards.remove(&id);
        }
        for hotspot in &plan.hotspots {
            let face = Vec3::new(0.0, HOTSPOT_Y, 0.0);
            let tilt = -PI / 2.5;
            let node = self.registry.insert(
                Node::new(GroupKind::Panorama)
                    .with_volume(quad_volume(hotspot.position, face, tilt, Vec2::new(0.4, 0.4)))
                    .with_interactable(Interactable::new(Action::HotspotLink {
                        target: hotspot.target.clone(),
                    })),
            );
            let mut billboard = Billboard::new(
                GroupKind::Panorama,
                hotspot.position,
                face,
                Vec2::new(0.8, 0.8),
                self.arrow_texture.clone(),
            );
            billboard.tilt_x = tilt;
            billboard.hover_scale = 1.3;
            self.billboards.insert(node, billboard);
            self.hotspots.push(node);
        }

        // Foreground texture, via the cache.
        let path = plan.texture.path.clone();
        if let Some(tex) = self.cache.get(&path) {
            self.pano_texture = Some(tex.clone());
            self.desired_pano = None;
            ui::set_loading_visible(&self.document, false);
        } else {
            self.desired_pano = Some((path.clone(), plan.texture.epoch));
            ui::set_loading_visible(&self.document, true);
            if self.cache.begin_load(&path) {
                textures::request(&self.tex_queue, path, TexPurpose::Panorama);
            }
            // An in-flight preload for the same path will install on
            // arrival; no second request goes out.
        }

        for target in self
            .cache
            .preload_targets(plan.preload.iter().map(|s| s.as_str()))
        {
            textures::request(&self.tex_queue, target, TexPurpose::Preload);
        }

        match plan.audio {
            AudioCue::Keep => {}
            AudioCue::Stop => {
                self.narration.stop();
                self.refresh_play_icon();
            }
            AudioCue::Start(path) => {
                self.narration.start(&path);
                self.refresh_play_icon();
            }
        }
    }

    // ---------------- async completions ----------------

    fn drain_tex_queue(&mut self) {
        let arrivals: Vec<TexArrival> = self.tex_queue.borrow_mut().drain(..).collect();
        for arrival in arrivals {
            match arrival.image {
                Some(image) => self.on_texture_loaded(arrival.path, arrival.purpose, image),
                None => self.on_texture_failed(&arrival.path, arrival.purpose),
            }
        }
    }

    fn on_texture_loaded(
        &mut self,
        path: String,
        purpose: TexPurpose,
        image: web::HtmlImageElement,
    ) {
        match purpose {
            TexPurpose::Thumbnail { node } => {
                let Some(b) = self.billboards.get_mut(&node) else {
                    return; // menu torn down before the thumbnail arrived
                };
                if let Some((name, index)) = &b.card {
                    if let Some(card) = canvas_tex::thumbnail_card(name, *index, Some(&image)) {
                        b.texture = Rc::new(self.gpu.create_texture(&card));
                    }
                }
            }
            TexPurpose::Welcome | TexPurpose::Panorama | TexPurpose::Preload => {
                let Some(rgba) = textures::image_to_rgba(&image) else {
                    self.on_texture_failed(&path, purpose);
                    return;
                };
                let tex = Rc::new(self.gpu.create_texture(&rgba));
                self.cache.insert(&path, tex.clone());
                if purpose == TexPurpose::Welcome {
                    self.welcome_texture = Some(tex);
                } else {
                    self.maybe_install_pano(&path);
                }
            }
        }
    }

    /// Install a finished texture on the sphere only if it is still the
    /// one the session wants; a stale completion stays cache-only.
    fn maybe_install_pano(&mut self, path: &str) {
        let Some((wanted, epoch)) = &self.desired_pano else {
            return;
        };
        if wanted != path {
            return;
        }
        if !self.session.is_current(*epoch) {
            log::info!("discarding stale panorama load: {path}");
            self.desired_pano = None;
            return;
        }
        self.pano_texture = self.cache.get(path).cloned();
        self.desired_pano = None;
        ui::set_loading_visible(&self.document, false);
    }

    fn on_texture_failed(&mut self, path: &str, purpose: TexPurpose) {
        self.cache.mark_failed(path);
        match purpose {
            TexPurpose::Thumbnail { node } => {
                // Fall back to the generated hue card.
                let Some(b) = self.billboards.get_mut(&node) else {
                    return;
                };
                if let Some((name, index)) = &b.card {
                    if let Some(card) = canvas_tex::thumbnail_card(name, *index, None) {
                        b.texture = Rc::new(self.gpu.create_texture(&card));
                    }
                }
            }
            TexPurpose::Welcome => {
                let fallback = make_texture(&self.gpu, canvas_tex::fallback_panorama("Virtual Tour"));
                self.welcome_texture = Some(Rc::new(fallback));
            }
            TexPurpose::Panorama | TexPurpose::Preload => {
                // Only a foreground failure touches the sphere; the path
                // stays uncached so the next explicit load retries.
                if matches!(&self.desired_pano, Some((wanted, _)) if wanted == path) {
                    let fallback =
                        make_texture(&self.gpu, canvas_tex::fallback_panorama("Error Loading"));
                    self.pano_texture = Some(Rc::new(fallback));
                    self.desired_pano = None;
                    ui::set_loading_visible(&self.document, false);
                }
            }
        }
    }

    // ---------------- gaze dispatch ----------------

    fn handle_gaze_events(&mut self) {
        let events = std::mem::take(&mut self.events_scratch);
        for event in &events {
            match event {
                GazeEvent::HoverIn(node) => {
                    if let Some(b) = self.billboards.get_mut(node) {
                        b.scale = b.rest_scale.max(b.hover_scale);
                        b.opacity = b.hover_opacity;
                    }
                }
                GazeEvent::HoverOut(node) => {
                    if let Some(b) = self.billboards.get_mut(node) {
                        b.scale = b.rest_scale;
                        b.opacity = b.rest_opacity;
                    }
                }
                GazeEvent::Activated { action, .. } => self.dispatch_action(action.clone()),
            }
        }
        self.events_scratch = events;
    }

    fn dispatch_action(&mut self, action: Action) {
        match action {
            Action::StartExperience => {
                self.apply_event(NavEvent::StartActivated);
                self.tutorial.start();
                if self.tutorial.is_active() {
                    self.build_tutorial();
                }
            }
            Action::SelectLocation(index) => {
                if self.tutorial.location_selected() {
                    self.finish_tutorial();
                }
                self.apply_event(NavEvent::LocationSelected(index));
            }
            Action::SelectSubLocation(index) => {
                self.apply_event(NavEvent::SubLocationSelected(index));
            }
            Action::SubMenuBack => self.apply_event(NavEvent::SubMenuBack),
            Action::PanoramaBack => self.apply_event(NavEvent::PanoramaBack),
            Action::HotspotLink { target } => {
                if let Some(plan) = self.session.activate_link(&self.catalog, &target) {
                    self.execute_plan(plan);
                }
            }
            Action::ToggleAudio => {
                self.narration.toggle_play();
                self.refresh_play_icon();
            }
            Action::ToggleMute => {
                self.narration.toggle_mute();
                self.refresh_mute_icon();
            }
            Action::TutorialOrb => {
                if self.tutorial.orb_activated() {
                    self.update_tutorial_visuals();
                }
            }
            Action::SkipTutorial => {
                if self.tutorial.skip() {
                    self.finish_tutorial();
                }
            }
        }
    }

    fn refresh_play_icon(&mut self) {
        let tex = Rc::new(make_texture(
            &self.gpu,
            canvas_tex::play_icon(self.narration.playing),
        ));
        if let Some(b) = self.billboards.get_mut(&self.play_btn) {
            b.texture = tex;
        }
    }

    fn refresh_mute_icon(&mut self) {
        let tex = Rc::new(make_texture(
            &self.gpu,
            canvas_tex::mute_icon(self.narration.muted),
        ));
        if let Some(b) = self.billboards.get_mut(&self.mute_btn) {
            b.texture = tex;
        }
    }

    // ---------------- per-frame tick ----------------

    pub fn tick(&mut self, camera: &OrbitCamera, dt: f32) {
        self.drain_tex_queue();
        if self.narration.take_ended() {
            self.refresh_play_icon();
        }

        let (origin, dir) = camera.gaze();
        self.camera_yaw = yaw_towards(dir);

        // Tutorial step 1 watches total head rotation.
        let rotated = self.prev_look.angle_between(dir);
        self.prev_look = dir;
        if rotated.is_finite() && self.tutorial.note_head_rotation(rotated) {
            self.update_tutorial_visuals();
        }

        // Camera-following docks pause while the user pitches down to
        // make a selection.
        let pitch = dir.y.clamp(-1.0, 1.0).asin();
        if pitch > DOCK_FOLLOW_PITCH_GATE {
            for kind in [GroupKind::SubMenu, GroupKind::Dock] {
                let yaw = ease_yaw(
                    self.registry.group_yaw(kind),
                    self.camera_yaw,
                    DOCK_FOLLOW_EASE,
                );
                self.registry.set_group_yaw(kind, yaw);
            }
        }

        // Tutorial HUD lazily trails the camera yaw.
        if let Some(hud) = self.hud_node {
            self.hud_yaw = ease_yaw(self.hud_yaw, self.camera_yaw, 0.08);
            if let Some(b) = self.billboards.get_mut(&hud) {
                let (sy, cy) = self.hud_yaw.sin_cos();
                b.center = Vec3::new(-sy * 2.0, EYE_HEIGHT + 0.3, -cy * 2.0);
                b.face_target = Vec3::new(0.0, EYE_HEIGHT + 0.3, 0.0);
            }
        }

        self.events_scratch.clear();
        let status = self.gaze.tick(
            Ray::new(origin, dir),
            &self.registry,
            dt,
            &mut self.events_scratch,
        );
        self.reticle.progress = status.progress;
        self.handle_gaze_events();
    }

    pub fn draw_list(&self) -> DrawList {
        let pano = match self.nav {
            NavState::Welcome => self.welcome_texture.clone(),
            NavState::MainMenu => None,
            NavState::Panorama { .. } | NavState::MultiScene { .. } => self.pano_texture.clone(),
        };

        let mut billboards = Vec::new();
        for kind in DRAW_ORDER {
            if !self.registry.is_visible(kind) {
                continue;
            }
            let yaw = self.registry.group_yaw(kind);
            let mut nodes: Vec<(&NodeId, &Billboard)> = self
                .billboards
                .iter()
                .filter(|(_, b)| b.group == kind && b.visible)
                .collect();
            nodes.sort_by_key(|(id, _)| id.0);
            for (_, b) in nodes {
                billboards.push(BillboardDraw {
                    model: b.model(yaw),
                    tint: Vec4::new(1.0, 1.0, 1.0, b.opacity),
                    texture: b.texture.clone(),
                });
            }
        }

        DrawList {
            pano,
            billboards,
            reticle: self.reticle,
        }
    }
}

fn make_texture(gpu: &GpuState<'_>, image: Option<RgbaImage>) -> GpuTexture {
    let image = image.unwrap_or_else(|| RgbaImage::solid([80, 80, 80, 255]));
    gpu.create_texture(&image)
}
