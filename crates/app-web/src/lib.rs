#![cfg(target_arch = "wasm32")]

mod audio;
mod camera;
mod canvas_tex;
mod constants;
mod dom;
mod driver;
mod events;
mod frame;
mod input;
mod locations;
mod render;
mod textures;
mod ui;

use std::cell::RefCell;
use std::rc::Rc;

use instant::Instant;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

use crate::camera::OrbitCamera;
use crate::input::PointerState;
use crate::render::GpuState;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("tour viewer starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id("app-canvas")
        .ok_or_else(|| anyhow::anyhow!("missing #app-canvas"))?
        .dyn_into()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    dom::sync_canvas_backing_size(&canvas);
    {
        let canvas_resize = canvas.clone();
        let resize_closure = Closure::wrap(Box::new(move || {
            dom::sync_canvas_backing_size(&canvas_resize);
        }) as Box<dyn FnMut()>);
        window
            .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref())
            .ok();
        resize_closure.forget();
    }

    let catalog = locations::build_catalog();
    catalog
        .validate()
        .map_err(|e| anyhow::anyhow!("catalog invalid: {e}"))?;

    // Leak a canvas clone to satisfy the 'static surface lifetime.
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    let gpu = GpuState::new(leaked_canvas).await?;

    let app = driver::App::new(gpu, document, catalog);
    let camera = Rc::new(RefCell::new(OrbitCamera::default()));
    let pointer = Rc::new(RefCell::new(PointerState::default()));
    events::wire_input_handlers(&canvas, camera.clone(), pointer);

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        app,
        camera,
        canvas,
        last_instant: Instant::now(),
    }));
    frame::start_loop(frame_ctx);
    Ok(())
}
