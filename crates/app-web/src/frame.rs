use std::cell::RefCell;
use std::rc::Rc;

use instant::Instant;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::camera::OrbitCamera;
use crate::driver::App;

pub struct FrameContext {
    pub app: App,
    pub camera: Rc<RefCell<OrbitCamera>>,
    pub canvas: web::HtmlCanvasElement,
    pub last_instant: Instant,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_instant).as_secs_f32();
        self.last_instant = now;

        let camera = *self.camera.borrow();
        self.app.tick(&camera, dt);

        // Keep the surface sized to the canvas backing store.
        let w = self.canvas.width();
        let h = self.canvas.height();
        self.app.gpu.resize_if_needed(w, h);

        let view_proj = camera.view_proj(self.app.gpu.aspect());
        let list = self.app.draw_list();
        if let Err(e) = self.app.gpu.render(view_proj, &list) {
            log::error!("render error: {:?}", e);
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        if let Some(w) = web::window() {
            let _ = w.request_animation_frame(
                tick_clone
                    .borrow()
                    .as_ref()
                    .unwrap()
                    .as_ref()
                    .unchecked_ref(),
            );
        }
    }) as Box<dyn FnMut()>));
    if let Some(w) = web::window() {
        let _ = w.request_animation_frame(tick.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}
