use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::camera::OrbitCamera;
use crate::constants::{LOOK_SPEED, ZOOM_SPEED_DEG};
use crate::input::{wheel_notches, PointerState};

/// Wire drag-to-look and wheel FOV zoom on the canvas. Drag moves the
/// panorama with the pointer (grab style), like the orbit controls the
/// desktop view replaces.
pub fn wire_input_handlers(
    canvas: &web::HtmlCanvasElement,
    camera: Rc<RefCell<OrbitCamera>>,
    pointer: Rc<RefCell<PointerState>>,
) {
    {
        let pointer = pointer.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            let mut p = pointer.borrow_mut();
            p.down = true;
            p.x = ev.client_x() as f32;
            p.y = ev.client_y() as f32;
            ev.prevent_default();
        }) as Box<dyn FnMut(_)>);
        canvas
            .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())
            .ok();
        closure.forget();
    }

    {
        let pointer = pointer.clone();
        let camera = camera.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            let delta = pointer
                .borrow_mut()
                .track(ev.client_x() as f32, ev.client_y() as f32);
            if delta != glam::Vec2::ZERO {
                camera
                    .borrow_mut()
                    .apply_drag(-delta.x, -delta.y, LOOK_SPEED);
            }
        }) as Box<dyn FnMut(_)>);
        canvas
            .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())
            .ok();
        closure.forget();
    }

    {
        let pointer = pointer.clone();
        let closure = Closure::wrap(Box::new(move |_ev: web::PointerEvent| {
            pointer.borrow_mut().down = false;
        }) as Box<dyn FnMut(_)>);
        canvas
            .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref())
            .ok();
        let cancel = Closure::wrap(Box::new(move |_ev: web::PointerEvent| {
            // Pointer left the canvas mid-drag.
        }) as Box<dyn FnMut(_)>);
        canvas
            .add_event_listener_with_callback("pointercancel", cancel.as_ref().unchecked_ref())
            .ok();
        cancel.forget();
        closure.forget();
    }

    {
        let camera = camera.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::WheelEvent| {
            camera
                .borrow_mut()
                .apply_zoom(wheel_notches(ev.delta_y()), ZOOM_SPEED_DEG);
            ev.prevent_default();
        }) as Box<dyn FnMut(_)>);
        canvas
            .add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref())
            .ok();
        closure.forget();
    }
}
