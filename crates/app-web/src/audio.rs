//! Per-location narration playback through a single `HtmlAudioElement`.
//!
//! The core decides *when* narration starts and stops (via `AudioCue`
//! effects); this wrapper owns the element, survives autoplay blocks, and
//! raises an ended flag the frame loop polls so completion is applied on a
//! tick like every other async event.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct Narration {
    element: Option<web::HtmlAudioElement>,
    ended: Rc<Cell<bool>>,
    pub playing: bool,
    pub muted: bool,
}

impl Narration {
    pub fn new() -> Self {
        Self {
            element: None,
            ended: Rc::new(Cell::new(false)),
            playing: false,
            muted: false,
        }
    }

    /// Start narration for a location, replacing whatever was playing.
    /// An autoplay block leaves the track paused; the play button recovers.
    pub fn start(&mut self, path: &str) {
        self.stop();
        let Ok(element) = web::HtmlAudioElement::new_with_src(path) else {
            log::error!("audio element creation failed: {path}");
            return;
        };
        element.set_loop(false);
        element.set_volume(0.5);
        element.set_muted(self.muted);

        let ended = self.ended.clone();
        let on_ended = Closure::wrap(Box::new(move || {
            ended.set(true);
        }) as Box<dyn FnMut()>);
        let _ = element
            .add_event_listener_with_callback("ended", on_ended.as_ref().unchecked_ref());
        on_ended.forget();

        match element.play() {
            Ok(promise) => {
                // Swallow the autoplay rejection; the user can press play.
                let on_blocked = Closure::wrap(Box::new(|_e: wasm_bindgen::JsValue| {
                    log::warn!("narration autoplay blocked");
                })
                    as Box<dyn FnMut(wasm_bindgen::JsValue)>);
                let _ = promise.catch(&on_blocked);
                on_blocked.forget();
                self.playing = true;
            }
            Err(_) => {
                log::warn!("narration play() failed: {path}");
                self.playing = false;
            }
        }
        self.element = Some(element);
    }

    pub fn stop(&mut self) {
        if let Some(element) = self.element.take() {
            let _ = element.pause();
        }
        self.playing = false;
        self.ended.set(false);
    }

    pub fn toggle_play(&mut self) {
        let Some(element) = &self.element else {
            return;
        };
        if self.playing {
            let _ = element.pause();
            self.playing = false;
        } else {
            let _ = element.play();
            self.playing = true;
        }
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        if let Some(element) = &self.element {
            element.set_muted(self.muted);
        }
    }

    /// True once per track end; the driver flips the play button back.
    pub fn take_ended(&mut self) -> bool {
        let ended = self.ended.replace(false);
        if ended {
            self.playing = false;
        }
        ended
    }
}

impl Default for Narration {
    fn default() -> Self {
        Self::new()
    }
}
