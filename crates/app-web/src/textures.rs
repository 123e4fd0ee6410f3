//! Async image fetching and decoding.
//!
//! Images load through `HtmlImageElement` and are read back to RGBA via an
//! offscreen 2D canvas, capped at [`MAX_TEXTURE_EDGE`]. Loads complete on a
//! later frame: callers queue a [`TexArrival`] into the shared completion
//! queue and the driver drains it once per tick, checking the panorama
//! epoch before anything touches the displayed sphere. Preload failures
//! only log; the path stays uncached so a later foreground load retries.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

use crate::constants::MAX_TEXTURE_EDGE;

#[derive(Clone)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RgbaImage {
    /// 1x1 flat color, the placeholder while a real texture is in flight.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            data: rgba.to_vec(),
        }
    }
}

/// Why a texture was requested; decides what the driver does with the
/// completed image.
#[derive(Clone, Debug, PartialEq)]
pub enum TexPurpose {
    /// Foreground panorama for the sphere.
    Panorama,
    /// The welcome-screen background sphere.
    Welcome,
    /// Thumbnail for a menu card node (composited into the card).
    Thumbnail { node: app_core::NodeId },
    /// Background neighbor preload; cache-only.
    Preload,
}

pub struct TexArrival {
    pub path: String,
    pub purpose: TexPurpose,
    /// `None` on load failure.
    pub image: Option<web::HtmlImageElement>,
}

pub type TexQueue = Rc<RefCell<Vec<TexArrival>>>;

/// Fire an async fetch; the result lands in `queue` for the next tick.
pub fn request(queue: &TexQueue, path: String, purpose: TexPurpose) {
    let queue = queue.clone();
    spawn_local(async move {
        let image = fetch_image(&path).await.ok();
        if image.is_none() {
            log::error!("texture load failed: {path}");
        }
        queue.borrow_mut().push(TexArrival {
            path,
            purpose,
            image,
        });
    });
}

async fn fetch_image(path: &str) -> Result<web::HtmlImageElement, ()> {
    let img = web::HtmlImageElement::new().map_err(|_| ())?;
    img.set_cross_origin(Some("anonymous"));
    let loaded = js_sys::Promise::new(&mut |resolve, reject| {
        img.set_onload(Some(&resolve));
        img.set_onerror(Some(&reject));
    });
    img.set_src(path);
    JsFuture::from(loaded).await.map_err(|_| ())?;
    Ok(img)
}

/// Read an image element back as RGBA, downscaling past the GPU edge cap.
pub fn image_to_rgba(img: &web::HtmlImageElement) -> Option<RgbaImage> {
    let (src_w, src_h) = (img.natural_width(), img.natural_height());
    if src_w == 0 || src_h == 0 {
        return None;
    }
    let scale = (MAX_TEXTURE_EDGE as f64 / src_w.max(src_h) as f64).min(1.0);
    let w = ((src_w as f64 * scale) as u32).max(1);
    let h = ((src_h as f64 * scale) as u32).max(1);

    let document = crate::dom::window_document()?;
    let canvas: web::HtmlCanvasElement = document
        .create_element("canvas")
        .ok()?
        .dyn_into()
        .ok()?;
    canvas.set_width(w);
    canvas.set_height(h);
    let ctx: web::CanvasRenderingContext2d = canvas
        .get_context("2d")
        .ok()??
        .dyn_into()
        .ok()?;
    ctx.draw_image_with_html_image_element_and_dw_and_dh(img, 0.0, 0.0, w as f64, h as f64)
        .ok()?;
    let data = ctx.get_image_data(0.0, 0.0, w as f64, h as f64).ok()?;
    Some(RgbaImage {
        width: w,
        height: h,
        data: data.data().0,
    })
}
