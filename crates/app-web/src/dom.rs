use web_sys as web;

const TUTORIAL_FLAG_KEY: &str = "tour_tutorial_completed";

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
}

pub fn tutorial_completed() -> bool {
    local_storage()
        .and_then(|s| s.get_item(TUTORIAL_FLAG_KEY).ok().flatten())
        .map(|v| v == "true")
        .unwrap_or(false)
}

pub fn set_tutorial_completed() {
    if let Some(s) = local_storage() {
        if s.set_item(TUTORIAL_FLAG_KEY, "true").is_err() {
            log::warn!("could not persist tutorial flag");
        }
    }
}

fn local_storage() -> Option<web::Storage> {
    web::window().and_then(|w| w.local_storage().ok().flatten())
}
