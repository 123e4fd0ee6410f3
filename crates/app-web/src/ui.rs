use web_sys as web;

/// Show/hide the DOM loading indicator while a foreground panorama fetch is
/// in flight. The element is optional; a page without it just gets no
/// spinner.
pub fn set_loading_visible(document: &web::Document, visible: bool) {
    if let Some(el) = document.get_element_by_id("loading") {
        if visible {
            let _ = el.set_attribute("style", "");
        } else {
            let _ = el.set_attribute("style", "display:none");
        }
    }
}
