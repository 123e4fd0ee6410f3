//! Textures drawn with the 2D canvas: glass cards, pill buttons, audio
//! icons, the hotspot arrow and the fallback panoramas. Everything comes
//! back as plain RGBA for the renderer to upload.

use wasm_bindgen::JsCast;
use web_sys as web;

use crate::textures::RgbaImage;

fn make_context(w: u32, h: u32) -> Option<(web::HtmlCanvasElement, web::CanvasRenderingContext2d)> {
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
    Some((canvas, ctx))
}

fn read_rgba(
    canvas: &web::HtmlCanvasElement,
    ctx: &web::CanvasRenderingContext2d,
) -> Option<RgbaImage> {
    let (w, h) = (canvas.width(), canvas.height());
    let data = ctx.get_image_data(0.0, 0.0, w as f64, h as f64).ok()?;
    Some(RgbaImage {
        width: w,
        height: h,
        data: data.data().0,
    })
}

fn round_rect(ctx: &web::CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    ctx.quadratic_curve_to(x + w, y, x + w, y + r);
    ctx.line_to(x + w, y + h - r);
    ctx.quadratic_curve_to(x + w, y + h, x + w - r, y + h);
    ctx.line_to(x + r, y + h);
    ctx.quadratic_curve_to(x, y + h, x, y + h - r);
    ctx.line_to(x, y + r);
    ctx.quadratic_curve_to(x, y, x + r, y);
    ctx.close_path();
}

fn centered_text(ctx: &web::CanvasRenderingContext2d, text: &str, font: &str, x: f64, y: f64) {
    ctx.set_font(font);
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_shadow_color("rgba(0,0,0,0.5)");
    ctx.set_shadow_blur(5.0);
    let _ = ctx.fill_text(text, x, y);
    ctx.set_shadow_blur(0.0);
}

/// Glass pill with a label, used for the BACK buttons and the tutorial skip.
pub fn pill_label(text: &str, fill: &str, stroke: &str) -> Option<RgbaImage> {
    let (canvas, ctx) = make_context(500, 200)?;
    round_rect(&ctx, 10.0, 10.0, 480.0, 180.0, 50.0);
    ctx.set_fill_style_str(fill);
    ctx.fill();
    ctx.set_stroke_style_str(stroke);
    ctx.set_line_width(10.0);
    ctx.stroke();
    ctx.set_fill_style_str("white");
    centered_text(&ctx, text, "bold 60px sans-serif", 250.0, 100.0);
    read_rgba(&canvas, &ctx)
}

/// Thumbnail card: glass background, cover-fit image (or a per-index hue
/// fallback when the thumbnail failed to load), name underneath.
pub fn thumbnail_card(
    name: &str,
    index: usize,
    img: Option<&web::HtmlImageElement>,
) -> Option<RgbaImage> {
    let (canvas, ctx) = make_context(512, 340)?;

    round_rect(&ctx, 10.0, 10.0, 492.0, 320.0, 30.0);
    ctx.set_fill_style_str("rgba(255, 255, 255, 0.1)");
    ctx.fill();
    ctx.set_line_width(4.0);
    ctx.set_stroke_style_str("rgba(255, 255, 255, 0.3)");
    ctx.stroke();

    ctx.save();
    round_rect(&ctx, 30.0, 30.0, 452.0, 220.0, 20.0);
    ctx.clip();
    match img {
        Some(img) => {
            // Cover fit: crop the source to the box ratio.
            let (iw, ih) = (img.natural_width() as f64, img.natural_height() as f64);
            let box_ratio = 452.0 / 220.0;
            let (mut sx, mut sy, mut sw, mut sh) = (0.0, 0.0, iw, ih);
            if iw / ih > box_ratio {
                sw = ih * box_ratio;
                sx = (iw - sw) / 2.0;
            } else {
                sh = iw / box_ratio;
                sy = (ih - sh) / 2.0;
            }
            let _ = ctx
                .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                    img, sx, sy, sw, sh, 30.0, 30.0, 452.0, 220.0,
                );
        }
        None => {
            let hue = (index * 60) % 360;
            ctx.set_fill_style_str(&format!("hsl({hue}, 40%, 40%)"));
            ctx.fill_rect(30.0, 30.0, 452.0, 220.0);
        }
    }
    ctx.restore();

    ctx.set_fill_style_str("#ffffff");
    centered_text(
        &ctx,
        &name.to_uppercase(),
        "bold 36px sans-serif",
        256.0,
        290.0,
    );
    read_rgba(&canvas, &ctx)
}

/// White directional arrow for panorama hotspots.
pub fn arrow_icon() -> Option<RgbaImage> {
    let (canvas, ctx) = make_context(256, 256)?;
    ctx.set_fill_style_str("rgba(255, 255, 255, 0.9)");
    ctx.begin_path();
    ctx.move_to(128.0, 30.0);
    ctx.line_to(210.0, 140.0);
    ctx.line_to(155.0, 140.0);
    ctx.line_to(155.0, 230.0);
    ctx.line_to(101.0, 230.0);
    ctx.line_to(101.0, 140.0);
    ctx.line_to(46.0, 140.0);
    ctx.close_path();
    ctx.fill();
    ctx.set_stroke_style_str("rgba(0, 0, 0, 0.5)");
    ctx.set_line_width(4.0);
    ctx.stroke();
    read_rgba(&canvas, &ctx)
}

pub fn play_icon(playing: bool) -> Option<RgbaImage> {
    let (canvas, ctx) = make_context(200, 200)?;
    ctx.begin_path();
    let _ = ctx.arc(100.0, 100.0, 90.0, 0.0, std::f64::consts::TAU);
    ctx.set_fill_style_str("rgba(50, 150, 50, 0.6)");
    ctx.fill();
    ctx.set_stroke_style_str("rgba(100, 255, 100, 0.8)");
    ctx.set_line_width(5.0);
    ctx.stroke();

    ctx.set_fill_style_str("white");
    if playing {
        // Pause bars
        ctx.fill_rect(70.0, 60.0, 20.0, 80.0);
        ctx.fill_rect(110.0, 60.0, 20.0, 80.0);
    } else {
        ctx.begin_path();
        ctx.move_to(75.0, 55.0);
        ctx.line_to(75.0, 145.0);
        ctx.line_to(145.0, 100.0);
        ctx.close_path();
        ctx.fill();
    }
    read_rgba(&canvas, &ctx)
}

pub fn mute_icon(muted: bool) -> Option<RgbaImage> {
    let (canvas, ctx) = make_context(200, 200)?;
    ctx.begin_path();
    let _ = ctx.arc(100.0, 100.0, 90.0, 0.0, std::f64::consts::TAU);
    ctx.set_fill_style_str(if muted {
        "rgba(150, 50, 50, 0.6)"
    } else {
        "rgba(50, 100, 150, 0.6)"
    });
    ctx.fill();
    ctx.set_stroke_style_str(if muted {
        "rgba(255, 100, 100, 0.8)"
    } else {
        "rgba(100, 200, 255, 0.8)"
    });
    ctx.set_line_width(5.0);
    ctx.stroke();

    // Speaker body
    ctx.set_fill_style_str("white");
    ctx.begin_path();
    ctx.move_to(60.0, 80.0);
    ctx.line_to(85.0, 80.0);
    ctx.line_to(115.0, 55.0);
    ctx.line_to(115.0, 145.0);
    ctx.line_to(85.0, 120.0);
    ctx.line_to(60.0, 120.0);
    ctx.close_path();
    ctx.fill();

    ctx.set_stroke_style_str("white");
    if muted {
        ctx.set_line_width(8.0);
        ctx.begin_path();
        ctx.move_to(130.0, 70.0);
        ctx.line_to(170.0, 130.0);
        ctx.stroke();
        ctx.begin_path();
        ctx.move_to(170.0, 70.0);
        ctx.line_to(130.0, 130.0);
        ctx.stroke();
    } else {
        ctx.set_line_width(6.0);
        ctx.begin_path();
        let _ = ctx.arc(115.0, 100.0, 25.0, -0.6, 0.6);
        ctx.stroke();
        ctx.begin_path();
        let _ = ctx.arc(115.0, 100.0, 45.0, -0.6, 0.6);
        ctx.stroke();
    }
    read_rgba(&canvas, &ctx)
}

/// Soft green orb for the tutorial gaze target.
pub fn orb_icon() -> Option<RgbaImage> {
    let (canvas, ctx) = make_context(256, 256)?;
    let gradient = ctx
        .create_radial_gradient(128.0, 128.0, 20.0, 128.0, 128.0, 120.0)
        .ok()?;
    let _ = gradient.add_color_stop(0.0, "rgba(0, 255, 136, 0.95)");
    let _ = gradient.add_color_stop(0.7, "rgba(0, 255, 136, 0.6)");
    let _ = gradient.add_color_stop(1.0, "rgba(0, 255, 136, 0.0)");
    ctx.set_fill_style_canvas_gradient(&gradient);
    ctx.begin_path();
    let _ = ctx.arc(128.0, 128.0, 120.0, 0.0, std::f64::consts::TAU);
    ctx.fill();
    read_rgba(&canvas, &ctx)
}

/// Title panel for the welcome screen.
pub fn welcome_panel(title: &str, subtitle: &str) -> Option<RgbaImage> {
    let (canvas, ctx) = make_context(1024, 600)?;
    round_rect(&ctx, 50.0, 50.0, 924.0, 500.0, 60.0);
    ctx.set_fill_style_str("rgba(15, 15, 25, 0.75)");
    ctx.fill();
    ctx.set_line_width(4.0);
    ctx.set_stroke_style_str("rgba(255, 255, 255, 0.2)");
    ctx.stroke();

    ctx.set_fill_style_str("#ffffff");
    centered_text(&ctx, title, "bold 90px sans-serif", 512.0, 200.0);
    ctx.set_fill_style_str("#cccccc");
    centered_text(&ctx, subtitle, "40px sans-serif", 512.0, 300.0);
    read_rgba(&canvas, &ctx)
}

/// Tutorial HUD pill: headline plus an optional hint line.
pub fn hud_text(text: &str, subtext: &str) -> Option<RgbaImage> {
    let (canvas, ctx) = make_context(1024, 256)?;
    round_rect(&ctx, 100.0, 20.0, 824.0, 216.0, 50.0);
    ctx.set_fill_style_str("rgba(0, 0, 0, 0.7)");
    ctx.fill();
    ctx.set_stroke_style_str("#00ff88");
    ctx.set_line_width(4.0);
    ctx.stroke();

    ctx.set_fill_style_str("white");
    centered_text(&ctx, text, "bold 60px sans-serif", 512.0, 110.0);
    if !subtext.is_empty() {
        ctx.set_fill_style_str("#cccccc");
        centered_text(&ctx, subtext, "40px sans-serif", 512.0, 180.0);
    }
    read_rgba(&canvas, &ctx)
}

/// Full equirect fallback shown when a panorama fails to load.
pub fn fallback_panorama(label: &str) -> Option<RgbaImage> {
    let (canvas, ctx) = make_context(2048, 1024)?;
    let gradient = ctx.create_linear_gradient(0.0, 0.0, 0.0, 1024.0);
    let _ = gradient.add_color_stop(0.0, "#1a1a3e");
    let _ = gradient.add_color_stop(1.0, "#0a0a1e");
    ctx.set_fill_style_canvas_gradient(&gradient);
    ctx.fill_rect(0.0, 0.0, 2048.0, 1024.0);

    ctx.set_fill_style_str("#ffffff");
    centered_text(&ctx, label, "bold 80px sans-serif", 1024.0, 512.0);
    read_rgba(&canvas, &ctx)
}
