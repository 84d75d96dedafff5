//! Browser binding for the depth field: a canvas-backed `Surface`, the event
//! listeners feeding `InputState`, and the animation-frame loop.

use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, MouseEvent, Window, window};

use super::palette::{Rgba, Theme};
use super::{Field, InputState, Surface};
use crate::config::FieldConfig;
use crate::disposer::{Disposer, listen};
use crate::error::Error;
use crate::rng;

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgba, width: f64) {
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(from.0, from.1);
        self.ctx.line_to(to.0, to.1);
        self.ctx.stroke();
    }

    fn glow(&mut self, (x, y): (f64, f64), radius: f64, glow_radius: f64, color: Rgba) {
        let Ok(gradient) = self.ctx.create_radial_gradient(x, y, 0.0, x, y, glow_radius) else {
            return;
        };
        gradient.add_color_stop(0.0, &color.css()).ok();
        gradient.add_color_stop(1.0, &color.with_alpha(0.0).css()).ok();
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.begin_path();
        if self.ctx.arc(x, y, radius, 0.0, TAU).is_ok() {
            self.ctx.fill();
        }
    }

    fn outline(
        &mut self,
        (x, y): (f64, f64),
        (rx, ry): (f64, f64),
        rotation: f64,
        color: Rgba,
        width: f64,
    ) {
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        if self.ctx.ellipse(x, y, rx, ry, rotation, 0.0, TAU).is_ok() {
            self.ctx.stroke();
        }
    }
}

struct FieldRuntime {
    field: Field,
    input: InputState,
    surface: CanvasSurface,
    canvas: HtmlCanvasElement,
}

impl FieldRuntime {
    fn frame(&mut self) {
        let skipped = self.field.step(&self.input, &mut self.surface);
        if skipped > 0 {
            log::trace!("depth field skipped {skipped} non-finite draws");
        }
    }

    fn fit(&mut self, win: &Window) {
        let scroll_aware = self.field.config().scroll_aware;
        let (w, h) = surface_size(win, scroll_aware);
        self.canvas.set_width(w as u32);
        self.canvas.set_height(h as u32);
        self.input.width = w;
        self.input.height = h;
        log::debug!("depth field resized to {w}x{h}");
    }
}

/// Viewport size, or the full document height for the scroll-aware variant.
fn surface_size(win: &Window, scroll_aware: bool) -> (f64, f64) {
    let vw = win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let vh = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    if !scroll_aware {
        return (vw, vh);
    }
    let page_h = win
        .document()
        .and_then(|d| d.document_element())
        .map(|el| el.scroll_height() as f64)
        .unwrap_or(vh);
    (vw, page_h.max(vh))
}

fn style_canvas(canvas: &HtmlCanvasElement, theme: Theme, scroll_aware: bool) {
    let position = if scroll_aware { "absolute" } else { "fixed" };
    let opacity = match theme {
        Theme::Dark => 0.4,
        Theme::Light => 0.35,
    };
    let style = format!(
        "position:{position}; top:0; left:0; width:100%; z-index:-1; \
         pointer-events:none; opacity:{opacity};"
    );
    canvas.set_attribute("style", &style).ok();
}

fn find_canvas(
    doc: &Document,
    canvas_id: &str,
) -> Option<(HtmlCanvasElement, CanvasRenderingContext2d)> {
    let canvas: HtmlCanvasElement = doc.get_element_by_id(canvas_id)?.dyn_into().ok()?;
    let ctx = canvas.get_context("2d").ok()??.dyn_into().ok()?;
    Some((canvas, ctx))
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_frame_loop(
    runtime: Weak<RefCell<FieldRuntime>>,
    disposer: &mut Disposer,
) -> Result<(), JsValue> {
    let win = window().ok_or(Error::NoWindow)?;
    let frame_id = Rc::new(Cell::new(0));
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    let id = frame_id.clone();
    *g.borrow_mut() = Some(Closure::new(move |_ts: f64| {
        let Some(rt) = runtime.upgrade() else {
            return;
        };
        rt.borrow_mut().frame();
        if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
            if let Ok(next) = w.request_animation_frame(cb.as_ref().unchecked_ref()) {
                id.set(next);
            }
        }
    }));
    if let Some(cb) = g.borrow().as_ref() {
        frame_id.set(win.request_animation_frame(cb.as_ref().unchecked_ref())?);
    }
    disposer.add(move || {
        if let Some(w) = window() {
            if let Err(err) = w.cancel_animation_frame(frame_id.get()) {
                log::warn!("could not cancel depth field frame: {}", Error::from(err));
            }
        }
        // Breaks the closure <-> cell cycle.
        g.borrow_mut().take();
    });
    Ok(())
}

/// Mounted background. Dropping it (or calling `unmount`) cancels the frame
/// loop and removes every listener.
#[wasm_bindgen]
pub struct DepthField {
    runtime: Rc<RefCell<FieldRuntime>>,
    disposer: Disposer,
}

#[wasm_bindgen]
impl DepthField {
    /// Re-seed every particle and shape with the palette for the new theme.
    pub fn set_theme(&self, dark: bool) {
        let mut rt = self.runtime.borrow_mut();
        let theme = Theme::from_dark(dark);
        let scroll_aware = rt.field.config().scroll_aware;
        style_canvas(&rt.canvas, theme, scroll_aware);
        let FieldRuntime { field, input, .. } = &mut *rt;
        field.reseed(theme, input);
    }

    pub fn particle_count(&self) -> usize {
        self.runtime.borrow().field.particles().len()
    }

    pub fn unmount(self) {
        log::info!("depth field unmounted");
        drop(self);
    }
}

/// Mount the background on the canvas with id `canvas_id`. Returns `None`
/// without registering anything when that canvas (or its 2D context) is
/// missing.
#[wasm_bindgen(js_name = mountDepthField)]
pub fn mount_depth_field(
    canvas_id: &str,
    dark: bool,
    config_json: Option<String>,
) -> Result<Option<DepthField>, JsValue> {
    let config = FieldConfig::from_json(config_json.as_deref()).inspect_err(|err| {
        log::warn!("depth field config rejected: {err}");
    })?;
    let win = window().ok_or(Error::NoWindow)?;
    let doc = win.document().ok_or(Error::NoDocument)?;
    let Some((canvas, ctx)) = find_canvas(&doc, canvas_id) else {
        log::debug!("no drawable canvas #{canvas_id}, depth field not mounted");
        return Ok(None);
    };

    let theme = Theme::from_dark(dark);
    let scroll_aware = config.scroll_aware;
    style_canvas(&canvas, theme, scroll_aware);
    let (w, h) = surface_size(&win, scroll_aware);
    canvas.set_width(w as u32);
    canvas.set_height(h as u32);
    let mut input = InputState::new(w, h);
    if scroll_aware {
        input.scroll_y = win.scroll_y().unwrap_or(0.0);
    }

    let field = Field::new(config, theme, &input, rng::from_entropy());
    let runtime = Rc::new(RefCell::new(FieldRuntime {
        field,
        input,
        surface: CanvasSurface::new(ctx),
        canvas,
    }));

    let mut disposer = Disposer::new();
    {
        let rt = Rc::downgrade(&runtime);
        listen(&win, "resize", &mut disposer, move |_evt| {
            if let (Some(rt), Some(w)) = (rt.upgrade(), window()) {
                rt.borrow_mut().fit(&w);
            }
        })?;
    }
    {
        let rt = Rc::downgrade(&runtime);
        listen(&win, "mousemove", &mut disposer, move |evt| {
            let (Some(rt), Some(m)) = (rt.upgrade(), evt.dyn_ref::<MouseEvent>()) else {
                return;
            };
            // Scroll-aware canvases span the page, so use page coordinates.
            let pointer = if scroll_aware {
                (m.page_x() as f64, m.page_y() as f64)
            } else {
                (m.client_x() as f64, m.client_y() as f64)
            };
            rt.borrow_mut().input.pointer = Some(pointer);
        })?;
    }
    if scroll_aware {
        let rt = Rc::downgrade(&runtime);
        listen(&win, "scroll", &mut disposer, move |_evt| {
            if let (Some(rt), Some(w)) = (rt.upgrade(), window()) {
                rt.borrow_mut().input.scroll_y = w.scroll_y().unwrap_or(0.0);
            }
        })?;
    }
    start_frame_loop(Rc::downgrade(&runtime), &mut disposer)?;

    log::info!(
        "depth field mounted on #{canvas_id} ({w}x{h}, {:?}, scroll_aware={scroll_aware})",
        theme
    );
    Ok(Some(DepthField { runtime, disposer }))
}
