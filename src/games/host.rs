//! Browser binding for the arcade. One timeout closure lives as long as the
//! host and is re-armed for the earliest pending deadline after every change;
//! the snake session also owns a keydown listener.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::Function;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{KeyboardEvent, Window, window};

use super::snake::{Direction, is_pause_key};
use super::{Arcade, GameKind, Input, Mode};
use crate::config::GameConfig;
use crate::disposer::{Disposer, listen};
use crate::error::Error;
use crate::rng;

fn now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

struct HostShared {
    arcade: Arcade,
    timer: Option<i32>,
    /// JS handle to the host's timeout closure.
    tick_fn: Option<Function>,
    on_change: Option<Function>,
    on_back: Option<Function>,
    /// Listeners that belong to the open session.
    session: Disposer,
}

impl HostShared {
    fn clear_timer(&mut self) {
        if let (Some(id), Some(w)) = (self.timer.take(), window()) {
            w.clear_timeout_with_handle(id);
        }
    }

    /// Point the single timeout at the earliest pending deadline, if any.
    fn arm(&mut self, now: f64) {
        self.clear_timer();
        let (Some(deadline), Some(tick), Some(w)) =
            (self.arcade.next_deadline(), self.tick_fn.as_ref(), window())
        else {
            return;
        };
        let delay = (deadline - now).max(0.0).ceil() as i32;
        match w.set_timeout_with_callback_and_timeout_and_arguments_0(tick, delay) {
            Ok(id) => self.timer = Some(id),
            Err(err) => log::warn!("could not schedule game timer: {}", Error::from(err)),
        }
    }

    fn snapshot_json(&self) -> Option<String> {
        let snap = self.arcade.snapshot()?;
        serde_json::to_string(&snap)
            .inspect_err(|err| log::warn!("snapshot serialization failed: {err}"))
            .ok()
    }
}

/// Run `f` against the shared state, re-arm the timer and, when `f` reports a
/// change, hand the new snapshot to `on_change`. The callback runs after the
/// borrow is released so it may call back into the host.
fn update(shared: &Rc<RefCell<HostShared>>, f: impl FnOnce(&mut HostShared, f64) -> bool) -> bool {
    let t = now();
    let (changed, notify) = {
        let mut s = shared.borrow_mut();
        let changed = f(&mut s, t);
        s.arm(t);
        let notify = if changed {
            s.on_change.clone().zip(s.snapshot_json())
        } else {
            None
        };
        (changed, notify)
    };
    if let Some((cb, json)) = notify {
        if let Err(err) = cb.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
            log::warn!("on_change callback threw: {}", Error::from(err));
        }
    }
    changed
}

fn listen_keys(win: &Window, shared: &Rc<RefCell<HostShared>>) -> Result<(), JsValue> {
    let weak: Weak<RefCell<HostShared>> = Rc::downgrade(shared);
    let mut s = shared.borrow_mut();
    listen(win, "keydown", &mut s.session, move |evt| {
        let (Some(shared), Some(key)) = (weak.upgrade(), evt.dyn_ref::<KeyboardEvent>()) else {
            return;
        };
        let key = key.key();
        if Direction::from_key(&key).is_none() && !is_pause_key(&key) {
            return;
        }
        // Keep arrows and space from scrolling the page.
        evt.prevent_default();
        let input = Input::Key { key };
        update(&shared, |s, t| s.arcade.handle(&input, t));
    })
}

#[wasm_bindgen]
pub struct GameHost {
    shared: Rc<RefCell<HostShared>>,
    _tick: Closure<dyn FnMut()>,
}

#[wasm_bindgen]
impl GameHost {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<GameHost, JsValue> {
        let config = GameConfig::from_json(config_json.as_deref()).inspect_err(|err| {
            log::warn!("game config rejected: {err}");
        })?;
        let shared = Rc::new(RefCell::new(HostShared {
            arcade: Arcade::new(config, rng::from_entropy()),
            timer: None,
            tick_fn: None,
            on_change: None,
            on_back: None,
            session: Disposer::new(),
        }));
        let weak = Rc::downgrade(&shared);
        let tick = Closure::<dyn FnMut()>::new(move || {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            shared.borrow_mut().timer = None;
            update(&shared, |s, t| {
                s.arcade.advance(t);
                true
            });
        });
        shared.borrow_mut().tick_fn = Some(tick.as_ref().unchecked_ref::<Function>().clone());
        Ok(GameHost { shared, _tick: tick })
    }

    /// JSON array of `{id, name, description, color}` for the selector grid.
    pub fn catalog(&self) -> Result<String, JsValue> {
        Ok(serde_json::to_string(&GameKind::catalog()).map_err(Error::from)?)
    }

    pub fn active(&self) -> Option<String> {
        self.shared.borrow().arcade.active().map(|k| k.id().to_owned())
    }

    /// Open the game with `id`, closing any other. Call `start` to play.
    pub fn open(&self, id: &str) -> Result<(), JsValue> {
        let kind = GameKind::from_id(id)?;
        {
            let mut s = self.shared.borrow_mut();
            s.session.dispose();
            s.clear_timer();
        }
        update(&self.shared, |s, _| {
            s.arcade.open(kind);
            true
        });
        if kind == GameKind::Snake {
            let win = window().ok_or(Error::NoWindow)?;
            listen_keys(&win, &self.shared)?;
        }
        Ok(())
    }

    pub fn start(&self) -> bool {
        update(&self.shared, |s, t| s.arcade.start(t))
    }

    /// Forward a JSON-encoded `Input`, e.g. `{"type":"card","index":3}`.
    pub fn send(&self, input_json: &str) -> Result<bool, JsValue> {
        let input: Input = serde_json::from_str(input_json).map_err(Error::from)?;
        Ok(self.apply(input))
    }

    pub fn type_text(&self, value: String) -> bool {
        self.apply(Input::Text { value })
    }

    pub fn click_card(&self, index: usize) -> bool {
        self.apply(Input::Card { index })
    }

    pub fn click_bug(&self, id: u32) -> bool {
        self.apply(Input::Bug { id })
    }

    pub fn set_area(&self, width: f64, height: f64) -> bool {
        self.apply(Input::Area { width, height })
    }

    pub fn click_cell(&self, index: usize) -> bool {
        self.apply(Input::Cell { index })
    }

    pub fn set_two_player(&self, two_player: bool) -> bool {
        let mode = if two_player { Mode::TwoPlayer } else { Mode::VsAi };
        self.apply(Input::Mode { mode })
    }

    /// `"rock"`, `"paper"` or `"scissors"`.
    pub fn choose(&self, choice: &str) -> Result<bool, JsValue> {
        let choice = serde_json::Value::String(choice.to_owned());
        let choice = serde_json::from_value(choice).map_err(Error::from)?;
        Ok(self.apply(Input::Choice { choice }))
    }

    pub fn key(&self, key: String) -> bool {
        self.apply(Input::Key { key })
    }

    pub fn restart(&self) -> bool {
        self.apply(Input::Restart)
    }

    pub fn snapshot(&self) -> Option<String> {
        self.shared.borrow().snapshot_json()
    }

    pub fn set_on_change(&self, callback: Option<Function>) {
        self.shared.borrow_mut().on_change = callback;
    }

    pub fn set_on_back(&self, callback: Option<Function>) {
        self.shared.borrow_mut().on_back = callback;
    }

    /// Close the open game: its timer is cleared and its listeners removed
    /// before `on_back` fires.
    pub fn back(&self) -> Option<String> {
        let (closed, on_back) = {
            let mut s = self.shared.borrow_mut();
            s.clear_timer();
            s.session.dispose();
            (s.arcade.back(), s.on_back.clone())
        };
        let closed = closed?;
        if let Some(cb) = on_back {
            if let Err(err) = cb.call1(&JsValue::NULL, &JsValue::from_str(closed.id())) {
                log::warn!("on_back callback threw: {}", Error::from(err));
            }
        }
        Some(closed.id().to_owned())
    }
}

impl GameHost {
    fn apply(&self, input: Input) -> bool {
        update(&self.shared, |s, t| s.arcade.handle(&input, t))
    }
}

impl Drop for GameHost {
    fn drop(&mut self) {
        let mut s = self.shared.borrow_mut();
        s.clear_timer();
        s.session.dispose();
        s.tick_fn = None;
    }
}
